use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use talent_rank::config::AppConfig;
use talent_rank::ranking::{DashboardController, FileSessionStore, SessionStore};
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Controller shared across handlers; the lock queues concurrent uploads.
pub(crate) type SharedDashboard<S> = Arc<Mutex<DashboardController<S>>>;

pub(crate) fn file_store(config: &AppConfig) -> Arc<FileSessionStore> {
    Arc::new(FileSessionStore::new(&config.session.dir))
}

/// Build a controller and restore any saved session, as the dashboard does on mount.
pub(crate) fn mounted_dashboard<S>(store: Arc<S>, config: &AppConfig) -> DashboardController<S>
where
    S: SessionStore + 'static,
{
    let mut controller = DashboardController::new(store, config.dashboard.clone());
    if let Err(err) = controller.restore() {
        warn!(error = %err, "could not read saved session; starting empty");
    }
    controller
}

pub(crate) fn shared<S>(controller: DashboardController<S>) -> SharedDashboard<S>
where
    S: SessionStore + 'static,
{
    Arc::new(Mutex::new(controller))
}
