use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::config::DashboardConfig;

use super::domain::{Applicant, ApplicantId, RankingResult};
use super::export::{to_csv, ExportError};
use super::notice::{Notice, Notifier};
use super::pipeline::RankingPipeline;
use super::session::{SessionError, SessionStore};
use super::table::{project, SortKey, StatusFilter, TableQuery, TableSort};
use super::views::{
    stat_cards, ApplicantDetailView, DashboardSnapshot, DashboardView, PhaseLabel,
    TableProjection,
};

/// Message surfaced for any upload that fails to produce a result.
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process applicant data. Please try again.";

const ACCEPTED_EXTENSIONS: &[&str] = &["csv", "json"];

/// File handed to the dashboard by the recruiter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_name: String,
    pub target_role: Option<String>,
}

impl UploadRequest {
    pub fn new(file_name: impl Into<String>, target_role: Option<String>) -> Self {
        Self {
            file_name: file_name.into(),
            target_role,
        }
    }

    /// Only file presence and the picker's extension filter are checked; content is ignored.
    fn accept(&self) -> Result<(), UploadError> {
        let name = self.file_name.trim();
        if name.is_empty() {
            return Err(UploadError::MissingFile);
        }

        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension {
            Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
            _ => Err(UploadError::UnsupportedFileType(name.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("no applicant file was provided")]
    MissingFile,
    #[error("'{0}' is not a CSV or JSON file")]
    UnsupportedFileType(String),
    #[error("applicant range {min}..={max} is empty")]
    EmptyApplicantRange { min: usize, max: usize },
}

/// Error raised by dashboard actions.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("no ranking result is loaded")]
    NoResult,
    #[error("an upload is already being processed")]
    UploadInProgress,
}

/// Lifecycle of the single live ranking result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DashboardPhase {
    #[default]
    Idle,
    Loading,
    Ready(RankingResult),
    Failed(String),
}

impl DashboardPhase {
    pub fn label(&self) -> PhaseLabel {
        match self {
            DashboardPhase::Idle => PhaseLabel::Idle,
            DashboardPhase::Loading => PhaseLabel::Loading,
            DashboardPhase::Ready(_) => PhaseLabel::Ready,
            DashboardPhase::Failed(_) => PhaseLabel::Error,
        }
    }
}

fn fail_pending(phase: &mut DashboardPhase) {
    if matches!(phase, DashboardPhase::Loading) {
        warn!("upload abandoned before completion");
        *phase = DashboardPhase::Failed(PROCESSING_FAILED_MESSAGE.to_string());
    }
}

/// Marks the phase failed if the upload is dropped mid-flight.
struct PendingUpload<'a> {
    phase: Option<&'a mut DashboardPhase>,
}

impl<'a> PendingUpload<'a> {
    fn arm(phase: &'a mut DashboardPhase) -> Self {
        Self { phase: Some(phase) }
    }

    fn disarm(mut self) {
        self.phase = None;
    }
}

impl Drop for PendingUpload<'_> {
    fn drop(&mut self) {
        if let Some(phase) = self.phase.take() {
            fail_pending(phase);
        }
    }
}

/// Owns the live ranking result and all transient dashboard state.
///
/// Mutating actions take `&mut self`; `begin_upload` refuses to start while another upload is
/// still `Loading`.
pub struct DashboardController<S> {
    store: Arc<S>,
    pipeline: RankingPipeline,
    rng: StdRng,
    config: DashboardConfig,
    phase: DashboardPhase,
    view: DashboardView,
    query: TableQuery,
    selected: Option<ApplicantId>,
    notifier: Notifier,
}

impl<S> DashboardController<S>
where
    S: SessionStore + 'static,
{
    pub fn new(store: Arc<S>, config: DashboardConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(store, config, rng)
    }

    pub fn with_rng(store: Arc<S>, config: DashboardConfig, rng: StdRng) -> Self {
        let pipeline = RankingPipeline::default().with_dropped_rows(config.dropped_rows);
        let notifier = Notifier::new(config.notice_duration);

        Self {
            store,
            pipeline,
            rng,
            config,
            phase: DashboardPhase::Idle,
            view: DashboardView::default(),
            query: TableQuery::default(),
            selected: None,
            notifier,
        }
    }

    /// Restore the saved session on mount. Corrupt data is treated as no session.
    pub fn restore(&mut self) -> Result<bool, DashboardError> {
        match self.store.load()? {
            Some(result) => {
                info!(
                    applicants = result.ranked_applicants.len(),
                    target_role = %result.target_role,
                    "session restored"
                );
                self.phase = DashboardPhase::Ready(result);
                self.notifier.show("Session restored from the last visit.");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Run a mock analysis for the uploaded file and persist the new result.
    ///
    /// Dropping the returned future before it resolves leaves the dashboard in
    /// `Failed`, never in `Loading`.
    pub async fn upload(
        &mut self,
        request: UploadRequest,
    ) -> Result<&RankingResult, DashboardError> {
        let delay = self.begin_upload()?;
        if !delay.is_zero() {
            let pending = PendingUpload::arm(&mut self.phase);
            tokio::time::sleep(delay).await;
            pending.disarm();
        }
        self.complete_upload(&request)
    }

    /// Enter `Loading` and return the simulated latency the caller must wait out
    /// before [`complete_upload`](Self::complete_upload). Rejects a second upload
    /// while one is in flight.
    pub fn begin_upload(&mut self) -> Result<Duration, DashboardError> {
        if matches!(self.phase, DashboardPhase::Loading) {
            return Err(DashboardError::UploadInProgress);
        }
        self.phase = DashboardPhase::Loading;
        self.selected = None;
        Ok(self.config.upload_delay)
    }

    /// Finish an upload started with [`begin_upload`](Self::begin_upload).
    pub fn complete_upload(
        &mut self,
        request: &UploadRequest,
    ) -> Result<&RankingResult, DashboardError> {
        match self.process(request) {
            Ok(result) => {
                info!(
                    file = %request.file_name,
                    applicants = result.ranked_applicants.len(),
                    total = result.stats.total,
                    target_role = %result.target_role,
                    "analysis complete"
                );
                self.view = DashboardView::Ranking;
                self.notifier.show("Analysis complete and session saved!");
                self.phase = DashboardPhase::Ready(result);
                self.result().ok_or(DashboardError::NoResult)
            }
            Err(err) => {
                warn!(file = %request.file_name, error = %err, "upload processing failed");
                self.phase = DashboardPhase::Failed(PROCESSING_FAILED_MESSAGE.to_string());
                Err(err)
            }
        }
    }

    /// Settle an upload whose completion will never run.
    pub fn abandon_upload(&mut self) {
        fail_pending(&mut self.phase);
    }

    fn process(&mut self, request: &UploadRequest) -> Result<RankingResult, DashboardError> {
        request.accept()?;

        let (min, max) = (self.config.min_applicants, self.config.max_applicants);
        if min == 0 || min > max {
            return Err(UploadError::EmptyApplicantRange { min, max }.into());
        }
        let count = self.rng.gen_range(min..=max);

        let result =
            self.pipeline
                .build_result(count, request.target_role.as_deref(), &mut self.rng);
        self.store.save(&result)?;
        Ok(result)
    }

    /// Re-persist the current result. Returns `false` when there is nothing to save.
    pub fn save(&mut self) -> Result<bool, DashboardError> {
        let DashboardPhase::Ready(result) = &self.phase else {
            return Ok(false);
        };
        self.store.save(result)?;
        info!(target_role = %result.target_role, "session saved");
        self.notifier.show("Current session saved successfully!");
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), DashboardError> {
        self.store.clear()?;
        self.phase = DashboardPhase::Idle;
        self.query.search.clear();
        self.query.status = StatusFilter::All;
        self.selected = None;
        info!("session cleared");
        self.notifier.show("Session cleared.");
        Ok(())
    }

    pub fn set_view(&mut self, view: DashboardView) {
        self.view = view;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.query.status = status;
    }

    /// Column header click.
    pub fn select_sort(&mut self, key: SortKey) {
        self.query.sort.select(key);
    }

    /// Set column and direction outright; repeating the call is idempotent.
    pub fn set_sort(&mut self, sort: TableSort) {
        self.query.sort = sort;
    }

    /// Row click. Unknown ids return `None` and leave the current selection untouched.
    pub fn select_applicant(&mut self, id: &ApplicantId) -> Option<&Applicant> {
        self.result()?.applicant(id)?;
        self.selected = Some(id.clone());
        self.selected_applicant()
    }

    pub fn close_details(&mut self) {
        self.selected = None;
    }

    pub fn selected_applicant(&self) -> Option<&Applicant> {
        let id = self.selected.as_ref()?;
        self.result()?.applicant(id)
    }

    pub fn selected_details(&self) -> Option<ApplicantDetailView<'_>> {
        self.selected_applicant().map(ApplicantDetailView::new)
    }

    pub fn result(&self) -> Option<&RankingResult> {
        match &self.phase {
            DashboardPhase::Ready(result) => Some(result),
            _ => None,
        }
    }

    pub fn phase(&self) -> &DashboardPhase {
        &self.phase
    }

    pub fn view(&self) -> DashboardView {
        self.view
    }

    pub fn query(&self) -> &TableQuery {
        &self.query
    }

    pub fn notification(&self) -> Option<Notice> {
        self.notifier.current()
    }

    /// Filtered and sorted rows for the ranking table.
    pub fn projection(&self) -> Option<TableProjection<'_>> {
        let result = self.result()?;
        let rows = project(&result.ranked_applicants, &self.query);
        Some(TableProjection::new(rows, result.ranked_applicants.len()))
    }

    /// CSV of the canonical rank order, independent of the active projection.
    pub fn export_csv(&self) -> Result<String, DashboardError> {
        let result = self.result().ok_or(DashboardError::NoResult)?;
        let csv = to_csv(&result.ranked_applicants)?;
        info!(rows = result.ranked_applicants.len(), "ranking exported");
        Ok(csv)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let result = self.result();
        let error = match &self.phase {
            DashboardPhase::Failed(message) => Some(message.clone()),
            _ => None,
        };

        DashboardSnapshot {
            phase: self.phase.label(),
            loading: matches!(self.phase, DashboardPhase::Loading),
            view: self.view,
            search: self.query.search.clone(),
            status_filter: self.query.status,
            sort: self.query.sort,
            notification: self.notifier.current(),
            error,
            target_role: result.map(|result| result.target_role.clone()),
            stat_cards: result
                .map(|result| stat_cards(&result.stats))
                .unwrap_or_default(),
            selected_applicant: self.selected.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::session::MemorySessionStore;
    use std::time::Duration;

    fn config() -> DashboardConfig {
        DashboardConfig {
            upload_delay: Duration::ZERO,
            seed: Some(17),
            ..DashboardConfig::default()
        }
    }

    fn controller() -> (DashboardController<MemorySessionStore>, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::default());
        (DashboardController::new(store.clone(), config()), store)
    }

    #[tokio::test]
    async fn upload_transitions_to_ready_and_persists() {
        let (mut controller, store) = controller();

        let result = controller
            .upload(UploadRequest::new("applicants.csv", Some("Data Analyst".to_string())))
            .await
            .expect("upload succeeds")
            .clone();

        assert!((50..=200).contains(&result.ranked_applicants.len()));
        assert_eq!(controller.phase().label(), PhaseLabel::Ready);
        assert_eq!(store.load().expect("load succeeds"), Some(result));
        assert_eq!(
            controller.notification().map(|notice| notice.message),
            Some("Analysis complete and session saved!".to_string())
        );
    }

    #[tokio::test]
    async fn rejected_file_discards_prior_result() {
        let (mut controller, _) = controller();
        controller
            .upload(UploadRequest::new("first.json", None))
            .await
            .expect("first upload succeeds");

        let err = controller
            .upload(UploadRequest::new("resume.pdf", None))
            .await
            .expect_err("pdf is rejected");

        assert!(matches!(
            err,
            DashboardError::Upload(UploadError::UnsupportedFileType(_))
        ));
        assert!(controller.result().is_none());
        assert_eq!(
            controller.snapshot().error.as_deref(),
            Some(PROCESSING_FAILED_MESSAGE)
        );
    }

    #[tokio::test]
    async fn missing_file_is_a_processing_failure() {
        let (mut controller, store) = controller();
        let err = controller
            .upload(UploadRequest::new("  ", None))
            .await
            .expect_err("missing file");
        assert!(matches!(err, DashboardError::Upload(UploadError::MissingFile)));
        assert!(store.raw().expect("slot readable").is_none());
    }

    #[tokio::test]
    async fn clear_resets_filters_and_store() {
        let (mut controller, store) = controller();
        controller
            .upload(UploadRequest::new("applicants.csv", None))
            .await
            .expect("upload succeeds");
        controller.set_search("react");
        controller.set_status_filter(StatusFilter::Only(
            crate::ranking::ApplicantStatus::Ranked,
        ));

        controller.clear().expect("clear succeeds");

        assert_eq!(controller.phase(), &DashboardPhase::Idle);
        assert_eq!(controller.query().search, "");
        assert_eq!(controller.query().status, StatusFilter::All);
        assert!(store.load().expect("load succeeds").is_none());
    }

    #[tokio::test]
    async fn save_without_result_is_a_no_op() {
        let (mut controller, _) = controller();
        assert!(!controller.save().expect("save succeeds"));
        assert!(controller.notification().is_none());
    }

    #[tokio::test]
    async fn restore_ignores_corrupt_sessions() {
        let store = Arc::new(MemorySessionStore::with_raw("{\"rankedApplicants\": 7"));
        let mut controller = DashboardController::new(store.clone(), config());

        assert!(!controller.restore().expect("restore succeeds"));
        assert_eq!(controller.phase(), &DashboardPhase::Idle);
        assert!(store.raw().expect("slot readable").is_none());
    }

    #[tokio::test]
    async fn export_requires_a_result() {
        let (controller, _) = controller();
        assert!(matches!(
            controller.export_csv(),
            Err(DashboardError::NoResult)
        ));
    }

    #[tokio::test]
    async fn selecting_unknown_applicant_keeps_selection_empty() {
        let (mut controller, _) = controller();
        controller
            .upload(UploadRequest::new("applicants.csv", None))
            .await
            .expect("upload succeeds");

        assert!(controller
            .select_applicant(&ApplicantId("applicant-9999".to_string()))
            .is_none());

        let first = ApplicantId("applicant-1".to_string());
        let selected = controller.select_applicant(&first).expect("applicant exists");
        assert_eq!(selected.id, first);
        let details = controller.selected_details().expect("details available");
        assert_eq!(details.breakdown.len(), 4);

        controller.close_details();
        assert!(controller.selected_applicant().is_none());
    }

    #[tokio::test]
    async fn empty_range_fails_without_panicking() {
        let store = Arc::new(MemorySessionStore::default());
        let mut controller = DashboardController::new(
            store,
            DashboardConfig {
                min_applicants: 10,
                max_applicants: 5,
                ..config()
            },
        );
        let err = controller
            .upload(UploadRequest::new("applicants.csv", None))
            .await
            .expect_err("empty range");
        assert!(matches!(
            err,
            DashboardError::Upload(UploadError::EmptyApplicantRange { min: 10, max: 5 })
        ));
    }

    struct FailingStore;

    impl SessionStore for FailingStore {
        fn save(&self, _result: &RankingResult) -> Result<(), SessionError> {
            Err(SessionError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "quota exceeded",
            )))
        }

        fn load(&self) -> Result<Option<RankingResult>, SessionError> {
            Ok(None)
        }

        fn clear(&self) -> Result<(), SessionError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn upload_dropped_during_latency_settles_as_failed() {
        let store = Arc::new(MemorySessionStore::default());
        let mut controller = DashboardController::new(
            store.clone(),
            DashboardConfig {
                seed: Some(3),
                ..DashboardConfig::default()
            },
        );

        let timed_out = tokio::time::timeout(
            Duration::from_millis(10),
            controller.upload(UploadRequest::new("applicants.csv", None)),
        )
        .await
        .is_err();
        assert!(timed_out);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(
            controller.phase(),
            &DashboardPhase::Failed(PROCESSING_FAILED_MESSAGE.to_string())
        );
        assert!(!controller.snapshot().loading);
        assert!(store.raw().expect("slot readable").is_none());

        controller
            .upload(UploadRequest::new("applicants.csv", None))
            .await
            .expect("a later upload still succeeds");
        assert_eq!(controller.phase().label(), PhaseLabel::Ready);
    }

    #[test]
    fn second_upload_is_refused_while_loading() {
        let (mut controller, _) = controller();
        controller.begin_upload().expect("first upload starts");
        assert!(controller.snapshot().loading);

        assert!(matches!(
            controller.begin_upload(),
            Err(DashboardError::UploadInProgress)
        ));

        controller.abandon_upload();
        assert_eq!(controller.phase().label(), PhaseLabel::Error);
        assert!(controller.begin_upload().is_ok());
    }

    #[tokio::test]
    async fn save_repersists_current_result() {
        let (mut controller, store) = controller();
        let uploaded = controller
            .upload(UploadRequest::new("applicants.csv", None))
            .await
            .expect("upload succeeds")
            .clone();
        store.clear().expect("clear succeeds");

        assert!(controller.save().expect("save succeeds"));
        assert_eq!(store.load().expect("load succeeds"), Some(uploaded));
        assert_eq!(
            controller.notification().map(|notice| notice.message),
            Some("Current session saved successfully!".to_string())
        );
        assert_eq!(controller.phase().label(), PhaseLabel::Ready);
    }

    #[tokio::test]
    async fn upload_returns_to_ranking_view() {
        let (mut controller, _) = controller();
        controller.set_view(DashboardView::Bias);

        controller
            .upload(UploadRequest::new("applicants.json", None))
            .await
            .expect("upload succeeds");

        assert_eq!(controller.view(), DashboardView::Ranking);
    }

    #[tokio::test]
    async fn store_failure_during_upload_discards_result() {
        let mut controller = DashboardController::new(Arc::new(FailingStore), config());

        let err = controller
            .upload(UploadRequest::new("applicants.csv", None))
            .await
            .expect_err("store rejects the save");

        assert!(matches!(err, DashboardError::Session(SessionError::Io(_))));
        assert!(controller.result().is_none());
        assert_eq!(
            controller.phase(),
            &DashboardPhase::Failed(PROCESSING_FAILED_MESSAGE.to_string())
        );
    }

    #[test]
    fn set_sort_is_idempotent() {
        let (mut controller, _) = controller();
        let sort = TableSort {
            key: SortKey::Score,
            direction: crate::ranking::SortDirection::Desc,
        };

        controller.set_sort(sort);
        controller.set_sort(sort);
        assert_eq!(controller.query().sort, sort);
    }
}
