use crate::infra::{AppState, SharedDashboard};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use talent_rank::error::AppError;
use talent_rank::ranking::{
    stat_cards, ApplicantId, BiasReportView, DashboardError, DashboardView, RankingResult,
    RankingStats, SessionStore, SortDirection, SortKey, StatCard, StatusFilter, TableSort,
    UploadRequest, EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadPayload {
    pub(crate) file_name: String,
    #[serde(default)]
    pub(crate) target_role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApplicantsQuery {
    #[serde(default)]
    pub(crate) search: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) sort: Option<String>,
    #[serde(default)]
    pub(crate) dir: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SortPayload {
    pub(crate) key: SortKey,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ViewPayload {
    pub(crate) view: DashboardView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RankingSummary {
    pub(crate) target_role: String,
    pub(crate) applicants: usize,
    pub(crate) stats: RankingStats,
    pub(crate) stat_cards: Vec<StatCard>,
    pub(crate) validation_errors: usize,
}

impl RankingSummary {
    fn from_result(result: &RankingResult) -> Self {
        Self {
            target_role: result.target_role.clone(),
            applicants: result.ranked_applicants.len(),
            stats: result.stats,
            stat_cards: stat_cards(&result.stats),
            validation_errors: result.validation_errors.len(),
        }
    }
}

/// Router exposing the dashboard controller over HTTP.
pub(crate) fn dashboard_router<S>(dashboard: SharedDashboard<S>) -> Router
where
    S: SessionStore + 'static,
{
    Router::new()
        .route("/api/v1/rankings", post(upload_handler::<S>))
        .route("/api/v1/rankings/applicants", get(applicants_handler::<S>))
        .route("/api/v1/rankings/sort", post(sort_column_handler::<S>))
        .route(
            "/api/v1/rankings/applicants/:applicant_id",
            get(applicant_detail_handler::<S>),
        )
        .route("/api/v1/rankings/bias", get(bias_handler::<S>))
        .route("/api/v1/rankings/validation", get(validation_handler::<S>))
        .route("/api/v1/rankings/export", get(export_handler::<S>))
        .route("/api/v1/dashboard", get(snapshot_handler::<S>))
        .route("/api/v1/dashboard/view", put(view_handler::<S>))
        .route("/api/v1/session/save", post(save_handler::<S>))
        .route("/api/v1/session", delete(clear_handler::<S>))
        .with_state(dashboard)
}

pub(crate) fn with_dashboard_routes<S>(dashboard: SharedDashboard<S>) -> Router
where
    S: SessionStore + 'static,
{
    dashboard_router(dashboard)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn no_result() -> Response {
    AppError::from(DashboardError::NoResult).into_response()
}

pub(crate) async fn upload_handler<S>(
    State(dashboard): State<SharedDashboard<S>>,
    Json(payload): Json<UploadPayload>,
) -> Result<Response, AppError>
where
    S: SessionStore + 'static,
{
    let delay = dashboard.lock().await.begin_upload()?;
    let request = UploadRequest::new(payload.file_name, payload.target_role);

    // Lock is held only to begin and complete; a dropped request still settles the upload.
    let task = tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut controller = dashboard.lock().await;
        let summary = controller
            .complete_upload(&request)
            .map(RankingSummary::from_result);
        summary
    });

    let summary = task
        .await
        .map_err(|err| AppError::Server(axum::Error::new(err)))??;
    Ok((StatusCode::CREATED, Json(summary)).into_response())
}

fn parse_param<T>(raw: Option<&str>) -> Result<Option<T>, Response>
where
    T: std::str::FromStr<Err = String>,
{
    raw.map(str::parse::<T>).transpose().map_err(bad_request)
}

/// Filtered rows. `sort`/`dir` set the order outright, so repeated reads return the same page.
pub(crate) async fn applicants_handler<S>(
    State(dashboard): State<SharedDashboard<S>>,
    Query(params): Query<ApplicantsQuery>,
) -> Response
where
    S: SessionStore + 'static,
{
    let status = match parse_param::<StatusFilter>(params.status.as_deref()) {
        Ok(status) => status,
        Err(response) => return response,
    };
    let key = match parse_param::<SortKey>(params.sort.as_deref()) {
        Ok(key) => key,
        Err(response) => return response,
    };
    let direction = match parse_param::<SortDirection>(params.dir.as_deref()) {
        Ok(direction) => direction,
        Err(response) => return response,
    };

    let mut controller = dashboard.lock().await;
    if let Some(search) = params.search {
        controller.set_search(search);
    }
    if let Some(status) = status {
        controller.set_status_filter(status);
    }
    if key.is_some() || direction.is_some() {
        let current = controller.query().sort;
        controller.set_sort(TableSort {
            key: key.unwrap_or(current.key),
            direction: direction.unwrap_or(SortDirection::Asc),
        });
    }

    match controller.projection() {
        Some(projection) => Json(projection).into_response(),
        None => no_result(),
    }
}

/// Column header click: toggles direction on the active column.
pub(crate) async fn sort_column_handler<S>(
    State(dashboard): State<SharedDashboard<S>>,
    Json(payload): Json<SortPayload>,
) -> Response
where
    S: SessionStore + 'static,
{
    let mut controller = dashboard.lock().await;
    controller.select_sort(payload.key);
    match controller.projection() {
        Some(projection) => Json(projection).into_response(),
        None => no_result(),
    }
}

pub(crate) async fn applicant_detail_handler<S>(
    State(dashboard): State<SharedDashboard<S>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    let mut controller = dashboard.lock().await;
    if controller.result().is_none() {
        return no_result();
    }

    let id = ApplicantId(applicant_id);
    if controller.select_applicant(&id).is_none() {
        let payload = json!({ "error": format!("applicant '{}' not found", id.as_str()) });
        return (StatusCode::NOT_FOUND, Json(payload)).into_response();
    }

    match controller.selected_details() {
        Some(details) => Json(details).into_response(),
        None => no_result(),
    }
}

pub(crate) async fn bias_handler<S>(State(dashboard): State<SharedDashboard<S>>) -> Response
where
    S: SessionStore + 'static,
{
    let controller = dashboard.lock().await;
    match controller.result() {
        Some(result) => Json(BiasReportView::new(result)).into_response(),
        None => no_result(),
    }
}

pub(crate) async fn validation_handler<S>(State(dashboard): State<SharedDashboard<S>>) -> Response
where
    S: SessionStore + 'static,
{
    let controller = dashboard.lock().await;
    match controller.result() {
        Some(result) => Json(json!({
            "validationErrors": result.validation_errors,
            "stats": result.stats,
        }))
        .into_response(),
        None => no_result(),
    }
}

pub(crate) async fn export_handler<S>(
    State(dashboard): State<SharedDashboard<S>>,
) -> Result<Response, AppError>
where
    S: SessionStore + 'static,
{
    let csv = dashboard.lock().await.export_csv()?;
    let disposition = format!("attachment; filename=\"{EXPORT_FILE_NAME}\"");
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, EXPORT_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

pub(crate) async fn snapshot_handler<S>(State(dashboard): State<SharedDashboard<S>>) -> Response
where
    S: SessionStore + 'static,
{
    let controller = dashboard.lock().await;
    Json(controller.snapshot()).into_response()
}

pub(crate) async fn view_handler<S>(
    State(dashboard): State<SharedDashboard<S>>,
    Json(payload): Json<ViewPayload>,
) -> Response
where
    S: SessionStore + 'static,
{
    let mut controller = dashboard.lock().await;
    controller.set_view(payload.view);
    Json(controller.snapshot()).into_response()
}

pub(crate) async fn save_handler<S>(
    State(dashboard): State<SharedDashboard<S>>,
) -> Result<Response, AppError>
where
    S: SessionStore + 'static,
{
    let saved = dashboard.lock().await.save()?;
    Ok(Json(json!({ "saved": saved })).into_response())
}

pub(crate) async fn clear_handler<S>(
    State(dashboard): State<SharedDashboard<S>>,
) -> Result<Response, AppError>
where
    S: SessionStore + 'static,
{
    let mut controller = dashboard.lock().await;
    controller.clear()?;
    Ok(Json(controller.snapshot()).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::shared;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;
    use talent_rank::config::DashboardConfig;
    use talent_rank::ranking::{DashboardController, MemorySessionStore};
    use tower::ServiceExt;

    fn router() -> (Router, Arc<MemorySessionStore>) {
        router_with_delay(Duration::ZERO)
    }

    fn router_with_delay(upload_delay: Duration) -> (Router, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::default());
        let config = DashboardConfig {
            upload_delay,
            seed: Some(2024),
            ..DashboardConfig::default()
        };
        let controller = DashboardController::new(store.clone(), config);
        (dashboard_router(shared(controller)), store)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    async fn upload(router: &Router, file_name: &str) -> Response {
        router
            .clone()
            .oneshot(
                Request::post("/api/v1/rankings")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "fileName": file_name, "targetRole": "Data Scientist" })
                            .to_string(),
                    ))
                    .expect("request builds"),
            )
            .await
            .expect("router responds")
    }

    async fn get(router: &Router, uri: &str) -> Response {
        router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds")
    }

    #[tokio::test]
    async fn upload_route_returns_summary_and_persists() {
        let (router, store) = router();

        let response = upload(&router, "applicants.csv").await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["targetRole"], "Data Scientist");
        let applicants = body["applicants"].as_u64().expect("count");
        assert_eq!(body["stats"]["total"].as_u64(), Some(applicants + 3));
        assert!(store.raw().expect("slot readable").is_some());
    }

    #[tokio::test]
    async fn upload_route_rejects_unsupported_files() {
        let (router, _) = router();
        let response = upload(&router, "resume.docx").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let snapshot = body_json(get(&router, "/api/v1/dashboard").await).await;
        assert_eq!(snapshot["phase"], "error");
        assert_eq!(
            snapshot["error"],
            "Failed to process applicant data. Please try again."
        );
    }

    #[tokio::test]
    async fn result_routes_return_not_found_before_upload() {
        let (router, _) = router();
        for uri in [
            "/api/v1/rankings/applicants",
            "/api/v1/rankings/bias",
            "/api/v1/rankings/validation",
            "/api/v1/rankings/export",
        ] {
            let response = get(&router, uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn applicants_route_applies_filters() {
        let (router, _) = router();
        upload(&router, "applicants.json").await;

        let response = get(&router, "/api/v1/rankings/applicants?status=for_review&sort=score").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let rows = body["rows"].as_array().expect("rows");
        assert!(rows.iter().all(|row| row["status"] == "For Review"));
        let scores: Vec<u64> = rows
            .iter()
            .map(|row| row["score"].as_u64().expect("score"))
            .collect();
        assert!(scores.windows(2).all(|pair| pair[0] <= pair[1]));

        let bad = get(&router, "/api/v1/rankings/applicants?status=archived").await;
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn export_route_serves_csv_attachment() {
        let (router, _) = router();
        upload(&router, "applicants.csv").await;

        let response = get(&router, "/api/v1/rankings/export").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"applicant_ranking.csv\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let text = String::from_utf8(bytes.to_vec()).expect("utf-8 csv");
        assert!(text.starts_with("Rank,Name,Email,Phone,Score,Status,Skills\n1,"));
    }

    #[tokio::test]
    async fn applicant_detail_route_selects_rows() {
        let (router, _) = router();
        upload(&router, "applicants.csv").await;

        let response = get(&router, "/api/v1/rankings/applicants/applicant-1").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], "applicant-1");
        assert_eq!(body["breakdown"].as_array().map(Vec::len), Some(4));

        let snapshot = body_json(get(&router, "/api/v1/dashboard").await).await;
        assert_eq!(snapshot["selectedApplicant"], "applicant-1");

        let missing = get(&router, "/api/v1/rankings/applicants/applicant-0").await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn clear_route_resets_dashboard() {
        let (router, store) = router();
        upload(&router, "applicants.csv").await;

        let response = router
            .clone()
            .oneshot(
                Request::delete("/api/v1/session")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["phase"], "idle");
        assert_eq!(body["notification"]["message"], "Session cleared.");
        assert!(store.raw().expect("slot readable").is_none());
    }

    #[tokio::test]
    async fn view_route_switches_tabs() {
        let (router, _) = router();
        let response = router
            .clone()
            .oneshot(
                Request::put("/api/v1/dashboard/view")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "view": "validation" }).to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        let body = body_json(response).await;
        assert_eq!(body["view"], "validation");
    }

    fn scores(body: &Value) -> Vec<u64> {
        body["rows"]
            .as_array()
            .expect("rows")
            .iter()
            .map(|row| row["score"].as_u64().expect("score"))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn dashboard_reports_loading_while_upload_runs() {
        let (router, _) = router_with_delay(Duration::from_millis(1500));

        let in_flight = {
            let router = router.clone();
            tokio::spawn(async move { upload(&router, "applicants.csv").await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;

        let snapshot = tokio::time::timeout(
            Duration::from_millis(500),
            get(&router, "/api/v1/dashboard"),
        )
        .await
        .expect("snapshot is not blocked by the upload");
        let snapshot = body_json(snapshot).await;
        assert_eq!(snapshot["phase"], "loading");
        assert_eq!(snapshot["loading"], true);

        let second = upload(&router, "again.csv").await;
        assert_eq!(second.status(), StatusCode::CONFLICT);

        let first = in_flight.await.expect("upload task joins");
        assert_eq!(first.status(), StatusCode::CREATED);
        let snapshot = body_json(get(&router, "/api/v1/dashboard").await).await;
        assert_eq!(snapshot["phase"], "ready");
        assert_eq!(snapshot["loading"], false);
    }

    #[tokio::test]
    async fn sort_query_is_repeatable_and_column_click_toggles() {
        let (router, _) = router();
        upload(&router, "applicants.csv").await;

        let uri = "/api/v1/rankings/applicants?sort=score&dir=desc";
        let first = body_json(get(&router, uri).await).await;
        let second = body_json(get(&router, uri).await).await;
        assert_eq!(scores(&first), scores(&second));
        assert!(scores(&first).windows(2).all(|pair| pair[0] >= pair[1]));

        let clicked = router
            .clone()
            .oneshot(
                Request::post("/api/v1/rankings/sort")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "key": "score" }).to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        let clicked = body_json(clicked).await;
        assert!(scores(&clicked).windows(2).all(|pair| pair[0] <= pair[1]));

        let bad = get(&router, "/api/v1/rankings/applicants?dir=sideways").await;
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    }
}
