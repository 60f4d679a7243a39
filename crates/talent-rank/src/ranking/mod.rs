//! Applicant ranking: mock generation, ranking, session persistence, table projection,
//! CSV export, and the dashboard controller that ties them together.

pub mod controller;
pub mod domain;
pub mod export;
pub mod generator;
pub mod notice;
pub mod pipeline;
pub mod session;
pub mod table;
pub mod views;

pub use controller::{
    DashboardController, DashboardError, DashboardPhase, UploadError, UploadRequest,
    PROCESSING_FAILED_MESSAGE,
};
pub use domain::{
    Applicant, ApplicantId, ApplicantStatus, BiasHighlights, BiasReport, DistributionEntry,
    RankingResult, RankingStats, ScoreBreakdown, DEFAULT_TARGET_ROLE,
};
pub use export::{to_csv, write_csv, ExportError, EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME};
pub use generator::ApplicantGenerator;
pub use notice::{Notice, Notifier};
pub use pipeline::{rank_applicants, RankingPipeline};
pub use session::{FileSessionStore, MemorySessionStore, SessionError, SessionStore, SESSION_KEY};
pub use table::{project, SortDirection, SortKey, StatusFilter, TableQuery, TableSort};
pub use views::{
    stat_cards, ApplicantDetailView, BiasReportView, DashboardSnapshot, DashboardView, PhaseLabel,
    StatCard, TableProjection,
};
