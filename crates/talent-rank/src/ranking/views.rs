use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::{
    Applicant, ApplicantId, BiasHighlights, BiasReport, RankingResult, RankingStats,
};
use super::notice::Notice;
use super::table::{StatusFilter, TableSort};

/// Dashboard tab selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardView {
    #[default]
    Ranking,
    Bias,
    Validation,
}

impl DashboardView {
    pub const fn label(self) -> &'static str {
        match self {
            DashboardView::Ranking => "Ranking",
            DashboardView::Bias => "Bias Report",
            DashboardView::Validation => "Validation Log",
        }
    }
}

impl FromStr for DashboardView {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ranking" => Ok(DashboardView::Ranking),
            "bias" => Ok(DashboardView::Bias),
            "validation" => Ok(DashboardView::Validation),
            _ => Err(format!("unknown dashboard view '{raw}'")),
        }
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse controller state exposed to the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseLabel {
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: u32,
}

pub fn stat_cards(stats: &RankingStats) -> Vec<StatCard> {
    vec![
        StatCard {
            title: "Total Applicants",
            value: stats.total,
        },
        StatCard {
            title: "Successfully Ranked",
            value: stats.ranked,
        },
        StatCard {
            title: "Flagged for Review",
            value: stats.for_review,
        },
    ]
}

/// Serializable view of everything the dashboard renders outside the table body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub phase: PhaseLabel,
    pub loading: bool,
    pub view: DashboardView,
    pub search: String,
    pub status_filter: StatusFilter,
    pub sort: TableSort,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stat_cards: Vec<StatCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_applicant: Option<ApplicantId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreComponentView {
    pub name: &'static str,
    pub value: u32,
}

/// Detail panel content for one applicant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantDetailView<'a> {
    #[serde(flatten)]
    pub applicant: &'a Applicant,
    pub status_label: &'static str,
    pub breakdown: Vec<ScoreComponentView>,
}

impl<'a> ApplicantDetailView<'a> {
    pub fn new(applicant: &'a Applicant) -> Self {
        let breakdown = applicant
            .score_breakdown
            .components()
            .into_iter()
            .map(|(name, value)| ScoreComponentView { name, value })
            .collect();

        Self {
            applicant,
            status_label: applicant.status.label(),
            breakdown,
        }
    }
}

/// Rows currently rendered in the ranking table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableProjection<'a> {
    pub rows: Vec<&'a Applicant>,
    pub total_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

impl<'a> TableProjection<'a> {
    pub fn new(rows: Vec<&'a Applicant>, total_rows: usize) -> Self {
        let empty_message = rows
            .is_empty()
            .then_some("No Applicants Found: your search or filter criteria did not match any applicants.");
        Self {
            rows,
            total_rows,
            empty_message,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiasReportView<'a> {
    pub target_role: &'a str,
    pub report: &'a BiasReport,
    pub highlights: BiasHighlights,
}

impl<'a> BiasReportView<'a> {
    pub fn new(result: &'a RankingResult) -> Self {
        Self {
            target_role: &result.target_role,
            report: &result.bias_report,
            highlights: result.bias_report.highlights(),
        }
    }
}
