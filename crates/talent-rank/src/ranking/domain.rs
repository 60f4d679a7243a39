use serde::{Deserialize, Serialize};

/// Role label used when an upload does not name a target role.
pub const DEFAULT_TARGET_ROLE: &str = "General Application Pool";

/// Identifier wrapper for generated applicants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

impl ApplicantId {
    pub fn for_index(index: usize) -> Self {
        Self(format!("applicant-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Review status assigned at generation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicantStatus {
    #[serde(rename = "Ranked")]
    Ranked,
    #[serde(rename = "For Review")]
    ForReview,
}

impl ApplicantStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicantStatus::Ranked => "Ranked",
            ApplicantStatus::ForReview => "For Review",
        }
    }

    /// Accepts both the display label and the snake-case form used in query strings.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ranked" => Some(Self::Ranked),
            "for review" | "for_review" | "forreview" | "review" => Some(Self::ForReview),
            _ => None,
        }
    }
}

/// Per-dimension contribution to an applicant's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skills: u32,
    pub experience: u32,
    pub education: u32,
    pub extra: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.skills + self.experience + self.education + self.extra
    }

    /// Labelled components in display order.
    pub fn components(&self) -> [(&'static str, u32); 4] {
        [
            ("Skills", self.skills),
            ("Experience", self.experience),
            ("Education", self.education),
            ("Extra", self.extra),
        ]
    }
}

/// One candidate row in a ranking run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub id: ApplicantId,
    pub rank: u32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub score: u8,
    pub status: ApplicantStatus,
    pub skills: Vec<String>,
    pub education: String,
    pub experience_summary: String,
    pub score_breakdown: ScoreBreakdown,
    pub resume_summary: String,
}

/// A named count inside a bias distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub name: String,
    pub value: u32,
}

impl DistributionEntry {
    pub fn new(name: impl Into<String>, value: u32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Category distributions surfaced by the bias & fairness view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiasReport {
    pub gender: Vec<DistributionEntry>,
    pub region: Vec<DistributionEntry>,
    pub education: Vec<DistributionEntry>,
}

/// Headline observations shown above the bias charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiasHighlights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_gender_share_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_region: Option<String>,
}

impl BiasReport {
    pub fn highlights(&self) -> BiasHighlights {
        let gender_total: u32 = self.gender.iter().map(|entry| entry.value).sum();
        let top_gender = top_entry(&self.gender);
        let top_gender_share_pct = top_gender.filter(|_| gender_total > 0).map(|entry| {
            let share = f64::from(entry.value) / f64::from(gender_total) * 100.0;
            (share * 10.0).round() / 10.0
        });

        BiasHighlights {
            top_gender: top_gender.map(|entry| entry.name.clone()),
            top_gender_share_pct,
            top_region: top_entry(&self.region).map(|entry| entry.name.clone()),
        }
    }
}

// First maximum wins so ties resolve to the earliest bucket.
fn top_entry(entries: &[DistributionEntry]) -> Option<&DistributionEntry> {
    entries.iter().fold(None, |best, entry| match best {
        Some(current) if current.value >= entry.value => Some(current),
        _ => Some(entry),
    })
}

/// Headline counts for the stat cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingStats {
    pub total: u32,
    pub ranked: u32,
    pub for_review: u32,
}

/// The persisted unit of dashboard state: one complete ranking run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResult {
    pub ranked_applicants: Vec<Applicant>,
    pub validation_errors: Vec<String>,
    pub bias_report: BiasReport,
    pub stats: RankingStats,
    pub target_role: String,
}

impl RankingResult {
    pub fn applicant(&self, id: &ApplicantId) -> Option<&Applicant> {
        self.ranked_applicants
            .iter()
            .find(|applicant| &applicant.id == id)
    }
}
