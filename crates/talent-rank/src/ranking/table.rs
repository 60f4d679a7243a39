use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::{Applicant, ApplicantStatus};

/// Status dropdown selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApplicantStatus),
}

impl StatusFilter {
    pub fn matches(self, status: ApplicantStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(expected) => expected == status,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(status) => status.label(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        ApplicantStatus::parse(trimmed)
            .map(StatusFilter::Only)
            .ok_or_else(|| format!("unknown status filter '{raw}'"))
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for StatusFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for StatusFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Sortable table columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Rank,
    Name,
    Score,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rank" => Ok(SortKey::Rank),
            "name" => Ok(SortKey::Name),
            "score" => Ok(SortKey::Score),
            _ => Err(format!("unknown sort column '{raw}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(format!("unknown sort direction '{raw}'")),
        }
    }
}

impl SortDirection {
    pub const fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSort {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl TableSort {
    /// Column header click: toggle on the active key, otherwise switch key and reset to ascending.
    pub fn select(&mut self, key: SortKey) {
        if key == self.key {
            self.direction = self.direction.toggled();
        } else {
            self.key = key;
            self.direction = SortDirection::Asc;
        }
    }

    fn compare(&self, a: &Applicant, b: &Applicant) -> Ordering {
        let ordering = match self.key {
            SortKey::Rank => a.rank.cmp(&b.rank),
            SortKey::Score => a.score.cmp(&b.score),
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Inputs that drive the ranking table projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableQuery {
    pub search: String,
    pub status: StatusFilter,
    pub sort: TableSort,
}

impl TableQuery {
    pub fn matches(&self, applicant: &Applicant) -> bool {
        if !self.status.matches(applicant.status) {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }

        let needle = self.search.to_lowercase();
        applicant.name.to_lowercase().contains(&needle)
            || applicant.email.to_lowercase().contains(&needle)
            || applicant
                .skills
                .iter()
                .any(|skill| skill.to_lowercase().contains(&needle))
    }
}

/// Filter then stably sort the canonical ranked list for display.
pub fn project<'a>(applicants: &'a [Applicant], query: &TableQuery) -> Vec<&'a Applicant> {
    let mut rows: Vec<&Applicant> = applicants
        .iter()
        .filter(|applicant| query.matches(applicant))
        .collect();
    rows.sort_by(|a, b| query.sort.compare(a, b));
    rows
}
