use std::cmp::Ordering;

use rand::Rng;
use tracing::debug;

use super::domain::{
    Applicant, ApplicantStatus, BiasReport, DistributionEntry, RankingResult, RankingStats,
    DEFAULT_TARGET_ROLE,
};
use super::generator::ApplicantGenerator;

const REGIONS: &[&str] = &["Lagos", "Abuja", "Rivers", "Kano", "Oyo", "Enugu"];
const REGION_RANGE: (u32, u32) = (5, 25);

const VALIDATION_LOG: &[&str] = &[
    "Row 15: Missing email, applicant skipped.",
    "Row 42: Non-UTF8 character detected in resume, sanitized.",
    "Row 98: Duplicate phone number found for applicant 'Jide Balogun', flagged for review.",
];

/// Sort by score descending with name as the tie-break, then assign dense 1-based ranks.
pub fn rank_applicants(mut applicants: Vec<Applicant>) -> Vec<Applicant> {
    applicants.sort_by(compare_for_ranking);
    for (index, applicant) in applicants.iter_mut().enumerate() {
        applicant.rank = index as u32 + 1;
    }
    applicants
}

fn compare_for_ranking(a: &Applicant, b: &Applicant) -> Ordering {
    b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name))
}

/// Composes the generator, ranking, and report assembly into one result bundle.
#[derive(Debug, Clone, Default)]
pub struct RankingPipeline {
    generator: ApplicantGenerator,
    dropped_rows: Option<u32>,
}

impl RankingPipeline {
    pub fn new(generator: ApplicantGenerator) -> Self {
        Self {
            generator,
            dropped_rows: None,
        }
    }

    /// Override the number of rows reported as dropped during validation.
    ///
    /// Without an override the count follows the validation log length.
    pub fn with_dropped_rows(mut self, dropped_rows: Option<u32>) -> Self {
        self.dropped_rows = dropped_rows;
        self
    }

    pub fn build_result<R: Rng + ?Sized>(
        &self,
        count: usize,
        target_role: Option<&str>,
        rng: &mut R,
    ) -> RankingResult {
        let applicants = rank_applicants(self.generator.generate(count, rng));
        let validation_errors = validation_log();
        let dropped_rows = self
            .dropped_rows
            .unwrap_or(validation_errors.len() as u32);

        let stats = summarize(&applicants, count as u32 + dropped_rows);
        let bias_report = bias_report(&applicants, count as u32, rng);

        // Blank roles fall back; anything else is kept exactly as typed.
        let target_role = target_role
            .filter(|role| !role.trim().is_empty())
            .unwrap_or(DEFAULT_TARGET_ROLE)
            .to_string();

        debug!(
            count,
            ranked = stats.ranked,
            for_review = stats.for_review,
            %target_role,
            "ranking result assembled"
        );

        RankingResult {
            ranked_applicants: applicants,
            validation_errors,
            bias_report,
            stats,
            target_role,
        }
    }
}

fn validation_log() -> Vec<String> {
    VALIDATION_LOG.iter().map(|line| line.to_string()).collect()
}

fn summarize(applicants: &[Applicant], total: u32) -> RankingStats {
    let ranked = applicants
        .iter()
        .filter(|applicant| applicant.status == ApplicantStatus::Ranked)
        .count() as u32;
    let for_review = applicants
        .iter()
        .filter(|applicant| applicant.status == ApplicantStatus::ForReview)
        .count() as u32;

    RankingStats {
        total,
        ranked,
        for_review,
    }
}

fn bias_report<R: Rng + ?Sized>(applicants: &[Applicant], count: u32, rng: &mut R) -> BiasReport {
    let gender = vec![
        DistributionEntry::new("Male", count * 55 / 100),
        DistributionEntry::new("Female", count * 45 / 100),
    ];

    let region = REGIONS
        .iter()
        .map(|name| DistributionEntry::new(*name, rng.gen_range(REGION_RANGE.0..=REGION_RANGE.1)))
        .collect();

    let mut education: Vec<DistributionEntry> = Vec::new();
    for applicant in applicants {
        match education
            .iter_mut()
            .find(|entry| entry.name == applicant.education)
        {
            Some(entry) => entry.value += 1,
            None => education.push(DistributionEntry::new(applicant.education.clone(), 1)),
        }
    }

    BiasReport {
        gender,
        region,
        education,
    }
}
