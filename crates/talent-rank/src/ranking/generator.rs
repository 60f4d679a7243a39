use rand::Rng;

use super::domain::{Applicant, ApplicantId, ApplicantStatus, ScoreBreakdown};

const FIRST_NAMES: &[&str] = &[
    "Adebayo", "Chiamaka", "Damilola", "Emeka", "Fatima", "Gbenga", "Habiba", "Ifeanyi", "Jide",
    "Kemi",
];

const LAST_NAMES: &[&str] = &[
    "Okafor",
    "Adewale",
    "Eze",
    "Balogun",
    "Ibrahim",
    "Nwachukwu",
    "Abiodun",
    "Okoro",
    "Suleiman",
    "Adekunle",
];

const SKILLS: &[&str] = &[
    "Python Developer",
    "Data Science",
    "React",
    "Node.js",
    "DevOps",
    "Project Management",
    "UI/UX Design",
    "Machine Learning",
    "Cybersecurity",
    "Cloud Computing",
];

const EDUCATION_LEVELS: &[&str] = &[
    "B.Sc Computer Science",
    "M.Sc Data Analytics",
    "HND Electrical Engineering",
    "Ph.D. in AI",
    "B.Eng Mechanical Engineering",
    "Self-taught",
];

const RESUME_SUMMARY: &str = "Experienced professional with a demonstrated history of working in the information technology and services industry. Skilled in various technologies and methodologies.";

const SCORE_RANGE: (u8, u8) = (65, 98);
const REVIEW_THRESHOLD: u8 = 70;
const RANDOM_REVIEW_PROBABILITY: f64 = 0.1;
const JITTER: f64 = 0.1;

/// Fixed vocabularies the generator samples applicant details from.
#[derive(Debug, Clone)]
pub struct ApplicantGenerator {
    first_names: &'static [&'static str],
    last_names: &'static [&'static str],
    skills: &'static [&'static str],
    education_levels: &'static [&'static str],
}

impl Default for ApplicantGenerator {
    fn default() -> Self {
        Self::standard()
    }
}

impl ApplicantGenerator {
    pub fn standard() -> Self {
        Self {
            first_names: FIRST_NAMES,
            last_names: LAST_NAMES,
            skills: SKILLS,
            education_levels: EDUCATION_LEVELS,
        }
    }

    pub fn education_levels(&self) -> &'static [&'static str] {
        self.education_levels
    }

    /// Produce `count` unranked applicants with ids `applicant-1..=applicant-count`.
    pub fn generate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Applicant> {
        (1..=count).map(|index| self.applicant(index, rng)).collect()
    }

    fn applicant<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> Applicant {
        let score = rng.gen_range(SCORE_RANGE.0..=SCORE_RANGE.1);
        let status = if score < REVIEW_THRESHOLD || rng.gen_bool(RANDOM_REVIEW_PROBABILITY) {
            ApplicantStatus::ForReview
        } else {
            ApplicantStatus::Ranked
        };

        let score_breakdown = ScoreBreakdown {
            skills: weighted(score, 0.4, rng),
            experience: weighted(score, 0.25, rng),
            education: weighted(score, 0.25, rng),
            extra: weighted(score, 0.1, rng),
        };

        let name = format!(
            "{} {}",
            pick(self.first_names, rng),
            pick(self.last_names, rng)
        );

        let draws = rng.gen_range(3..=5);
        let mut skills: Vec<String> = Vec::with_capacity(draws);
        for _ in 0..draws {
            let skill = pick(self.skills, rng);
            if !skills.iter().any(|existing| existing == skill) {
                skills.push(skill.to_string());
            }
        }

        let years = rng.gen_range(2..=8);

        Applicant {
            id: ApplicantId::for_index(index),
            rank: 0,
            name,
            email: format!("applicant{index}@example.com"),
            phone: format!("080{}", rng.gen_range(10_000_000..=99_999_999u32)),
            score,
            status,
            skills,
            education: pick(self.education_levels, rng).to_string(),
            experience_summary: format!("{years} years of experience in various roles."),
            score_breakdown,
            resume_summary: RESUME_SUMMARY.to_string(),
        }
    }
}

fn weighted<R: Rng + ?Sized>(score: u8, weight: f64, rng: &mut R) -> u32 {
    let jitter = rng.gen_range(-JITTER..JITTER);
    let value = f64::from(score) * weight * (1.0 + jitter);
    value.round().max(0.0) as u32
}

fn pick<R: Rng + ?Sized>(values: &'static [&'static str], rng: &mut R) -> &'static str {
    values[rng.gen_range(0..values.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn generated(count: usize, seed: u64) -> Vec<Applicant> {
        let mut rng = StdRng::seed_from_u64(seed);
        ApplicantGenerator::standard().generate(count, &mut rng)
    }

    #[test]
    fn generates_requested_count_with_sequential_ids() {
        let applicants = generated(25, 7);
        assert_eq!(applicants.len(), 25);
        assert_eq!(applicants[0].id.as_str(), "applicant-1");
        assert_eq!(applicants[24].email, "applicant25@example.com");
        assert!(applicants.iter().all(|applicant| applicant.rank == 0));
    }

    #[test]
    fn scores_and_statuses_follow_review_policy() {
        for applicant in generated(300, 11) {
            assert!((65..=98).contains(&applicant.score));
            if applicant.score < 70 {
                assert_eq!(applicant.status, ApplicantStatus::ForReview);
            }
        }
    }

    #[test]
    fn skills_are_deduplicated_and_bounded() {
        for applicant in generated(200, 3) {
            let unique: HashSet<&String> = applicant.skills.iter().collect();
            assert_eq!(unique.len(), applicant.skills.len());
            assert!((1..=5).contains(&applicant.skills.len()));
            assert!(applicant
                .skills
                .iter()
                .all(|skill| SKILLS.contains(&skill.as_str())));
        }
    }

    #[test]
    fn breakdown_stays_near_weighted_score() {
        for applicant in generated(200, 5) {
            let score = f64::from(applicant.score);
            let skills = f64::from(applicant.score_breakdown.skills);
            assert!(skills >= (score * 0.4 * 0.9).floor() && skills <= (score * 0.4 * 1.1).ceil());
            let extra = f64::from(applicant.score_breakdown.extra);
            assert!(extra <= (score * 0.1 * 1.1).ceil());
        }
    }

    #[test]
    fn details_come_from_fixed_vocabularies() {
        for applicant in generated(50, 13) {
            assert!(EDUCATION_LEVELS.contains(&applicant.education.as_str()));
            assert!(applicant.phone.starts_with("080"));
            assert_eq!(applicant.phone.len(), 11);
            assert!(applicant.experience_summary.ends_with("years of experience in various roles."));
            let (first, last) = applicant.name.split_once(' ').expect("two-part name");
            assert!(FIRST_NAMES.contains(&first));
            assert!(LAST_NAMES.contains(&last));
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_applicants() {
        assert_eq!(generated(40, 99), generated(40, 99));
    }
}
