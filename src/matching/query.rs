//! Free-text query analysis.
//!
//! The lowercased query is matched by substring against fixed vocabularies:
//! skills, locations, experience-tier triggers, roles and working
//! arrangements. Every matching skill is kept. For the single-valued facets
//! the match ending last in the query wins, and on equal end positions the
//! longer keyword wins, so "frontend developer" beats "developer".

use std::collections::BTreeSet;
use std::sync::Arc;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::matching::records::JobPosting;
use crate::util::rng::fingerprint;

/// Requested seniority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceTier {
    Junior,
    Mid,
    Senior,
}

impl ExperienceTier {
    pub fn label(&self) -> &'static str {
        match self {
            ExperienceTier::Junior => "junior",
            ExperienceTier::Mid => "mid-level",
            ExperienceTier::Senior => "senior",
        }
    }
}

/// Requested working arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    Contract,
    FullTime,
    PartTime,
}

impl Availability {
    /// Substrings that indicate this arrangement in free text.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Availability::Contract => &["contract", "freelance"],
            Availability::FullTime => &["full-time", "full time", "fulltime", "permanent"],
            Availability::PartTime => &["part-time", "part time", "parttime"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Availability::Contract => "contract",
            Availability::FullTime => "full-time",
            Availability::PartTime => "part-time",
        }
    }

    /// Whether `text` mentions this arrangement.
    pub fn matches(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.keywords().iter().any(|k| lowered.contains(k))
    }
}

/// Keyword vocabularies the analyzer matches against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    pub skills: Vec<String>,
    pub locations: Vec<String>,
    pub roles: Vec<String>,
    pub tier_triggers: Vec<(String, ExperienceTier)>,
    pub availability_triggers: Vec<(String, Availability)>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

lazy_static! {
    static ref DEFAULT_VOCABULARY: Arc<Vocabulary> = Arc::new(Vocabulary {
        skills: owned(&[
            "react", "angular", "vue", "javascript", "typescript", "node", "python",
            "django", "flask", "java", "spring", "kotlin", "swift", "ios", "android",
            "flutter", "rust", "golang", "c++", "c#", ".net", "php", "laravel", "ruby",
            "rails", "sql", "postgresql", "mysql", "mongodb", "redis", "graphql", "aws",
            "azure", "gcp", "docker", "kubernetes", "terraform", "machine learning",
            "data science", "tensorflow", "pytorch", "figma", "ui/ux", "devops",
            "blockchain", "solidity",
        ]),
        locations: owned(&[
            "london", "manchester", "berlin", "munich", "paris", "amsterdam", "madrid",
            "barcelona", "dublin", "lisbon", "stockholm", "warsaw", "new york",
            "san francisco", "seattle", "austin", "boston", "toronto", "vancouver",
            "sydney", "melbourne", "singapore", "tokyo", "bangalore", "remote", "europe",
            "north america", "asia", "uk", "usa",
        ]),
        roles: owned(&[
            "developer", "engineer", "designer", "architect", "analyst", "consultant",
            "data scientist", "product manager", "project manager", "devops engineer",
            "frontend developer", "frontend engineer", "backend developer",
            "backend engineer", "full stack developer", "full-stack developer",
            "mobile developer", "qa engineer", "tester",
        ]),
        tier_triggers: vec![
            ("senior".to_string(), ExperienceTier::Senior),
            ("lead".to_string(), ExperienceTier::Senior),
            ("principal".to_string(), ExperienceTier::Senior),
            ("5+".to_string(), ExperienceTier::Senior),
            ("experienced".to_string(), ExperienceTier::Senior),
            ("junior".to_string(), ExperienceTier::Junior),
            ("entry".to_string(), ExperienceTier::Junior),
            ("fresher".to_string(), ExperienceTier::Junior),
            ("graduate".to_string(), ExperienceTier::Junior),
            ("mid".to_string(), ExperienceTier::Mid),
            ("intermediate".to_string(), ExperienceTier::Mid),
        ],
        availability_triggers: [
            Availability::Contract,
            Availability::FullTime,
            Availability::PartTime,
        ]
        .iter()
        .flat_map(|a| a.keywords().iter().map(move |k| (k.to_string(), *a)))
        .collect(),
    });
}

impl Vocabulary {
    /// The built-in vocabulary shared by every default analyzer.
    pub fn shared() -> Arc<Vocabulary> {
        Arc::clone(&DEFAULT_VOCABULARY)
    }
}

/// Structured facets parsed from one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFacets {
    /// Normalised (trimmed, lowercased) query text.
    pub query: String,
    pub skills: BTreeSet<String>,
    pub location: Option<String>,
    pub experience_tier: Option<ExperienceTier>,
    pub role: Option<String>,
    pub availability: Option<Availability>,
    /// CRC32 of the normalised query; seeds per-query band sampling.
    pub fingerprint: u32,
}

impl SearchFacets {
    /// Whether no facet was recognised.
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self.location.is_none()
            && self.experience_tier.is_none()
            && self.role.is_none()
            && self.availability.is_none()
    }

    /// Facets of a job posting under the built-in vocabulary.
    pub fn from_job(job: &JobPosting) -> Self {
        QueryAnalyzer::default().analyze_job(job)
    }
}

/// Keyword-based query analyzer.
#[derive(Debug, Clone)]
pub struct QueryAnalyzer {
    vocabulary: Arc<Vocabulary>,
}

impl Default for QueryAnalyzer {
    fn default() -> Self {
        Self::new(Vocabulary::shared())
    }
}

impl QueryAnalyzer {
    /// Create an analyzer over a shared vocabulary.
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Parse a query into facets.
    pub fn analyze(&self, query: &str) -> SearchFacets {
        let normalized = query.trim().to_lowercase();

        SearchFacets {
            skills: self.detect_skills(&normalized),
            location: last_match(&normalized, self.vocabulary.locations.iter())
                .map(|(word, _)| word.clone()),
            experience_tier: self.detect_tier(&normalized),
            role: last_match(&normalized, self.vocabulary.roles.iter()).map(|(w, _)| w.clone()),
            availability: self.detect_availability(&normalized),
            fingerprint: fingerprint(&normalized),
            query: normalized,
        }
    }

    /// Derive facets from a job posting.
    pub fn analyze_job(&self, job: &JobPosting) -> SearchFacets {
        let title = job.title.trim().to_lowercase();
        let level = job
            .experience_level
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        SearchFacets {
            skills: job
                .required_skills
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            location: job
                .location
                .as_deref()
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty()),
            experience_tier: self
                .detect_tier(&level)
                .or_else(|| self.detect_tier(&title)),
            role: last_match(&title, self.vocabulary.roles.iter())
                .map(|(w, _)| w.clone())
                .or_else(|| (!title.is_empty()).then(|| title.clone())),
            availability: job
                .job_type
                .as_deref()
                .and_then(|t| self.detect_availability(&t.to_lowercase())),
            fingerprint: fingerprint(&format!("job:{}", job.id)),
            query: title,
        }
    }

    fn detect_skills(&self, query: &str) -> BTreeSet<String> {
        let matched: Vec<&String> = self
            .vocabulary
            .skills
            .iter()
            .filter(|skill| query.contains(skill.as_str()))
            .collect();

        // "java" inside "javascript" is not a separate hit, but "java and
        // javascript" asks for both.
        matched
            .iter()
            .filter(|skill| {
                let spans: Vec<(usize, usize)> = matched
                    .iter()
                    .filter(|other| other.len() > skill.len() && other.contains(skill.as_str()))
                    .flat_map(|other| {
                        query
                            .match_indices(other.as_str())
                            .map(|(start, hit)| (start, start + hit.len()))
                    })
                    .collect();
                !query.match_indices(skill.as_str()).all(|(start, hit)| {
                    let end = start + hit.len();
                    spans.iter().any(|&(s, e)| s <= start && end <= e)
                })
            })
            .map(|skill| (*skill).clone())
            .collect()
    }

    fn detect_tier(&self, text: &str) -> Option<ExperienceTier> {
        let triggers = &self.vocabulary.tier_triggers;
        last_match(text, triggers.iter().map(|(w, _)| w)).map(|(_, i)| triggers[i].1)
    }

    fn detect_availability(&self, text: &str) -> Option<Availability> {
        let triggers = &self.vocabulary.availability_triggers;
        last_match(text, triggers.iter().map(|(w, _)| w)).map(|(_, i)| triggers[i].1)
    }
}

/// The keyword whose last occurrence ends latest in `text`, preferring the
/// longer keyword on a tie. Returns the keyword and its vocabulary index.
fn last_match<'a>(
    text: &str,
    words: impl Iterator<Item = &'a String>,
) -> Option<(&'a String, usize)> {
    let mut best: Option<(&'a String, usize, usize)> = None;
    for (index, word) in words.enumerate() {
        if word.is_empty() {
            continue;
        }
        if let Some(start) = text.rfind(word.as_str()) {
            let end = start + word.len();
            let better = match best {
                None => true,
                Some((current, _, current_end)) => {
                    end > current_end || (end == current_end && word.len() > current.len())
                }
            };
            if better {
                best = Some((word, index, end));
            }
        }
    }
    best.map(|(word, index, _)| (word, index))
}
