//! Composite candidate scoring.
//!
//! Each facet (skills, experience, location, availability) resolves to a
//! band of plausible scores. A band is sampled with a `StdRng` seeded from the
//! candidate id and the query fingerprint, so identical inputs always give
//! identical output. The facet scores are then weighted, shifted by a
//! per-candidate jitter and clamped to `[min_overall, max_overall]`.

use lazy_static::lazy_static;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MatchError, Result};
use crate::matching::query::{ExperienceTier, SearchFacets};
use crate::matching::records::Candidate;
use crate::util::numeric::clamp_score;
use crate::util::rng::{combine_seed, fingerprint};

/// Batches at least this large are scored on the rayon pool.
const PARALLEL_THRESHOLD: usize = 64;

const SENIOR_TITLE_WORDS: &[&str] = &[
    "senior",
    "sr.",
    "lead",
    "principal",
    "staff",
    "head",
    "architect",
];
const JUNIOR_TITLE_WORDS: &[&str] = &["junior", "jr.", "intern", "graduate", "trainee", "entry"];
const MID_TITLE_WORDS: &[&str] = &["mid-level", "mid level", "intermediate"];

lazy_static! {
    static ref REGIONS: Vec<(&'static str, Vec<&'static str>)> = vec![
        (
            "europe",
            vec![
                "europe", "london", "manchester", "edinburgh", "berlin", "munich", "hamburg",
                "paris", "lyon", "amsterdam", "rotterdam", "madrid", "barcelona", "dublin",
                "lisbon", "porto", "stockholm", "copenhagen", "oslo", "helsinki", "warsaw",
                "krakow", "prague", "vienna", "zurich", "milan", "rome", "brussels", "uk",
                "united kingdom", "germany", "france", "netherlands", "spain", "ireland",
                "portugal", "sweden", "poland", "italy",
            ],
        ),
        (
            "uk",
            vec![
                "uk", "united kingdom", "england", "scotland", "wales", "london",
                "manchester", "edinburgh", "bristol", "birmingham",
            ],
        ),
        (
            "north america",
            vec![
                "north america", "usa", "united states", "canada", "new york",
                "san francisco", "seattle", "austin", "boston", "chicago", "los angeles",
                "toronto", "vancouver", "montreal",
            ],
        ),
        (
            "usa",
            vec![
                "usa", "united states", "new york", "san francisco", "seattle", "austin",
                "boston", "chicago", "los angeles",
            ],
        ),
        (
            "asia",
            vec![
                "asia", "singapore", "tokyo", "seoul", "bangalore", "mumbai", "delhi",
                "hong kong", "shanghai", "india", "japan", "korea",
            ],
        ),
    ];
}

/// Facet weights of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub skills: f64,
    pub experience: f64,
    pub location: f64,
    pub availability: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            skills: 0.4,
            experience: 0.25,
            location: 0.25,
            availability: 0.1,
        }
    }
}

impl MatchWeights {
    pub fn sum(&self) -> f64 {
        self.skills + self.experience + self.location + self.availability
    }
}

/// Configuration for the composite scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: MatchWeights,
    /// Half-width of the per-candidate jitter; `0` disables it.
    pub jitter_amplitude: f64,
    /// Sample inside each band; when off every band resolves to its midpoint.
    pub band_sampling: bool,
    /// Floor of the overall score.
    pub min_overall: f64,
    /// Ceiling of the overall score.
    pub max_overall: f64,
    /// Share of the overall score taken from the trained models' signal,
    /// when one is supplied.
    pub model_blend: f64,
    /// Rating at or above which a "highly rated" reason is given.
    pub high_rating: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: MatchWeights::default(),
            jitter_amplitude: 10.0,
            band_sampling: true,
            min_overall: 20.0,
            max_overall: 100.0,
            model_blend: 0.0,
            high_rating: 4.5,
        }
    }
}

/// Per-facet sub-scores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacetScores {
    pub skills: f64,
    pub experience: f64,
    pub location: f64,
    pub availability: f64,
    /// Model signal blended into the overall score, if any.
    pub model: Option<f64>,
}

/// Score of one candidate against one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: String,
    /// Overall score in `[min_overall, max_overall]`.
    pub overall_score: f64,
    pub facet_scores: FacetScores,
    /// Query skills the candidate covers.
    pub matched_skills: Vec<String>,
    /// Human-readable reasons, in the order facets are scored.
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct Band {
    low: f64,
    high: f64,
}

const fn band(low: f64, high: f64) -> Band {
    Band { low, high }
}

/// Composite scorer over parsed query facets.
#[derive(Debug, Clone, Default)]
pub struct CompositeScorer {
    config: ScoringConfig,
}

impl CompositeScorer {
    /// Create a scorer, validating weights and bounds.
    pub fn new(config: ScoringConfig) -> Result<Self> {
        let w = &config.weights;
        let weights = [w.skills, w.experience, w.location, w.availability];
        if weights.iter().any(|v| !v.is_finite() || *v < 0.0) || w.sum() <= 0.0 {
            return Err(MatchError::invalid_argument(
                "scoring: weights must be non-negative with a positive sum",
            ));
        }
        if !(0.0..=100.0).contains(&config.min_overall)
            || !(0.0..=100.0).contains(&config.max_overall)
            || config.min_overall > config.max_overall
        {
            return Err(MatchError::invalid_argument(
                "scoring: overall bounds must satisfy 0 <= min <= max <= 100",
            ));
        }
        if !(0.0..=1.0).contains(&config.model_blend) {
            return Err(MatchError::invalid_argument(
                "scoring: model_blend must be in [0, 1]",
            ));
        }
        if !config.jitter_amplitude.is_finite() || config.jitter_amplitude < 0.0 {
            return Err(MatchError::invalid_argument(
                "scoring: jitter_amplitude must be non-negative",
            ));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one candidate.
    pub fn score(&self, candidate: &Candidate, facets: &SearchFacets) -> MatchResult {
        self.score_with_model(candidate, facets, None)
    }

    /// Score one candidate, blending in a model signal in `[0, 100]`.
    pub fn score_with_model(
        &self,
        candidate: &Candidate,
        facets: &SearchFacets,
        model_signal: Option<f64>,
    ) -> MatchResult {
        let mut rng = StdRng::seed_from_u64(combine_seed(
            fingerprint(&candidate.id),
            facets.fingerprint,
        ));
        let mut reasons = Vec::new();

        let (skills, matched_skills) = self.score_skills(candidate, facets, &mut rng, &mut reasons);
        let experience = self.score_experience(candidate, facets, &mut rng, &mut reasons);
        let location = self.score_location(candidate, facets, &mut rng, &mut reasons);
        let availability = self.score_availability(candidate, facets, &mut rng, &mut reasons);

        let w = &self.config.weights;
        let weighted = w.skills * skills
            + w.experience * experience
            + w.location * location
            + w.availability * availability;
        let mut overall = clamp_score(
            weighted + self.jitter(&candidate.id),
            self.config.min_overall,
            self.config.max_overall,
        );

        let model = model_signal.map(|s| clamp_score(s, 0.0, 100.0));
        if let Some(signal) = model {
            let blend = self.config.model_blend;
            overall = clamp_score(
                (1.0 - blend) * overall + blend * signal,
                self.config.min_overall,
                self.config.max_overall,
            );
        }

        MatchResult {
            candidate_id: candidate.id.clone(),
            overall_score: round1(overall),
            facet_scores: FacetScores {
                skills: round1(skills),
                experience: round1(experience),
                location: round1(location),
                availability: round1(availability),
                model: model.map(round1),
            },
            matched_skills,
            reasons,
        }
    }

    /// Score a batch and return the best `limit` results, highest first.
    /// Equal scores are ordered by candidate id.
    pub fn rank(
        &self,
        candidates: &[Candidate],
        facets: &SearchFacets,
        limit: Option<usize>,
    ) -> Vec<MatchResult> {
        self.rank_with(candidates, facets, limit, |_| None)
    }

    /// Like [`CompositeScorer::rank`], with a per-candidate model signal.
    pub fn rank_with<F>(
        &self,
        candidates: &[Candidate],
        facets: &SearchFacets,
        limit: Option<usize>,
        model_signal: F,
    ) -> Vec<MatchResult>
    where
        F: Fn(&Candidate) -> Option<f64> + Sync,
    {
        let score = |c: &Candidate| self.score_with_model(c, facets, model_signal(c));
        let mut results: Vec<MatchResult> = if candidates.len() >= PARALLEL_THRESHOLD {
            candidates.par_iter().map(score).collect()
        } else {
            candidates.iter().map(score).collect()
        };
        sort_results(&mut results);
        if let Some(limit) = limit {
            results.truncate(limit);
        }
        debug!(
            candidates = candidates.len(),
            returned = results.len(),
            "ranked candidates"
        );
        results
    }

    /// Deterministic jitter in `[-amplitude, amplitude]` from the candidate id.
    pub fn jitter(&self, candidate_id: &str) -> f64 {
        let amplitude = self.config.jitter_amplitude;
        if amplitude == 0.0 {
            return 0.0;
        }
        let unit = (fingerprint(candidate_id) % 2001) as f64 / 1000.0 - 1.0;
        amplitude * unit
    }

    fn resolve(&self, band: Band, rng: &mut StdRng) -> f64 {
        let value = if self.config.band_sampling && band.high > band.low {
            rng.random_range(band.low..=band.high)
        } else {
            (band.low + band.high) / 2.0
        };
        clamp_score(value, 0.0, 100.0)
    }

    fn score_skills(
        &self,
        candidate: &Candidate,
        facets: &SearchFacets,
        rng: &mut StdRng,
        reasons: &mut Vec<String>,
    ) -> (f64, Vec<String>) {
        let rating = candidate.rating;
        let (score, matched) = if facets.skills.is_empty() {
            (self.resolve(band(40.0, 60.0), rng), Vec::new())
        } else {
            let candidate_skills: Vec<String> = candidate
                .skills
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
            let matched: Vec<String> = facets
                .skills
                .iter()
                .filter(|wanted| {
                    candidate_skills.iter().any(|have| {
                        have.contains(wanted.as_str()) || wanted.contains(have.as_str())
                    })
                })
                .cloned()
                .collect();

            let ratio = matched.len() as f64 / facets.skills.len() as f64 * 100.0;
            let bonus = if rating >= 4.5 {
                15.0
            } else if rating >= 4.0 {
                10.0
            } else {
                5.0
            };

            if !matched.is_empty() {
                let label = if matched.len() == facets.skills.len() {
                    "Exact skill match"
                } else {
                    "Partial skill match"
                };
                reasons.push(format!("{label}: {}", matched.join(", ")));
            }
            (clamp_score(ratio + bonus, 0.0, 100.0), matched)
        };

        if rating >= self.config.high_rating {
            reasons.push(format!("Highly rated ({rating:.1}/5)"));
        }
        if candidate.verified {
            reasons.push("Verified profile".to_string());
        }

        (score, matched)
    }

    fn score_experience(
        &self,
        candidate: &Candidate,
        facets: &SearchFacets,
        rng: &mut StdRng,
        reasons: &mut Vec<String>,
    ) -> f64 {
        let title = candidate.title.to_lowercase();
        let years = if candidate.years_experience.is_finite() {
            candidate.years_experience.max(0.0)
        } else {
            0.0
        };
        let has = |words: &[&str]| words.iter().any(|w| title.contains(w));
        let senior_title = has(SENIOR_TITLE_WORDS);
        let junior_title = has(JUNIOR_TITLE_WORDS);
        let mid_title = has(MID_TITLE_WORDS);

        let (chosen, strong) = match facets.experience_tier {
            None => (band(60.0, 85.0), false),
            Some(ExperienceTier::Senior) => {
                if senior_title || years >= 5.0 {
                    (band(95.0, 100.0), true)
                } else if years >= 3.0 {
                    (band(70.0, 85.0), false)
                } else {
                    (band(30.0, 50.0), false)
                }
            }
            Some(ExperienceTier::Junior) => {
                if junior_title || (years <= 2.0 && !senior_title) {
                    (band(95.0, 100.0), true)
                } else if years <= 5.0 && !senior_title {
                    (band(70.0, 85.0), false)
                } else {
                    (band(45.0, 65.0), false)
                }
            }
            Some(ExperienceTier::Mid) => {
                if mid_title || ((2.0..=7.0).contains(&years) && !senior_title && !junior_title) {
                    (band(95.0, 100.0), true)
                } else if (1.0..=10.0).contains(&years) {
                    (band(70.0, 85.0), false)
                } else {
                    (band(40.0, 60.0), false)
                }
            }
        };

        if let (true, Some(tier)) = (strong, facets.experience_tier) {
            reasons.push(format!(
                "{}-level experience ({years:.0} years)",
                capitalize(tier.label().trim_end_matches("-level"))
            ));
        }

        if let Some(role) = facets.role.as_deref()
            && !title.is_empty()
            && title.contains(role)
        {
            reasons.push(format!("Role match: {}", candidate.title));
        }

        self.resolve(chosen, rng)
    }

    fn score_location(
        &self,
        candidate: &Candidate,
        facets: &SearchFacets,
        rng: &mut StdRng,
        reasons: &mut Vec<String>,
    ) -> f64 {
        let Some(wanted) = facets.location.as_deref() else {
            return self.resolve(band(65.0, 85.0), rng);
        };
        let location = candidate.location.trim();

        let chosen = if wanted == "remote" {
            if mentions(location, "remote") || mentions(&candidate.availability, "remote") {
                reasons.push("Available for remote work".to_string());
                band(95.0, 100.0)
            } else {
                band(50.0, 70.0)
            }
        } else if mentions(location, wanted) || mentions(wanted, location) {
            reasons.push(format!("Based in {location}"));
            band(95.0, 100.0)
        } else if let Some((region, members)) = REGIONS.iter().find(|(name, _)| *name == wanted) {
            if members.iter().any(|m| mentions(location, m)) {
                reasons.push(format!("Located in {} ({location})", capitalize(region)));
                band(90.0, 100.0)
            } else {
                band(15.0, 30.0)
            }
        } else {
            band(15.0, 30.0)
        };

        self.resolve(chosen, rng)
    }

    fn score_availability(
        &self,
        candidate: &Candidate,
        facets: &SearchFacets,
        rng: &mut StdRng,
        reasons: &mut Vec<String>,
    ) -> f64 {
        let Some(wanted) = facets.availability else {
            return self.resolve(band(70.0, 90.0), rng);
        };
        let chosen = if wanted.matches(&candidate.availability) {
            reasons.push(format!("Available for {} work", wanted.label()));
            band(95.0, 100.0)
        } else {
            band(30.0, 50.0)
        };
        self.resolve(chosen, rng)
    }
}

/// Sort by overall score, highest first, then by candidate id.
pub fn sort_results(results: &mut [MatchResult]) {
    results.sort_by(|a, b| {
        b.overall_score
            .total_cmp(&a.overall_score)
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
}

/// Whether `phrase` occurs in `text` as a run of whole words, ignoring case
/// and punctuation.
fn mentions(text: &str, phrase: &str) -> bool {
    let text = words(text);
    let phrase = words(phrase);
    !phrase.is_empty() && text.windows(phrase.len()).any(|window| window == phrase.as_slice())
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::query::{Availability, QueryAnalyzer};

    fn strong_candidate() -> Candidate {
        Candidate::new("cand-strong", "Ada")
            .with_title("Senior Frontend Developer")
            .with_skills(["React", "Node.js", "TypeScript"])
            .with_experience(8.0)
            .with_location("London, UK")
            .with_availability("Full-time")
            .with_rating(4.8)
            .verified(true)
    }

    fn no_jitter() -> CompositeScorer {
        CompositeScorer::new(ScoringConfig {
            jitter_amplitude: 0.0,
            ..ScoringConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert!((MatchWeights::default().sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_strong_candidate_facets() {
        let facets = QueryAnalyzer::default()
            .analyze("senior react node developer in london full-time");
        let result = no_jitter().score(&strong_candidate(), &facets);

        assert!(result.facet_scores.skills >= 90.0);
        assert!(result.facet_scores.experience >= 90.0);
        assert!(result.facet_scores.location >= 90.0);
        assert!(result.facet_scores.availability >= 90.0);
        assert!(result.overall_score >= 90.0);
        assert_eq!(result.matched_skills, vec!["node".to_string(), "react".to_string()]);
    }

    #[test]
    fn test_reasons_follow_facet_order() {
        let facets = QueryAnalyzer::default()
            .analyze("senior react developer in london full-time");
        let result = no_jitter().score(&strong_candidate(), &facets);
        assert_eq!(
            result.reasons,
            vec![
                "Exact skill match: react".to_string(),
                "Highly rated (4.8/5)".to_string(),
                "Verified profile".to_string(),
                "Senior-level experience (8 years)".to_string(),
                "Role match: Senior Frontend Developer".to_string(),
                "Based in London, UK".to_string(),
                "Available for full-time work".to_string(),
            ]
        );
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let scorer = CompositeScorer::default();
        let facets = QueryAnalyzer::default().analyze("python engineer in berlin");
        let candidate = strong_candidate();
        let a = scorer.score(&candidate, &facets);
        let b = scorer.score(&candidate, &facets);
        assert_eq!(a, b);
    }

    #[test]
    fn test_overall_always_within_bounds() {
        let scorer = CompositeScorer::default();
        let analyzer = QueryAnalyzer::default();
        let queries = [
            "",
            "senior rust engineer in europe contract",
            "junior designer remote part-time",
            "mid python analyst in asia",
            "kubernetes terraform aws devops in usa full-time",
        ];
        let candidates = vec![
            Candidate::new("a", "A"),
            strong_candidate(),
            Candidate::new("b", "B")
                .with_experience(f64::NAN)
                .with_rating(f64::INFINITY)
                .with_location("Tokyo"),
            Candidate::new("c", "C")
                .with_title("Graduate Designer")
                .with_skills(["Figma"])
                .with_availability("part-time, remote")
                .with_experience(1.0),
        ];
        for query in queries {
            let facets = analyzer.analyze(query);
            for candidate in &candidates {
                let result = scorer.score(candidate, &facets);
                assert!((20.0..=100.0).contains(&result.overall_score));
                let f = result.facet_scores;
                for v in [f.skills, f.experience, f.location, f.availability] {
                    assert!((0.0..=100.0).contains(&v));
                }
            }
        }
    }

    #[test]
    fn test_neutral_bands_without_facets() {
        let scorer = CompositeScorer::new(ScoringConfig {
            jitter_amplitude: 0.0,
            band_sampling: false,
            ..ScoringConfig::default()
        })
        .unwrap();
        let facets = QueryAnalyzer::default().analyze("");
        let result = scorer.score(&Candidate::new("x", "X"), &facets);
        assert_eq!(result.facet_scores.skills, 50.0);
        assert_eq!(result.facet_scores.experience, 72.5);
        assert_eq!(result.facet_scores.location, 75.0);
        assert_eq!(result.facet_scores.availability, 80.0);
        // 0.4*50 + 0.25*72.5 + 0.25*75 + 0.1*80
        assert_eq!(result.overall_score, 64.9);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_region_membership() {
        let scorer = no_jitter();
        let analyzer = QueryAnalyzer::default();
        let facets = analyzer.analyze("engineer in europe");

        let berlin = Candidate::new("b", "B").with_location("Berlin, Germany");
        let result = scorer.score(&berlin, &facets);
        assert!(result.facet_scores.location >= 90.0);
        assert!(result.reasons.iter().any(|r| r.starts_with("Located in Europe")));

        let austin = Candidate::new("a", "A").with_location("Austin, TX");
        let result = scorer.score(&austin, &facets);
        assert!((15.0..=30.0).contains(&result.facet_scores.location));
    }

    #[test]
    fn test_region_members_match_whole_words() {
        let scorer = no_jitter();
        let analyzer = QueryAnalyzer::default();

        let europe = analyzer.analyze("engineer in europe");
        for place in ["Milwaukee, USA", "Jerome, Idaho"] {
            let candidate = Candidate::new("c", "C").with_location(place);
            let result = scorer.score(&candidate, &europe);
            assert!((15.0..=30.0).contains(&result.facet_scores.location), "{place}");
            assert!(!result.reasons.iter().any(|r| r.starts_with("Located in")));
        }

        let asia = analyzer.analyze("engineer in asia");
        let indianapolis = Candidate::new("i", "I").with_location("Indianapolis, IN");
        let result = scorer.score(&indianapolis, &asia);
        assert!((15.0..=30.0).contains(&result.facet_scores.location));
        let mumbai = Candidate::new("m", "M").with_location("Mumbai, India");
        assert!(scorer.score(&mumbai, &asia).facet_scores.location >= 90.0);

        let uk = analyzer.analyze("engineer in uk");
        let milwaukee = Candidate::new("w", "W").with_location("Milwaukee");
        let result = scorer.score(&milwaukee, &uk);
        assert!((15.0..=30.0).contains(&result.facet_scores.location));
        assert!(!result.reasons.iter().any(|r| r.starts_with("Based in")));
    }

    #[test]
    fn test_mentions_whole_words() {
        assert!(mentions("London, UK", "uk"));
        assert!(mentions("New York, USA", "new york"));
        assert!(!mentions("Milwaukee", "uk"));
        assert!(!mentions("Jerome", "rome"));
        assert!(!mentions("Indianapolis", "india"));
        assert!(!mentions("", "london"));
        assert!(!mentions("London", ""));
    }

    fn midpoints() -> CompositeScorer {
        CompositeScorer::new(ScoringConfig {
            jitter_amplitude: 0.0,
            band_sampling: false,
            ..ScoringConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_junior_experience_bands() {
        let scorer = midpoints();
        let facets = QueryAnalyzer::default().analyze("junior designer");

        let junior = Candidate::new("j", "J")
            .with_title("Junior Designer")
            .with_experience(1.0);
        let result = scorer.score(&junior, &facets);
        assert_eq!(result.facet_scores.experience, 97.5);
        assert!(result.reasons.contains(&"Junior-level experience (1 years)".to_string()));

        let some_years = Candidate::new("s", "S").with_experience(4.0);
        assert_eq!(scorer.score(&some_years, &facets).facet_scores.experience, 77.5);

        let senior = Candidate::new("o", "O")
            .with_title("Senior Designer")
            .with_experience(10.0);
        assert_eq!(scorer.score(&senior, &facets).facet_scores.experience, 55.0);
    }

    #[test]
    fn test_mid_experience_bands() {
        let scorer = midpoints();
        let facets = QueryAnalyzer::default().analyze("mid engineer");
        let years = |y: f64| {
            let candidate = Candidate::new("m", "M").with_experience(y);
            scorer.score(&candidate, &facets).facet_scores.experience
        };
        assert_eq!(years(4.0), 97.5);
        assert_eq!(years(9.0), 77.5);
        assert_eq!(years(15.0), 50.0);

        let titled = Candidate::new("t", "T")
            .with_title("Mid-level Engineer")
            .with_experience(15.0);
        assert_eq!(scorer.score(&titled, &facets).facet_scores.experience, 97.5);
    }

    #[test]
    fn test_remote_location_bands() {
        let scorer = midpoints();
        let facets = QueryAnalyzer::default().analyze("remote engineer");

        let remote = Candidate::new("r", "R").with_location("Remote");
        let result = scorer.score(&remote, &facets);
        assert_eq!(result.facet_scores.location, 97.5);
        assert!(result.reasons.contains(&"Available for remote work".to_string()));

        let open_to_remote = Candidate::new("o", "O")
            .with_location("Lisbon, Portugal")
            .with_availability("Full-time, remote");
        assert_eq!(scorer.score(&open_to_remote, &facets).facet_scores.location, 97.5);

        let office = Candidate::new("b", "B")
            .with_location("Berlin, Germany")
            .with_availability("Full-time");
        let result = scorer.score(&office, &facets);
        assert_eq!(result.facet_scores.location, 60.0);
        assert!(!result.reasons.iter().any(|r| r.contains("remote")));
    }

    #[test]
    fn test_skill_bonus_tiers() {
        let scorer = CompositeScorer::new(ScoringConfig {
            jitter_amplitude: 0.0,
            ..ScoringConfig::default()
        })
        .unwrap();
        let facets = QueryAnalyzer::default().analyze("react vue");
        let candidate = Candidate::new("c", "C").with_skills(["react"]);

        let low = scorer.score(&candidate.clone().with_rating(3.0), &facets);
        let mid = scorer.score(&candidate.clone().with_rating(4.2), &facets);
        let high = scorer.score(&candidate.with_rating(4.6), &facets);
        assert_eq!(low.facet_scores.skills, 55.0);
        assert_eq!(mid.facet_scores.skills, 60.0);
        assert_eq!(high.facet_scores.skills, 65.0);
        assert!(low.reasons[0].starts_with("Partial skill match"));
    }

    #[test]
    fn test_availability_mismatch() {
        let scorer = no_jitter();
        let mut facets = QueryAnalyzer::default().analyze("designer");
        facets.availability = Some(Availability::Contract);
        let candidate = Candidate::new("d", "D").with_availability("Full-time");
        let result = scorer.score(&candidate, &facets);
        assert!((30.0..=50.0).contains(&result.facet_scores.availability));
    }

    #[test]
    fn test_rank_orders_and_limits() {
        let scorer = no_jitter();
        let facets = QueryAnalyzer::default().analyze("senior react developer in london");
        let candidates = vec![
            Candidate::new("weak", "W").with_location("Tokyo"),
            strong_candidate(),
            Candidate::new("mid", "M")
                .with_skills(["react"])
                .with_location("London"),
        ];
        let ranked = scorer.rank(&candidates, &facets, Some(2));
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].candidate_id, "cand-strong");
        assert!(ranked[0].overall_score >= ranked[1].overall_score);
    }

    #[test]
    fn test_parallel_rank_matches_sequential() {
        let scorer = CompositeScorer::default();
        let facets = QueryAnalyzer::default().analyze("python developer in europe");
        let candidates: Vec<Candidate> = (0..100)
            .map(|i| {
                Candidate::new(format!("c{i}"), format!("n{i}"))
                    .with_skills(if i % 2 == 0 { vec!["python"] } else { vec!["java"] })
                    .with_location(if i % 3 == 0 { "Paris" } else { "Austin" })
                    .with_experience(i as f64 % 12.0)
            })
            .collect();
        let ranked = scorer.rank(&candidates, &facets, None);
        assert_eq!(ranked.len(), 100);

        let mut sequential: Vec<MatchResult> =
            candidates.iter().map(|c| scorer.score(c, &facets)).collect();
        sort_results(&mut sequential);
        assert_eq!(ranked, sequential);
    }

    #[test]
    fn test_model_blend() {
        let scorer = CompositeScorer::new(ScoringConfig {
            jitter_amplitude: 0.0,
            band_sampling: false,
            model_blend: 0.5,
            ..ScoringConfig::default()
        })
        .unwrap();
        let facets = QueryAnalyzer::default().analyze("");
        let candidate = Candidate::new("x", "X");
        let plain = scorer.score(&candidate, &facets);
        let blended = scorer.score_with_model(&candidate, &facets, Some(100.0));
        assert_eq!(blended.facet_scores.model, Some(100.0));
        assert!(blended.overall_score > plain.overall_score);
    }

    #[test]
    fn test_jitter_range() {
        let scorer = CompositeScorer::default();
        for id in ["a", "b", "cand-1", "cand-2", "zzz"] {
            let j = scorer.jitter(id);
            assert!((-10.0..=10.0).contains(&j));
        }
        assert_eq!(no_jitter().jitter("a"), 0.0);
    }

    #[test]
    fn test_invalid_config() {
        let bad_weights = ScoringConfig {
            weights: MatchWeights {
                skills: -1.0,
                ..MatchWeights::default()
            },
            ..ScoringConfig::default()
        };
        assert!(CompositeScorer::new(bad_weights).is_err());

        let bad_bounds = ScoringConfig {
            min_overall: 80.0,
            max_overall: 50.0,
            ..ScoringConfig::default()
        };
        assert!(CompositeScorer::new(bad_bounds).is_err());
    }
}
