use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use talent_match::error::Result;
use talent_match::ml::clustering::{InitStrategy, KMeans};
use talent_match::ml::ensemble::{BootstrapEnsemble, EnsembleConfig};
use talent_match::ml::network::{FeedForwardNetwork, NetworkConfig};
use talent_match::prelude::*;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn sample_candidates() -> Vec<Candidate> {
    vec![
        Candidate::new("c-ada", "Ada")
            .with_title("Senior Frontend Developer")
            .with_skills(["React", "TypeScript", "Node.js", "GraphQL"])
            .with_experience(9.0)
            .with_location("London, UK")
            .with_availability("Full-time")
            .with_rating(4.9)
            .verified(true)
            .with_projects(64)
            .with_certifications(3),
        Candidate::new("c-bo", "Bo")
            .with_title("Junior Web Developer")
            .with_skills(["HTML", "CSS", "React"])
            .with_experience(1.0)
            .with_location("Manchester")
            .with_availability("Part-time")
            .with_rating(3.8)
            .with_projects(4),
        Candidate::new("c-cy", "Cy")
            .with_title("Data Scientist")
            .with_skills(["Python", "PyTorch", "SQL"])
            .with_experience(5.0)
            .with_location("Berlin, Germany")
            .with_availability("Contract")
            .with_rating(4.4)
            .verified(true)
            .with_projects(22)
            .with_certifications(5),
        Candidate::new("c-di", "Di")
            .with_title("Backend Engineer")
            .with_skills(["Rust", "PostgreSQL", "Kubernetes", "AWS"])
            .with_experience(6.0)
            .with_location("Remote")
            .with_availability("Contract, remote")
            .with_rating(4.6)
            .with_projects(35)
            .with_certifications(2),
        Candidate::new("c-ed", "Ed")
            .with_title("Product Designer")
            .with_skills(["Figma", "UI/UX"])
            .with_experience(3.0)
            .with_location("San Francisco")
            .with_availability("Full-time")
            .with_rating(4.1)
            .with_projects(15),
    ]
}

#[test]
fn search_ranks_the_best_fit_first_with_reasons() -> Result<()> {
    init_tracing();
    let engine = MatchEngine::new(EngineConfig::default())?;
    let candidates = sample_candidates();

    let results = engine.search(
        "Senior React developer in London, full-time",
        &candidates,
        Some(3),
    );
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].candidate_id, "c-ada");
    assert!(results[0].overall_score >= results[1].overall_score);
    assert!(results[1].overall_score >= results[2].overall_score);
    assert!(
        results[0]
            .reasons
            .iter()
            .any(|r| r.starts_with("Exact skill match"))
    );
    assert!(results[0].reasons.contains(&"Verified profile".to_string()));
    Ok(())
}

#[test]
fn scoring_is_reproducible_across_engines() -> Result<()> {
    let candidates = sample_candidates();
    let first = MatchEngine::new(EngineConfig::default())?;
    let second = MatchEngine::new(EngineConfig::default())?;

    let query = "rust engineer in europe, contract";
    assert_eq!(
        first.search(query, &candidates, None),
        second.search(query, &candidates, None)
    );
    Ok(())
}

#[test]
fn every_score_stays_within_bounds() -> Result<()> {
    let engine = MatchEngine::new(EngineConfig::default())?;
    let mut candidates = sample_candidates();
    candidates.push(Candidate::new("c-empty", ""));
    candidates.push(
        Candidate::new("c-odd", "Odd")
            .with_experience(f64::NAN)
            .with_rating(-3.0),
    );

    for query in [
        "",
        "!!!",
        "senior lead principal",
        "junior python react vue angular developer in tokyo part-time",
        "mid-level devops engineer in north america",
    ] {
        for result in engine.search(query, &candidates, None) {
            assert!(
                (20.0..=100.0).contains(&result.overall_score),
                "{query}: {}",
                result.overall_score
            );
            assert!(!result.overall_score.is_nan());
        }
    }
    Ok(())
}

#[test]
fn full_match_scores_high_on_every_facet() -> Result<()> {
    let mut config = EngineConfig::default();
    config.scoring.jitter_amplitude = 0.0;
    let engine = MatchEngine::new(config)?;

    let candidate = &sample_candidates()[0];
    let facets = engine.analyze_query("senior react typescript developer in london");
    let result = engine.compute_composite_score(candidate, &facets);
    assert!(result.facet_scores.skills >= 90.0);
    assert!(result.facet_scores.experience >= 90.0);
    assert!(result.facet_scores.location >= 90.0);
    Ok(())
}

#[test]
fn match_job_uses_posting_facets() -> Result<()> {
    let engine = MatchEngine::new(EngineConfig::default())?;
    let job = JobPosting {
        id: "job-42".to_string(),
        title: "Backend Engineer".to_string(),
        required_skills: vec!["Rust".to_string(), "Kubernetes".to_string()],
        location: Some("Remote".to_string()),
        experience_level: Some("Senior".to_string()),
        job_type: Some("Contract".to_string()),
    };

    let results = engine.match_job(&job, &sample_candidates(), Some(2));
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].candidate_id, "c-di");

    let facets = SearchFacets::from_job(&job);
    assert_eq!(facets.experience_tier, Some(ExperienceTier::Senior));
    assert_eq!(facets.availability, Some(Availability::Contract));
    Ok(())
}

#[test]
fn clustering_with_seed_is_repeatable() -> Result<()> {
    let vectors: Vec<FeatureVector> = (0..30)
        .map(|i| {
            let base = if i % 3 == 0 { 0.0 } else if i % 3 == 1 { 5.0 } else { 10.0 };
            vec![base + (i as f64) * 0.01, base]
        })
        .collect();

    for k in 1..=vectors.len() {
        let assignments = KMeans::with_seed(7).cluster(&vectors, k)?;
        assert_eq!(assignments.len(), vectors.len());
        assert!(assignments.iter().all(|&a| a < k));
    }

    let a = KMeans::with_seed(99).cluster(&vectors, 3)?;
    let b = KMeans::with_seed(99).cluster(&vectors, 3)?;
    assert_eq!(a, b);

    let mut config = EngineConfig::default().with_seed(1);
    config.clustering.init = InitStrategy::KMeansPlusPlus;
    let engine = MatchEngine::new(config)?;
    let result = engine.cluster_candidates(&sample_candidates(), 2)?;
    assert_eq!(result.cluster_sizes().iter().sum::<usize>(), 5);
    Ok(())
}

#[test]
fn ensemble_only_predicts_seen_labels() -> Result<()> {
    let features: Vec<FeatureVector> = (0..40)
        .map(|i| vec![(i % 10) as f64 / 10.0, (i / 10) as f64 / 4.0])
        .collect();
    let labels: Vec<usize> = (0..40).map(|i| [3, 7, 11][i % 3]).collect();

    let mut ensemble = BootstrapEnsemble::new(EnsembleConfig {
        seed: Some(5),
        ..EnsembleConfig::default()
    });
    ensemble.train(&features, &labels)?;

    let seen: HashSet<usize> = labels.iter().copied().collect();
    for x in 0..20 {
        for y in 0..5 {
            let label = ensemble.predict(&[x as f64 / 19.0, y as f64 / 4.0])?;
            assert!(seen.contains(&label));
        }
    }
    Ok(())
}

#[test]
fn network_weights_move_during_training() -> Result<()> {
    let mut network = FeedForwardNetwork::new(NetworkConfig {
        input_size: 2,
        hidden_size: 4,
        output_size: 1,
        seed: Some(17),
        ..NetworkConfig::default()
    })?;
    let before = network.weights().clone();

    let inputs = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]];
    let targets = vec![vec![0.0], vec![1.0], vec![1.0], vec![1.0]];
    let stats = network.train(&inputs, &targets, 50)?;

    assert_ne!(&before, network.weights());
    assert_eq!(stats.iterations, 50);
    assert_eq!(stats.training_losses.len(), 50);
    Ok(())
}

#[test]
fn feedback_trends_and_recommendations() -> Result<()> {
    let mut config = EngineConfig::default().with_seed(8);
    config.bandit.epsilon = 0.0;
    let engine = MatchEngine::new(config)?;

    let positive = engine.analyze_feedback("excellent great amazing");
    assert_eq!(positive.sentiment, Sentiment::Positive);
    assert!(positive.score > 0.1);
    let negative = engine.analyze_feedback("poor bad terrible");
    assert_eq!(negative.sentiment, Sentiment::Negative);
    assert!(negative.score < -0.1);
    let empty = engine.analyze_feedback("");
    assert_eq!(empty.sentiment, Sentiment::Neutral);
    assert_eq!(empty.score, 0.0);

    for v in [10.0, 12.0, 14.0, 16.0, 18.0] {
        engine.record_trend(v)?;
    }
    let forecast = engine.forecast_trends(3);
    assert!(forecast[0] < forecast[1] && forecast[1] < forecast[2]);
    assert_eq!(engine.forecast_series(&[5.0; 5], 3)?, vec![5.0, 5.0, 5.0]);

    for round in 0..24 {
        let arm = round % 4;
        engine.record_recommendation_reward(arm, if arm == 2 { 1.0 } else { 0.0 })?;
    }
    for _ in 0..5 {
        assert_eq!(engine.optimize_recommendations(), 2);
    }
    Ok(())
}

#[test]
fn concurrent_training_and_scoring() -> Result<()> {
    let engine = Arc::new(MatchEngine::new(EngineConfig::default().with_seed(21))?);
    let candidates = Arc::new(sample_candidates());
    let labels: Vec<usize> = candidates
        .iter()
        .map(|c| usize::from(c.rating >= 4.5))
        .collect();

    let mut handles = Vec::new();
    for worker in 0..4 {
        let engine = Arc::clone(&engine);
        let candidates = Arc::clone(&candidates);
        let labels = labels.clone();
        handles.push(thread::spawn(move || -> Result<()> {
            for _ in 0..5 {
                if worker % 2 == 0 {
                    engine.train_success_model(&candidates, &labels)?;
                } else {
                    let results = engine.search("react developer", &candidates, None);
                    assert_eq!(results.len(), candidates.len());
                }
            }
            Ok(())
        }));
    }
    for handle in handles {
        handle.join().expect("worker panicked")?;
    }

    let prediction = engine.predict_success(&candidates[0])?;
    assert!(labels.contains(&prediction.label));
    Ok(())
}

#[test]
fn config_round_trips_through_json() -> Result<()> {
    let json = r#"{
        "scoring": {"jitter_amplitude": 0, "band_sampling": false},
        "bandit": {"arms": 3, "epsilon": 0.05, "seed": 4}
    }"#;
    let config = EngineConfig::from_json_str(json)?;
    assert_eq!(config.bandit.arms, 3);
    assert!(!config.scoring.band_sampling);

    let engine = MatchEngine::new(config)?;
    assert_eq!(engine.arm_stats().len(), 3);
    Ok(())
}
