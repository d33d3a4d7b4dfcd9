use std::fs;
use std::path::PathBuf;

use scout_similarity::filter::ResultFilter;
use scout_similarity::pool::{find_by_id, parse_pool_json};
use scout_similarity::ranker::join_profiles;
use scout_similarity::{
    Feature, PlayerProfile, Ranker, ScoutError, SimilarityStrategy, WeightTable, bundled_table,
    explain, rank, rank_standardized, score,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn fixture_pool() -> Vec<PlayerProfile> {
    parse_pool_json(&read_fixture("scouting_pool.json")).expect("fixture pool should parse")
}

fn ids(results: &[scout_similarity::SimilarityResult]) -> Vec<&str> {
    results.iter().map(|r| r.candidate_id.as_str()).collect()
}

fn score_of(results: &[scout_similarity::SimilarityResult], id: &str) -> f64 {
    results
        .iter()
        .find(|r| r.candidate_id == id)
        .map(|r| r.score)
        .unwrap_or_else(|| panic!("{id} missing from results"))
}

#[test]
fn striker_ranking_prefers_close_profile_and_gates_midfielder() {
    let pool = fixture_pool();
    let table = bundled_table().unwrap();
    let target = find_by_id(&pool, "st-target").unwrap();

    let results = rank(target, &pool, table, None).unwrap();
    assert_eq!(results.len(), pool.len() - 1);
    assert!(!ids(&results).contains(&"st-target"));
    assert_eq!(ids(&results)[..2], ["st-close", "st-sparse"]);

    let close = score_of(&results, "st-close");
    let sparse = score_of(&results, "st-sparse");
    assert!(close > 0.9, "close striker scored {close}");
    assert!(sparse > 0.0 && sparse < close, "sparse striker scored {sparse}");
    // Only age (26 vs 31) and minutes are shared: (0.375 * 0.04 + 0.05) / 0.09.
    assert!((sparse - 0.065 / 0.09).abs() < 1e-9);
    assert_eq!(score_of(&results, "cm-mirror"), 0.0);
}

#[test]
fn zero_scores_tie_break_on_id() {
    let pool = fixture_pool();
    let table = bundled_table().unwrap();
    let target = find_by_id(&pool, "st-target").unwrap();

    let results = rank(target, &pool, table, None).unwrap();
    let zeros: Vec<&str> = results
        .iter()
        .filter(|r| r.score == 0.0)
        .map(|r| r.candidate_id.as_str())
        .collect();
    assert_eq!(zeros, vec!["cb-01", "cm-mirror", "gk-a", "gk-b", "gk-c", "lw-01"]);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn keeper_missing_pass_accuracy_is_not_dragged_down() {
    let pool = fixture_pool();
    let table = bundled_table().unwrap();
    let target = find_by_id(&pool, "gk-a").unwrap();

    let results = rank(target, &pool, table, Some(2)).unwrap();
    assert_eq!(ids(&results), vec!["gk-b", "gk-c"]);
    let partial = score_of(&results, "gk-b");
    let full = score_of(&results, "gk-c");
    assert!((partial - 1.0).abs() < 1e-12);
    assert!((partial - full).abs() < 1e-12);

    let breakdown = explain(target, find_by_id(&pool, "gk-b").unwrap(), table);
    assert!(breakdown.contributions.iter().all(|c| c.feature != Feature::PassAccuracy));
    assert!(breakdown.coverage() < 1.0);
    assert_eq!(breakdown.score, partial);
}

#[test]
fn explain_agrees_with_score_across_pool() {
    let pool = fixture_pool();
    let table = bundled_table().unwrap();
    for target in &pool {
        for candidate in &pool {
            let direct = score(target, candidate, table);
            assert_eq!(explain(target, candidate, table).score, direct);
        }
    }
}

#[test]
fn target_missing_from_pool_is_reported() {
    let pool = fixture_pool();
    let table = bundled_table().unwrap();
    let stranger = PlayerProfile::new("nobody", "ST").with_feature(Feature::Goals, 4.0);

    let err = rank(&stranger, &pool, table, None).unwrap_err();
    assert!(err.is_target_not_found());

    let err = rank(&stranger, &[], table, None).unwrap_err();
    assert_eq!(err, ScoutError::TargetNotFound { id: "nobody".into() });
}

#[test]
fn lone_target_yields_empty_ranking() {
    let target = PlayerProfile::new("solo", "CB").with_feature(Feature::Tackles, 30.0);
    let pool = vec![target.clone()];
    let results = rank(&target, &pool, bundled_table().unwrap(), None).unwrap();
    assert!(results.is_empty());
}

#[test]
fn empty_weight_table_scores_everything_zero() {
    let pool = fixture_pool();
    let target = find_by_id(&pool, "st-target").unwrap();
    let results = rank(target, &pool, &WeightTable::default(), None).unwrap();
    assert!(results.iter().all(|r| r.score == 0.0));
}

#[test]
fn limit_keeps_the_head_of_the_ranking() {
    let pool = fixture_pool();
    let table = bundled_table().unwrap();
    let target = find_by_id(&pool, "st-target").unwrap();

    let full = rank(target, &pool, table, None).unwrap();
    let head = rank(target, &pool, table, Some(3)).unwrap();
    assert_eq!(head, full[..3]);
    assert!(rank(target, &pool, table, Some(0)).unwrap().is_empty());
}

fn synthetic_pool(size: usize) -> Vec<PlayerProfile> {
    const CODES: [&str; 6] = ["ST", "CM", "CB", "GK", "LW", "CDM"];
    (0..size)
        .map(|i| {
            let f = i as f64;
            let mut p = PlayerProfile::new(format!("p{i:04}"), CODES[i % CODES.len()])
                .with_feature(Feature::Age, 18.0 + (i % 17) as f64)
                .with_feature(Feature::Minutes, 500.0 + (i * 37 % 2800) as f64)
                .with_feature(Feature::Goals, (i * 7 % 25) as f64)
                .with_feature(Feature::Tackles, (f * 1.3) % 70.0)
                .with_feature(Feature::Saves, (i * 11 % 120) as f64);
            if i % 3 == 0 {
                p = p.with_feature(Feature::Xg, (i % 19) as f64 * 0.9);
            }
            if i % 4 == 0 {
                p = p.with_feature(Feature::PassAccuracy, 60.0 + (i % 30) as f64);
            }
            p
        })
        .collect()
}

#[test]
fn parallel_and_sequential_rankings_match() {
    let pool = synthetic_pool(600);
    let table = bundled_table().unwrap();
    for strategy in [SimilarityStrategy::WeightedDelta, SimilarityStrategy::StandardizedCosine] {
        for target in [&pool[0], &pool[3], &pool[301]] {
            let sequential = Ranker::new(table)
                .with_strategy(strategy)
                .with_parallel_min_pool(usize::MAX)
                .rank(target, &pool, None)
                .unwrap();
            let parallel = Ranker::new(table)
                .with_strategy(strategy)
                .with_parallel_min_pool(1)
                .rank(target, &pool, None)
                .unwrap();
            assert_eq!(sequential, parallel, "{strategy} target {}", target.id());
        }
    }
}

#[test]
fn standardized_cosine_orders_by_profile_shape() {
    let target = PlayerProfile::new("t", "ST")
        .with_feature(Feature::Goals, 10.0)
        .with_feature(Feature::Tackles, 2.0);
    let pool = vec![
        target.clone(),
        PlayerProfile::new("alike", "CM")
            .with_feature(Feature::Goals, 9.0)
            .with_feature(Feature::Tackles, 3.0),
        PlayerProfile::new("opposite", "CB")
            .with_feature(Feature::Goals, 1.0)
            .with_feature(Feature::Tackles, 30.0),
        PlayerProfile::new("keeper", "GK")
            .with_feature(Feature::Goals, 10.0)
            .with_feature(Feature::Tackles, 2.0),
    ];

    let results = rank_standardized(&target, &pool, None).unwrap();
    assert_eq!(ids(&results), vec!["alike", "opposite"]);
    assert!(score_of(&results, "alike") > 0.9);
    assert!(score_of(&results, "opposite") < 0.1);
    assert!(results.iter().all(|r| (0.0..=1.0).contains(&r.score)));
}

#[test]
fn standardized_cosine_keeps_keepers_apart() {
    let pool = fixture_pool();
    let target = find_by_id(&pool, "gk-a").unwrap();
    let results = Ranker::new(bundled_table().unwrap())
        .with_strategy(SimilarityStrategy::StandardizedCosine)
        .rank(target, &pool, None)
        .unwrap();
    assert_eq!(ids(&results), vec!["gk-b", "gk-c"]);
    // Every keeper column has zero spread, so all vectors sit at the origin.
    assert!(results.iter().all(|r| r.score == 0.5));
}

#[test]
fn filtered_join_preserves_ranking_order() {
    let pool = fixture_pool();
    let table = bundled_table().unwrap();
    let target = find_by_id(&pool, "st-target").unwrap();
    let results = rank(target, &pool, table, None).unwrap();

    let rows = join_profiles(&results, &pool);
    assert_eq!(rows.len(), results.len());

    let filter = ResultFilter {
        age_range: (18.0, 30.0),
        min_similarity: 0.01,
        ..ResultFilter::default()
    };
    let kept = filter.apply(&rows);
    let kept_ids: Vec<&str> = kept.iter().map(|r| r.profile.id()).collect();
    assert_eq!(kept_ids, vec!["st-close"]);
}
