use proptest::prelude::*;

use scout_similarity::similarity::feature_similarity;
use scout_similarity::{Feature, PlayerProfile, bundled_table, rank, score};

const CODES: [&str; 6] = ["GK", "CB", "CM", "CAM", "ST", "LW"];

const TRACKED: [Feature; 10] = [
    Feature::Age,
    Feature::Minutes,
    Feature::Goals,
    Feature::Assists,
    Feature::Xg,
    Feature::Tackles,
    Feature::Interceptions,
    Feature::PassAccuracy,
    Feature::Saves,
    Feature::SavePercentage,
];

fn build(id: &str, code: &str, values: &[Option<f64>]) -> PlayerProfile {
    TRACKED
        .iter()
        .zip(values)
        .fold(PlayerProfile::new(id, code), |p, (feature, value)| match value {
            Some(v) => p.with_feature(*feature, *v),
            None => p,
        })
}

fn values() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::of(0.0f64..3000.0), TRACKED.len())
}

fn code() -> impl Strategy<Value = &'static str> {
    prop::sample::select(CODES.to_vec())
}

fn has_weighted_feature(p: &PlayerProfile) -> bool {
    bundled_table()
        .unwrap()
        .entries(p.role())
        .any(|w| p.feature(w.feature).is_some())
}

proptest! {
    #[test]
    fn scores_stay_in_unit_range(ca in code(), va in values(), cb in code(), vb in values()) {
        let a = build("a", ca, &va);
        let b = build("b", cb, &vb);
        let s = score(&a, &b, bundled_table().unwrap());
        prop_assert!((0.0..=1.0).contains(&s), "score {}", s);
    }

    #[test]
    fn weighted_score_is_symmetric(c in code(), va in values(), vb in values()) {
        let table = bundled_table().unwrap();
        let a = build("a", c, &va);
        let b = build("b", c, &vb);
        prop_assert_eq!(score(&a, &b, table), score(&b, &a, table));
    }

    #[test]
    fn profile_is_fully_similar_to_itself(c in code(), v in values()) {
        let p = build("p", c, &v);
        let s = score(&p, &p, bundled_table().unwrap());
        if has_weighted_feature(&p) {
            prop_assert_eq!(s, 1.0);
        } else {
            prop_assert_eq!(s, 0.0);
        }
    }

    #[test]
    fn different_position_codes_never_compare(
        i in 0usize..CODES.len(),
        j in 0usize..CODES.len(),
        v in values(),
    ) {
        prop_assume!(i != j);
        let a = build("a", CODES[i], &v);
        let b = build("b", CODES[j], &v);
        prop_assert_eq!(score(&a, &b, bundled_table().unwrap()), 0.0);
    }

    #[test]
    fn one_sided_feature_leaves_score_unchanged(
        c in code(),
        va in values(),
        vb in values(),
        slot in 0usize..TRACKED.len(),
        extra in 0.0f64..3000.0,
    ) {
        let table = bundled_table().unwrap();
        let mut va = va;
        va[slot] = None;
        let mut vb_without = vb.clone();
        vb_without[slot] = None;
        let mut vb_with = vb;
        vb_with[slot] = Some(extra);

        let a = build("a", c, &va);
        let without = score(&a, &build("b", c, &vb_without), table);
        let with = score(&a, &build("b", c, &vb_with), table);
        prop_assert_eq!(without, with);
    }

    #[test]
    fn feature_similarity_decays_monotonically(
        max_difference in 0.1f64..5000.0,
        step in 0.0f64..500.0,
        steps in 1usize..20,
    ) {
        let mut previous = feature_similarity(0.0, max_difference);
        prop_assert_eq!(previous, 1.0);
        for k in 1..=steps {
            let current = feature_similarity(step * k as f64, max_difference);
            prop_assert!(current <= previous);
            prop_assert!(current >= 0.0);
            previous = current;
        }
    }

    #[test]
    fn ranking_is_non_increasing(
        rows in prop::collection::vec((code(), values()), 1..40),
        target_idx in 0usize..40,
    ) {
        let pool: Vec<PlayerProfile> = rows
            .iter()
            .enumerate()
            .map(|(i, (c, v))| build(&format!("p{i:02}"), c, v))
            .collect();
        let target = &pool[target_idx % pool.len()];
        let results = rank(target, &pool, bundled_table().unwrap(), None).unwrap();
        prop_assert_eq!(results.len(), pool.len() - 1);
        prop_assert!(results.iter().all(|r| r.candidate_id != target.id()));
        prop_assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
