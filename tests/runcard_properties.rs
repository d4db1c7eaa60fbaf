use proptest::prelude::*;
use powhegctl::runcard::{
    parse_run_card, render, BornSuppression, Folding, ParameterGroups, RunArgs,
    RunConfiguration, RunConfigurationBuilder,
};
use powhegctl::types::ProcessKind;

fn kind_strategy() -> impl Strategy<Value = ProcessKind> {
    prop::sample::select(ProcessKind::ALL.to_vec())
}

fn groups_strategy() -> impl Strategy<Value = ParameterGroups> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(electroweak, ckm, diboson, scales)| ParameterGroups {
            electroweak,
            ckm,
            diboson,
            scales,
        },
    )
}

// Arbitrary but valid configurations, built the same way the CLI builds them.
fn config_strategy() -> impl Strategy<Value = RunConfiguration> {
    (
        kind_strategy(),
        groups_strategy(),
        (1..=10i64, 1..=10i64, 1..=10i64),
        prop_oneof![Just(0i64), Just(1i64)],
        (1..=1_000_000i64, 1.0..14000.0f64, 0..=99999i64),
        (0.0..50.0f64, 0.0..1000.0f64),
    )
        .prop_map(|(kind, groups, folds, neg, (numevts, ecm, seed), (ktmin, supp))| {
            RunConfigurationBuilder::new(kind)
                .groups(groups)
                .folding(Folding::new(folds.0, folds.1, folds.2))
                .withnegweights(neg)
                .born(BornSuppression {
                    bornktmin: ktmin,
                    bornsuppfact: supp,
                })
                .apply_run_args(Some(&RunArgs {
                    ecm_energy: Some(ecm),
                    max_events: Some(numevts),
                    random_seed: Some(seed),
                }))
                .build()
        })
}

fn fold(parsed: &powhegctl::runcard::ParsedCard, key: &str) -> i64 {
    parsed.get(key).and_then(|v| v.parse().ok()).unwrap_or(-1)
}

proptest! {
    #[test]
    fn negative_weights_always_serialize_unit_folding(cfg in config_strategy()) {
        let parsed = parse_run_card(&render(&cfg).to_text()).unwrap();
        if cfg.withnegweights != 0 {
            let product = fold(&parsed, "foldcsi") * fold(&parsed, "foldy") * fold(&parsed, "foldphi");
            prop_assert_eq!(product, 1);
        } else {
            prop_assert_eq!(fold(&parsed, "foldcsi"), cfg.folding.foldcsi);
        }
    }

    #[test]
    fn rendering_is_deterministic(cfg in config_strategy()) {
        let first = render(&cfg);
        let second = render(&cfg.clone());
        prop_assert_eq!(first.to_text(), second.to_text());
        prop_assert_eq!(first.digest(), second.digest());
    }

    #[test]
    fn tokens_round_trip_through_the_parser(cfg in config_strategy()) {
        let card = render(&cfg);
        let parsed = parse_run_card(&card.to_text()).unwrap();

        prop_assert_eq!(parsed.pairs.len(), card.entries.len());
        for (entry, (key, value)) in card.entries.iter().zip(parsed.pairs.iter()) {
            prop_assert_eq!(entry.key, key.as_str());
            prop_assert_eq!(entry.value.to_string(), value.clone());
        }
    }

    #[test]
    fn optional_groups_appear_iff_enabled(cfg in config_strategy()) {
        let parsed = parse_run_card(&render(&cfg).to_text()).unwrap();
        prop_assert_eq!(parsed.count("Zmass") == 1, cfg.groups.electroweak);
        prop_assert_eq!(parsed.count("CKM_Vtb") == 1, cfg.groups.ckm);
        prop_assert_eq!(parsed.count("delg1_z") == 1, cfg.groups.diboson);
        prop_assert_eq!(parsed.count("runningscale") == 1, cfg.groups.scales);
    }
}
