use std::collections::BTreeSet;

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use psellos_core::{
    build_index, normalize_assertions, participant_counts, persons_in_layer, LayerConfig,
    LayerStats,
};

const LAYERS: [Option<&str>; 4] = [None, Some("alt"), Some("draft"), Some("canon")];
const RELS: [Option<&str>; 3] = [None, Some("parent_of"), Some("spouse_of")];

/// (subject, object, layer, rel, object-as-reference) per assertion.
type Row = (u8, u8, usize, usize, bool);

fn row() -> impl Strategy<Value = Row> {
    (0u8..8, 0u8..8, 0..LAYERS.len(), 0..RELS.len(), any::<bool>())
}

fn rows_and_shuffle() -> impl Strategy<Value = (Vec<Value>, Vec<Value>)> {
    prop::collection::vec(row(), 0..40).prop_flat_map(|rows| {
        let values: Vec<Value> = rows.iter().enumerate().map(|(i, r)| to_json(i, r)).collect();
        (Just(values.clone()), Just(values).prop_shuffle())
    })
}

fn to_json(i: usize, (s, o, layer, rel, object_ref): &Row) -> Value {
    let object = if *object_ref {
        json!({"id": format!("P{o}")})
    } else {
        json!(format!("P{o}"))
    };
    let mut psellos = Map::new();
    if let Some(layer) = LAYERS[*layer] {
        psellos.insert("layer".to_string(), json!(layer));
    }
    if let Some(rel) = RELS[*rel] {
        psellos.insert("rel".to_string(), json!(rel));
    }
    json!({
        "id": format!("a{i:03}"),
        "subject": format!("P{s}"),
        "object": object,
        "extensions": {"psellos": psellos}
    })
}

fn objects(values: &[Value]) -> Vec<Map<String, Value>> {
    values
        .iter()
        .map(|v| v.as_object().cloned().expect("object"))
        .collect()
}

fn artifacts(values: &[Value], config: &LayerConfig) -> Vec<String> {
    let assertions = normalize_assertions(&objects(values)).expect("normalize");
    let index = build_index(&assertions, config);
    let stats = LayerStats::from_index(&index, config);
    vec![
        serde_json::to_string(index.by_id()).expect("by_id"),
        serde_json::to_string(index.by_participant()).expect("by_participant"),
        serde_json::to_string(index.by_layer()).expect("by_layer"),
        serde_json::to_string(index.by_participant_by_layer()).expect("by_participant_by_layer"),
        serde_json::to_string(&stats).expect("stats"),
    ]
}

fn is_strictly_ascending(ids: &[String]) -> bool {
    ids.windows(2).all(|w| w[0] < w[1])
}

proptest! {
    #[test]
    fn artifacts_do_not_depend_on_input_order((original, shuffled) in rows_and_shuffle()) {
        let config = LayerConfig::default();
        prop_assert_eq!(artifacts(&original, &config), artifacts(&shuffled, &config));
    }

    #[test]
    fn id_lists_are_sorted_and_layers_partition_ids((values, _) in rows_and_shuffle()) {
        let config = LayerConfig::default();
        let assertions = normalize_assertions(&objects(&values)).expect("normalize");
        let index = build_index(&assertions, &config);

        for ids in index.by_layer().values().chain(index.by_participant().values()) {
            prop_assert!(is_strictly_ascending(ids));
        }
        for layers in index.by_participant_by_layer().values() {
            for ids in layers.values() {
                prop_assert!(is_strictly_ascending(ids));
            }
        }

        let mut union = BTreeSet::new();
        let mut total = 0;
        for ids in index.by_layer().values() {
            total += ids.len();
            union.extend(ids.iter().cloned());
        }
        let all: BTreeSet<String> = index.by_id().keys().cloned().collect();
        prop_assert_eq!(total, union.len());
        prop_assert_eq!(union, all);
    }

    #[test]
    fn layer_diffs_reconstruct_each_layer((values, _) in rows_and_shuffle()) {
        let config = LayerConfig::default();
        let assertions = normalize_assertions(&objects(&values)).expect("normalize");
        let index = build_index(&assertions, &config);
        let stats = LayerStats::from_index(&index, &config);

        let canon: BTreeSet<String> = index.by_layer()["canon"].iter().cloned().collect();
        for (layer, comparison) in &stats.compare_to_canon {
            let ids: BTreeSet<String> = index.by_layer()[layer].iter().cloned().collect();
            let added: BTreeSet<String> = comparison.added.iter().cloned().collect();
            let removed: BTreeSet<String> = comparison.removed.iter().cloned().collect();

            prop_assert!(added.is_disjoint(&canon));
            prop_assert!(removed.is_disjoint(&ids));
            let rebuilt: BTreeSet<String> = canon
                .difference(&removed)
                .cloned()
                .chain(added.iter().cloned())
                .collect();
            prop_assert_eq!(rebuilt, ids);
            prop_assert!(is_strictly_ascending(&comparison.added));
            prop_assert!(is_strictly_ascending(&comparison.removed));
            prop_assert_eq!(comparison.added_count, comparison.added.len());
        }
        prop_assert!(!stats.compare_to_canon.contains_key("canon"));
    }

    #[test]
    fn rankings_are_bounded_and_ordered((values, _) in rows_and_shuffle(), top_n in 1usize..6) {
        let config = LayerConfig { top_n, ..LayerConfig::default() };
        let assertions = normalize_assertions(&objects(&values)).expect("normalize");
        let index = build_index(&assertions, &config);
        let stats = LayerStats::from_index(&index, &config);

        for ranking in stats.top_persons_by_layer.values() {
            prop_assert!(ranking.len() <= top_n);
            for pair in ranking.windows(2) {
                let ordered = pair[0].count > pair[1].count
                    || (pair[0].count == pair[1].count && pair[0].id < pair[1].id);
                prop_assert!(ordered);
            }
        }
        let again = LayerStats::from_index(&index, &config);
        prop_assert_eq!(again, stats);
    }

    #[test]
    fn person_counts_agree_with_participant_recount((values, _) in rows_and_shuffle()) {
        let config = LayerConfig::default();
        let assertions = normalize_assertions(&objects(&values)).expect("normalize");
        let index = build_index(&assertions, &config);

        for (layer, ids) in index.by_layer() {
            let recount = participant_counts(ids, index.by_id()).len();
            prop_assert_eq!(persons_in_layer(index.by_participant_by_layer(), layer), recount);
        }
    }
}
