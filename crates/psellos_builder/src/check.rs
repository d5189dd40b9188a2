//! Post-build verification of a dist directory.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde_json::Value;

use psellos_core::{classify_layer, Assertion, LayerConfig, LayerStats};

use crate::dataset::Dataset;
use crate::dist::{artifact_path, ASSERTIONS_BY_ID, ASSERTIONS_BY_LAYER, LAYERS, LAYER_STATS};
use crate::error::BuildError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub layers: Vec<String>,
    pub assertions: usize,
    pub comparisons: usize,
}

/// Shape checks only: the layer index and `layers.json` are sorted and agree.
pub fn verify_layer_shape(dist: &Path) -> Result<Vec<String>, BuildError> {
    let by_layer = read_layer_index(dist)?;
    let layers: Vec<String> = by_layer.keys().cloned().collect();
    verify_layers_json(dist, &layers)?;
    Ok(layers)
}

/// Recompute the id and layer indices from the raw dataset and compare them
/// with what was written, then check every layer comparison against the layer index.
pub fn verify_dist(
    dist: &Path,
    dataset: &Dataset,
    config: &LayerConfig,
) -> Result<CheckReport, BuildError> {
    let (expected_by_id, expected_by_layer) = expected_indices(dataset, config)?;

    let by_id = read_object(dist, ASSERTIONS_BY_ID)?;
    assert_sorted(&by_id.keys().cloned().collect::<Vec<_>>(), "assertions_by_id keys")?;
    if Value::Object(by_id) != expected_by_id {
        return Err(BuildError::Check(
            "assertions_by_id.json does not match expected assertions".to_string(),
        ));
    }

    let by_layer = read_layer_index(dist)?;
    if by_layer != expected_by_layer {
        return Err(BuildError::Check(
            "assertions_by_layer.json does not match the expected layer index".to_string(),
        ));
    }
    let layers: Vec<String> = by_layer.keys().cloned().collect();
    verify_layers_json(dist, &layers)?;

    let comparisons = verify_layer_stats(dist, &by_layer, config)?;
    let assertions = expected_by_layer.values().map(Vec::len).sum();
    Ok(CheckReport {
        layers,
        assertions,
        comparisons,
    })
}

fn expected_indices(
    dataset: &Dataset,
    config: &LayerConfig,
) -> Result<(Value, BTreeMap<String, Vec<String>>), BuildError> {
    let mut by_id = serde_json::Map::new();
    let mut by_layer: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    by_layer.entry(config.canon_layer.clone()).or_default();
    for raw in &dataset.assertions {
        let Some(id) = raw.get("id").and_then(Value::as_str) else {
            continue;
        };
        let normalized = Assertion::normalize(raw)?;
        by_layer
            .entry(classify_layer(raw, config).to_string())
            .or_default()
            .insert(id.to_string());
        by_id.insert(id.to_string(), Value::Object(normalized.fields().clone()));
    }
    let by_layer = by_layer
        .into_iter()
        .map(|(layer, ids)| (layer, ids.into_iter().collect()))
        .collect();
    Ok((Value::Object(by_id), by_layer))
}

fn verify_layer_stats(
    dist: &Path,
    by_layer: &BTreeMap<String, Vec<String>>,
    config: &LayerConfig,
) -> Result<usize, BuildError> {
    let value = read_json(dist, LAYER_STATS)?;
    let stats: LayerStats = serde_json::from_value(value)
        .map_err(|err| BuildError::Check(format!("layer_stats.json: {}", err)))?;

    let empty: Vec<String> = Vec::new();
    let canon: BTreeSet<&String> = by_layer.get(&config.canon_layer).unwrap_or(&empty).iter().collect();
    for (layer, comparison) in &stats.compare_to_canon {
        let ids: BTreeSet<&String> = by_layer
            .get(layer)
            .ok_or_else(|| BuildError::Check(format!("layer_stats compares unknown layer {}", layer)))?
            .iter()
            .collect();
        assert_sorted(&comparison.added, &format!("added ids for {}", layer))?;
        assert_sorted(&comparison.removed, &format!("removed ids for {}", layer))?;
        let added: BTreeSet<&String> = comparison.added.iter().collect();
        let removed: BTreeSet<&String> = comparison.removed.iter().collect();
        let rebuilt: BTreeSet<&String> = canon
            .difference(&removed)
            .copied()
            .chain(added.iter().copied())
            .collect();
        if !added.is_disjoint(&canon) || !removed.is_disjoint(&ids) || rebuilt != ids {
            return Err(BuildError::Check(format!(
                "layer_stats comparison for {} is inconsistent with assertions_by_layer",
                layer
            )));
        }
    }
    Ok(stats.compare_to_canon.len())
}

fn verify_layers_json(dist: &Path, expected: &[String]) -> Result<(), BuildError> {
    let value = read_json(dist, LAYERS)?;
    let Value::Array(items) = value else {
        return Err(BuildError::Check("layers.json must be a JSON array".to_string()));
    };
    let layers = string_list(&items, "layers.json entries")?;
    assert_sorted(&layers, "layers.json entries")?;
    if layers != expected {
        return Err(BuildError::Check(
            "layers.json must match assertions_by_layer.json keys".to_string(),
        ));
    }
    Ok(())
}

fn read_layer_index(dist: &Path) -> Result<BTreeMap<String, Vec<String>>, BuildError> {
    let raw = read_object(dist, ASSERTIONS_BY_LAYER)?;
    assert_sorted(&raw.keys().cloned().collect::<Vec<_>>(), "layer keys")?;
    let mut by_layer = BTreeMap::new();
    for (layer, ids) in raw {
        let Value::Array(items) = ids else {
            return Err(BuildError::Check(format!(
                "layer {} assertion ids must be a list",
                layer
            )));
        };
        let label = format!("assertion ids for {}", layer);
        let ids = string_list(&items, &label)?;
        assert_sorted(&ids, &label)?;
        by_layer.insert(layer, ids);
    }
    Ok(by_layer)
}

fn read_object(dist: &Path, name: &str) -> Result<serde_json::Map<String, Value>, BuildError> {
    match read_json(dist, name)? {
        Value::Object(map) => Ok(map),
        _ => Err(BuildError::Check(format!("{}.json must be a JSON object", name))),
    }
}

fn read_json(dist: &Path, name: &str) -> Result<Value, BuildError> {
    let path = artifact_path(dist, name);
    if !path.exists() {
        return Err(BuildError::Check(format!("{}.json was not created", name)));
    }
    let text = std::fs::read_to_string(&path)
        .map_err(|err| BuildError::Io(format!("read {}: {}", path.display(), err)))?;
    // Key order is checked on the raw text: the parsed map may reorder keys.
    verify_text_key_order(&text, name)?;
    serde_json::from_str(&text).map_err(|err| BuildError::Json(format!("{}.json: {}", name, err)))
}

fn verify_text_key_order(text: &str, name: &str) -> Result<(), BuildError> {
    match serde_json::from_str::<OrderedKeys>(text) {
        Ok(OrderedKeys(true)) => Ok(()),
        Ok(OrderedKeys(false)) => Err(BuildError::Check(format!(
            "{}.json keys must be sorted lexicographically",
            name
        ))),
        Err(err) => Err(BuildError::Json(format!("{}.json: {}", name, err))),
    }
}

fn string_list(items: &[Value], label: &str) -> Result<Vec<String>, BuildError> {
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| BuildError::Check(format!("{} must be strings", label)))
        })
        .collect()
}

fn assert_sorted(items: &[String], label: &str) -> Result<(), BuildError> {
    if items.windows(2).all(|w| w[0] < w[1]) {
        Ok(())
    } else {
        Err(BuildError::Check(format!(
            "{} must be sorted lexicographically without duplicates",
            label
        )))
    }
}

/// Deserializes any JSON document, recording whether every object's keys
/// appeared in ascending order.
struct OrderedKeys(bool);

impl<'de> serde::Deserialize<'de> for OrderedKeys {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OrderedKeysVisitor)
    }
}

struct OrderedKeysVisitor;

impl<'de> serde::de::Visitor<'de> for OrderedKeysVisitor {
    type Value = OrderedKeys;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: serde::de::Error>(self, _: bool) -> Result<OrderedKeys, E> {
        Ok(OrderedKeys(true))
    }

    fn visit_i64<E: serde::de::Error>(self, _: i64) -> Result<OrderedKeys, E> {
        Ok(OrderedKeys(true))
    }

    fn visit_u64<E: serde::de::Error>(self, _: u64) -> Result<OrderedKeys, E> {
        Ok(OrderedKeys(true))
    }

    fn visit_f64<E: serde::de::Error>(self, _: f64) -> Result<OrderedKeys, E> {
        Ok(OrderedKeys(true))
    }

    fn visit_str<E: serde::de::Error>(self, _: &str) -> Result<OrderedKeys, E> {
        Ok(OrderedKeys(true))
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<OrderedKeys, E> {
        Ok(OrderedKeys(true))
    }

    fn visit_seq<A: serde::de::SeqAccess<'de>>(self, mut seq: A) -> Result<OrderedKeys, A::Error> {
        let mut ordered = true;
        while let Some(OrderedKeys(item)) = seq.next_element()? {
            ordered &= item;
        }
        Ok(OrderedKeys(ordered))
    }

    fn visit_map<A: serde::de::MapAccess<'de>>(self, mut map: A) -> Result<OrderedKeys, A::Error> {
        let mut ordered = true;
        let mut previous: Option<String> = None;
        while let Some(key) = map.next_key::<String>()? {
            if previous.as_ref().is_some_and(|prev| *prev >= key) {
                ordered = false;
            }
            let OrderedKeys(value) = map.next_value()?;
            ordered &= value;
            previous = Some(key);
        }
        Ok(OrderedKeys(ordered))
    }
}
