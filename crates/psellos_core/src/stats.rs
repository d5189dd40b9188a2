//! Per-layer statistics and layer-versus-canon comparisons.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assertion::Assertion;
use crate::config::LayerConfig;
use crate::index::{AssertionIndex, IdList, LayerIds};

pub type RelHistogram = BTreeMap<String, usize>;

/// One entry of a top-participant ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonCount {
    pub id: String,
    pub count: usize,
}

/// Differences between one layer and the canon layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerComparison {
    pub added: IdList,
    pub added_count: usize,
    pub removed: IdList,
    pub removed_count: usize,
    #[serde(rename = "added_persons_topN")]
    pub added_persons_top_n: Vec<PersonCount>,
    #[serde(rename = "removed_persons_topN")]
    pub removed_persons_top_n: Vec<PersonCount>,
    pub added_rel_count_by_type: RelHistogram,
    pub removed_rel_count_by_type: RelHistogram,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStats {
    pub assertion_count_by_layer: BTreeMap<String, usize>,
    pub person_count_by_layer: BTreeMap<String, usize>,
    pub rel_count_by_layer: BTreeMap<String, RelHistogram>,
    pub top_persons_by_layer: BTreeMap<String, Vec<PersonCount>>,
    pub compare_to_canon: BTreeMap<String, LayerComparison>,
}

impl LayerStats {
    pub fn from_index(index: &AssertionIndex, config: &LayerConfig) -> Self {
        compute_layer_stats(
            index.by_layer(),
            index.by_participant_by_layer(),
            index.by_id(),
            config,
        )
    }
}

pub fn compute_layer_stats(
    by_layer: &LayerIds,
    by_participant_by_layer: &BTreeMap<String, LayerIds>,
    by_id: &BTreeMap<String, Assertion>,
    config: &LayerConfig,
) -> LayerStats {
    let empty = IdList::new();
    let canon_ids = by_layer.get(&config.canon_layer).unwrap_or(&empty);

    let mut stats = LayerStats {
        assertion_count_by_layer: BTreeMap::new(),
        person_count_by_layer: BTreeMap::new(),
        rel_count_by_layer: BTreeMap::new(),
        top_persons_by_layer: BTreeMap::new(),
        compare_to_canon: BTreeMap::new(),
    };

    for (layer, ids) in by_layer {
        stats.assertion_count_by_layer.insert(layer.clone(), ids.len());
        stats.person_count_by_layer.insert(
            layer.clone(),
            persons_in_layer(by_participant_by_layer, layer),
        );
        stats
            .rel_count_by_layer
            .insert(layer.clone(), rel_histogram(ids, by_id, config));
        stats.top_persons_by_layer.insert(
            layer.clone(),
            top_participants(participant_counts(ids, by_id), config.top_n),
        );

        if config.is_canon(layer) {
            continue;
        }
        let comparison = compare_layer(ids, canon_ids, by_id, config);
        debug!(
            layer = %layer,
            added = comparison.added_count,
            removed = comparison.removed_count,
            "compared layer to canon"
        );
        stats.compare_to_canon.insert(layer.clone(), comparison);
    }

    stats
}

/// Number of people with at least one assertion in `layer`.
pub fn persons_in_layer(by_participant_by_layer: &BTreeMap<String, LayerIds>, layer: &str) -> usize {
    by_participant_by_layer
        .values()
        .filter(|layers| layers.get(layer).is_some_and(|ids| !ids.is_empty()))
        .count()
}

/// How often each person appears as subject or object among `ids`.
///
/// Subject and object are counted separately, so a self-referencing assertion
/// counts twice for its person. Ids missing from `by_id` are skipped.
pub fn participant_counts<'a, I>(ids: I, by_id: &BTreeMap<String, Assertion>) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for assertion in ids.into_iter().filter_map(|id| by_id.get(id)) {
        for person in assertion.participants() {
            *counts.entry(person.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

/// Highest counts first, ties broken by ascending id, at most `limit` entries.
pub fn top_participants(counts: BTreeMap<String, usize>, limit: usize) -> Vec<PersonCount> {
    let mut ranked: Vec<PersonCount> = counts
        .into_iter()
        .map(|(id, count)| PersonCount { id, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.id.cmp(&b.id)));
    ranked.truncate(limit);
    ranked
}

/// Relation-type histogram over `ids`; untagged assertions land in the
/// configured no-relation bucket.
pub fn rel_histogram<'a, I>(ids: I, by_id: &BTreeMap<String, Assertion>, config: &LayerConfig) -> RelHistogram
where
    I: IntoIterator<Item = &'a String>,
{
    let mut histogram = RelHistogram::new();
    for assertion in ids.into_iter().filter_map(|id| by_id.get(id)) {
        let rel = assertion.rel().unwrap_or(config.no_rel_bucket.as_str());
        *histogram.entry(rel.to_string()).or_insert(0) += 1;
    }
    histogram
}

pub fn compare_layer(
    layer_ids: &[String],
    canon_ids: &[String],
    by_id: &BTreeMap<String, Assertion>,
    config: &LayerConfig,
) -> LayerComparison {
    let layer_set: BTreeSet<&String> = layer_ids.iter().collect();
    let canon_set: BTreeSet<&String> = canon_ids.iter().collect();

    let added: IdList = layer_set.difference(&canon_set).map(|id| (*id).clone()).collect();
    let removed: IdList = canon_set.difference(&layer_set).map(|id| (*id).clone()).collect();

    LayerComparison {
        added_count: added.len(),
        removed_count: removed.len(),
        added_persons_top_n: top_participants(participant_counts(&added, by_id), config.top_n),
        removed_persons_top_n: top_participants(participant_counts(&removed, by_id), config.top_n),
        added_rel_count_by_type: rel_histogram(&added, by_id, config),
        removed_rel_count_by_type: rel_histogram(&removed, by_id, config),
        added,
        removed,
    }
}
