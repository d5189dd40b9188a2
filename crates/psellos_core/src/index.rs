//! Assertion lookup indices.
//!
//! Construction is split in two: [`IndexAccumulator`] collects ids into
//! unordered sets, and [`IndexAccumulator::finish`] freezes them into an
//! [`AssertionIndex`] whose every id list is sorted and deduplicated. The
//! unordered intermediate never leaves this module.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::warn;

use crate::assertion::Assertion;
use crate::config::LayerConfig;

pub type IdList = Vec<String>;
pub type LayerIds = BTreeMap<String, IdList>;

/// Finalized, serialization-ready lookup structures over one assertion set.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionIndex {
    by_id: BTreeMap<String, Assertion>,
    by_participant: BTreeMap<String, IdList>,
    by_layer: LayerIds,
    by_participant_by_layer: BTreeMap<String, LayerIds>,
    duplicate_ids: IdList,
    unindexable: usize,
}

impl AssertionIndex {
    pub fn by_id(&self) -> &BTreeMap<String, Assertion> {
        &self.by_id
    }

    pub fn by_participant(&self) -> &BTreeMap<String, IdList> {
        &self.by_participant
    }

    pub fn by_layer(&self) -> &LayerIds {
        &self.by_layer
    }

    pub fn by_participant_by_layer(&self) -> &BTreeMap<String, LayerIds> {
        &self.by_participant_by_layer
    }

    /// Observed layer names, ascending.
    pub fn layers(&self) -> Vec<String> {
        self.by_layer.keys().cloned().collect()
    }

    /// Ids that occurred on more than one assertion.
    pub fn duplicate_ids(&self) -> &[String] {
        &self.duplicate_ids
    }

    /// Assertions skipped because their `id` was missing or not a string.
    pub fn unindexable(&self) -> usize {
        self.unindexable
    }
}

/// Accumulation phase of index construction.
#[derive(Debug)]
pub struct IndexAccumulator<'a> {
    config: &'a LayerConfig,
    by_id: HashMap<String, Assertion>,
    by_participant: HashMap<String, HashSet<String>>,
    by_layer: HashMap<String, HashSet<String>>,
    by_participant_by_layer: HashMap<String, HashMap<String, HashSet<String>>>,
    duplicate_ids: HashSet<String>,
    unindexable: usize,
}

impl<'a> IndexAccumulator<'a> {
    pub fn new(config: &'a LayerConfig) -> Self {
        Self {
            config,
            by_id: HashMap::new(),
            by_participant: HashMap::new(),
            by_layer: HashMap::new(),
            by_participant_by_layer: HashMap::new(),
            duplicate_ids: HashSet::new(),
            unindexable: 0,
        }
    }

    pub fn add(&mut self, assertion: &Assertion) {
        let Some(id) = assertion.id() else {
            self.unindexable += 1;
            return;
        };
        let layer = assertion.layer(self.config);

        self.by_layer
            .entry(layer.to_string())
            .or_default()
            .insert(id.to_string());
        for person in assertion.participants() {
            self.by_participant
                .entry(person.to_string())
                .or_default()
                .insert(id.to_string());
            self.by_participant_by_layer
                .entry(person.to_string())
                .or_default()
                .entry(layer.to_string())
                .or_default()
                .insert(id.to_string());
        }
        if self.by_id.insert(id.to_string(), assertion.clone()).is_some() {
            self.duplicate_ids.insert(id.to_string());
        }
    }

    pub fn finish(self) -> AssertionIndex {
        let mut by_layer = sorted_lists(self.by_layer);
        by_layer.entry(self.config.canon_layer.clone()).or_default();

        let by_participant_by_layer = self
            .by_participant_by_layer
            .into_iter()
            .map(|(person, layers)| (person, sorted_lists(layers)))
            .collect();

        AssertionIndex {
            by_id: self.by_id.into_iter().collect(),
            by_participant: sorted_lists(self.by_participant),
            by_layer,
            by_participant_by_layer,
            duplicate_ids: sorted(self.duplicate_ids),
            unindexable: self.unindexable,
        }
    }
}

/// Build all four indices over `assertions`. The result does not depend on input order,
/// except that a duplicated id keeps the last assertion carrying it in `by_id`.
pub fn build_index(assertions: &[Assertion], config: &LayerConfig) -> AssertionIndex {
    let mut acc = IndexAccumulator::new(config);
    for assertion in assertions {
        acc.add(assertion);
    }
    let index = acc.finish();
    if index.unindexable > 0 {
        warn!(
            skipped = index.unindexable,
            "assertions without a string id were left out of the indices"
        );
    }
    if !index.duplicate_ids.is_empty() {
        warn!(ids = ?index.duplicate_ids, "duplicate assertion ids");
    }
    index
}

fn sorted(set: HashSet<String>) -> IdList {
    let mut ids: IdList = set.into_iter().collect();
    ids.sort();
    ids
}

fn sorted_lists(map: HashMap<String, HashSet<String>>) -> BTreeMap<String, IdList> {
    map.into_iter().map(|(key, set)| (key, sorted(set))).collect()
}
