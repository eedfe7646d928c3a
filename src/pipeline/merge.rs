// Historical + live sample merge with id-based deduplication

use std::collections::HashSet;

use crate::models::{Sample, SampleId};

/// Samples with pairwise distinct ids, in historical-then-live order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedSampleSet(Vec<Sample>);

impl MergedSampleSet {
    pub fn samples(&self) -> &[Sample] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> HashSet<SampleId> {
        self.0.iter().map(|s| s.id).collect()
    }

    pub fn into_inner(self) -> Vec<Sample> {
        self.0
    }
}

impl<'a> IntoIterator for &'a MergedSampleSet {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Merge a historical batch with a live batch.
///
/// Presence of an id decides precedence, values are never compared: a historical
/// sample always wins over a live sample with the same id, and live samples whose
/// id is not (yet) in the historical batch are appended. Within a batch the first
/// occurrence of an id wins. Historical order is preserved.
pub fn merge(historical: &[Sample], live: &[Sample]) -> MergedSampleSet {
    let mut seen: HashSet<SampleId> = HashSet::with_capacity(historical.len() + live.len());
    let mut out: Vec<Sample> = Vec::with_capacity(historical.len() + live.len());
    for s in historical.iter().chain(live) {
        if seen.insert(s.id) {
            out.push(s.clone());
        }
    }
    MergedSampleSet(out)
}
