use std::cmp::Ordering;
use std::collections::BinaryHeap;
use serde::{Serialize, Deserialize};
use crate::core::types::{DocCount, DocId, TermCount, Weight};

/// One ranked match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MSetItem {
    pub did: DocId,
    pub weight: Weight,
    pub collapse_key: Option<String>,
}

/// Ranked, bounded result of a match run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MSet {
    pub items: Vec<MSetItem>,
    pub first_item: DocCount,            // Offset the caller asked for
    pub matches_lower_bound: DocCount,
    pub max_possible: Weight,
    pub max_attained: Weight,
}

impl MSet {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Weight as a percentage of the maximum possible weight.
    /// Any positive weight is at least 1%.
    pub fn convert_to_percent(&self, weight: Weight) -> u8 {
        if self.max_possible <= 0.0 {
            return 0;
        }
        let percent = (weight * 100.0 / self.max_possible).ceil().clamp(0.0, 100.0) as u8;
        if percent == 0 && weight > 0.0 {
            1
        } else {
            percent
        }
    }

    pub fn percent(&self, item: &MSetItem) -> u8 {
        self.convert_to_percent(item.weight)
    }
}

/// One suggested expansion term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ESetItem {
    pub tname: String,
    pub weight: Weight,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ESet {
    pub items: Vec<ESetItem>,
    pub ebound: TermCount,  // Candidate terms considered
}

impl ESet {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Heap entry ordered so that the worst-ranked item is the maximum
struct Ranked {
    item: MSetItem,
    sort_forward: bool,
}

impl Ranked {
    fn rank_cmp(&self, other: &Self) -> Ordering {
        // Higher weight ranks first; ties broken by document id
        let by_weight = other.item.weight.partial_cmp(&self.item.weight).unwrap_or(Ordering::Equal);
        let by_id = if self.sort_forward {
            self.item.did.cmp(&other.item.did)
        } else {
            other.item.did.cmp(&self.item.did)
        };
        by_weight.then(by_id)
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.rank_cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank_cmp(other)
    }
}

/// Top-K collector keeping the best `k` items seen
pub struct MSetCollector {
    heap: BinaryHeap<Ranked>,
    k: usize,
    sort_forward: bool,
    pub total_collected: usize,
    pub max_attained: Weight,
}

impl MSetCollector {
    pub fn new(k: usize, sort_forward: bool) -> Self {
        MSetCollector {
            heap: BinaryHeap::with_capacity(k.saturating_add(1).min(1024)),
            k,
            sort_forward,
            total_collected: 0,
            max_attained: 0.0,
        }
    }

    pub fn collect(&mut self, item: MSetItem) {
        self.total_collected += 1;
        if item.weight > self.max_attained {
            self.max_attained = item.weight;
        }
        if self.k == 0 {
            return;
        }

        self.heap.push(Ranked { item, sort_forward: self.sort_forward });
        if self.heap.len() > self.k {
            self.heap.pop();
        }
    }

    /// Collected items, best first
    pub fn into_sorted_items(self) -> Vec<MSetItem> {
        self.heap.into_sorted_vec().into_iter().map(|ranked| ranked.item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u32, weight: Weight) -> MSetItem {
        MSetItem { did: DocId(id), weight, collapse_key: None }
    }

    #[test]
    fn test_convert_to_percent() {
        let mset = MSet { max_possible: 4.0, ..MSet::default() };
        assert_eq!(mset.convert_to_percent(4.0), 100);
        assert_eq!(mset.convert_to_percent(2.0), 50);
        assert_eq!(mset.convert_to_percent(8.0), 100);
        assert_eq!(mset.convert_to_percent(0.0), 0);
        assert_eq!(mset.convert_to_percent(0.0001), 1);
        assert_eq!(mset.percent(&item(1, 1.0)), 25);

        let empty = MSet::default();
        assert_eq!(empty.convert_to_percent(1.0), 0);
    }

    #[test]
    fn test_collector_keeps_best() {
        let mut collector = MSetCollector::new(2, true);
        for (id, weight) in [(1, 0.5), (2, 3.0), (3, 1.0), (4, 2.0)] {
            collector.collect(item(id, weight));
        }
        assert_eq!(collector.total_collected, 4);
        assert_eq!(collector.max_attained, 3.0);

        let ids: Vec<u32> = collector.into_sorted_items().iter().map(|i| i.did.0).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_collector_tie_order() {
        let mut forward = MSetCollector::new(10, true);
        let mut backward = MSetCollector::new(10, false);
        for id in [3, 1, 2] {
            forward.collect(item(id, 1.0));
            backward.collect(item(id, 1.0));
        }
        let f: Vec<u32> = forward.into_sorted_items().iter().map(|i| i.did.0).collect();
        let b: Vec<u32> = backward.into_sorted_items().iter().map(|i| i.did.0).collect();
        assert_eq!(f, vec![1, 2, 3]);
        assert_eq!(b, vec![3, 2, 1]);
    }

    #[test]
    fn test_collector_zero_capacity_still_counts() {
        let mut collector = MSetCollector::new(0, true);
        collector.collect(item(1, 2.0));
        assert_eq!(collector.total_collected, 1);
        assert_eq!(collector.max_attained, 2.0);
        assert!(collector.into_sorted_items().is_empty());
    }
}
