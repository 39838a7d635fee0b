//! Region schedule for per-region tiers.
//!
//! The schedule is `repeat(each distinct region, weight)` under a uniform
//! random permutation (Fisher–Yates). Slot `k` names the region sampled by the
//! `k`-th draw of the tier (0-based, in counter order).

use std::sync::Arc;

use ld_core::{AllocationPolicy, DrawRng, Entry, PrizeTier, RegionKey};

use super::quota::distinct_regions;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionSchedule {
    slots: Vec<RegionKey>,
}

impl RegionSchedule {
    /// Region governing the draw at `ordinal`.
    pub fn slot(&self, ordinal: usize) -> Option<&RegionKey> {
        self.slots.get(ordinal)
    }

    pub fn slots(&self) -> &[RegionKey] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Build the shuffled schedule for a per-region tier; `None` for flat tiers.
pub fn build_region_schedule(
    tier: &PrizeTier,
    available: &[Arc<Entry>],
    rng: &mut DrawRng,
) -> Option<RegionSchedule> {
    let AllocationPolicy::PerRegion { weight } = tier.policy else {
        return None;
    };
    let mut slots: Vec<RegionKey> = distinct_regions(available)
        .into_iter()
        .flat_map(|r| std::iter::repeat(r).take(weight as usize))
        .collect();
    rng.shuffle_in_place(&mut slots);
    Some(RegionSchedule { slots })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ld_core::{EntryId, RegionTag};
    use std::collections::BTreeMap;

    fn entry(id: &str, region: &str) -> Arc<Entry> {
        Arc::new(
            Entry::new(EntryId::new(id).unwrap(), id, "0900000000")
                .with_region(RegionTag::new(region).unwrap()),
        )
    }

    fn counts(s: &RegionSchedule) -> BTreeMap<RegionKey, usize> {
        let mut m = BTreeMap::new();
        for r in s.slots() {
            *m.entry(r.clone()).or_insert(0) += 1;
        }
        m
    }

    #[test]
    fn flat_tier_has_no_schedule() {
        let tier = PrizeTier::flat("Giải Nhất", "5.000.000đ", 1).unwrap();
        let mut rng = DrawRng::from_seed_u64(1);
        assert!(build_region_schedule(&tier, &[entry("A", "N")], &mut rng).is_none());
    }

    #[test]
    fn schedule_is_weighted_multiset_of_regions() {
        let tier = PrizeTier::per_region("Giải Ba", "2.000.000đ", 6, 2).unwrap();
        let pool = vec![entry("A", "N"), entry("B", "S"), entry("C", "S"), entry("D", "C")];
        let mut rng = DrawRng::from_seed_u64(99);
        let s = build_region_schedule(&tier, &pool, &mut rng).unwrap();
        assert_eq!(s.len(), 6);
        assert!(counts(&s).values().all(|&n| n == 2));
        assert_eq!(counts(&s).len(), 3);
        assert!(s.slot(5).is_some());
        assert!(s.slot(6).is_none());
    }

    #[test]
    fn same_seed_same_schedule() {
        let tier = PrizeTier::per_region("Giải Nhì", "3.000.000đ", 3, 1).unwrap();
        let pool: Vec<_> = (0..8).map(|i| entry(&format!("E{i}"), &format!("R{i}"))).collect();
        let a = build_region_schedule(&tier, &pool, &mut DrawRng::from_seed_u64(5)).unwrap();
        let b = build_region_schedule(&tier, &pool, &mut DrawRng::from_seed_u64(5)).unwrap();
        assert_eq!(a, b);
    }

    proptest::proptest! {
        #[test]
        fn every_region_appears_weight_times(
            regions in proptest::collection::vec(proptest::option::of(0u8..6), 1..40),
            weight in 1u32..4,
            seed in proptest::prelude::any::<u64>(),
        ) {
            let pool: Vec<Arc<Entry>> = regions
                .iter()
                .enumerate()
                .map(|(i, r)| {
                    let e = Entry::new(EntryId::new(format!("E{i}")).unwrap(), "x", "0900000000");
                    Arc::new(match r {
                        Some(r) => e.with_region(RegionTag::new(format!("R{r}")).unwrap()),
                        None => e,
                    })
                })
                .collect();
            let tier = PrizeTier::per_region("Giải Ba", "2.000.000đ", 6, weight).unwrap();
            let s = build_region_schedule(&tier, &pool, &mut DrawRng::from_seed_u64(seed)).unwrap();
            let distinct = distinct_regions(&pool).len();
            proptest::prop_assert_eq!(s.len(), distinct * weight as usize);
            proptest::prop_assert_eq!(counts(&s).len(), distinct);
            proptest::prop_assert!(counts(&s).values().all(|&n| n == weight as usize));
        }
    }
}
