//! Randomized map tests against a `HashMap` oracle.

use std::collections::HashMap;

use itertools::Itertools;

use super::{proptest_runner, qc, Operation, TestPrefix};
use crate::{Prefix, PrefixMap};

/// Brute-force longest-prefix match over the oracle.
fn lpm_oracle(oracle: &HashMap<TestPrefix, i32>, q: &TestPrefix) -> Option<(TestPrefix, i32)> {
    oracle
        .iter()
        .filter(|(k, _)| k.contains(q))
        .max_by_key(|(k, _)| k.prefix_len())
        .map(|(k, v)| (*k, *v))
}

qc!(inserts_match_oracle, _inserts_match_oracle);
fn _inserts_match_oracle(list: Vec<(TestPrefix, i32)>) -> bool {
    let mut pmap = PrefixMap::new();
    let mut hmap = HashMap::new();

    for (p, t) in list {
        pmap.insert(p, t);
        hmap.insert(p, t);
    }

    pmap.len() == hmap.len()
        && pmap.validate().is_empty()
        && pmap.into_iter().eq(hmap.into_iter().sorted())
}

qc!(mixed_ops_match_oracle, _mixed_ops_match_oracle);
fn _mixed_ops_match_oracle(ops: Vec<Operation<TestPrefix, i32>>) -> bool {
    let mut pmap = PrefixMap::new();
    let mut hmap = HashMap::new();

    for op in ops {
        match op {
            Operation::Add(p, t) => {
                if pmap.insert(p, t) != hmap.insert(p, t) {
                    return false;
                }
            }
            Operation::Remove(p) => {
                if pmap.remove(&p) != hmap.remove(&p) {
                    return false;
                }
            }
        }
        if !pmap.validate().is_empty() {
            return false;
        }
    }

    pmap.len() == hmap.len() && pmap.into_iter().eq(hmap.into_iter().sorted())
}

qc!(entry_ops_match_oracle, _entry_ops_match_oracle);
fn _entry_ops_match_oracle(ops: Vec<Operation<TestPrefix, i32>>) -> bool {
    let mut pmap = PrefixMap::new();
    let mut hmap = HashMap::new();

    for op in ops {
        match op {
            Operation::Add(p, t) => {
                let _ = pmap.entry(p).insert(t);
                hmap.insert(p, t);
            }
            Operation::Remove(p) => {
                pmap.remove(&p);
                hmap.remove(&p);
            }
        }
    }

    pmap.into_iter().eq(hmap.into_iter().sorted())
}

qc!(lpm_matches_oracle, _lpm_matches_oracle);
fn _lpm_matches_oracle(input: (Vec<(TestPrefix, i32)>, Vec<TestPrefix>)) -> bool {
    let (list, probes) = input;
    let mut pmap = PrefixMap::new();
    let mut hmap = HashMap::new();

    for (p, t) in list {
        pmap.insert(p, t);
        hmap.insert(p, t);
    }

    probes.into_iter().all(|q| {
        let got = pmap.get_lpm(&q).map(|(p, v)| (*p, *v));
        got == lpm_oracle(&hmap, &q)
    })
}

qc!(insert_then_remove_is_identity, _insert_then_remove_is_identity);
fn _insert_then_remove_is_identity(input: (Vec<(TestPrefix, i32)>, TestPrefix)) -> bool {
    let (list, extra) = input;
    let mut pmap: PrefixMap<TestPrefix, i32> = list.iter().copied().collect();
    let had = pmap.contains_key(&extra);
    let before: Vec<_> = pmap.iter().map(|(p, v)| (*p, *v)).collect();

    pmap.insert(extra, i32::MAX);
    if !had {
        pmap.remove(&extra);
        if pmap.iter().map(|(p, v)| (*p, *v)).collect::<Vec<_>>() != before {
            return false;
        }
    }
    pmap.validate().is_empty()
}

/// The aggregated entries give the same longest-prefix match as the map
/// itself, for every probe at and around the stored prefixes.
qc!(aggregation_preserves_lpm, _aggregation_preserves_lpm);
fn _aggregation_preserves_lpm(list: Vec<(TestPrefix, i32)>) -> bool {
    let pmap: PrefixMap<TestPrefix, i32> = list.iter().copied().collect();
    let agg: PrefixMap<TestPrefix, i32> = pmap.aggregate().map(|(p, v)| (p, *v)).collect();

    let mut probes = Vec::new();
    for (p, _) in pmap.iter() {
        // the region boundaries of every entry
        probes.push(TestPrefix::from_bits_len(p.network(), 32));
        probes.push(TestPrefix::from_bits_len(
            p.network() | !crate::prefix_mask::<u32>(p.prefix_len()),
            32,
        ));
        if p.prefix_len() < 32 {
            let (lo, hi) = crate::arith::halves(p);
            probes.push(TestPrefix::from_bits_len(lo.network(), 32));
            probes.push(TestPrefix::from_bits_len(hi.network(), 32));
        }
    }

    probes.into_iter().all(|q| {
        pmap.get_lpm(&q).map(|(_, v)| *v) == agg.get_lpm(&q).map(|(_, v)| *v)
    })
}

qc!(aggregation_never_grows, _aggregation_never_grows);
fn _aggregation_never_grows(list: Vec<(TestPrefix, i32)>) -> bool {
    let pmap: PrefixMap<TestPrefix, i32> = list.into_iter().collect();
    let agg: Vec<_> = pmap.aggregate().collect();
    // aggregated entries are sorted and unique
    agg.len() <= pmap.len()
        && agg.windows(2).all(|w| w[0].0 < w[1].0)
}

qc!(clones_are_equal, _clones_are_equal);
fn _clones_are_equal(ops: Vec<Operation<TestPrefix, i32>>) -> bool {
    let mut pmap = PrefixMap::default();
    for op in ops {
        match op {
            Operation::Add(p, t) => {
                pmap.insert(p, t);
            }
            Operation::Remove(p) => {
                pmap.remove(&p);
            }
        }
    }
    let rebuilt = pmap.clone().into_iter().collect::<PrefixMap<_, _>>();
    pmap == rebuilt
}
