//! Randomized set tests against an explicit address-set oracle.
//!
//! All operations stay inside the 256 addresses of a single block, so the
//! oracle can simply enumerate addresses.

use std::collections::BTreeSet;

use quickcheck::Arbitrary;

use super::{proptest_runner, qc};
use crate::CidrSet;

const BASE: u32 = 0x0a00_0000;

/// A random CIDR within the 256-address block at `BASE`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SmallNet(u32, u8);

impl Arbitrary for SmallNet {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let host_bits = *g.choose(&[0u8, 0, 1, 1, 2, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let len = 32 - host_bits;
        let bits = (BASE | (u32::arbitrary(g) & 0xff)) & crate::prefix_mask::<u32>(len);
        Self(bits, len)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        if self.1 == 32 {
            quickcheck::empty_shrinker()
        } else {
            quickcheck::single_shrinker(Self(self.0, self.1 + 1))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SetOp {
    Insert(SmallNet),
    Remove(SmallNet),
}

impl Arbitrary for SetOp {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        if g.choose(&[true, true, false]).copied().unwrap_or_default() {
            Self::Insert(SmallNet::arbitrary(g))
        } else {
            Self::Remove(SmallNet::arbitrary(g))
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            SetOp::Insert(n) => Box::new(n.shrink().map(SetOp::Insert)),
            SetOp::Remove(n) => Box::new(n.shrink().map(SetOp::Remove)),
        }
    }
}

fn addrs_of(net: SmallNet) -> impl Iterator<Item = u32> {
    let count = 1u32 << (32 - net.1);
    net.0..net.0 + count
}

fn build(ops: &[SetOp]) -> Option<(CidrSet<(u32, u8)>, BTreeSet<u32>)> {
    let mut set: CidrSet<(u32, u8)> = CidrSet::new();
    let mut oracle: BTreeSet<u32> = BTreeSet::new();
    for op in ops {
        match *op {
            SetOp::Insert(n) => {
                set.insert((n.0, n.1));
                oracle.extend(addrs_of(n));
            }
            SetOp::Remove(n) => {
                set.remove(&(n.0, n.1));
                for a in addrs_of(n) {
                    oracle.remove(&a);
                }
            }
        }
        if !set.validate().is_empty() {
            return None;
        }
    }
    Some((set, oracle))
}

fn matches_oracle(set: &CidrSet<(u32, u8)>, oracle: &BTreeSet<u32>) -> bool {
    set.addr_count() == oracle.len() as u128
        && (BASE..BASE + 256).all(|a| set.contains(&(a, 32)) == oracle.contains(&a))
}

qc!(set_matches_oracle, _set_matches_oracle);
fn _set_matches_oracle(ops: Vec<SetOp>) -> bool {
    match build(&ops) {
        Some((set, oracle)) => matches_oracle(&set, &oracle),
        None => false,
    }
}

qc!(set_stays_minimal, _set_stays_minimal);
fn _set_stays_minimal(ops: Vec<SetOp>) -> bool {
    // validate() checks disjointness and that no two adjacent CIDRs are
    // combinable, which together with coverage means minimality
    match build(&ops) {
        Some((set, oracle)) => {
            let expanded: BTreeSet<u32> = set.addrs(0).map(|p| p.0).collect();
            expanded == oracle
        }
        None => false,
    }
}

qc!(set_algebra_matches_oracle, _set_algebra_matches_oracle);
fn _set_algebra_matches_oracle(input: (Vec<SetOp>, Vec<SetOp>)) -> bool {
    let Some((a, a_oracle)) = build(&input.0) else { return false };
    let Some((b, b_oracle)) = build(&input.1) else { return false };

    let union = a.union(&b);
    let difference = a.difference(&b);
    let intersection = a.intersection(&b);
    if !union.validate().is_empty()
        || !difference.validate().is_empty()
        || !intersection.validate().is_empty()
    {
        return false;
    }

    matches_oracle(&union, &a_oracle.union(&b_oracle).copied().collect())
        && matches_oracle(
            &difference,
            &a_oracle.difference(&b_oracle).copied().collect(),
        )
        && matches_oracle(
            &intersection,
            &a_oracle.intersection(&b_oracle).copied().collect(),
        )
}

qc!(set_algebra_laws, _set_algebra_laws);
fn _set_algebra_laws(input: (Vec<SetOp>, Vec<SetOp>)) -> bool {
    let Some((a, _)) = build(&input.0) else { return false };
    let Some((b, _)) = build(&input.1) else { return false };

    a.union(&b) == b.union(&a)
        && a.union(&a) == a
        && a.intersection(&a) == a
        && a.difference(&a).is_empty()
        && a.difference(&b).intersection(&b).is_empty()
        && a.intersection(&b)
            .iter()
            .all(|p| a.contains(p) && b.contains(p))
}
