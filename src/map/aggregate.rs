//! Aggregation of a [`PrefixMap`] by equal values.

use super::PrefixMap;
use crate::Prefix;

/// An iterator over the aggregated entries of a [`PrefixMap`], created by
/// [`PrefixMap::aggregate`]. See there for the semantics.
pub struct Aggregate<'a, P, T> {
    items: std::vec::IntoIter<(P, &'a T)>,
}

impl<'a, P, T> Iterator for Aggregate<'a, P, T> {
    type Item = (P, &'a T);

    fn next(&mut self) -> Option<(P, &'a T)> {
        self.items.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<P, T> ExactSizeIterator for Aggregate<'_, P, T> {}

/// The aggregation result for one subtree: refinements that must be emitted
/// in any case, plus an optional *background*. A background `Some(v)` means
/// the subtree covers its entire prefix, and any address not matched by a
/// refinement falls back to `v`. Whether the background is emitted (and
/// under which prefix) is decided further up the tree.
struct SubAggregate<'a, P, T> {
    prefix: P,
    items: Vec<(P, &'a T)>,
    background: Option<&'a T>,
}

impl<P, T> PrefixMap<P, T>
where
    P: Prefix,
{
    /// Visit the minimal set of prefix/value pairs that is equivalent to the
    /// map under longest-prefix matching: for every address, the
    /// longest-prefix match against the aggregated entries yields the same
    /// value as against the full map, and it is defined for the same
    /// addresses. Entries are compared with `==` and emitted in
    /// lexicographic order.
    ///
    /// Aggregated prefixes need not be present in the map: two sibling
    /// halves carrying the same value merge into their common parent.
    ///
    /// ```
    /// # use cidr_collections::PrefixMap;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let pm: PrefixMap<Ipv4Net, bool> = PrefixMap::from_iter([
    ///     ("10.224.24.2/31".parse()?, true),
    ///     ("10.224.24.1/32".parse()?, true),
    ///     ("10.224.24.0/32".parse()?, true),
    /// ]);
    /// let aggregated: Vec<_> = pm.aggregate().collect();
    /// assert_eq!(aggregated, vec![("10.224.24.0/30".parse()?, &true)]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn aggregate(&self) -> Aggregate<'_, P, T>
    where
        T: PartialEq,
    {
        self.aggregate_by(|a, b| a == b)
    }

    /// Like [`PrefixMap::aggregate`], but values are compared with the given
    /// equivalence instead of `==`.
    pub fn aggregate_by<F>(&self, mut eq: F) -> Aggregate<'_, P, T>
    where
        F: FnMut(&T, &T) -> bool,
    {
        let (items, background) = self.aggregate_node(0, None, &mut eq);
        let mut out = Vec::with_capacity(items.len() + 1);
        if let Some(v) = background {
            out.push((P::zero(), v));
        }
        out.extend(items);
        Aggregate {
            items: out.into_iter(),
        }
    }

    /// Aggregate the subtree below `idx`. `inherited` is the value of the
    /// closest ancestor entry, i.e., what an address in this subtree matches
    /// when no entry of the subtree applies.
    fn aggregate_node<'a, F>(
        &'a self,
        idx: usize,
        inherited: Option<&'a T>,
        eq: &mut F,
    ) -> (Vec<(P, &'a T)>, Option<&'a T>)
    where
        F: FnMut(&T, &T) -> bool,
    {
        let node = &self.table[idx];
        let ctx = node.value.as_ref().or(inherited);
        let left = match node.left {
            Some(c) => Some(self.child_aggregate(c, ctx, eq)),
            None => None,
        };
        let right = match node.right {
            Some(c) => Some(self.child_aggregate(c, ctx, eq)),
            None => None,
        };

        // Two children that are the exact halves of this prefix and cover
        // their halves with the same background merge into this prefix: the
        // pair is replaced by a single background one level up. A value
        // stored on this node itself is dropped in that case: the two
        // halves are strictly more specific and cover the whole prefix, so
        // no longest-prefix match can ever reach it.
        let mergeable = match (&left, &right) {
            (Some(l), Some(r)) => {
                let half_len = node.prefix.prefix_len() + 1;
                match (l.background, r.background) {
                    (Some(lb), Some(rb)) => {
                        l.prefix.prefix_len() == half_len
                            && r.prefix.prefix_len() == half_len
                            && eq(lb, rb)
                    }
                    _ => false,
                }
            }
            _ => false,
        };
        if mergeable {
            let l = left.unwrap();
            let r = right.unwrap();
            let background = l.background;
            let mut items = l.items;
            items.extend(r.items);
            return (items, background);
        }

        // Otherwise the children are final: emit each child's background at
        // the child's own prefix, unless the surrounding value already
        // provides it.
        let mut items = Vec::new();
        for sub in [left, right].into_iter().flatten() {
            if let Some(b) = sub.background {
                let absorbed = matches!(ctx, Some(c) if eq(b, c));
                if !absorbed {
                    items.push((sub.prefix, b));
                }
            }
            items.extend(sub.items);
        }
        (items, node.value.as_ref())
    }

    fn child_aggregate<'a, F>(
        &'a self,
        idx: usize,
        inherited: Option<&'a T>,
        eq: &mut F,
    ) -> SubAggregate<'a, P, T>
    where
        F: FnMut(&T, &T) -> bool,
    {
        let (items, background) = self.aggregate_node(idx, inherited, eq);
        SubAggregate {
            prefix: self.table[idx].prefix.canonical(),
            items,
            background,
        }
    }
}
