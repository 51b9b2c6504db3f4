//! In-order iteration over the stored CIDRs, and address expansion.

use num_traits::One;

use super::{CidrSet, SetNode};
use crate::Prefix;

/// An iterator over the disjoint CIDRs of a [`CidrSet`], in address order.
pub struct Iter<'a, P> {
    nodes: &'a [SetNode<P>],
    stack: Vec<usize>,
}

impl<P> Clone for Iter<'_, P> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            stack: self.stack.clone(),
        }
    }
}

impl<'a, P> Iterator for Iter<'a, P> {
    type Item = &'a P;

    fn next(&mut self) -> Option<&'a P> {
        let idx = self.stack.pop()?;
        let mut cur = self.nodes[idx].right;
        while let Some(child) = cur {
            self.stack.push(child);
            cur = self.nodes[child].left;
        }
        Some(&self.nodes[idx].net)
    }
}

impl<P> CidrSet<P> {
    /// Iterate over the stored CIDRs in address order. Because the CIDRs are
    /// disjoint, this is the same as lexicographic order.
    pub fn iter(&self) -> Iter<'_, P> {
        let mut stack = Vec::new();
        let mut cur = self.root;
        while let Some(idx) = cur {
            stack.push(idx);
            cur = self.nodes[idx].left;
        }
        Iter {
            nodes: &self.nodes,
            stack,
        }
    }
}

impl<'a, P> IntoIterator for &'a CidrSet<P> {
    type Item = &'a P;
    type IntoIter = Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the individual addresses of a [`CidrSet`], created by
/// [`CidrSet::addrs`]. Addresses are yielded as host prefixes in address
/// order.
pub struct Addrs<'a, P: Prefix> {
    inner: Iter<'a, P>,
    cur: Option<(P::R, u64)>,
    remaining: Option<u64>,
}

impl<P> CidrSet<P>
where
    P: Prefix,
{
    /// Iterate over the first `limit` addresses of the set, in address
    /// order, as host prefixes. A limit of 0 means all addresses; the
    /// expansion of a single CIDR is capped at 2³⁰ addresses either way.
    ///
    /// ```
    /// # use cidr_collections::CidrSet;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut set: CidrSet<Ipv4Net> = CidrSet::new();
    /// set.insert("10.0.0.0/31".parse()?);
    /// set.insert("192.168.0.0/31".parse()?);
    /// let addrs: Vec<Ipv4Net> = set.addrs(3).collect();
    /// assert_eq!(addrs, vec![
    ///     "10.0.0.0/32".parse()?,
    ///     "10.0.0.1/32".parse()?,
    ///     "192.168.0.0/32".parse()?,
    /// ]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn addrs(&self, limit: usize) -> Addrs<'_, P> {
        Addrs {
            inner: self.iter(),
            cur: None,
            remaining: (limit != 0).then_some(limit as u64),
        }
    }
}

impl<P> Iterator for Addrs<'_, P>
where
    P: Prefix,
{
    type Item = P;

    fn next(&mut self) -> Option<P> {
        if self.remaining == Some(0) {
            return None;
        }
        loop {
            if let Some((addr, count)) = self.cur.take() {
                if count > 1 {
                    // more addresses remain in this block, so the increment
                    // cannot wrap around
                    self.cur = Some((addr + P::R::one(), count - 1));
                }
                if let Some(remaining) = &mut self.remaining {
                    *remaining -= 1;
                }
                return Some(P::from_bits_len(addr, P::max_len()));
            }
            let net = self.inner.next()?;
            let host_bits = (P::max_len() - net.prefix_len()) as u32;
            let count = if host_bits < 30 {
                1u64 << host_bits
            } else {
                1 << 30
            };
            self.cur = Some((net.network(), count));
        }
    }
}
