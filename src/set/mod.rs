//! The address set: a binary search tree of disjoint CIDRs.

use crate::{arith, Prefix};

mod iter;

pub use iter::{Addrs, Iter};

/// A node of the search tree. `up` is the inverse of the `left`/`right`
/// links and is re-pointed by the `set_left`/`set_right` helpers whenever a
/// child link changes.
#[derive(Clone)]
pub(crate) struct SetNode<P> {
    pub(crate) net: P,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
    pub(crate) up: Option<usize>,
}

/// A set of addresses, stored as the minimal collection of disjoint CIDRs
/// covering exactly those addresses.
///
/// The CIDRs are kept in a binary search tree ordered by network address. No
/// stored CIDR contains another, and no two stored CIDRs can be combined
/// into a single larger one: inserting the second half of a block merges the
/// pair, cascading upwards as far as possible. Removing a block splits every
/// partially covered CIDR into the complementary fragments.
///
/// ```
/// # use cidr_collections::CidrSet;
/// # use ipnet::Ipv4Net;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut set: CidrSet<Ipv4Net> = CidrSet::new();
/// set.insert("192.168.1.0/32".parse()?);
/// set.insert("192.168.1.1/32".parse()?);
/// set.insert("192.168.1.2/31".parse()?);
/// // the four addresses collapse into a single block
/// let nets: Vec<_> = set.iter().copied().collect();
/// assert_eq!(nets, vec!["192.168.1.0/30".parse()?]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CidrSet<P> {
    pub(crate) nodes: Vec<SetNode<P>>,
    pub(crate) root: Option<usize>,
    free: Vec<usize>,
}

impl<P> Default for CidrSet<P> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            free: Vec::new(),
        }
    }
}

impl<P> CidrSet<P> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of disjoint CIDRs stored in the set.
    pub fn num_cidrs(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Returns `true` if the set contains no addresses.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Remove all addresses from the set.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
    }
}

impl<P> CidrSet<P>
where
    P: Prefix,
{
    /// Does the set contain every address of `net`?
    ///
    /// ```
    /// # use cidr_collections::CidrSet;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut set: CidrSet<Ipv4Net> = CidrSet::new();
    /// set.insert("10.0.0.0/24".parse()?);
    /// assert!(set.contains(&"10.0.0.128/25".parse()?));
    /// assert!(set.contains(&"10.0.0.0/24".parse()?));
    /// assert!(!set.contains(&"10.0.0.0/23".parse()?));
    /// # Ok(())
    /// # }
    /// ```
    pub fn contains(&self, net: &P) -> bool {
        let mut cur = self.root;
        while let Some(idx) = cur {
            let node = &self.nodes[idx];
            if node.net.contains(net) {
                return true;
            }
            if net.contains(&node.net) {
                // a strict super-block of a stored CIDR is never fully
                // covered, or the two would have been one node.
                return false;
            }
            cur = if net.network() < node.net.network() {
                node.left
            } else {
                node.right
            };
        }
        false
    }

    /// Insert every address of `net` into the set, merging with overlapping
    /// and adjacent blocks.
    pub fn insert(&mut self, net: P) {
        let mut net = net.canonical();
        loop {
            let new = self.alloc_node(net.canonical());
            let (top, attached) = self.insert_at(self.root, new);
            self.nodes[top].up = None;
            self.root = Some(top);
            if !attached {
                // already covered by an existing block
                self.release(new);
                return;
            }

            // keep merging with the in-order neighbours for as long as the
            // result is one half of a larger block
            let mut grown: Option<P> = None;
            if let Some(prev) = self.prev(new) {
                grown = arith::combine(&self.nodes[prev].net, &net);
            }
            if let Some(next) = self.next(new) {
                let next_net = &self.nodes[next].net;
                grown = match grown {
                    Some(g) => Some(arith::combine(&g, next_net).unwrap_or(g)),
                    None => arith::combine(&net, next_net),
                };
            }
            match grown {
                Some(g) => net = g,
                None => return,
            }
        }
    }

    /// Remove every address of `net` from the set. Blocks that are only
    /// partially covered are split; removing addresses that are not in the
    /// set is a no-op.
    pub fn remove(&mut self, net: &P) {
        let net = net.canonical();
        self.root = self.remove_net_at(self.root, &net);
        if let Some(root) = self.root {
            self.nodes[root].up = None;
        }
    }

    /// The union of the two sets, as a new set.
    pub fn union(&self, other: &Self) -> Self {
        let mut out = Self::new();
        for net in self.iter() {
            out.insert(net.canonical());
        }
        for net in other.iter() {
            out.insert(net.canonical());
        }
        out
    }

    /// The set difference `self - other`, as a new set.
    pub fn difference(&self, other: &Self) -> Self {
        let mut out = Self::new();
        for net in self.iter() {
            out.insert(net.canonical());
        }
        for net in other.iter() {
            out.remove(net);
        }
        out
    }

    /// The intersection of the two sets, as a new set. Computed by removing
    /// from `self` everything that survives removing `other`.
    pub fn intersection(&self, other: &Self) -> Self {
        self.difference(&self.difference(other))
    }

    /// The number of addresses in the set, saturating at `u128::MAX` (an
    /// IPv6 set holding everything covers 2¹²⁸ addresses).
    pub fn addr_count(&self) -> u128 {
        self.iter()
            .map(|net| {
                let host_bits = (P::max_len() - net.prefix_len()) as u32;
                1u128.checked_shl(host_bits).unwrap_or(u128::MAX)
            })
            .fold(0, u128::saturating_add)
    }

    /// Check the structural invariants of the tree and return a description
    /// of every violation. An empty result means the tree is sound. Intended
    /// as a test oracle.
    pub fn validate(&self) -> Vec<String>
    where
        P: std::fmt::Debug,
    {
        let mut errors = Vec::new();
        let mut seen = 0;
        if let Some(root) = self.root {
            if self.nodes[root].up.is_some() {
                errors.push("the root has a parent link".to_string());
            }
            let mut stack = vec![root];
            while let Some(idx) = stack.pop() {
                seen += 1;
                for (child, side) in [(self.nodes[idx].left, "left"), (self.nodes[idx].right, "right")]
                {
                    let Some(child) = child else { continue };
                    stack.push(child);
                    if self.nodes[child].up != Some(idx) {
                        errors.push(format!(
                            "the {side} child {:?} of {:?} has a broken parent link",
                            self.nodes[child].net, self.nodes[idx].net
                        ));
                    }
                }
            }
        }
        if seen + self.free.len() != self.nodes.len() {
            errors.push(format!(
                "{} reachable nodes and {} free slots, but the arena holds {}",
                seen,
                self.free.len(),
                self.nodes.len()
            ));
        }
        let nets: Vec<P> = self.iter().map(|n| n.canonical()).collect();
        for pair in nets.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.network() >= b.network() {
                errors.push(format!("{a:?} and {b:?} are out of order"));
            }
            if a.contains(b) || b.contains(a) {
                errors.push(format!("{a:?} and {b:?} overlap"));
            }
            if arith::combine(a, b).is_some() {
                errors.push(format!("{a:?} and {b:?} should have been combined"));
            }
        }
        errors
    }
}

/// Private implementation details.
impl<P> CidrSet<P>
where
    P: Prefix,
{
    fn alloc_node(&mut self, net: P) -> usize {
        match self.free.pop() {
            Some(idx) => {
                let node = &mut self.nodes[idx];
                node.net = net;
                node.left = None;
                node.right = None;
                node.up = None;
                idx
            }
            None => {
                self.nodes.push(SetNode {
                    net,
                    left: None,
                    right: None,
                    up: None,
                });
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) {
        let node = &mut self.nodes[idx];
        node.left = None;
        node.right = None;
        node.up = None;
        self.free.push(idx);
    }

    fn release_subtree(&mut self, sub: Option<usize>) {
        let mut stack = Vec::from_iter(sub);
        while let Some(idx) = stack.pop() {
            stack.extend(self.nodes[idx].left);
            stack.extend(self.nodes[idx].right);
            self.release(idx);
        }
    }

    /// Set the left child of `me`, keeping the parent links consistent.
    fn set_left(&mut self, me: usize, child: Option<usize>) {
        if let Some(old) = self.nodes[me].left {
            if self.nodes[old].up == Some(me) {
                self.nodes[old].up = None;
            }
        }
        self.nodes[me].left = child;
        if let Some(child) = child {
            self.nodes[child].up = Some(me);
        }
    }

    /// Set the right child of `me`, keeping the parent links consistent.
    fn set_right(&mut self, me: usize, child: Option<usize>) {
        if let Some(old) = self.nodes[me].right {
            if self.nodes[old].up == Some(me) {
                self.nodes[old].up = None;
            }
        }
        self.nodes[me].right = child;
        if let Some(child) = child {
            self.nodes[child].up = Some(me);
        }
    }

    /// Insert node `new` into the subtree rooted at `cur`. Returns the new
    /// subtree root, and whether `new` was attached (false when its CIDR was
    /// already covered; the caller releases it).
    fn insert_at(&mut self, cur: Option<usize>, new: usize) -> (usize, bool) {
        let Some(me) = cur else { return (new, true) };
        if self.nodes[me].net.contains(&self.nodes[new].net) {
            return (me, false);
        }
        if self.nodes[new].net.contains(&self.nodes[me].net) {
            // `new` takes this position; every covered descendant goes away
            let left = self.nodes[me].left;
            let keep = self.trim_left(left, new);
            self.set_left(new, keep);
            let right = self.nodes[me].right;
            let keep = self.trim_right(right, new);
            self.set_right(new, keep);
            self.release(me);
            return (new, true);
        }
        if self.nodes[new].net.network() < self.nodes[me].net.network() {
            let left = self.nodes[me].left;
            let (top, attached) = self.insert_at(left, new);
            self.set_left(me, Some(top));
            (me, attached)
        } else {
            let right = self.nodes[me].right;
            let (top, attached) = self.insert_at(right, new);
            self.set_right(me, Some(top));
            (me, attached)
        }
    }

    /// Drop every node covered by `top` from a left subtree. A covered node
    /// takes its right subtree with it: everything there lies between the
    /// node and `top`'s position and is covered as well.
    fn trim_left(&mut self, cur: Option<usize>, top: usize) -> Option<usize> {
        let me = cur?;
        if self.nodes[top].net.contains(&self.nodes[me].net) {
            let left = self.nodes[me].left;
            let keep = self.trim_left(left, top);
            let right = self.nodes[me].right;
            self.release_subtree(right);
            self.release(me);
            keep
        } else {
            let right = self.nodes[me].right;
            let keep = self.trim_left(right, top);
            self.set_right(me, keep);
            Some(me)
        }
    }

    /// Mirror image of `trim_left` for a right subtree.
    fn trim_right(&mut self, cur: Option<usize>, top: usize) -> Option<usize> {
        let me = cur?;
        if self.nodes[top].net.contains(&self.nodes[me].net) {
            let right = self.nodes[me].right;
            let keep = self.trim_right(right, top);
            let left = self.nodes[me].left;
            self.release_subtree(left);
            self.release(me);
            keep
        } else {
            let left = self.nodes[me].left;
            let keep = self.trim_right(left, top);
            self.set_left(me, keep);
            Some(me)
        }
    }

    /// Remove the addresses of `net` from the subtree rooted at `cur` and
    /// return the new subtree root.
    fn remove_net_at(&mut self, cur: Option<usize>, net: &P) -> Option<usize> {
        let me = cur?;
        if net.network() < self.nodes[me].net.network() {
            let left = self.nodes[me].left;
            let keep = self.remove_net_at(left, net);
            self.set_left(me, keep);
        }
        // if part of `net` lies after this node, descend to the right too
        let diff = arith::difference(net, &self.nodes[me].net);
        if diff
            .iter()
            .any(|d| self.nodes[me].net.network() < d.network())
        {
            let right = self.nodes[me].right;
            let keep = self.remove_net_at(right, net);
            self.set_right(me, keep);
        }

        if net.contains(&self.nodes[me].net) {
            return self.remove_node(me);
        }
        let mut top = Some(me);
        if self.nodes[me].net.contains(net) {
            // the node is only partially removed: keep the complementary
            // fragments, the first one in place of the node itself
            let mut fragments = arith::difference(&self.nodes[me].net, net).into_iter();
            if let Some(first) = fragments.next() {
                self.nodes[me].net = first;
            }
            for fragment in fragments {
                let idx = self.alloc_node(fragment);
                let (t, attached) = self.insert_at(top, idx);
                top = Some(t);
                if !attached {
                    self.release(idx);
                }
            }
        }
        top
    }

    /// Splice node `me` out of the tree and return its replacement.
    fn remove_node(&mut self, me: usize) -> Option<usize> {
        let (left, right) = (self.nodes[me].left, self.nodes[me].right);
        if left.is_some() && right.is_some() {
            // take over the in-order successor, then splice that one out of
            // the right subtree (it has no left child there).
            let next = self.next(me).unwrap();
            let net = self.nodes[next].net.canonical();
            self.nodes[me].net = net;
            self.remove_node(next);
            return Some(me);
        }
        let child = left.or(right);
        match self.nodes[me].up {
            Some(up) => {
                if self.nodes[up].left == Some(me) {
                    self.set_left(up, child);
                } else {
                    self.set_right(up, child);
                }
            }
            None => {
                if let Some(child) = child {
                    self.nodes[child].up = None;
                }
            }
        }
        self.release(me);
        child
    }

    /// The in-order successor of `idx`.
    pub(crate) fn next(&self, idx: usize) -> Option<usize> {
        if let Some(right) = self.nodes[idx].right {
            let mut next = right;
            while let Some(left) = self.nodes[next].left {
                next = left;
            }
            return Some(next);
        }
        let mut cur = idx;
        while let Some(up) = self.nodes[cur].up {
            if self.nodes[up].left == Some(cur) {
                return Some(up);
            }
            cur = up;
        }
        None
    }

    /// The in-order predecessor of `idx`.
    pub(crate) fn prev(&self, idx: usize) -> Option<usize> {
        if let Some(left) = self.nodes[idx].left {
            let mut prev = left;
            while let Some(right) = self.nodes[prev].right {
                prev = right;
            }
            return Some(prev);
        }
        let mut cur = idx;
        while let Some(up) = self.nodes[cur].up {
            if self.nodes[up].right == Some(cur) {
                return Some(up);
            }
            cur = up;
        }
        None
    }
}

impl<P> PartialEq for CidrSet<P>
where
    P: Prefix,
{
    fn eq(&self, other: &Self) -> bool {
        let mut a = self.iter();
        let mut b = other.iter();
        loop {
            match (a.next(), b.next()) {
                (None, None) => return true,
                (Some(x), Some(y)) if x.eq(y) => {}
                _ => return false,
            }
        }
    }
}

impl<P> Eq for CidrSet<P> where P: Prefix {}

impl<P> FromIterator<P> for CidrSet<P>
where
    P: Prefix,
{
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut set = Self::new();
        for net in iter {
            set.insert(net);
        }
        set
    }
}

impl<P> Extend<P> for CidrSet<P>
where
    P: Prefix,
{
    fn extend<I: IntoIterator<Item = P>>(&mut self, iter: I) {
        for net in iter {
            self.insert(net);
        }
    }
}
