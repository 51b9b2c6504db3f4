//! The prefix map: a binary trie keyed on CIDR prefixes.

use crate::Prefix;

mod aggregate;
mod entry;
mod iter;
mod table;

pub use aggregate::Aggregate;
pub use entry::{Entry, OccupiedEntry, VacantEntry};
pub use iter::{IntoIter, IntoKeys, IntoValues, Iter, Keys, Values};

use table::{Direction, InsertDirection, Node, Table};

/// A map from prefixes to values, supporting exact-match and
/// longest-prefix-match lookups.
///
/// Entries are stored in a binary trie: every node's prefix contains the
/// prefixes of all its descendants, and the two children of a node differ in
/// the first bit after the node's prefix. Branch points that were never
/// inserted carry no value and are invisible to lookups.
///
/// ```
/// # use cidr_collections::PrefixMap;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut pm: PrefixMap<ipnet::Ipv4Net, u32> = PrefixMap::new();
/// pm.insert("10.0.0.0/8".parse()?, 1);
/// pm.insert("10.1.0.0/16".parse()?, 2);
/// assert_eq!(pm.get(&"10.1.0.0/16".parse()?), Some(&2));
/// assert_eq!(pm.get_lpm(&"10.1.2.3/32".parse()?), Some((&"10.1.0.0/16".parse()?, &2)));
/// assert_eq!(pm.get_lpm(&"10.2.0.0/16".parse()?), Some((&"10.0.0.0/8".parse()?, &1)));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PrefixMap<P, T> {
    pub(crate) table: Table<P, T>,
    free: Vec<usize>,
    count: usize,
}

impl<P, T> Default for PrefixMap<P, T>
where
    P: Prefix,
{
    fn default() -> Self {
        Self {
            table: Default::default(),
            free: Vec::new(),
            count: 0,
        }
    }
}

impl<P, T> PrefixMap<P, T>
where
    P: Prefix,
{
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of entries stored in the map.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the map contains no entries.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get the value stored for `prefix` by matching on it exactly.
    ///
    /// ```
    /// # use cidr_collections::PrefixMap;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pm: PrefixMap<ipnet::Ipv4Net, _> = PrefixMap::new();
    /// pm.insert("192.168.1.0/24".parse()?, 1);
    /// assert_eq!(pm.get(&"192.168.1.0/24".parse()?), Some(&1));
    /// assert_eq!(pm.get(&"192.168.0.0/23".parse()?), None);
    /// assert_eq!(pm.get(&"192.168.1.0/25".parse()?), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn get(&self, prefix: &P) -> Option<&T> {
        let mut idx = 0;
        loop {
            match self.table.direction(idx, prefix) {
                Direction::Reached => return self.table[idx].value.as_ref(),
                Direction::Enter { next, .. } => idx = next,
                Direction::Missing => return None,
            }
        }
    }

    /// Get a mutable reference to the value stored for `prefix` by matching
    /// on it exactly.
    pub fn get_mut(&mut self, prefix: &P) -> Option<&mut T> {
        let mut idx = 0;
        loop {
            match self.table.direction(idx, prefix) {
                Direction::Reached => return self.table[idx].value.as_mut(),
                Direction::Enter { next, .. } => idx = next,
                Direction::Missing => return None,
            }
        }
    }

    /// Get the stored prefix and value by matching exactly. The returned
    /// prefix may differ from the queried one in its host bits.
    pub fn get_key_value(&self, prefix: &P) -> Option<(&P, &T)> {
        let mut idx = 0;
        loop {
            match self.table.direction(idx, prefix) {
                Direction::Reached => return self.table[idx].prefix_value(),
                Direction::Enter { next, .. } => idx = next,
                Direction::Missing => return None,
            }
        }
    }

    /// Is `prefix` present in the map (exact match)?
    pub fn contains_key(&self, prefix: &P) -> bool {
        self.get(prefix).is_some()
    }

    /// Longest-prefix match: among all entries whose prefix contains
    /// `prefix`, return the one with the longest prefix.
    ///
    /// ```
    /// # use cidr_collections::PrefixMap;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pm: PrefixMap<ipnet::Ipv4Net, _> = PrefixMap::new();
    /// pm.insert("192.168.0.0/23".parse()?, 1);
    /// pm.insert("192.168.1.0/24".parse()?, 2);
    /// assert_eq!(pm.get_lpm(&"192.168.1.1/32".parse()?), Some((&"192.168.1.0/24".parse()?, &2)));
    /// assert_eq!(pm.get_lpm(&"192.168.0.1/32".parse()?), Some((&"192.168.0.0/23".parse()?, &1)));
    /// assert_eq!(pm.get_lpm(&"192.169.0.0/24".parse()?), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn get_lpm<'a>(&'a self, prefix: &P) -> Option<(&'a P, &'a T)> {
        let mut idx = 0;
        let mut best: Option<(&P, &T)> = None;
        loop {
            best = self.table[idx].prefix_value().or(best);
            match self.table.direction(idx, prefix) {
                Direction::Enter { next, .. } => idx = next,
                _ => return best,
            }
        }
    }

    /// Longest-prefix match, returning only the matched prefix.
    pub fn get_lpm_prefix(&self, prefix: &P) -> Option<&P> {
        self.get_lpm(prefix).map(|(p, _)| p)
    }

    /// Longest-prefix match with a mutable reference to the matched value.
    pub fn get_lpm_mut<'a>(&'a mut self, prefix: &P) -> Option<(&'a P, &'a mut T)> {
        let mut idx = 0;
        let mut best: Option<usize> = None;
        loop {
            if self.table[idx].value.is_some() {
                best = Some(idx);
            }
            match self.table.direction(idx, prefix) {
                Direction::Enter { next, .. } => idx = next,
                _ => break,
            }
        }
        self.table[best?].prefix_value_mut()
    }

    /// Insert a value for `prefix`, returning the previously stored value if
    /// there was one. The stored prefix is replaced by the given one.
    ///
    /// ```
    /// # use cidr_collections::PrefixMap;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pm: PrefixMap<ipnet::Ipv4Net, _> = PrefixMap::new();
    /// assert_eq!(pm.insert("192.168.0.0/23".parse()?, 1), None);
    /// assert_eq!(pm.insert("192.168.0.0/23".parse()?, 2), Some(1));
    /// assert_eq!(pm.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn insert(&mut self, prefix: P, value: T) -> Option<T> {
        match self.entry(prefix) {
            Entry::Occupied(e) => Some(e.insert(value)),
            Entry::Vacant(e) => {
                e.insert(value);
                None
            }
        }
    }

    /// Get the entry for `prefix` for in-place manipulation.
    ///
    /// ```
    /// # use cidr_collections::PrefixMap;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pm: PrefixMap<ipnet::Ipv4Net, Vec<u32>> = PrefixMap::new();
    /// pm.entry("192.168.0.0/23".parse()?).or_default().push(1);
    /// pm.entry("192.168.0.0/23".parse()?).or_default().push(2);
    /// assert_eq!(pm.get(&"192.168.0.0/23".parse()?), Some(&vec![1, 2]));
    /// # Ok(())
    /// # }
    /// ```
    pub fn entry(&mut self, prefix: P) -> Entry<'_, P, T> {
        let mut idx = 0;
        loop {
            match self.table.insert_direction(idx, &prefix) {
                InsertDirection::Enter { next, .. } => idx = next,
                InsertDirection::Reached if self.table[idx].value.is_some() => {
                    return Entry::Occupied(OccupiedEntry {
                        node: &mut self.table[idx],
                        prefix,
                    })
                }
                direction => {
                    return Entry::Vacant(VacantEntry {
                        map: self,
                        prefix,
                        idx,
                        direction,
                    })
                }
            }
        }
    }

    /// Remove the entry stored for `prefix`, returning its value. Removing a
    /// prefix that is not present is a no-op. The tree structure is restored
    /// as if the entry had never been inserted.
    ///
    /// ```
    /// # use cidr_collections::PrefixMap;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pm: PrefixMap<ipnet::Ipv4Net, _> = PrefixMap::new();
    /// pm.insert("192.168.1.0/24".parse()?, 1);
    /// assert_eq!(pm.remove(&"192.168.1.0/24".parse()?), Some(1));
    /// assert_eq!(pm.remove(&"192.168.1.0/24".parse()?), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn remove(&mut self, prefix: &P) -> Option<T> {
        let mut idx = 0;
        let mut grandparent = None;
        let mut grandparent_right = false;
        let mut parent = None;
        let mut parent_right = false;
        loop {
            match self.table.direction(idx, prefix) {
                Direction::Reached => break,
                Direction::Enter { next, right } => {
                    grandparent = parent;
                    grandparent_right = parent_right;
                    parent = Some(idx);
                    parent_right = right;
                    idx = next;
                }
                Direction::Missing => return None,
            }
        }
        self.remove_node(idx, parent, parent_right, grandparent, grandparent_right)
    }

    /// Remove all entries, keeping the allocated memory.
    pub fn clear(&mut self) {
        self.table.reset();
        self.free.clear();
        self.count = 0;
    }

    /// Check the structural invariants of the trie and return a description
    /// of every violation. An empty result means the tree is sound. Intended
    /// as a test oracle.
    pub fn validate(&self) -> Vec<String>
    where
        P: std::fmt::Debug,
    {
        let mut errors = Vec::new();
        let mut values = 0;
        let mut seen = 1;
        let mut stack = vec![0];
        while let Some(idx) = stack.pop() {
            let node = &self.table[idx];
            if node.value.is_some() {
                values += 1;
            }
            if idx != 0 && node.value.is_none() && (node.left.is_none() || node.right.is_none()) {
                errors.push(format!(
                    "structural node {:?} has fewer than two children",
                    node.prefix
                ));
            }
            for (child, right) in [(node.left, false), (node.right, true)] {
                let Some(child) = child else { continue };
                seen += 1;
                stack.push(child);
                let child_p = &self.table[child].prefix;
                if !node.prefix.contains(child_p) || node.prefix.prefix_len() >= child_p.prefix_len()
                {
                    errors.push(format!(
                        "{:?} is no strict super-prefix of its child {:?}",
                        node.prefix, child_p
                    ));
                } else if crate::to_right(&node.prefix, child_p) != right {
                    errors.push(format!(
                        "{:?} is on the wrong side of {:?}",
                        child_p, node.prefix
                    ));
                }
            }
        }
        if values != self.count {
            errors.push(format!("stored count {} != {} entries", self.count, values));
        }
        if seen + self.free.len() != self.table.len() {
            errors.push(format!(
                "{} reachable nodes and {} free slots, but the table holds {}",
                seen,
                self.free.len(),
                self.table.len()
            ));
        }
        errors
    }
}

/// Private implementation details.
impl<P, T> PrefixMap<P, T>
where
    P: Prefix,
{
    /// Allocate a node, reusing a free slot if possible. Increments the
    /// entry count if `value` is something.
    fn new_node(&mut self, prefix: P, value: Option<T>) -> usize {
        if value.is_some() {
            self.count += 1;
        }
        match self.free.pop() {
            Some(idx) => {
                let node = &mut self.table[idx];
                node.prefix = prefix;
                node.value = value;
                node.left = None;
                node.right = None;
                idx
            }
            None => self.table.push(Node {
                prefix,
                value,
                left: None,
                right: None,
            }),
        }
    }

    /// Take the value out of node `idx` and restore the minimal tree shape:
    /// nodes without a value keep either two children (branch points) or,
    /// for the root, any number. `par`/`grp` describe the path to `idx`.
    fn remove_node(
        &mut self,
        idx: usize,
        par: Option<usize>,
        par_right: bool,
        grp: Option<usize>,
        grp_right: bool,
    ) -> Option<T> {
        let node = &mut self.table[idx];
        let value = node.value.take();
        let has_left = node.left.is_some();
        let has_right = node.right.is_some();

        if value.is_some() {
            self.count -= 1;
        }

        if has_left && has_right {
            // the node remains as a branch point.
        } else if !(has_left || has_right) {
            if let Some(par) = par {
                // drop the leaf entirely.
                self.table.clear_child(par, par_right);
                self.free.push(idx);
                // a valueless parent now forwards a single child: splice it
                // out by connecting its other child to the grandparent.
                if let Some(grp) = grp {
                    if self.table[par].value.is_none() {
                        if let Some(sibling) = self.table.child(par, !par_right) {
                            self.table.set_child(grp, sibling, grp_right);
                            self.free.push(par);
                        } else {
                            self.table.clear_child(grp, grp_right);
                        }
                    }
                }
            }
        } else {
            // a single child remains: connect it directly to the parent.
            if let Some(par) = par {
                let child_right = has_right;
                let child = self.table.clear_child(idx, child_right).unwrap();
                self.table.set_child(par, child, par_right);
                self.free.push(idx);
            }
        }
        value
    }
}

impl<P, T> PartialEq for PrefixMap<P, T>
where
    P: Prefix + PartialEq,
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<P, T> Eq for PrefixMap<P, T>
where
    P: Prefix + Eq,
    T: Eq,
{
}

impl<P, T> FromIterator<(P, T)> for PrefixMap<P, T>
where
    P: Prefix,
{
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<P, T> Extend<(P, T)> for PrefixMap<P, T>
where
    P: Prefix,
{
    fn extend<I: IntoIterator<Item = (P, T)>>(&mut self, iter: I) {
        iter.into_iter().for_each(|(p, v)| {
            self.insert(p, v);
        })
    }
}
