//! The entry API for in-place manipulation of single map entries.

use super::table::{InsertDirection, Node};
use super::PrefixMap;
use crate::Prefix;

/// A view into a single entry of a [`PrefixMap`], which is either vacant or
/// occupied.
pub enum Entry<'a, P, T> {
    /// The prefix is not present in the map.
    Vacant(VacantEntry<'a, P, T>),
    /// The prefix is present in the map.
    Occupied(OccupiedEntry<'a, P, T>),
}

/// A view into a missing entry: the position in the tree where the prefix
/// would be inserted.
pub struct VacantEntry<'a, P, T> {
    pub(super) map: &'a mut PrefixMap<P, T>,
    pub(super) prefix: P,
    pub(super) idx: usize,
    pub(super) direction: InsertDirection<P>,
}

/// A view into an occupied entry.
pub struct OccupiedEntry<'a, P, T> {
    pub(super) node: &'a mut Node<P, T>,
    pub(super) prefix: P,
}

impl<P, T> Entry<'_, P, T> {
    /// Get the stored value, if there is one.
    pub fn get(&self) -> Option<&T> {
        match self {
            Entry::Vacant(_) => None,
            Entry::Occupied(e) => e.node.value.as_ref(),
        }
    }

    /// Get a mutable reference to the stored value, if there is one.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Entry::Vacant(_) => None,
            Entry::Occupied(e) => e.node.value.as_mut(),
        }
    }

    /// The key of this entry. For an occupied entry, this is the stored key.
    pub fn key(&self) -> &P {
        match self {
            Entry::Vacant(e) => &e.prefix,
            Entry::Occupied(e) => &e.node.prefix,
        }
    }
}

impl<'a, P, T> Entry<'a, P, T>
where
    P: Prefix,
{
    /// Set the value of the entry, returning the old value if the entry was
    /// occupied. The stored prefix is replaced by the one given to
    /// [`PrefixMap::entry`].
    pub fn insert(self, value: T) -> Option<T> {
        match self {
            Entry::Vacant(e) => {
                e.insert(value);
                None
            }
            Entry::Occupied(e) => Some(e.insert(value)),
        }
    }

    /// Insert `default` if the entry is vacant, and return a mutable
    /// reference to the value.
    ///
    /// ```
    /// # use cidr_collections::PrefixMap;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pm: PrefixMap<ipnet::Ipv4Net, _> = PrefixMap::new();
    /// pm.insert("192.168.1.0/24".parse()?, 1);
    /// assert_eq!(pm.entry("192.168.1.0/24".parse()?).or_insert(10), &1);
    /// assert_eq!(pm.entry("192.168.2.0/24".parse()?).or_insert(20), &20);
    /// # Ok(())
    /// # }
    /// ```
    pub fn or_insert(self, default: T) -> &'a mut T {
        self.or_insert_with(|| default)
    }

    /// Insert the result of `default` if the entry is vacant, and return a
    /// mutable reference to the value.
    pub fn or_insert_with<F: FnOnce() -> T>(self, default: F) -> &'a mut T {
        match self {
            Entry::Vacant(e) => e.insert(default()),
            Entry::Occupied(e) => e.node.value.as_mut().unwrap(),
        }
    }

    /// Modify the value in place if the entry is occupied.
    pub fn and_modify<F: FnOnce(&mut T)>(self, f: F) -> Self {
        match self {
            Entry::Vacant(e) => Entry::Vacant(e),
            Entry::Occupied(mut e) => {
                if let Some(v) = e.node.value.as_mut() {
                    f(v)
                }
                Entry::Occupied(e)
            }
        }
    }
}

impl<'a, P, T> Entry<'a, P, T>
where
    P: Prefix,
    T: Default,
{
    /// Insert the default value if the entry is vacant, and return a mutable
    /// reference to the value.
    pub fn or_default(self) -> &'a mut T {
        self.or_insert_with(Default::default)
    }
}

impl<P, T> OccupiedEntry<'_, P, T> {
    /// The stored key of this entry.
    pub fn key(&self) -> &P {
        &self.node.prefix
    }

    /// A reference to the stored value.
    pub fn get(&self) -> &T {
        self.node.value.as_ref().unwrap()
    }

    /// A mutable reference to the stored value.
    pub fn get_mut(&mut self) -> &mut T {
        self.node.value.as_mut().unwrap()
    }

    /// Replace the stored value (and key), returning the old value.
    pub fn insert(self, value: T) -> T {
        self.node.prefix = self.prefix;
        self.node.value.replace(value).unwrap()
    }
}

impl<P, T> VacantEntry<'_, P, T> {
    /// The key that would be inserted.
    pub fn key(&self) -> &P {
        &self.prefix
    }
}

impl<'a, P, T> VacantEntry<'a, P, T>
where
    P: Prefix,
{
    /// Insert a value at this position and return a mutable reference to it.
    pub fn insert(self, value: T) -> &'a mut T {
        let idx = match self.direction {
            InsertDirection::Reached => {
                // materialize a branch point that carried no value so far.
                self.map.count += 1;
                let node = &mut self.map.table[self.idx];
                node.prefix = self.prefix;
                debug_assert!(node.value.is_none());
                node.value = Some(value);
                self.idx
            }
            InsertDirection::NewLeaf { right } => {
                let new = self.map.new_node(self.prefix, Some(value));
                self.map.table.set_child(self.idx, new, right);
                new
            }
            InsertDirection::NewChild { right, child_right } => {
                let new = self.map.new_node(self.prefix, Some(value));
                let child = self.map.table.set_child(self.idx, new, right).unwrap();
                self.map.table.set_child(new, child, child_right);
                new
            }
            InsertDirection::NewBranch {
                branch_prefix,
                right,
                prefix_right,
            } => {
                let branch = self.map.new_node(branch_prefix, None);
                let new = self.map.new_node(self.prefix, Some(value));
                let child = self.map.table.set_child(self.idx, branch, right).unwrap();
                self.map.table.set_child(branch, new, prefix_right);
                self.map.table.set_child(branch, child, !prefix_right);
                new
            }
            InsertDirection::Enter { .. } => unreachable!(),
        };
        self.map.table[idx].value.as_mut().unwrap()
    }
}
