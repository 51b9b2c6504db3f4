//! Iterators over the map in lexicographic order.
//!
//! The traversal is a pre-order walk where a node is visited before its
//! children and the left (zero-bit) subtree before the right one. For
//! prefixes this is exactly lexicographic order on the address bits, with
//! shorter prefixes before longer ones sharing the same bits.

use super::table::Table;
use super::{Node, PrefixMap};
use crate::Prefix;

/// An iterator over all entries of a [`PrefixMap`] in lexicographic order.
pub struct Iter<'a, P, T> {
    table: &'a Table<P, T>,
    stack: Vec<usize>,
}

impl<P, T> Clone for Iter<'_, P, T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            stack: self.stack.clone(),
        }
    }
}

impl<'a, P, T> Iterator for Iter<'a, P, T> {
    type Item = (&'a P, &'a T);

    fn next(&mut self) -> Option<(&'a P, &'a T)> {
        while let Some(cur) = self.stack.pop() {
            let node = &self.table[cur];
            if let Some(right) = node.right {
                self.stack.push(right);
            }
            if let Some(left) = node.left {
                self.stack.push(left);
            }
            if let Some(v) = &node.value {
                return Some((&node.prefix, v));
            }
        }
        None
    }
}

/// An iterator over the prefixes of a [`PrefixMap`] in lexicographic order.
#[derive(Clone)]
pub struct Keys<'a, P, T> {
    pub(super) inner: Iter<'a, P, T>,
}

impl<'a, P, T> Iterator for Keys<'a, P, T> {
    type Item = &'a P;

    fn next(&mut self) -> Option<&'a P> {
        self.inner.next().map(|(p, _)| p)
    }
}

/// An iterator over the values of a [`PrefixMap`] in lexicographic order of
/// their prefixes.
#[derive(Clone)]
pub struct Values<'a, P, T> {
    pub(super) inner: Iter<'a, P, T>,
}

impl<'a, P, T> Iterator for Values<'a, P, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|(_, v)| v)
    }
}

/// An owning iterator over all entries of a [`PrefixMap`] in lexicographic
/// order.
pub struct IntoIter<P, T> {
    table: Vec<Node<P, T>>,
    stack: Vec<usize>,
}

impl<P: Prefix, T> Iterator for IntoIter<P, T> {
    type Item = (P, T);

    fn next(&mut self) -> Option<(P, T)> {
        while let Some(cur) = self.stack.pop() {
            let node = &mut self.table[cur];
            if let Some(right) = node.right {
                self.stack.push(right);
            }
            if let Some(left) = node.left {
                self.stack.push(left);
            }
            if let Some(v) = node.value.take() {
                let prefix = std::mem::replace(&mut node.prefix, P::zero());
                return Some((prefix, v));
            }
        }
        None
    }
}

/// An owning iterator over the prefixes of a [`PrefixMap`].
pub struct IntoKeys<P, T> {
    pub(super) inner: IntoIter<P, T>,
}

impl<P: Prefix, T> Iterator for IntoKeys<P, T> {
    type Item = P;

    fn next(&mut self) -> Option<P> {
        self.inner.next().map(|(p, _)| p)
    }
}

/// An owning iterator over the values of a [`PrefixMap`].
pub struct IntoValues<P, T> {
    pub(super) inner: IntoIter<P, T>,
}

impl<P: Prefix, T> Iterator for IntoValues<P, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(|(_, v)| v)
    }
}

impl<P: Prefix, T> IntoIterator for PrefixMap<P, T> {
    type Item = (P, T);
    type IntoIter = IntoIter<P, T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            table: self.table.into_inner(),
            stack: vec![0],
        }
    }
}

impl<'a, P, T> IntoIterator for &'a PrefixMap<P, T> {
    type Item = (&'a P, &'a T);
    type IntoIter = Iter<'a, P, T>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            table: &self.table,
            stack: vec![0],
        }
    }
}

impl<P, T> PrefixMap<P, T> {
    /// Iterate over all entries in lexicographic order.
    ///
    /// ```
    /// # use cidr_collections::PrefixMap;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let pm: PrefixMap<Ipv4Net, u32> = PrefixMap::from_iter([
    ///     ("10.0.1.0/24".parse()?, 3),
    ///     ("10.0.0.0/8".parse()?, 1),
    ///     ("10.0.0.0/24".parse()?, 2),
    /// ]);
    /// let entries: Vec<_> = pm.iter().map(|(p, v)| (*p, *v)).collect();
    /// assert_eq!(entries, vec![
    ///     ("10.0.0.0/8".parse()?, 1),
    ///     ("10.0.0.0/24".parse()?, 2),
    ///     ("10.0.1.0/24".parse()?, 3),
    /// ]);
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn iter(&self) -> Iter<'_, P, T> {
        self.into_iter()
    }

    /// Iterate over all prefixes in lexicographic order.
    #[inline(always)]
    pub fn keys(&self) -> Keys<'_, P, T> {
        Keys { inner: self.iter() }
    }

    /// Iterate over all values, ordered lexicographically by prefix.
    #[inline(always)]
    pub fn values(&self) -> Values<'_, P, T> {
        Values { inner: self.iter() }
    }

    /// Consume the map, iterating over all prefixes.
    #[inline(always)]
    pub fn into_keys(self) -> IntoKeys<P, T>
    where
        P: Prefix,
    {
        IntoKeys {
            inner: self.into_iter(),
        }
    }

    /// Consume the map, iterating over all values.
    #[inline(always)]
    pub fn into_values(self) -> IntoValues<P, T>
    where
        P: Prefix,
    {
        IntoValues {
            inner: self.into_iter(),
        }
    }
}
