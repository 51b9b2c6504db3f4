//! The family-checked prefix map.

use std::net::IpAddr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};

use super::FamilyPrefix;
use crate::map::{self, Entry};
use crate::{Error, PrefixMap};

/// A map from prefixes of one address family to values, with exact-match
/// and longest-prefix-match lookups and on-the-fly aggregation.
///
/// Arguments are the family-agnostic [`IpNet`] and [`IpAddr`]; single
/// addresses are treated as host prefixes (`/32` or `/128`). Mutations with
/// the wrong family fail with [`Error::FamilyMismatch`], non-canonical
/// prefixes (host bits set) with [`Error::InvalidPrefix`]; lookups with the
/// wrong family return `None`.
///
/// ```
/// # use cidr_collections::Ipv4Map;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut map: Ipv4Map<&str> = Ipv4Map::new();
/// map.insert("10.0.0.0/8".parse()?, "big")?;
/// map.insert("10.3.0.0/16".parse()?, "small")?;
/// let (prefix, value) = map.lpm_addr("10.3.2.1".parse()?).unwrap();
/// assert_eq!(prefix, "10.3.0.0/16".parse()?);
/// assert_eq!(value, &"small");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct IpMap<P, T> {
    inner: PrefixMap<P, T>,
}

/// A map keyed on 4-byte IPv4 prefixes.
pub type Ipv4Map<T> = IpMap<Ipv4Net, T>;
/// A map keyed on 16-byte IPv6 prefixes.
pub type Ipv6Map<T> = IpMap<Ipv6Net, T>;

impl<P, T> Default for IpMap<P, T>
where
    P: FamilyPrefix,
{
    fn default() -> Self {
        Self {
            inner: PrefixMap::new(),
        }
    }
}

impl<P, T> IpMap<P, T>
where
    P: FamilyPrefix,
{
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// The address width of this map's family in bytes: 4 or 16.
    pub fn width(&self) -> usize {
        P::WIDTH
    }

    /// The number of prefixes stored in the map.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.inner.clear()
    }

    /// Insert a value for a prefix that must not be present yet.
    ///
    /// ```
    /// # use cidr_collections::{Error, Ipv4Map};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut map: Ipv4Map<u32> = Ipv4Map::new();
    /// map.insert("10.0.0.0/16".parse()?, 1)?;
    /// assert_eq!(map.insert("10.0.0.0/16".parse()?, 2), Err(Error::AlreadyExists));
    /// assert_eq!(map.insert("2001:db8::/32".parse()?, 3), Err(Error::FamilyMismatch));
    /// assert_eq!(map.get("10.0.0.0/16".parse()?), Some(&1));
    /// # Ok(())
    /// # }
    /// ```
    pub fn insert(&mut self, net: IpNet, value: T) -> Result<(), Error> {
        let prefix = P::from_net(net)?;
        match self.inner.entry(prefix) {
            Entry::Occupied(_) => Err(Error::AlreadyExists),
            Entry::Vacant(e) => {
                e.insert(value);
                Ok(())
            }
        }
    }

    /// Insert a value for a single address (a host prefix) that must not be
    /// present yet.
    pub fn insert_addr(&mut self, addr: IpAddr, value: T) -> Result<(), Error> {
        let prefix = P::from_addr(addr)?;
        match self.inner.entry(prefix) {
            Entry::Occupied(_) => Err(Error::AlreadyExists),
            Entry::Vacant(e) => {
                e.insert(value);
                Ok(())
            }
        }
    }

    /// Insert a value for a prefix, overwriting in place if the prefix is
    /// already present. Returns the previous value.
    pub fn insert_or_update(&mut self, net: IpNet, value: T) -> Result<Option<T>, Error> {
        let prefix = P::from_net(net)?;
        Ok(self.inner.insert(prefix, value))
    }

    /// Insert a value for a single address, overwriting in place if the
    /// address is already present. Returns the previous value.
    pub fn insert_or_update_addr(&mut self, addr: IpAddr, value: T) -> Result<Option<T>, Error> {
        let prefix = P::from_addr(addr)?;
        Ok(self.inner.insert(prefix, value))
    }

    /// Return the value stored for the prefix, inserting the given one if
    /// the prefix is not present yet.
    pub fn get_or_insert(&mut self, net: IpNet, value: T) -> Result<&mut T, Error> {
        let prefix = P::from_net(net)?;
        Ok(self.inner.entry(prefix).or_insert(value))
    }

    /// Return the value stored for the address, inserting the given one if
    /// the address is not present yet.
    pub fn get_or_insert_addr(&mut self, addr: IpAddr, value: T) -> Result<&mut T, Error> {
        let prefix = P::from_addr(addr)?;
        Ok(self.inner.entry(prefix).or_insert(value))
    }

    /// The value stored for exactly this prefix. Both the address bits and
    /// the prefix length must match; `None` on the wrong family.
    pub fn get(&self, net: IpNet) -> Option<&T> {
        let prefix = P::from_net(net).ok()?;
        self.inner.get(&prefix)
    }

    /// A mutable reference to the value stored for exactly this prefix.
    pub fn get_mut(&mut self, net: IpNet) -> Option<&mut T> {
        let prefix = P::from_net(net).ok()?;
        self.inner.get_mut(&prefix)
    }

    /// The value stored for exactly this address (as a host prefix).
    pub fn get_addr(&self, addr: IpAddr) -> Option<&T> {
        let prefix = P::from_addr(addr).ok()?;
        self.inner.get(&prefix)
    }

    /// Is exactly this prefix present?
    pub fn contains(&self, net: IpNet) -> bool {
        self.get(net).is_some()
    }

    /// Longest-prefix match: the entry with the longest stored prefix that
    /// contains `net`, reported at the full width of the family.
    pub fn lpm(&self, net: IpNet) -> Option<(IpNet, &T)> {
        let prefix = P::from_net(net).ok()?;
        self.inner.get_lpm(&prefix).map(|(p, v)| (p.to_net(), v))
    }

    /// Longest-prefix match for a single address.
    pub fn lpm_addr(&self, addr: IpAddr) -> Option<(IpNet, &T)> {
        let prefix = P::from_addr(addr).ok()?;
        self.inner.get_lpm(&prefix).map(|(p, v)| (p.to_net(), v))
    }

    /// Remove the entry stored for exactly this prefix, returning its value.
    /// Removing an absent prefix is a no-op.
    pub fn remove(&mut self, net: IpNet) -> Result<Option<T>, Error> {
        let prefix = P::from_net(net)?;
        Ok(self.inner.remove(&prefix))
    }

    /// Remove the entry stored for exactly this address, returning its
    /// value. Removing an absent address is a no-op.
    pub fn remove_addr(&mut self, addr: IpAddr) -> Result<Option<T>, Error> {
        let prefix = P::from_addr(addr)?;
        Ok(self.inner.remove(&prefix))
    }

    /// Iterate over all entries in lexicographic order.
    pub fn iter(&self) -> NetIter<'_, P, T> {
        NetIter {
            inner: self.inner.iter(),
        }
    }

    /// Visit the minimal set of prefix/value pairs that is equivalent to
    /// this map under longest-prefix matching, in lexicographic order. See
    /// [`PrefixMap::aggregate`].
    pub fn aggregate(&self) -> AggregateNets<'_, P, T>
    where
        T: PartialEq,
    {
        AggregateNets {
            inner: self.inner.aggregate(),
        }
    }
}

/// An iterator over the entries of an [`IpMap`] in lexicographic order,
/// yielding full-width [`IpNet`] prefixes.
pub struct NetIter<'a, P, T> {
    inner: map::Iter<'a, P, T>,
}

impl<'a, P: FamilyPrefix, T> Iterator for NetIter<'a, P, T> {
    type Item = (IpNet, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(p, v)| (p.to_net(), v))
    }
}

/// An iterator over the aggregated entries of an [`IpMap`], yielding
/// full-width [`IpNet`] prefixes.
pub struct AggregateNets<'a, P, T> {
    inner: map::Aggregate<'a, P, T>,
}

impl<'a, P: FamilyPrefix, T> Iterator for AggregateNets<'a, P, T> {
    type Item = (IpNet, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(p, v)| (p.to_net(), v))
    }
}

impl<'a, P: FamilyPrefix, T> IntoIterator for &'a IpMap<P, T> {
    type Item = (IpNet, &'a T);
    type IntoIter = NetIter<'a, P, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
