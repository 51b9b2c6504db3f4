//! The family-checked address set.

use std::net::IpAddr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};

use super::FamilyPrefix;
use crate::set;
use crate::{CidrSet, Error};

/// A set of addresses of one family, stored as the minimal collection of
/// disjoint CIDRs covering exactly those addresses.
///
/// Arguments are the family-agnostic [`IpNet`] and [`IpAddr`]; single
/// addresses are treated as host prefixes. Mutations with the wrong family
/// fail with [`Error::FamilyMismatch`], non-canonical prefixes with
/// [`Error::InvalidPrefix`]; queries with the wrong family answer `false`.
///
/// ```
/// # use cidr_collections::Ipv4Set;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut set = Ipv4Set::new();
/// set.insert("10.0.0.0/24".parse()?)?;
/// set.remove("10.0.0.0/25".parse()?)?;
/// assert!(set.contains("10.0.0.128/25".parse()?));
/// assert!(!set.contains_addr("10.0.0.1".parse()?));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct IpSet<P> {
    tree: CidrSet<P>,
}

/// A set of 4-byte IPv4 addresses.
pub type Ipv4Set = IpSet<Ipv4Net>;
/// A set of 16-byte IPv6 addresses.
pub type Ipv6Set = IpSet<Ipv6Net>;

impl<P> Default for IpSet<P>
where
    P: FamilyPrefix,
{
    fn default() -> Self {
        Self {
            tree: CidrSet::new(),
        }
    }
}

impl<P> IpSet<P>
where
    P: FamilyPrefix,
{
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The address width of this set's family in bytes: 4 or 16.
    pub fn width(&self) -> usize {
        P::WIDTH
    }

    /// Returns `true` if the set contains no addresses.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The number of disjoint CIDRs the set is stored as.
    pub fn num_cidrs(&self) -> usize {
        self.tree.num_cidrs()
    }

    /// The number of addresses in the set, saturating at `u128::MAX`.
    pub fn addr_count(&self) -> u128 {
        self.tree.addr_count()
    }

    /// Remove all addresses.
    pub fn clear(&mut self) {
        self.tree.clear()
    }

    /// Insert every address of the given network into the set.
    pub fn insert(&mut self, net: IpNet) -> Result<(), Error> {
        self.tree.insert(P::from_net(net)?);
        Ok(())
    }

    /// Insert a single address into the set.
    pub fn insert_addr(&mut self, addr: IpAddr) -> Result<(), Error> {
        self.tree.insert(P::from_addr(addr)?);
        Ok(())
    }

    /// Remove every address of the given network from the set. Removing
    /// addresses that are not present is a no-op.
    pub fn remove(&mut self, net: IpNet) -> Result<(), Error> {
        self.tree.remove(&P::from_net(net)?);
        Ok(())
    }

    /// Remove a single address from the set.
    pub fn remove_addr(&mut self, addr: IpAddr) -> Result<(), Error> {
        self.tree.remove(&P::from_addr(addr)?);
        Ok(())
    }

    /// Does the set contain every address of the given network? Answers
    /// `false` for the wrong family.
    pub fn contains(&self, net: IpNet) -> bool {
        P::from_net(net)
            .map(|p| self.tree.contains(&p))
            .unwrap_or(false)
    }

    /// Does the set contain the given address?
    pub fn contains_addr(&self, addr: IpAddr) -> bool {
        P::from_addr(addr)
            .map(|p| self.tree.contains(&p))
            .unwrap_or(false)
    }

    /// The union of the two sets, as a new set.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            tree: self.tree.union(&other.tree),
        }
    }

    /// The set difference `self - other`, as a new set.
    pub fn difference(&self, other: &Self) -> Self {
        Self {
            tree: self.tree.difference(&other.tree),
        }
    }

    /// The intersection of the two sets, as a new set.
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            tree: self.tree.intersection(&other.tree),
        }
    }

    /// Iterate over the disjoint CIDRs of the set in address order, at the
    /// full width of the family.
    pub fn iter(&self) -> SetIter<'_, P> {
        SetIter {
            inner: self.tree.iter(),
        }
    }

    /// Iterate over the first `limit` addresses of the set in address
    /// order. A limit of 0 means all addresses; the expansion of a single
    /// CIDR is capped at 2³⁰ addresses either way.
    pub fn addrs(&self, limit: usize) -> AddrIter<'_, P> {
        AddrIter {
            inner: self.tree.addrs(limit),
        }
    }

    /// Check the structural invariants of the backing tree. Intended as a
    /// test oracle; an empty result means the set is sound.
    pub fn validate(&self) -> Vec<String>
    where
        P: std::fmt::Debug,
    {
        self.tree.validate()
    }
}

/// An iterator over the disjoint CIDRs of an [`IpSet`] in address order.
pub struct SetIter<'a, P> {
    inner: set::Iter<'a, P>,
}

impl<P: FamilyPrefix> Iterator for SetIter<'_, P> {
    type Item = IpNet;

    fn next(&mut self) -> Option<IpNet> {
        self.inner.next().map(|p| p.to_net())
    }
}

/// An iterator over the addresses of an [`IpSet`] in address order.
pub struct AddrIter<'a, P: FamilyPrefix> {
    inner: set::Addrs<'a, P>,
}

impl<P: FamilyPrefix> Iterator for AddrIter<'_, P> {
    type Item = IpAddr;

    fn next(&mut self) -> Option<IpAddr> {
        self.inner.next().map(|p| p.to_addr())
    }
}

impl<'a, P: FamilyPrefix> IntoIterator for &'a IpSet<P> {
    type Item = IpNet;
    type IntoIter = SetIter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<P: FamilyPrefix> PartialEq for IpSet<P> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<P: FamilyPrefix> Eq for IpSet<P> {}
