//! Containers for IPv4 and IPv6 address space.
//!
//! This crate provides two data structures over CIDR prefixes:
//!
//! - [`PrefixMap`]: a map from prefixes to values, backed by a binary
//!   (patricia) trie. Lookups perform either an exact match or a
//!   longest-prefix match. Iteration yields entries in lexicographic order
//!   (by address bits, with shorter prefixes before longer ones sharing the
//!   same bits). The map can also [`aggregate`](PrefixMap::aggregate)
//!   itself: emit the minimal set of prefix/value pairs for which every
//!   longest-prefix match returns the same value as on the full map.
//! - [`CidrSet`]: a set of addresses, stored as the minimal collection of
//!   disjoint CIDRs covering exactly those addresses. Inserting a block that
//!   completes a sibling pair merges the pair into its parent; removing a
//!   block splits the covering CIDR into its complementary halves. Union,
//!   difference, and intersection build new sets.
//!
//! Both containers are generic over the [`Prefix`] trait, which represents a
//! prefix as an unsigned integer (`u32` for IPv4, `u128` for IPv6) plus a
//! prefix length. The [`ip`] module provides family-checked wrappers
//! ([`Ipv4Map`], [`Ipv6Map`], [`Ipv4Set`], [`Ipv6Set`]) that accept
//! [`ipnet::IpNet`] and [`std::net::IpAddr`] arguments and reject the wrong
//! address family at run time with [`Error::FamilyMismatch`].
//!
//! The low-level CIDR arithmetic (half-splitting, CIDR-wise difference, and
//! the sibling merge test) lives in the [`arith`] module.

pub mod arith;
mod error;
mod fmt;
#[cfg(test)]
mod fuzzing;
pub mod ip;
pub mod map;
mod prefix;
#[cfg(feature = "serde")]
mod serde;
pub mod set;

pub use error::Error;
pub use ip::{FamilyPrefix, IpMap, IpSet, Ipv4Map, Ipv4Set, Ipv6Map, Ipv6Set};
pub use map::PrefixMap;
pub use prefix::Prefix;
pub use set::CidrSet;

pub(crate) use prefix::prefix_mask;

/// Does `child` continue to the right of `parent`? This is the case if the
/// first bit of `child` after the common prefix with `parent` is set.
#[inline(always)]
pub(crate) fn to_right<P: Prefix>(parent: &P, child: &P) -> bool {
    child.is_bit_set(parent.prefix_len())
}
