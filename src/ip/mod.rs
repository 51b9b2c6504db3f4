//! Family-checked containers over [`IpNet`] and [`IpAddr`].
//!
//! The generic containers in [`crate::map`] and [`crate::set`] are typed on
//! a single prefix family. The wrappers in this module instead accept the
//! family-agnostic [`IpNet`] and [`IpAddr`] types and check the family at
//! run time: a container carries one address width (4 or 16 bytes), and
//! every operation first converts its argument into the container's prefix
//! type. Mutations fail with [`Error::FamilyMismatch`] on the wrong family
//! and with [`Error::InvalidPrefix`] on a non-canonical prefix; queries
//! simply answer `None` or `false`.

use std::net::IpAddr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};

use crate::{Error, Prefix};

mod map;
mod set;

pub use map::{AggregateNets, IpMap, Ipv4Map, Ipv6Map, NetIter};
pub use set::{AddrIter, IpSet, Ipv4Set, Ipv6Set, SetIter};

/// A prefix type belonging to one IP address family, convertible from and to
/// the family-agnostic [`IpNet`]/[`IpAddr`] types.
pub trait FamilyPrefix: Prefix + Copy {
    /// The address width of this family in bytes: 4 or 16.
    const WIDTH: usize;

    /// Convert a prefix of either family. Fails with
    /// [`Error::FamilyMismatch`] for the other family and with
    /// [`Error::InvalidPrefix`] if host bits are set.
    fn from_net(net: IpNet) -> Result<Self, Error>;

    /// Convert an address of either family to a host prefix (full prefix
    /// length). Fails with [`Error::FamilyMismatch`] for the other family.
    fn from_addr(addr: IpAddr) -> Result<Self, Error>;

    /// This prefix as a family-agnostic [`IpNet`].
    fn to_net(self) -> IpNet;

    /// The network address of this prefix as a family-agnostic [`IpAddr`].
    fn to_addr(self) -> IpAddr;
}

impl FamilyPrefix for Ipv4Net {
    const WIDTH: usize = 4;

    fn from_net(net: IpNet) -> Result<Self, Error> {
        match net {
            IpNet::V4(net) if net.addr() == net.network() => Ok(net),
            IpNet::V4(_) => Err(Error::InvalidPrefix),
            IpNet::V6(_) => Err(Error::FamilyMismatch),
        }
    }

    fn from_addr(addr: IpAddr) -> Result<Self, Error> {
        match addr {
            IpAddr::V4(addr) => Ok(addr.into()),
            IpAddr::V6(_) => Err(Error::FamilyMismatch),
        }
    }

    fn to_net(self) -> IpNet {
        IpNet::V4(self)
    }

    fn to_addr(self) -> IpAddr {
        IpAddr::V4(self.network())
    }
}

impl FamilyPrefix for Ipv6Net {
    const WIDTH: usize = 16;

    fn from_net(net: IpNet) -> Result<Self, Error> {
        match net {
            IpNet::V6(net) if net.addr() == net.network() => Ok(net),
            IpNet::V6(_) => Err(Error::InvalidPrefix),
            IpNet::V4(_) => Err(Error::FamilyMismatch),
        }
    }

    fn from_addr(addr: IpAddr) -> Result<Self, Error> {
        match addr {
            IpAddr::V6(addr) => Ok(addr.into()),
            IpAddr::V4(_) => Err(Error::FamilyMismatch),
        }
    }

    fn to_net(self) -> IpNet {
        IpNet::V6(self)
    }

    fn to_addr(self) -> IpAddr {
        IpAddr::V6(self.network())
    }
}
