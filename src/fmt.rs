//! Debug formatting for the containers.

use std::fmt::{Debug, Formatter, Result};

use crate::ip::FamilyPrefix;
use crate::{CidrSet, IpMap, IpSet, PrefixMap};

impl<P: Debug, T: Debug> Debug for PrefixMap<P, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<P: Debug> Debug for CidrSet<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<P: FamilyPrefix, T: Debug> Debug for IpMap<P, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<P: FamilyPrefix> Debug for IpSet<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
