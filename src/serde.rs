//! Serialization and deserialization as a sequence of entries.

use ::serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{CidrSet, Prefix, PrefixMap};

impl<P: Prefix + Serialize, T: Serialize> Serialize for PrefixMap<P, T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let entries: Vec<(&P, &T)> = Vec::from_iter(self);
        entries.serialize(serializer)
    }
}

impl<'de, P: Prefix + Deserialize<'de>, T: Deserialize<'de>> Deserialize<'de> for PrefixMap<P, T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries: Vec<(P, T)> = Vec::deserialize(deserializer)?;
        Ok(Self::from_iter(entries))
    }
}

impl<P: Prefix + Serialize> Serialize for CidrSet<P> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let nets: Vec<&P> = Vec::from_iter(self);
        nets.serialize(serializer)
    }
}

impl<'de, P: Prefix + Deserialize<'de>> Deserialize<'de> for CidrSet<P> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nets: Vec<P> = Vec::deserialize(deserializer)?;
        Ok(Self::from_iter(nets))
    }
}
