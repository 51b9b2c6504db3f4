//! Errors surfaced at the container boundary.

/// Errors returned by the family-checked containers in [`crate::ip`].
///
/// Queries never return errors: looking up a key of the wrong family simply
/// yields `None` or `false`. Only mutating operations surface these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// An address or prefix of the wrong address family was supplied, e.g.,
    /// an IPv4 prefix passed to an IPv6 container.
    FamilyMismatch,
    /// A strict insert found the key already present.
    AlreadyExists,
    /// The supplied prefix is not in canonical form: it has bits set beyond
    /// its prefix length.
    InvalidPrefix,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::FamilyMismatch => f.write_str("address family does not match the container"),
            Error::AlreadyExists => f.write_str("the prefix is already present"),
            Error::InvalidPrefix => f.write_str("the prefix has host bits set"),
        }
    }
}

impl std::error::Error for Error {}
