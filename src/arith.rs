//! CIDR arithmetic: half-splitting, CIDR-wise difference, and the sibling
//! merge test. These operations maintain the minimality invariant of
//! [`crate::CidrSet`].

use crate::{prefix_mask, Prefix};

/// Split a prefix into its two halves, each one bit longer. The first half
/// keeps the network address, the second has the new bit set.
///
/// The prefix must be splittable, i.e., `p.prefix_len() < P::max_len()`.
///
/// ```
/// # use cidr_collections::arith::halves;
/// let (lo, hi) = halves(&"10.0.0.0/24".parse::<ipnet::Ipv4Net>().unwrap());
/// assert_eq!(lo, "10.0.0.0/25".parse().unwrap());
/// assert_eq!(hi, "10.0.0.128/25".parse().unwrap());
/// ```
pub fn halves<P: Prefix>(p: &P) -> (P, P) {
    debug_assert!(p.prefix_len() < P::max_len());
    let len = p.prefix_len() + 1;
    let new_bit = prefix_mask::<P::R>(len) ^ prefix_mask::<P::R>(len - 1);
    let lo = p.network();
    (P::from_bits_len(lo, len), P::from_bits_len(lo | new_bit, len))
}

/// The set difference `a - b` as a list of disjoint CIDRs.
///
/// If `b` covers `a`, the result is empty; if the two do not overlap, the
/// result is `a` itself. Otherwise `a` is repeatedly cut in half: the half
/// not touching `b` is emitted and the other half is cut again. The result
/// is therefore ordered from largest to smallest block, *not* by address.
///
/// ```
/// # use cidr_collections::arith::difference;
/// # use ipnet::Ipv4Net;
/// let a: Ipv4Net = "10.0.0.0/24".parse().unwrap();
/// let b: Ipv4Net = "10.0.0.120/29".parse().unwrap();
/// let expect = ["10.0.0.128/25", "10.0.0.0/26", "10.0.0.64/27", "10.0.0.96/28", "10.0.0.112/29"];
/// let diff: Vec<Ipv4Net> = difference(&a, &b);
/// assert_eq!(diff, expect.map(|s| s.parse::<Ipv4Net>().unwrap()));
/// ```
pub fn difference<P: Prefix>(a: &P, b: &P) -> Vec<P> {
    if b.contains(a) {
        return Vec::new();
    }
    if !a.contains(b) {
        return vec![a.canonical()];
    }
    // `a` strictly contains `b`: peel off halves until we reach `b`.
    let mut out = Vec::with_capacity((b.prefix_len() - a.prefix_len()) as usize);
    let mut cur = a.canonical();
    loop {
        let (lo, hi) = halves(&cur);
        let (keep, enter) = if hi.contains(b) { (lo, hi) } else { (hi, lo) };
        out.push(keep);
        if enter.prefix_len() == b.prefix_len() {
            break;
        }
        cur = enter;
    }
    out
}

/// If `a` and `b` are the two halves of a common parent, return that parent
/// (one bit shorter). The two must be distinct prefixes of equal length.
///
/// ```
/// # use cidr_collections::arith::combine;
/// # use ipnet::Ipv4Net;
/// let a: Ipv4Net = "10.0.0.0/25".parse().unwrap();
/// let b: Ipv4Net = "10.0.0.128/25".parse().unwrap();
/// assert_eq!(combine(&a, &b), Some("10.0.0.0/24".parse().unwrap()));
/// assert_eq!(combine(&b, &"10.0.1.0/25".parse().unwrap()), None);
/// ```
pub fn combine<P: Prefix>(a: &P, b: &P) -> Option<P> {
    if a.prefix_len() == 0 || a.prefix_len() != b.prefix_len() || a.network() == b.network() {
        return None;
    }
    let len = a.prefix_len() - 1;
    let parent = P::from_bits_len(a.network() & prefix_mask(len), len);
    parent.contains(b).then_some(parent)
}
