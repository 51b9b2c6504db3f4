//! The generic [`Prefix`] trait that both containers are keyed on.

use ipnet::{Ipv4Net, Ipv6Net};
use num_traits::{CheckedShr, PrimInt, Unsigned, Zero};

/// A CIDR prefix: an address of fixed bit width together with a prefix
/// length. The address is represented as an unsigned primitive integer where
/// bit 0 of the address is the most significant bit of the integer.
///
/// Only the first `prefix_len` bits of the address are significant;
/// [`Prefix::network`] returns the representation with all later bits
/// cleared. Implementations may store unmasked host bits (like
/// [`Ipv4Net`] does), the containers never look at them.
pub trait Prefix: Sized {
    /// The integer representation of the address: one of `u8`, `u16`, `u32`,
    /// `u64`, or `u128`.
    type R: Unsigned + PrimInt + Zero + CheckedShr;

    /// The raw address bits, possibly including host bits.
    fn bits(&self) -> Self::R;

    /// The prefix length, in the range `0..=Self::max_len()`.
    fn prefix_len(&self) -> u8;

    /// Construct a prefix from address bits and a prefix length. The length
    /// must not exceed [`Prefix::max_len`].
    fn from_bits_len(bits: Self::R, len: u8) -> Self;

    /// The address bits with everything at or beyond `prefix_len` cleared.
    /// Re-implement this if the representation is already masked.
    fn network(&self) -> Self::R {
        self.bits() & prefix_mask(self.prefix_len())
    }

    /// The number of bits in the address: 32 for IPv4, 128 for IPv6.
    fn max_len() -> u8 {
        Self::R::zero().count_zeros() as u8
    }

    /// The prefix matching everything (zero address, length 0).
    fn zero() -> Self {
        Self::from_bits_len(Self::R::zero(), 0)
    }

    /// A copy of `self` in canonical form (host bits cleared).
    fn canonical(&self) -> Self {
        Self::from_bits_len(self.network(), self.prefix_len())
    }

    /// The longest prefix that contains both `self` and `other`.
    fn common_prefix(&self, other: &Self) -> Self {
        let a = self.network();
        let b = other.network();
        let len = ((a ^ b).leading_zeros() as u8)
            .min(self.prefix_len())
            .min(other.prefix_len());
        Self::from_bits_len(a & prefix_mask(len), len)
    }

    /// Does `self` contain `other`? A prefix contains itself.
    fn contains(&self, other: &Self) -> bool {
        self.prefix_len() <= other.prefix_len()
            && other.bits() & prefix_mask(self.prefix_len()) == self.network()
    }

    /// Is the bit at the given position set? Position 0 is the first
    /// (most significant) bit of the address; bits at or beyond the prefix
    /// length always read as unset.
    fn is_bit_set(&self, bit: u8) -> bool {
        let top: Self::R = !(!<Self::R as Zero>::zero() >> 1usize);
        match top.checked_shr(bit as u32) {
            Some(mask) => self.network() & mask != Self::R::zero(),
            None => false,
        }
    }

    /// Are the two prefixes the same (same significant bits, same length)?
    fn eq(&self, other: &Self) -> bool {
        self.prefix_len() == other.prefix_len() && self.network() == other.network()
    }
}

/// The mask that keeps the first `len` bits: `len` ones followed by zeros.
pub(crate) fn prefix_mask<R>(len: u8) -> R
where
    R: PrimInt + Zero,
{
    if len as u32 >= R::zero().count_zeros() {
        !R::zero()
    } else if len == 0 {
        R::zero()
    } else {
        !(!R::zero() >> len as usize)
    }
}

impl Prefix for Ipv4Net {
    type R = u32;

    fn bits(&self) -> u32 {
        self.addr().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }

    fn from_bits_len(bits: u32, len: u8) -> Self {
        Ipv4Net::new(bits.into(), len).unwrap()
    }

    fn network(&self) -> u32 {
        Ipv4Net::network(self).into()
    }

    fn zero() -> Self {
        Default::default()
    }

    fn eq(&self, other: &Self) -> bool {
        self == other
    }

    fn contains(&self, other: &Self) -> bool {
        Ipv4Net::contains(self, other)
    }
}

impl Prefix for Ipv6Net {
    type R = u128;

    fn bits(&self) -> u128 {
        self.addr().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }

    fn from_bits_len(bits: u128, len: u8) -> Self {
        Ipv6Net::new(bits.into(), len).unwrap()
    }

    fn network(&self) -> u128 {
        Ipv6Net::network(self).into()
    }

    fn zero() -> Self {
        Default::default()
    }

    fn eq(&self, other: &Self) -> bool {
        self == other
    }

    fn contains(&self, other: &Self) -> bool {
        Ipv6Net::contains(self, other)
    }
}

impl<R> Prefix for (R, u8)
where
    R: Unsigned + PrimInt + Zero + CheckedShr,
{
    type R = R;

    fn bits(&self) -> R {
        self.0
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }

    fn from_bits_len(bits: R, len: u8) -> Self {
        (bits, len)
    }

    fn eq(&self, other: &Self) -> bool {
        self.1 == other.1 && self.network() == other.network()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! net {
        ($p:literal) => {
            $p.parse::<Ipv4Net>().unwrap()
        };
    }

    #[test]
    fn masks() {
        assert_eq!(prefix_mask::<u8>(3), 0b1110_0000);
        assert_eq!(prefix_mask::<u8>(8), 0xff);
        assert_eq!(prefix_mask::<u8>(0), 0x00);
        assert_eq!(prefix_mask::<u32>(8), 0xff00_0000);
        assert_eq!(prefix_mask::<u32>(31), 0xffff_fffe);
        assert_eq!(prefix_mask::<u32>(32), 0xffff_ffff);
        assert_eq!(prefix_mask::<u128>(128), !0u128);
    }

    #[test]
    fn network_masks_host_bits() {
        let p = net!("10.1.2.3/8");
        assert_eq!(Prefix::prefix_len(&p), 8);
        assert_eq!(p.bits(), (10 << 24) + (1 << 16) + (2 << 8) + 3);
        assert_eq!(Prefix::network(&p), 10u32 << 24);
        assert!(Prefix::eq(&net!("10.0.0.0/8"), &p.canonical()));
    }

    #[test]
    fn containment() {
        let outer = net!("10.0.0.0/8");
        let inner = net!("10.128.0.0/9");
        let other = net!("11.0.0.0/9");
        assert!(Prefix::contains(&outer, &inner));
        assert!(Prefix::contains(&outer, &outer));
        assert!(!Prefix::contains(&inner, &outer));
        assert!(!Prefix::contains(&outer, &other));
    }

    #[test]
    fn common_prefix() {
        assert!(Prefix::eq(
            &net!("1.2.3.0/24").common_prefix(&net!("1.3.3.0/24")),
            &net!("1.2.0.0/15")
        ));
        assert!(Prefix::eq(
            &net!("1.2.3.0/24").common_prefix(&net!("1.2.3.0/30")),
            &net!("1.2.3.0/24")
        ));
    }

    #[test]
    fn bit_positions() {
        assert!(net!("255.0.0.0/8").is_bit_set(0));
        assert!(net!("255.0.0.0/8").is_bit_set(7));
        // bits past the prefix length read as zero
        assert!(!net!("255.255.0.0/8").is_bit_set(8));
        assert!(!net!("0.0.0.1/32").is_bit_set(30));
        assert!(net!("0.0.0.1/32").is_bit_set(31));
    }

    #[generic_tests::define]
    mod generic {
        use super::*;
        use num_traits::NumCast;

        /// Build a prefix from the top 32 bits of the representation.
        fn new<P: Prefix>(bits: u32, len: u8) -> P {
            let shift = P::max_len() - 32;
            let bits = <P::R as NumCast>::from(bits).unwrap() << shift as usize;
            P::from_bits_len(bits, len)
        }

        #[test]
        fn zero_matches_everything<P: Prefix>() {
            let z = P::zero();
            assert_eq!(z.prefix_len(), 0);
            assert!(z.contains(&new::<P>(0xffff_ffff, 32)));
            assert!(z.contains(&z));
        }

        #[test]
        fn mask_and_canonical<P: Prefix>()
        where
            P::R: std::fmt::Debug,
        {
            let p: P = new(0x0a01_0203, 16);
            assert_eq!(
                <u32 as NumCast>::from(p.network() >> (P::max_len() - 32) as usize),
                Some(0x0a01_0000)
            );
            let c = p.canonical();
            assert_eq!(c.bits(), p.network());
            assert_eq!(c.prefix_len(), p.prefix_len());
        }

        #[test]
        fn common_prefix<P: Prefix>() {
            let a: P = new(0x0102_0304, 24);
            let b: P = new(0x0103_0304, 24);
            let c: P = new(0x0102_0000, 15);
            assert!(a.common_prefix(&b).eq(&c));
            assert!(b.common_prefix(&a).eq(&c));
        }

        #[test]
        fn contains_is_reflexive_and_ordered<P: Prefix>() {
            let outer: P = new(0x0a00_0000, 8);
            let inner: P = new(0x0a80_0000, 9);
            assert!(outer.contains(&outer));
            assert!(outer.contains(&inner));
            assert!(!inner.contains(&outer));
        }

        #[instantiate_tests(<Ipv4Net>)]
        mod ipv4net {}

        #[instantiate_tests(<Ipv6Net>)]
        mod ipv6net {}

        #[instantiate_tests(<(u32, u8)>)]
        mod raw32 {}

        #[instantiate_tests(<(u128, u8)>)]
        mod raw128 {}
    }
}
