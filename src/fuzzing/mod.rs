//! Randomized testing (quickcheck) of both containers.

use std::fmt::Debug;

use quickcheck::Arbitrary;

use crate::Prefix;

mod basic;
mod set_ops;

#[derive(Debug, PartialEq, Clone, Copy)]
enum Operation<P, T> {
    Add(P, T),
    Remove(P),
}

#[cfg(miri)]
const DEFAULT_NUM_TESTS: usize = 10;
#[cfg(not(miri))]
const DEFAULT_NUM_TESTS: usize = 1000;
const DEFAULT_GEN_SIZE: usize = 100;

fn proptest_runner<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F) {
    let num_tests: usize = std::env::var("QUICKCHECK_TESTS")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_NUM_TESTS);

    let gen_size: usize = std::env::var("QUICKCHECK_GENERATOR_SIZE")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_GEN_SIZE);

    let mut gen = quickcheck::Gen::new(gen_size);

    for _ in 0..num_tests {
        let input = A::arbitrary(&mut gen);
        let input_c = input.clone();
        if !f(input_c) {
            shrink_failure(f, input)
        }
    }
}

fn shrink_failure<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F, input: A) -> ! {
    for smaller in input.shrink() {
        let smaller_c = smaller.clone();
        if !f(smaller_c) {
            shrink_failure(f, smaller)
        }
    }
    // every shrunken input passes, so this is the minimal failing one
    panic!("[QUICKCHECK] Test case failed!\n  Minimal input:\n    {input:?}");
}

macro_rules! qc {
    ($name:ident, $f:ident) => {
        #[test]
        fn $name() {
            proptest_runner($f)
        }
    };
}
pub(crate) use qc;

impl<P: Arbitrary, T: Arbitrary> Arbitrary for Operation<P, T> {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        // adds are a lot more frequent than removes
        if g.choose(&[true, true, true, true, true, true, true, false, false, false])
            .copied()
            .unwrap_or_default()
        {
            Self::Add(P::arbitrary(g), T::arbitrary(g))
        } else {
            Self::Remove(P::arbitrary(g))
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            Operation::Add(p, t) => {
                let t = t.clone();
                Box::new(p.shrink().map(move |p| Operation::Add(p, t.clone())))
            }
            Operation::Remove(p) => Box::new(p.shrink().map(Operation::Remove)),
        }
    }
}

/// A short test prefix over `u32` bits. Keeping the lengths small makes
/// random collisions (and therefore interesting tree shapes) likely.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
struct TestPrefix(u32, u8);

impl Debug for TestPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bits = format!("{:032b}", self.0)[..10].to_string();
        write!(f, "0b{bits}/{}", self.1)
    }
}

impl Arbitrary for TestPrefix {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        #[rustfmt::skip]
        let len: u8 = *g
            .choose(&[
                0,
                1, 1,
                2, 2, 2,
                3, 3, 3, 3,
                4, 4, 4, 4, 4,
                5, 5, 5, 5, 5, 5,
                6, 6, 6, 6, 6, 6, 6,
                7, 7, 7, 7, 7, 7, 7, 7,
                8, 8, 8, 8, 8, 8, 8, 8, 8,
                9, 9, 9, 9, 9, 9, 9, 9, 9, 9,
            ])
            .unwrap();
        Self::from_bits_len(u32::arbitrary(g), len)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        if self.1 == 0 {
            quickcheck::empty_shrinker()
        } else {
            quickcheck::single_shrinker(Self::from_bits_len(self.0, self.1 - 1))
        }
    }
}

impl Prefix for TestPrefix {
    type R = u32;

    fn bits(&self) -> u32 {
        self.0
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }

    fn from_bits_len(bits: u32, len: u8) -> Self {
        Self(bits & crate::prefix_mask::<u32>(len), len)
    }
}
