//! Property-based tests for the arithmetic primitives.
//!
//! These use `proptest` to assert invariants across randomly generated
//! inputs, with GMP (via `rug`) as the reference implementation for every
//! modular-arithmetic claim. Example-based tests pin known values; the
//! properties here express what must hold for all valid inputs.
//!
//! # How to run
//!
//! ```bash
//! cargo test --test property_tests
//!
//! # Increase case count for thorough testing (default is 256):
//! PROPTEST_CASES=10000 cargo test --test property_tests
//! ```

use proptest::prelude::*;
use rug::Integer;

use wesolock::modular::{mod_pow, mod_pow_product};
use wesolock::montgomery::MontgomeryReducer;
use wesolock::primes::{is_prime, next_prime, DEFAULT_MR_ROUNDS};
use wesolock::transcript::{from_bytes_be, to_bytes_be, to_fixed_bytes_be};

proptest! {
    /// mod_pow agrees with GMP for u64-sized operands.
    #[test]
    fn prop_mod_pow_matches_gmp(
        base in 0u64..=u64::MAX,
        exp in 0u64..=u64::MAX,
        modulus in 2u64..=u64::MAX,
    ) {
        let b = Integer::from(base);
        let e = Integer::from(exp);
        let m = Integer::from(modulus);
        let expected = b.clone().pow_mod(&e, &m).unwrap();
        prop_assert_eq!(mod_pow(&b, &e, &m), expected);
    }

    /// The window path agrees with GMP when the exponent is wide.
    #[test]
    fn prop_mod_pow_wide_exponent_matches_gmp(
        base in 2u64..=u64::MAX,
        exp_lo in 0u64..=u64::MAX,
        exp_hi in 1u64..=u64::MAX,
        modulus in 3u64..=u64::MAX,
    ) {
        let b = Integer::from(base);
        let e = (Integer::from(exp_hi) << 64u32) | Integer::from(exp_lo);
        let m = Integer::from(modulus);
        let expected = b.clone().pow_mod(&e, &m).unwrap();
        prop_assert_eq!(mod_pow(&b, &e, &m), expected);
    }

    /// a^e * b^f mod m from the interleaved scan equals two exponentiations.
    #[test]
    fn prop_mod_pow_product_matches_two_pows(
        a in 0u64..=u64::MAX,
        e in 0u64..=u64::MAX,
        b in 0u64..=u64::MAX,
        f in 0u64..=u64::MAX,
        modulus in 2u64..=u64::MAX,
    ) {
        let (a, e) = (Integer::from(a), Integer::from(e));
        let (b, f) = (Integer::from(b), Integer::from(f));
        let m = Integer::from(modulus);
        let expected = (mod_pow(&a, &e, &m) * mod_pow(&b, &f, &m)) % &m;
        prop_assert_eq!(mod_pow_product(&a, &e, &b, &f, &m), expected);
    }

    /// Montgomery conversion is a bijection on [0, n).
    #[test]
    fn prop_montgomery_roundtrip(
        value in 0u64..=u64::MAX,
        modulus in 1u64..=(u64::MAX / 2),
    ) {
        let n = Integer::from(modulus * 2 + 1); // odd, > 1
        let a = Integer::from(value) % &n;
        let ctx = MontgomeryReducer::new(&n).unwrap();
        prop_assert_eq!(ctx.from_montgomery(&ctx.to_montgomery(&a)), a);
    }

    /// Montgomery products agree with plain modular products.
    #[test]
    fn prop_montgomery_multiply_matches_naive(
        x in 0u64..=u64::MAX,
        y in 0u64..=u64::MAX,
        modulus in 1u64..=(u64::MAX / 2),
    ) {
        let n = Integer::from(modulus * 2 + 1);
        let x = Integer::from(x) % &n;
        let y = Integer::from(y) % &n;
        let ctx = MontgomeryReducer::new(&n).unwrap();
        let got = ctx.from_montgomery(&ctx.multiply(&ctx.to_montgomery(&x), &ctx.to_montgomery(&y)));
        prop_assert_eq!(got, Integer::from(&x * &y) % &n);
    }

    /// next_prime lands on a probable prime at or above its argument, and
    /// below 2^20 it matches a sieve-derived successor exactly.
    #[test]
    fn prop_next_prime_is_least_upper_prime(n in 0u32..1_000_000) {
        let got = next_prime(&Integer::from(n), DEFAULT_MR_ROUNDS);
        prop_assert!(got >= n);
        prop_assert!(is_prime(&got, DEFAULT_MR_ROUNDS));
        // Nothing prime in between.
        let mut k = Integer::from(n);
        while k < got {
            prop_assert!(!is_prime(&k, DEFAULT_MR_ROUNDS));
            k += 1u32;
        }
    }

    /// Minimal big-endian byte encoding roundtrips.
    #[test]
    fn prop_bytes_roundtrip(hi in 0u64..=u64::MAX, lo in 0u64..=u64::MAX) {
        let v = (Integer::from(hi) << 64u32) | Integer::from(lo);
        prop_assert_eq!(from_bytes_be(&to_bytes_be(&v)), v);
    }

    /// Fixed-width encoding preserves the value and only ever adds zeros.
    #[test]
    fn prop_fixed_bytes_preserve_value(value in 0u64..=u64::MAX, pad in 0usize..8) {
        let v = Integer::from(value);
        let width = to_bytes_be(&v).len() + pad;
        let bytes = to_fixed_bytes_be(&v, width).unwrap();
        prop_assert_eq!(bytes.len(), width);
        prop_assert_eq!(from_bytes_be(&bytes), v);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Full roundtrip: any coprime input and any small delay proves and
    /// verifies. Kept at a reduced case count since every case walks a
    /// 512-bit challenge derivation.
    #[test]
    fn prop_roundtrip_verifies(x in 2u64..1_000_000_000, t in 1u64..64) {
        let modulus = Integer::from(1000000007u64) * Integer::from(1000000009u64);
        prop_assume!(Integer::from(Integer::from(x).gcd_ref(&modulus)) == 1u32);
        let params = wesolock::VdfParams { modulus, iterations: t };
        let output = wesolock::evaluate(&Integer::from(x), &params).unwrap();
        let proof = wesolock::generate_proof(&output, None).unwrap();
        prop_assert!(wesolock::verify(&proof));
        prop_assert!(wesolock::verify_with_challenge(&proof));
    }
}
