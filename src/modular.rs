//! # Modular - Windowed Modular Exponentiation
//!
//! Exponentiation drives everything here: Miller-Rabin rounds, the verify
//! equation, and the remainder 2^t mod l. Small exponents use plain binary
//! square-and-multiply; larger ones use a left-to-right sliding window over a
//! table of odd powers, which trades 2^(w-1) precomputed entries for roughly
//! one multiplication per w bits. Exponents of 128 bits or more against a
//! modulus of at least 1024 bits are routed through Montgomery arithmetic
//! (see [`crate::montgomery`]); the window scan is identical in both forms.
//!
//! [`mod_pow_product`] evaluates a^e * b^f mod m in a single interleaved scan
//! (Shamir's trick), squaring once per bit position instead of once per bit
//! position per exponent. The verifier uses it for pi^l * x^r.
//!
//! ## References
//!
//! - Menezes, van Oorschot, Vanstone, "Handbook of Applied Cryptography",
//!   Algorithm 14.85 (sliding window) and 14.88 (Shamir's trick).

use rug::Integer;

use crate::montgomery::{cached_reducer, should_route_exponent, MontgomeryReducer};

/// Exponents at or below this bit width skip the window machinery.
const PLAIN_BINARY_MAX_EXPONENT_BITS: u32 = 64;

/// Window width for a given exponent bit length.
fn window_width(exponent_bits: u32) -> u32 {
    match exponent_bits {
        0..=32 => 1,
        33..=96 => 3,
        97..=384 => 4,
        385..=1024 => 5,
        _ => 6,
    }
}

/// Compute base^exponent mod modulus for nonnegative operands.
pub fn mod_pow(base: &Integer, exponent: &Integer, modulus: &Integer) -> Integer {
    if *modulus == 1u32 {
        return Integer::new();
    }
    if *exponent == 0u32 {
        return Integer::from(1u32);
    }
    if *exponent == 1u32 {
        return Integer::from(base % modulus);
    }
    if *exponent == 2u32 {
        let mut square = Integer::from(base % modulus);
        square.square_mut();
        square %= modulus;
        return square;
    }

    let exponent_bits = exponent.significant_bits();
    if exponent_bits <= PLAIN_BINARY_MAX_EXPONENT_BITS {
        return binary_pow(base, exponent, modulus);
    }

    let width = window_width(exponent_bits);
    if should_route_exponent(modulus, exponent_bits) {
        if let Ok(reducer) = cached_reducer(modulus) {
            return window_pow_montgomery(base, exponent, &reducer, width);
        }
    }
    window_pow_plain(base, exponent, modulus, width)
}

/// Left-to-right binary square-and-multiply, for short exponents.
fn binary_pow(base: &Integer, exponent: &Integer, modulus: &Integer) -> Integer {
    let base = Integer::from(base % modulus);
    let mut acc = Integer::from(1u32);
    for i in (0..exponent.significant_bits()).rev() {
        acc.square_mut();
        acc %= modulus;
        if exponent.get_bit(i) {
            acc *= &base;
            acc %= modulus;
        }
    }
    acc
}

/// Sliding-window exponentiation on plain representatives.
///
/// The table holds base^1, base^3, ..., base^(2^width - 1); even powers are
/// reached by the squarings between windows.
fn window_pow_plain(base: &Integer, exponent: &Integer, modulus: &Integer, width: u32) -> Integer {
    let base = Integer::from(base % modulus);
    let mut base_square = Integer::from(base.square_ref());
    base_square %= modulus;

    let mut table = Vec::with_capacity(1 << (width - 1));
    table.push(base);
    for i in 1..(1usize << (width - 1)) {
        let mut next = Integer::from(&table[i - 1] * &base_square);
        next %= modulus;
        table.push(next);
    }

    let mut acc = Integer::from(1u32);
    let mut i = exponent.significant_bits() as i64 - 1;
    while i >= 0 {
        if !exponent.get_bit(i as u32) {
            acc.square_mut();
            acc %= modulus;
            i -= 1;
            continue;
        }
        // Window of up to `width` bits, trimmed so it ends in a set bit.
        let mut bottom = (i - i64::from(width) + 1).max(0);
        while !exponent.get_bit(bottom as u32) {
            bottom += 1;
        }
        let mut window = 0usize;
        for k in (bottom..=i).rev() {
            acc.square_mut();
            acc %= modulus;
            window = (window << 1) | exponent.get_bit(k as u32) as usize;
        }
        acc *= &table[(window - 1) / 2];
        acc %= modulus;
        i = bottom - 1;
    }
    acc
}

/// Sliding-window exponentiation in Montgomery form; same scan as
/// [`window_pow_plain`] with REDC-based products.
fn window_pow_montgomery(
    base: &Integer,
    exponent: &Integer,
    reducer: &MontgomeryReducer,
    width: u32,
) -> Integer {
    let base = reducer.to_montgomery(base);
    let base_square = reducer.square(&base);

    let mut table = Vec::with_capacity(1 << (width - 1));
    table.push(base);
    for i in 1..(1usize << (width - 1)) {
        let next = reducer.multiply(&table[i - 1], &base_square);
        table.push(next);
    }

    let mut acc = reducer.one();
    let mut i = exponent.significant_bits() as i64 - 1;
    while i >= 0 {
        if !exponent.get_bit(i as u32) {
            acc = reducer.square(&acc);
            i -= 1;
            continue;
        }
        let mut bottom = (i - i64::from(width) + 1).max(0);
        while !exponent.get_bit(bottom as u32) {
            bottom += 1;
        }
        let mut window = 0usize;
        for k in (bottom..=i).rev() {
            acc = reducer.square(&acc);
            window = (window << 1) | exponent.get_bit(k as u32) as usize;
        }
        acc = reducer.multiply(&acc, &table[(window - 1) / 2]);
        i = bottom - 1;
    }
    reducer.from_montgomery(&acc)
}

/// Compute a^e * b^f mod m in one interleaved scan (Shamir's trick).
pub fn mod_pow_product(
    a: &Integer,
    e: &Integer,
    b: &Integer,
    f: &Integer,
    modulus: &Integer,
) -> Integer {
    if *modulus == 1u32 {
        return Integer::new();
    }
    let bits = e.significant_bits().max(f.significant_bits());
    if bits == 0 {
        return Integer::from(1u32);
    }

    if should_route_exponent(modulus, bits) {
        if let Ok(reducer) = cached_reducer(modulus) {
            return product_pow_montgomery(a, e, b, f, &reducer, bits);
        }
    }
    product_pow_plain(a, e, b, f, modulus, bits)
}

fn product_pow_plain(
    a: &Integer,
    e: &Integer,
    b: &Integer,
    f: &Integer,
    modulus: &Integer,
    bits: u32,
) -> Integer {
    let a = Integer::from(a % modulus);
    let b = Integer::from(b % modulus);
    let mut ab = Integer::from(&a * &b);
    ab %= modulus;

    let mut acc = Integer::from(1u32);
    for i in (0..bits).rev() {
        acc.square_mut();
        acc %= modulus;
        match (e.get_bit(i), f.get_bit(i)) {
            (true, true) => {
                acc *= &ab;
                acc %= modulus;
            }
            (true, false) => {
                acc *= &a;
                acc %= modulus;
            }
            (false, true) => {
                acc *= &b;
                acc %= modulus;
            }
            (false, false) => {}
        }
    }
    acc
}

fn product_pow_montgomery(
    a: &Integer,
    e: &Integer,
    b: &Integer,
    f: &Integer,
    reducer: &MontgomeryReducer,
    bits: u32,
) -> Integer {
    let a = reducer.to_montgomery(a);
    let b = reducer.to_montgomery(b);
    let ab = reducer.multiply(&a, &b);

    let mut acc = reducer.one();
    for i in (0..bits).rev() {
        acc = reducer.square(&acc);
        match (e.get_bit(i), f.get_bit(i)) {
            (true, true) => acc = reducer.multiply(&acc, &ab),
            (true, false) => acc = reducer.multiply(&acc, &a),
            (false, true) => acc = reducer.multiply(&acc, &b),
            (false, false) => {}
        }
    }
    reducer.from_montgomery(&acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rug::Integer;

    fn reference_pow(base: u64, exp: u64, modulus: u64) -> Integer {
        Integer::from(base)
            .pow_mod(&Integer::from(exp), &Integer::from(modulus))
            .unwrap()
    }

    #[test]
    fn edge_cases() {
        let x = Integer::from(12345u32);
        assert_eq!(mod_pow(&x, &Integer::from(100u32), &Integer::from(1u32)), 0);
        assert_eq!(mod_pow(&x, &Integer::new(), &Integer::from(97u32)), 1);
        assert_eq!(
            mod_pow(&x, &Integer::from(1u32), &Integer::from(97u32)),
            x.clone() % 97u32
        );
        assert_eq!(
            mod_pow(&x, &Integer::from(2u32), &Integer::from(97u32)),
            Integer::from(x.square_ref()) % 97u32
        );
    }

    #[test]
    fn matches_gmp_small_moduli() {
        // 8-bit and 64-bit moduli, exponents up to 2^20.
        for &m in &[251u64, 255, 999999999999999877] {
            for &base in &[2u64, 3, 77, 250] {
                for &exp in &[3u64, 63, 64, 65, 1021, 65537, (1 << 20) - 1, 1 << 20] {
                    let got = mod_pow(&Integer::from(base), &Integer::from(exp), &Integer::from(m));
                    assert_eq!(got, reference_pow(base, exp, m), "b={} e={} m={}", base, exp, m);
                }
            }
        }
    }

    /// Window path (exponent > 64 bits) against GMP on a 1024-bit odd modulus
    /// and on a full-size RSA modulus; both land on the Montgomery route for
    /// the wider exponents and on the plain window for the narrow ones.
    #[test]
    fn matches_gmp_large_moduli() {
        let m_1024 = (Integer::from(Integer::u_pow_u(2, 1023)) | Integer::from(12345u32)) | 1u32;
        let m_2048 = crate::moduli::rsa_2048().clone();
        let base = Integer::from(0x1234_5678_9abc_def0u64);

        for modulus in [m_1024, m_2048] {
            for exp_bits in [65u32, 96, 384, 500, 1024, 2000] {
                let exponent = Integer::from(Integer::u_pow_u(2, exp_bits)) - 0xab1u32;
                let expected = base
                    .clone()
                    .pow_mod(&exponent, &modulus)
                    .unwrap();
                assert_eq!(
                    mod_pow(&base, &exponent, &modulus),
                    expected,
                    "exp_bits={}",
                    exp_bits
                );
            }
        }
    }

    #[test]
    fn base_larger_than_modulus_is_reduced() {
        let m = Integer::from(1009u32);
        let base = Integer::from(1009u32 * 7 + 13);
        let exp = Integer::from(91u32);
        assert_eq!(
            mod_pow(&base, &exp, &m),
            Integer::from(13u32).pow_mod(&exp, &m).unwrap()
        );
    }

    #[test]
    fn window_width_schedule() {
        assert_eq!(window_width(32), 1);
        assert_eq!(window_width(33), 3);
        assert_eq!(window_width(96), 3);
        assert_eq!(window_width(97), 4);
        assert_eq!(window_width(384), 4);
        assert_eq!(window_width(385), 5);
        assert_eq!(window_width(1024), 5);
        assert_eq!(window_width(1025), 6);
    }

    #[test]
    fn product_matches_two_exponentiations() {
        let m = Integer::from(1000003u32);
        let a = Integer::from(12345u32);
        let b = Integer::from(67891u32);
        for (e, f) in [(0u64, 0u64), (1, 0), (0, 1), (77, 1023), (65536, 3), (999983, 999979)] {
            let e = Integer::from(e);
            let f = Integer::from(f);
            let expected =
                (mod_pow(&a, &e, &m) * mod_pow(&b, &f, &m)) % &m;
            assert_eq!(mod_pow_product(&a, &e, &b, &f, &m), expected);
        }
    }

    #[test]
    fn product_matches_on_rsa_modulus() {
        let m = crate::moduli::rsa_2048();
        let a = Integer::from(2u32);
        let b = Integer::from(3u32);
        let e = Integer::from(Integer::u_pow_u(2, 200)) - 1u32;
        let f = Integer::from(Integer::u_pow_u(2, 150)) + 7u32;
        let expected = (a.clone().pow_mod(&e, m).unwrap() * b.clone().pow_mod(&f, m).unwrap()) % m;
        assert_eq!(mod_pow_product(&a, &e, &b, &f, m), expected);
    }

    /// The Montgomery and plain scans must agree bit for bit.
    #[test]
    fn montgomery_parity_with_plain_window() {
        let m = crate::moduli::rsa_2048();
        let reducer = cached_reducer(m).unwrap();
        let base = Integer::from(987654321u64);
        let exponent = Integer::from(Integer::u_pow_u(2, 300)) - 12345u32;
        let width = window_width(exponent.significant_bits());
        assert_eq!(
            window_pow_plain(&base, &exponent, m, width),
            window_pow_montgomery(&base, &exponent, &reducer, width)
        );
    }
}
