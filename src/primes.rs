//! # Primes - Miller-Rabin Testing and Wheel-Accelerated Search
//!
//! The challenge derivation needs `next_prime` over 512-bit hash outputs, and
//! the verifier needs `is_prime` on the supplied challenge. Both sit on the
//! same pipeline: trial division by every prime up to 1000, then Miller-Rabin
//! with a deterministic witness set for small candidates and random witnesses
//! for large ones.
//!
//! ## Algorithm: Wheel-210 Walk
//!
//! Forward search steps only through residues coprime to 210 = 2*3*5*7.
//! There are 48 such residues per block of 210, so the walk visits 22.9% of
//! the integers a naive increment would. Every prime above 7 is congruent to
//! a wheel residue mod 210, so the walk cannot skip one.
//!
//! ## Algorithm: Miller-Rabin
//!
//! Write n-1 = 2^s * d with d odd. A witness a proves n composite unless
//! a^d = 1, or a^(d*2^r) = n-1 for some r < s. Below
//! 318,665,857,834,031,151,167,461 the first twelve primes form a complete
//! witness set and the answer is exact (Sorenson & Webster); above it each
//! random witness bounds the error by 1/4.
//!
//! ## References
//!
//! - Gary L. Miller, "Riemann's Hypothesis and Tests for Primality", 1976.
//! - Michael O. Rabin, "Probabilistic Algorithm for Testing Primality", 1980.
//! - Sorenson & Webster, "Strong pseudoprimes to twelve prime bases",
//!   Mathematics of Computation 86(304), 2017.

use std::sync::OnceLock;

use rand::rngs::OsRng;
use rand::RngCore;
use rug::integer::Order;
use rug::Integer;

use crate::modular::mod_pow;

/// Default Miller-Rabin round count for the probabilistic regime.
pub const DEFAULT_MR_ROUNDS: u32 = 32;

/// Trial division covers every prime up to this bound.
const SMALL_PRIME_LIMIT: u32 = 1000;

/// The wheel primorial 2*3*5*7.
const WHEEL_MODULUS: u32 = 210;

/// Count of residues in [1, 210) coprime to 210.
const WHEEL_SIZE: usize = 48;

/// Witnesses forming a complete Miller-Rabin test below the deterministic bound.
const DETERMINISTIC_WITNESSES: [u32; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Largest value for which the twelve-witness set is known exact.
fn deterministic_bound() -> &'static Integer {
    static BOUND: OnceLock<Integer> = OnceLock::new();
    BOUND.get_or_init(|| {
        Integer::from_str_radix("318665857834031151167461", 10)
            .expect("deterministic Miller-Rabin bound literal")
    })
}

fn gcd_u32(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Primes up to [`SMALL_PRIME_LIMIT`], sieved once per process.
fn small_primes() -> &'static [u32] {
    static TABLE: OnceLock<Vec<u32>> = OnceLock::new();
    TABLE
        .get_or_init(|| {
            let limit = SMALL_PRIME_LIMIT as usize;
            let mut composite = vec![false; limit + 1];
            let mut primes = Vec::new();
            for p in 2..=limit {
                if composite[p] {
                    continue;
                }
                primes.push(p as u32);
                let mut multiple = p * p;
                while multiple <= limit {
                    composite[multiple] = true;
                    multiple += p;
                }
            }
            primes
        })
        .as_slice()
}

struct Wheel {
    /// Sorted residues in [1, 210) coprime to 210.
    residues: [u32; WHEEL_SIZE],
    /// Circular gaps: residues[i+1] - residues[i], wrapping past 210.
    gaps: [u32; WHEEL_SIZE],
}

fn wheel() -> &'static Wheel {
    static WHEEL: OnceLock<Wheel> = OnceLock::new();
    WHEEL.get_or_init(|| {
        let mut residues = [0u32; WHEEL_SIZE];
        let mut count = 0;
        for r in 1..WHEEL_MODULUS {
            if gcd_u32(r, WHEEL_MODULUS) == 1 {
                residues[count] = r;
                count += 1;
            }
        }
        debug_assert_eq!(count, WHEEL_SIZE);

        let mut gaps = [0u32; WHEEL_SIZE];
        for i in 0..WHEEL_SIZE {
            let next = residues[(i + 1) % WHEEL_SIZE] + if i + 1 == WHEEL_SIZE { WHEEL_MODULUS } else { 0 };
            gaps[i] = next - residues[i];
        }
        Wheel { residues, gaps }
    })
}

/// Smallest q >= n whose residue mod 210 is coprime to 210, with the index of
/// that residue in the wheel.
pub fn align_to_wheel(n: &Integer) -> (Integer, usize) {
    let w = wheel();
    let rem = Integer::from(n % WHEEL_MODULUS).to_u32().unwrap_or(0);
    match w.residues.iter().position(|&r| r >= rem) {
        Some(idx) => (Integer::from(n - rem) + w.residues[idx], idx),
        None => (Integer::from(n - rem) + (WHEEL_MODULUS + w.residues[0]), 0),
    }
}

/// One Miller-Rabin round with witness `a`, given n-1 = 2^s * d.
///
/// Returns true when the witness is consistent with n prime.
pub fn miller_rabin_round(n: &Integer, d: &Integer, s: u32, a: &Integer) -> bool {
    let n_minus_1 = Integer::from(n - 1u32);
    let mut x = mod_pow(a, d, n);
    if x == 1u32 || x == n_minus_1 {
        return true;
    }
    for _ in 1..s {
        x.square_mut();
        x %= n;
        if x == n_minus_1 {
            return true;
        }
        if x == 1u32 {
            return false;
        }
    }
    false
}

/// Probable-primality test: trial division, then Miller-Rabin.
///
/// Exact below the twelve-witness bound; above it the error probability is at
/// most 4^-rounds per call, with witnesses drawn from the system RNG.
pub fn is_prime(n: &Integer, rounds: u32) -> bool {
    if *n < 2u32 {
        return false;
    }
    if *n == 2u32 || *n == 3u32 {
        return true;
    }
    if n.is_even() {
        return false;
    }
    for &p in small_primes() {
        if n.is_divisible_u(p) {
            return *n == p;
        }
    }

    let mut d = Integer::from(n - 1u32);
    let s = d.find_one(0).unwrap_or(0);
    d >>= s;

    if n < deterministic_bound() {
        let ceiling = Integer::from(n - 1u32);
        for &a in &DETERMINISTIC_WITNESSES {
            let witness = Integer::from(a);
            if witness >= ceiling {
                break;
            }
            if !miller_rabin_round(n, &d, s, &witness) {
                return false;
            }
        }
        return true;
    }

    let byte_len = ((n.significant_bits() + 7) / 8) as usize;
    let span = Integer::from(n - 3u32);
    let mut buf = vec![0u8; byte_len];
    for _ in 0..rounds {
        OsRng.fill_bytes(&mut buf);
        let mut witness = Integer::from_digits(&buf, Order::Msf);
        witness %= &span;
        witness += 2u32;
        if !miller_rabin_round(n, &d, s, &witness) {
            return false;
        }
    }
    true
}

/// Least probable prime >= n.
pub fn next_prime(n: &Integer, rounds: u32) -> Integer {
    if *n <= 2u32 {
        return Integer::from(2u32);
    }
    if *n <= 3u32 {
        return Integer::from(3u32);
    }
    if *n <= 5u32 {
        return Integer::from(5u32);
    }
    if *n <= 7u32 {
        return Integer::from(7u32);
    }

    let (mut candidate, mut idx) = align_to_wheel(n);
    // Alignment lands at 11 or above for any n > 7; guard the tiny range anyway.
    if candidate <= 7u32 {
        return next_prime(&candidate, rounds);
    }

    let w = wheel();
    loop {
        if is_prime(&candidate, rounds) {
            return candidate;
        }
        candidate += w.gaps[idx];
        idx = (idx + 1) % WHEEL_SIZE;
    }
}

/// Random probable prime of exactly `bits` bits.
///
/// Samples ceil(bits/8) bytes, forces the top bit of the first byte and the
/// low bit of the last, wheel-aligns, and walks forward; any candidate that
/// leaves [0, 2^bits - 1] restarts from a fresh sample. The byte-granular top
/// bit means `bits` must be a positive multiple of 8.
pub fn get_prime(bits: u32, rounds: u32) -> Integer {
    assert!(
        bits >= 8 && bits % 8 == 0,
        "prime width {} is not a positive multiple of 8",
        bits
    );

    let byte_len = ((bits + 7) / 8) as usize;
    let limit = Integer::from(Integer::u_pow_u(2, bits)) - 1u32;
    let w = wheel();
    let mut buf = vec![0u8; byte_len];

    'restart: loop {
        OsRng.fill_bytes(&mut buf);
        buf[0] |= 0x80;
        buf[byte_len - 1] |= 0x01;

        let seed = Integer::from_digits(&buf, Order::Msf);
        let (mut candidate, mut idx) = align_to_wheel(&seed);
        while candidate <= limit {
            if is_prime(&candidate, rounds) {
                return candidate;
            }
            candidate += w.gaps[idx];
            idx = (idx + 1) % WHEEL_SIZE;
        }
        continue 'restart;
    }
}
