//! # Montgomery - Reduction for a Fixed Odd Modulus
//!
//! Montgomery form represents a residue a as a_bar = a*R mod n, where
//! R = 2^r_bits is the smallest power of two above n. Products of two
//! Montgomery-form values are brought back into range with REDC, which costs
//! two multiplications and a shift instead of a division by n. The conversion
//! in and out of Montgomery form is paid once per exponentiation, so the
//! representation only wins when the same modulus is reused across a long
//! chain of multiplications; [`should_use_montgomery`] and
//! [`should_route_exponent`] encode that crossover.
//!
//! ## Algorithm: REDC
//!
//! With n_prime = -n^(-1) mod R precomputed by Hensel lifting:
//!
//! ```text
//! m = ((x mod R) * n_prime) mod R
//! t = (x + m*n) / R          (the division is exact)
//! reduce(x) = t - n if t >= n else t
//! ```
//!
//! The precondition 0 <= x < n*R holds for any product of two reduced values,
//! and the result is congruent to x * R^(-1) mod n.
//!
//! ## Reducer cache
//!
//! Construction walks the Hensel lift, so reducers for the handful of moduli a
//! process actually uses are memoized in a bounded process-wide map. Reducers
//! are immutable; a race on first insertion at worst constructs a duplicate,
//! and the first writer wins.
//!
//! ## References
//!
//! - Peter L. Montgomery, "Modular Multiplication Without Trial Division",
//!   Mathematics of Computation, 44(170):519-521, 1985.
//! - Brent & Zimmermann, "Modern Computer Arithmetic", v0.5.9, Algorithm 2.6.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use rug::Integer;

use crate::VdfError;

/// Modulus width below which Montgomery conversion overhead is not worth it.
pub const MONTGOMERY_MIN_MODULUS_BITS: u32 = 1024;

/// Squaring-chain length at which evaluation and proving switch to Montgomery.
pub const MONTGOMERY_MIN_ITERATIONS: u64 = 5000;

/// Exponent width at which modular exponentiation switches to Montgomery.
pub const MONTGOMERY_MIN_EXPONENT_BITS: u32 = 128;

/// Upper bound on memoized reducers; entries are inserted but never evicted.
const REDUCER_CACHE_CAP: usize = 10;

/// Whether a squaring chain of `iterations` steps modulo `modulus` should run
/// in Montgomery form.
pub fn should_use_montgomery(modulus: &Integer, iterations: u64) -> bool {
    modulus.is_odd()
        && modulus.significant_bits() >= MONTGOMERY_MIN_MODULUS_BITS
        && iterations >= MONTGOMERY_MIN_ITERATIONS
}

/// Whether an exponentiation with an `exponent_bits`-wide exponent modulo
/// `modulus` should run in Montgomery form.
pub fn should_route_exponent(modulus: &Integer, exponent_bits: u32) -> bool {
    modulus.is_odd()
        && modulus.significant_bits() >= MONTGOMERY_MIN_MODULUS_BITS
        && exponent_bits >= MONTGOMERY_MIN_EXPONENT_BITS
}

/// Montgomery reduction context for a fixed odd modulus n > 1.
///
/// All state is immutable after construction; contexts are shared freely
/// across threads through [`cached_reducer`].
#[derive(Debug)]
pub struct MontgomeryReducer {
    n: Integer,
    /// Smallest k with 2^k > n; R = 2^r_bits.
    r_bits: u32,
    /// -n^(-1) mod R, from Hensel lifting.
    n_prime: Integer,
}

impl MontgomeryReducer {
    /// Build a reducer for the odd modulus `n`, precomputing R and n_prime.
    pub fn new(n: &Integer) -> Result<Self, VdfError> {
        if n.is_even() || *n <= 1u32 {
            return Err(VdfError::InvalidModulus);
        }

        // For odd n the bit length is already the smallest k with 2^k > n.
        let r_bits = n.significant_bits();

        // Hensel lifting: each step doubles the precision of n^(-1) mod 2^k,
        // starting from the trivial inverse mod 2.
        let mut n_inv = Integer::from(1u32);
        let mut lifted_bits = 1u32;
        while lifted_bits < r_bits {
            let mut step = Integer::from(2u32);
            step -= Integer::from(n * &n_inv);
            n_inv *= step;
            n_inv.keep_bits_mut(r_bits);
            lifted_bits = lifted_bits.saturating_mul(2);
        }

        // n_prime = (R - n_inv) mod R = -n^(-1) mod R.
        let mut n_prime = Integer::from(Integer::u_pow_u(2, r_bits));
        n_prime -= &n_inv;
        n_prime.keep_bits_mut(r_bits);

        Ok(MontgomeryReducer {
            n: n.clone(),
            r_bits,
            n_prime,
        })
    }

    /// The modulus this reducer was built for.
    pub fn modulus(&self) -> &Integer {
        &self.n
    }

    /// Montgomery form of 1, i.e. R mod n.
    pub fn one(&self) -> Integer {
        let r = Integer::from(Integer::u_pow_u(2, self.r_bits));
        r % &self.n
    }

    /// Convert into Montgomery form: a_bar = a * R mod n.
    pub fn to_montgomery(&self, a: &Integer) -> Integer {
        Integer::from(a << self.r_bits) % &self.n
    }

    /// Convert out of Montgomery form.
    pub fn from_montgomery(&self, a: &Integer) -> Integer {
        self.reduce(a)
    }

    /// REDC: compute x * R^(-1) mod n for 0 <= x < n*R.
    pub fn reduce(&self, x: &Integer) -> Integer {
        let mut m = Integer::from(x.keep_bits_ref(self.r_bits));
        m *= &self.n_prime;
        m.keep_bits_mut(self.r_bits);
        m *= &self.n;
        m += x;
        m >>= self.r_bits;
        if m >= self.n {
            m -= &self.n;
        }
        m
    }

    /// Montgomery product: a_bar * b_bar * R^(-1) mod n.
    pub fn multiply(&self, a: &Integer, b: &Integer) -> Integer {
        self.reduce(&Integer::from(a * b))
    }

    /// Montgomery squaring.
    pub fn square(&self, a: &Integer) -> Integer {
        self.reduce(&Integer::from(a.square_ref()))
    }
}

static REDUCER_CACHE: OnceLock<Mutex<HashMap<Integer, Arc<MontgomeryReducer>>>> = OnceLock::new();

/// Fetch the memoized reducer for `n`, constructing it on first use.
///
/// At most [`REDUCER_CACHE_CAP`] moduli are retained; further reducers are
/// built per call and returned uncached.
pub fn cached_reducer(n: &Integer) -> Result<Arc<MontgomeryReducer>, VdfError> {
    let cache = REDUCER_CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    if let Ok(map) = cache.lock() {
        if let Some(reducer) = map.get(n) {
            return Ok(Arc::clone(reducer));
        }
    }

    let reducer = Arc::new(MontgomeryReducer::new(n)?);

    if let Ok(mut map) = cache.lock() {
        if map.contains_key(n) || map.len() < REDUCER_CACHE_CAP {
            return Ok(Arc::clone(
                map.entry(n.clone()).or_insert(reducer),
            ));
        }
    }

    Ok(reducer)
}
