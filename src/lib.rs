//! # Wesolock - Core Library
//!
//! A Wesolowski verifiable delay function (VDF) over an RSA group. Given an
//! input x, an odd modulus n of unknown factorization, and a delay parameter
//! t, the evaluator computes h = x^(2^t) mod n by t sequential modular
//! squarings. The prover then convinces a verifier that h is correct with a
//! single group element pi = x^floor(2^t / l), where l is a prime challenge
//! derived from the transcript by Fiat-Shamir. Verification costs two modular
//! exponentiations with exponents no larger than l, i.e. O(log t) work.
//!
//! ## Module Organization
//!
//! **Engine modules**:
//! - [`vdf`] - evaluation, challenge derivation, proving, verification
//! - [`transcript`] - canonical byte encoding of the Fiat-Shamir transcript
//! - [`moduli`] - the three fixed RSA moduli (2048, 3072, 4096 bits)
//!
//! **Arithmetic modules**:
//! - [`montgomery`] - Montgomery reduction for a fixed odd modulus
//! - [`modular`] - windowed modular exponentiation, double exponentiation
//! - [`primes`] - Miller-Rabin testing and wheel-accelerated prime search
//!
//! ## Protocol
//!
//! 1. **Evaluate**: h = x^(2^t) mod n by t sequential squarings.
//! 2. **Challenge**: l = next_prime(SHA-512(tag || x || h || t || n || nonce)).
//! 3. **Prove**: pi = x^q mod n with q = floor(2^t / l), computed by long
//!    division in the exponent so that 2^t itself is never materialized.
//! 4. **Verify**: accept iff pi^l * x^(2^t mod l) = h (mod n).
//!
//! ## References
//!
//! - Benjamin Wesolowski, "Efficient verifiable delay functions",
//!   EUROCRYPT 2019 / Journal of Cryptology 33(4), 2020.
//! - Dan Boneh, Benedikt Bunz, Ben Fisch, "A Survey of Two Verifiable Delay
//!   Functions", ePrint 2018/712.
//! - Peter L. Montgomery, "Modular Multiplication Without Trial Division",
//!   Mathematics of Computation, 44(170):519-521, 1985.

pub mod modular;
pub mod moduli;
pub mod montgomery;
pub mod primes;
pub mod transcript;
pub mod vdf;

pub use transcript::{CHALLENGE_TAG, NONCE_LEN};
pub use vdf::{
    derive_challenge, evaluate, generate_proof, prove, verify, verify_with_challenge, VdfOutput,
    VdfParams, VdfProof,
};

use thiserror::Error;

/// Caller errors: malformed inputs that violate the engine's preconditions.
///
/// These surface as `Err` from the evaluation and proving entry points and are
/// never produced for a well-formed but forged proof; cryptographic rejection
/// is the `false` return of [`vdf::verify`] and [`vdf::verify_with_challenge`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VdfError {
    /// The modulus is even or not greater than 1.
    #[error("modulus must be an odd integer greater than 1")]
    InvalidModulus,

    /// The evaluation input does not satisfy 0 < x < n.
    #[error("input must satisfy 0 < x < n")]
    InputOutOfRange,

    /// The evaluation input shares a factor with the modulus.
    #[error("input must be coprime to the modulus")]
    NotCoprime,

    /// The iteration count is zero.
    #[error("iteration count must be positive")]
    ZeroIterations,

    /// A nonce of the wrong length was supplied for challenge derivation.
    #[error("nonce must be exactly {expected} bytes, got {actual}")]
    BadNonceLength { expected: usize, actual: usize },

    /// A transcript field does not fit in the modulus-derived byte width.
    #[error("value does not fit in {width} bytes")]
    ValueTooWide { width: usize },
}
