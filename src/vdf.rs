//! # VDF - Evaluation, Proving, Verification
//!
//! The engine's whole lifecycle:
//!
//! 1. [`evaluate`] runs the delay itself, t sequential squarings mod n. Each
//!    squaring depends on the previous one, which is the security property;
//!    there is nothing to parallelize.
//! 2. [`derive_challenge`] hashes the transcript with SHA-512 and walks to
//!    the next prime, yielding the Fiat-Shamir challenge l.
//! 3. [`prove`] computes pi = x^floor(2^t / l) mod n by long division in the
//!    exponent: the quotient's bits are produced one per squaring, so 2^t is
//!    never materialized and the prover costs t squarings plus at most t
//!    multiplications.
//! 4. [`verify`] checks pi^l * x^(2^t mod l) = h (mod n) in O(log t + log l)
//!    multiplications.
//!
//! Long chains over large moduli route through Montgomery form; the plain and
//! Montgomery paths compute identical values.
//!
//! ## Prover invariant
//!
//! After iteration i, with r entering the loop as 2^(i-1) mod l:
//!
//! ```text
//! pi = x^floor(2^i / l) mod n     and     r = 2^i mod l
//! ```
//!
//! Doubling r either stays below l (quotient bit 0) or overflows once
//! (quotient bit 1, subtract l, multiply pi by x). Since 0 <= r < l implies
//! 2r < 2l, a single conditional subtraction is always enough.
//!
//! ## References
//!
//! - Benjamin Wesolowski, "Efficient verifiable delay functions",
//!   Journal of Cryptology 33(4), 2020.
//! - Boneh, Bunz, Fisch, "A Survey of Two Verifiable Delay Functions",
//!   ePrint 2018/712.

use std::time::Instant;

use rand::rngs::OsRng;
use rand::RngCore;
use rug::Integer;
use sha2::{Digest, Sha512};

use crate::modular::{mod_pow, mod_pow_product};
use crate::montgomery::{cached_reducer, should_use_montgomery, MontgomeryReducer};
use crate::primes::{is_prime, next_prime, DEFAULT_MR_ROUNDS};
use crate::transcript::{challenge_transcript, from_bytes_be, NONCE_LEN};
use crate::VdfError;

/// Public parameters: the RSA modulus and the delay in squarings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VdfParams {
    pub modulus: Integer,
    pub iterations: u64,
}

/// Result of an evaluation: h = x^(2^t) mod n together with its inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VdfOutput {
    pub input: Integer,
    pub output: Integer,
    pub iterations: u64,
    pub modulus: Integer,
}

/// A full Wesolowski proof: the evaluation plus (pi, l, nonce).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VdfProof {
    pub output: VdfOutput,
    pub pi: Integer,
    pub challenge: Integer,
    pub nonce: [u8; NONCE_LEN],
}

/// Run the delay: t sequential squarings of x modulo n.
///
/// Fails on x outside (0, n), x sharing a factor with n, or t = 0.
pub fn evaluate(input: &Integer, params: &VdfParams) -> Result<VdfOutput, VdfError> {
    let n = &params.modulus;
    let t = params.iterations;
    if t == 0 {
        return Err(VdfError::ZeroIterations);
    }
    if *input <= 0u32 || input >= n {
        return Err(VdfError::InputOutOfRange);
    }
    if Integer::from(input.gcd_ref(n)) != 1u32 {
        return Err(VdfError::NotCoprime);
    }

    let started = Instant::now();
    let output = if should_use_montgomery(n, t) {
        let reducer = cached_reducer(n)?;
        square_chain_montgomery(input, t, &reducer)
    } else {
        square_chain_plain(input, t, n)
    };
    tracing::debug!(
        modulus_bits = n.significant_bits(),
        iterations = t,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "sequential squaring complete"
    );

    Ok(VdfOutput {
        input: input.clone(),
        output,
        iterations: t,
        modulus: n.clone(),
    })
}

pub(crate) fn square_chain_plain(x: &Integer, t: u64, n: &Integer) -> Integer {
    let mut h = Integer::from(x % n);
    for _ in 0..t {
        h.square_mut();
        h %= n;
    }
    h
}

pub(crate) fn square_chain_montgomery(x: &Integer, t: u64, reducer: &MontgomeryReducer) -> Integer {
    let mut h = reducer.to_montgomery(x);
    for _ in 0..t {
        h = reducer.square(&h);
    }
    reducer.from_montgomery(&h)
}

/// Derive the prime challenge l from the transcript and a 32-byte nonce.
///
/// l = next_prime(SHA-512(tag || x || h || t || n || nonce)) interpreted
/// big-endian; the 512-bit digest keeps l far above 2.
pub fn derive_challenge(output: &VdfOutput, nonce: &[u8]) -> Result<Integer, VdfError> {
    let payload = challenge_transcript(
        &output.input,
        &output.output,
        output.iterations,
        &output.modulus,
        nonce,
    )?;
    let digest = Sha512::digest(&payload);
    let seed = from_bytes_be(digest.as_slice());
    Ok(next_prime(&seed, DEFAULT_MR_ROUNDS))
}

/// Compute pi = x^floor(2^t / l) mod n by long division in the exponent.
pub fn prove(output: &VdfOutput, challenge: &Integer) -> Result<Integer, VdfError> {
    let n = &output.modulus;
    let started = Instant::now();
    let pi = if should_use_montgomery(n, output.iterations) {
        let reducer = cached_reducer(n)?;
        prove_montgomery(&output.input, output.iterations, challenge, &reducer)
    } else {
        prove_plain(&output.input, output.iterations, challenge, n)
    };
    tracing::debug!(
        modulus_bits = n.significant_bits(),
        iterations = output.iterations,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "proof exponentiation complete"
    );
    Ok(pi)
}

pub(crate) fn prove_plain(x: &Integer, t: u64, l: &Integer, n: &Integer) -> Integer {
    let x = Integer::from(x % n);
    let mut remainder = Integer::from(1u32);
    let mut pi = Integer::from(1u32);
    for _ in 0..t {
        pi.square_mut();
        pi %= n;
        remainder <<= 1u32;
        if remainder >= *l {
            remainder -= l;
            pi *= &x;
            pi %= n;
        }
    }
    pi
}

pub(crate) fn prove_montgomery(
    x: &Integer,
    t: u64,
    l: &Integer,
    reducer: &MontgomeryReducer,
) -> Integer {
    let x_m = reducer.to_montgomery(x);
    let mut remainder = Integer::from(1u32);
    let mut pi = reducer.one();
    for _ in 0..t {
        pi = reducer.square(&pi);
        remainder <<= 1u32;
        if remainder >= *l {
            remainder -= l;
            pi = reducer.multiply(&pi, &x_m);
        }
    }
    reducer.from_montgomery(&pi)
}

/// Evaluate's companion: derive the challenge (drawing a fresh nonce when none
/// is supplied) and produce the full proof record.
pub fn generate_proof(output: &VdfOutput, nonce: Option<[u8; NONCE_LEN]>) -> Result<VdfProof, VdfError> {
    let nonce = match nonce {
        Some(bytes) => bytes,
        None => {
            let mut bytes = [0u8; NONCE_LEN];
            OsRng.fill_bytes(&mut bytes);
            bytes
        }
    };
    let challenge = derive_challenge(output, &nonce)?;
    let pi = prove(output, &challenge)?;
    Ok(VdfProof {
        output: output.clone(),
        pi,
        challenge,
        nonce,
    })
}

/// Check the proof equation pi^l * x^(2^t mod l) = h (mod n).
///
/// Every failure, malformed or forged alike, is a plain `false`.
pub fn verify(proof: &VdfProof) -> bool {
    let output = &proof.output;
    let n = &output.modulus;

    if proof.pi <= 0u32 || proof.pi >= *n {
        tracing::debug!("proof rejected: pi out of range");
        return false;
    }
    if output.input <= 0u32 || output.input >= *n {
        tracing::debug!("proof rejected: input out of range");
        return false;
    }
    if Integer::from(output.input.gcd_ref(n)) != 1u32 {
        tracing::debug!("proof rejected: input not coprime to modulus");
        return false;
    }
    if proof.challenge <= 2u32 {
        tracing::debug!("proof rejected: challenge too small");
        return false;
    }
    if !is_prime(&proof.challenge, DEFAULT_MR_ROUNDS) {
        tracing::debug!("proof rejected: challenge not prime");
        return false;
    }

    let remainder = mod_pow(
        &Integer::from(2u32),
        &Integer::from(output.iterations),
        &proof.challenge,
    );
    let lhs = mod_pow_product(&proof.pi, &proof.challenge, &output.input, &remainder, n);
    if lhs == output.output {
        true
    } else {
        tracing::debug!("proof rejected: equation mismatch");
        false
    }
}

/// Re-derive the challenge from the transcript before verifying.
///
/// Rejects any proof whose stated challenge does not match the one the
/// transcript produces, which binds the proof to (x, h, t, n, nonce).
pub fn verify_with_challenge(proof: &VdfProof) -> bool {
    match derive_challenge(&proof.output, &proof.nonce) {
        Ok(expected) if expected == proof.challenge => verify(proof),
        Ok(_) => {
            tracing::debug!("proof rejected: challenge does not match transcript");
            false
        }
        Err(err) => {
            tracing::debug!(error = %err, "proof rejected: transcript encoding failed");
            false
        }
    }
}
