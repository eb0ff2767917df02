//! # Transcript - Canonical Challenge Encoding
//!
//! The Fiat-Shamir challenge is the next prime after SHA-512 of a byte
//! payload built from the evaluation transcript. The payload layout is
//! consensus-critical: a prover and verifier that disagree on a single byte
//! derive different challenges and the proof fails.
//!
//! ```text
//! payload = TAG || X || H || T || N || NONCE
//! ```
//!
//! - TAG: the 13 ASCII bytes of "wesolowski-v1", no length prefix.
//! - X, H, N: big-endian, left-padded with zeros to the byte width of n.
//! - T: 8 bytes, big-endian, unsigned.
//! - NONCE: exactly 32 bytes.

use rug::integer::Order;
use rug::Integer;

use crate::VdfError;

/// Domain separation tag for challenge derivation.
pub const CHALLENGE_TAG: &[u8; 13] = b"wesolowski-v1";

/// Required nonce length in bytes.
pub const NONCE_LEN: usize = 32;

/// Minimal byte width of a value: ceil(bitlen / 8).
pub fn byte_width(value: &Integer) -> usize {
    ((value.significant_bits() + 7) / 8) as usize
}

/// Minimal big-endian encoding; zero encodes as a single zero byte.
pub fn to_bytes_be(value: &Integer) -> Vec<u8> {
    let digits = value.to_digits::<u8>(Order::Msf);
    if digits.is_empty() {
        vec![0]
    } else {
        digits
    }
}

/// Big-endian decoding, the inverse of [`to_bytes_be`].
pub fn from_bytes_be(bytes: &[u8]) -> Integer {
    Integer::from_digits(bytes, Order::Msf)
}

/// Big-endian encoding left-padded with zeros to exactly `width` bytes.
pub fn to_fixed_bytes_be(value: &Integer, width: usize) -> Result<Vec<u8>, VdfError> {
    let digits = value.to_digits::<u8>(Order::Msf);
    if digits.len() > width {
        return Err(VdfError::ValueTooWide { width });
    }
    let mut out = vec![0u8; width];
    out[width - digits.len()..].copy_from_slice(&digits);
    Ok(out)
}

/// Assemble the challenge payload for (x, h, t, n, nonce).
pub fn challenge_transcript(
    x: &Integer,
    h: &Integer,
    t: u64,
    n: &Integer,
    nonce: &[u8],
) -> Result<Vec<u8>, VdfError> {
    if nonce.len() != NONCE_LEN {
        return Err(VdfError::BadNonceLength {
            expected: NONCE_LEN,
            actual: nonce.len(),
        });
    }

    let width = byte_width(n);
    let mut payload = Vec::with_capacity(CHALLENGE_TAG.len() + 3 * width + 8 + NONCE_LEN);
    payload.extend_from_slice(CHALLENGE_TAG);
    payload.extend_from_slice(&to_fixed_bytes_be(x, width)?);
    payload.extend_from_slice(&to_fixed_bytes_be(h, width)?);
    payload.extend_from_slice(&t.to_be_bytes());
    payload.extend_from_slice(&to_fixed_bytes_be(n, width)?);
    payload.extend_from_slice(nonce);
    Ok(payload)
}
