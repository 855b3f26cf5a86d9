// Copyright 2020-2026 MathxH Chen.
//
// Code is licensed under MIT Apache Dual License

//! Key agreement provider abstraction.
//!
//! The agreement harness never computes a Diffie-Hellman value itself. It
//! reaches every primitive through this trait:
//! - **parameter generation**: `(modulus_bits, exponent_bits)` to `DomainParameters`
//! - **key pair generation**: private value plus `base^x mod p`
//! - **combine**: folds one peer public value into the participant's private value
//! - **derivation**: turns the latched shared value into secret key bytes
//!
//! Implementations must be stateless with respect to a run, so one provider
//! can serve many concurrent configurations.

use num_bigint::BigUint;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::params::DomainParameters;

pub trait Provider: Send + Sync {
    /// Generate fresh domain parameters.
    ///
    /// Fails with `Error::ParameterGeneration` on unsupported sizes.
    fn generate_parameters(
        &self,
        modulus_bits: usize,
        exponent_bits: usize,
    ) -> Result<DomainParameters>;

    /// Generate a `(private, public)` pair for the named protocol.
    ///
    /// Fails with `Error::KeyInitialization` when the algorithm name or the
    /// parameters are rejected.
    fn generate_key_pair(
        &self,
        params: &DomainParameters,
        algorithm: &str,
    ) -> Result<(BigUint, BigUint)>;

    /// Combine `peer` with `private`.
    ///
    /// The result is forwarded to the next round unless `is_final_phase` is
    /// set, in which case it is the terminal shared value. Fails with
    /// `Error::Phase` on malformed peers.
    fn combine(
        &self,
        params: &DomainParameters,
        private: &BigUint,
        peer: &BigUint,
        is_final_phase: bool,
    ) -> Result<BigUint>;

    /// Derive secret key bytes for `algorithm` from the terminal shared value.
    ///
    /// Must be deterministic: the same inputs always give the same bytes.
    fn derive(
        &self,
        params: &DomainParameters,
        shared: &BigUint,
        algorithm: &str,
    ) -> Result<Vec<u8>>;
}

/// Helper function to compute SHA-256 hash of multiple byte sequences
pub fn hash_multiple(inputs: &[&[u8]]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize().to_vec()
}

/// Big-endian encoding of `value`, left-padded with zeros to `len` bytes.
pub fn to_padded_bytes(value: &BigUint, len: usize) -> Vec<u8> {
    let raw = value.to_bytes_be();
    if raw.len() >= len {
        return raw;
    }
    let mut out = vec![0_u8; len - raw.len()];
    out.extend_from_slice(&raw);
    out
}
