// Copyright 2020-2026 MathxH Chen.
//
// Code is licensed under MIT Apache Dual License

//! Diffie-Hellman over a MODP group.
//!
//! Parameters are a freshly generated safe prime `p = 2q + 1` with generator
//! 2, or the RFC 3526 group 14 when 2048 bits are requested.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_primes::Generator;
use num_traits::identities::One;
use std::sync::Arc;

use crate::algorithm::{DerivationAlgorithm, ProtocolAlgorithm};
use crate::error::{Error, PhaseError, Result};
use crate::params::DomainParameters;
use crate::provider::{hash_multiple, to_padded_bytes, Provider};

/// Smallest modulus the provider will generate.
pub const MIN_MODULUS_BITS: usize = 32;

/// Smallest private exponent size; below it the private range is empty.
pub const MIN_EXPONENT_BITS: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct ModpProvider;

impl ModpProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(ModpProvider)
    }

    fn check_sizes(modulus_bits: usize, exponent_bits: usize) -> std::result::Result<(), String> {
        if exponent_bits < MIN_EXPONENT_BITS {
            return Err(format!(
                "exponent size {} is below {}",
                exponent_bits, MIN_EXPONENT_BITS
            ));
        }
        // Private values must stay below the subgroup order q.
        if exponent_bits + 1 >= modulus_bits {
            return Err(format!(
                "exponent size {} does not fit a {}-bit modulus",
                exponent_bits, modulus_bits
            ));
        }
        Ok(())
    }

    /// Set the low bit of every byte so that each byte has odd parity.
    fn adjust_parity(key: &mut [u8]) {
        for byte in key.iter_mut() {
            let high = *byte & 0xfe;
            *byte = if high.count_ones().is_even() { high | 1 } else { high };
        }
    }
}

impl Provider for ModpProvider {
    fn generate_parameters(
        &self,
        modulus_bits: usize,
        exponent_bits: usize,
    ) -> Result<DomainParameters> {
        if modulus_bits < MIN_MODULUS_BITS {
            return Err(Error::ParameterGeneration(format!(
                "modulus size {} is below {}",
                modulus_bits, MIN_MODULUS_BITS
            )));
        }
        Self::check_sizes(modulus_bits, exponent_bits).map_err(Error::ParameterGeneration)?;

        if modulus_bits == 2048 {
            return Ok(DomainParameters::rfc3526_2048(exponent_bits));
        }
        let modulus: BigUint = Generator::safe_prime(modulus_bits);
        Ok(DomainParameters::new(
            modulus,
            BigUint::from(2_u32),
            exponent_bits,
        ))
    }

    fn generate_key_pair(
        &self,
        params: &DomainParameters,
        algorithm: &str,
    ) -> Result<(BigUint, BigUint)> {
        if ProtocolAlgorithm::from_name(algorithm).is_none() {
            return Err(Error::KeyInitialization(format!(
                "unsupported key agreement algorithm {:?}",
                algorithm
            )));
        }
        Self::check_sizes(params.modulus.bits(), params.exponent_bits)
            .map_err(Error::KeyInitialization)?;

        let mut rng = rand::thread_rng();
        let lower = BigUint::from(2_u32);
        let upper = BigUint::one() << params.exponent_bits;
        let private = rng.gen_biguint_range(&lower, &upper);
        // publicKey = base^privKey mod p
        let public = params.base.modpow(&private, &params.modulus);
        Ok((private, public))
    }

    fn combine(
        &self,
        params: &DomainParameters,
        private: &BigUint,
        peer: &BigUint,
        _is_final_phase: bool,
    ) -> Result<BigUint> {
        let two = BigUint::from(2_u32);
        if *peer < two || *peer > &params.modulus - &two {
            return Err(PhaseError::OutOfRange.into());
        }
        Ok(peer.modpow(private, &params.modulus))
    }

    fn derive(
        &self,
        params: &DomainParameters,
        shared: &BigUint,
        algorithm: &str,
    ) -> Result<Vec<u8>> {
        let algorithm = DerivationAlgorithm::from_name(algorithm).ok_or_else(|| {
            Error::Derivation(format!("unsupported secret key algorithm {:?}", algorithm))
        })?;
        let secret = to_padded_bytes(shared, params.modulus_len());
        let key_len = match algorithm.key_len() {
            Some(len) => len,
            None => return Ok(secret),
        };

        // SHA-256 in counter mode, keyed by the canonical algorithm name so
        // that aliases yield identical keys.
        let name = algorithm.canonical_name().as_bytes();
        let mut key = Vec::with_capacity(key_len);
        let mut counter: u32 = 1;
        while key.len() < key_len {
            let counter_bytes = counter.to_be_bytes();
            let block = hash_multiple(&[&counter_bytes[..], name, &secret[..]]);
            key.extend_from_slice(&block);
            counter += 1;
        }
        key.truncate(key_len);
        if algorithm.needs_parity() {
            Self::adjust_parity(&mut key);
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_primes::Verification;

    #[test]
    fn test_generate_parameters() {
        let provider = ModpProvider::new();
        let params = provider.generate_parameters(64, 32).unwrap();
        assert!(Verification::is_safe_prime(&params.modulus));
        assert_eq!(params.base, BigUint::from(2_u32));
        assert_eq!(params.exponent_bits, 32);
    }

    #[test]
    fn test_generate_parameters_well_known_group() {
        let provider = ModpProvider::new();
        let params = provider.generate_parameters(2048, 256).unwrap();
        assert_eq!(params, DomainParameters::rfc3526_2048(256));
    }

    #[test]
    fn test_generate_parameters_rejects_bad_sizes() {
        let provider = ModpProvider::new();
        for (modulus_bits, exponent_bits) in [(64, 0), (64, 1), (64, 63), (64, 64), (16, 8)] {
            match provider.generate_parameters(modulus_bits, exponent_bits) {
                Err(Error::ParameterGeneration(_)) => {}
                other => panic!(
                    "({}, {}) should be rejected, got {:?}",
                    modulus_bits, exponent_bits, other
                ),
            }
        }
    }

    #[test]
    fn test_generate_key_pair() {
        let provider = ModpProvider::new();
        let params = provider.generate_parameters(64, 32).unwrap();
        let (private, public) = provider.generate_key_pair(&params, "DH").unwrap();
        assert!(private >= BigUint::from(2_u32));
        assert!(private.bits() <= 32);
        assert_eq!(public, params.base.modpow(&private, &params.modulus));
    }

    #[test]
    fn test_generate_key_pair_rejects_unknown_algorithm() {
        let provider = ModpProvider::new();
        let params = provider.generate_parameters(64, 32).unwrap();
        match provider.generate_key_pair(&params, "ECDH") {
            Err(Error::KeyInitialization(_)) => {}
            other => panic!("expected key initialization error, got {:?}", other),
        }
    }

    #[test]
    fn test_two_party_combine_agrees() {
        let provider = ModpProvider::new();
        let params = provider.generate_parameters(64, 32).unwrap();
        let (a, ya) = provider.generate_key_pair(&params, "DH").unwrap();
        let (b, yb) = provider.generate_key_pair(&params, "DiffieHellman").unwrap();
        let sa = provider.combine(&params, &a, &yb, true).unwrap();
        let sb = provider.combine(&params, &b, &ya, true).unwrap();
        assert_eq!(sa, sb);
    }

    #[test]
    fn test_combine_rejects_out_of_range_peer() {
        let provider = ModpProvider::new();
        let params = provider.generate_parameters(64, 32).unwrap();
        let (a, _) = provider.generate_key_pair(&params, "DH").unwrap();
        let p_minus_1 = &params.modulus - BigUint::one();
        for peer in [BigUint::one(), p_minus_1, params.modulus.clone()] {
            assert_eq!(
                provider.combine(&params, &a, &peer, false),
                Err(Error::Phase(PhaseError::OutOfRange))
            );
        }
    }

    #[test]
    fn test_derive_lengths_and_parity() {
        let provider = ModpProvider::new();
        let params = provider.generate_parameters(64, 32).unwrap();
        let shared = BigUint::from(123456789_u64);

        let des = provider.derive(&params, &shared, "DES").unwrap();
        assert_eq!(des.len(), 8);
        assert!(des.iter().all(|b| b.count_ones() % 2 == 1));

        let desede = provider.derive(&params, &shared, "DESede").unwrap();
        assert_eq!(desede.len(), 24);
        assert!(desede.iter().all(|b| b.count_ones() % 2 == 1));

        assert_eq!(provider.derive(&params, &shared, "blowfish").unwrap().len(), 16);
        assert_eq!(provider.derive(&params, &shared, "AES").unwrap().len(), 32);

        let raw = provider.derive(&params, &shared, "TlsPremasterSecret").unwrap();
        assert_eq!(raw.len(), params.modulus_len());
        assert_eq!(BigUint::from_bytes_be(&raw), shared);
    }

    #[test]
    fn test_derive_aliases_agree() {
        let provider = ModpProvider::new();
        let params = provider.generate_parameters(64, 32).unwrap();
        let shared = BigUint::from(987654321_u64);
        assert_eq!(
            provider.derive(&params, &shared, "DESede").unwrap(),
            provider.derive(&params, &shared, "tripledes").unwrap()
        );
        assert_ne!(
            provider.derive(&params, &shared, "Blowfish").unwrap(),
            provider.derive(&params, &shared, "AES").unwrap()[..16].to_vec()
        );
    }

    #[test]
    fn test_derive_rejects_unknown_algorithm() {
        let provider = ModpProvider::new();
        let params = provider.generate_parameters(64, 32).unwrap();
        match provider.derive(&params, &BigUint::from(5_u32), "RC2") {
            Err(Error::Derivation(_)) => {}
            other => panic!("expected derivation error, got {:?}", other),
        }
    }
}
