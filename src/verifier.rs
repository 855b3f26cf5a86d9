// Copyright 2020-2026 MathxH Chen.
//
// Code is licensed under MIT Apache Dual License

use tracing::debug;

use crate::error::{Error, Result};
use crate::participant::{DerivedSecret, Participant};
use crate::provider::Provider;

/// Outcome of comparing the secrets of one finalized group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Pass,
    /// Secret `index` differs from secret `index + 1`.
    Mismatch { index: usize },
}

impl Verification {
    pub fn is_pass(&self) -> bool {
        *self == Verification::Pass
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            Verification::Pass => Ok(()),
            Verification::Mismatch { index } => Err(Error::VerificationMismatch { index }),
        }
    }
}

pub struct SecretVerifier {}

impl SecretVerifier {
    /// Derive `algorithm` secrets from every participant and compare neighbours
    /// byte for byte.
    ///
    /// Derivation errors are returned as is; unequal secrets are reported as
    /// [`Verification::Mismatch`] with the first offending index.
    pub fn verify<P: Provider>(
        participants: &[Participant<P>],
        algorithm: &str,
    ) -> Result<Verification> {
        let secrets = participants
            .iter()
            .map(|p| p.derive_secret(algorithm))
            .collect::<Result<Vec<DerivedSecret>>>()?;
        Ok(Self::compare(&secrets))
    }

    /// Adjacent-pair comparison of already derived secrets.
    pub fn compare(secrets: &[DerivedSecret]) -> Verification {
        match secrets
            .windows(2)
            .position(|pair| pair[0].bytes != pair[1].bytes)
        {
            Some(index) => {
                debug!(
                    left = %secrets[index].owner,
                    right = %secrets[index + 1].owner,
                    "derived secrets differ"
                );
                Verification::Mismatch { index }
            }
            None => Verification::Pass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(owner: &str, bytes: &[u8]) -> DerivedSecret {
        DerivedSecret {
            owner: owner.to_string(),
            algorithm: "DES".to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_equal_secrets_pass() {
        let secrets = [
            secret("Alice", &[1, 2, 3]),
            secret("Bob", &[1, 2, 3]),
            secret("Carol", &[1, 2, 3]),
        ];
        assert_eq!(SecretVerifier::compare(&secrets), Verification::Pass);
        assert!(SecretVerifier::compare(&secrets[..1]).is_pass());
    }

    #[test]
    fn test_first_mismatch_is_reported() {
        let secrets = [
            secret("Alice", &[1, 2, 3]),
            secret("Bob", &[1, 2, 3]),
            secret("Carol", &[1, 2, 4]),
            secret("David", &[9]),
        ];
        assert_eq!(
            SecretVerifier::compare(&secrets),
            Verification::Mismatch { index: 1 }
        );
        assert_eq!(
            SecretVerifier::compare(&secrets).into_result(),
            Err(Error::VerificationMismatch { index: 1 })
        );
    }

    #[test]
    fn test_length_and_prefix_are_not_tolerated() {
        let secrets = [secret("Alice", &[1, 2, 3]), secret("Bob", &[1, 2, 3, 0])];
        assert_eq!(
            SecretVerifier::compare(&secrets),
            Verification::Mismatch { index: 0 }
        );
    }
}
