// Copyright 2020-2026 MathxH Chen.
//
// Code is licensed under MIT Apache Dual License

use num_bigint::BigUint;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, PhaseError, Result};
use crate::params::DomainParameters;
use crate::provider::Provider;

/// A public value together with the group it lives in.
///
/// Carrying the parameters lets a participant reject a value that was
/// produced under a different modulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicValue {
    pub value: BigUint,
    pub params: Arc<DomainParameters>,
}

impl PublicValue {
    pub fn new(value: BigUint, params: Arc<DomainParameters>) -> Self {
        PublicValue { value, params }
    }

    fn same_group(&self, params: &Arc<DomainParameters>) -> bool {
        Arc::ptr_eq(&self.params, params) || *self.params == **params
    }
}

/// Secret key bytes one participant derived from its terminal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedSecret {
    pub owner: String,
    pub algorithm: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq)]
enum State {
    Initialized,
    Advancing { phase: usize },
    Finalized { shared: BigUint, phases: usize },
}

/// One party of a group key agreement.
///
/// A participant owns a private value that is generated once and never
/// changes. Every call to [`Participant::advance_phase`] folds one peer value
/// into it; the call flagged as final latches the terminal shared value from
/// which secrets are derived. A run with `n` parties needs exactly `n - 1`
/// phases, the last one flagged final.
pub struct Participant<P: Provider> {
    identity: String,
    algorithm: String,
    provider: Arc<P>,
    params: Arc<DomainParameters>,
    privatekey: BigUint,
    publickey: PublicValue,
    expected_phases: usize,
    state: State,
}

impl<P: Provider> Participant<P> {
    /// Generate a key pair under `params` for a run of `party_count` parties.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use mpdh_rs::{Participant, Provider};
    /// use mpdh_rs::providers::ModpProvider;
    ///
    /// let provider = ModpProvider::new();
    /// let params = Arc::new(provider.generate_parameters(64, 32).unwrap());
    /// let alice = Participant::initialize("Alice", "DH", provider, params, 2).unwrap();
    /// assert_eq!(alice.phase_index(), 0);
    /// ```
    pub fn initialize(
        identity: impl Into<String>,
        algorithm: &str,
        provider: Arc<P>,
        params: Arc<DomainParameters>,
        party_count: usize,
    ) -> Result<Self> {
        if party_count < 2 {
            return Err(Error::KeyInitialization(format!(
                "a group agreement needs at least 2 parties, got {}",
                party_count
            )));
        }
        let (privatekey, public) = provider.generate_key_pair(&params, algorithm)?;
        Ok(Participant {
            identity: identity.into(),
            algorithm: algorithm.to_string(),
            publickey: PublicValue::new(public, params.clone()),
            provider,
            params,
            privatekey,
            expected_phases: party_count - 1,
            state: State::Initialized,
        })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Protocol algorithm name as given at initialization.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn params(&self) -> &Arc<DomainParameters> {
        &self.params
    }

    /// The participant's own public value, the first thing it forwards.
    pub fn public_value(&self) -> &PublicValue {
        &self.publickey
    }

    /// Number of phases completed so far.
    pub fn phase_index(&self) -> usize {
        match &self.state {
            State::Initialized => 0,
            State::Advancing { phase } => *phase,
            State::Finalized { phases, .. } => *phases,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self.state, State::Finalized { .. })
    }

    /// Combine `peer` with the private value.
    ///
    /// Returns the public value to forward to the next round, or `None` when
    /// `is_final_phase` is set and the terminal value has been latched. The
    /// final flag must be set on the last expected phase and only there. A
    /// failed call leaves the participant untouched.
    pub fn advance_phase(
        &mut self,
        peer: &PublicValue,
        is_final_phase: bool,
    ) -> Result<Option<PublicValue>> {
        let phase = match &self.state {
            State::Finalized { .. } => {
                return Err(PhaseError::AlreadyFinalized {
                    identity: self.identity.clone(),
                }
                .into())
            }
            State::Initialized => 1,
            State::Advancing { phase } => phase + 1,
        };
        let last = phase == self.expected_phases;
        if is_final_phase && !last {
            return Err(PhaseError::PrematureFinal {
                identity: self.identity.clone(),
                phase,
                expected: self.expected_phases,
            }
            .into());
        }
        if last && !is_final_phase {
            return Err(PhaseError::MissingFinal {
                identity: self.identity.clone(),
                phase,
            }
            .into());
        }
        if !peer.same_group(&self.params) {
            return Err(PhaseError::GroupMismatch.into());
        }

        let combined = self.provider.combine(
            &self.params,
            &self.privatekey,
            &peer.value,
            is_final_phase,
        )?;
        if is_final_phase {
            debug!(identity = %self.identity, phase, "finalized");
            self.state = State::Finalized {
                shared: combined,
                phases: phase,
            };
            Ok(None)
        } else {
            self.state = State::Advancing { phase };
            Ok(Some(PublicValue::new(combined, self.params.clone())))
        }
    }

    /// Derive the secret key for `algorithm` from the latched terminal value.
    ///
    /// Does not touch participant state, so it may be called repeatedly with
    /// any algorithm name.
    pub fn derive_secret(&self, algorithm: &str) -> Result<DerivedSecret> {
        match &self.state {
            State::Finalized { shared, .. } => {
                let bytes = self.provider.derive(&self.params, shared, algorithm)?;
                Ok(DerivedSecret {
                    owner: self.identity.clone(),
                    algorithm: algorithm.to_string(),
                    bytes,
                })
            }
            _ => Err(Error::IllegalState(format!(
                "participant {} has not finalized, {} of {} phases done",
                self.identity,
                self.phase_index(),
                self.expected_phases
            ))),
        }
    }
}

impl<P: Provider> fmt::Debug for Participant<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Participant")
            .field("identity", &self.identity)
            .field("algorithm", &self.algorithm)
            .field("phase_index", &self.phase_index())
            .field("expected_phases", &self.expected_phases)
            .field("is_final", &self.is_final())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ModpProvider;

    struct Setup {
        provider: Arc<ModpProvider>,
        params: Arc<DomainParameters>,
    }

    impl Setup {
        fn new() -> Self {
            let provider = ModpProvider::new();
            let params = Arc::new(provider.generate_parameters(64, 32).unwrap());
            Setup { provider, params }
        }

        fn participant(&self, name: &str, party_count: usize) -> Participant<ModpProvider> {
            Participant::initialize(
                name,
                "DH",
                self.provider.clone(),
                self.params.clone(),
                party_count,
            )
            .unwrap()
        }
    }

    #[test]
    fn test_two_party_agreement() {
        let setup = Setup::new();
        let mut alice = setup.participant("Alice", 2);
        let mut bob = setup.participant("Bob", 2);
        let ya = alice.public_value().clone();
        let yb = bob.public_value().clone();

        assert_eq!(alice.advance_phase(&yb, true).unwrap(), None);
        assert_eq!(bob.advance_phase(&ya, true).unwrap(), None);
        assert!(alice.is_final() && bob.is_final());
        assert_eq!(alice.phase_index(), 1);

        let sa = alice.derive_secret("DES").unwrap();
        let sb = bob.derive_secret("DES").unwrap();
        assert_eq!(sa.bytes, sb.bytes);
        assert_eq!(sa.owner, "Alice");
        assert_eq!(sb.owner, "Bob");
    }

    #[test]
    fn test_derive_is_idempotent() {
        let setup = Setup::new();
        let mut alice = setup.participant("Alice", 2);
        let bob = setup.participant("Bob", 2);
        alice.advance_phase(bob.public_value(), true).unwrap();

        let first = alice.derive_secret("Blowfish").unwrap();
        let second = alice.derive_secret("Blowfish").unwrap();
        assert_eq!(first, second);
        assert_ne!(first.bytes, alice.derive_secret("AES").unwrap().bytes);
    }

    #[test]
    fn test_advance_after_final_fails() {
        let setup = Setup::new();
        let mut alice = setup.participant("Alice", 2);
        let bob = setup.participant("Bob", 2);
        alice.advance_phase(bob.public_value(), true).unwrap();
        let before = alice.derive_secret("DES").unwrap();

        for is_final in [true, false] {
            match alice.advance_phase(bob.public_value(), is_final) {
                Err(Error::Phase(PhaseError::AlreadyFinalized { identity })) => {
                    assert_eq!(identity, "Alice")
                }
                other => panic!("expected AlreadyFinalized, got {:?}", other),
            }
        }
        assert_eq!(alice.phase_index(), 1);
        assert_eq!(alice.derive_secret("DES").unwrap(), before);
    }

    #[test]
    fn test_derive_before_final_fails() {
        let setup = Setup::new();
        let mut alice = setup.participant("Alice", 3);
        let bob = setup.participant("Bob", 3);
        match alice.derive_secret("DES") {
            Err(Error::IllegalState(_)) => {}
            other => panic!("expected IllegalState, got {:?}", other),
        }
        alice.advance_phase(bob.public_value(), false).unwrap();
        assert!(matches!(alice.derive_secret("DES"), Err(Error::IllegalState(_))));
    }

    #[test]
    fn test_premature_final_is_rejected() {
        let setup = Setup::new();
        let mut alice = setup.participant("Alice", 3);
        let bob = setup.participant("Bob", 3);
        assert_eq!(
            alice.advance_phase(bob.public_value(), true),
            Err(Error::Phase(PhaseError::PrematureFinal {
                identity: "Alice".to_string(),
                phase: 1,
                expected: 2,
            }))
        );
        assert_eq!(alice.phase_index(), 0);
        assert!(!alice.is_final());
    }

    #[test]
    fn test_missing_final_is_rejected() {
        let setup = Setup::new();
        let mut alice = setup.participant("Alice", 2);
        let bob = setup.participant("Bob", 2);
        assert_eq!(
            alice.advance_phase(bob.public_value(), false),
            Err(Error::Phase(PhaseError::MissingFinal {
                identity: "Alice".to_string(),
                phase: 1,
            }))
        );
        assert_eq!(alice.phase_index(), 0);
    }

    #[test]
    fn test_foreign_group_peer_is_rejected() {
        let setup = Setup::new();
        let other = Setup::new();
        let mut alice = setup.participant("Alice", 2);
        let stranger = other.participant("Mallory", 2);
        if setup.params == other.params {
            return;
        }
        assert_eq!(
            alice.advance_phase(stranger.public_value(), true),
            Err(Error::Phase(PhaseError::GroupMismatch))
        );
    }

    #[test]
    fn test_out_of_range_peer_is_rejected() {
        let setup = Setup::new();
        let mut alice = setup.participant("Alice", 2);
        let bogus = PublicValue::new(BigUint::from(1_u32), setup.params.clone());
        assert_eq!(
            alice.advance_phase(&bogus, true),
            Err(Error::Phase(PhaseError::OutOfRange))
        );
        assert!(!alice.is_final());
    }

    #[test]
    fn test_unknown_algorithm_and_too_few_parties() {
        let setup = Setup::new();
        let unknown = Participant::initialize(
            "Alice",
            "X25519",
            setup.provider.clone(),
            setup.params.clone(),
            2,
        );
        assert!(matches!(unknown, Err(Error::KeyInitialization(_))));

        let alone = Participant::initialize(
            "Alice",
            "DH",
            setup.provider.clone(),
            setup.params.clone(),
            1,
        );
        assert!(matches!(alone, Err(Error::KeyInitialization(_))));
    }
}
