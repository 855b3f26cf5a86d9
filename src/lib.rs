// Copyright 2020-2026 MathxH Chen.
//
// Code is licensed under MIT Apache Dual License

pub mod algorithm;
pub mod error;
pub mod exchange;
pub mod matrix;
pub mod params;
pub mod participant;
pub mod provider;
pub mod providers;
pub mod verifier;

pub use error::{Error, PhaseError, Result};
pub use exchange::{ExchangeRound, GroupExchange};
pub use matrix::{MatrixConfig, MatrixReport, TestMatrix};
pub use params::DomainParameters;
pub use participant::{DerivedSecret, Participant, PublicValue};
pub use provider::Provider;
pub use verifier::{SecretVerifier, Verification};
