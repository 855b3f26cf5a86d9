// Copyright 2020-2026 MathxH Chen.
//
// Code is licensed under MIT Apache Dual License

//! Error taxonomy shared by every stage of a group agreement run.
//!
//! Errors inside one configuration abort that configuration only. The
//! matrix driver records them as failures and carries on with its siblings.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("parameter generation failed: {0}")]
    ParameterGeneration(String),

    #[error("key initialization failed: {0}")]
    KeyInitialization(String),

    #[error("phase error: {0}")]
    Phase(#[from] PhaseError),

    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("secret derivation failed: {0}")]
    Derivation(String),

    #[error("derived secrets of participants {index} and {} differ", .index + 1)]
    VerificationMismatch { index: usize },

    #[error("configuration did not finish within {0:?}")]
    Timeout(std::time::Duration),

    #[error("{failed} of {total} configurations failed")]
    MatrixFailed { failed: usize, total: usize },
}

/// Rejections raised while a participant advances through its phases.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhaseError {
    #[error("participant {identity} is already finalized")]
    AlreadyFinalized { identity: String },

    #[error(
        "participant {identity} asked to finalize at phase {phase}, expected phase {expected}"
    )]
    PrematureFinal {
        identity: String,
        phase: usize,
        expected: usize,
    },

    #[error("participant {identity} reached its last phase {phase} without finalizing")]
    MissingFinal { identity: String, phase: usize },

    #[error("peer public value belongs to a different group")]
    GroupMismatch,

    #[error("peer public value is outside [2, p-2]")]
    OutOfRange,

    #[error("round {round} forwards {found} values for {expected} participants")]
    RoundSize {
        round: usize,
        expected: usize,
        found: usize,
    },

    #[error("phase {phase} produced no public value to forward")]
    NothingToForward { phase: usize },
}
