// Copyright 2020-2026 MathxH Chen.
//
// Code is licensed under MIT Apache Dual License

//! Ring-scheduled exchange of public values between `n` participants.
//!
//! In round `j` participant `k` folds in the value its ring successor
//! `(k + 1) mod n` produced in round `j - 1`. After `n - 1` rounds every
//! participant has folded in every other participant's private value exactly
//! once, so all of them end on `base^(x_0 * x_1 * ... * x_{n-1}) mod p`.

use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, PhaseError, Result};
use crate::params::DomainParameters;
use crate::participant::{Participant, PublicValue};
use crate::provider::Provider;

/// Identities handed to the first participants of a run.
pub const PARTY_NAMES: [&str; 4] = ["Alice", "Bob", "Carol", "David"];

/// Name of the participant at `position`.
pub fn party_name(position: usize) -> String {
    match PARTY_NAMES.get(position) {
        Some(name) => name.to_string(),
        None => format!("party-{}", position),
    }
}

/// Values in flight at the start of one round.
#[derive(Debug, Clone)]
pub struct ExchangeRound {
    pub number: usize,
    pub is_last: bool,
    /// `forwarded[k]` is the value participant `k` produced last round (its
    /// own public value before round 0).
    pub forwarded: Vec<PublicValue>,
}

impl ExchangeRound {
    /// Value routed to participant `k` this round.
    pub fn peer_value(&self, k: usize) -> &PublicValue {
        &self.forwarded[(k + 1) % self.forwarded.len()]
    }
}

/// Drives `n` participants through the `n - 1` rounds of a group agreement.
#[derive(Debug)]
pub struct GroupExchange<P: Provider> {
    params: Arc<DomainParameters>,
    participants: Vec<Participant<P>>,
    /// Pool the participants of a round run on; the global pool when unset.
    pool: Option<Arc<ThreadPool>>,
}

impl<P: Provider> GroupExchange<P> {
    /// Build `party_count` participants sharing `params`.
    pub fn new(
        provider: Arc<P>,
        params: Arc<DomainParameters>,
        algorithm: &str,
        party_count: usize,
    ) -> Result<Self> {
        if party_count < 2 {
            return Err(Error::KeyInitialization(format!(
                "a group agreement needs at least 2 parties, got {}",
                party_count
            )));
        }
        let participants = (0..party_count)
            .map(|position| {
                Participant::initialize(
                    party_name(position),
                    algorithm,
                    provider.clone(),
                    params.clone(),
                    party_count,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(GroupExchange {
            params,
            participants,
            pool: None,
        })
    }

    /// Run the rounds on `pool` instead of the global rayon pool.
    pub fn with_pool(mut self, pool: Arc<ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn params(&self) -> &Arc<DomainParameters> {
        &self.params
    }

    pub fn participants(&self) -> &[Participant<P>] {
        &self.participants
    }

    /// Run every round and return the finalized participants.
    pub fn run(self) -> Result<Vec<Participant<P>>> {
        self.run_with(|_| {})
    }

    /// Like [`GroupExchange::run`], but hands each round to `inspect` before
    /// any participant consumes it. The hook may rewrite forwarded values.
    ///
    /// Stops at the first error; remaining rounds are not attempted.
    pub fn run_with<F>(mut self, mut inspect: F) -> Result<Vec<Participant<P>>>
    where
        F: FnMut(&mut ExchangeRound),
    {
        let n = self.participants.len();
        let mut current: Vec<PublicValue> = self
            .participants
            .iter()
            .map(|p| p.public_value().clone())
            .collect();

        for number in 0..n - 1 {
            let mut round = ExchangeRound {
                number,
                is_last: number == n - 2,
                forwarded: current,
            };
            inspect(&mut round);
            if round.forwarded.len() != n {
                return Err(PhaseError::RoundSize {
                    round: number,
                    expected: n,
                    found: round.forwarded.len(),
                }
                .into());
            }
            debug!(round = number, parties = n, is_last = round.is_last, "exchange round");

            let participants = &mut self.participants;
            let results = match &self.pool {
                Some(pool) => pool.install(|| advance_round(participants, &round)),
                None => advance_round(participants, &round),
            }?;

            if round.is_last {
                break;
            }
            current = results
                .into_iter()
                .map(|value| value.ok_or(PhaseError::NothingToForward { phase: number + 1 }))
                .collect::<std::result::Result<Vec<_>, _>>()?;
        }
        Ok(self.participants)
    }
}

/// Advance every participant by one phase. Every participant reads only
/// `round`, so the calls are independent; the collect is the round barrier.
fn advance_round<P: Provider>(
    participants: &mut [Participant<P>],
    round: &ExchangeRound,
) -> Result<Vec<Option<PublicValue>>> {
    participants
        .par_iter_mut()
        .enumerate()
        .map(|(k, participant)| participant.advance_phase(round.peer_value(k), round.is_last))
        .collect()
}
