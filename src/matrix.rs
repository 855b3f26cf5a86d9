// Copyright 2020-2026 MathxH Chen.
//
// Code is licensed under MIT Apache Dual License

//! Stress matrix over protocol names, party counts and derivation algorithms.
//!
//! Every combination gets its own domain parameters and participants. A
//! failing combination is recorded and the remaining ones still run; the
//! matrix as a whole fails iff at least one combination failed.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::error::{Error, Result};
use crate::exchange::GroupExchange;
use crate::provider::Provider;
use crate::verifier::SecretVerifier;

/// Case and spelling variants of the Diffie-Hellman protocol name.
pub const DEFAULT_PROTOCOL_ALGORITHMS: [&str; 4] = ["DH", "DiffieHellman", "dh", "diffieHELLMAN"];
pub const DEFAULT_DERIVATION_ALGORITHMS: [&str; 3] = ["DES", "DESede", "blowfish"];
pub const DEFAULT_PARTY_COUNTS: [usize; 3] = [2, 3, 4];
pub const DEFAULT_MODULUS_BITS: usize = 512;
pub const DEFAULT_EXPONENT_BITS: usize = 64;

/// Tables the matrix is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixConfig {
    pub protocol_algorithms: Vec<String>,
    pub party_counts: Vec<usize>,
    pub derivation_algorithms: Vec<String>,
    pub modulus_bits: usize,
    pub exponent_bits: usize,
    /// Run configurations concurrently.
    pub parallel: bool,
    /// Per-configuration limit; expiry fails that configuration only.
    pub timeout: Option<Duration>,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        MatrixConfig {
            protocol_algorithms: DEFAULT_PROTOCOL_ALGORITHMS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            party_counts: DEFAULT_PARTY_COUNTS.to_vec(),
            derivation_algorithms: DEFAULT_DERIVATION_ALGORITHMS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            modulus_bits: DEFAULT_MODULUS_BITS,
            exponent_bits: DEFAULT_EXPONENT_BITS,
            parallel: true,
            timeout: None,
        }
    }
}

impl MatrixConfig {
    /// Cartesian product in algorithm, party count, derivation order.
    pub fn configurations(&self) -> Vec<Configuration> {
        let mut out = Vec::with_capacity(
            self.protocol_algorithms.len()
                * self.party_counts.len()
                * self.derivation_algorithms.len(),
        );
        for algorithm in &self.protocol_algorithms {
            for &party_count in &self.party_counts {
                for derivation in &self.derivation_algorithms {
                    out.push(Configuration {
                        protocol_algorithm: algorithm.clone(),
                        party_count,
                        derivation_algorithm: derivation.clone(),
                    });
                }
            }
        }
        out
    }
}

/// One cell of the matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Configuration {
    pub protocol_algorithm: String,
    pub party_count: usize,
    pub derivation_algorithm: String,
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Algorithm = {} Number of Parties = {} Secret Algorithm = {}",
            self.protocol_algorithm, self.party_count, self.derivation_algorithm
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedConfiguration {
    pub configuration: Configuration,
    pub reason: Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixReport {
    pub total: usize,
    pub failures: Vec<FailedConfiguration>,
}

impl MatrixReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(Error::MatrixFailed {
                failed: self.failures.len(),
                total: self.total,
            })
        }
    }
}

impl fmt::Display for MatrixReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            return write!(f, "All {} configurations passed", self.total);
        }
        write!(f, "Failed List:")?;
        for failure in &self.failures {
            write!(f, "\n {} ({})", failure.configuration, failure.reason)?;
        }
        write!(f, "\n{} of {} configurations failed", self.failures.len(), self.total)
    }
}

/// Run one configuration end to end: parameters, exchange, verification.
///
/// The exchange rounds run on `pool` when given, on the global rayon pool
/// otherwise.
#[instrument(
    skip(provider, configuration, pool),
    fields(
        algorithm = %configuration.protocol_algorithm,
        parties = configuration.party_count,
        derivation = %configuration.derivation_algorithm
    )
)]
pub fn run_configuration<P: Provider>(
    provider: &Arc<P>,
    modulus_bits: usize,
    exponent_bits: usize,
    configuration: &Configuration,
    pool: Option<&Arc<ThreadPool>>,
) -> Result<()> {
    let params = Arc::new(provider.generate_parameters(modulus_bits, exponent_bits)?);
    let mut exchange = GroupExchange::new(
        provider.clone(),
        params,
        &configuration.protocol_algorithm,
        configuration.party_count,
    )?;
    if let Some(pool) = pool {
        exchange = exchange.with_pool(pool.clone());
    }
    let finalized = exchange.run()?;
    SecretVerifier::verify(&finalized, &configuration.derivation_algorithm)?.into_result()
}

pub struct TestMatrix<P: Provider> {
    provider: Arc<P>,
    config: MatrixConfig,
    /// Pool for the exchange rounds of timed configurations.
    round_pool: Option<Arc<ThreadPool>>,
}

impl<P: Provider + 'static> TestMatrix<P> {
    pub fn new(provider: Arc<P>, config: MatrixConfig) -> Self {
        TestMatrix {
            provider,
            config,
            round_pool: None,
        }
    }

    /// Use `pool` for the exchange rounds of timed configurations instead of
    /// building one per run.
    pub fn with_round_pool(mut self, pool: Arc<ThreadPool>) -> Self {
        self.round_pool = Some(pool);
        self
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    /// Run every configuration and collect the failures.
    pub fn run(&self) -> MatrixReport {
        let configurations = self.config.configurations();
        let mut parallel = self.config.parallel;

        // A timed configuration blocks its caller while a worker thread does
        // the work. Callers may be threads of the pool running the matrix, so
        // the worker's rounds must not be scheduled on that same pool.
        let round_pool = match (self.config.timeout, &self.round_pool) {
            (None, _) => None,
            (Some(_), Some(pool)) => Some(pool.clone()),
            (Some(_), None) => match ThreadPoolBuilder::new()
                .num_threads(rayon::current_num_threads())
                .thread_name(|i| format!("mpdh-round-{}", i))
                .build()
            {
                Ok(pool) => Some(Arc::new(pool)),
                Err(err) => {
                    warn!(%err, "no round pool, running configurations sequentially");
                    parallel = false;
                    None
                }
            },
        };
        let round_pool = round_pool.as_ref();

        let outcomes: Vec<(Configuration, Result<()>)> = if parallel {
            configurations
                .into_par_iter()
                .map(|c| {
                    let outcome = self.run_bounded(&c, round_pool);
                    (c, outcome)
                })
                .collect()
        } else {
            configurations
                .into_iter()
                .map(|c| {
                    let outcome = self.run_bounded(&c, round_pool);
                    (c, outcome)
                })
                .collect()
        };

        let total = outcomes.len();
        let failures: Vec<FailedConfiguration> = outcomes
            .into_iter()
            .filter_map(|(configuration, outcome)| match outcome {
                Ok(()) => {
                    info!(%configuration, "passed");
                    None
                }
                Err(reason) => {
                    warn!(%configuration, %reason, "failed");
                    Some(FailedConfiguration {
                        configuration,
                        reason,
                    })
                }
            })
            .collect();
        info!(total, failed = failures.len(), "matrix finished");
        MatrixReport { total, failures }
    }

    fn run_bounded(
        &self,
        configuration: &Configuration,
        round_pool: Option<&Arc<ThreadPool>>,
    ) -> Result<()> {
        let (modulus_bits, exponent_bits) = (self.config.modulus_bits, self.config.exponent_bits);
        let limit = match self.config.timeout {
            Some(limit) => limit,
            None => {
                return run_configuration(
                    &self.provider,
                    modulus_bits,
                    exponent_bits,
                    configuration,
                    None,
                )
            }
        };

        // The worker is left to finish on its own if the limit expires.
        let (tx, rx) = mpsc::channel();
        let provider = self.provider.clone();
        let job = configuration.clone();
        let pool = round_pool.cloned();
        thread::spawn(move || {
            let outcome =
                run_configuration(&provider, modulus_bits, exponent_bits, &job, pool.as_ref());
            let _ = tx.send(outcome);
        });
        match rx.recv_timeout(limit) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => Err(Error::Timeout(limit)),
            Err(RecvTimeoutError::Disconnected) => Err(Error::IllegalState(
                "configuration worker exited without a result".to_string(),
            )),
        }
    }
}
