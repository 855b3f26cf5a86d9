// Copyright 2020-2026 MathxH Chen.
//
// Code is licensed under MIT Apache Dual License

//! Checks that all parties of a group Diffie-Hellman agreement derive the same
//! secret key, across every combination of protocol name, party count and
//! secret key algorithm.
//!
//! Set `RUST_LOG=mpdh_rs=info` to see one line per configuration.

use clap::Parser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use mpdh_rs::matrix::{DEFAULT_EXPONENT_BITS, DEFAULT_MODULUS_BITS};
use mpdh_rs::providers::ModpProvider;
use mpdh_rs::{MatrixConfig, TestMatrix};

#[derive(Debug, Parser)]
#[command(name = "mpdh-stress", version, about)]
struct Cli {
    /// Protocol algorithm name, repeatable. Defaults to DH, DiffieHellman, dh, diffieHELLMAN.
    #[arg(long = "algorithm")]
    algorithms: Vec<String>,

    /// Number of parties, repeatable. Defaults to 2, 3 and 4.
    #[arg(long = "parties")]
    party_counts: Vec<usize>,

    /// Secret key algorithm, repeatable. Defaults to DES, DESede, blowfish.
    #[arg(long = "derivation")]
    derivations: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_MODULUS_BITS)]
    modulus_bits: usize,

    #[arg(long, default_value_t = DEFAULT_EXPONENT_BITS)]
    exponent_bits: usize,

    /// Run configurations one after another.
    #[arg(long)]
    sequential: bool,

    /// Fail any configuration that runs longer than this.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Cli {
    fn into_config(self) -> MatrixConfig {
        let defaults = MatrixConfig::default();
        MatrixConfig {
            protocol_algorithms: or_default(self.algorithms, defaults.protocol_algorithms),
            party_counts: or_default(self.party_counts, defaults.party_counts),
            derivation_algorithms: or_default(self.derivations, defaults.derivation_algorithms),
            modulus_bits: self.modulus_bits,
            exponent_bits: self.exponent_bits,
            parallel: !self.sequential,
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

fn or_default<T>(given: Vec<T>, default: Vec<T>) -> Vec<T> {
    if given.is_empty() {
        default
    } else {
        given
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .without_time()
        .compact()
        .init();

    let config = Cli::parse().into_config();
    let report = TestMatrix::new(ModpProvider::new(), config).run();
    println!("{}", report);
    report.into_result()?;
    Ok(())
}
