// Copyright 2020-2026 MathxH Chen.
//
// Code is licensed under MIT Apache Dual License

//! Algorithm names accepted by the MODP provider.
//!
//! Callers speak in names (`"DH"`, `"diffieHELLMAN"`, `"DESede"`, ...). Every
//! spelling is normalised here so that aliases behave exactly like the
//! canonical name.

use std::fmt;

/// Key agreement protocol selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolAlgorithm {
    DiffieHellman,
}

impl ProtocolAlgorithm {
    /// Resolve a protocol name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("DH") || name.eq_ignore_ascii_case("DiffieHellman") {
            Some(ProtocolAlgorithm::DiffieHellman)
        } else {
            None
        }
    }

    pub fn canonical_name(&self) -> &'static str {
        match self {
            ProtocolAlgorithm::DiffieHellman => "DiffieHellman",
        }
    }
}

impl fmt::Display for ProtocolAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Secret key algorithm the raw shared value is turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivationAlgorithm {
    Des,
    DesEde,
    Blowfish,
    Aes,
    /// The padded shared value itself, no key schedule applied.
    TlsPremasterSecret,
}

impl DerivationAlgorithm {
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "des" => Some(DerivationAlgorithm::Des),
            "desede" | "tripledes" => Some(DerivationAlgorithm::DesEde),
            "blowfish" => Some(DerivationAlgorithm::Blowfish),
            "aes" => Some(DerivationAlgorithm::Aes),
            "tlspremastersecret" => Some(DerivationAlgorithm::TlsPremasterSecret),
            _ => None,
        }
    }

    pub fn canonical_name(&self) -> &'static str {
        match self {
            DerivationAlgorithm::Des => "DES",
            DerivationAlgorithm::DesEde => "DESede",
            DerivationAlgorithm::Blowfish => "Blowfish",
            DerivationAlgorithm::Aes => "AES",
            DerivationAlgorithm::TlsPremasterSecret => "TlsPremasterSecret",
        }
    }

    /// Key length in bytes, `None` when the whole shared value is used.
    pub fn key_len(&self) -> Option<usize> {
        match self {
            DerivationAlgorithm::Des => Some(8),
            DerivationAlgorithm::DesEde => Some(24),
            DerivationAlgorithm::Blowfish => Some(16),
            DerivationAlgorithm::Aes => Some(32),
            DerivationAlgorithm::TlsPremasterSecret => None,
        }
    }

    /// DES family keys carry an odd parity bit in every byte.
    pub fn needs_parity(&self) -> bool {
        matches!(self, DerivationAlgorithm::Des | DerivationAlgorithm::DesEde)
    }
}

impl fmt::Display for DerivationAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}
