// Copyright 2020-2026 MathxH Chen.
//
// Code is licensed under MIT Apache Dual License

//! Provider implementations for the agreement harness.
//!
//! - `modp`: classic Diffie-Hellman over a safe-prime MODP group

pub mod modp;

pub use modp::ModpProvider;
