// Copyright 2020-2026 MathxH Chen.
//
// Code is licensed under MIT Apache Dual License

use num_bigint::BigUint;

/// Modulus, base and private exponent size shared by every participant of
/// one agreement run.
///
/// A single instance is generated per run and handed out behind an `Arc`,
/// nobody mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParameters {
    pub modulus: BigUint,
    pub base: BigUint,
    pub exponent_bits: usize,
}

impl DomainParameters {
    pub fn new(modulus: BigUint, base: BigUint, exponent_bits: usize) -> Self {
        DomainParameters {
            modulus,
            base,
            exponent_bits,
        }
    }

    /// 2048-bit MODP Group
    /// New Modular Exponential (MODP) Diffie-Hellman groups
    ///
    /// This group is assigned id 14 in RFC 3526.
    ///
    /// This prime is: 2^2048 - 2^1984 - 1 + 2^64 * { [2^1918 pi] + 124476 }
    ///
    /// The generator is: 2.
    pub fn rfc3526_2048(exponent_bits: usize) -> Self {
        let modulus = BigUint::parse_bytes(
            b"ffffffffffffffffc90fdaa22168c234c4c6628b80dc1cd129024e088a67cc74\
              020bbea63b139b22514a08798e3404ddef9519b3cd3a431b302b0a6df25f14374fe1\
              356d6d51c245e485b576625e7ec6f44c42e9a637ed6b0bff5cb6f406b7edee386bfb\
              5a899fa5ae9f24117c4b1fe649286651ece45b3dc2007cb8a163bf0598da48361c55d\
              39a69163fa8fd24cf5f83655d23dca3ad961c62f356208552bb9ed529077096966d67\
              0c354e4abc9804f1746c08ca18217c32905e462e36ce3be39e772c180e86039b2783a\
              2ec07a28fb5c55df06f4c52c9de2bcbf6955817183995497cea956ae515d2261898fa0\
              51015728e5a8aacaa68ffffffffffffffff",
            16,
        )
        .unwrap();
        DomainParameters {
            modulus,
            base: BigUint::from(2_u32),
            exponent_bits,
        }
    }

    /// Byte length of the modulus; shared values are left-padded to it.
    pub fn modulus_len(&self) -> usize {
        (self.modulus.bits() + 7) / 8
    }
}
