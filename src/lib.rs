//! M-Pin: pairing-based two-factor identity authentication.
//!
//! The implementation is built using Arkworks over the BN254 pairing-friendly
//! curve. A trusted authority splits a master secret into a server key in G2
//! and a per-identity client secret in G1; the client further splits its
//! secret into a short PIN and a stored token. Authentication is a two-round
//! exchange verified through a pairing product, with optional per-epoch time
//! permits, PIN-error extraction via Pollard's lambda, and authenticated
//! session-key derivation ("M-Pin Full").

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

pub mod client;
pub mod codec;
pub mod elligator;
pub mod kangaroo;
pub mod server;
pub mod session;
pub mod token;
pub mod utils;

pub use ark_bn254::{Fq, Fq12, Fq2, Fr, G1Affine, G1Projective, G2Affine, G2Projective};

pub use client::{Authentication, ClientSession};
pub use server::{Evidence, IdPoints};
pub use session::Precomputed;
pub use token::{ClientSecret, MasterSecret, ServerSecret, TimePermit, Token};

/// Byte width of a serialized base field element.
pub const FIELD_BYTES: usize = 32;

/// Byte width of a serialized scalar.
pub const SCALAR_BYTES: usize = 32;

/// Byte width of an uncompressed G1 point (`0x04 | x | y`).
pub const G1_BYTES: usize = 2 * FIELD_BYTES + 1;

/// Byte width of a G2 point (`xa | xb | ya | yb`).
pub const G2_BYTES: usize = 4 * FIELD_BYTES;

/// Byte width of a target group element (twelve field coordinates).
pub const GT_BYTES: usize = 12 * FIELD_BYTES;

/// Session key length.
pub const KEY_BYTES: usize = 16;

/// PINs are used modulo this bound (four decimal digits).
pub const MAX_PIN: u32 = 10_000;

/// Bit length of the fixed PIN multiplication ladder.
pub(crate) const PIN_BITS: u32 = 14;

/// Protocol error(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required input is missing or inconsistent with the requested mode.
    BadParams,
    /// Octets do not decode to a valid, non-infinity curve point.
    InvalidPoint,
    /// A G2 point decoded on-curve but outside the order-r subgroup.
    WrongOrder,
    /// The pairing verification equation did not hold. When requested, the
    /// pairing values for the PIN-error solver are attached.
    BadPin(Option<Evidence>),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::BadParams => write!(f, "missing or inconsistent parameters"),
            Error::InvalidPoint => write!(f, "octets do not decode to a valid curve point"),
            Error::WrongOrder => write!(f, "point outside the prime order subgroup"),
            Error::BadPin(_) => write!(f, "pairing verification failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type.
pub type Result<T> = core::result::Result<T, Error>;
