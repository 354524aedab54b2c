#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg"
)]
#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::checked_conversions,
    clippy::implicit_saturating_sub,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

extern crate alloc;

pub mod codec;
pub mod dsa;
pub mod kdf;
pub mod pke;

mod distid;
mod precompute;

pub use distid::{hash_msg, hash_z, DEFAULT_DIST_ID};
pub use precompute::PrecomputedPublicKey;

pub use elliptic_curve::{self, bigint::U256, Error};
pub use sm2::{
    AffinePoint, EncodedPoint, FieldBytes, NonZeroScalar, ProjectivePoint, PublicKey, Scalar,
    SecretKey, Sm2,
};

use rand_core::CryptoRngCore;

/// SM3 hash output.
pub type Hash = sm3::digest::Output<sm3::Sm3>;

/// Result type with the opaque [`Error`] used throughout this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Generate a fresh SM2 keypair.
///
/// The secret scalar is uniform over `[1, n-2]`: the signing equation divides
/// by `1 + d`, so `d = n - 1` is excluded here instead of surfacing as a
/// signing failure later.
pub fn generate_keypair(rng: &mut impl CryptoRngCore) -> (SecretKey, PublicKey) {
    loop {
        let secret_key = SecretKey::random(rng);
        let d = secret_key.to_nonzero_scalar();
        if bool::from((*d + Scalar::ONE).is_zero()) {
            continue;
        }
        let public_key = secret_key.public_key();
        return (secret_key, public_key);
    }
}
