//! SM2 public-key encryption.
//!
//! The ciphertext is the triple `(C1, C2, C3)`: the ephemeral point, the
//! KDF-masked message body, and the SM3 integrity tag. Three framings are
//! provided, each in the `C1C3C2` (default) and `C1C2C3` component orderings:
//!
//! - raw bytes with a SEC1-tagged `C1` ([`Cipher::to_vec`] /
//!   [`Cipher::from_slice`]);
//! - hex with a prefix-less 128-character `C1` ([`Cipher::to_hex`] /
//!   [`Cipher::from_hex`]), lowercase out, either case in;
//! - ASN.1 DER `SEQUENCE { INTEGER x1, INTEGER y1, OCTET STRING,
//!   OCTET STRING }` ([`Cipher::to_der`] / [`Cipher::from_der`]).
//!
//! ## Usage
//!
//! ```
//! use rand_core::OsRng;
//! use sm_crypto::{generate_keypair, pke::{DecryptingKey, EncryptingKey, Mode}};
//!
//! let (secret_key, public_key) = generate_keypair(&mut OsRng);
//!
//! let ciphertext = EncryptingKey::new(public_key)
//!     .encrypt_hex(&mut OsRng, b"plaintext", Mode::default())
//!     .unwrap();
//!
//! let plaintext = DecryptingKey::new(&secret_key)
//!     .decrypt_hex(&ciphertext, Mode::default())
//!     .unwrap();
//! assert_eq!(plaintext, b"plaintext");
//! ```

mod decrypting;
mod der;
mod encrypting;

pub use self::{decrypting::DecryptingKey, encrypting::EncryptingKey};

use crate::{codec, AffinePoint, EncodedPoint, Error, Hash, Result};
use alloc::{string::String, vec::Vec};
use elliptic_curve::{
    generic_array::GenericArray,
    sec1::{FromEncodedPoint, ToEncodedPoint},
};

/// Uncompressed SEC1 point length in bytes, tag included.
const C1_TAGGED_LEN: usize = 65;

/// Prefix-less `x1 || y1` length in bytes.
const C1_UNTAGGED_LEN: usize = 64;

/// Integrity tag length in bytes.
const C3_LEN: usize = 32;

/// Component orderings for the ciphertext framings.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// Legacy ordering of the 2012-era standard.
    C1C2C3,
    /// Current ordering.
    #[default]
    C1C3C2,
}

/// An SM2 ciphertext: ephemeral point `C1`, masked body `C2`, and integrity
/// tag `C3`.
///
/// The in-memory form is framing-agnostic; the component ordering only
/// applies when serializing or parsing.
#[derive(Clone, Debug)]
pub struct Cipher {
    c1: AffinePoint,
    c2: Vec<u8>,
    c3: Hash,
}

impl Cipher {
    pub(crate) fn new(c1: AffinePoint, c2: Vec<u8>, c3: Hash) -> Self {
        Self { c1, c2, c3 }
    }

    /// Get the ephemeral point `C1`.
    pub fn c1(&self) -> &AffinePoint {
        &self.c1
    }

    /// Get the masked message body `C2`.
    pub fn c2(&self) -> &[u8] {
        &self.c2
    }

    /// Get the integrity tag `C3`.
    pub fn c3(&self) -> &Hash {
        &self.c3
    }

    /// Serialize as bytes: SEC1-tagged `C1`, then `C2`/`C3` per `mode`.
    pub fn to_vec(&self, mode: Mode) -> Vec<u8> {
        let point = self.c1.to_encoded_point(false);
        let len = point.len() + self.c2.len() + self.c3.len();
        let mut result = Vec::with_capacity(len);
        match mode {
            Mode::C1C2C3 => {
                result.extend(point.as_bytes());
                result.extend(&self.c2);
                result.extend(&self.c3);
            }
            Mode::C1C3C2 => {
                result.extend(point.as_bytes());
                result.extend(&self.c3);
                result.extend(&self.c2);
            }
        }

        result
    }

    /// Decode from bytes with a SEC1-tagged uncompressed `C1`.
    ///
    /// The point is checked against the curve equation.
    pub fn from_slice(cipher: &[u8], mode: Mode) -> Result<Self> {
        if cipher.len() < C1_TAGGED_LEN + C3_LEN {
            return Err(Error);
        }
        let (c1_bytes, rest) = cipher.split_at(C1_TAGGED_LEN);
        let encoded = EncodedPoint::from_bytes(c1_bytes).map_err(|_| Error)?;
        let c1 = Option::from(AffinePoint::from_encoded_point(&encoded)).ok_or(Error)?;
        let (c2, c3) = split_body(rest, mode);
        Ok(Self::new(c1, c2.to_vec(), Hash::clone_from_slice(c3)))
    }

    /// Serialize as lowercase hex with a prefix-less 128-character `C1`.
    pub fn to_hex(&self, mode: Mode) -> String {
        let point = self.c1.to_encoded_point(false);
        let mut bytes = Vec::with_capacity(C1_UNTAGGED_LEN + self.c2.len() + self.c3.len());
        bytes.extend(&point.as_bytes()[1..]);
        match mode {
            Mode::C1C2C3 => {
                bytes.extend(&self.c2);
                bytes.extend(&self.c3);
            }
            Mode::C1C3C2 => {
                bytes.extend(&self.c3);
                bytes.extend(&self.c2);
            }
        }
        codec::bytes_to_hex(&bytes)
    }

    /// Decode from hex: the first 128 characters are `x1 || y1` (no SEC1
    /// tag), the remainder is split per `mode`.
    pub fn from_hex(hex: &str, mode: Mode) -> Result<Self> {
        let bytes = codec::hex_to_bytes(hex)?;
        if bytes.len() < C1_UNTAGGED_LEN + C3_LEN {
            return Err(Error);
        }
        let (c1_bytes, rest) = bytes.split_at(C1_UNTAGGED_LEN);
        let encoded = EncodedPoint::from_untagged_bytes(GenericArray::from_slice(c1_bytes));
        let c1 = Option::from(AffinePoint::from_encoded_point(&encoded)).ok_or(Error)?;
        let (c2, c3) = split_body(rest, mode);
        Ok(Self::new(c1, c2.to_vec(), Hash::clone_from_slice(c3)))
    }

    /// Serialize as ASN.1 DER with the octet strings ordered per `mode`.
    pub fn to_der(&self, mode: Mode) -> Result<Vec<u8>> {
        der::encode(self, mode)
    }

    /// Decode from ASN.1 DER (or BER with definite lengths) per `mode`.
    pub fn from_der(bytes: &[u8], mode: Mode) -> Result<Self> {
        der::decode(bytes, mode)
    }
}

/// Split the post-`C1` remainder into `(C2, C3)`; the caller has checked
/// `rest` holds at least the tag.
fn split_body(rest: &[u8], mode: Mode) -> (&[u8], &[u8]) {
    match mode {
        Mode::C1C3C2 => {
            let (c3, c2) = rest.split_at(C3_LEN);
            (c2, c3)
        }
        Mode::C1C2C3 => rest.split_at(rest.len() - C3_LEN),
    }
}
