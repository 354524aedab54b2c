//! SM2 Digital Signature Algorithm (SM2DSA).
//!
//! ## Usage
//!
//! ```
//! use rand_core::OsRng;
//! use sm_crypto::{
//!     dsa::{signature::{RandomizedSigner, Verifier}, Signature, SigningKey, VerifyingKey},
//!     SecretKey, DEFAULT_DIST_ID,
//! };
//!
//! // Signing
//! let secret_key = SecretKey::random(&mut OsRng); // serialize with `::to_bytes()`
//! let signing_key = SigningKey::new(DEFAULT_DIST_ID, &secret_key).unwrap();
//! let message = b"test message";
//! let signature: Signature = signing_key.try_sign_with_rng(&mut OsRng, message).unwrap();
//!
//! // Verifying
//! let verifying_key = VerifyingKey::from_hex(
//!     DEFAULT_DIST_ID,
//!     &signing_key.verifying_key().to_hex(),
//! ).unwrap();
//! verifying_key.verify(message, &signature).unwrap();
//!
//! // Interop framings
//! let raw = signature.to_hex();
//! assert_eq!(Signature::from_hex(&raw).unwrap(), signature);
//! let der = signature.to_der().unwrap();
//! assert_eq!(Signature::from_der(&der).unwrap(), signature);
//! ```

mod der;
mod signing;
mod verifying;

pub use signature;

pub use self::{
    signing::{EphemeralPoint, SigningKey},
    verifying::VerifyingKey,
};

use crate::{codec, FieldBytes, NonZeroScalar, Scalar, Sm2, U256};
use alloc::{string::String, vec::Vec};
use core::fmt::{self, Debug};
use elliptic_curve::{generic_array::typenum::Unsigned, ops::Reduce, Curve};
use signature::{Error, Result, SignatureEncoding};

/// Interpret a caller-supplied 32-byte digest as a scalar mod `n`.
pub(crate) fn scalar_from_prehash(prehash: &[u8]) -> Result<Scalar> {
    if prehash.len() != <Sm2 as Curve>::FieldBytesSize::USIZE {
        return Err(Error::new());
    }
    Ok(<Scalar as Reduce<U256>>::reduce_bytes(
        FieldBytes::from_slice(prehash),
    ))
}

/// SM2DSA signature serialized as bytes.
pub type SignatureBytes = [u8; Signature::BYTE_SIZE];

/// SM2DSA signature.
#[derive(Copy, Clone)]
pub struct Signature {
    r: NonZeroScalar,
    s: NonZeroScalar,
}

impl Signature {
    /// Size of an encoded SM2DSA signature in bytes.
    pub const BYTE_SIZE: usize = 64;

    /// Parse an SM2DSA signature from a byte array.
    ///
    /// Both components must lie in `[1, n-1]`.
    pub fn from_bytes(bytes: &SignatureBytes) -> Result<Self> {
        let (r_bytes, s_bytes) = bytes.split_at(Self::BYTE_SIZE / 2);
        let r = NonZeroScalar::try_from(r_bytes).map_err(|_| Error::new())?;
        let s = NonZeroScalar::try_from(s_bytes).map_err(|_| Error::new())?;
        Ok(Self { r, s })
    }

    /// Parse an SM2DSA signature from a byte slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        SignatureBytes::try_from(bytes)
            .map_err(|_| Error::new())?
            .try_into()
    }

    /// Create a [`Signature`] from the `r` and `s` scalar values which
    /// comprise the signature, rejecting zero components.
    pub fn from_scalars(r: Scalar, s: Scalar) -> Result<Self> {
        let r = Option::from(NonZeroScalar::new(r)).ok_or_else(Error::new)?;
        let s = Option::from(NonZeroScalar::new(s)).ok_or_else(Error::new)?;
        Ok(Self { r, s })
    }

    /// Parse an SM2DSA signature from its 128-character `r || s` hex form.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = codec::hex_to_bytes(hex).map_err(|_| Error::new())?;
        Self::from_slice(&bytes)
    }

    /// Parse an SM2DSA signature from ASN.1 DER
    /// (`SEQUENCE { INTEGER r, INTEGER s }`).
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let (r, s) = der::decode(bytes)?;
        let r = NonZeroScalar::try_from(r.as_slice()).map_err(|_| Error::new())?;
        let s = NonZeroScalar::try_from(s.as_slice()).map_err(|_| Error::new())?;
        Ok(Self { r, s })
    }

    /// Serialize this signature as bytes.
    pub fn to_bytes(&self) -> SignatureBytes {
        let mut ret = [0; Self::BYTE_SIZE];
        let (r_bytes, s_bytes) = ret.split_at_mut(Self::BYTE_SIZE / 2);
        r_bytes.copy_from_slice(&self.r_bytes());
        s_bytes.copy_from_slice(&self.s_bytes());
        ret
    }

    /// Serialize this signature as 128 lowercase hex characters, each
    /// component zero-padded to 32 bytes.
    pub fn to_hex(&self) -> String {
        codec::bytes_to_hex(&self.to_bytes())
    }

    /// Serialize this signature as ASN.1 DER with minimally encoded integers.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        der::encode(&self.r_bytes(), &self.s_bytes())
    }

    /// Convert this signature into a byte vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    /// Bytes for the `r` component of a signature.
    pub fn r_bytes(&self) -> FieldBytes {
        self.r.to_bytes()
    }

    /// Bytes for the `s` component of a signature.
    pub fn s_bytes(&self) -> FieldBytes {
        self.s.to_bytes()
    }

    /// Get the `r` component of this signature.
    pub fn r(&self) -> NonZeroScalar {
        self.r
    }

    /// Get the `s` component of this signature.
    pub fn s(&self) -> NonZeroScalar {
        self.s
    }

    /// Split the signature into its `r` and `s` scalars.
    pub fn split_scalars(&self) -> (NonZeroScalar, NonZeroScalar) {
        (self.r, self.s)
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sm_crypto::dsa::Signature(")?;

        for byte in self.to_bytes() {
            write!(f, "{:02X}", byte)?;
        }

        write!(f, ")")
    }
}

impl Eq for Signature {}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl From<Signature> for SignatureBytes {
    fn from(signature: Signature) -> SignatureBytes {
        signature.to_bytes()
    }
}

impl From<&Signature> for SignatureBytes {
    fn from(signature: &Signature) -> SignatureBytes {
        signature.to_bytes()
    }
}

impl SignatureEncoding for Signature {
    type Repr = SignatureBytes;

    fn to_bytes(&self) -> Self::Repr {
        self.into()
    }

    fn encoded_len(&self) -> usize {
        Self::BYTE_SIZE
    }
}

impl TryFrom<SignatureBytes> for Signature {
    type Error = Error;

    fn try_from(signature: SignatureBytes) -> Result<Signature> {
        Signature::from_bytes(&signature)
    }
}

impl TryFrom<&SignatureBytes> for Signature {
    type Error = Error;

    fn try_from(signature: &SignatureBytes) -> Result<Signature> {
        Signature::from_bytes(signature)
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Signature> {
        Signature::from_slice(bytes)
    }
}
