//! Support for SM2 decryption.
//!
//! ## Algorithm
//!
//! ```text
//! B1: get C1 from C, verify that C1 satisfies the elliptic curve equation
//! B2: compute point S = [h]C1, error if S is the point at infinity
//! B3: compute [dB]C1 = (x2, y2)
//! B4: compute t = KDF(x2 || y2, klen)
//! B5: compute M' = C2 xor t
//! B6: compute u = Hash(x2 || M' || y2), error if u != C3
//! ```
//!
//! The strict `decrypt*` methods surface every failure as the opaque
//! [`Error`](crate::Error). The `*_compat` methods instead return an empty
//! value on any failure, matching the soft-fail contract of other SM2 stacks;
//! callers using them cannot distinguish an empty plaintext from a failure.

use super::{Cipher, EncryptingKey, Mode};
use crate::{codec, kdf, Error, Hash, NonZeroScalar, ProjectivePoint, PublicKey, Result, SecretKey};
use alloc::{string::String, vec::Vec};
use core::fmt;
use elliptic_curve::{
    subtle::ConstantTimeEq,
    Group,
};
use sm3::{Digest, Sm3};

/// SM2 secret key used for decrypting messages.
#[derive(Clone)]
pub struct DecryptingKey {
    secret_scalar: NonZeroScalar,
}

impl fmt::Debug for DecryptingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptingKey")
            .field("encrypting_key", &self.encrypting_key())
            .finish_non_exhaustive()
    }
}

impl DecryptingKey {
    /// Initialize [`DecryptingKey`] from a secret key.
    pub fn new(secret_key: &SecretKey) -> Self {
        Self::from_nonzero_scalar(secret_key.to_nonzero_scalar())
    }

    /// Initialize [`DecryptingKey`] from a non-zero secret scalar.
    pub fn from_nonzero_scalar(secret_scalar: NonZeroScalar) -> Self {
        Self { secret_scalar }
    }

    /// Initialize [`DecryptingKey`] from its 64-character hex form.
    pub fn from_hex(hex: &str) -> Result<Self> {
        codec::secret_key_from_hex(hex).map(|secret_key| Self::new(&secret_key))
    }

    /// Get the [`EncryptingKey`] which corresponds to this [`DecryptingKey`].
    pub fn encrypting_key(&self) -> EncryptingKey {
        EncryptingKey::new(PublicKey::from_secret_scalar(&self.secret_scalar))
    }

    /// Borrow the secret [`NonZeroScalar`] value for this key.
    ///
    /// # ⚠️ Warning
    ///
    /// This value is key material.
    ///
    /// Please treat it with the care it deserves!
    pub fn as_nonzero_scalar(&self) -> &NonZeroScalar {
        &self.secret_scalar
    }

    /// Decrypt a [`Cipher`], verifying the integrity tag.
    pub fn decrypt(&self, cipher: &Cipher) -> Result<Vec<u8>> {
        let mut digest = Sm3::new();

        // B3: compute [dB]C1 = (x2, y2)
        let shared = ProjectivePoint::from(*cipher.c1()) * *self.secret_scalar;
        if bool::from(shared.is_identity()) {
            return Err(Error);
        }
        let (x2, y2) = codec::point_coordinates(&shared.to_affine())?;

        // B4/B5: compute M' = C2 xor KDF(x2 || y2, klen)
        let mut msg = cipher.c2().to_vec();
        kdf::xor_stream(&mut digest, &x2, &y2, &mut msg)?;

        // B6: compute u = Hash(x2 || M' || y2), error if u != C3
        let mut u = Hash::default();
        Digest::update(&mut digest, &x2);
        Digest::update(&mut digest, &msg);
        Digest::update(&mut digest, &y2);
        Digest::finalize_into_reset(&mut digest, &mut u);

        if !bool::from(u.as_slice().ct_eq(cipher.c3().as_slice())) {
            return Err(Error);
        }

        Ok(msg)
    }

    /// Decrypt the byte framing (SEC1-tagged `C1`).
    pub fn decrypt_slice(&self, cipher: &[u8], mode: Mode) -> Result<Vec<u8>> {
        self.decrypt(&Cipher::from_slice(cipher, mode)?)
    }

    /// Decrypt the hex framing (prefix-less `C1`).
    pub fn decrypt_hex(&self, cipher: &str, mode: Mode) -> Result<Vec<u8>> {
        self.decrypt(&Cipher::from_hex(cipher, mode)?)
    }

    /// Decrypt the ASN.1 DER framing.
    pub fn decrypt_der(&self, cipher: &[u8], mode: Mode) -> Result<Vec<u8>> {
        self.decrypt(&Cipher::from_der(cipher, mode)?)
    }

    /// Decrypt the hex framing to a UTF-8 string, failing on non-UTF-8
    /// plaintext.
    pub fn decrypt_string(&self, cipher: &str, mode: Mode) -> Result<String> {
        String::from_utf8(self.decrypt_hex(cipher, mode)?).map_err(|_| Error)
    }

    /// Decrypt the hex framing, returning an empty buffer on any failure.
    ///
    /// Soft-fail interop surface: parse errors, off-curve points, and
    /// integrity failures are indistinguishable from one another (and from a
    /// genuinely empty plaintext, which decrypts to an empty buffer on the
    /// success path too).
    pub fn decrypt_hex_compat(&self, cipher: &str, mode: Mode) -> Vec<u8> {
        self.decrypt_hex(cipher, mode).unwrap_or_default()
    }

    /// Decrypt the hex framing to a string, returning an empty string on any
    /// failure.
    ///
    /// Non-UTF-8 plaintext decodes lossily (replacement characters) rather
    /// than failing.
    pub fn decrypt_string_compat(&self, cipher: &str, mode: Mode) -> String {
        match self.decrypt_hex(cipher, mode) {
            Ok(msg) => String::from_utf8_lossy(&msg).into_owned(),
            Err(_) => String::new(),
        }
    }
}
