//! Boundary codec: hex strings, SEC1 points, and key material.
//!
//! Hex output is always lowercase; hex input is parsed case-insensitively.
//! Public-key hex is the 128-character uncompressed `x || y` form. A leading
//! SEC1 `04` tag is accepted on input and normalized away, and is never
//! emitted on output.

use crate::{AffinePoint, EncodedPoint, Error, FieldBytes, PublicKey, Result, SecretKey};
use alloc::{string::String, vec::Vec};
use elliptic_curve::{
    generic_array::GenericArray,
    sec1::{Coordinates, FromEncodedPoint, ToEncodedPoint},
};

/// Encode bytes as lowercase hex.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    base16ct::lower::encode_string(bytes)
}

/// Decode a hex string of either case.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>> {
    base16ct::mixed::decode_vec(hex).map_err(|_| Error)
}

/// Decode an uncompressed curve point from hex.
///
/// Accepts the 128-character `x || y` form as well as the 130-character
/// SEC1-tagged `04 || x || y` form. The point is checked against the curve
/// equation.
pub fn decode_point(hex: &str) -> Result<AffinePoint> {
    let bytes = hex_to_bytes(hex)?;
    let untagged = match bytes.len() {
        64 => &bytes[..],
        65 if bytes[0] == 0x04 => &bytes[1..],
        _ => return Err(Error),
    };
    let encoded = EncodedPoint::from_untagged_bytes(GenericArray::from_slice(untagged));
    Option::from(AffinePoint::from_encoded_point(&encoded)).ok_or(Error)
}

/// Encode a curve point as 128 lowercase hex characters (`x || y`, no tag).
pub fn encode_point(point: &AffinePoint) -> String {
    let encoded = point.to_encoded_point(false);
    bytes_to_hex(&encoded.as_bytes()[1..])
}

/// Decode a public key from hex, rejecting off-curve and identity points.
pub fn public_key_from_hex(hex: &str) -> Result<PublicKey> {
    let point = decode_point(hex)?;
    PublicKey::from_affine(point)
}

/// Encode a public key as 128 lowercase hex characters.
pub fn public_key_to_hex(public_key: &PublicKey) -> String {
    encode_point(public_key.as_affine())
}

/// Decode a secret key from its 64-character hex form.
pub fn secret_key_from_hex(hex: &str) -> Result<SecretKey> {
    if hex.len() != 64 {
        return Err(Error);
    }
    let bytes = hex_to_bytes(hex)?;
    SecretKey::from_slice(&bytes)
}

/// Encode a secret key as 64 lowercase hex characters.
pub fn secret_key_to_hex(secret_key: &SecretKey) -> String {
    bytes_to_hex(&secret_key.to_bytes())
}

/// Extract the affine coordinates as fixed 32-byte big-endian buffers.
///
/// The SEC1 encoding left-pads with zeroes, so both buffers are always
/// exactly 32 bytes. Fails on the identity, which has no coordinates.
pub(crate) fn point_coordinates(point: &AffinePoint) -> Result<(FieldBytes, FieldBytes)> {
    match point.to_encoded_point(false).coordinates() {
        Coordinates::Uncompressed { x, y } => Ok((*x, *y)),
        _ => Err(Error),
    }
}
