//! ASN.1 DER framing for ciphertexts:
//! `SEQUENCE { INTEGER x1, INTEGER y1, OCTET STRING, OCTET STRING }` with the
//! two octet strings carrying `(C3, C2)` in `C1C3C2` order and `(C2, C3)` in
//! `C1C2C3` order.

use super::{Cipher, Mode, C3_LEN};
use crate::{AffinePoint, EncodedPoint, Error, FieldBytes, Hash, Result};
use alloc::vec::Vec;
use der::{
    asn1::{OctetStringRef, UintRef},
    Decode, DecodeValue, Encode, EncodeValue, Header, Length, Reader, Sequence, Writer,
};
use elliptic_curve::sec1::{Coordinates, FromEncodedPoint, ToEncodedPoint};

/// Reference to the four fields of a DER-encoded ciphertext.
struct CipherRef<'a> {
    x: UintRef<'a>,
    y: UintRef<'a>,
    first: OctetStringRef<'a>,
    second: OctetStringRef<'a>,
}

impl EncodeValue for CipherRef<'_> {
    fn value_len(&self) -> der::Result<Length> {
        self.x.encoded_len()?
            + self.y.encoded_len()?
            + self.first.encoded_len()?
            + self.second.encoded_len()?
    }

    fn encode_value(&self, writer: &mut impl Writer) -> der::Result<()> {
        self.x.encode(writer)?;
        self.y.encode(writer)?;
        self.first.encode(writer)?;
        self.second.encode(writer)
    }
}

impl<'a> DecodeValue<'a> for CipherRef<'a> {
    fn decode_value<R: Reader<'a>>(reader: &mut R, _header: Header) -> der::Result<Self> {
        Ok(Self {
            x: UintRef::decode(reader)?,
            y: UintRef::decode(reader)?,
            first: OctetStringRef::decode(reader)?,
            second: OctetStringRef::decode(reader)?,
        })
    }
}

impl<'a> Sequence<'a> for CipherRef<'a> {}

pub(super) fn encode(cipher: &Cipher, mode: Mode) -> Result<Vec<u8>> {
    let point = cipher.c1.to_encoded_point(false);
    let (x, y) = match point.coordinates() {
        Coordinates::Uncompressed { x, y } => (x, y),
        _ => return Err(Error),
    };
    let (first, second) = match mode {
        Mode::C1C3C2 => (cipher.c3.as_slice(), cipher.c2.as_slice()),
        Mode::C1C2C3 => (cipher.c2.as_slice(), cipher.c3.as_slice()),
    };

    let sequence = CipherRef {
        x: UintRef::new(x).map_err(|_| Error)?,
        y: UintRef::new(y).map_err(|_| Error)?,
        first: OctetStringRef::new(first).map_err(|_| Error)?,
        second: OctetStringRef::new(second).map_err(|_| Error)?,
    };
    sequence.to_der().map_err(|_| Error)
}

pub(super) fn decode(bytes: &[u8], mode: Mode) -> Result<Cipher> {
    let sequence = CipherRef::from_der(bytes).map_err(|_| Error)?;

    let x = left_pad(sequence.x.as_bytes())?;
    let y = left_pad(sequence.y.as_bytes())?;
    let encoded = EncodedPoint::from_affine_coordinates(&x, &y, false);
    let c1 = Option::from(AffinePoint::from_encoded_point(&encoded)).ok_or(Error)?;

    let (c3, c2) = match mode {
        Mode::C1C3C2 => (sequence.first.as_bytes(), sequence.second.as_bytes()),
        Mode::C1C2C3 => (sequence.second.as_bytes(), sequence.first.as_bytes()),
    };
    if c3.len() != C3_LEN {
        return Err(Error);
    }

    Ok(Cipher::new(c1, c2.to_vec(), Hash::clone_from_slice(c3)))
}

fn left_pad(bytes: &[u8]) -> Result<FieldBytes> {
    let mut padded = [0u8; 32];
    let start = padded.len().checked_sub(bytes.len()).ok_or(Error)?;
    padded[start..].copy_from_slice(bytes);
    Ok(padded.into())
}
