//! ASN.1 DER framing for signatures: `SEQUENCE { INTEGER r, INTEGER s }`
//! with minimally encoded two's-complement integers.

use crate::FieldBytes;
use alloc::vec::Vec;
use der::{
    asn1::UintRef, Decode, DecodeValue, Encode, EncodeValue, Header, Length, Reader, Sequence,
    Writer,
};
use signature::{Error, Result};

/// Reference to the two integers of a DER-encoded signature.
struct SignatureRef<'a> {
    r: UintRef<'a>,
    s: UintRef<'a>,
}

impl EncodeValue for SignatureRef<'_> {
    fn value_len(&self) -> der::Result<Length> {
        self.r.encoded_len()? + self.s.encoded_len()?
    }

    fn encode_value(&self, writer: &mut impl Writer) -> der::Result<()> {
        self.r.encode(writer)?;
        self.s.encode(writer)
    }
}

impl<'a> DecodeValue<'a> for SignatureRef<'a> {
    fn decode_value<R: Reader<'a>>(reader: &mut R, _header: Header) -> der::Result<Self> {
        Ok(Self {
            r: UintRef::decode(reader)?,
            s: UintRef::decode(reader)?,
        })
    }
}

impl<'a> Sequence<'a> for SignatureRef<'a> {}

/// DER-encode big-endian `r` and `s` components.
pub(super) fn encode(r: &FieldBytes, s: &FieldBytes) -> Result<Vec<u8>> {
    let sig = SignatureRef {
        r: UintRef::new(r).map_err(|_| Error::new())?,
        s: UintRef::new(s).map_err(|_| Error::new())?,
    };
    sig.to_der().map_err(|_| Error::new())
}

/// DER-decode into zero-padded 32-byte `r` and `s` components.
pub(super) fn decode(bytes: &[u8]) -> Result<(FieldBytes, FieldBytes)> {
    let sig = SignatureRef::from_der(bytes).map_err(|_| Error::new())?;
    Ok((left_pad(sig.r.as_bytes())?, left_pad(sig.s.as_bytes())?))
}

fn left_pad(bytes: &[u8]) -> Result<FieldBytes> {
    let mut padded = [0u8; 32];
    let start = padded
        .len()
        .checked_sub(bytes.len())
        .ok_or_else(Error::new)?;
    padded[start..].copy_from_slice(bytes);
    Ok(padded.into())
}
