//! BER decoding.
//!
//! [`Decoder`] is a cursor over a [`Bytes`] buffer. Sub-structures
//! (sequences, PDUs) are decoded through sub-decoders that borrow a slice
//! of the parent buffer without copying, so a declared length can never
//! reach past the bytes it was declared over.

use bytes::Bytes;

use super::length::decode_length;
use super::tag;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;

/// BER decoder reading from a byte buffer.
pub struct Decoder {
    data: Bytes,
    offset: usize,
}

impl Decoder {
    /// Create a decoder over the given bytes.
    pub fn new(data: Bytes) -> Self {
        Self { data, offset: 0 }
    }

    /// Create a decoder from a slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Current read position.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Whether the cursor has reached the end of the buffer.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Read one byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        let Some(&byte) = self.data.get(self.offset) else {
            return Err(Error::malformed(self.offset, DecodeErrorKind::TruncatedData));
        };
        self.offset += 1;
        Ok(byte)
    }

    /// Read a tag byte.
    pub fn read_tag(&mut self) -> Result<u8> {
        self.read_byte()
    }

    /// Look at the next tag byte without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    /// Read a length field.
    pub fn read_length(&mut self) -> Result<usize> {
        let (len, consumed) = decode_length(&self.data[self.offset..], self.offset)?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read `len` raw bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        // saturating_add so a hostile length cannot wrap past the bounds check
        if self.offset.saturating_add(len) > self.data.len() {
            return Err(Error::malformed(
                self.offset,
                DecodeErrorKind::InsufficientData {
                    needed: len,
                    available: self.remaining(),
                },
            ));
        }
        let bytes = self.data.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(bytes)
    }

    /// Read a specific tag, returning the declared content length.
    pub fn expect_tag(&mut self, expected: u8) -> Result<usize> {
        let at = self.offset;
        let actual = self.read_tag()?;
        if actual != expected {
            return Err(Error::malformed(
                at,
                DecodeErrorKind::UnexpectedTag { expected, actual },
            ));
        }
        self.read_length()
    }

    /// Read a signed INTEGER (tag and all).
    pub fn read_integer(&mut self) -> Result<i32> {
        let len = self.expect_tag(tag::universal::INTEGER)?;
        self.read_integer_content(len)
    }

    /// Read signed integer content of the given length, sign-extending the
    /// first octet.
    pub fn read_integer_content(&mut self, len: usize) -> Result<i32> {
        if len == 0 {
            return Err(Error::malformed(
                self.offset,
                DecodeErrorKind::ZeroLengthInteger,
            ));
        }
        if len > 4 {
            return Err(Error::malformed(
                self.offset,
                DecodeErrorKind::IntegerTooLong { length: len },
            ));
        }

        let bytes = self.read_bytes(len)?;
        let mut value: i32 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
        for &byte in bytes.iter() {
            value = (value << 8) | byte as i32;
        }
        Ok(value)
    }

    /// Read an unsigned 32-bit value carrying the given application tag
    /// (Counter32, Gauge32, TimeTicks).
    pub fn read_unsigned32(&mut self, expected_tag: u8) -> Result<u32> {
        let len = self.expect_tag(expected_tag)?;
        self.read_unsigned32_content(len)
    }

    /// Read unsigned 32-bit content. A leading 0x00 pad octet is allowed
    /// (it is how encoders avoid the sign bit); no sign extension happens.
    pub fn read_unsigned32_content(&mut self, len: usize) -> Result<u32> {
        if len == 0 {
            return Err(Error::malformed(
                self.offset,
                DecodeErrorKind::ZeroLengthInteger,
            ));
        }
        if len > 5 {
            return Err(Error::malformed(
                self.offset,
                DecodeErrorKind::IntegerTooLong { length: len },
            ));
        }

        let bytes = self.read_bytes(len)?;
        let mut value: u32 = 0;
        for &byte in bytes.iter() {
            value = (value << 8) | byte as u32;
        }
        Ok(value)
    }

    /// Read unsigned 64-bit content (Counter64). Up to nine octets: one
    /// possible 0x00 pad plus eight value bytes.
    pub fn read_unsigned64_content(&mut self, len: usize) -> Result<u64> {
        if len == 0 {
            return Err(Error::malformed(
                self.offset,
                DecodeErrorKind::ZeroLengthInteger,
            ));
        }
        if len > 9 {
            return Err(Error::malformed(
                self.offset,
                DecodeErrorKind::IntegerTooLong { length: len },
            ));
        }

        let bytes = self.read_bytes(len)?;
        let mut value: u64 = 0;
        for &byte in bytes.iter() {
            value = (value << 8) | byte as u64;
        }
        Ok(value)
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        let len = self.expect_tag(tag::universal::OCTET_STRING)?;
        self.read_bytes(len)
    }

    /// Read a NULL.
    pub fn read_null(&mut self) -> Result<()> {
        let len = self.expect_tag(tag::universal::NULL)?;
        if len != 0 {
            return Err(Error::malformed(self.offset, DecodeErrorKind::InvalidNull));
        }
        Ok(())
    }

    /// Read a BOOLEAN.
    pub fn read_boolean(&mut self) -> Result<bool> {
        let len = self.expect_tag(tag::universal::BOOLEAN)?;
        self.read_boolean_content(len)
    }

    /// Read boolean content: exactly one octet, non-zero meaning true.
    pub fn read_boolean_content(&mut self, len: usize) -> Result<bool> {
        if len != 1 {
            return Err(Error::malformed(
                self.offset,
                DecodeErrorKind::InvalidBooleanLength { length: len },
            ));
        }
        Ok(self.read_byte()? != 0)
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let len = self.expect_tag(tag::universal::OBJECT_IDENTIFIER)?;
        self.read_oid_content(len)
    }

    /// Read OID content of the given length.
    pub fn read_oid_content(&mut self, len: usize) -> Result<Oid> {
        let at = self.offset;
        let bytes = self.read_bytes(len)?;
        Oid::from_ber(&bytes).map_err(|e| match e {
            // Rebase the offset onto this decoder's coordinates.
            Error::Malformed { offset, kind } => Error::malformed(at + offset, kind),
            other => other,
        })
    }

    /// Read an IpAddress: exactly four octets.
    pub fn read_ip_address(&mut self) -> Result<[u8; 4]> {
        let len = self.expect_tag(tag::application::IP_ADDRESS)?;
        self.read_ip_address_content(len)
    }

    /// Read IpAddress content of the given length.
    pub fn read_ip_address_content(&mut self, len: usize) -> Result<[u8; 4]> {
        if len != 4 {
            return Err(Error::malformed(
                self.offset,
                DecodeErrorKind::InvalidIpAddressLength { length: len },
            ));
        }
        let bytes = self.read_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Read IEEE-754 float content: exactly four big-endian octets.
    pub fn read_float_content(&mut self, len: usize) -> Result<f32> {
        if len != 4 {
            return Err(Error::malformed(
                self.offset,
                DecodeErrorKind::InvalidFloatLength { length: len },
            ));
        }
        let bytes = self.read_bytes(4)?;
        Ok(f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a SEQUENCE header and return a decoder over its content.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        self.read_constructed(tag::universal::SEQUENCE)
    }

    /// Read a constructed value with the given tag and return a decoder
    /// over its content.
    pub fn read_constructed(&mut self, expected_tag: u8) -> Result<Decoder> {
        let len = self.expect_tag(expected_tag)?;
        let content = self.read_bytes(len)?;
        Ok(Decoder::new(content))
    }

    /// Split off a sub-decoder over the next `len` bytes.
    pub fn sub_decoder(&mut self, len: usize) -> Result<Decoder> {
        let content = self.read_bytes(len)?;
        Ok(Decoder::new(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_integer_values() {
        let cases: &[(&[u8], i32)] = &[
            (&[0x02, 0x01, 0x00], 0),
            (&[0x02, 0x01, 0x7F], 127),
            (&[0x02, 0x02, 0x00, 0x80], 128),
            (&[0x02, 0x01, 0xFF], -1),
            (&[0x02, 0x01, 0x80], -128),
            (&[0x02, 0x04, 0x7F, 0xFF, 0xFF, 0xFF], i32::MAX),
            (&[0x02, 0x04, 0x80, 0x00, 0x00, 0x00], i32::MIN),
        ];
        for (bytes, expected) in cases {
            let mut dec = Decoder::from_slice(bytes);
            assert_eq!(dec.read_integer().unwrap(), *expected);
        }
    }

    #[test]
    fn decode_non_minimal_integer_accepted() {
        let mut dec = Decoder::from_slice(&[0x02, 0x02, 0x00, 0x01]);
        assert_eq!(dec.read_integer().unwrap(), 1);

        let mut dec = Decoder::from_slice(&[0x02, 0x02, 0xFF, 0xFF]);
        assert_eq!(dec.read_integer().unwrap(), -1);
    }

    #[test]
    fn decode_overlong_integer_rejected() {
        let mut dec = Decoder::from_slice(&[0x02, 0x05, 0x01, 0x02, 0x03, 0x04, 0x05]);
        assert!(dec.read_integer().is_err());
    }

    #[test]
    fn decode_unsigned_no_sign_extension() {
        // 0xFFFFFFFF as Counter32: high bit set, no sign extension.
        let mut dec = Decoder::from_slice(&[0x41, 0x05, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(dec.read_unsigned32(0x41).unwrap(), u32::MAX);

        let mut dec = Decoder::from_slice(&[0x41, 0x04, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(dec.read_unsigned32(0x41).unwrap(), u32::MAX);
    }

    #[test]
    fn decode_octet_string() {
        let mut dec = Decoder::from_slice(&[0x04, 0x05, b'h', b'e', b'l', b'l', b'o']);
        assert_eq!(&dec.read_octet_string().unwrap()[..], b"hello");
    }

    #[test]
    fn decode_null_requires_zero_length() {
        let mut dec = Decoder::from_slice(&[0x05, 0x00]);
        dec.read_null().unwrap();

        let mut dec = Decoder::from_slice(&[0x05, 0x01, 0x00]);
        assert!(dec.read_null().is_err());
    }

    #[test]
    fn decode_boolean() {
        let mut dec = Decoder::from_slice(&[0x01, 0x01, 0x00]);
        assert!(!dec.read_boolean().unwrap());

        let mut dec = Decoder::from_slice(&[0x01, 0x01, 0xFF]);
        assert!(dec.read_boolean().unwrap());

        // Any non-zero octet is true.
        let mut dec = Decoder::from_slice(&[0x01, 0x01, 0x2A]);
        assert!(dec.read_boolean().unwrap());

        let mut dec = Decoder::from_slice(&[0x01, 0x02, 0x00, 0x00]);
        assert!(dec.read_boolean().is_err());
    }

    #[test]
    fn decode_sequence_of_integers() {
        let mut dec = Decoder::from_slice(&[0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]);
        let mut seq = dec.read_sequence().unwrap();
        assert_eq!(seq.read_integer().unwrap(), 1);
        assert_eq!(seq.read_integer().unwrap(), 2);
        assert!(seq.is_empty());
    }

    #[test]
    fn declared_length_past_end_rejected() {
        // OCTET STRING claiming 255 bytes with none following.
        let mut dec = Decoder::from_slice(&[0x04, 0xFF]);
        assert!(dec.read_octet_string().is_err());
    }

    #[test]
    fn read_bytes_overflow_guard() {
        let mut dec = Decoder::from_slice(&[0x01, 0x02, 0x03]);
        assert!(dec.read_bytes(usize::MAX).is_err());
    }

    #[test]
    fn unexpected_tag_reports_both_tags() {
        let mut dec = Decoder::from_slice(&[0x04, 0x00]);
        let err = dec.read_integer().unwrap_err();
        assert!(matches!(
            err,
            Error::Malformed {
                kind: DecodeErrorKind::UnexpectedTag {
                    expected: 0x02,
                    actual: 0x04
                },
                ..
            }
        ));
    }
}
