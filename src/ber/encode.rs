//! BER encoding.
//!
//! [`EncodeBuf`] writes backwards: content first, then the length field,
//! then the tag. Wrapping a constructed value therefore never needs the
//! content length up front, and the whole buffer is reversed once in
//! [`EncodeBuf::finish`].

use bytes::Bytes;

use super::length::encode_length;
use super::tag;
use crate::oid::Oid;

/// Reverse-writing buffer for BER encoding.
pub struct EncodeBuf {
    buf: Vec<u8>,
}

impl EncodeBuf {
    /// Create a buffer with a default capacity suited to typical messages.
    pub fn new() -> Self {
        Self::with_capacity(512)
    }

    /// Create a buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Push a single byte.
    pub fn push_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Push a run of bytes that should appear in wire order.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend(bytes.iter().rev());
    }

    /// Push a length field for `len` content bytes.
    pub fn push_length(&mut self, len: usize) {
        let (bytes, count) = encode_length(len);
        self.buf.extend(bytes[..count].iter().rev());
    }

    /// Push a tag byte.
    pub fn push_tag(&mut self, tag: u8) {
        self.buf.push(tag);
    }

    /// Encode a constructed value: the closure writes the content (in
    /// reverse field order), then the computed length and tag are wrapped
    /// around it.
    pub fn push_constructed<F>(&mut self, tag: u8, f: F)
    where
        F: FnOnce(&mut Self),
    {
        let before = self.len();
        f(self);
        let content_len = self.len() - before;
        self.push_length(content_len);
        self.push_tag(tag);
    }

    /// Encode a SEQUENCE.
    pub fn push_sequence<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.push_constructed(tag::universal::SEQUENCE, f);
    }

    /// Encode a signed INTEGER in minimal two's-complement form.
    pub fn push_integer(&mut self, value: i32) {
        let (bytes, len) = integer_to_be(value);
        self.push_bytes(&bytes[4 - len..]);
        self.push_length(len);
        self.push_tag(tag::universal::INTEGER);
    }

    /// Encode an unsigned 32-bit value under the given application tag.
    pub fn push_unsigned32(&mut self, tag: u8, value: u32) {
        let (bytes, len) = unsigned32_to_be(value);
        self.push_bytes(&bytes[5 - len..]);
        self.push_length(len);
        self.push_tag(tag);
    }

    /// Encode a Counter64.
    pub fn push_unsigned64(&mut self, value: u64) {
        let (bytes, len) = unsigned64_to_be(value);
        self.push_bytes(&bytes[9 - len..]);
        self.push_length(len);
        self.push_tag(tag::application::COUNTER64);
    }

    /// Encode raw content under an arbitrary tag (OctetString, Opaque, ...).
    pub fn push_tagged_bytes(&mut self, tag: u8, data: &[u8]) {
        self.push_bytes(data);
        self.push_length(data.len());
        self.push_tag(tag);
    }

    /// Encode an OCTET STRING.
    pub fn push_octet_string(&mut self, data: &[u8]) {
        self.push_tagged_bytes(tag::universal::OCTET_STRING, data);
    }

    /// Encode a NULL.
    pub fn push_null(&mut self) {
        self.push_length(0);
        self.push_tag(tag::universal::NULL);
    }

    /// Encode a BOOLEAN (true as 0xFF).
    pub fn push_boolean(&mut self, value: bool) {
        self.push_byte(if value { 0xFF } else { 0x00 });
        self.push_length(1);
        self.push_tag(tag::universal::BOOLEAN);
    }

    /// Encode an OBJECT IDENTIFIER.
    pub fn push_oid(&mut self, oid: &Oid) {
        let content = oid.to_ber();
        self.push_tagged_bytes(tag::universal::OBJECT_IDENTIFIER, &content);
    }

    /// Encode an IpAddress.
    pub fn push_ip_address(&mut self, addr: [u8; 4]) {
        self.push_tagged_bytes(tag::application::IP_ADDRESS, &addr);
    }

    /// Encode an IEEE-754 single under the float application tag.
    pub fn push_float(&mut self, value: f32) {
        self.push_tagged_bytes(tag::application::FLOAT, &value.to_be_bytes());
    }

    /// Finalize, reversing into wire order.
    pub fn finish(mut self) -> Bytes {
        self.buf.reverse();
        Bytes::from(self.buf)
    }

    /// Finalize into a `Vec<u8>`.
    pub fn finish_vec(mut self) -> Vec<u8> {
        self.buf.reverse();
        self.buf
    }
}

impl Default for EncodeBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal two's-complement big-endian form of a signed 32-bit integer.
///
/// Returns the full big-endian bytes and the count of significant trailing
/// bytes: the encoding is `bytes[4 - len..]`.
#[inline]
fn integer_to_be(value: i32) -> ([u8; 4], usize) {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < 3 {
        let redundant = if value < 0 {
            bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0
        } else {
            bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0
        };
        if !redundant {
            break;
        }
        start += 1;
    }
    (bytes, 4 - start)
}

/// Minimal big-endian form of an unsigned 32-bit value, with a 0x00 pad
/// octet whenever the top significant bit would read as a sign bit.
#[inline]
fn unsigned32_to_be(value: u32) -> ([u8; 5], usize) {
    let mut out = [0u8; 5];
    out[1..].copy_from_slice(&value.to_be_bytes());
    let mut start = 1;
    while start < 4 && out[start] == 0 {
        start += 1;
    }
    if out[start] & 0x80 != 0 {
        start -= 1;
    }
    (out, 5 - start)
}

/// Minimal big-endian form of an unsigned 64-bit value, padded as above.
#[inline]
fn unsigned64_to_be(value: u64) -> ([u8; 9], usize) {
    let mut out = [0u8; 9];
    out[1..].copy_from_slice(&value.to_be_bytes());
    let mut start = 1;
    while start < 8 && out[start] == 0 {
        start += 1;
    }
    if out[start] & 0x80 != 0 {
        start -= 1;
    }
    (out, 9 - start)
}

/// Content length of a signed INTEGER, computed without allocating.
#[inline]
pub fn integer_content_len(value: i32) -> usize {
    integer_to_be(value).1
}

/// Content length of an unsigned 32-bit value.
#[inline]
pub fn unsigned32_content_len(value: u32) -> usize {
    unsigned32_to_be(value).1
}

/// Content length of an unsigned 64-bit value.
#[inline]
pub fn unsigned64_content_len(value: u64) -> usize {
    unsigned64_to_be(value).1
}
