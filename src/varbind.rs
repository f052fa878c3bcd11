//! Variable bindings.

use crate::ber::{Decoder, EncodeBuf, length_encoded_len};
use crate::error::{Error, GrammarErrorKind, Result};
use crate::oid::Oid;
use crate::value::Value;

/// A variable binding: an OID paired with a value.
#[derive(Debug, Clone, PartialEq)]
pub struct VarBind {
    /// The object name.
    pub oid: Oid,
    /// The bound value.
    pub value: Value,
}

impl VarBind {
    /// Create a binding.
    pub fn new(oid: Oid, value: impl Into<Value>) -> Self {
        Self {
            oid,
            value: value.into(),
        }
    }

    /// Create a binding with a NULL value, as used in request PDUs.
    pub fn null(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Null,
        }
    }

    /// Total BER-encoded length, computed without allocating.
    pub fn ber_encoded_len(&self) -> usize {
        let content = self.oid.ber_encoded_len() + self.value.ber_encoded_len();
        1 + length_encoded_len(content) + content
    }

    /// Encode as `SEQUENCE { name, value }`.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            self.value.encode(buf);
            buf.push_oid(&self.oid);
        });
    }

    /// Decode one binding.
    ///
    /// The inner SEQUENCE must hold exactly the (name, value) pair; a
    /// trailing element is a grammar violation.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let oid = seq.read_oid()?;
        let value = Value::decode(&mut seq)?;
        if !seq.is_empty() {
            return Err(Error::grammar(GrammarErrorKind::VarBindTrailingElements));
        }
        Ok(VarBind { oid, value })
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// Total BER-encoded length of a varbind list, including its own
/// SEQUENCE wrapper.
pub fn varbind_list_encoded_len(varbinds: &[VarBind]) -> usize {
    let content: usize = varbinds.iter().map(VarBind::ber_encoded_len).sum();
    1 + length_encoded_len(content) + content
}

/// Encode a varbind list as a SEQUENCE of bindings, order preserved.
pub fn encode_varbind_list(buf: &mut EncodeBuf, varbinds: &[VarBind]) {
    buf.push_sequence(|buf| {
        // Reverse buffer: the last binding goes in first.
        for vb in varbinds.iter().rev() {
            vb.encode(buf);
        }
    });
}

/// Decode a varbind list. Order is preserved; duplicates are allowed.
pub fn decode_varbind_list(decoder: &mut Decoder) -> Result<Vec<VarBind>> {
    let mut seq = decoder.read_sequence()?;

    // A binding is rarely under 16 bytes, so this bounds reallocation
    // without over-committing for small lists.
    let mut varbinds = Vec::with_capacity((seq.remaining() / 16).max(1));
    while !seq.is_empty() {
        varbinds.push(VarBind::decode(&mut seq)?);
    }
    Ok(varbinds)
}
