//! SNMP value types.
//!
//! [`Value`] covers every type that can appear in a variable binding:
//! the ASN.1 primitives, the SMI application types, and the v2c
//! exception markers. Tag dispatch is strict; a tag outside this set
//! fails decoding rather than being carried opaquely.

use bytes::Bytes;

use crate::ber::{
    Decoder, EncodeBuf, integer_content_len, length_encoded_len, tag, unsigned32_content_len,
    unsigned64_content_len,
};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;

/// An SNMP value.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// BOOLEAN (rarely seen on the wire, but part of the type set).
    Boolean(bool),

    /// INTEGER (signed 32-bit).
    Integer(i32),

    /// OCTET STRING (arbitrary bytes, NULs allowed).
    OctetString(Bytes),

    /// NULL; the placeholder value of request varbinds.
    Null,

    /// OBJECT IDENTIFIER.
    ObjectIdentifier(Oid),

    /// IpAddress (four octets, network order).
    IpAddress([u8; 4]),

    /// Counter32 (unsigned 32-bit, wrapping).
    Counter32(u32),

    /// Gauge32 / Unsigned32 (unsigned 32-bit, non-wrapping).
    Gauge32(u32),

    /// TimeTicks (hundredths of a second).
    TimeTicks(u32),

    /// Opaque (legacy wrapper for arbitrary bytes).
    Opaque(Bytes),

    /// Counter64 (unsigned 64-bit, wrapping). SNMPv2c only.
    Counter64(u64),

    /// IEEE-754 single-precision float (application tag 0x78).
    Float(f32),

    /// noSuchObject exception: the OID is not implemented by the agent.
    NoSuchObject,

    /// noSuchInstance exception: the object exists but the instance does not.
    NoSuchInstance,

    /// endOfMibView exception: a GETNEXT/GETBULK walked past the last OID.
    EndOfMibView,
}

impl Value {
    /// The BER tag this value encodes under.
    pub fn tag(&self) -> u8 {
        match self {
            Value::Boolean(_) => tag::universal::BOOLEAN,
            Value::Integer(_) => tag::universal::INTEGER,
            Value::OctetString(_) => tag::universal::OCTET_STRING,
            Value::Null => tag::universal::NULL,
            Value::ObjectIdentifier(_) => tag::universal::OBJECT_IDENTIFIER,
            Value::IpAddress(_) => tag::application::IP_ADDRESS,
            Value::Counter32(_) => tag::application::COUNTER32,
            Value::Gauge32(_) => tag::application::GAUGE32,
            Value::TimeTicks(_) => tag::application::TIMETICKS,
            Value::Opaque(_) => tag::application::OPAQUE,
            Value::Counter64(_) => tag::application::COUNTER64,
            Value::Float(_) => tag::application::FLOAT,
            Value::NoSuchObject => tag::context::NO_SUCH_OBJECT,
            Value::NoSuchInstance => tag::context::NO_SUCH_INSTANCE,
            Value::EndOfMibView => tag::context::END_OF_MIB_VIEW,
        }
    }

    /// `Some(i32)` for [`Value::Integer`].
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// `Some(u32)` for the unsigned 32-bit types and non-negative integers.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(*v),
            Value::Integer(v) if *v >= 0 => Some(*v as u32),
            _ => None,
        }
    }

    /// `Some(u64)` for Counter64, the 32-bit unsigned types and
    /// non-negative integers.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Counter64(v) => Some(*v),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(*v as u64),
            Value::Integer(v) if *v >= 0 => Some(*v as u64),
            _ => None,
        }
    }

    /// `Some(&[u8])` for OctetString and Opaque.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(v) | Value::Opaque(v) => Some(v),
            _ => None,
        }
    }

    /// `Some(&str)` when [`Self::as_bytes`] yields valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// `Some(&Oid)` for [`Value::ObjectIdentifier`].
    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Value::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }

    /// `Some(Ipv4Addr)` for [`Value::IpAddress`].
    pub fn as_ip(&self) -> Option<std::net::Ipv4Addr> {
        match self {
            Value::IpAddress(octets) => Some(std::net::Ipv4Addr::from(*octets)),
            _ => None,
        }
    }

    /// Whether this is one of the v2c exception markers.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// Total BER-encoded length (tag, length field and content), computed
    /// without allocating.
    pub fn ber_encoded_len(&self) -> usize {
        let content = match self {
            Value::Boolean(_) => 1,
            Value::Integer(v) => integer_content_len(*v),
            Value::OctetString(data) | Value::Opaque(data) => data.len(),
            Value::Null | Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => 0,
            Value::ObjectIdentifier(oid) => return oid.ber_encoded_len(),
            Value::IpAddress(_) => 4,
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => {
                unsigned32_content_len(*v)
            }
            Value::Counter64(v) => unsigned64_content_len(*v),
            Value::Float(_) => 4,
        };
        1 + length_encoded_len(content) + content
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        match self {
            Value::Boolean(v) => buf.push_boolean(*v),
            Value::Integer(v) => buf.push_integer(*v),
            Value::OctetString(data) => buf.push_octet_string(data),
            Value::Null => buf.push_null(),
            Value::ObjectIdentifier(oid) => buf.push_oid(oid),
            Value::IpAddress(addr) => buf.push_ip_address(*addr),
            Value::Counter32(v) => buf.push_unsigned32(tag::application::COUNTER32, *v),
            Value::Gauge32(v) => buf.push_unsigned32(tag::application::GAUGE32, *v),
            Value::TimeTicks(v) => buf.push_unsigned32(tag::application::TIMETICKS, *v),
            Value::Opaque(data) => buf.push_tagged_bytes(tag::application::OPAQUE, data),
            Value::Counter64(v) => buf.push_unsigned64(*v),
            Value::Float(v) => buf.push_float(*v),
            Value::NoSuchObject => {
                buf.push_length(0);
                buf.push_tag(tag::context::NO_SUCH_OBJECT);
            }
            Value::NoSuchInstance => {
                buf.push_length(0);
                buf.push_tag(tag::context::NO_SUCH_INSTANCE);
            }
            Value::EndOfMibView => {
                buf.push_length(0);
                buf.push_tag(tag::context::END_OF_MIB_VIEW);
            }
        }
    }

    /// Decode one value from BER.
    ///
    /// Dispatch is strict: a tag outside the SNMP type set (including the
    /// constructed OCTET STRING form 0x24) is rejected as malformed.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let at = decoder.offset();
        let value_tag = decoder.read_tag()?;
        let len = decoder.read_length()?;

        match value_tag {
            tag::universal::BOOLEAN => Ok(Value::Boolean(decoder.read_boolean_content(len)?)),
            tag::universal::INTEGER => Ok(Value::Integer(decoder.read_integer_content(len)?)),
            tag::universal::OCTET_STRING => Ok(Value::OctetString(decoder.read_bytes(len)?)),
            tag::universal::NULL => {
                if len != 0 {
                    return Err(Error::malformed(
                        decoder.offset(),
                        DecodeErrorKind::InvalidNull,
                    ));
                }
                Ok(Value::Null)
            }
            tag::universal::OBJECT_IDENTIFIER => {
                Ok(Value::ObjectIdentifier(decoder.read_oid_content(len)?))
            }
            tag::application::IP_ADDRESS => {
                Ok(Value::IpAddress(decoder.read_ip_address_content(len)?))
            }
            tag::application::COUNTER32 => {
                Ok(Value::Counter32(decoder.read_unsigned32_content(len)?))
            }
            tag::application::GAUGE32 => Ok(Value::Gauge32(decoder.read_unsigned32_content(len)?)),
            tag::application::TIMETICKS => {
                Ok(Value::TimeTicks(decoder.read_unsigned32_content(len)?))
            }
            tag::application::OPAQUE => Ok(Value::Opaque(decoder.read_bytes(len)?)),
            tag::application::COUNTER64 => {
                Ok(Value::Counter64(decoder.read_unsigned64_content(len)?))
            }
            tag::application::FLOAT => Ok(Value::Float(decoder.read_float_content(len)?)),
            tag::context::NO_SUCH_OBJECT
            | tag::context::NO_SUCH_INSTANCE
            | tag::context::END_OF_MIB_VIEW => {
                if len != 0 {
                    return Err(Error::malformed(
                        decoder.offset(),
                        DecodeErrorKind::InvalidNull,
                    ));
                }
                Ok(match value_tag {
                    tag::context::NO_SUCH_OBJECT => Value::NoSuchObject,
                    tag::context::NO_SUCH_INSTANCE => Value::NoSuchInstance,
                    _ => Value::EndOfMibView,
                })
            }
            tag::universal::OCTET_STRING_CONSTRUCTED => Err(Error::malformed(
                at,
                DecodeErrorKind::ConstructedOctetString,
            )),
            other => Err(Error::malformed(at, DecodeErrorKind::UnknownTag(other))),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::OctetString(data) => match std::str::from_utf8(data) {
                Ok(s) => write!(f, "{s}"),
                Err(_) => write_hex(f, "0x", data),
            },
            Value::Null => write!(f, "NULL"),
            Value::ObjectIdentifier(oid) => write!(f, "{oid}"),
            Value::IpAddress(a) => write!(f, "{}.{}.{}.{}", a[0], a[1], a[2], a[3]),
            Value::Counter32(v) => write!(f, "{v}"),
            Value::Gauge32(v) => write!(f, "{v}"),
            Value::TimeTicks(v) => {
                let secs = v / 100;
                write!(
                    f,
                    "{}d {}h {}m {}s",
                    secs / 86400,
                    (secs % 86400) / 3600,
                    (secs % 3600) / 60,
                    secs % 60
                )
            }
            Value::Opaque(data) => {
                write_hex(f, "Opaque(0x", data)?;
                write!(f, ")")
            }
            Value::Counter64(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}

fn write_hex(f: &mut std::fmt::Formatter<'_>, prefix: &str, data: &[u8]) -> std::fmt::Result {
    f.write_str(prefix)?;
    for byte in data {
        write!(f, "{byte:02x}")?;
    }
    Ok(())
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::OctetString(Bytes::from(s))
    }
}

impl From<&[u8]> for Value {
    fn from(data: &[u8]) -> Self {
        Value::OctetString(Bytes::copy_from_slice(data))
    }
}

impl From<Bytes> for Value {
    fn from(data: Bytes) -> Self {
        Value::OctetString(data)
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectIdentifier(oid)
    }
}

impl From<std::net::Ipv4Addr> for Value {
    fn from(addr: std::net::Ipv4Addr) -> Self {
        Value::IpAddress(addr.octets())
    }
}

impl From<[u8; 4]> for Value {
    fn from(addr: [u8; 4]) -> Self {
        Value::IpAddress(addr)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Counter64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}
