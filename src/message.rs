//! Top-level SNMP message.
//!
//! A message is the outermost SEQUENCE on the wire:
//! `SEQUENCE { version INTEGER, community OCTET STRING, pdu }`.
//! V1 and v2c share this shape; only the version number and the set of
//! permitted PDU tags differ.

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf, integer_content_len, length_encoded_len};
use crate::error::{Error, ErrorStatus, GrammarErrorKind, Result};
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType, TrapV1Pdu};
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;

/// The PDU carried by a message: either the shared request/response
/// layout or the SNMPv1 trap layout.
#[derive(Debug, Clone, PartialEq)]
pub enum PduBody {
    /// Every PDU kind except the v1 trap.
    Standard(Pdu),
    /// The v1 trap (tag 0xA4).
    TrapV1(TrapV1Pdu),
}

/// A complete SNMP message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    version: Version,
    community: Bytes,
    body: PduBody,
}

impl Message {
    /// Create an empty message of the given kind.
    ///
    /// Fails with [`Error::UnsupportedForVersion`] when the PDU type is
    /// not permitted in the given version (the v1 trap outside SNMPv1;
    /// GETBULK, INFORM, the v2 trap and REPORT outside SNMPv2c).
    pub fn new(
        version: Version,
        community: impl Into<Bytes>,
        pdu_type: PduType,
    ) -> Result<Self> {
        if !pdu_type.valid_for(version) {
            return Err(Error::UnsupportedForVersion { version, pdu_type });
        }

        let body = if pdu_type == PduType::TrapV1 {
            PduBody::TrapV1(TrapV1Pdu {
                enterprise: Oid::empty(),
                agent_addr: [0; 4],
                generic_trap: 0,
                specific_trap: 0,
                timestamp: 0,
                varbinds: Vec::new(),
            })
        } else {
            PduBody::Standard(Pdu::new(pdu_type))
        };

        Ok(Self {
            version,
            community: community.into(),
            body,
        })
    }

    /// Wrap an existing PDU, applying the same version gate as [`new`].
    ///
    /// [`new`]: Self::new
    pub fn from_pdu(version: Version, community: impl Into<Bytes>, pdu: Pdu) -> Result<Self> {
        if !pdu.pdu_type.valid_for(version) {
            return Err(Error::UnsupportedForVersion {
                version,
                pdu_type: pdu.pdu_type,
            });
        }
        Ok(Self {
            version,
            community: community.into(),
            body: PduBody::Standard(pdu),
        })
    }

    /// Wrap a v1 trap PDU; the version is necessarily SNMPv1.
    pub fn trap_v1(community: impl Into<Bytes>, trap: TrapV1Pdu) -> Self {
        Self {
            version: Version::V1,
            community: community.into(),
            body: PduBody::TrapV1(trap),
        }
    }

    /// Protocol version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Community string bytes. SNMP does not require UTF-8 here.
    pub fn community(&self) -> &[u8] {
        &self.community
    }

    /// Community string as text, when it is valid UTF-8.
    pub fn community_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.community).ok()
    }

    /// The PDU type tag of the body.
    pub fn pdu_type(&self) -> PduType {
        match &self.body {
            PduBody::Standard(pdu) => pdu.pdu_type,
            PduBody::TrapV1(_) => PduType::TrapV1,
        }
    }

    /// The PDU body.
    pub fn body(&self) -> &PduBody {
        &self.body
    }

    /// The standard PDU, unless this is a v1 trap.
    pub fn pdu(&self) -> Option<&Pdu> {
        match &self.body {
            PduBody::Standard(pdu) => Some(pdu),
            PduBody::TrapV1(_) => None,
        }
    }

    /// Mutable access to the standard PDU.
    pub fn pdu_mut(&mut self) -> Option<&mut Pdu> {
        match &mut self.body {
            PduBody::Standard(pdu) => Some(pdu),
            PduBody::TrapV1(_) => None,
        }
    }

    /// The v1 trap PDU, when this is one.
    pub fn trap(&self) -> Option<&TrapV1Pdu> {
        match &self.body {
            PduBody::TrapV1(trap) => Some(trap),
            PduBody::Standard(_) => None,
        }
    }

    /// Request-id of the standard body; 0 for a v1 trap.
    pub fn request_id(&self) -> i32 {
        self.pdu().map_or(0, |p| p.request_id)
    }

    /// Error-status of the standard body; 0 for a v1 trap.
    pub fn error_status(&self) -> i32 {
        self.pdu().map_or(0, |p| p.error_status)
    }

    /// Error-index of the standard body; 0 for a v1 trap.
    pub fn error_index(&self) -> i32 {
        self.pdu().map_or(0, |p| p.error_index)
    }

    /// The variable bindings of either body layout.
    pub fn varbinds(&self) -> &[VarBind] {
        match &self.body {
            PduBody::Standard(pdu) => &pdu.varbinds,
            PduBody::TrapV1(trap) => &trap.varbinds,
        }
    }

    /// Set the request-id. No effect on a v1 trap.
    pub fn set_request_id(&mut self, request_id: i32) -> &mut Self {
        if let PduBody::Standard(pdu) = &mut self.body {
            pdu.request_id = request_id;
        }
        self
    }

    /// Set the error-status and error-index. No effect on a v1 trap.
    pub fn set_error(&mut self, status: ErrorStatus, index: i32) -> &mut Self {
        if let PduBody::Standard(pdu) = &mut self.body {
            pdu.error_status = status.as_i32();
            pdu.error_index = index;
        }
        self
    }

    /// Append a variable binding. The binding is owned by the message.
    pub fn push(&mut self, oid: Oid, value: impl Into<Value>) -> &mut Self {
        let vb = VarBind::new(oid, value);
        match &mut self.body {
            PduBody::Standard(pdu) => pdu.varbinds.push(vb),
            PduBody::TrapV1(trap) => trap.varbinds.push(vb),
        }
        self
    }

    /// Set the v1 trap header fields.
    ///
    /// Fails with a grammar error when the message does not carry a v1
    /// trap PDU.
    pub fn set_trap_fields(
        &mut self,
        enterprise: Oid,
        agent_addr: [u8; 4],
        generic_trap: i32,
        specific_trap: i32,
        timestamp: u32,
    ) -> Result<&mut Self> {
        let PduBody::TrapV1(trap) = &mut self.body else {
            return Err(Error::grammar(GrammarErrorKind::NotATrapPdu));
        };
        trap.enterprise = enterprise;
        trap.agent_addr = agent_addr;
        trap.generic_trap = generic_trap;
        trap.specific_trap = specific_trap;
        trap.timestamp = timestamp;
        Ok(self)
    }

    /// Total encoded size of the message, computed without allocating.
    pub fn encoded_len(&self) -> usize {
        let version_len = {
            let n = integer_content_len(self.version.as_i32());
            1 + length_encoded_len(n) + n
        };
        let community_len =
            1 + length_encoded_len(self.community.len()) + self.community.len();
        let body_len = match &self.body {
            PduBody::Standard(pdu) => pdu.ber_encoded_len(),
            PduBody::TrapV1(trap) => trap.ber_encoded_len(),
        };

        let content = version_len + community_len + body_len;
        1 + length_encoded_len(content) + content
    }

    /// Serialize to wire bytes.
    ///
    /// Re-validates the (version, PDU type) pair so a message mutated
    /// into an illegal combination cannot be emitted.
    pub fn encode(&self) -> Result<Bytes> {
        let pdu_type = self.pdu_type();
        if !pdu_type.valid_for(self.version) {
            return Err(Error::UnsupportedForVersion {
                version: self.version,
                pdu_type,
            });
        }

        let mut buf = EncodeBuf::with_capacity(self.encoded_len());
        buf.push_sequence(|buf| {
            match &self.body {
                PduBody::Standard(pdu) => pdu.encode(buf),
                PduBody::TrapV1(trap) => trap.encode(buf),
            }
            buf.push_octet_string(&self.community);
            buf.push_integer(self.version.as_i32());
        });
        Ok(buf.finish())
    }

    /// Parse a message from wire bytes, validating the grammar.
    ///
    /// Failure modes: [`Error::Malformed`] for invalid BER,
    /// [`Error::Grammar`] for valid BER with the wrong structure, and
    /// [`Error::UnsupportedForVersion`] for a PDU tag outside the
    /// observed version.
    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;

        let version_num = seq.read_integer()?;
        let version = Version::from_i32(version_num)
            .ok_or_else(|| Error::grammar(GrammarErrorKind::UnknownVersion(version_num)))?;

        let community = seq.read_octet_string()?;

        let Some(pdu_tag) = seq.peek_tag() else {
            return Err(Error::malformed(
                seq.offset(),
                crate::error::DecodeErrorKind::TruncatedData,
            ));
        };
        let pdu_type = PduType::from_tag(pdu_tag)
            .ok_or_else(|| Error::grammar(GrammarErrorKind::UnknownPduType(pdu_tag)))?;
        if !pdu_type.valid_for(version) {
            return Err(Error::UnsupportedForVersion { version, pdu_type });
        }

        let body = if pdu_type == PduType::TrapV1 {
            PduBody::TrapV1(TrapV1Pdu::decode(&mut seq)?)
        } else {
            PduBody::Standard(Pdu::decode(&mut seq)?)
        };

        Ok(Self {
            version,
            community,
            body,
        })
    }

    /// Parse from a byte slice (copies the data).
    pub fn decode_slice(data: &[u8]) -> Result<Self> {
        Self::decode(Bytes::copy_from_slice(data))
    }
}
