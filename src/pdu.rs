//! SNMP Protocol Data Units.
//!
//! All PDU kinds except the SNMPv1 trap share one body layout
//! ([`Pdu`]); the v1 trap has its own ([`TrapV1Pdu`]).

use crate::ber::{
    Decoder, EncodeBuf, integer_content_len, length_encoded_len, tag, unsigned32_content_len,
};
use crate::error::{Error, ErrorStatus, GrammarErrorKind, Result};
use crate::oid::Oid;
use crate::varbind::{VarBind, decode_varbind_list, encode_varbind_list, varbind_list_encoded_len};
use crate::version::Version;

/// PDU type, discriminated by the constructed context tag on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PduType {
    GetRequest = 0xA0,
    GetNextRequest = 0xA1,
    GetResponse = 0xA2,
    SetRequest = 0xA3,
    TrapV1 = 0xA4,
    GetBulkRequest = 0xA5,
    InformRequest = 0xA6,
    TrapV2 = 0xA7,
    Report = 0xA8,
}

impl PduType {
    /// Create from the wire tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0xA0 => Self::GetRequest,
            0xA1 => Self::GetNextRequest,
            0xA2 => Self::GetResponse,
            0xA3 => Self::SetRequest,
            0xA4 => Self::TrapV1,
            0xA5 => Self::GetBulkRequest,
            0xA6 => Self::InformRequest,
            0xA7 => Self::TrapV2,
            0xA8 => Self::Report,
            _ => return None,
        })
    }

    /// The wire tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Whether this PDU type may appear in a message of the given version.
    ///
    /// The v1 trap exists only in SNMPv1; GETBULK, INFORM, the v2 trap and
    /// REPORT exist only in SNMPv2c.
    pub fn valid_for(self, version: Version) -> bool {
        match self {
            Self::GetRequest | Self::GetNextRequest | Self::GetResponse | Self::SetRequest => true,
            Self::TrapV1 => version == Version::V1,
            Self::GetBulkRequest | Self::InformRequest | Self::TrapV2 | Self::Report => {
                version == Version::V2c
            }
        }
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::GetRequest => "GetRequest",
            Self::GetNextRequest => "GetNextRequest",
            Self::GetResponse => "GetResponse",
            Self::SetRequest => "SetRequest",
            Self::TrapV1 => "Trap",
            Self::GetBulkRequest => "GetBulkRequest",
            Self::InformRequest => "InformRequest",
            Self::TrapV2 => "SNMPv2Trap",
            Self::Report => "Report",
        };
        f.write_str(name)
    }
}

/// The shared PDU body: request-id, error-status, error-index and a
/// varbind list.
///
/// For GETBULK requests `error_status` carries non-repeaters and
/// `error_index` carries max-repetitions; use the named accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Pdu {
    /// PDU kind (any tag except the v1 trap).
    pub pdu_type: PduType,
    /// Correlates responses with requests.
    pub request_id: i32,
    /// Error status of a response; non-repeaters of a GETBULK.
    pub error_status: i32,
    /// 1-based index of the failing varbind; max-repetitions of a GETBULK.
    pub error_index: i32,
    /// Variable bindings, in wire order.
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    /// An empty PDU of the given kind.
    pub fn new(pdu_type: PduType) -> Self {
        Self {
            pdu_type,
            request_id: 0,
            error_status: 0,
            error_index: 0,
            varbinds: Vec::new(),
        }
    }

    /// A GET request for the given OIDs.
    pub fn get_request(request_id: i32, oids: &[Oid]) -> Self {
        Self {
            varbinds: oids.iter().cloned().map(VarBind::null).collect(),
            ..Self::new(PduType::GetRequest)
        }
        .with_request_id(request_id)
    }

    /// A GETNEXT request for the given OIDs.
    pub fn get_next_request(request_id: i32, oids: &[Oid]) -> Self {
        Self {
            varbinds: oids.iter().cloned().map(VarBind::null).collect(),
            ..Self::new(PduType::GetNextRequest)
        }
        .with_request_id(request_id)
    }

    /// A SET request carrying the given bindings.
    pub fn set_request(request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            varbinds,
            ..Self::new(PduType::SetRequest)
        }
        .with_request_id(request_id)
    }

    /// A GETBULK request (v2c only at the message layer).
    pub fn get_bulk(
        request_id: i32,
        non_repeaters: i32,
        max_repetitions: i32,
        oids: &[Oid],
    ) -> Self {
        Self {
            pdu_type: PduType::GetBulkRequest,
            request_id,
            error_status: non_repeaters,
            error_index: max_repetitions,
            varbinds: oids.iter().cloned().map(VarBind::null).collect(),
        }
    }

    fn with_request_id(mut self, request_id: i32) -> Self {
        self.request_id = request_id;
        self
    }

    /// Non-repeaters of a GETBULK request.
    pub fn non_repeaters(&self) -> i32 {
        self.error_status
    }

    /// Max-repetitions of a GETBULK request.
    pub fn max_repetitions(&self) -> i32 {
        self.error_index
    }

    /// Whether a response reports an error.
    pub fn is_error(&self) -> bool {
        self.error_status != 0
    }

    /// The error status, when it maps onto a known code.
    pub fn error_status(&self) -> Option<ErrorStatus> {
        ErrorStatus::from_i32(self.error_status)
    }

    /// A GetResponse echoing this PDU's request-id and bindings.
    pub fn to_response(&self) -> Self {
        Self {
            pdu_type: PduType::GetResponse,
            request_id: self.request_id,
            error_status: 0,
            error_index: 0,
            varbinds: self.varbinds.clone(),
        }
    }

    /// A GetResponse reporting an error against this PDU.
    pub fn to_error_response(&self, status: ErrorStatus, error_index: i32) -> Self {
        Self {
            error_status: status.as_i32(),
            error_index,
            ..self.to_response()
        }
    }

    /// Total BER-encoded length, computed without allocating.
    pub fn ber_encoded_len(&self) -> usize {
        let content = int_field_len(self.request_id)
            + int_field_len(self.error_status)
            + int_field_len(self.error_index)
            + varbind_list_encoded_len(&self.varbinds);
        1 + length_encoded_len(content) + content
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(self.pdu_type.tag(), |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_integer(self.error_index);
            buf.push_integer(self.error_status);
            buf.push_integer(self.request_id);
        });
    }

    /// Decode from BER, starting at the PDU tag.
    ///
    /// For non-GETBULK PDUs the error fields are range-checked
    /// (status 0..=18, index 0..=255); GETBULK reuses them as counts and
    /// is exempt.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let pdu_tag = decoder.read_tag()?;
        let pdu_type = PduType::from_tag(pdu_tag)
            .ok_or_else(|| Error::grammar(GrammarErrorKind::UnknownPduType(pdu_tag)))?;

        let len = decoder.read_length()?;
        let mut body = decoder.sub_decoder(len)?;

        let request_id = body.read_integer()?;
        let error_status = body.read_integer()?;
        let error_index = body.read_integer()?;

        if pdu_type != PduType::GetBulkRequest {
            if !(0..=18).contains(&error_status) {
                return Err(Error::grammar(GrammarErrorKind::ErrorStatusOutOfRange(
                    error_status,
                )));
            }
            if !(0..=255).contains(&error_index) {
                return Err(Error::grammar(GrammarErrorKind::ErrorIndexOutOfRange(
                    error_index,
                )));
            }
        }

        let varbinds = decode_varbind_list(&mut body)?;

        Ok(Pdu {
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds,
        })
    }
}

/// SNMPv1 generic trap codes (RFC 1157 Section 4.1.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum GenericTrap {
    ColdStart = 0,
    WarmStart = 1,
    LinkDown = 2,
    LinkUp = 3,
    AuthenticationFailure = 4,
    EgpNeighborLoss = 5,
    /// Vendor-defined; see the specific-trap field.
    EnterpriseSpecific = 6,
}

impl GenericTrap {
    /// Create from the wire value.
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            0 => Self::ColdStart,
            1 => Self::WarmStart,
            2 => Self::LinkDown,
            3 => Self::LinkUp,
            4 => Self::AuthenticationFailure,
            5 => Self::EgpNeighborLoss,
            6 => Self::EnterpriseSpecific,
            _ => return None,
        })
    }

    /// The wire value.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// SNMPv1 Trap PDU (tag 0xA4), with its own body layout.
#[derive(Debug, Clone, PartialEq)]
pub struct TrapV1Pdu {
    /// Enterprise OID of the entity generating the trap.
    pub enterprise: Oid,
    /// IP address of the generating agent.
    pub agent_addr: [u8; 4],
    /// Generic trap code, 0..=6.
    pub generic_trap: i32,
    /// Vendor trap code, meaningful when generic is enterpriseSpecific.
    pub specific_trap: i32,
    /// Agent uptime in hundredths of a second.
    pub timestamp: u32,
    /// Variable bindings.
    pub varbinds: Vec<VarBind>,
}

impl TrapV1Pdu {
    /// Create a v1 trap PDU.
    pub fn new(
        enterprise: Oid,
        agent_addr: [u8; 4],
        generic_trap: GenericTrap,
        specific_trap: i32,
        timestamp: u32,
    ) -> Self {
        Self {
            enterprise,
            agent_addr,
            generic_trap: generic_trap.as_i32(),
            specific_trap,
            timestamp,
            varbinds: Vec::new(),
        }
    }

    /// The generic trap code, when in range.
    pub fn generic_trap(&self) -> Option<GenericTrap> {
        GenericTrap::from_i32(self.generic_trap)
    }

    /// Whether this is an enterprise-specific trap.
    pub fn is_enterprise_specific(&self) -> bool {
        self.generic_trap == GenericTrap::EnterpriseSpecific.as_i32()
    }

    /// Total BER-encoded length, computed without allocating.
    pub fn ber_encoded_len(&self) -> usize {
        let content = self.enterprise.ber_encoded_len()
            + 6 // agent-addr: tag + len + 4 octets
            + int_field_len(self.generic_trap)
            + int_field_len(self.specific_trap)
            + {
                let n = unsigned32_content_len(self.timestamp);
                1 + length_encoded_len(n) + n
            }
            + varbind_list_encoded_len(&self.varbinds);
        1 + length_encoded_len(content) + content
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(tag::pdu::TRAP_V1, |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_unsigned32(tag::application::TIMETICKS, self.timestamp);
            buf.push_integer(self.specific_trap);
            buf.push_integer(self.generic_trap);
            buf.push_ip_address(self.agent_addr);
            buf.push_oid(&self.enterprise);
        });
    }

    /// Decode from BER, starting at the 0xA4 tag.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut body = decoder.read_constructed(tag::pdu::TRAP_V1)?;

        let enterprise = body.read_oid()?;
        let agent_addr = body.read_ip_address()?;

        let generic_trap = body.read_integer()?;
        if !(0..=6).contains(&generic_trap) {
            return Err(Error::grammar(GrammarErrorKind::GenericTrapOutOfRange(
                generic_trap,
            )));
        }

        let specific_trap = body.read_integer()?;
        let timestamp = body.read_unsigned32(tag::application::TIMETICKS)?;
        let varbinds = decode_varbind_list(&mut body)?;

        Ok(TrapV1Pdu {
            enterprise,
            agent_addr,
            generic_trap,
            specific_trap,
            timestamp,
            varbinds,
        })
    }
}

/// Encoded length of a plain INTEGER field.
#[inline]
fn int_field_len(value: i32) -> usize {
    let n = integer_content_len(value);
    1 + length_encoded_len(n) + n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::value::Value;

    fn round_trip(pdu: &Pdu) -> Pdu {
        let mut buf = EncodeBuf::new();
        pdu.encode(&mut buf);
        let mut decoder = Decoder::new(buf.finish());
        Pdu::decode(&mut decoder).unwrap()
    }

    #[test]
    fn pdu_type_tags() {
        for tag in 0xA0..=0xA8u8 {
            assert_eq!(PduType::from_tag(tag).unwrap().tag(), tag);
        }
        assert_eq!(PduType::from_tag(0xA9), None);
        assert_eq!(PduType::from_tag(0x30), None);
    }

    #[test]
    fn pdu_type_version_gate() {
        assert!(PduType::GetRequest.valid_for(Version::V1));
        assert!(PduType::GetRequest.valid_for(Version::V2c));
        assert!(PduType::TrapV1.valid_for(Version::V1));
        assert!(!PduType::TrapV1.valid_for(Version::V2c));
        assert!(!PduType::GetBulkRequest.valid_for(Version::V1));
        assert!(PduType::GetBulkRequest.valid_for(Version::V2c));
        assert!(!PduType::InformRequest.valid_for(Version::V1));
        assert!(!PduType::TrapV2.valid_for(Version::V1));
    }

    #[test]
    fn get_request_round_trip() {
        let pdu = Pdu::get_request(0x12345678, &[oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)]);
        let decoded = round_trip(&pdu);
        assert_eq!(decoded.pdu_type, PduType::GetRequest);
        assert_eq!(decoded.request_id, 0x12345678);
        assert_eq!(decoded.varbinds.len(), 1);
        assert_eq!(decoded.varbinds[0].value, Value::Null);
    }

    #[test]
    fn get_bulk_fields_exempt_from_range_checks() {
        // max-repetitions 1000 would be out of range as an error-index.
        let pdu = Pdu::get_bulk(7, 2, 1000, &[oid!(1, 3, 6, 1, 2, 1)]);
        let decoded = round_trip(&pdu);
        assert_eq!(decoded.non_repeaters(), 2);
        assert_eq!(decoded.max_repetitions(), 1000);
    }

    #[test]
    fn error_status_range_enforced() {
        let mut pdu = Pdu::get_request(1, &[oid!(1, 3, 6, 1)]);
        pdu.error_status = 19;

        let mut buf = EncodeBuf::new();
        pdu.encode(&mut buf);
        let mut decoder = Decoder::new(buf.finish());
        let err = Pdu::decode(&mut decoder).unwrap_err();
        assert!(matches!(
            err,
            Error::Grammar {
                kind: GrammarErrorKind::ErrorStatusOutOfRange(19)
            }
        ));
    }

    #[test]
    fn error_index_range_enforced() {
        let mut pdu = Pdu::get_request(1, &[oid!(1, 3, 6, 1)]);
        pdu.error_index = 256;

        let mut buf = EncodeBuf::new();
        pdu.encode(&mut buf);
        let mut decoder = Decoder::new(buf.finish());
        assert!(Pdu::decode(&mut decoder).is_err());
    }

    #[test]
    fn response_helpers() {
        let request = Pdu::set_request(
            99,
            vec![VarBind::new(oid!(1, 3, 6, 1, 4, 1, 1, 0), Value::Integer(5))],
        );

        let ok = request.to_response();
        assert_eq!(ok.pdu_type, PduType::GetResponse);
        assert_eq!(ok.request_id, 99);
        assert!(!ok.is_error());

        let bad = request.to_error_response(ErrorStatus::BadValue, 1);
        assert_eq!(bad.error_status, 3);
        assert_eq!(bad.error_index, 1);
        assert_eq!(bad.error_status(), Some(ErrorStatus::BadValue));
        assert!(bad.is_error());
    }

    #[test]
    fn pdu_encoded_len_matches_encoding() {
        let pdu = Pdu::get_bulk(
            i32::MAX,
            0,
            50,
            &[oid!(1, 3, 6, 1, 2, 1, 2), oid!(1, 3, 6, 1, 2, 1, 4)],
        );
        let mut buf = EncodeBuf::new();
        pdu.encode(&mut buf);
        assert_eq!(pdu.ber_encoded_len(), buf.len());
    }

    #[test]
    fn trap_v1_round_trip_preserves_all_fields() {
        let mut trap = TrapV1Pdu::new(
            oid!(1, 3, 6, 1, 4, 1, 12345),
            [192, 0, 2, 1],
            GenericTrap::EnterpriseSpecific,
            42,
            100_000,
        );
        trap.varbinds.push(VarBind::new(
            oid!(1, 3, 6, 1, 4, 1, 12345, 1, 0),
            Value::Integer(7),
        ));

        let mut buf = EncodeBuf::new();
        trap.encode(&mut buf);
        let mut decoder = Decoder::new(buf.finish());
        let decoded = TrapV1Pdu::decode(&mut decoder).unwrap();

        assert_eq!(decoded, trap);
        assert_eq!(decoded.generic_trap(), Some(GenericTrap::EnterpriseSpecific));
        assert!(decoded.is_enterprise_specific());
        assert_eq!(decoded.timestamp, 100_000);
    }

    #[test]
    fn trap_v1_generic_range_enforced() {
        let mut trap = TrapV1Pdu::new(
            oid!(1, 3, 6, 1, 4, 1, 12345),
            [10, 0, 0, 1],
            GenericTrap::ColdStart,
            0,
            1,
        );
        trap.generic_trap = 7;

        let mut buf = EncodeBuf::new();
        trap.encode(&mut buf);
        let mut decoder = Decoder::new(buf.finish());
        let err = TrapV1Pdu::decode(&mut decoder).unwrap_err();
        assert!(matches!(
            err,
            Error::Grammar {
                kind: GrammarErrorKind::GenericTrapOutOfRange(7)
            }
        ));
    }

    #[test]
    fn trap_v1_encoded_len_matches_encoding() {
        let mut trap = TrapV1Pdu::new(
            oid!(1, 3, 6, 1, 4, 1, 12345),
            [192, 0, 2, 1],
            GenericTrap::LinkDown,
            0,
            u32::MAX,
        );
        trap.varbinds
            .push(VarBind::new(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 1, 1), 1i32));

        let mut buf = EncodeBuf::new();
        trap.encode(&mut buf);
        assert_eq!(trap.ber_encoded_len(), buf.len());
    }
}
