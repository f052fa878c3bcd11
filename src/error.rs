//! Error types for snmp-endpoint.
//!
//! The taxonomy separates wire-level failures ([`Error::Malformed`]) from
//! grammar-level failures ([`Error::Grammar`]): the former means the byte
//! stream violates BER itself, the latter means the BER was fine but the
//! SNMP message structure was not.

use std::io;
use std::net::SocketAddr;

use crate::pdu::PduType;
use crate::version::Version;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for all snmp-endpoint operations.
///
/// Decode and transport errors inside the receive loop are routed to the
/// registered error handler and never abort the loop. Constructor-time
/// errors (`Bind`, `UnsupportedForVersion`) are returned synchronously.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The byte stream violates BER encoding rules.
    #[error("malformed BER at offset {offset}: {kind}")]
    Malformed {
        offset: usize,
        kind: DecodeErrorKind,
    },

    /// The BER is valid but the SNMP message grammar is not honored.
    #[error("SNMP grammar violation: {kind}")]
    Grammar { kind: GrammarErrorKind },

    /// A (version, PDU type) pair forbidden by the protocol.
    #[error("{pdu_type} is not valid in {version}")]
    UnsupportedForVersion {
        version: Version,
        pdu_type: PduType,
    },

    /// The OS refused to bind the UDP socket.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// `send_to` failed or wrote fewer bytes than requested.
    #[error("failed to send to {target}: {source}")]
    Send {
        target: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// `recv_from` failed with a non-cancellation OS error.
    #[error("receive failed: {source}")]
    Receive {
        #[source]
        source: io::Error,
    },

    /// An operation was called before `initialize`.
    #[error("endpoint not initialized")]
    NotInitialized,

    /// An OID string could not be parsed.
    #[error("invalid OID: {0}")]
    InvalidOid(Box<str>),
}

impl Error {
    pub(crate) fn malformed(offset: usize, kind: DecodeErrorKind) -> Self {
        Error::Malformed { offset, kind }
    }

    pub(crate) fn grammar(kind: GrammarErrorKind) -> Self {
        Error::Grammar { kind }
    }
}

/// Detail of a BER decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    /// Expected a different tag at this position.
    UnexpectedTag { expected: u8, actual: u8 },
    /// A tag not used by SNMP; strict parsing rejects it.
    UnknownTag(u8),
    /// Input ended before the declared structure did.
    TruncatedData,
    /// Declared length exceeds the remaining input.
    InsufficientData { needed: usize, available: usize },
    /// Long-form length with zero octets.
    InvalidLength,
    /// Indefinite length (0x80) is not permitted in SNMP.
    IndefiniteLength,
    /// Long-form length with more octets than we support.
    LengthTooLong { octets: usize },
    /// Declared length exceeds the sanity maximum.
    LengthExceedsMax { length: usize, max: usize },
    /// Zero-length INTEGER content.
    ZeroLengthInteger,
    /// INTEGER content longer than the target type allows.
    IntegerTooLong { length: usize },
    /// An OID arc does not fit in 32 bits.
    ArcOverflow,
    /// OID has more arcs than RFC 2578 allows.
    OidTooLong { count: usize, max: usize },
    /// NULL (or an exception marker) with non-zero length.
    InvalidNull,
    /// BOOLEAN content is not exactly one octet.
    InvalidBooleanLength { length: usize },
    /// IpAddress content is not exactly four octets.
    InvalidIpAddressLength { length: usize },
    /// Float content is not exactly four octets.
    InvalidFloatLength { length: usize },
    /// Constructed OCTET STRING (0x24) is not supported.
    ConstructedOctetString,
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedTag { expected, actual } => {
                write!(f, "expected tag 0x{expected:02X}, got 0x{actual:02X}")
            }
            Self::UnknownTag(tag) => write!(f, "unknown tag 0x{tag:02X}"),
            Self::TruncatedData => write!(f, "unexpected end of data"),
            Self::InsufficientData { needed, available } => {
                write!(f, "need {needed} bytes but only {available} remaining")
            }
            Self::InvalidLength => write!(f, "invalid length encoding"),
            Self::IndefiniteLength => write!(f, "indefinite length not supported"),
            Self::LengthTooLong { octets } => {
                write!(f, "length encoding too long ({octets} octets)")
            }
            Self::LengthExceedsMax { length, max } => {
                write!(f, "length {length} exceeds maximum {max}")
            }
            Self::ZeroLengthInteger => write!(f, "zero-length integer"),
            Self::IntegerTooLong { length } => write!(f, "integer too long: {length} bytes"),
            Self::ArcOverflow => write!(f, "OID arc exceeds 32 bits"),
            Self::OidTooLong { count, max } => {
                write!(f, "OID has {count} arcs, exceeds maximum {max}")
            }
            Self::InvalidNull => write!(f, "NULL with non-zero length"),
            Self::InvalidBooleanLength { length } => {
                write!(f, "BOOLEAN must be 1 byte, got {length}")
            }
            Self::InvalidIpAddressLength { length } => {
                write!(f, "IP address must be 4 bytes, got {length}")
            }
            Self::InvalidFloatLength { length } => {
                write!(f, "float must be 4 bytes, got {length}")
            }
            Self::ConstructedOctetString => {
                write!(f, "constructed OCTET STRING (0x24) not supported")
            }
        }
    }
}

/// Detail of an SNMP grammar violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum GrammarErrorKind {
    /// Version integer is neither 0 (v1) nor 1 (v2c).
    UnknownVersion(i32),
    /// PDU tag outside 0xA0..=0xA8.
    UnknownPduType(u8),
    /// error-status outside 0..=18.
    ErrorStatusOutOfRange(i32),
    /// error-index outside 0..=255.
    ErrorIndexOutOfRange(i32),
    /// generic-trap outside 0..=6.
    GenericTrapOutOfRange(i32),
    /// Trap field access or mutation on a non-trap PDU.
    NotATrapPdu,
    /// A varbind SEQUENCE with elements beyond the (name, value) pair.
    VarBindTrailingElements,
}

impl std::fmt::Display for GrammarErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownVersion(v) => write!(f, "unknown SNMP version {v}"),
            Self::UnknownPduType(t) => write!(f, "unknown PDU type 0x{t:02X}"),
            Self::ErrorStatusOutOfRange(v) => write!(f, "error-status {v} out of range"),
            Self::ErrorIndexOutOfRange(v) => write!(f, "error-index {v} out of range"),
            Self::GenericTrapOutOfRange(v) => write!(f, "generic-trap {v} out of range"),
            Self::NotATrapPdu => write!(f, "not a v1 trap PDU"),
            Self::VarBindTrailingElements => {
                write!(f, "varbind sequence has trailing elements")
            }
        }
    }
}

/// SNMP protocol error status codes (RFC 1157 / RFC 3416).
///
/// Codes 0-5 are defined by SNMPv1; 6-18 were added by SNMPv2 for SET
/// processing. The wire form is the error-status INTEGER of a response PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorStatus {
    /// Operation completed successfully (0).
    NoError,
    /// Response would not fit in a single message (1).
    TooBig,
    /// Requested OID not found (2). SNMPv1 only; v2c uses exception values.
    NoSuchName,
    /// Invalid value in a SET request (3).
    BadValue,
    /// Attempted to SET a read-only object (4).
    ReadOnly,
    /// Unspecified error (5).
    GenErr,
    /// Access denied (6).
    NoAccess,
    /// SET value has the wrong ASN.1 type (7).
    WrongType,
    /// SET value has the wrong length (8).
    WrongLength,
    /// SET value uses the wrong encoding (9).
    WrongEncoding,
    /// SET value is out of range (10).
    WrongValue,
    /// Row creation not supported (11).
    NoCreation,
    /// Value inconsistent with other objects (12).
    InconsistentValue,
    /// Resource required for SET unavailable (13).
    ResourceUnavailable,
    /// SET commit phase failed (14).
    CommitFailed,
    /// SET undo phase failed (15).
    UndoFailed,
    /// Access denied by access control (16).
    AuthorizationError,
    /// Object does not support modification (17).
    NotWritable,
    /// Named object cannot be created (18).
    InconsistentName,
}

impl ErrorStatus {
    /// Create from the wire status code. Returns `None` for codes outside 0..=18.
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            16 => Self::AuthorizationError,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            _ => return None,
        })
    }

    /// The wire status code.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::AuthorizationError => 16,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NoError => "noError",
            Self::TooBig => "tooBig",
            Self::NoSuchName => "noSuchName",
            Self::BadValue => "badValue",
            Self::ReadOnly => "readOnly",
            Self::GenErr => "genErr",
            Self::NoAccess => "noAccess",
            Self::WrongType => "wrongType",
            Self::WrongLength => "wrongLength",
            Self::WrongEncoding => "wrongEncoding",
            Self::WrongValue => "wrongValue",
            Self::NoCreation => "noCreation",
            Self::InconsistentValue => "inconsistentValue",
            Self::ResourceUnavailable => "resourceUnavailable",
            Self::CommitFailed => "commitFailed",
            Self::UndoFailed => "undoFailed",
            Self::AuthorizationError => "authorizationError",
            Self::NotWritable => "notWritable",
            Self::InconsistentName => "inconsistentName",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_wire_codes_round_trip() {
        for code in 0..=18 {
            let status = ErrorStatus::from_i32(code).unwrap();
            assert_eq!(status.as_i32(), code);
        }
        assert_eq!(ErrorStatus::from_i32(19), None);
        assert_eq!(ErrorStatus::from_i32(-1), None);
    }

    #[test]
    fn error_status_display_names() {
        assert_eq!(ErrorStatus::NoError.to_string(), "noError");
        assert_eq!(ErrorStatus::BadValue.to_string(), "badValue");
        assert_eq!(ErrorStatus::InconsistentName.to_string(), "inconsistentName");
    }
}
