//! BER tag constants for SNMP.
//!
//! Tag layout follows X.690 Section 8.1.2: bits 7-6 select the class,
//! bit 5 marks constructed encodings, bits 4-0 carry the tag number.

/// Constructed bit (bit 5).
pub const CONSTRUCTED: u8 = 0x20;

/// Universal-class tags.
pub mod universal {
    pub const BOOLEAN: u8 = 0x01;
    pub const INTEGER: u8 = 0x02;
    pub const OCTET_STRING: u8 = 0x04;
    /// Constructed OCTET STRING; rejected by this codec.
    pub const OCTET_STRING_CONSTRUCTED: u8 = 0x24;
    pub const NULL: u8 = 0x05;
    pub const OBJECT_IDENTIFIER: u8 = 0x06;
    pub const SEQUENCE: u8 = 0x30;
}

/// Application-class tags defined by the SNMP SMI.
pub mod application {
    pub const IP_ADDRESS: u8 = 0x40;
    pub const COUNTER32: u8 = 0x41;
    pub const GAUGE32: u8 = 0x42;
    pub const TIMETICKS: u8 = 0x43;
    pub const OPAQUE: u8 = 0x44;
    pub const COUNTER64: u8 = 0x46;
    /// IEEE-754 single-precision float (application 24, constructed bit form
    /// 0x78 as used on the wire by float-capable agents).
    pub const FLOAT: u8 = 0x78;
}

/// Context-class tags for the v2c exception markers.
pub mod context {
    pub const NO_SUCH_OBJECT: u8 = 0x80;
    pub const NO_SUCH_INSTANCE: u8 = 0x81;
    pub const END_OF_MIB_VIEW: u8 = 0x82;
}

/// PDU tags (context-specific, constructed).
pub mod pdu {
    pub const GET_REQUEST: u8 = 0xA0;
    pub const GET_NEXT_REQUEST: u8 = 0xA1;
    pub const GET_RESPONSE: u8 = 0xA2;
    pub const SET_REQUEST: u8 = 0xA3;
    pub const TRAP_V1: u8 = 0xA4;
    pub const GET_BULK_REQUEST: u8 = 0xA5;
    pub const INFORM_REQUEST: u8 = 0xA6;
    pub const TRAP_V2: u8 = 0xA7;
    pub const REPORT: u8 = 0xA8;
}

/// Whether a tag carries the constructed bit.
#[inline]
pub const fn is_constructed(tag: u8) -> bool {
    tag & CONSTRUCTED != 0
}

/// Whether a tag is one of the PDU tags 0xA0..=0xA8.
#[inline]
pub const fn is_pdu(tag: u8) -> bool {
    matches!(tag, 0xA0..=0xA8)
}
