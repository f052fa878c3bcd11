//! BER (Basic Encoding Rules) codec for SNMP.
//!
//! Decoding follows X.690 with net-snmp-style tolerance for non-minimal
//! integer and length encodings; encoding is always minimal. Tag dispatch
//! is strict: tags outside the SNMP-used set are rejected.

mod decode;
mod encode;
mod length;
pub mod tag;

pub use decode::Decoder;
pub use encode::{
    EncodeBuf, integer_content_len, unsigned32_content_len, unsigned64_content_len,
};
pub use length::{MAX_LENGTH, decode_length, encode_length, length_encoded_len};
