//! # snmp-endpoint
//!
//! The wire-level core of an SNMP v1/v2c endpoint: a BER codec, the
//! SNMP message object model, and an asynchronous UDP runtime that can
//! act as an agent (UDP/161) or a manager (UDP/162).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::net::Ipv4Addr;
//! use snmp_endpoint::{Endpoint, Message, PduType, oid};
//!
//! #[tokio::main]
//! async fn main() -> snmp_endpoint::Result<()> {
//!     let agent = Endpoint::agent();
//!     agent.initialize(Ipv4Addr::UNSPECIFIED, 0).await?; // port 0 -> 161
//!
//!     let responder = agent.clone();
//!     agent.on_message(move |message, ip, port| {
//!         if message.pdu_type() != PduType::GetRequest {
//!             return;
//!         }
//!         let mut reply =
//!             Message::new(message.version(), message.community().to_vec(), PduType::GetResponse)
//!                 .expect("GetResponse is valid in both versions");
//!         reply.set_request_id(message.request_id());
//!         reply.push(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), "device-1");
//!         let _ = responder.send(&reply, ip, port);
//!     });
//!     agent.on_error(|error| eprintln!("receive error: {error}"));
//!
//!     agent.start();
//!     // ... run until shutdown, then:
//!     agent.stop();
//!     Ok(())
//! }
//! ```
//!
//! The codec layers are usable on their own: [`Message::decode`] /
//! [`Message::encode`] and the [`ber`] module do not touch the network.

pub mod ber;
pub mod endpoint;
pub mod error;
pub mod message;
pub mod oid;
pub mod pdu;
pub mod value;
pub mod varbind;
pub mod version;

pub(crate) mod util;

pub use endpoint::{Endpoint, ErrorHandler, MessageHandler, Role};
pub use error::{DecodeErrorKind, Error, ErrorStatus, GrammarErrorKind, Result};
pub use message::{Message, PduBody};
pub use oid::Oid;
pub use pdu::{GenericTrap, Pdu, PduType, TrapV1Pdu};
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;
