//! Known-answer and scenario tests for the message wire format.

use bytes::Bytes;
use snmp_endpoint::{
    ErrorStatus, GenericTrap, Message, Pdu, PduType, TrapV1Pdu, Value, VarBind, Version, oid,
};

/// A v2c GetRequest serializes to the documented header bytes and
/// survives a round trip.
#[test]
fn get_request_round_trip() {
    let mut msg = Message::new(Version::V2c, "public", PduType::GetRequest).unwrap();
    msg.set_request_id(0x12345678);
    msg.push(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::Null);

    let bytes = msg.encode().unwrap();

    // SEQUENCE, version INTEGER 1, community "public", GetRequest tag.
    assert_eq!(bytes[0], 0x30);
    assert_eq!(&bytes[2..5], &[0x02, 0x01, 0x01]);
    assert_eq!(&bytes[5..13], &[0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c']);
    assert_eq!(bytes[13], 0xA0);

    let parsed = Message::decode(bytes).unwrap();
    assert_eq!(parsed.pdu_type(), PduType::GetRequest);
    assert_eq!(parsed.community(), b"public");
    assert_eq!(parsed.community_utf8(), Some("public"));
    assert_eq!(parsed.request_id(), 0x12345678);
    assert_eq!(parsed.varbinds().len(), 1);
    assert_eq!(parsed.varbinds()[0].oid, oid!(1, 3, 6, 1, 2, 1, 1, 5, 0));
}

/// Building the response to the request above: same request-id, no
/// error, one OctetString binding; the computed size is exact.
#[test]
fn get_response_construction() {
    let mut reply = Message::new(Version::V2c, "public", PduType::GetResponse).unwrap();
    reply.set_request_id(0x12345678);
    reply.set_error(ErrorStatus::NoError, 0);
    reply.push(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), "device-1");

    let bytes = reply.encode().unwrap();
    assert_eq!(reply.encoded_len(), bytes.len());

    let parsed = Message::decode(bytes).unwrap();
    assert_eq!(parsed.request_id(), 0x12345678);
    assert_eq!(parsed.error_status(), 0);
    assert_eq!(parsed.varbinds()[0].value.as_str(), Some("device-1"));
}

/// A SET with a type the object does not accept parses cleanly; the
/// rejection is expressed by the responder as badValue at index 1.
#[test]
fn set_request_wrong_type_flow() {
    let set = Message::from_pdu(
        Version::V2c,
        "private",
        Pdu::set_request(
            7,
            vec![VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::Integer(99))],
        ),
    )
    .unwrap();

    let received = Message::decode(set.encode().unwrap()).unwrap();
    assert_eq!(received.pdu_type(), PduType::SetRequest);
    assert_eq!(received.varbinds()[0].value, Value::Integer(99));

    let reply_pdu = received
        .pdu()
        .unwrap()
        .to_error_response(ErrorStatus::BadValue, 1);
    let reply = Message::from_pdu(Version::V2c, received.community().to_vec(), reply_pdu).unwrap();

    let parsed = Message::decode(reply.encode().unwrap()).unwrap();
    assert_eq!(parsed.error_status(), 3);
    assert_eq!(parsed.error_index(), 1);
    assert_eq!(parsed.request_id(), 7);
    assert_eq!(parsed.varbinds()[0].value, Value::Integer(99));
}

/// A GETNEXT that walked past the last OID: the response carries an
/// endOfMibView marker and noSuchName at index 1.
#[test]
fn get_next_at_end_of_mib() {
    let last_known = oid!(1, 3, 6, 1, 4, 1, 12345, 99, 0);
    let request = Message::from_pdu(
        Version::V2c,
        "public",
        Pdu::get_next_request(8, std::slice::from_ref(&last_known)),
    )
    .unwrap();
    let received = Message::decode(request.encode().unwrap()).unwrap();

    let mut reply_pdu = received.pdu().unwrap().to_response();
    reply_pdu.varbinds = vec![VarBind::new(last_known.clone(), Value::EndOfMibView)];
    let reply_pdu = reply_pdu.to_error_response(ErrorStatus::NoSuchName, 1);
    let reply = Message::from_pdu(Version::V2c, "public", reply_pdu).unwrap();

    let parsed = Message::decode(reply.encode().unwrap()).unwrap();
    assert_eq!(parsed.error_status(), 2);
    assert_eq!(parsed.error_index(), 1);
    assert_eq!(parsed.varbinds()[0].value, Value::EndOfMibView);
    assert_eq!(parsed.varbinds()[0].value.tag(), 0x82);
}

/// The malformed datagram from the boundary suite: an OctetString that
/// declares 255 content bytes but carries none.
#[test]
fn truncated_octet_string_is_malformed() {
    let data = Bytes::from_static(&[0x30, 0x05, 0x02, 0x01, 0x00, 0x04, 0xFF]);
    let err = Message::decode(data).unwrap_err();
    assert!(matches!(err, snmp_endpoint::Error::Malformed { .. }));
}

/// A v1 trap round-trips all six header fields plus its bindings.
#[test]
fn trap_v1_round_trip() {
    let mut trap = TrapV1Pdu::new(
        oid!(1, 3, 6, 1, 4, 1, 12345),
        [192, 0, 2, 1],
        GenericTrap::EnterpriseSpecific,
        42,
        100_000,
    );
    trap.varbinds.push(VarBind::new(
        oid!(1, 3, 6, 1, 4, 1, 12345, 1, 0),
        Value::Counter32(5),
    ));
    let msg = Message::trap_v1("public", trap);

    let bytes = msg.encode().unwrap();
    assert_eq!(msg.encoded_len(), bytes.len());

    let parsed = Message::decode(bytes).unwrap();
    assert_eq!(parsed.version(), Version::V1);
    assert_eq!(parsed.pdu_type(), PduType::TrapV1);

    let trap = parsed.trap().unwrap();
    assert_eq!(trap.enterprise, oid!(1, 3, 6, 1, 4, 1, 12345));
    assert_eq!(trap.agent_addr, [192, 0, 2, 1]);
    assert_eq!(trap.generic_trap, 6);
    assert_eq!(trap.specific_trap, 42);
    assert_eq!(trap.timestamp, 100_000);
    assert_eq!(trap.varbinds.len(), 1);
}

/// A v2c trap message uses the standard PDU layout under tag 0xA7.
#[test]
fn trap_v2_uses_standard_layout() {
    let mut msg = Message::new(Version::V2c, "public", PduType::TrapV2).unwrap();
    msg.set_request_id(1);
    msg.push(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(100_000));
    msg.push(
        oid!(1, 3, 6, 1, 6, 3, 1, 1, 4, 1, 0),
        Value::ObjectIdentifier(oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 1)),
    );

    let parsed = Message::decode(msg.encode().unwrap()).unwrap();
    assert_eq!(parsed.pdu_type(), PduType::TrapV2);
    assert_eq!(parsed.varbinds().len(), 2);
    assert!(parsed.trap().is_none());
}

/// GETBULK reinterprets the error fields as counts; both survive the
/// wire unchecked by the error-field ranges.
#[test]
fn get_bulk_round_trip() {
    let msg = Message::from_pdu(
        Version::V2c,
        "public",
        Pdu::get_bulk(99, 1, 300, &[oid!(1, 3, 6, 1, 2, 1, 1), oid!(1, 3, 6, 1, 2, 1, 2)]),
    )
    .unwrap();

    let parsed = Message::decode(msg.encode().unwrap()).unwrap();
    let pdu = parsed.pdu().unwrap();
    assert_eq!(pdu.non_repeaters(), 1);
    assert_eq!(pdu.max_repetitions(), 300);
    assert_eq!(pdu.varbinds.len(), 2);
}

/// Long messages cross the 127-byte short-form boundary in the outer
/// sequence; sizes stay exact.
#[test]
fn long_message_uses_long_form_length() {
    let mut msg = Message::new(Version::V2c, "public", PduType::GetResponse).unwrap();
    msg.set_request_id(1);
    msg.push(
        oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
        Value::OctetString(Bytes::from(vec![b'x'; 300])),
    );

    let bytes = msg.encode().unwrap();
    assert_eq!(msg.encoded_len(), bytes.len());
    // Outer SEQUENCE must use the two-byte long form: 0x30 0x82 hi lo.
    assert_eq!(bytes[1], 0x82);

    let parsed = Message::decode(bytes).unwrap();
    assert_eq!(parsed.varbinds()[0].value.as_bytes().unwrap().len(), 300);
}
