use super::*;
use serde::Deserialize;
use std::io::Cursor;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Ping {
    n: u32,
}

#[test]
fn encode_returns_json_without_framing() {
    let encoded = encode(&Ping { n: 1 }).expect("encode failed");
    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert!(json_str.starts_with('{'), "should be JSON object: {json_str}");
    assert!(!json_str.contains('\n'));
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";
    let mut buffer = Vec::new();
    write_message(&mut buffer, original).await.expect("write failed");

    assert_eq!(buffer, b"hello world\n");

    let mut cursor = Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");
    assert_eq!(read_back, original);
}

#[tokio::test]
async fn write_message_adds_newline_delimiter() {
    let data = b"test data";
    let mut buffer = Vec::new();
    write_message(&mut buffer, data).await.expect("write failed");

    assert_eq!(buffer.last(), Some(&b'\n'));
    assert_eq!(&buffer[..buffer.len() - 1], data);
}

#[tokio::test]
async fn read_message_strips_trailing_cr() {
    let mut cursor = Cursor::new(b"abc\r\n".to_vec());
    let read_back = read_message(&mut cursor).await.expect("read failed");
    assert_eq!(read_back, b"abc");
}

#[tokio::test]
async fn read_message_on_empty_stream_reports_connection_closed() {
    let mut cursor = Cursor::new(Vec::new());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn write_json_then_read_json_roundtrips_a_value() {
    let mut buffer = Vec::new();
    write_json(&mut buffer, &Ping { n: 42 }).await.expect("write failed");

    let mut cursor = Cursor::new(buffer);
    let value: Ping = read_json(&mut cursor).await.expect("read failed");
    assert_eq!(value, Ping { n: 42 });
}

#[tokio::test]
async fn two_messages_in_sequence_are_each_read_independently() {
    let mut buffer = Vec::new();
    write_json(&mut buffer, &Ping { n: 1 }).await.unwrap();
    write_json(&mut buffer, &Ping { n: 2 }).await.unwrap();

    let mut cursor = Cursor::new(buffer);
    let first: Ping = read_json(&mut cursor).await.unwrap();
    let second: Ping = read_json(&mut cursor).await.unwrap();
    assert_eq!(first, Ping { n: 1 });
    assert_eq!(second, Ping { n: 2 });
}

#[test]
fn decode_reports_malformed_json() {
    let err = decode::<Ping>(b"not json").unwrap_err();
    assert!(matches!(err, ProtocolError::Json(_)));
}
