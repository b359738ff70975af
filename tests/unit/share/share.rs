use super::*;

#[test]
fn state_survives_encoding() {
    let state = r#"{"code":"export default () => <div tw=\"bg-red-500\" />","width":1200}"#;
    let encoded = encode_share_state(state).unwrap();
    assert!(
        encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    );
    assert_eq!(decode_share_state(&encoded).unwrap(), state);
}

#[test]
fn repetitive_state_shrinks() {
    let state = "<div>hello</div>".repeat(200);
    let encoded = encode_share_state(&state).unwrap();
    assert!(encoded.len() < state.len() / 4);
}

#[test]
fn garbage_is_a_validation_error() {
    let err = decode_share_state("!!not base64!!").unwrap_err();
    assert!(matches!(err, RastreeError::Validation(_)));

    let not_zstd = URL_SAFE_NO_PAD.encode(b"plain bytes");
    let err = decode_share_state(&not_zstd).unwrap_err();
    assert!(err.to_string().contains("decompress share state"));
}

#[test]
fn oversized_state_is_rejected() {
    let big = "a".repeat(MAX_SHARE_STATE_BYTES as usize + 10);
    let encoded = encode_share_state(&big).unwrap();
    let err = decode_share_state(&encoded).unwrap_err();
    assert!(err.to_string().contains("exceeds"));
}
