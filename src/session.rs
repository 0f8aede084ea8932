//! Encoding and decoding of session identifiers for transport in the session cookie.
//!
//! The raw session identifier is stored on the user record. The client only
//! ever sees the base64 form of it, the session token.

use base64::{Engine, engine::general_purpose::STANDARD};
use uuid::Uuid;

use crate::Error;

/// Encode a raw session identifier as a session token.
pub fn encode_session_id(raw_session_id: &str) -> String {
    STANDARD.encode(raw_session_id)
}

/// Decode a session token back into the raw session identifier.
///
/// # Errors
///
/// Returns [Error::InvalidSessionToken] if `session_token` is not valid
/// base64 or does not decode to UTF-8 text.
pub fn decode_session_id(session_token: &str) -> Result<String, Error> {
    let bytes = STANDARD
        .decode(session_token)
        .map_err(|error| Error::InvalidSessionToken(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::InvalidSessionToken(error.to_string()))
}

/// Create a new, random session identifier.
pub fn generate_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod session_codec_tests {
    use crate::Error;

    use super::{decode_session_id, encode_session_id, generate_session_id};

    #[test]
    fn decode_reverses_encode() {
        for raw in ["test_session_123", "", "ünïcødé session", "a+b/c=="] {
            let token = encode_session_id(raw);

            assert_eq!(decode_session_id(&token), Ok(raw.to_owned()));
        }
    }

    #[test]
    fn encodes_with_standard_alphabet() {
        assert_eq!(encode_session_id("test_session_123"), "dGVzdF9zZXNzaW9uXzEyMw==");
    }

    #[test]
    fn decode_fails_on_invalid_base64() {
        let result = decode_session_id("not base64!");

        assert!(
            matches!(result, Err(Error::InvalidSessionToken(_))),
            "want invalid session token error, got {result:?}"
        );
    }

    #[test]
    fn decode_fails_on_non_utf8_payload() {
        // 0xff 0xfe is not valid UTF-8.
        let result = decode_session_id("//4=");

        assert!(matches!(result, Err(Error::InvalidSessionToken(_))));
    }

    #[test]
    fn generated_ids_are_unique() {
        let first = generate_session_id();
        let second = generate_session_id();

        assert!(!first.is_empty());
        assert_ne!(first, second);
    }
}
