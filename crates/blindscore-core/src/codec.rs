//! Text-safe framing for context and ciphertext blobs
//!
//! Standard base64 with padding. Surrounding ASCII whitespace is ignored on
//! decode so blobs survive being written as text files with a trailing
//! newline; anything else outside the alphabet is rejected.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::error::CoreResult;

pub fn encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Fails with [`CoreError::MalformedEncoding`](crate::CoreError::MalformedEncoding)
/// on characters outside the alphabet or incorrect padding
pub fn decode(text: &str) -> CoreResult<Vec<u8>> {
    Ok(BASE64.decode(text.trim_ascii())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use proptest::prelude::*;

    #[test]
    fn test_empty() {
        assert_eq!(encode(&[]), "");
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn test_known_vector() {
        assert_eq!(encode(b"blindscore"), "YmxpbmRzY29yZQ==");
        assert_eq!(decode("YmxpbmRzY29yZQ==").unwrap(), b"blindscore");
    }

    #[test]
    fn test_trailing_newline_tolerated() {
        assert_eq!(decode("YmxpbmRzY29yZQ==\n").unwrap(), b"blindscore");
    }

    #[test]
    fn test_bad_alphabet() {
        assert!(matches!(
            decode("YmxpbmRz*29yZQ=="),
            Err(CoreError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_bad_padding() {
        assert!(matches!(
            decode("YmxpbmRzY29yZQ="),
            Err(CoreError::MalformedEncoding(_))
        ));
        assert!(matches!(
            decode("YmxpbmRzY29yZQ"),
            Err(CoreError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_inner_whitespace_rejected() {
        assert!(decode("Ymxp bmRzY29yZQ==").is_err());
    }

    proptest! {
        /// Property: decode(encode(b)) == b
        #[test]
        fn prop_roundtrip(data in prop::collection::vec(any::<u8>(), 0..2048)) {
            let text = encode(&data);
            prop_assert_eq!(decode(&text).unwrap(), data);
        }
    }
}
