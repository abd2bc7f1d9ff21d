//! Movie identifiers and their external string form
//!
//! The document store keys every movie record by a UUIDv7 assigned at insert
//! time. Outside the store (RPC payloads, HTTP paths) the identifier travels
//! as 32 lowercase hexadecimal characters with no separators:
//!
//! ```rust
//! use movie_catalog::ids::MovieId;
//!
//! let id = MovieId::new();
//! let external = id.encode();
//! assert_eq!(external.len(), 32);
//! assert_eq!(MovieId::decode(&external).unwrap(), id);
//! ```
//!
//! Decoding is strict: anything other than exactly 32 ASCII hex digits is a
//! [`DecodeError`], which callers must treat as a malformed request and never
//! as a missing record.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// Length of the external identifier form.
pub const ENCODED_LEN: usize = 32;

/// Store-native identifier of a movie record.
///
/// UUIDv7 keeps newly inserted records roughly time-ordered in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MovieId(Uuid);

impl MovieId {
    /// Creates a fresh identifier for a record about to be inserted.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Encodes the identifier into its external form.
    #[must_use]
    pub fn encode(&self) -> String {
        self.0.simple().to_string()
    }

    /// Decodes an external identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when `external` is not exactly 32 ASCII hex digits.
    pub fn decode(external: &str) -> Result<Self, DecodeError> {
        if external.len() != ENCODED_LEN {
            return Err(DecodeError::InvalidLength {
                expected: ENCODED_LEN,
                actual: external.len(),
            });
        }

        if let Some(position) = external.bytes().position(|b| !b.is_ascii_hexdigit()) {
            return Err(DecodeError::InvalidCharacter { position });
        }

        Uuid::try_parse(external)
            .map(Self)
            .map_err(|_| DecodeError::InvalidCharacter { position: 0 })
    }
}

impl Default for MovieId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for MovieId {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl From<MovieId> for String {
    fn from(id: MovieId) -> Self {
        id.encode()
    }
}

/// Error returned when an external identifier is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The identifier has the wrong number of bytes.
    #[error("invalid identifier length: expected {expected}, got {actual}")]
    InvalidLength {
        /// The required length.
        expected: usize,
        /// The length received.
        actual: usize,
    },

    /// The identifier contains a byte outside the hex alphabet.
    #[error("invalid identifier character at position {position}")]
    InvalidCharacter {
        /// Byte offset of the first offending character.
        position: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_32_lowercase_hex() {
        let encoded = MovieId::new().encode();
        assert_eq!(encoded.len(), ENCODED_LEN);
        assert!(encoded
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }

    #[test]
    fn test_round_trip() {
        for _ in 0..64 {
            let id = MovieId::new();
            assert_eq!(MovieId::decode(&id.encode()).unwrap(), id);
        }
        let nil = MovieId(Uuid::nil());
        assert_eq!(MovieId::decode(&nil.encode()).unwrap(), nil);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let id = MovieId::new();
        assert_eq!(id.encode(), id.encode());
        assert_eq!(id.to_string(), id.encode());
    }

    #[test]
    fn test_decode_accepts_uppercase() {
        let id = MovieId::new();
        let upper = id.encode().to_ascii_uppercase();
        assert_eq!(MovieId::decode(&upper).unwrap(), id);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert_eq!(
            MovieId::decode(""),
            Err(DecodeError::InvalidLength {
                expected: 32,
                actual: 0
            })
        );
        assert!(matches!(
            MovieId::decode("abc123"),
            Err(DecodeError::InvalidLength { actual: 6, .. })
        ));
        // Mongo-style 24 character ids are not accepted
        assert!(MovieId::decode("64b7f0c2e4b0a1b2c3d4e5f6").is_err());
    }

    #[test]
    fn test_decode_rejects_hyphenated_uuid() {
        let hyphenated = Uuid::now_v7().hyphenated().to_string();
        assert!(matches!(
            MovieId::decode(&hyphenated),
            Err(DecodeError::InvalidLength { actual: 36, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_alphabet() {
        let bad = "0190c9a4e5b77c3a8f1d2e3f4a5b6czz";
        assert_eq!(
            MovieId::decode(bad),
            Err(DecodeError::InvalidCharacter { position: 30 })
        );
    }

    #[test]
    fn test_decode_multibyte_input_does_not_panic() {
        // 16 two-byte characters make 32 bytes
        let input = "é".repeat(16);
        assert_eq!(input.len(), 32);
        assert!(matches!(
            MovieId::decode(&input),
            Err(DecodeError::InvalidCharacter { position: 0 })
        ));
        assert!(MovieId::decode("🎬").is_err());
    }

    #[test]
    fn test_from_str() {
        let id = MovieId::new();
        let parsed: MovieId = id.encode().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-an-id".parse::<MovieId>().is_err());
    }
}
