//! Identifier codec.
//!
//! Converts between human-facing v4 UUID strings and the `u128` keys used in
//! records and address derivation, and between strings and the zero-padded
//! fixed-width byte fields of the record layouts.

use crate::error::{CoreError, Result};
use uuid::{Uuid, Variant, Version};

/// Parse a v4 UUID string into its 128-bit key.
///
/// The 16 UUID bytes are interpreted as a big-endian integer. Strings that
/// are not syntactically valid UUIDs, or whose version nibble is not 4, are
/// rejected.
///
/// # Example
///
/// ```
/// use hapi_core::codec::{key_to_uuid, uuid_to_key};
///
/// let key = uuid_to_key("9b1deb4d-3b7d-4bad-9bdd-2b0d7b3dcb6d").unwrap();
/// assert_eq!(key_to_uuid(key), "9b1deb4d-3b7d-4bad-9bdd-2b0d7b3dcb6d");
/// ```
pub fn uuid_to_key(input: &str) -> Result<u128> {
    let uuid = Uuid::parse_str(input)
        .map_err(|err| CoreError::InvalidUuid(format!("{input}: {err}")))?;

    check_uuid(&uuid).map_err(|reason| CoreError::InvalidUuid(format!("{input}: {reason}")))?;

    Ok(uuid.as_u128())
}

/// Check that a raw key is a v4 RFC 4122 UUID.
///
/// Keys built directly from integers bypass string parsing; this applies the
/// same rule to them.
pub fn validate_key(key: u128) -> Result<u128> {
    let uuid = Uuid::from_u128(key);
    check_uuid(&uuid).map_err(|reason| CoreError::InvalidUuid(format!("{uuid}: {reason}")))?;
    Ok(key)
}

fn check_uuid(uuid: &Uuid) -> std::result::Result<(), String> {
    if uuid.get_version() != Some(Version::Random) {
        return Err(format!(
            "expected version 4, got version {}",
            uuid.get_version_num()
        ));
    }
    if uuid.get_variant() != Variant::RFC4122 {
        return Err(format!("expected RFC 4122 variant, got {:?}", uuid.get_variant()));
    }
    Ok(())
}

/// Format a 128-bit key as a lowercase hyphenated UUID string.
pub fn key_to_uuid(key: u128) -> String {
    Uuid::from_u128(key).hyphenated().to_string()
}

/// Right-pad `buf` with zero bytes to exactly `n` bytes.
pub fn pad_bytes(buf: &[u8], n: usize) -> Result<Vec<u8>> {
    if buf.len() > n {
        return Err(CoreError::BufferTooSmall {
            len: buf.len(),
            capacity: n,
        });
    }

    let mut padded = Vec::with_capacity(n);
    padded.extend_from_slice(buf);
    padded.resize(n, 0);
    Ok(padded)
}

/// Encode a string as a zero-padded field of exactly `n` bytes.
pub fn string_to_bytes(s: &str, n: usize) -> Result<Vec<u8>> {
    pad_bytes(s.as_bytes(), n)
}

/// Zero-pad `buf` into a fixed-size array.
pub fn to_fixed<const N: usize>(buf: &[u8]) -> Result<[u8; N]> {
    if buf.len() > N {
        return Err(CoreError::BufferTooSmall {
            len: buf.len(),
            capacity: N,
        });
    }

    let mut fixed = [0u8; N];
    fixed[..buf.len()].copy_from_slice(buf);
    Ok(fixed)
}

/// Decode a zero-padded field back into a string (up to the first NUL byte).
pub fn bytes_to_string(buf: &[u8]) -> Result<String> {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());

    String::from_utf8(buf[..end].to_vec())
        .map_err(|_| CoreError::InvalidData("field is not valid UTF-8".to_string()))
}

/// Parse a 32-byte key from hex, with or without a `0x` prefix.
pub fn parse_key_hex(s: &str) -> Result<[u8; 32]> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).map_err(|_| CoreError::InvalidHex)?;

    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CoreError::InvalidData(format!("expected 32 bytes, got {}", bytes.len())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const V4: &str = "9b1deb4d-3b7d-4bad-9bdd-2b0d7b3dcb6d";

    #[test]
    fn test_uuid_roundtrip() {
        let samples = [
            V4,
            "00000000-0000-4000-8000-000000000000",
            "ffffffff-ffff-4fff-bfff-ffffffffffff",
            "0a8a5ac6-0c3b-4e1e-9b54-55a4b1f2c0de",
        ];

        for sample in samples {
            let key = uuid_to_key(sample).unwrap();
            assert_eq!(key_to_uuid(key), sample);
        }
    }

    #[test]
    fn test_uuid_key_is_big_endian() {
        let key = uuid_to_key("01020304-0506-4708-890a-0b0c0d0e0f10").unwrap();
        assert_eq!(
            key.to_be_bytes(),
            [1, 2, 3, 4, 5, 6, 0x47, 8, 0x89, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10]
        );
    }

    #[test]
    fn test_key_to_uuid_zero_pads() {
        assert_eq!(key_to_uuid(1), "00000000-0000-0000-0000-000000000001");
    }

    #[test]
    fn test_uuid_rejects_malformed() {
        for input in ["", "not-a-uuid", "9b1deb4d-3b7d-4bad-9bdd", "9b1deb4d-3b7d-4bad-9bdd-2b0d7b3dcb6dff"] {
            assert!(
                matches!(uuid_to_key(input), Err(CoreError::InvalidUuid(_))),
                "expected InvalidUuid for {input:?}"
            );
        }
    }

    #[test]
    fn test_uuid_rejects_other_versions() {
        // v1 (time-based) and v7 identifiers are well-formed but not accepted
        let v1 = "c232ab00-9414-11ec-b3c8-9e6bdeced846";
        let v7 = "017f22e2-79b0-7cc3-98c4-dc0c0c07398f";

        assert!(matches!(uuid_to_key(v1), Err(CoreError::InvalidUuid(_))));
        assert!(matches!(uuid_to_key(v7), Err(CoreError::InvalidUuid(_))));
    }

    #[test]
    fn test_validate_key() {
        let key = uuid_to_key(V4).unwrap();
        assert_eq!(validate_key(key), Ok(key));

        // version nibble 1
        assert!(matches!(
            validate_key(0x9b1deb4d_3b7d_1bad_9bdd_2b0d7b3dcb6d),
            Err(CoreError::InvalidUuid(_))
        ));
        // version 4 with the NCS variant
        assert!(matches!(
            validate_key(0x9b1deb4d_3b7d_4bad_1bdd_2b0d7b3dcb6d),
            Err(CoreError::InvalidUuid(_))
        ));
        assert!(matches!(validate_key(0), Err(CoreError::InvalidUuid(_))));
    }

    #[test]
    fn test_pad_bytes() {
        assert_eq!(pad_bytes(b"ab", 4).unwrap(), vec![b'a', b'b', 0, 0]);
        assert_eq!(pad_bytes(b"abcd", 4).unwrap(), b"abcd".to_vec());
        assert_eq!(
            pad_bytes(b"abcde", 4),
            Err(CoreError::BufferTooSmall {
                len: 5,
                capacity: 4
            })
        );
    }

    #[test]
    fn test_string_field_roundtrip() {
        let field = string_to_bytes("ethereum", 32).unwrap();
        assert_eq!(field.len(), 32);
        assert_eq!(bytes_to_string(&field).unwrap(), "ethereum");

        let full: [u8; 4] = to_fixed(b"full").unwrap();
        assert_eq!(bytes_to_string(&full).unwrap(), "full");
    }

    #[test]
    fn test_bytes_to_string_rejects_invalid_utf8() {
        assert!(bytes_to_string(&[0xff, 0xfe, 0]).is_err());
    }

    #[test]
    fn test_parse_key_hex() {
        let key = parse_key_hex(&format!("0x{}", "11".repeat(32))).unwrap();
        assert_eq!(key, [0x11; 32]);
        assert!(parse_key_hex("0x1234").is_err());
        assert_eq!(parse_key_hex("zz"), Err(CoreError::InvalidHex));
    }
}
