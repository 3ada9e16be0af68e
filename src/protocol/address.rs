use std::net::Ipv4Addr;

use super::{ProtocolError, ADDRESS_HEX_LEN};

/// Decode a vendor address token into a dotted-quad IPv4 string.
///
/// The camera stores its address as hex with both the byte order and the
/// nibble order of each byte swapped. Reversing the whole token and then
/// reversing every 2-character group undoes both swaps, e.g.
/// `0A01A8C0` -> `0C8A10A0` -> `C0 A8 01 0A` -> `192.168.1.10`.
pub fn decode_address(encoded: &str) -> Result<String, ProtocolError> {
    let reversed: Vec<char> = encoded.chars().rev().collect();
    if reversed.len() < ADDRESS_HEX_LEN {
        return Err(ProtocolError::AddressTooShort { len: reversed.len() });
    }

    let swapped: String = reversed[..ADDRESS_HEX_LEN]
        .chunks(2)
        .flat_map(|pair| pair.iter().rev())
        .collect();

    let mut octets = [0u8; 4];
    hex::decode_to_slice(&swapped, &mut octets)?;

    Ok(Ipv4Addr::from(octets).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_vendor_token() {
        assert_eq!(decode_address("0A01A8C0").unwrap(), "192.168.1.10");
    }

    #[test]
    fn test_decode_uses_trailing_window() {
        // Only the last 8 characters carry the address
        assert_eq!(decode_address("0x0A01A8C0").unwrap(), "192.168.1.10");
        assert_eq!(decode_address("FFFF0A01A8C0").unwrap(), "192.168.1.10");
    }

    #[test]
    fn test_decode_lowercase_and_extremes() {
        assert_eq!(decode_address("0a01a8c0").unwrap(), "192.168.1.10");
        assert_eq!(decode_address("00000000").unwrap(), "0.0.0.0");
        assert_eq!(decode_address("FFFFFFFF").unwrap(), "255.255.255.255");
        // 10.0.0.1 encoded the way the camera does it
        assert_eq!(decode_address("0100000A").unwrap(), "10.0.0.1");
    }

    #[test]
    fn test_decode_always_yields_four_octets() {
        for token in ["12345678", "DEADBEEF", "80808080", "0F0F0F0F"] {
            let host = decode_address(token).unwrap();
            let parts: Vec<&str> = host.split('.').collect();
            assert_eq!(parts.len(), 4, "{host}");
            assert!(parts.iter().all(|p| p.parse::<u8>().is_ok()), "{host}");
            assert_eq!(decode_address(token).unwrap(), host);
        }
    }

    #[test]
    fn test_decode_rejects_short_token() {
        assert!(matches!(
            decode_address("A8C0"),
            Err(ProtocolError::AddressTooShort { len: 4 })
        ));
        assert!(matches!(
            decode_address(""),
            Err(ProtocolError::AddressTooShort { len: 0 })
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_hex() {
        assert!(matches!(
            decode_address("0A01A8CZ"),
            Err(ProtocolError::InvalidAddressHex(_))
        ));
    }
}
