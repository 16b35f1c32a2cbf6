// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Crate-private utilities.

/// Converts a nibble into an ASCII hex character. Lower-case hex digits
/// are used. The passed value must be less than 16.
pub fn nibble_to_ascii_hex_digit(nibble: u8) -> u8 {
    debug_assert!(nibble < 16);
    if nibble < 10 {
        b'0' + nibble
    } else {
        b'a' + nibble - 10
    }
}

/// Converts an ASCII hexadecimal digit to its numeric value. This
/// returns [`None`] if `digit` is not one of the ASCII characters
/// `0` through `9`, `A` through `F`, or `a` through `f`.
pub fn ascii_hex_digit_to_nibble(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        _ => None,
    }
}

/// Decodes a string of hexadecimal digits into octets. Returns [`None`]
/// if a non-hex character is present or the number of digits is odd.
pub fn decode_hex(text: &str) -> Option<Vec<u8>> {
    let digits = text.as_bytes();
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks_exact(2)
        .map(|pair| {
            let high = ascii_hex_digit_to_nibble(pair[0])?;
            let low = ascii_hex_digit_to_nibble(pair[1])?;
            Some(high << 4 | low)
        })
        .collect()
}

/// Encodes octets as upper-case hexadecimal digits, as used by the
/// presentation format of digest fields.
pub fn encode_hex(octets: &[u8]) -> String {
    let mut text = String::with_capacity(octets.len() * 2);
    for octet in octets {
        text.push(nibble_to_ascii_hex_digit(octet >> 4).to_ascii_uppercase() as char);
        text.push(nibble_to_ascii_hex_digit(octet & 0xf).to_ascii_uppercase() as char);
    }
    text
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nibble_conversions_agree() {
        for nibble in 0..16 {
            let digit = nibble_to_ascii_hex_digit(nibble);
            assert_eq!(ascii_hex_digit_to_nibble(digit), Some(nibble));
        }
        assert_eq!(ascii_hex_digit_to_nibble(b'g'), None);
    }

    #[test]
    fn hex_decoding_works() {
        assert_eq!(decode_hex("00fFa1"), Some(vec![0x00, 0xff, 0xa1]));
        assert_eq!(decode_hex("abc"), None);
        assert_eq!(decode_hex("zz"), None);
    }

    #[test]
    fn hex_encoding_is_upper_case() {
        assert_eq!(encode_hex(&[0x2b, 0x0f]), "2B0F");
    }
}
