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

//! Reverse-lookup names under `in-addr.arpa.` and `ip6.arpa.`.

use std::net::IpAddr;

use super::{Label, Name};
use crate::util::nibble_to_ascii_hex_digit;

/// Returns the reverse-lookup domain name for an IP address.
///
/// IPv4 addresses map into `in-addr.arpa.` as described in
/// [RFC 1035 § 3.5], with the octets in reverse order. IPv6 addresses
/// map into `ip6.arpa.` as described in [RFC 3596 § 2.5], with one
/// label per nibble, least significant nibble first.
///
/// ```
/// use std::net::IpAddr;
/// use cairn::name::reverse_name;
///
/// let addr: IpAddr = "192.0.2.1".parse().unwrap();
/// assert_eq!(reverse_name(addr).to_string(), "1.2.0.192.in-addr.arpa.");
/// ```
///
/// [RFC 1035 § 3.5]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.5
/// [RFC 3596 § 2.5]: https://datatracker.ietf.org/doc/html/rfc3596#section-2.5
pub fn reverse_name(addr: IpAddr) -> Name {
    let mut labels = Vec::new();
    match addr {
        IpAddr::V4(v4) => {
            for octet in v4.octets().iter().rev() {
                labels.push(Label::from_unchecked(octet.to_string().as_bytes()));
            }
            labels.push(Label::from_unchecked(b"in-addr"));
        }
        IpAddr::V6(v6) => {
            for octet in v6.octets().iter().rev() {
                labels.push(Label::from_unchecked(&[nibble_to_ascii_hex_digit(octet & 0xf)]));
                labels.push(Label::from_unchecked(&[nibble_to_ascii_hex_digit(octet >> 4)]));
            }
            labels.push(Label::from_unchecked(b"ip6"));
        }
    }
    labels.push(Label::from_unchecked(b"arpa"));

    // At most 34 labels of at most 7 octets each, so this is always
    // within the wire length limit.
    Name { labels }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_reverse_name_works() {
        let addr: IpAddr = "127.0.0.1".parse().unwrap();
        assert_eq!(
            reverse_name(addr),
            "1.0.0.127.in-addr.arpa.".parse().unwrap()
        );
    }

    #[test]
    fn ipv6_reverse_name_works() {
        // The example from RFC 3596 § 2.5.
        let addr: IpAddr = "4321:0:1:2:3:4:567:89ab".parse().unwrap();
        assert_eq!(
            reverse_name(addr).to_string(),
            "b.a.9.8.7.6.5.0.4.0.0.0.3.0.0.0.2.0.0.0.1.0.0.0.0.0.0.0.1.2.3.4.ip6.arpa.",
        );
    }
}
