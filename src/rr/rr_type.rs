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

//! Provides the [`Type`] structure for DNS RR types.

use std::fmt;
use std::str::FromStr;


////////////////////////////////////////////////////////////////////////
// RR TYPES                                                           //
////////////////////////////////////////////////////////////////////////

/// Represents the RR type of a DNS record.
///
/// An RR type is represented on the wire as an unsigned 16-bit integer.
/// Hence this is basically a wrapper around `u16` with nice
/// [`Debug`](fmt::Debug), [`Display`](fmt::Display), and [`FromStr`]
/// implementations for working with the common textual representations
/// of RR types. In addition, constants for common RR types (e.g.
/// [`Type::A`]) are provided.
///
/// The QTYPE [`ANY`](Type::ANY) is also represented by this type, since
/// questions and records share the same number space.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Type(u16);

impl Type {
    pub const A: Type = Type(1);
    pub const NS: Type = Type(2);
    pub const CNAME: Type = Type(5);
    pub const SOA: Type = Type(6);
    pub const NULL: Type = Type(10);
    pub const PTR: Type = Type(12);
    pub const HINFO: Type = Type(13);
    pub const MX: Type = Type(15);
    pub const TXT: Type = Type(16);
    pub const AAAA: Type = Type(28);
    pub const SRV: Type = Type(33);
    pub const OPT: Type = Type(41);
    pub const DS: Type = Type(43);
    pub const RRSIG: Type = Type(46);
    pub const NSEC: Type = Type(47);
    pub const DNSKEY: Type = Type(48);
    pub const TSIG: Type = Type(250);
    pub const ANY: Type = Type(255);

    /// Returns whether a question of type `self` asks for records of
    /// type `record_type`.
    pub fn matches(self, record_type: Type) -> bool {
        self == Self::ANY || self == record_type
    }

    /// Returns whether this is a pseudo-RR type, i.e. one that carries
    /// per-message data rather than data about a domain name. Such
    /// records have no RRset to sign.
    pub fn is_pseudo(self) -> bool {
        matches!(self, Self::OPT | Self::TSIG)
    }
}

impl From<u16> for Type {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Type> for u16 {
    fn from(rr_type: Type) -> Self {
        rr_type.0
    }
}

impl FromStr for Type {
    type Err = &'static str;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "NS" => Ok(Self::NS),
            "CNAME" => Ok(Self::CNAME),
            "SOA" => Ok(Self::SOA),
            "NULL" => Ok(Self::NULL),
            "PTR" => Ok(Self::PTR),
            "HINFO" => Ok(Self::HINFO),
            "MX" => Ok(Self::MX),
            "TXT" => Ok(Self::TXT),
            "AAAA" => Ok(Self::AAAA),
            "SRV" => Ok(Self::SRV),
            "OPT" => Ok(Self::OPT),
            "DS" => Ok(Self::DS),
            "RRSIG" => Ok(Self::RRSIG),
            "NSEC" => Ok(Self::NSEC),
            "DNSKEY" => Ok(Self::DNSKEY),
            "TSIG" => Ok(Self::TSIG),
            "ANY" | "*" => Ok(Self::ANY),
            _ => {
                if text
                    .get(0..4)
                    .map_or(false, |prefix| prefix.eq_ignore_ascii_case("TYPE"))
                {
                    text[4..]
                        .parse::<u16>()
                        .map(Self::from)
                        .or(Err("type value is not a valid unsigned 16-bit integer"))
                } else {
                    Err("unknown type")
                }
            }
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::A => f.write_str("A"),
            Self::NS => f.write_str("NS"),
            Self::CNAME => f.write_str("CNAME"),
            Self::SOA => f.write_str("SOA"),
            Self::NULL => f.write_str("NULL"),
            Self::PTR => f.write_str("PTR"),
            Self::HINFO => f.write_str("HINFO"),
            Self::MX => f.write_str("MX"),
            Self::TXT => f.write_str("TXT"),
            Self::AAAA => f.write_str("AAAA"),
            Self::SRV => f.write_str("SRV"),
            Self::OPT => f.write_str("OPT"),
            Self::DS => f.write_str("DS"),
            Self::RRSIG => f.write_str("RRSIG"),
            Self::NSEC => f.write_str("NSEC"),
            Self::DNSKEY => f.write_str("DNSKEY"),
            Self::TSIG => f.write_str("TSIG"),
            Self::ANY => f.write_str("ANY"),
            Self(value) => write!(f, "TYPE{value}"), // RFC 3597 § 5
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_displays_according_to_rfc3597() {
        // TYPE65280 is from the private use range, so it should always
        // be unknown.
        let rr_type = Type::from(0xff00);
        assert_eq!(rr_type.to_string(), "TYPE65280");
    }

    #[test]
    fn type_parses_according_to_rfc3597() {
        let type_a: Type = "TYPE1".parse().unwrap();
        let type_65280: Type = "TYPE65280".parse().unwrap();
        assert_eq!(type_a, Type::A);
        assert_eq!(u16::from(type_65280), 65280);
    }

    #[test]
    fn any_matches_every_type() {
        assert!(Type::ANY.matches(Type::RRSIG));
        assert!(Type::A.matches(Type::A));
        assert!(!Type::A.matches(Type::AAAA));
    }

    #[test]
    fn opt_is_pseudo() {
        assert!(Type::OPT.is_pseudo());
        assert!(!Type::RRSIG.is_pseudo());
    }
}
