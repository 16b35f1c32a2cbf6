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

//! Typed record data ([`Rdata`]) for the RR types the catalog and
//! resolver work with.
//!
//! Every variant that refers to another domain name holds a [`Name`]
//! directly, so a record can never lack the target that glue
//! processing needs. Types without a dedicated variant are kept as
//! opaque octets in [`Rdata::Unknown`], which is also how pseudo-RRs
//! like OPT are carried.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::{Ttl, Type};
use crate::name::Name;
use crate::util::encode_hex;

////////////////////////////////////////////////////////////////////////
// RDATA                                                              //
////////////////////////////////////////////////////////////////////////

/// The data of a resource record.
///
/// Equality and hashing consider only the data itself; domain names
/// inside the data compare case-insensitively, as [`Name`]s always do.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Rdata {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Ns(Name),
    Cname(Name),
    Ptr(Name),
    Soa(Box<Soa>),
    Mx { preference: u16, exchange: Name },
    Txt(Vec<Vec<u8>>),
    Srv(Srv),
    Rrsig(Box<Rrsig>),
    Dnskey(Dnskey),
    Ds(Ds),
    Unknown { rr_type: Type, data: Vec<u8> },
}

/// The data of an SOA record ([RFC 1035 § 3.3.13]).
///
/// [RFC 1035 § 3.3.13]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.3.13
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Soa {
    pub mname: Name,
    pub rname: Name,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

/// The data of an SRV record ([RFC 2782]).
///
/// [RFC 2782]: https://datatracker.ietf.org/doc/html/rfc2782
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Srv {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: Name,
}

/// The data of an RRSIG record ([RFC 4034 § 3]).
///
/// The expiration and inception times are seconds since the Unix epoch.
///
/// [RFC 4034 § 3]: https://datatracker.ietf.org/doc/html/rfc4034#section-3
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Rrsig {
    pub type_covered: Type,
    pub algorithm: u8,
    pub labels: u8,
    pub original_ttl: Ttl,
    pub expiration: u32,
    pub inception: u32,
    pub key_tag: u16,
    pub signer_name: Name,
    pub signature: Vec<u8>,
}

/// The data of a DNSKEY record ([RFC 4034 § 2]).
///
/// [RFC 4034 § 2]: https://datatracker.ietf.org/doc/html/rfc4034#section-2
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Dnskey {
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: Vec<u8>,
}

/// The data of a DS record ([RFC 4034 § 5]).
///
/// [RFC 4034 § 5]: https://datatracker.ietf.org/doc/html/rfc4034#section-5
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Ds {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    pub digest: Vec<u8>,
}

impl Rdata {
    /// Returns the RR type of this data.
    pub fn rr_type(&self) -> Type {
        match self {
            Self::A(_) => Type::A,
            Self::Aaaa(_) => Type::AAAA,
            Self::Ns(_) => Type::NS,
            Self::Cname(_) => Type::CNAME,
            Self::Ptr(_) => Type::PTR,
            Self::Soa(_) => Type::SOA,
            Self::Mx { .. } => Type::MX,
            Self::Txt(_) => Type::TXT,
            Self::Srv(_) => Type::SRV,
            Self::Rrsig(_) => Type::RRSIG,
            Self::Dnskey(_) => Type::DNSKEY,
            Self::Ds(_) => Type::DS,
            Self::Unknown { rr_type, .. } => *rr_type,
        }
    }
}

/// Displays the data in the presentation format of [RFC 1035 § 5.1]
/// and the RFCs defining the later types. Unknown types use the
/// generic `\#` syntax of [RFC 3597 § 5].
///
/// [RFC 1035 § 5.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-5.1
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
impl fmt::Display for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::A(addr) => write!(f, "{addr}"),
            Self::Aaaa(addr) => write!(f, "{addr}"),
            Self::Ns(name) | Self::Cname(name) | Self::Ptr(name) => write!(f, "{name}"),
            Self::Soa(soa) => write!(
                f,
                "{} {} {} {} {} {} {}",
                soa.mname, soa.rname, soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum,
            ),
            Self::Mx {
                preference,
                exchange,
            } => write!(f, "{preference} {exchange}"),
            Self::Txt(strings) => {
                for (i, string) in strings.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write_character_string(f, string)?;
                }
                Ok(())
            }
            Self::Srv(srv) => write!(
                f,
                "{} {} {} {}",
                srv.priority, srv.weight, srv.port, srv.target
            ),
            Self::Rrsig(sig) => write!(
                f,
                "{} {} {} {} {} {} {} {} {}",
                sig.type_covered,
                sig.algorithm,
                sig.labels,
                sig.original_ttl,
                format_signature_time(sig.expiration),
                format_signature_time(sig.inception),
                sig.key_tag,
                sig.signer_name,
                BASE64.encode(&sig.signature),
            ),
            Self::Dnskey(key) => write!(
                f,
                "{} {} {} {}",
                key.flags,
                key.protocol,
                key.algorithm,
                BASE64.encode(&key.public_key),
            ),
            Self::Ds(ds) => write!(
                f,
                "{} {} {} {}",
                ds.key_tag,
                ds.algorithm,
                ds.digest_type,
                encode_hex(&ds.digest),
            ),
            Self::Unknown { data, .. } => {
                write!(f, "\\# {}", data.len())?;
                if !data.is_empty() {
                    write!(f, " {}", encode_hex(data))?;
                }
                Ok(())
            }
        }
    }
}

/// Writes a `<character-string>` in quoted form, escaping quotes,
/// backslashes, and non-printable octets.
fn write_character_string(f: &mut fmt::Formatter, octets: &[u8]) -> fmt::Result {
    f.write_str("\"")?;
    for octet in octets {
        match *octet {
            b'"' => f.write_str("\\\"")?,
            b'\\' => f.write_str("\\\\")?,
            o if o == b' ' || o.is_ascii_graphic() => write!(f, "{}", o as char)?,
            o => write!(f, "\\{:03}", o)?,
        }
    }
    f.write_str("\"")
}

////////////////////////////////////////////////////////////////////////
// SIGNATURE TIMES                                                    //
////////////////////////////////////////////////////////////////////////

// RFC 4034 § 3.2 presents signature times as YYYYMMDDHHmmSS in UTC.
// The day-count conversions below are the standard proleptic Gregorian
// algorithms, with day 0 being 1970-01-01.

/// Formats seconds since the Unix epoch as `YYYYMMDDHHmmSS`.
pub(crate) fn format_signature_time(time: u32) -> String {
    let days = (time / 86_400) as i64;
    let seconds = time % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}",
        year,
        month,
        day,
        seconds / 3600,
        seconds / 60 % 60,
        seconds % 60,
    )
}

/// Parses a `YYYYMMDDHHmmSS` time into seconds since the Unix epoch.
/// Returns [`None`] if the text is malformed or the time does not fit
/// in 32 bits.
pub(crate) fn parse_signature_time(text: &str) -> Option<u32> {
    if text.len() != 14 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let field = |range: std::ops::Range<usize>| text[range].parse::<i64>().ok();
    let (year, month, day) = (field(0..4)?, field(4..6)?, field(6..8)?);
    let (hour, minute, second) = (field(8..10)?, field(10..12)?, field(12..14)?);
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) || hour > 23 || minute > 59 || second > 59 {
        return None;
    }
    let days = days_from_civil(year, month, day);
    u32::try_from(days * 86_400 + hour * 3600 + minute * 60 + second).ok()
}

fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = (if year >= 0 { year } else { year - 399 }) / 400;
    let year_of_era = year - era * 400;
    let day_of_year = (153 * ((month + 9) % 12) + 2) / 5 + day - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let days = days + 719_468;
    let era = (if days >= 0 { days } else { days - 146_096 }) / 146_097;
    let day_of_era = days - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_times_round_trip_known_values() {
        // From the RRSIG example in RFC 4034 § 3.3.
        assert_eq!(parse_signature_time("20030322173103"), Some(1_048_354_263));
        assert_eq!(format_signature_time(1_048_354_263), "20030322173103");
        assert_eq!(parse_signature_time("19700101000000"), Some(0));
        assert_eq!(format_signature_time(951_782_400), "20000229000000");
    }

    #[test]
    fn signature_time_rejects_garbage() {
        assert_eq!(parse_signature_time("2003032217310"), None);
        assert_eq!(parse_signature_time("20031322173103"), None);
        assert_eq!(parse_signature_time("2003032217310x"), None);
    }

    #[test]
    fn names_in_rdata_compare_case_insensitively() {
        let lower = Rdata::Cname("target.test.".parse().unwrap());
        let upper = Rdata::Cname("TARGET.test.".parse().unwrap());
        assert_eq!(lower, upper);
    }

    #[test]
    fn txt_display_escapes() {
        let txt = Rdata::Txt(vec![b"a \"b\"".to_vec(), vec![0x07]]);
        assert_eq!(txt.to_string(), "\"a \\\"b\\\"\" \"\\007\"");
    }

    #[test]
    fn unknown_display_uses_generic_syntax() {
        let unknown = Rdata::Unknown {
            rr_type: Type::from(65280),
            data: vec![0xab, 0x01],
        };
        assert_eq!(unknown.to_string(), "\\# 2 AB01");
        assert_eq!(unknown.rr_type(), Type::from(65280));
    }
}
