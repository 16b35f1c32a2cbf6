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

//! Parsing of resource records.

use std::io::Read;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::num::ParseIntError;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::{field_str, Entry, Error, ErrorKind, Field, Parser, Result};
use crate::class::Class;
use crate::name::{Label, Name};
use crate::rr::rdata::{self, Dnskey, Ds, Rrsig, Soa, Srv};
use crate::rr::{Rdata, Record, Ttl, Type};
use crate::util::decode_hex;

impl<S: Read> Parser<S> {
    ////////////////////////////////////////////////////////////////////
    // PARSING OF RESOURCE RECORDS                                    //
    ////////////////////////////////////////////////////////////////////

    /// Parses the resource record making up `entry`.
    pub(super) fn parse_record(&mut self, entry: &mut Entry) -> Result<Record> {
        // In zone files, leading whitespace is significant. If it
        // exists, then the owner for the record on this line is the
        // same as the owner for the previous record.
        let owner = if entry.leading_whitespace {
            self.context
                .previous_owner
                .clone()
                .ok_or_else(|| entry.error(ErrorKind::EmptyOwnerWithNoPrevious))?
        } else {
            let field = entry.next_field(ErrorKind::ExpectedName)?;
            self.parse_name(&field, entry.line)?
        };

        let (ttl, class) = self.parse_ttl_and_class(entry)?;
        let rr_type = parse_type(entry)?;
        let rdata = self.parse_rdata(rr_type, entry)?;
        entry.expect_eol()?;

        self.context.previous_owner = Some(owner.clone());
        self.context.previous_ttl = Some(ttl);
        self.context.previous_class = Some(class);
        Ok(Record::new(owner, class, ttl, rdata))
    }

    /// Parses the TTL and CLASS fields of a record. We may see TTL then
    /// CLASS, CLASS then TTL, only one of the two, or neither. When
    /// omitted, the CLASS defaults to the previous record's CLASS (or
    /// IN if there is none). The TTL defaults to the one specified by
    /// the most recent `$TTL` directive ([RFC 2308 § 4]), or if there
    /// is none, then the previous record's TTL.
    ///
    /// [RFC 2308 § 4]: https://datatracker.ietf.org/doc/html/rfc2308#section-4
    fn parse_ttl_and_class(&self, entry: &mut Entry) -> Result<(Ttl, Class)> {
        // As noted in RFC 1035 § 5.1, the possible TTL, class, and
        // subsequent type fields are disjoint, so the parse is unique.
        let mut ttl = None;
        let mut class = None;
        for _ in 0..2 {
            let candidate = entry
                .peek()
                .filter(|field| !field.quoted)
                .and_then(|field| std::str::from_utf8(&field.text).ok())
                .map(|text| (text.parse::<u32>().ok(), text.parse::<Class>().ok()));
            match candidate {
                Some((Some(value), _)) if ttl.is_none() => ttl = Some(Ttl::from(value)),
                Some((_, Some(value))) if class.is_none() => class = Some(value),
                _ => break,
            }
            entry.try_next_field();
        }

        let ttl = ttl
            .or(self.context.default_ttl)
            .or(self.context.previous_ttl)
            .ok_or_else(|| entry.error(ErrorKind::OmittedTtlWithNoDefaultOrPrevious))?;
        let class = class.or(self.context.previous_class).unwrap_or_default();
        Ok((ttl, class))
    }

    ////////////////////////////////////////////////////////////////////
    // RDATA PARSING                                                  //
    ////////////////////////////////////////////////////////////////////

    // RFC 3597 § 5 allows RDATA for *any* type to be given in the raw
    // \# form intended for unknown types. Known types given this way
    // are decoded into their structured form where the wire format is
    // simple enough (addresses, single names, and TXT); the others are
    // refused rather than stored as opaque data, since the resolver
    // inspects their fields.

    /// Parses RDATA for a record of type `rr_type`.
    fn parse_rdata(&self, rr_type: Type, entry: &mut Entry) -> Result<Rdata> {
        if entry.expect_field(b"\\#") {
            return parse_generic_rdata(rr_type, entry);
        }

        let rdata = match rr_type {
            Type::A => Rdata::A(parse_addr(entry, ErrorKind::ExpectedIpv4, ErrorKind::InvalidIpv4)?),
            Type::AAAA => {
                Rdata::Aaaa(parse_addr(entry, ErrorKind::ExpectedIpv6, ErrorKind::InvalidIpv6)?)
            }
            Type::NS => Rdata::Ns(self.parse_rdata_name(entry)?),
            Type::CNAME => Rdata::Cname(self.parse_rdata_name(entry)?),
            Type::PTR => Rdata::Ptr(self.parse_rdata_name(entry)?),
            Type::SOA => Rdata::Soa(Box::new(Soa {
                mname: self.parse_rdata_name(entry)?,
                rname: self.parse_rdata_name(entry)?,
                serial: parse_int(entry)?,
                refresh: parse_int(entry)?,
                retry: parse_int(entry)?,
                expire: parse_int(entry)?,
                minimum: parse_int(entry)?,
            })),
            Type::MX => Rdata::Mx {
                preference: parse_int(entry)?,
                exchange: self.parse_rdata_name(entry)?,
            },
            Type::TXT => {
                let mut strings = vec![parse_character_string(entry)?];
                while entry.peek().is_some() {
                    strings.push(parse_character_string(entry)?);
                }
                Rdata::Txt(strings)
            }
            Type::SRV => Rdata::Srv(Srv {
                priority: parse_int(entry)?,
                weight: parse_int(entry)?,
                port: parse_int(entry)?,
                target: self.parse_rdata_name(entry)?,
            }),
            Type::RRSIG => Rdata::Rrsig(Box::new(Rrsig {
                type_covered: parse_type(entry)?,
                algorithm: parse_int(entry)?,
                labels: parse_int(entry)?,
                original_ttl: Ttl::from(parse_int::<u32>(entry)?),
                expiration: parse_signature_time(entry)?,
                inception: parse_signature_time(entry)?,
                key_tag: parse_int(entry)?,
                signer_name: self.parse_rdata_name(entry)?,
                signature: parse_base64(entry)?,
            })),
            Type::DNSKEY => Rdata::Dnskey(Dnskey {
                flags: parse_int(entry)?,
                protocol: parse_int(entry)?,
                algorithm: parse_int(entry)?,
                public_key: parse_base64(entry)?,
            }),
            Type::DS => Rdata::Ds(Ds {
                key_tag: parse_int(entry)?,
                algorithm: parse_int(entry)?,
                digest_type: parse_int(entry)?,
                digest: parse_hex(entry)?,
            }),
            _ => return Err(entry.error(ErrorKind::ExpectedBackslashHash)),
        };
        Ok(rdata)
    }

    /// Parses a domain name within RDATA.
    fn parse_rdata_name(&self, entry: &mut Entry) -> Result<Name> {
        let field = entry.next_field(ErrorKind::ExpectedName)?;
        self.parse_name(&field, entry.line)
    }
}

////////////////////////////////////////////////////////////////////////
// FIELD PARSING HELPERS                                              //
////////////////////////////////////////////////////////////////////////

/// Parses an RR type. Types that cannot appear in zone files (NULL,
/// OPT, TSIG, and the ANY query type) are rejected.
fn parse_type(entry: &mut Entry) -> Result<Type> {
    let field = entry.next_field(ErrorKind::ExpectedType)?;
    let rr_type: Type = field_str(&field, entry.line)?
        .parse()
        .map_err(|e| entry.error(ErrorKind::InvalidType(e)))?;
    match rr_type {
        Type::NULL | Type::OPT | Type::TSIG | Type::ANY => {
            Err(entry.error(ErrorKind::NotAllowedInZoneFile))
        }
        _ => Ok(rr_type),
    }
}

/// Parses an unsigned integer field.
fn parse_int<T>(entry: &mut Entry) -> Result<T>
where
    T: FromStr<Err = ParseIntError>,
{
    let field = entry.next_field(ErrorKind::ExpectedInt)?;
    field_str(&field, entry.line)?
        .parse()
        .map_err(|e| entry.error(ErrorKind::InvalidInt(e)))
}

/// Parses an IP address field.
fn parse_addr<T>(
    entry: &mut Entry,
    expected: ErrorKind,
    invalid: fn(std::net::AddrParseError) -> ErrorKind,
) -> Result<T>
where
    T: FromStr<Err = std::net::AddrParseError>,
{
    let field = entry.next_field(expected)?;
    field_str(&field, entry.line)?
        .parse()
        .map_err(|e| entry.error(invalid(e)))
}

/// Parses a signature time, given either as `YYYYMMDDHHmmSS` or as a
/// decimal count of seconds since the epoch ([RFC 4034 § 3.2]).
///
/// [RFC 4034 § 3.2]: https://datatracker.ietf.org/doc/html/rfc4034#section-3.2
fn parse_signature_time(entry: &mut Entry) -> Result<u32> {
    let field = entry.next_field(ErrorKind::ExpectedSignatureTime)?;
    let text = field_str(&field, entry.line)?;
    let time = if text.len() == 14 {
        rdata::parse_signature_time(text)
    } else {
        text.parse().ok()
    };
    time.ok_or_else(|| entry.error(ErrorKind::InvalidSignatureTime))
}

/// Parses base64 data, which may be split into several fields. All
/// remaining fields of the entry are consumed.
fn parse_base64(entry: &mut Entry) -> Result<Vec<u8>> {
    let text = join_remaining(entry, ErrorKind::ExpectedBase64)?;
    BASE64
        .decode(text)
        .map_err(|_| entry.error(ErrorKind::InvalidBase64))
}

/// Parses hexadecimal data, which may be split into several fields. All
/// remaining fields of the entry are consumed.
fn parse_hex(entry: &mut Entry) -> Result<Vec<u8>> {
    let text = join_remaining(entry, ErrorKind::ExpectedHex)?;
    decode_hex(&text).ok_or_else(|| entry.error(ErrorKind::InvalidHex))
}

/// Concatenates the text of all remaining fields, requiring at least
/// one.
fn join_remaining(entry: &mut Entry, expected: ErrorKind) -> Result<String> {
    let first = entry.next_field(expected)?;
    let mut text = field_str(&first, entry.line)?.to_owned();
    while let Some(field) = entry.try_next_field() {
        text.push_str(field_str(&field, entry.line)?);
    }
    Ok(text)
}

////////////////////////////////////////////////////////////////////////
// <CHARACTER-STRING>S AND ESCAPES                                    //
////////////////////////////////////////////////////////////////////////

/// Parses an [RFC 1035 § 3.3] `<character-string>`, which may be quoted
/// or unquoted ([RFC 1035 § 5.1]).
///
/// [RFC 1035 § 3.3]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.3
/// [RFC 1035 § 5.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-5.1
fn parse_character_string(entry: &mut Entry) -> Result<Vec<u8>> {
    let field = entry.next_field(ErrorKind::ExpectedCharacterString)?;
    let octets = decode_escapes(&field, entry.line)?;
    if octets.len() > 255 {
        Err(entry.error(ErrorKind::CharacterStringTooLong))
    } else {
        Ok(octets)
    }
}

/// Decodes the escape sequences ([RFC 1035 § 5.1], [RFC 4343 § 2.1])
/// in a field's raw text.
///
/// [RFC 1035 § 5.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-5.1
/// [RFC 4343 § 2.1]: https://datatracker.ietf.org/doc/html/rfc4343#section-2.1
fn decode_escapes(field: &Field, line: usize) -> Result<Vec<u8>> {
    let mut octets = Vec::with_capacity(field.text.len());
    let mut iter = field.text.iter().copied();
    while let Some(octet) = iter.next() {
        if octet != b'\\' {
            octets.push(octet);
            continue;
        }
        // The tokenizer guarantees that a backslash is followed by
        // another octet.
        match iter.next() {
            Some(first) if first.is_ascii_digit() => {
                let mut value = (first - b'0') as u16;
                for _ in 0..2 {
                    match iter.next() {
                        Some(digit) if digit.is_ascii_digit() => {
                            value = value * 10 + (digit - b'0') as u16;
                        }
                        _ => return Err(Error::new(line, ErrorKind::EscapeNeedsThreeDigits)),
                    }
                }
                let value = u8::try_from(value)
                    .map_err(|_| Error::new(line, ErrorKind::EscapeValueOutOfRange))?;
                octets.push(value);
            }
            Some(other) => octets.push(other),
            None => return Err(Error::new(line, ErrorKind::EolInEscape)),
        }
    }
    Ok(octets)
}

////////////////////////////////////////////////////////////////////////
// GENERIC (RFC 3597) RDATA                                           //
////////////////////////////////////////////////////////////////////////

/// Parses RDATA in the [RFC 3597 § 5] generic format, after the `\#`
/// token: a length followed by zero or more fields of hexadecimal
/// data.
///
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
fn parse_generic_rdata(rr_type: Type, entry: &mut Entry) -> Result<Rdata> {
    let len_field = entry.next_field(ErrorKind::ExpectedRdataLen)?;
    let len: u16 = field_str(&len_field, entry.line)?
        .parse()
        .map_err(|e| entry.error(ErrorKind::InvalidInt(e)))?;
    let data = if len == 0 {
        Vec::new()
    } else {
        parse_hex(entry)?
    };
    if data.len() != len as usize {
        return Err(entry.error(ErrorKind::InvalidRdataLen));
    }

    let invalid = || entry.error(ErrorKind::InvalidRdataLen);
    match rr_type {
        Type::A => <[u8; 4]>::try_from(data.as_slice())
            .map(|octets| Rdata::A(Ipv4Addr::from(octets)))
            .map_err(|_| invalid()),
        Type::AAAA => <[u8; 16]>::try_from(data.as_slice())
            .map(|octets| Rdata::Aaaa(Ipv6Addr::from(octets)))
            .map_err(|_| invalid()),
        Type::NS => decode_wire_name(&data).map(Rdata::Ns).ok_or_else(invalid),
        Type::CNAME => decode_wire_name(&data).map(Rdata::Cname).ok_or_else(invalid),
        Type::PTR => decode_wire_name(&data).map(Rdata::Ptr).ok_or_else(invalid),
        Type::TXT => decode_wire_txt(&data).map(Rdata::Txt).ok_or_else(invalid),
        Type::SOA | Type::MX | Type::SRV | Type::RRSIG | Type::DNSKEY | Type::DS => {
            Err(entry.error(ErrorKind::GenericRdataNotSupported))
        }
        _ => Ok(Rdata::Unknown { rr_type, data }),
    }
}

/// Decodes RDATA consisting of exactly one uncompressed domain name in
/// wire format.
fn decode_wire_name(data: &[u8]) -> Option<Name> {
    let mut labels = Vec::new();
    let mut rest = data;
    loop {
        let (&len, after) = rest.split_first()?;
        if len == 0 {
            return if after.is_empty() {
                Name::from_labels(labels).ok()
            } else {
                None
            };
        }
        let label = after.get(..len as usize)?;
        labels.push(Label::try_from(label).ok()?);
        rest = &after[len as usize..];
    }
}

/// Decodes TXT RDATA in wire format (one or more length-prefixed
/// `<character-string>`s).
fn decode_wire_txt(data: &[u8]) -> Option<Vec<Vec<u8>>> {
    let mut strings = Vec::new();
    let mut rest = data;
    while let Some((&len, after)) = rest.split_first() {
        strings.push(after.get(..len as usize)?.to_vec());
        rest = &after[len as usize..];
    }
    if strings.is_empty() {
        None
    } else {
        Some(strings)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
