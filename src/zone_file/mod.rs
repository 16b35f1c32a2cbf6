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

//! Parsing of the [RFC 1035 § 5] zone file format.
//!
//! This module provides the [`Parser`] structure, which accepts a
//! stream implementing the [`Read`] trait. It can subsequently be
//! iterated over to read the DNS records stored in the stream, one
//! record at a time. This is the record source consumed by
//! [`Catalog::include_zone`](crate::db::Catalog::include_zone) and
//! [`Catalog::include`](crate::db::Catalog::include).
//!
//! Errors (which may be I/O errors or syntax errors) are reported
//! through the [`Error`] type. Iteration ends and parsing cannot be
//! continued after an error is returned.
//!
//! ```
//! use std::io::Cursor;
//! use cairn::rr::Type;
//! use cairn::zone_file::Parser;
//!
//! const ZONE_FILE: &[u8] = br#"
//! $ORIGIN cairn.test.
//! $TTL 86400
//! @   IN SOA ns1 admin (
//!     123     ; SERIAL
//!     3600    ; REFRESH
//!     900     ; RETRY
//!     86400   ; EXPIRE
//!     3600    ; MINIMUM
//! )
//!     IN NS ns1
//! ns1 IN A 127.0.0.1
//!     IN AAAA ::1
//! "#;
//!
//! let mut parser = Parser::new(Cursor::new(ZONE_FILE));
//! assert_eq!(parser.next().unwrap().unwrap().rr_type(), Type::SOA);
//! assert_eq!(parser.next().unwrap().unwrap().rr_type(), Type::NS);
//! assert_eq!(parser.next().unwrap().unwrap().rr_type(), Type::A);
//! assert_eq!(parser.next().unwrap().unwrap().rr_type(), Type::AAAA);
//! assert!(parser.next().is_none());
//! ```
//!
//! # Implementation
//!
//! Zone files are line-based, but parentheses extend a record across
//! lines, and leading whitespace is significant (it means "same owner
//! as the previous record"). Escape sequences apply to domain names and
//! `<character-string>`s, but the [RFC 3597 § 5] token `\#` is not the
//! same as a plain `#`, so escapes cannot be decoded before the parser
//! knows what a field holds.
//!
//! The work is therefore split in two. An internal tokenizer buffers
//! the stream, strips comments, joins parenthesized lines, and splits
//! each logical line into raw fields, leaving escapes in place. The
//! [`Parser`] then interprets the fields of each logical line as a
//! directive or a record, decoding escapes according to context.
//!
//! [RFC 1035 § 5]: https://datatracker.ietf.org/doc/html/rfc1035#section-5
//! [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5

use std::io::Read;

use crate::class::Class;
use crate::name::{self, Name};
use crate::rr::{Record, Ttl};

mod error;
mod record;
mod tokenizer;

pub use error::{Error, ErrorDetails, ErrorKind, Result};
use tokenizer::{Entry, Field, Tokenizer};

////////////////////////////////////////////////////////////////////////
// STRUCTURES                                                         //
////////////////////////////////////////////////////////////////////////

/// A parser for [RFC 1035 § 5] DNS zone files.
///
/// A [`Parser`] accepts a stream implementing [`Read`] and can then
/// be iterated to read DNS records from the stream. See the
/// [module-level documentation](`self`) for details and example usage.
///
/// [RFC 1035 § 5]: https://datatracker.ietf.org/doc/html/rfc1035#section-5
pub struct Parser<S> {
    error: bool,
    tokenizer: Tokenizer<S>,
    context: Context,
}

/// Tracks the parse context of a [`Parser`].
///
/// An `@` symbol stands for the current origin (set with `$ORIGIN`),
/// and partially qualified domain names are relative to it. Default
/// TTLs can be set with `$TTL`; otherwise an omitted TTL is the
/// previous record's. An omitted class is the previous record's, or IN
/// for the first record. An omitted owner is the previous owner.
#[derive(Clone, Default)]
struct Context {
    origin: Option<Name>,
    previous_owner: Option<Name>,
    previous_ttl: Option<Ttl>,
    previous_class: Option<Class>,
    default_ttl: Option<Ttl>,
}

////////////////////////////////////////////////////////////////////////
// PARSER CONSTRUCTION AND ITERATION                                  //
////////////////////////////////////////////////////////////////////////

impl<S: Read> Parser<S> {
    /// Creates a new [`Parser`] to read a zone file from the provided
    /// stream.
    pub fn new(stream: S) -> Self {
        Self {
            error: false,
            tokenizer: Tokenizer::new(stream),
            context: Context::default(),
        }
    }

    /// Presets the origin, as if the stream began with an `$ORIGIN`
    /// directive naming `origin`.
    pub fn with_origin(mut self, origin: Name) -> Self {
        self.context.origin = Some(origin);
        self
    }

    /// An internal helper to parse logical lines until a record is
    /// found.
    fn parse_until_record(&mut self) -> Result<Option<Record>> {
        while let Some(mut entry) = self.tokenizer.next_entry()? {
            let is_directive = !entry.leading_whitespace
                && entry.peek().map_or(false, |f| !f.quoted && f.text.first() == Some(&b'$'));
            if is_directive {
                self.parse_directive(&mut entry)?;
            } else {
                return self.parse_record(&mut entry).map(Some);
            }
        }
        Ok(None)
    }
}

impl<S: Read> Iterator for Parser<S> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error {
            // Internal state is not guaranteed to be consistent after
            // an error, so iteration stops for good.
            return None;
        }

        match self.parse_until_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.error = true;
                Some(Err(e))
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////
// DIRECTIVES                                                         //
////////////////////////////////////////////////////////////////////////

impl<S: Read> Parser<S> {
    /// Parses a `$`-directive. The caller has checked that the first
    /// field starts with `$`.
    fn parse_directive(&mut self, entry: &mut Entry) -> Result<()> {
        let directive = entry.next_field(ErrorKind::UnknownDirective)?;
        let keyword = std::str::from_utf8(&directive.text).unwrap_or("");
        match keyword.to_ascii_uppercase().as_str() {
            "$ORIGIN" => {
                let field = entry.next_field(ErrorKind::ExpectedName)?;
                let origin = self.parse_name(&field, entry.line)?;
                entry.expect_eol()?;
                self.context.origin = Some(origin);
            }
            "$TTL" => {
                let field = entry.next_field(ErrorKind::ExpectedTtl)?;
                let ttl: u32 = field_str(&field, entry.line)?
                    .parse()
                    .map_err(|e| entry.error(ErrorKind::InvalidTtl(e)))?;
                entry.expect_eol()?;
                self.context.default_ttl = Some(ttl.into());
            }
            "$INCLUDE" => return Err(entry.error(ErrorKind::IncludeNotSupported)),
            _ => return Err(entry.error(ErrorKind::UnknownDirective)),
        }
        Ok(())
    }

    ////////////////////////////////////////////////////////////////////
    // DOMAIN NAMES                                                   //
    ////////////////////////////////////////////////////////////////////

    /// Parses a domain name, including support for the `@` shorthand
    /// for the current origin. Partially qualified names are completed
    /// with the origin.
    fn parse_name(&self, field: &Field, line: usize) -> Result<Name> {
        if !field.quoted && field.text == b"@" {
            return self
                .context
                .origin
                .clone()
                .ok_or_else(|| Error::new(line, ErrorKind::AtWhenOriginNotSet));
        }

        let text = std::str::from_utf8(&field.text)
            .map_err(|_| Error::new(line, ErrorKind::InvalidName(name::Error::StrNotAscii)))?;
        let invalid = |e| Error::new(line, ErrorKind::InvalidName(e));
        let (labels, fully_qualified) = name::parse_labels(text).map_err(invalid)?;
        if fully_qualified {
            Name::from_labels(labels).map_err(invalid)
        } else if let Some(ref origin) = self.context.origin {
            Name::from_labels(labels.into_iter().chain(origin.labels().cloned())).map_err(invalid)
        } else {
            Err(Error::new(line, ErrorKind::PqdnWhenOriginNotSet))
        }
    }
}

/// Returns the text of a field that must be ASCII (anything but a
/// `<character-string>`).
fn field_str(field: &Field, line: usize) -> Result<&str> {
    std::str::from_utf8(&field.text)
        .ok()
        .filter(|text| text.is_ascii())
        .ok_or_else(|| Error::new(line, ErrorKind::NotAscii))
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::rr::{Rdata, Type};

    /// A helper used throughout the [`zone_file`](`super`) module's
    /// tests.
    pub(super) fn make_parser(data: &[u8]) -> Parser<Cursor<&[u8]>> {
        Parser::new(Cursor::new(data))
    }

    pub(super) fn parse_all(data: &[u8]) -> Result<Vec<Record>> {
        make_parser(data).collect()
    }

    fn syntax_error_kind(data: &[u8]) -> ErrorKind {
        match parse_all(data) {
            Err(Error::Syntax(details)) => details.kind,
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }

    #[test]
    fn context_is_applied() {
        let records = parse_all(
            b"$ORIGIN cairn.test.\n\
              $TTL 300\n\
              @ CH NS ns1\n\
              \tNS ns2.elsewhere.\n\
              www 60 A 192.0.2.1\n\
              mail AAAA ::1\n",
        )
        .unwrap();
        assert_eq!(records.len(), 4);

        assert_eq!(records[0].name, "cairn.test.".parse().unwrap());
        assert_eq!(records[0].class, Class::CH);
        assert_eq!(records[0].ttl, Ttl::from(300));
        assert_eq!(records[0].rdata, Rdata::Ns("ns1.cairn.test.".parse().unwrap()));

        assert_eq!(records[1].name, "cairn.test.".parse().unwrap());
        assert_eq!(records[1].rdata, Rdata::Ns("ns2.elsewhere.".parse().unwrap()));

        assert_eq!(records[2].name, "www.cairn.test.".parse().unwrap());
        assert_eq!(records[2].ttl, Ttl::from(60));
        assert_eq!(records[2].class, Class::CH);

        // $TTL takes precedence over the previous record's TTL.
        assert_eq!(records[3].ttl, Ttl::from(300));
    }

    #[test]
    fn class_defaults_to_in() {
        let records = parse_all(b". 3600000 NS a.root-servers.net.\n").unwrap();
        assert_eq!(records[0].class, Class::IN);
        assert!(records[0].name.is_root());
    }

    #[test]
    fn ttl_and_class_may_be_swapped() {
        let records = parse_all(b"a.test. IN 60 A 192.0.2.1\nb.test. 70 IN A 192.0.2.2\n").unwrap();
        assert_eq!(records[0].ttl, Ttl::from(60));
        assert_eq!(records[1].ttl, Ttl::from(70));
        assert_eq!(records[1].rr_type(), Type::A);
    }

    #[test]
    fn with_origin_presets_origin() {
        let mut parser = make_parser(b"www 60 A 192.0.2.1\n").with_origin("cairn.test.".parse().unwrap());
        let record = parser.next().unwrap().unwrap();
        assert_eq!(record.name, "www.cairn.test.".parse().unwrap());
    }

    #[test]
    fn escaped_names_are_parsed() {
        let records = parse_all(b"a\\.b.test. 60 A 192.0.2.1\n").unwrap();
        assert_eq!(records[0].name.label_count(), 2);
    }

    #[test]
    fn context_errors_are_detected() {
        assert_eq!(syntax_error_kind(b"@ 60 A 192.0.2.1\n"), ErrorKind::AtWhenOriginNotSet);
        assert_eq!(syntax_error_kind(b"www 60 A 192.0.2.1\n"), ErrorKind::PqdnWhenOriginNotSet);
        assert_eq!(
            syntax_error_kind(b"\t60 A 192.0.2.1\n"),
            ErrorKind::EmptyOwnerWithNoPrevious
        );
        assert_eq!(
            syntax_error_kind(b"a.test. A 192.0.2.1\n"),
            ErrorKind::OmittedTtlWithNoDefaultOrPrevious
        );
    }

    #[test]
    fn directive_errors_are_detected() {
        assert_eq!(syntax_error_kind(b"$INCLUDE other.zone\n"), ErrorKind::IncludeNotSupported);
        assert_eq!(syntax_error_kind(b"$GENERATE 1-2 a A 1.2.3.4\n"), ErrorKind::UnknownDirective);
        assert_eq!(syntax_error_kind(b"$ORIGIN a. b.\n"), ErrorKind::ExpectedEol);
    }

    #[test]
    fn iteration_stops_after_error() {
        let mut parser = make_parser(b"bad\na.test. 60 A 192.0.2.1\n");
        assert!(matches!(parser.next(), Some(Err(_))));
        assert!(parser.next().is_none());
    }
}
