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

//! Error types for zone file parsing.
//!
//! All syntax errors are recorded with an [`ErrorKind`] value, so that
//! error messages stay consistent and no strings need to be allocated
//! when an error occurs.

use std::fmt;
use std::io;
use std::net::AddrParseError;
use std::num::ParseIntError;

use crate::name;

////////////////////////////////////////////////////////////////////////
// ERROR STRUCTURE                                                    //
////////////////////////////////////////////////////////////////////////

/// Represents errors that may occur during zone file parsing.
#[derive(Debug)]
pub enum Error {
    /// I/O errors encountered while reading a zone file.
    Io(io::Error),

    /// Syntax errors.
    Syntax(ErrorDetails),
}

impl Error {
    /// Constructs a new [`Error`] of the [`Syntax`](`Error::Syntax`)
    /// variant.
    pub(super) fn new(line: usize, kind: ErrorKind) -> Self {
        Self::Syntax(ErrorDetails { line, kind })
    }
}

impl From<io::Error> for Error {
    fn from(io_error: io::Error) -> Self {
        Self::Io(io_error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(io_error) => write!(f, "I/O error: {}", io_error),
            Self::Syntax(details) => details.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(io_error) => Some(io_error),
            Self::Syntax(_) => None,
        }
    }
}

/// A result type for zone file parsing.
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////
// SYNTAX ERROR DETAILS                                               //
////////////////////////////////////////////////////////////////////////

/// Provides information about the position and kind of zone file syntax
/// errors.
#[derive(Debug)]
pub struct ErrorDetails {
    pub(super) line: usize,
    pub(super) kind: ErrorKind,
}

impl ErrorDetails {
    /// Returns the line in the file at which the entry containing the
    /// error starts.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the kind of syntax error that occurred.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at line {}", self.kind, self.line)
    }
}

////////////////////////////////////////////////////////////////////////
// SYNTAX ERROR KINDS                                                 //
////////////////////////////////////////////////////////////////////////

/// Kinds of zone file syntax errors.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    AtWhenOriginNotSet,
    CharacterStringTooLong,
    EmptyOwnerWithNoPrevious,
    EofBeforeCloseParen,
    EolInEscape,
    EolInQuotedString,
    EscapeNeedsThreeDigits,
    EscapeValueOutOfRange,
    ExpectedBackslashHash,
    ExpectedCharacterString,
    ExpectedEol,
    ExpectedHex,
    ExpectedBase64,
    ExpectedIpv4,
    ExpectedIpv6,
    ExpectedName,
    ExpectedRdataLen,
    ExpectedSignatureTime,
    ExpectedTtl,
    ExpectedType,
    ExpectedInt,
    InvalidBase64,
    InvalidHex,
    InvalidInt(ParseIntError),
    InvalidIpv4(AddrParseError),
    InvalidIpv6(AddrParseError),
    InvalidName(name::Error),
    InvalidRdataLen,
    InvalidSignatureTime,
    InvalidTtl(ParseIntError),
    InvalidType(&'static str),
    GenericRdataNotSupported,
    IncludeNotSupported,
    NestedParens,
    NotAllowedInZoneFile,
    NotAscii,
    OmittedTtlWithNoDefaultOrPrevious,
    PqdnWhenOriginNotSet,
    UnknownDirective,
    UnmatchedCloseParen,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::AtWhenOriginNotSet => f.write_str("cannot use @ when no origin is set"),
            Self::CharacterStringTooLong => f.write_str("<character-string> is too long"),
            Self::EmptyOwnerWithNoPrevious => {
                f.write_str("the owner cannot be empty when no previous owner is available")
            }
            Self::EofBeforeCloseParen => {
                f.write_str("reached end of file before close parenthesis")
            }
            Self::EolInEscape => f.write_str("reached end of line in escape sequence"),
            Self::EolInQuotedString => f.write_str("reached end of line in quoted string"),
            Self::EscapeNeedsThreeDigits => {
                f.write_str("invalid escape sequence: expected three decimal digits")
            }
            Self::EscapeValueOutOfRange => {
                f.write_str("invalid escape sequence: escaped octet value is out of range")
            }
            Self::ExpectedBackslashHash => f.write_str("expected \\#"),
            Self::ExpectedCharacterString => f.write_str("expected a <character-string>"),
            Self::ExpectedEol => f.write_str("expected the end of the line"),
            Self::ExpectedHex => f.write_str("expected hexadecimal data"),
            Self::ExpectedBase64 => f.write_str("expected base64 data"),
            Self::ExpectedIpv4 => f.write_str("expected an IPv4 address"),
            Self::ExpectedIpv6 => f.write_str("expected an IPv6 address"),
            Self::ExpectedName => f.write_str("expected a domain name"),
            Self::ExpectedRdataLen => f.write_str("expected RDATA length"),
            Self::ExpectedSignatureTime => f.write_str("expected a signature time"),
            Self::ExpectedTtl => f.write_str("expected a TTL"),
            Self::ExpectedType => f.write_str("expected an RR type"),
            Self::ExpectedInt => f.write_str("expected an unsigned integer"),
            Self::InvalidBase64 => f.write_str("invalid base64 data"),
            Self::InvalidHex => f.write_str("invalid hexadecimal data"),
            Self::InvalidInt(ref int_err) => int_err.fmt(f),
            Self::InvalidIpv4(ref addr_err) => addr_err.fmt(f),
            Self::InvalidIpv6(ref addr_err) => addr_err.fmt(f),
            Self::InvalidName(name_err) => write!(f, "invalid name: {}", name_err),
            Self::InvalidRdataLen => f.write_str("RDATA length does not match the data"),
            Self::InvalidSignatureTime => f.write_str("invalid signature time"),
            Self::InvalidTtl(ref int_err) => write!(f, "invalid TTL: {}", int_err),
            Self::InvalidType(type_err) => type_err.fmt(f),
            Self::NestedParens => f.write_str("nested parentheses"),
            Self::GenericRdataNotSupported => {
                f.write_str("\\# RDATA is not supported for this RR type")
            }
            Self::IncludeNotSupported => f.write_str("$INCLUDE is not supported"),
            Self::NotAllowedInZoneFile => f.write_str("RR type is not allowed in zone files"),
            Self::NotAscii => f.write_str("field contains non-ASCII data"),
            Self::OmittedTtlWithNoDefaultOrPrevious => {
                f.write_str("TTL omitted with no default TTL or previous TTL available")
            }
            Self::PqdnWhenOriginNotSet => {
                f.write_str("cannot use a partially qualified domain name when no origin is set")
            }
            Self::UnknownDirective => f.write_str("unknown directive"),
            Self::UnmatchedCloseParen => f.write_str("unmatched close parenthesis"),
        }
    }
}
