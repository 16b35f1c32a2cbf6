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

//! Splitting of zone files into logical lines of fields.
//!
//! See the [`zone_file` module-level documentation](`super`) for how
//! this fits with the [`Parser`](super::Parser).

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};

use super::{Error, ErrorKind, Result};

////////////////////////////////////////////////////////////////////////
// STRUCTURES                                                         //
////////////////////////////////////////////////////////////////////////

/// Splits a zone file into [`Entry`] values.
///
/// The `Tokenizer` takes care of buffering the input stream, comments,
/// and parentheses for line extension. Escape sequences are *not*
/// processed here; they are left in the field text (with the
/// backslash) so that the parser can tell e.g. `\#` from `#` and `\.`
/// from `.`. The tokenizer only needs to know that an escaped octet
/// never ends a field.
pub(super) struct Tokenizer<S> {
    stream: BufReader<S>,
    line: usize,
    buf: Vec<u8>,
}

/// A logical line of a zone file. If parentheses were used, this may
/// span several physical lines.
#[derive(Debug)]
pub(super) struct Entry {
    /// The (physical) line number where the entry starts.
    pub line: usize,

    /// Whether the entry started with whitespace. For a record, this
    /// means that the owner was omitted.
    pub leading_whitespace: bool,

    fields: VecDeque<Field>,
}

/// A single field of an [`Entry`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct Field {
    /// The raw text of the field, with escape sequences left in place.
    /// For quoted fields, the quotes are not included.
    pub text: Vec<u8>,
    pub quoted: bool,
}

////////////////////////////////////////////////////////////////////////
// TOKENIZER IMPLEMENTATION                                           //
////////////////////////////////////////////////////////////////////////

impl<S: Read> Tokenizer<S> {
    /// Constructs a new `Tokenizer` from the given stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
            line: 0,
            buf: Vec::new(),
        }
    }

    /// Reads the next physical line into the internal buffer, without
    /// its line ending. Returns `false` at end-of-file.
    fn read_physical_line(&mut self) -> Result<bool> {
        self.buf.clear();
        if self.stream.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(false);
        }
        self.line += 1;
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        Ok(true)
    }

    /// Returns the next non-empty logical line, or `None` at the end of
    /// the stream.
    pub fn next_entry(&mut self) -> Result<Option<Entry>> {
        let mut entry: Option<Entry> = None;
        let mut in_parens = false;
        loop {
            if !self.read_physical_line()? {
                if in_parens {
                    let line = entry.map_or(self.line, |e| e.line);
                    return Err(Error::new(line, ErrorKind::EofBeforeCloseParen));
                }
                return Ok(None);
            }

            let current =
                entry.get_or_insert_with(|| Entry::new(self.line, self.buf.first().copied()));
            in_parens = split_fields(&self.buf, in_parens, current)?;
            if !in_parens {
                if current.fields.is_empty() {
                    // A blank or comment-only line.
                    entry = None;
                } else {
                    return Ok(entry);
                }
            }
        }
    }
}

/// Splits one physical line into fields, appending them to `entry`.
/// Returns whether the line ends inside parentheses.
fn split_fields(line: &[u8], mut in_parens: bool, entry: &mut Entry) -> Result<bool> {
    let mut index = 0;
    while index < line.len() {
        match line[index] {
            octet if is_whitespace(octet) => index += 1,
            b';' => break,
            b'(' if in_parens => return Err(Error::new(entry.line, ErrorKind::NestedParens)),
            b'(' => {
                in_parens = true;
                index += 1;
            }
            b')' if !in_parens => {
                return Err(Error::new(entry.line, ErrorKind::UnmatchedCloseParen))
            }
            b')' => {
                in_parens = false;
                index += 1;
            }
            b'"' => {
                let (text, end) = read_quoted(line, index + 1, entry.line)?;
                entry.fields.push_back(Field { text, quoted: true });
                index = end;
            }
            _ => {
                let (text, end) = read_unquoted(line, index, entry.line)?;
                entry.fields.push_back(Field {
                    text,
                    quoted: false,
                });
                index = end;
            }
        }
    }
    Ok(in_parens)
}

/// Reads a quoted field whose text starts at `start` (just after the
/// opening quote). Returns the text and the index after the closing
/// quote.
fn read_quoted(line: &[u8], start: usize, line_number: usize) -> Result<(Vec<u8>, usize)> {
    let mut text = Vec::new();
    let mut index = start;
    loop {
        match line.get(index) {
            None => return Err(Error::new(line_number, ErrorKind::EolInQuotedString)),
            Some(b'"') => return Ok((text, index + 1)),
            Some(b'\\') => {
                let escaped = line
                    .get(index + 1)
                    .ok_or_else(|| Error::new(line_number, ErrorKind::EolInEscape))?;
                text.extend_from_slice(&[b'\\', *escaped]);
                index += 2;
            }
            Some(octet) => {
                text.push(*octet);
                index += 1;
            }
        }
    }
}

/// Reads an unquoted field starting at `start`. Returns the text and
/// the index of the octet that ended the field.
fn read_unquoted(line: &[u8], start: usize, line_number: usize) -> Result<(Vec<u8>, usize)> {
    let mut text = Vec::new();
    let mut index = start;
    while let Some(&octet) = line.get(index) {
        if ends_field(octet) {
            break;
        } else if octet == b'\\' {
            let escaped = line
                .get(index + 1)
                .ok_or_else(|| Error::new(line_number, ErrorKind::EolInEscape))?;
            text.extend_from_slice(&[b'\\', *escaped]);
            index += 2;
        } else {
            text.push(octet);
            index += 1;
        }
    }
    Ok((text, index))
}

fn is_whitespace(octet: u8) -> bool {
    octet == b' ' || octet == b'\t'
}

/// Returns whether an unescaped `octet` ends an unquoted field.
fn ends_field(octet: u8) -> bool {
    matches!(octet, b' ' | b'\t' | b';' | b'(' | b')' | b'"')
}

////////////////////////////////////////////////////////////////////////
// ENTRY ACCESS                                                       //
////////////////////////////////////////////////////////////////////////

impl Entry {
    fn new(line: usize, first_octet: Option<u8>) -> Self {
        Self {
            line,
            leading_whitespace: first_octet.map_or(false, is_whitespace),
            fields: VecDeque::new(),
        }
    }

    /// Returns the next field without consuming it.
    pub fn peek(&self) -> Option<&Field> {
        self.fields.front()
    }

    /// Consumes and returns the next field, or fails with an error of
    /// kind `expected` if there are no more fields.
    pub fn next_field(&mut self, expected: ErrorKind) -> Result<Field> {
        self.fields
            .pop_front()
            .ok_or_else(|| Error::new(self.line, expected))
    }

    /// Consumes and returns the next field, if there is one.
    pub fn try_next_field(&mut self) -> Option<Field> {
        self.fields.pop_front()
    }

    /// Consumes the next field if it is exactly `text` (and unquoted).
    pub fn expect_field(&mut self, text: &[u8]) -> bool {
        match self.fields.front() {
            Some(field) if !field.quoted && field.text == text => {
                self.fields.pop_front();
                true
            }
            _ => false,
        }
    }

    /// Fails unless all fields have been consumed.
    pub fn expect_eol(&self) -> Result<()> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(Error::new(self.line, ErrorKind::ExpectedEol))
        }
    }

    /// Constructs a syntax error located at this entry.
    pub fn error(&self, kind: ErrorKind) -> Error {
        Error::new(self.line, kind)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn entries(data: &[u8]) -> Result<Vec<Entry>> {
        let mut tokenizer = Tokenizer::new(Cursor::new(data));
        let mut entries = Vec::new();
        while let Some(entry) = tokenizer.next_entry()? {
            entries.push(entry);
        }
        Ok(entries)
    }

    fn texts(entry: &Entry) -> Vec<&[u8]> {
        entry.fields.iter().map(|f| f.text.as_slice()).collect()
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        let entries = entries(b"\n; comment\n   \na 1 IN A 127.0.0.1 ; trailing\n").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].line, 4);
        assert!(!entries[0].leading_whitespace);
        assert_eq!(
            texts(&entries[0]),
            [&b"a"[..], b"1", b"IN", b"A", b"127.0.0.1"]
        );
    }

    #[test]
    fn parentheses_join_lines() {
        let entries = entries(b"@ SOA ns admin (\r\n  1 ; serial\n  2 3 4 5 )\nb A 1.2.3.4\n").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].fields.len(), 9);
        assert_eq!(entries[1].line, 4);
    }

    #[test]
    fn leading_whitespace_is_recorded() {
        let entries = entries(b"a A 1.2.3.4\n\tAAAA ::1\n").unwrap();
        assert!(!entries[0].leading_whitespace);
        assert!(entries[1].leading_whitespace);
    }

    #[test]
    fn quotes_and_escapes_are_preserved() {
        let entries = entries(b"a TXT \"semi; colon\" \"q\\\"uote\" a\\ b\n").unwrap();
        let fields = &entries[0].fields;
        assert_eq!(fields[2].text, b"semi; colon");
        assert!(fields[2].quoted);
        assert_eq!(fields[3].text, b"q\\\"uote");
        assert_eq!(fields[4].text, b"a\\ b");
        assert!(!fields[4].quoted);
    }

    #[test]
    fn paren_errors_are_detected() {
        for data in [&b"a ( ( b\n)\n"[..], b"a )\n", b"a ( b\n"] {
            assert!(matches!(entries(data), Err(Error::Syntax(_))));
        }
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert!(matches!(
            entries(b"a TXT \"abc\n"),
            Err(Error::Syntax(details)) if details.kind == ErrorKind::EolInQuotedString,
        ));
    }
}
