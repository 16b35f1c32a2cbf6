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

//! DNS messages, as exchanged between the resolver and its callers.
//!
//! The [`Message`] structure is a decoded message: header flags plus
//! the four sections as lists of [`Record`]s. Encoding to and from the
//! wire format is up to the transport that carries the messages.

use std::fmt;

use crate::rr::Record;

mod question;
mod rcode;
pub use question::Question;
pub use rcode::{IntoRcodeError, Rcode};

/// A decoded DNS message.
///
/// The EDNS(0) "DNSSEC OK" bit ([RFC 3225]) is represented directly by
/// the `dnssec_ok` field; the OPT pseudo-RR that carries it on the wire
/// is not kept in the additional section.
///
/// [RFC 3225]: https://datatracker.ietf.org/doc/html/rfc3225
#[derive(Clone, Debug, Default)]
pub struct Message {
    pub id: u16,
    pub is_response: bool,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub rcode: Rcode,
    pub dnssec_ok: bool,
    pub questions: Vec<Question>,
    pub answers: Vec<Record>,
    pub authority_records: Vec<Record>,
    pub additional_records: Vec<Record>,
}

impl Message {
    /// Creates a new, empty message with all flags cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for `question` with a random ID and the RD
    /// (recursion desired) flag set.
    pub fn query(question: Question) -> Self {
        Self {
            id: rand::random(),
            recursion_desired: true,
            questions: vec![question],
            ..Self::default()
        }
    }

    /// Creates the envelope of a response to this message. The ID,
    /// questions, and RD flag are copied, and the QR flag is set. All
    /// other flags are cleared and the record sections are empty.
    pub fn create_response(&self) -> Self {
        Self {
            id: self.id,
            is_response: true,
            recursion_desired: self.recursion_desired,
            questions: self.questions.clone(),
            ..Self::default()
        }
    }
}

/// Displays the message in the style of `dig` output.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, ";; id: {}, status: {}, flags:", self.id, self.rcode)?;
        let flags = [
            (self.is_response, "qr"),
            (self.authoritative, "aa"),
            (self.truncated, "tc"),
            (self.recursion_desired, "rd"),
            (self.recursion_available, "ra"),
            (self.dnssec_ok, "do"),
        ];
        for (_, flag) in flags.iter().filter(|(set, _)| *set) {
            write!(f, " {}", flag)?;
        }
        writeln!(f)?;

        writeln!(f, "\n;; QUESTION SECTION:")?;
        for question in &self.questions {
            writeln!(f, ";{}", question)?;
        }
        let sections = [
            ("ANSWER", &self.answers),
            ("AUTHORITY", &self.authority_records),
            ("ADDITIONAL", &self.additional_records),
        ];
        for (title, records) in sections {
            if !records.is_empty() {
                writeln!(f, "\n;; {} SECTION:", title)?;
                for record in records.iter() {
                    writeln!(f, "{}", record)?;
                }
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;
    use crate::rr::Type;

    #[test]
    fn create_response_mirrors_request() {
        let question = Question::new("cairn.test.".parse().unwrap(), Type::A, Class::IN);
        let mut query = Message::query(question.clone());
        query.dnssec_ok = true;
        let response = query.create_response();
        assert_eq!(response.id, query.id);
        assert!(response.is_response);
        assert!(response.recursion_desired);
        assert!(!response.dnssec_ok);
        assert_eq!(response.questions, vec![question]);
        assert_eq!(response.rcode, Rcode::NoError);
    }
}
