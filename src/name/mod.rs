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

//! Implementation of data structures related to domain names.

use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

mod arpa;
mod error;
mod label;
pub use arpa::reverse_name;
pub use error::Error;
pub use label::Label;

/// The maximum length of the uncompressed on-the-wire representation of
/// a domain name.
const MAX_WIRE_LEN: usize = 255;

/// The maximum length of a label in a domain name (not including the
/// octet that provides the length).
const MAX_LABEL_LEN: usize = 63;

////////////////////////////////////////////////////////////////////////
// NAME STRUCTURE                                                     //
////////////////////////////////////////////////////////////////////////

/// A structure to represent a domain name.
///
/// A `Name` is a sequence of non-null [`Label`]s, stored from the
/// leftmost (most specific) label to the rightmost. The null label of
/// the root is implicit, so the root name has no stored labels at all.
/// All `Name`s are absolute.
///
/// `Name`s can be constructed in several ways:
///
/// * through the [`FromStr`] implementation, which accepts text with or
///   without the trailing period;
/// * from an iterator of [`Label`]s with [`Name::from_labels`]; and
/// * by deriving them from other names, e.g. with [`Name::parent`] and
///   [`Name::prepend`].
///
/// As with [`Label`]s, equality and hashing are ASCII-case-insensitive
/// while case is preserved. The [`Ord`] implementation is the DNSSEC
/// canonical ordering; see [`Name::canonical_key`].
#[derive(Clone, Default)]
pub struct Name {
    labels: Vec<Label>,
}

impl Name {
    /// Returns the root name `.`.
    pub const fn root() -> Self {
        Self { labels: Vec::new() }
    }

    /// Constructs a `Name` from labels given leftmost first. Fails if
    /// the name would be longer than 255 octets on the wire.
    pub fn from_labels<I>(labels: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Label>,
    {
        let name = Self {
            labels: labels.into_iter().collect(),
        };
        if name.wire_len() > MAX_WIRE_LEN {
            Err(Error::NameTooLong)
        } else {
            Ok(name)
        }
    }

    /// Returns whether this is the root name.
    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the number of non-null labels in the name. The root has
    /// a label count of zero.
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Returns the labels of the name, leftmost first.
    pub fn labels(&self) -> std::slice::Iter<Label> {
        self.labels.iter()
    }

    /// Returns the length of the uncompressed on-the-wire
    /// representation of the name.
    pub fn wire_len(&self) -> usize {
        self.labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1
    }

    /// Returns the name with the leftmost label removed, or [`None`] if
    /// this is the root.
    pub fn parent(&self) -> Option<Name> {
        if self.is_root() {
            None
        } else {
            Some(Self {
                labels: self.labels[1..].to_vec(),
            })
        }
    }

    /// Returns whether this name is equal to or a subdomain of `other`
    /// (i.e., whether `other` is this name or one of its ancestors).
    pub fn eq_or_subdomain_of(&self, other: &Name) -> bool {
        other.labels.len() <= self.labels.len()
            && self.labels[self.labels.len() - other.labels.len()..] == other.labels[..]
    }

    /// Returns a new name made by adding `label` to the left of this
    /// name.
    pub fn prepend(&self, label: Label) -> Result<Name, Error> {
        Self::from_labels(std::iter::once(label).chain(self.labels.iter().cloned()))
    }

    /// Returns a new name made by appending `suffix` to the right of
    /// this name. This is how relative names are made absolute.
    pub fn append(&self, suffix: &Name) -> Result<Name, Error> {
        Self::from_labels(self.labels.iter().chain(suffix.labels.iter()).cloned())
    }

    /// Returns a copy of this name with all ASCII letters lowercased.
    pub fn to_lowercase(&self) -> Name {
        Self {
            labels: self.labels.iter().map(Label::to_lowercase).collect(),
        }
    }

    /// Returns the canonical projection of the name: its labels
    /// lowercased and in reverse order (rightmost first), each label
    /// followed by a zero octet. Comparing these keys octet-wise yields
    /// the [RFC 4034 § 6.1] canonical order, and the root's key is
    /// empty.
    ///
    /// So that the terminating zero sorts below every octet a label can
    /// hold, label octets 0 and 1 are written as `01 01` and `01 02`.
    ///
    /// [RFC 4034 § 6.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
    pub fn canonical_key(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.wire_len());
        for label in self.labels.iter().rev() {
            for octet in label.octets().iter().map(u8::to_ascii_lowercase) {
                match octet {
                    0 | 1 => key.extend([1, octet + 1]),
                    _ => key.push(octet),
                }
            }
            key.push(0);
        }
        key
    }
}

////////////////////////////////////////////////////////////////////////
// NAME TRAIT IMPLEMENTATIONS                                         //
////////////////////////////////////////////////////////////////////////

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        for label in self.labels() {
            write!(f, "{}.", label)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Name(\"{}\")", self)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels
    }
}

impl Eq for Name {}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Names are ordered by DNSSEC's canonical ordering ([RFC 4034 § 6.1]):
/// labels are compared pairwise starting from the rightmost, and a name
/// that runs out of labels first (i.e., an ancestor) sorts first.
///
/// [RFC 4034 § 6.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.labels.iter().rev().cmp(other.labels.iter().rev())
    }
}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.labels.hash(state);
    }
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (labels, _) = parse_labels(s)?;
        Self::from_labels(labels)
    }
}

/// Parses the textual representation of a domain name into labels.
/// The returned flag is `true` if the text ended with an unescaped
/// period (i.e., was fully qualified). The text `.` yields no labels
/// and is fully qualified.
///
/// This is shared with the zone file parser, which needs to know
/// whether a name is relative to the origin.
pub(crate) fn parse_labels(s: &str) -> Result<(Vec<Label>, bool), Error> {
    if s.is_empty() {
        return Err(Error::StrEmpty);
    } else if !s.is_ascii() {
        return Err(Error::StrNotAscii);
    } else if s == "." {
        return Ok((Vec::new(), true));
    }

    let mut labels = Vec::new();
    let mut current = Vec::new();
    let mut fully_qualified = false;
    let mut octets = s.bytes().peekable();
    while let Some(octet) = octets.next() {
        fully_qualified = false;
        match octet {
            b'.' => {
                labels.push(Label::try_from(current.as_slice())?);
                current.clear();
                fully_qualified = true;
            }
            b'\\' => match octets.next() {
                Some(d) if d.is_ascii_digit() => {
                    let mut value = (d - b'0') as u16;
                    for _ in 0..2 {
                        match octets.next() {
                            Some(d) if d.is_ascii_digit() => value = value * 10 + (d - b'0') as u16,
                            _ => return Err(Error::InvalidEscape),
                        }
                    }
                    current.push(u8::try_from(value).or(Err(Error::InvalidEscape))?);
                }
                Some(escaped) => current.push(escaped),
                None => return Err(Error::InvalidEscape),
            },
            _ => current.push(octet),
        }
        if current.len() > MAX_LABEL_LEN {
            return Err(Error::LabelTooLong);
        }
    }
    if !current.is_empty() {
        labels.push(Label::try_from(current.as_slice())?);
    }
    Ok((labels, fully_qualified))
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    #[test]
    fn root_has_expected_characteristics() {
        let root = Name::root();
        assert!(root.is_root());
        assert_eq!(root.label_count(), 0);
        assert_eq!(root.wire_len(), 1);
        assert_eq!(root.to_string(), ".");
        assert!(root.parent().is_none());
        assert!(root.canonical_key().is_empty());
        assert_eq!(name("."), root);
    }

    #[test]
    fn fromstr_works_with_and_without_trailing_period() {
        assert_eq!(name("cairn.test."), name("cairn.test"));
        assert_eq!(name("cairn.test").to_string(), "cairn.test.");
    }

    #[test]
    fn fromstr_rejects_bad_input() {
        assert_eq!("".parse::<Name>(), Err(Error::StrEmpty));
        assert_eq!("ä.test.".parse::<Name>(), Err(Error::StrNotAscii));
        assert_eq!("a..test.".parse::<Name>(), Err(Error::NullNonTerminal));
        assert_eq!("a\\99".parse::<Name>(), Err(Error::InvalidEscape));
        assert_eq!("a\\256".parse::<Name>(), Err(Error::InvalidEscape));
        let long_label = "a".repeat(64);
        assert_eq!(long_label.parse::<Name>(), Err(Error::LabelTooLong));
        let long_name = ["abcdefghi"; 26].join(".");
        assert_eq!(long_name.parse::<Name>(), Err(Error::NameTooLong));
    }

    #[test]
    fn fromstr_processes_escapes() {
        let n = name("a\\.b.c\\065.");
        assert_eq!(n.label_count(), 2);
        assert_eq!(n.labels().next().unwrap().octets(), b"a.b");
        assert_eq!(n.labels().nth(1).unwrap().octets(), b"cA");
        assert_eq!(n.to_string(), "a\\.b.cA.");
    }

    #[test]
    fn parent_strips_leftmost_label() {
        let n = name("www.cairn.test.");
        assert_eq!(n.parent(), Some(name("cairn.test.")));
        assert_eq!(name("test.").parent(), Some(Name::root()));
    }

    #[test]
    fn eq_or_subdomain_of_works() {
        let apex = name("cairn.test.");
        assert!(name("cairn.test.").eq_or_subdomain_of(&apex));
        assert!(name("WWW.Cairn.TEST.").eq_or_subdomain_of(&apex));
        assert!(name("a.b.cairn.test.").eq_or_subdomain_of(&apex));
        assert!(!name("test.").eq_or_subdomain_of(&apex));
        assert!(!name("xcairn.test.").eq_or_subdomain_of(&apex));
        assert!(apex.eq_or_subdomain_of(&Name::root()));
    }

    #[test]
    fn prepend_and_append_work() {
        let label = Label::try_from(&b"www"[..]).unwrap();
        assert_eq!(
            name("cairn.test.").prepend(label).unwrap(),
            name("www.cairn.test.")
        );
        assert_eq!(
            name("www").append(&name("cairn.test.")).unwrap(),
            name("www.cairn.test.")
        );
    }

    #[test]
    fn eq_is_case_insensitive_but_case_is_preserved() {
        let upper = name("EXAMPLE.com.");
        assert_eq!(upper, name("example.COM."));
        assert_eq!(upper.to_string(), "EXAMPLE.com.");
        assert_eq!(upper.to_lowercase().to_string(), "example.com.");
    }

    #[test]
    fn ord_matches_rfc4034_example() {
        // The example from RFC 4034 § 6.1, in canonical order.
        let ordered = [
            "example.",
            "a.example.",
            "yljkjljk.a.example.",
            "Z.a.example.",
            "zABC.a.EXAMPLE.",
            "z.example.",
            "\\001.z.example.",
            "*.z.example.",
            "\\200.z.example.",
        ]
        .into_iter()
        .map(name)
        .collect::<Vec<_>>();

        let mut shuffled = ordered.clone();
        shuffled.reverse();
        shuffled.swap(0, 4);
        shuffled.sort();
        assert_eq!(shuffled, ordered);

        let mut by_key = ordered.clone();
        by_key.reverse();
        by_key.sort_by_key(Name::canonical_key);
        assert_eq!(by_key, ordered);
    }

    #[test]
    fn canonical_key_orders_labels_with_low_octets() {
        // A \000 octet inside a label must not look like the end of
        // the label.
        let ordered = [
            "example.",
            "a.example.",
            "b.a.example.",
            "c.a.example.",
            "a\\000.example.",
            "a\\000b.example.",
            "a\\001.example.",
            "a\\002.example.",
        ]
        .into_iter()
        .map(name)
        .collect::<Vec<_>>();

        let mut by_ord = ordered.clone();
        by_ord.reverse();
        by_ord.sort();
        assert_eq!(by_ord, ordered);

        let mut by_key = ordered.clone();
        by_key.reverse();
        by_key.sort_by_key(Name::canonical_key);
        assert_eq!(by_key, ordered);

        assert_ne!(
            name("b.a.example.").canonical_key(),
            name("a\\000b.example.").canonical_key()
        );
    }
}
