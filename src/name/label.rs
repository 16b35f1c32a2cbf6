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

//! Implementation of the [`Label`] type.

use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt;
use std::hash::{Hash, Hasher};

use arrayvec::ArrayVec;

use super::{Error, MAX_LABEL_LEN};

////////////////////////////////////////////////////////////////////////
// LABELS                                                             //
////////////////////////////////////////////////////////////////////////

/// The label given to a node in the Domain Name System's tree
/// structure.
///
/// A `Label` owns its octets in a fixed-capacity buffer, so it can only
/// be constructed if the data is a valid non-null DNS label (that is,
/// if it is between 1 and 63 octets long). The null label of the root
/// is never stored; it is implicit at the end of every
/// [`Name`](super::Name).
///
/// Note that in accordance with [RFC 1034 § 3.1]:
///
/// * comparisons between `Label`s are case-insensitive assuming ASCII,
///   but
/// * case is preserved in the internal representation.
///
/// ```
/// use std::convert::TryFrom;
/// use cairn::name::Label;
///
/// let label = Label::try_from(&b"Example"[..]).unwrap();
/// assert_eq!(label, Label::try_from(&b"EXAMPLE"[..]).unwrap());
/// ```
///
/// [RFC 1034 § 3.1]: https://tools.ietf.org/html/rfc1034#section-3.1
#[derive(Clone)]
pub struct Label {
    octets: ArrayVec<u8, MAX_LABEL_LEN>,
}

#[allow(clippy::len_without_is_empty)] // Labels are never empty.
impl Label {
    /// Wraps up octets as a `Label` without checking their length for
    /// validity. To be used only within the parent module, and only
    /// for octets known to be between 1 and 63 octets long.
    pub(super) fn from_unchecked(octets: &[u8]) -> Self {
        debug_assert!(!octets.is_empty() && octets.len() <= MAX_LABEL_LEN);
        Self {
            octets: octets.iter().copied().collect(),
        }
    }

    /// Returns the number of octets in this `Label`.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns the octets of this `Label`.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }

    /// Returns a copy of this `Label` with all ASCII letters lowercased.
    pub fn to_lowercase(&self) -> Self {
        let mut octets = self.octets.clone();
        octets.make_ascii_lowercase();
        Self { octets }
    }
}

impl TryFrom<&[u8]> for Label {
    type Error = Error;

    fn try_from(octets: &[u8]) -> Result<Self, Self::Error> {
        if octets.is_empty() {
            Err(Error::NullNonTerminal)
        } else {
            ArrayVec::try_from(octets)
                .map(|octets| Self { octets })
                .or(Err(Error::LabelTooLong))
        }
    }
}

/// When a `Label` is displayed, periods, backslashes, and octets that
/// are not ASCII graphic characters are escaped in accordance with
/// RFC 1035 § 5.1 and RFC 4343 § 2.1.
/// * Periods are escaped `\.`;
/// * backslashes are escaped `\\`;
/// * all other ASCII graphic characters are not escaped; and
/// * all other octets are escaped `\xyz`, where `xyz` is the
///   three-digit zero-padded decimal representation of the octet.
impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for octet in self.octets() {
            match *octet {
                b'.' => f.write_str("\\.")?,
                b'\\' => f.write_str("\\\\")?,
                o if o.is_ascii_graphic() => write!(f, "{}", o as char)?,
                o => write!(f, "\\{:03}", o)?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

/// In accordance with RFC 1034 § 3.1 (clarified by RFC 4343),
/// comparison of `Label`s is ASCII-case-insensitive.
impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.octets().eq_ignore_ascii_case(other.octets())
    }
}

impl Eq for Label {}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The [`Ord`] implementation for `Label` employs DNSSEC's canonical
/// ordering of labels. In accordance with [RFC 4034 § 6.1], `Label`s
/// are ordered "as unsigned left-justified octet strings," with the
/// additional stipulation that uppercase ASCII letters are treated as
/// if they were lowercase.
///
/// [RFC 4034 § 6.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.octets.iter().map(u8::to_ascii_lowercase);
        let rhs = other.octets.iter().map(u8::to_ascii_lowercase);
        lhs.cmp(rhs)
    }
}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // We have to hash in a case-insensitive manner to match our
        // implementations of [`PartialEq`] and [`Eq`].
        state.write_usize(self.octets.len());
        for octet in self.octets().iter().map(u8::to_ascii_lowercase) {
            state.write_u8(octet);
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn label(octets: &[u8]) -> Label {
        Label::try_from(octets).unwrap()
    }

    #[test]
    fn try_from_accepts_ok_lengths() {
        let octets = &[b'a'; MAX_LABEL_LEN];
        for i in 1..=MAX_LABEL_LEN {
            Label::try_from(&octets[0..i]).unwrap();
        }
    }

    #[test]
    fn try_from_rejects_bad_lengths() {
        assert_eq!(
            Label::try_from(&[0u8; MAX_LABEL_LEN + 1][..]),
            Err(Error::LabelTooLong)
        );
        assert_eq!(Label::try_from(&[0u8; 0][..]), Err(Error::NullNonTerminal));
    }

    #[test]
    fn eq_and_hash_are_case_insensitive() {
        let uppercase = label(b"EXAMPLE");
        let lowercase = label(b"example");
        assert_eq!(uppercase, lowercase);

        let mut hasher = DefaultHasher::new();
        uppercase.hash(&mut hasher);
        let uppercase_hash = hasher.finish();
        let mut hasher = DefaultHasher::new();
        lowercase.hash(&mut hasher);
        assert_eq!(uppercase_hash, hasher.finish());
    }

    #[test]
    fn ord_works() {
        let labels = [
            (0, label(b"exam")),
            (1, label(b"example")),
            (1, label(b"eXaMpLe")),
            (2, label(b"examples")),
            (3, label(b"label")),
        ];
        for (i, li) in labels.iter() {
            for (j, lj) in labels.iter() {
                assert_eq!(i.cmp(j), li.cmp(lj));
            }
        }
    }

    #[test]
    fn display_escaping_works() {
        assert_eq!(label(b"\x00\\.a").to_string(), "\\000\\\\\\.a");
    }
}
