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

//! Implementation of the [`Class`] type for DNS classes.

use std::fmt;
use std::str::FromStr;


/// Represents a class in the DNS.
///
/// A class is represented on the wire as an unsigned 16-bit integer, so
/// this is basically a wrapper around [`u16`] with nice
/// [`Debug`](fmt::Debug), [`Display`](fmt::Display), and [`FromStr`]
/// implementations, as well as constants for the defined classes. The
/// only data class in common use is [`IN`](Class::IN).
///
/// The QCLASS value [`ANY`](Class::ANY) is also represented by this
/// type. It never appears on stored records; in a question it matches
/// records of every class (see [`Class::matches`]).
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Class(u16);

impl Class {
    // RFC 1035. We don't include CS because it's no longer listed by
    // the IANA.
    pub const IN: Self = Self(1);
    pub const CH: Self = Self(3);
    pub const HS: Self = Self(4);

    // RFC 1035 § 3.2.5 (QCLASS only).
    pub const ANY: Self = Self(255);

    /// Returns whether a question of class `self` asks for records of
    /// class `record_class`.
    pub fn matches(self, record_class: Class) -> bool {
        self == Self::ANY || self == record_class
    }
}

impl Default for Class {
    fn default() -> Self {
        Self::IN
    }
}

impl From<u16> for Class {
    fn from(value: u16) -> Self {
        Class(value)
    }
}

impl From<Class> for u16 {
    fn from(class: Class) -> Self {
        class.0
    }
}

impl FromStr for Class {
    type Err = &'static str;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.to_ascii_uppercase().as_str() {
            "IN" => Ok(Self::IN),
            "CH" => Ok(Self::CH),
            "HS" => Ok(Self::HS),
            "ANY" | "*" => Ok(Self::ANY),
            _ => {
                if text
                    .get(0..5)
                    .map_or(false, |prefix| prefix.eq_ignore_ascii_case("CLASS"))
                {
                    text[5..]
                        .parse::<u16>()
                        .map(Self::from)
                        .or(Err("class value is not a valid unsigned 16-bit integer"))
                } else {
                    Err("unknown class")
                }
            }
        }
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", *self)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::IN => write!(f, "IN"),
            Self::CH => write!(f, "CH"),
            Self::HS => write!(f, "HS"),
            Self::ANY => write!(f, "ANY"),
            Self(value) => write!(f, "CLASS{}", value), // RFC 3597 § 5
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Class;

    #[test]
    fn displays_according_to_rfc3597() {
        // CLASS65280 is from the private use range, so it should always
        // be unknown.
        let class = Class::from(0xff00);
        assert_eq!(class.to_string(), "CLASS65280");
    }

    #[test]
    fn parses_according_to_rfc3597() {
        let class_in: Class = "CLASS1".parse().unwrap();
        let class_65280: Class = "class65280".parse().unwrap();
        assert_eq!(class_in, Class::IN);
        assert_eq!(u16::from(class_65280), 65280);
    }

    #[test]
    fn any_matches_every_class() {
        assert!(Class::ANY.matches(Class::IN));
        assert!(Class::ANY.matches(Class::CH));
        assert!(Class::IN.matches(Class::IN));
        assert!(!Class::IN.matches(Class::CH));
    }
}
