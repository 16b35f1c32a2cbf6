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

//! Provides the [`Record`] structure.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::IpAddr;
use std::time::SystemTime;

use super::{Rdata, Ttl, Type};
use crate::class::Class;
use crate::name::Name;

/// A DNS resource record.
///
/// Besides the usual owner, class, TTL, and data fields, each `Record`
/// remembers when it was created. For cached (non-authoritative) data,
/// the record expires once its TTL has elapsed since that time; see
/// [`Record::is_expired`].
///
/// The TTL and the creation time are volatile metadata: two records
/// with the same owner, class, and data are equal (and hash equally)
/// regardless of them. This lets the catalog refresh the metadata of a
/// stored record by adding a new copy of it.
#[derive(Clone, Debug)]
pub struct Record {
    pub name: Name,
    pub class: Class,
    pub ttl: Ttl,
    pub created: SystemTime,
    pub rdata: Rdata,
}

impl Record {
    /// Creates a new `Record` whose creation time is now.
    pub fn new(name: Name, class: Class, ttl: Ttl, rdata: Rdata) -> Self {
        Self {
            name,
            class,
            ttl,
            created: SystemTime::now(),
            rdata,
        }
    }

    /// Returns the RR type of the record.
    pub fn rr_type(&self) -> Type {
        self.rdata.rr_type()
    }

    /// Returns whether the record's TTL has run out as of `now`, i.e.
    /// whether `created + ttl < now`.
    pub fn is_expired(&self, now: SystemTime) -> bool {
        match self.created.checked_add(self.ttl.as_duration()) {
            Some(expiry) => expiry < now,
            None => false,
        }
    }

    /// Returns the address held by an A or AAAA record.
    pub fn address(&self) -> Option<IpAddr> {
        match self.rdata {
            Rdata::A(v4) => Some(v4.into()),
            Rdata::Aaaa(v6) => Some(v6.into()),
            _ => None,
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.class == other.class && self.rdata == other.rdata
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.class.hash(state);
        self.rdata.hash(state);
    }
}

/// Displays the record as a line of a zone file.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.name,
            self.ttl,
            self.class,
            self.rr_type(),
            self.rdata,
        )
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::time::Duration;

    fn a_record(ttl: u32) -> Record {
        Record::new(
            "host.cairn.test.".parse().unwrap(),
            Class::IN,
            Ttl::from(ttl),
            Rdata::A(Ipv4Addr::LOCALHOST),
        )
    }

    #[test]
    fn equality_ignores_ttl_and_creation_time() {
        let mut old = a_record(60);
        old.created -= Duration::from_secs(3600);
        let new = a_record(7200);
        assert_eq!(old, new);

        let mut other_class = a_record(60);
        other_class.class = Class::CH;
        assert_ne!(old, other_class);
    }

    #[test]
    fn expiry_works() {
        let record = a_record(60);
        assert!(!record.is_expired(record.created));
        assert!(!record.is_expired(record.created + Duration::from_secs(60)));
        assert!(record.is_expired(record.created + Duration::from_secs(61)));
    }

    #[test]
    fn address_works() {
        assert_eq!(a_record(60).address(), Some(IpAddr::V4(Ipv4Addr::LOCALHOST)));
    }

    #[test]
    fn display_is_zone_file_line() {
        assert_eq!(
            a_record(300).to_string(),
            "host.cairn.test. 300 IN A 127.0.0.1"
        );
    }
}
