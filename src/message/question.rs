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

//! Implementation of the [`Question`] type.

use std::fmt;
use std::time::SystemTime;

use crate::class::Class;
use crate::name::Name;
use crate::rr::Type;

/// The question of a DNS query.
///
/// Defined in [RFC 1035 § 4.1.2], a DNS question includes
///
/// * the QNAME, which is the domain name whose records are being
///   queried;
/// * the QTYPE, which specifies what types of records are desired
///   ([`Type::ANY`] asks for all of them); and
/// * the QCLASS, which specifies which DNS class(es) to search
///   ([`Class::ANY`] searches all of them).
///
/// A question also records when it was created. Cached records are
/// checked for expiry against this time rather than the time at which
/// each lookup happens, so all lookups made for one question see the
/// same cache state.
///
/// [RFC 1035 § 4.1.2]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.2
#[derive(Clone, Debug)]
pub struct Question {
    pub name: Name,
    pub qtype: Type,
    pub qclass: Class,
    pub created: SystemTime,
}

impl Question {
    /// Creates a new `Question` whose creation time is now.
    pub fn new(name: Name, qtype: Type, qclass: Class) -> Self {
        Self {
            name,
            qtype,
            qclass,
            created: SystemTime::now(),
        }
    }

    /// Returns a copy of this question asking about `name` instead. The
    /// creation time is kept.
    pub fn with_name(&self, name: Name) -> Self {
        Self {
            name,
            qtype: self.qtype,
            qclass: self.qclass,
            created: self.created,
        }
    }
}

impl PartialEq for Question {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.qtype == other.qtype && self.qclass == other.qclass
    }
}

impl Eq for Question {}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.qclass, self.qtype)
    }
}
