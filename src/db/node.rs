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

//! The [`Node`] structure, representing the records owned by one domain
//! name in a [`Catalog`](super::Catalog).

use std::sync::atomic::{AtomicBool, Ordering};

use super::RecordSet;
use crate::name::Name;
use crate::rr::{Record, Type};

/// The records owned by one domain name.
///
/// A node is *authoritative* if its records came from a loaded zone,
/// the root hints, or a static addition, and *non-authoritative* if
/// they are cached answers. Authoritative records never expire; cached
/// ones are only used until their TTL runs out.
///
/// Every record in [`Node::resources`] is owned by [`Node::name`]; the
/// [`Catalog`](super::Catalog) upholds this when adding records.
#[derive(Debug)]
pub struct Node {
    name: Name,
    authoritative: AtomicBool,
    resources: RecordSet,
}

impl Node {
    /// Creates a new, empty `Node`.
    pub fn new(name: Name, authoritative: bool) -> Self {
        Self {
            name,
            authoritative: AtomicBool::new(authoritative),
            resources: RecordSet::new(),
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn is_authoritative(&self) -> bool {
        self.authoritative.load(Ordering::Acquire)
    }

    pub fn set_authoritative(&self, authoritative: bool) {
        self.authoritative.store(authoritative, Ordering::Release);
    }

    pub fn resources(&self) -> &RecordSet {
        &self.resources
    }

    /// Returns the node's SOA record, of any class, if it has one.
    pub fn soa(&self) -> Option<Record> {
        self.resources
            .filter(|record| record.rr_type() == Type::SOA)
            .into_iter()
            .next()
    }
}
