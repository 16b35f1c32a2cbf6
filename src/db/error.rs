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

//! Implementation of the [`Error`] type for catalog operations.

use std::fmt;

use crate::name::Name;

/// Errors that arise while loading records into a
/// [`Catalog`](super::Catalog).
#[derive(Debug)]
pub enum Error {
    /// The records making up a zone do not form a valid zone.
    MalformedZone(ZoneProblem),

    /// A zone being loaded contains a name that already has a node in
    /// the catalog.
    DuplicateNode(Name),

    /// The record source failed.
    Source(Box<dyn std::error::Error + Send + Sync>),
}

/// Describes why the records passed to
/// [`Catalog::include_zone`](super::Catalog::include_zone) are not a
/// valid zone.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ZoneProblem {
    Empty,
    FirstNotSoa,
    TooManyApexSoas,
    OutOfZone(Name),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MalformedZone(problem) => write!(f, "malformed zone: {}", problem),
            Self::DuplicateNode(name) => {
                write!(f, "the catalog already has a node for {}", name)
            }
            Self::Source(_) => f.write_str("failed to read records"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Source(error) => Some(error.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for ZoneProblem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("the zone has no records"),
            Self::FirstNotSoa => f.write_str("the first record of the zone is not an SOA record"),
            Self::TooManyApexSoas => {
                f.write_str("the zone has too many SOA records (precisely one is needed)")
            }
            Self::OutOfZone(name) => write!(f, "the record owner {} is outside the zone", name),
        }
    }
}
