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

//! Implementation of the [`Error`] type for resolution.

use std::fmt;

/// Errors that abort a resolution.
///
/// Not finding an answer is not an error: it shows up in the response
/// as an NXDOMAIN status.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// The cancellation token was triggered.
    Cancelled,

    /// The catalog holds data that cannot be resolved, such as an
    /// alias chain that is too long or loops.
    InvalidState(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("resolution was cancelled"),
            Self::InvalidState(what) => write!(f, "invalid catalog state: {}", what),
        }
    }
}

impl std::error::Error for Error {}
