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

//! Resolver configuration.

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Settings for a [`Resolver`](super::Resolver).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ResolverConfig {
    /// Whether to answer every question in a message. Classic DNS
    /// servers stop after the first question that has an answer;
    /// multicast DNS responders answer them all.
    pub answer_all_questions: bool,

    /// The number of CNAME records that may be followed while
    /// answering a single question.
    pub max_alias_chain: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            answer_all_questions: false,
            max_alias_chain: 16,
        }
    }
}
