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

//! Facilities for storing and accessing DNS data.
//!
//! The DNS is essentially a distributed database. Cairn keeps its part
//! of that database in memory, in a single [`Catalog`]: a flat map
//! from domain names to [`Node`]s, each of which holds the
//! [`RecordSet`] of records owned by its name. Unlike the tiered
//! catalog-of-zones structure suggested by [RFC 1035 § 6.1.2], there
//! is no separate zone structure. Zone boundaries are found when
//! needed by walking up the tree of names to the nearest node with an
//! SOA record.
//!
//! The same catalog holds authoritative data (zones loaded from zone
//! files, the root hints, and records added by the operator) and
//! cached data. Each node carries a flag saying which kind of data it
//! holds; see [`Node`].
//!
//! All operations take `&self` and may be called from any number of
//! threads or tasks at once. The catalog, each node's record set, and
//! each node's authoritative flag are individually consistent, but
//! there are no transactions spanning several names.
//!
//! [RFC 1035 § 6.1.2]: https://datatracker.ietf.org/doc/html/rfc1035#section-6.1.2

mod catalog;
mod error;
mod node;
mod record_set;

pub use catalog::{Catalog, Result};
pub use error::{Error, ZoneProblem};
pub use node::Node;
pub use record_set::RecordSet;
