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

//! Cairn is an in-memory DNS resolution engine.
//!
//! A [`Catalog`](db::Catalog) holds DNS data, both authoritative
//! (zones, root hints, and records added by the operator) and cached.
//! A [`Resolver`](resolve::Resolver) answers questions from it,
//! following aliases, adding glue, and attaching DNSSEC signatures on
//! request. The catalog may be shared by any number of concurrent
//! resolutions and writers, and neither part does any network or file
//! I/O: transports and zone sources are supplied by the caller.
//!
//! ```
//! use std::sync::Arc;
//!
//! use cairn::class::Class;
//! use cairn::db::Catalog;
//! use cairn::message::{Message, Question};
//! use cairn::resolve::Resolver;
//! use cairn::rr::Type;
//! use cairn::zone_file::Parser;
//! use tokio_util::sync::CancellationToken;
//!
//! let zone = b"cairn.test. 3600 SOA ns.cairn.test. admin.cairn.test. 1 2 3 4 5\n\
//!              www.cairn.test. 3600 A 192.0.2.1\n";
//! let catalog = Catalog::new();
//! catalog.include_zone(Parser::new(&zone[..])).unwrap();
//!
//! let resolver = Resolver::new(Arc::new(catalog));
//! let question = Question::new("www.cairn.test.".parse().unwrap(), Type::A, Class::IN);
//! let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let response = runtime
//!     .block_on(resolver.resolve(&Message::query(question), &CancellationToken::new()))
//!     .unwrap();
//! assert_eq!(response.answers.len(), 1);
//! assert!(response.authoritative);
//! ```

pub mod class;
pub mod db;
pub mod message;
pub mod name;
pub mod resolve;
pub mod rr;
pub mod zone_file;
mod util;
