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

//! Additional-section processing.
//!
//! After the answer and authority sections are filled in, records that
//! a client is likely to need next are added to the additional
//! section: the addresses of name servers and SRV targets, the other
//! address family of an address record, and so on. Records added this
//! way may call for further additional records themselves (an NS
//! target that is an alias, say), so processing repeats on the newly
//! added records until nothing new turns up. Since every pass must add
//! records not already in the response, and the catalog is finite,
//! this terminates.

use arrayvec::ArrayVec;
use log::trace;
use tokio_util::sync::CancellationToken;

use super::{dedup_records, Resolver, Result};
use crate::message::{Message, Question};
use crate::name::Name;
use crate::rr::{Rdata, Record, Type};

/// The most lookups any one record calls for (an SRV record's TXT
/// records and its target's two address families).
const MAX_LOOKUPS_PER_RECORD: usize = 3;

/// Adds additional records for everything currently in `response`.
pub(super) async fn add_additional_records(
    resolver: &Resolver,
    response: &mut Message,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut pending: Vec<Record> = response
        .answers
        .iter()
        .chain(response.additional_records.iter())
        .chain(response.authority_records.iter())
        .cloned()
        .collect();

    while !pending.is_empty() {
        let mut scratch = Message::new();
        for record in &pending {
            for question in lookups_for(record) {
                resolver.find_answer(&question, &mut scratch, cancel).await?;
            }
        }

        let mut found = scratch.answers;
        dedup_records(&mut found);
        found.retain(|record| {
            !response.answers.contains(record) && !response.additional_records.contains(record)
        });
        if !found.is_empty() {
            trace!("adding {} additional records", found.len());
        }
        response.additional_records.extend(found.iter().cloned());
        pending = found;
    }
    Ok(())
}

/// Returns the lookups whose results belong in the additional section
/// of a response containing `record`.
fn lookups_for(record: &Record) -> ArrayVec<Question, MAX_LOOKUPS_PER_RECORD> {
    let mut lookups = ArrayVec::new();
    let mut ask = |name: &Name, qtype: Type| {
        lookups.push(Question::new(name.clone(), qtype, record.class));
    };

    match record.rdata {
        Rdata::A(_) => ask(&record.name, Type::AAAA),
        Rdata::Aaaa(_) => ask(&record.name, Type::A),
        Rdata::Ns(ref target) => {
            ask(target, Type::A);
            ask(target, Type::AAAA);
        }
        Rdata::Ptr(ref target) => ask(target, Type::ANY),
        Rdata::Soa(ref soa) => {
            ask(&soa.mname, Type::A);
            ask(&soa.mname, Type::AAAA);
        }
        Rdata::Srv(ref srv) => {
            ask(&record.name, Type::TXT);
            // A target of "." means the service is not available
            // (RFC 2782).
            if !srv.target.is_root() {
                ask(&srv.target, Type::A);
                ask(&srv.target, Type::AAAA);
            }
        }
        _ => (),
    }
    lookups
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
