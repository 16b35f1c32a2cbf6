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

//! The [`Catalog`] structure.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, trace};

use super::{Error, Node, ZoneProblem};
use crate::name::{self, Name};
use crate::rr::{Rdata, Record, Type};
use crate::zone_file::Parser;

/// The root hints: the names and addresses of the root name servers,
/// as published by the IANA.
const ROOT_HINTS: &str = include_str!("named.root");

/// A concurrent, in-memory map from domain names to [`Node`]s.
///
/// The catalog holds both authoritative data (loaded zones, root
/// hints, and static additions) and cached data, and it is shared
/// between any number of concurrent resolutions and writers. Every
/// operation on a single name is linearizable; there are no
/// transactions across names, so a reader running concurrently with a
/// zone load may see part of the zone.
///
/// Nodes are handed out as [`Arc`]s. A node removed from the catalog
/// stays usable by whoever still holds it.
#[derive(Debug, Default)]
pub struct Catalog {
    nodes: DashMap<Name, Arc<Node>>,
}

/// The result type of fallible catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Catalog {
    /// Creates a new, empty `Catalog`.
    pub fn new() -> Self {
        Self::default()
    }

    ////////////////////////////////////////////////////////////////////
    // MAP-LIKE ACCESS                                                //
    ////////////////////////////////////////////////////////////////////

    /// Returns the node for `name`, if there is one.
    pub fn get(&self, name: &Name) -> Option<Arc<Node>> {
        self.nodes.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the nodes currently in the catalog, in no particular
    /// order. This is a snapshot: nodes added or removed afterwards are
    /// not reflected.
    pub fn nodes(&self) -> Vec<Arc<Node>> {
        self.nodes.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Returns the nodes currently in the catalog in DNSSEC canonical
    /// order ([RFC 4034 § 6.1]): names are compared by their lowercased
    /// labels, starting from the root. Like [`Catalog::nodes`], this is
    /// a snapshot, so calling it again starts over with the current
    /// contents.
    ///
    /// [RFC 4034 § 6.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
    pub fn nodes_in_canonical_order(&self) -> std::vec::IntoIter<Arc<Node>> {
        let mut nodes = self.nodes();
        nodes.sort_by_cached_key(|node| node.name().canonical_key());
        nodes.into_iter()
    }

    ////////////////////////////////////////////////////////////////////
    // ZONES                                                          //
    ////////////////////////////////////////////////////////////////////

    /// Loads a zone from `records` and returns the node at its apex.
    ///
    /// The first record must be the zone's SOA record, whose owner is
    /// the apex, and every record must be at or below the apex. The
    /// whole source is read and checked before the catalog is touched.
    /// The zone's nodes are all new and authoritative: if any of its
    /// names already has a node, the load fails with
    /// [`Error::DuplicateNode`] and any nodes this call already
    /// inserted are removed again.
    pub fn include_zone<I, E>(&self, records: I) -> Result<Arc<Node>>
    where
        I: IntoIterator<Item = std::result::Result<Record, E>>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let records = records
            .into_iter()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Source(e.into()))?;

        let apex = match records.first() {
            None => return Err(Error::MalformedZone(ZoneProblem::Empty)),
            Some(soa) if soa.rr_type() != Type::SOA => {
                return Err(Error::MalformedZone(ZoneProblem::FirstNotSoa))
            }
            Some(soa) => soa.name.clone(),
        };
        if let Some(outside) = records.iter().find(|r| !r.name.eq_or_subdomain_of(&apex)) {
            return Err(Error::MalformedZone(ZoneProblem::OutOfZone(
                outside.name.clone(),
            )));
        }

        // Group the records into nodes, keeping the order in which the
        // names first appear.
        let mut order = Vec::new();
        let mut groups: HashMap<Name, Node> = HashMap::new();
        for record in records {
            let node = groups.entry(record.name.clone()).or_insert_with(|| {
                order.push(record.name.clone());
                Node::new(record.name.clone(), true)
            });
            node.resources().upsert(record);
        }
        let apex_soas = groups
            .get(&apex)
            .map_or(0, |node| node.resources().filter(|r| r.rr_type() == Type::SOA).len());
        if apex_soas > 1 {
            return Err(Error::MalformedZone(ZoneProblem::TooManyApexSoas));
        }

        if let Some(existing) = order.iter().find(|name| self.contains(name)) {
            return Err(Error::DuplicateNode(existing.clone()));
        }

        let mut inserted: Vec<Arc<Node>> = Vec::with_capacity(order.len());
        for name in order {
            let Some(node) = groups.remove(&name) else {
                continue;
            };
            match self.nodes.entry(name) {
                Entry::Occupied(occupied) => {
                    // Another writer got here between the check above
                    // and now.
                    let name = occupied.key().clone();
                    drop(occupied);
                    self.roll_back(&inserted);
                    return Err(Error::DuplicateNode(name));
                }
                Entry::Vacant(vacant) => {
                    let node = Arc::new(node);
                    vacant.insert(node.clone());
                    inserted.push(node);
                }
            }
        }

        debug!("loaded zone {} with {} nodes", apex, inserted.len());
        // The apex is always the first name inserted.
        inserted
            .into_iter()
            .next()
            .ok_or(Error::MalformedZone(ZoneProblem::Empty))
    }

    /// Removes nodes inserted by a failed zone load, unless they have
    /// since been replaced.
    fn roll_back(&self, inserted: &[Arc<Node>]) {
        for node in inserted {
            self.nodes
                .remove_if(node.name(), |_, current| Arc::ptr_eq(current, node));
        }
        debug!("rolled back {} nodes of a partially loaded zone", inserted.len());
    }

    /// Removes every node at or below `apex` and returns how many were
    /// removed. Removals happen one node at a time.
    pub fn remove_zone(&self, apex: &Name) -> usize {
        let mut removed = 0;
        self.nodes.retain(|name, _| {
            let keep = !name.eq_or_subdomain_of(apex);
            if !keep {
                removed += 1;
            }
            keep
        });
        debug!("removed zone {} ({} nodes)", apex, removed);
        removed
    }

    ////////////////////////////////////////////////////////////////////
    // INCREMENTAL ADDITIONS                                          //
    ////////////////////////////////////////////////////////////////////

    /// Adds `record` to the node for its owner, creating the node if
    /// necessary, and returns the node.
    ///
    /// `authoritative` only matters when the node is created; an
    /// existing node keeps its status. If the node already has a record
    /// equal to `record`, that record is replaced, which refreshes its
    /// TTL and creation time.
    pub fn add(&self, record: Record, authoritative: bool) -> Arc<Node> {
        let node = self
            .nodes
            .entry(record.name.clone())
            .or_insert_with(|| Arc::new(Node::new(record.name.clone(), authoritative)))
            .value()
            .clone();
        trace!("adding {}", record);
        node.resources().upsert(record);
        node
    }

    /// Adds every record from `records` with [`Catalog::add`], and
    /// returns how many were added. This is not transactional: if the
    /// source fails, the records before the failure stay added.
    pub fn include<I, E>(&self, records: I, authoritative: bool) -> Result<usize>
    where
        I: IntoIterator<Item = std::result::Result<Record, E>>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let mut count = 0;
        for record in records {
            self.add(record.map_err(|e| Error::Source(e.into()))?, authoritative);
            count += 1;
        }
        Ok(count)
    }

    /// Adds the bundled root hints and returns the root node, which is
    /// marked authoritative. The hint records for the root servers'
    /// addresses are added as non-authoritative.
    pub fn include_root_hints(&self) -> Result<Arc<Node>> {
        let count = self.include(Parser::new(ROOT_HINTS.as_bytes()), false)?;
        let root = self
            .nodes
            .entry(Name::root())
            .or_insert_with(|| Arc::new(Node::new(Name::root(), true)))
            .value()
            .clone();
        root.set_authoritative(true);
        debug!("loaded {} root hint records", count);
        Ok(root)
    }

    /// Adds a PTR record for the address of every A and AAAA record on
    /// an authoritative node. Each PTR record is owned by the address's
    /// reverse-lookup name, points back at the address record's owner,
    /// and has the same class and TTL. The PTR records are added as
    /// authoritative; running this again only refreshes them. Returns
    /// the number of PTR records added or refreshed.
    pub fn include_reverse_lookup_records(&self) -> usize {
        let pointers: Vec<Record> = self
            .nodes()
            .into_iter()
            .filter(|node| node.is_authoritative())
            .flat_map(|node| node.resources().to_vec())
            .filter_map(|record| {
                let address = record.address()?;
                Some(Record::new(
                    name::reverse_name(address),
                    record.class,
                    record.ttl,
                    Rdata::Ptr(record.name),
                ))
            })
            .collect();

        let count = pointers.len();
        for pointer in pointers {
            self.add(pointer, true);
        }
        debug!("synthesized {} reverse lookup records", count);
        count
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
