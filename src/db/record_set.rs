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

//! The [`RecordSet`] structure.

use std::fmt;

use dashmap::DashMap;

use crate::class::Class;
use crate::rr::{Rdata, Record};

/// A concurrent set of the records owned by one [`Node`](super::Node).
///
/// Set membership follows [`Record`]'s equality, which ignores the TTL
/// and the creation time. Internally, each record is stored under a key
/// made of exactly the fields that equality does consider (the owner is
/// the same for the whole set and is left out). Adding a record that
/// is equal to a stored one therefore replaces the stored copy in a
/// single atomic step, so its TTL and creation time are refreshed and
/// concurrent readers never see the record missing.
///
/// Iteration order is unspecified.
#[derive(Default)]
pub struct RecordSet {
    records: DashMap<RecordKey, Record>,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct RecordKey {
    class: Class,
    rdata: Rdata,
}

impl RecordKey {
    fn of(record: &Record) -> Self {
        Self {
            class: record.class,
            rdata: record.rdata.clone(),
        }
    }
}

impl RecordSet {
    /// Creates a new, empty `RecordSet`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `record`, replacing an equal record if there is one. The
    /// replaced record is returned.
    pub fn upsert(&self, record: Record) -> Option<Record> {
        self.records.insert(RecordKey::of(&record), record)
    }

    /// Removes the stored record equal to `record`, if any.
    pub fn remove(&self, record: &Record) -> Option<Record> {
        self.records
            .remove(&RecordKey::of(record))
            .map(|(_, record)| record)
    }

    /// Returns whether a record equal to `record` is stored.
    pub fn contains(&self, record: &Record) -> bool {
        self.records.contains_key(&RecordKey::of(record))
    }

    /// Returns the number of records in the set.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns copies of the records for which `predicate` holds.
    pub fn filter<P>(&self, mut predicate: P) -> Vec<Record>
    where
        P: FnMut(&Record) -> bool,
    {
        self.records
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns copies of all records in the set.
    pub fn to_vec(&self) -> Vec<Record> {
        self.filter(|_| true)
    }
}

impl fmt::Debug for RecordSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.to_vec()).finish()
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::rr::Ttl;

    fn a_record(octet: u8, ttl: u32) -> Record {
        Record::new(
            "host.cairn.test.".parse().unwrap(),
            Class::IN,
            Ttl::from(ttl),
            Rdata::A(Ipv4Addr::new(192, 0, 2, octet)),
        )
    }

    #[test]
    fn upsert_refreshes_metadata() {
        let set = RecordSet::new();
        let mut old = a_record(1, 60);
        old.created -= Duration::from_secs(30);
        assert!(set.upsert(old.clone()).is_none());
        set.upsert(a_record(2, 60));

        let new = a_record(1, 3600);
        let replaced = set.upsert(new.clone()).unwrap();
        assert_eq!(replaced.ttl, Ttl::from(60));
        assert_eq!(set.len(), 2);

        let stored = set.filter(|r| r == &new);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].ttl, Ttl::from(3600));
        assert_eq!(stored[0].created, new.created);
    }

    #[test]
    fn class_distinguishes_records() {
        let set = RecordSet::new();
        let mut chaos = a_record(1, 60);
        chaos.class = Class::CH;
        set.upsert(a_record(1, 60));
        set.upsert(chaos.clone());
        assert_eq!(set.len(), 2);
        assert!(set.contains(&chaos));
        assert_eq!(set.remove(&chaos), Some(chaos.clone()));
        assert!(!set.contains(&chaos));
    }

    #[test]
    fn concurrent_upserts_do_not_duplicate() {
        let set = Arc::new(RecordSet::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let set = set.clone();
                std::thread::spawn(move || {
                    for ttl in 0..100 {
                        set.upsert(a_record((ttl % 4) as u8, ttl + i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(set.len(), 4);
    }
}
