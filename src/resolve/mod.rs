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

//! The resolution algorithm.
//!
//! A [`Resolver`] answers questions from the records in a shared
//! [`Catalog`]. It never asks other servers: if the catalog has no
//! answer, the response says so. For each question, it
//!
//! 1. looks up the question's name, following CNAME records to their
//!    targets ([RFC 1034 § 3.6.2]);
//! 2. finds the closest enclosing zone (the nearest node at or above
//!    the question's name with an SOA record), and adds the zone's NS
//!    records to the authority section, or its SOA record if there was
//!    no answer;
//! 3. adds useful additional records, such as the addresses of name
//!    servers, until there are no more to add.
//!
//! When the request has the DO bit set, [`attach_signatures`] then
//! adds the RRSIG records that cover the record sets in the response.
//!
//! Resolution is asynchronous. Every catalog lookup is a point at
//! which the task may yield, and a [`CancellationToken`] is checked
//! before each one.
//!
//! [RFC 1034 § 3.6.2]: https://datatracker.ietf.org/doc/html/rfc1034#section-3.6.2

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, trace};
use tokio_util::sync::CancellationToken;

use crate::class::Class;
use crate::db::{Catalog, Node};
use crate::message::{Message, Question, Rcode};
use crate::name::Name;
use crate::rr::{Rdata, Record, Type};

mod additional;
mod config;
mod dnssec;
mod error;
pub use config::ResolverConfig;
pub use dnssec::attach_signatures;
pub use error::Error;

/// The result type of resolution.
pub type Result<T> = std::result::Result<T, Error>;

/// Answers DNS questions from a [`Catalog`].
///
/// A `Resolver` holds no state of its own beyond its configuration, so
/// one resolver may serve any number of concurrent resolutions. The
/// catalog may be modified while resolutions are in progress.
#[derive(Clone, Debug)]
pub struct Resolver {
    catalog: Arc<Catalog>,
    config: ResolverConfig,
}

impl Resolver {
    /// Creates a new `Resolver` over `catalog` with the default
    /// configuration.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_config(catalog, ResolverConfig::default())
    }

    pub fn with_config(catalog: Arc<Catalog>, config: ResolverConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Answers the questions in `request` and returns the response.
    ///
    /// Questions are answered in order. Unless
    /// [`ResolverConfig::answer_all_questions`] is set, the resolver
    /// stops after the first question that produces an answer. The
    /// response status is NOERROR if there are any answers at all, and
    /// duplicate records are removed from the response before DNSSEC
    /// signatures are attached.
    pub async fn resolve(&self, request: &Message, cancel: &CancellationToken) -> Result<Message> {
        let mut response = request.create_response();
        for question in &request.questions {
            response = self
                .resolve_question(question, Some(response), cancel)
                .await?;
            if !response.answers.is_empty() && !self.config.answer_all_questions {
                break;
            }
        }

        if !response.answers.is_empty() {
            response.rcode = Rcode::NoError;
        }
        dedup_records(&mut response.answers);
        dedup_records(&mut response.authority_records);
        let answers = &response.answers;
        response
            .additional_records
            .retain(|record| !answers.contains(record));

        attach_signatures(self, request, &mut response, cancel).await?;
        Ok(response)
    }

    /// Answers a single question, adding to `response` if one is given,
    /// and returns the response.
    ///
    /// If no response is given, a new one is created with `question` as
    /// its only question. When the catalog has nothing for the
    /// question, the response status becomes NXDOMAIN (unless an
    /// earlier question already set another status).
    pub async fn resolve_question(
        &self,
        question: &Question,
        response: Option<Message>,
        cancel: &CancellationToken,
    ) -> Result<Message> {
        check_cancelled(cancel)?;
        let mut response = response.unwrap_or_else(|| Message {
            is_response: true,
            questions: vec![question.clone()],
            ..Message::new()
        });
        trace!("resolving {}", question);

        let found = self.find_answer(question, &mut response, cancel).await?;
        let authority = self.closest_authority(&question.name, cancel).await?;

        if !found && response.rcode == Rcode::NoError {
            response.rcode = Rcode::NxDomain;
        }
        if found {
            if let Some(ref soa) = authority {
                let ns_question = Question {
                    name: soa.name.clone(),
                    qtype: Type::NS,
                    qclass: question.qclass,
                    created: question.created,
                };
                let mut scratch = Message::new();
                self.find_answer(&ns_question, &mut scratch, cancel).await?;
                response.authority_records.append(&mut scratch.answers);
            }
        }
        if response.rcode == Rcode::NxDomain {
            if let Some(soa) = authority {
                response.authority_records.push(soa);
            }
        }

        additional::add_additional_records(self, &mut response, cancel).await?;
        Ok(response)
    }

    /// Looks up the records answering `question` and appends them to
    /// the answer section of `response`, following CNAME records as
    /// needed. Returns whether an answer was found.
    ///
    /// Per [RFC 1034 § 3.7.1], the response's AA flag is set if the
    /// answer comes from an authoritative node, unless the question's
    /// class is ANY.
    ///
    /// [RFC 1034 § 3.7.1]: https://datatracker.ietf.org/doc/html/rfc1034#section-3.7.1
    async fn find_answer(
        &self,
        question: &Question,
        response: &mut Message,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let mut current = question.clone();
        let mut aliases_followed = 0;
        loop {
            check_cancelled(cancel)?;
            tokio::task::yield_now().await;

            let node = match self.catalog.get(&current.name) {
                Some(node) => node,
                None => return Ok(false),
            };
            response.authoritative |= node.is_authoritative() && current.qclass != Class::ANY;

            let answers = answers_from(&node, &current);
            if !answers.is_empty() {
                trace!("found {} records for {}", answers.len(), current);
                response.answers.extend(answers);
                return Ok(true);
            }

            let cname_question = Question {
                qtype: Type::CNAME,
                ..current.clone()
            };
            let alias = answers_from(&node, &cname_question)
                .into_iter()
                .find_map(|record| match record.rdata {
                    Rdata::Cname(ref target) => Some((target.clone(), record)),
                    _ => None,
                });
            let (target, record) = match alias {
                Some(alias) => alias,
                None => return Ok(false),
            };
            if aliases_followed == self.config.max_alias_chain {
                debug!("gave up on {} after {} aliases", question, aliases_followed);
                return Err(Error::InvalidState("alias chain too long"));
            }
            aliases_followed += 1;
            trace!("following alias {} -> {}", current.name, target);
            response.answers.push(record);
            current = current.with_name(target);
        }
    }

    /// Finds the SOA record of the zone enclosing `name`, by walking up
    /// from `name` towards the root.
    async fn closest_authority(
        &self,
        name: &Name,
        cancel: &CancellationToken,
    ) -> Result<Option<Record>> {
        let mut current = Some(name.clone());
        while let Some(name) = current {
            check_cancelled(cancel)?;
            tokio::task::yield_now().await;

            if let Some(soa) = self.catalog.get(&name).and_then(|node| node.soa()) {
                return Ok(Some(soa));
            }
            current = name.parent();
        }
        Ok(None)
    }
}

/// Returns the records of `node` that answer `question`. Records on a
/// non-authoritative node must not have expired as of the time the
/// question was asked.
fn answers_from(node: &Node, question: &Question) -> Vec<Record> {
    let authoritative = node.is_authoritative();
    node.resources().filter(|record| {
        question.qclass.matches(record.class)
            && question.qtype.matches(record.rr_type())
            && (authoritative || !record.is_expired(question.created))
    })
}

fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        debug!("resolution cancelled");
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

/// Removes repeated records from `records`, keeping the first copy of
/// each.
fn dedup_records(records: &mut Vec<Record>) {
    let mut seen = HashSet::with_capacity(records.len());
    records.retain(|record| seen.insert(record.clone()));
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::rr::Ttl;
    use crate::zone_file::Parser;

    pub(super) const ZONE: &[u8] = b"$ORIGIN cairn.test.\n\
        $TTL 3600\n\
        @ SOA ns1 admin 1 7200 900 1209600 300\n\
        \tNS ns1\n\
        ns1 A 192.0.2.53\n\
        \tAAAA 2001:db8::53\n\
        www A 192.0.2.80\n\
        \tRRSIG A 13 3 3600 20300101000000 20200101000000 4242 cairn.test. AAAA\n\
        \tRRSIG AAAA 13 3 3600 20300101000000 20200101000000 4242 cairn.test. AAAB\n\
        alias CNAME www\n\
        loop1 CNAME loop2\n\
        loop2 CNAME loop1\n\
        txt TXT \"first\"\n";

    pub(super) fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    pub(super) fn resolver_for(config: ResolverConfig) -> Resolver {
        let catalog = Catalog::new();
        catalog.include_zone(Parser::new(ZONE)).unwrap();
        Resolver::with_config(Arc::new(catalog), config)
    }

    fn query(owner: &str, qtype: Type) -> Message {
        Message::query(Question::new(name(owner), qtype, Class::IN))
    }

    fn summary(records: &[Record]) -> Vec<(Name, Type)> {
        records.iter().map(|r| (r.name.clone(), r.rr_type())).collect()
    }

    #[tokio::test]
    async fn resolve_answers_authoritatively() {
        let resolver = resolver_for(ResolverConfig::default());
        let request = query("WWW.cairn.test.", Type::A);
        let response = resolver
            .resolve(&request, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.id, request.id);
        assert!(response.is_response);
        assert!(response.authoritative);
        assert_eq!(response.rcode, Rcode::NoError);
        assert_eq!(summary(&response.answers), [(name("www.cairn.test."), Type::A)]);
        assert_eq!(
            summary(&response.authority_records),
            [(name("cairn.test."), Type::NS)]
        );
        assert_eq!(
            summary(&response.additional_records),
            [
                (name("ns1.cairn.test."), Type::A),
                (name("ns1.cairn.test."), Type::AAAA),
            ]
        );
        assert!(!response.dnssec_ok);
    }

    #[tokio::test]
    async fn resolve_chases_aliases() {
        let resolver = resolver_for(ResolverConfig::default());
        let response = resolver
            .resolve(&query("alias.cairn.test.", Type::A), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            summary(&response.answers),
            [
                (name("alias.cairn.test."), Type::CNAME),
                (name("www.cairn.test."), Type::A),
            ]
        );

        // A question for the CNAME itself is answered directly.
        let response = resolver
            .resolve(&query("alias.cairn.test.", Type::CNAME), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            summary(&response.answers),
            [(name("alias.cairn.test."), Type::CNAME)]
        );
    }

    #[tokio::test]
    async fn resolve_rejects_alias_loops() {
        let resolver = resolver_for(ResolverConfig::default());
        let result = resolver
            .resolve(&query("loop1.cairn.test.", Type::A), &CancellationToken::new())
            .await;
        assert_eq!(result.unwrap_err(), Error::InvalidState("alias chain too long"));
    }

    #[tokio::test]
    async fn alias_chain_limit_is_configurable() {
        let resolver = resolver_for(ResolverConfig {
            max_alias_chain: 0,
            ..ResolverConfig::default()
        });
        let result = resolver
            .resolve(&query("alias.cairn.test.", Type::A), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn missing_names_are_nxdomain() {
        let resolver = resolver_for(ResolverConfig::default());
        let response = resolver
            .resolve(&query("missing.cairn.test.", Type::A), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.rcode, Rcode::NxDomain);
        assert!(response.answers.is_empty());
        assert_eq!(
            summary(&response.authority_records),
            [(name("cairn.test."), Type::SOA)]
        );
        // Glue for the SOA's primary name server.
        assert_eq!(response.additional_records.len(), 2);

        let response = resolver
            .resolve(&query("elsewhere.test.", Type::A), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.rcode, Rcode::NxDomain);
        assert!(response.authority_records.is_empty());
        assert!(!response.authoritative);
    }

    #[tokio::test]
    async fn expired_cached_records_are_not_answers() {
        let resolver = resolver_for(ResolverConfig::default());
        let mut stale = Record::new(
            name("cached.example."),
            Class::IN,
            Ttl::from(60),
            Rdata::A("192.0.2.9".parse().unwrap()),
        );
        stale.created -= Duration::from_secs(120);
        resolver.catalog().add(stale.clone(), false);

        let response = resolver
            .resolve(&query("cached.example.", Type::A), &CancellationToken::new())
            .await
            .unwrap();
        assert!(response.answers.is_empty());
        assert_eq!(response.rcode, Rcode::NxDomain);

        // The same record on an authoritative node never expires.
        stale.name = name("static.cairn.test.");
        resolver.catalog().add(stale, true);
        let response = resolver
            .resolve(&query("static.cairn.test.", Type::A), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.answers.len(), 1);
    }

    #[tokio::test]
    async fn fresh_cached_records_are_not_authoritative() {
        let resolver = resolver_for(ResolverConfig::default());
        resolver.catalog().add(
            Record::new(
                name("cached.example."),
                Class::IN,
                Ttl::from(60),
                Rdata::A("192.0.2.9".parse().unwrap()),
            ),
            false,
        );
        let response = resolver
            .resolve(&query("cached.example.", Type::A), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.answers.len(), 1);
        assert!(!response.authoritative);
    }

    #[tokio::test]
    async fn class_any_is_never_authoritative() {
        let resolver = resolver_for(ResolverConfig::default());
        let request = Message::query(Question::new(name("www.cairn.test."), Type::A, Class::ANY));
        let response = resolver
            .resolve(&request, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.answers.len(), 1);
        assert!(!response.authoritative);
    }

    #[tokio::test]
    async fn answer_all_questions_works() {
        let mut request = query("www.cairn.test.", Type::A);
        request.questions.push(Question::new(
            name("txt.cairn.test."),
            Type::TXT,
            Class::IN,
        ));

        let resolver = resolver_for(ResolverConfig::default());
        let response = resolver
            .resolve(&request, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(summary(&response.answers), [(name("www.cairn.test."), Type::A)]);

        let resolver = resolver_for(ResolverConfig {
            answer_all_questions: true,
            ..ResolverConfig::default()
        });
        let response = resolver
            .resolve(&request, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            summary(&response.answers),
            [
                (name("www.cairn.test."), Type::A),
                (name("txt.cairn.test."), Type::TXT),
            ]
        );
        // The NS records were added once per question.
        assert_eq!(response.authority_records.len(), 1);
    }

    #[tokio::test]
    async fn later_answers_clear_nxdomain() {
        let mut request = query("missing.cairn.test.", Type::A);
        request.questions.push(Question::new(
            name("www.cairn.test."),
            Type::A,
            Class::IN,
        ));
        let resolver = resolver_for(ResolverConfig::default());
        let response = resolver
            .resolve(&request, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.answers.len(), 1);
        assert_eq!(response.rcode, Rcode::NoError);
    }

    #[tokio::test]
    async fn resolve_question_creates_a_response() {
        let resolver = resolver_for(ResolverConfig::default());
        let question = Question::new(name("www.cairn.test."), Type::A, Class::IN);
        let response = resolver
            .resolve_question(&question, None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(response.is_response);
        assert_eq!(response.questions, [question]);
        assert_eq!(response.answers.len(), 1);
    }

    #[tokio::test]
    async fn cancellation_works() {
        let resolver = resolver_for(ResolverConfig::default());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let question = Question::new(name("www.cairn.test."), Type::A, Class::IN);
        assert_eq!(
            resolver.resolve_question(&question, None, &cancel).await.unwrap_err(),
            Error::Cancelled
        );
        assert_eq!(
            resolver
                .resolve(&query("www.cairn.test.", Type::A), &cancel)
                .await
                .unwrap_err(),
            Error::Cancelled
        );
    }

    #[tokio::test]
    async fn cancellation_stops_an_alias_chase() {
        // Without a bound, the loop1/loop2 chase only ends when the
        // token is cancelled from another task.
        let resolver = resolver_for(ResolverConfig {
            max_alias_chain: usize::MAX,
            ..ResolverConfig::default()
        });
        let cancel = CancellationToken::new();
        let canceller = tokio::spawn({
            let cancel = cancel.clone();
            async move { cancel.cancel() }
        });
        let question = Question::new(name("loop1.cairn.test."), Type::A, Class::IN);
        assert_eq!(
            resolver.resolve_question(&question, None, &cancel).await.unwrap_err(),
            Error::Cancelled
        );
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn cancellation_stops_the_authority_walk() {
        let resolver = resolver_for(ResolverConfig::default());
        let deep = name("a.b.c.d.e.f.g.cairn.test.");
        let soa = resolver
            .closest_authority(&deep, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(soa.name, name("cairn.test."));

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(
            resolver.closest_authority(&deep, &cancel).await.unwrap_err(),
            Error::Cancelled
        );
    }
}
