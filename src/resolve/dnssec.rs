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

//! DNSSEC signature attachment.
//!
//! Cairn does not sign or validate anything. When a requester sets the
//! DO bit ([RFC 3225]), the RRSIG records that the catalog already
//! holds for the record sets in a response are added to the same
//! section as the records they cover ([RFC 4035 § 3.1.1]).
//!
//! [RFC 3225]: https://datatracker.ietf.org/doc/html/rfc3225
//! [RFC 4035 § 3.1.1]: https://datatracker.ietf.org/doc/html/rfc4035#section-3.1.1

use std::collections::HashSet;

use log::trace;
use tokio_util::sync::CancellationToken;

use super::{answers_from, check_cancelled, Resolver, Result};
use crate::class::Class;
use crate::message::{Message, Question};
use crate::name::Name;
use crate::rr::{Rdata, Record, Type};

/// Adds RRSIG records to each section of `response`, if `request` has
/// the DO bit set. Otherwise, does nothing.
///
/// For each distinct owner, type, and class in a section, the RRSIG
/// records at that owner whose type covered matches are appended to
/// the section, unless the section already has them. Aliases are not
/// followed, and pseudo-RRs (OPT and TSIG) and RRSIG records are not
/// themselves looked up.
pub async fn attach_signatures(
    resolver: &Resolver,
    request: &Message,
    response: &mut Message,
    cancel: &CancellationToken,
) -> Result<()> {
    if !request.dnssec_ok {
        return Ok(());
    }
    response.dnssec_ok = true;

    for section in [
        &mut response.answers,
        &mut response.authority_records,
        &mut response.additional_records,
    ] {
        sign_section(resolver, section, cancel).await?;
    }
    Ok(())
}

async fn sign_section(
    resolver: &Resolver,
    section: &mut Vec<Record>,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut seen = HashSet::new();
    let rrsets: Vec<(Name, Type, Class)> = section
        .iter()
        .filter(|record| {
            let rr_type = record.rr_type();
            !rr_type.is_pseudo() && rr_type != Type::RRSIG
        })
        .map(|record| (record.name.clone(), record.rr_type(), record.class))
        .filter(|rrset| seen.insert(rrset.clone()))
        .collect();

    for (owner, rr_type, class) in rrsets {
        check_cancelled(cancel)?;
        tokio::task::yield_now().await;

        let node = match resolver.catalog().get(&owner) {
            Some(node) => node,
            None => continue,
        };
        let question = Question::new(owner, Type::RRSIG, class);
        let signatures: Vec<Record> = answers_from(&node, &question)
            .into_iter()
            .filter(|record| {
                matches!(record.rdata, Rdata::Rrsig(ref sig) if sig.type_covered == rr_type)
                    && !section.contains(record)
            })
            .collect();
        if !signatures.is_empty() {
            trace!(
                "attaching {} signatures for {} {}",
                signatures.len(),
                question.name,
                rr_type
            );
        }
        section.extend(signatures);
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::tests::{name, resolver_for};
    use crate::resolve::ResolverConfig;

    fn signed_query(owner: &str, qtype: Type, dnssec_ok: bool) -> Message {
        let mut request = Message::query(Question::new(name(owner), qtype, Class::IN));
        request.dnssec_ok = dnssec_ok;
        request
    }

    fn covered(records: &[Record]) -> Vec<Type> {
        records
            .iter()
            .filter_map(|r| match r.rdata {
                Rdata::Rrsig(ref sig) => Some(sig.type_covered),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn signatures_need_the_do_bit() {
        let resolver = resolver_for(ResolverConfig::default());
        let response = resolver
            .resolve(
                &signed_query("www.cairn.test.", Type::A, false),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(!response.dnssec_ok);
        assert!(covered(&response.answers).is_empty());
    }

    #[tokio::test]
    async fn signatures_cover_the_answer_type() {
        let resolver = resolver_for(ResolverConfig::default());
        let response = resolver
            .resolve(
                &signed_query("www.cairn.test.", Type::A, true),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(response.dnssec_ok);
        assert_eq!(response.answers.len(), 2);
        assert_eq!(covered(&response.answers), [Type::A]);
        // Nothing signs the NS records or the glue.
        assert!(covered(&response.authority_records).is_empty());
        assert!(covered(&response.additional_records).is_empty());
    }

    #[tokio::test]
    async fn signatures_are_not_duplicated() {
        let resolver = resolver_for(ResolverConfig::default());
        let request = signed_query("www.cairn.test.", Type::ANY, true);
        let response = resolver
            .resolve(&request, &CancellationToken::new())
            .await
            .unwrap();
        // The ANY answer already includes both RRSIG records.
        assert_eq!(response.answers.len(), 3);

        let mut again = response.clone();
        attach_signatures(&resolver, &request, &mut again, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(again.answers.len(), 3);
    }

    #[tokio::test]
    async fn aliases_are_not_followed() {
        let resolver = resolver_for(ResolverConfig::default());
        let response = resolver
            .resolve(
                &signed_query("alias.cairn.test.", Type::A, true),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        // The CNAME is unsigned; the A record it leads to is signed at
        // its own owner.
        assert_eq!(response.answers.len(), 3);
        assert_eq!(covered(&response.answers), [Type::A]);
        assert_eq!(response.answers[2].name, name("www.cairn.test."));
    }
}
