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

//! Implements command-line argument parsing.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::anyhow;
use clap::{Parser, Subcommand};

use cairn::class::Class;
use cairn::name::Name;
use cairn::rr::Type;

/// Parses the command line arguments.
pub fn parse() -> Args {
    Args::parse()
}

/// Answer DNS questions from local zone data
#[derive(Debug, Parser)]
#[clap(author, version)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve one question and print the response
    Query(QueryArgs),
}

#[derive(Debug, Parser)]
pub struct QueryArgs {
    /// Set the configuration file to use
    #[clap(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Add a zone to the catalog
    #[clap(long = "zone", value_name = "FILE|NAME:FILE")]
    pub zones: Vec<ZoneDescription>,

    /// Add the root hints to the catalog
    #[clap(long)]
    pub root_hints: bool,

    /// Add PTR records for the addresses in the loaded data
    #[clap(long)]
    pub reverse_lookup: bool,

    /// Answer every question rather than stopping at the first answer
    #[clap(long)]
    pub answer_all: bool,

    /// Set the DO bit to request DNSSEC signatures
    #[clap(long)]
    pub dnssec: bool,

    /// The domain name to look up
    pub name: Name,

    /// The RR type to look up
    #[clap(default_value = "A")]
    pub rr_type: Type,

    /// The class to look up
    #[clap(default_value = "IN")]
    pub class: Class,
}

/// A description of a zone provided on the command line with the
/// `--zone` option. This is parsed with its [`FromStr`] implementation
/// and accepts two forms, one of which gives the zone apex explicitly,
/// and the other of which takes it from the basename of the zone file
/// with the `.zone` suffix removed:
///
/// * `example.com.:path/to/the-zone-file.zone`
/// * `path/to/example.com.zone`
#[derive(Clone, Debug)]
pub struct ZoneDescription {
    pub name: Name,
    pub path: PathBuf,
}

impl FromStr for ZoneDescription {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((name, path)) = s.split_once(':') {
            Ok(Self {
                name: name
                    .parse()
                    .map_err(|e| anyhow!("invalid zone name: {}", e))?,
                path: PathBuf::from(path),
            })
        } else if s.ends_with(".zone") {
            let stem = Path::new(s)
                .file_stem()
                .and_then(OsStr::to_str)
                .ok_or_else(|| anyhow!("failed to compute zone name from zone file path"))?;
            Ok(Self {
                name: format!("{}.", stem)
                    .parse()
                    .map_err(|e| anyhow!("invalid zone name: {}", e))?,
                path: PathBuf::from(s),
            })
        } else {
            Err(anyhow!(
                "if no zone name is provided, the file name must have the form <NAME>.zone",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_description_from_str_computes_zone_name_from_path_correctly() {
        let path = PathBuf::from_iter(["path_to", "zone_file", ".", "cairn.test.zone"]);
        let description: ZoneDescription = path.to_str().unwrap().parse().unwrap();
        assert_eq!(description.name, "cairn.test.".parse().unwrap());
    }

    #[test]
    fn zone_description_from_str_accepts_explicit_names() {
        let description: ZoneDescription = "cairn.test.:zones/db.cairn".parse().unwrap();
        assert_eq!(description.name, "cairn.test.".parse().unwrap());
        assert_eq!(description.path, PathBuf::from("zones/db.cairn"));
        assert!("zones/db.cairn".parse::<ZoneDescription>().is_err());
    }

    #[test]
    fn query_arguments_parse() {
        let args = Args::parse_from([
            "cairn",
            "query",
            "--zone",
            "cairn.test.:db.cairn",
            "--dnssec",
            "www.cairn.test.",
            "aaaa",
        ]);
        let Command::Query(query) = args.command;
        assert_eq!(query.zones.len(), 1);
        assert!(query.dnssec);
        assert!(!query.root_hints);
        assert_eq!(query.rr_type, Type::AAAA);
        assert_eq!(query.class, Class::IN);
    }
}
