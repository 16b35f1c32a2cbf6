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

//! Implements the configuration file.

use std::fmt::{self, Write};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::Level::Debug;
use log::{debug, log_enabled};
use paste::paste;
use serde::{de, Deserialize};

use cairn::name::Name;
use cairn::resolve::ResolverConfig;

use crate::args::QueryArgs;

////////////////////////////////////////////////////////////////////////
// CONFIGURATION LOADING                                              //
////////////////////////////////////////////////////////////////////////

/// Builds the configuration for the `query` command: the configuration
/// file given by `--config`, if any, with the other command-line
/// options added on top.
pub fn load(args: &QueryArgs) -> Result<Config> {
    let mut config = match args.config {
        Some(ref path) => load_from_path(path).context("failed to load the configuration")?,
        None => Config::default(),
    };

    config.root_hints |= args.root_hints;
    config.reverse_lookup |= args.reverse_lookup;
    config.resolver.answer_all_questions |= args.answer_all;
    config
        .zones
        .extend(args.zones.iter().map(|description| ZoneConfig {
            name: ConfigName(description.name.clone()),
            path: description.path.clone(),
        }));

    log_config_summary(&config);
    Ok(config)
}

/// Loads the configuration from the file given by `path`. Relative
/// zone file paths are taken relative to the file's directory.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let dir = match path.as_ref().parent() {
        Some(p) => p,
        None => return Err(anyhow!("the configuration file path has no parent")),
    };
    let raw_config = fs::read(path.as_ref()).context("failed to read the configuration file")?;
    let mut config: Config =
        toml::from_slice(&raw_config).context("failed to parse the configuration file")?;

    for zone_config in &mut config.zones {
        if zone_config.path.is_relative() {
            zone_config.path = dir.join(&zone_config.path);
        }
    }
    Ok(config)
}

/// Summarizes the configuration in the log, if the debug log level is
/// enabled.
fn log_config_summary(config: &Config) {
    if !log_enabled!(Debug) {
        return;
    }

    let mut message = format!(
        "Configuration loaded:\n\
         Root hints:       {}\n\
         Reverse lookup:   {}\n\
         Answer all:       {}\n\
         Max alias chain:  {}\n\
         Zones:            ",
        enabled(config.root_hints),
        enabled(config.reverse_lookup),
        enabled(config.resolver.answer_all_questions),
        config.resolver.max_alias_chain,
    );
    if config.zones.is_empty() {
        message.push_str("none to load");
    } else {
        let _ = write!(message, "{} to load", config.zones.len());
        for zone_config in &config.zones {
            let _ = write!(
                message,
                "\n  {} from {}",
                zone_config.name.0,
                zone_config.path.display()
            );
        }
    }
    debug!("{}", message);
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

////////////////////////////////////////////////////////////////////////
// CONFIGURATION FILE STRUCTURE                                       //
////////////////////////////////////////////////////////////////////////

/// The complete configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub root_hints: bool,
    #[serde(default)]
    pub reverse_lookup: bool,
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
}

/// The configuration of a single zone.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneConfig {
    pub name: ConfigName,
    pub path: PathBuf,
}

////////////////////////////////////////////////////////////////////////
// WRAPPERS OVER CAIRN TYPES FOR SERDE                                //
////////////////////////////////////////////////////////////////////////

/// Generates a deserializable `ConfigX` structure wrapping an `X` type
/// from [`cairn`], using its [`FromStr`](std::str::FromStr)
/// implementation.
macro_rules! make_serde_wrapper {
    ($wrapper:ident, $over:ty, $description:literal) => {
        /// A macro-generated deserializable wrapper over a [`cairn`]
        /// type.
        #[derive(Clone, Debug)]
        pub struct $wrapper(pub $over);

        impl<'de> Deserialize<'de> for $wrapper {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                deserializer.deserialize_str(paste! { [<$wrapper Visitor>] })
            }
        }

        paste! {
            /// A macro-generated [`Visitor`](de::Visitor).
            #[derive(Debug)]
            struct [<$wrapper Visitor>];
        }

        impl<'de> de::Visitor<'de> for paste! { [<$wrapper Visitor>] } {
            type Value = $wrapper;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str($description)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .parse()
                    .map($wrapper)
                    .map_err(|e| E::custom(format!("invalid {}: {}", $description, e)))
            }
        }
    };
}

make_serde_wrapper!(ConfigName, Name, "domain name");

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_parses() {
        let config: Config = toml::from_str(
            "root_hints = true\n\
             [resolver]\n\
             max_alias_chain = 4\n\
             [[zones]]\n\
             name = \"cairn.test.\"\n\
             path = \"db.cairn\"\n",
        )
        .unwrap();
        assert!(config.root_hints);
        assert!(!config.reverse_lookup);
        assert_eq!(config.resolver.max_alias_chain, 4);
        assert!(!config.resolver.answer_all_questions);
        assert_eq!(config.zones.len(), 1);
        assert_eq!(config.zones[0].name.0, "cairn.test.".parse().unwrap());
    }

    #[test]
    fn config_file_rejects_bad_names_and_unknown_fields() {
        assert!(toml::from_str::<Config>("[[zones]]\nname = \"a..b\"\npath = \"x\"\n").is_err());
        assert!(toml::from_str::<Config>("listen = \"[::1]:53\"\n").is_err());
        assert!(toml::from_str::<Config>("[resolver]\nrecurse = true\n").is_err());
    }
}
