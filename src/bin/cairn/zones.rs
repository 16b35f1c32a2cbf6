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

//! Implements catalog construction.

use std::fmt::Write;
use std::fs::File;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use cairn::db::Catalog;
use cairn::zone_file::Parser;

use crate::config::{Config, ZoneConfig};

/// Builds a catalog from the data sources in `config`. Zones that fail
/// to load are reported in the log and left out; failing to load the
/// root hints is an error.
pub fn build_catalog(config: &Config) -> Result<Catalog> {
    let catalog = Catalog::new();

    if config.root_hints {
        catalog
            .include_root_hints()
            .context("failed to load the root hints")?;
    }

    let mut zones_failed = 0;
    for zone_config in &config.zones {
        debug!(
            "Loading {} from {}.",
            zone_config.name.0,
            zone_config.path.display(),
        );
        if let Err(e) = load_zone(&catalog, zone_config) {
            let mut message = format!("Failed to load {}:", zone_config.name.0);
            for (i, cause) in e.chain().enumerate() {
                let _ = write!(message, "\n[{}] {}", i + 1, cause);
            }
            error!("{}", message);
            zones_failed += 1;
        }
    }
    if zones_failed == 1 {
        error!("1 zone failed to load.");
    } else if zones_failed > 1 {
        error!("{} zones failed to load.", zones_failed);
    }

    if config.reverse_lookup {
        let count = catalog.include_reverse_lookup_records();
        info!("Added {} reverse lookup records.", count);
    }

    Ok(catalog)
}

/// Loads a single zone into `catalog`.
fn load_zone(catalog: &Catalog, zone_config: &ZoneConfig) -> Result<()> {
    let zone_file = File::open(&zone_config.path)
        .with_context(|| format!("failed to open {}", zone_config.path.display()))?;
    let parser = Parser::new(zone_file).with_origin(zone_config.name.0.clone());
    let apex = catalog
        .include_zone(parser)
        .with_context(|| format!("failed to load {}", zone_config.path.display()))?;

    if apex.name() != &zone_config.name.0 {
        warn!(
            "The zone file {} has its SOA record at {}, not {}.",
            zone_config.path.display(),
            apex.name(),
            zone_config.name.0,
        );
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;
    use crate::config::ConfigName;

    fn write_zone(file_name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("cairn-{}-{}", std::process::id(), file_name));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn build_catalog_skips_failed_zones() {
        let good = write_zone(
            "good.zone",
            "@ 3600 SOA ns admin 1 2 3 4 5\nns 3600 A 192.0.2.1\n",
        );
        let bad = write_zone("bad.zone", "ns 3600 A 192.0.2.1\n");
        let config = Config {
            reverse_lookup: true,
            zones: vec![
                ZoneConfig {
                    name: ConfigName("good.test.".parse().unwrap()),
                    path: good.clone(),
                },
                ZoneConfig {
                    name: ConfigName("bad.test.".parse().unwrap()),
                    path: bad.clone(),
                },
            ],
            ..Config::default()
        };

        let catalog = build_catalog(&config).unwrap();
        assert!(catalog.contains(&"ns.good.test.".parse().unwrap()));
        assert!(!catalog.contains(&"ns.bad.test.".parse().unwrap()));
        assert!(catalog.contains(&"1.2.0.192.in-addr.arpa.".parse().unwrap()));

        let _ = std::fs::remove_file(good);
        let _ = std::fs::remove_file(bad);
    }
}
