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

//! Implements the `query` command.

use std::fmt::Write;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use env_logger::Env;
use log::{error, info};
use tokio_util::sync::CancellationToken;

use cairn::message::{Message, Question};
use cairn::resolve::Resolver;

use crate::args::QueryArgs;
use crate::config;
use crate::zones;

/// Runs the `query` command.
pub fn query(args: QueryArgs) {
    env_logger::init_from_env(Env::new().default_filter_or("warn"));

    if let Err(e) = try_querying(args) {
        let mut message = String::from("Failed to answer the question:");
        for (i, cause) in e.chain().enumerate() {
            let _ = write!(message, "\n[{}] {}", i + 1, cause);
        }
        error!("{}", message);
        process::exit(1);
    }
}

fn try_querying(args: QueryArgs) -> Result<()> {
    let config = config::load(&args)?;
    let catalog = zones::build_catalog(&config).context("failed to build the catalog")?;
    info!("The catalog holds {} names.", catalog.len());
    let resolver = Resolver::with_config(Arc::new(catalog), config.resolver);

    let mut request = Message::query(Question::new(args.name, args.rr_type, args.class));
    request.dnssec_ok = args.dnssec;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the Tokio runtime")?;
    let response = runtime.block_on(resolve_until_interrupted(&resolver, &request))?;
    print!("{}", response);
    Ok(())
}

/// Resolves `request`, cancelling the resolution if Ctrl-C is pressed
/// first.
async fn resolve_until_interrupted(resolver: &Resolver, request: &Message) -> Result<Message> {
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl-C; cancelling.");
                cancel.cancel();
            }
        })
    };

    let result = resolver.resolve(request, &cancel).await;
    watcher.abort();
    result.context("failed to resolve the question")
}
