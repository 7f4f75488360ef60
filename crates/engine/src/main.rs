// Copyright 2025 kilnworks
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Matching engine service entry point
//!
//! Binds the configured TCP endpoint, serves client order streams and
//! writes the event stream to stdout until interrupted.

use kiln_engine::{EngineConfig, EngineServer, logging};
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	logging::init_logging()?;

	let mut config = EngineConfig::from_env().unwrap_or_default();
	// A lone positional argument overrides the listen address
	if let Some(addr) = std::env::args().nth(1) {
		config.bind_addr = addr.parse()?;
	}

	info!(target: "server", ?config, "starting kiln engine");

	let server = EngineServer::bind(config).await?;
	let shutdown = server.shutdown_token();

	tokio::spawn(async move {
		if signal::ctrl_c().await.is_ok() {
			info!(target: "server", "shutdown signal received");
			shutdown.cancel();
		}
	});

	server.serve(tokio::io::stdout()).await?;
	Ok(())
}
