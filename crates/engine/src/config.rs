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

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Component name used for log files
pub const LOG_COMPONENT_NAME: &str = "engine";
/// Default log level when RUST_LOG is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Console log output default (stdout carries the event stream, so logs
/// stay off the console unless asked for)
pub const DEFAULT_LOG_TO_CONSOLE: bool = false;

/// Matching engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
	/// TCP listen address for client connections
	pub bind_addr: SocketAddr,
	/// Capacity of each instrument-side mailbox
	pub mailbox_capacity: usize,
	/// Capacity of the operator output queue
	pub event_buffer_size: usize,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			bind_addr: "0.0.0.0:7101".parse().unwrap(),
			mailbox_capacity: 64,
			event_buffer_size: 1024,
		}
	}
}

impl EngineConfig {
	/// Load configuration from environment variables
	pub fn from_env() -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder()
			.add_source(config::Environment::with_prefix("ENGINE"))
			.build()?;

		cfg.try_deserialize()
	}

	/// Load configuration from file, with environment overrides
	pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder()
			.add_source(config::File::with_name(path))
			.add_source(config::Environment::with_prefix("ENGINE"))
			.build()?;

		cfg.try_deserialize()
	}
}
