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

use kiln_sdk::WireError;

/// Error types for engine operations
///
/// Scope is deliberately narrow: a decode error kills one connection, a
/// clean EOF ends one session silently, shutdown propagates globally,
/// and book operations are total so matching itself has no error path.
/// A rejected cancel is an event, not an error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
	#[error("malformed input record: {0}")]
	InputDecode(#[from] WireError),
	#[error("connection closed by peer")]
	ConnectionClosed,
	#[error("shutdown requested")]
	ShutdownRequested,
	#[error("instrument mailbox closed")]
	MailboxClosed,
	#[error(transparent)]
	Io(#[from] std::io::Error),
}
