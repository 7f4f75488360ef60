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

//! TCP supervisor
//!
//! Owns the listener, the root cancellation token and the task tracker
//! that every long-lived task (output writer, instrument actors,
//! sessions) registers with. Shutdown is one token cancellation followed
//! by a barrier wait: no new connections are accepted, sessions and
//! actors observe the token and exit, the event queue's producer handles
//! drop, and the output writer drains and stops last.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncWrite;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::event::{EventQueue, EventWriter};
use crate::registry::InstrumentRegistry;
use crate::session::Session;

/// Accepting server plus the shutdown machinery
pub struct EngineServer {
	config: EngineConfig,
	listener: TcpListener,
	shutdown: CancellationToken,
}

impl EngineServer {
	/// Bind the listen socket; the engine is not serving yet
	pub async fn bind(config: EngineConfig) -> Result<Self, EngineError> {
		let listener = TcpListener::bind(config.bind_addr).await?;
		Ok(Self {
			config,
			listener,
			shutdown: CancellationToken::new(),
		})
	}

	/// The actually bound address (relevant when binding port 0)
	pub fn local_addr(&self) -> Result<SocketAddr, EngineError> {
		Ok(self.listener.local_addr()?)
	}

	/// Token that cancels the whole engine when triggered
	pub fn shutdown_token(&self) -> CancellationToken {
		self.shutdown.clone()
	}

	/// Accept and serve connections until the shutdown token fires, then
	/// drain every task before returning. Events are written to `sink`.
	pub async fn serve<W>(self, sink: W) -> Result<(), EngineError>
	where
		W: AsyncWrite + Send + Unpin + 'static,
	{
		let tracker = TaskTracker::new();

		let (events, receiver) = EventQueue::new(self.config.event_buffer_size).split();
		tracker.spawn(EventWriter::run(receiver, sink));

		let registry = Arc::new(InstrumentRegistry::new(
			self.config.mailbox_capacity,
			events.clone(),
			self.shutdown.clone(),
			tracker.clone(),
		));

		info!(
			target: "server",
			addr = %self.local_addr()?,
			"engine listening"
		);

		loop {
			tokio::select! {
				_ = self.shutdown.cancelled() => break,
				accepted = self.listener.accept() => match accepted {
					Ok((stream, peer)) => {
						let session = Session::new(
							registry.clone(),
							events.clone(),
							self.shutdown.clone(),
						);
						tracker.spawn(session.run(stream, peer));
					}
					Err(e) => {
						// Transient accept failures (fd pressure, resets)
						// do not take the engine down
						warn!(target: "server", error = %e, "accept failed");
					}
				},
			}
		}

		info!(target: "server", "shutdown requested, draining");

		// Stop accepting, then release our event/registry handles so the
		// writer can observe all producers gone once sessions and actors
		// exit
		drop(self.listener);
		drop(events);
		drop(registry);

		tracker.close();
		tracker.wait().await;

		info!(target: "server", "engine stopped");
		Ok(())
	}
}
