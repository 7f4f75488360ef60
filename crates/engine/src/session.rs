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

//! Per-connection session loop
//!
//! A session decodes one client's request stream and routes each request
//! to the owning instrument actor, blocking on the per-request ack
//! before reading the next record — which is what gives a client its
//! in-order view of its own requests.
//!
//! The session also tracks which of the client's orders are still
//! possibly resting. Only those may be cancelled; a cancel for anything
//! else is rejected locally without contacting an instrument. A tracked
//! cancel is routed through the mailbox *opposite* the resting side,
//! because that is the phase stream that owns the book the order rests
//! in (see the instrument module).

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use futures::StreamExt;
use kiln_sdk::{ClientRequest, OrderRequest, Side, WireCodec};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::clock;
use crate::error::EngineError;
use crate::event::{EngineEvent, EventSink};
use crate::instrument::{Command, Request};
use crate::registry::InstrumentRegistry;

/// Where a possibly-still-resting order can be found
struct CancellableOrder {
	symbol: String,
	side: Side,
}

/// One client connection's state and loop
pub struct Session {
	registry: Arc<InstrumentRegistry>,
	events: EventSink,
	shutdown: CancellationToken,
}

impl Session {
	pub fn new(
		registry: Arc<InstrumentRegistry>,
		events: EventSink,
		shutdown: CancellationToken,
	) -> Self {
		Self {
			registry,
			events,
			shutdown,
		}
	}

	/// Serve the connection until EOF, decode failure or shutdown
	pub async fn run(self, stream: TcpStream, peer: SocketAddr) {
		debug!(target: "session", %peer, "session started");
		match self.serve(stream).await {
			// Clean EOF exits silently
			Ok(()) | Err(EngineError::ConnectionClosed) => {
				debug!(target: "session", %peer, "session ended")
			}
			Err(EngineError::ShutdownRequested) => {
				debug!(target: "session", %peer, "session cancelled")
			}
			Err(e) => warn!(target: "session", %peer, error = %e, "session failed"),
		}
		// Dropping the stream closes the socket either way
	}

	async fn serve(self, stream: TcpStream) -> Result<(), EngineError> {
		let mut framed = FramedRead::new(stream, WireCodec);
		let mut unmatched: HashMap<u32, CancellableOrder> = HashMap::new();

		loop {
			let request = tokio::select! {
				_ = self.shutdown.cancelled() => return Err(EngineError::ShutdownRequested),
				frame = framed.next() => match frame {
					None => return Err(EngineError::ConnectionClosed),
					Some(Err(e)) => return Err(EngineError::InputDecode(e)),
					Some(Ok(request)) => request,
				},
			};

			match request {
				ClientRequest::Order(order) => self.handle_order(order, &mut unmatched).await?,
				ClientRequest::Cancel(cancel) => {
					self.handle_cancel(cancel.order_id, &mut unmatched).await?
				}
			}
		}
	}

	async fn handle_order(
		&self,
		order: OrderRequest,
		unmatched: &mut HashMap<u32, CancellableOrder>,
	) -> Result<(), EngineError> {
		if order.price == 0 || order.count == 0 {
			self.events
				.emit(EngineEvent::Rejected {
					order_id: order.order_id,
					timestamp: clock::now(),
				})
				.await;
			return Ok(());
		}

		let order_id = order.order_id;
		let side = order.side;
		let symbol = order.symbol.clone();

		let handle = self.registry.get_or_create(&symbol);
		let (reply_tx, reply_rx) = oneshot::channel();
		handle
			.mailbox(side)
			.send(Request {
				command: Command::Order(order),
				reply: reply_tx,
			})
			.await
			.map_err(|_| EngineError::MailboxClosed)?;

		let fully_matched = reply_rx
			.await
			.map_err(|_| EngineError::ShutdownRequested)?;
		if !fully_matched {
			unmatched.insert(order_id, CancellableOrder { symbol, side });
		}
		Ok(())
	}

	async fn handle_cancel(
		&self,
		order_id: u32,
		unmatched: &mut HashMap<u32, CancellableOrder>,
	) -> Result<(), EngineError> {
		// Whatever happens next, the order stops being cancellable: the
		// cancel either lands, or the order was already consumed
		let Some(resting) = unmatched.remove(&order_id) else {
			// Definitely not resting; reject without touching any book
			self.events
				.emit(EngineEvent::Deleted {
					order_id,
					accepted: false,
					timestamp: clock::now(),
				})
				.await;
			return Ok(());
		};

		let handle = self.registry.get_or_create(&resting.symbol);
		let (reply_tx, reply_rx) = oneshot::channel();
		handle
			.mailbox(resting.side.opposite())
			.send(Request {
				command: Command::Cancel { order_id },
				reply: reply_tx,
			})
			.await
			.map_err(|_| EngineError::MailboxClosed)?;

		// The phase emits the Deleted event; the ack only sequences the
		// session's next read
		reply_rx
			.await
			.map_err(|_| EngineError::ShutdownRequested)?;
		Ok(())
	}
}
