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

mod writer;

use std::fmt;

use kiln_sdk::Side;
use tokio::sync::mpsc;
use tracing::warn;

pub use writer::EventWriter;

/// Events published on the operator output stream
///
/// Every accepted order produces exactly one `Added` or one or more
/// `Executed` summing to its count, or a prefix of `Executed` followed by
/// one `Added`. Every cancel produces exactly one `Deleted`. Timestamps
/// are engine clock ticks sampled at the emission point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
	/// An unmatched (or partially matched) order joined a book
	Added {
		side: Side,
		order_id: u32,
		symbol: String,
		price: u32,
		count: u32,
		timestamp: i64,
	},

	/// An incoming order executed against a resting order
	Executed {
		resting_id: u32,
		incoming_id: u32,
		exec_seq: u32,
		price: u32,
		count: u32,
		timestamp: i64,
	},

	/// A cancel request was processed (accepted or rejected)
	Deleted {
		order_id: u32,
		accepted: bool,
		timestamp: i64,
	},

	/// A well-framed but invalid order record was refused
	Rejected { order_id: u32, timestamp: i64 },
}

impl EngineEvent {
	/// The timestamp sampled when this event was produced
	pub fn timestamp(&self) -> i64 {
		match self {
			EngineEvent::Added { timestamp, .. } => *timestamp,
			EngineEvent::Executed { timestamp, .. } => *timestamp,
			EngineEvent::Deleted { timestamp, .. } => *timestamp,
			EngineEvent::Rejected { timestamp, .. } => *timestamp,
		}
	}
}

/// One event renders as one output line
impl fmt::Display for EngineEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EngineEvent::Added {
				side,
				order_id,
				symbol,
				price,
				count,
				timestamp,
			} => write!(f, "{side} {order_id} {symbol} {price} {count} {timestamp}"),
			EngineEvent::Executed {
				resting_id,
				incoming_id,
				exec_seq,
				price,
				count,
				timestamp,
			} => write!(
				f,
				"E {resting_id} {incoming_id} {exec_seq} {price} {count} {timestamp}"
			),
			EngineEvent::Deleted {
				order_id,
				accepted,
				timestamp,
			} => {
				let verdict = if *accepted { 'A' } else { 'R' };
				write!(f, "X {order_id} {verdict} {timestamp}")
			}
			EngineEvent::Rejected {
				order_id,
				timestamp,
			} => write!(f, "R {order_id} {timestamp}"),
		}
	}
}

/// Bounded queue carrying events from producers to the output writer
///
/// Producers are instrument phases and connection sessions; the single
/// consumer is the [`EventWriter`]. The queue is bounded so a stalled
/// sink back-pressures matching instead of buffering without limit.
pub struct EventQueue {
	sender: mpsc::Sender<EngineEvent>,
	receiver: mpsc::Receiver<EngineEvent>,
}

impl EventQueue {
	pub fn new(capacity: usize) -> Self {
		let (sender, receiver) = mpsc::channel(capacity);
		Self { sender, receiver }
	}

	/// Split into the clonable producer handle and the writer's receiver
	pub fn split(self) -> (EventSink, mpsc::Receiver<EngineEvent>) {
		(
			EventSink {
				sender: self.sender,
			},
			self.receiver,
		)
	}
}

/// Producer handle for the operator output stream
#[derive(Clone)]
pub struct EventSink {
	sender: mpsc::Sender<EngineEvent>,
}

impl EventSink {
	/// Publish one event, awaiting if the queue is momentarily full.
	///
	/// The writer outlives every producer except during shutdown, so a
	/// closed queue is logged rather than propagated.
	pub async fn emit(&self, event: EngineEvent) {
		if self.sender.send(event).await.is_err() {
			warn!(target: "events", "output writer gone, event dropped");
		}
	}
}
