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

use dashmap::DashMap;
use kiln_sdk::Side;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::info;

use crate::event::EventSink;
use crate::instrument::{Instrument, InstrumentHandle};

/// Process-wide map from instrument symbol to its live actor
///
/// Actors are created lazily on first reference. The map's entry lock
/// serialises creation, so two connections racing on the same fresh
/// symbol always end up sharing one actor. Instruments live until global
/// shutdown; nothing is ever removed from the map.
pub struct InstrumentRegistry {
	instruments: DashMap<String, InstrumentHandle>,
	mailbox_capacity: usize,
	events: EventSink,
	shutdown: CancellationToken,
	tracker: TaskTracker,
}

impl InstrumentRegistry {
	pub fn new(
		mailbox_capacity: usize,
		events: EventSink,
		shutdown: CancellationToken,
		tracker: TaskTracker,
	) -> Self {
		Self {
			instruments: DashMap::new(),
			mailbox_capacity,
			events,
			shutdown,
			tracker,
		}
	}

	/// Handle for `symbol`, spawning its actor on first reference
	pub fn get_or_create(&self, symbol: &str) -> InstrumentHandle {
		if let Some(handle) = self.instruments.get(symbol) {
			return handle.clone();
		}

		self.instruments
			.entry(symbol.to_string())
			.or_insert_with(|| {
				info!(target: "registry", symbol, "creating instrument");
				Instrument::spawn(
					symbol.to_string(),
					self.mailbox_capacity,
					self.events.clone(),
					self.shutdown.clone(),
					&self.tracker,
				)
			})
			.clone()
	}

	/// Number of live instruments
	pub fn len(&self) -> usize {
		self.instruments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.instruments.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::event::EventQueue;

	#[tokio::test]
	async fn test_same_symbol_shares_one_actor() {
		let (events, _receiver) = EventQueue::new(16).split();
		let registry = InstrumentRegistry::new(
			8,
			events,
			CancellationToken::new(),
			TaskTracker::new(),
		);

		let first = registry.get_or_create("GOOG");
		let second = registry.get_or_create("GOOG");

		assert_eq!(registry.len(), 1);
		assert!(
			first
				.mailbox(Side::Buy)
				.same_channel(second.mailbox(Side::Buy))
		);
	}

	#[tokio::test]
	async fn test_distinct_symbols_get_distinct_actors() {
		let (events, _receiver) = EventQueue::new(16).split();
		let registry = InstrumentRegistry::new(
			8,
			events,
			CancellationToken::new(),
			TaskTracker::new(),
		);

		let goog = registry.get_or_create("GOOG");
		let aapl = registry.get_or_create("AAPL");

		assert_eq!(registry.len(), 2);
		assert!(
			!goog
				.mailbox(Side::Sell)
				.same_channel(aapl.mailbox(Side::Sell))
		);
	}
}
