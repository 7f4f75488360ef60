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

//! Instrument actor — the matching core
//!
//! Each instrument is one actor owning its two books and two bounded
//! mailboxes, one per side. The actor alternates *phases*: it waits for a
//! request on either mailbox, then processes that side's queued burst
//! against the opposite book until the mailbox is empty at poll time.
//! Only this outer loop may switch sides, so buy and sell requests of one
//! instrument never interleave inside a phase.
//!
//! A phase runs as two pipelined halves. The matcher half (in the actor
//! task) consumes the opposite book: it executes incoming orders against
//! the front and removes cancel targets. The residue half (a spawned
//! task) appends unmatched remainders to the same-side book and re-sorts
//! it once when the phase ends. Book ownership moves into the halves for
//! the duration of the phase and moves back when both finish, so no lock
//! ever guards a book.
//!
//! Cancels arrive through the mailbox *opposite* the side they target:
//! the phase that consumes a book is the only code mutating it, so
//! routing a buy-cancel through the sell mailbox serialises it with every
//! other mutation of the buy book.

use kiln_sdk::{OrderRequest, Side};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use crate::book::{Book, RestingOrder};
use crate::clock;
use crate::event::{EngineEvent, EventSink};

/// Command delivered through an instrument mailbox
#[derive(Debug)]
pub enum Command {
	/// Match an incoming order of the mailbox's own side
	Order(OrderRequest),
	/// Remove a resting order from the mailbox's *opposite*-side book
	Cancel { order_id: u32 },
}

/// A mailbox entry: one command plus its completion channel.
///
/// The reply carries `true` when an order was fully matched (and is
/// therefore no longer cancellable), `false` when it rested on a book or
/// when a cancel finished either way.
#[derive(Debug)]
pub struct Request {
	pub command: Command,
	pub reply: oneshot::Sender<bool>,
}

/// Shared handle to a live instrument actor
#[derive(Clone)]
pub struct InstrumentHandle {
	buy: mpsc::Sender<Request>,
	sell: mpsc::Sender<Request>,
}

impl InstrumentHandle {
	/// The mailbox for one side of the instrument
	pub fn mailbox(&self, side: Side) -> &mpsc::Sender<Request> {
		match side {
			Side::Buy => &self.buy,
			Side::Sell => &self.sell,
		}
	}
}

/// The actor state behind an [`InstrumentHandle`]
pub struct Instrument {
	symbol: String,
	buy_rx: mpsc::Receiver<Request>,
	sell_rx: mpsc::Receiver<Request>,
	events: EventSink,
	shutdown: CancellationToken,
}

impl Instrument {
	/// Spawn the actor for `symbol` onto `tracker` and return its handle
	pub fn spawn(
		symbol: String,
		mailbox_capacity: usize,
		events: EventSink,
		shutdown: CancellationToken,
		tracker: &TaskTracker,
	) -> InstrumentHandle {
		let (buy_tx, buy_rx) = mpsc::channel(mailbox_capacity);
		let (sell_tx, sell_rx) = mpsc::channel(mailbox_capacity);

		let actor = Instrument {
			symbol,
			buy_rx,
			sell_rx,
			events,
			shutdown,
		};
		tracker.spawn(actor.run());

		InstrumentHandle {
			buy: buy_tx,
			sell: sell_tx,
		}
	}

	/// Master loop: pick a side with work waiting and run its phase
	async fn run(self) {
		let Instrument {
			symbol,
			mut buy_rx,
			mut sell_rx,
			events,
			shutdown,
		} = self;

		info!(target: "instrument", symbol = %symbol, "instrument actor started");

		let mut buy_book = Book::new(Side::Buy);
		let mut sell_book = Book::new(Side::Sell);

		loop {
			// Pick whichever side has work waiting; this selection is the
			// only place a side switch can happen
			let turn = tokio::select! {
				_ = shutdown.cancelled() => None,
				request = buy_rx.recv() => request.map(|request| (Side::Buy, request)),
				request = sell_rx.recv() => request.map(|request| (Side::Sell, request)),
			};

			match turn {
				None => break,
				Some((Side::Buy, request)) => {
					(buy_book, sell_book, buy_rx) = run_phase(
						buy_book, sell_book, buy_rx, request, &symbol, &events, &shutdown,
					)
					.await;
				}
				Some((Side::Sell, request)) => {
					(sell_book, buy_book, sell_rx) = run_phase(
						sell_book, buy_book, sell_rx, request, &symbol, &events, &shutdown,
					)
					.await;
				}
			}
		}

		info!(
			target: "instrument",
			symbol = %symbol,
			resting_buys = buy_book.len(),
			resting_sells = sell_book.len(),
			"instrument actor stopped"
		);
	}
}

/// Run one bounded phase.
///
/// `same_book` is the phase side's own book (receives residue),
/// `opposite_book` the one consumed by matching and cancels. The books
/// and the mailbox receiver move in and move back out so the next phase
/// can own them again.
async fn run_phase(
	same_book: Book,
	mut opposite_book: Book,
	mut mailbox: mpsc::Receiver<Request>,
	first: Request,
	symbol: &str,
	events: &EventSink,
	shutdown: &CancellationToken,
) -> (Book, Book, mpsc::Receiver<Request>) {
	let side = same_book.side();
	debug!(target: "instrument", symbol, side = %side, "phase started");

	// Hand-off lane to the residue half; capacity 1 keeps the pipeline
	// one order deep, matching the matcher/rest cadence
	let (residue_tx, residue_rx) = mpsc::channel::<(OrderRequest, oneshot::Sender<bool>)>(1);
	let residue = tokio::spawn(rest_residue(
		same_book,
		residue_rx,
		symbol.to_string(),
		events.clone(),
		shutdown.clone(),
	));

	let mut next = Some(first);
	while let Some(request) = next.take() {
		if shutdown.is_cancelled() {
			break;
		}

		match request.command {
			Command::Cancel { order_id } => {
				// Routed through this side precisely because the target
				// rests on the opposite book this phase owns
				let accepted = opposite_book.remove(order_id);
				events
					.emit(EngineEvent::Deleted {
						order_id,
						accepted,
						timestamp: clock::now(),
					})
					.await;
				let _ = request.reply.send(accepted);
			}
			Command::Order(mut order) => {
				while order.count > 0 && opposite_book.crosses(order.price) {
					let Some(fill) = opposite_book.fill_front(order.count) else {
						break;
					};
					events
						.emit(EngineEvent::Executed {
							resting_id: fill.resting_id,
							incoming_id: order.order_id,
							exec_seq: fill.exec_seq,
							price: fill.price,
							count: fill.count,
							timestamp: clock::now(),
						})
						.await;
					order.count -= fill.count;
				}

				if order.count == 0 {
					let _ = request.reply.send(true);
				} else if residue_tx.send((order, request.reply)).await.is_err() {
					// Residue half only disappears on shutdown
					break;
				}
			}
		}

		// Empty at poll time ends the phase; a request racing in right
		// after this observation waits for the next phase
		next = mailbox.try_recv().ok();
	}

	// Closing the lane tells the residue half to sort and finish
	drop(residue_tx);
	let same_book = match residue.await {
		Ok(book) => book,
		Err(e) => {
			error!(target: "instrument", symbol, error = %e, "residue task failed");
			Book::new(side)
		}
	};

	debug!(
		target: "instrument",
		symbol,
		side = %side,
		resting = same_book.len(),
		opposite = opposite_book.len(),
		"phase ended"
	);
	(same_book, opposite_book, mailbox)
}

/// Residue half of a phase: rest unmatched remainders, then sort.
///
/// Runs concurrently with the matcher half so the book append and the
/// client ack of one order overlap the matching of the next. The final
/// sort restores best-first price order with ties broken by the append
/// timestamps taken here.
async fn rest_residue(
	mut book: Book,
	mut lane: mpsc::Receiver<(OrderRequest, oneshot::Sender<bool>)>,
	symbol: String,
	events: EventSink,
	shutdown: CancellationToken,
) -> Book {
	loop {
		tokio::select! {
			_ = shutdown.cancelled() => break,
			handoff = lane.recv() => {
				let Some((order, reply)) = handoff else {
					book.resort();
					break;
				};
				let timestamp = clock::now();
				book.push(RestingOrder {
					id: order.order_id,
					price: order.price,
					count: order.count,
					exec_seq: 1,
					timestamp,
				});
				events
					.emit(EngineEvent::Added {
						side: book.side(),
						order_id: order.order_id,
						symbol: symbol.clone(),
						price: order.price,
						count: order.count,
						timestamp,
					})
					.await;
				let _ = reply.send(false);
			}
		}
	}
	book
}
