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

use std::fmt;

/// Maximum instrument symbol length on the wire (NUL-padded ASCII)
pub const SYMBOL_LEN: usize = 8;

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
	Buy,
	Sell,
}

impl Side {
	/// The other side of the book
	pub fn opposite(self) -> Side {
		match self {
			Side::Buy => Side::Sell,
			Side::Sell => Side::Buy,
		}
	}

	/// Whether price `a` outranks price `b` in this side's book ordering.
	///
	/// Buy books rank higher prices first, sell books lower prices first.
	/// The same ordering doubles as the crossing rule: an incoming order
	/// crosses the opposite book while the opposite front does *not*
	/// outrank the incoming price in the opposite side's own ordering.
	pub fn outranks(self, a: u32, b: u32) -> bool {
		match self {
			Side::Buy => a > b,
			Side::Sell => a < b,
		}
	}

	/// Wire/display tag for this side
	pub fn tag(self) -> char {
		match self {
			Side::Buy => 'B',
			Side::Sell => 'S',
		}
	}
}

impl fmt::Display for Side {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.tag())
	}
}

/// A buy or sell request as decoded from the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
	/// Order side
	pub side: Side,
	/// Client-supplied order ID, globally unique across live orders
	pub order_id: u32,
	/// Instrument symbol
	pub symbol: String,
	/// Limit price in instrument ticks
	pub price: u32,
	/// Quantity
	pub count: u32,
}

/// A cancel request as decoded from the wire
///
/// Only the order ID is meaningful; the engine resolves the instrument
/// from its own record of the client's resting orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelRequest {
	pub order_id: u32,
}

/// One decoded wire record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientRequest {
	Order(OrderRequest),
	Cancel(CancelRequest),
}

impl ClientRequest {
	/// The client-supplied order ID this request refers to
	pub fn order_id(&self) -> u32 {
		match self {
			ClientRequest::Order(order) => order.order_id,
			ClientRequest::Cancel(cancel) => cancel.order_id,
		}
	}
}
