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

//! Kiln SDK
//!
//! Wire protocol for the Kiln matching engine: the fixed-size binary
//! record format clients stream over a persistent TCP connection, the
//! framing codec, and an async client for submitting orders.
//!
//! The protocol is deliberately small:
//! - One record shape for buy, sell and cancel requests
//! - Fixed 21-byte frames, little-endian integers
//! - No responses on the wire; the engine publishes its event stream
//!   to the operator output sink

pub mod client;
pub mod codec;
pub mod types;

pub use client::EngineClient;
pub use codec::{RECORD_LEN, WireCodec, WireError};
pub use types::{CancelRequest, ClientRequest, OrderRequest, SYMBOL_LEN, Side};
