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

//! Kiln Matching Engine
//!
//! A concurrent limit-order matching engine served over persistent TCP
//! connections. Clients stream fixed-size order records; the engine
//! matches them with price-time priority and publishes an event line per
//! add, execution and cancel on the operator output stream.
//!
//! Architecture:
//! - One actor per instrument owning both books outright
//! - Two bounded mailboxes per instrument, one per side
//! - Phase-based matching: one side's burst at a time, pipelined
//!   against residue book appends
//! - Cancels serialised through the opposite-side mailbox
//! - Single output writer task so event lines never interleave

pub mod book;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod instrument;
pub mod logging;
pub mod registry;
pub mod server;
pub mod session;

pub use book::{Book, Fill, RestingOrder};
pub use config::EngineConfig;
pub use error::EngineError;
pub use event::{EngineEvent, EventQueue, EventSink, EventWriter};
pub use instrument::{Command, Instrument, InstrumentHandle, Request};
pub use registry::InstrumentRegistry;
pub use server::EngineServer;
pub use session::Session;
