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

use futures::SinkExt;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::codec::FramedWrite;

use crate::codec::{WireCodec, WireError};
use crate::types::{CancelRequest, ClientRequest, OrderRequest, Side};

/// Client for streaming order records to a Kiln engine
///
/// One client owns one persistent connection. The engine acknowledges
/// requests internally and publishes results on its operator event
/// stream, so the client side of the socket is write-only.
pub struct EngineClient {
	framed: FramedWrite<TcpStream, WireCodec>,
}

impl EngineClient {
	/// Connect to an engine listening at `addr`
	pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, WireError> {
		let stream = TcpStream::connect(addr).await?;
		stream.set_nodelay(true)?;
		Ok(Self {
			framed: FramedWrite::new(stream, WireCodec),
		})
	}

	/// Submit one raw request record
	pub async fn submit(&mut self, request: ClientRequest) -> Result<(), WireError> {
		self.framed.send(request).await
	}

	/// Submit a limit buy order
	pub async fn buy(
		&mut self,
		order_id: u32,
		symbol: &str,
		price: u32,
		count: u32,
	) -> Result<(), WireError> {
		self.order(Side::Buy, order_id, symbol, price, count).await
	}

	/// Submit a limit sell order
	pub async fn sell(
		&mut self,
		order_id: u32,
		symbol: &str,
		price: u32,
		count: u32,
	) -> Result<(), WireError> {
		self.order(Side::Sell, order_id, symbol, price, count).await
	}

	/// Submit a cancel for a previously submitted order
	pub async fn cancel(&mut self, order_id: u32) -> Result<(), WireError> {
		self.submit(ClientRequest::Cancel(CancelRequest { order_id }))
			.await
	}

	async fn order(
		&mut self,
		side: Side,
		order_id: u32,
		symbol: &str,
		price: u32,
		count: u32,
	) -> Result<(), WireError> {
		self.submit(ClientRequest::Order(OrderRequest {
			side,
			order_id,
			symbol: symbol.to_string(),
			price,
			count,
		}))
		.await
	}

	/// Flush pending records and close the connection
	pub async fn close(mut self) -> Result<(), WireError> {
		self.framed.close().await
	}
}
