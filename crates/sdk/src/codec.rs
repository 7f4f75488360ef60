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

//! Framing codec for the Kiln wire protocol
//!
//! Every request is one fixed-size record:
//!
//! ```text
//! offset  size  field
//! 0       1     kind      b'B' | b'S' | b'C'
//! 1       4     order_id  u32 LE
//! 5       4     price     u32 LE (zero for cancels)
//! 9       4     count     u32 LE (zero for cancels)
//! 13      8     symbol    ASCII, NUL-padded (empty for cancels)
//! ```
//!
//! The codec is pure and stateless: it neither validates business rules
//! (zero price/count is decoded and left to the engine to reject) nor
//! recovers from malformed records — an unknown kind byte means framing
//! is lost and the connection must die.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::types::{CancelRequest, ClientRequest, OrderRequest, SYMBOL_LEN, Side};

/// Size of one wire record in bytes
pub const RECORD_LEN: usize = 1 + 4 + 4 + 4 + SYMBOL_LEN;

/// Errors surfaced by the wire codec
#[derive(Debug, thiserror::Error)]
pub enum WireError {
	#[error("unknown record kind byte 0x{0:02x}")]
	UnknownKind(u8),
	#[error("order record carries an empty or non-ASCII symbol")]
	BadSymbol,
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// Codec for the fixed-record Kiln wire protocol
#[derive(Debug, Default, Clone, Copy)]
pub struct WireCodec;

impl Decoder for WireCodec {
	type Item = ClientRequest;
	type Error = WireError;

	fn decode(&mut self, src: &mut BytesMut) -> Result<Option<ClientRequest>, WireError> {
		if src.len() < RECORD_LEN {
			src.reserve(RECORD_LEN - src.len());
			return Ok(None);
		}

		let mut frame = src.split_to(RECORD_LEN);
		let kind = frame.get_u8();
		let order_id = frame.get_u32_le();
		let price = frame.get_u32_le();
		let count = frame.get_u32_le();

		let request = match kind {
			b'C' => ClientRequest::Cancel(CancelRequest { order_id }),
			b'B' | b'S' => {
				let side = if kind == b'B' { Side::Buy } else { Side::Sell };
				let symbol = decode_symbol(&frame)?;
				ClientRequest::Order(OrderRequest {
					side,
					order_id,
					symbol,
					price,
					count,
				})
			}
			other => return Err(WireError::UnknownKind(other)),
		};

		Ok(Some(request))
	}
}

impl Encoder<ClientRequest> for WireCodec {
	type Error = WireError;

	fn encode(&mut self, item: ClientRequest, dst: &mut BytesMut) -> Result<(), WireError> {
		dst.reserve(RECORD_LEN);
		match item {
			ClientRequest::Order(order) => {
				if order.symbol.is_empty() || order.symbol.len() > SYMBOL_LEN {
					return Err(WireError::BadSymbol);
				}
				dst.put_u8(order.side.tag() as u8);
				dst.put_u32_le(order.order_id);
				dst.put_u32_le(order.price);
				dst.put_u32_le(order.count);
				dst.put_slice(order.symbol.as_bytes());
				dst.put_bytes(0, SYMBOL_LEN - order.symbol.len());
			}
			ClientRequest::Cancel(cancel) => {
				dst.put_u8(b'C');
				dst.put_u32_le(cancel.order_id);
				dst.put_u32_le(0);
				dst.put_u32_le(0);
				dst.put_bytes(0, SYMBOL_LEN);
			}
		}
		Ok(())
	}
}

/// Decode the NUL-padded symbol field of an order record
fn decode_symbol(raw: &[u8]) -> Result<String, WireError> {
	let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
	let name = &raw[..end];
	if name.is_empty() || !name.iter().all(|b| b.is_ascii_graphic()) {
		return Err(WireError::BadSymbol);
	}
	// Padding after the terminator must stay NUL or the frame is suspect
	if raw[end..].iter().any(|&b| b != 0) {
		return Err(WireError::BadSymbol);
	}
	// Lossless: the field is validated ASCII
	Ok(String::from_utf8_lossy(name).into_owned())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn decode_all(bytes: &[u8]) -> Vec<ClientRequest> {
		let mut codec = WireCodec;
		let mut buf = BytesMut::from(bytes);
		let mut out = Vec::new();
		while let Some(request) = codec.decode(&mut buf).unwrap() {
			out.push(request);
		}
		out
	}

	fn encode(request: ClientRequest) -> BytesMut {
		let mut codec = WireCodec;
		let mut buf = BytesMut::new();
		codec.encode(request, &mut buf).unwrap();
		buf
	}

	#[test]
	fn test_decode_order_record() {
		let buf = encode(ClientRequest::Order(OrderRequest {
			side: Side::Buy,
			order_id: 100,
			symbol: "GOOG".to_string(),
			price: 2700,
			count: 10,
		}));
		assert_eq!(buf.len(), RECORD_LEN);

		let decoded = decode_all(&buf);
		assert_eq!(decoded.len(), 1);
		match &decoded[0] {
			ClientRequest::Order(order) => {
				assert_eq!(order.side, Side::Buy);
				assert_eq!(order.order_id, 100);
				assert_eq!(order.symbol, "GOOG");
				assert_eq!(order.price, 2700);
				assert_eq!(order.count, 10);
			}
			other => panic!("expected order, got {:?}", other),
		}
	}

	#[test]
	fn test_decode_cancel_ignores_payload_fields() {
		let buf = encode(ClientRequest::Cancel(CancelRequest { order_id: 42 }));
		let decoded = decode_all(&buf);
		assert_eq!(
			decoded,
			vec![ClientRequest::Cancel(CancelRequest { order_id: 42 })]
		);
	}

	#[test]
	fn test_partial_frame_waits_for_more_bytes() {
		let buf = encode(ClientRequest::Cancel(CancelRequest { order_id: 7 }));
		let mut codec = WireCodec;
		let mut partial = BytesMut::from(&buf[..RECORD_LEN - 3]);
		assert!(codec.decode(&mut partial).unwrap().is_none());

		partial.extend_from_slice(&buf[RECORD_LEN - 3..]);
		assert!(codec.decode(&mut partial).unwrap().is_some());
	}

	#[test]
	fn test_two_records_back_to_back() {
		let mut buf = encode(ClientRequest::Order(OrderRequest {
			side: Side::Sell,
			order_id: 1,
			symbol: "AAPL".to_string(),
			price: 180,
			count: 5,
		}));
		buf.extend_from_slice(&encode(ClientRequest::Cancel(CancelRequest {
			order_id: 1,
		})));
		assert_eq!(decode_all(&buf).len(), 2);
	}

	#[test]
	fn test_unknown_kind_is_an_error() {
		let mut buf = encode(ClientRequest::Cancel(CancelRequest { order_id: 9 }));
		buf[0] = b'Q';
		let mut codec = WireCodec;
		let err = codec.decode(&mut buf).unwrap_err();
		assert!(matches!(err, WireError::UnknownKind(b'Q')));
	}

	#[test]
	fn test_empty_symbol_is_an_error() {
		let mut buf = encode(ClientRequest::Order(OrderRequest {
			side: Side::Buy,
			order_id: 1,
			symbol: "X".to_string(),
			price: 1,
			count: 1,
		}));
		buf[13] = 0;
		let mut codec = WireCodec;
		assert!(matches!(
			codec.decode(&mut buf).unwrap_err(),
			WireError::BadSymbol
		));
	}

	#[test]
	fn test_zero_price_decodes_cleanly() {
		// Business validation is the engine's job, not the codec's
		let buf = encode(ClientRequest::Order(OrderRequest {
			side: Side::Buy,
			order_id: 3,
			symbol: "GOOG".to_string(),
			price: 0,
			count: 10,
		}));
		assert_eq!(decode_all(&buf).len(), 1);
	}
}
