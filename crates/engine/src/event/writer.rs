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

use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::EngineEvent;

/// Output writer — sole owner of the operator sink
///
/// The writer consumes events from the bounded queue and renders one
/// line per event. Because it is the only task that touches the sink,
/// event lines can never interleave. Lines are buffered and flushed when
/// the queue momentarily empties, batching I/O under load without
/// delaying output when traffic is light.
///
/// The writer exits once every producer handle has been dropped and the
/// queue is drained, which makes it the natural last task out during
/// shutdown.
pub struct EventWriter;

impl EventWriter {
	/// Consume events until the queue closes, writing lines to `sink`
	pub async fn run<W>(mut receiver: mpsc::Receiver<EngineEvent>, sink: W)
	where
		W: AsyncWrite + Unpin,
	{
		info!(target: "events", "output writer started");
		let mut writer = BufWriter::new(sink);
		let mut written: u64 = 0;

		while let Some(event) = receiver.recv().await {
			if Self::write_line(&mut writer, &event).await.is_err() {
				break;
			}
			written += 1;

			// Drain whatever queued up behind this event before paying
			// for a flush
			while let Ok(event) = receiver.try_recv() {
				if Self::write_line(&mut writer, &event).await.is_err() {
					return;
				}
				written += 1;
			}

			if let Err(e) = writer.flush().await {
				error!(target: "events", error = %e, "output sink flush failed");
				break;
			}
		}

		// Producers are gone; push out anything still buffered
		if let Err(e) = writer.flush().await {
			error!(target: "events", error = %e, "final flush failed");
		}
		debug!(target: "events", events = written, "output writer stopped");
	}

	async fn write_line<W>(
		writer: &mut BufWriter<W>,
		event: &EngineEvent,
	) -> Result<(), std::io::Error>
	where
		W: AsyncWrite + Unpin,
	{
		let mut line = event.to_string();
		line.push('\n');
		if let Err(e) = writer.write_all(line.as_bytes()).await {
			error!(target: "events", error = %e, "output sink write failed");
			return Err(e);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::event::EventQueue;
	use kiln_sdk::Side;
	use tokio::io::AsyncReadExt;

	#[tokio::test]
	async fn test_writer_renders_one_line_per_event() {
		let (sink, receiver) = EventQueue::new(16).split();
		let (write_half, mut read_half) = tokio::io::duplex(4096);
		let writer = tokio::spawn(EventWriter::run(receiver, write_half));

		sink.emit(EngineEvent::Added {
			side: Side::Buy,
			order_id: 1,
			symbol: "GOOG".to_string(),
			price: 10,
			count: 5,
			timestamp: 1,
		})
		.await;
		sink.emit(EngineEvent::Deleted {
			order_id: 1,
			accepted: true,
			timestamp: 2,
		})
		.await;
		drop(sink);
		writer.await.unwrap();

		let mut output = String::new();
		read_half.read_to_string(&mut output).await.unwrap();
		assert_eq!(output, "B 1 GOOG 10 5 1\nX 1 A 2\n");
	}

	#[tokio::test]
	async fn test_writer_drains_queue_before_exit() {
		let (sink, receiver) = EventQueue::new(64).split();
		let (write_half, mut read_half) = tokio::io::duplex(64 * 1024);

		for i in 0..50u32 {
			sink.emit(EngineEvent::Rejected {
				order_id: i,
				timestamp: i as i64,
			})
			.await;
		}
		drop(sink);

		EventWriter::run(receiver, write_half).await;

		let mut output = String::new();
		read_half.read_to_string(&mut output).await.unwrap();
		assert_eq!(output.lines().count(), 50);
	}
}
