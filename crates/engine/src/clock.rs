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

//! Monotonic nanosecond timestamp source
//!
//! Every event the engine emits carries a tick from this clock. Ticks are
//! wall-clock anchored for operator readability but advance on the
//! process monotonic clock, so two samples taken in program order may be
//! equal and never decrease — raw `SystemTime` reads can step backwards
//! under NTP adjustment, which would break book tie-ordering.

use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

struct Anchor {
	wall_nanos: i64,
	origin: Instant,
}

static ANCHOR: OnceLock<Anchor> = OnceLock::new();

fn anchor() -> &'static Anchor {
	ANCHOR.get_or_init(|| {
		let wall_nanos = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_nanos() as i64)
			.unwrap_or(0);
		Anchor {
			wall_nanos,
			origin: Instant::now(),
		}
	})
}

/// Current engine timestamp in nanoseconds since the Unix epoch
#[inline]
pub fn now() -> i64 {
	let anchor = anchor();
	anchor.wall_nanos + anchor.origin.elapsed().as_nanos() as i64
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::thread;
	use std::time::Duration;

	#[test]
	fn test_now_is_monotonic() {
		let mut previous = now();
		for _ in 0..10_000 {
			let tick = now();
			assert!(tick >= previous, "clock must never step backwards");
			previous = tick;
		}
	}

	#[test]
	fn test_now_advances() {
		let before = now();
		thread::sleep(Duration::from_millis(2));
		assert!(now() > before);
	}

	#[test]
	fn test_monotonic_across_threads() {
		let handles: Vec<_> = (0..4)
			.map(|_| {
				thread::spawn(|| {
					let mut ticks = Vec::with_capacity(1000);
					for _ in 0..1000 {
						ticks.push(now());
					}
					ticks
				})
			})
			.collect();

		for handle in handles {
			let ticks = handle.join().unwrap();
			for pair in ticks.windows(2) {
				assert!(pair[1] >= pair[0]);
			}
		}
	}
}
