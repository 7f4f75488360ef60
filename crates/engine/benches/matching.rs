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

//! Book hot-path benchmarks
//!
//! Covers the two operations a phase spends its time in: consuming the
//! opposite book front-first and the end-of-phase re-sort.

use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use kiln_engine::book::{Book, RestingOrder};
use kiln_sdk::Side;

fn seeded_book(orders: u32) -> Book {
	let mut book = Book::new(Side::Sell);
	for i in 0..orders {
		book.push(RestingOrder {
			id: i,
			// Spread over 50 price levels, appended out of order
			price: 100 + (i * 7919) % 50,
			count: 10,
			exec_seq: 1,
			timestamp: i as i64,
		});
	}
	book
}

fn bench_sweep(c: &mut Criterion) {
	c.bench_function("sweep_1000_resting", |b| {
		b.iter_batched(
			|| {
				let mut book = seeded_book(1000);
				book.resort();
				book
			},
			|mut book| {
				let mut remaining: u32 = 10_000;
				while remaining > 0 && book.crosses(200) {
					let Some(fill) = book.fill_front(remaining) else {
						break;
					};
					remaining -= fill.count;
				}
				black_box(book)
			},
			BatchSize::SmallInput,
		)
	});
}

fn bench_resort(c: &mut Criterion) {
	c.bench_function("resort_1000_resting", |b| {
		b.iter_batched(
			|| seeded_book(1000),
			|mut book| {
				book.resort();
				black_box(book)
			},
			BatchSize::SmallInput,
		)
	});
}

criterion_group!(benches, bench_sweep, bench_resort);
criterion_main!(benches);
