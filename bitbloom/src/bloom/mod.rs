// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Bloom filter implementation for probabilistic set membership testing.
//!
//! A Bloom filter is a space-efficient probabilistic data structure used to test whether
//! an element is a member of a set. False positive matches are possible, but false negatives
//! are not. In other words, a query returns either "possibly in set" or "definitely not in set".
//!
//! # Properties
//!
//! - **No false negatives**: If an item was inserted, `contains()` will always return `true`
//! - **Possible false positives**: `contains()` may return `true` for items never inserted
//! - **Fixed size**: The filter never resizes and items can't be removed
//! - **Persistent**: Filters can be exported to a file and imported again
//!
//! # Usage
//!
//! ```rust
//! use bitbloom::bloom::BloomFilter;
//!
//! // Create a filter sized for 1000 items with 1% false positive rate
//! let mut filter = BloomFilter::new(1000, 0.01).unwrap();
//!
//! filter.insert("apple");
//! filter.insert("banana");
//!
//! assert!(filter.contains("apple")); // true - definitely inserted
//! println!("Bits: {}", filter.number_bits());
//! println!("Est. FPP: {:.4}%", filter.current_false_positive_rate() * 100.0);
//! ```
//!
//! # Persistence
//!
//! ```rust,no_run
//! # use bitbloom::bloom::BloomFilter;
//! let mut filter = BloomFilter::new(1000, 0.01).unwrap();
//! filter.insert("apple");
//! filter.export("fruit.blm").unwrap();
//!
//! let restored = BloomFilter::import("fruit.blm", None).unwrap();
//! assert!(restored.contains("apple"));
//! ```
//!
//! The file holds the capacity, the number of insertions and the target rate, followed by
//! the raw bit array. The number of bits and hashes are not stored: they are re-derived
//! from the header with [`FilterParameters::compute`], which makes that formula part of the
//! file format.
//!
//! # Implementation Details
//!
//! - `m = ceil(-n * ln(p) / ln(2)^2)` bits and `k = round(ln(2) * m / n)` hashes, with `k`
//!   raised to at least 1
//! - Bits packed into bytes, least significant bit first
//! - Bit positions come from a pluggable [`HashStrategy`](crate::hash::HashStrategy),
//!   by default a chain of SHA-256 digests ([`DigestChain`](crate::hash::DigestChain))
//!
//! A filter is not synchronized. Share it across threads behind a lock.
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/time trade-offs in hash coding with allowable errors"

mod bits;
mod builder;
mod sketch;
mod stats;

pub use self::bits::BitStore;
pub use self::builder::BloomFilterBuilder;
pub use self::builder::FilterParameters;
pub use self::builder::MAX_ESTIMATED_ELEMENTS;
pub use self::builder::MAX_NUM_BITS;
pub use self::builder::MIN_NUM_HASHES;
pub use self::sketch::BloomFilter;
pub use self::sketch::HEADER_SIZE;
pub use self::stats::FilterStats;
