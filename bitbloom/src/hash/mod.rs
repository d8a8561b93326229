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

//! Hash strategies mapping an item to the bit positions it occupies in a filter.

mod digest_chain;

pub use self::digest_chain::DigestChain;

/// Maps an item to the ordered sequence of bit indices a filter probes for it.
///
/// Implementations must be deterministic: the same `(count, modulus, item)` has to yield
/// the same indices on every call, on every run, or previously inserted items stop being
/// found. Every index must lie in `[0, modulus)`.
///
/// Any `Fn(u32, u64, &[u8]) -> Vec<u64>` closure is a strategy:
///
/// ```
/// # use std::sync::Arc;
/// # use bitbloom::bloom::BloomFilterBuilder;
/// let filter = BloomFilterBuilder::with_accuracy(100, 0.05)
///     .hash_strategy(Arc::new(|count: u32, modulus: u64, item: &[u8]| {
///         let seed = item.iter().fold(0u64, |h, b| h.wrapping_mul(31).wrapping_add(*b as u64));
///         (0..count as u64).map(|i| seed.wrapping_add(i) % modulus).collect::<Vec<_>>()
///     }))
///     .build()
///     .unwrap();
/// assert_eq!(filter.elements_added(), 0);
/// ```
pub trait HashStrategy: Send + Sync {
    /// Returns `count` indices in `[0, modulus)` for `item`.
    ///
    /// `modulus` is never zero when called by a filter. The result must hold exactly
    /// `count` indices: with fewer, `contains` would answer `true` for items never
    /// inserted. Filters check this with a debug assertion.
    fn indices(&self, count: u32, modulus: u64, item: &[u8]) -> Vec<u64>;
}

impl<F> HashStrategy for F
where
    F: Fn(u32, u64, &[u8]) -> Vec<u64> + Send + Sync,
{
    fn indices(&self, count: u32, modulus: u64, item: &[u8]) -> Vec<u64> {
        self(count, modulus, item)
    }
}
