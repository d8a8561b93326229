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

use std::fmt;
use std::sync::Arc;

use super::BitStore;
use super::BloomFilter;
use crate::error::Error;
use crate::hash::DigestChain;
use crate::hash::HashStrategy;

/// Largest capacity accepted, so that it converts to a signed 64-bit count.
pub const MAX_ESTIMATED_ELEMENTS: u64 = i64::MAX as u64;
/// Largest number of bits the sizing formula may produce.
///
/// This bounds the arithmetic only. Whether a filter of that size can actually be allocated
/// is checked when its bit array is created.
pub const MAX_NUM_BITS: u64 = i64::MAX as u64;
/// Lower bound applied to the derived number of hashes.
///
/// The optimal-k formula rounds to zero for rates close to 1, which would turn every
/// insert into a no-op and every query into `true`.
pub const MIN_NUM_HASHES: u32 = 1;

const LN_2_SQUARED: f64 = std::f64::consts::LN_2 * std::f64::consts::LN_2;

/// Sizing of a filter, derived from its capacity and target false positive rate.
///
/// Persisted filters only record the capacity and the rate, and are re-sized through
/// [`FilterParameters::compute`] on import. Changing this derivation changes the file
/// format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParameters {
    /// Number of bits in the filter (m).
    pub number_bits: u64,
    /// Number of bit probes per item (k).
    pub number_hashes: u32,
    /// Number of bytes backing the bits, `ceil(m / 8)`.
    pub bit_store_length: usize,
}

impl FilterParameters {
    /// Derives the optimal sizing for `estimated_elements` items at `false_positive_rate`.
    ///
    /// - `m = ceil(-n * ln(p) / ln(2)^2)`
    /// - `k = max(1, round(ln(2) * m / n))`
    /// - `bit_store_length = ceil(m / 8)`
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
    /// `estimated_elements` is zero or larger than [`MAX_ESTIMATED_ELEMENTS`], if
    /// `false_positive_rate` is not in `(0, 1)`, or if the resulting filter would not fit
    /// in memory.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bitbloom::bloom::FilterParameters;
    /// let params = FilterParameters::compute(10_000, 0.01).unwrap();
    /// assert_eq!(params.number_bits, 95_851);
    /// assert_eq!(params.number_hashes, 7);
    /// assert_eq!(params.bit_store_length, 11_982);
    /// ```
    pub fn compute(estimated_elements: u64, false_positive_rate: f32) -> Result<Self, Error> {
        if estimated_elements == 0 {
            return Err(Error::invalid_argument(
                "estimated_elements must be greater than 0",
            ));
        }
        if estimated_elements > MAX_ESTIMATED_ELEMENTS {
            return Err(Error::invalid_argument(format!(
                "estimated_elements must not exceed {MAX_ESTIMATED_ELEMENTS}"
            ))
            .with_context("estimated_elements", estimated_elements));
        }
        // NaN fails both comparisons.
        if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
            return Err(Error::invalid_argument(
                "false_positive_rate must be between 0.0 and 1.0 (exclusive)",
            )
            .with_context("false_positive_rate", false_positive_rate));
        }

        let number_bits =
            BloomFilterBuilder::suggest_num_bits(estimated_elements, false_positive_rate)
                .ok_or_else(|| {
                    Error::invalid_argument(format!(
                        "filter would need more than {MAX_NUM_BITS} bits"
                    ))
                    .with_context("estimated_elements", estimated_elements)
                    .with_context("false_positive_rate", false_positive_rate)
                })?;
        let number_hashes =
            BloomFilterBuilder::suggest_num_hashes(estimated_elements, number_bits);
        let bit_store_length = usize::try_from(number_bits.div_ceil(8)).map_err(|_| {
            Error::invalid_argument("bit array does not fit in addressable memory")
                .with_context("number_bits", number_bits)
        })?;

        Ok(FilterParameters {
            number_bits,
            number_hashes,
            bit_store_length,
        })
    }
}

/// Builder for creating [`BloomFilter`] instances.
///
/// The filter is sized from the expected number of items and the target false positive
/// rate. The hash strategy defaults to [`DigestChain`].
///
/// # Examples
///
/// ```
/// # use bitbloom::bloom::BloomFilterBuilder;
/// let filter = BloomFilterBuilder::with_accuracy(10_000, 0.01).build().unwrap();
/// assert_eq!(filter.number_bits(), 95_851);
/// assert_eq!(filter.number_hashes(), 7);
/// ```
#[derive(Clone)]
pub struct BloomFilterBuilder {
    estimated_elements: u64,
    false_positive_rate: f32,
    hash_strategy: Option<Arc<dyn HashStrategy>>,
}

impl BloomFilterBuilder {
    /// Creates a builder for a filter holding about `estimated_elements` items with a false
    /// positive rate of `false_positive_rate`.
    ///
    /// The arguments are validated by [`build()`](Self::build).
    pub fn with_accuracy(estimated_elements: u64, false_positive_rate: f32) -> Self {
        BloomFilterBuilder {
            estimated_elements,
            false_positive_rate,
            hash_strategy: None,
        }
    }

    /// Sets the hash strategy used to place items in the filter.
    ///
    /// A filter must be queried with the same strategy it was filled with.
    pub fn hash_strategy(mut self, hash_strategy: Arc<dyn HashStrategy>) -> Self {
        self.hash_strategy = Some(hash_strategy);
        self
    }

    /// Builds the Bloom filter with all bits cleared.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) when
    /// the capacity or rate is out of range; see [`FilterParameters::compute`].
    pub fn build(self) -> Result<BloomFilter, Error> {
        let params =
            FilterParameters::compute(self.estimated_elements, self.false_positive_rate)?;
        let bits = BitStore::new(params.bit_store_length)
            .map_err(|e| e.with_context("number_bits", params.number_bits))?;
        Ok(BloomFilter {
            params,
            estimated_elements: self.estimated_elements,
            false_positive_probability: self.false_positive_rate,
            elements_added: 0,
            bits,
            hash_strategy: self.hash_strategy.unwrap_or_else(default_hash_strategy),
        })
    }

    /// Suggests the optimal number of bits for `max_items` at false positive rate `fpp`.
    ///
    /// Formula: `m = ceil(-n * ln(p) / (ln(2)^2))`
    ///
    /// Returns `None` when the result exceeds [`MAX_NUM_BITS`]. Arguments are expected to be
    /// valid, i.e. `max_items > 0` and `0 < fpp < 1`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bitbloom::bloom::BloomFilterBuilder;
    /// let bits = BloomFilterBuilder::suggest_num_bits(1000, 0.01).unwrap();
    /// assert_eq!(bits, 9586);
    /// ```
    pub fn suggest_num_bits(max_items: u64, fpp: f32) -> Option<u64> {
        let n = max_items as f64;
        let p = f64::from(fpp);

        let bits = (-n * p.ln() / LN_2_SQUARED).ceil();
        // Also rejects NaN.
        if !(bits < MAX_NUM_BITS as f64) {
            return None;
        }
        Some((bits as u64).max(1))
    }

    /// Suggests the optimal number of hash functions for `max_items` in `num_bits` bits.
    ///
    /// Formula: `k = round(m / n * ln(2))`, raised to [`MIN_NUM_HASHES`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use bitbloom::bloom::BloomFilterBuilder;
    /// assert_eq!(BloomFilterBuilder::suggest_num_hashes(1000, 9586), 7); // k ≈ 6.64
    /// assert_eq!(BloomFilterBuilder::suggest_num_hashes(100, 47), 1); // k ≈ 0.33
    /// ```
    pub fn suggest_num_hashes(max_items: u64, num_bits: u64) -> u32 {
        let m = num_bits as f64;
        let n = max_items as f64;

        let k = (std::f64::consts::LN_2 * m / n).round();
        (k as u32).max(MIN_NUM_HASHES)
    }
}

impl fmt::Debug for BloomFilterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilterBuilder")
            .field("estimated_elements", &self.estimated_elements)
            .field("false_positive_rate", &self.false_positive_rate)
            .field("custom_hash_strategy", &self.hash_strategy.is_some())
            .finish()
    }
}

pub(super) fn default_hash_strategy() -> Arc<dyn HashStrategy> {
    Arc::new(DigestChain)
}
