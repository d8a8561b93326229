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
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use tracing::error;

use super::builder::default_hash_strategy;
use super::BitStore;
use super::BloomFilterBuilder;
use super::FilterParameters;
use super::FilterStats;
use crate::codec::FilterBytes;
use crate::codec::FilterReader;
use crate::error::Error;
use crate::hash::HashStrategy;

/// Size in bytes of the persisted header preceding the bit array: estimated elements
/// (`u64`), elements added (`u64`) and false positive probability (`f32`).
pub const HEADER_SIZE: usize = 8 + 8 + 4;

/// A Bloom filter for probabilistic set membership testing.
///
/// Provides fast membership queries with:
/// - No false negatives (inserted items always return `true`)
/// - Tunable false positive rate
/// - Constant space usage
///
/// The filter does not resize; inserting more than the estimated number of elements is
/// allowed and only raises the false positive rate.
///
/// Use [`BloomFilterBuilder`] or [`BloomFilter::new`] to construct instances.
#[derive(Clone)]
pub struct BloomFilter {
    pub(super) params: FilterParameters,
    /// Capacity the filter was sized for (n)
    pub(super) estimated_elements: u64,
    /// Target false positive rate the filter was sized for (p)
    pub(super) false_positive_probability: f32,
    /// Number of insert calls, including repeated items
    pub(super) elements_added: u64,
    pub(super) bits: BitStore,
    pub(super) hash_strategy: Arc<dyn HashStrategy>,
}

impl BloomFilter {
    /// Creates an empty filter for `estimated_elements` items at `false_positive_rate`,
    /// using the default hash strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
    /// `estimated_elements` is zero or `false_positive_rate` is not in `(0, 1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bitbloom::bloom::BloomFilter;
    /// let filter = BloomFilter::new(10_000, 0.01).unwrap();
    /// assert!(filter.is_empty());
    /// assert!(BloomFilter::new(0, 0.01).is_err());
    /// assert!(BloomFilter::new(10, 1.0).is_err());
    /// ```
    pub fn new(estimated_elements: u64, false_positive_rate: f32) -> Result<Self, Error> {
        BloomFilterBuilder::with_accuracy(estimated_elements, false_positive_rate).build()
    }

    /// Rebinds the hash strategy. `None` restores the default [`DigestChain`].
    ///
    /// The bits are left untouched, so items inserted under the previous strategy are no
    /// longer reliably found unless both strategies agree.
    ///
    /// [`DigestChain`]: crate::hash::DigestChain
    pub fn set_hash_strategy(&mut self, hash_strategy: Option<Arc<dyn HashStrategy>>) {
        self.hash_strategy = hash_strategy.unwrap_or_else(default_hash_strategy);
    }

    /// Inserts an item into the filter.
    ///
    /// After insertion, `contains(item)` will always return `true`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bitbloom::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(100, 0.05).unwrap();
    /// filter.insert("alpha");
    /// filter.insert(b"raw bytes");
    /// filter.insert(42_u64.to_le_bytes());
    ///
    /// assert!(filter.contains("alpha"));
    /// assert_eq!(filter.elements_added(), 3);
    /// ```
    pub fn insert<T: AsRef<[u8]>>(&mut self, item: T) {
        for index in self.bit_indices(item.as_ref()) {
            self.bits.set(index);
        }
        self.elements_added = self.elements_added.saturating_add(1);
    }

    /// Tests whether an item is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Item was **possibly** inserted (or false positive)
    /// - `false`: Item was **definitely not** inserted
    pub fn contains<T: AsRef<[u8]>>(&self, item: T) -> bool {
        self.bit_indices(item.as_ref())
            .into_iter()
            .all(|index| self.bits.test(index))
    }

    /// Tests and inserts an item in a single operation.
    ///
    /// Returns whether the item was possibly already in the set before insertion. Hashes the
    /// item once instead of twice for a separate `contains()` and `insert()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bitbloom::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(100, 0.01).unwrap();
    /// assert!(!filter.contains_and_insert("apple"));
    /// assert!(filter.contains_and_insert("apple"));
    /// ```
    pub fn contains_and_insert<T: AsRef<[u8]>>(&mut self, item: T) -> bool {
        let mut was_present = true;
        for index in self.bit_indices(item.as_ref()) {
            if self.bits.set(index) {
                was_present = false;
            }
        }
        self.elements_added = self.elements_added.saturating_add(1);
        was_present
    }

    /// Estimates the current false positive probability from the number of insertions.
    ///
    /// Uses `(1 - e^(-k * n / m))^k` where `n` is [`elements_added()`](Self::elements_added).
    /// This assumes uniformly distributed hashes and counts repeated inserts of the same item
    /// as distinct, so it is an upper estimate for streams with duplicates.
    pub fn current_false_positive_rate(&self) -> f64 {
        let k = f64::from(self.params.number_hashes);
        let n = self.elements_added as f64;
        let m = self.params.number_bits as f64;

        (1.0 - (-k * n / m).exp()).powf(k)
    }

    /// Returns the capacity the filter was sized for.
    pub fn estimated_elements(&self) -> u64 {
        self.estimated_elements
    }

    /// Returns the target false positive rate the filter was sized for.
    pub fn false_positive_probability(&self) -> f32 {
        self.false_positive_probability
    }

    /// Returns the number of bits in the filter.
    pub fn number_bits(&self) -> u64 {
        self.params.number_bits
    }

    /// Returns the number of bit probes per item.
    pub fn number_hashes(&self) -> u32 {
        self.params.number_hashes
    }

    /// Returns the number of bytes backing the bits.
    pub fn bit_store_length(&self) -> usize {
        self.params.bit_store_length
    }

    /// Returns the sizing of the filter.
    pub fn parameters(&self) -> FilterParameters {
        self.params
    }

    /// Returns the number of insertions performed.
    pub fn elements_added(&self) -> u64 {
        self.elements_added
    }

    /// Returns whether no item has been inserted.
    pub fn is_empty(&self) -> bool {
        self.bits.count_ones() == 0
    }

    /// Returns the number of bits set to 1.
    pub fn bits_used(&self) -> u64 {
        self.bits.count_ones()
    }

    /// Returns the fraction of bits set.
    ///
    /// Values above 0.5 indicate the filter holds more than it was sized for.
    pub fn load_factor(&self) -> f64 {
        self.bits.count_ones() as f64 / self.params.number_bits as f64
    }

    /// Returns the packed bit array.
    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_bytes()
    }

    /// Returns a snapshot of the filter's statistics for reporting.
    pub fn stats(&self) -> FilterStats {
        FilterStats {
            number_bits: self.params.number_bits,
            estimated_elements: self.estimated_elements,
            number_hashes: self.params.number_hashes,
            false_positive_probability: self.false_positive_probability,
            bit_store_length: self.params.bit_store_length,
            elements_added: self.elements_added,
            bits_used: self.bits.count_ones(),
            current_false_positive_rate: self.current_false_positive_rate(),
        }
    }

    /// Serializes the filter to a byte vector.
    ///
    /// Layout (little-endian):
    ///
    /// ```text
    /// offset 0   u64  estimated_elements
    /// offset 8   u64  elements_added
    /// offset 16  f32  false_positive_probability
    /// offset 20  [u8; bit_store_length] bits
    /// ```
    ///
    /// The bit array length is not stored; readers re-derive it from the header with
    /// [`FilterParameters::compute`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use bitbloom::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(100, 0.01).unwrap();
    /// filter.insert("test");
    ///
    /// let bytes = filter.serialize();
    /// let restored = BloomFilter::deserialize(&bytes).unwrap();
    /// assert!(restored.contains("test"));
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = FilterBytes::with_capacity(HEADER_SIZE + self.bits.len());
        bytes.write_u64_le(self.estimated_elements);
        bytes.write_u64_le(self.elements_added);
        bytes.write_f32_le(self.false_positive_probability);
        bytes.write(self.bits.as_bytes());
        bytes.into_bytes()
    }

    /// Deserializes a filter from bytes, using the default hash strategy.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The data is truncated ([`ErrorKind::Io`](crate::error::ErrorKind::Io))
    /// - The header cannot be sized, or bytes trail the bit array
    ///   ([`ErrorKind::InvalidData`](crate::error::ErrorKind::InvalidData))
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Self::deserialize_with_strategy(bytes, None)
    }

    /// Deserializes a filter from bytes and binds the given hash strategy.
    ///
    /// `None` selects the default strategy.
    pub fn deserialize_with_strategy(
        bytes: &[u8],
        hash_strategy: Option<Arc<dyn HashStrategy>>,
    ) -> Result<Self, Error> {
        let filter = Self::read_from(bytes, hash_strategy)?;
        let consumed = HEADER_SIZE + filter.bits.len();
        if bytes.len() != consumed {
            return Err(Error::invalid_data(format!(
                "expected {consumed} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(filter)
    }

    /// Writes the serialized filter to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Io`](crate::error::ErrorKind::Io) if writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        writer
            .write_all(&self.serialize())
            .and_then(|_| writer.flush())
            .map_err(|e| Error::io("failed to write filter", e))
    }

    /// Reads one serialized filter from `reader`, leaving any following bytes unread.
    ///
    /// `None` selects the default hash strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Io`](crate::error::ErrorKind::Io) if the reader fails or ends
    /// before the full bit array, and
    /// [`ErrorKind::InvalidData`](crate::error::ErrorKind::InvalidData) if the header cannot
    /// be sized.
    pub fn read_from<R: Read>(
        reader: R,
        hash_strategy: Option<Arc<dyn HashStrategy>>,
    ) -> Result<Self, Error> {
        let mut reader = FilterReader::new(reader);
        let header = PersistedHeader::read(&mut reader)?;
        Self::read_bits(header, &mut reader, hash_strategy)
    }

    /// Saves the filter to the file at `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Io`](crate::error::ErrorKind::Io) if the file cannot be created
    /// or written.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            error!("Can't open file {} for writing: {}", path.display(), e);
            Error::io("cannot create file", e).with_context("path", path.display())
        })?;

        self.write_to(BufWriter::new(file)).map_err(|e| {
            error!("Can't write file {}: {}", path.display(), e);
            e.with_context("path", path.display())
        })?;

        debug!(
            "Exported bloom filter to {} ({} bits, {} elements added)",
            path.display(),
            self.params.number_bits,
            self.elements_added
        );
        Ok(())
    }

    /// Loads a filter saved by [`export()`](Self::export) and binds the given hash strategy.
    ///
    /// The filter must be queried with the strategy it was filled with; `None` selects the
    /// default strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Io`](crate::error::ErrorKind::Io) if the file cannot be opened or
    /// is shorter than its header requires, and
    /// [`ErrorKind::InvalidData`](crate::error::ErrorKind::InvalidData) if the header cannot
    /// be sized or the file is longer than its header requires.
    pub fn import<P: AsRef<Path>>(
        path: P,
        hash_strategy: Option<Arc<dyn HashStrategy>>,
    ) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            error!("Can't open file {} for reading: {}", path.display(), e);
            Error::io("cannot open file", e).with_context("path", path.display())
        })?;
        let file_len = file
            .metadata()
            .map_err(|e| Error::io("cannot stat file", e).with_context("path", path.display()))?
            .len();

        let mut reader = FilterReader::new(BufReader::new(file));
        let header = PersistedHeader::read(&mut reader)
            .map_err(|e| e.with_context("path", path.display()))?;

        // Checked before the bit array is allocated.
        let expected_len = HEADER_SIZE as u64 + header.params.bit_store_length as u64;
        if file_len < expected_len {
            let short = io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file has {file_len} bytes, header requires {expected_len}"),
            );
            return Err(Error::insufficient_data("bit_array", short)
                .with_context("path", path.display()));
        }
        if file_len > expected_len {
            return Err(Error::invalid_data(format!(
                "expected {expected_len} bytes, file has {file_len}"
            ))
            .with_context("path", path.display()));
        }

        let filter = Self::read_bits(header, &mut reader, hash_strategy)
            .map_err(|e| e.with_context("path", path.display()))?;

        debug!(
            "Imported bloom filter from {} ({} bits, {} elements added)",
            path.display(),
            filter.params.number_bits,
            filter.elements_added
        );
        Ok(filter)
    }

    fn read_bits<R: Read>(
        header: PersistedHeader,
        reader: &mut FilterReader<R>,
        hash_strategy: Option<Arc<dyn HashStrategy>>,
    ) -> Result<Self, Error> {
        let bytes = reader
            .read_bytes(header.params.bit_store_length)
            .map_err(|e| Error::insufficient_data("bit_array", e))?;

        Ok(BloomFilter {
            params: header.params,
            estimated_elements: header.estimated_elements,
            false_positive_probability: header.false_positive_probability,
            elements_added: header.elements_added,
            bits: BitStore::from_bytes(bytes),
            hash_strategy: hash_strategy.unwrap_or_else(default_hash_strategy),
        })
    }

    /// Computes the bit positions of an item.
    ///
    /// Indices are reduced modulo the number of bits so that a strategy returning
    /// out-of-range values can never address past the bit store.
    fn bit_indices(&self, item: &[u8]) -> Vec<u64> {
        let modulus = self.params.number_bits;
        let count = self.params.number_hashes;
        let mut indices = self.hash_strategy.indices(count, modulus, item);
        debug_assert_eq!(
            indices.len(),
            count as usize,
            "hash strategy must return one index per hash"
        );
        for index in &mut indices {
            *index %= modulus;
        }
        indices
    }
}

/// The fixed-size fields preceding the bit array, with the sizing they imply.
struct PersistedHeader {
    estimated_elements: u64,
    elements_added: u64,
    false_positive_probability: f32,
    params: FilterParameters,
}

impl PersistedHeader {
    fn read<R: Read>(reader: &mut FilterReader<R>) -> Result<Self, Error> {
        let estimated_elements = reader
            .read_u64_le()
            .map_err(|e| Error::insufficient_data("estimated_elements", e))?;
        let elements_added = reader
            .read_u64_le()
            .map_err(|e| Error::insufficient_data("elements_added", e))?;
        let false_positive_probability = reader
            .read_f32_le()
            .map_err(|e| Error::insufficient_data("false_positive_probability", e))?;

        let params = FilterParameters::compute(estimated_elements, false_positive_probability)
            .map_err(|e| {
                Error::invalid_data(format!("cannot size persisted filter: {}", e.message()))
                    .with_context("estimated_elements", estimated_elements)
                    .with_context("false_positive_probability", false_positive_probability)
            })?;

        Ok(PersistedHeader {
            estimated_elements,
            elements_added,
            false_positive_probability,
            params,
        })
    }
}

impl fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilter")
            .field("estimated_elements", &self.estimated_elements)
            .field("false_positive_probability", &self.false_positive_probability)
            .field("number_bits", &self.params.number_bits)
            .field("number_hashes", &self.params.number_hashes)
            .field("bit_store_length", &self.params.bit_store_length)
            .field("elements_added", &self.elements_added)
            .field("bits_used", &self.bits.count_ones())
            .finish_non_exhaustive()
    }
}
