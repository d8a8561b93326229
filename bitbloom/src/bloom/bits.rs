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

use crate::error::Error;

/// A fixed-size array of bits packed into bytes.
///
/// Bit `i` lives in byte `i / 8` at position `i % 8`, counting from the least significant
/// bit. Persisted filters are the raw bytes of this store, so the layout is part of the file
/// format.
///
/// Bits can be set but never cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitStore {
    bytes: Vec<u8>,
    /// Count of bits set to 1
    num_bits_set: u64,
}

impl BitStore {
    /// Creates a store of `len` bytes with every bit cleared.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
    /// `len` bytes cannot be allocated.
    pub fn new(len: usize) -> Result<Self, Error> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(len).map_err(|e| {
            Error::invalid_argument(format!("cannot allocate bit array: {e}"))
                .with_context("bit_store_length", len)
        })?;
        bytes.resize(len, 0);
        Ok(BitStore {
            bytes,
            num_bits_set: 0,
        })
    }

    /// Creates a store over previously persisted bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let num_bits_set = bytes.iter().map(|b| u64::from(b.count_ones())).sum();
        BitStore {
            bytes,
            num_bits_set,
        }
    }

    /// Sets the bit at `index`, returning whether it was previously clear.
    ///
    /// # Panics
    ///
    /// Panics if `index` is beyond the end of the store.
    pub fn set(&mut self, index: u64) -> bool {
        let (byte, mask) = locate(index);
        let was_clear = self.bytes[byte] & mask == 0;
        if was_clear {
            self.bytes[byte] |= mask;
            self.num_bits_set += 1;
        }
        was_clear
    }

    /// Returns whether the bit at `index` is set.
    ///
    /// # Panics
    ///
    /// Panics if `index` is beyond the end of the store.
    pub fn test(&self, index: u64) -> bool {
        let (byte, mask) = locate(index);
        self.bytes[byte] & mask != 0
    }

    /// Returns the number of bits set to 1.
    pub fn count_ones(&self) -> u64 {
        self.num_bits_set
    }

    /// Returns the length of the store in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns whether the store has no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the packed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Byte offset and in-byte mask of a bit index.
#[inline]
fn locate(index: u64) -> (usize, u8) {
    ((index >> 3) as usize, 1u8 << (index & 7))
}
