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

use byteorder::ByteOrder;
use byteorder::LE;
use sha2::Digest;
use sha2::Sha256;

use super::HashStrategy;

/// The default hash strategy: a chain of SHA-256 digests.
///
/// The first digest is taken over the item bytes, and every following digest is taken
/// over the raw output of the one before it. Index `i` is the first 8 bytes of digest `i`
/// read as a little-endian `u64`, reduced modulo the number of bits.
///
/// Filters persisted with this strategy can only be read back with it, so the chaining
/// scheme and the byte order are fixed.
///
/// SHA-256 is used as a well-distributed mixing function here, not for any security
/// property of the filter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DigestChain;

impl HashStrategy for DigestChain {
    fn indices(&self, count: u32, modulus: u64, item: &[u8]) -> Vec<u64> {
        let mut indices = Vec::with_capacity(count as usize);
        if count == 0 {
            return indices;
        }

        let mut digest = Sha256::digest(item);
        indices.push(LE::read_u64(&digest[..8]) % modulus);
        for _ in 1..count {
            digest = Sha256::digest(digest);
            indices.push(LE::read_u64(&digest[..8]) % modulus);
        }
        indices
    }
}
