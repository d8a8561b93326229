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

/// A point-in-time summary of a [`BloomFilter`](super::BloomFilter), for reporting.
///
/// The `Display` output is a human-readable report:
///
/// ```
/// # use bitbloom::bloom::BloomFilter;
/// let mut filter = BloomFilter::new(100, 0.05).unwrap();
/// filter.insert("alpha");
/// println!("{}", filter.stats());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterStats {
    /// Number of bits in the filter.
    pub number_bits: u64,
    /// Capacity the filter was sized for.
    pub estimated_elements: u64,
    /// Number of bit probes per item.
    pub number_hashes: u32,
    /// Target false positive rate the filter was sized for.
    pub false_positive_probability: f32,
    /// Number of bytes backing the bits.
    pub bit_store_length: usize,
    /// Number of insertions performed.
    pub elements_added: u64,
    /// Number of bits set to 1.
    pub bits_used: u64,
    /// Estimated false positive rate at the current fill.
    pub current_false_positive_rate: f64,
}

impl fmt::Display for FilterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BloomFilter")?;
        writeln!(f, "    bits: {}", self.number_bits)?;
        writeln!(f, "    estimated elements: {}", self.estimated_elements)?;
        writeln!(f, "    number hashes: {}", self.number_hashes)?;
        writeln!(
            f,
            "    max false positive rate: {:.6}",
            self.false_positive_probability
        )?;
        writeln!(f, "    bloom length (8 bits): {}", self.bit_store_length)?;
        writeln!(f, "    elements added: {}", self.elements_added)?;
        writeln!(f, "    bits used: {}", self.bits_used)?;
        write!(
            f,
            "    current false positive rate: {:.6}",
            self.current_false_positive_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::FilterStats;
    use crate::bloom::BloomFilter;

    #[test]
    fn test_stats_report() {
        let stats = FilterStats {
            number_bits: 624,
            estimated_elements: 100,
            number_hashes: 4,
            false_positive_probability: 0.05,
            bit_store_length: 78,
            elements_added: 3,
            bits_used: 12,
            current_false_positive_rate: 0.000_012_3,
        };
        assert_snapshot!(stats, @r"
        BloomFilter
            bits: 624
            estimated elements: 100
            number hashes: 4
            max false positive rate: 0.050000
            bloom length (8 bits): 78
            elements added: 3
            bits used: 12
            current false positive rate: 0.000012
        ");
    }

    #[test]
    fn test_stats_snapshot_matches_filter() {
        let mut filter = BloomFilter::new(100, 0.05).unwrap();
        filter.insert("alpha");
        filter.insert("beta");

        let stats = filter.stats();
        assert_eq!(stats.number_bits, filter.number_bits());
        assert_eq!(stats.number_hashes, filter.number_hashes());
        assert_eq!(stats.bit_store_length, filter.bit_store_length());
        assert_eq!(stats.elements_added, 2);
        assert_eq!(stats.bits_used, filter.bits_used());
        assert_eq!(
            stats.current_false_positive_rate,
            filter.current_false_positive_rate()
        );
    }
}
