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

mod common;

use std::fs;
use std::sync::Arc;

use bitbloom::bloom::BloomFilter;
use bitbloom::bloom::BloomFilterBuilder;
use bitbloom::bloom::HEADER_SIZE;
use bitbloom::error::ErrorKind;
use bitbloom::hash::HashStrategy;
use common::filter_path;
use common::items;

fn filled_filter(count: usize) -> (BloomFilter, Vec<String>) {
    let mut filter = BloomFilter::new(1_000, 0.01).unwrap();
    let inserted = items("saved", count);
    for item in &inserted {
        filter.insert(item);
    }
    (filter, inserted)
}

#[test]
fn test_export_import_round_trip() {
    let (_dir, path) = filter_path("round_trip.blm");
    let (filter, inserted) = filled_filter(250);

    filter.export(&path).unwrap();
    assert_eq!(
        fs::metadata(&path).unwrap().len(),
        (HEADER_SIZE + filter.bit_store_length()) as u64
    );

    let restored = BloomFilter::import(&path, None).unwrap();
    assert_eq!(restored.estimated_elements(), 1_000);
    assert_eq!(restored.elements_added(), 250);
    assert_eq!(restored.false_positive_probability(), 0.01);
    assert_eq!(restored.parameters(), filter.parameters());
    assert_eq!(restored.as_bytes(), filter.as_bytes());
    assert!(inserted.iter().all(|item| restored.contains(item)));

    let candidates = items("candidate", 500);
    for candidate in &candidates {
        assert_eq!(restored.contains(candidate), filter.contains(candidate));
    }
}

#[test]
fn test_export_overwrites_existing_file() {
    let (_dir, path) = filter_path("overwrite.blm");
    fs::write(&path, vec![0xAB; 100_000]).unwrap();

    let (filter, _) = filled_filter(10);
    filter.export(&path).unwrap();

    let restored = BloomFilter::import(&path, None).unwrap();
    assert_eq!(restored.elements_added(), 10);
}

#[test]
fn test_import_with_custom_strategy() {
    let strategy: Arc<dyn HashStrategy> = Arc::new(|count: u32, modulus: u64, item: &[u8]| {
        let seed = item
            .iter()
            .fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
                (h ^ u64::from(*b)).wrapping_mul(0x0100_0000_01b3)
            });
        (0..u64::from(count))
            .map(|i| seed.rotate_left(i as u32 * 7) % modulus)
            .collect::<Vec<u64>>()
    });
    let (_dir, path) = filter_path("custom.blm");

    let mut filter = BloomFilterBuilder::with_accuracy(100, 0.05)
        .hash_strategy(strategy.clone())
        .build()
        .unwrap();
    for word in ["alpha", "beta", "gamma"] {
        filter.insert(word);
    }
    filter.export(&path).unwrap();

    let restored = BloomFilter::import(&path, Some(strategy)).unwrap();
    assert!(restored.contains("alpha"));
    assert!(restored.contains("beta"));
    assert!(restored.contains("gamma"));
}

#[test]
fn test_import_missing_file() {
    let (_dir, path) = filter_path("does_not_exist.blm");
    let err = BloomFilter::import(&path, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("does_not_exist.blm"));
}

#[test]
fn test_export_to_missing_directory() {
    let (dir, _) = filter_path("unused.blm");
    let path = dir.path().join("no_such_dir").join("filter.blm");

    let (filter, _) = filled_filter(1);
    let err = filter.export(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_import_truncated_file() {
    let (_dir, path) = filter_path("truncated.blm");
    let (filter, _) = filled_filter(50);
    let bytes = filter.serialize();

    for len in [0, 12, HEADER_SIZE, bytes.len() - 1] {
        fs::write(&path, &bytes[..len]).unwrap();
        let err = BloomFilter::import(&path, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io, "len={len}");
    }
}

#[test]
fn test_import_header_larger_than_file() {
    let (_dir, path) = filter_path("huge_header.blm");
    let mut bytes = Vec::with_capacity(HEADER_SIZE);
    bytes.extend_from_slice(&1_000_000_000_000_000u64.to_le_bytes());
    bytes.extend_from_slice(&0u64.to_le_bytes());
    bytes.extend_from_slice(&0.01f32.to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    let err = BloomFilter::import(&path, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("huge_header.blm"));
}

#[test]
#[cfg(target_os = "linux")]
fn test_export_write_failure() {
    let (filter, _) = filled_filter(1);
    let err = filter.export("/dev/full").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_import_oversized_file() {
    let (_dir, path) = filter_path("oversized.blm");
    let (filter, _) = filled_filter(50);
    let mut bytes = filter.serialize();
    bytes.extend_from_slice(&[0; 3]);
    fs::write(&path, &bytes).unwrap();

    let err = BloomFilter::import(&path, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[test]
fn test_import_corrupt_header() {
    let (_dir, path) = filter_path("corrupt.blm");
    let (filter, _) = filled_filter(5);
    let mut bytes = filter.serialize();
    bytes[16..20].copy_from_slice(&0.0f32.to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    let err = BloomFilter::import(&path, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[test]
fn test_stream_holds_consecutive_filters() {
    let mut first = BloomFilter::new(10, 0.1).unwrap();
    first.insert("one");
    let mut second = BloomFilter::new(20, 0.2).unwrap();
    second.insert("two");

    let mut stream = Vec::new();
    first.write_to(&mut stream).unwrap();
    second.write_to(&mut stream).unwrap();

    let mut reader = &stream[..];
    let first_back = BloomFilter::read_from(&mut reader, None).unwrap();
    let second_back = BloomFilter::read_from(&mut reader, None).unwrap();
    assert!(reader.is_empty());

    assert!(first_back.contains("one"));
    assert_eq!(first_back.estimated_elements(), 10);
    assert!(second_back.contains("two"));
    assert_eq!(second_back.estimated_elements(), 20);
}
