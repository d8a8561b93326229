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

//! # bitbloom
//!
//! A Bloom filter sized from a target capacity and false positive rate, with a pluggable
//! hash strategy and a compact file format for saving and restoring filters.
//!
//! ```rust
//! use bitbloom::bloom::BloomFilter;
//!
//! let mut filter = BloomFilter::new(100, 0.05).unwrap();
//! for word in ["alpha", "beta", "gamma"] {
//!     filter.insert(word);
//! }
//! assert!(filter.contains("beta"));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod bloom;
pub mod error;
pub mod hash;

mod codec;
