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

use bitbloom::bloom::BloomFilter;

fn main() {
    // Size for 10,000 items at a 1% false positive rate
    let mut filter = BloomFilter::new(10_000, 0.01).expect("valid filter parameters");

    println!("Created filter with capacity 10,000 and target rate 1%");
    println!("{}", filter.stats());

    println!("\nAdding 10,000 words...");
    for i in 0..10_000 {
        filter.insert(format!("word-{i}"));
    }
    println!("{}", filter.stats());

    let false_positives = (0..10_000)
        .filter(|i| filter.contains(format!("other-{i}")))
        .count();
    println!(
        "\nObserved false positive rate: {:.4}%",
        false_positives as f64 / 100.0
    );

    let path = std::env::temp_dir().join("bloom_usage.blm");
    filter.export(&path).expect("export filter");
    let restored = BloomFilter::import(&path, None).expect("import filter");
    println!(
        "\nRestored from {}: word-42 present = {}",
        path.display(),
        restored.contains("word-42")
    );
    std::fs::remove_file(&path).ok();
}
