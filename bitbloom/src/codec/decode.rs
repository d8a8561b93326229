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

use std::io;
use std::io::Read;

/// A wrapper around a reader that provides methods for reading the fields of a persisted
/// filter.
///
/// Works over files as well as plain byte slices, since `&[u8]` implements [`Read`].
pub struct FilterReader<R> {
    inner: R,
}

impl<R: Read> FilterReader<R> {
    /// Creates a new `FilterReader` from the given reader.
    pub fn new(inner: R) -> Self {
        FilterReader { inner }
    }

    /// Reads exactly `buf.len()` bytes into `buf`.
    ///
    /// A short source yields [`io::ErrorKind::UnexpectedEof`] rather than a partial fill.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf)
    }

    /// Reads exactly `len` bytes into a new buffer.
    ///
    /// The buffer grows with the data actually read, so a source shorter than `len` fails
    /// with [`io::ErrorKind::UnexpectedEof`] without first allocating `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.inner.by_ref().take(len as u64).read_to_end(&mut buf)?;
        if buf.len() != len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {len} bytes, got {}", buf.len()),
            ));
        }
        Ok(buf)
    }

    /// Reads a 64-bit unsigned integer in little-endian byte order.
    pub fn read_u64_le(&mut self) -> io::Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Reads a 32-bit floating-point number in little-endian byte order.
    pub fn read_f32_le(&mut self) -> io::Result<f32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::FilterReader;

    #[test]
    fn test_read_fields() {
        let bytes = [8, 7, 6, 5, 4, 3, 2, 1, 0x00, 0x00, 0x80, 0x3f];
        let mut reader = FilterReader::new(&bytes[..]);
        assert_eq!(reader.read_u64_le().unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(reader.read_f32_le().unwrap(), 1.0);
    }

    #[test]
    fn test_read_bytes() {
        let bytes = [1, 2, 3, 4, 5];
        let mut reader = FilterReader::new(&bytes[..]);
        assert_eq!(reader.read_bytes(3).unwrap(), vec![1, 2, 3]);
        assert_eq!(reader.read_bytes(2).unwrap(), vec![4, 5]);
        assert_eq!(reader.read_bytes(0).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_read_bytes_short_source_with_huge_length() {
        let bytes = [1, 2, 3];
        let mut reader = FilterReader::new(&bytes[..]);
        let err = reader.read_bytes(usize::MAX / 2).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_short_read_is_an_error() {
        let bytes = [1, 2, 3];
        let mut reader = FilterReader::new(&bytes[..]);
        let err = reader.read_u64_le().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
