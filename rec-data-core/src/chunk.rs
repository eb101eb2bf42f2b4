//! Append-only storage made of fixed-capacity chunks
//!
//! Values are addressed by logical position: position `p` lives in chunk
//! `p / chunk_size` at offset `p % chunk_size`. Chunks are allocated with
//! their full capacity up front and never grow, so appending never moves
//! previously stored values and a growth step costs at most one chunk.

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of values per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Options for chunked column storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnOptions {
    /// Number of values per chunk
    pub chunk_size: usize,
}

impl Default for ColumnOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// An arena of fixed-capacity chunks holding `Copy` values
#[derive(Debug, Clone)]
pub struct ChunkedArray<T> {
    /// Allocated chunks; every chunk but the last is full
    chunks: Vec<Vec<T>>,

    /// Capacity of each chunk
    chunk_size: usize,

    /// Number of values stored
    len: usize,
}

impl<T: Copy> ChunkedArray<T> {
    /// Create an empty array with the given chunk capacity
    pub fn new(options: ColumnOptions) -> Result<Self> {
        if options.chunk_size == 0 {
            return Err(Error::invalid("Chunk size must be greater than 0"));
        }

        Ok(Self {
            chunks: Vec::new(),
            chunk_size: options.chunk_size,
            len: 0,
        })
    }

    /// Append a value at the next position
    pub fn push(&mut self, value: T) {
        if self.len % self.chunk_size == 0 {
            self.chunks.push(Vec::with_capacity(self.chunk_size));
        }
        let last = self.chunks.len() - 1;
        self.chunks[last].push(value);
        self.len += 1;
    }

    /// Value at `position`, if in range
    #[inline]
    pub fn get(&self, position: usize) -> Option<T> {
        if position >= self.len {
            return None;
        }
        Some(self.chunks[position / self.chunk_size][position % self.chunk_size])
    }

    /// Number of values stored
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the array is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Capacity of each chunk
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of allocated chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Iterate over all values in insertion order
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            chunks: self.chunks.iter(),
            current: <&[T]>::default().iter(),
            remaining: self.len,
        }
    }
}

impl<'a, T: Copy> IntoIterator for &'a ChunkedArray<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward-only iterator over a [`ChunkedArray`]
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    chunks: std::slice::Iter<'a, Vec<T>>,
    current: std::slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T: Copy> Iterator for Iter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(value) = self.current.next() {
                self.remaining -= 1;
                return Some(*value);
            }
            self.current = self.chunks.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: Copy> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T: Copy> FusedIterator for Iter<'a, T> {}
