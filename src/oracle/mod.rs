//!
//! Lazily computed, memoized properties of a chunk.
//!
//! A [`MetaOracle`] takes a snapshot of a chunk's body when it is created and
//! computes each [`Field`] at most once. The snapshot is a cheap reference
//! counted clone of the body, so later body replacements on the chunk are not
//! observed by the oracle; create a new oracle after transforming a chunk.
//!

mod ext;

pub use ext::{UNKNOWN_EXTENSION, guess_extension};

use crate::chunk::{Chunk, Value};
use crate::error::{Error, Result};
use bytes::Bytes;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The derived properties an oracle can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Size,
    Index,
    Ext,
    Entropy,
    Crc32,
    Sha1,
    Sha256,
    Md5,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Size,
        Field::Index,
        Field::Ext,
        Field::Entropy,
        Field::Crc32,
        Field::Sha1,
        Field::Sha256,
        Field::Md5,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Size => "size",
            Field::Index => "index",
            Field::Ext => "ext",
            Field::Entropy => "entropy",
            Field::Crc32 => "crc32",
            Field::Sha1 => "sha1",
            Field::Sha256 => "sha256",
            Field::Md5 => "md5",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| Error::UnknownField(s.to_owned()))
    }
}

/// Creates an oracle bound to the current body of `chunk`.
pub fn oracle(chunk: &Chunk) -> MetaOracle {
    MetaOracle::new(chunk)
}

/// A per-chunk cache of derived metadata.
#[derive(Debug, Clone)]
pub struct MetaOracle {
    body: Bytes,
    index: usize,
    cache: HashMap<Field, Value>,
    computations: usize,
}

impl MetaOracle {
    pub fn new(chunk: &Chunk) -> Self {
        Self::with_index(chunk.body.clone(), chunk.index)
    }

    /// Creates an oracle over `body` for a chunk at position `index` within its frame.
    pub fn with_index(body: Bytes, index: usize) -> Self {
        Self {
            body,
            index,
            cache: HashMap::new(),
            computations: 0,
        }
    }

    ///
    /// Returns the value of the field named `name`.
    ///
    /// ## Errors
    ///
    /// Returns `Error::UnknownField` if `name` is not one of the field names
    /// listed in [`Field`].
    ///
    pub fn get(&mut self, name: &str) -> Result<Value> {
        let field: Field = name.parse()?;
        Ok(self.get_or_compute(field).clone())
    }

    /// Returns the cached value for `field`, computing it on first access.
    pub fn get_or_compute(&mut self, field: Field) -> &Value {
        if !self.cache.contains_key(&field) {
            let value = self.compute(field);
            self.computations += 1;
            self.cache.insert(field, value);
        }
        &self.cache[&field]
    }

    /// Number of field computations performed so far. Cache hits are not counted.
    pub fn computations(&self) -> usize {
        self.computations
    }

    /// Computes `field` if necessary and stores it as a meta variable on `chunk`.
    pub fn populate(&mut self, chunk: &mut Chunk, field: Field) -> Value {
        let value = self.get_or_compute(field).clone();
        chunk.set_meta(field.as_str(), value.clone());
        value
    }

    fn compute(&mut self, field: Field) -> Value {
        match field {
            Field::Size => Value::from(self.body.len()),
            Field::Index => Value::from(self.index),
            Field::Ext => {
                let size = self
                    .get_or_compute(Field::Size)
                    .as_int()
                    .unwrap_or_default() as usize;
                Value::from(guess_extension(&self.body, size))
            }
            Field::Entropy => Value::Float(entropy(&self.body)),
            Field::Crc32 => Value::Str(format!("{:08x}", crc32fast::hash(&self.body))),
            Field::Sha1 => Value::Str(hex::encode(Sha1::digest(&self.body))),
            Field::Sha256 => Value::Str(hex::encode(Sha256::digest(&self.body))),
            Field::Md5 => Value::Str(hex::encode(Md5::digest(&self.body))),
        }
    }
}

/// Shannon entropy of the byte distribution of `data`, in bits per byte.
pub fn entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut histogram = [0u64; 256];
    for &b in data {
        histogram[b as usize] += 1;
    }

    let total = data.len() as f64;
    histogram
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
#[path = "tests/oracle_tests.rs"]
mod tests;
