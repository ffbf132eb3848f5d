//! Partitioned aggregation table.
//!
//! A fixed number of slots, each holding a chain of buckets. The slot of a
//! key is the sum of its bytes modulo [`TABLE_LEN`]. New buckets go to the
//! head of their chain, so a chain iterates most-recently-inserted first.
//! Keys are unique within a table.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::debug;

use crate::codec::{RecordReader, RecordWriter};
use crate::error::{Error, Result};

/// Slot count shared by every worker binary.
pub const TABLE_LEN: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub key: String,
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct Table {
    // Each chain is stored oldest first; iteration walks it in reverse.
    slots: Vec<Vec<Bucket>>,
    len: usize,
}

pub fn hash_key(key: &str) -> usize {
    key.bytes().map(usize::from).sum::<usize>() % TABLE_LEN
}

impl Table {
    pub fn create() -> Result<Self> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(TABLE_LEN)
            .map_err(|_| Error::ResourceExhausted)?;
        slots.resize_with(TABLE_LEN, Vec::new);
        Ok(Self { slots, len: 0 })
    }

    pub fn lookup(&self, key: &str) -> Option<&Bucket> {
        self.slots[hash_key(key)].iter().find(|b| b.key == key)
    }

    fn lookup_mut(&mut self, key: &str) -> Option<&mut Bucket> {
        self.slots[hash_key(key)].iter_mut().find(|b| b.key == key)
    }

    /// Counts one more sighting of `key`.
    pub fn upsert(&mut self, key: &str) -> Result<()> {
        self.merge_count(key, 1)
    }

    /// Adds `amount` to the count of `key`, inserting it if absent.
    pub fn merge_count(&mut self, key: &str, amount: u64) -> Result<()> {
        if let Some(bucket) = self.lookup_mut(key) {
            bucket.count = bucket
                .count
                .checked_add(amount)
                .ok_or_else(|| Error::CountOverflow {
                    key: key.to_string(),
                })?;
            return Ok(());
        }
        let chain = &mut self.slots[hash_key(key)];
        chain.try_reserve(1).map_err(|_| Error::ResourceExhausted)?;
        chain.push(Bucket {
            key: key.to_string(),
            count: amount,
        });
        self.len += 1;
        Ok(())
    }

    /// Folds every bucket of `other` into this table.
    pub fn merge(&mut self, other: &Table) -> Result<()> {
        for bucket in other.iter() {
            self.merge_count(&bucket.key, bucket.count)?;
        }
        Ok(())
    }

    /// Buckets in slot-ascending, chain order.
    pub fn iter(&self) -> impl Iterator<Item = &Bucket> + '_ {
        self.slots.iter().flat_map(|chain| chain.iter().rev())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_count(&self) -> u64 {
        self.iter().map(|b| b.count).sum()
    }

    /// Writes every bucket to `path`, creating or truncating it.
    pub fn serialize(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = RecordWriter::new(BufWriter::new(file), path);
        for bucket in self.iter() {
            writer.write_record(&bucket.key, bucket.count)?;
        }
        writer.finish()?;
        debug!(path = %path.display(), buckets = self.len, "table written");
        Ok(())
    }

    /// Rebuilds a table from an artifact. Slot placement is recomputed from
    /// each key; repeated keys in the stream are summed.
    pub fn deserialize(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let mut table = Self::create()?;
        for record in RecordReader::new(BufReader::new(file), path) {
            let (key, count) = record?;
            table.merge_count(&key, count)?;
        }
        debug!(path = %path.display(), buckets = table.len, "table read");
        Ok(table)
    }
}
