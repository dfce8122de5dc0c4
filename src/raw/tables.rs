//! Dictionary state.
//!
//! The encoder keeps one of two table shapes depending on the level, and
//! the decoder for levels 1 and 2 mirrors the encoder's table (minus the
//! fetch cache) so that match tokens, which carry only a hash and a slot
//! number, resolve to the same offsets on both sides. Level 3 writes its
//! offsets into the tokens themselves, so its decoder needs no table.

use super::{Level, Params};

/// Level-1 encoder dictionary: a single slot per hash value holding the
/// most recent fetch seen there and the position it was read at.
pub struct CacheTable {
    cache: Vec<u32>,
    offsets: Vec<i64>,
}

impl CacheTable {
    fn new(hash_values: usize) -> CacheTable {
        CacheTable {
            cache: vec![0; hash_values],
            offsets: vec![0; hash_values],
        }
    }

    /// Replace the slot with the current fetch and position, returning what
    /// was there before.
    pub(crate) fn swap(&mut self, hash: u32, fetch: u32, position: i64) -> (u32, i64) {
        let slot = hash as usize;
        let previous = (self.cache[slot], self.offsets[slot]);
        self.cache[slot] = fetch;
        self.offsets[slot] = position;
        previous
    }

    pub(crate) fn store(&mut self, hash: u32, fetch: u32, position: i64) {
        let slot = hash as usize;
        self.cache[slot] = fetch;
        self.offsets[slot] = position;
    }

    /// Restore every offset to the empty sentinel. The caches are left
    /// stale; a stale cache can never validate against the sentinel offset.
    fn reset(&mut self, offset_base: i64) {
        for offset in &mut self.offsets {
            *offset = offset_base;
        }
    }
}

/// Level-2/3 encoder dictionary: `pointers` offsets per hash value plus a
/// wrapping insertion counter whose low bits pick the slot to overwrite.
///
/// The counter doubles as a fill indicator: a probe may only trust slots
/// below it. The wrap at 256 insertions is format-visible behavior and is
/// kept as is.
pub struct BucketTable {
    offsets: Vec<i64>,
    counters: Vec<u8>,
    pointers: usize,
}

impl BucketTable {
    fn new(hash_values: usize, pointers: usize) -> BucketTable {
        BucketTable {
            offsets: vec![0; hash_values * pointers],
            counters: vec![0; hash_values],
            pointers,
        }
    }

    pub(crate) fn counter(&self, hash: u32) -> u8 {
        self.counters[hash as usize]
    }

    pub(crate) fn slot(&self, hash: u32, k: usize) -> i64 {
        self.offsets[hash as usize * self.pointers + k]
    }

    pub(crate) fn insert(&mut self, hash: u32, position: i64) {
        let counter = self.counters[hash as usize];
        let slot = counter as usize & (self.pointers - 1);
        self.offsets[hash as usize * self.pointers + slot] = position;
        self.counters[hash as usize] = counter.wrapping_add(1);
    }

    /// Only the counters are cleared; slot contents go stale and are
    /// shielded by the counter until overwritten.
    fn reset(&mut self) {
        for counter in &mut self.counters {
            *counter = 0;
        }
    }
}

/// The encoder dictionary for a given configuration.
pub enum EncoderTable {
    Cache(CacheTable),
    Buckets(BucketTable),
}

impl EncoderTable {
    pub fn new(params: &Params) -> EncoderTable {
        match params.level {
            Level::One => EncoderTable::Cache(CacheTable::new(params.level.hash_values())),
            level => EncoderTable::Buckets(BucketTable::new(level.hash_values(), level.pointers())),
        }
    }

    pub fn reset(&mut self, params: &Params) {
        match self {
            EncoderTable::Cache(table) => table.reset(params.offset_base),
            EncoderTable::Buckets(table) => table.reset(),
        }
    }
}

/// The decoder's mirror of the encoder dictionary, rebuilt from the
/// reconstructed output as it is produced. Levels 1 and 2 only.
pub struct DecoderTable {
    level: Level,
    pointers: usize,
    offsets: Vec<i64>,
    counters: Vec<u8>,
}

impl DecoderTable {
    /// Returns `None` for level 3, which resolves offsets from the tokens
    /// alone.
    pub fn new(params: &Params) -> Option<DecoderTable> {
        match params.level {
            Level::Three => None,
            level => Some(DecoderTable {
                level,
                pointers: level.pointers(),
                offsets: vec![0; level.hash_values() * level.pointers()],
                counters: vec![0; level.hash_values()],
            }),
        }
    }

    pub(crate) fn offset(&self, hash: u32, k: usize) -> i64 {
        self.offsets[hash as usize * self.pointers + k]
    }

    fn update(&mut self, buffer: &[u8], position: i64) {
        let hash = self.level.hash_at(buffer, position) as usize;
        match self.level {
            Level::One => {
                self.offsets[hash] = position;
                self.counters[hash] = 1;
            }
            _ => {
                let counter = self.counters[hash];
                let slot = counter as usize & (self.pointers - 1);
                self.offsets[hash * self.pointers + slot] = position;
                self.counters[hash] = counter.wrapping_add(1);
            }
        }
    }

    /// Catch the table up by hashing every position after `last_hashed` up
    /// to and including `max`.
    pub(crate) fn update_upto(&mut self, buffer: &[u8], last_hashed: &mut i64, max: i64) {
        while *last_hashed < max {
            *last_hashed += 1;
            self.update(buffer, *last_hashed);
        }
    }

    /// Mirror of the encoder-side reset: only level 2 has counters to
    /// clear, and stale offsets are shielded the same way on both sides.
    pub fn reset(&mut self) {
        if self.level == Level::Two {
            for counter in &mut self.counters {
                *counter = 0;
            }
        }
    }
}
