//! Generic open-chained hash table with prime-sized, doubling rehash.
//!
//! Grounded in `examples/original_source/src/hashtable.c`: the delta table,
//! the 0.75 default load factor, and the rehash-on-insert trigger are all
//! carried over unchanged. Two things are *not* carried over, both
//! deliberately:
//!
//! - The original allocates each entry twice (`p = malloc(...)`, then
//!   `ht->table[k] = malloc(...); *ht->table[k] = *p; free(p);`) for no
//!   reason visible in the source; storing `(K, V)` pairs directly in a
//!   `Vec`-backed bucket needs exactly one allocation per entry.
//! - The hash function is a parameter to `ht_init` in C; here it is fixed
//!   to `CyclicHasher`, a `std::hash::Hasher` that reproduces the
//!   original's `hash = (hash << 5) | (hash >> 27); hash += byte` string
//!   hash, so every key type that derives `Hash` gets that behavior for
//!   free through `std::hash::Hash::hash`.

use std::hash::{BuildHasherDefault, Hash, Hasher};

/// Differences between a power of two and the largest prime below it,
/// indexed the same way as the original `delta[]` table.
const DELTA: [u32; 32] = [
    0, 0, 1, 1, 3, 1, 3, 1, 5, 3, 3, 9, 3, 1, 3, 19, 15, 1, 5, 1, 3, 9, 3, 15, 3, 39, 5, 39, 57, 3,
    35, 1,
];

const INITIAL_DELTA_INDEX: usize = 4;
const DEFAULT_MAX_LOADFACTOR: f32 = 0.75;

fn prime_size(idx: usize) -> u32 {
    (1u32 << idx) - DELTA[idx]
}

/// Reproduces the scanner/symbol-table's cyclic-shift byte hash:
/// `hash = (hash << 5) | (hash >> 27); hash += byte` for every input byte.
#[derive(Default)]
pub struct CyclicHasher(u32);

impl Hasher for CyclicHasher {
    fn finish(&self) -> u64 {
        self.0 as u64
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = (self.0 << 5) | (self.0 >> 27);
            self.0 = self.0.wrapping_add(b as u32);
        }
    }
}

pub type CyclicBuildHasher = BuildHasherDefault<CyclicHasher>;

/// An open-chained hash table keyed on any `Hash + Eq` type.
///
/// Uses [`CyclicHasher`] by default (matching the original's string hash);
/// construct with [`HashTable::with_hasher`] when a key type benefits from
/// a different distribution (e.g. `DefaultHasher` for composite keys).
pub struct HashTable<K, V, S = CyclicBuildHasher> {
    buckets: Vec<Vec<(K, V)>>,
    num_entries: usize,
    idx: usize,
    max_loadfactor: f32,
    hasher_builder: S,
}

impl<K: Hash + Eq, V> HashTable<K, V, CyclicBuildHasher> {
    pub fn new() -> Self {
        Self::with_hasher(CyclicBuildHasher::default())
    }
}

impl<K: Hash + Eq, V> Default for HashTable<K, V, CyclicBuildHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V, S: std::hash::BuildHasher> HashTable<K, V, S> {
    pub fn with_hasher(hasher_builder: S) -> Self {
        let size = prime_size(INITIAL_DELTA_INDEX) as usize;
        HashTable {
            buckets: (0..size).map(|_| Vec::new()).collect(),
            num_entries: 0,
            idx: INITIAL_DELTA_INDEX,
            max_loadfactor: DEFAULT_MAX_LOADFACTOR,
            hasher_builder,
        }
    }

    pub fn len(&self) -> usize {
        self.num_entries
    }

    pub fn is_empty(&self) -> bool {
        self.num_entries == 0
    }

    fn bucket_index(&self, key: &K, size: usize) -> usize {
        let mut hasher = self.hasher_builder.build_hasher();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % size
    }

    /// Inserts `key`/`value`. Returns the previous value if `key` was
    /// already present, leaving the table unchanged (mirrors
    /// `HASH_TABLE_KEY_VALUE_PAIR_EXISTS`: a duplicate insert is a no-op,
    /// not a silent overwrite).
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let size = self.buckets.len();
        let idx = self.bucket_index(&key, size);
        if let Some(existing) = self.buckets[idx].iter_mut().find(|(k, _)| *k == key) {
            let _ = existing;
            return Some(value);
        }

        self.num_entries += 1;
        if self.num_entries as f32 >= self.max_loadfactor * size as f32 {
            self.rehash();
        }
        let size = self.buckets.len();
        let idx = self.bucket_index(&key, size);
        self.buckets[idx].push((key, value));
        None
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let size = self.buckets.len();
        let idx = self.bucket_index(key, size);
        self.buckets[idx].iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let size = self.buckets.len();
        let idx = self.bucket_index(key, size);
        let bucket = &mut self.buckets[idx];
        let pos = bucket.iter().position(|(k, _)| k == key)?;
        self.num_entries -= 1;
        Some(bucket.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets.iter().flat_map(|b| b.iter().map(|(k, v)| (k, v)))
    }

    fn rehash(&mut self) {
        let new_size = self.next_size();
        let mut new_buckets: Vec<Vec<(K, V)>> = (0..new_size).map(|_| Vec::new()).collect();
        for (k, v) in self.buckets.drain(..).flatten() {
            let idx = {
                let mut hasher = self.hasher_builder.build_hasher();
                k.hash(&mut hasher);
                (hasher.finish() as usize) % new_size
            };
            new_buckets[idx].push((k, v));
        }
        self.idx += 1;
        self.buckets = new_buckets;
    }

    fn next_size(&self) -> usize {
        let i = self.buckets.len() as u32 + DELTA[self.idx];
        (i * 2 - DELTA[self.idx + 1]) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get_round_trip() {
        let mut ht: HashTable<String, i32> = HashTable::new();
        ht.insert("a".to_string(), 1);
        ht.insert("b".to_string(), 2);
        assert_eq!(ht.get(&"a".to_string()), Some(&1));
        assert_eq!(ht.get(&"b".to_string()), Some(&2));
        assert_eq!(ht.get(&"c".to_string()), None);
    }

    #[test]
    fn duplicate_insert_is_a_no_op() {
        let mut ht: HashTable<String, i32> = HashTable::new();
        assert_eq!(ht.insert("a".to_string(), 1), None);
        assert_eq!(ht.insert("a".to_string(), 2), Some(2));
        assert_eq!(ht.get(&"a".to_string()), Some(&1));
        assert_eq!(ht.len(), 1);
    }

    #[test]
    fn survives_rehash_across_many_entries() {
        let mut ht: HashTable<String, i32> = HashTable::new();
        for i in 0..500 {
            ht.insert(format!("key{i}"), i);
        }
        assert_eq!(ht.len(), 500);
        for i in 0..500 {
            assert_eq!(ht.get(&format!("key{i}")), Some(&i));
        }
    }

    #[test]
    fn remove_drops_entry() {
        let mut ht: HashTable<String, i32> = HashTable::new();
        ht.insert("a".to_string(), 1);
        assert_eq!(ht.remove(&"a".to_string()), Some(1));
        assert_eq!(ht.get(&"a".to_string()), None);
        assert!(ht.is_empty());
    }

    #[test]
    fn cyclic_hasher_is_deterministic() {
        let mut h1 = CyclicHasher::default();
        let mut h2 = CyclicHasher::default();
        h1.write(b"hello");
        h2.write(b"hello");
        assert_eq!(h1.finish(), h2.finish());
    }

}
