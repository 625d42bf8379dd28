//! Resizable chained hash table mapping keys to occurrence counts.
//!
//! Both the token vocabulary and the per-round pair statistics live in a
//! [`FrequencyTable`]. Iteration walks buckets in index order, which is the
//! order the serializer writes entries in, so the default hasher is a fixed
//! polynomial hash rather than a randomly seeded one.

use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash, Hasher};

use crate::constants::{DEFAULT_LOAD_THRESHOLD, DEFAULT_TABLE_CAPACITY};

/// Polynomial hash: `h = h * 37 + byte` over every written byte.
///
/// Keys go through their `Hash` impl, so a `str` also feeds its `0xff`
/// terminator and a `Pair` feeds two terminated strings. Bucket order is
/// stable from run to run but is not the plain byte-sum order of a C-style
/// string hash.
#[derive(Clone, Copy, Debug, Default)]
pub struct PolynomialHasher {
    value: u64,
}

impl Hasher for PolynomialHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.value
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.value = self.value.wrapping_mul(37).wrapping_add(u64::from(b));
        }
    }
}

/// Builds [`PolynomialHasher`]s. Stateless, so tables hash identically across runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct PolynomialState;

impl BuildHasher for PolynomialState {
    type Hasher = PolynomialHasher;

    #[inline]
    fn build_hasher(&self) -> PolynomialHasher {
        PolynomialHasher::default()
    }
}

/// One key and its count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry<K> {
    pub key: K,
    pub count: u64,
}

/// Chained hash table from key to count with automatic doubling.
///
/// Before a new key is stored, the table doubles its bucket count if
/// `(len + 1) / capacity` would reach the load threshold. Keys are unique;
/// counts only change through [`insert_or_increment`](Self::insert_or_increment),
/// [`increment_by`](Self::increment_by) or an explicit [`set`](Self::set).
#[derive(Clone, Debug)]
pub struct FrequencyTable<K, S = PolynomialState> {
    buckets: Vec<Vec<Entry<K>>>,
    len: usize,
    load_threshold: f32,
    hasher: S,
}

fn empty_buckets<K>(capacity: usize) -> Vec<Vec<Entry<K>>> {
    (0..capacity).map(|_| Vec::new()).collect()
}

impl<K: Hash + Eq> FrequencyTable<K, PolynomialState> {
    /// Table with the default capacity and load threshold.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TABLE_CAPACITY)
    }

    /// Table with `capacity` buckets (0 selects the default) and the default threshold.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_threshold(capacity, DEFAULT_LOAD_THRESHOLD)
    }

    /// Table with an explicit load threshold.
    pub fn with_threshold(capacity: usize, load_threshold: f32) -> Self {
        Self::with_capacity_and_hasher(capacity, load_threshold, PolynomialState)
    }
}

impl<K: Hash + Eq> Default for FrequencyTable<K, PolynomialState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, S> FrequencyTable<K, S> {
    /// Number of distinct keys stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current number of buckets.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn load_threshold(&self) -> f32 {
        self.load_threshold
    }

    /// `len / capacity`
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    /// Entries in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> + '_ {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter().map(|e| (&e.key, e.count)))
    }

    /// Keys in bucket order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }
}

impl<K: Hash + Eq, S: BuildHasher> FrequencyTable<K, S> {
    /// Table using a caller-supplied hasher.
    ///
    /// A `capacity` of 0 selects [`DEFAULT_TABLE_CAPACITY`].
    pub fn with_capacity_and_hasher(capacity: usize, load_threshold: f32, hasher: S) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_TABLE_CAPACITY
        } else {
            capacity
        };
        Self {
            buckets: empty_buckets(capacity),
            len: 0,
            load_threshold,
            hasher,
        }
    }

    #[inline]
    fn slot<Q>(&self, key: &Q) -> usize
    where
        Q: Hash + ?Sized,
    {
        (self.hasher.hash_one(key) % self.buckets.len() as u64) as usize
    }

    /// Find the entry stored under `key`.
    pub fn search<Q>(&self, key: &Q) -> Option<&Entry<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.buckets[self.slot(key)]
            .iter()
            .find(|e| e.key.borrow() == key)
    }

    /// Count stored under `key`, if any.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.search(key).map(|e| e.count)
    }

    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.search(key).is_some()
    }

    /// Insert `key` with count 1, or add 1 to its count. Returns the new count.
    #[inline]
    pub fn insert_or_increment(&mut self, key: K) -> u64 {
        self.increment_by(key, 1)
    }

    /// Insert `key` with count `amount`, or add `amount` to its count.
    pub fn increment_by(&mut self, key: K, amount: u64) -> u64 {
        let slot = self.slot(&key);
        if let Some(entry) = self.buckets[slot].iter_mut().find(|e| e.key == key) {
            entry.count += amount;
            return entry.count;
        }
        self.insert_new(key, amount);
        amount
    }

    /// Store `count` under `key`, overwriting any previous count.
    ///
    /// Returns the previous count when the key already existed.
    pub fn set(&mut self, key: K, count: u64) -> Option<u64> {
        let slot = self.slot(&key);
        if let Some(entry) = self.buckets[slot].iter_mut().find(|e| e.key == key) {
            return Some(std::mem::replace(&mut entry.count, count));
        }
        self.insert_new(key, count);
        None
    }

    fn insert_new(&mut self, key: K, count: u64) {
        let projected = (self.len + 1) as f64 / self.buckets.len() as f64;
        if projected >= f64::from(self.load_threshold) {
            self.resize(self.buckets.len() * 2);
        }
        let slot = self.slot(&key);
        self.buckets[slot].push(Entry { key, count });
        self.len += 1;
    }

    /// Rehash every entry into `new_capacity` buckets. A capacity of 0 is ignored.
    pub fn resize(&mut self, new_capacity: usize) {
        if new_capacity == 0 {
            return;
        }
        let old = std::mem::replace(&mut self.buckets, empty_buckets(new_capacity));
        for entry in old.into_iter().flatten() {
            let slot = self.slot(&entry.key);
            self.buckets[slot].push(entry);
        }
    }

    /// Add every count from `other` into this table.
    pub fn merge_from<S2>(&mut self, other: FrequencyTable<K, S2>) {
        for entry in other {
            self.increment_by(entry.key, entry.count);
        }
    }
}

impl<K, S> IntoIterator for FrequencyTable<K, S> {
    type Item = Entry<K>;
    type IntoIter = std::iter::Flatten<std::vec::IntoIter<Vec<Entry<K>>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_iter().flatten()
    }
}

impl<K: Hash + Eq, S: BuildHasher> Extend<K> for FrequencyTable<K, S> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert_or_increment(key);
        }
    }
}

impl<K: Hash + Eq> FromIterator<K> for FrequencyTable<K, PolynomialState> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}
