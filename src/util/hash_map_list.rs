use std::{collections::HashMap, hash::Hash};

/// Simple wrapper to make functionality easier for interfacing with `HashMap<K, Vec<V>>`.
/// Handles the logic surrounding initialising a new [Vec] when a new value is inserted with a
/// unique key, so key collisions append instead of overwriting. Backs the per-instance event
/// subscriber tables.
pub struct HashMapList<K, V>(HashMap<K, Vec<V>>);

impl<K, V> HashMapList<K, V>
where
    K: Eq + PartialEq + Hash,
{
    /// Creates an empty [HashMapList].
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Retrieves the list of values for a key. Will return [None] if nothing was inserted
    /// under the key.
    pub fn get(&self, k: &K) -> Option<&[V]> {
        self.0.get(k).map(|values| values.as_slice())
    }

    /// Inserts a value with a given key into the collection. If there is no existing [Vec]
    /// for the key, an empty one will be initialised before the value is inserted.
    pub fn insert(&mut self, k: K, v: V) {
        self.0.entry(k).or_default().push(v);
    }
}
