use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::key::name::{KeyName, Namespace};
use crate::key::Key;

/// Ordered set of keys with unique names.
///
/// Iteration follows [`KeyName`] ordering. Cloning yields an independent copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    keys: BTreeMap<KeyName, Key>,
}

impl KeySet {
    pub fn new() -> Self {
        Self { keys: BTreeMap::new() }
    }

    /// Inserts a key, returning the key it replaced (same name), if any.
    pub fn append(&mut self, key: Key) -> Option<Key> {
        self.keys.insert(key.name().clone(), key)
    }

    /// Copies every key of `other` into this set, replacing same-named keys.
    pub fn append_all(&mut self, other: &KeySet) {
        for key in other.iter() {
            self.append(key.clone());
        }
    }

    pub fn lookup(&self, name: &KeyName) -> Option<&Key> {
        self.keys.get(name)
    }

    pub fn lookup_mut(&mut self, name: &KeyName) -> Option<&mut Key> {
        self.keys.get_mut(name)
    }

    /// Exact lookup by textual name; an unparsable name finds nothing.
    pub fn lookup_name(&self, name: &str) -> Option<&Key> {
        KeyName::new(name).ok().and_then(|n| self.lookup(&n))
    }

    /// Looks a name up across namespaces.
    ///
    /// A cascading name (`/a/b`) is tried in [`Namespace::CASCADE_ORDER`] and the
    /// first hit wins; any other name is looked up exactly.
    pub fn lookup_cascading(&self, name: &KeyName) -> Option<&Key> {
        if name.namespace() != Namespace::Cascading {
            return self.lookup(name);
        }
        Namespace::CASCADE_ORDER
            .iter()
            .find_map(|ns| self.lookup(&name.with_namespace(*ns)))
            .or_else(|| self.lookup(name))
    }

    pub fn contains(&self, name: &KeyName) -> bool {
        self.keys.contains_key(name)
    }

    pub fn remove(&mut self, name: &KeyName) -> Option<Key> {
        self.keys.remove(name)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.keys.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Key> {
        self.keys.values_mut()
    }

    /// Keys at or below `parent`, in order.
    pub fn below<'a>(&'a self, parent: &'a KeyName) -> impl Iterator<Item = &'a Key> + 'a {
        self.keys
            .range(parent.clone()..)
            .take_while(move |(name, _)| name.is_below_or_same(parent))
            .map(|(_, key)| key)
    }

    /// Mutable access to the keys at or below `parent`.
    pub fn below_mut<'a>(&'a mut self, parent: &'a KeyName) -> impl Iterator<Item = &'a mut Key> + 'a {
        self.keys
            .range_mut(parent.clone()..)
            .take_while(move |(name, _)| name.is_below_or_same(parent))
            .map(|(_, key)| key)
    }

    /// Moves the keys at or below `parent` into a new set.
    pub fn cut(&mut self, parent: &KeyName) -> KeySet {
        let names: Vec<KeyName> = self.below(parent).map(|k| k.name().clone()).collect();
        names
            .iter()
            .filter_map(|name| self.keys.remove(name))
            .collect()
    }
}

impl FromIterator<Key> for KeySet {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        let mut ks = KeySet::new();
        for key in iter {
            ks.append(key);
        }
        ks
    }
}

impl Extend<Key> for KeySet {
    fn extend<I: IntoIterator<Item = Key>>(&mut self, iter: I) {
        for key in iter {
            self.append(key);
        }
    }
}

impl IntoIterator for KeySet {
    type Item = Key;
    type IntoIter = btree_map::IntoValues<KeyName, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_values()
    }
}
