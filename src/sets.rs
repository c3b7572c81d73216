//! ID-indexed entity containers

use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::elements::{Element, Material, Node, Property};
use crate::error::{KernelError, KernelResult};

/// Entity identifier, unique within one set
pub type Id = usize;

/// Anything stored in an [`EntitySet`]
pub trait Entity {
    /// Human-readable entity kind, used in error messages
    const KIND: &'static str;

    fn id(&self) -> Id;
}

/// Insertion-ordered set of entities with unique IDs
#[derive(Debug, Clone)]
pub struct EntitySet<T> {
    items: Vec<T>,
    index: HashMap<Id, usize>,
}

pub type NodeSet = EntitySet<Node>;
pub type ElementSet = EntitySet<Element>;
pub type MaterialSet = EntitySet<Material>;
pub type PropertySet = EntitySet<Property>;

impl<T> Default for EntitySet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Entity> EntitySet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Build a set, failing on the first duplicate ID
    pub fn from_entities<I>(entities: I) -> KernelResult<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut set = Self::new();
        for entity in entities {
            set.add(entity)?;
        }
        Ok(set)
    }

    /// Append an entity, returning its ordinal index
    pub fn add(&mut self, entity: T) -> KernelResult<usize> {
        let id = entity.id();
        if self.index.contains_key(&id) {
            return Err(KernelError::DuplicateId { kind: T::KIND, id });
        }
        let ordinal = self.items.len();
        self.items.push(entity);
        self.index.insert(id, ordinal);
        Ok(ordinal)
    }

    pub fn get(&self, id: Id) -> Option<&T> {
        self.index.get(&id).map(|&i| &self.items[i])
    }

    /// Ordinal index of `id`
    pub fn index_of(&self, id: Id) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Entity at an ordinal index (insertion order)
    pub fn get_by_index(&self, ordinal: usize) -> Option<&T> {
        self.items.get(ordinal)
    }

    /// Look up several IDs at once, keeping the requested order
    pub fn get_many(&self, ids: &[Id]) -> Vec<Option<&T>> {
        ids.iter().map(|&id| self.get(id)).collect()
    }

    /// Entities whose ID falls in `range`, in insertion order
    pub fn get_range(&self, range: RangeInclusive<Id>) -> impl Iterator<Item = &T> + '_ {
        self.items.iter().filter(move |e| range.contains(&e.id()))
    }

    pub fn contains(&self, id: Id) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// IDs in insertion order
    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.items.iter().map(|e| e.id())
    }
}

impl<'a, T> IntoIterator for &'a EntitySet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag(Id);

    impl Entity for Tag {
        const KIND: &'static str = "tag";

        fn id(&self) -> Id {
            self.0
        }
    }

    fn sample() -> EntitySet<Tag> {
        EntitySet::from_entities([Tag(30), Tag(10), Tag(20)]).unwrap()
    }

    #[test]
    fn test_insertion_order() {
        let set = sample();
        assert_eq!(set.ids().collect::<Vec<_>>(), vec![30, 10, 20]);
        assert_eq!(set.get_by_index(0), Some(&Tag(30)));
        assert_eq!(set.index_of(20), Some(2));
    }

    #[test]
    fn test_missing_id_is_none() {
        let set = sample();
        assert!(set.get(99).is_none());
        assert!(set.get_by_index(3).is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut set = sample();
        let err = set.add(Tag(10)).unwrap_err();
        assert!(matches!(err, KernelError::DuplicateId { kind: "tag", id: 10 }));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_get_many_keeps_request_order() {
        let set = sample();
        let got = set.get_many(&[20, 99, 30]);
        assert_eq!(got, vec![Some(&Tag(20)), None, Some(&Tag(30))]);
    }

    #[test]
    fn test_range_lookup() {
        let set = sample();
        let ids: Vec<Id> = set.get_range(15..=30).map(|t| t.0).collect();
        assert_eq!(ids, vec![30, 20]);
    }
}
