//! Ordered Arena
//!
//! Row storage shared by the subtitle and style collections: slots addressed
//! by stable ids plus a separate display order. Every record carries its
//! 1-based sequence number, which always equals its position in the order.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use crate::core::{CoreError, CoreResult, StyleId, SubtitleId};

/// Id type usable as an arena handle
pub trait ArenaId: Copy + Eq + Hash + Ord + Debug {
    fn from_index(index: usize) -> Self;
    fn index(&self) -> usize;
    /// Error reported when this id does not resolve to a live record
    fn invalid(self) -> CoreError;
}

impl ArenaId for SubtitleId {
    fn from_index(index: usize) -> Self {
        SubtitleId(index)
    }

    fn index(&self) -> usize {
        self.0
    }

    fn invalid(self) -> CoreError {
        CoreError::InvalidHandle(self)
    }
}

impl ArenaId for StyleId {
    fn from_index(index: usize) -> Self {
        StyleId(index)
    }

    fn index(&self) -> usize {
        self.0
    }

    fn invalid(self) -> CoreError {
        CoreError::InvalidStyleHandle(self)
    }
}

/// Record carrying its own 1-based sequence number
pub trait Numbered {
    fn num(&self) -> usize;
    fn set_num(&mut self, num: usize);
}

/// A record taken out of the arena together with where it lived
#[derive(Clone, Debug, PartialEq)]
pub struct Removed<I, T> {
    pub position: usize,
    pub id: I,
    pub value: T,
}

/// Slot storage with an explicit order
#[derive(Clone, Debug)]
pub struct OrderedArena<I, T> {
    slots: Vec<Option<T>>,
    order: Vec<I>,
}

impl<I: ArenaId, T: Numbered> Default for OrderedArena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T: Numbered> OrderedArena<I, T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Reserves a fresh, still vacant slot
    pub fn allocate(&mut self) -> I {
        self.slots.push(None);
        I::from_index(self.slots.len() - 1)
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn try_get(&self, id: I) -> CoreResult<&T> {
        self.get(id).ok_or_else(|| id.invalid())
    }

    pub fn try_get_mut(&mut self, id: I) -> CoreResult<&mut T> {
        self.get_mut(id).ok_or_else(|| id.invalid())
    }

    /// 0-based position of `id` in the order
    pub fn position(&self, id: I) -> CoreResult<usize> {
        self.try_get(id).map(|record| record.num() - 1)
    }

    pub fn id_at(&self, position: usize) -> Option<I> {
        self.order.get(position).copied()
    }

    pub fn ids(&self) -> &[I] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.get(*id).map(|record| (*id, record)))
    }

    /// Puts records back into vacant slots.
    ///
    /// Entries are applied in ascending position order, so every position is
    /// interpreted against the order as it stands once the earlier entries
    /// are in place.
    pub fn insert_many(&mut self, mut entries: Vec<Removed<I, T>>) -> CoreResult<Vec<usize>> {
        entries.sort_by_key(|entry| entry.position);

        let mut seen = HashSet::with_capacity(entries.len());
        for (offset, entry) in entries.iter().enumerate() {
            let vacant = matches!(self.slots.get(entry.id.index()), Some(None));
            if !vacant || !seen.insert(entry.id) {
                return Err(entry.id.invalid());
            }
            let size = self.order.len() + offset;
            if entry.position > size {
                return Err(CoreError::PositionOutOfRange {
                    position: entry.position,
                    size,
                });
            }
        }

        let Some(first) = entries.first().map(|entry| entry.position) else {
            return Ok(Vec::new());
        };

        let mut positions = Vec::with_capacity(entries.len());
        for entry in entries {
            self.order.insert(entry.position, entry.id);
            self.slots[entry.id.index()] = Some(entry.value);
            positions.push(entry.position);
        }
        self.renumber_from(first);

        Ok(positions)
    }

    /// Takes a batch of records out, returned in ascending position order.
    ///
    /// Duplicate ids are ignored. Fails without touching anything when an id
    /// does not resolve.
    pub fn remove_many(&mut self, ids: &[I]) -> CoreResult<Vec<Removed<I, T>>> {
        let mut unique = HashSet::with_capacity(ids.len());
        let mut targets = Vec::with_capacity(ids.len());
        for id in ids {
            if unique.insert(*id) {
                targets.push((self.position(*id)?, *id));
            }
        }
        targets.sort_unstable();

        let Some(&(first, _)) = targets.first() else {
            return Ok(Vec::new());
        };

        let doomed: HashSet<usize> = targets.iter().map(|(position, _)| *position).collect();
        let mut index = 0;
        self.order.retain(|_| {
            let keep = !doomed.contains(&index);
            index += 1;
            keep
        });

        let mut removed = Vec::with_capacity(targets.len());
        for (position, id) in targets {
            if let Some(value) = self.slots[id.index()].take() {
                removed.push(Removed {
                    position,
                    id,
                    value,
                });
            }
        }
        self.renumber_from(first);

        Ok(removed)
    }

    /// Replaces the order with a permutation of the current one
    pub fn reorder(&mut self, order: Vec<I>) -> CoreResult<()> {
        if order.len() != self.order.len() {
            return Err(CoreError::Internal(format!(
                "Reorder expects {} ids, got {}",
                self.order.len(),
                order.len()
            )));
        }
        let mut current: Vec<I> = self.order.clone();
        let mut proposed = order.clone();
        current.sort_unstable();
        proposed.sort_unstable();
        if current != proposed {
            return Err(CoreError::Internal(
                "Reorder is not a permutation of the current order".to_string(),
            ));
        }

        self.order = order;
        self.renumber_from(0);
        Ok(())
    }

    fn renumber_from(&mut self, start: usize) {
        for position in start..self.order.len() {
            let id = self.order[position];
            if let Some(record) = self.slots[id.index()].as_mut() {
                record.set_num(position + 1);
            }
        }
    }
}
