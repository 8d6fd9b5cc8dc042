//! Copy-on-write snapshot list
//!
//! An ordered sequence whose readers can take a stable view of the current contents
//! while the same thread keeps mutating the list. A [`Snapshot`] aliases the live
//! backing array; the first mutation made while any snapshot is outstanding moves the
//! list onto a fresh copy, so every open view keeps observing the pre-mutation
//! contents. With no snapshot open, writes happen in place.
//!
//! A backing array displaced this way is parked in a single recycle slot once the
//! last snapshot closes, and the next forced copy reuses its allocation.
//!
//! Snapshots are RAII guards: dropping one ends it, on every exit path. The list is
//! single-threaded (`!Send`); it protects reentrant mutation, not concurrent access.

use std::cell::{Cell, RefCell};
use std::ops::Deref;
use std::rc::Rc;
use tracing::trace;

struct SnapshotState<T> {
    active: Cell<usize>,
    recycled: RefCell<Option<Vec<T>>>,
}

/// Ordered sequence with copy-on-write snapshot views
pub struct SnapshotList<T> {
    items: Rc<Vec<T>>,
    state: Rc<SnapshotState<T>>,
}

/// Read view over a [`SnapshotList`] as of the moment it was taken
pub struct Snapshot<T> {
    view: Option<Rc<Vec<T>>>,
    state: Rc<SnapshotState<T>>,
}

impl<T: Clone> Default for SnapshotList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> From<Vec<T>> for SnapshotList<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: Rc::new(items),
            state: Rc::new(SnapshotState {
                active: Cell::new(0),
                recycled: RefCell::new(None),
            }),
        }
    }
}

impl<T: Clone> SnapshotList<T> {
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::from(Vec::with_capacity(capacity))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Iterate the live contents. Borrowing `self` rules out mutation for the
    /// duration; use [`SnapshotList::snapshot`] when mutation may happen mid-walk.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.as_ref().clone()
    }

    /// Begin a snapshot. The view stays valid and unchanged until dropped.
    pub fn snapshot(&self) -> Snapshot<T> {
        self.state.active.set(self.state.active.get() + 1);
        Snapshot {
            view: Some(Rc::clone(&self.items)),
            state: Rc::clone(&self.state),
        }
    }

    /// Number of snapshots currently open
    pub fn active_snapshots(&self) -> usize {
        self.state.active.get()
    }

    /// Whether a displaced backing array is waiting to be reused
    pub fn has_recycled(&self) -> bool {
        self.state.recycled.borrow().is_some()
    }

    pub fn push(&mut self, item: T) {
        self.modified().push(item);
    }

    /// Insert at `index`; panics if `index > len`, like `Vec::insert`.
    pub fn insert(&mut self, index: usize, item: T) {
        self.modified().insert(index, item);
    }

    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        Some(self.modified().remove(index))
    }

    /// Replace the element at `index`, returning the old one.
    pub fn set(&mut self, index: usize, item: T) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        Some(std::mem::replace(&mut self.modified()[index], item))
    }

    pub fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.modified().clear();
    }

    /// Mutable access to the backing array, detaching it first if an outstanding
    /// snapshot still aliases it.
    fn modified(&mut self) -> &mut Vec<T> {
        if self.state.active.get() > 0 && Rc::strong_count(&self.items) > 1 {
            let reused = self.state.recycled.borrow_mut().take();
            let mut fresh = match reused {
                Some(mut storage) => {
                    storage.clear();
                    storage.reserve(self.items.len());
                    storage
                }
                None => Vec::with_capacity(self.items.len()),
            };
            fresh.extend(self.items.iter().cloned());
            trace!(
                len = fresh.len(),
                snapshots = self.state.active.get(),
                "Detached snapshot backing array"
            );
            self.items = Rc::new(fresh);
        }
        Rc::make_mut(&mut self.items)
    }
}

impl<T: Clone + PartialEq> SnapshotList<T> {
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|candidate| candidate == item)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.index_of(item).is_some()
    }

    /// Remove the first element equal to `item`.
    pub fn remove(&mut self, item: &T) -> bool {
        match self.index_of(item) {
            Some(index) => self.remove_at(index).is_some(),
            None => false,
        }
    }
}

impl<T> Snapshot<T> {
    pub fn as_slice(&self) -> &[T] {
        match &self.view {
            Some(view) => view.as_slice(),
            None => &[],
        }
    }
}

impl<T> Deref for Snapshot<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> Drop for Snapshot<T> {
    fn drop(&mut self) {
        let remaining = self.state.active.get().saturating_sub(1);
        self.state.active.set(remaining);

        let Some(view) = self.view.take() else {
            return;
        };
        if remaining > 0 {
            return;
        }
        // Only a displaced array is uniquely held here; the live one is still
        // referenced by its list.
        if let Ok(mut displaced) = Rc::try_unwrap(view) {
            displaced.clear();
            *self.state.recycled.borrow_mut() = Some(displaced);
        }
    }
}
