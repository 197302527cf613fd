//! Per-view bookkeeping of every snippet that is drawn or still fading out.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::affine::Affine;
use crate::interp::Intermediate;
use crate::snippet::Replay;

/// Stable identity of a logical draw unit.
///
/// Two paints with the same key in consecutive frames are the same element
/// moving; different keys are different elements, however similar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnippetKey(pub u64);

impl SnippetKey {
    /// Key for the snippet of type `T` identified by `id`.
    ///
    /// The type takes part in the hash, so a well and a plate may both use
    /// id `3` without colliding.
    pub fn of<T: 'static>(id: impl Hash) -> Self {
        let mut hasher = DefaultHasher::new();
        TypeId::of::<T>().hash(&mut hasher);
        id.hash(&mut hasher);
        SnippetKey(hasher.finish())
    }
}

impl From<u64> for SnippetKey {
    fn from(id: u64) -> Self {
        SnippetKey(id)
    }
}

impl fmt::Display for SnippetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:016x}", self.0)
    }
}

/// Everything remembered about a snippet between frames.
pub struct SnippetState {
    pub(crate) key: SnippetKey,
    pub(crate) registry_index: usize,
    pub(crate) drawn: bool,
    pub(crate) fading: bool,
    pub(crate) presence: f32,
    pub(crate) transitioning: bool,
    pub(crate) transform: Affine,
    pub(crate) instance: Option<Replay>,
    pub(crate) calls: Vec<Replay>,
    pub(crate) intermediates: Vec<Intermediate>,
    pub(crate) call_index: usize,
}

impl SnippetState {
    fn new(key: SnippetKey, registry_index: usize, presence: f32) -> Self {
        Self {
            key,
            registry_index,
            drawn: false,
            fading: false,
            presence,
            transitioning: true,
            transform: Affine::IDENTITY,
            instance: None,
            calls: Vec::new(),
            intermediates: Vec::new(),
            call_index: 0,
        }
    }

    pub fn key(&self) -> SnippetKey {
        self.key
    }

    pub fn registry_index(&self) -> usize {
        self.registry_index
    }

    pub fn drawn(&self) -> bool {
        self.drawn
    }

    /// Raw presence; negative while a fade-in is still delayed.
    pub fn presence(&self) -> f32 {
        self.presence
    }

    /// Presence as an opacity factor.
    pub fn opacity(&self) -> f32 {
        self.presence.clamp(0.0, 1.0)
    }

    pub fn transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn intermediates(&self) -> &[Intermediate] {
        &self.intermediates
    }

    /// Number of argument-carrying invocations recorded this frame.
    pub fn recorded_calls(&self) -> usize {
        self.calls.len()
    }

    /// The invocations to repeat while fading out.
    pub(crate) fn replays(&self) -> Vec<Replay> {
        if self.calls.is_empty() {
            self.instance.iter().cloned().collect()
        } else {
            self.calls.clone()
        }
    }
}

impl fmt::Debug for SnippetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnippetState")
            .field("key", &self.key)
            .field("registry_index", &self.registry_index)
            .field("drawn", &self.drawn)
            .field("presence", &self.presence)
            .field("transitioning", &self.transitioning)
            .field("calls", &self.calls.len())
            .field("intermediates", &self.intermediates.len())
            .finish()
    }
}

/// Identity-keyed registry of snippet states.
///
/// States live in a dense list for iteration; the map points into it.
#[derive(Debug, Default)]
pub struct DrawManager {
    index: HashMap<SnippetKey, usize>,
    states: Vec<SnippetState>,
}

impl DrawManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn contains(&self, key: SnippetKey) -> bool {
        self.index.contains_key(&key)
    }

    pub fn index_of(&self, key: SnippetKey) -> Option<usize> {
        self.index.get(&key).copied()
    }

    pub fn get(&self, index: usize) -> Option<&SnippetState> {
        self.states.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SnippetState> {
        self.states.get_mut(index)
    }

    pub fn state(&self, key: SnippetKey) -> Option<&SnippetState> {
        self.index_of(key).and_then(|i| self.states.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SnippetState> {
        self.states.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut SnippetState> {
        self.states.iter_mut()
    }

    pub fn for_each(&self, f: impl FnMut(&SnippetState)) {
        self.states.iter().for_each(f);
    }

    /// Index of the state for `key`, created with `presence` when absent.
    pub fn get_or_create(&mut self, key: SnippetKey, presence: f32) -> usize {
        if let Some(&index) = self.index.get(&key) {
            return index;
        }

        let index = self.states.len();
        self.states.push(SnippetState::new(key, index, presence));
        self.index.insert(key, index);
        tracing::debug!(%key, index, "snippet registered");
        index
    }

    /// Drop the state for `key`, moving the last state into its slot.
    pub fn remove(&mut self, key: SnippetKey) -> Option<SnippetState> {
        let index = self.index.remove(&key)?;
        let removed = self.states.swap_remove(index);

        if let Some(moved) = self.states.get_mut(index) {
            moved.registry_index = index;
            self.index.insert(moved.key, index);
        }

        tracing::debug!(%key, index, remaining = self.states.len(), "snippet removed");
        Some(removed)
    }
}
