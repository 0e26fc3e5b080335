//! Compiled decoders, keyed by the type they decode into.
//!
//! Lookups are a single atomic load. An insert copies the map and swaps the
//! copy in, so readers never block and never see a half-built map.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use decant_core::ConstTypeId;

use crate::decoder::DecoderRef;

type DecoderMap = HashMap<ConstTypeId, DecoderRef>;

/// Copy-on-write map from type to its compiled decoder.
pub struct DecoderCache {
    map: ArcSwap<DecoderMap>,
}

impl DecoderCache {
    /// An empty cache.
    pub fn new() -> Self {
        DecoderCache {
            map: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// The decoder cached for `id`, if any.
    pub fn lookup(&self, id: ConstTypeId) -> Option<DecoderRef> {
        self.map.load().get(&id).cloned()
    }

    /// Caches `decoder` for `id` unless another decoder got there first.
    /// Returns true if this one was stored.
    ///
    /// Two threads compiling the same type both succeed; the first insert is
    /// kept and the other decoder is simply dropped after use.
    pub fn insert(&self, id: ConstTypeId, decoder: DecoderRef) -> bool {
        let mut won = false;
        self.map.rcu(|current| {
            won = false;
            if current.contains_key(&id) {
                return Arc::clone(current);
            }
            won = true;
            let mut next = DecoderMap::clone(current);
            next.insert(id, decoder.clone());
            Arc::new(next)
        });
        debug!(won, "decoder cache insert");
        won
    }

    /// Number of cached decoders.
    pub fn len(&self) -> usize {
        self.map.load().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.map.load().is_empty()
    }

    /// Drops every cached decoder. Decoders already handed out stay usable.
    pub fn clear(&self) {
        self.map.store(Arc::new(HashMap::new()));
    }
}

impl Default for DecoderCache {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for DecoderCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DecoderCache")
            .field("len", &self.len())
            .finish()
    }
}
