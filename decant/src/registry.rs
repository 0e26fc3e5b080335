//! User-supplied decoders: per-type and per-field overrides, and extensions
//! that are consulted for every struct field.

use std::collections::HashMap;
use std::sync::Arc;

use decant_core::{Field, PtrMut, Shape};
use parking_lot::RwLock;

use crate::JsonIter;

/// A hand-written decoder. It receives a pointer to an initialized value of
/// the type it was registered for and must leave it initialized.
pub type DecoderFn = Arc<dyn Fn(PtrMut, &mut JsonIter<'_>) + Send + Sync>;

/// What an extension may change about a struct field.
#[derive(Clone, Default)]
pub struct FieldOverride {
    /// JSON keys that select this field. Empty keeps the keys derived from
    /// the field's name and annotation.
    pub names: Vec<String>,
    /// Replaces the compiled decoder for this field.
    pub decoder: Option<DecoderFn>,
}

impl core::fmt::Debug for FieldOverride {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FieldOverride")
            .field("names", &self.names)
            .field("decoder", &self.decoder.is_some())
            .finish()
    }
}

/// Consulted once per struct field at compile time, with the struct's shape
/// and the field. Returning `None` leaves the field alone.
pub type ExtensionFn =
    Arc<dyn Fn(&'static Shape, &'static Field) -> Option<FieldOverride> + Send + Sync>;

#[derive(Clone, Default)]
pub(crate) struct Overrides {
    pub(crate) types: HashMap<String, DecoderFn>,
    pub(crate) fields: HashMap<String, DecoderFn>,
    pub(crate) extensions: Vec<ExtensionFn>,
}

impl Overrides {
    pub(crate) fn type_decoder(&self, shape: &Shape) -> Option<&DecoderFn> {
        if self.types.is_empty() {
            return None;
        }
        self.types.get(&shape.to_string())
    }

    pub(crate) fn field_decoder(&self, owner: &Shape, field: &str) -> Option<&DecoderFn> {
        if self.fields.is_empty() {
            return None;
        }
        self.fields.get(&field_key(&owner.to_string(), field))
    }

    pub(crate) fn extension_override(
        &self,
        owner: &'static Shape,
        field: &'static Field,
    ) -> Option<FieldOverride> {
        self.extensions.iter().find_map(|ext| ext(owner, field))
    }
}

fn field_key(type_name: &str, field: &str) -> String {
    format!("{type_name}/{field}")
}

/// Registered overrides.
///
/// Types are identified by name: `u32`, `Vec<String>`, `Point`. Registration
/// affects only decoders compiled afterwards, so register before the first
/// decode of an affected type, or clear the decoder cache.
#[derive(Default)]
pub struct Registry {
    state: RwLock<Overrides>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every value of the type named `type_name` with `decoder`.
    pub fn register_type<F>(&self, type_name: impl Into<String>, decoder: F)
    where
        F: Fn(PtrMut, &mut JsonIter<'_>) + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        debug!(type_name = %type_name, "registered type decoder");
        self.state.write().types.insert(type_name, Arc::new(decoder));
    }

    /// Decode field `field` (the declared name) of the struct named
    /// `type_name` with `decoder`.
    pub fn register_field<F>(&self, type_name: &str, field: &str, decoder: F)
    where
        F: Fn(PtrMut, &mut JsonIter<'_>) + Send + Sync + 'static,
    {
        let key = field_key(type_name, field);
        debug!(key = %key, "registered field decoder");
        self.state.write().fields.insert(key, Arc::new(decoder));
    }

    /// Add an extension. Extensions are asked in registration order and the
    /// first to answer wins.
    pub fn register_extension<F>(&self, extension: F)
    where
        F: Fn(&'static Shape, &'static Field) -> Option<FieldOverride> + Send + Sync + 'static,
    {
        let mut state = self.state.write();
        state.extensions.push(Arc::new(extension));
        debug!(count = state.extensions.len(), "registered extension");
    }

    /// Forget every type and field registration. Extensions stay.
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.types.clear();
        state.fields.clear();
        debug!("registry reset");
    }

    pub(crate) fn snapshot(&self) -> Overrides {
        self.state.read().clone()
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Registry")
            .field("types", &state.types.len())
            .field("fields", &state.fields.len())
            .field("extensions", &state.extensions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decant_core::Reflect;
    use decant_testhelpers::test;

    #[test]
    fn lookup_by_display_name() {
        let registry = Registry::new();
        registry.register_type("Vec<u32>", |_, _| {});
        registry.register_field("Point", "x", |_, _| {});

        let overrides = registry.snapshot();
        assert!(overrides.type_decoder(<Vec<u32>>::SHAPE).is_some());
        assert!(overrides.type_decoder(<Vec<u64>>::SHAPE).is_none());
        assert!(overrides.fields.contains_key("Point/x"));
    }

    #[test]
    fn reset_keeps_extensions() {
        let registry = Registry::new();
        registry.register_type("u8", |_, _| {});
        registry.register_field("Point", "x", |_, _| {});
        registry.register_extension(|_, _| None);
        registry.reset();

        let overrides = registry.snapshot();
        assert!(overrides.types.is_empty());
        assert!(overrides.fields.is_empty());
        assert_eq!(overrides.extensions.len(), 1);
    }

    #[test]
    fn snapshot_is_detached() {
        let registry = Registry::new();
        let before = registry.snapshot();
        registry.register_type("u8", |_, _| {});
        assert!(before.types.is_empty());
        assert_eq!(registry.snapshot().types.len(), 1);
    }
}
