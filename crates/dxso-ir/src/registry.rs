//! The subobject registry.

use indexmap::IndexMap;

use crate::arena::{BlobStore, StringInterner, Symbol};
use crate::error::SubobjectError;
use crate::flags::StateObjectFlags;
use crate::subobject::{Payload, RootSignatureData, Subobject, SubobjectRef};

/// Exclusive ceiling on byte buffer length: the container's size field is a `u32`.
pub const MAX_BLOB_LEN: usize = u32::MAX as usize;

/// Options controlling a [`SubobjectRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Byte buffers must be strictly shorter than this. Clamped to
    /// [`MAX_BLOB_LEN`].
    pub max_blob_len: usize,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            max_blob_len: MAX_BLOB_LEN,
        }
    }
}

/// Interned storage shared by every subobject of one registry.
#[derive(Debug, Default)]
pub(crate) struct Storage {
    pub strings: StringInterner,
    pub blobs: BlobStore,
}

impl Storage {
    pub fn with_blob_limit(limit: usize) -> Self {
        Self {
            strings: StringInterner::new(),
            blobs: BlobStore::with_limit(limit.min(MAX_BLOB_LEN)),
        }
    }
}

/// Owns a set of uniquely named subobjects and the storage they reference.
///
/// Every create, clone and rename either succeeds completely or returns an
/// error without changing the registry.
#[derive(Debug, Default)]
pub struct SubobjectRegistry {
    storage: Storage,
    subobjects: IndexMap<Symbol, Subobject>,
}

impl SubobjectRegistry {
    /// Creates an empty registry with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given options.
    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            storage: Storage::with_blob_limit(options.max_blob_len),
            subobjects: IndexMap::new(),
        }
    }

    /// Returns the effective byte buffer size ceiling.
    pub fn max_blob_len(&self) -> usize {
        self.storage.blobs.limit()
    }

    /// Returns the number of subobjects.
    pub fn len(&self) -> usize {
        self.subobjects.len()
    }

    /// Returns `true` if the registry holds no subobjects.
    pub fn is_empty(&self) -> bool {
        self.subobjects.is_empty()
    }

    /// Returns `true` if a subobject named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Number of distinct strings interned so far.
    pub fn interned_string_count(&self) -> usize {
        self.storage.strings.len()
    }

    /// Number of byte buffers stored so far.
    pub fn interned_blob_count(&self) -> usize {
        self.storage.blobs.len()
    }

    /// Iterates over all subobjects.
    ///
    /// The order is creation order with removals closed up, but consumers
    /// should only rely on every subobject being visited once.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = SubobjectRef<'_>> {
        self.subobjects
            .values()
            .map(|subobject| SubobjectRef::new(&self.storage, subobject))
    }

    /// Iterates over all subobject names.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.subobjects.keys().map(|&name| &self.storage.strings[name])
    }

    /// Finds a subobject by exact name.
    pub fn find_subobject(&self, name: &str) -> Option<SubobjectRef<'_>> {
        let symbol = self.lookup(name)?;
        self.subobjects
            .get(&symbol)
            .map(|subobject| SubobjectRef::new(&self.storage, subobject))
    }

    /// Removes a subobject. Returns `false` if no subobject had that name.
    pub fn remove_subobject(&mut self, name: &str) -> bool {
        let Some(symbol) = self.lookup(name) else {
            return false;
        };
        let removed = self.subobjects.shift_remove(&symbol).is_some();
        if removed {
            log::debug!("removed subobject '{name}'");
        }
        removed
    }

    /// Creates a state object config. Fails if `flags` has bits outside
    /// [`StateObjectFlags::VALID_MASK`].
    pub fn create_state_object_config(
        &mut self,
        name: &str,
        flags: u32,
    ) -> Result<SubobjectRef<'_>, SubobjectError> {
        self.ensure_vacant(name)?;
        let flags = StateObjectFlags::from_bits(flags).ok_or(SubobjectError::InvalidFlags {
            flags,
            invalid: StateObjectFlags::invalid_bits(flags),
        })?;
        Ok(self.insert(name, Payload::StateObjectConfig { flags }))
    }

    /// Creates a global or local root signature holding a copy of `data`.
    ///
    /// `data` is deduplicated by address: passing the same buffer again
    /// reuses the copy made the first time.
    pub fn create_root_signature(
        &mut self,
        name: &str,
        local: bool,
        data: &[u8],
    ) -> Result<SubobjectRef<'_>, SubobjectError> {
        self.ensure_vacant(name)?;
        let data = self.storage.blobs.intern(data)?;
        // The blob limit keeps every stored length below u32::MAX.
        let size = self.storage.blobs[data].len() as u32;
        let rs = RootSignatureData { data, size };
        let payload = if local {
            Payload::LocalRootSignature(rs)
        } else {
            Payload::GlobalRootSignature(rs)
        };
        Ok(self.insert(name, payload))
    }

    /// Creates an association between `subobject` and a list of exports.
    ///
    /// `subobject` is not required to exist yet; see the `dxso-validate`
    /// crate for the post-population check.
    pub fn create_subobject_to_exports_association<I, S>(
        &mut self,
        name: &str,
        subobject: &str,
        exports: I,
    ) -> Result<SubobjectRef<'_>, SubobjectError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_vacant(name)?;
        let subobject = self.storage.strings.intern(subobject);
        let exports = exports
            .into_iter()
            .map(|export| self.storage.strings.intern(export.as_ref()))
            .collect();
        Ok(self.insert(
            name,
            Payload::SubobjectToExportsAssociation { subobject, exports },
        ))
    }

    /// Creates a raytracing shader config with payload and attribute limits.
    pub fn create_raytracing_shader_config(
        &mut self,
        name: &str,
        max_payload_size_in_bytes: u32,
        max_attribute_size_in_bytes: u32,
    ) -> Result<SubobjectRef<'_>, SubobjectError> {
        self.ensure_vacant(name)?;
        Ok(self.insert(
            name,
            Payload::RaytracingShaderConfig {
                max_payload_size_in_bytes,
                max_attribute_size_in_bytes,
            },
        ))
    }

    /// Creates a raytracing pipeline config with a recursion limit.
    pub fn create_raytracing_pipeline_config(
        &mut self,
        name: &str,
        max_trace_recursion_depth: u32,
    ) -> Result<SubobjectRef<'_>, SubobjectError> {
        self.ensure_vacant(name)?;
        Ok(self.insert(
            name,
            Payload::RaytracingPipelineConfig {
                max_trace_recursion_depth,
            },
        ))
    }

    /// Creates a hit group. An empty shader name leaves that stage unbound.
    pub fn create_hit_group(
        &mut self,
        name: &str,
        intersection: &str,
        any_hit: &str,
        closest_hit: &str,
    ) -> Result<SubobjectRef<'_>, SubobjectError> {
        self.ensure_vacant(name)?;
        let strings = &mut self.storage.strings;
        let payload = Payload::HitGroup {
            intersection: strings.intern(intersection),
            any_hit: strings.intern(any_hit),
            closest_hit: strings.intern(closest_hit),
        };
        Ok(self.insert(name, payload))
    }

    /// Copies `source` from another registry into this one as `name`.
    ///
    /// Every string and byte buffer is re-interned through this registry's
    /// storage, so the copy stays valid after the source registry is gone.
    /// Byte buffers are always copied afresh. To copy a subobject within
    /// this registry, use [`Self::duplicate_subobject`].
    pub fn clone_subobject(
        &mut self,
        source: SubobjectRef<'_>,
        name: &str,
    ) -> Result<SubobjectRef<'_>, SubobjectError> {
        self.ensure_vacant(name)?;
        let from = source.storage();
        source.payload().check_transplant(from, &self.storage)?;
        let payload = source.payload().transplant(from, &mut self.storage)?;
        log::debug!("cloning subobject '{}' as '{name}'", source.name());
        Ok(self.insert(name, payload))
    }

    /// Copies the subobject `source` within this registry as `name`.
    ///
    /// The copy shares interned strings and buffers with the source; only
    /// the exports list is duplicated.
    pub fn duplicate_subobject(
        &mut self,
        source: &str,
        name: &str,
    ) -> Result<SubobjectRef<'_>, SubobjectError> {
        let symbol = self.require(source)?;
        self.ensure_vacant(name)?;
        let payload = self.subobjects[&symbol].payload.clone();
        log::debug!("duplicating subobject '{source}' as '{name}'");
        Ok(self.insert(name, payload))
    }

    /// Moves the subobject `source` to the key `name`, keeping its payload.
    pub fn rename_subobject(
        &mut self,
        source: &str,
        name: &str,
    ) -> Result<SubobjectRef<'_>, SubobjectError> {
        let symbol = self.require(source)?;
        self.ensure_vacant(name)?;
        let Some(subobject) = self.subobjects.shift_remove(&symbol) else {
            return Err(SubobjectError::UnknownSubobject {
                name: source.to_owned(),
            });
        };
        log::debug!("renaming subobject '{source}' to '{name}'");
        Ok(self.insert(name, subobject.payload))
    }

    fn lookup(&self, name: &str) -> Option<Symbol> {
        self.storage
            .strings
            .get(name)
            .filter(|symbol| self.subobjects.contains_key(symbol))
    }

    fn require(&self, name: &str) -> Result<Symbol, SubobjectError> {
        self.lookup(name)
            .ok_or_else(|| SubobjectError::UnknownSubobject {
                name: name.to_owned(),
            })
    }

    fn ensure_vacant(&self, name: &str) -> Result<(), SubobjectError> {
        match self.lookup(name) {
            Some(_) => Err(SubobjectError::NameCollision {
                name: name.to_owned(),
            }),
            None => Ok(()),
        }
    }

    /// Inserts under a name already checked by [`Self::ensure_vacant`].
    fn insert(&mut self, name: &str, payload: Payload) -> SubobjectRef<'_> {
        let symbol = self.storage.strings.intern(name);
        log::debug!("created {} subobject '{name}'", payload.kind());
        let (index, _) = self
            .subobjects
            .insert_full(symbol, Subobject { name: symbol, payload });
        SubobjectRef::new(&self.storage, &self.subobjects[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subobject::SubobjectKind;

    #[test]
    fn failed_create_interns_nothing() {
        let mut reg = SubobjectRegistry::new();
        reg.create_raytracing_pipeline_config("Pipeline", 1).unwrap();
        let strings = reg.interned_string_count();

        let err = reg
            .create_hit_group("Pipeline", "is", "ah", "ch")
            .unwrap_err();
        assert!(matches!(err, SubobjectError::NameCollision { .. }));
        assert_eq!(reg.interned_string_count(), strings);

        let err = reg.create_state_object_config("Config", 0x10).unwrap_err();
        assert_eq!(
            err,
            SubobjectError::InvalidFlags {
                flags: 0x10,
                invalid: 0x10
            }
        );
        assert_eq!(reg.interned_string_count(), strings);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn oversize_root_signature_is_rejected() {
        let mut reg = SubobjectRegistry::with_options(RegistryOptions { max_blob_len: 8 });
        let blob = vec![0u8; 8];
        let err = reg.create_root_signature("RS", false, &blob).unwrap_err();
        assert_eq!(err, SubobjectError::SizeExceeded { len: 8, limit: 8 });
        assert!(reg.is_empty());
        assert_eq!(reg.interned_blob_count(), 0);
        assert_eq!(reg.interned_string_count(), 0);
    }

    #[test]
    fn options_are_clamped() {
        let reg = SubobjectRegistry::with_options(RegistryOptions {
            max_blob_len: usize::MAX,
        });
        assert_eq!(reg.max_blob_len(), MAX_BLOB_LEN);
        assert_eq!(SubobjectRegistry::new().max_blob_len(), MAX_BLOB_LEN);
    }

    #[test]
    fn duplicate_shares_interned_strings() {
        let mut reg = SubobjectRegistry::new();
        reg.create_hit_group("HG", "", "AnyHit", "Closest").unwrap();
        let strings = reg.interned_string_count();

        let copy = reg.duplicate_subobject("HG", "HG2").unwrap();
        assert_eq!(copy.kind(), SubobjectKind::HitGroup);
        // Only the new name is interned.
        assert_eq!(reg.interned_string_count(), strings + 1);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn duplicate_requires_source() {
        let mut reg = SubobjectRegistry::new();
        let err = reg.duplicate_subobject("Missing", "Copy").unwrap_err();
        assert_eq!(
            err,
            SubobjectError::UnknownSubobject {
                name: "Missing".into()
            }
        );
        assert!(reg.is_empty());
    }

    #[test]
    fn rename_moves_payload() {
        let mut reg = SubobjectRegistry::new();
        reg.create_raytracing_shader_config("Shader", 16, 8).unwrap();
        reg.create_raytracing_pipeline_config("Pipeline", 2).unwrap();

        let err = reg.rename_subobject("Shader", "Pipeline").unwrap_err();
        assert!(matches!(err, SubobjectError::NameCollision { .. }));

        let renamed = reg.rename_subobject("Shader", "Shader2").unwrap();
        let config = renamed.raytracing_shader_config().unwrap();
        assert_eq!(config.max_payload_size_in_bytes, 16);
        assert_eq!(config.max_attribute_size_in_bytes, 8);
        assert!(!reg.contains("Shader"));
        assert!(reg.contains("Shader2"));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn interned_name_without_entry_is_not_found() {
        let mut reg = SubobjectRegistry::new();
        // "Target" is interned as an association target but is not an entry.
        reg.create_subobject_to_exports_association("Assoc", "Target", ["Main"])
            .unwrap();
        assert!(reg.find_subobject("Target").is_none());
        assert!(!reg.remove_subobject("Target"));
        reg.create_raytracing_pipeline_config("Target", 1).unwrap();
        assert!(reg.contains("Target"));
    }

    #[test]
    fn names_in_creation_order() {
        let mut reg = SubobjectRegistry::new();
        reg.create_raytracing_pipeline_config("A", 1).unwrap();
        reg.create_raytracing_pipeline_config("B", 1).unwrap();
        reg.create_raytracing_pipeline_config("C", 1).unwrap();
        reg.remove_subobject("B");
        assert_eq!(reg.names().collect::<Vec<_>>(), vec!["A", "C"]);
    }
}
