//! Raytracing state object subobjects.
//!
//! A [`SubobjectRegistry`] collects uniquely named subobjects (pipeline
//! flags, root signatures, shader limits, hit groups and export
//! associations) while a shader module is being built. Strings and byte
//! buffers supplied by the caller are copied into interned storage owned by
//! the registry; subobjects hold handles into that storage only.

pub mod arena;
mod display;
mod error;
mod flags;
mod registry;
mod subobject;

pub use arena::{BlobHandle, BlobStore, Handle, StringInterner, Symbol};
pub use display::dump_subobjects;
pub use error::SubobjectError;
pub use flags::StateObjectFlags;
pub use registry::{MAX_BLOB_LEN, RegistryOptions, SubobjectRegistry};
pub use subobject::{
    ExportsAssociation, HitGroup, RaytracingPipelineConfig, RaytracingShaderConfig,
    RootSignature, SubobjectKind, SubobjectRef,
};

/// A shader module's subobject state.
///
/// The registry is optional: modules without raytracing pipeline
/// configuration carry none.
#[derive(Debug, Default)]
pub struct Module {
    subobjects: Option<SubobjectRegistry>,
}

impl Module {
    /// Returns the module's registry, if any.
    pub fn subobjects(&self) -> Option<&SubobjectRegistry> {
        self.subobjects.as_ref()
    }

    pub fn subobjects_mut(&mut self) -> Option<&mut SubobjectRegistry> {
        self.subobjects.as_mut()
    }

    /// Returns the registry, creating an empty one if the module has none.
    pub fn subobjects_or_default(&mut self) -> &mut SubobjectRegistry {
        self.subobjects.get_or_insert_with(SubobjectRegistry::new)
    }

    /// Releases the registry to the caller, leaving the module without one.
    pub fn take_subobjects(&mut self) -> Option<SubobjectRegistry> {
        self.subobjects.take()
    }

    /// Replaces the registry, dropping the previous one.
    pub fn reset_subobjects(&mut self, subobjects: Option<SubobjectRegistry>) {
        self.subobjects = subobjects;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_starts_without_subobjects() {
        let module = Module::default();
        assert!(module.subobjects().is_none());
    }

    #[test]
    fn module_take_and_reset() {
        let mut module = Module::default();
        module
            .subobjects_or_default()
            .create_raytracing_pipeline_config("Pipeline", 1)
            .unwrap();
        assert_eq!(module.subobjects().map(SubobjectRegistry::len), Some(1));

        let taken = module.take_subobjects().unwrap();
        assert!(module.subobjects().is_none());
        assert!(taken.contains("Pipeline"));

        module.reset_subobjects(Some(taken));
        assert!(module.subobjects_mut().unwrap().remove_subobject("Pipeline"));
        module.reset_subobjects(None);
        assert!(module.subobjects().is_none());
    }
}
