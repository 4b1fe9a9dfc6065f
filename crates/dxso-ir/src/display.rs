//! Display implementations and text dump for debugging.

use std::fmt;

use crate::flags::StateObjectFlags;
use crate::registry::SubobjectRegistry;
use crate::subobject::{
    ExportsAssociation, HitGroup, RaytracingPipelineConfig, RaytracingShaderConfig,
    RootSignature, SubobjectKind, SubobjectRef,
};

impl fmt::Display for SubobjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for StateObjectFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let local = self.contains(Self::ALLOW_LOCAL_DEPENDENCIES_ON_EXTERNAL_DEFINITIONS);
        let external = self.contains(Self::ALLOW_EXTERNAL_DEPENDENCIES_ON_LOCAL_DEFINITIONS);
        match (local, external) {
            (true, true) => write!(f, "local_on_external | external_on_local"),
            (true, false) => write!(f, "local_on_external"),
            (false, true) => write!(f, "external_on_local"),
            (false, false) => write!(f, "none"),
        }
    }
}

impl fmt::Display for RootSignature<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes", self.size)
    }
}

impl fmt::Display for ExportsAssociation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> [", self.subobject())?;
        for (i, export) in self.exports().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{export}")?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for RaytracingShaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "payload={}, attributes={}",
            self.max_payload_size_in_bytes, self.max_attribute_size_in_bytes
        )
    }
}

impl fmt::Display for RaytracingPipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "max_recursion={}", self.max_trace_recursion_depth)
    }
}

fn stage(name: &str) -> &str {
    if name.is_empty() { "-" } else { name }
}

impl fmt::Display for HitGroup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "intersection={}, anyhit={}, closesthit={}",
            stage(self.intersection),
            stage(self.any_hit),
            stage(self.closest_hit)
        )
    }
}

impl fmt::Display for SubobjectRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.name())?;
        match self.kind() {
            SubobjectKind::StateObjectConfig => {
                if let Some(flags) = self.state_object_config() {
                    write!(f, ": {flags}")?;
                }
            }
            SubobjectKind::GlobalRootSignature | SubobjectKind::LocalRootSignature => {
                let local = self.kind() == SubobjectKind::LocalRootSignature;
                if let Some(rs) = self.root_signature(local) {
                    write!(f, ": {rs}")?;
                }
            }
            SubobjectKind::SubobjectToExportsAssociation => {
                if let Some(assoc) = self.subobject_to_exports_association() {
                    write!(f, ": {assoc}")?;
                }
            }
            SubobjectKind::RaytracingShaderConfig => {
                if let Some(config) = self.raytracing_shader_config() {
                    write!(f, ": {config}")?;
                }
            }
            SubobjectKind::RaytracingPipelineConfig => {
                if let Some(config) = self.raytracing_pipeline_config() {
                    write!(f, ": {config}")?;
                }
            }
            SubobjectKind::HitGroup => {
                if let Some(hit_group) = self.hit_group() {
                    write!(f, ": {hit_group}")?;
                }
            }
        }
        Ok(())
    }
}

/// Dump all subobjects of a registry as human-readable text, one per line.
pub fn dump_subobjects(registry: &SubobjectRegistry) -> String {
    let mut out = format!("Subobjects ({}):\n", registry.len());
    for subobject in registry.iter() {
        out.push_str(&format!("  {subobject}\n"));
    }
    out
}
