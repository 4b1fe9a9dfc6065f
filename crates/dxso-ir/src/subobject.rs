//! Subobject records and the typed views handed out to readers.
//!
//! A [`Subobject`] holds handles into its registry's [`Storage`] and nothing
//! else of variable length, so it can only be created by the registry that
//! owns that storage. Readers get a [`SubobjectRef`], which pairs the record
//! with the storage and resolves handles on access.

use std::fmt;

use crate::arena::{BlobHandle, BlobStore, Symbol};
use crate::error::SubobjectError;
use crate::flags::StateObjectFlags;
use crate::registry::Storage;

/// The kind of a subobject.
///
/// Discriminants match the state subobject type codes of the container
/// format.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[repr(u32)]
pub enum SubobjectKind {
    StateObjectConfig = 0,
    GlobalRootSignature = 1,
    LocalRootSignature = 2,
    SubobjectToExportsAssociation = 8,
    RaytracingShaderConfig = 9,
    RaytracingPipelineConfig = 10,
    HitGroup = 11,
}

impl SubobjectKind {
    /// Every kind, in code order.
    pub const ALL: [Self; 7] = [
        Self::StateObjectConfig,
        Self::GlobalRootSignature,
        Self::LocalRootSignature,
        Self::SubobjectToExportsAssociation,
        Self::RaytracingShaderConfig,
        Self::RaytracingPipelineConfig,
        Self::HitGroup,
    ];

    /// Returns the kind for a raw type code, if it names one.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Returns the raw type code.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Returns the kind's stable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::StateObjectConfig => "StateObjectConfig",
            Self::GlobalRootSignature => "GlobalRootSignature",
            Self::LocalRootSignature => "LocalRootSignature",
            Self::SubobjectToExportsAssociation => "SubobjectToExportsAssociation",
            Self::RaytracingShaderConfig => "RaytracingShaderConfig",
            Self::RaytracingPipelineConfig => "RaytracingPipelineConfig",
            Self::HitGroup => "HitGroup",
        }
    }

    /// Returns `true` for global and local root signatures.
    pub fn is_root_signature(self) -> bool {
        matches!(self, Self::GlobalRootSignature | Self::LocalRootSignature)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RootSignatureData {
    pub data: BlobHandle,
    pub size: u32,
}

/// Kind-specific payload. The variant is the subobject's kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Payload {
    StateObjectConfig {
        flags: StateObjectFlags,
    },
    GlobalRootSignature(RootSignatureData),
    LocalRootSignature(RootSignatureData),
    SubobjectToExportsAssociation {
        subobject: Symbol,
        exports: Vec<Symbol>,
    },
    RaytracingShaderConfig {
        max_payload_size_in_bytes: u32,
        max_attribute_size_in_bytes: u32,
    },
    RaytracingPipelineConfig {
        max_trace_recursion_depth: u32,
    },
    HitGroup {
        intersection: Symbol,
        any_hit: Symbol,
        closest_hit: Symbol,
    },
}

impl Payload {
    pub fn kind(&self) -> SubobjectKind {
        match self {
            Self::StateObjectConfig { .. } => SubobjectKind::StateObjectConfig,
            Self::GlobalRootSignature(_) => SubobjectKind::GlobalRootSignature,
            Self::LocalRootSignature(_) => SubobjectKind::LocalRootSignature,
            Self::SubobjectToExportsAssociation { .. } => {
                SubobjectKind::SubobjectToExportsAssociation
            }
            Self::RaytracingShaderConfig { .. } => SubobjectKind::RaytracingShaderConfig,
            Self::RaytracingPipelineConfig { .. } => SubobjectKind::RaytracingPipelineConfig,
            Self::HitGroup { .. } => SubobjectKind::HitGroup,
        }
    }

    /// Fails if re-interning into `to` would be rejected. Mutates nothing.
    pub fn check_transplant(&self, from: &Storage, to: &Storage) -> Result<(), SubobjectError> {
        match self {
            Self::GlobalRootSignature(rs) | Self::LocalRootSignature(rs) => {
                to.blobs.check_len(from.blobs[rs.data].len())
            }
            _ => Ok(()),
        }
    }

    /// Copies this payload into `to`, re-interning every handle through it.
    pub fn transplant(&self, from: &Storage, to: &mut Storage) -> Result<Self, SubobjectError> {
        let strings = &mut to.strings;
        let mut sym = |s: Symbol| strings.intern(&from.strings[s]);
        Ok(match self {
            Self::SubobjectToExportsAssociation { subobject, exports } => {
                Self::SubobjectToExportsAssociation {
                    subobject: sym(*subobject),
                    exports: exports.iter().map(|&e| sym(e)).collect(),
                }
            }
            Self::HitGroup {
                intersection,
                any_hit,
                closest_hit,
            } => Self::HitGroup {
                intersection: sym(*intersection),
                any_hit: sym(*any_hit),
                closest_hit: sym(*closest_hit),
            },
            Self::GlobalRootSignature(rs) => {
                Self::GlobalRootSignature(transplant_root_signature(rs, from, &mut to.blobs)?)
            }
            Self::LocalRootSignature(rs) => {
                Self::LocalRootSignature(transplant_root_signature(rs, from, &mut to.blobs)?)
            }
            Self::StateObjectConfig { .. }
            | Self::RaytracingShaderConfig { .. }
            | Self::RaytracingPipelineConfig { .. } => self.clone(),
        })
    }
}

fn transplant_root_signature(
    rs: &RootSignatureData,
    from: &Storage,
    to: &mut BlobStore,
) -> Result<RootSignatureData, SubobjectError> {
    Ok(RootSignatureData {
        data: to.insert_copy(&from.blobs[rs.data])?,
        size: rs.size,
    })
}

/// A subobject record owned by a registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Subobject {
    pub name: Symbol,
    pub payload: Payload,
}

/// Read-only view of a subobject in its registry.
///
/// Valid only while the registry is borrowed; every string and byte slice
/// it returns lives in the registry's own storage.
#[derive(Clone, Copy)]
pub struct SubobjectRef<'a> {
    storage: &'a Storage,
    subobject: &'a Subobject,
}

impl<'a> SubobjectRef<'a> {
    pub(crate) fn new(storage: &'a Storage, subobject: &'a Subobject) -> Self {
        Self { storage, subobject }
    }

    pub(crate) fn storage(&self) -> &'a Storage {
        self.storage
    }

    pub(crate) fn payload(&self) -> &'a Payload {
        &self.subobject.payload
    }

    /// The subobject's unique name.
    pub fn name(&self) -> &'a str {
        &self.storage.strings[self.subobject.name]
    }

    /// The subobject's kind.
    pub fn kind(&self) -> SubobjectKind {
        self.subobject.payload.kind()
    }

    /// Flags of a `StateObjectConfig`.
    pub fn state_object_config(&self) -> Option<StateObjectFlags> {
        match self.subobject.payload {
            Payload::StateObjectConfig { flags } => Some(flags),
            _ => None,
        }
    }

    /// Blob of a local (`local == true`) or global root signature.
    ///
    /// Returns `None` when the subobject is not a root signature of the
    /// requested scope.
    pub fn root_signature(&self, local: bool) -> Option<RootSignature<'a>> {
        let rs = match (&self.subobject.payload, local) {
            (Payload::LocalRootSignature(rs), true) | (Payload::GlobalRootSignature(rs), false) => {
                rs
            }
            _ => return None,
        };
        Some(RootSignature {
            data: &self.storage.blobs[rs.data],
            size: rs.size,
        })
    }

    /// Target and exports of a `SubobjectToExportsAssociation`.
    pub fn subobject_to_exports_association(&self) -> Option<ExportsAssociation<'a>> {
        match &self.subobject.payload {
            Payload::SubobjectToExportsAssociation { subobject, exports } => {
                Some(ExportsAssociation {
                    storage: self.storage,
                    subobject: *subobject,
                    exports,
                })
            }
            _ => None,
        }
    }

    /// Limits of a `RaytracingShaderConfig`.
    pub fn raytracing_shader_config(&self) -> Option<RaytracingShaderConfig> {
        match self.subobject.payload {
            Payload::RaytracingShaderConfig {
                max_payload_size_in_bytes,
                max_attribute_size_in_bytes,
            } => Some(RaytracingShaderConfig {
                max_payload_size_in_bytes,
                max_attribute_size_in_bytes,
            }),
            _ => None,
        }
    }

    /// Recursion depth of a `RaytracingPipelineConfig`.
    pub fn raytracing_pipeline_config(&self) -> Option<RaytracingPipelineConfig> {
        match self.subobject.payload {
            Payload::RaytracingPipelineConfig {
                max_trace_recursion_depth,
            } => Some(RaytracingPipelineConfig {
                max_trace_recursion_depth,
            }),
            _ => None,
        }
    }

    /// Shader bindings of a hit group. Unused stages are empty strings.
    pub fn hit_group(&self) -> Option<HitGroup<'a>> {
        match self.subobject.payload {
            Payload::HitGroup {
                intersection,
                any_hit,
                closest_hit,
            } => Some(HitGroup {
                intersection: &self.storage.strings[intersection],
                any_hit: &self.storage.strings[any_hit],
                closest_hit: &self.storage.strings[closest_hit],
            }),
            _ => None,
        }
    }
}

impl fmt::Debug for SubobjectRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubobjectRef")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .finish()
    }
}

/// Root signature payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RootSignature<'a> {
    /// The serialized root signature, owned by the registry.
    pub data: &'a [u8],
    pub size: u32,
}

/// Association of a subobject with a list of exports.
#[derive(Clone, Copy)]
pub struct ExportsAssociation<'a> {
    storage: &'a Storage,
    subobject: Symbol,
    exports: &'a [Symbol],
}

impl<'a> ExportsAssociation<'a> {
    /// Name of the associated subobject. Not guaranteed to exist.
    pub fn subobject(&self) -> &'a str {
        &self.storage.strings[self.subobject]
    }

    /// Export names, in the order they were supplied.
    pub fn exports(&self) -> impl ExactSizeIterator<Item = &'a str> + use<'a> {
        let storage = self.storage;
        self.exports.iter().map(move |&e| &storage.strings[e])
    }

    /// Number of exports.
    pub fn num_exports(&self) -> usize {
        self.exports.len()
    }
}

impl fmt::Debug for ExportsAssociation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportsAssociation")
            .field("subobject", &self.subobject())
            .field("exports", &self.exports().collect::<Vec<_>>())
            .finish()
    }
}

/// Shader payload and attribute size limits.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct RaytracingShaderConfig {
    pub max_payload_size_in_bytes: u32,
    pub max_attribute_size_in_bytes: u32,
}

/// Pipeline recursion limit.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct RaytracingPipelineConfig {
    pub max_trace_recursion_depth: u32,
}

/// Hit group shader bindings.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct HitGroup<'a> {
    pub intersection: &'a str,
    pub any_hit: &'a str,
    pub closest_hit: &'a str,
}
