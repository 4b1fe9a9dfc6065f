//! Error types for subobject construction.

/// Errors that can occur when creating, cloning or renaming subobjects.
///
/// A call that returns one of these leaves the registry unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubobjectError {
    /// The target name is already used by another subobject in the registry.
    #[error("subobject name collision: '{name}' already exists")]
    NameCollision { name: String },

    /// A state object config was given bits outside the valid flag mask.
    #[error("invalid state object flags {flags:#x} (unknown bits: {invalid:#x})")]
    InvalidFlags { flags: u32, invalid: u32 },

    /// A byte buffer is too large for the container's size field.
    #[error("byte buffer of {len} bytes exceeds size limit (must be below {limit})")]
    SizeExceeded { len: usize, limit: usize },

    /// A rename or duplicate named a source subobject that does not exist.
    #[error("unknown subobject '{name}'")]
    UnknownSubobject { name: String },
}
