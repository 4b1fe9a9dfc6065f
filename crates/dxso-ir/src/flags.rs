//! State object configuration flags.

/// Bitflags carried by a `StateObjectConfig` subobject.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub struct StateObjectFlags(u32);

impl StateObjectFlags {
    /// No flags.
    pub const EMPTY: Self = Self(0);
    /// Local definitions may depend on definitions outside the state object.
    pub const ALLOW_LOCAL_DEPENDENCIES_ON_EXTERNAL_DEFINITIONS: Self = Self(0x1);
    /// External definitions may depend on definitions local to the state object.
    pub const ALLOW_EXTERNAL_DEPENDENCIES_ON_LOCAL_DEFINITIONS: Self = Self(0x2);
    /// Every defined bit.
    pub const VALID_MASK: Self = Self(0x3);

    /// Wraps raw bits, rejecting any bit outside [`Self::VALID_MASK`].
    pub fn from_bits(bits: u32) -> Option<Self> {
        if bits & !Self::VALID_MASK.0 == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// Returns the bits of `raw` that no flag defines.
    pub fn invalid_bits(raw: u32) -> u32 {
        raw & !Self::VALID_MASK.0
    }

    /// Returns the raw bit value.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if `self` contains all flags in `other`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if no flags are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for StateObjectFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for StateObjectFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
