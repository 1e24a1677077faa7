//! Generational node ids
//!
//! Ids pair a slot index with the generation the slot had when the node was
//! spawned, so an id that outlives its node is rejected instead of silently
//! aliasing whatever reuses the slot.

use core::fmt;

/// Identity of a node inside a [`SceneGraph`](crate::SceneGraph).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index
    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Slot generation at spawn time
    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Pack into a single u64 (generation in the upper half)
    #[inline]
    pub const fn to_bits(&self) -> u64 {
        (self.generation as u64) << 32 | self.index as u64
    }

    /// Unpack from [`NodeId::to_bits`]
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}
