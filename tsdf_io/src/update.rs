//! Per-block update flags.
//!
//! Upstream integrators mark a block as updated for every consumer kind after
//! fusing new data into it. Each consumer clears only its own bit once it has
//! caught up, so consumers progress independently.

/// Kinds of downstream consumer that track block changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Update {
    /// Map-level consumers (e.g. publishing, serialization).
    Map,
    /// Mesh extraction.
    Mesh,
    /// Euclidean distance field propagation.
    Esdf,
}

impl Update {
    /// Every update kind.
    pub const ALL: [Update; 3] = [Update::Map, Update::Mesh, Update::Esdf];

    #[inline]
    const fn bit(self) -> u8 {
        match self {
            Update::Map => 1 << 0,
            Update::Mesh => 1 << 1,
            Update::Esdf => 1 << 2,
        }
    }
}

/// Bitset over [`Update`] kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct UpdateFlags(u8);

impl UpdateFlags {
    /// No kind set.
    pub const NONE: UpdateFlags = UpdateFlags(0);

    /// Whether `kind` is set.
    #[inline]
    pub const fn contains(self, kind: Update) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Set or clear `kind`.
    #[inline]
    pub fn set(&mut self, kind: Update, value: bool) {
        if value {
            self.0 |= kind.bit();
        } else {
            self.0 &= !kind.bit();
        }
    }

    /// Set every kind.
    #[inline]
    pub fn set_all(&mut self) {
        for kind in Update::ALL {
            self.set(kind, true);
        }
    }

    /// Whether no kind is set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}
