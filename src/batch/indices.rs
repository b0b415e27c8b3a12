use std::ops::Range;

use tracing::instrument;

use super::{INDICES_PER_SPRITE, VERTICES_PER_SPRITE};
use crate::buffer::MeshBuffer;

/// The indices of one quad relative to its first vertex: top-left,
/// bottom-left, top-right, then top-right, bottom-left, bottom-right.
pub const LOCAL_INDICES: [u16; INDICES_PER_SPRITE] = [0, 1, 2, 2, 1, 3];

/// Tracks how many sprites' worth of indices a buffer already holds.
///
/// Indices for a sprite never change, so a batch whose size fluctuates below
/// its largest size so far never writes indices again.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexSequence {
    built: u32,
}

impl IndexSequence {
    /// Returns a sequence that hasn't written any indices.
    #[must_use]
    pub const fn new() -> Self {
        Self { built: 0 }
    }

    /// Returns the number of sprites indices have been written for.
    #[must_use]
    pub const fn built(&self) -> u32 {
        self.built
    }

    /// Writes indices for sprites `built..sprite_count` into `buffer`.
    /// Returns false without touching the buffer if they already exist.
    #[instrument(level = "trace", skip(self, buffer))]
    pub fn extend_to<B: MeshBuffer>(&mut self, buffer: &mut B, sprite_count: u32) -> bool {
        if sprite_count <= self.built {
            return false;
        }

        let new_sprites = self.built..sprite_count;
        buffer.write_indices(|indices| write_index_range(indices, new_sprites));
        tracing::trace!(from = self.built, to = sprite_count, "index watermark raised");
        self.built = sprite_count;
        true
    }
}

/// Writes the indices of every sprite in `sprites` into `indices`.
///
/// # Panics
///
/// Panics if `indices` can't hold `6 * sprites.end` entries.
pub fn write_index_range(indices: &mut [u16], sprites: Range<u32>) {
    for sprite in sprites {
        let start = sprite as usize * INDICES_PER_SPRITE;
        let first_vertex = (sprite as usize * VERTICES_PER_SPRITE) as u16;
        for (slot, local) in indices[start..start + INDICES_PER_SPRITE]
            .iter_mut()
            .zip(LOCAL_INDICES.iter())
        {
            *slot = first_vertex + local;
        }
    }
}
