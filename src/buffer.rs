use std::panic::{self, AssertUnwindSafe};

use crate::{
    batch::{INDICES_PER_SPRITE, VERTICES_PER_SPRITE},
    sprite::SpriteVertex,
};

/// How often a buffer's contents are expected to change.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum BufferUsage {
    /// Written once, drawn many times.
    Static,
    /// Rewritten most frames.
    Dynamic,
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::Static
    }
}

/// Whether the CPU may read back a locked region.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum BufferAccess {
    /// Locked regions are readable.
    Read,
    /// Locked regions are write-only.
    Write,
}

/// How the index data is assembled into primitives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveType {
    /// Every three indices form a triangle.
    Triangles,
}

/// The layout of each vertex in a buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum VertexLayout {
    /// [`SpriteVertex`]: position, uv, byte color.
    Sprite,
}

/// Parameters for creating a [`MeshBuffer`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferDescription {
    /// The expected update frequency.
    pub usage: BufferUsage,
    /// CPU access to locked regions.
    pub access: BufferAccess,
    /// The primitive assembled from the indices.
    pub primitive: PrimitiveType,
    /// The layout of each vertex.
    pub layout: VertexLayout,
    /// The number of vertices the buffer must hold.
    pub vertex_capacity: usize,
    /// The number of indices the buffer must hold.
    pub index_capacity: usize,
}

impl BufferDescription {
    /// Returns the description of a buffer holding `capacity` sprites. One
    /// spare sprite slot is reserved on top of the requested capacity.
    #[must_use]
    pub const fn sprite_batch(capacity: u32, usage: BufferUsage) -> Self {
        let slots = capacity as usize + 1;
        Self {
            usage,
            access: BufferAccess::Read,
            primitive: PrimitiveType::Triangles,
            layout: VertexLayout::Sprite,
            vertex_capacity: slots * VERTICES_PER_SPRITE,
            index_capacity: slots * INDICES_PER_SPRITE,
        }
    }
}

/// A GPU buffer holding sprite vertices and 16-bit indices.
///
/// Regions are written between a lock and the matching unlock. Prefer
/// [`write_vertices`](MeshBuffer::write_vertices) and
/// [`write_indices`](MeshBuffer::write_indices), which always unlock after
/// the write.
pub trait MeshBuffer {
    /// Binds the buffer for subsequent operations.
    fn bind(&mut self);
    /// Sets the number of vertices that will be drawn.
    fn set_vertex_count(&mut self, count: u32);
    /// Sets the number of indices that will be drawn.
    fn set_index_count(&mut self, count: u32);
    /// Returns the number of vertices that will be drawn.
    fn vertex_count(&self) -> u32;
    /// Returns the number of indices that will be drawn.
    fn index_count(&self) -> u32;
    /// Maps the whole vertex region for writing.
    fn lock_vertices(&mut self) -> &mut [SpriteVertex];
    /// Releases the vertex region mapped by `lock_vertices`.
    fn unlock_vertices(&mut self);
    /// Maps the whole index region for writing.
    fn lock_indices(&mut self) -> &mut [u16];
    /// Releases the index region mapped by `lock_indices`.
    fn unlock_indices(&mut self);

    /// Locks the vertex region, passes it to `write`, and unlocks it. The
    /// region is unlocked even if `write` panics.
    fn write_vertices<R, F: FnOnce(&mut [SpriteVertex]) -> R>(&mut self, write: F) -> R
    where
        Self: Sized,
    {
        let result = panic::catch_unwind(AssertUnwindSafe(|| write(self.lock_vertices())));
        self.unlock_vertices();
        result.unwrap_or_else(|payload| panic::resume_unwind(payload))
    }

    /// Locks the index region, passes it to `write`, and unlocks it. The
    /// region is unlocked even if `write` panics.
    fn write_indices<R, F: FnOnce(&mut [u16]) -> R>(&mut self, write: F) -> R
    where
        Self: Sized,
    {
        let result = panic::catch_unwind(AssertUnwindSafe(|| write(self.lock_indices())));
        self.unlock_indices();
        result.unwrap_or_else(|payload| panic::resume_unwind(payload))
    }
}
