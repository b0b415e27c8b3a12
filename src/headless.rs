use crate::{
    buffer::{BufferDescription, MeshBuffer},
    math::Transform,
    render::{RenderSystem, ShaderPass},
    sprite::SpriteVertex,
    Error,
};

/// Identifies a material in a [`HeadlessRenderSystem`].
pub type MaterialId = u32;

/// A [`MeshBuffer`] backed by plain memory.
#[derive(Debug, Clone)]
pub struct MemoryBuffer {
    id: u64,
    description: BufferDescription,
    vertices: Vec<SpriteVertex>,
    indices: Vec<u16>,
    vertex_count: u32,
    index_count: u32,
    vertices_locked: bool,
    indices_locked: bool,
    binds: usize,
    vertex_locks: usize,
    index_locks: usize,
}

impl MemoryBuffer {
    /// Allocates zeroed memory for `description`.
    #[must_use]
    pub fn new(id: u64, description: BufferDescription) -> Self {
        Self {
            id,
            vertices: vec![SpriteVertex::default(); description.vertex_capacity],
            indices: vec![0; description.index_capacity],
            description,
            vertex_count: 0,
            index_count: 0,
            vertices_locked: false,
            indices_locked: false,
            binds: 0,
            vertex_locks: 0,
            index_locks: 0,
        }
    }

    /// Returns the id the render system assigned this buffer.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the description this buffer was created from.
    #[must_use]
    pub const fn description(&self) -> &BufferDescription {
        &self.description
    }

    /// Returns the whole vertex region.
    #[must_use]
    pub fn vertices(&self) -> &[SpriteVertex] {
        &self.vertices
    }

    /// Returns the whole index region.
    #[must_use]
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Returns the vertex region as raw bytes, as it would be uploaded.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Returns the number of vertices the buffer holds.
    #[must_use]
    pub fn vertex_capacity(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of indices the buffer holds.
    #[must_use]
    pub fn index_capacity(&self) -> usize {
        self.indices.len()
    }

    /// Returns how many times the buffer has been bound.
    #[must_use]
    pub const fn binds(&self) -> usize {
        self.binds
    }

    /// Returns how many times the vertex region has been locked.
    #[must_use]
    pub const fn vertex_locks(&self) -> usize {
        self.vertex_locks
    }

    /// Returns how many times the index region has been locked.
    #[must_use]
    pub const fn index_locks(&self) -> usize {
        self.index_locks
    }

    /// Returns true while either region is locked.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.vertices_locked || self.indices_locked
    }
}

impl MeshBuffer for MemoryBuffer {
    fn bind(&mut self) {
        self.binds += 1;
    }

    fn set_vertex_count(&mut self, count: u32) {
        self.vertex_count = count;
    }

    fn set_index_count(&mut self, count: u32) {
        self.index_count = count;
    }

    fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    fn index_count(&self) -> u32 {
        self.index_count
    }

    fn lock_vertices(&mut self) -> &mut [SpriteVertex] {
        debug_assert!(!self.vertices_locked, "vertex region locked twice");
        self.vertices_locked = true;
        self.vertex_locks += 1;
        &mut self.vertices
    }

    fn unlock_vertices(&mut self) {
        debug_assert!(self.vertices_locked, "vertex region wasn't locked");
        self.vertices_locked = false;
    }

    fn lock_indices(&mut self) -> &mut [u16] {
        debug_assert!(!self.indices_locked, "index region locked twice");
        self.indices_locked = true;
        self.index_locks += 1;
        &mut self.indices
    }

    fn unlock_indices(&mut self) {
        debug_assert!(self.indices_locked, "index region wasn't locked");
        self.indices_locked = false;
    }
}

/// A draw call recorded by a [`HeadlessRenderSystem`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawCall {
    /// The id of the buffer drawn.
    pub buffer: u64,
    /// The material applied when the call was issued.
    pub material: Option<(MaterialId, ShaderPass)>,
    /// The first index drawn.
    pub offset: u32,
    /// The number of indices drawn.
    pub count: u32,
    /// The transform the buffer was drawn with.
    pub transform: Transform,
}

/// A [`RenderSystem`] that allocates [`MemoryBuffer`]s and records what would
/// have been drawn instead of drawing it.
#[derive(Debug, Default)]
pub struct HeadlessRenderSystem {
    next_buffer: u64,
    fail_allocations: bool,
    current_material: Option<(MaterialId, ShaderPass)>,
    materials: Vec<(MaterialId, ShaderPass)>,
    draw_calls: Vec<DrawCall>,
}

impl HeadlessRenderSystem {
    /// When `fail` is true every following allocation returns
    /// [`Error::BufferCreation`].
    pub fn fail_allocations(&mut self, fail: bool) {
        self.fail_allocations = fail;
    }

    /// Returns every material application since the last
    /// [`end_frame`](Self::end_frame).
    #[must_use]
    pub fn materials(&self) -> &[(MaterialId, ShaderPass)] {
        &self.materials
    }

    /// Returns every draw call since the last [`end_frame`](Self::end_frame).
    #[must_use]
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draw_calls
    }

    /// Returns the number of triangles drawn since the last
    /// [`end_frame`](Self::end_frame).
    #[must_use]
    pub fn triangles_drawn(&self) -> u32 {
        self.draw_calls.iter().map(|call| call.count / 3).sum()
    }

    /// Clears the recorded calls, logging the frame's totals.
    pub fn end_frame(&mut self) {
        tracing::debug!(
            draw_calls = self.draw_calls.len(),
            triangles = self.triangles_drawn(),
            "headless frame finished"
        );
        self.materials.clear();
        self.draw_calls.clear();
        self.current_material = None;
    }
}

impl RenderSystem for HeadlessRenderSystem {
    type Buffer = MemoryBuffer;
    type Material = MaterialId;

    fn create_buffer(&mut self, description: &BufferDescription) -> crate::Result<MemoryBuffer> {
        if self.fail_allocations {
            return Err(Error::BufferCreation(String::from(
                "headless allocations are disabled",
            )));
        }

        let id = self.next_buffer;
        self.next_buffer += 1;
        tracing::trace!(
            id,
            vertices = description.vertex_capacity,
            indices = description.index_capacity,
            "allocated memory buffer"
        );
        Ok(MemoryBuffer::new(id, description.clone()))
    }

    fn apply_material(&mut self, material: &MaterialId, pass: ShaderPass) {
        self.current_material = Some((*material, pass));
        self.materials.push((*material, pass));
    }

    fn render_buffer(
        &mut self,
        buffer: &MemoryBuffer,
        offset: u32,
        count: u32,
        transform: &Transform,
    ) {
        debug_assert!(!buffer.is_locked(), "drawing a locked buffer");
        if u64::from(offset) + u64::from(count) > buffer.index_capacity() as u64 {
            tracing::warn!(
                offset,
                count,
                capacity = buffer.index_capacity(),
                "draw call reads past the end of the index region"
            );
        }

        self.draw_calls.push(DrawCall {
            buffer: buffer.id(),
            material: self.current_material,
            offset,
            count,
            transform: *transform,
        });
    }
}
