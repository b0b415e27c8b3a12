use tracing::instrument;

use crate::{
    buffer::{BufferDescription, BufferUsage, MeshBuffer},
    render::RenderSystem,
    sprite::Sprite,
    Error,
};

mod indices;
mod packer;
mod submit;

pub use self::{
    indices::{write_index_range, IndexSequence, LOCAL_INDICES},
    packer::{map_sprite, pack_sprites, remap_sprite},
    submit::submit,
};

/// The number of vertices each sprite occupies.
pub const VERTICES_PER_SPRITE: usize = 4;
/// The number of indices each sprite occupies: two triangles.
pub const INDICES_PER_SPRITE: usize = 6;
/// The largest capacity whose vertices can all be addressed by `u16`
/// indices, accounting for the spare slot every batch reserves.
pub const MAX_CAPACITY: u32 = (u16::MAX as u32 + 1) / VERTICES_PER_SPRITE as u32 - 1;

/// Many sprites packed into one buffer and drawn with a single draw call.
///
/// A batch whose buffer could not be created silently ignores every
/// operation.
pub struct SpriteBatch<R: RenderSystem> {
    buffer: Option<R::Buffer>,
    capacity: u32,
    tag: i32,
    indices: IndexSequence,
}

impl<R: RenderSystem> SpriteBatch<R> {
    /// Creates a batch able to hold `capacity` sprites, allocating its buffer
    /// from `system`. If the buffer can't be created the failure is logged
    /// and the batch will never draw anything.
    pub fn new(capacity: u32, system: &mut R, usage: BufferUsage) -> Self {
        let buffer = Self::allocate(capacity, system, usage)
            .map_err(|error| {
                tracing::warn!(%error, capacity, "sprite batch created without a buffer");
            })
            .ok();
        Self::with_buffer(buffer, capacity)
    }

    /// Creates a batch able to hold `capacity` sprites, returning an error if
    /// its buffer can't be created.
    pub fn try_new(capacity: u32, system: &mut R, usage: BufferUsage) -> crate::Result<Self> {
        let buffer = Self::allocate(capacity, system, usage)?;
        Ok(Self::with_buffer(Some(buffer), capacity))
    }

    fn allocate(capacity: u32, system: &mut R, usage: BufferUsage) -> crate::Result<R::Buffer> {
        if capacity > MAX_CAPACITY {
            return Err(Error::CapacityOverflow { capacity });
        }

        system.create_buffer(&BufferDescription::sprite_batch(capacity, usage))
    }

    const fn with_buffer(buffer: Option<R::Buffer>, capacity: u32) -> Self {
        Self {
            buffer,
            capacity,
            tag: 0,
            indices: IndexSequence::new(),
        }
    }

    /// Packs `sprites` into the buffer in order and makes sure indices exist
    /// for all of them. Sprite `i` occupies vertices `4*i..4*i+4`.
    ///
    /// # Panics
    ///
    /// Panics if `sprites` holds more sprites than the buffer has room for.
    #[instrument(level = "trace", skip(self, sprites), fields(sprites = sprites.len()))]
    pub fn build(&mut self, sprites: &[Sprite]) {
        let buffer = match self.buffer.as_mut() {
            Some(buffer) => buffer,
            None => return,
        };

        let sprite_count = sprites.len() as u32;
        buffer.bind();
        buffer.set_vertex_count(sprite_count * VERTICES_PER_SPRITE as u32);
        buffer.set_index_count(sprite_count * INDICES_PER_SPRITE as u32);
        buffer.write_vertices(|vertices| pack_sprites(vertices, sprites));

        self.indices.extend_to(buffer, sprite_count);
    }

    /// Replaces the vertices of the sprite at `index` with `sprite`, leaving
    /// every other sprite untouched. Useful for dynamic text or flickering
    /// effects in an already built batch.
    ///
    /// # Panics
    ///
    /// Panics if `index` is beyond the buffer's room.
    pub fn remap_sprite(&mut self, index: usize, sprite: &Sprite) {
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.bind();
            buffer.write_vertices(|vertices| remap_sprite(vertices, index, sprite));
        }
    }

    /// Makes sure indices exist for at least `sprite_count` sprites. Indices
    /// that were already written are never rewritten.
    ///
    /// # Panics
    ///
    /// Panics if `sprite_count` is beyond the buffer's room.
    pub fn build_indices_for(&mut self, sprite_count: u32) {
        if let Some(buffer) = self.buffer.as_mut() {
            self.indices.extend_to(buffer, sprite_count);
        }
    }

    /// Draws `stride` indices starting at `offset` with `material`. Nothing
    /// is drawn when `stride` is 0.
    #[instrument(level = "trace", skip(self, system, material))]
    pub fn render_range(
        &mut self,
        system: &mut R,
        material: &R::Material,
        offset: u32,
        stride: u32,
    ) {
        if let Some(buffer) = self.buffer.as_mut() {
            submit(system, buffer, material, offset, stride);
        }
    }

    /// Draws every index set by the last [`build`](Self::build) with
    /// `material`. Nothing is drawn when the batch is empty.
    #[instrument(level = "trace", skip(self, system, material))]
    pub fn render(&mut self, system: &mut R, material: &R::Material) {
        if let Some(buffer) = self.buffer.as_mut() {
            let count = buffer.index_count();
            submit(system, buffer, material, 0, count);
        }
    }

    /// Returns the number of sprites the batch was created to hold.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Returns the number of sprites whose indices have been written. Never
    /// decreases.
    #[must_use]
    pub const fn indices_built(&self) -> u32 {
        self.indices.built()
    }

    /// Returns the caller data associated with this batch, usually the layer
    /// it is drawn on.
    #[must_use]
    pub const fn tag(&self) -> i32 {
        self.tag
    }

    /// Sets the caller data associated with this batch.
    pub fn set_tag(&mut self, tag: i32) {
        self.tag = tag;
    }

    /// Returns the underlying buffer, if it was created.
    #[must_use]
    pub const fn buffer(&self) -> Option<&R::Buffer> {
        self.buffer.as_ref()
    }

    /// Returns true if the batch has a buffer and will draw.
    #[must_use]
    pub const fn is_allocated(&self) -> bool {
        self.buffer.is_some()
    }
}

impl<R: RenderSystem> std::fmt::Debug for SpriteBatch<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpriteBatch")
            .field("allocated", &self.is_allocated())
            .field("capacity", &self.capacity)
            .field("tag", &self.tag)
            .field("indices_built", &self.indices.built())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color::Color,
        headless::{DrawCall, HeadlessRenderSystem},
        math::{Box2D, Point},
        render::ShaderPass,
        sprite::{SpriteRotation, SpriteVertex},
    };

    fn sprite(seed: f32) -> Sprite {
        Sprite::from_box(
            Box2D::new(Point::new(seed, seed), Point::new(seed + 1., seed + 1.)),
            Box2D::new(euclid::Point2D::new(0., 0.), euclid::Point2D::new(1., 1.)),
            Color::WHITE,
            SpriteRotation::none(),
        )
    }

    fn sprites(count: usize) -> Vec<Sprite> {
        (0..count).map(|i| sprite(i as f32 * 10.)).collect()
    }

    fn batch(capacity: u32) -> (HeadlessRenderSystem, SpriteBatch<HeadlessRenderSystem>) {
        let mut system = HeadlessRenderSystem::default();
        let batch = SpriteBatch::new(capacity, &mut system, BufferUsage::Dynamic);
        (system, batch)
    }

    fn expected_indices(sprite_count: u16) -> Vec<u16> {
        let mut indices = Vec::new();
        for sprite in 0..sprite_count {
            let base = sprite * 4;
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
        }
        indices
    }

    #[test]
    fn max_capacity_fits_u16_indices() {
        let highest_vertex = (MAX_CAPACITY + 1) * VERTICES_PER_SPRITE as u32 - 1;
        assert_eq!(highest_vertex, u32::from(u16::MAX));
    }

    #[test]
    fn build_writes_indices_for_every_sprite() {
        let (_, mut batch) = batch(8);
        for count in [0, 1, 3, 8] {
            batch.build(&sprites(count));
            let buffer = batch.buffer().unwrap();
            assert_eq!(buffer.index_count(), 6 * count as u32);
            assert_eq!(buffer.vertex_count(), 4 * count as u32);
            assert_eq!(
                &buffer.indices()[..6 * count],
                expected_indices(count as u16).as_slice()
            );
        }
    }

    #[test]
    fn build_packs_sprites_in_order() {
        let (_, mut batch) = batch(4);
        let input = sprites(3);
        batch.build(&input);
        let vertices = batch.buffer().unwrap().vertices();
        for (index, sprite) in input.iter().enumerate() {
            assert_eq!(&vertices[index * 4..index * 4 + 4], sprite.vertices());
        }
    }

    #[test]
    fn index_watermark_never_decreases() {
        let (_, mut batch) = batch(16);
        let mut previous = 0;
        for count in [4, 2, 9, 9, 0, 12, 1] {
            batch.build(&sprites(count));
            assert!(batch.indices_built() >= previous);
            assert_eq!(batch.indices_built(), previous.max(count as u32));
            previous = batch.indices_built();
        }
    }

    #[test]
    fn indices_only_written_past_the_watermark() {
        let (_, mut batch) = batch(8);
        batch.build(&sprites(2));
        assert_eq!(batch.buffer().unwrap().index_locks(), 1);
        batch.build(&sprites(1));
        batch.build(&sprites(2));
        assert_eq!(batch.buffer().unwrap().index_locks(), 1);
        batch.build(&sprites(5));
        assert_eq!(batch.buffer().unwrap().index_locks(), 2);
        assert_eq!(
            &batch.buffer().unwrap().indices()[..30],
            expected_indices(5).as_slice()
        );
    }

    #[test]
    fn build_indices_without_vertices() {
        let (_, mut batch) = batch(8);
        batch.build_indices_for(6);
        assert_eq!(batch.indices_built(), 6);
        assert_eq!(
            &batch.buffer().unwrap().indices()[..36],
            expected_indices(6).as_slice()
        );
        batch.build_indices_for(3);
        assert_eq!(batch.indices_built(), 6);
    }

    #[test]
    fn remap_touches_only_one_sprite() {
        let (_, mut batch) = batch(4);
        batch.build(&sprites(4));
        let before = batch.buffer().unwrap().vertices().to_vec();

        let mut replacement = sprite(100.);
        replacement.set_color(Color::BLACK);
        batch.remap_sprite(2, &replacement);

        let after = batch.buffer().unwrap().vertices();
        assert_eq!(&after[8..12], replacement.vertices());
        assert_eq!(&after[..8], &before[..8]);
        assert_eq!(&after[12..], &before[12..]);
    }

    #[test]
    fn remap_past_the_end_leaves_buffer_unlocked() {
        let (_, mut batch) = batch(2);
        batch.build(&sprites(2));
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            batch.remap_sprite(3, &sprite(0.));
        }));
        assert!(result.is_err());
        assert!(!batch.buffer().unwrap().is_locked());

        // The buffer is still usable after the failed write.
        batch.remap_sprite(1, &sprite(50.));
        assert_eq!(
            &batch.buffer().unwrap().vertices()[4..8],
            sprite(50.).vertices()
        );
    }

    #[test]
    fn render_range_submits_one_draw() {
        let (mut system, mut batch) = batch(4);
        batch.build(&sprites(4));
        batch.render_range(&mut system, &7, 6, 12);

        assert_eq!(system.materials(), &[(7, ShaderPass::Ambient)]);
        assert_eq!(system.draw_calls().len(), 1);
        let DrawCall {
            offset,
            count,
            transform,
            ..
        } = system.draw_calls()[0];
        assert_eq!(offset, 6);
        assert_eq!(count, 12);
        assert_eq!(transform, crate::math::Transform::identity());
    }

    #[test]
    fn render_with_zero_stride_draws_nothing() {
        let (mut system, mut batch) = batch(4);
        batch.build(&sprites(4));
        batch.render_range(&mut system, &0, 0, 0);
        assert!(system.draw_calls().is_empty());
        assert!(system.materials().is_empty());
    }

    #[test]
    fn render_draws_whole_valid_range() {
        let (mut system, mut batch) = batch(4);
        batch.render(&mut system, &1);
        assert!(system.draw_calls().is_empty());

        batch.build(&sprites(3));
        batch.render(&mut system, &1);
        assert_eq!(system.draw_calls().len(), 1);
        assert_eq!(system.draw_calls()[0].offset, 0);
        assert_eq!(system.draw_calls()[0].count, 18);
    }

    #[test]
    fn failed_allocation_is_inert() {
        let mut system = HeadlessRenderSystem::default();
        system.fail_allocations(true);
        let mut batch = SpriteBatch::new(4, &mut system, BufferUsage::Static);
        assert!(!batch.is_allocated());

        batch.build(&sprites(2));
        batch.remap_sprite(0, &sprite(0.));
        batch.render(&mut system, &0);
        batch.render_range(&mut system, &0, 0, 6);
        assert_eq!(batch.indices_built(), 0);
        assert!(system.draw_calls().is_empty());

        assert!(matches!(
            SpriteBatch::try_new(4, &mut system, BufferUsage::Static),
            Err(Error::BufferCreation(_))
        ));
    }

    #[test]
    fn oversized_capacity_is_rejected() {
        let mut system = HeadlessRenderSystem::default();
        assert_eq!(
            SpriteBatch::try_new(MAX_CAPACITY + 1, &mut system, BufferUsage::Static).unwrap_err(),
            Error::CapacityOverflow {
                capacity: MAX_CAPACITY + 1
            }
        );
        assert!(SpriteBatch::try_new(MAX_CAPACITY, &mut system, BufferUsage::Static).is_ok());
    }

    #[test]
    #[should_panic]
    fn building_past_capacity_panics() {
        let (_, mut batch) = batch(2);
        // capacity + 1 slots exist, so this is the first count that overflows
        batch.build(&sprites(4));
    }

    #[test]
    fn tag_round_trips() {
        let (_, mut batch) = batch(1);
        assert_eq!(batch.tag(), 0);
        batch.set_tag(-3);
        assert_eq!(batch.tag(), -3);
    }

    #[test]
    fn buffer_sized_with_spare_slot() {
        let (_, batch) = batch(10);
        let buffer = batch.buffer().unwrap();
        assert_eq!(buffer.vertex_capacity(), 44);
        assert_eq!(buffer.index_capacity(), 66);
        assert_eq!(buffer.vertices(), &[SpriteVertex::default(); 44][..]);
    }
}
