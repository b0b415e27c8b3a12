use super::VERTICES_PER_SPRITE;
use crate::sprite::{Sprite, SpriteVertex};

/// Copies `sprite`'s vertices into the first four slots of `destination`.
pub fn map_sprite(destination: &mut [SpriteVertex], sprite: &Sprite) {
    destination[..VERTICES_PER_SPRITE].copy_from_slice(sprite.vertices());
}

/// Overwrites the four vertices belonging to the sprite at `index`.
pub fn remap_sprite(destination: &mut [SpriteVertex], index: usize, sprite: &Sprite) {
    let start = index * VERTICES_PER_SPRITE;
    map_sprite(&mut destination[start..start + VERTICES_PER_SPRITE], sprite);
}

/// Writes `sprites` into consecutive four vertex slots of `destination`,
/// preserving their order.
///
/// # Panics
///
/// Panics if `destination` is shorter than `4 * sprites.len()`.
pub fn pack_sprites(destination: &mut [SpriteVertex], sprites: &[Sprite]) {
    for (index, sprite) in sprites.iter().enumerate() {
        remap_sprite(destination, index, sprite);
    }
}
