use crate::{
    buffer::MeshBuffer,
    math::Transform,
    render::{RenderSystem, ShaderPass},
};

/// Issues one draw call covering `count` indices of `buffer` starting at
/// `offset`. Returns false without touching `system` when `count` is 0.
pub fn submit<R: RenderSystem>(
    system: &mut R,
    buffer: &mut R::Buffer,
    material: &R::Material,
    offset: u32,
    count: u32,
) -> bool {
    if count == 0 {
        return false;
    }

    buffer.bind();
    system.apply_material(material, ShaderPass::Ambient);
    system.render_buffer(buffer, offset, count, &Transform::identity());
    true
}
