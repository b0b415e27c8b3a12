use crate::{
    buffer::{BufferDescription, MeshBuffer},
    math::Transform,
};

/// The shader pass a material is applied for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShaderPass {
    /// The base lighting pass. Sprites are only drawn in this pass.
    Ambient,
}

/// Creates buffers and issues draw calls.
pub trait RenderSystem {
    /// The buffer type this system allocates.
    type Buffer: MeshBuffer;
    /// The material type applied before drawing.
    type Material: ?Sized;

    /// Allocates a buffer matching `description`.
    fn create_buffer(&mut self, description: &BufferDescription) -> crate::Result<Self::Buffer>;

    /// Makes `material` current for `pass`.
    fn apply_material(&mut self, material: &Self::Material, pass: ShaderPass);

    /// Draws `count` indices of `buffer` starting at `offset`, transformed by
    /// `transform`.
    fn render_buffer(
        &mut self,
        buffer: &Self::Buffer,
        offset: u32,
        count: u32,
        transform: &Transform,
    );
}
