//! Packs many independently transformed quad sprites into one shared
//! vertex/index buffer so they can be drawn with a single draw call.

#![forbid(unsafe_code)]
#![warn(
    clippy::cargo,
    missing_docs,
    clippy::nursery,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms,
)]
#![cfg_attr(doc, deny(rustdoc::all))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
)]

/// The sprite batch and the pieces it is assembled from.
pub mod batch;
/// The GPU buffer abstraction a batch writes into.
pub mod buffer;
mod color;
mod error;
/// An in-memory render system for offscreen use and tests.
pub mod headless;
/// Math types for 2d geometry.
pub mod math;
/// The render system abstraction a batch submits draw calls to.
pub mod render;
/// Sprite vertices and quads.
pub mod sprite;

// Re-exports
pub use euclid;
pub use palette;

pub use self::{
    batch::SpriteBatch,
    color::{Color, Rgba8},
    error::Error,
};

/// A collection of commonly used exports provided by this crate.
pub mod prelude {
    pub use super::{
        batch::{SpriteBatch, INDICES_PER_SPRITE, VERTICES_PER_SPRITE},
        buffer::{
            BufferAccess, BufferDescription, BufferUsage, MeshBuffer, PrimitiveType, VertexLayout,
        },
        headless::{HeadlessRenderSystem, MemoryBuffer},
        math::{Angle, Box2D, Pixels, Point, Size, Transform},
        render::{RenderSystem, ShaderPass},
        sprite::{Sprite, SpriteRotation, SpriteVertex, VertexCorner},
        Color, Error, Rgba8,
    };
}

/// Alias for [`std::result::Result`] where the error type is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
