use std::ops::{Index, IndexMut};

use bytemuck::{Pod, Zeroable};

use crate::{
    color::{Color, Rgba8},
    math::{rotate_around, Angle, Box2D, Point, Uv},
};

/// A single corner of a sprite as laid out in vertex memory.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    /// The position of the vertex. `z` is left for the caller's depth
    /// sorting and is 0 for quads built by this crate.
    pub position: [f32; 3],
    /// The normalized texture coordinate.
    pub uv: [f32; 2],
    /// The tint multiplied with the texture sample.
    pub color: Rgba8,
}

impl SpriteVertex {
    /// Returns a vertex at `position` sampling `uv`, tinted `color`.
    pub fn new(position: Point, uv: euclid::Point2D<f32, Uv>, color: Color) -> Self {
        Self {
            position: [position.x, position.y, 0.],
            uv: [uv.x, uv.y],
            color: color.into(),
        }
    }

    /// Returns the x/y position of this vertex.
    #[must_use]
    pub fn location(&self) -> Point {
        Point::new(self.position[0], self.position[1])
    }

    /// Rotates this vertex's position by `angle` around `origin`.
    #[must_use]
    pub fn rotate_by(mut self, angle: Option<Angle>, origin: Point) -> Self {
        if let Some(angle) = angle {
            let rotated = rotate_around(self.location(), angle, origin);
            self.position[0] = rotated.x;
            self.position[1] = rotated.y;
        }

        self
    }
}

/// Identifies one of the four vertices of a [`Sprite`]. The discriminant is
/// the vertex's slot within the sprite's 4-vertex block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VertexCorner {
    /// Slot 0.
    TopLeft = 0,
    /// Slot 1.
    BottomLeft = 1,
    /// Slot 2.
    TopRight = 2,
    /// Slot 3.
    BottomRight = 3,
}

impl VertexCorner {
    /// All corners, in slot order.
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::BottomLeft,
        Self::TopRight,
        Self::BottomRight,
    ];
}

/// A textured quad: four independently supplied vertices.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Sprite {
    vertices: [SpriteVertex; 4],
}

impl Sprite {
    /// Returns a sprite from vertices in slot order: top-left, bottom-left,
    /// top-right, bottom-right.
    #[must_use]
    pub const fn from_vertices(vertices: [SpriteVertex; 4]) -> Self {
        Self { vertices }
    }

    /// Returns an axis-aligned quad covering `destination`, sampling the
    /// normalized texture region `uv`, tinted `color`, and rotated by
    /// `rotation`.
    #[must_use]
    pub fn from_box(
        destination: Box2D,
        uv: Box2D<f32, Uv>,
        color: Color,
        rotation: SpriteRotation,
    ) -> Self {
        let origin = rotation.location.unwrap_or_else(|| destination.center());
        let corner = |x: f32, y: f32, u: f32, v: f32| {
            SpriteVertex::new(Point::new(x, y), euclid::Point2D::new(u, v), color)
                .rotate_by(rotation.angle, origin)
        };

        Self::from_vertices([
            corner(destination.min.x, destination.min.y, uv.min.x, uv.min.y),
            corner(destination.min.x, destination.max.y, uv.min.x, uv.max.y),
            corner(destination.max.x, destination.min.y, uv.max.x, uv.min.y),
            corner(destination.max.x, destination.max.y, uv.max.x, uv.max.y),
        ])
    }

    /// Returns the vertices in slot order.
    #[must_use]
    pub const fn vertices(&self) -> &[SpriteVertex; 4] {
        &self.vertices
    }

    /// Sets the tint of every vertex.
    pub fn set_color(&mut self, color: Color) {
        let color = Rgba8::from(color);
        for vertex in &mut self.vertices {
            vertex.color = color;
        }
    }
}

impl Index<VertexCorner> for Sprite {
    type Output = SpriteVertex;

    fn index(&self, corner: VertexCorner) -> &SpriteVertex {
        &self.vertices[corner as usize]
    }
}

impl IndexMut<VertexCorner> for Sprite {
    fn index_mut(&mut self, corner: VertexCorner) -> &mut SpriteVertex {
        &mut self.vertices[corner as usize]
    }
}

/// A rotation of a sprite.
#[derive(Copy, Clone, Debug, Default)]
#[must_use]
pub struct SpriteRotation {
    /// The angle to rotate around `location`.
    pub angle: Option<Angle>,
    /// The location to rotate the sprite around. If not specified, the center
    /// of the sprite is used.
    pub location: Option<Point>,
}

impl SpriteRotation {
    /// Returns a value that performs no rotation.
    pub const fn none() -> Self {
        Self {
            angle: None,
            location: None,
        }
    }

    /// Returns a rotation around the center of the sprite.
    pub const fn around_center(angle: Angle) -> Self {
        Self {
            angle: Some(angle),
            location: None,
        }
    }

    /// Returns a rotation around `location`.
    pub const fn around(angle: Angle, location: Point) -> Self {
        Self {
            angle: Some(angle),
            location: Some(location),
        }
    }
}
