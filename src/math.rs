/// The unit sprite positions are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pixels;

/// The unit of normalized texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Uv;

/// An angle, in radians.
pub type Angle = euclid::Angle<f32>;
/// A 2d point.
pub type Point<T = f32, Unit = Pixels> = euclid::Point2D<T, Unit>;
/// A 2d size.
pub type Size<T = f32, Unit = Pixels> = euclid::Size2D<T, Unit>;
/// An axis-aligned box described by its minimum and maximum points.
pub type Box2D<T = f32, Unit = Pixels> = euclid::Box2D<T, Unit>;
/// The transform handed to the render system with each draw call.
pub type Transform = euclid::Transform3D<f32, Pixels, Pixels>;

/// Rotates `point` by `angle` around `origin`.
#[must_use]
pub fn rotate_around(point: Point, angle: Angle, origin: Point) -> Point {
    let relative = point - origin;
    let rotated = euclid::Rotation2D::<f32, Pixels, Pixels>::new(angle).transform_vector(relative);
    origin + rotated
}
