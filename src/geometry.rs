//! CPU-side geometry generation.
//!
//! [`RawGeometry`] holds vertex and index data before it is uploaded through a
//! [`Renderer`](crate::Renderer). The card shape is produced by
//! [`RawGeometry::rounded_box`].
//!
//! # Rounded boxes
//!
//! A rounded box starts as a unit cube whose six faces are subdivided into a
//! `2 * segments + 1` grid. Every grid vertex is then pushed onto the surface
//! of a smaller inner box (half-extents `size / 2 - radius`) and offset by
//! `radius` along a normal derived from its position on the grid. The centre
//! cells of each face stay flat; the outer cells wrap around the edges and
//! corners.
//!
//! ```
//! use glasscard::RawGeometry;
//!
//! let geometry = RawGeometry::rounded_box(3.5, 2.5, 0.25, 4, 0.05);
//! let size = geometry.size();
//! assert!((size.x - 3.5).abs() < 1e-4);
//! ```

use glam::Vec3;

use crate::mesh::Vertex3d;

/// Geometry data held on the CPU.
#[derive(Clone, Debug, Default)]
pub struct RawGeometry {
    pub vertices: Vec<Vertex3d>,
    pub indices: Vec<u32>,
}

/// One face of the unit cube: outward normal plus the two in-plane axes,
/// ordered so that `u × v == normal` (counter-clockwise from outside).
struct Face {
    normal: Vec3,
    u: Vec3,
    v: Vec3,
}

const FACES: [Face; 6] = [
    Face { normal: Vec3::X, u: Vec3::NEG_Z, v: Vec3::Y },
    Face { normal: Vec3::NEG_X, u: Vec3::Z, v: Vec3::Y },
    Face { normal: Vec3::Y, u: Vec3::X, v: Vec3::NEG_Z },
    Face { normal: Vec3::NEG_Y, u: Vec3::X, v: Vec3::Z },
    Face { normal: Vec3::Z, u: Vec3::X, v: Vec3::Y },
    Face { normal: Vec3::NEG_Z, u: Vec3::NEG_X, v: Vec3::Y },
];

impl RawGeometry {
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Builds a box of `width × height × depth` with rounded edges and corners.
    ///
    /// `segments` controls the smoothness of the rounding; each face ends up
    /// with `2 * segments + 1` subdivisions per side. `radius` is limited to
    /// half of the smallest dimension. With `segments == 0` the result is a
    /// plain box.
    pub fn rounded_box(width: f32, height: f32, depth: f32, segments: u32, radius: f32) -> Self {
        let divisions = segments * 2 + 1;
        let size = Vec3::new(width, height, depth);
        let mut geometry = Self::subdivided_cube(divisions);

        if divisions == 1 {
            for vertex in &mut geometry.vertices {
                vertex.position = (Vec3::from(vertex.position) * size).into();
            }
            return geometry;
        }

        let radius = radius.min(width / 2.0).min(height / 2.0).min(depth / 2.0);
        let inner = size / 2.0 - Vec3::splat(radius);
        let half_cell = 0.5 / divisions as f32;

        for vertex in &mut geometry.vertices {
            let p = Vec3::from(vertex.position);
            let sign = Vec3::new(sign(p.x), sign(p.y), sign(p.z));
            let normal = (p - sign * half_cell).normalize_or_zero();
            vertex.position = (inner * sign + normal * radius).into();
            vertex.normal = normal.into();
        }

        geometry
    }

    /// A unit cube centred at the origin with `divisions × divisions` quads
    /// per face. Faces do not share vertices.
    fn subdivided_cube(divisions: u32) -> Self {
        let per_side = divisions + 1;
        let mut vertices = Vec::with_capacity((6 * per_side * per_side) as usize);
        let mut indices = Vec::with_capacity((6 * divisions * divisions * 6) as usize);

        for face in &FACES {
            let base = vertices.len() as u32;

            for j in 0..per_side {
                let t = j as f32 / divisions as f32;
                for i in 0..per_side {
                    let s = i as f32 / divisions as f32;
                    let position = face.normal * 0.5 + face.u * (s - 0.5) + face.v * (t - 0.5);
                    vertices.push(Vertex3d::new(
                        position.into(),
                        face.normal.into(),
                        [s, 1.0 - t],
                    ));
                }
            }

            for j in 0..divisions {
                for i in 0..divisions {
                    let a = base + j * per_side + i;
                    let b = a + 1;
                    let c = a + per_side + 1;
                    let d = a + per_side;
                    indices.extend_from_slice(&[a, b, c, a, c, d]);
                }
            }
        }

        Self { vertices, indices }
    }

    /// Returns the axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.vertices.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), v| {
                let p = Vec3::from(v.position);
                (min.min(p), max.max(p))
            },
        )
    }

    /// Returns the extent of the bounding box.
    pub fn size(&self) -> Vec3 {
        let (min, max) = self.bounds();
        max - min
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Like `f32::signum`, but zero stays zero.
fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rounded_box_has_expected_topology() {
        let geom = RawGeometry::rounded_box(3.5, 2.5, 0.25, 4, 0.05);
        // 9 divisions per face side, 10 vertices per row.
        assert_eq!(geom.vertex_count(), 6 * 10 * 10);
        assert_eq!(geom.triangle_count(), 6 * 9 * 9 * 2);
        assert!(geom.indices.iter().all(|&i| (i as usize) < geom.vertex_count()));
    }

    #[test]
    fn rounded_box_matches_requested_dimensions() {
        let geom = RawGeometry::rounded_box(3.5, 2.5, 0.25, 4, 0.05);
        let (min, max) = geom.bounds();
        assert_relative_eq!(max.x - min.x, 3.5, epsilon = 1e-4);
        assert_relative_eq!(max.y - min.y, 2.5, epsilon = 1e-4);
        assert_relative_eq!(max.z - min.z, 0.25, epsilon = 1e-4);
        assert_relative_eq!((min + max).length(), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn normals_are_unit_length() {
        let geom = RawGeometry::rounded_box(2.0, 1.0, 0.5, 4, 0.2);
        for v in &geom.vertices {
            assert_relative_eq!(Vec3::from(v.normal).length(), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn face_centres_stay_flat() {
        let geom = RawGeometry::rounded_box(2.0, 2.0, 2.0, 4, 0.5);
        // Vertices lying on the +Z plane must point straight out.
        let front: Vec<_> = geom
            .vertices
            .iter()
            .filter(|v| (v.position[2] - 1.0).abs() < 1e-5)
            .collect();
        assert!(!front.is_empty());
        for v in front {
            assert_relative_eq!(v.normal[2], 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn oversized_radius_is_limited_by_smallest_dimension() {
        let geom = RawGeometry::rounded_box(2.0, 2.0, 0.2, 4, 5.0);
        let size = geom.size();
        assert_relative_eq!(size.x, 2.0, epsilon = 1e-4);
        assert_relative_eq!(size.z, 0.2, epsilon = 1e-4);
    }

    #[test]
    fn zero_segments_builds_a_plain_box() {
        let geom = RawGeometry::rounded_box(4.0, 2.0, 1.0, 0, 0.3);
        assert_eq!(geom.vertex_count(), 24);
        assert_eq!(geom.triangle_count(), 12);
        let (min, max) = geom.bounds();
        assert_eq!(min, Vec3::new(-2.0, -1.0, -0.5));
        assert_eq!(max, Vec3::new(2.0, 1.0, 0.5));
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        let geom = RawGeometry::rounded_box(1.0, 1.0, 1.0, 0, 0.0);
        for tri in geom.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(geom.vertices[i as usize].position));
            let face_normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(face_normal.dot(centroid) > 0.0);
        }
    }
}
