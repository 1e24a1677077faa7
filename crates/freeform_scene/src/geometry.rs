//! Mesh geometry descriptions and their bounds

use core::f32::consts::TAU;

use glam::Vec3;

/// Bounding sphere in the geometry's local space
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    #[inline]
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere centred on the points' bounding box, just large enough to
    /// contain every point.
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(&first) = points.first() else {
            return Self::new(Vec3::ZERO, 0.0);
        };

        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        let center = (min + max) * 0.5;

        let radius_sq = points
            .iter()
            .map(|&p| p.distance_squared(center))
            .fold(0.0_f32, f32::max);

        Self::new(center, radius_sq.sqrt())
    }

    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.distance_squared(self.center) <= self.radius * self.radius
    }
}

/// Shape of a mesh node
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Geometry {
    /// UV sphere around the origin
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    /// Torus in the XY plane, swept from angle 0 to `arc` around +Z
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
        arc: f32,
    },
    /// Axis-aligned box around the origin
    Cuboid { half_extents: Vec3 },
    /// Arbitrary vertex cloud
    Points(Vec<Vec3>),
}

impl Geometry {
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self::Sphere {
            radius,
            width_segments: width_segments.max(3),
            height_segments: height_segments.max(2),
        }
    }

    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32, arc: f32) -> Self {
        Self::Torus {
            radius,
            tube,
            radial_segments: radial_segments.max(1),
            tubular_segments: tubular_segments.max(1),
            arc,
        }
    }

    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Self::Cuboid {
            half_extents: Vec3::new(width, height, depth) * 0.5,
        }
    }

    /// Bounding sphere in local space
    pub fn bounding_sphere(&self) -> BoundingSphere {
        match self {
            Geometry::Sphere { radius, .. } => BoundingSphere::new(Vec3::ZERO, *radius),
            Geometry::Cuboid { half_extents } => BoundingSphere::new(Vec3::ZERO, half_extents.length()),
            Geometry::Torus { .. } => BoundingSphere::from_points(&self.vertices()),
            Geometry::Points(points) => BoundingSphere::from_points(points),
        }
    }

    /// Vertex positions of the tessellated shape
    pub fn vertices(&self) -> Vec<Vec3> {
        match self {
            Geometry::Sphere {
                radius,
                width_segments,
                height_segments,
            } => {
                let mut out = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
                for iy in 0..=*height_segments {
                    let theta = iy as f32 / *height_segments as f32 * core::f32::consts::PI;
                    for ix in 0..=*width_segments {
                        let phi = ix as f32 / *width_segments as f32 * TAU;
                        out.push(Vec3::new(
                            -radius * phi.cos() * theta.sin(),
                            radius * theta.cos(),
                            radius * phi.sin() * theta.sin(),
                        ));
                    }
                }
                out
            }
            Geometry::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
                arc,
            } => {
                let mut out = Vec::with_capacity(((radial_segments + 1) * (tubular_segments + 1)) as usize);
                for j in 0..=*radial_segments {
                    let v = j as f32 / *radial_segments as f32 * TAU;
                    for i in 0..=*tubular_segments {
                        let u = i as f32 / *tubular_segments as f32 * arc;
                        let ring = radius + tube * v.cos();
                        out.push(Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin()));
                    }
                }
                out
            }
            Geometry::Cuboid { half_extents } => {
                let h = *half_extents;
                (0..8)
                    .map(|i| {
                        Vec3::new(
                            if i & 1 == 0 { -h.x } else { h.x },
                            if i & 2 == 0 { -h.y } else { h.y },
                            if i & 4 == 0 { -h.z } else { h.z },
                        )
                    })
                    .collect()
            }
            Geometry::Points(points) => points.clone(),
        }
    }
}
