use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Built-in primitive shapes, sized like the stock constructors they mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveShape {
    Box,
    Sphere,
    Cylinder,
    Torus,
    Plane,
}

impl PrimitiveShape {
    pub const ALL: [PrimitiveShape; 5] = [
        PrimitiveShape::Box,
        PrimitiveShape::Sphere,
        PrimitiveShape::Cylinder,
        PrimitiveShape::Torus,
        PrimitiveShape::Plane,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PrimitiveShape::Box => "Box",
            PrimitiveShape::Sphere => "Sphere",
            PrimitiveShape::Cylinder => "Cylinder",
            PrimitiveShape::Torus => "Torus",
            PrimitiveShape::Plane => "Plane",
        }
    }

    /// Constructor call used by the code snippet export.
    pub fn constructor(self) -> &'static str {
        match self {
            PrimitiveShape::Box => "BoxGeometry()",
            PrimitiveShape::Sphere => "SphereGeometry(0.5, 32, 32)",
            PrimitiveShape::Cylinder => "CylinderGeometry(0.5, 0.5, 1, 32)",
            PrimitiveShape::Torus => "TorusGeometry(0.5, 0.2, 16, 32)",
            PrimitiveShape::Plane => "PlaneGeometry(1, 1)",
        }
    }

    pub fn local_bounds(self) -> Aabb {
        match self {
            PrimitiveShape::Box | PrimitiveShape::Cylinder => {
                Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5))
            }
            PrimitiveShape::Sphere => Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
            PrimitiveShape::Torus => Aabb::new(Vec3::new(-0.7, -0.7, -0.2), Vec3::new(0.7, 0.7, 0.2)),
            PrimitiveShape::Plane => Aabb::new(Vec3::new(-0.5, -0.5, 0.0), Vec3::new(0.5, 0.5, 0.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Primitive(PrimitiveShape),
    /// Mesh data owned by an imported asset; only its bounds are tracked here.
    Imported { bounds: Aabb, primitive_count: usize },
    /// Flat XZ grid of the given size, centered on the origin.
    Grid { size: f32, divisions: u32 },
}

impl Geometry {
    pub fn shape(&self) -> Option<PrimitiveShape> {
        match self {
            Geometry::Primitive(shape) => Some(*shape),
            _ => None,
        }
    }

    pub fn local_bounds(&self) -> Aabb {
        match self {
            Geometry::Primitive(shape) => shape.local_bounds(),
            Geometry::Imported { bounds, .. } => *bounds,
            Geometry::Grid { size, .. } => {
                let half = size * 0.5;
                Aabb::new(Vec3::new(-half, 0.0, -half), Vec3::new(half, 0.0, half))
            }
        }
    }

    /// Ray parameter of the nearest hit, with the ray already in local space.
    ///
    /// Spheres and planes are exact; everything else is tested against its
    /// local bounding box.
    pub fn intersect_local(&self, ray: &Ray) -> Option<f32> {
        match self {
            Geometry::Primitive(PrimitiveShape::Sphere) => intersect_sphere(ray, 0.5),
            Geometry::Primitive(PrimitiveShape::Plane) => intersect_unit_plane(ray),
            _ => self.local_bounds().intersect(ray),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(point1: Vec3, point2: Vec3) -> Self {
        Self {
            min: point1.min(point2),
            max: point1.max(point2),
        }
    }

    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let mut out = Aabb::empty();
        for corner in self.corners() {
            out.extend(matrix.transform_point3(corner));
        }
        out
    }

    /// Slab test. Returns 0 when the origin is inside the box.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        if self.is_empty() {
            return None;
        }
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            if direction.abs() < 1e-9 {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / direction;
            let mut t0 = (self.min[axis] - origin) * inv;
            let mut t1 = (self.max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        if t_max < 0.0 {
            return None;
        }
        Some(t_min.max(0.0))
    }
}

/// Camera rays are built with a unit direction. Local-space copies made by
/// [`Ray::transformed`] are not renormalized, so a hit parameter found in
/// local space is still a world distance along the original ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    pub fn transformed(&self, matrix: &Mat4) -> Ray {
        Ray {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }
}

fn intersect_sphere(ray: &Ray, radius: f32) -> Option<f32> {
    let a = ray.direction.length_squared();
    if a < 1e-12 {
        return None;
    }
    let b = 2.0 * ray.origin.dot(ray.direction);
    let c = ray.origin.length_squared() - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let near = (-b - root) / (2.0 * a);
    let far = (-b + root) / (2.0 * a);
    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        Some(0.0)
    } else {
        None
    }
}

fn intersect_unit_plane(ray: &Ray) -> Option<f32> {
    if ray.direction.z.abs() < 1e-9 {
        return None;
    }
    let t = -ray.origin.z / ray.direction.z;
    if t < 0.0 {
        return None;
    }
    let point = ray.at(t);
    (point.x.abs() <= 0.5 && point.y.abs() <= 0.5).then_some(t)
}
