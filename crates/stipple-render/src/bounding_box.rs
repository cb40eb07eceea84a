use glam::{Mat4, Vec3};

/// Axis-aligned bounding box of the unmodified splat means, in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub const ZERO: Self = Self {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::ZERO;
        };
        let mut min = first;
        let mut max = first;
        for p in iter {
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Radius of the bounding sphere: half the space diagonal.
    pub fn radius(&self) -> f32 {
        (self.max - self.min).length() * 0.5
    }

    /// The axis-aligned box containing this box after `transform`.
    pub fn transformed(&self, transform: Mat4) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        Self::from_points(corners.iter().map(|&c| transform.transform_point3(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::BoundingBox;
    use assert_approx_eq::assert_approx_eq;
    use glam::{Mat4, Vec3};

    #[test]
    fn center_and_radius() {
        let bb = BoundingBox::from_points([Vec3::splat(-1.0), Vec3::splat(1.0)]);
        assert_eq!(bb.center(), Vec3::ZERO);
        assert_approx_eq!(bb.radius(), 3.0f32.sqrt());
    }

    #[test]
    fn empty_points_is_zero() {
        assert_eq!(BoundingBox::from_points([]), BoundingBox::ZERO);
    }

    #[test]
    fn transformed_stays_axis_aligned() {
        let bb = BoundingBox::from_min_max(Vec3::ZERO, Vec3::ONE);
        let rotated = bb.transformed(Mat4::from_rotation_z(std::f32::consts::FRAC_PI_4));
        // A unit cube rotated 45 degrees around z spans sqrt(2) in x.
        assert_approx_eq!(rotated.max.x - rotated.min.x, 2.0f32.sqrt(), 1e-5);
        assert_approx_eq!(rotated.max.z - rotated.min.z, 1.0, 1e-5);
    }
}
