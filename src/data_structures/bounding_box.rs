//! Axis-aligned bounding boxes.
//!
//! [`BoundingBox`] always holds a valid extent (`min <= max` on every axis).
//! The "no vertex seen yet" state is not a box at all; [`BoundsAccumulator`]
//! models it as `None` instead of seeding with a zero vector or infinities, so a
//! model far away from the origin still gets a tight box.

use cgmath::{EuclideanSpace, Point3, Vector3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    /// Box with both corners at `point`.
    pub fn from_point(point: Point3<f32>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Builds a box from two corners, sorting each axis so the invariant holds
    /// regardless of the order the corners are given in.
    pub fn new(a: Point3<f32>, b: Point3<f32>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Widens the box component-wise so it contains `point`.
    pub fn expand(&mut self, point: Point3<f32>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn center(&self) -> Point3<f32> {
        self.min.midpoint(self.max)
    }

    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn contains(&self, point: Point3<f32>) -> bool {
        (self.min.x..=self.max.x).contains(&point.x)
            && (self.min.y..=self.max.y).contains(&point.y)
            && (self.min.z..=self.max.z).contains(&point.z)
    }
}

/// Folds vertex positions into a [`BoundingBox`].
///
/// The first observed position initialises both corners, every later one widens
/// the box. An accumulator that never saw a position finishes as `None`.
/// Positions must be finite, the importer rejects NaN and infinite ones.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundsAccumulator {
    bounds: Option<BoundingBox>,
}

impl BoundsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, position: [f32; 3]) {
        let point = Point3::from(position);
        match &mut self.bounds {
            Some(bounds) => bounds.expand(point),
            None => self.bounds = Some(BoundingBox::from_point(point)),
        }
    }

    pub fn finish(self) -> Option<BoundingBox> {
        self.bounds
    }
}

impl Extend<[f32; 3]> for BoundsAccumulator {
    fn extend<I: IntoIterator<Item = [f32; 3]>>(&mut self, positions: I) {
        positions.into_iter().for_each(|p| self.observe(p));
    }
}

impl FromIterator<[f32; 3]> for BoundsAccumulator {
    fn from_iter<I: IntoIterator<Item = [f32; 3]>>(positions: I) -> Self {
        let mut acc = Self::new();
        acc.extend(positions);
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_accumulator_has_no_box() {
        assert_eq!(BoundsAccumulator::new().finish(), None);
    }

    #[test]
    fn first_vertex_seeds_both_corners() {
        let acc: BoundsAccumulator = [[5.0, 6.0, 7.0]].into_iter().collect();
        let bounds = acc.finish().unwrap();
        assert_eq!(bounds.min, Point3::new(5.0, 6.0, 7.0));
        assert_eq!(bounds.max, Point3::new(5.0, 6.0, 7.0));
    }

    #[test]
    fn off_origin_model_does_not_include_origin() {
        let acc: BoundsAccumulator = [[10.0, 10.0, 10.0], [12.0, 11.0, 15.0]]
            .into_iter()
            .collect();
        let bounds = acc.finish().unwrap();
        assert_eq!(bounds.min, Point3::new(10.0, 10.0, 10.0));
        assert_eq!(bounds.max, Point3::new(12.0, 11.0, 15.0));
        assert!(!bounds.contains(Point3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn triangle_bounds() {
        let acc: BoundsAccumulator = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
            .into_iter()
            .collect();
        let bounds = acc.finish().unwrap();
        assert_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 0.0));
        assert_eq!(bounds.center(), Point3::new(0.5, 0.5, 0.0));
        assert_eq!(bounds.extent(), Vector3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn new_sorts_corners() {
        let bounds = BoundingBox::new(Point3::new(1.0, -1.0, 3.0), Point3::new(-1.0, 1.0, 2.0));
        assert_eq!(bounds.min, Point3::new(-1.0, -1.0, 2.0));
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 3.0));
    }

    // Deterministic pseudo-random sequences, checked against the box invariants.
    #[test]
    fn corners_are_ordered_and_attained() {
        let mut seed: u32 = 0x9e37_79b9;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            (seed % 20_000) as f32 / 100.0 - 100.0
        };
        for len in 1..40 {
            let positions: Vec<[f32; 3]> = (0..len).map(|_| [next(), next(), next()]).collect();
            let bounds = positions
                .iter()
                .copied()
                .collect::<BoundsAccumulator>()
                .finish()
                .unwrap();
            for axis in 0..3 {
                assert!(bounds.min[axis] <= bounds.max[axis]);
                assert!(positions.iter().any(|p| p[axis] == bounds.min[axis]));
                assert!(positions.iter().any(|p| p[axis] == bounds.max[axis]));
            }
            for p in &positions {
                assert!(bounds.contains(Point3::from(*p)));
            }
        }
    }
}
