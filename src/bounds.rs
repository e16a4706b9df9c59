use crate::distance::Point;

/// Axis-aligned bounding box of a set of points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    #[must_use]
    pub fn point(point: Point) -> Bounds {
        Bounds {
            min: point,
            max: point,
        }
    }

    /// Returns `None` for an empty iterator.
    pub fn from_points<'a, I>(points: I) -> Option<Bounds>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut points = points.into_iter();
        let mut bounds = Bounds::point(*points.next()?);
        for point in points {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: &Point) {
        for axis in 0..2 {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
    }

    #[must_use]
    pub fn extent(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }

    /// Lower bound on the distance from `point` to anything inside the box.
    #[must_use]
    pub fn min_distance(&self, point: &Point) -> f64 {
        let mut sum = 0.0;
        for axis in 0..2 {
            let gap = if point[axis] < self.min[axis] {
                self.min[axis] - point[axis]
            } else if point[axis] > self.max[axis] {
                point[axis] - self.max[axis]
            } else {
                0.0
            };
            sum += gap * gap;
        }
        sum.sqrt()
    }
}
