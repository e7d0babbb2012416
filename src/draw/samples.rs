use kurbo::Point;

/// Raw pointer samples of the stroke currently being drawn.
///
/// Owned by one controller and scoped to one stroke: `begin` clears it,
/// samples accumulate while the pointer moves, and the controller drops the
/// contents once the stroke is committed or cancelled.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleBuffer {
    points: Vec<Point>,
    min_distance_sq: f64,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples closer than `min_distance` to the previous one are dropped.
    pub fn with_min_distance(min_distance: f64) -> Self {
        let mut buffer = Self::default();
        buffer.set_min_distance(min_distance);
        buffer
    }

    pub fn set_min_distance(&mut self, min_distance: f64) {
        let d = if min_distance.is_finite() {
            min_distance.max(0.0)
        } else {
            0.0
        };
        self.min_distance_sq = d * d;
    }

    /// Starts a new stroke at `point`. Non-finite points are refused and
    /// leave the current samples untouched.
    pub fn begin(&mut self, point: Point) -> bool {
        if !point.is_finite() {
            return false;
        }
        self.points.clear();
        self.points.push(point);
        true
    }

    /// Returns whether the sample was kept.
    pub fn push(&mut self, point: Point) -> bool {
        if !should_append_point(self.points.last().copied(), point, self.min_distance_sq) {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

fn should_append_point(last: Option<Point>, point: Point, min_distance_sq: f64) -> bool {
    if !point.is_finite() {
        return false;
    }
    let Some(last) = last else {
        return true;
    };
    if min_distance_sq <= 0.0 {
        return true;
    }
    (point - last).hypot2() >= min_distance_sq
}
