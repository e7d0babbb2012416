use crate::draw::model::PathCommand;
use kurbo::Point;

pub const DEFAULT_SMOOTHING_DIVISOR: f64 = 3.0;

/// Catmull-Rom style smoothing over a four point sliding window.
///
/// Each new sample produces one cubic that ends on the sample *before* it,
/// because the arriving tangent needs the point that follows. `finish`
/// closes the remaining gap when the pointer lifts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSmoother {
    divisor: f64,
}

impl Default for CurveSmoother {
    fn default() -> Self {
        Self {
            divisor: DEFAULT_SMOOTHING_DIVISOR,
        }
    }
}

impl CurveSmoother {
    /// Larger divisors give shorter tangents and straighter curves.
    pub fn new(divisor: f64) -> Self {
        let divisor = if divisor.is_finite() {
            divisor.max(1.0)
        } else {
            DEFAULT_SMOOTHING_DIVISOR
        };
        Self { divisor }
    }

    pub fn divisor(&self) -> f64 {
        self.divisor
    }

    /// Commands for the first sample: a move plus a dot so taps stay visible.
    pub fn start(&self, first: Point) -> [PathCommand; 2] {
        [PathCommand::MoveTo(first), PathCommand::Dot(first)]
    }

    /// Curve for the newest sample in `samples`; `None` before the second sample.
    pub fn next_command(&self, samples: &[Point]) -> Option<PathCommand> {
        if samples.len() < 2 {
            return None;
        }
        Some(self.curve_to(samples, samples.len() - 2))
    }

    /// Final curve from the last path point to the newest sample.
    pub fn finish(&self, samples: &[Point]) -> Option<PathCommand> {
        if samples.len() < 2 {
            return None;
        }
        Some(self.curve_to(samples, samples.len() - 1))
    }

    fn curve_to(&self, samples: &[Point], target: usize) -> PathCommand {
        let at = |i: usize| samples[i.min(samples.len() - 1)];
        let to = at(target);
        let prev = at(target.saturating_sub(1));
        let before = at(target.saturating_sub(2));
        let next = at(target + 1);

        PathCommand::CubicTo {
            ctrl1: prev + (to - before) / self.divisor,
            ctrl2: to - (next - prev) / self.divisor,
            to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn first_sample_emits_move_and_dot() {
        let smoother = CurveSmoother::default();
        let p = Point::new(3.0, 4.0);
        assert_eq!(
            smoother.start(p),
            [PathCommand::MoveTo(p), PathCommand::Dot(p)]
        );
        assert_eq!(smoother.next_command(&[p]), None);
        assert_eq!(smoother.finish(&[p]), None);
    }

    #[test]
    fn two_samples_substitute_earliest_point() {
        let smoother = CurveSmoother::default();
        let samples = pts(&[(0.0, 0.0), (9.0, 0.0)]);
        assert_eq!(
            smoother.next_command(&samples),
            Some(PathCommand::CubicTo {
                ctrl1: Point::new(0.0, 0.0),
                ctrl2: Point::new(-3.0, 0.0),
                to: Point::new(0.0, 0.0),
            })
        );
    }

    #[test]
    fn full_window_uses_neighbour_tangents() {
        let smoother = CurveSmoother::default();
        let samples = pts(&[(0.0, 0.0), (3.0, 0.0), (6.0, 3.0), (9.0, 3.0)]);
        // P1=(0,0) P2=(3,0) P3=(6,3) P4=(9,3)
        assert_eq!(
            smoother.next_command(&samples),
            Some(PathCommand::CubicTo {
                ctrl1: Point::new(5.0, 1.0),
                ctrl2: Point::new(4.0, 2.0),
                to: Point::new(6.0, 3.0),
            })
        );
    }

    #[test]
    fn finish_reaches_newest_sample() {
        let smoother = CurveSmoother::default();
        let samples = pts(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let Some(PathCommand::CubicTo { ctrl1, ctrl2, to }) = smoother.finish(&samples) else {
            panic!("expected a closing curve");
        };
        assert_eq!(to, Point::new(20.0, 0.0));
        assert!((ctrl1.x - 16.666_666).abs() < 1e-3);
        assert!((ctrl2.x - 16.666_666).abs() < 1e-3);
        assert_eq!(ctrl1.y, 0.0);
    }

    #[test]
    fn divisor_is_clamped() {
        assert_eq!(CurveSmoother::new(0.2).divisor(), 1.0);
        assert_eq!(
            CurveSmoother::new(f64::NAN).divisor(),
            DEFAULT_SMOOTHING_DIVISOR
        );
    }
}
