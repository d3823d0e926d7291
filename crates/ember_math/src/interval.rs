/// A closed range `[min, max]` of ray parameters.
///
/// Intersection routines receive the search window as an `Interval` and
/// shrink `max` as closer hits are found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Window starting at `min` and extending to infinity.
    pub fn from_min(min: f64) -> Self {
        Self::new(min, f64::INFINITY)
    }

    /// Same lower bound, new upper bound.
    #[inline]
    pub fn with_max(self, max: f64) -> Self {
        Self::new(self.min, max)
    }

    /// Inclusive on both ends. NaN is never contained.
    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    pub const EMPTY: Interval = Interval {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    pub const UNIVERSE: Interval = Interval {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };
}
