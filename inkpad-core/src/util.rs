//! Utility types, used throughout the crate.

/// A float in the closed range `[0, 1]`. Used for pressures and opacities.
// Because of the preconditions invalidating many bitpatterns, this is not Pod.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, serde::Serialize)]
#[serde(into = "f64")]
#[repr(transparent)]
pub struct Unit(f64);
impl Unit {
    pub const ZERO: Self = Self(0.0);
    pub const HALF: Self = Self(0.5);
    pub const ONE: Self = Self(1.0);
    /// Wrap a value, failing if it is not finite or lies outside `[0, 1]`.
    pub fn new(val: f64) -> Result<Self, UnitError> {
        if !val.is_finite() {
            Err(UnitError::NotFinite)
        } else if !(0.0..=1.0).contains(&val) {
            Err(UnitError::OutOfRange)
        } else {
            Ok(Self(val))
        }
    }
    /// Clamp a finite value into range. `None` if the value is NaN or infinite.
    #[must_use]
    pub fn saturating(val: f64) -> Option<Self> {
        val.is_finite().then(|| Self(val.clamp(0.0, 1.0)))
    }
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }
}
impl Default for Unit {
    fn default() -> Self {
        Self::ONE
    }
}
impl TryFrom<f64> for Unit {
    type Error = UnitError;
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
impl From<Unit> for f64 {
    fn from(value: Unit) -> Self {
        value.get()
    }
}
impl<'de> serde::Deserialize<'de> for Unit {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let val = f64::deserialize(deserializer)?;
        Self::new(val).map_err(serde::de::Error::custom)
    }
}
// Never NaN, so PartialEq can act like Eq.
impl Eq for Unit {}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitError {
    #[error("not finite")]
    NotFinite,
    #[error("outside of [0, 1]")]
    OutOfRange,
}

/// Squared euclidean distance between two logical positions.
#[must_use]
pub fn distance_sq(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx.mul_add(dx, dy * dy)
}
/// Midpoint between two logical positions.
#[must_use]
pub fn midpoint(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [(a[0] + b[0]) * 0.5, (a[1] + b[1]) * 0.5]
}

/// An axis-aligned rectangle in logical units. `min` is always less than or equal to `max`.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Rect {
    pub min: [f64; 2],
    pub max: [f64; 2],
}
impl Rect {
    /// Create the rectangle spanning two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: [f64; 2], b: [f64; 2]) -> Self {
        Self {
            min: [a[0].min(b[0]), a[1].min(b[1])],
            max: [a[0].max(b[0]), a[1].max(b[1])],
        }
    }
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }
    /// Grow the rectangle to contain `point`.
    #[must_use = "returns a new rect without modifying `self`"]
    pub fn union_point(self, point: [f64; 2]) -> Self {
        Self {
            min: [self.min[0].min(point[0]), self.min[1].min(point[1])],
            max: [self.max[0].max(point[0]), self.max[1].max(point[1])],
        }
    }
    /// Expand every edge outward by `amount`.
    #[must_use = "returns a new rect without modifying `self`"]
    pub fn inflate(self, amount: f64) -> Self {
        Self {
            min: [self.min[0] - amount, self.min[1] - amount],
            max: [self.max[0] + amount, self.max[1] + amount],
        }
    }
    /// Inclusive overlap test, touching edges count as intersecting.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min[0] <= other.max[0]
            && other.min[0] <= self.max[0]
            && self.min[1] <= other.max[1]
            && other.min[1] <= self.max[1]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn unit_rejects_bad_values() {
        assert_eq!(Unit::new(f64::NAN), Err(UnitError::NotFinite));
        assert_eq!(Unit::new(1.5), Err(UnitError::OutOfRange));
        assert_eq!(Unit::new(0.25).map(Unit::get), Ok(0.25));
    }
    #[test]
    fn unit_saturates() {
        assert_eq!(Unit::saturating(-3.0), Some(Unit::ZERO));
        assert_eq!(Unit::saturating(7.0), Some(Unit::ONE));
        assert_eq!(Unit::saturating(f64::INFINITY), None);
    }
    #[test]
    fn rect_from_any_corners() {
        let rect = Rect::from_corners([10.0, 2.0], [4.0, 8.0]);
        assert_eq!(rect.min, [4.0, 2.0]);
        assert_eq!(rect.max, [10.0, 8.0]);
        assert!(!rect.is_empty());
        assert!(Rect::from_corners([1.0, 1.0], [1.0, 5.0]).is_empty());
    }
    #[test]
    fn rect_intersection() {
        let a = Rect::from_corners([0.0, 0.0], [10.0, 10.0]);
        let touching = Rect::from_corners([10.0, 10.0], [20.0, 20.0]);
        let apart = Rect::from_corners([10.5, 0.0], [20.0, 20.0]);
        assert!(a.intersects(&touching));
        assert!(!a.intersects(&apart));
        assert!(a.inflate(1.0).intersects(&apart));
    }
}
