use thiserror::Error;

/// Number of hand keypoints per request.
pub const LANDMARK_COUNT: usize = 21;

/// Coordinates per keypoint: (x, y).
pub const POINT_ARITY: usize = 2;

pub const WRIST: usize = 0;
pub const MIDDLE_FINGER_TIP: usize = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Shape violations of an incoming landmark list, reported in the order they
/// are checked: count first, then per-point arity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Expected exactly 21 landmarks, got {0}.")]
    Count(usize),

    #[error("Each landmark must have exactly 2 values (x, y); landmark {index} has {len}.")]
    Arity { index: usize, len: usize },
}

/// Exactly 21 ordered hand keypoints. Index 0 is the wrist and index 12 the
/// middle fingertip.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet([Point; LANDMARK_COUNT]);

impl LandmarkSet {
    pub fn new(points: [Point; LANDMARK_COUNT]) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Point; LANDMARK_COUNT] {
        &self.0
    }

    pub fn wrist(&self) -> Point {
        self.0[WRIST]
    }

    pub fn middle_finger_tip(&self) -> Point {
        self.0[MIDDLE_FINGER_TIP]
    }
}

impl TryFrom<Vec<Vec<f64>>> for LandmarkSet {
    type Error = ShapeError;

    fn try_from(raw: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        if raw.len() != LANDMARK_COUNT {
            return Err(ShapeError::Count(raw.len()));
        }

        let mut points = [Point::default(); LANDMARK_COUNT];
        for (index, (slot, values)) in points.iter_mut().zip(&raw).enumerate() {
            match values.as_slice() {
                &[x, y] => *slot = Point::new(x, y),
                other => {
                    return Err(ShapeError::Arity {
                        index,
                        len: other.len(),
                    })
                }
            }
        }

        Ok(Self(points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(count: usize) -> Vec<Vec<f64>> {
        (0..count).map(|i| vec![i as f64, (i * 2) as f64]).collect()
    }

    #[test]
    fn accepts_twenty_one_pairs() {
        let set = LandmarkSet::try_from(raw(21)).unwrap();
        assert_eq!(set.wrist(), Point::new(0.0, 0.0));
        assert_eq!(set.middle_finger_tip(), Point::new(12.0, 24.0));
        assert_eq!(set.points()[20], Point::new(20.0, 40.0));
    }

    #[test]
    fn rejects_wrong_count() {
        assert_eq!(LandmarkSet::try_from(raw(20)), Err(ShapeError::Count(20)));
        assert_eq!(LandmarkSet::try_from(raw(22)), Err(ShapeError::Count(22)));
        assert_eq!(LandmarkSet::try_from(Vec::new()), Err(ShapeError::Count(0)));
    }

    #[test]
    fn rejects_wrong_arity_at_first_offending_point() {
        let mut landmarks = raw(21);
        landmarks[4] = vec![0.1, 0.2, 0.3];
        landmarks[9] = vec![0.1];

        assert_eq!(
            LandmarkSet::try_from(landmarks),
            Err(ShapeError::Arity { index: 4, len: 3 })
        );
    }

    #[test]
    fn count_is_checked_before_arity() {
        let mut landmarks = raw(20);
        landmarks[0] = vec![1.0, 2.0, 3.0];
        assert_eq!(LandmarkSet::try_from(landmarks), Err(ShapeError::Count(20)));
    }

    #[test]
    fn messages_name_expected_shape() {
        assert!(ShapeError::Count(22).to_string().contains("21"));
        let arity = ShapeError::Arity { index: 0, len: 3 }.to_string();
        assert!(arity.contains("exactly 2 values"));
    }
}
