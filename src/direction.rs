use crate::geometry::{Axis, Point, Side};

/// Whether the opposing anchor lies further along a side's outward direction
/// (`Positive`) or behind it (`Negative`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn is_positive(self) -> bool {
        matches!(self, Polarity::Positive)
    }
}

/// Bend candidates for one end of a connector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionPoint {
    /// Candidate aligned with the side's travel axis.
    pub point: Point,
    /// The complementary projection.
    pub other_point: Point,
    pub polarity: Polarity,
    /// Axis a turn path moves along first when this end decides it.
    pub truncate: Option<Axis>,
}

impl DirectionPoint {
    pub fn positive_axis(&self) -> Option<Axis> {
        match self.polarity {
            Polarity::Positive => self.truncate,
            Polarity::Negative => None,
        }
    }

    pub fn negative_axis(&self) -> Option<Axis> {
        match self.polarity {
            Polarity::Negative => self.truncate,
            Polarity::Positive => None,
        }
    }
}

pub fn resolve(main: Point, other: Point, side: Side) -> DirectionPoint {
    let (polarity, truncate) = match side {
        Side::Top if main.y > other.y => (Polarity::Positive, Axis::Y),
        Side::Top => (Polarity::Negative, Axis::X),
        Side::Bottom if main.y > other.y => (Polarity::Negative, Axis::X),
        Side::Bottom => (Polarity::Positive, Axis::Y),
        Side::Left if main.x > other.x => (Polarity::Positive, Axis::X),
        Side::Left => (Polarity::Negative, Axis::Y),
        Side::Right if main.x > other.x => (Polarity::Negative, Axis::Y),
        Side::Right => (Polarity::Positive, Axis::X),
    };

    let (point, other_point) = match side {
        Side::Top | Side::Bottom => (
            Point::new(main.x, other.y),
            Point::new(other.x, main.y),
        ),
        Side::Left | Side::Right => (
            Point::new(other.x, main.y),
            Point::new(main.x, other.y),
        ),
    };

    DirectionPoint {
        point,
        other_point,
        polarity,
        truncate: Some(truncate),
    }
}
