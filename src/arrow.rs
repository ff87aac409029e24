use crate::geometry::{Point, Side};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowSize {
    /// Offset across the entry direction.
    pub short_edge: f64,
    /// Offset back along the entry direction.
    pub long_edge: f64,
}

impl Default for ArrowSize {
    fn default() -> Self {
        Self {
            short_edge: 5.0,
            long_edge: 7.0,
        }
    }
}

/// Terminal chevron drawn as `wings[0] -> tip -> wings[1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrowhead {
    pub tip: Point,
    pub wings: [Point; 2],
}

impl Arrowhead {
    pub fn points(&self) -> [Point; 3] {
        [self.wings[0], self.tip, self.wings[1]]
    }
}

pub fn arrowhead(tip: Point, entry: Side, size: ArrowSize) -> Arrowhead {
    let se = size.short_edge;
    let le = size.long_edge;
    let (first, second) = match entry {
        Side::Top => ((-se, -le), (se, -le)),
        Side::Right => ((le, -se), (le, se)),
        Side::Bottom => ((-se, le), (se, le)),
        Side::Left => ((-le, -se), (-le, se)),
    };
    Arrowhead {
        tip,
        wings: [
            Point::new(tip.x + first.0, tip.y + first.1),
            Point::new(tip.x + second.0, tip.y + second.1),
        ],
    }
}
