//! Table-driven routing.
//!
//! The pattern router does not look at polarity at all. It classifies where
//! the target's extended anchor lies relative to the source's (one of the
//! four diagonal corners) and looks the bend pattern up by exit side, entry
//! side and corner.

use serde::{Deserialize, Serialize};

use crate::arrow::ArrowSize;
use crate::geometry::{Point, Side};
use crate::routing::{PathShape, Route, RouteRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Router {
    #[default]
    Polarity,
    Pattern,
}

/// Order of axis moves between the two extended anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Horizontal, then vertical.
    Xy,
    /// Vertical, then horizontal.
    Yx,
    /// Horizontal to the midpoint column, vertical, horizontal.
    Xyx,
    /// Vertical to the midpoint row, horizontal, vertical.
    Yxy,
}

impl Pattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::Xy => "xy",
            Pattern::Yx => "yx",
            Pattern::Xyx => "xyx",
            Pattern::Yxy => "yxy",
        }
    }

    pub fn points(self, start: Point, end: Point) -> Vec<Point> {
        match self {
            Pattern::Xy => vec![start, Point::new(end.x, start.y), end],
            Pattern::Yx => vec![start, Point::new(start.x, end.y), end],
            Pattern::Xyx => {
                let mid_x = start.x + (end.x - start.x) / 2.0;
                vec![
                    start,
                    Point::new(mid_x, start.y),
                    Point::new(mid_x, end.y),
                    end,
                ]
            }
            Pattern::Yxy => {
                let mid_y = start.y + (end.y - start.y) / 2.0;
                vec![
                    start,
                    Point::new(start.x, mid_y),
                    Point::new(end.x, mid_y),
                    end,
                ]
            }
        }
    }
}

/// Diagonal position of the target relative to the source (screen y grows
/// downward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    RightTop,
    RightBottom,
    LeftBottom,
    LeftTop,
}

impl Corner {
    /// `None` when the two points share a row or column.
    pub fn of(from: Point, to: Point) -> Option<Corner> {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx == 0.0 || dy == 0.0 {
            return None;
        }
        Some(match (dx > 0.0, dy > 0.0) {
            (true, false) => Corner::RightTop,
            (true, true) => Corner::RightBottom,
            (false, true) => Corner::LeftBottom,
            (false, false) => Corner::LeftTop,
        })
    }

    fn index(self) -> usize {
        match self {
            Corner::RightTop => 0,
            Corner::RightBottom => 1,
            Corner::LeftBottom => 2,
            Corner::LeftTop => 3,
        }
    }
}

use Pattern::{Xy, Xyx, Yx, Yxy};

// [exit][entry][corner]; sides ordered top, right, bottom, left and corners
// ordered rt, rb, lb, lt.
const PATTERNS: [[[Pattern; 4]; 4]; 4] = [
    [
        [Yx, Xy, Xy, Yx],
        [Xy, Xyx, Xyx, Yx],
        [Xy, Xyx, Xyx, Xy],
        [Xy, Xy, Xy, Xy],
    ],
    [
        [Yx, Xy, Yx, Yx],
        [Xy, Xy, Yx, Yx],
        [Xy, Yx, Yx, Yx],
        [Yx, Yx, Yxy, Yxy],
    ],
    [
        [Xyx, Xy, Xy, Xyx],
        [Xy, Xy, Yx, Xy],
        [Xy, Yx, Yx, Xy],
        [Xy, Xy, Xy, Xy],
    ],
    [
        [Xy, Xy, Yx, Xy],
        [Yxy, Yxy, Yx, Yx],
        [Yx, Yx, Yx, Yx],
        [Yx, Yx, Xy, Xy],
    ],
];

pub fn lookup(exit: Side, entry: Side, corner: Corner) -> Pattern {
    PATTERNS[exit.index()][entry.index()][corner.index()]
}

pub fn route_by_pattern(request: &RouteRequest, arrow_size: ArrowSize) -> Route {
    let start = request.source_extended;
    let end = request.target_extended;

    match Corner::of(start, end) {
        Some(corner) => {
            let pattern = lookup(request.exit, request.entry, corner);
            log::debug!(
                "pattern {} for {}-{} towards {:?}",
                pattern.as_str(),
                request.exit,
                request.entry,
                corner
            );
            Route::assemble(
                request,
                PathShape::Pattern(pattern),
                pattern.points(start, end),
                arrow_size,
            )
        }
        None => Route::assemble(request, PathShape::Direct, vec![start, end], arrow_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::LinkType;

    fn request(start: Point, end: Point, exit: Side, entry: Side) -> RouteRequest {
        RouteRequest {
            source: start,
            source_extended: start,
            target: end,
            target_extended: end,
            exit,
            entry,
            link_type: LinkType::Normal,
            inflection: None,
        }
    }

    #[test]
    fn corner_classification() {
        let origin = Point::new(0.0, 0.0);
        assert_eq!(Corner::of(origin, Point::new(5.0, -5.0)), Some(Corner::RightTop));
        assert_eq!(Corner::of(origin, Point::new(5.0, 5.0)), Some(Corner::RightBottom));
        assert_eq!(Corner::of(origin, Point::new(-5.0, 5.0)), Some(Corner::LeftBottom));
        assert_eq!(Corner::of(origin, Point::new(-5.0, -5.0)), Some(Corner::LeftTop));
        assert_eq!(Corner::of(origin, Point::new(0.0, 5.0)), None);
        assert_eq!(Corner::of(origin, Point::new(5.0, 0.0)), None);
    }

    #[test]
    fn table_spot_checks() {
        assert_eq!(lookup(Side::Right, Side::Left, Corner::LeftBottom), Pattern::Yxy);
        assert_eq!(lookup(Side::Left, Side::Right, Corner::RightTop), Pattern::Yxy);
        assert_eq!(lookup(Side::Top, Side::Bottom, Corner::RightBottom), Pattern::Xyx);
        assert_eq!(lookup(Side::Bottom, Side::Top, Corner::LeftTop), Pattern::Xyx);
        assert_eq!(lookup(Side::Right, Side::Top, Corner::RightBottom), Pattern::Xy);
        assert_eq!(lookup(Side::Left, Side::Bottom, Corner::RightTop), Pattern::Yx);
    }

    #[test]
    fn right_to_top_towards_lower_right_bends_once() {
        let req = request(
            Point::new(0.0, 0.0),
            Point::new(100.0, 60.0),
            Side::Right,
            Side::Top,
        );
        let route = route_by_pattern(&req, ArrowSize::default());
        assert_eq!(route.shape, PathShape::Pattern(Pattern::Xy));
        assert_eq!(
            route.points,
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 60.0)
            ]
        );
    }

    #[test]
    fn midpoint_patterns_split_the_gap() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(100.0, 60.0);
        assert_eq!(
            Pattern::Xyx.points(start, end),
            vec![start, Point::new(50.0, 0.0), Point::new(50.0, 60.0), end]
        );
        assert_eq!(
            Pattern::Yxy.points(start, end),
            vec![start, Point::new(0.0, 30.0), Point::new(100.0, 30.0), end]
        );
    }

    #[test]
    fn aligned_anchors_have_no_table_entry() {
        let req = request(
            Point::new(0.0, 40.0),
            Point::new(100.0, 40.0),
            Side::Right,
            Side::Left,
        );
        let route = route_by_pattern(&req, ArrowSize::default());
        assert_eq!(route.shape, PathShape::Direct);
        assert_eq!(route.points, vec![Point::new(0.0, 40.0), Point::new(100.0, 40.0)]);
    }

    #[test]
    fn every_entry_stays_orthogonal() {
        let start = Point::new(0.0, 0.0);
        let ends = [
            Point::new(80.0, -40.0),
            Point::new(80.0, 40.0),
            Point::new(-80.0, 40.0),
            Point::new(-80.0, -40.0),
        ];
        for exit in Side::ALL {
            for entry in Side::ALL {
                for end in ends {
                    let route = route_by_pattern(&request(start, end, exit, entry), ArrowSize::default());
                    for pair in route.points.windows(2) {
                        assert!(pair[0].is_axis_aligned_with(pair[1]));
                    }
                }
            }
        }
    }
}
