//! Orthogonal connector routing.
//!
//! A connector leaves its source through the exit side's extended anchor and
//! enters its target through the entry side's extended anchor. Between the two
//! the engine draws either a straight segment, a single-bend "neat" path or a
//! double-bend "turn" path. The choice is a small decision table over the link
//! type, the polarity of both ends and whether both ends propose the same bend
//! point.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arrow::{ArrowSize, Arrowhead, arrowhead};
use crate::direction::{DirectionPoint, Polarity, resolve};
use crate::geometry::{Axis, Point, Side};
use crate::path::{PathBuilder, SvgPath};
use crate::pattern::Pattern;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkType {
    Normal,
    #[default]
    SourceBeam,
    TargetBeam,
}

impl LinkType {
    pub const ALL: [LinkType; 3] = [LinkType::Normal, LinkType::SourceBeam, LinkType::TargetBeam];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Normal => "normal",
            LinkType::SourceBeam => "sourceBeam",
            LinkType::TargetBeam => "targetBeam",
        }
    }
}

/// End whose candidate wins when both could supply a neat corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Source,
    Target,
}

impl LinkType {
    pub fn priority(self) -> Priority {
        match self {
            LinkType::TargetBeam => Priority::Source,
            LinkType::Normal | LinkType::SourceBeam => Priority::Target,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolarityPair {
    BothPositive,
    BothNegative,
    SourceOnlyPositive,
    TargetOnlyPositive,
}

impl PolarityPair {
    pub const ALL: [PolarityPair; 4] = [
        PolarityPair::BothPositive,
        PolarityPair::BothNegative,
        PolarityPair::SourceOnlyPositive,
        PolarityPair::TargetOnlyPositive,
    ];

    pub fn of(source: Polarity, target: Polarity) -> Self {
        match (source, target) {
            (Polarity::Positive, Polarity::Positive) => PolarityPair::BothPositive,
            (Polarity::Negative, Polarity::Negative) => PolarityPair::BothNegative,
            (Polarity::Positive, Polarity::Negative) => PolarityPair::SourceOnlyPositive,
            (Polarity::Negative, Polarity::Positive) => PolarityPair::TargetOnlyPositive,
        }
    }

    pub fn agrees(self) -> bool {
        matches!(self, PolarityPair::BothPositive | PolarityPair::BothNegative)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bend {
    Neat,
    Turn,
}

/// Shape decision for a connector whose extended anchors are not aligned.
pub fn decide(link_type: LinkType, pair: PolarityPair, same_point: bool) -> Bend {
    match link_type {
        LinkType::Normal => match (pair.agrees(), same_point) {
            (false, true) => Bend::Turn,
            (false, false) => Bend::Neat,
            (true, true) => Bend::Neat,
            (true, false) => Bend::Turn,
        },
        LinkType::SourceBeam | LinkType::TargetBeam => match pair {
            PolarityPair::BothNegative => Bend::Turn,
            PolarityPair::BothPositive
            | PolarityPair::SourceOnlyPositive
            | PolarityPair::TargetOnlyPositive => Bend::Neat,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathShape {
    /// Extended anchors share a row or column.
    Straight,
    Neat { corner: Point },
    Turn { axis: Axis, through: Point },
    Pattern(Pattern),
    /// No pattern applies; the extended anchors are joined directly.
    Direct,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouteError {
    #[error("turn path between {source_point:?} and {target_point:?} has no truncation axis")]
    TurnAxisUndetermined {
        source_point: Point,
        target_point: Point,
    },
}

/// Anchors and sides of one connector, as cached on the link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub source: Point,
    pub source_extended: Point,
    pub target: Point,
    pub target_extended: Point,
    pub exit: Side,
    pub entry: Side,
    pub link_type: LinkType,
    pub inflection: Option<Point>,
}

impl RouteRequest {
    pub fn center_point(&self) -> Point {
        self.source_extended.midpoint(self.target_extended)
    }

    pub fn turn_point(&self) -> Point {
        self.inflection.unwrap_or_else(|| self.center_point())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub shape: PathShape,
    /// From the source's extended anchor to the target's extended anchor.
    pub points: Vec<Point>,
    pub source_stub: [Point; 2],
    pub target_stub: [Point; 2],
    pub arrow: Arrowhead,
}

impl Route {
    pub(crate) fn assemble(
        request: &RouteRequest,
        shape: PathShape,
        points: Vec<Point>,
        arrow_size: ArrowSize,
    ) -> Self {
        Route {
            shape,
            points,
            source_stub: [request.source_extended, request.source],
            target_stub: [request.target_extended, request.target],
            arrow: arrowhead(request.target, request.entry, arrow_size),
        }
    }

    pub fn write_to<P: PathBuilder + ?Sized>(&self, path: &mut P) {
        path.polyline(&self.points);
        path.polyline(&self.source_stub);
        path.polyline(&self.target_stub);
        path.polyline(&self.arrow.points());
    }

    pub fn to_svg_path(&self) -> String {
        let mut path = SvgPath::new();
        self.write_to(&mut path);
        path.finish()
    }

    pub fn bend_count(&self) -> usize {
        self.points.len().saturating_sub(2)
    }
}

pub fn route(request: &RouteRequest, arrow_size: ArrowSize) -> Result<Route, RouteError> {
    let start = request.source_extended;
    let end = request.target_extended;

    if start.is_axis_aligned_with(end) {
        return Ok(Route::assemble(
            request,
            PathShape::Straight,
            vec![start, end],
            arrow_size,
        ));
    }

    let source_dp = resolve(start, end, request.exit);
    let target_dp = resolve(end, start, request.entry);
    route_resolved(request, &source_dp, &target_dp, arrow_size)
}

/// Route a non-aligned connector from already resolved direction points.
pub fn route_resolved(
    request: &RouteRequest,
    source_dp: &DirectionPoint,
    target_dp: &DirectionPoint,
    arrow_size: ArrowSize,
) -> Result<Route, RouteError> {
    let start = request.source_extended;
    let end = request.target_extended;
    let pair = PolarityPair::of(source_dp.polarity, target_dp.polarity);
    let same_point = source_dp.point == target_dp.point;
    let bend = decide(request.link_type, pair, same_point);

    log::debug!(
        "routing {}-{} ({}) as {:?}: {:?}, same point {}",
        request.exit,
        request.entry,
        request.link_type.as_str(),
        bend,
        pair,
        same_point
    );

    match bend {
        Bend::Neat => {
            let corner = neat_corner(request.link_type, source_dp, target_dp);
            Ok(Route::assemble(
                request,
                PathShape::Neat { corner },
                vec![start, corner, end],
                arrow_size,
            ))
        }
        Bend::Turn => {
            let axis = turn_axis(source_dp, target_dp).ok_or(
                RouteError::TurnAxisUndetermined {
                    source_point: start,
                    target_point: end,
                },
            )?;
            let through = request.turn_point();
            Ok(Route::assemble(
                request,
                PathShape::Turn { axis, through },
                turn_points(start, end, axis, through).to_vec(),
                arrow_size,
            ))
        }
    }
}

pub fn neat_corner(link_type: LinkType, source: &DirectionPoint, target: &DirectionPoint) -> Point {
    if source.polarity != target.polarity && source.point == target.point {
        return source.other_point;
    }

    let (first, second) = match link_type.priority() {
        Priority::Target => (target, source),
        Priority::Source => (source, target),
    };

    if first.polarity.is_positive() {
        first.point
    } else if second.polarity.is_positive() {
        second.point
    } else {
        second.other_point
    }
}

pub fn turn_axis(source: &DirectionPoint, target: &DirectionPoint) -> Option<Axis> {
    match PolarityPair::of(source.polarity, target.polarity) {
        PolarityPair::BothNegative => source.negative_axis(),
        PolarityPair::BothPositive | PolarityPair::SourceOnlyPositive => source.positive_axis(),
        PolarityPair::TargetOnlyPositive => target.positive_axis(),
    }
}

pub fn turn_points(start: Point, end: Point, axis: Axis, through: Point) -> [Point; 4] {
    match axis {
        Axis::X => [
            start,
            Point::new(through.x, start.y),
            Point::new(through.x, end.y),
            end,
        ],
        Axis::Y => [
            start,
            Point::new(start.x, through.y),
            Point::new(end.x, through.y),
            end,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Anchors;

    fn request(
        source_center: Point,
        target_center: Point,
        exit: Side,
        entry: Side,
        link_type: LinkType,
    ) -> RouteRequest {
        let source = Anchors::compute(source_center, 60.0, 50.0, 12.0);
        let target = Anchors::compute(target_center, 60.0, 50.0, 12.0);
        RouteRequest {
            source: source.base(exit),
            source_extended: source.extended(exit),
            target: target.base(entry),
            target_extended: target.extended(entry),
            exit,
            entry,
            link_type,
            inflection: None,
        }
    }

    fn dp(point: Point, other_point: Point, polarity: Polarity, truncate: Axis) -> DirectionPoint {
        DirectionPoint {
            point,
            other_point,
            polarity,
            truncate: Some(truncate),
        }
    }

    #[test]
    fn normal_decision_table() {
        use PolarityPair::*;
        let cases = [
            (SourceOnlyPositive, true, Bend::Turn),
            (TargetOnlyPositive, true, Bend::Turn),
            (SourceOnlyPositive, false, Bend::Neat),
            (TargetOnlyPositive, false, Bend::Neat),
            (BothPositive, true, Bend::Neat),
            (BothNegative, true, Bend::Neat),
            (BothPositive, false, Bend::Turn),
            (BothNegative, false, Bend::Turn),
        ];
        for (pair, same, expected) in cases {
            assert_eq!(decide(LinkType::Normal, pair, same), expected, "{pair:?} {same}");
        }
    }

    #[test]
    fn beam_decision_only_turns_when_both_negative() {
        for link_type in [LinkType::SourceBeam, LinkType::TargetBeam] {
            for pair in PolarityPair::ALL {
                for same in [true, false] {
                    let expected = if pair == PolarityPair::BothNegative {
                        Bend::Turn
                    } else {
                        Bend::Neat
                    };
                    assert_eq!(decide(link_type, pair, same), expected);
                }
            }
        }
    }

    #[test]
    fn aligned_anchors_route_straight() {
        let req = request(
            Point::new(50.0, 130.0),
            Point::new(150.0, 130.0),
            Side::Right,
            Side::Left,
            LinkType::Normal,
        );
        let route = route(&req, ArrowSize::default()).unwrap();
        assert_eq!(route.shape, PathShape::Straight);
        assert_eq!(route.points, vec![Point::new(92.0, 130.0), Point::new(108.0, 130.0)]);
        assert_eq!(route.bend_count(), 0);
    }

    #[test]
    fn straight_route_serializes_stubs_and_arrow() {
        let req = request(
            Point::new(50.0, 130.0),
            Point::new(150.0, 130.0),
            Side::Right,
            Side::Left,
            LinkType::SourceBeam,
        );
        let route = route(&req, ArrowSize::default()).unwrap();
        assert_eq!(
            route.to_svg_path(),
            "M92,130L108,130M92,130L80,130M108,130L120,130M113,125L120,130L113,135"
        );
    }

    #[test]
    fn beam_link_bends_once_at_target_row() {
        // Target sits up and to the right; exit right, enter left.
        let req = request(
            Point::new(50.0, 130.0),
            Point::new(250.0, 50.0),
            Side::Right,
            Side::Left,
            LinkType::SourceBeam,
        );
        let route = route(&req, ArrowSize::default()).unwrap();
        // Source sees the target further right (positive); target sees the
        // source further left (positive). Target priority puts the corner
        // above the source stub, on the target's row.
        assert_eq!(
            route.shape,
            PathShape::Neat {
                corner: Point::new(92.0, 50.0)
            }
        );
        assert_eq!(route.points.len(), 3);
    }

    #[test]
    fn target_beam_prefers_the_source_candidate() {
        let req = request(
            Point::new(50.0, 130.0),
            Point::new(250.0, 50.0),
            Side::Right,
            Side::Left,
            LinkType::TargetBeam,
        );
        let route = route(&req, ArrowSize::default()).unwrap();
        assert_eq!(
            route.shape,
            PathShape::Neat {
                corner: Point::new(208.0, 130.0)
            }
        );
    }

    #[test]
    fn normal_link_turns_through_center_when_both_positive() {
        let req = request(
            Point::new(50.0, 130.0),
            Point::new(250.0, 50.0),
            Side::Right,
            Side::Left,
            LinkType::Normal,
        );
        let route = route(&req, ArrowSize::default()).unwrap();
        let center = Point::new(150.0, 90.0);
        assert_eq!(
            route.shape,
            PathShape::Turn {
                axis: Axis::X,
                through: center
            }
        );
        assert_eq!(
            route.points,
            vec![
                Point::new(92.0, 130.0),
                Point::new(150.0, 130.0),
                Point::new(150.0, 50.0),
                Point::new(208.0, 50.0),
            ]
        );
    }

    #[test]
    fn inflection_point_overrides_center() {
        let mut req = request(
            Point::new(50.0, 130.0),
            Point::new(250.0, 50.0),
            Side::Right,
            Side::Left,
            LinkType::Normal,
        );
        req.inflection = Some(Point::new(120.0, 0.0));
        let route = route(&req, ArrowSize::default()).unwrap();
        assert_eq!(route.points[1], Point::new(120.0, 130.0));
        assert_eq!(route.points[2], Point::new(120.0, 50.0));
    }

    #[test]
    fn beam_link_turns_when_both_ends_face_away() {
        // Exit left towards a target on the right, enter right from its right.
        let req = request(
            Point::new(50.0, 130.0),
            Point::new(250.0, 50.0),
            Side::Left,
            Side::Right,
            LinkType::SourceBeam,
        );
        let route = route(&req, ArrowSize::default()).unwrap();
        // Source negative on a left exit truncates along y first.
        assert_eq!(
            route.shape,
            PathShape::Turn {
                axis: Axis::Y,
                through: Point::new(150.0, 90.0)
            }
        );
        assert_eq!(
            route.points,
            vec![
                Point::new(8.0, 130.0),
                Point::new(8.0, 90.0),
                Point::new(292.0, 90.0),
                Point::new(292.0, 50.0),
            ]
        );
    }

    #[test]
    fn mixed_polarity_same_point_uses_source_alternate() {
        let shared = Point::new(10.0, 10.0);
        let source = dp(shared, Point::new(1.0, 2.0), Polarity::Positive, Axis::X);
        let target = dp(shared, Point::new(3.0, 4.0), Polarity::Negative, Axis::Y);
        for link_type in LinkType::ALL {
            assert_eq!(neat_corner(link_type, &source, &target), Point::new(1.0, 2.0));
        }
    }

    #[test]
    fn neat_corner_falls_back_to_non_priority_alternate() {
        let source = dp(Point::new(1.0, 1.0), Point::new(2.0, 2.0), Polarity::Negative, Axis::Y);
        let target = dp(Point::new(3.0, 3.0), Point::new(4.0, 4.0), Polarity::Negative, Axis::X);
        assert_eq!(
            neat_corner(LinkType::SourceBeam, &source, &target),
            Point::new(2.0, 2.0)
        );
        assert_eq!(
            neat_corner(LinkType::TargetBeam, &source, &target),
            Point::new(4.0, 4.0)
        );
    }

    #[test]
    fn neat_corner_uses_second_end_when_first_is_negative() {
        let source = dp(Point::new(1.0, 1.0), Point::new(2.0, 2.0), Polarity::Positive, Axis::X);
        let target = dp(Point::new(3.0, 3.0), Point::new(4.0, 4.0), Polarity::Negative, Axis::X);
        assert_eq!(
            neat_corner(LinkType::Normal, &source, &target),
            Point::new(1.0, 1.0)
        );
        assert_eq!(
            neat_corner(LinkType::TargetBeam, &source, &target),
            Point::new(1.0, 1.0)
        );
    }

    #[test]
    fn turn_axis_prefers_source_then_target() {
        let pos_x = dp(Point::default(), Point::default(), Polarity::Positive, Axis::X);
        let pos_y = dp(Point::default(), Point::default(), Polarity::Positive, Axis::Y);
        let neg_y = dp(Point::default(), Point::default(), Polarity::Negative, Axis::Y);
        let neg_x = dp(Point::default(), Point::default(), Polarity::Negative, Axis::X);

        assert_eq!(turn_axis(&pos_x, &pos_y), Some(Axis::X));
        assert_eq!(turn_axis(&neg_x, &pos_y), Some(Axis::Y));
        assert_eq!(turn_axis(&pos_y, &neg_x), Some(Axis::Y));
        assert_eq!(turn_axis(&neg_y, &neg_x), Some(Axis::Y));
    }

    #[test]
    fn missing_turn_axis_is_an_error() {
        let broken = DirectionPoint {
            point: Point::default(),
            other_point: Point::default(),
            polarity: Polarity::Negative,
            truncate: None,
        };
        let other = dp(Point::new(5.0, 5.0), Point::default(), Polarity::Negative, Axis::X);
        assert_eq!(turn_axis(&broken, &other), None);

        let req = request(
            Point::new(50.0, 130.0),
            Point::new(250.0, 50.0),
            Side::Left,
            Side::Right,
            LinkType::SourceBeam,
        );
        let result = route_resolved(&req, &broken, &other, ArrowSize::default());
        assert!(matches!(
            result,
            Err(RouteError::TurnAxisUndetermined { .. })
        ));
    }

    #[test]
    fn resolved_ends_always_yield_a_turn_axis() {
        let centers = [
            Point::new(0.0, 0.0),
            Point::new(300.0, 200.0),
            Point::new(-300.0, 200.0),
            Point::new(300.0, -200.0),
            Point::new(-300.0, -200.0),
        ];
        for exit in Side::ALL {
            for entry in Side::ALL {
                for target in &centers[1..] {
                    for link_type in LinkType::ALL {
                        let req = request(centers[0], *target, exit, entry, link_type);
                        let result = route(&req, ArrowSize::default());
                        assert!(result.is_ok(), "{exit}-{entry} {link_type:?} {target:?}");
                        let route = result.unwrap();
                        assert_eq!(route.points.first(), Some(&req.source_extended));
                        assert_eq!(route.points.last(), Some(&req.target_extended));
                        for pair in route.points.windows(2) {
                            assert!(
                                pair[0].is_axis_aligned_with(pair[1]),
                                "diagonal segment in {exit}-{entry}"
                            );
                        }
                    }
                }
            }
        }
    }
}
