//! Flowchart rendering with orthogonal connectors.
//!
//! Nodes are boxes sized from their text; edges leave through one side of the
//! source box and enter through one side of the target. [`FlowChart`] owns
//! both tables, draws them onto any [`RenderSurface`] and re-routes the
//! affected connectors whenever a node moves.

pub mod arrow;
pub mod chart;
pub mod direction;
pub mod document;
pub mod error;
pub mod geometry;
pub mod path;
pub mod pattern;
pub mod routing;
pub mod surface;
pub mod utils;

pub use arrow::{ArrowSize, Arrowhead, arrowhead};
pub use chart::{
    ChartOptions, Command, DragSession, EdgeOptions, EdgeStyle, FlowChart, Link, LinkId, Node,
    NodeElements, NodeId, NodeOptions, NodeStyle,
};
pub use direction::{DirectionPoint, Polarity, resolve};
pub use document::{ChartDocument, EdgeSpec, MoveSpec, NodeSpec, NodeText};
pub use error::{FlowError, Result, Warning};
pub use geometry::{Anchors, Axis, Point, Side, anchor};
pub use path::{PathBuilder, SvgPath};
pub use pattern::{Corner, Pattern, Router, route_by_pattern};
pub use routing::{Bend, LinkType, PathShape, PolarityPair, Route, RouteError, RouteRequest, route};
pub use surface::{ElementId, Primitive, RenderSurface, SvgSurface};
