use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::arrow::ArrowSize;
use crate::error::{FlowError, Result, Warning};
use crate::geometry::{Anchors, BoxMetrics, DEFAULT_EXTEND_LENGTH, Point, Side, measure_box};
use crate::path::format_number;
use crate::pattern::{Router, route_by_pattern};
use crate::routing::{LinkType, Route, RouteRequest, route};
use crate::surface::{ElementId, Primitive, RenderSurface};

const DEFAULT_DIRECTION: (Side, Side) = (Side::Right, Side::Left);
/// Baseline nudge applied to every text line so it sits visually centred.
const TEXT_BASELINE_OFFSET: f64 = 5.0;
const NODE_STROKE_WIDTH: &str = "2";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartOptions {
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub font_color: String,
    pub line_height: f64,
    pub edge_color: String,
    pub edge_width: f64,
    pub node_border_color: String,
    pub node_background_color: String,
    pub node_min_width: f64,
    pub node_min_height: f64,
    pub extend_length: f64,
    pub border_radius: f64,
    /// Vertical then horizontal padding.
    pub padding: [f64; 2],
    pub link_type: LinkType,
    pub router: Router,
    pub background: Option<String>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            font_size: 14.0,
            font_color: "#000000".to_string(),
            line_height: 24.0,
            edge_color: "#47b785".to_string(),
            edge_width: 1.5,
            node_border_color: "#47b785".to_string(),
            node_background_color: "transparent".to_string(),
            node_min_width: 60.0,
            node_min_height: 50.0,
            extend_length: DEFAULT_EXTEND_LENGTH,
            border_radius: 8.0,
            padding: [10.0, 20.0],
            link_type: LinkType::default(),
            router: Router::default(),
            background: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeOptions {
    pub padding: Option<[f64; 2]>,
    pub font_size: Option<f64>,
    pub font_color: Option<String>,
    pub border_color: Option<String>,
    pub background_color: Option<String>,
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
    pub extend_length: Option<f64>,
    pub border_radius: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeOptions {
    /// `exit-entry`, e.g. `bottom-top`.
    pub direction: Option<String>,
    pub link_type: Option<LinkType>,
    pub color: Option<String>,
    pub width: Option<f64>,
    pub inflection: Option<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(usize);

impl LinkId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub padding: [f64; 2],
    pub font_size: f64,
    pub font_color: String,
    pub line_height: f64,
    pub border_color: String,
    pub background_color: String,
    pub border_radius: f64,
}

/// Surface handles a node was drawn into.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeElements {
    pub group: ElementId,
    pub rect: ElementId,
    pub text: ElementId,
    pub spans: Vec<ElementId>,
}

#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    center: Point,
    width: f64,
    height: f64,
    extend_length: f64,
    lines: Vec<String>,
    style: NodeStyle,
    anchors: Anchors,
    outgoing: Vec<LinkId>,
    incoming: Vec<LinkId>,
    elements: Option<NodeElements>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn extend_length(&self) -> f64 {
        self.extend_length
    }

    pub fn top_left(&self) -> Point {
        Point::new(
            self.center.x - self.width / 2.0,
            self.center.y - self.height / 2.0,
        )
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn style(&self) -> &NodeStyle {
        &self.style
    }

    pub fn anchors(&self) -> &Anchors {
        &self.anchors
    }

    pub fn outgoing(&self) -> &[LinkId] {
        &self.outgoing
    }

    pub fn incoming(&self) -> &[LinkId] {
        &self.incoming
    }

    pub fn elements(&self) -> Option<&NodeElements> {
        self.elements.as_ref()
    }

    /// Re-centre from a new top-left corner and rebuild all eight anchors.
    fn place_top_left(&mut self, top_left: Point) {
        self.center = Point::new(
            top_left.x + self.width / 2.0,
            top_left.y + self.height / 2.0,
        );
        self.anchors = Anchors::compute(self.center, self.width, self.height, self.extend_length);
    }

    /// Baseline of line `index`, keeping the block vertically centred.
    fn line_y(&self, index: usize) -> f64 {
        let count = self.lines.len();
        let line_height = self.style.line_height;
        let offset = if count <= 1 {
            0.0
        } else if count % 2 == 1 {
            (1.0 - count as f64) / 2.0 * line_height
        } else {
            (0.5 - count as f64 / 2.0) * line_height
        };
        self.center.y + offset + index as f64 * line_height + TEXT_BASELINE_OFFSET
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStyle {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone)]
pub struct Link {
    source: NodeId,
    target: NodeId,
    exit: Side,
    entry: Side,
    link_type: LinkType,
    inflection: Option<Point>,
    style: EdgeStyle,
    source_anchor: Point,
    source_extended: Point,
    target_anchor: Point,
    target_extended: Point,
    center_point: Point,
    path: Option<ElementId>,
}

impl Link {
    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn exit(&self) -> Side {
        self.exit
    }

    pub fn entry(&self) -> Side {
        self.entry
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    pub fn inflection(&self) -> Option<Point> {
        self.inflection
    }

    pub fn style(&self) -> &EdgeStyle {
        &self.style
    }

    /// Cached (true, extended) anchor at the source end.
    pub fn source_points(&self) -> (Point, Point) {
        (self.source_anchor, self.source_extended)
    }

    /// Cached (true, extended) anchor at the target end.
    pub fn target_points(&self) -> (Point, Point) {
        (self.target_anchor, self.target_extended)
    }

    pub fn center_point(&self) -> Point {
        self.center_point
    }

    pub fn path_element(&self) -> Option<ElementId> {
        self.path
    }

    /// Re-read the endpoints from the two nodes' current anchors.
    pub fn refresh(&mut self, source: &Node, target: &Node) {
        self.source_anchor = source.anchors.base(self.exit);
        self.source_extended = source.anchors.extended(self.exit);
        self.target_anchor = target.anchors.base(self.entry);
        self.target_extended = target.anchors.extended(self.entry);
        self.center_point = self.source_extended.midpoint(self.target_extended);
    }

    pub fn request(&self) -> RouteRequest {
        RouteRequest {
            source: self.source_anchor,
            source_extended: self.source_extended,
            target: self.target_anchor,
            target_extended: self.target_extended,
            exit: self.exit,
            entry: self.entry,
            link_type: self.link_type,
            inflection: self.inflection,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    MoveNode { node: NodeId, top_left: Point },
}

#[derive(Debug, Clone, Default)]
pub struct FlowChart {
    options: ChartOptions,
    arrow_size: ArrowSize,
    nodes: Vec<Node>,
    links: Vec<Link>,
    names: HashMap<String, NodeId>,
    warnings: Vec<Warning>,
    rendered: bool,
}

impl FlowChart {
    pub fn new(options: ChartOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn with_arrow_size(mut self, arrow_size: ArrowSize) -> Self {
        self.arrow_size = arrow_size;
        self
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    /// Add a node centred on `(x, y)`. `text` is split into lines on `\n`.
    pub fn add_node(
        &mut self,
        name: &str,
        x: f64,
        y: f64,
        text: &str,
        options: NodeOptions,
    ) -> &mut Self {
        if self.names.contains_key(name) {
            self.report(Warning::DuplicateNode {
                name: name.to_string(),
            });
            return self;
        }

        let defaults = &self.options;
        let style = NodeStyle {
            padding: options.padding.unwrap_or(defaults.padding),
            font_size: options.font_size.unwrap_or(defaults.font_size),
            font_color: options
                .font_color
                .unwrap_or_else(|| defaults.font_color.clone()),
            line_height: defaults.line_height,
            border_color: options
                .border_color
                .unwrap_or_else(|| defaults.node_border_color.clone()),
            background_color: options
                .background_color
                .unwrap_or_else(|| defaults.node_background_color.clone()),
            border_radius: options.border_radius.unwrap_or(defaults.border_radius),
        };
        let metrics = BoxMetrics {
            font_size: style.font_size,
            line_height: style.line_height,
            padding: style.padding,
            min_width: options.min_width.unwrap_or(defaults.node_min_width),
            min_height: options.min_height.unwrap_or(defaults.node_min_height),
        };
        let extend_length = options.extend_length.unwrap_or(defaults.extend_length);

        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        let (width, height) = measure_box(&lines, &metrics);
        let center = Point::new(x, y);

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            center,
            width,
            height,
            extend_length,
            lines,
            style,
            anchors: Anchors::compute(center, width, height, extend_length),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            elements: None,
        });
        self.names.insert(name.to_string(), id);
        log::debug!("added node '{name}' ({width}x{height}) at {x},{y}");
        self
    }

    /// Connect two existing nodes. Unknown names are reported and the call
    /// does nothing; a bad direction is reported and replaced by `right-left`.
    pub fn add_edge(&mut self, source: &str, target: &str, options: EdgeOptions) -> &mut Self {
        let (exit, entry) = match options.direction.as_deref() {
            Some(direction) => parse_direction(direction).unwrap_or_else(|warning| {
                self.report(warning);
                DEFAULT_DIRECTION
            }),
            None => DEFAULT_DIRECTION,
        };

        let Some(source_id) = self.node_id(source) else {
            self.report(Warning::UnknownSource {
                source: source.to_string(),
                target: target.to_string(),
            });
            return self;
        };
        let Some(target_id) = self.node_id(target) else {
            self.report(Warning::UnknownTarget {
                source: source.to_string(),
                target: target.to_string(),
            });
            return self;
        };

        let id = LinkId(self.links.len());
        let mut link = Link {
            source: source_id,
            target: target_id,
            exit,
            entry,
            link_type: options.link_type.unwrap_or(self.options.link_type),
            inflection: options.inflection,
            style: EdgeStyle {
                color: options
                    .color
                    .unwrap_or_else(|| self.options.edge_color.clone()),
                width: options.width.unwrap_or(self.options.edge_width),
            },
            source_anchor: Point::default(),
            source_extended: Point::default(),
            target_anchor: Point::default(),
            target_extended: Point::default(),
            center_point: Point::default(),
            path: None,
        };
        link.refresh(&self.nodes[source_id.0], &self.nodes[target_id.0]);
        self.links.push(link);
        self.nodes[source_id.0].outgoing.push(id);
        self.nodes[target_id.0].incoming.push(id);
        log::debug!("added edge {source} -> {target} ({exit}-{entry})");
        self
    }

    /// Clear the surface and draw every node followed by its outgoing links.
    pub fn render<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> Result<()> {
        surface.clear();
        for node in &mut self.nodes {
            node.elements = None;
        }
        for link in &mut self.links {
            link.path = None;
        }

        let root = surface.root();
        surface.set_attr(root, "width", &format_number(self.options.width));
        surface.set_attr(root, "height", &format_number(self.options.height));
        if let Some(background) = &self.options.background {
            surface.set_attr(root, "style", &format!("background-color: {background}"));
        }

        for index in 0..self.nodes.len() {
            let id = NodeId(index);
            self.draw_node(id, surface);
            for links in self.outgoing_by_exit_side(id).into_values() {
                for link in links {
                    self.refresh_link(link);
                    self.draw_link(link, surface)?;
                }
            }
        }
        self.rendered = true;
        Ok(())
    }

    /// Move a node so its top-left corner sits at `top_left`, then refresh
    /// and redraw every link touching it.
    pub fn move_node<S: RenderSurface + ?Sized>(
        &mut self,
        node: NodeId,
        top_left: Point,
        surface: &mut S,
    ) -> Result<()> {
        let moved = self
            .nodes
            .get_mut(node.0)
            .ok_or(FlowError::UnknownNode(node))?;
        moved.place_top_left(top_left);
        log::debug!(
            "moved node '{}' to {},{}",
            moved.name,
            top_left.x,
            top_left.y
        );

        let outgoing: Vec<LinkId> = self
            .outgoing_by_exit_side(node)
            .into_values()
            .flatten()
            .collect();
        let incoming = self.nodes[node.0].incoming.clone();
        for link in outgoing.iter().chain(&incoming) {
            self.refresh_link(*link);
        }

        if self.rendered {
            self.update_node_elements(node, surface);
            for link in outgoing.iter().chain(&incoming) {
                self.draw_link(*link, surface)?;
            }
        }
        Ok(())
    }

    pub fn apply<S: RenderSurface + ?Sized>(&mut self, command: Command, surface: &mut S) -> Result<()> {
        match command {
            Command::MoveNode { node, top_left } => self.move_node(node, top_left, surface),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.0)
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(index, node)| (NodeId(index), node))
    }

    pub fn links(&self) -> impl Iterator<Item = (LinkId, &Link)> {
        self.links.iter().enumerate().map(|(index, link)| (LinkId(index), link))
    }

    pub fn links_from(&self, node: NodeId) -> &[LinkId] {
        self.node(node).map(Node::outgoing).unwrap_or(&[])
    }

    pub fn links_to(&self, node: NodeId) -> &[LinkId] {
        self.node(node).map(Node::incoming).unwrap_or(&[])
    }

    /// Outgoing links keyed by exit side; sides appear in the order their
    /// first link was added.
    pub fn outgoing_by_exit_side(&self, node: NodeId) -> IndexMap<Side, Vec<LinkId>> {
        let mut groups: IndexMap<Side, Vec<LinkId>> = IndexMap::new();
        for link in self.links_from(node) {
            groups.entry(self.links[link.0].exit).or_default().push(*link);
        }
        groups
    }

    pub fn route(&self, link: LinkId) -> Result<Route> {
        let link = self
            .links
            .get(link.0)
            .ok_or(FlowError::UnknownLink(link))?;
        let request = link.request();
        let route = match self.options.router {
            Router::Polarity => route(&request, self.arrow_size)?,
            Router::Pattern => route_by_pattern(&request, self.arrow_size),
        };
        Ok(route)
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub(crate) fn report(&mut self, warning: Warning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    fn refresh_link(&mut self, id: LinkId) {
        let link = &mut self.links[id.0];
        link.refresh(&self.nodes[link.source.0], &self.nodes[link.target.0]);
    }

    fn draw_node<S: RenderSurface + ?Sized>(&mut self, id: NodeId, surface: &mut S) {
        let index = id.0.to_string();
        let root = surface.root();
        let node = &self.nodes[id.0];

        let group = surface.append(root, Primitive::Group);
        surface.set_attr(group, "class", &format!("flow-box{index}"));
        surface.set_attr(group, "boxId", &index);

        let body = surface.append(group, Primitive::Group);
        surface.set_attr(body, "class", &format!("flow-node{index}"));
        surface.set_attr(body, "nodeId", &index);

        let top_left = node.top_left();
        let rect = surface.append(body, Primitive::Rect);
        surface.set_attr(rect, "rectId", &index);
        surface.set_attr(rect, "class", "flow-node-rect");
        surface.set_attr(rect, "x", &format_number(top_left.x));
        surface.set_attr(rect, "y", &format_number(top_left.y));
        surface.set_attr(rect, "width", &format_number(node.width));
        surface.set_attr(rect, "height", &format_number(node.height));
        surface.set_attr(rect, "stroke", &node.style.border_color);
        surface.set_attr(rect, "fill", &node.style.background_color);
        surface.set_attr(rect, "stroke-width", NODE_STROKE_WIDTH);
        surface.set_attr(rect, "rx", &format_number(node.style.border_radius));
        surface.set_attr(rect, "ry", &format_number(node.style.border_radius));

        let text = surface.append(body, Primitive::Text);
        surface.set_attr(text, "textId", &index);
        surface.set_attr(text, "class", &format!("flow-node-text{index}"));
        surface.set_attr(text, "text-anchor", "middle");
        surface.set_attr(text, "font-size", &format_number(node.style.font_size));
        surface.set_attr(text, "fill", &node.style.font_color);

        let mut spans = Vec::with_capacity(node.lines.len());
        for (line_index, line) in node.lines.iter().enumerate() {
            let span = surface.append(text, Primitive::Span);
            surface.set_attr(span, "class", &format!("flow-node-tspan{index}"));
            surface.set_attr(span, "x", &format_number(node.center.x));
            surface.set_attr(span, "y", &format_number(node.line_y(line_index)));
            surface.set_text(span, line);
            spans.push(span);
        }

        self.nodes[id.0].elements = Some(NodeElements {
            group,
            rect,
            text,
            spans,
        });
    }

    fn update_node_elements<S: RenderSurface + ?Sized>(&self, id: NodeId, surface: &mut S) {
        let node = &self.nodes[id.0];
        let Some(elements) = &node.elements else {
            return;
        };
        let top_left = node.top_left();
        surface.set_attr(elements.rect, "x", &format_number(top_left.x));
        surface.set_attr(elements.rect, "y", &format_number(top_left.y));
        for (line_index, span) in elements.spans.iter().enumerate() {
            surface.set_attr(*span, "x", &format_number(node.center.x));
            surface.set_attr(*span, "y", &format_number(node.line_y(line_index)));
        }
    }

    /// Replace the link's path primitive inside its source node's group.
    fn draw_link<S: RenderSurface + ?Sized>(&mut self, id: LinkId, surface: &mut S) -> Result<()> {
        let route = self.route(id)?;
        let link = &self.links[id.0];
        let Some(group) = self.nodes[link.source.0]
            .elements
            .as_ref()
            .map(|elements| elements.group)
        else {
            return Ok(());
        };
        let source_index = link.source.0.to_string();

        if let Some(old) = link.path {
            surface.remove(old);
        }
        let path = surface.append(group, Primitive::Path);
        surface.set_attr(path, "lineId", &source_index);
        surface.set_attr(path, "class", &format!("flow-edge{source_index}"));
        surface.set_attr(path, "stroke", &link.style.color);
        surface.set_attr(path, "fill", "transparent");
        surface.set_attr(path, "stroke-width", &format_number(link.style.width));
        surface.set_attr(path, "d", &route.to_svg_path());

        self.links[id.0].path = Some(path);
        Ok(())
    }
}

fn parse_direction(direction: &str) -> std::result::Result<(Side, Side), Warning> {
    let Some((exit, entry)) = direction.split_once('-') else {
        return Err(Warning::MalformedDirection {
            direction: direction.to_string(),
        });
    };
    let side = |name: &str| {
        name.parse::<Side>().map_err(|_| Warning::UnknownSide {
            direction: direction.to_string(),
            side: name.trim().to_string(),
        })
    };
    Ok((side(exit)?, side(entry)?))
}

/// Drag integration: remembers where inside the rectangle the pointer
/// grabbed it and turns pointer positions into move commands.
pub struct DragSession<'a, S: RenderSurface + ?Sized> {
    chart: &'a mut FlowChart,
    surface: &'a mut S,
    node: NodeId,
    offset: Point,
}

impl<'a, S: RenderSurface + ?Sized> DragSession<'a, S> {
    pub fn start(
        chart: &'a mut FlowChart,
        surface: &'a mut S,
        node: NodeId,
        pointer: Point,
    ) -> Result<Self> {
        let top_left = chart
            .node(node)
            .ok_or(FlowError::UnknownNode(node))?
            .top_left();
        Ok(Self {
            chart,
            surface,
            node,
            offset: Point::new(pointer.x - top_left.x, pointer.y - top_left.y),
        })
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn command_for(&self, pointer: Point) -> Command {
        Command::MoveNode {
            node: self.node,
            top_left: Point::new(pointer.x - self.offset.x, pointer.y - self.offset.y),
        }
    }

    pub fn drag(&mut self, pointer: Point) -> Result<()> {
        let command = self.command_for(pointer);
        self.chart.apply(command, &mut *self.surface)
    }

    /// Finish the drag and hand back the node's final top-left corner.
    pub fn end(self) -> Point {
        self.chart
            .node(self.node)
            .map(Node::top_left)
            .unwrap_or_default()
    }
}
