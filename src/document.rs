use serde::{Deserialize, Serialize};

use crate::chart::{ChartOptions, Command, EdgeOptions, FlowChart, NodeOptions};
use crate::error::{Result, Warning};
use crate::geometry::Point;
use crate::surface::{RenderSurface, SvgSurface};

/// Serialized chart definition: options, nodes, edges and an optional script
/// of node moves replayed after the first render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartDocument {
    pub options: ChartOptions,
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<EdgeSpec>,
    pub moves: Vec<MoveSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    /// Centre of the node.
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub text: NodeText,
    #[serde(default)]
    pub options: NodeOptions,
}

/// Either a single string (split on newlines) or an explicit list of lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeText {
    Single(String),
    Lines(Vec<String>),
}

impl Default for NodeText {
    fn default() -> Self {
        NodeText::Single(String::new())
    }
}

impl NodeText {
    pub fn joined(&self) -> String {
        match self {
            NodeText::Single(text) => text.clone(),
            NodeText::Lines(lines) => lines.join("\n"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub source: String,
    pub target: String,
    #[serde(flatten)]
    pub options: EdgeOptions,
}

/// Move `node` so its top-left corner lands on `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveSpec {
    pub node: String,
    pub x: f64,
    pub y: f64,
}

impl ChartDocument {
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Populate a chart with the document's nodes and edges.
    pub fn build(&self) -> FlowChart {
        let mut chart = FlowChart::new(self.options.clone());
        for node in &self.nodes {
            chart.add_node(
                &node.name,
                node.x,
                node.y,
                &node.text.joined(),
                node.options.clone(),
            );
        }
        for edge in &self.edges {
            chart.add_edge(&edge.source, &edge.target, edge.options.clone());
        }
        chart
    }

    /// Build, render, then replay the scripted moves against the rendered
    /// surface.
    pub fn render_into<S: RenderSurface + ?Sized>(&self, surface: &mut S) -> Result<FlowChart> {
        let mut chart = self.build();
        chart.render(surface)?;
        for step in &self.moves {
            let Some(node) = chart.node_id(&step.node) else {
                chart.report(Warning::UnknownMoveTarget {
                    name: step.node.clone(),
                });
                continue;
            };
            chart.apply(
                Command::MoveNode {
                    node,
                    top_left: Point::new(step.x, step.y),
                },
                surface,
            )?;
        }
        Ok(chart)
    }

    pub fn render_svg(&self) -> Result<String> {
        let mut surface = SvgSurface::new();
        self.render_into(&mut surface)?;
        Ok(surface.to_svg())
    }
}
