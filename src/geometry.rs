use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_EXTEND_LENGTH: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// True when the segment to `other` runs parallel to one of the axes.
    pub fn is_axis_aligned_with(self, other: Point) -> bool {
        self.x == other.x || self.y == other.y
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }

    /// Unit vector pointing away from the rectangle through this side.
    pub fn outward_normal(self) -> (f64, f64) {
        match self {
            Side::Top => (0.0, -1.0),
            Side::Right => (1.0, 0.0),
            Side::Bottom => (0.0, 1.0),
            Side::Left => (-1.0, 0.0),
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Right => 1,
            Side::Bottom => 2,
            Side::Left => 3,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Side::Top),
            "right" => Ok(Side::Right),
            "bottom" => Ok(Side::Bottom),
            "left" => Ok(Side::Left),
            other => Err(format!("unknown side '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// Boundary midpoint of `side`, pushed `extend` units outward along its normal.
pub fn anchor(center: Point, width: f64, height: f64, side: Side, extend: f64) -> Point {
    let (dx, dy) = match side {
        Side::Top => (0.0, -0.5 * height - extend),
        Side::Right => (0.5 * width + extend, 0.0),
        Side::Bottom => (0.0, 0.5 * height + extend),
        Side::Left => (-0.5 * width - extend, 0.0),
    };
    Point {
        x: center.x + dx,
        y: center.y + dy,
    }
}

/// The eight cached attachment points of a node: one base and one extended
/// anchor per side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchors {
    base: [Point; 4],
    extended: [Point; 4],
}

impl Anchors {
    pub fn compute(center: Point, width: f64, height: f64, extend: f64) -> Self {
        let mut base = [Point::default(); 4];
        let mut extended = [Point::default(); 4];
        for side in Side::ALL {
            base[side.index()] = anchor(center, width, height, side, 0.0);
            extended[side.index()] = anchor(center, width, height, side, extend);
        }
        Self { base, extended }
    }

    pub fn get(&self, side: Side, extended: bool) -> Point {
        if extended {
            self.extended[side.index()]
        } else {
            self.base[side.index()]
        }
    }

    pub fn base(&self, side: Side) -> Point {
        self.get(side, false)
    }

    pub fn extended(&self, side: Side) -> Point {
        self.get(side, true)
    }

    /// Look up an anchor by its key: `top`..`left` or `extop`..`exleft`.
    pub fn by_key(&self, key: &str) -> Option<Point> {
        match key.strip_prefix("ex") {
            Some(rest) => rest.parse::<Side>().ok().map(|side| self.extended(side)),
            None => key.parse::<Side>().ok().map(|side| self.base(side)),
        }
    }
}

/// Rendered width of a text line in character units: code units above 127 and
/// `^` count double.
pub fn text_units(text: &str) -> usize {
    text.encode_utf16()
        .map(|unit| if unit > 127 || unit == 94 { 2 } else { 1 })
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxMetrics {
    pub font_size: f64,
    pub line_height: f64,
    /// Vertical then horizontal padding.
    pub padding: [f64; 2],
    pub min_width: f64,
    pub min_height: f64,
}

pub fn measure_box(lines: &[String], metrics: &BoxMetrics) -> (f64, f64) {
    let max_units = lines.iter().map(|line| text_units(line)).max().unwrap_or(0);
    let width = (metrics.font_size / 2.0 * max_units as f64 + metrics.padding[1] * 2.0)
        .max(metrics.min_width);
    let height = (lines.len() as f64 * metrics.line_height + metrics.padding[0] * 2.0)
        .max(metrics.min_height);
    (width, height)
}
