use crate::geometry::Point;

/// Minimal pen-style path construction.
pub trait PathBuilder {
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn finish(&self) -> String;

    fn move_to_point(&mut self, point: Point) {
        self.move_to(point.x, point.y);
    }

    fn line_to_point(&mut self, point: Point) {
        self.line_to(point.x, point.y);
    }

    /// Move to the first point and draw through the rest.
    fn polyline(&mut self, points: &[Point]) {
        let mut iter = points.iter();
        if let Some(first) = iter.next() {
            self.move_to_point(*first);
        }
        for point in iter {
            self.line_to_point(*point);
        }
    }
}

/// SVG path data (`d` attribute) in the compact `M1,2L3,4` form.
#[derive(Debug, Clone, Default)]
pub struct SvgPath {
    data: String,
}

impl SvgPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl PathBuilder for SvgPath {
    fn move_to(&mut self, x: f64, y: f64) {
        self.data
            .push_str(&format!("M{},{}", format_number(x), format_number(y)));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.data
            .push_str(&format!("L{},{}", format_number(x), format_number(y)));
    }

    fn finish(&self) -> String {
        self.data.clone()
    }
}

/// Shortest decimal form, with negative zero folded to `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}
