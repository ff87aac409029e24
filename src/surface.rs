use std::fmt;

use crate::utils::escape_xml;

/// Handle to a surface element. Slots of removed elements are reused, but
/// every reuse bumps the slot's generation, so a handle kept past `remove`
/// never resolves to the element that later takes its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Group,
    Rect,
    Text,
    Span,
    Path,
}

impl Primitive {
    pub fn tag(&self) -> &'static str {
        match self {
            Primitive::Group => "g",
            Primitive::Rect => "rect",
            Primitive::Text => "text",
            Primitive::Span => "tspan",
            Primitive::Path => "path",
        }
    }
}

/// Drawing target the chart renders into.
pub trait RenderSurface {
    fn root(&self) -> ElementId;
    fn append(&mut self, parent: ElementId, primitive: Primitive) -> ElementId;
    fn set_attr(&mut self, id: ElementId, name: &str, value: &str);
    fn set_text(&mut self, id: ElementId, text: &str);
    /// Detach and drop `id` together with all of its descendants.
    fn remove(&mut self, id: ElementId);
    /// Drop every child of the root; root attributes survive.
    fn clear(&mut self);
}

#[derive(Debug, Clone)]
struct Element {
    tag: &'static str,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    fn new(tag: &'static str, parent: Option<ElementId>) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            text: None,
            parent,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

/// In-memory SVG tree. Removed slots are recycled, so redrawing a connector
/// many times does not grow the arena.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgSurface {
    pub fn new() -> Self {
        let mut root = Element::new("svg", None);
        root.attrs
            .push(("xmlns".to_string(), "http://www.w3.org/2000/svg".to_string()));
        Self {
            slots: vec![Slot {
                generation: 0,
                element: Some(root),
            }],
            free: Vec::new(),
        }
    }

    fn element(&self, id: ElementId) -> Option<&Element> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_ref())
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_mut())
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.element(id).is_some()
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.element(id)?.text.as_deref()
    }

    pub fn tag(&self, id: ElementId) -> Option<&'static str> {
        self.element(id).map(|element| element.tag)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.element(id)
            .map(|element| element.children.as_slice())
            .unwrap_or(&[])
    }

    /// Live elements, the root included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.element.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root()).is_empty()
    }

    pub fn count_tag(&self, tag: &str) -> usize {
        self.slots
            .iter()
            .filter_map(|slot| slot.element.as_ref())
            .filter(|element| element.tag == tag)
            .count()
    }

    /// Every live element carrying `name="value"`, in document order.
    pub fn find_by_attr(&self, name: &str, value: &str) -> Vec<ElementId> {
        let mut found = Vec::new();
        self.walk(self.root(), &mut |id, element| {
            if element
                .attrs
                .iter()
                .any(|(key, current)| key == name && current == value)
            {
                found.push(id);
            }
        });
        found
    }

    fn walk(&self, id: ElementId, visit: &mut dyn FnMut(ElementId, &Element)) {
        if let Some(element) = self.element(id) {
            visit(id, element);
            for child in &element.children {
                self.walk(*child, visit);
            }
        }
    }

    pub fn to_svg(&self) -> String {
        self.to_string()
    }

    fn write_element(
        &self,
        out: &mut impl fmt::Write,
        id: ElementId,
        depth: usize,
    ) -> fmt::Result {
        let Some(element) = self.element(id) else {
            return Ok(());
        };
        let indent = "  ".repeat(depth);
        write!(out, "{indent}<{}", element.tag)?;
        for (name, value) in &element.attrs {
            write!(out, " {}=\"{}\"", name, escape_xml(value))?;
        }

        if element.children.is_empty() && element.text.is_none() {
            return out.write_str(" />\n");
        }

        out.write_char('>')?;
        if let Some(text) = &element.text {
            out.write_str(&escape_xml(text))?;
        }
        if !element.children.is_empty() {
            out.write_char('\n')?;
            for child in &element.children {
                self.write_element(out, *child, depth + 1)?;
            }
            out.write_str(&indent)?;
        }
        writeln!(out, "</{}>", element.tag)
    }

    fn release(&mut self, id: ElementId) {
        let Some(slot) = self
            .slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
        else {
            return;
        };
        let Some(element) = slot.element.take() else {
            return;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        for child in element.children {
            self.release(child);
        }
    }
}

impl fmt::Display for SvgSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        self.write_element(f, self.root(), 0)
    }
}

impl RenderSurface for SvgSurface {
    fn root(&self) -> ElementId {
        ElementId {
            index: 0,
            generation: 0,
        }
    }

    fn append(&mut self, parent: ElementId, primitive: Primitive) -> ElementId {
        let element = Element::new(primitive.tag(), Some(parent));
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.element = Some(element);
                ElementId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    element: Some(element),
                });
                ElementId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        };
        if let Some(parent) = self.element_mut(parent) {
            parent.children.push(id);
        }
        id
    }

    fn set_attr(&mut self, id: ElementId, name: &str, value: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        match element.attrs.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => element.attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn set_text(&mut self, id: ElementId, text: &str) {
        if let Some(element) = self.element_mut(id) {
            element.text = Some(text.to_string());
        }
    }

    fn remove(&mut self, id: ElementId) {
        if id == self.root() {
            self.clear();
            return;
        }
        let parent = self.element(id).and_then(|element| element.parent);
        if let Some(parent) = parent.and_then(|parent| self.element_mut(parent)) {
            parent.children.retain(|child| *child != id);
        }
        self.release(id);
    }

    fn clear(&mut self) {
        let root = self.root();
        let children = self
            .element_mut(root)
            .map(|element| std::mem::take(&mut element.children))
            .unwrap_or_default();
        for child in children {
            self.release(child);
        }
    }
}
