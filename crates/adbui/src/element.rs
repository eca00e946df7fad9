//! Located UI elements

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{AdbError, Result};
use crate::gateway::DeviceGateway;
use crate::hierarchy::HierarchyNode;

lazy_static! {
    static ref INTEGER: Regex = Regex::new(r"-?\d+").expect("valid integer pattern");
}

/// Axis-aligned pixel rectangle with `x2 >= x1` and `y2 >= y1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl Bounds {
    /// Rectangle between two corners, in any order
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Rectangle from an origin and a size; fails when a corner leaves `i32`
    pub fn from_origin(x: i32, y: i32, width: i32, height: i32) -> Result<Self> {
        match (x.checked_add(width), y.checked_add(height)) {
            (Some(x2), Some(y2)) => Ok(Self::new(x, y, x2, y2)),
            _ => Err(AdbError::MalformedBounds(format!(
                "origin ({}, {}) size {}x{}",
                x, y, width, height
            ))),
        }
    }

    /// Parse a dump `bounds` string such as `[10,20][110,70]`.
    ///
    /// Only the four embedded integers matter; decoration is ignored.
    pub fn parse(raw: &str) -> Result<Self> {
        let numbers = INTEGER
            .find_iter(raw)
            .map(|m| m.as_str().parse::<i32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| AdbError::MalformedBounds(raw.to_string()))?;

        match numbers.as_slice() {
            [x1, y1, x2, y2] => Ok(Self::new(*x1, *y1, *x2, *y2)),
            _ => Err(AdbError::MalformedBounds(raw.to_string())),
        }
    }

    pub fn x1(&self) -> i32 {
        self.x1
    }

    pub fn y1(&self) -> i32 {
        self.y1
    }

    pub fn x2(&self) -> i32 {
        self.x2
    }

    pub fn y2(&self) -> i32 {
        self.y2
    }

    pub fn width(&self) -> u32 {
        self.x2.abs_diff(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.abs_diff(self.y1)
    }

    /// Center point, rounded down
    pub fn center(&self) -> (i32, i32) {
        (midpoint(self.x1, self.x2), midpoint(self.y1, self.y2))
    }

    /// Same rectangle moved by `(dx, dy)`; fails when a corner leaves `i32`
    pub fn translate(&self, dx: i32, dy: i32) -> Result<Self> {
        let moved = (
            self.x1.checked_add(dx),
            self.y1.checked_add(dy),
            self.x2.checked_add(dx),
            self.y2.checked_add(dy),
        );
        match moved {
            (Some(x1), Some(y1), Some(x2), Some(y2)) => Ok(Self::new(x1, y1, x2, y2)),
            _ => Err(AdbError::MalformedBounds(format!(
                "{} moved by ({}, {})",
                self, dx, dy
            ))),
        }
    }
}

/// `low + (high - low) / 2` without overflow; the result lies in `low..=high`
fn midpoint(low: i32, high: i32) -> i32 {
    (i64::from(low) + (i64::from(high) - i64::from(low)) / 2) as i32
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}][{},{}]", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Where a located element came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementSource {
    /// Matched in the hierarchy dump
    Hierarchy(HierarchyNode),
    /// Matched by OCR; carries the recognized text
    Ocr(String),
    /// Matched by shape detection
    Shape,
}

/// A region of the current screen that can be tapped.
///
/// Elements are plain data once created: refreshing the resolver does not
/// change or invalidate them.
#[derive(Clone)]
pub struct UiElement {
    bounds: Bounds,
    source: ElementSource,
    gateway: Arc<dyn DeviceGateway>,
}

impl UiElement {
    pub(crate) fn new(
        bounds: Bounds,
        source: ElementSource,
        gateway: Arc<dyn DeviceGateway>,
    ) -> Self {
        Self {
            bounds,
            source,
            gateway,
        }
    }

    /// Element for a hierarchy node, located by its `bounds` attribute
    pub(crate) fn from_node(
        node: HierarchyNode,
        gateway: Arc<dyn DeviceGateway>,
    ) -> Result<Self> {
        let raw = node.attribute("bounds").ok_or_else(|| {
            AdbError::MalformedBounds(format!("<{}> has no bounds", node.tag()))
        })?;
        let bounds = Bounds::parse(raw)?;
        Ok(Self::new(bounds, ElementSource::Hierarchy(node), gateway))
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn x1(&self) -> i32 {
        self.bounds.x1()
    }

    pub fn y1(&self) -> i32 {
        self.bounds.y1()
    }

    pub fn x2(&self) -> i32 {
        self.bounds.x2()
    }

    pub fn y2(&self) -> i32 {
        self.bounds.y2()
    }

    pub fn width(&self) -> u32 {
        self.bounds.width()
    }

    pub fn height(&self) -> u32 {
        self.bounds.height()
    }

    pub fn source(&self) -> &ElementSource {
        &self.source
    }

    /// Recognized text, for elements found by OCR
    pub fn text(&self) -> Option<&str> {
        match &self.source {
            ElementSource::Ocr(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Backing hierarchy node, for elements found by attribute or XPath
    pub fn node(&self) -> Option<&HierarchyNode> {
        match &self.source {
            ElementSource::Hierarchy(node) => Some(node),
            _ => None,
        }
    }

    /// Look up an attribute on the backing node. Short aliases are accepted.
    ///
    /// Returns `Ok(None)` when the node lacks the attribute and
    /// `AdbError::NoBackingNode` for OCR and shape matches.
    pub fn attribute(&self, key: &str) -> Result<Option<&str>> {
        self.node()
            .map(|node| node.attribute(key))
            .ok_or(AdbError::NoBackingNode)
    }

    /// XML of the backing node
    pub fn serialize(&self) -> Result<&str> {
        self.node()
            .map(HierarchyNode::to_xml)
            .ok_or(AdbError::NoBackingNode)
    }

    /// Point a tap lands on
    pub fn center(&self) -> (i32, i32) {
        self.bounds.center()
    }

    /// Tap the center of the element. The result on screen is not checked.
    pub async fn tap(&self) -> Result<()> {
        let (x, y) = self.center();
        debug!("Tapping {} at ({}, {})", self.bounds, x, y);
        self.gateway.tap(x, y).await
    }
}

impl fmt::Debug for UiElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiElement")
            .field("bounds", &self.bounds)
            .field("source", &self.source)
            .finish()
    }
}
