//! UI hierarchy parsing and normalization
//!
//! uiautomator writes every view as a generic `<node>` element. After parsing,
//! each node is renamed to the last segment of its `class` attribute
//! (`android.widget.Button` becomes `Button`), the same labels the on-device
//! inspector shows, so XPath can target element types directly.

use std::path::Path;

use sxd_document::dom::{ChildOfElement, ChildOfRoot, Document, Element};
use sxd_document::{parser, writer, Package};
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value};
use tracing::debug;

use crate::config::canonical_key;
use crate::error::{AdbError, Result};

/// Validated hierarchy dump.
///
/// Only the dump text is kept, so a `Hierarchy` can move between threads;
/// the document is rebuilt for each query.
pub struct Hierarchy {
    xml: String,
}

impl Hierarchy {
    /// Check that a dump parses and has a root element
    pub fn parse(xml: &str) -> Result<Self> {
        build_document(xml)?;
        Ok(Self {
            xml: xml.to_string(),
        })
    }

    /// Read and parse the dump file at `path`
    pub async fn load(path: &Path) -> Result<Self> {
        let xml = match tokio::fs::read_to_string(path).await {
            Ok(xml) => xml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AdbError::MalformedDump(format!(
                    "{} does not exist",
                    path.display()
                )));
            }
            Err(e) => return Err(AdbError::Io(e)),
        };
        debug!("Loaded hierarchy dump {} ({} bytes)", path.display(), xml.len());
        Self::parse(&xml)
    }

    /// Evaluate an XPath expression against the normalized document.
    ///
    /// Relative expressions start at the root element, so `.//*` covers the
    /// UI nodes but not the root itself. Selected nodes that are not
    /// elements are skipped.
    pub fn select(&self, expression: &str) -> Result<Vec<HierarchyNode>> {
        let invalid = |reason: String| AdbError::InvalidXpath {
            expression: expression.to_string(),
            reason,
        };

        let xpath = Factory::new()
            .build(expression)
            .map_err(|e| invalid(e.to_string()))?
            .ok_or_else(|| invalid("empty expression".to_string()))?;

        let package = build_document(&self.xml)?;
        let document = package.as_document();
        let root = root_element(&document)
            .ok_or_else(|| AdbError::MalformedDump("no root element".to_string()))?;

        let nodes = match xpath.evaluate(&Context::new(), root) {
            Ok(Value::Nodeset(nodes)) => nodes,
            Ok(other) => return Err(invalid(format!("expected a node-set, got {:?}", other))),
            Err(e) => return Err(invalid(e.to_string())),
        };

        let mut selected = Vec::new();
        for node in nodes.document_order() {
            match node {
                Node::Element(element) => selected.push(HierarchyNode::snapshot(element)?),
                other => debug!("Skipping non-element XPath result {:?}", other),
            }
        }
        Ok(selected)
    }
}

/// Parse a dump and rename its nodes after their class
fn build_document(xml: &str) -> Result<Package> {
    let package = parser::parse(xml).map_err(|e| AdbError::MalformedDump(format!("{:?}", e)))?;

    {
        let document = package.as_document();
        let root = root_element(&document)
            .ok_or_else(|| AdbError::MalformedDump("no root element".to_string()))?;
        normalize(root);
    }

    Ok(package)
}

fn root_element<'d>(document: &Document<'d>) -> Option<Element<'d>> {
    document.root().children().into_iter().find_map(|child| match child {
        ChildOfRoot::Element(element) => Some(element),
        _ => None,
    })
}

fn normalize(element: Element<'_>) {
    if let Some(class) = element.attribute_value("class") {
        let tag = class.rsplit('.').next().unwrap_or(class);
        if !tag.is_empty() {
            let tag = tag.to_string();
            element.set_name(tag.as_str());
        }
    }

    for child in element.children() {
        if let ChildOfElement::Element(child) = child {
            normalize(child);
        }
    }
}

/// Owned copy of one hierarchy element.
///
/// Snapshots stay valid after the hierarchy they came from is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
    tag: String,
    attributes: Vec<(String, String)>,
    xml: String,
}

impl HierarchyNode {
    fn snapshot(element: Element<'_>) -> Result<Self> {
        let attributes = element
            .attributes()
            .into_iter()
            .map(|a| (a.name().local_part().to_string(), a.value().to_string()))
            .collect();

        Ok(Self {
            tag: element.name().local_part().to_string(),
            attributes,
            xml: serialize_element(element)?,
        })
    }

    /// Normalized tag (trailing segment of `class`)
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attribute value, accepting short aliases such as `id`
    pub fn attribute(&self, key: &str) -> Option<&str> {
        let key = canonical_key(key);
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// All attributes in document order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// XML of the element and its descendants
    pub fn to_xml(&self) -> &str {
        &self.xml
    }
}

fn serialize_element(element: Element<'_>) -> Result<String> {
    let package = Package::new();
    let document = package.as_document();
    let copy = copy_element(&document, element);
    document.root().append_child(copy);

    let mut buffer = Vec::new();
    writer::format_document(&document, &mut buffer).map_err(AdbError::Io)?;
    let xml = String::from_utf8_lossy(&buffer);

    // drop the XML declaration the writer always emits
    let body = match (xml.starts_with("<?xml"), xml.find("?>")) {
        (true, Some(end)) => &xml[end + 2..],
        _ => &xml[..],
    };
    Ok(body.trim().to_string())
}

fn copy_element<'d>(document: &Document<'d>, source: Element<'_>) -> Element<'d> {
    let copy = document.create_element(source.name().local_part());
    for attribute in source.attributes() {
        copy.set_attribute_value(attribute.name().local_part(), attribute.value());
    }
    for child in source.children() {
        match child {
            ChildOfElement::Element(child) => copy.append_child(copy_element(document, child)),
            ChildOfElement::Text(text) => copy.append_child(document.create_text(text.text())),
            _ => {}
        }
    }
    copy
}
