//! Element resolution
//!
//! `ElementResolver` turns lookup criteria into [`UiElement`]s:
//! - attribute filters and raw XPath run against the hierarchy dump
//! - text search runs OCR over the screenshot
//! - shape search runs rectangle detection over the screenshot
//!
//! The resolver owns the most recently parsed hierarchy. It is not meant to
//! be shared: issue calls one at a time.

use image::RgbImage;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{canonical_key, OcrConfig};
use crate::element::{Bounds, ElementSource, UiElement};
use crate::error::{AdbError, Result};
use crate::gateway::DeviceGateway;
use crate::hierarchy::Hierarchy;
use crate::ocr::{is_match, OcrService, YoutuOcr};
use crate::shape::{ContourShapeDetector, ShapeDetector};

/// Resolves lookups against one device
pub struct ElementResolver {
    gateway: Arc<dyn DeviceGateway>,
    hierarchy: Option<Hierarchy>,
    ocr: Option<Box<dyn OcrService>>,
    shape: Option<Box<dyn ShapeDetector>>,
}

impl ElementResolver {
    /// Create a resolver; OCR and shape search stay disabled until initialized
    pub fn new(gateway: Arc<dyn DeviceGateway>) -> Self {
        Self {
            gateway,
            hierarchy: None,
            ocr: None,
            shape: None,
        }
    }

    /// Enable text search through the Youtu OCR service
    pub fn init_ocr(&mut self, config: OcrConfig) -> Result<()> {
        let ocr = YoutuOcr::new(config)?;
        self.set_ocr(Box::new(ocr));
        Ok(())
    }

    /// Enable text search through a custom OCR service
    pub fn set_ocr(&mut self, ocr: Box<dyn OcrService>) {
        self.ocr = Some(ocr);
    }

    /// Enable shape search with the default contour detector
    pub fn init_shape(&mut self) {
        self.set_shape(Box::new(ContourShapeDetector::default()));
    }

    /// Enable shape search through a custom detector
    pub fn set_shape(&mut self, shape: Box<dyn ShapeDetector>) {
        self.shape = Some(shape);
    }

    pub fn gateway(&self) -> &Arc<dyn DeviceGateway> {
        &self.gateway
    }

    /// Fetch a new dump and parse it, replacing the cached hierarchy
    pub async fn refresh(&mut self) -> Result<()> {
        self.gateway.dump().await?;
        let hierarchy = Hierarchy::load(&self.gateway.dump_path()).await?;
        self.hierarchy = Some(hierarchy);
        Ok(())
    }

    async fn current_hierarchy(&mut self, refresh: bool) -> Result<&Hierarchy> {
        if refresh {
            self.refresh().await?;
        } else if self.hierarchy.is_none() {
            // nothing parsed yet: use whatever dump is already on disk
            let hierarchy = Hierarchy::load(&self.gateway.dump_path()).await?;
            self.hierarchy = Some(hierarchy);
        }

        self.hierarchy
            .as_ref()
            .ok_or_else(|| AdbError::MalformedDump("no hierarchy loaded".to_string()))
    }

    /// All elements whose attributes satisfy every filter.
    ///
    /// Keys may be short aliases (`id`, `class_`, `desc`). With `fuzzy` each
    /// value must be contained in the attribute, otherwise equal to it.
    pub async fn find_by_attributes(
        &mut self,
        filters: &[(&str, &str)],
        fuzzy: bool,
        refresh: bool,
    ) -> Result<Vec<UiElement>> {
        let xpath = attribute_xpath(filters, fuzzy);
        self.find_by_xpath(&xpath, refresh).await
    }

    /// First element matching the filters, if any
    pub async fn find_one_by_attributes(
        &mut self,
        filters: &[(&str, &str)],
        fuzzy: bool,
        refresh: bool,
    ) -> Result<Option<UiElement>> {
        let elements = self.find_by_attributes(filters, fuzzy, refresh).await?;
        Ok(elements.into_iter().next())
    }

    /// All elements selected by an XPath expression, in document order
    pub async fn find_by_xpath(
        &mut self,
        expression: &str,
        refresh: bool,
    ) -> Result<Vec<UiElement>> {
        let nodes = self.current_hierarchy(refresh).await?.select(expression)?;

        let elements = nodes
            .into_iter()
            .map(|node| UiElement::from_node(node, self.gateway.clone()))
            .collect::<Result<Vec<_>>>()?;

        info!("XPath {} matched {} elements", expression, elements.len());
        Ok(elements)
    }

    /// First element selected by an XPath expression, if any
    pub async fn find_one_by_xpath(
        &mut self,
        expression: &str,
        refresh: bool,
    ) -> Result<Option<UiElement>> {
        let elements = self.find_by_xpath(expression, refresh).await?;
        Ok(elements.into_iter().next())
    }

    /// Recognized text items that contain the characters of `target`.
    ///
    /// An item qualifies when at least `min_hits` characters of `target` are
    /// found in it (each item character used once, order ignored).
    /// `min_hits` defaults to the length of `target`, as does `Some(0)`.
    /// Items keep the OCR service's order.
    pub async fn find_by_text(
        &mut self,
        target: &str,
        min_hits: Option<usize>,
        refresh: bool,
    ) -> Result<Vec<UiElement>> {
        let ocr = self.ocr.as_ref().ok_or(AdbError::NotInitialized(
            "init_ocr must be called before searching by text",
        ))?;

        if refresh {
            self.gateway.screenshot().await?;
        }
        let screen = load_screen(self.gateway.as_ref()).await?;
        let items = ocr.recognize(&screen).await?;
        debug!("OCR recognized {} items", items.len());

        let elements = items
            .into_iter()
            .filter(|item| is_match(target, &item.text, min_hits))
            .map(|item| -> Result<UiElement> {
                let bounds = Bounds::try_from(item.rect)?;
                Ok(UiElement::new(
                    bounds,
                    ElementSource::Ocr(item.text),
                    self.gateway.clone(),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        info!("Text {:?} matched {} OCR items", target, elements.len());
        Ok(elements)
    }

    /// First OCR match for `target`, if any
    pub async fn find_one_by_text(
        &mut self,
        target: &str,
        min_hits: Option<usize>,
        refresh: bool,
    ) -> Result<Option<UiElement>> {
        let elements = self.find_by_text(target, min_hits, refresh).await?;
        Ok(elements.into_iter().next())
    }

    /// Rectangles on a fresh screenshot whose size is inside the ranges.
    ///
    /// With `crop_box` only that region is searched. The box is clamped to the
    /// screen rather than padded, and results are moved back by the box
    /// origin so they stay in screen coordinates and can be tapped directly.
    /// A box with no on-screen area finds nothing.
    pub async fn find_by_shape(
        &mut self,
        width_range: (u32, u32),
        height_range: (u32, u32),
        crop_box: Option<Bounds>,
    ) -> Result<Vec<UiElement>> {
        let shape = self.shape.as_ref().ok_or(AdbError::NotInitialized(
            "init_shape must be called before searching by shape",
        ))?;

        self.gateway.screenshot().await?;
        let screen = load_screen(self.gateway.as_ref()).await?;

        let (screen, origin) = match crop_box {
            Some(area) => match crop(&screen, area) {
                Some(cropped) => cropped,
                None => {
                    debug!("Crop box {} is off screen", area);
                    return Ok(Vec::new());
                }
            },
            None => (screen, (0, 0)),
        };

        let elements = shape
            .detect(&screen, width_range, height_range)?
            .into_iter()
            .map(|rect| -> Result<UiElement> {
                let bounds = rect.translate(origin.0, origin.1)?;
                Ok(UiElement::new(bounds, ElementSource::Shape, self.gateway.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        info!("Shape search matched {} rectangles", elements.len());
        Ok(elements)
    }

    /// First shape match, if any
    pub async fn find_one_by_shape(
        &mut self,
        width_range: (u32, u32),
        height_range: (u32, u32),
        crop_box: Option<Bounds>,
    ) -> Result<Option<UiElement>> {
        let elements = self
            .find_by_shape(width_range, height_range, crop_box)
            .await?;
        Ok(elements.into_iter().next())
    }
}

/// Build the descendant query for a set of attribute filters
fn attribute_xpath(filters: &[(&str, &str)], fuzzy: bool) -> String {
    if fuzzy {
        let tests: Vec<String> = filters
            .iter()
            .map(|(key, value)| {
                format!(
                    "contains(@{}, {})",
                    canonical_key(key),
                    xpath_literal(value)
                )
            })
            .collect();
        if tests.is_empty() {
            ".//*".to_string()
        } else {
            format!(".//*[{}]", tests.join(" and "))
        }
    } else {
        let predicates: String = filters
            .iter()
            .map(|(key, value)| format!("[@{}={}]", canonical_key(key), xpath_literal(value)))
            .collect();
        format!(".//*{}", predicates)
    }
}

/// Quote a string for XPath 1.0, which has no escape sequences
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value
            .split('\'')
            .map(|part| format!("'{}'", part))
            .collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// Current screenshot as an RGB raster
async fn load_screen(gateway: &dyn DeviceGateway) -> Result<RgbImage> {
    let path = gateway.screenshot_path();
    let bytes = tokio::fs::read(&path).await?;
    let screen = image::load_from_memory(&bytes)?.to_rgb8();
    debug!(
        "Loaded screenshot {} ({}x{})",
        path.display(),
        screen.width(),
        screen.height()
    );
    Ok(screen)
}

/// Cut `area` out of the screen, clamped to its edges; returns the crop and
/// its origin, or `None` when nothing of `area` is on screen
fn crop(screen: &RgbImage, area: Bounds) -> Option<(RgbImage, (i32, i32))> {
    let clamp_x = |v: i32| v.clamp(0, screen.width() as i32) as u32;
    let clamp_y = |v: i32| v.clamp(0, screen.height() as i32) as u32;

    let (x1, y1) = (clamp_x(area.x1()), clamp_y(area.y1()));
    let (x2, y2) = (clamp_x(area.x2()), clamp_y(area.y2()));

    if x2 <= x1 || y2 <= y1 {
        return None;
    }

    let cropped = image::imageops::crop_imm(screen, x1, y1, x2 - x1, y2 - y1).to_image();
    Some((cropped, (x1 as i32, y1 as i32)))
}
