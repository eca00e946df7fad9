//! Fake collaborators for unit tests

use async_trait::async_trait;
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

use crate::element::Bounds;
use crate::error::{AdbError, Result};
use crate::gateway::DeviceGateway;
use crate::ocr::{OcrItem, OcrService};
use crate::shape::ShapeDetector;

/// Gateway that writes canned artifacts and records taps
pub(crate) struct FakeGateway {
    _dir: TempDir,
    stem: PathBuf,
    dump_xml: Mutex<Option<String>>,
    screen: Mutex<Option<RgbImage>>,
    dumps: AtomicUsize,
    screenshots: AtomicUsize,
    taps: Mutex<Vec<(i32, i32)>>,
}

impl FakeGateway {
    pub(crate) fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("device");
        Self {
            _dir: dir,
            stem,
            dump_xml: Mutex::new(None),
            screen: Mutex::new(None),
            dumps: AtomicUsize::new(0),
            screenshots: AtomicUsize::new(0),
            taps: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_dump(self, xml: &str) -> Self {
        self.set_dump(xml);
        self
    }

    pub(crate) fn with_screen(self, width: u32, height: u32) -> Self {
        *self.screen.lock().unwrap() = Some(RgbImage::new(width, height));
        self
    }

    /// Replace the dump the next `dump()` call writes
    pub(crate) fn set_dump(&self, xml: &str) {
        *self.dump_xml.lock().unwrap() = Some(xml.to_string());
    }

    pub(crate) fn dump_count(&self) -> usize {
        self.dumps.load(Ordering::SeqCst)
    }

    pub(crate) fn screenshot_count(&self) -> usize {
        self.screenshots.load(Ordering::SeqCst)
    }

    pub(crate) fn taps(&self) -> Vec<(i32, i32)> {
        self.taps.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceGateway for FakeGateway {
    async fn dump(&self) -> Result<()> {
        self.dumps.fetch_add(1, Ordering::SeqCst);
        let xml = self.dump_xml.lock().unwrap().clone();
        match xml {
            Some(xml) => Ok(std::fs::write(self.dump_path(), xml)?),
            None => Err(AdbError::CommandFailed("no device".to_string())),
        }
    }

    async fn screenshot(&self) -> Result<()> {
        self.screenshots.fetch_add(1, Ordering::SeqCst);
        let screen = self.screen.lock().unwrap().clone();
        match screen {
            Some(screen) => Ok(screen.save(self.screenshot_path())?),
            None => Err(AdbError::CommandFailed("no device".to_string())),
        }
    }

    fn temp_path(&self) -> &Path {
        &self.stem
    }

    async fn tap(&self, x: i32, y: i32) -> Result<()> {
        self.taps.lock().unwrap().push((x, y));
        Ok(())
    }
}

/// OCR service returning fixed items and remembering the image size it saw
pub(crate) struct FakeOcr {
    items: Vec<OcrItem>,
    seen: Mutex<Vec<(u32, u32)>>,
}

impl FakeOcr {
    pub(crate) fn new(items: Vec<OcrItem>) -> Self {
        Self {
            items,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn seen(&self) -> Vec<(u32, u32)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl OcrService for FakeOcr {
    async fn recognize(&self, image: &RgbImage) -> Result<Vec<OcrItem>> {
        self.seen.lock().unwrap().push(image.dimensions());
        Ok(self.items.clone())
    }
}

/// Shape detector returning fixed rectangles, filtered by size
pub(crate) struct FakeShapes {
    rects: Vec<Bounds>,
    seen: Mutex<Vec<(u32, u32)>>,
}

impl FakeShapes {
    pub(crate) fn new(rects: Vec<Bounds>) -> Self {
        Self {
            rects,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn seen(&self) -> Vec<(u32, u32)> {
        self.seen.lock().unwrap().clone()
    }
}

impl ShapeDetector for FakeShapes {
    fn detect(
        &self,
        image: &RgbImage,
        width_range: (u32, u32),
        height_range: (u32, u32),
    ) -> Result<Vec<Bounds>> {
        self.seen.lock().unwrap().push(image.dimensions());
        let within = |value: u32, (min, max): (u32, u32)| (min..=max).contains(&value);
        Ok(self
            .rects
            .iter()
            .copied()
            .filter(|r| within(r.width(), width_range) && within(r.height(), height_range))
            .collect())
    }
}
