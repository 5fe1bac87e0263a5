//! Export the signature preview as a PNG file.
//!
//! The flow mirrors capturing a DOM subtree: find `#signature-preview` on the
//! rendering surface, deep-clone it, strip every descendant's borders, pin
//! the clone off-screen at a fixed width, attach it, wait for each of its
//! images to load or fail, lay it out, rasterize on white, hand the PNG to a
//! download sink and finally detach the clone. The detach happens exactly
//! once per attempt whatever the outcome.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use crate::assets::{AssetLoader, ImageLoader};
use crate::dom::{self, Element};
use crate::preview::{SignaturePreview, PREVIEW_ID};
use crate::rendering::paint::{self, parse_color};
use crate::rendering::raster::{self, ImageTable};
use crate::rendering::layout;
use crate::settle::{await_all, Settle};
use crate::state::{Action, FormState};
use crate::{Error, ExportConfig, Result};

/// Identifies a node attached to a [`RenderSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(u64);

/// Where the preview lives and where the temporary clone is attached.
pub trait RenderSurface {
    fn find(&self, id: &str) -> Option<&Element>;

    fn attach(&mut self, node: Element) -> SurfaceHandle;

    /// Remove an attached node and hand it back.
    fn detach(&mut self, handle: SurfaceHandle) -> Result<Element>;
}

/// Receives the finished image.
pub trait DownloadSink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> Result<PathBuf>;
}

/// The preview page: its body plus any nodes attached off-screen.
#[derive(Debug, Clone)]
pub struct PreviewDocument {
    body: Element,
    offscreen: Vec<(SurfaceHandle, Element)>,
    next_handle: u64,
}

impl PreviewDocument {
    pub fn parse(html: &str) -> Result<Self> {
        Ok(Self {
            body: dom::parse_body(html)?,
            offscreen: Vec::new(),
            next_handle: 0,
        })
    }

    pub fn from_preview(preview: &SignaturePreview) -> Result<Self> {
        Self::parse(&preview.to_html())
    }

    /// Number of nodes currently attached off-screen.
    pub fn attached(&self) -> usize {
        self.offscreen.len()
    }
}

impl RenderSurface for PreviewDocument {
    fn find(&self, id: &str) -> Option<&Element> {
        self.body.find_by_id(id)
    }

    fn attach(&mut self, node: Element) -> SurfaceHandle {
        let handle = SurfaceHandle(self.next_handle);
        self.next_handle += 1;
        self.offscreen.push((handle, node));
        handle
    }

    fn detach(&mut self, handle: SurfaceHandle) -> Result<Element> {
        let pos = self
            .offscreen
            .iter()
            .position(|(h, _)| *h == handle)
            .ok_or_else(|| Error::ExportError(format!("node {:?} is not attached", handle)))?;
        Ok(self.offscreen.remove(pos).1)
    }
}

/// Writes downloads into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, png)
            .map_err(|e| Error::ExportError(format!("{}: {}", path.display(), e)))?;
        Ok(path)
    }
}

/// Keeps downloads in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub files: Vec<(String, Vec<u8>)>,
}

impl DownloadSink for MemorySink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> Result<PathBuf> {
        self.files.push((file_name.to_string(), png.to_vec()));
        Ok(PathBuf::from(file_name))
    }
}

/// The export clone while it sits on a surface. Detaches on drop as well, so
/// an export future dropped mid-join still cleans up.
struct AttachedClone<'s, S: RenderSurface> {
    surface: &'s mut S,
    handle: Option<SurfaceHandle>,
}

impl<'s, S: RenderSurface> AttachedClone<'s, S> {
    fn attach(surface: &'s mut S, node: Element) -> Self {
        let handle = surface.attach(node);
        log::debug!("attached export clone {:?}", handle);
        Self { surface, handle: Some(handle) }
    }

    /// Detach at most once; failures are logged.
    fn detach(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = self.surface.detach(handle) {
                log::warn!("failed to detach export clone: {}", e);
            }
        }
    }
}

impl<S: RenderSurface> Drop for AttachedClone<'_, S> {
    fn drop(&mut self) {
        self.detach();
    }
}

/// What a successful export produced.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub images_loaded: usize,
    pub images_failed: usize,
    /// Hex SHA-256 of the PNG bytes
    pub digest: String,
}

/// Runs exports with a given configuration and image loader.
pub struct Exporter<'a, L> {
    config: &'a ExportConfig,
    loader: L,
}

impl<'a> Exporter<'a, AssetLoader> {
    pub fn with_default_loader(config: &'a ExportConfig) -> Self {
        Self::new(config, AssetLoader::new(config.asset_dir.clone()))
    }
}

impl<'a, L: ImageLoader> Exporter<'a, L> {
    pub fn new(config: &'a ExportConfig, loader: L) -> Self {
        Self { config, loader }
    }

    /// The download button: refuses while the form cannot download, otherwise
    /// moves the button through generating to success or failure and runs
    /// [`Exporter::export`].
    pub async fn download<S, D>(
        &self,
        state: FormState,
        surface: &mut S,
        sink: &mut D,
    ) -> (FormState, Result<ExportReport>)
    where
        S: RenderSurface,
        D: DownloadSink,
    {
        if !state.can_download() {
            let missing = state.fields().missing();
            log::warn!("download refused, missing fields: {:?}", missing);
            return (state, Err(Error::IncompleteFields(missing)));
        }
        let state = state.apply(Action::ExportStarted);
        let result = self.export(&state, surface, sink).await;
        let state = state.apply(Action::ExportFinished {
            ok: result.is_ok(),
            at: Instant::now(),
        });
        (state, result)
    }

    /// Capture the preview on `surface` and save it through `sink`.
    pub async fn export<S, D>(
        &self,
        state: &FormState,
        surface: &mut S,
        sink: &mut D,
    ) -> Result<ExportReport>
    where
        S: RenderSurface,
        D: DownloadSink,
    {
        let missing = state.fields().missing();
        if !missing.is_empty() {
            return Err(Error::IncompleteFields(missing));
        }
        self.config.validate()?;

        let clone = self.prepare_clone(surface)?;
        let mut attached = AttachedClone::attach(surface, clone.clone());

        let result = self.render_and_save(&clone, sink).await;
        attached.detach();

        match &result {
            Ok(report) => log::info!(
                "signature exported to {} ({}x{}, sha256 {})",
                report.path.display(),
                report.width,
                report.height,
                report.digest
            ),
            Err(e) => log::error!("signature export failed: {}", e),
        }
        result
    }

    fn prepare_clone<S: RenderSurface>(&self, surface: &S) -> Result<Element> {
        let mut clone = surface
            .find(PREVIEW_ID)
            .cloned()
            .ok_or_else(|| Error::PreviewNotFound(PREVIEW_ID.to_string()))?;
        clone.for_each_descendant_mut(&mut |el| el.style.strip_borders());
        clone.style.set("position", "absolute");
        clone.style.set("top", "-9999px");
        clone.style.set("width", format!("{}px", self.config.width));
        clone.style.set("height", "auto");
        Ok(clone)
    }

    async fn render_and_save<D: DownloadSink>(
        &self,
        clone: &Element,
        sink: &mut D,
    ) -> Result<ExportReport> {
        let mut imgs = Vec::new();
        clone.elements_by_tag("img", &mut imgs);
        let signals: Vec<_> = imgs
            .iter()
            .map(|img| {
                let src = img.attr("src").unwrap_or_default().to_string();
                let signal = self.loader.load(&src);
                (src, signal.settled())
            })
            .collect();

        let mut images: ImageTable = HashMap::new();
        let mut failed = 0;
        for (src, outcome) in await_all(signals).await {
            match outcome {
                Settle::Loaded(img) => {
                    images.insert(src, img);
                }
                Settle::Errored(reason) => {
                    log::debug!("image settled with error: {}", reason);
                    failed += 1;
                }
            }
        }

        let background = parse_color(&self.config.background).ok_or_else(|| {
            Error::ConfigError(format!("bad background color {}", self.config.background))
        })?;
        let tree = layout::layout_root(clone, self.config.width)?;
        let commands = paint::build_display_list(&tree);
        let shot = raster::rasterize(&commands, tree.width, tree.height, background, &images)?;
        let path = sink.save(&self.config.file_name, &shot.png_data)?;

        Ok(ExportReport {
            path,
            width: shot.width,
            height: shot.height,
            images_loaded: images.len(),
            images_failed: failed,
            digest: shot.digest(),
        })
    }
}
