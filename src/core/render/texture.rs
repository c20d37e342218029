//=========================================================================
// Textures, Frames & Loading
//=========================================================================
//
// Decoded-image handles and the loader seam.
//
// Architecture:
//   Resource ──ResourceLoader──> Texture (opaque id + pixel size)
//                                   │
//   TextureCache (memoized per Resource)
//                                   │
//   Frame { texture, crop_rect } ──> FrameSequence (animation frames)
//
// Decoding happens outside the engine. A `Texture` is only an identifier
// the host's renderer understands, plus the size needed for layout.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use kurbo::{Rect, Size};
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use crate::core::error::ResourceError;

//=== Resource ============================================================

/// Identifies loadable data: a file on disk or a resource embedded in the
/// host binary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    File(PathBuf),
    Embedded { id: u32, kind: String },
}

impl Resource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn embedded(id: u32, kind: impl Into<String>) -> Self {
        Self::Embedded { id, kind: kind.into() }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Embedded { id, kind } => write!(f, "{}#{}", kind, id),
        }
    }
}

//=== Texture =============================================================

/// Opaque handle to a decoded image owned by the host's renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Texture {
    id: u64,
    size: Size,
}

impl Texture {
    pub fn new(id: u64, size: Size) -> Self {
        Self { id, size }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// Returns `true` if the texture has a non-empty area.
    pub fn is_valid(&self) -> bool {
        self.size.width > 0.0 && self.size.height > 0.0
    }
}

//=== ResourceLoader ======================================================

/// External decoder turning a [`Resource`] into a [`Texture`].
///
/// Loaders must be `Send + Sync`: the [`AsyncLoader`](super::AsyncLoader)
/// calls them from its worker thread.
pub trait ResourceLoader: Send + Sync {
    fn load_texture(&self, resource: &Resource) -> Result<Texture, ResourceError>;
}

//=== TextureCache ========================================================

/// Memoizes textures per resource.
///
/// Failures are not cached; the next request retries the loader.
pub struct TextureCache {
    loader: Arc<dyn ResourceLoader>,
    textures: HashMap<Resource, Texture>,
}

impl TextureCache {
    pub fn new(loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            loader,
            textures: HashMap::new(),
        }
    }

    /// Returns the cached texture for `resource`, loading it on first use.
    pub fn get_or_load(&mut self, resource: &Resource) -> Result<Texture, ResourceError> {
        if let Some(texture) = self.textures.get(resource) {
            return Ok(*texture);
        }

        let texture = self.loader.load_texture(resource)?;
        debug!(target: "resource", "Loaded texture {} ({}x{})", resource, texture.width(), texture.height());
        self.textures.insert(resource.clone(), texture);
        Ok(texture)
    }

    /// Inserts an externally produced texture.
    pub fn insert(&mut self, resource: Resource, texture: Texture) {
        self.textures.insert(resource, texture);
    }

    pub fn get(&self, resource: &Resource) -> Option<Texture> {
        self.textures.get(resource).copied()
    }

    pub fn remove(&mut self, resource: &Resource) -> Option<Texture> {
        self.textures.remove(resource)
    }

    pub fn clear(&mut self) {
        self.textures.clear();
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// The loader this cache was built with.
    pub fn loader(&self) -> Arc<dyn ResourceLoader> {
        Arc::clone(&self.loader)
    }
}

impl fmt::Debug for TextureCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureCache")
            .field("textures", &self.textures.len())
            .finish()
    }
}

//=== Frame ===============================================================

/// A (possibly cropped) region of a texture.
///
/// A frame without a texture is "not loaded": sprites showing it draw
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    texture: Option<Texture>,
    crop_rect: Rect,
}

impl Frame {
    /// Empty, not-loaded frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame covering the whole texture.
    pub fn from_texture(texture: Texture) -> Self {
        let mut frame = Self::new();
        frame.set_texture(texture);
        frame
    }

    /// Loads through `cache`; returns `false` (frame unchanged) on failure.
    pub fn load(&mut self, cache: &mut TextureCache, resource: &Resource) -> bool {
        match cache.get_or_load(resource) {
            Ok(texture) if texture.is_valid() => {
                self.set_texture(texture);
                true
            }
            Ok(_) => {
                warn!(target: "resource", "Texture {} is empty", resource);
                false
            }
            Err(err) => {
                warn!(target: "resource", "Failed to load frame {}: {}", resource, err);
                false
            }
        }
    }

    /// Sets the texture and resets the crop rect to its full extent.
    pub fn set_texture(&mut self, texture: Texture) {
        self.texture = Some(texture);
        self.crop_rect = Rect::from_origin_size((0.0, 0.0), texture.size());
    }

    /// Sets the crop rect, clamping each edge to the texture bounds.
    ///
    /// Ignored while no texture is loaded.
    pub fn set_crop_rect(&mut self, crop_rect: Rect) {
        let Some(texture) = self.texture else {
            return;
        };

        let (w, h) = (texture.width(), texture.height());
        self.crop_rect = Rect::new(
            crop_rect.x0.clamp(0.0, w),
            crop_rect.y0.clamp(0.0, h),
            crop_rect.x1.clamp(0.0, w),
            crop_rect.y1.clamp(0.0, h),
        );
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    pub fn crop_rect(&self) -> Rect {
        self.crop_rect
    }

    /// Size of the cropped region.
    pub fn size(&self) -> Size {
        self.crop_rect.size()
    }

    pub fn is_loaded(&self) -> bool {
        self.texture.is_some()
    }
}

//=== FrameSequence =======================================================

/// Ordered frames of a sprite animation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Splits one texture into `cols × rows` equally sized frames, row by
    /// row.
    pub fn from_grid(texture: Texture, cols: usize, rows: usize) -> Self {
        if cols == 0 || rows == 0 {
            return Self::default();
        }

        let cell_w = texture.width() / cols as f64;
        let cell_h = texture.height() / rows as f64;

        let frames = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .map(|(row, col)| {
                let mut frame = Frame::from_texture(texture);
                let origin = (col as f64 * cell_w, row as f64 * cell_h);
                frame.set_crop_rect(Rect::from_origin_size(origin, (cell_w, cell_h)));
                frame
            })
            .collect();

        Self { frames }
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Same frames in reverse order.
    pub fn reversed(&self) -> Self {
        Self {
            frames: self.frames.iter().rev().copied().collect(),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    //--- Test Helpers -----------------------------------------------------

    /// Loader that serves `*.png` files as 64x32 textures and counts calls.
    #[derive(Default)]
    pub(crate) struct StubLoader {
        pub calls: AtomicUsize,
    }

    impl ResourceLoader for StubLoader {
        fn load_texture(&self, resource: &Resource) -> Result<Texture, ResourceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as u64;
            match resource {
                Resource::File(path) if path.extension().map_or(false, |e| e == "png") => {
                    Ok(Texture::new(100 + n, Size::new(64.0, 32.0)))
                }
                other => Err(ResourceError::NotFound(other.to_string())),
            }
        }
    }

    //=====================================================================
    // Texture Cache Tests
    //=====================================================================

    #[test]
    fn cache_loads_once_per_resource() {
        let loader = Arc::new(StubLoader::default());
        let mut cache = TextureCache::new(loader.clone());
        let hero = Resource::file("hero.png");

        let a = cache.get_or_load(&hero).unwrap();
        let b = cache.get_or_load(&hero).unwrap();

        assert_eq!(a, b);
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_does_not_memoize_failures() {
        let loader = Arc::new(StubLoader::default());
        let mut cache = TextureCache::new(loader.clone());
        let missing = Resource::file("missing.bmp");

        assert!(cache.get_or_load(&missing).is_err());
        assert!(cache.get_or_load(&missing).is_err());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    //=====================================================================
    // Frame Tests
    //=====================================================================

    #[test]
    fn frame_load_failure_leaves_frame_unloaded() {
        let mut cache = TextureCache::new(Arc::new(StubLoader::default()));
        let mut frame = Frame::new();

        assert!(!frame.load(&mut cache, &Resource::embedded(7, "PNG")));
        assert!(!frame.is_loaded());
        assert_eq!(frame.size(), Size::ZERO);
    }

    #[test]
    fn frame_load_sets_full_crop_rect() {
        let mut cache = TextureCache::new(Arc::new(StubLoader::default()));
        let mut frame = Frame::new();

        assert!(frame.load(&mut cache, &Resource::file("hero.png")));
        assert_eq!(frame.crop_rect(), Rect::new(0.0, 0.0, 64.0, 32.0));
    }

    #[test]
    fn crop_rect_is_clamped_to_texture() {
        let mut frame = Frame::from_texture(Texture::new(1, Size::new(64.0, 32.0)));
        frame.set_crop_rect(Rect::new(-10.0, 8.0, 100.0, 40.0));
        assert_eq!(frame.crop_rect(), Rect::new(0.0, 8.0, 64.0, 32.0));
    }

    #[test]
    fn crop_rect_ignored_without_texture() {
        let mut frame = Frame::new();
        frame.set_crop_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(frame.crop_rect(), Rect::ZERO);
    }

    //=====================================================================
    // Frame Sequence Tests
    //=====================================================================

    #[test]
    fn grid_splits_row_major() {
        let sheet = Texture::new(1, Size::new(64.0, 32.0));
        let seq = FrameSequence::from_grid(sheet, 4, 2);

        assert_eq!(seq.len(), 8);
        assert_eq!(seq.frames()[1].crop_rect(), Rect::new(16.0, 0.0, 32.0, 16.0));
        assert_eq!(seq.frames()[4].crop_rect(), Rect::new(0.0, 16.0, 16.0, 32.0));
    }

    #[test]
    fn reversed_flips_order() {
        let seq = FrameSequence::from_grid(Texture::new(1, Size::new(30.0, 10.0)), 3, 1);
        let rev = seq.reversed();
        assert_eq!(rev.frames()[0], seq.frames()[2]);
        assert_eq!(rev.reversed(), seq);
    }
}
