//! Decoded textures and the texture cache
//!
//! Texture lights reference an image by resource key. The cache decodes
//! each key once on a worker thread and shares the result through an `Arc`,
//! so any number of lights can use the same image. Until a decode finishes
//! the key is [`TextureState::Pending`] and the compositor skips the panel
//! for that frame; a failed decode resolves to a checkerboard fallback.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use glam::{Vec2, Vec4};
use image::{ColorType, DynamicImage};
use parking_lot::RwLock;

use lightform_scene::srgb_to_linear;

use crate::error::{TextureError, TextureResult};

/// Linear RGBA float image, rows top to bottom
#[derive(Clone, Debug, PartialEq)]
pub struct HdrTexture {
    width: u32,
    height: u32,
    texels: Vec<Vec4>,
}

impl HdrTexture {
    /// Wrap texel data; `texels.len()` must equal `width * height`
    pub fn new(width: u32, height: u32, texels: Vec<Vec4>) -> Option<Self> {
        if width == 0 || height == 0 || texels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self { width, height, texels })
    }

    /// Solid single-texel texture
    pub fn solid(color: Vec4) -> Self {
        Self { width: 1, height: 1, texels: vec![color] }
    }

    /// Magenta/black checkerboard shown for textures that failed to load
    pub fn checkerboard(size: u32, cells: u32) -> Self {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        let magenta = Vec4::new(1.0, 0.0, 1.0, 1.0);
        let black = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let texels = (0..size)
            .flat_map(|y| (0..size).map(move |x| if ((x / cell) + (y / cell)) % 2 == 0 { magenta } else { black }))
            .collect();
        Self { width: size, height: size, texels }
    }

    /// Convert a decoded image to linear float
    ///
    /// Float sources (EXR, HDR) are already linear; 8/16-bit sources are
    /// treated as sRGB.
    pub fn from_image(image: DynamicImage) -> Self {
        let is_float = matches!(image.color(), ColorType::Rgb32F | ColorType::Rgba32F);
        let rgba = image.to_rgba32f();
        let (width, height) = rgba.dimensions();
        let texels = rgba
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                if is_float {
                    Vec4::new(r, g, b, a)
                } else {
                    Vec4::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a)
                }
            })
            .collect();
        Self { width, height, texels }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> Vec4 {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        self.texels[y * self.width as usize + x]
    }

    /// Bilinear sample with clamp-to-edge; `uv.y = 1` is the top row
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let x = uv.x.clamp(0.0, 1.0) * self.width as f32 - 0.5;
        let y = (1.0 - uv.y.clamp(0.0, 1.0)) * self.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;

        let clamp_x = |v: f32| v.clamp(0.0, (self.width - 1) as f32) as u32;
        let clamp_y = |v: f32| v.clamp(0.0, (self.height - 1) as f32) as u32;
        let (xa, xb) = (clamp_x(x0), clamp_x(x0 + 1.0));
        let (ya, yb) = (clamp_y(y0), clamp_y(y0 + 1.0));

        let top = self.texel(xa, ya).lerp(self.texel(xb, ya), fx);
        let bottom = self.texel(xa, yb).lerp(self.texel(xb, yb), fx);
        top.lerp(bottom, fy)
    }
}

/// Turns a resource key into a decoded texture
pub trait TextureLoader: Send + Sync {
    fn load(&self, key: &str) -> TextureResult<HdrTexture>;
}

/// Loads keys as paths relative to a root directory
#[derive(Clone, Debug)]
pub struct FileTextureLoader {
    root: PathBuf,
}

impl FileTextureLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
}

impl TextureLoader for FileTextureLoader {
    fn load(&self, key: &str) -> TextureResult<HdrTexture> {
        let path = self.root.join(key);
        if !path.is_file() {
            return Err(TextureError::NotFound(key.to_string()));
        }
        let image = image::open(&path).map_err(|e| TextureError::Decode {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        if image.width() == 0 || image.height() == 0 {
            return Err(TextureError::InvalidSize {
                key: key.to_string(),
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(HdrTexture::from_image(image))
    }
}

/// Resolution state of one key
#[derive(Clone, Debug)]
pub enum TextureState {
    /// Decode in flight
    Pending,
    Ready(Arc<HdrTexture>),
    /// Decode failed; carries the fallback image
    Failed(Arc<HdrTexture>),
}

impl TextureState {
    /// Texture to draw with, or `None` while pending
    pub fn texture(&self) -> Option<&Arc<HdrTexture>> {
        match self {
            Self::Pending => None,
            Self::Ready(t) | Self::Failed(t) => Some(t),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

type Completion = (String, TextureResult<HdrTexture>);

/// Shared, decode-once texture store
pub struct TextureCache {
    loader: Arc<dyn TextureLoader>,
    entries: RwLock<HashMap<String, TextureState>>,
    fallback: Arc<HdrTexture>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl TextureCache {
    pub fn new(loader: Arc<dyn TextureLoader>) -> Self {
        let (tx, rx) = unbounded();
        Self {
            loader,
            entries: RwLock::new(HashMap::new()),
            fallback: Arc::new(HdrTexture::checkerboard(64, 8)),
            tx,
            rx,
        }
    }

    /// Cache backed by files under `root`
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self::new(Arc::new(FileTextureLoader::new(root)))
    }

    /// The image drawn for failed keys
    pub fn fallback(&self) -> Arc<HdrTexture> {
        self.fallback.clone()
    }

    /// Register an already-decoded texture under `key`
    pub fn insert(&self, key: impl Into<String>, texture: HdrTexture) -> Arc<HdrTexture> {
        let texture = Arc::new(texture);
        self.entries.write().insert(key.into(), TextureState::Ready(texture.clone()));
        texture
    }

    /// Current state of `key`, starting a decode on first use
    pub fn request(&self, key: &str) -> TextureState {
        if let Some(state) = self.entries.read().get(key) {
            return state.clone();
        }

        let mut entries = self.entries.write();
        if let Some(state) = entries.get(key) {
            return state.clone();
        }

        if key.is_empty() {
            log::warn!("{}", TextureError::EmptyKey);
            let state = TextureState::Failed(self.fallback.clone());
            entries.insert(String::new(), state.clone());
            return state;
        }

        entries.insert(key.to_string(), TextureState::Pending);
        drop(entries);

        let loader = self.loader.clone();
        let tx = self.tx.clone();
        let owned = key.to_string();
        log::debug!("Decoding texture '{}'", owned);
        let spawned = thread::Builder::new()
            .name(format!("texture-decode:{}", owned))
            .spawn(move || {
                let result = loader.load(&owned);
                let _ = tx.send((owned, result));
            });
        if let Err(e) = spawned {
            self.complete(key.to_string(), Err(TextureError::Io(e)));
        }
        TextureState::Pending
    }

    /// Current state without starting a decode
    pub fn get(&self, key: &str) -> Option<TextureState> {
        self.entries.read().get(key).cloned()
    }

    fn complete(&self, key: String, result: TextureResult<HdrTexture>) {
        let state = match result {
            Ok(texture) => {
                log::debug!("Texture '{}' ready ({}x{})", key, texture.width(), texture.height());
                TextureState::Ready(Arc::new(texture))
            }
            Err(e) => {
                log::warn!("Texture '{}' failed, using fallback: {}", key, e);
                TextureState::Failed(self.fallback.clone())
            }
        };
        self.entries.write().insert(key, state);
    }

    /// Apply finished decodes; returns how many resolved
    pub fn poll(&self) -> usize {
        let mut resolved = 0;
        while let Ok((key, result)) = self.rx.try_recv() {
            self.complete(key, result);
            resolved += 1;
        }
        resolved
    }

    /// Number of keys still decoding
    pub fn pending(&self) -> usize {
        self.entries.read().values().filter(|s| s.is_pending()).count()
    }

    /// Block until nothing is pending or `timeout` passes; returns whether idle
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.poll();
        while self.pending() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok((key, result)) => self.complete(key, result),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLoader {
        calls: AtomicUsize,
    }

    impl TextureLoader for CountingLoader {
        fn load(&self, key: &str) -> TextureResult<HdrTexture> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if key == "missing.exr" {
                return Err(TextureError::NotFound(key.to_string()));
            }
            Ok(HdrTexture::solid(Vec4::new(2.0, 1.0, 0.5, 1.0)))
        }
    }

    #[test]
    fn test_bilinear_sample() {
        let tex = HdrTexture::new(2, 1, vec![Vec4::ZERO, Vec4::ONE]).unwrap();
        let mid = tex.sample(Vec2::new(0.5, 0.5));
        assert!((mid.x - 0.5).abs() < 1e-6);
        assert_eq!(tex.sample(Vec2::new(0.0, 0.5)), Vec4::ZERO);
        assert_eq!(tex.sample(Vec2::new(1.0, 0.5)), Vec4::ONE);
    }

    #[test]
    fn test_v_is_flipped() {
        let top = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let bottom = Vec4::new(0.0, 0.0, 1.0, 1.0);
        let tex = HdrTexture::new(1, 2, vec![top, bottom]).unwrap();
        assert_eq!(tex.sample(Vec2::new(0.5, 1.0)), top);
        assert_eq!(tex.sample(Vec2::new(0.5, 0.0)), bottom);
    }

    #[test]
    fn test_checkerboard() {
        let tex = HdrTexture::checkerboard(4, 2);
        assert_eq!(tex.texel(0, 0), Vec4::new(1.0, 0.0, 1.0, 1.0));
        assert_eq!(tex.texel(2, 0), Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_decode_once_and_share() {
        let loader = Arc::new(CountingLoader { calls: AtomicUsize::new(0) });
        let cache = TextureCache::new(loader.clone());
        assert!(cache.request("a.exr").is_pending());
        assert!(cache.request("a.exr").is_pending() || cache.get("a.exr").is_some());
        assert!(cache.wait_idle(Duration::from_secs(5)));

        let first = cache.request("a.exr");
        let second = cache.request("a.exr");
        let (a, b) = (first.texture().unwrap(), second.texture().unwrap());
        assert!(Arc::ptr_eq(a, b));
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_uses_fallback() {
        let loader = Arc::new(CountingLoader { calls: AtomicUsize::new(0) });
        let cache = TextureCache::new(loader);
        cache.request("missing.exr");
        assert!(cache.wait_idle(Duration::from_secs(5)));
        match cache.request("missing.exr") {
            TextureState::Failed(t) => assert!(Arc::ptr_eq(&t, &cache.fallback())),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(cache.request(""), TextureState::Failed(_)));
    }

    #[test]
    fn test_file_loader_reads_png_as_linear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grey.png");
        image::RgbaImage::from_pixel(2, 2, image::Rgba([128, 128, 128, 255])).save(&path).unwrap();

        let tex = FileTextureLoader::new(dir.path()).load("grey.png").unwrap();
        assert_eq!((tex.width(), tex.height()), (2, 2));
        assert!((tex.texel(0, 0).x - 0.2158).abs() < 1e-3);

        assert!(matches!(
            FileTextureLoader::new(dir.path()).load("nope.png"),
            Err(TextureError::NotFound(_))
        ));
    }
}
