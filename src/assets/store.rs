use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context as _;

use crate::foundation::core::{MouthShape, Resolution};
use crate::foundation::error::{LipsyncError, LipsyncResult};

/// Read side of the sprite assets: where each mouth shape lives and what it looks like.
pub trait SpriteSource: Sync {
    /// Location of the sprite for `shape`, or `None` when the shape has no sprite.
    fn locate(&self, shape: MouthShape) -> Option<PathBuf>;

    /// Pixel dimensions of a present sprite, read without decoding the full image when possible.
    fn dimensions(&self, shape: MouthShape) -> LipsyncResult<Resolution>;

    /// Decode a present sprite as straight-alpha RGBA8.
    fn load_rgba(&self, shape: MouthShape) -> LipsyncResult<image::RgbaImage>;
}

/// Write side: one materialized frame image per mouth shape.
pub trait FrameStore: Sync {
    /// Persist `frame` for `shape`, returning the absolute path the encoder will read.
    fn store(&self, shape: MouthShape, frame: &image::RgbaImage) -> LipsyncResult<PathBuf>;
}

/// Sprites on disk following the `mouth_<CODE>.png` naming convention.
#[derive(Clone, Debug)]
pub struct DirSpriteSource {
    dir: PathBuf,
}

impl DirSpriteSource {
    pub fn new(dir: impl Into<PathBuf>) -> LipsyncResult<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(LipsyncError::configuration(format!(
                "sprite directory '{}' does not exist",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SpriteSource for DirSpriteSource {
    fn locate(&self, shape: MouthShape) -> Option<PathBuf> {
        let path = self.dir.join(shape.file_name());
        path.is_file().then_some(path)
    }

    fn dimensions(&self, shape: MouthShape) -> LipsyncResult<Resolution> {
        let path = self.dir.join(shape.file_name());
        let (width, height) = image::image_dimensions(&path)
            .with_context(|| format!("read sprite header '{}'", path.display()))?;
        Ok(Resolution { width, height })
    }

    fn load_rgba(&self, shape: MouthShape) -> LipsyncResult<image::RgbaImage> {
        let path = self.dir.join(shape.file_name());
        let img = image::open(&path).with_context(|| format!("decode sprite '{}'", path.display()))?;
        Ok(img.into_rgba8())
    }
}

/// Sprites held in memory, addressed by synthetic paths. Used by tests and embedders.
#[derive(Clone, Debug, Default)]
pub struct InMemorySpriteSource {
    sprites: BTreeMap<MouthShape, image::RgbaImage>,
}

impl InMemorySpriteSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sprite(mut self, shape: MouthShape, sprite: image::RgbaImage) -> Self {
        self.sprites.insert(shape, sprite);
        self
    }

    fn get(&self, shape: MouthShape) -> LipsyncResult<&image::RgbaImage> {
        self.sprites.get(&shape).ok_or_else(|| {
            LipsyncError::configuration(format!("no in-memory sprite for shape {shape}"))
        })
    }
}

impl SpriteSource for InMemorySpriteSource {
    fn locate(&self, shape: MouthShape) -> Option<PathBuf> {
        self.sprites
            .contains_key(&shape)
            .then(|| PathBuf::from("memory").join(shape.file_name()))
    }

    fn dimensions(&self, shape: MouthShape) -> LipsyncResult<Resolution> {
        let sprite = self.get(shape)?;
        Ok(Resolution {
            width: sprite.width(),
            height: sprite.height(),
        })
    }

    fn load_rgba(&self, shape: MouthShape) -> LipsyncResult<image::RgbaImage> {
        self.get(shape).cloned()
    }
}

/// Frame store writing PNG files into a directory.
#[derive(Clone, Debug)]
pub struct DirFrameStore {
    dir: PathBuf,
}

impl DirFrameStore {
    /// Create the directory if needed. The stored directory path is made absolute.
    pub fn create(dir: impl AsRef<Path>) -> LipsyncResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create frame directory '{}'", dir.display()))?;
        let dir = std::path::absolute(dir)
            .with_context(|| format!("resolve frame directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FrameStore for DirFrameStore {
    fn store(&self, shape: MouthShape, frame: &image::RgbaImage) -> LipsyncResult<PathBuf> {
        let path = self.dir.join(shape.file_name());
        frame
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("write frame '{}'", path.display()))?;
        Ok(path)
    }
}

/// Frame store keeping frames in memory under a fixed absolute root.
#[derive(Debug)]
pub struct InMemoryFrameStore {
    root: PathBuf,
    frames: Mutex<BTreeMap<MouthShape, image::RgbaImage>>,
}

impl Default for InMemoryFrameStore {
    fn default() -> Self {
        Self::new("/frames")
    }
}

impl InMemoryFrameStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            frames: Mutex::new(BTreeMap::new()),
        }
    }

    /// Copy of the stored frame for `shape`, if any.
    pub fn frame(&self, shape: MouthShape) -> Option<image::RgbaImage> {
        self.frames
            .lock()
            .ok()
            .and_then(|frames| frames.get(&shape).cloned())
    }

    pub fn len(&self) -> usize {
        self.frames.lock().map(|frames| frames.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FrameStore for InMemoryFrameStore {
    fn store(&self, shape: MouthShape, frame: &image::RgbaImage) -> LipsyncResult<PathBuf> {
        let mut frames = self
            .frames
            .lock()
            .map_err(|_| anyhow::anyhow!("in-memory frame store lock poisoned"))?;
        frames.insert(shape, frame.clone());
        Ok(self.root.join(shape.file_name()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
