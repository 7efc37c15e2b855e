use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::assets::sprites::SpriteSet;
use crate::assets::store::{FrameStore, SpriteSource};
use crate::foundation::core::{MouthShape, Resolution, Rgb8};
use crate::foundation::error::{LipsyncError, LipsyncResult};
use crate::foundation::math::{center_offset, over_opaque_channel};

/// How sprites become frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// Flatten each sprite over a solid background.
    Opaque { background: Rgb8 },
    /// Keep each sprite's native alpha.
    Transparent,
}

/// Threading options for compositing independent shapes.
#[derive(Clone, Debug, Default)]
pub struct CompositeThreading {
    /// Composite shapes on a rayon pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Index of materialized frames: one absolute path per shape that has a frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSet {
    frames: BTreeMap<MouthShape, PathBuf>,
}

impl FrameSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, shape: MouthShape, path: impl Into<PathBuf>) {
        self.frames.insert(shape, path.into());
    }

    pub fn get(&self, shape: MouthShape) -> Option<&Path> {
        self.frames.get(&shape).map(PathBuf::as_path)
    }

    pub fn contains(&self, shape: MouthShape) -> bool {
        self.frames.contains_key(&shape)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MouthShape, &Path)> {
        self.frames.iter().map(|(shape, path)| (*shape, path.as_path()))
    }
}

impl FromIterator<(MouthShape, PathBuf)> for FrameSet {
    fn from_iter<I: IntoIterator<Item = (MouthShape, PathBuf)>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

/// Turns the sprite set into displayable frames.
#[derive(Clone, Debug)]
pub struct Compositor {
    mode: OutputMode,
    threading: CompositeThreading,
}

impl Compositor {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            threading: CompositeThreading::default(),
        }
    }

    pub fn with_threading(mut self, threading: CompositeThreading) -> Self {
        self.threading = threading;
        self
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Render every present sprite and persist it into `store`.
    #[tracing::instrument(skip_all, fields(mode = ?self.mode, shapes = sprites.len()))]
    pub fn materialize(
        &self,
        sprites: &SpriteSet,
        source: &dyn SpriteSource,
        store: &dyn FrameStore,
    ) -> LipsyncResult<FrameSet> {
        let shapes = sprites.shapes().collect::<Vec<_>>();
        let canvas = sprites.canvas();
        let render_one = |shape: MouthShape| -> LipsyncResult<(MouthShape, PathBuf)> {
            let sprite = source.load_rgba(shape)?;
            let frame = match self.mode {
                OutputMode::Opaque { background } => composite_centered(&sprite, canvas, background),
                OutputMode::Transparent => sprite,
            };
            let path = store.store(shape, &frame)?;
            tracing::debug!(%shape, path = %path.display(), "frame materialized");
            Ok((shape, path))
        };

        let rendered: Vec<LipsyncResult<(MouthShape, PathBuf)>> = if self.threading.parallel {
            let pool = build_thread_pool(self.threading.threads)?;
            pool.install(|| {
                shapes
                    .par_iter()
                    .map(|shape| render_one(*shape))
                    .collect::<Vec<_>>()
            })
        } else {
            shapes.iter().map(|shape| render_one(*shape)).collect()
        };

        rendered.into_iter().collect()
    }
}

/// Center `sprite` on a `canvas`-sized opaque background and alpha-composite it.
///
/// The sprite is placed at `floor((canvas - sprite) / 2)` per axis; parts falling outside the
/// canvas are clipped. The result is fully opaque.
pub fn composite_centered(
    sprite: &image::RgbaImage,
    canvas: Resolution,
    background: Rgb8,
) -> image::RgbaImage {
    let mut out = image::RgbaImage::from_pixel(
        canvas.width,
        canvas.height,
        image::Rgba([background.r, background.g, background.b, 255]),
    );

    let off_x = center_offset(canvas.width, sprite.width());
    let off_y = center_offset(canvas.height, sprite.height());

    for (sx, sy, px) in sprite.enumerate_pixels() {
        let dx = i64::from(sx) + off_x;
        let dy = i64::from(sy) + off_y;
        if dx < 0 || dy < 0 || dx >= i64::from(canvas.width) || dy >= i64::from(canvas.height) {
            continue;
        }

        let [r, g, b, a] = px.0;
        let dst = out.get_pixel_mut(dx as u32, dy as u32);
        dst.0 = [
            over_opaque_channel(r, a, dst.0[0]),
            over_opaque_channel(g, a, dst.0[1]),
            over_opaque_channel(b, a, dst.0[2]),
            255,
        ];
    }
    out
}

fn build_thread_pool(threads: Option<usize>) -> LipsyncResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(LipsyncError::configuration(
            "compositing 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build rayon thread pool: {e}").into())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
