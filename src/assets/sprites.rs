use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::assets::store::SpriteSource;
use crate::foundation::core::{MouthShape, Resolution};
use crate::foundation::error::{LipsyncError, LipsyncResult};

/// The validated set of mouth-shape sprites for one run.
///
/// Every present sprite shares one resolution, which becomes the canvas resolution of the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteSet {
    canvas: Resolution,
    sprites: BTreeMap<MouthShape, PathBuf>,
}

impl SpriteSet {
    /// Discover every recognized sprite in `source` and check that they agree on a resolution.
    #[tracing::instrument(skip(source))]
    pub fn load(source: &dyn SpriteSource) -> LipsyncResult<Self> {
        let mut found = Vec::<(MouthShape, PathBuf, Resolution)>::new();
        for shape in MouthShape::ALL {
            let Some(path) = source.locate(shape) else {
                tracing::debug!(%shape, "no sprite for shape");
                continue;
            };
            let res = source.dimensions(shape)?;
            found.push((shape, path, res));
        }

        let Some(&(_, _, canvas)) = found.first() else {
            return Err(LipsyncError::configuration(
                "no mouth images found (expected files named mouth_<CODE>.png)",
            ));
        };

        if found.iter().any(|(_, _, res)| *res != canvas) {
            let mut msg = String::from(
                "mouth images have different resolutions; all images must share one resolution:",
            );
            for (_, path, res) in &found {
                msg.push_str(&format!("\n  - {}: {}", path.display(), res));
            }
            return Err(LipsyncError::configuration(msg));
        }

        tracing::info!(%canvas, count = found.len(), "mouth images share one resolution");
        Ok(Self {
            canvas,
            sprites: found
                .into_iter()
                .map(|(shape, path, _)| (shape, path))
                .collect(),
        })
    }

    pub fn canvas(&self) -> Resolution {
        self.canvas
    }

    pub fn path(&self, shape: MouthShape) -> Option<&Path> {
        self.sprites.get(&shape).map(PathBuf::as_path)
    }

    pub fn contains(&self, shape: MouthShape) -> bool {
        self.sprites.contains_key(&shape)
    }

    /// Present shapes in code order.
    pub fn shapes(&self) -> impl Iterator<Item = MouthShape> + '_ {
        self.sprites.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/sprites.rs"]
mod tests;
