//! Asynchronous animation asset resolution.

use std::fmt;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::animation::{Animation, SharedAnimation};
use crate::error::AnimationError;
use crate::stored_animation::parse_animation_json;
use crate::value::InterpolationMethod;

/// What an asset resolves to. `animation` is `None` when the asset holds no
/// playable data; the instance then stays unloaded.
#[derive(Clone, Debug)]
pub struct LoadedAnimation {
    pub animation: Option<SharedAnimation>,
    pub interpolation_method: InterpolationMethod,
}

/// Source of an animation resource, resolved on `load()`.
pub trait AnimationAssetLoader: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    fn load(&self) -> BoxFuture<'static, Result<LoadedAnimation, AnimationError>>;
}

/// Cloneable handle to an asset loader.
#[derive(Clone)]
pub struct AnimationAssetRef(Arc<dyn AnimationAssetLoader>);

impl AnimationAssetRef {
    pub fn new(loader: impl AnimationAssetLoader + 'static) -> Self {
        Self(Arc::new(loader))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub async fn resolve(&self) -> Result<LoadedAnimation, AnimationError> {
        self.0.load().await
    }
}

impl fmt::Debug for AnimationAssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnimationAssetRef").field(&self.name()).finish()
    }
}

/// Asset that is already resident.
pub struct ResidentAnimationAsset {
    name: String,
    loaded: LoadedAnimation,
}

impl ResidentAnimationAsset {
    pub fn new(
        name: impl Into<String>,
        animation: Option<SharedAnimation>,
        interpolation_method: InterpolationMethod,
    ) -> Self {
        Self {
            name: name.into(),
            loaded: LoadedAnimation {
                animation,
                interpolation_method,
            },
        }
    }

    pub fn from_animation(name: impl Into<String>, animation: Animation) -> Self {
        Self::new(
            name,
            Some(SharedAnimation::new(animation)),
            InterpolationMethod::default(),
        )
    }
}

impl AnimationAssetLoader for ResidentAnimationAsset {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> BoxFuture<'static, Result<LoadedAnimation, AnimationError>> {
        futures::future::ready(Ok(self.loaded.clone())).boxed()
    }
}

/// Stored-animation JSON parsed when loaded.
pub struct JsonAnimationAsset {
    name: String,
    json: Arc<str>,
}

impl JsonAnimationAsset {
    pub fn new(name: impl Into<String>, json: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            json: json.into(),
        }
    }
}

impl AnimationAssetLoader for JsonAnimationAsset {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> BoxFuture<'static, Result<LoadedAnimation, AnimationError>> {
        let name = self.name.clone();
        let json = Arc::clone(&self.json);
        async move {
            let parsed = parse_animation_json(&json).map_err(|err| AnimationError::AssetLoad {
                asset: name,
                reason: err.to_string(),
            })?;
            Ok(LoadedAnimation {
                animation: Some(SharedAnimation::new(parsed.animation)),
                interpolation_method: parsed.interpolation_method,
            })
        }
        .boxed()
    }
}
