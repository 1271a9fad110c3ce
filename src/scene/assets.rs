//! Asynchronous asset requests and their completions.
//!
//! Components that need external files leave a placeholder in the graph and
//! queue an [`AssetRequest`]. The host runs [`load`] wherever it can await
//! (a tokio task natively, `spawn_local` on the web) and hands the resulting
//! [`LoadedAsset`] back to [`SynthwaveScene::resolve`](super::SynthwaveScene::resolve)
//! on the render thread.

use std::sync::Arc;

use crate::{
    config::SvgLayer,
    data_structures::scene_graph::{SceneNode, SlotId},
    lifecycle::ComponentId,
    resources::{svg::load_svg, texture::load_image},
    scene::{skybox, svgs},
};

#[derive(Clone, Debug, PartialEq)]
pub enum AssetKind {
    SkyboxTexture { path: String },
    SvgLayer { layer: SvgLayer, ambient: f32 },
}

impl AssetKind {
    pub fn path(&self) -> &str {
        match self {
            AssetKind::SkyboxTexture { path } => path,
            AssetKind::SvgLayer { layer, .. } => &layer.path,
        }
    }
}

/// A pending load, addressed to one placeholder of one component.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetRequest {
    pub slot: SlotId,
    pub owner: ComponentId,
    pub kind: AssetKind,
}

/// The outcome of an [`AssetRequest`].
#[derive(Debug)]
pub struct LoadedAsset {
    pub slot: SlotId,
    pub owner: ComponentId,
    pub path: String,
    pub result: anyhow::Result<SceneNode>,
}

impl LoadedAsset {
    pub fn failed(request: &AssetRequest, error: anyhow::Error) -> Self {
        Self {
            slot: request.slot,
            owner: request.owner,
            path: request.kind.path().to_string(),
            result: Err(error),
        }
    }
}

/// Fetches and decodes the asset and builds its subtree.
pub async fn load(request: AssetRequest) -> LoadedAsset {
    let path = request.kind.path().to_string();
    let result = match &request.kind {
        AssetKind::SkyboxTexture { path } => load_image(path)
            .await
            .map(|image| skybox::backdrop(Arc::new(image))),
        AssetKind::SvgLayer { layer, ambient } => load_svg(&layer.path)
            .await
            .map(|shapes| svgs::layer(layer, shapes, *ambient)),
    };
    LoadedAsset {
        slot: request.slot,
        owner: request.owner,
        path,
        result,
    }
}
