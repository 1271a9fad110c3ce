//! The synthwave scene: every element, mounted in draw order.
//!
//! [`SynthwaveScene::mount`] builds the whole graph up front. Static
//! elements are complete immediately; the skybox and skyline layers start as
//! placeholders whose loads are queued in [`SynthwaveScene::take_requests`].
//! Each element is a component with its own lifecycle handle, and animated
//! elements are subscribed to the [`AnimationDriver`] while mounted.

use crate::{
    animation::AnimationDriver,
    camera::Camera,
    config::SceneConfig,
    data_structures::scene_graph::{GroupNode, PendingNode, SceneNode, SlotId},
    lifecycle::{Lifecycle, LifecycleHandle},
    placement::Placement,
};

pub mod assets;
pub mod ground;
pub mod palm_trees;
pub mod pyramids;
pub mod road;
pub mod skybox;
pub mod svgs;

pub use assets::{AssetKind, AssetRequest, LoadedAsset};

/// The elements of the scene, in draw order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component {
    SkyBox,
    Road,
    Floor,
    RoadLines,
    SideWalk,
    GroupedPyramids,
    PalmTrees,
    Svgs,
}

impl Component {
    pub const ALL: [Component; 8] = [
        Component::SkyBox,
        Component::Road,
        Component::Floor,
        Component::RoadLines,
        Component::SideWalk,
        Component::GroupedPyramids,
        Component::PalmTrees,
        Component::Svgs,
    ];

    /// Name of the component's root group in the scene graph.
    pub fn name(self) -> &'static str {
        match self {
            Component::SkyBox => "skyBox",
            Component::Road => "road",
            Component::Floor => "floor",
            Component::RoadLines => "roadLines",
            Component::SideWalk => "sideWalk",
            Component::GroupedPyramids => "groupedPyramids",
            Component::PalmTrees => "palmTrees",
            Component::Svgs => "svgs",
        }
    }

    /// Whether the component owns materials with a time uniform.
    pub fn is_animated(self) -> bool {
        matches!(
            self,
            Component::Floor
                | Component::SideWalk
                | Component::GroupedPyramids
                | Component::PalmTrees
        )
    }
}

#[derive(Debug)]
struct Mounted {
    component: Component,
    handle: LifecycleHandle,
}

pub struct SynthwaveScene {
    pub camera: Camera,
    root: SceneNode,
    lifecycle: Lifecycle,
    driver: AnimationDriver,
    mounted: Vec<Mounted>,
    requests: Vec<AssetRequest>,
    next_slot: u32,
    config: SceneConfig,
}

impl SynthwaveScene {
    /// Builds and mounts every component for a `width` × `height` viewport.
    pub fn mount(width: u32, height: u32, config: SceneConfig) -> Self {
        let mut placement = match config.seed {
            Some(seed) => Placement::seeded(seed, config.anti_repeat),
            None => Placement::new(config.anti_repeat),
        };

        let mut scene = Self {
            camera: Camera::new(&config.camera, width, height),
            root: GroupNode::new("synthwave").into(),
            lifecycle: Lifecycle::new(),
            driver: AnimationDriver::new(),
            mounted: Vec::with_capacity(Component::ALL.len()),
            requests: Vec::new(),
            next_slot: 0,
            config,
        };
        for component in Component::ALL {
            scene.mount_component(component, &mut placement);
        }
        log::info!(
            "scene mounted: {} components, {} meshes, {} assets pending",
            scene.mounted.len(),
            scene.root.meshes().len(),
            scene.requests.len()
        );
        scene
    }

    fn mount_component(&mut self, component: Component, placement: &mut Placement) {
        let handle = self.lifecycle.mount(component.name());
        let owner = handle.id();
        let ambient = self.config.ambient_intensity;

        let mut node = match component {
            Component::SkyBox => {
                let path = self.config.assets.skybox.clone();
                let pending = self.request(owner, "skyBoxPending", AssetKind::SkyboxTexture { path });
                GroupNode::new(component.name()).with_child(pending).into()
            }
            Component::Road => road::road(ambient),
            Component::Floor => ground::floor(),
            Component::RoadLines => road::road_lines(ambient),
            Component::SideWalk => ground::sidewalk(),
            Component::GroupedPyramids => pyramids::grouped_pyramids(placement),
            Component::PalmTrees => palm_trees::palm_trees(placement),
            Component::Svgs => {
                let mut group = GroupNode::new(component.name());
                for layer in self.config.assets.svgs.clone() {
                    let name = format!("{}Pending", layer.name);
                    let kind = AssetKind::SvgLayer { layer, ambient };
                    group.add_child(self.request(owner, &name, kind));
                }
                group.into()
            }
        };

        node.claim(owner);
        if component.is_animated() {
            self.driver.subscribe(owner);
        }
        if let SceneNode::Group(root) = &mut self.root {
            root.add_child(node);
        }
        self.mounted.push(Mounted { component, handle });
    }

    fn request(
        &mut self,
        owner: crate::lifecycle::ComponentId,
        name: &str,
        kind: AssetKind,
    ) -> PendingNode {
        let slot = SlotId(self.next_slot);
        self.next_slot += 1;
        self.requests.push(AssetRequest { slot, owner, kind });
        PendingNode {
            slot,
            name: name.to_string(),
            owner: Some(owner),
        }
    }

    /// Writes `elapsed` seconds into every subscribed animated material.
    /// Returns how many materials were updated.
    pub fn advance(&mut self, elapsed: f32) -> usize {
        self.driver.advance(elapsed, &mut self.root)
    }

    /// Tears a component down: stops its animation, ends its lifecycle and
    /// detaches its subtree, which is returned. Late asset completions for
    /// it are ignored from then on.
    pub fn unmount(&mut self, component: Component) -> Option<SceneNode> {
        let index = self
            .mounted
            .iter()
            .position(|mounted| mounted.component == component)?;
        let Mounted { handle, .. } = self.mounted.remove(index);
        self.driver.unsubscribe(handle.id());
        self.lifecycle.unmount(handle);
        log::debug!(
            "unmounted {}, {} components still live",
            component.name(),
            self.lifecycle.live_count()
        );
        self.root.remove(component.name())
    }

    pub fn is_mounted(&self, component: Component) -> bool {
        self.mounted.iter().any(|mounted| mounted.component == component)
    }

    /// Loads queued since the last call.
    pub fn take_requests(&mut self) -> Vec<AssetRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Applies a finished load. A successful load replaces its placeholder;
    /// a failed one drops the placeholder and leaves the rest of the scene
    /// alone. Completions for unmounted components are discarded. Returns
    /// whether the graph changed.
    pub fn resolve(&mut self, loaded: LoadedAsset) -> bool {
        if !self.lifecycle.is_live(loaded.owner) {
            log::debug!("discarding {} for an unmounted component", loaded.path);
            return false;
        }
        match loaded.result {
            Ok(node) => {
                let replaced = self.root.replace_pending(loaded.slot, node);
                if replaced {
                    log::info!("loaded {}", loaded.path);
                }
                replaced
            }
            Err(e) => {
                log::warn!("could not load {}: {e:#}", loaded.path);
                self.root.remove_pending(loaded.slot)
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn pending_count(&self) -> usize {
        self.root.pending_count()
    }

    /// Scene time of the last [`advance`](Self::advance).
    pub fn elapsed(&self) -> f32 {
        self.driver.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> SynthwaveScene {
        SynthwaveScene::mount(
            800,
            600,
            SceneConfig {
                seed: Some(42),
                ..Default::default()
            },
        )
    }

    #[test]
    fn components_are_mounted_in_draw_order() {
        let scene = scene();
        let names: Vec<&str> = scene.root().children().iter().map(SceneNode::name).collect();
        let expected: Vec<&str> = Component::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn one_request_per_external_asset() {
        let mut scene = scene();
        let requests = scene.take_requests();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[0].kind.path(), "skybox/2048/px.png");
        assert_eq!(scene.pending_count(), 4);
        assert!(scene.take_requests().is_empty());
    }

    #[test]
    fn unmounting_twice_is_harmless() {
        let mut scene = scene();
        assert!(scene.unmount(Component::Road).is_some());
        assert!(scene.unmount(Component::Road).is_none());
        assert!(!scene.is_mounted(Component::Road));
        assert!(scene.root().find("road").is_none());
    }
}
