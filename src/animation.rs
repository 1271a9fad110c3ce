//! Frame timing and the animation driver.
//!
//! The only state that changes after the scene is built is the `time`
//! uniform of animated materials. Once per frame the driver copies the
//! elapsed scene time into every animated material whose owning component is
//! subscribed. There is no interpolation and no fixed timestep: a slow frame
//! simply shows a bigger jump.

use std::collections::BTreeSet;

use instant::{Duration, Instant};

use crate::{data_structures::scene_graph::SceneNode, lifecycle::ComponentId};

/// Timing snapshot handed out by [`FrameClock::tick`].
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the clock started.
    pub elapsed: f32,
    /// Seconds since the previous tick.
    pub dt: f32,
    pub frame_index: u64,
}

/// Monotonic clock measuring time since scene start.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.last.duration_since(self.start)
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;
        let time = FrameTime {
            elapsed: now.duration_since(self.start).as_secs_f32(),
            dt: dt.as_secs_f32(),
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the elapsed time into the materials of subscribed components.
#[derive(Debug, Default)]
pub struct AnimationDriver {
    subscribers: BTreeSet<ComponentId>,
    elapsed: f32,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, component: ComponentId) {
        self.subscribers.insert(component);
    }

    pub fn unsubscribe(&mut self, component: ComponentId) -> bool {
        self.subscribers.remove(&component)
    }

    /// Time written by the most recent [`advance`](Self::advance).
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Sets every subscribed animated material's time to `elapsed`.
    ///
    /// Returns how many uniforms were written.
    pub fn advance(&mut self, elapsed: f32, root: &mut SceneNode) -> usize {
        self.elapsed = elapsed;
        let subscribers = &self.subscribers;
        let mut written = 0;
        root.for_each_mesh_mut(&mut |mesh| {
            let Some(owner) = mesh.owner else { return };
            if subscribers.contains(&owner) && mesh.material.set_time(elapsed) {
                written += 1;
            }
        });
        log::trace!("advanced {written} time uniforms to {elapsed:.3}s");
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::{
        geometry::Geometry,
        material::{Material, ShaderProgram},
        scene_graph::{GroupNode, MeshNode},
    };

    fn owned(name: &str, program: ShaderProgram, owner: u32) -> MeshNode {
        let mut mesh = MeshNode::new(name, Geometry::plane(1.0, 1.0, 1, 1), Material::new(program));
        mesh.owner = Some(ComponentId(owner));
        mesh
    }

    #[test]
    fn only_subscribed_animated_materials_are_written() {
        let mut root: SceneNode = GroupNode::new("root")
            .with_child(owned("floor", ShaderProgram::Grid, 0))
            .with_child(owned("palms", ShaderProgram::Scroll, 1))
            .with_child(owned("road", ShaderProgram::Standard, 2))
            .into();
        let mut driver = AnimationDriver::new();
        driver.subscribe(ComponentId(0));
        driver.subscribe(ComponentId(2));

        assert_eq!(driver.advance(1.5, &mut root), 1);
        let time = |name: &str| match root.find(name) {
            Some(SceneNode::Mesh(mesh)) => mesh.material.time(),
            _ => None,
        };
        assert_eq!(time("floor"), Some(1.5));
        assert_eq!(time("palms"), Some(0.0));
        assert_eq!(time("road"), None);
    }

    #[test]
    fn unsubscribed_component_keeps_its_last_time() {
        let mut root: SceneNode = GroupNode::new("root")
            .with_child(owned("floor", ShaderProgram::Grid, 0))
            .into();
        let mut driver = AnimationDriver::new();
        driver.subscribe(ComponentId(0));
        driver.advance(1.0, &mut root);
        assert!(driver.unsubscribe(ComponentId(0)));
        driver.advance(5.0, &mut root);
        let SceneNode::Group(group) = &root else { unreachable!() };
        let SceneNode::Mesh(floor) = &group.children[0] else { unreachable!() };
        assert_eq!(floor.material.time(), Some(1.0));
        assert_eq!(driver.elapsed(), 5.0);
    }

    #[test]
    fn clock_is_monotonic() {
        let mut clock = FrameClock::new();
        let first = clock.tick();
        let second = clock.tick();
        assert!(second.elapsed >= first.elapsed);
        assert_eq!(second.frame_index, first.frame_index + 1);
    }
}
