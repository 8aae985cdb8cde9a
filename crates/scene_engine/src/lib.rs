//! # Scene Engine
//!
//! A runtime scene-graph engine for real-time 3D rendering: a hierarchy of
//! spatial nodes whose transforms and bounding volumes are kept consistent
//! incrementally, and whose visible subset is culled and bucketed into render
//! bins every frame.
//!
//! ## Architecture
//!
//! ```text
//! Scene (frame driver)
//!      ↓
//! SceneGraph (node arena, dirty flags, deferred commit)
//!      ↓
//! world transforms → world bounding volumes
//!      ↓
//! RenderContext (frustum/distance/screen-size culling → RenderBins)
//! CollisionWorld (group classification → pairwise volume tests)
//! ```
//!
//! The whole update → commit → transform → cull → draw sequence runs
//! synchronously on one thread per frame. Structural mutation is deferred:
//! `add_child`/`remove_child` only enqueue events, applied by an explicit
//! commit phase, so traversals never iterate a collection that is being
//! mutated underneath them.
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_engine::prelude::*;
//!
//! let mut scene = Scene::new(SceneConfig::default());
//! let ship = scene.graph_mut().create_geometry(Some(BoundingVolume::sphere(
//!     Vec3::zeros(),
//!     1.0,
//! )));
//! scene.graph_mut().set_render_group(ship, 0);
//!
//! let root = scene.graph().root();
//! scene.graph_mut().add_child(root, ship);
//!
//! let camera = Camera::perspective(
//!     Vec3::new(0.0, 0.0, -10.0),
//!     Vec3::zeros(),
//!     Vec3::y(),
//!     std::f32::consts::FRAC_PI_3,
//!     16.0 / 9.0,
//!     0.1,
//!     1000.0,
//! );
//! scene.add_context(RenderContext::new(camera, CullConfig::default()));
//!
//! let mut gpu = NullGpu;
//! let mut timer = Timer::new();
//! timer.update();
//! scene.update(timer.delta_time(), &mut gpu);
//! scene.draw(&mut gpu);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod bounds;
pub mod collision;
pub mod config;
pub mod foundation;
pub mod graph;
pub mod render;

mod scene;

pub use scene::{FrameStats, Scene};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        bounds::{Aabb, BoundingSphere, BoundingVolume, ConvexRegion, Frustum, Plane},
        collision::{CollisionPair, CollisionWorld},
        config::{Config, ConfigError, CullConfig, SceneConfig},
        foundation::{
            math::{Mat4, Quat, Transform, Vec3},
            time::Timer,
        },
        graph::{Controller, DirtyFlags, Node, NodeId, NodeKey, SceneGraph, Visitor},
        render::{Camera, CullStats, Drawable, GpuContext, NullGpu, RenderBin, RenderContext},
        FrameStats, Scene,
    };
}
