//! The scene description format (SDF, §6.1) and OBJ/MTL subset loader
//! (§6.2) that populate a [`Scene`].

pub mod loader;
pub mod obj;

pub use loader::{load_scene, LoadOptions};

use crate::core::camera::Camera;
use crate::core::light::{Light, PointLight};
use crate::core::material::Material;
use crate::shapes::Composite;
use std::collections::HashMap;
use std::sync::Arc;

/// Fully parsed scene graph: materials by name, one octree-accelerated root
/// composite holding every top-level shape, the point lights and ambient
/// term the format defines (kept for completeness; not sampled by the
/// canonical path-traced shading kernel, §4.4/§9), and the active camera.
#[derive(Debug, Clone)]
pub struct Scene {
    pub materials: HashMap<String, Arc<Material>>,
    pub root: Composite,
    pub lights: Vec<PointLight>,
    pub ambient: Light,
    pub camera: Camera,
}

impl Scene {
    pub fn new() -> Scene {
        Scene {
            materials: HashMap::new(),
            root: Composite::new("scene", None),
            lights: Vec::new(),
            ambient: Light::default(),
            camera: Camera::default(),
        }
    }

    pub fn find_material(&self, name: &str) -> Option<Arc<Material>> {
        self.materials.get(name).cloned()
    }
}

impl Default for Scene {
    fn default() -> Scene {
        Scene::new()
    }
}

/// One `render` directive: a complete image job. A single SDF file may
/// queue more than one of these (one per `render` line), each run to
/// completion against the scene graph built so far.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub file_name: String,
    pub res_x: u32,
    pub res_y: u32,
    pub pixel_samples: u32,
    pub aa_samples: u32,
    pub ray_bounces: u32,
}
