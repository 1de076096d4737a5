//! SDF parser and scene builder (§6.1). Grammar tokenizes the format (one
//! directive per line, whitespace-separated tokens, `#` comments) via
//! [`sdf.pest`]; everything past tokenizing — directive dispatch, defaults,
//! numeric coercion — is plain Rust, mirroring the line-buffer
//! `istringstream` dispatch the format was distilled from.
//!
//! Malformed numeric fields are a `ParseError`-class failure (§7):
//! recoverable by policy. A bad token logs a warning and falls back to
//! `0.0` rather than aborting the whole scene.

use crate::core::camera::Camera;
use crate::core::color::Color;
use crate::core::error::{RenderError, Result};
use crate::core::light::{Light, PointLight};
use crate::core::material::Material;
use crate::core::numeric::Float;
use crate::core::vector::Vec3;
use crate::scene::obj;
use crate::scene::{RenderJob, Scene};
use crate::shapes::{BoxShape, Shape, Sphere, Triangle};
use pest::Parser;
use pest_derive::Parser;
use std::path::Path;
use std::sync::Arc;

#[derive(Parser)]
#[grammar = "scene/sdf.pest"]
struct SdfParser;

fn tokens_of_line(line_src: &str) -> Vec<String> {
    let file = match SdfParser::parse(Rule::file, line_src) {
        Ok(pairs) => pairs,
        Err(err) => {
            log::warn!("malformed scene line {:?}: {}", line_src, err);
            return Vec::new();
        }
    };
    file.into_iter()
        .flat_map(|p| p.into_inner()) // file -> line pairs
        .flat_map(|p| p.into_inner()) // line -> token pairs (empty for a comment line)
        .filter(|p| p.as_rule() == Rule::token)
        .map(|p| p.as_str().to_string())
        .collect()
}

fn num(tokens: &[String], i: usize) -> Float {
    tokens
        .get(i)
        .and_then(|t| t.parse().ok())
        .unwrap_or_else(|| {
            log::warn!("expected a number at field {}, got {:?}", i, tokens.get(i));
            0.0
        })
}

fn str_at(tokens: &[String], i: usize) -> String {
    tokens.get(i).cloned().unwrap_or_default()
}

fn vec3(tokens: &[String], i: usize) -> Vec3 {
    Vec3::new(num(tokens, i), num(tokens, i + 1), num(tokens, i + 2))
}

fn color3(tokens: &[String], i: usize) -> Color {
    Color::new(num(tokens, i), num(tokens, i + 1), num(tokens, i + 2))
}

fn load_material(tokens: &[String]) -> Material {
    let name = str_at(tokens, 0);
    let ka = color3(tokens, 1);
    let kd = color3(tokens, 4);
    let ks = color3(tokens, 7);
    let m = num(tokens, 10);
    let glossy = num(tokens, 11);
    let opacity = num(tokens, 12);
    let emittance = num(tokens, 13);
    Material::new(name, ka, kd, ks, m, glossy, opacity, emittance)
}

fn find_material(scene: &Scene, name: &str) -> Option<Arc<Material>> {
    let mat = scene.find_material(name);
    if mat.is_none() {
        log::warn!("material {:?} is not defined", name);
    }
    mat
}

fn load_box(tokens: &[String], scene: &Scene) -> Shape {
    let name = str_at(tokens, 0);
    let min = vec3(tokens, 1);
    let max = vec3(tokens, 4);
    let mat_name = str_at(tokens, 7);
    Shape::Box(BoxShape::new(name, min, max, find_material(scene, &mat_name)))
}

fn load_sphere(tokens: &[String], scene: &Scene) -> Shape {
    let name = str_at(tokens, 0);
    let center = vec3(tokens, 1);
    let radius = num(tokens, 4);
    let mat_name = str_at(tokens, 5);
    Shape::Sphere(Sphere::new(name, center, radius, find_material(scene, &mat_name)))
}

fn load_triangle(tokens: &[String], scene: &Scene) -> Shape {
    let name = str_at(tokens, 0);
    let v0 = vec3(tokens, 1);
    let v1 = vec3(tokens, 4);
    let v2 = vec3(tokens, 7);
    let mat_name = str_at(tokens, 10);
    Shape::Triangle(Triangle::new(name, v0, v1, v2, find_material(scene, &mat_name)))
}

fn load_point_light(tokens: &[String]) -> PointLight {
    let name = str_at(tokens, 0);
    let position = vec3(tokens, 1);
    let color = color3(tokens, 4);
    let brightness = num(tokens, 7);
    PointLight::new(name, position, color, brightness)
}

/// Preserves a channel-order quirk in the format's own definition: the
/// three color fields following the light's name are read in `r b g`
/// order, not `r g b`. TODO: this looks like an unintentional swap in the
/// format this loader was distilled from, but scenes written against it
/// depend on the swap, so it is kept rather than silently corrected.
fn load_ambient(tokens: &[String]) -> Light {
    let name = str_at(tokens, 0);
    let r = num(tokens, 1);
    let b = num(tokens, 2);
    let g = num(tokens, 3);
    let brightness = num(tokens, 4);
    Light::new(name, Color::new(r, g, b), brightness)
}

fn load_camera(tokens: &[String]) -> Camera {
    let name = str_at(tokens, 0);
    let fov_x = num(tokens, 1);
    let position = vec3(tokens, 2);
    let yaw = num(tokens, 5);
    let pitch = num(tokens, 6);
    let roll = num(tokens, 7);
    Camera::from_euler(name, fov_x, position, yaw, pitch, roll)
}

fn load_render_job(tokens: &[String]) -> RenderJob {
    RenderJob {
        file_name: str_at(tokens, 0),
        res_x: num(tokens, 1) as u32,
        res_y: num(tokens, 2) as u32,
        pixel_samples: num(tokens, 3) as u32,
        aa_samples: num(tokens, 4) as u32,
        ray_bounces: num(tokens, 5) as u32,
    }
}

fn add_to_scene(tokens: &[String], scene: &mut Scene, obj_dir: &Path) {
    match tokens.first().map(String::as_str) {
        Some("material") => {
            let mat = load_material(&tokens[1..]);
            scene.materials.insert(mat.name.clone(), Arc::new(mat));
        }
        Some("shape") => match tokens.get(1).map(String::as_str) {
            Some("box") => {
                let shape = load_box(&tokens[2..], scene);
                scene.root.add_child(shape);
            }
            Some("sphere") => {
                let shape = load_sphere(&tokens[2..], scene);
                scene.root.add_child(shape);
            }
            Some("triangle") => {
                let shape = load_triangle(&tokens[2..], scene);
                scene.root.add_child(shape);
            }
            Some("obj") => {
                let obj_name = str_at(tokens, 2);
                let shape = Shape::Composite(obj::load_obj(obj_dir, &obj_name));
                scene.root.add_child(shape);
            }
            other => log::warn!("unknown shape directive {:?}", other),
        },
        Some("light") => scene.lights.push(load_point_light(&tokens[1..])),
        Some("ambient") => scene.ambient = load_ambient(&tokens[1..]),
        Some("camera") => scene.camera = load_camera(&tokens[1..]),
        other => log::warn!("unknown define directive {:?}", other),
    }
}

fn apply_transform(tokens: &[String], scene: &mut Scene) {
    let name = str_at(tokens, 0);
    let action = str_at(tokens, 1);
    let shape = match scene.root.find_child_mut(&name) {
        Some(shape) => shape,
        None => {
            log::warn!("transform target {:?} is not defined", name);
            return;
        }
    };
    match action.as_str() {
        "translate" => shape.translate(num(tokens, 2), num(tokens, 3), num(tokens, 4)),
        "rotate" => shape.rotate(num(tokens, 2), num(tokens, 3), num(tokens, 4)),
        "scale" => {
            let s = num(tokens, 2);
            shape.scale(s, s, s);
        }
        other => log::warn!("unknown transform action {:?}", other),
    }
}

/// Tunables a caller (the CLI driver, or a test) can override when loading
/// a scene; everything here has a sensible default the SDF format itself
/// cannot express.
#[derive(Default)]
pub struct LoadOptions<'a> {
    /// Overrides the directory `define shape obj` resolves `.obj`/`.mtl`
    /// names against (default: the scene file's own parent directory).
    pub obj_dir: Option<&'a Path>,
    /// Writes every `render` directive's output as ASCII P3 instead of the
    /// default binary P6 (§6) — handy for golden-file diffs.
    pub ascii_ppm: bool,
}

/// Parses a scene description file, running each `render` directive as soon
/// as it is encountered rather than deferring all renders to the end: the
/// format interleaves loading and rendering (§2/§9), so a `render` line only
/// sees the shapes and transforms that precede it in the file, and a shape
/// added after a `render` line has no effect on that already-completed
/// image.
///
/// Returns the final [`Scene`] (octree rebuilt as of the last mutation) and
/// every `render` directive that ran, in file order, for diagnostics.
pub fn load_scene(path: &Path, options: LoadOptions) -> Result<(Scene, Vec<RenderJob>)> {
    let contents = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let default_obj_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let obj_dir = options.obj_dir.unwrap_or(default_obj_dir);

    let mut scene = Scene::new();
    let mut jobs = Vec::new();

    for raw_line in contents.lines() {
        let tokens = tokens_of_line(raw_line);
        let (directive, rest) = match tokens.split_first() {
            Some((d, r)) => (d.clone(), r.to_vec()),
            None => continue,
        };
        match directive.as_str() {
            "define" => add_to_scene(&rest, &mut scene, obj_dir),
            "transform" => apply_transform(&rest, &mut scene),
            "render" => {
                let job = load_render_job(&rest);
                scene.root.build_octree();
                log::info!("running render directive {} -> {}", jobs.len(), job.file_name);
                let mut renderer = crate::render::Renderer::new(&job);
                if options.ascii_ppm {
                    renderer = renderer.with_ascii_ppm();
                }
                renderer.render(&scene)?;
                jobs.push(job);
            }
            _ => {}
        }
    }
    scene.root.build_octree();

    if jobs.is_empty() {
        log::warn!("scene {} has no render directive", path.display());
    }
    Ok((scene, jobs))
}
