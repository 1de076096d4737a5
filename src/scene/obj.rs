//! Wavefront OBJ/MTL subset loader (§6.2): vertices, vertex normals,
//! triangular faces, `usemtl`/`mtllib` material binding and `o` object
//! groups — enough to import Blender-exported meshes, not a general OBJ
//! importer.

use crate::core::color::Color;
use crate::core::material::Material;
use crate::core::vector::Vec3;
use crate::shapes::{Composite, Shape, Triangle};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn load_vec3(tokens: &[&str]) -> Vec3 {
    Vec3::new(
        tokens.first().and_then(|t| t.parse().ok()).unwrap_or(0.0),
        tokens.get(1).and_then(|t| t.parse().ok()).unwrap_or(0.0),
        tokens.get(2).and_then(|t| t.parse().ok()).unwrap_or(0.0),
    )
}

fn load_color3(tokens: &[&str]) -> Color {
    Color::new(
        tokens.first().and_then(|t| t.parse().ok()).unwrap_or(0.0),
        tokens.get(1).and_then(|t| t.parse().ok()).unwrap_or(0.0),
        tokens.get(2).and_then(|t| t.parse().ok()).unwrap_or(0.0),
    )
}

/// Parses an MTL file into materials keyed by `newmtl` name. `illum 2`
/// bumps glossiness to 0.5 (the only illumination model this loader treats
/// specially); any other channel is a straight passthrough.
pub fn load_materials(path: &Path) -> HashMap<String, Material> {
    let mut materials = HashMap::new();
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(err) => {
            log::warn!("could not read material library {}: {}", path.display(), err);
            return materials;
        }
    };

    let mut current: Option<Material> = None;
    for line in contents.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (token, rest) = match tokens.split_first() {
            Some(pair) => pair,
            None => continue,
        };
        match *token {
            "#" => continue,
            "newmtl" => {
                if let Some(mat) = current.take() {
                    materials.insert(mat.name.clone(), mat);
                }
                let name = rest.first().copied().unwrap_or("unnamed").to_string();
                current = Some(Material::default_named(name));
            }
            "Ka" => {
                if let Some(mat) = current.as_mut() {
                    mat.ka = load_color3(rest);
                }
            }
            "Kd" => {
                if let Some(mat) = current.as_mut() {
                    mat.kd = load_color3(rest);
                    mat.emit_color = mat.kd * mat.emittance;
                }
            }
            "Ks" => {
                if let Some(mat) = current.as_mut() {
                    mat.ks = load_color3(rest);
                }
            }
            "Ns" => {
                if let Some(mat) = current.as_mut() {
                    mat.m = rest.first().and_then(|t| t.parse().ok()).unwrap_or(mat.m);
                }
            }
            "illum" => {
                if let Some(mat) = current.as_mut() {
                    if rest.first() == Some(&"2") {
                        mat.glossy = 0.5;
                    }
                }
            }
            _ => {}
        }
    }
    if let Some(mat) = current.take() {
        materials.insert(mat.name.clone(), mat);
    }
    materials
}

/// A `v[/vt][/vn]` face-vertex reference. Texture coordinates are parsed
/// past but not retained — this renderer has no texture-mapping module.
struct FaceVertex {
    v: usize,
    vn: Option<usize>,
}

fn parse_face_vertex(token: &str) -> FaceVertex {
    let mut parts = token.split('/');
    let v: usize = parts.next().unwrap_or("1").parse().unwrap_or(1);
    let _vt = parts.next();
    let vn = parts.next().filter(|s| !s.is_empty()).and_then(|s| s.parse().ok());
    FaceVertex { v, vn }
}

/// Loads `<directory>/<name>.obj`, returning a composite (octree already
/// built) with one child composite per `o` group, each holding the
/// triangles of that group named `face0`, `face1`, ... in encounter order.
/// A mesh with no `o` directive at all (or faces preceding the first one)
/// still gets a single anonymous group rather than losing its geometry.
pub fn load_obj(directory: &Path, name: &str) -> Composite {
    let obj_path = directory.join(format!("{}.obj", name));
    let contents = match fs::read_to_string(&obj_path) {
        Ok(c) => c,
        Err(err) => {
            log::warn!("could not read obj file {}: {}", obj_path.display(), err);
            return Composite::new(name, None);
        }
    };

    let mut composite = Composite::new(name, None);
    let mut materials: HashMap<String, Material> = HashMap::new();
    let mut group_count = 0usize;
    let mut current_child = Composite::new(format!("group{}", group_count), None);
    let mut current_mat: Option<Arc<Material>> = None;
    let mut vertices: Vec<Vec3> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut face_count = 0usize;

    // Only a group that actually collected geometry is kept: an `o` line
    // with no faces before the next one (or before EOF) contributes nothing.
    let finish_child = |composite: &mut Composite, mut child: Composite| {
        if child.child_count() > 0 {
            child.build_octree();
            composite.add_child(Shape::Composite(child));
        }
    };

    for line in contents.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (token, rest) = match tokens.split_first() {
            Some(pair) => pair,
            None => continue,
        };
        match *token {
            "#" => continue,
            "mtllib" => {
                if let Some(mtl_name) = rest.first() {
                    let loaded = load_materials(&directory.join(mtl_name));
                    materials.extend(loaded);
                }
            }
            "o" => {
                group_count += 1;
                let finished = std::mem::replace(&mut current_child, Composite::new(format!("group{}", group_count), None));
                finish_child(&mut composite, finished);
                let child_name = rest.first().copied().unwrap_or("object").to_string();
                current_child = Composite::new(child_name, current_mat.clone());
            }
            "v" => vertices.push(load_vec3(rest)),
            "vn" => normals.push(load_vec3(rest)),
            "usemtl" => {
                if let Some(mat_name) = rest.first() {
                    current_mat = materials.get(*mat_name).cloned().map(Arc::new);
                }
            }
            "f" => {
                if rest.len() < 3 {
                    log::warn!("skipping malformed face in {}: {}", obj_path.display(), line);
                    continue;
                }
                let refs: Vec<FaceVertex> = rest.iter().map(|t| parse_face_vertex(t)).collect();
                let v0 = vertices.get(refs[0].v - 1).copied().unwrap_or(Vec3::ZERO);
                let v1 = vertices.get(refs[1].v - 1).copied().unwrap_or(Vec3::ZERO);
                let v2 = vertices.get(refs[2].v - 1).copied().unwrap_or(Vec3::ZERO);
                let name = format!("face{}", face_count);
                let triangle = match refs[0].vn {
                    Some(i) => {
                        let n = normals.get(i - 1).copied().unwrap_or(Vec3::new(0.0, 0.0, 1.0));
                        Triangle::with_normal(name, v0, v1, v2, n, current_mat.clone())
                    }
                    None => Triangle::new(name, v0, v1, v2, current_mat.clone()),
                };
                current_child.add_child(Shape::Triangle(triangle));
                face_count += 1;
            }
            _ => {}
        }
    }
    finish_child(&mut composite, current_child);
    composite.build_octree();
    composite
}
