//! Static collision meshes and the library that hands out their handles
//!
//! Meshes are triangle soups stored in world coordinates. Queries return
//! owned hit sets that are released when they go out of scope; nothing is
//! kept across ticks.

use std::collections::HashMap;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::AssetError;

/// Opaque mesh handle issued by `MeshLibrary`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(u32);

impl MeshHandle {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// A single triangle in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub positions: [Vec3; 3],
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            positions: [a, b, c],
        }
    }

    /// Unit plane normal (edge1 × edge2 from vertex 0)
    pub fn normal(&self) -> Vec3 {
        let [a, b, c] = self.positions;
        (b - a).cross(c - a).normalize_or_zero()
    }

    /// Closest point on the triangle to `p`
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let [a, b, c] = self.positions;
        let ab = b - a;
        let ac = c - a;
        let ap = p - a;

        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }

        let cp = p - c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        a + ab * v + ac * w
    }

    /// Exact sphere/triangle overlap
    pub fn overlaps_sphere(&self, center: Vec3, radius: f32) -> bool {
        (self.closest_point(center) - center).length_squared() <= radius * radius
    }

    /// Segment parameter `t` in [0, 1] where the segment crosses the triangle
    fn intersect_segment(&self, start: Vec3, end: Vec3) -> Option<f32> {
        const EPS: f32 = 1e-7;
        let [a, b, c] = self.positions;
        let dir = end - start;
        let e1 = b - a;
        let e2 = c - a;
        let h = dir.cross(e2);
        let det = e1.dot(h);
        if det.abs() < EPS {
            return None; // Parallel to the plane
        }
        let inv = 1.0 / det;
        let s = start - a;
        let u = s.dot(h) * inv;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(e1);
        let v = dir.dot(q) * inv;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = e2.dot(q) * inv;
        (0.0..=1.0).contains(&t).then_some(t)
    }
}

/// Triangles overlapping a sphere query
///
/// Owns its list; dropping it releases the query result.
#[derive(Debug, Default)]
pub struct SphereHits {
    triangles: Vec<Triangle>,
}

impl SphereHits {
    pub fn hit(&self) -> bool {
        !self.triangles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Triangles in query order
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }
}

impl From<Vec<Triangle>> for SphereHits {
    fn from(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }
}

/// Nearest hit of a line query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineHit {
    pub hit: bool,
    pub point: Vec3,
    /// Normal of the triangle that was hit
    pub normal: Vec3,
}

impl LineHit {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
        }
    }
}

/// A static triangle mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub triangles: Vec<Triangle>,
}

impl TriangleMesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Read a JSON triangle list; an empty list is rejected
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(path.display().to_string()),
            _ => AssetError::Io(err),
        })?;
        let mesh: TriangleMesh = serde_json::from_str(&json)?;
        if mesh.triangles.is_empty() {
            return Err(AssetError::InvalidMesh(format!(
                "{}: no triangles",
                path.display()
            )));
        }
        Ok(mesh)
    }

    /// Axis-aligned square floor at height `y`, two triangles, normals +Y
    pub fn floor(half_extent: f32, y: f32) -> Self {
        let h = half_extent;
        let a = Vec3::new(-h, y, -h);
        let b = Vec3::new(-h, y, h);
        let c = Vec3::new(h, y, h);
        let d = Vec3::new(h, y, -h);
        Self::new(vec![Triangle::new(a, b, c), Triangle::new(a, c, d)])
    }

    /// All triangles overlapping the sphere, in storage order
    pub fn query_sphere(&self, center: Vec3, radius: f32) -> SphereHits {
        self.triangles
            .iter()
            .filter(|tri| tri.overlaps_sphere(center, radius))
            .copied()
            .collect::<Vec<_>>()
            .into()
    }

    /// Nearest triangle crossed by the segment from `start` to `end`
    pub fn query_line(&self, start: Vec3, end: Vec3) -> LineHit {
        let nearest = self
            .triangles
            .iter()
            .filter_map(|tri| tri.intersect_segment(start, end).map(|t| (t, tri)))
            .min_by(|a, b| a.0.total_cmp(&b.0));

        match nearest {
            Some((t, tri)) => LineHit {
                hit: true,
                point: start + (end - start) * t,
                normal: tri.normal(),
            },
            None => LineHit::miss(),
        }
    }
}

/// Render transform associated with a mesh handle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelTransform {
    pub position: Vec3,
    pub scale: Vec3,
    /// Direction the model's +Z faces
    pub facing: Vec3,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            facing: Vec3::Z,
        }
    }
}

/// Collision mesh queries by handle
///
/// Unknown handles behave like empty meshes.
pub trait MeshQuery {
    fn query_sphere(&self, handle: MeshHandle, center: Vec3, radius: f32) -> SphereHits;
    fn query_line(&self, handle: MeshHandle, start: Vec3, end: Vec3) -> LineHit;
}

struct LoadedMesh {
    name: String,
    mesh: TriangleMesh,
    transform: ModelTransform,
}

/// Owns loaded meshes and hands out handles
#[derive(Default)]
pub struct MeshLibrary {
    /// Meshes available for loading by name
    sources: HashMap<String, TriangleMesh>,
    loaded: HashMap<MeshHandle, LoadedMesh>,
    next_handle: u32,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a mesh loadable under `name`
    pub fn register(&mut self, name: impl Into<String>, mesh: TriangleMesh) {
        self.sources.insert(name.into(), mesh);
    }

    /// Load a registered mesh and issue a fresh handle
    pub fn load(&mut self, name: &str) -> Result<MeshHandle, AssetError> {
        let mesh = self
            .sources
            .get(name)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?;
        Ok(self.insert_loaded(name, mesh))
    }

    /// Read a JSON triangle list from disk, register it under its path, and load it
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<MeshHandle, AssetError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let mesh = TriangleMesh::from_file(path)?;
        self.sources.insert(name.clone(), mesh.clone());
        Ok(self.insert_loaded(&name, mesh))
    }

    fn insert_loaded(&mut self, name: &str, mesh: TriangleMesh) -> MeshHandle {
        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        log::info!(
            "Loaded mesh '{}' as {:?} ({} triangles)",
            name,
            handle,
            mesh.triangles.len()
        );
        self.loaded.insert(
            handle,
            LoadedMesh {
                name: name.to_string(),
                mesh,
                transform: ModelTransform::default(),
            },
        );
        handle
    }

    /// Release a handle; releasing twice is a no-op
    pub fn release(&mut self, handle: MeshHandle) {
        if let Some(loaded) = self.loaded.remove(&handle) {
            log::debug!("Released mesh '{}' ({:?})", loaded.name, handle);
        }
    }

    /// Release every loaded handle
    pub fn release_all(&mut self) {
        self.loaded.clear();
    }

    pub fn is_loaded(&self, handle: MeshHandle) -> bool {
        self.loaded.contains_key(&handle)
    }

    pub fn set_scale(&mut self, handle: MeshHandle, scale: Vec3) {
        if let Some(loaded) = self.loaded.get_mut(&handle) {
            loaded.transform.scale = scale;
        }
    }

    pub fn set_position(&mut self, handle: MeshHandle, position: Vec3) {
        if let Some(loaded) = self.loaded.get_mut(&handle) {
            loaded.transform.position = position;
        }
    }

    pub fn set_rotation(&mut self, handle: MeshHandle, facing: Vec3) {
        if let Some(loaded) = self.loaded.get_mut(&handle) {
            loaded.transform.facing = facing;
        }
    }

    /// Current render transform, if the handle is loaded
    pub fn transform(&self, handle: MeshHandle) -> Option<ModelTransform> {
        self.loaded.get(&handle).map(|loaded| loaded.transform)
    }
}

impl MeshQuery for MeshLibrary {
    fn query_sphere(&self, handle: MeshHandle, center: Vec3, radius: f32) -> SphereHits {
        self.loaded
            .get(&handle)
            .map(|loaded| loaded.mesh.query_sphere(center, radius))
            .unwrap_or_default()
    }

    fn query_line(&self, handle: MeshHandle, start: Vec3, end: Vec3) -> LineHit {
        self.loaded
            .get(&handle)
            .map_or_else(LineHit::miss, |loaded| loaded.mesh.query_line(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_normal_points_up() {
        let floor = TriangleMesh::floor(100.0, 0.0);
        for tri in &floor.triangles {
            let n = tri.normal();
            assert!((n - Vec3::Y).length() < 1e-5, "normal {n:?}");
        }
    }

    #[test]
    fn test_closest_point_regions() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Z);
        // Face interior
        let p = tri.closest_point(Vec3::new(0.2, 5.0, 0.2));
        assert!((p - Vec3::new(0.2, 0.0, 0.2)).length() < 1e-5);
        // Vertex region
        let p = tri.closest_point(Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(p, Vec3::ZERO);
        // Edge region
        let p = tri.closest_point(Vec3::new(0.5, 0.0, -3.0));
        assert!((p - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_sphere_query() {
        let floor = TriangleMesh::floor(100.0, 0.0);
        let hits = floor.query_sphere(Vec3::new(10.0, 5.0, 10.0), 8.0);
        assert!(hits.hit());

        let hits = floor.query_sphere(Vec3::new(10.0, 50.0, 10.0), 8.0);
        assert!(!hits.hit());
        assert!(hits.is_empty());
    }

    #[test]
    fn test_line_query_nearest() {
        let mut mesh = TriangleMesh::floor(100.0, 0.0);
        mesh.triangles.extend(TriangleMesh::floor(100.0, 10.0).triangles);

        let hit = mesh.query_line(Vec3::new(1.0, 50.0, 1.0), Vec3::new(1.0, -50.0, 1.0));
        assert!(hit.hit);
        assert!((hit.point.y - 10.0).abs() < 1e-4);

        let miss = mesh.query_line(Vec3::new(1.0, 50.0, 1.0), Vec3::new(1.0, 20.0, 1.0));
        assert!(!miss.hit);
    }

    #[test]
    fn test_library_load_unknown_is_not_found() {
        let mut library = MeshLibrary::new();
        assert!(matches!(
            library.load("stage"),
            Err(AssetError::NotFound(name)) if name == "stage"
        ));
    }

    #[test]
    fn test_library_release_is_idempotent() {
        let mut library = MeshLibrary::new();
        library.register("stage", TriangleMesh::floor(10.0, 0.0));
        let handle = library.load("stage").unwrap();
        assert!(library.is_loaded(handle));
        assert!(library.query_sphere(handle, Vec3::ZERO, 1.0).hit());

        library.release(handle);
        library.release(handle);
        assert!(!library.is_loaded(handle));
        // Released handles query as empty
        assert!(!library.query_sphere(handle, Vec3::ZERO, 1.0).hit());
        assert!(!library.query_line(handle, Vec3::Y, -Vec3::Y).hit);
    }

    #[test]
    fn test_library_transform_setters() {
        let mut library = MeshLibrary::new();
        library.register("player", TriangleMesh::floor(1.0, 0.0));
        let handle = library.load("player").unwrap();
        library.set_scale(handle, Vec3::splat(0.01));
        library.set_position(handle, Vec3::new(1.0, 2.0, 3.0));
        library.set_rotation(handle, Vec3::NEG_X);
        let transform = library.transform(handle).unwrap();
        assert_eq!(transform.scale, Vec3::splat(0.01));
        assert_eq!(transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transform.facing, Vec3::NEG_X);
    }

    #[test]
    fn test_load_file_missing_is_not_found() {
        let mut library = MeshLibrary::new();
        let result = library.load_file("/definitely/not/here/stage.json");
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }

    #[test]
    fn test_load_file_round_trip() {
        let path = std::env::temp_dir().join(format!("runfield_mesh_{}.json", std::process::id()));
        let json = serde_json::to_string(&TriangleMesh::floor(5.0, 1.0)).unwrap();
        std::fs::write(&path, json).unwrap();

        let mut library = MeshLibrary::new();
        let handle = library.load_file(&path).unwrap();
        let hit = library.query_line(handle, Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, -3.0, 0.0));
        assert!(hit.hit);
        assert!((hit.point.y - 1.0).abs() < 1e-4);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_empty_mesh_file_is_invalid() {
        let path = std::env::temp_dir().join(format!("runfield_empty_{}.json", std::process::id()));
        std::fs::write(&path, r#"{"triangles": []}"#).unwrap();

        let result = TriangleMesh::from_file(&path);
        assert!(matches!(result, Err(AssetError::InvalidMesh(_))));

        let _ = std::fs::remove_file(&path);
    }
}
