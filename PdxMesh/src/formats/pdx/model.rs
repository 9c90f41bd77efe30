//! Typed domain model of a PDX mesh file
//!
//! These are the values handed to (and received from) the host-side
//! import/export glue. Coordinates are stored exactly as they appear in the
//! file; no axis conversion is applied here.

use super::{COLLISION_SHADER, DEFAULT_ASSET_VERSION};
use crate::error::{Error, Result};
use glam::{Affine3A, Mat3, Quat, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// A complete `.mesh` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdxFile {
    pub asset: Asset,
    pub world: World,
    pub locators: Option<Locators>,
}

/// The `pdxasset` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// `(major, minor)`
    pub version: (i32, i32),
    /// Ints found after the version, written back unchanged.
    #[serde(default)]
    pub trailer: Vec<i32>,
}

impl Default for Asset {
    fn default() -> Self {
        Asset {
            version: DEFAULT_ASSET_VERSION,
            trailer: Vec::new(),
        }
    }
}

/// Root container of all shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub objects: Vec<Shape>,
}

/// A named shape: its meshes and an optional skeleton.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Opaque; the host conventionally appends `:MeshShape`.
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub skeleton: Option<Skeleton>,
}

impl Shape {
    pub fn new(name: impl Into<String>) -> Self {
        Shape {
            name: name.into(),
            meshes: Vec::new(),
            skeleton: None,
        }
    }
}

/// One triangulated mesh with a single material.
///
/// Collision meshes leave `normals`, `tangents`, `uv0` empty and `skin` unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec4>,
    pub uv0: Vec<Vec2>,
    pub bounds: Option<Bounds>,
    pub material: Option<Material>,
    pub skin: Option<Skin>,
}

impl Mesh {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// True when the mesh carries no per-vertex shading attributes.
    pub fn has_collision_layout(&self) -> bool {
        self.normals.is_empty() && self.tangents.is_empty() && self.uv0.is_empty()
    }

    pub fn is_collision(&self) -> bool {
        self.material.as_ref().is_some_and(Material::is_collision)
    }

    /// Set `bounds` from the current vertices.
    pub fn compute_bounds(&mut self) -> Result<()> {
        self.bounds = Some(Bounds::from_points(&self.vertices)?);
        Ok(())
    }
}

/// Axis-aligned bounding box (`aabb`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Bounds { min, max }
    }

    /// Smallest box enclosing `points`.
    pub fn from_points(points: &[Vec3]) -> Result<Self> {
        let Some(first) = points.first() else {
            return Err(Error::missing("aabb", "vertices"));
        };
        let (min, max) = points
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Ok(Bounds { min, max })
    }

    /// Componentwise `min <= max`. Not guaranteed for files read from disk.
    pub fn is_ordered(&self) -> bool {
        self.min.cmple(self.max).all()
    }
}

/// Texture file names of a non-collision material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialTextures {
    pub diffuse: String,
    pub normal: String,
    pub specular: String,
}

impl MaterialTextures {
    pub fn new(
        diffuse: impl Into<String>,
        normal: impl Into<String>,
        specular: impl Into<String>,
    ) -> Self {
        MaterialTextures {
            diffuse: diffuse.into(),
            normal: normal.into(),
            specular: specular.into(),
        }
    }

    /// Derive the normal and specular names from a `*diff*` file name.
    pub fn from_diffuse(diffuse: &str) -> Self {
        MaterialTextures {
            diffuse: diffuse.to_string(),
            normal: diffuse.replace("diff", "normal"),
            specular: diffuse.replace("diff", "spec"),
        }
    }
}

/// Shader plus texture set. Collision materials carry no textures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub shader: String,
    pub textures: Option<MaterialTextures>,
}

impl Material {
    pub fn collision() -> Self {
        Material {
            shader: COLLISION_SHADER.to_string(),
            textures: None,
        }
    }

    pub fn textured(shader: impl Into<String>, textures: MaterialTextures) -> Self {
        Material {
            shader: shader.into(),
            textures: Some(textures),
        }
    }

    pub fn is_collision(&self) -> bool {
        self.shader == COLLISION_SHADER
    }

    pub fn diffuse(&self) -> Option<&str> {
        self.textures.as_ref().map(|t| t.diffuse.as_str())
    }
}

/// Per-vertex bone influences, stored as padded flat arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skin {
    pub bones_per_vertex: u32,
    /// `-1` marks an unused slot.
    pub indices: Vec<i32>,
    pub weights: Vec<f32>,
}

/// One applied bone influence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneWeight {
    pub vertex: usize,
    pub bone: u32,
    pub weight: f32,
}

impl Skin {
    /// Slots per vertex written by the exporter.
    pub const DEFAULT_BONES_PER_VERTEX: u32 = 4;

    /// Pack per-vertex `(bone, weight)` lists, padding with `-1` / `0.0`.
    pub fn from_influences(bones_per_vertex: u32, influences: &[Vec<(u32, f32)>]) -> Result<Self> {
        if bones_per_vertex == 0 {
            return Err(Error::InvalidNode {
                node: "skin",
                message: "bones per vertex must be at least 1".to_string(),
            });
        }
        let slots = bones_per_vertex as usize;
        let mut indices = Vec::with_capacity(influences.len() * slots);
        let mut weights = Vec::with_capacity(influences.len() * slots);

        for (vertex, list) in influences.iter().enumerate() {
            if list.len() > slots {
                return Err(Error::InvalidNode {
                    node: "skin",
                    message: format!(
                        "vertex {vertex} has {} influences, only {slots} slots",
                        list.len()
                    ),
                });
            }
            for slot in 0..slots {
                match list.get(slot) {
                    Some(&(bone, weight)) => {
                        indices.push(bone as i32);
                        weights.push(weight);
                    }
                    None => {
                        indices.push(-1);
                        weights.push(0.0);
                    }
                }
            }
        }

        Ok(Skin {
            bones_per_vertex,
            indices,
            weights,
        })
    }

    pub fn vertex_count(&self) -> usize {
        if self.bones_per_vertex == 0 {
            0
        } else {
            self.indices.len() / self.bones_per_vertex as usize
        }
    }

    /// Bone assignments to apply, skipping `-1` slots.
    pub fn assignments(&self) -> impl Iterator<Item = BoneWeight> + '_ {
        let slots = self.bones_per_vertex.max(1) as usize;
        self.indices
            .iter()
            .zip(&self.weights)
            .enumerate()
            .filter(|&(_, (&bone, _))| bone >= 0)
            .map(move |(slot, (&bone, &weight))| BoneWeight {
                vertex: slot / slots,
                bone: bone as u32,
                weight,
            })
    }
}

/// Joint hierarchy of a shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    pub joints: Vec<Joint>,
}

impl Skeleton {
    /// A skeleton holding only the identity `root` joint at index 0.
    pub fn with_root() -> Self {
        Skeleton {
            joints: vec![Joint::root()],
        }
    }

    pub fn joint(&self, name: &str) -> Option<&Joint> {
        self.joints.iter().find(|j| j.name == name)
    }

    pub fn children_of(&self, index: i32) -> impl Iterator<Item = &Joint> {
        self.joints.iter().filter(move |j| j.parent == index)
    }
}

/// One bone of a skeleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub name: String,
    pub index: i32,
    /// `-1` for a root joint.
    pub parent: i32,
    /// Row-major 3x3 rotation/scale block followed by the translation.
    pub transform: [f32; 12],
}

impl Joint {
    pub const IDENTITY_TRANSFORM: [f32; 12] =
        [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];

    pub fn new(name: impl Into<String>, index: i32, parent: i32) -> Self {
        Joint {
            name: name.into(),
            index,
            parent,
            transform: Self::IDENTITY_TRANSFORM,
        }
    }

    pub fn root() -> Self {
        Joint::new("root", 0, -1)
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Affine3A) -> Self {
        let rows = Mat3::from(transform.matrix3).transpose().to_cols_array();
        self.transform[..9].copy_from_slice(&rows);
        self.transform[9..].copy_from_slice(&transform.translation.to_array());
        self
    }

    #[must_use]
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.transform[9..].copy_from_slice(&translation.to_array());
        self
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent < 0
    }

    pub fn affine(&self) -> Affine3A {
        let mut rows = [0.0; 9];
        rows.copy_from_slice(&self.transform[..9]);
        // Reading rows as columns gives the transpose
        let matrix = Mat3::from_cols_array(&rows).transpose();
        Affine3A::from_mat3_translation(matrix, self.translation())
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.transform[9], self.transform[10], self.transform[11])
    }

    /// Split into `(scale, rotation, translation)`.
    pub fn decompose(&self) -> (Vec3, Quat, Vec3) {
        self.affine().to_scale_rotation_translation()
    }
}

/// Top-level list of attachment points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Locators {
    pub locators: Vec<Locator>,
}

/// A named attachment point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locator {
    pub name: String,
    pub position: Vec3,
    /// Orientation quaternion, components in file order.
    pub quaternion: Vec4,
    /// Joint the locator is attached to.
    pub parent: Option<String>,
}

impl Locator {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Locator {
            name: name.into(),
            position,
            quaternion: Vec4::ZERO,
            parent: None,
        }
    }
}

/// Counts used by the CLI and batch validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub version: (i32, i32),
    pub shapes: usize,
    pub meshes: usize,
    pub collision_meshes: usize,
    pub skinned_meshes: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub joints: usize,
    pub locators: usize,
}

impl PdxFile {
    pub fn new(world: World) -> Self {
        PdxFile {
            asset: Asset::default(),
            world,
            locators: None,
        }
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.world.objects.iter().flat_map(|shape| shape.meshes.iter())
    }

    pub fn summary(&self) -> FileSummary {
        let mut summary = FileSummary {
            version: self.asset.version,
            shapes: self.world.objects.len(),
            locators: self.locators.as_ref().map_or(0, |l| l.locators.len()),
            ..FileSummary::default()
        };
        for shape in &self.world.objects {
            summary.joints += shape.skeleton.as_ref().map_or(0, |s| s.joints.len());
        }
        for mesh in self.meshes() {
            summary.meshes += 1;
            summary.vertices += mesh.vertex_count();
            summary.triangles += mesh.triangle_count();
            if mesh.is_collision() {
                summary.collision_meshes += 1;
            }
            if mesh.skin.is_some() {
                summary.skinned_meshes += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skin_skips_unused_slots() {
        let skin = Skin {
            bones_per_vertex: 4,
            indices: vec![2, -1, -1, -1],
            weights: vec![1.0, 0.0, 0.0, 0.0],
        };
        let assignments: Vec<BoneWeight> = skin.assignments().collect();
        assert_eq!(
            assignments,
            vec![BoneWeight {
                vertex: 0,
                bone: 2,
                weight: 1.0
            }]
        );
    }

    #[test]
    fn test_skin_from_influences_pads() {
        let skin = Skin::from_influences(4, &[vec![(1, 0.75), (3, 0.25)], vec![]]).unwrap();
        assert_eq!(skin.indices, vec![1, 3, -1, -1, -1, -1, -1, -1]);
        assert_eq!(skin.weights, vec![0.75, 0.25, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(skin.vertex_count(), 2);

        let vertices: Vec<usize> = skin.assignments().map(|a| a.vertex).collect();
        assert_eq!(vertices, vec![0, 0]);
    }

    #[test]
    fn test_skin_rejects_overflowing_vertex() {
        let influences = vec![vec![(0, 0.5), (1, 0.5)]];
        assert!(Skin::from_influences(1, &influences).is_err());
        assert!(Skin::from_influences(0, &[]).is_err());
    }

    #[test]
    fn test_bounds_from_points() {
        let bounds = Bounds::from_points(&[
            Vec3::new(1.0, -2.0, 3.0),
            Vec3::new(-1.0, 4.0, 0.0),
        ])
        .unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 4.0, 3.0));
        assert!(bounds.is_ordered());
        assert!(!Bounds::new(Vec3::ONE, Vec3::ZERO).is_ordered());
        assert!(Bounds::from_points(&[]).is_err());
    }

    #[test]
    fn test_joint_decompose() {
        let joint = Joint::new("arm", 1, 0)
            .with_transform(Affine3A::from_scale_rotation_translation(
                Vec3::splat(2.0),
                Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
                Vec3::new(0.0, 1.0, 5.0),
            ));

        let (scale, rotation, translation) = joint.decompose();
        assert!(scale.abs_diff_eq(Vec3::splat(2.0), 1e-5));
        assert!(rotation.abs_diff_eq(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2), 1e-5));
        assert_eq!(translation, Vec3::new(0.0, 1.0, 5.0));
        assert_eq!(joint.translation(), translation);
    }

    #[test]
    fn test_joint_transform_is_row_major() {
        let joint = Joint {
            transform: [0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
            ..Joint::new("spin", 1, 0)
        };

        let (_, rotation, _) = joint.decompose();
        let expected = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        assert!(rotation.abs_diff_eq(expected, 1e-5));
        assert!(joint.affine().transform_vector3(Vec3::X).abs_diff_eq(Vec3::Y, 1e-6));

        let rebuilt = Joint::new("spin", 1, 0).with_transform(joint.affine());
        assert_eq!(rebuilt.transform, joint.transform);
    }

    #[test]
    fn test_identity_layout() {
        let joint = Joint::root().with_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(
            joint.transform,
            [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 3.0]
        );
        assert!(joint.is_root());
        let (scale, _, translation) = joint.decompose();
        assert!(scale.abs_diff_eq(Vec3::ONE, 1e-6));
        assert_eq!(translation, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_material_helpers() {
        let textures = MaterialTextures::from_diffuse("ship_diff.dds");
        assert_eq!(textures.normal, "ship_normal.dds");
        assert_eq!(textures.specular, "ship_spec.dds");

        let material = Material::textured("PdxMeshShip", textures);
        assert!(!material.is_collision());
        assert_eq!(material.diffuse(), Some("ship_diff.dds"));
        assert!(Material::collision().is_collision());
        assert_eq!(Material::collision().diffuse(), None);
    }
}
