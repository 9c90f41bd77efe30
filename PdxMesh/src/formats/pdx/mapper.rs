//! Mapping between the generic tree and the typed domain model
//!
//! Objects are classified into a closed [`NodeKind`] by their parent kind,
//! their name and, for `mesh` and `material`, the set of properties they
//! carry. Property names inside objects are matched untranslated against the
//! table of the object they belong to.

use super::document::{ObjectNode, PdxDocument};
use super::model::{
    Asset, Bounds, Joint, Locator, Locators, Material, MaterialTextures, Mesh, PdxFile, Shape,
    Skeleton, Skin, World,
};
use super::property::PropertyNode;
use super::{ASSET_PROPERTY, COLLISION_SHADER, names};
use crate::error::{Error, Result};
use crate::utils::transpose::{
    flatten, flatten_2d, flatten_3d, flatten_4d, transpose, transpose_2d, transpose_3d,
    transpose_4d,
};
use glam::{Vec3, Vec4};
use indexmap::IndexMap;

const MESH_PROPERTIES: &[&str] = &["p", "n", "ta", "u0", "tri"];
const BOUNDS_PROPERTIES: &[&str] = &["min", "max"];
const MATERIAL_PROPERTIES: &[&str] = &["shader", "diff", "n", "spec"];
const SKIN_PROPERTIES: &[&str] = &["bones", "ix", "w"];
const JOINT_PROPERTIES: &[&str] = &["ix", "pa", "tx"];
const LOCATOR_PROPERTIES: &[&str] = &["p", "pf", "q", "qf", "pa"];

/// Property layout of a `mesh` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshLayout {
    /// `p`, `n`, `ta`, `u0`, `tri`
    Full,
    /// `p`, `tri`
    Collision,
}

/// Property layout of a `material` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialLayout {
    /// `shader`, `diff`, `n`, `spec`
    Textured,
    /// `shader` only, set to `Collision`
    Collision,
}

/// Every node type of the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Asset,
    World,
    Shape,
    Mesh(MeshLayout),
    Material(MaterialLayout),
    Bounds,
    Skin,
    Skeleton,
    Joint,
    Locators,
    Locator,
}

impl NodeKind {
    /// Number of `[` bytes written before the object name.
    ///
    /// `Asset` is a root property and has no bracket prefix.
    pub fn depth(self) -> u32 {
        match self {
            NodeKind::Asset => 0,
            NodeKind::World | NodeKind::Locators => 1,
            NodeKind::Shape | NodeKind::Locator => 2,
            NodeKind::Mesh(_) | NodeKind::Skeleton => 3,
            NodeKind::Material(_) | NodeKind::Bounds | NodeKind::Skin | NodeKind::Joint => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Asset => "asset",
            NodeKind::World => "world",
            NodeKind::Shape => "shape",
            NodeKind::Mesh(_) => "mesh",
            NodeKind::Material(_) => "material",
            NodeKind::Bounds => "bounds",
            NodeKind::Skin => "skin",
            NodeKind::Skeleton => "skeleton",
            NodeKind::Joint => "joint",
            NodeKind::Locators => "locators",
            NodeKind::Locator => "locator",
        }
    }
}

/// Classify a generic object given the kind of its parent (`None` at root).
///
/// # Errors
/// `UnexpectedNode` when the name is not allowed under the parent, and the
/// layout errors of [`MeshLayout`] / [`MaterialLayout`] detection.
pub fn classify(node: &ObjectNode, parent: Option<NodeKind>) -> Result<NodeKind> {
    let name = node.name.as_str();
    let kind = match parent {
        None => match name {
            names::WORLD => NodeKind::World,
            names::LOCATORS => NodeKind::Locators,
            _ => return Err(unexpected("root", name)),
        },
        Some(NodeKind::World) => NodeKind::Shape,
        Some(NodeKind::Shape) => match name {
            names::MESH => NodeKind::Mesh(mesh_layout(node)?),
            names::SKELETON => NodeKind::Skeleton,
            _ => return Err(unexpected("shape", name)),
        },
        Some(NodeKind::Mesh(_)) => match name {
            names::BOUNDS => NodeKind::Bounds,
            names::MATERIAL => NodeKind::Material(material_layout(node)?),
            names::SKIN => NodeKind::Skin,
            _ => return Err(unexpected("mesh", name)),
        },
        Some(NodeKind::Skeleton) => NodeKind::Joint,
        Some(NodeKind::Locators) => NodeKind::Locator,
        Some(leaf) => return Err(unexpected(leaf.label(), name)),
    };
    Ok(kind)
}

fn unexpected(parent: &str, name: &str) -> Error {
    Error::UnexpectedNode {
        parent: parent.to_string(),
        name: name.to_string(),
    }
}

fn mesh_layout(node: &ObjectNode) -> Result<MeshLayout> {
    let props = Properties::collect(node, MESH_PROPERTIES)?;
    match props.len() {
        5 => Ok(MeshLayout::Full),
        2 if props.contains("p") && props.contains("tri") => Ok(MeshLayout::Collision),
        2 => Err(Error::InvalidNode {
            node: "mesh",
            message: format!(
                "a two-property mesh must carry p and tri, found {}",
                props.names().join(", ")
            ),
        }),
        found => Err(Error::InvalidPropertyCount {
            object: node.name.clone(),
            found,
            expected: "2 (collision) or 5",
        }),
    }
}

fn material_layout(node: &ObjectNode) -> Result<MaterialLayout> {
    let props = Properties::collect(node, MATERIAL_PROPERTIES)?;
    match props.len() {
        1 => {
            let shader = props.string("shader")?;
            if shader == COLLISION_SHADER {
                Ok(MaterialLayout::Collision)
            } else {
                Err(Error::InvalidNode {
                    node: "material",
                    message: format!("shader '{shader}' has no textures"),
                })
            }
        }
        4 => Ok(MaterialLayout::Textured),
        found => Err(Error::InvalidPropertyCount {
            object: node.name.clone(),
            found,
            expected: "1 (collision) or 4",
        }),
    }
}

/// The properties of one object keyed by short name.
struct Properties<'a> {
    object: &'a str,
    map: IndexMap<&'a str, &'a PropertyNode>,
}

impl<'a> Properties<'a> {
    /// Index `node`'s properties, rejecting names outside `allowed` and repeats.
    fn collect(node: &'a ObjectNode, allowed: &[&str]) -> Result<Self> {
        let mut map = IndexMap::with_capacity(node.properties.len());
        for property in &node.properties {
            let name = property.name.as_str();
            if !allowed.contains(&name) {
                return Err(Error::unknown_property(&node.name, name));
            }
            if map.insert(name, property).is_some() {
                return Err(Error::DuplicateNode {
                    parent: node.name.clone(),
                    name: name.to_string(),
                });
            }
        }
        Ok(Properties {
            object: &node.name,
            map,
        })
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    fn names(&self) -> Vec<&'a str> {
        self.map.keys().copied().collect()
    }

    fn get(&self, name: &str) -> Option<&'a PropertyNode> {
        self.map.get(name).copied()
    }

    fn require(&self, name: &'static str) -> Result<&'a PropertyNode> {
        self.get(name).ok_or_else(|| Error::missing(self.object, name))
    }

    fn floats(&self, name: &'static str) -> Result<&'a [f32]> {
        self.require(name)?.as_floats(self.object)
    }

    fn ints(&self, name: &'static str) -> Result<&'a [i32]> {
        self.require(name)?.as_ints(self.object)
    }

    fn string(&self, name: &'static str) -> Result<&'a str> {
        self.require(name)?.as_str(self.object)
    }

    /// The first of `aliases` present, failing if more than one is.
    fn either(&self, aliases: [&'static str; 2]) -> Result<Option<&'a PropertyNode>> {
        match (self.get(aliases[0]), self.get(aliases[1])) {
            (Some(_), Some(_)) => Err(Error::DuplicateNode {
                parent: self.object.to_string(),
                name: format!("{}/{}", aliases[0], aliases[1]),
            }),
            (first, second) => Ok(first.or(second)),
        }
    }
}

fn reject_properties(node: &ObjectNode) -> Result<()> {
    match node.properties.first() {
        Some(property) => Err(Error::unknown_property(&node.name, &property.name)),
        None => Ok(()),
    }
}

fn check_len(name: &str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::LengthMismatch {
            name: name.to_string(),
            expected,
            found,
        })
    }
}

/// Per-vertex attributes hold either nothing or one entry per vertex.
fn check_optional_len(name: &str, vertex_count: usize, found: usize) -> Result<()> {
    if found == 0 {
        Ok(())
    } else {
        check_len(name, vertex_count, found)
    }
}

fn face_index(index: i32, vertex_count: usize) -> Result<u32> {
    match u32::try_from(index) {
        Ok(i) if (i as usize) < vertex_count => Ok(i),
        _ => Err(Error::FaceIndexOutOfRange {
            index: i64::from(index),
            vertex_count,
        }),
    }
}

// ==================== Generic tree -> domain ====================

/// Build the typed model from a parsed generic tree.
///
/// # Errors
/// Any classification, layout or consistency error; the first one aborts.
pub fn file_from_document(doc: &PdxDocument) -> Result<PdxFile> {
    let asset = asset_from_properties(&doc.properties)?;

    let mut world = None;
    let mut locators = None;
    for object in &doc.objects {
        match classify(object, None)? {
            NodeKind::World => {
                if world.is_some() {
                    return Err(duplicate("root", &object.name));
                }
                world = Some(world_from_node(object)?);
            }
            NodeKind::Locators => {
                if locators.is_some() {
                    return Err(duplicate("root", &object.name));
                }
                locators = Some(locators_from_node(object)?);
            }
            other => return Err(unexpected("root", other.label())),
        }
    }

    let world = world.ok_or_else(|| Error::missing("root", "object"))?;
    Ok(PdxFile {
        asset,
        world,
        locators,
    })
}

fn duplicate(parent: &str, name: &str) -> Error {
    Error::DuplicateNode {
        parent: parent.to_string(),
        name: name.to_string(),
    }
}

fn asset_from_properties(properties: &[PropertyNode]) -> Result<Asset> {
    let mut version = None;
    let mut trailer = Vec::new();
    for property in properties {
        if property.name != ASSET_PROPERTY {
            return Err(Error::unknown_property("root", &property.name));
        }
        if version.is_some() {
            return Err(duplicate("root", ASSET_PROPERTY));
        }
        match property.as_ints("root")? {
            [major, minor, rest @ ..] => {
                version = Some((*major, *minor));
                trailer = rest.to_vec();
            }
            other => {
                return Err(Error::InvalidNode {
                    node: "asset",
                    message: format!(
                        "expected major and minor version, found {} value(s)",
                        other.len()
                    ),
                });
            }
        }
    }
    let version = version.ok_or_else(|| Error::missing("root", ASSET_PROPERTY))?;
    Ok(Asset { version, trailer })
}

fn world_from_node(node: &ObjectNode) -> Result<World> {
    reject_properties(node)?;
    let objects = node
        .children
        .iter()
        .map(|child| {
            classify(child, Some(NodeKind::World))?;
            shape_from_node(child)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(World { objects })
}

fn shape_from_node(node: &ObjectNode) -> Result<Shape> {
    tracing::debug!("Mapping shape '{}'", node.name);
    reject_properties(node)?;

    let mut shape = Shape::new(node.name.clone());
    for child in &node.children {
        match classify(child, Some(NodeKind::Shape))? {
            NodeKind::Mesh(layout) => shape.meshes.push(mesh_from_node(child, layout)?),
            NodeKind::Skeleton => {
                if shape.skeleton.is_some() {
                    return Err(duplicate(&node.name, &child.name));
                }
                shape.skeleton = Some(skeleton_from_node(child)?);
            }
            other => return Err(unexpected(&node.name, other.label())),
        }
    }
    Ok(shape)
}

fn mesh_from_node(node: &ObjectNode, layout: MeshLayout) -> Result<Mesh> {
    let props = Properties::collect(node, MESH_PROPERTIES)?;

    let vertices = transpose_3d("p", props.floats("p")?)?;
    let vertex_count = vertices.len();
    let faces = transpose::<i32, 3>("tri", props.ints("tri")?)?
        .into_iter()
        .map(|[a, b, c]| {
            Ok([
                face_index(a, vertex_count)?,
                face_index(b, vertex_count)?,
                face_index(c, vertex_count)?,
            ])
        })
        .collect::<Result<Vec<_>>>()?;

    let mut mesh = Mesh {
        vertices,
        faces,
        ..Mesh::default()
    };

    if layout == MeshLayout::Full {
        mesh.normals = transpose_3d("n", props.floats("n")?)?;
        mesh.tangents = transpose_4d("ta", props.floats("ta")?)?;
        mesh.uv0 = transpose_2d("u0", props.floats("u0")?)?;
        check_optional_len("n", vertex_count, mesh.normals.len())?;
        check_optional_len("ta", vertex_count, mesh.tangents.len())?;
        check_optional_len("u0", vertex_count, mesh.uv0.len())?;
    }

    for child in &node.children {
        let kind = classify(child, Some(NodeKind::Mesh(layout)))?;
        match kind {
            NodeKind::Bounds => {
                if mesh.bounds.is_some() {
                    return Err(duplicate("mesh", &child.name));
                }
                mesh.bounds = Some(bounds_from_node(child)?);
            }
            NodeKind::Material(material_layout) => {
                if mesh.material.is_some() {
                    return Err(duplicate("mesh", &child.name));
                }
                mesh.material = Some(material_from_node(child, material_layout)?);
            }
            NodeKind::Skin => {
                if mesh.skin.is_some() {
                    return Err(duplicate("mesh", &child.name));
                }
                mesh.skin = Some(skin_from_node(child, vertex_count)?);
            }
            other => return Err(unexpected("mesh", other.label())),
        }
    }

    if mesh.bounds.is_none() {
        return Err(Error::missing("mesh", "aabb"));
    }
    if mesh.material.is_none() {
        return Err(Error::missing("mesh", "material"));
    }

    tracing::debug!(
        "Mapped mesh: {} vertices, {} triangles, {:?} layout",
        vertex_count,
        mesh.faces.len(),
        layout
    );
    Ok(mesh)
}

fn vec3_from(name: &str, values: &[f32]) -> Result<Vec3> {
    check_len(name, 3, values.len())?;
    Ok(Vec3::from_slice(values))
}

fn bounds_from_node(node: &ObjectNode) -> Result<Bounds> {
    let props = Properties::collect(node, BOUNDS_PROPERTIES)?;
    Ok(Bounds {
        min: vec3_from("min", props.floats("min")?)?,
        max: vec3_from("max", props.floats("max")?)?,
    })
}

fn material_from_node(node: &ObjectNode, layout: MaterialLayout) -> Result<Material> {
    let props = Properties::collect(node, MATERIAL_PROPERTIES)?;
    let shader = props.string("shader")?;
    match layout {
        MaterialLayout::Collision => Ok(Material::collision()),
        MaterialLayout::Textured => {
            if shader == COLLISION_SHADER {
                return Err(Error::InvalidNode {
                    node: "material",
                    message: "collision material carries textures".to_string(),
                });
            }
            let textures = MaterialTextures::new(
                props.string("diff")?,
                props.string("n")?,
                props.string("spec")?,
            );
            Ok(Material::textured(shader, textures))
        }
    }
}

fn skin_from_node(node: &ObjectNode, vertex_count: usize) -> Result<Skin> {
    let props = Properties::collect(node, SKIN_PROPERTIES)?;

    let bones = match props.ints("bones")? {
        [bones] => *bones,
        other => {
            return Err(Error::InvalidNode {
                node: "skin",
                message: format!("expected one bones value, found {}", other.len()),
            });
        }
    };
    let bones_per_vertex = match u32::try_from(bones) {
        Ok(n) if n > 0 => n,
        _ => {
            return Err(Error::InvalidNode {
                node: "skin",
                message: format!("bones per vertex must be positive, found {bones}"),
            });
        }
    };

    let indices = props.ints("ix")?;
    let weights = props.floats("w")?;
    let slots = bones_per_vertex as usize;
    if indices.len() % slots != 0 {
        return Err(Error::MalformedArray {
            name: "ix".to_string(),
            len: indices.len(),
            arity: slots,
        });
    }
    check_len("ix", slots * vertex_count, indices.len())?;
    check_len("w", indices.len(), weights.len())?;

    Ok(Skin {
        bones_per_vertex,
        indices: indices.to_vec(),
        weights: weights.to_vec(),
    })
}

fn skeleton_from_node(node: &ObjectNode) -> Result<Skeleton> {
    reject_properties(node)?;
    let joints = node
        .children
        .iter()
        .map(|child| {
            classify(child, Some(NodeKind::Skeleton))?;
            joint_from_node(child)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Skeleton { joints })
}

fn single_int(props: &Properties<'_>, name: &'static str) -> Result<i32> {
    let values = props.ints(name)?;
    check_len(name, 1, values.len())?;
    Ok(values[0])
}

fn joint_from_node(node: &ObjectNode) -> Result<Joint> {
    let props = Properties::collect(node, JOINT_PROPERTIES)?;
    let index = single_int(&props, "ix")?;
    let parent = if props.contains("pa") {
        single_int(&props, "pa")?
    } else {
        -1
    };

    let tx = props.floats("tx")?;
    let transform: [f32; 12] = tx.try_into().map_err(|_| Error::LengthMismatch {
        name: "tx".to_string(),
        expected: 12,
        found: tx.len(),
    })?;

    Ok(Joint {
        name: node.name.clone(),
        index,
        parent,
        transform,
    })
}

fn locators_from_node(node: &ObjectNode) -> Result<Locators> {
    reject_properties(node)?;
    let locators = node
        .children
        .iter()
        .map(|child| {
            classify(child, Some(NodeKind::Locators))?;
            locator_from_node(child)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Locators { locators })
}

fn locator_from_node(node: &ObjectNode) -> Result<Locator> {
    let props = Properties::collect(node, LOCATOR_PROPERTIES)?;

    let position = props
        .either(["p", "pf"])?
        .ok_or_else(|| Error::missing(&node.name, "p"))?;
    let position = vec3_from(&position.name, position.as_floats(&node.name)?)?;

    let quaternion = match props.either(["q", "qf"])? {
        Some(q) => {
            let values = q.as_floats(&node.name)?;
            check_len(&q.name, 4, values.len())?;
            Vec4::from_slice(values)
        }
        None => Vec4::ZERO,
    };

    let parent = match props.get("pa") {
        Some(pa) => Some(pa.as_str(&node.name)?.to_string()),
        None => None,
    };

    Ok(Locator {
        name: node.name.clone(),
        position,
        quaternion,
        parent,
    })
}

// ==================== Domain -> generic tree ====================

/// Build the generic tree for a typed model.
///
/// The whole model is validated here, so nothing is serialized for a model
/// that cannot be written completely.
///
/// # Errors
/// `PrerequisiteMissing` for a mesh without bounds or material, and the
/// consistency errors also raised on read.
pub fn document_from_file(file: &PdxFile) -> Result<PdxDocument> {
    let (major, minor) = file.asset.version;
    let mut header = vec![major, minor];
    header.extend_from_slice(&file.asset.trailer);
    let mut doc = PdxDocument::new();
    doc.properties
        .push(PropertyNode::ints(ASSET_PROPERTY, header));

    let mut world = ObjectNode::new(names::WORLD, NodeKind::World.depth());
    for shape in &file.world.objects {
        world.children.push(shape_node(shape)?);
    }
    doc.objects.push(world);

    if let Some(locators) = &file.locators {
        let mut node = ObjectNode::new(names::LOCATORS, NodeKind::Locators.depth());
        for locator in &locators.locators {
            node.children.push(locator_node(locator));
        }
        doc.objects.push(node);
    }

    Ok(doc)
}

fn shape_node(shape: &Shape) -> Result<ObjectNode> {
    let mut node = ObjectNode::new(shape.name.clone(), NodeKind::Shape.depth());
    for mesh in &shape.meshes {
        node.children.push(mesh_node(mesh)?);
    }
    if let Some(skeleton) = &shape.skeleton {
        let mut skeleton_node = ObjectNode::new(names::SKELETON, NodeKind::Skeleton.depth());
        for joint in &skeleton.joints {
            skeleton_node.children.push(joint_node(joint));
        }
        node.children.push(skeleton_node);
    }
    Ok(node)
}

fn mesh_node(mesh: &Mesh) -> Result<ObjectNode> {
    let bounds = mesh.bounds.as_ref().ok_or_else(|| Error::missing("mesh", "aabb"))?;
    let material = mesh
        .material
        .as_ref()
        .ok_or_else(|| Error::missing("mesh", "material"))?;

    let vertex_count = mesh.vertex_count();
    let mut faces = Vec::with_capacity(mesh.faces.len());
    for face in &mesh.faces {
        let mut triple = [0i32; 3];
        for (slot, &index) in triple.iter_mut().zip(face) {
            *slot = match i32::try_from(index) {
                Ok(i) if (index as usize) < vertex_count => i,
                _ => {
                    return Err(Error::FaceIndexOutOfRange {
                        index: i64::from(index),
                        vertex_count,
                    });
                }
            };
        }
        faces.push(triple);
    }

    let layout = if mesh.has_collision_layout() && mesh.skin.is_none() {
        MeshLayout::Collision
    } else {
        MeshLayout::Full
    };

    let mut node = ObjectNode::new(names::MESH, NodeKind::Mesh(layout).depth())
        .with_property(PropertyNode::floats("p", flatten_3d(&mesh.vertices)));
    if layout == MeshLayout::Full {
        check_optional_len("n", vertex_count, mesh.normals.len())?;
        check_optional_len("ta", vertex_count, mesh.tangents.len())?;
        check_optional_len("u0", vertex_count, mesh.uv0.len())?;
        node = node
            .with_property(PropertyNode::floats("n", flatten_3d(&mesh.normals)))
            .with_property(PropertyNode::floats("ta", flatten_4d(&mesh.tangents)))
            .with_property(PropertyNode::floats("u0", flatten_2d(&mesh.uv0)));
    }
    node = node.with_property(PropertyNode::ints("tri", flatten(&faces)));

    node = node
        .with_child(bounds_node(bounds))
        .with_child(material_node(material)?);
    if let Some(skin) = &mesh.skin {
        node = node.with_child(skin_node(skin, vertex_count)?);
    }
    Ok(node)
}

fn bounds_node(bounds: &Bounds) -> ObjectNode {
    ObjectNode::new(names::BOUNDS, NodeKind::Bounds.depth())
        .with_property(PropertyNode::floats("min", bounds.min.to_array().to_vec()))
        .with_property(PropertyNode::floats("max", bounds.max.to_array().to_vec()))
}

fn material_node(material: &Material) -> Result<ObjectNode> {
    let layout = if material.is_collision() {
        MaterialLayout::Collision
    } else {
        MaterialLayout::Textured
    };
    let node = ObjectNode::new(names::MATERIAL, NodeKind::Material(layout).depth())
        .with_property(PropertyNode::string("shader", material.shader.clone()));

    match (layout, &material.textures) {
        (MaterialLayout::Collision, None) => Ok(node),
        (MaterialLayout::Collision, Some(_)) => Err(Error::InvalidNode {
            node: "material",
            message: "collision material carries textures".to_string(),
        }),
        (MaterialLayout::Textured, None) => Err(Error::missing("material", "textures")),
        (MaterialLayout::Textured, Some(textures)) => Ok(node
            .with_property(PropertyNode::string("diff", textures.diffuse.clone()))
            .with_property(PropertyNode::string("n", textures.normal.clone()))
            .with_property(PropertyNode::string("spec", textures.specular.clone()))),
    }
}

fn skin_node(skin: &Skin, vertex_count: usize) -> Result<ObjectNode> {
    let Ok(bones) = i32::try_from(skin.bones_per_vertex) else {
        return Err(Error::InvalidNode {
            node: "skin",
            message: format!("{} bones per vertex", skin.bones_per_vertex),
        });
    };
    if bones == 0 {
        return Err(Error::InvalidNode {
            node: "skin",
            message: "bones per vertex must be positive".to_string(),
        });
    }
    check_len("ix", skin.bones_per_vertex as usize * vertex_count, skin.indices.len())?;
    check_len("w", skin.indices.len(), skin.weights.len())?;

    Ok(ObjectNode::new(names::SKIN, NodeKind::Skin.depth())
        .with_property(PropertyNode::ints("bones", vec![bones]))
        .with_property(PropertyNode::ints("ix", skin.indices.clone()))
        .with_property(PropertyNode::floats("w", skin.weights.clone())))
}

fn joint_node(joint: &Joint) -> ObjectNode {
    let mut node = ObjectNode::new(joint.name.clone(), NodeKind::Joint.depth())
        .with_property(PropertyNode::ints("ix", vec![joint.index]));
    if joint.parent != -1 {
        node = node.with_property(PropertyNode::ints("pa", vec![joint.parent]));
    }
    node.with_property(PropertyNode::floats("tx", joint.transform.to_vec()))
}

fn locator_node(locator: &Locator) -> ObjectNode {
    let mut node = ObjectNode::new(locator.name.clone(), NodeKind::Locator.depth())
        .with_property(PropertyNode::floats("p", locator.position.to_array().to_vec()))
        .with_property(PropertyNode::floats("q", locator.quaternion.to_array().to_vec()));
    if let Some(parent) = &locator.parent {
        node = node.with_property(PropertyNode::string("pa", parent.clone()));
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use pretty_assertions::assert_eq;

    fn collision_mesh_node() -> ObjectNode {
        ObjectNode::new("mesh", 3)
            .with_property(PropertyNode::floats(
                "p",
                vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            ))
            .with_property(PropertyNode::ints("tri", vec![0, 1, 2]))
            .with_child(
                ObjectNode::new("aabb", 4)
                    .with_property(PropertyNode::floats("min", vec![0.0; 3]))
                    .with_property(PropertyNode::floats("max", vec![1.0, 1.0, 0.0])),
            )
            .with_child(
                ObjectNode::new("material", 4)
                    .with_property(PropertyNode::string("shader", "Collision")),
            )
    }

    fn document_with_mesh(mesh: ObjectNode) -> PdxDocument {
        PdxDocument {
            properties: vec![PropertyNode::ints("pdxasset", vec![1, 0])],
            objects: vec![
                ObjectNode::new("object", 1)
                    .with_child(ObjectNode::new("box:MeshShape", 2).with_child(mesh)),
            ],
        }
    }

    #[test]
    fn test_classify_by_parent() {
        let world = ObjectNode::new("object", 1);
        assert_eq!(classify(&world, None).unwrap(), NodeKind::World);
        assert_eq!(
            classify(&ObjectNode::new("locator", 1), None).unwrap(),
            NodeKind::Locators
        );
        assert_eq!(
            classify(&ObjectNode::new("anything", 2), Some(NodeKind::World)).unwrap(),
            NodeKind::Shape
        );
        assert_eq!(
            classify(&ObjectNode::new("Bone01", 4), Some(NodeKind::Skeleton)).unwrap(),
            NodeKind::Joint
        );
        assert_eq!(
            classify(&ObjectNode::new("hardpoint", 2), Some(NodeKind::Locators)).unwrap(),
            NodeKind::Locator
        );
        assert_eq!(
            classify(&collision_mesh_node(), Some(NodeKind::Shape)).unwrap(),
            NodeKind::Mesh(MeshLayout::Collision)
        );

        assert!(matches!(
            classify(&ObjectNode::new("mesh", 1), None),
            Err(Error::UnexpectedNode { .. })
        ));
        assert!(matches!(
            classify(&ObjectNode::new("x", 5), Some(NodeKind::Bounds)),
            Err(Error::UnexpectedNode { .. })
        ));
    }

    #[test]
    fn test_depth_table() {
        assert_eq!(NodeKind::World.depth(), 1);
        assert_eq!(NodeKind::Shape.depth(), 2);
        assert_eq!(NodeKind::Mesh(MeshLayout::Full).depth(), 3);
        assert_eq!(NodeKind::Skeleton.depth(), 3);
        assert_eq!(NodeKind::Material(MaterialLayout::Collision).depth(), 4);
        assert_eq!(NodeKind::Bounds.depth(), 4);
        assert_eq!(NodeKind::Skin.depth(), 4);
        assert_eq!(NodeKind::Locators.depth(), 1);
        assert_eq!(NodeKind::Locator.depth(), 2);
    }

    #[test]
    fn test_mesh_layout_by_property_count() {
        let three = ObjectNode::new("mesh", 3)
            .with_property(PropertyNode::floats("p", vec![]))
            .with_property(PropertyNode::floats("n", vec![]))
            .with_property(PropertyNode::ints("tri", vec![]));
        assert!(matches!(
            mesh_layout(&three),
            Err(Error::InvalidPropertyCount { found: 3, .. })
        ));

        let wrong_pair = ObjectNode::new("mesh", 3)
            .with_property(PropertyNode::floats("p", vec![]))
            .with_property(PropertyNode::floats("n", vec![]));
        assert!(matches!(mesh_layout(&wrong_pair), Err(Error::InvalidNode { .. })));

        let unknown = ObjectNode::new("mesh", 3).with_property(PropertyNode::floats("uv1", vec![]));
        assert!(matches!(
            mesh_layout(&unknown),
            Err(Error::UnknownPropertyName { .. })
        ));
    }

    #[test]
    fn test_material_layout() {
        let collision = ObjectNode::new("material", 4)
            .with_property(PropertyNode::string("shader", "Collision"));
        assert_eq!(material_layout(&collision).unwrap(), MaterialLayout::Collision);

        let lonely = ObjectNode::new("material", 4)
            .with_property(PropertyNode::string("shader", "PdxMeshStandard"));
        assert!(matches!(material_layout(&lonely), Err(Error::InvalidNode { .. })));

        let two = lonely.with_property(PropertyNode::string("diff", "a.dds"));
        assert!(matches!(
            material_layout(&two),
            Err(Error::InvalidPropertyCount { found: 2, .. })
        ));
    }

    #[test]
    fn test_collision_mesh_from_document() {
        let file = file_from_document(&document_with_mesh(collision_mesh_node())).unwrap();
        let mesh = &file.world.objects[0].meshes[0];
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
        assert!(mesh.normals.is_empty());
        assert!(mesh.is_collision());
        assert_eq!(file.asset.version, (1, 0));
        assert!(file.locators.is_none());
    }

    #[test]
    fn test_face_index_out_of_range() {
        let mut mesh = collision_mesh_node();
        mesh.properties[1] = PropertyNode::ints("tri", vec![0, 1, 3]);
        let err = file_from_document(&document_with_mesh(mesh)).unwrap_err();
        assert!(matches!(
            err,
            Error::FaceIndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        ));
    }

    #[test]
    fn test_mesh_without_material_is_rejected() {
        let mut mesh = collision_mesh_node();
        mesh.children.pop();
        let err = file_from_document(&document_with_mesh(mesh)).unwrap_err();
        assert!(matches!(err, Error::PrerequisiteMissing { what: "material", .. }));
    }

    #[test]
    fn test_asset_trailer_is_kept() {
        let mut doc = document_with_mesh(collision_mesh_node());
        doc.properties[0] = PropertyNode::ints("pdxasset", vec![1, 0, 0, 7]);
        let file = file_from_document(&doc).unwrap();
        assert_eq!(file.asset.version, (1, 0));
        assert_eq!(file.asset.trailer, vec![0, 7]);
        assert_eq!(document_from_file(&file).unwrap().properties, doc.properties);

        doc.properties[0] = PropertyNode::ints("pdxasset", vec![1]);
        assert!(matches!(
            file_from_document(&doc),
            Err(Error::InvalidNode { node: "asset", .. })
        ));
    }

    #[test]
    fn test_missing_asset_header() {
        let mut doc = document_with_mesh(collision_mesh_node());
        doc.properties.clear();
        assert!(matches!(
            file_from_document(&doc),
            Err(Error::PrerequisiteMissing { what: "pdxasset", .. })
        ));
    }

    #[test]
    fn test_skin_length_must_match_vertices() {
        let mesh = Mesh {
            vertices: vec![Vec3::ZERO; 2],
            normals: vec![Vec3::Z; 2],
            tangents: vec![Vec4::X; 2],
            uv0: vec![Vec2::ZERO; 2],
            bounds: Some(Bounds::new(Vec3::ZERO, Vec3::ZERO)),
            material: Some(Material::textured(
                "PdxMeshStandard",
                MaterialTextures::from_diffuse("a_diff.dds"),
            )),
            skin: Some(Skin {
                bones_per_vertex: 4,
                indices: vec![0, -1, -1, -1],
                weights: vec![1.0, 0.0, 0.0, 0.0],
            }),
            ..Mesh::default()
        };
        assert!(matches!(
            mesh_node(&mesh),
            Err(Error::LengthMismatch { expected: 8, found: 4, .. })
        ));
    }

    #[test]
    fn test_serialize_requires_bounds_and_material() {
        let mut mesh = Mesh {
            vertices: vec![Vec3::ZERO],
            material: Some(Material::collision()),
            ..Mesh::default()
        };
        assert!(matches!(
            mesh_node(&mesh),
            Err(Error::PrerequisiteMissing { what: "aabb", .. })
        ));

        mesh.bounds = Some(Bounds::new(Vec3::ZERO, Vec3::ZERO));
        mesh.material = None;
        assert!(matches!(
            mesh_node(&mesh),
            Err(Error::PrerequisiteMissing { what: "material", .. })
        ));
    }

    #[test]
    fn test_material_texture_consistency_on_write() {
        let bad = Material {
            shader: COLLISION_SHADER.to_string(),
            textures: Some(MaterialTextures::from_diffuse("x_diff.dds")),
        };
        assert!(matches!(material_node(&bad), Err(Error::InvalidNode { .. })));

        let bare = Material {
            shader: "PdxMeshStandard".to_string(),
            textures: None,
        };
        assert!(matches!(
            material_node(&bare),
            Err(Error::PrerequisiteMissing { what: "textures", .. })
        ));
    }

    #[test]
    fn test_joint_parent_defaults_to_root() {
        let node = ObjectNode::new("root", 4)
            .with_property(PropertyNode::ints("ix", vec![0]))
            .with_property(PropertyNode::floats("tx", Joint::IDENTITY_TRANSFORM.to_vec()));
        let joint = joint_from_node(&node).unwrap();
        assert_eq!(joint, Joint::root());
        assert_eq!(joint_node(&joint), node);

        let odd = Joint::new("odd", 3, -2);
        assert_eq!(joint_from_node(&joint_node(&odd)).unwrap(), odd);

        let short = ObjectNode::new("bad", 4)
            .with_property(PropertyNode::ints("ix", vec![1]))
            .with_property(PropertyNode::floats("tx", vec![0.0; 9]));
        assert!(matches!(
            joint_from_node(&short),
            Err(Error::LengthMismatch { expected: 12, found: 9, .. })
        ));
    }

    #[test]
    fn test_locator_aliases() {
        let node = ObjectNode::new("muzzle", 2)
            .with_property(PropertyNode::floats("pf", vec![1.0, 2.0, 3.0]));
        let locator = locator_from_node(&node).unwrap();
        assert_eq!(locator.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(locator.quaternion, Vec4::ZERO);
        assert_eq!(locator.parent, None);

        let both = node.with_property(PropertyNode::floats("p", vec![0.0; 3]));
        assert!(matches!(
            locator_from_node(&both),
            Err(Error::DuplicateNode { .. })
        ));
    }
}
