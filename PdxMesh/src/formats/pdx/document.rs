//! Generic PDX tree structure definitions
//!
//! The generic tree is what the node parser produces before any domain
//! interpretation: objects carry their bracket depth, their own properties and
//! the objects nested under them.

use super::property::{PropertyKind, PropertyNode};
use std::fmt::Write;

/// One object of the generic tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    pub name: String,
    /// Number of `[` bytes preceding the name on the wire.
    pub depth: u32,
    pub properties: Vec<PropertyNode>,
    pub children: Vec<ObjectNode>,
}

impl ObjectNode {
    pub fn new(name: impl Into<String>, depth: u32) -> Self {
        ObjectNode {
            name: name.into(),
            depth,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, property: PropertyNode) -> Self {
        self.properties.push(property);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: ObjectNode) -> Self {
        self.children.push(child);
        self
    }

    /// First property with the given (short) name.
    pub fn property(&self, name: &str) -> Option<&PropertyNode> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.children.iter().any(|c| c.name == name)
    }

    /// Depth-first search by name, starting with this node.
    pub fn find(&self, name: &str) -> Option<&ObjectNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Number of objects in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ObjectNode::node_count).sum::<usize>()
    }
}

/// The generic tree of a whole file: properties that precede the first
/// object (the asset header) and the top-level objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdxDocument {
    pub properties: Vec<PropertyNode>,
    pub objects: Vec<ObjectNode>,
}

impl PdxDocument {
    pub fn new() -> Self {
        PdxDocument {
            properties: Vec::new(),
            objects: Vec::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyNode> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Depth-first search over all top-level objects.
    pub fn find(&self, name: &str) -> Option<&ObjectNode> {
        self.objects.iter().find_map(|object| object.find(name))
    }

    pub fn node_count(&self) -> usize {
        self.objects.iter().map(ObjectNode::node_count).sum()
    }

    /// Render the tree with one `-` per nesting level.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        for property in &self.properties {
            push_property(&mut out, property, 0);
        }
        for object in &self.objects {
            push_object(&mut out, object, 0);
        }
        out
    }
}

fn push_object(out: &mut String, object: &ObjectNode, indent: usize) {
    let _ = writeln!(out, "{}{}", "-".repeat(indent), object.name);
    for property in &object.properties {
        push_property(out, property, indent + 1);
    }
    for child in &object.children {
        push_object(out, child, indent + 1);
    }
}

fn push_property(out: &mut String, property: &PropertyNode, indent: usize) {
    let kind = match property.kind() {
        PropertyKind::Int => "i",
        PropertyKind::Float => "f",
        PropertyKind::String => "s",
    };
    let _ = writeln!(
        out,
        "{}!{} ({kind}, {})",
        " ".repeat(indent),
        property.name,
        property.value.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PdxDocument {
        let shape = ObjectNode::new("ship:MeshShape", 2)
            .with_child(ObjectNode::new("mesh", 3).with_child(ObjectNode::new("aabb", 4)))
            .with_child(ObjectNode::new("skeleton", 3));
        PdxDocument {
            properties: vec![PropertyNode::ints("pdxasset", vec![1, 0])],
            objects: vec![ObjectNode::new("object", 1).with_child(shape)],
        }
    }

    #[test]
    fn test_find_and_has_child() {
        let doc = sample();
        let aabb = doc.find("aabb").unwrap();
        assert_eq!(aabb.depth, 4);
        assert!(doc.find("locator").is_none());

        let world = &doc.objects[0];
        assert!(world.has_child("ship:MeshShape"));
        assert!(!world.has_child("mesh"));
        assert_eq!(world.find("object").unwrap().name, "object");
        assert_eq!(doc.node_count(), 5);
    }

    #[test]
    fn test_render_tree() {
        let rendered = sample().render_tree();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "!pdxasset (i, 2)");
        assert_eq!(lines[1], "object");
        assert_eq!(lines[2], "-ship:MeshShape");
        assert_eq!(lines[3], "--mesh");
        assert_eq!(lines[4], "---aabb");
        assert_eq!(lines[5], "--skeleton");
    }
}
