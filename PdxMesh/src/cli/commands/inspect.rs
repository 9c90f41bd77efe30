//! Mesh inspection commands
//!
//! Commands for summarising, dumping and exporting mesh files.

use std::path::Path;
use crate::formats::pdx::{parse_pdx_tree, read_pdx};

/// Inspect a mesh file and display its structure.
pub fn inspect(path: &Path) -> anyhow::Result<()> {
    println!("Inspecting mesh file: {}", path.display());
    println!();

    let file = read_pdx(path)?;
    let summary = file.summary();

    println!("PDX Mesh Information");
    println!("====================");
    println!("Version:     {}.{}", summary.version.0, summary.version.1);
    println!("Shapes:      {}", summary.shapes);
    println!(
        "Meshes:      {} ({} collision, {} skinned)",
        summary.meshes, summary.collision_meshes, summary.skinned_meshes
    );
    println!("Vertices:    {}", summary.vertices);
    println!("Triangles:   {}", summary.triangles);
    println!();

    for shape in &file.world.objects {
        println!("{}", shape.name);
        for mesh in &shape.meshes {
            let shader = mesh.material.as_ref().map_or("-", |m| m.shader.as_str());
            println!(
                "  - mesh ({} vertices, {} triangles, shader {})",
                mesh.vertex_count(),
                mesh.triangle_count(),
                shader
            );
            if let Some(diffuse) = mesh.material.as_ref().and_then(|m| m.diffuse()) {
                println!("      diffuse: {diffuse}");
            }
            if let Some(ref skin) = mesh.skin {
                println!("      skin: {} bones per vertex", skin.bones_per_vertex);
            }
        }
        match shape.skeleton {
            Some(ref skeleton) => {
                println!("  Skeleton ({} joints):", skeleton.joints.len());
                for joint in &skeleton.joints {
                    println!("    [{:3}] {} (parent {})", joint.index, joint.name, joint.parent);
                }
            }
            None => println!("  Skeleton: None"),
        }
    }

    if let Some(ref locators) = file.locators {
        println!();
        println!("Locators ({}):", locators.locators.len());
        for locator in &locators.locators {
            let parent = locator.parent.as_deref().unwrap_or("-");
            println!("  - {} at {} (parent {})", locator.name, locator.position, parent);
        }
    }

    Ok(())
}

/// Print the generic node tree.
pub fn tree(path: &Path) -> anyhow::Result<()> {
    let data = std::fs::read(path)?;
    let doc = parse_pdx_tree(&data)?;
    print!("{}", doc.render_tree());
    println!();
    println!("{} object(s)", doc.node_count());
    Ok(())
}

/// Export the typed model to JSON.
pub fn json(path: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let file = read_pdx(path)?;
    let json = serde_json::to_string_pretty(&file)?;

    match output {
        Some(output) => {
            std::fs::write(output, json)?;
            println!("Written to: {}", output.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
