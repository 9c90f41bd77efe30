//! CLI interface for rewriting meshes and writing sidecars
use std::path::Path;
use std::time::Instant;

use super::GfxEntryArg;
use crate::cli::progress::{DISK, DOCUMENT, GEAR, LOOKING_GLASS, print_done, print_step};
use crate::formats::gfx::GfxDescriptor;
use crate::formats::pdx::{ExportOptions, export_pdx, parse_pdx_bytes, serialize_pdx};

/// Parse a mesh and serialize it again, reporting whether the bytes changed.
pub fn rewrite(source: &Path, destination: &Path, gfx: bool) -> anyhow::Result<()> {
    let started = Instant::now();

    print_step(1, 3, LOOKING_GLASS, &format!("Reading {}", source.display()));
    let original = std::fs::read(source)?;
    let file = parse_pdx_bytes(&original)?;

    print_step(2, 3, GEAR, "Serializing");
    let rewritten = serialize_pdx(&file)?;
    if rewritten == original {
        println!("      output is byte-identical");
    } else {
        println!(
            "      output differs ({} -> {} bytes)",
            original.len(),
            rewritten.len()
        );
    }

    print_step(3, 3, DISK, &format!("Writing {}", destination.display()));
    if gfx {
        let result = export_pdx(&file, destination, &ExportOptions::new())?;
        if let Some(gfx_path) = result.gfx_path {
            println!("      sidecar: {}", gfx_path.display());
        }
    } else {
        std::fs::write(destination, &rewritten)?;
    }

    print_done(started.elapsed());
    Ok(())
}

/// Write the `.gfx` sidecar next to an existing mesh file.
pub fn gfx(path: &Path, scale: f32, entries: &[GfxEntryArg]) -> anyhow::Result<()> {
    if !path.is_file() {
        anyhow::bail!("Mesh file not found: {}", path.display());
    }

    let options = entries
        .iter()
        .fold(ExportOptions::new().with_gfx_scale(scale), |options, entry| {
            options.with_gfx_entry(entry.0.clone(), entry.1.clone())
        });
    let descriptor = GfxDescriptor::for_mesh(path, &options);
    let gfx_path = path.with_extension("gfx");
    std::fs::write(&gfx_path, descriptor.render())?;

    println!("{}Written to: {}", DOCUMENT, gfx_path.display());
    Ok(())
}
