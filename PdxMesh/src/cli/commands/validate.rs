//! Batch validation command
use std::path::Path;
use std::time::Instant;

use console::style;

use crate::batch::{find_mesh_files, validate_batch};
use crate::cli::progress::{print_done, simple_bar};
use crate::formats::pdx::ReadOptions;

/// Parse every mesh under `dir` and report failures.
pub fn execute(dir: &Path, check_bounds: bool, json: bool, quiet: bool) -> anyhow::Result<()> {
    let started = Instant::now();
    let meshes = find_mesh_files(dir);

    if meshes.is_empty() {
        println!("No mesh files found in: {}", dir.display());
        return Ok(());
    }

    let options = if check_bounds {
        ReadOptions::new().with_bounds_check()
    } else {
        ReadOptions::new()
    };

    let show_progress = !quiet && !json;
    if show_progress {
        println!("Found {} mesh files to validate", meshes.len());
    }
    let pb = simple_bar(meshes.len() as u64, "Validating");
    if !show_progress {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let result = validate_batch(&meshes, &options, |current, _, path| {
        pb.set_position(current as u64);
        if let Some(name) = path.file_name() {
            pb.set_message(name.to_string_lossy().into_owned());
        }
    });
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!("Validation complete:");
        println!("  Valid:  {}", style(result.success_count).green());
        println!("  Failed: {}", style(result.fail_count).red());

        if result.fail_count > 0 {
            println!();
            println!("Failures:");
            for failure in result.failures() {
                let display = failure.path.strip_prefix(dir).unwrap_or(failure.path.as_path());
                if let Err(ref message) = failure.outcome {
                    println!("  {}: {message}", display.display());
                }
            }
        }
        print_done(started.elapsed());
    }

    if result.fail_count > 0 {
        anyhow::bail!("{} of {} mesh files failed to parse", result.fail_count, meshes.len());
    }
    Ok(())
}
