//! Command execution implementations

use super::Commands;
use super::{convert, inspect, validate};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Inspect { path } => inspect::inspect(path),
            Commands::Tree { path } => inspect::tree(path),
            Commands::Json { path, output } => inspect::json(path, output.as_deref()),
            Commands::Rewrite {
                source,
                destination,
                gfx,
            } => convert::rewrite(source, destination, *gfx),
            Commands::Gfx {
                path,
                scale,
                entries,
            } => convert::gfx(path, *scale, entries),
            Commands::Validate {
                dir,
                check_bounds,
                json,
                quiet,
            } => validate::execute(dir, *check_bounds, *json, *quiet),
        }
    }
}
