use clap::Subcommand;
use std::path::PathBuf;
use std::str::FromStr;

pub mod convert;
pub mod execute;
pub mod inspect;
pub mod validate;

/// A `key=value` pair passed through to the `.gfx` sidecar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GfxEntryArg(pub String, pub String);

impl FromStr for GfxEntryArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok(GfxEntryArg(key.trim().to_string(), value.trim().to_string()))
            }
            _ => Err(format!("Invalid entry '{s}'. Expected key=value")),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show shapes, meshes, skeletons and locators of a mesh file
    Inspect {
        /// Source .mesh file
        path: PathBuf,
    },

    /// Dump the raw node tree of a mesh file
    Tree {
        /// Source .mesh file
        path: PathBuf,
    },

    /// Export the typed model of a mesh file as JSON
    Json {
        /// Source .mesh file
        path: PathBuf,

        /// Output file (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a mesh file and write it back out
    Rewrite {
        /// Source .mesh file
        source: PathBuf,

        /// Output .mesh file
        destination: PathBuf,

        /// Also write the .gfx sidecar
        #[arg(long)]
        gfx: bool,
    },

    /// Write the .gfx sidecar for a mesh file
    Gfx {
        /// Source .mesh file
        path: PathBuf,

        /// Sidecar scale
        #[arg(short, long, default_value_t = 1.0)]
        scale: f32,

        /// Extra sidecar entries (key=value, repeatable)
        #[arg(long = "set")]
        entries: Vec<GfxEntryArg>,
    },

    /// Parse every .mesh file under a directory
    Validate {
        /// Directory to search
        dir: PathBuf,

        /// Warn about meshes with unordered bounds
        #[arg(long)]
        check_bounds: bool,

        /// Print a JSON report instead of the summary
        #[arg(long)]
        json: bool,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gfx_entry_arg() {
        assert_eq!(
            "lod = 2".parse::<GfxEntryArg>().unwrap(),
            GfxEntryArg("lod".to_string(), "2".to_string())
        );
        assert_eq!(
            "path=a=b".parse::<GfxEntryArg>().unwrap(),
            GfxEntryArg("path".to_string(), "a=b".to_string())
        );
        assert!("novalue".parse::<GfxEntryArg>().is_err());
        assert!("=x".parse::<GfxEntryArg>().is_err());
    }
}
