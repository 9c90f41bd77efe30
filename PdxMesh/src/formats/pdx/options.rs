//! Read and export options

use indexmap::IndexMap;

/// Options for [`export_pdx`](super::export_pdx).
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Write the `.gfx` sidecar next to the mesh
    pub write_gfx: bool,
    /// `scale` value of the sidecar entry
    pub gfx_scale: f32,
    /// Extra key/value pairs passed through to the sidecar entry, in order
    pub gfx_extra: IndexMap<String, String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            write_gfx: true,
            gfx_scale: 1.0,
            gfx_extra: IndexMap::new(),
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the `.gfx` sidecar
    #[must_use]
    pub fn no_gfx(mut self) -> Self {
        self.write_gfx = false;
        self
    }

    #[must_use]
    pub fn with_gfx_scale(mut self, scale: f32) -> Self {
        self.gfx_scale = scale;
        self
    }

    /// Add a pass-through sidecar entry (replacing an existing key in place)
    #[must_use]
    pub fn with_gfx_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.gfx_extra.insert(key.into(), value.into());
        self
    }
}

/// Options for [`read_pdx_with_options`](super::read_pdx_with_options).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Log a warning for every mesh whose bounds are not componentwise ordered
    pub check_bounds: bool,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bounds_check(mut self) -> Self {
        self.check_bounds = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_defaults() {
        let options = ExportOptions::new();
        assert!(options.write_gfx);
        assert_eq!(options.gfx_scale, 1.0);
        assert!(options.gfx_extra.is_empty());
    }

    #[test]
    fn test_export_builder() {
        let options = ExportOptions::new()
            .no_gfx()
            .with_gfx_scale(0.5)
            .with_gfx_entry("b", "1")
            .with_gfx_entry("a", "2")
            .with_gfx_entry("b", "3");
        assert!(!options.write_gfx);
        assert_eq!(options.gfx_scale, 0.5);
        let pairs: Vec<(&str, &str)> = options
            .gfx_extra
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(pairs, vec![("b", "3"), ("a", "2")]);
    }

    #[test]
    fn test_read_options() {
        assert!(!ReadOptions::default().check_bounds);
        assert!(ReadOptions::new().with_bounds_check().check_bounds);
    }
}
