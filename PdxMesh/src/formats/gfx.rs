//! `.gfx` sidecar descriptor
//!
//! A small text file written next to an exported mesh that registers it with
//! the engine:
//!
//! ```text
//! objectTypes = {
//!     pdxmesh = {
//!         name = "ship_mesh"
//!         file = "ship.mesh"
//!         scale = 1
//!     }
//! }
//! ```
//!
//! Only the key/value pairs are significant; whitespace and `#` comments are
//! ignored on parse.

use crate::error::{Error, Result};
use crate::formats::pdx::ExportOptions;
use indexmap::IndexMap;
use std::fmt::Write;
use std::path::Path;

/// One `pdxmesh` entry of a `.gfx` file.
#[derive(Debug, Clone, PartialEq)]
pub struct GfxDescriptor {
    pub name: String,
    pub file: String,
    pub scale: f32,
    /// Further pairs, written after `scale` in insertion order
    pub extra: IndexMap<String, String>,
}

impl GfxDescriptor {
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            scale: 1.0,
            extra: IndexMap::new(),
        }
    }

    /// Descriptor for a mesh file: `name` is the file stem plus `_mesh`,
    /// `file` is the bare file name.
    pub fn for_mesh(mesh_path: &Path, options: &ExportOptions) -> Self {
        let stem = mesh_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = mesh_path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name: format!("{stem}_mesh"),
            file,
            scale: options.gfx_scale,
            extra: options.gfx_extra.clone(),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("objectTypes = {\n");
        out.push_str("\tpdxmesh = {\n");
        let _ = writeln!(out, "\t\tname = {}", quote(&self.name));
        let _ = writeln!(out, "\t\tfile = {}", quote(&self.file));
        let _ = writeln!(out, "\t\tscale = {}", self.scale);
        for (key, value) in &self.extra {
            let _ = writeln!(out, "\t\t{key} = {}", render_value(value));
        }
        out.push_str("\t}\n");
        out.push_str("}\n");
        out
    }

    /// Parse the first `pdxmesh` entry of an `objectTypes` block.
    ///
    /// # Errors
    /// Returns [`Error::InvalidNode`] if the text is not a well-formed block
    /// or lacks `name` / `file`.
    pub fn parse(text: &str) -> Result<Self> {
        let tokens = tokenize(text)?;
        let mut tokens = tokens.iter().map(String::as_str);

        expect_token(&mut tokens, "objectTypes")?;
        expect_token(&mut tokens, "=")?;
        expect_token(&mut tokens, "{")?;
        expect_token(&mut tokens, "pdxmesh")?;
        expect_token(&mut tokens, "=")?;
        expect_token(&mut tokens, "{")?;

        let mut name = None;
        let mut file = None;
        let mut scale = 1.0;
        let mut extra = IndexMap::new();

        loop {
            let key = next_token(&mut tokens)?;
            if key == "}" {
                break;
            }
            expect_token(&mut tokens, "=")?;
            let value = next_token(&mut tokens)?;
            match key {
                "name" => name = Some(value.to_string()),
                "file" => file = Some(value.to_string()),
                "scale" => {
                    scale = value
                        .parse::<f32>()
                        .map_err(|_| gfx_error(format!("scale '{value}' is not a number")))?;
                }
                _ => {
                    extra.insert(key.to_string(), value.to_string());
                }
            }
        }
        expect_token(&mut tokens, "}")?;

        Ok(Self {
            name: name.ok_or_else(|| gfx_error("missing name".to_string()))?,
            file: file.ok_or_else(|| gfx_error("missing file".to_string()))?,
            scale,
            extra,
        })
    }
}

fn gfx_error(message: String) -> Error {
    Error::InvalidNode {
        node: "gfx",
        message,
    }
}

fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Numbers are written bare, everything else quoted.
fn render_value(value: &str) -> String {
    if value.parse::<f64>().is_ok() {
        value.to_string()
    } else {
        quote(value)
    }
}

fn next_token<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<&'a str> {
    tokens
        .next()
        .ok_or_else(|| gfx_error("unexpected end of input".to_string()))
}

fn expect_token<'a>(tokens: &mut impl Iterator<Item = &'a str>, expected: &str) -> Result<()> {
    let token = next_token(tokens)?;
    if token == expected {
        Ok(())
    } else {
        Err(gfx_error(format!("expected '{expected}', found '{token}'")))
    }
}

/// Split into `{`, `}`, `=`, quoted strings (quotes stripped, `\` escapes
/// resolved) and bare words.
fn tokenize(text: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '#' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '{' | '}' | '=' => tokens.push(c.to_string()),
            '"' => {
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => value.push(escaped),
                            None => return Err(gfx_error("unterminated string".to_string())),
                        },
                        Some(c) => value.push(c),
                        None => return Err(gfx_error("unterminated string".to_string())),
                    }
                }
                tokens.push(value);
            }
            c => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() || matches!(next, '{' | '}' | '=' | '"' | '#') {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                tokens.push(word);
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_for_mesh_names() {
        let path = PathBuf::from("gfx/models/ships/corvette.mesh");
        let descriptor = GfxDescriptor::for_mesh(&path, &ExportOptions::new());
        assert_eq!(descriptor.name, "corvette_mesh");
        assert_eq!(descriptor.file, "corvette.mesh");
        assert_eq!(descriptor.scale, 1.0);
    }

    #[test]
    fn test_render_layout() {
        let rendered = GfxDescriptor::new("a_mesh", "a.mesh").render();
        assert_eq!(
            rendered,
            "objectTypes = {\n\tpdxmesh = {\n\t\tname = \"a_mesh\"\n\t\tfile = \"a.mesh\"\n\t\tscale = 1\n\t}\n}\n"
        );
    }

    #[test]
    fn test_parse_rendered_with_extras() {
        let options = ExportOptions::new()
            .with_gfx_scale(2.5)
            .with_gfx_entry("shader", "PdxMeshShip")
            .with_gfx_entry("lod", "2");
        let descriptor = GfxDescriptor::for_mesh(Path::new("ship.mesh"), &options);
        let rendered = descriptor.render();
        assert!(rendered.contains("lod = 2\n"));
        assert!(rendered.contains("shader = \"PdxMeshShip\""));

        assert_eq!(GfxDescriptor::parse(&rendered).unwrap(), descriptor);
    }

    #[test]
    fn test_quotes_in_values_are_escaped() {
        let mut descriptor = GfxDescriptor::new("q_mesh", "q.mesh");
        descriptor
            .extra
            .insert("label".to_string(), "say \"hi\" C:\\ships".to_string());
        let rendered = descriptor.render();
        assert!(rendered.contains(r#"label = "say \"hi\" C:\\ships""#));

        assert_eq!(GfxDescriptor::parse(&rendered).unwrap(), descriptor);
    }

    #[test]
    fn test_parse_ignores_layout_and_comments() {
        let text = "# generated\nobjectTypes={pdxmesh={file=\"b.mesh\" name = \"b_mesh\" scale=0.5}}";
        let descriptor = GfxDescriptor::parse(text).unwrap();
        assert_eq!(descriptor.name, "b_mesh");
        assert_eq!(descriptor.file, "b.mesh");
        assert_eq!(descriptor.scale, 0.5);
    }

    #[test]
    fn test_parse_errors() {
        assert!(GfxDescriptor::parse("objectTypes = { pdxmesh = { name = \"x\" } }").is_err());
        assert!(GfxDescriptor::parse("objectTypes = { pdxmesh = { name = \"x").is_err());
        assert!(GfxDescriptor::parse("spriteTypes = { }").is_err());
        assert!(
            GfxDescriptor::parse("objectTypes = { pdxmesh = { name = a file = b scale = big } }")
                .is_err()
        );
    }
}
