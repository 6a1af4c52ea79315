//! @ai:module:intent Map file extensions to directive comment templates
//! @ai:module:layer domain
//! @ai:module:public_api Template, TemplateTable, DEFAULT_TEMPLATES
//! @ai:module:depends_on error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Placeholder marking where the directive goes inside a template.
pub const PLACEHOLDER: char = '?';

/// Built-in templates, in the order extension indices refer to them.
pub const DEFAULT_TEMPLATES: [&str; 5] = ["#LINT.?", "//LINT.?", "/*LINT.?", "<!--LINT.?", "'LINT.?"];

const DEFAULT_EXTENSIONS: &[(&str, &[usize])] = &[
    ("py", &[0]),
    ("sh", &[0]),
    ("go", &[1]),
    ("js", &[1, 2]),
    ("jsx", &[1, 2]),
    ("mjs", &[1, 2]),
    ("ts", &[1, 2]),
    ("tsx", &[1, 2]),
    ("jsonc", &[1, 2]),
    ("c", &[1, 2]),
    ("cc", &[1, 2]),
    ("cpp", &[1, 2]),
    ("h", &[1, 2]),
    ("hpp", &[1, 2]),
    ("java", &[1]),
    ("rs", &[1]),
    ("swift", &[1]),
    ("svelte", &[1, 2, 3]),
    ("css", &[2]),
    ("html", &[3]),
    ("md", &[3]),
    ("markdown", &[3]),
    ("bas", &[4]),
];

/// @ai:intent A directive template split around its placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub source: String,
    pub prefix: String,
    pub suffix: String,
}

impl Template {
    /// @ai:intent Parse a template string such as "#LINT.?"
    /// @ai:pre template contains a '?' placeholder
    /// @ai:example ("<!--LINT.? -->") -> prefix "<!--LINT.", suffix " -->"
    /// @ai:effects pure
    pub fn parse(template: &str) -> Result<Self> {
        let (prefix, suffix) =
            template
                .split_once(PLACEHOLDER)
                .ok_or_else(|| Error::MissingPlaceholder {
                    template: template.to_string(),
                })?;

        Ok(Self {
            source: template.to_string(),
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// @ai:intent Return the directive text between prefix and suffix, if the line matches
    /// @ai:effects pure
    pub fn strip<'a>(&self, line: &'a str) -> Option<&'a str> {
        line.strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.suffix.as_str())
    }
}

/// @ai:intent Ordered template list plus the extension map that indexes into it
#[derive(Debug, Clone)]
pub struct TemplateTable {
    templates: Vec<Template>,
    extensions: BTreeMap<String, Vec<usize>>,
    default_template: Option<usize>,
}

impl Default for TemplateTable {
    fn default() -> Self {
        let templates = DEFAULT_TEMPLATES
            .into_iter()
            .map(|t| {
                let (prefix, suffix) = t.split_once(PLACEHOLDER).unwrap_or((t, ""));
                Template {
                    source: t.to_string(),
                    prefix: prefix.to_string(),
                    suffix: suffix.to_string(),
                }
            })
            .collect();

        let extensions = DEFAULT_EXTENSIONS
            .iter()
            .map(|(ext, indices)| (ext.to_string(), indices.to_vec()))
            .collect();

        Self {
            templates,
            extensions,
            default_template: None,
        }
    }
}

impl TemplateTable {
    /// @ai:intent Create a table with no templates at all
    pub fn empty() -> Self {
        Self {
            templates: Vec::new(),
            extensions: BTreeMap::new(),
            default_template: None,
        }
    }

    /// @ai:intent Register a template for an extension, keeping any existing templates
    /// @ai:pre template contains a '?' placeholder
    /// @ai:post template appears once in the global list and once in the extension's list
    /// @ai:effects pure
    pub fn with(mut self, extension: &str, template: &str) -> Result<Self> {
        let index = self.intern(template)?;
        let extension = extension.trim_start_matches('.').to_string();
        let indices = self.extensions.entry(extension).or_default();
        if !indices.contains(&index) {
            indices.push(index);
        }
        Ok(self)
    }

    /// @ai:intent Configure the template used for unmapped extensions
    /// @ai:effects pure
    pub fn with_default(mut self, template: &str) -> Result<Self> {
        let index = self.intern(template)?;
        self.default_template = Some(index);
        Ok(self)
    }

    fn intern(&mut self, template: &str) -> Result<usize> {
        if let Some(index) = self.templates.iter().position(|t| t.source == template) {
            return Ok(index);
        }
        self.templates.push(Template::parse(template)?);
        Ok(self.templates.len() - 1)
    }

    /// @ai:intent All registered templates in declaration order
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// @ai:intent Templates registered for one extension, without the default fallback
    pub fn templates_for_extension(&self, extension: &str) -> Vec<&Template> {
        self.extensions
            .get(extension)
            .map(|indices| indices.iter().filter_map(|i| self.templates.get(*i)).collect())
            .unwrap_or_default()
    }

    /// @ai:intent Resolve the ordered templates that apply to a file
    /// @ai:pre path names a file, not a directory
    /// @ai:post result is non-empty on success
    /// @ai:example ("main.py") -> ["#LINT.?"]
    /// @ai:example ("notes.txt") -> Err(NoTemplateForFile) without a default
    /// @ai:example ("Makefile") -> Err(NoTemplateForFile) even with a default
    /// @ai:effects pure
    pub fn templates_for(&self, path: &str) -> Result<Vec<&Template>> {
        let Some(extension) = Path::new(path).extension().and_then(|e| e.to_str()) else {
            return Err(Error::NoTemplateForFile {
                path: path.to_string(),
                extension: None,
            });
        };

        let mut found = self.templates_for_extension(extension);

        if found.is_empty() {
            if let Some(default) = self.default_template.and_then(|i| self.templates.get(i)) {
                found.push(default);
            }
        }

        if found.is_empty() {
            return Err(Error::NoTemplateForFile {
                path: path.to_string(),
                extension: Some(extension.to_string()),
            });
        }

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(templates: &[&Template]) -> Vec<String> {
        templates.iter().map(|t| t.source.clone()).collect()
    }

    #[test]
    fn test_default_python() {
        let table = TemplateTable::default();
        let found = table.templates_for("src/main.py").unwrap();
        assert_eq!(sources(&found), vec!["#LINT.?"]);
    }

    #[test]
    fn test_default_typescript_order() {
        let table = TemplateTable::default();
        let found = table.templates_for("web/app.ts").unwrap();
        assert_eq!(sources(&found), vec!["//LINT.?", "/*LINT.?"]);
    }

    #[test]
    fn test_unmapped_extension_without_default() {
        let table = TemplateTable::default();
        let err = table.templates_for("notes.txt").unwrap_err();
        assert!(matches!(err, Error::NoTemplateForFile { .. }));
    }

    #[test]
    fn test_no_extension_without_default() {
        let table = TemplateTable::default();
        let err = table.templates_for("Makefile").unwrap_err();
        assert!(matches!(
            err,
            Error::NoTemplateForFile { extension: None, .. }
        ));
    }

    #[test]
    fn test_default_template_fallback() {
        let table = TemplateTable::default().with_default("#LINT.?").unwrap();
        let found = table.templates_for("notes.txt").unwrap();
        assert_eq!(sources(&found), vec!["#LINT.?"]);
        assert_eq!(table.templates().len(), DEFAULT_TEMPLATES.len());

        let err = table.templates_for("Makefile").unwrap_err();
        assert!(matches!(
            err,
            Error::NoTemplateForFile { extension: None, .. }
        ));
    }

    #[test]
    fn test_with_keeps_defaults_and_dedupes() {
        let table = TemplateTable::default()
            .with("py", "\"\"\"LINT.?\"\"\"")
            .unwrap()
            .with("py", "#LINT.?")
            .unwrap()
            .with(".py", "\"\"\"LINT.?\"\"\"")
            .unwrap();

        let found = table.templates_for("a.py").unwrap();
        assert_eq!(sources(&found), vec!["#LINT.?", "\"\"\"LINT.?\"\"\""]);
        assert_eq!(table.templates().len(), DEFAULT_TEMPLATES.len() + 1);
    }

    #[test]
    fn test_with_new_extension() {
        let table = TemplateTable::default().with("toml", "#LINT.?").unwrap();
        let found = table.templates_for("Cargo.toml").unwrap();
        assert_eq!(sources(&found), vec!["#LINT.?"]);
    }

    #[test]
    fn test_template_missing_placeholder() {
        let err = TemplateTable::default().with("txt", "LINT:").unwrap_err();
        assert!(matches!(err, Error::MissingPlaceholder { .. }));
    }

    #[test]
    fn test_strip() {
        let template = Template::parse("<!-- LINT.? -->").unwrap();
        assert_eq!(template.strip("<!-- LINT.END foo -->"), Some("END foo"));
        assert_eq!(template.strip("<!-- LINT.END foo"), None);
    }
}
