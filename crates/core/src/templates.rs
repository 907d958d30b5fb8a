//! Letter templates stored as YAML files.
//!
//! Each `*.yaml` / `*.yml` file in the template directory holds one template:
//!
//! ```yaml
//! name: Status update
//! category: client
//! description: Monthly progress letter to the client contact.
//! body: |
//!   Dear {{Contact.name}},
//!   ...
//! ```

use crate::{LetterError, LetterResult};
use casedesk_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterTemplate {
    pub name: NonEmptyText,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub body: String,
}

/// Templates indexed by name.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: BTreeMap<String, LetterTemplate>,
}

impl TemplateLibrary {
    /// Loads every template file in `dir`.
    ///
    /// A missing directory yields an empty library. Files that cannot be read or parsed are
    /// logged and skipped.
    ///
    /// # Errors
    ///
    /// - `LetterError::DirRead` if the directory exists but cannot be listed.
    /// - `LetterError::DuplicateTemplate` if two files declare the same name.
    pub fn load(dir: &Path) -> LetterResult<Self> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("template directory {} not found", dir.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(LetterError::DirRead(e)),
        };

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|ext| ext.to_str()),
                        Some("yaml" | "yml")
                    )
            })
            .collect();
        paths.sort();

        let mut library = Self::default();
        for path in paths {
            let template = match read_template(&path) {
                Ok(template) => template,
                Err(e) => {
                    tracing::warn!("skipping letter template: {}", e);
                    continue;
                }
            };
            library.insert(template)?;
        }

        tracing::info!(
            "loaded {} letter template(s) from {}",
            library.len(),
            dir.display()
        );
        Ok(library)
    }

    /// Adds a template.
    ///
    /// # Errors
    ///
    /// Returns `LetterError::DuplicateTemplate` if the name is already taken.
    pub fn insert(&mut self, template: LetterTemplate) -> LetterResult<()> {
        let name = template.name.as_str().to_owned();
        if self.templates.contains_key(&name) {
            return Err(LetterError::DuplicateTemplate(name));
        }
        self.templates.insert(name, template);
        Ok(())
    }

    /// Looks up a template by exact name.
    ///
    /// # Errors
    ///
    /// Returns `LetterError::TemplateNotFound` if no template has that name.
    pub fn get(&self, name: &str) -> LetterResult<&LetterTemplate> {
        self.templates
            .get(name)
            .ok_or_else(|| LetterError::TemplateNotFound(name.to_owned()))
    }

    /// All templates, sorted by name.
    pub fn list(&self) -> Vec<&LetterTemplate> {
        self.templates.values().collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn read_template(path: &Path) -> LetterResult<LetterTemplate> {
    let contents = fs::read_to_string(path).map_err(LetterError::FileRead)?;
    serde_yaml::from_str(&contents).map_err(|source| LetterError::YamlDeserialization {
        path: path.to_path_buf(),
        source,
    })
}
