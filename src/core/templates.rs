use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::models::{TagKey, Template};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template file {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("template name must not be empty")]
    EmptyName,

    #[error("template '{0}' has no tags")]
    NoTags(String),

    #[error("template not found: {0}")]
    NotFound(String),

    #[error("template store io error: {0}")]
    Io(#[from] io::Error),

    #[error("template serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TemplateError>;

type StoredTemplates = BTreeMap<String, BTreeMap<TagKey, String>>;

/// Named templates kept in one JSON file, `{ name: { key: value } }`.
///
/// The file is read wholesale on open and rewritten wholesale on every
/// save or delete.
#[derive(Clone, Debug)]
pub struct TemplateStore {
    path: PathBuf,
    templates: StoredTemplates,
}

impl TemplateStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let templates = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents).map_err(|source| TemplateError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            StoredTemplates::new()
        };

        Ok(Self { path, templates })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<Template> {
        self.templates
            .get(name)
            .map(|tags| Template::new(name, tags.clone()))
    }

    pub fn require(&self, name: &str) -> Result<Template> {
        self.get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    /// Stores `template`, replacing any template with the same (trimmed) name.
    pub fn save(&mut self, template: Template) -> Result<()> {
        let name = template.name.trim().to_string();
        if name.is_empty() {
            return Err(TemplateError::EmptyName);
        }
        if template.tags.is_empty() {
            return Err(TemplateError::NoTags(name));
        }

        self.templates.insert(name.clone(), template.tags);
        self.persist()?;
        info!(template = %name, "template saved");
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> Result<bool> {
        if self.templates.remove(name).is_none() {
            return Ok(false);
        }

        self.persist()?;
        info!(template = %name, "template deleted");
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let encoded = serde_json::to_string_pretty(&self.templates)?;
        fs::write(&self.path, encoded)?;
        Ok(())
    }
}
