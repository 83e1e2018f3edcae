//! Template stores for persisting and reusing confirmed mappings.
//!
//! Stores are explicit values handed to whoever needs them; nothing here is
//! global. Two implementations are provided:
//!
//! - [`FileTemplateStore`]: one pretty-printed JSON file per template,
//!   named `{id}.json`
//! - [`InMemoryTemplateStore`]: a lock-protected map, for tests and embedding

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{Context, Result, anyhow};
use fireems_model::{FieldMapping, MappingTemplate};
use tracing::{debug, warn};

/// Storage for named mapping templates.
pub trait TemplateStore {
    /// Saves a template, replacing any template with the same id.
    fn save(&self, template: &MappingTemplate) -> Result<()>;

    /// Loads a template by id; `None` if it does not exist.
    fn load(&self, id: &str) -> Result<Option<MappingTemplate>>;

    /// All templates, ordered by name then id.
    fn list(&self) -> Result<Vec<MappingTemplate>>;

    /// Deletes a template; returns whether it existed.
    fn delete(&self, id: &str) -> Result<bool>;

    /// Templates saved for one target tool.
    fn list_for_tool(&self, tool_id: &str) -> Result<Vec<MappingTemplate>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|template| template.target_tool_id == tool_id)
            .collect())
    }
}

fn sort_templates(templates: &mut [MappingTemplate]) {
    templates.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

/// Directory-backed template store.
#[derive(Debug, Clone)]
pub struct FileTemplateStore {
    base_dir: PathBuf,
}

impl FileTemplateStore {
    /// Opens a store rooted at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).with_context(|| {
            format!("Failed to create template directory: {}", base_dir.display())
        })?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the file holding a template.
    pub fn template_path(&self, id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", file_stem(id)))
    }
}

/// Keeps ids usable as file names.
fn file_stem(id: &str) -> String {
    id.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

impl TemplateStore for FileTemplateStore {
    fn save(&self, template: &MappingTemplate) -> Result<()> {
        let path = self.template_path(&template.id);
        let json = serde_json::to_string_pretty(template)
            .with_context(|| format!("Failed to serialize template {}", template.id))?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write template to {}", path.display()))?;
        debug!(id = %template.id, path = %path.display(), "saved template");
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<MappingTemplate>> {
        let path = self.template_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read template from {}", path.display()))?;
        let template: MappingTemplate = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse template from {}", path.display()))?;
        // Distinct ids can share a file name once sanitized.
        if template.id != id {
            debug!(
                id,
                stored = %template.id,
                path = %path.display(),
                "template file holds another id"
            );
            return Ok(None);
        }
        Ok(Some(template))
    }

    fn list(&self) -> Result<Vec<MappingTemplate>> {
        let mut templates = Vec::new();
        for entry in fs::read_dir(&self.base_dir).with_context(|| {
            format!("Failed to read template directory: {}", self.base_dir.display())
        })? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template from {}", path.display()))?;
            match serde_json::from_str::<MappingTemplate>(&contents) {
                Ok(template) => templates.push(template),
                Err(error) => warn!(path = %path.display(), %error, "skipping unreadable template"),
            }
        }
        sort_templates(&mut templates);
        Ok(templates)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        if self.load(id)?.is_none() {
            return Ok(false);
        }
        let path = self.template_path(id);
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete template: {}", path.display()))?;
        Ok(true)
    }
}

/// Template store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    templates: RwLock<BTreeMap<String, MappingTemplate>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn save(&self, template: &MappingTemplate) -> Result<()> {
        let mut templates = self
            .templates
            .write()
            .map_err(|_| anyhow!("template store lock poisoned"))?;
        templates.insert(template.id.clone(), template.clone());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<MappingTemplate>> {
        let templates = self
            .templates
            .read()
            .map_err(|_| anyhow!("template store lock poisoned"))?;
        Ok(templates.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<MappingTemplate>> {
        let templates = self
            .templates
            .read()
            .map_err(|_| anyhow!("template store lock poisoned"))?;
        let mut all: Vec<MappingTemplate> = templates.values().cloned().collect();
        sort_templates(&mut all);
        Ok(all)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut templates = self
            .templates
            .write()
            .map_err(|_| anyhow!("template store lock poisoned"))?;
        Ok(templates.remove(id).is_some())
    }
}

/// Serializes a mapping list as pretty JSON.
pub fn serialize_mappings(mappings: &[FieldMapping]) -> Result<String> {
    serde_json::to_string_pretty(mappings).context("Failed to serialize mappings")
}

/// Parses a mapping list written by [`serialize_mappings`].
pub fn deserialize_mappings(json: &str) -> Result<Vec<FieldMapping>> {
    serde_json::from_str(json).context("Failed to parse mappings")
}
