//! Plugin loader - discovers manifest plugins in a directory

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::exec::ExecPlugin;
use super::manifest::PluginManifest;
use crate::application::errors::PluginError;
use crate::plugins::Plugin;

/// Plugin loader
pub struct PluginLoader {
    plugin_dir: PathBuf,
}

impl PluginLoader {
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
        }
    }

    /// Load a single manifest file
    pub fn load_manifest(&self, path: impl AsRef<Path>) -> Result<PluginManifest, PluginError> {
        let manifest = PluginManifest::from_file(path.as_ref())?;
        tracing::info!("Loaded plugin manifest: {} v{}", manifest.name, manifest.version);
        Ok(manifest)
    }

    /// Load every enabled manifest, ordered by priority then file name
    pub fn load_all(&self) -> Result<Vec<Arc<dyn Plugin>>, PluginError> {
        let mut manifests: Vec<(u32, String, PluginManifest)> = Vec::new();

        if !self.plugin_dir.exists() {
            tracing::debug!("Plugin directory does not exist: {}", self.plugin_dir.display());
            return Ok(Vec::new());
        }

        for entry in std::fs::read_dir(&self.plugin_dir)
            .map_err(|e| PluginError::Load(format!("Failed to read plugin directory: {}", e)))?
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() || !is_manifest(&path) {
                continue;
            }

            let Some(file_name) = path.file_name().and_then(|n| n.to_str()).map(|s| s.to_string()) else {
                continue;
            };
            // Skip hidden files
            if file_name.starts_with('.') {
                continue;
            }

            match self.load_manifest(&path) {
                Ok(manifest) if manifest.enabled => manifests.push((manifest.priority, file_name, manifest)),
                Ok(manifest) => tracing::info!("Plugin '{}' is disabled", manifest.name),
                Err(e) => tracing::warn!("Failed to load plugin from {}: {}", path.display(), e),
            }
        }

        manifests.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));

        Ok(manifests
            .into_iter()
            .map(|(_, _, manifest)| Arc::new(ExecPlugin::new(manifest)) as Arc<dyn Plugin>)
            .collect())
    }
}

fn is_manifest(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml") | Some("yml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, file: &str, name: &str, priority: u32) {
        let yaml = format!(
            "name: {}\npriority: {}\ntrigger: '{} '\nexec:\n  command: echo\n",
            name, priority, name
        );
        std::fs::write(dir.join(file), yaml).unwrap();
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let loader = PluginLoader::new("/nonexistent/plugins/dir");
        assert!(loader.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_order_priority_then_file_name() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.yaml", "beta", 10);
        write(dir.path(), "a.yml", "alpha", 10);
        write(dir.path(), "c.yaml", "gamma", 1);
        write(dir.path(), ".hidden.yaml", "hidden", 0);
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(dir.path().join("broken.yaml"), "name: [").unwrap();
        std::fs::write(
            dir.path().join("off.yaml"),
            "name: off\nenabled: false\ntrigger: 'off'\nexec:\n  command: echo\n",
        ).unwrap();

        let names: Vec<String> = PluginLoader::new(dir.path())
            .load_all()
            .unwrap()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["gamma", "alpha", "beta"]);
    }
}
