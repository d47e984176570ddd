//! Persistent application settings.
//!
//! Settings live in one JSON file addressed by dot paths
//! (`"general.default_rate"`). Loading merges defaults under whatever the
//! file already holds, so new keys appear after upgrades without touching
//! user values; saving goes through a temp file and an atomic rename so a
//! crash mid-write never leaves a truncated file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::NamedTempFile;

use crate::error::{InvoiceError, Result};

/// Bumped when a migration is added in [`Settings::migrate`].
pub const SCHEMA_VERSION: i64 = 1;

/// Factory defaults. The bottom page margin is deliberately absent: it is
/// enforced in code, not configurable.
pub fn defaults() -> Value {
    json!({
        "version": SCHEMA_VERSION,
        "general": {
            "default_rate": 250.0,
            "default_export_dir": default_export_dir().to_string_lossy(),
        },
        "invoice": {
            "require_explicit_zero_hours": true,
        },
        "pdf": {
            "file_naming_template": "{client}_invoice[{date}].pdf",
            "thousand_separators": true,
        },
        "letterhead": {
            "top_margin_in": 2.5,
        },
        "ui": {
            "discard_warning": true,
        },
    })
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

/// Default export location: an invoices subfolder of the user's Documents
/// directory, or a relative `exports` directory when no home directory
/// can be resolved.
pub fn default_export_dir() -> PathBuf {
    match home_dir() {
        Some(home) => home.join("Documents").join("Invoices").join("exports"),
        None => PathBuf::from("exports"),
    }
}

/// The settings store: a JSON tree plus the file it persists to.
#[derive(Debug)]
pub struct Settings {
    path: PathBuf,
    data: Value,
}

impl Settings {
    /// Load settings from `path`, creating the file with defaults if it
    /// does not exist. A file that fails to parse falls back to defaults
    /// in memory without clobbering the file on disk.
    pub fn load<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            let settings = Settings {
                path,
                data: defaults(),
            };
            settings.save()?;
            return Ok(settings);
        }

        let data = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value) if value.is_object() => Self::migrate(value),
                Ok(_) | Err(_) => {
                    log::warn!("settings file {} unreadable, using defaults", path.display());
                    defaults()
                }
            },
            Err(err) => {
                log::warn!(
                    "settings file {} unreadable ({err}), using defaults",
                    path.display()
                );
                defaults()
            }
        };
        Ok(Settings { path, data })
    }

    /// In-memory store with factory defaults, not backed by a file until
    /// the first `save`.
    pub fn in_memory<P: Into<PathBuf>>(path: P) -> Self {
        Settings {
            path: path.into(),
            data: defaults(),
        }
    }

    /// Fill in missing keys from the defaults and stamp the current
    /// schema version. Existing values always win over defaults.
    fn migrate(mut data: Value) -> Value {
        deep_merge(&mut data, &defaults());
        data["version"] = json!(SCHEMA_VERSION);
        data
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a value by dot path; `None` when any segment is missing.
    pub fn get(&self, dot_path: &str) -> Option<&Value> {
        let mut node = &self.data;
        for part in dot_path.split('.') {
            node = node.as_object()?.get(part)?;
        }
        Some(node)
    }

    pub fn get_f64(&self, dot_path: &str, default: f64) -> f64 {
        self.get(dot_path).and_then(Value::as_f64).unwrap_or(default)
    }

    pub fn get_bool(&self, dot_path: &str, default: bool) -> bool {
        self.get(dot_path).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn get_str(&self, dot_path: &str, default: &str) -> String {
        self.get(dot_path)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    /// Write a value by dot path, creating intermediate objects as needed,
    /// and persist immediately. Fails if an intermediate segment exists
    /// but is not an object.
    pub fn set(&mut self, dot_path: &str, value: Value) -> Result<()> {
        let parts: Vec<&str> = dot_path.split('.').collect();
        let mut node = &mut self.data;
        for key in &parts[..parts.len() - 1] {
            let map = node
                .as_object_mut()
                .ok_or_else(|| InvoiceError::SettingsPath {
                    path: dot_path.to_string(),
                    key: key.to_string(),
                })?;
            node = map.entry(key.to_string()).or_insert_with(|| json!({}));
        }
        let last = parts[parts.len() - 1];
        let map = node
            .as_object_mut()
            .ok_or_else(|| InvoiceError::SettingsPath {
                path: dot_path.to_string(),
                key: last.to_string(),
            })?;
        map.insert(last.to_string(), value);
        self.save()
    }

    /// The configured export directory, created on demand. An unset or
    /// empty value falls back to [`default_export_dir`].
    pub fn export_dir(&self, create: bool) -> Result<PathBuf> {
        let configured = self.get_str("general.default_export_dir", "");
        let dir = if configured.is_empty() {
            default_export_dir()
        } else {
            PathBuf::from(configured)
        };
        if create {
            fs::create_dir_all(&dir)?;
        }
        Ok(dir)
    }

    /// Persist the tree: serialize to a temp file in the target directory,
    /// then rename over the destination.
    pub fn save(&self) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &self.data)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        log::debug!("settings saved to {}", self.path.display());
        Ok(())
    }
}

/// Merge missing keys from `src` into `dst`; `dst` wins where keys exist.
fn deep_merge(dst: &mut Value, src: &Value) {
    let (Some(dst_map), Some(src_map)) = (dst.as_object_mut(), src.as_object()) else {
        return;
    };
    for (key, src_val) in src_map {
        match dst_map.get_mut(key) {
            Some(dst_val) if dst_val.is_object() && src_val.is_object() => {
                deep_merge(dst_val, src_val);
            }
            Some(_) => {}
            None => {
                dst_map.insert(key.clone(), src_val.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_expose_expected_keys() {
        let settings = Settings::in_memory("unused.json");
        assert!((settings.get_f64("general.default_rate", 0.0) - 250.0).abs() < 1e-9);
        assert!((settings.get_f64("letterhead.top_margin_in", 0.0) - 2.5).abs() < 1e-9);
        assert!(settings.get_bool("pdf.thousand_separators", false));
        assert_eq!(
            settings.get_str("pdf.file_naming_template", ""),
            "{client}_invoice[{date}].pdf"
        );
    }

    #[test]
    fn missing_path_yields_fallback() {
        let settings = Settings::in_memory("unused.json");
        assert!(settings.get("no.such.key").is_none());
        assert!((settings.get_f64("no.such.key", 7.5) - 7.5).abs() < 1e-9);
    }

    #[test]
    fn load_creates_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings::load(&path).unwrap();
        assert!(path.exists());
        assert!((settings.get_f64("general.default_rate", 0.0) - 250.0).abs() < 1e-9);
    }

    #[test]
    fn set_persists_and_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings::load(&path).unwrap();
        settings.set("general.default_rate", json!(350.0)).unwrap();
        settings.set("letterhead.top_margin_in", json!(1.0)).unwrap();

        let reloaded = Settings::load(&path).unwrap();
        assert!((reloaded.get_f64("general.default_rate", 0.0) - 350.0).abs() < 1e-9);
        assert!((reloaded.get_f64("letterhead.top_margin_in", 0.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn merge_adds_new_default_keys_without_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"version": 1, "general": {"default_rate": 99.0}}"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert!((settings.get_f64("general.default_rate", 0.0) - 99.0).abs() < 1e-9);
        // Keys the old file never had are filled in from defaults.
        assert!(settings.get_bool("pdf.thousand_separators", false));
    }

    #[test]
    fn corrupt_file_falls_back_without_clobbering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json at all").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert!((settings.get_f64("general.default_rate", 0.0) - 250.0).abs() < 1e-9);
        // The bad file stays on disk for the user to inspect.
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json at all");
    }

    #[test]
    fn export_dir_defaults_to_documents_subfolder() {
        let settings = Settings::in_memory("unused.json");
        let dir = settings.export_dir(false).unwrap();
        match std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            Some(home) => assert_eq!(
                dir,
                PathBuf::from(home)
                    .join("Documents")
                    .join("Invoices")
                    .join("exports")
            ),
            // Relative fallback only when no home can be resolved.
            None => assert_eq!(dir, PathBuf::from("exports")),
        }
        // The same path is baked into the factory defaults.
        assert_eq!(
            settings.get_str("general.default_export_dir", ""),
            dir.to_string_lossy()
        );
    }

    #[test]
    fn export_dir_honors_configured_path_and_creates() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::in_memory(dir.path().join("settings.json"));

        // Blanking the value falls back to the default location.
        settings
            .set("general.default_export_dir", json!(""))
            .unwrap();
        assert_eq!(settings.export_dir(false).unwrap(), default_export_dir());

        let target = dir.path().join("out");
        settings
            .set(
                "general.default_export_dir",
                json!(target.to_string_lossy()),
            )
            .unwrap();
        let created = settings.export_dir(true).unwrap();
        assert_eq!(created, target);
        assert!(target.is_dir());
    }

    #[test]
    fn set_rejects_non_object_intermediate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings::load(&path).unwrap();
        settings.set("general.default_rate", json!(100.0)).unwrap();
        let err = settings.set("general.default_rate.nested", json!(1));
        assert!(matches!(err, Err(InvoiceError::SettingsPath { .. })));
    }
}
