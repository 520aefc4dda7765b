//! Filesystem-backed [`ConfigStore`]: one `<name>.json` file per record.

use std::path::{Path, PathBuf};

use crate::error::CliError;
use crate::models::NamedConfig;

use super::{decode, encode, validate_name, ConfigStore};

pub struct FsConfigStore {
    dir: PathBuf,
}

impl FsConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl ConfigStore for FsConfigStore {
    fn save(&self, name: &str, config: &NamedConfig) -> Result<(), CliError> {
        validate_name(name)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| CliError::Storage {
            context: "failed to create config directory",
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(name);
        let data = encode(config)?;
        std::fs::write(&path, data).map_err(|source| CliError::Storage {
            context: "failed to write config file",
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "saved configuration");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<NamedConfig, CliError> {
        validate_name(name)?;
        let path = self.path_for(name);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CliError::ConfigNotFound(name.to_string()))
            }
            Err(source) => {
                return Err(CliError::Storage {
                    context: "failed to read config file",
                    path,
                    source,
                })
            }
        };

        tracing::debug!(path = %path.display(), "loaded configuration");
        decode(name, &raw)
    }

    fn list(&self) -> Result<Vec<String>, CliError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(CliError::Storage {
                    context: "failed to read config directory",
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CliError::Storage {
                context: "failed to read config directory",
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store_in(tmp: &tempfile::TempDir) -> FsConfigStore {
        FsConfigStore::new(tmp.path().join("configs"))
    }

    #[test]
    fn save_creates_directory_and_pretty_json() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);
        let cfg = NamedConfig {
            db: "d".into(),
            coll: "c".into(),
            ..Default::default()
        };
        store.save("demo", &cfg).unwrap();

        let written = fs::read_to_string(store.dir().join("demo.json")).unwrap();
        assert_eq!(written, "{\n  \"db\": \"d\",\n  \"coll\": \"c\"\n}");
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);
        let cfg = NamedConfig {
            connection_string: "mongodb://localhost:27017".into(),
            db: "sample_mflix".into(),
            coll: "movies".into(),
            index: "idx".into(),
            field: vec!["title".into(), "fullplot".into()],
            project_field: vec!["title".into(), "year".into()],
            voyage_api_key: "pa-abc".into(),
            voyage_model: "voyage-3.5".into(),
        };
        store.save("full", &cfg).unwrap();
        assert_eq!(store.load("full").unwrap(), cfg);
    }

    #[test]
    fn load_missing_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);
        let err = store.load("ghost").unwrap_err();
        assert_eq!(err.to_string(), "configuration 'ghost' not found");
    }

    #[test]
    fn load_malformed_is_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.dir().join("bad.json"), "[1, 2").unwrap();
        assert!(matches!(store.load("bad"), Err(CliError::ConfigParse { .. })));
    }

    #[test]
    fn list_missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn list_only_json_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);
        store.save("beta", &NamedConfig::default()).unwrap();
        store.save("alpha", &NamedConfig::default()).unwrap();
        fs::write(store.dir().join("notes.txt"), "x").unwrap();
        fs::create_dir_all(store.dir().join("nested.json")).unwrap();

        assert_eq!(store.list().unwrap(), vec!["alpha", "beta"]);
    }

    #[test]
    fn rejects_path_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);
        let err = store.save("../escape", &NamedConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
        assert!(!tmp.path().join("escape.json").exists());
    }
}
