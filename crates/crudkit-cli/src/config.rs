// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use crudkit_app::{Catalog, PermissionTree};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "crudkit";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_LOG_FILTER: &str = "crudkit=info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub permissions: PermissionTree,
    #[serde(default)]
    pub strings: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            ui: Ui::default(),
            data: Data::default(),
            log: Log::default(),
            permissions: PermissionTree::default(),
            strings: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Data {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub filter: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("CRUDKIT_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set CRUDKIT_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version; add `version = 1` at the top",
                    path.display()
                )
            })?;
        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(page_size) = self.ui.page_size
            && page_size <= 0
        {
            bail!(
                "ui.page_size in {} must be positive, got {}",
                path.display(),
                page_size
            );
        }

        if let Some(data_path) = &self.data.path
            && data_path.trim().is_empty()
        {
            bail!(
                "data.path in {} is empty -- remove it to use demo data",
                path.display()
            );
        }
        Ok(())
    }

    pub fn page_size(&self) -> usize {
        self.ui
            .page_size
            .and_then(|size| usize::try_from(size).ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn data_path(&self) -> Option<PathBuf> {
        self.data.path.as_ref().map(PathBuf::from)
    }

    /// `CRUDKIT_LOG` wins over the configured filter.
    pub fn log_filter(&self) -> String {
        env::var("CRUDKIT_LOG")
            .ok()
            .filter(|filter| !filter.trim().is_empty())
            .or_else(|| self.log.filter.clone())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned())
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.strings.clone())
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# crudkit config\n# Place this file at: {}\n\nversion = 1\n\n[ui]\npage_size = {}\n\n[data]\n# Optional. JSON array of entities; demo jails are generated when unset.\n# path = \"/absolute/path/to/jails.json\"\n\n[log]\nfilter = \"{}\"\n\n# Nested allow tree keyed by entity type segments then action.\n# A \"*\" key grants everything below its node.\n[permissions]\n\"*\" = true\n# [permissions.jail.jail]\n# list = true\n# create = false\n\n[strings]\n# NoResults = \"no jails yet\"\n",
            path.display(),
            DEFAULT_PAGE_SIZE,
            DEFAULT_LOG_FILTER,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use anyhow::Result;
    use crudkit_app::{PermissionCheck, Translate};
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn segments(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.page_size(), 20);
        assert!(config.data_path().is_none());
        assert!(config.permissions.check(&segments(&["jail", "jail", "delete"])));
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[ui]\npage_size = 5\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        assert!(error.to_string().contains("add `version = 1`"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn full_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[ui]\npage_size = 5\n[data]\npath = \"/srv/jails.json\"\n[log]\nfilter = \"crudkit=debug\"\n[permissions.jail.jail]\nlist = true\ndelete = false\n[strings]\nNoResults = \"no jails yet\"\n",
        )?;
        let config = Config::load(&path)?;
        assert_eq!(config.page_size(), 5);
        assert_eq!(config.data_path(), Some(PathBuf::from("/srv/jails.json")));
        assert!(config.permissions.check(&segments(&["jail", "jail", "list"])));
        assert!(!config.permissions.check(&segments(&["jail", "jail", "delete"])));
        assert!(!config.permissions.check(&segments(&["jail", "jail", "create"])));
        assert_eq!(config.catalog().translate("NoResults"), "no jails yet");
        assert_eq!(config.catalog().translate("Create"), "Create");
        Ok(())
    }

    #[test]
    fn wildcard_permission_grants_subtree() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[permissions]\njail = { jail = { \"*\" = true } }\n")?;
        let config = Config::load(&path)?;
        assert!(config.permissions.check(&segments(&["jail", "jail", "change"])));
        assert!(!config.permissions.check(&segments(&["prison", "cell", "list"])));
        Ok(())
    }

    #[test]
    fn page_size_must_be_positive() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\npage_size = 0\n")?;
        let error = Config::load(&path).expect_err("zero page size should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn empty_data_path_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[data]\npath = \" \"\n")?;
        let error = Config::load(&path).expect_err("blank data path should fail");
        assert!(error.to_string().contains("data.path"));
        Ok(())
    }

    #[test]
    fn log_filter_prefers_env_then_config() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n[log]\nfilter = \"crudkit=debug\"\n")?;
        let config = Config::load(&path)?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("CRUDKIT_LOG");
        }
        assert_eq!(config.log_filter(), "crudkit=debug");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("CRUDKIT_LOG", "crudkit=trace");
        }
        let resolved = config.log_filter();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("CRUDKIT_LOG");
        }
        assert_eq!(resolved, "crudkit=trace");
        assert_eq!(Config::default().log_filter(), "crudkit=info");
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("CRUDKIT_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("CRUDKIT_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn example_config_loads_cleanly() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, Config::example_config(&path))?;
        let config = Config::load(&path)?;
        assert_eq!(config.page_size(), 20);
        assert!(config.permissions.check(&["jail".to_owned()]));
        Ok(())
    }
}
