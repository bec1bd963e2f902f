/////////
/// Settings handed from one wizard step to the next
////////
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_DATA_DIR: &str = "/usr/share/nebula/data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionMode {
    Automatic,
    Alongside,
    Advanced,
}

impl PartitionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PartitionMode::Automatic => "automatic",
            PartitionMode::Alongside => "alongside",
            PartitionMode::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallSettings {
    // Installer data directory (images, translations)
    pub data: PathBuf,
    pub enable_alongside: bool,
    pub use_lvm: bool,
    pub use_luks: bool,
    pub use_luks_in_root: bool,
    pub luks_root_volume: String,
    pub use_home: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_mode: Option<PartitionMode>,
    // Keys owned by other steps, passed through untouched
    #[serde(flatten)]
    pub other: BTreeMap<String, toml::Value>,
}

impl Default for InstallSettings {
    fn default() -> Self {
        Self {
            data: PathBuf::from(DEFAULT_DATA_DIR),
            enable_alongside: false,
            use_lvm: false,
            use_luks: false,
            use_luks_in_root: false,
            luks_root_volume: String::new(),
            use_home: false,
            partition_mode: None,
            other: BTreeMap::new(),
        }
    }
}

impl InstallSettings {
    // A missing file means this is the first step to run
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read settings {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parse settings {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = toml::to_string_pretty(self).context("serialize settings")?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
        }
        fs::write(path, raw).with_context(|| format!("write settings {}", path.display()))
    }
}

// Result of the installation type step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskUpdate {
    pub enable_alongside: bool,
    pub use_lvm: bool,
    pub use_luks: bool,
    pub use_luks_in_root: bool,
    pub luks_root_volume: String,
    pub use_home: bool,
    pub partition_mode: PartitionMode,
}

impl AskUpdate {
    pub fn apply(&self, settings: &InstallSettings) -> InstallSettings {
        InstallSettings {
            enable_alongside: self.enable_alongside,
            use_lvm: self.use_lvm,
            use_luks: self.use_luks,
            use_luks_in_root: self.use_luks_in_root,
            luks_root_volume: self.luks_root_volume.clone(),
            use_home: self.use_home,
            partition_mode: Some(self.partition_mode),
            ..settings.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update() -> AskUpdate {
        AskUpdate {
            enable_alongside: true,
            use_lvm: true,
            use_luks: false,
            use_luks_in_root: true,
            luks_root_volume: "cryptNebula".to_string(),
            use_home: true,
            partition_mode: PartitionMode::Automatic,
        }
    }

    #[test]
    fn apply_returns_new_settings() {
        let before = InstallSettings::default();
        let after = update().apply(&before);
        assert_eq!(before, InstallSettings::default());
        assert!(after.use_lvm);
        assert!(after.use_home);
        assert!(!after.use_luks);
        assert_eq!(after.partition_mode, Some(PartitionMode::Automatic));
        assert_eq!(after.data, before.data);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = InstallSettings::load(&dir.path().join("settings.toml")).expect("load");
        assert_eq!(settings, InstallSettings::default());
    }

    #[test]
    fn keys_from_other_steps_survive_a_save() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "data = \"/opt/nebula/data\"\nhostname = \"nebula-box\"\nuse_lvm = false\n",
        )
        .expect("write");

        let loaded = InstallSettings::load(&path).expect("load");
        assert_eq!(loaded.data, PathBuf::from("/opt/nebula/data"));
        update().apply(&loaded).save(&path).expect("save");

        let raw = fs::read_to_string(&path).expect("read back");
        assert!(raw.contains("partition_mode = \"automatic\""));
        let reloaded = InstallSettings::load(&path).expect("reload");
        assert_eq!(
            reloaded.other.get("hostname"),
            Some(&toml::Value::String("nebula-box".to_string()))
        );
        assert!(reloaded.use_lvm);
        assert_eq!(reloaded.luks_root_volume, "cryptNebula");
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.toml");
        fs::write(&path, "use_lvm = \"maybe\"\n").expect("write");
        assert!(InstallSettings::load(&path).is_err());
    }
}
