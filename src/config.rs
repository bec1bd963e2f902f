use std::path::PathBuf;
use std::sync::OnceLock;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub branding: BrandingConfig,
    pub detection: DetectionConfig,
    pub text: TextConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrandingConfig {
    pub distro_name: String,
    pub luks_root_volume: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    // Only partitions of this disk are inspected
    pub primary_disk: String,
    pub efi_path: PathBuf,
    pub max_primary_partitions: usize,
    pub os_label_max_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextConfig {
    // Joins exactly two OS names
    #[serde(default = "default_conjunction")]
    pub conjunction: String,
}

fn default_conjunction() -> String {
    " and ".to_string()
}

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn config() -> &'static Config {
    CONFIG.get_or_init(|| {
        let raw = include_str!("../config.toml");
        let parsed: Config = toml::from_str(raw).expect("Invalid nebula-ask config.toml");
        validate_config(&parsed).expect("Invalid nebula-ask config.toml");
        parsed
    })
}

fn validate_config(cfg: &Config) -> Result<(), String> {
    if cfg.branding.distro_name.trim().is_empty() {
        return Err("branding.distro_name must not be empty".to_string());
    }
    if cfg.branding.luks_root_volume.trim().is_empty() {
        return Err("branding.luks_root_volume must not be empty".to_string());
    }
    if cfg
        .branding
        .luks_root_volume
        .chars()
        .any(|c| c.is_whitespace() || c == '/')
    {
        return Err("branding.luks_root_volume must be a plain mapper name".to_string());
    }
    if cfg.detection.primary_disk.trim().is_empty() {
        return Err("detection.primary_disk must not be empty".to_string());
    }
    if cfg.detection.primary_disk.starts_with("/dev/") {
        return Err("detection.primary_disk must be a kernel name, not a path".to_string());
    }
    if cfg.detection.efi_path.as_os_str().is_empty() {
        return Err("detection.efi_path must not be empty".to_string());
    }
    if cfg.detection.max_primary_partitions == 0 {
        return Err("detection.max_primary_partitions must be positive".to_string());
    }
    if cfg.detection.os_label_max_len == 0 {
        return Err("detection.os_label_max_len must be positive".to_string());
    }
    if cfg.text.conjunction.is_empty() {
        return Err("text.conjunction must not be empty".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Config {
        toml::from_str(raw).expect("parse config")
    }

    const VALID: &str = r#"
        [branding]
        distro_name = "Nebula"
        luks_root_volume = "cryptNebula"

        [detection]
        primary_disk = "sda"
        efi_path = "/sys/firmware/efi"
        max_primary_partitions = 4
        os_label_max_len = 40

        [text]
    "#;

    #[test]
    fn embedded_config_is_valid() {
        let cfg = config();
        assert_eq!(cfg.detection.primary_disk, "sda");
        assert_eq!(cfg.detection.max_primary_partitions, 4);
        assert_eq!(cfg.detection.os_label_max_len, 40);
    }

    #[test]
    fn conjunction_defaults_when_missing() {
        let cfg = parse(VALID);
        assert_eq!(cfg.text.conjunction, " and ");
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn rejects_device_path_as_primary_disk() {
        let mut cfg = parse(VALID);
        cfg.detection.primary_disk = "/dev/sda".to_string();
        let err = validate_config(&cfg).unwrap_err();
        assert!(err.contains("primary_disk"));
    }

    #[test]
    fn rejects_mapper_name_with_slash() {
        let mut cfg = parse(VALID);
        cfg.branding.luks_root_volume = "mapper/root".to_string();
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn rejects_zero_limits() {
        let mut cfg = parse(VALID);
        cfg.detection.os_label_max_len = 0;
        assert!(validate_config(&cfg).is_err());

        let mut cfg = parse(VALID);
        cfg.detection.max_primary_partitions = 0;
        assert!(validate_config(&cfg).is_err());
    }
}
