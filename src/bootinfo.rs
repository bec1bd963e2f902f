/////////
/// Detecting installed operating systems
////////
use std::collections::HashMap;
use std::fmt;

use crate::errors::ProbeError;
use crate::partitions::{device_path, kernel_name, parse_lsblk_kv, run_probe_command};

// What was found on a single partition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetectedOs {
    Known(String), // An operating system reported by os-prober
    Swap,          // A swap signature
    DataOrSwap,    // No filesystem signature at all
    Unknown,       // A filesystem without a detectable OS
}

impl DetectedOs {
    pub fn name(&self) -> Option<&str> {
        match self {
            DetectedOs::Known(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for DetectedOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectedOs::Known(name) => f.write_str(name),
            DetectedOs::Swap => f.write_str("Swap"),
            DetectedOs::DataOrSwap => f.write_str("Data or Swap"),
            DetectedOs::Unknown => f.write_str("unknown"),
        }
    }
}

// Partition device path and what lives on it, in partition-table order
pub type OsMap = Vec<(String, DetectedOs)>;

pub trait OsDetector {
    fn os_map(&self) -> Result<OsMap, ProbeError>;
}

// Partition as reported by lsblk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockPartition {
    pub name: String,
    pub fstype: String,
}

// Live detection through os-prober and lsblk
pub struct OsProber;

impl OsDetector for OsProber {
    fn os_map(&self) -> Result<OsMap, ProbeError> {
        let partitions = parse_lsblk_partitions(&run_probe_command(
            "lsblk",
            &["-ln", "-P", "-o", "NAME,TYPE,FSTYPE"],
        )?);
        let found = parse_os_prober(&run_probe_command("os-prober", &[])?)?;
        log::debug!("os-prober found {} system(s)", found.len());
        Ok(build_os_map(&partitions, &found))
    }
}

// Fixed detection result, used for development overrides
pub struct StaticOsMap(pub OsMap);

impl OsDetector for StaticOsMap {
    fn os_map(&self) -> Result<OsMap, ProbeError> {
        Ok(self.0.clone())
    }
}

// Picks os-prober unless NEBULA_DEV_OSES is set
pub fn detector_from_env() -> Box<dyn OsDetector + Send> {
    match std::env::var("NEBULA_DEV_OSES")
        .ok()
        .and_then(|value| parse_dev_os_map(&value))
    {
        Some(map) => {
            log::debug!("Using NEBULA_DEV_OSES override");
            Box::new(StaticOsMap(map))
        }
        None => Box::new(OsProber),
    }
}

// Joins the lsblk partition list with os-prober results
pub fn build_os_map(partitions: &[BlockPartition], found: &HashMap<String, String>) -> OsMap {
    partitions
        .iter()
        .map(|part| {
            let path = device_path(&part.name);
            let detected = match found.get(&path) {
                Some(name) => DetectedOs::Known(name.clone()),
                None => match part.fstype.as_str() {
                    "swap" => DetectedOs::Swap,
                    "" => DetectedOs::DataOrSwap,
                    _ => DetectedOs::Unknown,
                },
            };
            (path, detected)
        })
        .collect()
}

pub fn parse_lsblk_partitions(output: &str) -> Vec<BlockPartition> {
    let mut partitions = Vec::new();
    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let fields = parse_lsblk_kv(line);
        if fields.get("TYPE").map(|v| v.as_str()) != Some("part") {
            continue;
        }
        let name = fields.get("NAME").cloned().unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        partitions.push(BlockPartition {
            name,
            fstype: fields.get("FSTYPE").cloned().unwrap_or_default(),
        });
    }
    partitions
}

// Lines look like "/dev/sda1:Windows 10 (loader):Windows:chain"
pub fn parse_os_prober(output: &str) -> Result<HashMap<String, String>, ProbeError> {
    let mut found = HashMap::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split(':');
        let device = fields.next().unwrap_or_default();
        let long_name = fields.next();
        let short_name = fields.next();
        let (Some(long_name), Some(short_name)) = (long_name, short_name) else {
            return Err(ProbeError::Malformed {
                what: "os-prober",
                line: line.to_string(),
            });
        };
        // EFI entries carry the loader path after '@'
        let device = device.split('@').next().unwrap_or(device);
        if !device.starts_with("/dev/") {
            return Err(ProbeError::Malformed {
                what: "os-prober",
                line: line.to_string(),
            });
        }
        let name = clean_os_name(long_name, short_name);
        if name.is_empty() {
            continue;
        }
        found.entry(device.to_string()).or_insert(name);
    }
    Ok(found)
}

fn clean_os_name(long_name: &str, short_name: &str) -> String {
    let long_name = long_name.trim();
    let long_name = long_name
        .strip_suffix("(loader)")
        .map(str::trim_end)
        .unwrap_or(long_name);
    if long_name.is_empty() {
        short_name.trim().to_string()
    } else {
        long_name.to_string()
    }
}

// Format: "sda1=Windows 10,sda2=swap,sda3=data,sda4=unknown"
fn parse_dev_os_map(value: &str) -> Option<OsMap> {
    if value.trim().is_empty() {
        return None;
    }
    let mut map = Vec::new();
    for entry in value.split(',') {
        let Some((part, os)) = entry.split_once('=') else {
            continue;
        };
        let part = kernel_name(part.trim());
        if part.is_empty() {
            continue;
        }
        let detected = match os.trim() {
            "" | "unknown" => DetectedOs::Unknown,
            os if os.eq_ignore_ascii_case("swap") => DetectedOs::Swap,
            os if os.eq_ignore_ascii_case("data") => DetectedOs::DataOrSwap,
            os => DetectedOs::Known(os.to_string()),
        };
        map.push((device_path(part), detected));
    }
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LSBLK_SAMPLE: &str = r#"NAME="sda" TYPE="disk" FSTYPE=""
NAME="sda1" TYPE="part" FSTYPE="ntfs"
NAME="sda2" TYPE="part" FSTYPE="ntfs"
NAME="sda3" TYPE="part" FSTYPE="swap"
NAME="sda4" TYPE="part" FSTYPE=""
NAME="sdb" TYPE="disk" FSTYPE=""
NAME="sdb1" TYPE="part" FSTYPE="ext4"
NAME="sr0" TYPE="rom" FSTYPE="iso9660"
"#;

    const OS_PROBER_SAMPLE: &str = "/dev/sda1:Windows 7 (loader):Windows:chain
/dev/sda2@/efi/Microsoft/Boot/bootmgfw.efi:Windows Boot Manager:Windows:efi
";

    #[test]
    fn lsblk_keeps_only_partitions() {
        let parts = parse_lsblk_partitions(LSBLK_SAMPLE);
        let names: Vec<&str> = parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["sda1", "sda2", "sda3", "sda4", "sdb1"]);
        assert_eq!(parts[2].fstype, "swap");
    }

    #[test]
    fn os_prober_strips_loader_suffix_and_efi_path() {
        let found = parse_os_prober(OS_PROBER_SAMPLE).expect("parse");
        assert_eq!(found.get("/dev/sda1").map(String::as_str), Some("Windows 7"));
        assert_eq!(
            found.get("/dev/sda2").map(String::as_str),
            Some("Windows Boot Manager")
        );
    }

    #[test]
    fn os_prober_falls_back_to_short_name() {
        let found = parse_os_prober("/dev/sdb1::Linux:linux\n").expect("parse");
        assert_eq!(found.get("/dev/sdb1").map(String::as_str), Some("Linux"));
    }

    #[test]
    fn os_prober_rejects_garbage() {
        assert!(parse_os_prober("not a prober line\n").is_err());
        assert!(parse_os_prober("sda1:Windows:Windows:chain\n").is_err());
        assert!(parse_os_prober("\n\n").expect("empty").is_empty());
    }

    #[test]
    fn builds_tagged_map_in_partition_order() {
        let parts = parse_lsblk_partitions(LSBLK_SAMPLE);
        let found = parse_os_prober(OS_PROBER_SAMPLE).expect("parse");
        let map = build_os_map(&parts, &found);
        assert_eq!(
            map,
            vec![
                ("/dev/sda1".to_string(), DetectedOs::Known("Windows 7".to_string())),
                (
                    "/dev/sda2".to_string(),
                    DetectedOs::Known("Windows Boot Manager".to_string())
                ),
                ("/dev/sda3".to_string(), DetectedOs::Swap),
                ("/dev/sda4".to_string(), DetectedOs::DataOrSwap),
                ("/dev/sdb1".to_string(), DetectedOs::Unknown),
            ]
        );
    }

    #[test]
    fn sentinels_display_like_bootinfo() {
        assert_eq!(DetectedOs::Swap.to_string(), "Swap");
        assert_eq!(DetectedOs::DataOrSwap.to_string(), "Data or Swap");
        assert_eq!(DetectedOs::Unknown.to_string(), "unknown");
        assert_eq!(DetectedOs::Unknown.name(), None);
    }

    #[test]
    fn parses_dev_override() {
        let map = parse_dev_os_map("sda1=Windows 10, /dev/sda2=swap,sda3=data,bogus").expect("map");
        assert_eq!(
            map,
            vec![
                ("/dev/sda1".to_string(), DetectedOs::Known("Windows 10".to_string())),
                ("/dev/sda2".to_string(), DetectedOs::Swap),
                ("/dev/sda3".to_string(), DetectedOs::DataOrSwap),
            ]
        );
        assert!(parse_dev_os_map("").is_none());
    }
}
