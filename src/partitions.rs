/////////
/// Partition table layout
////////
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use crate::errors::ProbeError;

const PROC_PARTITIONS: &str = "/proc/partitions";
const SYS_CLASS_BLOCK: &str = "/sys/class/block";

// MBR container types: DOS extended (CHS), W95 extended (LBA), Linux extended
const EXTENDED_PARTITION_TYPES: [u8; 3] = [0x05, 0x0f, 0x85];

pub trait PartitionSource {
    // Partition device paths in kernel order, e.g. "/dev/sda1"
    fn partitions(&self) -> Result<Vec<String>, ProbeError>;
    fn is_partition_extended(&self, partition: &str) -> Result<bool, ProbeError>;
}

// Reads the live partition table from procfs and sysfs, partition types from lsblk
pub struct ProcPartitions {
    proc_path: PathBuf,
    sys_block: PathBuf,
    lsblk_output: Option<String>,
}

impl ProcPartitions {
    pub fn new() -> Self {
        Self::with_paths(PROC_PARTITIONS, SYS_CLASS_BLOCK)
    }

    pub fn with_paths(proc_path: impl Into<PathBuf>, sys_block: impl Into<PathBuf>) -> Self {
        Self {
            proc_path: proc_path.into(),
            sys_block: sys_block.into(),
            lsblk_output: None,
        }
    }

    #[cfg(test)]
    fn with_lsblk_output(mut self, raw: impl Into<String>) -> Self {
        self.lsblk_output = Some(raw.into());
        self
    }

    fn names(&self) -> Result<Vec<String>, ProbeError> {
        let raw = fs::read_to_string(&self.proc_path).map_err(|source| ProbeError::Read {
            path: self.proc_path.display().to_string(),
            source,
        })?;
        parse_proc_partitions(&raw)
    }

    // Whole disks have no "partition" attribute in sysfs
    fn is_partition(&self, name: &str) -> bool {
        self.sys_block.join(name).join("partition").exists()
    }

    fn part_types(&self) -> Result<HashMap<String, String>, ProbeError> {
        let raw = match &self.lsblk_output {
            Some(raw) => raw.clone(),
            None => run_probe_command("lsblk", &["-ln", "-P", "-o", "NAME,PARTTYPE"])?,
        };
        Ok(parse_lsblk_part_types(&raw))
    }
}

impl Default for ProcPartitions {
    fn default() -> Self {
        Self::new()
    }
}

impl PartitionSource for ProcPartitions {
    fn partitions(&self) -> Result<Vec<String>, ProbeError> {
        Ok(self
            .names()?
            .into_iter()
            .filter(|name| self.is_partition(name))
            .map(|name| device_path(&name))
            .collect())
    }

    // The container's size in /proc/partitions depends on the sector size,
    // so only the MBR type code is trusted
    fn is_partition_extended(&self, partition: &str) -> Result<bool, ProbeError> {
        let types = self.part_types()?;
        Ok(types
            .get(kernel_name(partition))
            .is_some_and(|code| is_extended_type(code)))
    }
}

// Fixed partition list, used for development overrides
#[derive(Clone, Debug, Default)]
pub struct StaticPartitions {
    entries: Vec<(String, bool)>,
}

impl StaticPartitions {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, extended)| (device_path(kernel_name(name.as_ref())), extended))
                .collect(),
        }
    }
}

impl PartitionSource for StaticPartitions {
    fn partitions(&self) -> Result<Vec<String>, ProbeError> {
        Ok(self.entries.iter().map(|(name, _)| name.clone()).collect())
    }

    fn is_partition_extended(&self, partition: &str) -> Result<bool, ProbeError> {
        let path = device_path(kernel_name(partition));
        Ok(self
            .entries
            .iter()
            .any(|(name, extended)| *name == path && *extended))
    }
}

// Picks the live source unless NEBULA_DEV_PARTITIONS is set
pub fn source_from_env() -> Box<dyn PartitionSource + Send> {
    match dev_partitions_override() {
        Some(source) => {
            log::debug!("Using NEBULA_DEV_PARTITIONS override");
            Box::new(source)
        }
        None => Box::new(ProcPartitions::new()),
    }
}

fn dev_partitions_override() -> Option<StaticPartitions> {
    let value = std::env::var("NEBULA_DEV_PARTITIONS").ok()?;
    parse_dev_partitions(&value)
}

// Format: "sda1,sda2,sda5:extended"
fn parse_dev_partitions(value: &str) -> Option<StaticPartitions> {
    if value.trim().is_empty() {
        return None;
    }
    let entries: Vec<(String, bool)> = value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((name, kind)) => (
                name.trim().to_string(),
                kind.trim().eq_ignore_ascii_case("extended"),
            ),
            None => (entry.to_string(), false),
        })
        .collect();
    Some(StaticPartitions::new(entries))
}

// Device names listed in /proc/partitions, whole disks included
pub fn parse_proc_partitions(raw: &str) -> Result<Vec<String>, ProbeError> {
    let mut names = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("major") {
            continue;
        }
        let malformed = || ProbeError::Malformed {
            what: "/proc/partitions",
            line: line.to_string(),
        };
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [major, minor, blocks, name] = fields[..] else {
            return Err(malformed());
        };
        if major.parse::<u32>().is_err()
            || minor.parse::<u32>().is_err()
            || blocks.parse::<u64>().is_err()
        {
            return Err(malformed());
        }
        names.push(name.to_string());
    }
    Ok(names)
}

// NAME -> PARTTYPE from `lsblk -P -o NAME,PARTTYPE`, skipping rows without a type
pub fn parse_lsblk_part_types(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut fields = parse_lsblk_kv(line);
            let name = fields.remove("NAME")?;
            let code = fields.remove("PARTTYPE")?;
            (!name.is_empty() && !code.is_empty()).then_some((name, code))
        })
        .collect()
}

// "0x5", "0x0f" and "85" are MBR codes; GPT type GUIDs never parse
pub fn is_extended_type(code: &str) -> bool {
    let code = code.trim();
    let hex = code
        .strip_prefix("0x")
        .or_else(|| code.strip_prefix("0X"))
        .unwrap_or(code);
    u8::from_str_radix(hex, 16).is_ok_and(|code| EXTENDED_PARTITION_TYPES.contains(&code))
}

// "sda1" and "/dev/sda1" both become "sda1"
pub fn kernel_name(partition: &str) -> &str {
    partition.strip_prefix("/dev/").unwrap_or(partition)
}

pub fn device_path(name: &str) -> String {
    format!("/dev/{}", name)
}

// True when the partition is numbered under the given disk ("sda1", "nvme0n1p2")
pub fn belongs_to_disk(partition: &str, disk: &str) -> bool {
    let name = kernel_name(partition);
    let Some(rest) = name.strip_prefix(kernel_name(disk)) else {
        return false;
    };
    let needs_p = disk
        .chars()
        .last()
        .map(|c| c.is_ascii_digit())
        .unwrap_or(false);
    let number = if needs_p {
        match rest.strip_prefix('p') {
            Some(number) => number,
            None => return false,
        }
    } else {
        rest
    };
    !number.is_empty() && number.chars().all(|c| c.is_ascii_digit())
}

pub(crate) fn run_probe_command(
    command: &'static str,
    args: &[&str],
) -> Result<String, ProbeError> {
    let output = Command::new(command)
        .args(args)
        .output()
        .map_err(|source| ProbeError::Spawn { command, source })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProbeError::CommandFailed {
            command,
            stderr: stderr.trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

// Parses a line of `lsblk -P` output into key/value pairs
pub(crate) fn parse_lsblk_kv(line: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let mut rest = line.trim();
    while !rest.is_empty() {
        let Some(eq_idx) = rest.find("=\"") else {
            break;
        };
        let key = &rest[..eq_idx];
        let after_eq = &rest[eq_idx + 2..];
        let Some(end_quote) = after_eq.find('"') else {
            break;
        };
        let value = &after_eq[..end_quote];
        map.insert(key.to_string(), value.to_string());
        rest = after_eq[end_quote + 1..].trim_start();
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROC_SAMPLE: &str = "major minor  #blocks  name

   8        0  488386584 sda
   8        1     512000 sda1
   8        2  104344576 sda2
   8        3          1 sda3
   8        5   52428800 sda5
   8       16  976762584 sdb
   8       17  976761560 sdb1
  11        0    1048575 sr0
";

    const LSBLK_TYPES: &str = r#"NAME="sda" PARTTYPE=""
NAME="sda1" PARTTYPE="0x7"
NAME="sda2" PARTTYPE="0x83"
NAME="sda3" PARTTYPE="0x5"
NAME="sda5" PARTTYPE="0x83"
NAME="sdb" PARTTYPE=""
NAME="sdb1" PARTTYPE="0fc63daf-8483-4772-8e79-3d69d8477de4"
NAME="sr0" PARTTYPE=""
"#;

    fn fake_tree(partitions: &[&str]) -> (tempfile::TempDir, ProcPartitions) {
        fake_tree_with(PROC_SAMPLE, LSBLK_TYPES, partitions)
    }

    fn fake_tree_with(
        proc_partitions: &str,
        lsblk_types: &str,
        partitions: &[&str],
    ) -> (tempfile::TempDir, ProcPartitions) {
        let dir = tempfile::tempdir().expect("tempdir");
        let proc_path = dir.path().join("partitions");
        fs::write(&proc_path, proc_partitions).expect("write proc");
        let sys_block = dir.path().join("block");
        for name in ["sda", "sdb", "sr0"].iter().chain(partitions) {
            fs::create_dir_all(sys_block.join(name)).expect("create sysfs dir");
        }
        for name in partitions {
            fs::write(sys_block.join(name).join("partition"), "1\n").expect("write attr");
        }
        let source =
            ProcPartitions::with_paths(proc_path, sys_block).with_lsblk_output(lsblk_types);
        (dir, source)
    }

    #[test]
    fn parses_proc_partitions() {
        let names = parse_proc_partitions(PROC_SAMPLE).expect("parse");
        assert_eq!(names.len(), 8);
        assert_eq!(names[3], "sda3");
        assert_eq!(names[7], "sr0");
    }

    #[test]
    fn rejects_truncated_proc_line() {
        let err = parse_proc_partitions("   8  1  512000\n").unwrap_err();
        assert!(matches!(err, ProbeError::Malformed { .. }));
    }

    #[test]
    fn lists_only_partitions() {
        let (_dir, source) = fake_tree(&["sda1", "sda2", "sda3", "sda5", "sdb1"]);
        let partitions = source.partitions().expect("partitions");
        assert_eq!(
            partitions,
            vec!["/dev/sda1", "/dev/sda2", "/dev/sda3", "/dev/sda5", "/dev/sdb1"]
        );
    }

    #[test]
    fn rejects_non_numeric_block_count() {
        let err = parse_proc_partitions("   8  1  lots sda1\n").unwrap_err();
        assert!(matches!(err, ProbeError::Malformed { .. }));
    }

    #[test]
    fn msdos_container_type_is_extended() {
        let (_dir, source) = fake_tree(&["sda1", "sda2", "sda3", "sda5", "sdb1"]);
        assert!(source.is_partition_extended("/dev/sda3").expect("probe"));
        assert!(source.is_partition_extended("sda3").expect("probe"));
        assert!(!source.is_partition_extended("/dev/sda1").expect("probe"));
        assert!(!source.is_partition_extended("/dev/sdz9").expect("probe"));
    }

    #[test]
    fn extended_container_on_4k_disk_is_detected() {
        // 4K-native disks size the container at 8 sectors, i.e. 4 blocks
        let proc_4kn = "major minor  #blocks  name

   8        0  488386584 sda
   8        1     512000 sda1
   8        2          4 sda2
   8        5   52428800 sda5
";
        let types = r#"NAME="sda" PARTTYPE=""
NAME="sda1" PARTTYPE="0x7"
NAME="sda2" PARTTYPE="0xf"
NAME="sda5" PARTTYPE="0x83"
"#;
        let (_dir, source) = fake_tree_with(proc_4kn, types, &["sda1", "sda2", "sda5"]);
        assert!(source.is_partition_extended("/dev/sda2").expect("probe"));
        assert!(!source.is_partition_extended("/dev/sda5").expect("probe"));
    }

    #[test]
    fn one_block_partition_without_container_type_is_not_extended() {
        let types = r#"NAME="sda3" PARTTYPE="0x83""#;
        let (_dir, source) = fake_tree_with(PROC_SAMPLE, types, &["sda3"]);
        assert!(!source.is_partition_extended("/dev/sda3").expect("probe"));
    }

    #[test]
    fn recognises_extended_type_codes() {
        assert!(is_extended_type("0x5"));
        assert!(is_extended_type("0x05"));
        assert!(is_extended_type("0xf"));
        assert!(is_extended_type("0x0F"));
        assert!(is_extended_type("0x85"));
        assert!(!is_extended_type("0x83"));
        assert!(!is_extended_type("0x7"));
        assert!(!is_extended_type("0x82"));
        assert!(!is_extended_type(""));
        assert!(!is_extended_type("ebd0a0a2-b9e5-4433-87c0-68b6b72699c7"));
    }

    #[test]
    fn parses_lsblk_part_types() {
        let types = parse_lsblk_part_types(LSBLK_TYPES);
        assert_eq!(types.get("sda3").map(String::as_str), Some("0x5"));
        assert_eq!(types.get("sda1").map(String::as_str), Some("0x7"));
        assert!(!types.contains_key("sda"));
        assert!(!types.contains_key("sr0"));
    }

    #[test]
    fn missing_proc_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = ProcPartitions::with_paths(dir.path().join("nope"), dir.path());
        assert!(matches!(source.partitions(), Err(ProbeError::Read { .. })));
    }

    #[test]
    fn matches_partitions_to_their_disk() {
        assert!(belongs_to_disk("/dev/sda1", "sda"));
        assert!(belongs_to_disk("sda12", "sda"));
        assert!(belongs_to_disk("/dev/nvme0n1p2", "nvme0n1"));
        assert!(!belongs_to_disk("/dev/sdaa1", "sda"));
        assert!(!belongs_to_disk("/dev/sda", "sda"));
        assert!(!belongs_to_disk("/dev/sdb1", "sda"));
        assert!(!belongs_to_disk("/dev/nvme0n12", "nvme0n1"));
    }

    #[test]
    fn parses_dev_override() {
        let source = parse_dev_partitions("sda1, /dev/sda2 ,sda5:extended").expect("override");
        assert_eq!(
            source.partitions().expect("partitions"),
            vec!["/dev/sda1", "/dev/sda2", "/dev/sda5"]
        );
        assert!(source.is_partition_extended("sda5").expect("probe"));
        assert!(!source.is_partition_extended("sda1").expect("probe"));
        assert!(parse_dev_partitions("  ").is_none());
    }

    #[test]
    fn parses_lsblk_pairs() {
        let map = parse_lsblk_kv(r#"NAME="sda1" TYPE="part" FSTYPE="ntfs""#);
        assert_eq!(map.get("NAME").map(String::as_str), Some("sda1"));
        assert_eq!(map.get("FSTYPE").map(String::as_str), Some("ntfs"));
    }
}
