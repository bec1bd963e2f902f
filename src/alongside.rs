/////////
/// Deciding whether "install alongside" can be offered
////////
use crate::bootinfo::OsDetector;
use crate::config::DetectionConfig;
use crate::firmware::Firmware;
use crate::partitions::{belongs_to_disk, PartitionSource};

// Why the alongside mode ended up enabled or disabled
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Enabled,
    UefiUnsupported,
    NoOsDetected,
    WindowsNotDetected,
    UnsupportedLayout,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlongsideReport {
    // Distinct OS names found on the primary disk, first seen first
    pub other_oses: Vec<String>,
    pub enable_alongside: bool,
    pub verdict: Verdict,
}

impl AlongsideReport {
    fn disabled(other_oses: Vec<String>, verdict: Verdict) -> Self {
        Self {
            other_oses,
            enable_alongside: false,
            verdict,
        }
    }
}

// Alongside only works with the recommended BIOS layout: no extended
// partition and fewer primary partitions than the MBR can hold.
// TODO: accept more layouts once the alongside partitioner can place a new
// logical partition inside an existing extended one.
pub fn check_alongside_disk_layout(
    source: &dyn PartitionSource,
    detection: &DetectionConfig,
) -> bool {
    let partitions = match source.partitions() {
        Ok(partitions) => partitions,
        Err(err) => {
            log::warn!("Could not read the partition table: {}", err);
            return false;
        }
    };
    log::debug!("Partitions: {:?}", partitions);

    for partition in &partitions {
        match source.is_partition_extended(partition) {
            Ok(true) => {
                log::debug!("{} is an extended partition", partition);
                return false;
            }
            Ok(false) => {}
            Err(err) => {
                log::warn!("Could not inspect {}: {}", partition, err);
                return false;
            }
        }
    }

    // Without an extended partition every partition is primary
    let primary = partitions
        .iter()
        .filter(|partition| belongs_to_disk(partition, &detection.primary_disk))
        .count();
    primary < detection.max_primary_partitions
}

// Distinct OS names on the primary disk, skipping swap and unknown results
pub fn detect_other_oses(detector: &dyn OsDetector, primary_disk: &str) -> Vec<String> {
    let map = match detector.os_map() {
        Ok(map) => map,
        Err(err) => {
            log::warn!("Could not detect installed systems: {}", err);
            Vec::new()
        }
    };

    let mut other_oses: Vec<String> = Vec::new();
    for (partition, detected) in &map {
        log::debug!("{}: {}", partition, detected);
        if !belongs_to_disk(partition, primary_disk) {
            continue;
        }
        let Some(name) = detected.name() else {
            continue;
        };
        if !other_oses.iter().any(|existing| existing == name) {
            other_oses.push(name.to_string());
        }
    }
    other_oses
}

pub fn check_alongside(
    firmware: Firmware,
    detector: &dyn OsDetector,
    source: &dyn PartitionSource,
    detection: &DetectionConfig,
) -> AlongsideReport {
    if firmware.is_uefi() {
        log::debug!("The 'alongside' installation mode does not work in UEFI systems");
        return AlongsideReport::disabled(Vec::new(), Verdict::UefiUnsupported);
    }

    let other_oses = detect_other_oses(detector, &detection.primary_disk);

    let verdict = if other_oses.is_empty() {
        log::debug!("Can't detect any OS in device {}.", detection.primary_disk);
        Verdict::NoOsDetected
    } else if other_oses
        .iter()
        .any(|name| name.to_lowercase().contains("windows"))
    {
        log::debug!("Windows detected.");
        Verdict::Enabled
    } else {
        log::debug!("Windows not detected.");
        Verdict::WindowsNotDetected
    };

    let layout_ok = check_alongside_disk_layout(source, detection);
    if !layout_ok {
        log::debug!("Unsupported disk layout for the 'alongside' installation mode");
    }

    let verdict = match verdict {
        Verdict::Enabled if !layout_ok => Verdict::UnsupportedLayout,
        other => other,
    };
    let enable_alongside = verdict == Verdict::Enabled;
    if enable_alongside {
        log::debug!("The 'alongside' installation mode will be enabled.");
    } else {
        log::debug!("The 'alongside' installation mode will NOT be enabled.");
    }

    AlongsideReport {
        other_oses,
        enable_alongside,
        verdict,
    }
}
