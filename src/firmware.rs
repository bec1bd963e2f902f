use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Firmware {
    Uefi,
    Bios,
}

impl Firmware {
    // Honors NEBULA_DEV_UEFI=0|1 before looking at the firmware path
    pub fn detect(efi_path: &Path) -> Self {
        if let Some(firmware) = dev_firmware_override() {
            log::debug!("Using NEBULA_DEV_UEFI override: {:?}", firmware);
            return firmware;
        }
        Self::from_path(efi_path)
    }

    pub fn from_path(efi_path: &Path) -> Self {
        if efi_path.exists() {
            Firmware::Uefi
        } else {
            Firmware::Bios
        }
    }

    pub fn is_uefi(self) -> bool {
        self == Firmware::Uefi
    }
}

fn dev_firmware_override() -> Option<Firmware> {
    let value = std::env::var("NEBULA_DEV_UEFI").ok()?;
    match value.trim() {
        "1" => Some(Firmware::Uefi),
        "0" => Some(Firmware::Bios),
        _ => None,
    }
}
