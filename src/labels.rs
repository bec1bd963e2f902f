// Text shown on the installation type screen

const ELLIPSIS: &str = "...";

// Human readable summary of the detected systems, e.g. "Windows 10 and Ubuntu"
pub fn os_list_str(oses: &[String], conjunction: &str, max_len: usize) -> String {
    let joined = match oses {
        [] => String::new(),
        [single] => single.clone(),
        [first, second] => format!("{first}{conjunction}{second}"),
        _ => oses.join(", "),
    };
    truncate_chars(&joined, max_len)
}

fn truncate_chars(value: &str, max_len: usize) -> String {
    if value.chars().count() <= max_len {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(max_len).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

// Every label of the screen, already filled in
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenText {
    pub subtitle: String,
    pub introduction: String,
    pub automatic_label: String,
    pub automatic_description: String,
    pub encrypt_label: String,
    pub encrypt_description: String,
    pub lvm_label: String,
    pub lvm_description: String,
    pub home_label: String,
    pub home_description: String,
    // Only present when there is an OS to install next to
    pub alongside_label: Option<String>,
    pub alongside_description: Option<String>,
    pub advanced_label: String,
    pub advanced_description: String,
}

impl ScreenText {
    pub fn compose(oses_str: &str, distro: &str) -> Self {
        let has_oses = !oses_str.is_empty();

        let automatic_label = if has_oses {
            format!("Replace {oses_str} with {distro}")
        } else {
            format!("Erase disk and install {distro}")
        };

        let introduction = if has_oses {
            format!("This computer has {oses_str} installed.\nWhat do you want to do?")
        } else {
            "What do you want to do?".to_string()
        };

        Self {
            subtitle: "Installation Type".to_string(),
            introduction,
            automatic_label,
            automatic_description: "Warning: This will erase ALL data on your disk.".to_string(),
            encrypt_label: "Encrypt this installation for increased security.".to_string(),
            encrypt_description:
                "You will be asked to create an encryption password in the next step."
                    .to_string(),
            lvm_label: "Use LVM with this installation.".to_string(),
            lvm_description:
                "This will setup LVM and allow you to easily manage partitions and create snapshots."
                    .to_string(),
            home_label: "Set your Home in a different partition/volume".to_string(),
            home_description:
                "This will setup your /home directory in a different partition or volume."
                    .to_string(),
            alongside_label: has_oses.then(|| format!("Install {distro} alongside {oses_str}")),
            alongside_description: has_oses
                .then(|| format!("Installs {distro} without removing {oses_str}")),
            advanced_label: format!("Choose exactly where {distro} should be installed."),
            advanced_description: "Edit partition table and choose mount points.".to_string(),
        }
    }
}
