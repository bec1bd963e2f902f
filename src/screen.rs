/////////
/// Installation type step: view-model and event handlers
////////
use std::path::{Path, PathBuf};

use crate::alongside::AlongsideReport;
use crate::config::Config;
use crate::labels::{os_list_str, ScreenText};
use crate::settings::{AskUpdate, PartitionMode};

// Page the wizard moves to after this step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextPage {
    Automatic,
    Alongside,
    Advanced,
}

impl NextPage {
    pub fn tag(self) -> &'static str {
        match self {
            NextPage::Automatic => "installation_automatic",
            NextPage::Alongside => "installation_alongside",
            NextPage::Advanced => "installation_advanced",
        }
    }

    pub fn partition_mode(self) -> PartitionMode {
        match self {
            NextPage::Automatic => PartitionMode::Automatic,
            NextPage::Alongside => PartitionMode::Alongside,
            NextPage::Advanced => PartitionMode::Advanced,
        }
    }
}

// Options that only apply to the automatic installation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoOption {
    Encrypt,
    Lvm,
    Home,
}

// A row the user can move to with the keyboard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusItem {
    Mode(NextPage),
    Option(AutoOption),
}

// Row as drawn, including rows that are currently disabled
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Row {
    pub item: FocusItem,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedScreen {
    pub text: ScreenText,
    pub show_alongside: bool,
}

// Pictures of each partitioning mode, for front-ends that can show them
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionerImages {
    pub automatic: PathBuf,
    pub alongside: PathBuf,
    pub advanced: PathBuf,
}

impl PartitionerImages {
    pub fn resolve(data_dir: &Path) -> Self {
        let dir = data_dir.join("images").join("partitioner").join("small");
        let images = Self {
            automatic: dir.join("automatic.png"),
            alongside: dir.join("alongside.png"),
            advanced: dir.join("advanced.png"),
        };
        for path in [&images.automatic, &images.alongside, &images.advanced] {
            if !path.exists() {
                log::debug!("Partitioner image {} not found", path.display());
            }
        }
        images
    }
}

pub struct AskScreen {
    next_page: NextPage,
    other_oses: Vec<String>,
    enable_alongside: bool,
    encrypt: bool,
    lvm: bool,
    home: bool,
    options_enabled: bool,
    images: PartitionerImages,
    distro_name: String,
    luks_root_volume: String,
    conjunction: String,
    label_max_len: usize,
}

impl AskScreen {
    pub fn new(report: AlongsideReport, config: &Config, data_dir: &Path) -> Self {
        Self {
            // By default, select automatic installation
            next_page: NextPage::Automatic,
            other_oses: report.other_oses,
            enable_alongside: report.enable_alongside,
            encrypt: false,
            lvm: false,
            home: false,
            options_enabled: true,
            images: PartitionerImages::resolve(data_dir),
            distro_name: config.branding.distro_name.clone(),
            luks_root_volume: config.branding.luks_root_volume.clone(),
            conjunction: config.text.conjunction.clone(),
            label_max_len: config.detection.os_label_max_len,
        }
    }

    pub fn prepare(&self) -> PreparedScreen {
        PreparedScreen {
            text: ScreenText::compose(&self.os_list_str(), &self.distro_name),
            show_alongside: self.enable_alongside,
        }
    }

    pub fn os_list_str(&self) -> String {
        os_list_str(&self.other_oses, &self.conjunction, self.label_max_len)
    }

    pub fn other_oses(&self) -> &[String] {
        &self.other_oses
    }

    pub fn alongside_enabled(&self) -> bool {
        self.enable_alongside
    }

    // Existing preview image for a mode, if the data directory ships one
    pub fn image_for(&self, page: NextPage) -> Option<&Path> {
        let path = match page {
            NextPage::Automatic => &self.images.automatic,
            NextPage::Alongside => &self.images.alongside,
            NextPage::Advanced => &self.images.advanced,
        };
        path.exists().then_some(path.as_path())
    }

    // Radio button handler
    pub fn select(&mut self, page: NextPage) {
        if page == NextPage::Alongside && !self.enable_alongside {
            log::debug!("Ignoring alongside selection, the option is hidden");
            return;
        }
        self.next_page = page;
        self.options_enabled = page == NextPage::Automatic;
    }

    // Check button handler
    pub fn toggle(&mut self, option: AutoOption) {
        if !self.options_enabled {
            return;
        }
        let value = self.option_mut(option);
        *value = !*value;
    }

    pub fn is_checked(&self, option: AutoOption) -> bool {
        match option {
            AutoOption::Encrypt => self.encrypt,
            AutoOption::Lvm => self.lvm,
            AutoOption::Home => self.home,
        }
    }

    fn option_mut(&mut self, option: AutoOption) -> &mut bool {
        match option {
            AutoOption::Encrypt => &mut self.encrypt,
            AutoOption::Lvm => &mut self.lvm,
            AutoOption::Home => &mut self.home,
        }
    }

    pub fn options_enabled(&self) -> bool {
        self.options_enabled
    }

    pub fn get_next_page(&self) -> NextPage {
        self.next_page
    }

    // All visible rows in display order
    pub fn rows(&self) -> Vec<Row> {
        let mut rows = vec![Row {
            item: FocusItem::Mode(NextPage::Automatic),
            enabled: true,
        }];
        for option in [AutoOption::Encrypt, AutoOption::Lvm, AutoOption::Home] {
            rows.push(Row {
                item: FocusItem::Option(option),
                enabled: self.options_enabled,
            });
        }
        if self.enable_alongside {
            rows.push(Row {
                item: FocusItem::Mode(NextPage::Alongside),
                enabled: true,
            });
        }
        rows.push(Row {
            item: FocusItem::Mode(NextPage::Advanced),
            enabled: true,
        });
        rows
    }

    pub fn focus_items(&self) -> Vec<FocusItem> {
        self.rows()
            .into_iter()
            .filter(|row| row.enabled)
            .map(|row| row.item)
            .collect()
    }

    // Moves the keyboard focus, clamping at both ends
    pub fn move_focus(&self, current: FocusItem, delta: isize) -> FocusItem {
        let items = self.focus_items();
        let Some(pos) = items.iter().position(|item| *item == current) else {
            return FocusItem::Mode(self.next_page);
        };
        let target = pos
            .saturating_add_signed(delta)
            .min(items.len().saturating_sub(1));
        items[target]
    }

    // Selects a radio row or flips a check row; returns where focus should be
    pub fn activate(&mut self, item: FocusItem) -> FocusItem {
        match item {
            FocusItem::Mode(page) => self.select(page),
            FocusItem::Option(option) => self.toggle(option),
        }
        self.valid_focus(item)
    }

    // Keeps focus on a row that can still be focused
    pub fn valid_focus(&self, item: FocusItem) -> FocusItem {
        if self.focus_items().contains(&item) {
            item
        } else {
            FocusItem::Mode(self.next_page)
        }
    }

    pub fn store_values(&self) -> AskUpdate {
        let update = if self.next_page == NextPage::Automatic {
            AskUpdate {
                enable_alongside: self.enable_alongside,
                use_lvm: self.lvm,
                use_luks: self.encrypt,
                use_luks_in_root: true,
                luks_root_volume: self.luks_root_volume.clone(),
                use_home: self.home,
                partition_mode: PartitionMode::Automatic,
            }
        } else {
            // The following steps decide these
            AskUpdate {
                enable_alongside: self.enable_alongside,
                use_lvm: false,
                use_luks: false,
                use_luks_in_root: false,
                luks_root_volume: String::new(),
                use_home: false,
                partition_mode: self.next_page.partition_mode(),
            }
        };

        if update.use_luks {
            log::info!("{} installation will be encrypted using LUKS", self.distro_name);
        }
        if update.use_lvm {
            log::info!("{} will be installed using LVM volumes", self.distro_name);
            if update.use_home {
                log::info!("{} will be installed using a separate /home volume.", self.distro_name);
            }
        } else if update.use_home {
            log::info!("{} will be installed using a separate /home partition.", self.distro_name);
        }
        log::info!("Partition mode: {}", update.partition_mode.as_str());

        update
    }
}
