pub const SPINNER_LEN: usize = 4;
pub(crate) const SPINNER: [&str; SPINNER_LEN] = ["|", "/", "-", "\\"];
pub(crate) const NEBULA_ART: [&str; 6] = [
    " _   _      _           _       ",
    "| \\ | | ___| |__  _   _| | __ _ ",
    "|  \\| |/ _ \\ '_ \\| | | | |/ _` |",
    "| |\\  |  __/ |_) | |_| | | (_| |",
    "|_| \\_|\\___|_.__/ \\__,_|_|\\__,_|",
    "",
];

// Choices shown in the summary panel
#[derive(Debug, Clone, Default)]
pub struct AskSummary {
    pub detected: Option<String>,
    pub alongside: Option<String>,
    pub mode: Option<String>,
    pub encryption: Option<String>,
    pub lvm: Option<String>,
    pub home: Option<String>,
}

// Actions the user can take on the installation type screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskAction {
    Submit,
    Back,
    Quit,
}

// UI submodules
mod ask;
mod colors;
mod common;
mod detecting;
mod keybinds;

pub use ask::run_installation_ask;
pub use detecting::render_detecting;
