mod alongside;
mod bootinfo;
mod config;
mod errors;
mod firmware;
mod labels;
mod model;
mod partitions;
mod screen;
mod settings;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::RecvTimeoutError;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, ClearType};
use crossterm::{cursor, execute, terminal::Clear};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::alongside::{check_alongside, AlongsideReport};
use crate::config::{config, Config, DetectionConfig};
use crate::firmware::Firmware;
use crate::model::DetectionEvent;
use crate::screen::AskScreen;
use crate::settings::InstallSettings;
use crate::ui::{
    render_detecting, run_installation_ask, AskAction, AskSummary, SPINNER, SPINNER_LEN,
};

// Logging
const LOG_FILE_PATH: &str = "/tmp/nebula-ask.log";
// Settings shared with the other wizard steps
const SETTINGS_PATH: &str = "/tmp/nebula-install.toml";

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    // os-prober needs root to mount partitions
    let allow_nonroot = std::env::var("NEBULA_DEV_ALLOW_NONROOT").ok().as_deref() == Some("1");
    if unsafe { libc::geteuid() } != 0 && !allow_nonroot {
        println!("nebula-ask should be run as root in the live ISO.");
        println!("If you are testing locally, use sudo.");
        return Ok(());
    }

    let cfg = config();
    let settings_path = std::env::var("NEBULA_SETTINGS_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(SETTINGS_PATH));
    let settings = InstallSettings::load(&settings_path).context("load install settings")?;
    log::debug!("Installer data directory: {}", settings.data.display());

    // Set up the terminal for TUI interaction
    enable_raw_mode().context("enable raw mode")?;
    clear_screen()?;
    let mut terminal =
        Terminal::new(CrosstermBackend::new(io::stdout())).context("init terminal")?;

    let outcome = run_step(&mut terminal, cfg, &settings);

    // Clean up the terminal before reporting anything
    disable_raw_mode().context("disable raw mode")?;
    let _ = clear_screen();

    let (action, screen) = outcome?;
    match action {
        AskAction::Submit => {
            let update = screen.store_values();
            update
                .apply(&settings)
                .save(&settings_path)
                .context("save install settings")?;
            log::info!("Settings written to {}", settings_path.display());
            println!("{}", screen.get_next_page().tag());
        }
        AskAction::Back => println!("back"),
        AskAction::Quit => println!("quit"),
    }
    Ok(())
}

// Detection followed by the installation type screen
fn run_step(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: &Config,
    settings: &InstallSettings,
) -> Result<(AskAction, AskScreen)> {
    let report = run_detection(terminal, cfg.detection.clone())?;
    log::debug!("Alongside verdict: {:?}", report.verdict);
    let mut screen = AskScreen::new(report, cfg, &settings.data);
    let action = run_installation_ask(terminal, &mut screen)?;
    log::debug!("Installation type screen returned {:?}", action);
    Ok((action, screen))
}

// Runs the probes on a worker thread while a spinner is shown
fn run_detection(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    detection: DetectionConfig,
) -> Result<AlongsideReport> {
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::spawn(move || {
        let _ = tx.send(DetectionEvent::Log("Checking firmware".to_string()));
        let firmware = Firmware::detect(&detection.efi_path);
        let _ = tx.send(DetectionEvent::Log(
            "Looking for installed systems".to_string(),
        ));
        let detector = bootinfo::detector_from_env();
        let source = partitions::source_from_env();
        let report = check_alongside(firmware, detector.as_ref(), source.as_ref(), &detection);
        let _ = tx.send(DetectionEvent::Done(report));
    });

    let summary = AskSummary::default();
    let mut status = "Starting detection".to_string();
    let mut spinner_idx = 0;
    loop {
        render_detecting(terminal, SPINNER[spinner_idx], &status, &summary)?;
        match rx.recv_timeout(Duration::from_millis(120)) {
            Ok(DetectionEvent::Log(line)) => {
                log::debug!("{}", line);
                status = line;
            }
            Ok(DetectionEvent::Done(report)) => return Ok(report),
            Err(RecvTimeoutError::Timeout) => spinner_idx = (spinner_idx + 1) % SPINNER_LEN,
            Err(RecvTimeoutError::Disconnected) => {
                anyhow::bail!("detection thread exited without a result")
            }
        }
    }
}

// The TUI owns stdout, so log lines go to a file
fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"));
    builder.format_timestamp_secs();
    match OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(LOG_FILE_PATH)
    {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
}

// Clear the terminal screen
fn clear_screen() -> Result<()> {
    execute!(io::stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0)).context("clear screen")?;
    Ok(())
}
