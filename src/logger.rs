//! Session logger for the editor window.
//!
//! One file per GUI session, truncated on launch:
//!   Windows:  `%APPDATA%\PNGEditor\pngeditor.log`
//!   Linux:    `$XDG_DATA_HOME/PNGEditor/pngeditor.log` (or `~/.local/share/...`)
//!   macOS:    `~/Library/Application Support/PNGEditor/pngeditor.log`
//!
//! The header records the build and the pipeline's worker count, so a slow
//! `recompute` line can be read against the machine it ran on. Documents log
//! their id on load and save; recompute logs the edit summary and timing.
//!
//! Headless runs (CLI, tests) never call [`init`], and every macro is then a
//! no-op.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Severity tag written in front of each message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Panic,
}

impl Level {
    pub fn tag(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
        }
    }
}

struct SessionLog {
    path: PathBuf,
    file: Mutex<File>,
}

static SESSION: OnceLock<SessionLog> = OnceLock::new();

/// Path of this session's log file, once [`init`] has succeeded.
pub fn log_path() -> Option<&'static Path> {
    SESSION.get().map(|s| s.path.as_path())
}

fn append(line: &str) {
    let Some(session) = SESSION.get() else { return };
    if let Ok(mut file) = session.file.lock() {
        let _ = writeln!(file, "{}", line);
    }
}

/// Log `msg` at `level`. Does nothing before [`init`].
pub fn write(level: Level, msg: &str) {
    if SESSION.get().is_none() {
        return;
    }
    append(&format_line(&clock(unix_secs()), level, msg));
}

fn format_line(clock: &str, level: Level, msg: &str) -> String {
    format!("[{}] [{}] {}", clock, level.tag(), msg)
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Error, &format!($($arg)*))
    };
}

/// Open (truncating) the session log, write the header and mirror panics
/// into the file. Call once from `main` before the window opens.
pub fn init() {
    let path = log_file_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let file = match OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!("[logger] cannot open {}: {}", path.display(), e);
            return;
        }
    };
    let header = session_header(
        env!("CARGO_PKG_VERSION"),
        unix_secs(),
        rayon::current_num_threads(),
        &path,
    );
    if SESSION.set(SessionLog { path, file: Mutex::new(file) }).is_err() {
        return;
    }
    for line in header {
        append(&line);
    }

    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        append(&format_line(&clock(unix_secs()), Level::Panic, &info.to_string()));
        prev(info);
    }));
}

fn session_header(version: &str, started: u64, workers: usize, path: &Path) -> Vec<String> {
    vec![
        format!("=== PNGEditor {} session, unix {} ===", version, started),
        format!("pipeline workers: {}", workers),
        format!("log file: {}", path.display()),
        String::new(),
    ]
}

fn log_file_path() -> PathBuf {
    data_dir().join("PNGEditor").join("pngeditor.log")
}

/// Per-user data directory, without the app folder.
fn data_dir() -> PathBuf {
    let env_dir = |key: &str| std::env::var_os(key).map(PathBuf::from);
    #[cfg(target_os = "windows")]
    if let Some(appdata) = env_dir("APPDATA") {
        return appdata;
    }
    #[cfg(target_os = "macos")]
    if let Some(home) = env_dir("HOME") {
        return home.join("Library").join("Application Support");
    }
    env_dir("XDG_DATA_HOME")
        .or_else(|| env_dir("HOME").map(|h| h.join(".local").join("share")))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// `HH:MM:SS` (UTC) of a unix timestamp.
fn clock(secs: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        (secs % 86_400) / 3_600,
        (secs % 3_600) / 60,
        secs % 60
    )
}
