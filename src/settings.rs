// ============================================================================
// APP SETTINGS: persisted `key=value` cfg file in the user config dir
// ============================================================================

use std::path::PathBuf;

use egui::TextureOptions;

/// Texture sampling used when the editor view scales the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureFilterMode {
    /// Smooth (LINEAR)
    Linear,
    /// Sharp (NEAREST) - pixel-perfect
    Nearest,
}

impl TextureFilterMode {
    pub fn texture_options(&self) -> TextureOptions {
        match self {
            TextureFilterMode::Linear => TextureOptions::LINEAR,
            TextureFilterMode::Nearest => TextureOptions::NEAREST,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            TextureFilterMode::Linear => "linear",
            TextureFilterMode::Nearest => "nearest",
        }
    }
}

/// Application settings that persist across sessions
#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    /// Directory the Open / Save As dialogs start in
    pub last_directory: Option<PathBuf>,
    pub texture_filter: TextureFilterMode,
    pub start_maximized: bool,
    /// Initial window size when not maximized
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            last_directory: None,
            texture_filter: TextureFilterMode::Linear,
            start_maximized: false,
            window_width: 1280.0,
            window_height: 720.0,
        }
    }
}

impl AppSettings {
    pub(crate) fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("pngeditor");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("pngeditor_settings.cfg"));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .ok()?;
            let config_dir = PathBuf::from(appdata).join("PNGEditor");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("pngeditor_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            let config_dir = PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("PNGEditor");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("pngeditor_settings.cfg"));
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("pngeditor_settings.cfg")))
        }
    }

    pub fn to_cfg_string(&self) -> String {
        format!(
            "last_directory={}\n\
             texture_filter={}\n\
             start_maximized={}\n\
             window_width={}\n\
             window_height={}\n",
            self.last_directory
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            self.texture_filter.as_str(),
            self.start_maximized,
            self.window_width,
            self.window_height,
        )
    }

    /// Parse cfg text. Unknown keys are ignored, bad values keep the default.
    pub fn from_cfg_str(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else { continue };
            let key = key.trim();
            let val = val.trim();
            match key {
                "last_directory" => {
                    s.last_directory = (!val.is_empty()).then(|| PathBuf::from(val));
                }
                "texture_filter" => {
                    s.texture_filter = match val {
                        "nearest" => TextureFilterMode::Nearest,
                        _ => TextureFilterMode::Linear,
                    };
                }
                "start_maximized" => {
                    s.start_maximized = val == "true";
                }
                "window_width" => {
                    s.window_width = parse_window_dim(val, 1280.0);
                }
                "window_height" => {
                    s.window_height = parse_window_dim(val, 720.0);
                }
                _ => {}
            }
        }
        s
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Err(e) = std::fs::write(&path, self.to_cfg_string()) {
            log_warn!("Could not write settings to {}: {}", path.display(), e);
        }
    }

    /// Load settings from disk (returns default if file missing or corrupt)
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        let Ok(content) = std::fs::read_to_string(&path) else { return Self::default() };
        Self::from_cfg_str(&content)
    }
}

fn parse_window_dim(val: &str, fallback: f32) -> f32 {
    match val.parse::<f32>() {
        Ok(v) if v.is_finite() && v >= 200.0 => v,
        _ => fallback,
    }
}
