// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::config::{ClientApi, WindowConfig};
use crate::error::SessionResult;

#[derive(Parser, Debug, Clone)]
#[command(name = "blitwin-demo")]
#[command(about = "Window session demo: software backbuffer or wgpu swap chain", long_about = None)]
pub struct Cli {
    /// JSON window config; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Initial client width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial client height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    #[arg(long)]
    pub title: Option<String>,

    /// Refreshes per presented frame, 0 = unlimited
    #[arg(long = "swap-interval", default_value_t = 1)]
    pub swap_interval: i32,

    /// Draw into the software backbuffer instead of using wgpu
    #[arg(long, default_value = "false")]
    pub software: bool,

    /// Run without a display (no real window)
    #[arg(long, default_value = "false")]
    pub headless: bool,

    /// Exit after this many frames
    #[arg(long)]
    pub frames: Option<u64>,

    /// Keep the backbuffer at its creation size and stretch on present
    #[arg(long = "fixed-backbuffer", default_value = "false")]
    pub fixed_backbuffer: bool,

    /// Window icon image (PNG or ICO)
    #[arg(long)]
    pub icon: Option<PathBuf>,
}

impl Cli {
    /// Resolve the window config from the file (if any) and the flags
    pub fn window_config(&self) -> SessionResult<WindowConfig> {
        let mut config = match &self.config {
            Some(path) => WindowConfig::load(path)?,
            None => WindowConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(title) = &self.title {
            config.title = title.clone();
        }
        if self.software {
            config.hints.client_api = ClientApi::NoApi;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["blitwin-demo"]);
        assert_eq!(cli.swap_interval, 1);
        assert!(!cli.software);
        assert!(cli.frames.is_none());
        assert_eq!(cli.window_config().unwrap(), WindowConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "blitwin-demo",
            "--width",
            "1200",
            "--height",
            "600",
            "--software",
            "--swap-interval",
            "0",
            "--frames",
            "10",
        ]);
        let config = cli.window_config().unwrap();

        assert_eq!((config.width, config.height), (1200, 600));
        assert_eq!(config.hints.client_api, ClientApi::NoApi);
        assert_eq!(cli.swap_interval, 0);
        assert_eq!(cli.frames, Some(10));
    }
}
