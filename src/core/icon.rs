use std::path::Path;

use crate::error::{SessionError, SessionResult};

/// Decoded RGBA8 icon image ready for the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowIcon {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl WindowIcon {
    /// Wrap raw RGBA8 pixels, checking the length against the dimensions
    pub fn from_rgba(rgba: Vec<u8>, width: u32, height: u32) -> SessionResult<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(SessionError::BadIcon(format!(
                "{}x{} icon needs {} bytes, got {}",
                width,
                height,
                expected,
                rgba.len()
            )));
        }
        Ok(Self { rgba, width, height })
    }

    /// Decode an image file (PNG or ICO)
    pub fn load(path: impl AsRef<Path>) -> SessionResult<Self> {
        let image = image::open(path.as_ref())?.into_rgba8();
        let (width, height) = image.dimensions();
        Self::from_rgba(image.into_raw(), width, height)
    }
}
