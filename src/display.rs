// ============================================================================
// DISPLAY: texture upload seam between the pixel buffer and the screen
// ============================================================================

use egui::{ColorImage, TextureHandle, TextureOptions};

use crate::canvas::rgba_len;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    /// The bytes handed over don't match `width * height * 4`.
    SizeMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayError::SizeMismatch { expected, actual } => write!(
                f,
                "texture data size mismatch: expected {} bytes, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for DisplayError {}

/// Anything that can show an RGBA buffer.
///
/// `upload_texture` is called once per loaded image; `update_texture` once
/// per completed recompute, never mid-pipeline.
pub trait TextureSink {
    type Handle;

    fn upload_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<Self::Handle, DisplayError>;

    fn update_texture(
        &mut self,
        handle: &mut Self::Handle,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<(), DisplayError>;
}

fn check_len(width: u32, height: u32, rgba: &[u8]) -> Result<(), DisplayError> {
    let expected = rgba_len(width, height).unwrap_or(usize::MAX);
    if expected != rgba.len() {
        return Err(DisplayError::SizeMismatch { expected, actual: rgba.len() });
    }
    Ok(())
}

/// egui-backed sink. Textures are released when their `TextureHandle` drops.
pub struct EguiTextures {
    ctx: egui::Context,
    name: String,
    options: TextureOptions,
}

impl EguiTextures {
    pub fn new(ctx: &egui::Context, name: impl Into<String>, options: TextureOptions) -> Self {
        Self {
            ctx: ctx.clone(),
            name: name.into(),
            options,
        }
    }

    fn color_image(width: u32, height: u32, rgba: &[u8]) -> ColorImage {
        ColorImage::from_rgba_unmultiplied([width as usize, height as usize], rgba)
    }
}

impl TextureSink for EguiTextures {
    type Handle = TextureHandle;

    fn upload_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureHandle, DisplayError> {
        check_len(width, height, rgba)?;
        Ok(self.ctx.load_texture(
            self.name.clone(),
            Self::color_image(width, height, rgba),
            self.options,
        ))
    }

    fn update_texture(
        &mut self,
        handle: &mut TextureHandle,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<(), DisplayError> {
        check_len(width, height, rgba)?;
        handle.set(Self::color_image(width, height, rgba), self.options);
        Ok(())
    }
}
