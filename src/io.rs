// ============================================================================
// IMAGE I/O: decode to RGBA8, encode from RGBA8, native file dialogs
// ============================================================================

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};
use rfd::FileDialog;

use crate::canvas::BufferError;

/// A decoded image, already normalised to straight 8-bit RGBA.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

// ============================================================================
// ERRORS
// ============================================================================

/// Failure to bring an image into memory. Nothing is modified on error.
#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    /// Malformed header or data, or a colour encoding we can't normalise.
    Decode(String),
    /// The decoder produced bytes that don't match its own dimensions.
    Buffer(BufferError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "I/O error: {}", e),
            LoadError::Decode(e) => write!(f, "Decode error: {}", e),
            LoadError::Buffer(e) => write!(f, "Invalid image data: {}", e),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<png::DecodingError> for LoadError {
    fn from(e: png::DecodingError) -> Self {
        match e {
            png::DecodingError::IoError(io) => LoadError::Io(io),
            other => LoadError::Decode(other.to_string()),
        }
    }
}

impl From<image::ImageError> for LoadError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::IoError(io) => LoadError::Io(io),
            other => LoadError::Decode(other.to_string()),
        }
    }
}

impl From<BufferError> for LoadError {
    fn from(e: BufferError) -> Self {
        LoadError::Buffer(e)
    }
}

/// Failure to write an image out. In-memory state is never touched.
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Encode(String),
    /// The target extension names no format we can write.
    UnsupportedFormat(String),
    /// "Save" on a document that has never had a path.
    NoPath,
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {}", e),
            SaveError::Encode(e) => write!(f, "Encode error: {}", e),
            SaveError::UnsupportedFormat(ext) => write!(f, "Unsupported output format: {}", ext),
            SaveError::NoPath => write!(f, "Document has no file path"),
        }
    }
}

impl std::error::Error for SaveError {}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<png::EncodingError> for SaveError {
    fn from(e: png::EncodingError) -> Self {
        match e {
            png::EncodingError::IoError(io) => SaveError::Io(io),
            other => SaveError::Encode(other.to_string()),
        }
    }
}

impl From<image::ImageError> for SaveError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::IoError(io) => SaveError::Io(io),
            other => SaveError::Encode(other.to_string()),
        }
    }
}

// ============================================================================
// DECODE
// ============================================================================

fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Decode any supported image file into RGBA8.
///
/// PNG goes through the `png` crate with explicit normalisation; everything
/// else the `image` crate understands is converted with `to_rgba8`.
pub fn decode(path: &Path) -> Result<DecodedImage, LoadError> {
    if lowercase_extension(path) == "png" {
        return decode_png(path);
    }
    let img = image::open(path)?.to_rgba8();
    let (width, height) = img.dimensions();
    Ok(DecodedImage { width, height, rgba: img.into_raw() })
}

/// Decode a PNG, expanding palettes and low bit depths, stripping 16-bit
/// samples to 8 and synthesising opaque alpha where the file has none.
pub fn decode_png(path: &Path) -> Result<DecodedImage, LoadError> {
    let file = File::open(path)?;
    decode_png_from(BufReader::new(file))
}

pub fn decode_png_from<R: std::io::Read>(reader: R) -> Result<DecodedImage, LoadError> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    if info.bit_depth != png::BitDepth::Eight {
        return Err(LoadError::Decode(format!(
            "unsupported bit depth after normalisation: {:?}",
            info.bit_depth
        )));
    }

    let rgba = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        png::ColorType::Indexed => {
            return Err(LoadError::Decode("palette was not expanded".into()));
        }
    };

    let expected = crate::canvas::rgba_len(info.width, info.height);
    if expected != Some(rgba.len()) {
        return Err(LoadError::Buffer(BufferError::InvalidDimensions {
            width: info.width,
            height: info.height,
            len: rgba.len(),
        }));
    }

    Ok(DecodedImage { width: info.width, height: info.height, rgba })
}

// ============================================================================
// ENCODE
// ============================================================================

/// Write RGBA8 bytes to `path`, picking the format from the extension.
/// `.png` or no extension → PNG via the `png` crate.
pub fn encode(path: &Path, width: u32, height: u32, rgba: &[u8]) -> Result<(), SaveError> {
    let ext = lowercase_extension(path);
    if ext.is_empty() || ext == "png" {
        return encode_png(path, width, height, rgba);
    }

    let format = ImageFormat::from_extension(&ext)
        .filter(|f| f.can_write())
        .ok_or_else(|| SaveError::UnsupportedFormat(ext.clone()))?;
    let img = RgbaImage::from_raw(width, height, rgba.to_vec()).ok_or_else(|| {
        SaveError::Encode(format!("{} bytes do not form a {}x{} image", rgba.len(), width, height))
    })?;

    let dyn_img = DynamicImage::ImageRgba8(img);
    match format {
        // No alpha channel in JPEG
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(dyn_img.to_rgb8()).save_with_format(path, format)?,
        _ => dyn_img.save_with_format(path, format)?,
    }
    Ok(())
}

/// Write a straight 8-bit RGBA PNG.
pub fn encode_png(path: &Path, width: u32, height: u32, rgba: &[u8]) -> Result<(), SaveError> {
    let file = File::create(path)?;
    encode_png_to(BufWriter::new(file), width, height, rgba)
}

pub fn encode_png_to<W: std::io::Write>(
    writer: W,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<(), SaveError> {
    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgba)?;
    writer.finish()?;
    Ok(())
}

// ============================================================================
// FILE HANDLER
// ============================================================================

const OPEN_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "tga", "tiff", "tif"];
const SAVE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tga", "tiff", "tif"];

/// Native Open / Save As dialogs, remembering the last directory used.
#[derive(Clone, Debug, Default)]
pub struct FileHandler {
    pub last_directory: Option<PathBuf>,
}

impl FileHandler {
    pub fn new(last_directory: Option<PathBuf>) -> Self {
        Self { last_directory }
    }

    fn dialog(&self) -> FileDialog {
        let dialog = FileDialog::new();
        match &self.last_directory {
            Some(dir) if dir.is_dir() => dialog.set_directory(dir),
            _ => dialog,
        }
    }

    fn remember(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            self.last_directory = Some(parent.to_path_buf());
        }
    }

    /// Show the Open dialog. Returns the chosen path without loading it.
    pub fn pick_open_path(&mut self) -> Option<PathBuf> {
        let path = self
            .dialog()
            .set_title("Select PNG file")
            .add_filter("PNG", &["png"])
            .add_filter("Images", OPEN_EXTENSIONS)
            .add_filter("All Files", &["*"])
            .pick_file()?;
        self.remember(&path);
        Some(path)
    }

    /// Show the Save As dialog, pre-filled with `suggested_name`.
    pub fn pick_save_path(&mut self, suggested_name: &str) -> Option<PathBuf> {
        let path = self
            .dialog()
            .set_title("Save image as")
            .set_file_name(suggested_name)
            .add_filter("PNG", &["png"])
            .add_filter("Images", SAVE_EXTENSIONS)
            .save_file()?;
        self.remember(&path);
        Some(path)
    }
}
