// ============================================================================
// PIXEL BUFFER: original + current RGBA bytes for one open image
// ============================================================================

use image::RgbaImage;

/// Bytes per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Errors raised when a caller hands the buffer bytes of the wrong shape.
/// These indicate a broken collaborator contract, not bad user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// `len(bytes) != width * height * 4`, or a zero / overflowing dimension.
    InvalidDimensions { width: u32, height: u32, len: usize },
    /// A replacement for the current bytes does not match the loaded size.
    SizeMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::InvalidDimensions { width, height, len } => write!(
                f,
                "invalid dimensions: {}x{} RGBA does not fit {} bytes",
                width, height, len
            ),
            BufferError::SizeMismatch { expected, actual } => write!(
                f,
                "size mismatch: expected {} bytes, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for BufferError {}

/// Byte length of a `width`×`height` RGBA image, or `None` on overflow.
pub fn rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}

/// The in-memory image model.
///
/// `original` is captured once per load and never written again; `current`
/// is what gets displayed and saved, and is always rebuilt from `original`
/// by the edit pipeline.
#[derive(Clone, Debug, Default)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    original: Vec<u8>,
    current: Vec<u8>,
    /// Bumped every time `current` is rebuilt; the display layer compares
    /// this against the generation it last uploaded.
    generation: u64,
}

impl PixelBuffer {
    /// An empty buffer (nothing loaded yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a loaded buffer in one step.
    pub fn from_rgba(bytes: Vec<u8>, width: u32, height: u32) -> Result<Self, BufferError> {
        let mut buffer = Self::new();
        buffer.load(bytes, width, height)?;
        Ok(buffer)
    }

    /// Replace both the original and current bytes with freshly decoded data.
    /// On error nothing is modified.
    pub fn load(&mut self, bytes: Vec<u8>, width: u32, height: u32) -> Result<(), BufferError> {
        let expected = rgba_len(width, height);
        if width == 0 || height == 0 || expected != Some(bytes.len()) {
            return Err(BufferError::InvalidDimensions {
                width,
                height,
                len: bytes.len(),
            });
        }
        self.width = width;
        self.height = height;
        self.current = bytes.clone();
        self.original = bytes;
        self.mark_dirty();
        Ok(())
    }

    /// Discard all edits: `current := copy(original)`.
    pub fn reset(&mut self) {
        self.current.clear();
        self.current.extend_from_slice(&self.original);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_loaded(&self) -> bool {
        !self.original.is_empty()
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    pub fn original(&self) -> &[u8] {
        &self.original
    }

    pub fn current(&self) -> &[u8] {
        &self.current
    }

    /// Mutable view for the pipeline stages. Length can't change through a slice.
    pub(crate) fn current_mut(&mut self) -> &mut [u8] {
        &mut self.current
    }

    /// Replace the current bytes wholesale.
    pub fn set_current(&mut self, bytes: Vec<u8>) -> Result<(), BufferError> {
        if bytes.len() != self.original.len() {
            return Err(BufferError::SizeMismatch {
                expected: self.original.len(),
                actual: bytes.len(),
            });
        }
        self.current = bytes;
        self.mark_dirty();
        Ok(())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mark_dirty(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Copy the current bytes into an `RgbaImage` for encoders that want one.
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.current.clone())
    }

    /// Panics if the length invariant has been broken.
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(
            self.current.len(),
            self.original.len(),
            "current/original length diverged"
        );
        assert_eq!(
            Some(self.original.len()),
            rgba_len(self.width, self.height),
            "buffer length does not match {}x{}",
            self.width,
            self.height
        );
    }
}
