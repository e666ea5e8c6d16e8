use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::canvas::PixelBuffer;
use crate::display::{DisplayError, TextureSink};
use crate::io::{self, LoadError, SaveError};
use crate::ops::pipeline::{self, EditState};

/// Single open image session.
pub struct Document {
    pub id: Uuid,
    pub buffer: PixelBuffer,
    /// Edits currently baked into `buffer.current()`.
    pub edits: EditState,
    /// `None` for images that did not come from a file.
    pub path: Option<PathBuf>,
    pub is_dirty: bool,

    /// Display name (file name, or the name given to `from_rgba`)
    pub name: String,
}

impl Document {
    /// Decode `path` into a new document. All-or-nothing: on error there is
    /// no document, and whatever the caller had open stays as it was.
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let decoded = io::decode(path)?;
        let buffer = PixelBuffer::from_rgba(decoded.rgba, decoded.width, decoded.height)?;
        let id = Uuid::new_v4();
        log_info!(
            "document {} loaded {} ({}x{})",
            id,
            path.display(),
            decoded.width,
            decoded.height
        );
        Ok(Self {
            id,
            buffer,
            edits: EditState::default(),
            path: Some(path.to_path_buf()),
            is_dirty: false,
            name: name_from_path(path),
        })
    }

    /// Wrap already-decoded RGBA bytes.
    pub fn from_rgba(name: &str, width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, LoadError> {
        let buffer = PixelBuffer::from_rgba(rgba, width, height)?;
        Ok(Self {
            id: Uuid::new_v4(),
            buffer,
            edits: EditState::default(),
            path: None,
            is_dirty: false,
            name: name.to_string(),
        })
    }

    /// Store a new edit state (clamped) and rebuild the current bytes.
    /// Returns `false` when nothing changed and no recompute was needed.
    pub fn set_edits(&mut self, edits: EditState) -> bool {
        let edits = edits.clamped();
        if edits == self.edits {
            return false;
        }
        self.edits = edits;
        pipeline::recompute(&mut self.buffer, &self.edits);
        self.is_dirty = true;
        true
    }

    /// Like [`Document::set_edits`], but also pushes the new bytes to the
    /// display once the recompute has finished.
    pub fn apply_edits<S: TextureSink>(
        &mut self,
        edits: EditState,
        sink: &mut S,
        handle: &mut S::Handle,
    ) -> Result<bool, DisplayError> {
        let edits = edits.clamped();
        if edits == self.edits {
            return Ok(false);
        }
        self.edits = edits;
        self.is_dirty = true;
        pipeline::recompute_and_present(&mut self.buffer, &self.edits, sink, handle)?;
        Ok(true)
    }

    /// Drop every edit and go back to the original pixels.
    pub fn reset_edits(&mut self) -> bool {
        self.set_edits(EditState::default())
    }

    /// Overwrite the file this document was opened from.
    pub fn save(&mut self) -> Result<(), SaveError> {
        let path = self.path.clone().ok_or(SaveError::NoPath)?;
        self.write_to(&path)
    }

    /// Write to `path` and adopt it as the document's path.
    pub fn save_as(&mut self, path: &Path) -> Result<(), SaveError> {
        self.write_to(path)?;
        self.path = Some(path.to_path_buf());
        self.name = name_from_path(path);
        Ok(())
    }

    fn write_to(&mut self, path: &Path) -> Result<(), SaveError> {
        io::encode(
            path,
            self.buffer.width(),
            self.buffer.height(),
            self.buffer.current(),
        )?;
        log_info!("document {} saved {} [{}]", self.id, path.display(), self.edits.summary());
        self.is_dirty = false;
        Ok(())
    }

    /// Get the display title (name with dirty indicator)
    pub fn display_title(&self) -> String {
        if self.is_dirty {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Default file name offered by Save As.
    pub fn suggested_file_name(&self) -> String {
        match self.path.as_deref().and_then(|p| p.file_name()) {
            Some(name) => name.to_string_lossy().into_owned(),
            None => format!("{}.png", self.name),
        }
    }
}

fn name_from_path(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::from_rgba("swatch", 1, 1, vec![40, 80, 120, 255]).unwrap()
    }

    #[test]
    fn from_rgba_validates_length() {
        assert!(matches!(
            Document::from_rgba("bad", 2, 2, vec![0; 4]),
            Err(LoadError::Buffer(_))
        ));
    }

    #[test]
    fn set_edits_recomputes_and_marks_dirty() {
        let mut d = doc();
        assert!(d.set_edits(EditState { invert: true, ..Default::default() }));
        assert_eq!(d.buffer.current(), &[215, 175, 135, 255]);
        assert!(d.is_dirty);
        assert_eq!(d.display_title(), "swatch*");
    }

    #[test]
    fn unchanged_edits_skip_recompute() {
        let mut d = doc();
        let gen_before = d.buffer.generation();
        assert!(!d.set_edits(EditState::default()));
        assert_eq!(d.buffer.generation(), gen_before);
    }

    #[test]
    fn set_edits_clamps_parameters() {
        let mut d = doc();
        d.set_edits(EditState { red_scale: 3.0, ..Default::default() });
        assert_eq!(d.edits.red_scale, 1.0);
        assert!(!d.is_dirty);
    }

    #[test]
    fn reset_restores_original() {
        let mut d = doc();
        d.set_edits(EditState { grayscale: true, ..Default::default() });
        assert!(d.reset_edits());
        assert_eq!(d.buffer.current(), d.buffer.original());
        assert!(!d.reset_edits());
    }

    #[test]
    fn save_without_path_fails_cleanly() {
        let mut d = doc();
        d.set_edits(EditState { invert: true, ..Default::default() });
        assert!(matches!(d.save(), Err(SaveError::NoPath)));
        assert!(d.is_dirty);
        assert_eq!(d.suggested_file_name(), "swatch.png");
    }
}
