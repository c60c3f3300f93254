use std::io::Cursor;

use crate::http::request::FileRef;

/// Where a drag-and-drop gesture was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Inside the form's boundary
    Form,
    /// Anywhere else on the page
    Outside,
}

/// Preview of a selected file.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub source: FileRef,
    pub size: u64,
    /// Pixel size, when the bytes decode as an image
    pub dimensions: Option<(u32, u32)>,
}

impl Preview {
    pub fn render(file: &FileRef) -> Self {
        Self {
            source: file.clone(),
            size: file.len(),
            dimensions: image_dimensions(file),
        }
    }

    pub fn describe(&self) -> String {
        match self.dimensions {
            Some((w, h)) => format!("{} ({}x{}, {} bytes)", self.source.name, w, h, self.size),
            None => format!("{} ({} bytes)", self.source.name, self.size),
        }
    }
}

fn image_dimensions(file: &FileRef) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(&file.bytes()[..]))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// One `<input type=file>` slot of a form, with its preview.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInput {
    slot: String,
    file: Option<FileRef>,
    preview: Option<Preview>,
}

impl FileInput {
    pub fn new(slot: &str) -> Self {
        Self {
            slot: slot.to_string(),
            file: None,
            preview: None,
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn file(&self) -> Option<&FileRef> {
        self.file.as_ref()
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    /// Manual selection. Single-file input: only the first file is kept.
    /// An empty selection leaves the input unchanged.
    pub fn select(&mut self, files: Vec<FileRef>) -> bool {
        match files.into_iter().next() {
            Some(file) => {
                self.set(file);
                true
            }
            None => false,
        }
    }

    fn set(&mut self, file: FileRef) {
        // The new preview replaces the old one outright.
        self.preview = Some(Preview::render(&file));
        self.file = Some(file);
    }

    pub fn clear(&mut self) {
        self.file = None;
        self.preview = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_replaces_previous_preview() {
        let mut input = FileInput::new("image");
        input.select(vec![FileRef::new("a.png", b"aaaa".to_vec())]);
        input.select(vec![FileRef::new("b.png", b"bb".to_vec())]);

        let preview = input.preview().unwrap();
        assert_eq!(preview.source.name, "b.png");
        assert_eq!(preview.size, 2);
        assert_eq!(preview.dimensions, None);
    }

    #[test]
    fn empty_selection_is_ignored() {
        let mut input = FileInput::new("image");
        input.select(vec![FileRef::new("a.png", b"aaaa".to_vec())]);
        assert!(!input.select(vec![]));
        assert_eq!(input.file().unwrap().name, "a.png");
    }
}
