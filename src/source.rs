// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Photo sources for the command-line front end.
//!
//! A source is a single image file, a directory of images, or a `dir/*.ext`
//! pattern. Paths are visited in sorted order so repeated runs submit photos
//! in the same sequence, which matters because the fallback rotation depends
//! on call order.

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{HealifyError, Result};

/// Represents the photos to classify.
#[derive(Debug, Clone)]
pub enum Source {
    /// Path to an image file.
    Image(PathBuf),
    /// Directory containing images.
    Directory(PathBuf),
    /// Glob pattern for images.
    Glob(String),
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        if s.contains('*') {
            return Self::Glob(s.to_string());
        }

        let path = PathBuf::from(s);
        if path.is_dir() {
            return Self::Directory(path);
        }

        Self::Image(path)
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::from(path.to_string_lossy().as_ref())
    }
}

/// Where a photo came from.
#[derive(Debug, Clone)]
pub struct SourceMeta {
    /// Position within the source.
    pub index: usize,
    /// Number of photos in the source.
    pub total: usize,
    /// File path.
    pub path: String,
}

/// Iterator over the photos of a source.
///
/// Paths are resolved up front; each image is decoded lazily when reached, so a
/// corrupt file only fails its own item.
pub struct SourceIterator {
    current: usize,
    image_paths: Vec<PathBuf>,
}

impl SourceIterator {
    /// Create a new source iterator.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or pattern cannot be listed.
    pub fn new(source: Source) -> Result<Self> {
        let image_paths = match source {
            Source::Directory(path) => collect_images_from_dir(&path)?,
            Source::Glob(pattern) => collect_images_from_glob(&pattern)?,
            Source::Image(path) => vec![path],
        };

        Ok(Self {
            current: 0,
            image_paths,
        })
    }

    /// Number of photos the iterator yields in total.
    #[must_use]
    pub fn total(&self) -> usize {
        self.image_paths.len()
    }
}

impl Iterator for SourceIterator {
    type Item = Result<(DynamicImage, SourceMeta)>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.image_paths.get(self.current)?;
        let meta = SourceMeta {
            index: self.current,
            total: self.image_paths.len(),
            path: path.to_string_lossy().into_owned(),
        };
        self.current += 1;

        Some(
            image::open(path)
                .map(|img| (img, meta))
                .map_err(|e| HealifyError::ImageError(format!("Failed to load {}: {e}", path.display()))),
        )
    }
}

fn collect_images_from_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(HealifyError::ImageError(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_image_file(path))
        .collect();

    paths.sort();
    Ok(paths)
}

/// Supports `dir/*` and `dir/*.ext` patterns.
fn collect_images_from_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let Some(star_pos) = pattern.find('*') else {
        return Ok(vec![PathBuf::from(pattern)]);
    };

    let dir_part = &pattern[..star_pos];
    let dir = if dir_part.is_empty() {
        Path::new(".")
    } else {
        Path::new(dir_part.trim_end_matches(['/', '\\']))
    };

    let ext_filter: Option<String> = pattern[star_pos..]
        .strip_prefix("*.")
        .map(str::to_lowercase);

    if !dir.is_dir() {
        return Err(HealifyError::ImageError(format!(
            "Directory not found: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            ext_filter.as_ref().map_or_else(
                || is_image_file(path),
                |ext| {
                    path.extension()
                        .is_some_and(|e| e.to_string_lossy().to_lowercase() == *ext)
                },
            )
        })
        .collect();

    paths.sort();
    Ok(paths)
}

fn is_image_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy().to_lowercase();
        matches!(
            ext.as_str(),
            "jpg" | "jpeg" | "png" | "bmp" | "gif" | "webp" | "tiff" | "tif"
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str) {
        RgbImage::from_pixel(4, 4, Rgb([0, 128, 0]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_source_from_string() {
        assert!(matches!(Source::from("leaf.jpg"), Source::Image(_)));
        assert!(matches!(Source::from("photos/*.jpg"), Source::Glob(_)));

        let tmp = TempDir::new().unwrap();
        assert!(matches!(Source::from(tmp.path().to_path_buf()), Source::Directory(_)));
    }

    #[test]
    fn test_directory_sorted_images_only() {
        let tmp = TempDir::new().unwrap();
        write_png(tmp.path(), "b.png");
        write_png(tmp.path(), "a.png");
        std::fs::write(tmp.path().join("notes.txt"), b"not an image").unwrap();

        let iter = SourceIterator::new(Source::Directory(tmp.path().to_path_buf())).unwrap();
        assert_eq!(iter.total(), 2);

        let names: Vec<String> = iter
            .map(|item| item.unwrap().1.path)
            .map(|p| Path::new(&p).file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.png", "b.png"]);
    }

    #[test]
    fn test_glob_extension_filter() {
        let tmp = TempDir::new().unwrap();
        write_png(tmp.path(), "leaf.png");
        write_png(tmp.path(), "other.bmp");

        let pattern = format!("{}/*.png", tmp.path().display());
        let iter = SourceIterator::new(Source::from(pattern.as_str())).unwrap();
        assert_eq!(iter.total(), 1);
    }

    #[test]
    fn test_missing_directory() {
        assert!(SourceIterator::new(Source::Glob("/nonexistent/dir/*.jpg".to_string())).is_err());
        assert!(SourceIterator::new(Source::Directory(PathBuf::from("/nonexistent/dir"))).is_err());
    }

    #[test]
    fn test_unreadable_image_fails_its_item() {
        let iter = SourceIterator::new(Source::Image(PathBuf::from("/nonexistent/leaf.jpg"))).unwrap();
        let items: Vec<_> = iter.collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(HealifyError::ImageError(_))));
    }
}
