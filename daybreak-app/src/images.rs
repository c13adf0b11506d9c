//! Random image selection for the morning post.

use rand::seq::SliceRandom;
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions the picker will attach, compared case-insensitively.
const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// One image chosen for upload.
#[derive(Debug, Clone)]
pub struct PickedImage {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: &'static str,
}

pub struct ImagePicker {
    dir: PathBuf,
}

impl ImagePicker {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Choose one image uniformly at random, or `None` when the directory is
    /// missing or holds nothing attachable. Both cases only warn: a morning
    /// post without a picture still goes out.
    pub fn pick(&self) -> Option<PickedImage> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(dir = %self.dir.display(), error = %err, "image directory unavailable");
                return None;
            }
        };

        let candidates: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_image(p))
            .collect();

        if candidates.is_empty() {
            tracing::warn!(dir = %self.dir.display(), "no images to attach");
            return None;
        }

        let path = candidates.choose(&mut rand::thread_rng())?.clone();
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        let content_type = content_type_for(&path);
        tracing::debug!(file = %file_name, of = candidates.len(), "picked image");
        Some(PickedImage {
            path,
            file_name,
            content_type,
        })
    }
}

fn is_image(path: &Path) -> bool {
    extension_lower(path)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Content type for the upload PUT, inferred from the extension.
pub fn content_type_for(path: &Path) -> &'static str {
    match extension_lower(path).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

fn extension_lower(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) {
        fs::write(dir.path().join(name), b"x").unwrap();
    }

    #[test]
    fn picks_only_recognised_image_files() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp, "sunrise.png");
        touch(&tmp, "notes.txt");
        touch(&tmp, "chart.JPG");
        touch(&tmp, "script.sh");

        let picker = ImagePicker::new(tmp.path());
        for _ in 0..20 {
            let picked = picker.pick().expect("two valid candidates");
            assert!(
                matches!(picked.file_name.as_str(), "sunrise.png" | "chart.JPG"),
                "picked {}",
                picked.file_name
            );
        }
    }

    #[test]
    fn missing_dir_and_empty_dir_yield_none() {
        let tmp = TempDir::new().unwrap();
        assert!(ImagePicker::new(tmp.path().join("nope")).pick().is_none());

        touch(&tmp, "readme.md");
        assert!(ImagePicker::new(tmp.path()).pick().is_none());
    }

    #[test]
    fn content_types_follow_extensions() {
        assert_eq!(content_type_for(Path::new("a.png")), "image/png");
        assert_eq!(content_type_for(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("a.JPEG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("a.gif")), "image/gif");
        assert_eq!(
            content_type_for(Path::new("a.webp")),
            "application/octet-stream"
        );
    }
}
