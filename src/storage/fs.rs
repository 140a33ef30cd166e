//! Filesystem vault
//!
//! The bundled storage implementation: a directory of markdown documents,
//! with food files in a configured subfolder. Documents are read and written
//! whole; food files carry their nutrition in a `---`-delimited frontmatter.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::models::{FoodFile, Nutrition};
use crate::storage::{Document, DocumentStore, FoodFileSource, StorageError};

/// A vault rooted at a directory
pub struct FsVault {
    root: PathBuf,
    food_folder: String,
}

impl FsVault {
    pub fn new<P: Into<PathBuf>>(root: P, food_folder: String) -> Self {
        Self {
            root: root.into(),
            food_folder,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

#[async_trait]
impl DocumentStore for FsVault {
    async fn list_documents(&self) -> Result<Vec<Document>, StorageError> {
        let mut paths = Vec::new();
        collect_markdown_files(&self.root, &self.root, &mut paths)?;
        paths.sort();
        Ok(paths.into_iter().map(Document::new).collect())
    }

    async fn read(&self, doc: &Document) -> Result<String, StorageError> {
        let path = self.absolute(&doc.path);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::DocumentNotFound(doc.path.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, doc: &Document, text: &str) -> Result<(), StorageError> {
        let path = self.absolute(&doc.path);
        tokio::fs::write(&path, text).await?;
        Ok(())
    }
}

#[async_trait]
impl FoodFileSource for FsVault {
    async fn food_files(&self) -> Result<Vec<FoodFile>, StorageError> {
        let folder = self.root.join(&self.food_folder);
        let mut entries = match std::fs::read_dir(&folder) {
            Ok(entries) => entries.filter_map(Result::ok).collect::<Vec<_>>(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Food folder {} does not exist yet", folder.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        entries.sort_by_key(|e| e.file_name());

        let mut foods = Vec::new();
        for entry in entries {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let text = tokio::fs::read_to_string(&path).await?;
            if let Some(food) = parse_food_file(name, &text) {
                foods.push(food);
            } else {
                tracing::debug!("Skipping {}: no nutrition frontmatter", path.display());
            }
        }
        Ok(foods)
    }
}

/// Walk a directory tree collecting vault-relative markdown paths.
///
/// Dot-prefixed files and directories are skipped.
fn collect_markdown_files(
    root: &Path,
    dir: &Path,
    out: &mut Vec<String>,
) -> Result<(), std::io::Error> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            collect_markdown_files(root, &path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("md") {
            if let Ok(rel) = path.strip_prefix(root) {
                out.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    Ok(())
}

/// Parse a food file's frontmatter into a record.
///
/// Recognized keys: `calories`, `protein`, `fat`, `carbs`, `serving` (grams,
/// trailing `g` allowed). Unknown keys and malformed values are ignored.
/// Returns None when the file has no frontmatter at all.
pub fn parse_food_file(name: &str, text: &str) -> Option<FoodFile> {
    let mut lines = text.lines();
    if lines.next()?.trim() != "---" {
        return None;
    }

    let mut nutrition = Nutrition::zero();
    let mut serving_grams = None;
    for line in lines {
        if line.trim() == "---" {
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let Some(value) = parse_grams_value(value) else {
            continue;
        };
        match key.trim().to_lowercase().as_str() {
            "calories" => nutrition.calories = value,
            "protein" => nutrition.protein = value,
            "carbs" => nutrition.carbs = value,
            "fat" => nutrition.fat = value,
            "serving" => serving_grams = Some(value),
            _ => {}
        }
    }

    Some(FoodFile {
        name: name.to_string(),
        serving_grams,
        nutrition,
    })
}

fn parse_grams_value(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value
        .strip_suffix('g')
        .or_else(|| value.strip_suffix('G'))
        .unwrap_or(value)
        .trim();
    number.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_food_file() {
        let text = "---\ncalories: 165\nprotein: 31\nfat: 3.6\ncarbs: 0\nserving: 120g\n---\n\nGrilled, skinless.\n";
        let food = parse_food_file("Chicken Breast", text).expect("frontmatter should parse");
        assert_eq!(food.name, "Chicken Breast");
        assert_eq!(food.serving_grams, Some(120.0));
        assert_eq!(food.nutrition.calories, 165.0);
        assert_eq!(food.nutrition.fat, 3.6);
    }

    #[test]
    fn test_unknown_keys_and_malformed_values_are_ignored() {
        let text = "---\ncalories: abc\nprotein: 10\ncolor: green\n---\n";
        let food = parse_food_file("Thing", text).expect("frontmatter should parse");
        assert_eq!(food.nutrition.calories, 0.0);
        assert_eq!(food.nutrition.protein, 10.0);
    }

    #[test]
    fn test_no_frontmatter_is_not_a_food_file() {
        assert!(parse_food_file("Note", "just some text").is_none());
        assert!(parse_food_file("Empty", "").is_none());
    }
}
