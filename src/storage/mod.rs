// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use crate::extractors::ParsedDocument;
use crate::render::to_markdown;
use crate::utils::error::StorageError;
use std::io::Write;

/// Paths of the files written for one document.
#[derive(Debug, Clone)]
pub struct SavedDocument {
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
    pub metadata_path: PathBuf,
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Saves the document as JSON, Markdown and a metadata file, all named after `slug`.
    pub fn save_document(&self, document: &ParsedDocument, slug: &str) -> Result<SavedDocument, StorageError> {
        Ok(SavedDocument {
            json_path: self.save_json(document, slug)?,
            markdown_path: self.save_markdown(document, slug)?,
            metadata_path: self.save_metadata(document, slug)?,
        })
    }

    /// Saves the parsed document as pretty JSON
    pub fn save_json(&self, document: &ParsedDocument, slug: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}.json", slug));

        let json = serde_json::to_string_pretty(document)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, json)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved document JSON to {}", file_path.display());

        Ok(file_path)
    }

    /// Saves the Markdown knowledge card
    pub fn save_markdown(&self, document: &ParsedDocument, slug: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}.md", slug));

        let mut file = fs::File::create(&file_path)
            .map_err(StorageError::IoError)?;

        file.write_all(to_markdown(document).as_bytes())
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved Markdown card to {}", file_path.display());

        Ok(file_path)
    }

    /// Saves metadata about the document in JSON format
    pub fn save_metadata(&self, document: &ParsedDocument, slug: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_meta.json", slug));

        let metadata = serde_json::json!({
            "name": document.name,
            "date": document.basic_info.date,
            "discussion_count": document.discussions.len(),
            "tutorial_count": document.tutorials.len(),
            "quote_count": document.quotes.len(),
            "ranking_count": document.talkative_ranking.len(),
            "has_chart": crate::extractors::document_chart(document).is_some(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }
}

/// File-name stem for a document: its name with path separators and other
/// awkward characters replaced, plus the report date when there is one.
pub fn document_slug(document: &ParsedDocument) -> String {
    let mut slug: String = document
        .name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if slug.trim_matches('_').is_empty() {
        slug = "document".to_string();
    }
    let date = document.basic_info.date.trim();
    if !date.is_empty() && date.chars().all(|c| c.is_ascii_digit() || c == '-') {
        slug.push('_');
        slug.push_str(date);
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::parse;
    use tempfile::TempDir;

    #[test]
    fn test_save_document_writes_three_files() {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::new(dir.path().join("nested/out")).unwrap();
        let doc = parse("<title>日报</title><quotes>金句：好 金句来源：甲</quotes>");

        let saved = storage.save_document(&doc, "daily").unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&saved.json_path).unwrap()).unwrap();
        assert_eq!(json["name"], "日报");
        assert_eq!(json["quotes"][0]["source"], "甲");

        let md = fs::read_to_string(&saved.markdown_path).unwrap();
        assert!(md.starts_with("# 日报"));

        let meta: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&saved.metadata_path).unwrap()).unwrap();
        assert_eq!(meta["quote_count"], 1);
        assert_eq!(meta["has_chart"], false);
        assert!(saved.metadata_path.ends_with("daily_meta.json"));
    }

    #[test]
    fn test_document_slug() {
        let mut doc = parse("<title>社群 / 日报</title><basic info>日期：2024-03-15</basic info>");
        assert_eq!(document_slug(&doc), "社群___日报_2024-03-15");
        doc.basic_info.date = "未知".to_string();
        assert_eq!(document_slug(&doc), "社群___日报");
        doc.name = "///".to_string();
        assert_eq!(document_slug(&doc), "document");
    }
}
