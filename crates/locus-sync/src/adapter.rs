//! Item adapter: pure mapping from heterogeneous source shapes into the
//! canonical [`NormalizedItem`] the reconciler understands.

use std::fs;
use std::path::Path;

use serde_json::Value as JsonValue;

use locus_core::{AuthorName, ContentKind, Error, NormalizedItem, Result};

use crate::remote::RemoteItem;

/// Normalize a raw remote library item.
///
/// Attachment items become [`ContentKind::ZoteroAttachment`] rows with a
/// synthesized summary and no authors; everything else becomes a
/// [`ContentKind::ZoteroEntry`]. Missing optional fields map to `None`,
/// never to an error — creation-time validation catches required fields.
pub fn normalize_library_item(item: &RemoteItem) -> NormalizedItem {
    let data = &item.data;
    let item_type = data
        .get("itemType")
        .and_then(JsonValue::as_str)
        .unwrap_or_default();
    let title = data
        .get("title")
        .and_then(JsonValue::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let (kind, summary, authors, filename) = if item_type == "attachment" {
        (
            ContentKind::ZoteroAttachment,
            Some(format!(
                "attachment for {}",
                title.as_deref().unwrap_or_default()
            )),
            Vec::new(),
            data.get("filename")
                .and_then(JsonValue::as_str)
                .map(str::to_string),
        )
    } else {
        (
            ContentKind::ZoteroEntry,
            data.get("abstractNote")
                .and_then(JsonValue::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            parse_creators(data.get("creators")),
            None,
        )
    };

    let tags = data
        .get("tags")
        .and_then(JsonValue::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t.get("tag").and_then(JsonValue::as_str))
                .collect::<Vec<_>>()
                .join(",")
        })
        .filter(|joined| !joined.is_empty());

    // Keep the raw payload, with the API link objects folded in, as the
    // opaque metadata blob.
    let mut metadata = data.clone();
    if let Some(obj) = metadata.as_object_mut() {
        obj.insert("links".to_string(), item.links.clone());
    }

    NormalizedItem {
        id: None,
        zotero_key: Some(item.key.clone()),
        zotero_version: Some(item.version),
        title,
        kind: Some(kind),
        metadata: Some(metadata),
        filename,
        summary,
        tags,
        deleted: Some(false),
        authors,
        related_ids: Vec::new(),
    }
}

/// Parse a creators list, tolerating a single combined `name` field by
/// splitting on the first whitespace.
fn parse_creators(creators: Option<&JsonValue>) -> Vec<AuthorName> {
    let Some(creators) = creators.and_then(JsonValue::as_array) else {
        return Vec::new();
    };

    creators
        .iter()
        .filter_map(|creator| {
            let first = creator.get("firstName").and_then(JsonValue::as_str);
            let last = creator.get("lastName").and_then(JsonValue::as_str);
            if let (Some(first), Some(last)) = (first, last) {
                return Some(AuthorName {
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                });
            }
            let name = creator.get("name").and_then(JsonValue::as_str)?;
            let (first, last) = name.split_once(char::is_whitespace)?;
            Some(AuthorName {
                first_name: first.to_string(),
                last_name: last.trim_start().to_string(),
            })
        })
        .collect()
}

/// Reduce a candidate filename to a single path component.
///
/// Titles and remote attachment names feed directly into paths under the
/// files dir; separators and parent-dir hops must not escape it. The read
/// side rejects such names outright, so anything written here has to pass
/// the same shape.
pub(crate) fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if std::path::is_separator(c) { '_' } else { c })
        .collect::<String>()
        .replace("..", "_")
}

/// Storage format for locally authored rich-text documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFormat {
    /// Rendered HTML payload.
    Html,
    /// Raw editor delta payload.
    Delta,
}

impl StorageFormat {
    fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Delta => "delta",
        }
    }
}

/// A locally authored document (note, summary) as submitted by the editor.
#[derive(Debug, Clone, Default)]
pub struct LocalDocument {
    pub id: Option<i64>,
    pub kind: Option<ContentKind>,
    pub title: String,
    /// Rendered HTML body.
    pub content: Option<String>,
    /// Editor delta source.
    pub delta: Option<String>,
    pub tags: Vec<String>,
    pub authors: Vec<AuthorName>,
}

/// Normalize a locally authored document.
///
/// Unlike remote items, a document missing its content payload is a hard
/// input-validation error. When a storage directory is given, the payload
/// in the chosen format is written there and the derived filename recorded.
pub fn normalize_document(
    doc: &LocalDocument,
    storage: Option<(&Path, StorageFormat)>,
) -> Result<NormalizedItem> {
    let filename = match storage {
        Some((dir, format)) => {
            let payload = match format {
                StorageFormat::Html => doc.content.as_deref(),
                StorageFormat::Delta => doc.delta.as_deref(),
            }
            .ok_or_else(|| {
                Error::Validation(format!(
                    "document '{}' is missing its content payload",
                    doc.title
                ))
            })?;

            let filename = sanitize_filename(&format!(
                "{}.{}",
                doc.title.replace(' ', "_"),
                format.extension()
            ));
            fs::write(dir.join(&filename), payload)?;
            Some(filename)
        }
        None => {
            if doc.content.is_none() && doc.delta.is_none() {
                return Err(Error::Validation(format!(
                    "document '{}' is missing its content payload",
                    doc.title
                )));
            }
            None
        }
    };

    let tags = if doc.tags.is_empty() {
        None
    } else {
        Some(doc.tags.join(","))
    };

    Ok(NormalizedItem {
        id: doc.id,
        zotero_key: None,
        zotero_version: None,
        title: Some(doc.title.clone()),
        kind: Some(doc.kind.unwrap_or(ContentKind::Note)),
        metadata: doc.delta.clone().map(JsonValue::String),
        filename,
        summary: None,
        tags,
        deleted: Some(false),
        authors: doc.authors.clone(),
        related_ids: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(data: JsonValue) -> RemoteItem {
        RemoteItem {
            key: "ABCD1234".to_string(),
            version: 17,
            data,
            links: json!({"self": {"href": "https://example.test/items/ABCD1234"}}),
        }
    }

    #[test]
    fn test_normalize_entry_with_creators_and_tags() {
        let item = entry(json!({
            "itemType": "journalArticle",
            "title": "Research through Design",
            "abstractNote": "A model for interaction design research.",
            "creators": [
                {"creatorType": "author", "firstName": "John", "lastName": "Zimmerman"},
                {"creatorType": "author", "name": "Jodi Forlizzi"}
            ],
            "tags": [{"tag": "hci"}, {"tag": "design"}]
        }));

        let normalized = normalize_library_item(&item);
        assert_eq!(normalized.kind, Some(ContentKind::ZoteroEntry));
        assert_eq!(normalized.zotero_key.as_deref(), Some("ABCD1234"));
        assert_eq!(normalized.zotero_version, Some(17));
        assert_eq!(normalized.title.as_deref(), Some("Research through Design"));
        assert_eq!(
            normalized.summary.as_deref(),
            Some("A model for interaction design research.")
        );
        assert_eq!(normalized.tags.as_deref(), Some("hci,design"));
        assert_eq!(
            normalized.authors,
            vec![
                AuthorName {
                    first_name: "John".to_string(),
                    last_name: "Zimmerman".to_string()
                },
                AuthorName {
                    first_name: "Jodi".to_string(),
                    last_name: "Forlizzi".to_string()
                },
            ]
        );
        // Links folded into the stored metadata.
        let metadata = normalized.metadata.unwrap();
        assert!(metadata.get("links").is_some());
    }

    #[test]
    fn test_normalize_attachment() {
        let item = entry(json!({
            "itemType": "attachment",
            "title": "Full Text PDF",
            "filename": "paper.pdf",
            "creators": [{"firstName": "Should", "lastName": "BeIgnored"}],
            "tags": []
        }));

        let normalized = normalize_library_item(&item);
        assert_eq!(normalized.kind, Some(ContentKind::ZoteroAttachment));
        assert_eq!(
            normalized.summary.as_deref(),
            Some("attachment for Full Text PDF")
        );
        assert_eq!(normalized.filename.as_deref(), Some("paper.pdf"));
        assert!(normalized.authors.is_empty());
        assert!(normalized.tags.is_none());
    }

    #[test]
    fn test_normalize_tolerates_missing_fields() {
        let normalized = normalize_library_item(&entry(json!({"itemType": "book"})));
        assert!(normalized.title.is_none());
        assert!(normalized.summary.is_none());
        assert!(normalized.tags.is_none());
        assert!(normalized.authors.is_empty());
    }

    #[test]
    fn test_combined_name_splits_on_first_whitespace() {
        let authors = parse_creators(Some(&json!([
            {"name": "Ludwig van Beethoven"},
            {"name": "Mononym"}
        ])));
        assert_eq!(
            authors,
            vec![AuthorName {
                first_name: "Ludwig".to_string(),
                last_name: "van Beethoven".to_string()
            }]
        );
    }

    #[test]
    fn test_normalize_document_requires_payload() {
        let doc = LocalDocument {
            title: "My Note".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            normalize_document(&doc, None),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_normalize_document_writes_payload() {
        let dir = tempfile::tempdir().unwrap();
        let doc = LocalDocument {
            kind: Some(ContentKind::Note),
            title: "My Note".to_string(),
            content: Some("<p>hello</p>".to_string()),
            delta: Some("{\"ops\":[]}".to_string()),
            tags: vec!["draft".to_string()],
            ..Default::default()
        };

        let normalized =
            normalize_document(&doc, Some((dir.path(), StorageFormat::Html))).unwrap();
        assert_eq!(normalized.filename.as_deref(), Some("My_Note.html"));
        assert_eq!(normalized.tags.as_deref(), Some("draft"));

        let written = fs::read_to_string(dir.path().join("My_Note.html")).unwrap();
        assert_eq!(written, "<p>hello</p>");
    }

    #[test]
    fn test_document_filename_confined_to_storage_dir() {
        let dir = tempfile::tempdir().unwrap();
        let doc = LocalDocument {
            title: "../escaped".to_string(),
            content: Some("<p>x</p>".to_string()),
            ..Default::default()
        };

        let normalized =
            normalize_document(&doc, Some((dir.path(), StorageFormat::Html))).unwrap();
        let filename = normalized.filename.unwrap();
        assert!(!filename.contains('/') && !filename.contains(".."));
        assert!(dir.path().join(&filename).is_file());
        assert!(!dir.path().join("../escaped.html").exists());
    }
}
