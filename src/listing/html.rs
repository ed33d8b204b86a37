//! HTML fallback listing backend.
//!
//! Fetches a directory's rendered listing page and extracts entries from
//! the fallback table. Extraction is driven by a declarative row schema,
//! one selector per column role, so the page structure lives in one place
//! instead of being spread through tree-walking code.
//!
//! Unlike the JSON API, the size column is a display string. A bare number
//! is a byte count; a rounded `"… KB"` value has no exact byte equivalent
//! and maps to an unknown size, which downgrades that entry to
//! always-re-download. The two encodings are never conflated.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::{DirectoryLister, Entry, EntryKind, ListingError};
use crate::download::HttpClient;

/// Lister backed by the index server's rendered fallback table.
#[derive(Debug, Clone)]
pub struct HtmlIndexLister {
    http: HttpClient,
    host: Url,
}

impl HtmlIndexLister {
    /// Creates a lister fetching listing pages from `host` (the index URL
    /// with path cleared).
    #[must_use]
    pub fn new(http: HttpClient, host: Url) -> Self {
        Self { http, host }
    }
}

/// Roles a listing-table column can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnRole {
    /// Type classifier (folder, file, parent link).
    Kind,
    /// Server-relative path of the entry.
    Href,
    /// Human-readable modification date.
    Modified,
    /// Display size string.
    Size,
}

/// One column of the row schema: where to look and what to take.
struct Column {
    role: ColumnRole,
    selector: Selector,
    /// Attribute to read from the selected element; `None` takes its text.
    attribute: Option<&'static str>,
}

impl Column {
    #[allow(clippy::expect_used)]
    fn new(role: ColumnRole, selector: &'static str, attribute: Option<&'static str>) -> Self {
        Self {
            role,
            selector: Selector::parse(selector).expect("static selector is valid"),
            attribute,
        }
    }

    fn extract(&self, row: ElementRef<'_>) -> Option<String> {
        let element = row.select(&self.selector).next()?;
        match self.attribute {
            Some(name) => element.value().attr(name).map(str::to_owned),
            None => {
                let text: String = element.text().collect();
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_owned())
            }
        }
    }
}

/// Declarative schema for the fallback listing table.
struct RowSchema {
    rows: Selector,
    columns: Vec<Column>,
}

impl RowSchema {
    /// Schema for the fallback table: icon alt text classifies the row,
    /// the name cell's link carries the href, and date/size cells carry
    /// display text.
    #[allow(clippy::expect_used)]
    fn fallback_table() -> Self {
        Self {
            rows: Selector::parse("table tr").expect("static selector is valid"),
            columns: vec![
                Column::new(ColumnRole::Kind, "td.fb-i img", Some("alt")),
                Column::new(ColumnRole::Href, "td.fb-n a", Some("href")),
                Column::new(ColumnRole::Modified, "td.fb-d", None),
                Column::new(ColumnRole::Size, "td.fb-s", None),
            ],
        }
    }

    fn column(&self, role: ColumnRole) -> Option<&Column> {
        self.columns.iter().find(|column| column.role == role)
    }

    /// Extracts entries from a listing page; rows without an href cell
    /// (headers, decorations) are skipped.
    fn extract_entries(&self, body: &str) -> Vec<Entry> {
        let document = Html::parse_document(body);
        let mut entries = Vec::new();

        for row in document.select(&self.rows) {
            let Some(href) = self
                .column(ColumnRole::Href)
                .and_then(|column| column.extract(row))
            else {
                continue;
            };

            let kind_label = self
                .column(ColumnRole::Kind)
                .and_then(|column| column.extract(row));
            let kind = classify_row(kind_label.as_deref(), &href);

            let size = self
                .column(ColumnRole::Size)
                .and_then(|column| column.extract(row))
                .as_deref()
                .and_then(parse_size_cell);

            if let Some(date) = self
                .column(ColumnRole::Modified)
                .and_then(|column| column.extract(row))
            {
                debug!(href = %href, date = %date, "listed row");
            }

            entries.push(Entry {
                href,
                kind,
                size,
                // The date cell is a display string, not a machine
                // timestamp; verification only uses sizes.
                modified: None,
            });
        }

        entries
    }
}

/// Classifies a row from its icon label, falling back to the href shape.
fn classify_row(kind_label: Option<&str>, href: &str) -> EntryKind {
    match kind_label {
        Some(label) if label.contains("folder-parent") => EntryKind::Parent,
        Some(label) if label.contains("folder") => EntryKind::Directory,
        Some(_) => EntryKind::File,
        None if href.ends_with('/') => EntryKind::Directory,
        None => EntryKind::File,
    }
}

/// Parses a size cell into an exact byte count when one is present.
///
/// Rounded display values (`"7 KB"`) carry no exact byte count and map to
/// `None` rather than being multiplied out.
fn parse_size_cell(text: &str) -> Option<u64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    trimmed.parse::<u64>().ok()
}

#[async_trait]
impl DirectoryLister for HtmlIndexLister {
    async fn list(&self, dir: &str) -> Result<Vec<Entry>, ListingError> {
        let mut url = self.host.clone();
        url.set_path(dir);

        let response = self
            .http
            .inner()
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ListingError::network(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ListingError::status(url.as_str(), status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ListingError::decode(url.as_str(), e))?;

        let entries = RowSchema::fallback_table().extract_entries(&body);
        debug!(dir = %dir, entries = entries.len(), "listed directory");
        Ok(entries)
    }
}
