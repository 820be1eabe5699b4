//! Product catalog loading and prompt-context rendering.
//!
//! The catalog is a UTF-8 text file made of blocks separated by blank lines.
//! Every line of a block starts with one of three labels:
//!
//! ```text
//! Название: Product name
//! Описание: What it is for
//! Изображение: images/product.png
//! ```
//!
//! Unknown lines are ignored. The default parser is lenient: a block keeps
//! whatever labelled fields it has, and only blocks without a single
//! recognized label are dropped. [`Catalog::parse_strict`] rejects such
//! blocks instead.

use std::path::Path;

use crate::error::{CatalogError, CatalogFormatError};

/// Label introducing the product name.
pub const NAME_LABEL: &str = "Название:";
/// Label introducing the product description.
pub const DESCRIPTION_LABEL: &str = "Описание:";
/// Label introducing the product image path.
pub const IMAGE_LABEL: &str = "Изображение:";

/// A single product parsed from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductRecord {
    /// Product name, empty when the block had no name line
    pub name: String,
    /// Product description, empty when the block had no description line
    pub description: String,
    /// Optional path of a product picture
    pub image: Option<String>,
}

impl ProductRecord {
    /// Renders the record as a `"name: description"` line.
    pub fn context_line(&self) -> String {
        format!("{}: {}", self.name, self.description)
    }
}

/// Labelled fields found in one block, before any policy is applied.
#[derive(Default)]
struct RawBlock {
    name: Option<String>,
    description: Option<String>,
    image: Option<String>,
}

impl RawBlock {
    fn is_unlabelled(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.image.is_none()
    }

    fn into_record(self) -> ProductRecord {
        ProductRecord {
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            image: self.image,
        }
    }
}

/// Immutable, ordered list of products.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    records: Vec<ProductRecord>,
}

impl Catalog {
    /// Wraps already-built records.
    pub fn new(records: Vec<ProductRecord>) -> Self {
        Self { records }
    }

    /// Reads and leniently parses a catalog file.
    ///
    /// Only I/O failures are errors; format problems are logged and skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let text = read_catalog(path.as_ref())?;
        Ok(Self::parse(&text))
    }

    /// Reads and strictly parses a catalog file.
    pub fn load_strict(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let text = read_catalog(path.as_ref())?;
        Ok(Self::parse_strict(&text)?)
    }

    /// Lenient parse: partial blocks are kept with missing fields left unset,
    /// blocks without any recognized label are dropped.
    pub fn parse(text: &str) -> Self {
        let mut records = Vec::new();
        for (index, block) in split_blocks(text).into_iter().enumerate() {
            let raw = parse_block(&block);
            if raw.is_unlabelled() {
                log::warn!(
                    "catalog block {} has no recognized labels, skipping",
                    index + 1
                );
                continue;
            }
            if raw.name.is_none() || raw.description.is_none() {
                log::debug!("catalog block {} is missing name or description", index + 1);
            }
            records.push(raw.into_record());
        }
        log::debug!("parsed {} catalog records", records.len());
        Self { records }
    }

    /// Strict parse: every block must carry both a name and a description.
    pub fn parse_strict(text: &str) -> Result<Self, CatalogFormatError> {
        let mut records = Vec::new();
        for (index, block) in split_blocks(text).into_iter().enumerate() {
            let raw = parse_block(&block);
            let missing = match (&raw.name, &raw.description) {
                _ if raw.is_unlabelled() => Some("no recognized labels"),
                (None, _) => Some("missing name"),
                (_, None) => Some("missing description"),
                _ => None,
            };
            if let Some(reason) = missing {
                return Err(CatalogFormatError {
                    block: index + 1,
                    reason: reason.to_string(),
                });
            }
            records.push(raw.into_record());
        }
        Ok(Self { records })
    }

    /// Records in catalog order.
    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Renders every record as `"name: description"`, separated by a blank line.
    pub fn render_context(&self) -> String {
        self.records
            .iter()
            .map(ProductRecord::context_line)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn read_catalog(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Groups non-blank lines into blocks; any whitespace-only line ends a block.
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn parse_block(lines: &[&str]) -> RawBlock {
    let mut raw = RawBlock::default();
    for line in lines {
        let line = line.trim();
        if let Some(value) = line.strip_prefix(NAME_LABEL) {
            raw.name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix(DESCRIPTION_LABEL) {
            raw.description = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix(IMAGE_LABEL) {
            raw.image = Some(value.trim().to_string());
        }
    }
    raw
}
