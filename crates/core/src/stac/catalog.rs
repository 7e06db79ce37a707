//! Catalog and collection documents, plus the local record pair written
//! at the end of a run.
//!
//! Remote documents are regenerated with a merge: an existing copy keeps
//! its links and the new entry is appended only if absent, so repeated
//! runs converge to the same link structure.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;

use super::types::StacItem;

/// Order extension schema URL carried in `stac_extensions`.
pub const ORDER_EXTENSION_URL: &str =
    "https://stac-extensions.github.io/order/v1.1.0/schema.json";

const STAC_VERSION: &str = "1.0.0";

/// A STAC link object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            media_type: None,
            title: None,
        }
    }

    fn json(rel: &str, href: impl Into<String>) -> Self {
        Self {
            rel: rel.to_string(),
            href: href.into(),
            media_type: Some("application/json".to_string()),
            title: None,
        }
    }
}

/// Root catalog document listing collections as child links.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    #[serde(rename = "type")]
    pub catalog_type: String,
    pub stac_version: String,
    pub id: String,
    pub description: String,
    pub links: Vec<Link>,
}

/// Per-collection document listing delivered items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionDoc {
    #[serde(rename = "type")]
    pub collection_type: String,
    pub stac_version: String,
    pub id: String,
    pub description: String,
    pub license: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<Value>,
    pub links: Vec<Link>,
}

fn push_link_once(links: &mut Vec<Link>, link: Link) {
    if !links.iter().any(|l| l.rel == link.rel && l.href == link.href) {
        links.push(link);
    }
}

/// Merges a child link for `collection_id` into the root catalog,
/// creating the catalog when none exists yet.
pub fn regenerate_catalog(existing: Option<Catalog>, collection_id: &str) -> Catalog {
    let mut catalog = existing.unwrap_or_else(|| Catalog {
        catalog_type: "Catalog".to_string(),
        stac_version: STAC_VERSION.to_string(),
        id: "catalog".to_string(),
        description: "Root catalog".to_string(),
        links: vec![
            Link::json("root", "./catalog.json"),
            Link::json("self", "./catalog.json"),
        ],
    });
    push_link_once(
        &mut catalog.links,
        Link::json("child", format!("./{collection_id}/collection.json")),
    );
    catalog
}

/// Merges an item link for `item_key` into the collection document,
/// creating the document when none exists yet.
pub fn regenerate_collection(
    existing: Option<CollectionDoc>,
    collection_id: &str,
    item_key: &str,
) -> CollectionDoc {
    let mut collection = existing.unwrap_or_else(|| CollectionDoc {
        collection_type: "Collection".to_string(),
        stac_version: STAC_VERSION.to_string(),
        id: collection_id.to_string(),
        description: format!("Items delivered for {collection_id}"),
        license: "proprietary".to_string(),
        extent: None,
        links: vec![
            Link::json("root", "../catalog.json"),
            Link::json("parent", "../catalog.json"),
            Link::json("self", "./collection.json"),
        ],
    });
    push_link_once(
        &mut collection.links,
        Link::json("item", format!("./{item_key}")),
    );
    collection
}

/// Paths of the record pair written by [`write_local_record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRecord {
    pub item_path: PathBuf,
    pub catalog_path: PathBuf,
}

/// Writes the run output artifact: the final item document plus a small
/// catalog pointing at it, under `dir/{item.id}/`. Item links are
/// rewritten to local self/root pairs.
pub async fn write_local_record(dir: &Path, item: &StacItem) -> std::io::Result<LocalRecord> {
    let record_dir = dir.join(&item.id);
    fs::create_dir_all(&record_dir).await?;

    let item_file = format!("{}.json", item.id);
    let mut local_item = item.clone();
    local_item.links = vec![
        Link::json("self", format!("./{item_file}")),
        Link::json("root", "./catalog.json"),
        Link::json("parent", "./catalog.json"),
    ];

    let catalog = Catalog {
        catalog_type: "Catalog".to_string(),
        stac_version: STAC_VERSION.to_string(),
        id: item.id.clone(),
        description: format!("Order record for {}", item.id),
        links: vec![
            Link::json("root", "./catalog.json"),
            Link::json("self", "./catalog.json"),
            Link::json("item", format!("./{item_file}")),
        ],
    };

    let item_path = record_dir.join(&item_file);
    let catalog_path = record_dir.join("catalog.json");
    fs::write(&item_path, serde_json::to_vec_pretty(&local_item)?).await?;
    fs::write(&catalog_path, serde_json::to_vec_pretty(&catalog)?).await?;

    Ok(LocalRecord {
        item_path,
        catalog_path,
    })
}
