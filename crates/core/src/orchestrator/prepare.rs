//! Batch preparation: item loading and multi-acquisition resolution.

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use crate::stac::StacItem;
use crate::store::{ItemLocator, ItemStore};

use super::types::WorkflowError;

/// An item ready for submission, with its vendor UUIDs resolved.
#[derive(Debug, Clone)]
pub struct PreparedItem {
    pub locator: ItemLocator,
    pub item: StacItem,
    pub acquisition_id: String,
    /// Vendor catalog UUIDs the order covers: the item's own for a
    /// single acquisition, the absorbed members' for a group.
    pub item_uuids: Vec<String>,
}

/// Loads the batch and resolves multi-acquisition groups.
///
/// An item listing `composed_of_acquisition_identifiers` absorbs the
/// referenced sibling items (collecting their vendor UUIDs) and the
/// siblings drop out of the batch. A referenced acquisition with no
/// matching item in the batch fails preparation; nothing is submitted.
pub async fn prepare_batch(
    store: &dyn ItemStore,
    locators: &[ItemLocator],
) -> Result<Vec<PreparedItem>, WorkflowError> {
    if locators.is_empty() {
        return Err(WorkflowError::Validation(
            "no items to order".to_string(),
        ));
    }

    let mut loaded = Vec::with_capacity(locators.len());
    for locator in locators {
        let item = store.get(locator).await?;
        let acquisition_id = item
            .acquisition_identifier()
            .ok_or_else(|| {
                WorkflowError::Validation(format!(
                    "item '{}' has no acquisition_identifier",
                    item.id
                ))
            })?
            .to_string();
        loaded.push((locator.clone(), item, acquisition_id));
    }

    let uuid_by_acquisition: HashMap<String, Option<String>> = loaded
        .iter()
        .map(|(_, item, acq)| (acq.clone(), item.properties.item_uuid.clone()))
        .collect();

    let mut prepared: Vec<PreparedItem> = Vec::new();
    for (locator, item, acquisition_id) in loaded {
        // Already absorbed by an earlier group item.
        if prepared.iter().any(|p| {
            p.item
                .properties
                .composed_of_acquisition_identifiers
                .contains(&acquisition_id)
        }) {
            continue;
        }

        let group = item.properties.composed_of_acquisition_identifiers.clone();
        let item_uuids = if group.is_empty() {
            vec![require_uuid(&item, &acquisition_id)?]
        } else {
            info!(
                acquisition = %acquisition_id,
                members = group.len(),
                "resolving multi-acquisition group"
            );
            let mut uuids = Vec::with_capacity(group.len());
            for member in &group {
                let uuid = uuid_by_acquisition.get(member).ok_or_else(|| {
                    WorkflowError::Validation(format!(
                        "acquisition '{member}' referenced by group item '{}' is not in the batch",
                        item.id
                    ))
                })?;
                uuids.push(uuid.clone().ok_or_else(|| {
                    WorkflowError::Validation(format!(
                        "group member '{member}' has no vendor catalog UUID"
                    ))
                })?);
            }
            // Drop members that were added before the group item.
            prepared.retain(|p| !group.contains(&p.acquisition_id));
            uuids
        };

        prepared.push(PreparedItem {
            locator,
            item,
            acquisition_id,
            item_uuids,
        });
    }

    Ok(prepared)
}

fn require_uuid(item: &StacItem, acquisition_id: &str) -> Result<String, WorkflowError> {
    item.properties.item_uuid.clone().ok_or_else(|| {
        WorkflowError::Validation(format!(
            "item for acquisition '{acquisition_id}' has no vendor catalog UUID"
        ))
    })
}

/// Finds item documents under a staged catalogue directory: every
/// `.json` file except the catalog and collection documents themselves.
pub fn discover_catalogue_items(dir: &Path) -> Result<Vec<ItemLocator>, WorkflowError> {
    if !dir.is_dir() {
        return Err(WorkflowError::Validation(format!(
            "catalogue directory '{}' not found",
            dir.display()
        )));
    }
    let mut locators = Vec::new();
    collect_item_files(dir, &mut locators)?;
    locators.sort_by_key(|l| l.to_string());
    Ok(locators)
}

fn collect_item_files(dir: &Path, out: &mut Vec<ItemLocator>) -> Result<(), WorkflowError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_item_files(&path, out)?;
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if name.ends_with(".json") && name != "catalog.json" && name != "collection.json" {
            out.push(ItemLocator::path(path));
        }
    }
    Ok(())
}
