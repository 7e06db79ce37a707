//! STAC item document model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::catalog::Link;

/// Order lifecycle status carried in `properties["order:status"]`.
///
/// Internally this is a closed enum; the lowercase string form exists
/// only at the serde boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Not yet ordered; the initial state of a submittable item.
    #[default]
    Orderable,
    /// Order submitted and acknowledged by the vendor.
    Ordered,
    /// Vendor accepted the order but has not started fulfilment.
    Pending,
    /// Vendor is delivering the data.
    Shipping,
    /// Data delivered and materialized; assets attached (terminal).
    Succeeded,
    /// Order failed at some stage; see `order:failure_reason` (terminal).
    Failed,
    /// Order canceled on the vendor side (terminal).
    Canceled,
}

impl OrderStatus {
    /// Returns true if no further transitions are allowed within a run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Succeeded | OrderStatus::Failed | OrderStatus::Canceled
        )
    }

    /// Lowercase wire form, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Orderable => "orderable",
            OrderStatus::Ordered => "ordered",
            OrderStatus::Pending => "pending",
            OrderStatus::Shipping => "shipping",
            OrderStatus::Succeeded => "succeeded",
            OrderStatus::Failed => "failed",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GeoJSON-style geometry; coordinates are polygon rings of (lon, lat) pairs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl Geometry {
    /// Polygon geometry from a single exterior ring.
    pub fn polygon(ring: Vec<[f64; 2]>) -> Self {
        Self {
            geometry_type: "Polygon".to_string(),
            coordinates: vec![ring],
        }
    }
}

/// One downloadable asset attached to an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub href: String,
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

/// Item properties. Order-extension fields use their prefixed wire names;
/// unknown vendor properties round-trip through `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ItemProperties {
    #[serde(rename = "order:status", default)]
    pub order_status: OrderStatus,

    /// Vendor order identifier; absent until the order is submitted.
    #[serde(rename = "order:id", default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    /// Human-readable failure reason; present only when failed.
    #[serde(
        rename = "order:failure_reason",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub failure_reason: Option<String>,

    /// Vendor acquisition identifier the order is placed against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_identifier: Option<String>,

    /// For a group item: acquisition ids of the sibling items it absorbs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composed_of_acquisition_identifiers: Vec<String>,

    /// Vendor catalog item UUID (the item's `properties.id`).
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub item_uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,

    /// Everything else the vendor put in properties, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A STAC item: one orderable acquisition and its lifecycle record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StacItem {
    #[serde(rename = "type", default = "default_item_type")]
    pub item_type: String,

    #[serde(default = "default_stac_version")]
    pub stac_version: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stac_extensions: Vec<String>,

    pub id: String,

    /// Collection the item belongs to; selects the provider.
    pub collection: String,

    pub geometry: Geometry,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    pub properties: ItemProperties,

    /// Asset name -> asset; names are unique by construction.
    #[serde(default)]
    pub assets: BTreeMap<String, Asset>,

    #[serde(default)]
    pub links: Vec<Link>,
}

pub(crate) fn default_item_type() -> String {
    "Feature".to_string()
}

pub(crate) fn default_stac_version() -> String {
    "1.0.0".to_string()
}

impl StacItem {
    /// Minimal item for a given acquisition, in the orderable state.
    pub fn new(
        id: impl Into<String>,
        collection: impl Into<String>,
        geometry: Geometry,
        acquisition_identifier: impl Into<String>,
    ) -> Self {
        Self {
            item_type: default_item_type(),
            stac_version: default_stac_version(),
            stac_extensions: Vec::new(),
            id: id.into(),
            collection: collection.into(),
            geometry,
            bbox: None,
            properties: ItemProperties {
                acquisition_identifier: Some(acquisition_identifier.into()),
                ..ItemProperties::default()
            },
            assets: BTreeMap::new(),
            links: Vec::new(),
        }
    }

    pub fn status(&self) -> OrderStatus {
        self.properties.order_status
    }

    pub fn order_id(&self) -> Option<&str> {
        self.properties.order_id.as_deref()
    }

    pub fn acquisition_identifier(&self) -> Option<&str> {
        self.properties.acquisition_identifier.as_deref()
    }
}
