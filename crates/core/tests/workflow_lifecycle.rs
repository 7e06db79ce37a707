//! End-to-end order lifecycle against in-memory collaborators.

use std::io::Write;
use std::sync::Arc;

use zip::write::SimpleFileOptions;

use stratus_core::materializer::AssetClassifier;
use stratus_core::orchestrator::{
    OrchestratorConfig, OrderWorkflow, WorkflowError, WorkflowRequest,
};
use stratus_core::stac::{Catalog, CollectionDoc, OrderStatus};
use stratus_core::storage::BlobStore;
use stratus_core::store::{ItemLocator, ItemStore};
use stratus_core::testing::{
    fixtures, MemoryBlobStore, MemoryItemStore, MockEmitter, MockVendorClient,
};
use stratus_core::vendor::{ProductBundle, ProviderRegistry};

const WORKSPACE_BUCKET: &str = "workspace-bucket";
const LANDING_BUCKET: &str = "landing";

struct TestBed {
    items: Arc<MemoryItemStore>,
    blobs: Arc<MemoryBlobStore>,
    vendor: Arc<MockVendorClient>,
    emitter: Arc<MockEmitter>,
    workflow: OrderWorkflow,
    _record_dir: tempfile::TempDir,
}

fn testbed() -> TestBed {
    let items = Arc::new(MemoryItemStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let vendor = Arc::new(MockVendorClient::new("mock-vendor"));
    let emitter = Arc::new(MockEmitter::new());
    let registry = ProviderRegistry::new().register(
        "planet_data",
        vendor.clone(),
        Arc::new(AssetClassifier::unclassified()),
    );
    let record_dir = tempfile::tempdir().unwrap();
    let config = OrchestratorConfig {
        record_dir: record_dir.path().to_path_buf(),
        ..OrchestratorConfig::default()
    };
    let workflow = OrderWorkflow::new(
        items.clone(),
        blobs.clone(),
        registry,
        emitter.clone(),
        config,
    );
    TestBed {
        items,
        blobs,
        vendor,
        emitter,
        workflow,
        _record_dir: record_dir,
    }
}

fn request(locators: Vec<ItemLocator>) -> WorkflowRequest {
    WorkflowRequest {
        workspace: "ws-alpha".to_string(),
        workspace_bucket: WORKSPACE_BUCKET.to_string(),
        landing_bucket: LANDING_BUCKET.to_string(),
        locators,
        product_bundle: ProductBundle::default_planet(),
        coordinates: None,
        licence: None,
        end_users: Vec::new(),
    }
}

async fn seed_item(bed: &TestBed, id: &str, acq: &str) -> ItemLocator {
    let locator = ItemLocator::parse(&format!("items/{id}.json"));
    let mut item = fixtures::stac_item(id, "planet_data", acq);
    item.properties.item_uuid = Some(format!("uuid-{acq}"));
    bed.items.insert(&locator, item).await;
    locator
}

fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn test_orderable_item_ends_succeeded_with_order_id() {
    let bed = testbed();
    bed.vendor.set_order_id("SO123").await;
    bed.blobs
        .put_object(LANDING_BUCKET, "SO123/image.tif", vec![1, 2, 3], None)
        .await
        .unwrap();

    let locator = seed_item(&bed, "acq-1", "ACQ-1").await;
    let report = bed.workflow.run(&request(vec![locator.clone()])).await.unwrap();

    assert!(report.all_succeeded());
    let stored = bed.items.get(&locator).await.unwrap();
    assert_eq!(stored.status(), OrderStatus::Succeeded);
    assert_eq!(stored.order_id(), Some("SO123"));

    // Ordered was persisted before polling: both the ordered write and
    // the terminal write went out as notifications for the same key.
    let published = bed.emitter.published().await;
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].updated_keys, published[1].updated_keys);
    assert_eq!(published[0].workspace, "ws-alpha");
}

#[tokio::test]
async fn test_vendor_side_duplicate_fails_without_order_id() {
    let bed = testbed();
    bed.vendor.set_in_progress("ACQ-1").await;

    let locator = seed_item(&bed, "acq-1", "ACQ-1").await;
    let report = bed.workflow.run(&request(vec![locator.clone()])).await.unwrap();

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.status, OrderStatus::Failed);
    assert!(outcome.order_id.is_none());
    assert!(outcome
        .failure_reason
        .as_deref()
        .unwrap()
        .contains("already"));

    // Nothing was submitted to the vendor.
    assert!(bed.vendor.submitted().await.is_empty());
    let stored = bed.items.get(&locator).await.unwrap();
    assert_eq!(stored.status(), OrderStatus::Failed);
    assert!(stored.order_id().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_poll_timeout_fails_but_retains_order_id() {
    let bed = testbed();
    bed.vendor.set_order_id("SO999").await;
    // Nothing ever lands under SO999/, so the poll runs out its deadline.

    let locator = seed_item(&bed, "acq-1", "ACQ-1").await;
    let report = bed.workflow.run(&request(vec![locator.clone()])).await.unwrap();

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.status, OrderStatus::Failed);
    assert_eq!(outcome.order_id.as_deref(), Some("SO999"));
    assert!(outcome
        .failure_reason
        .as_deref()
        .unwrap()
        .contains("retrieve"));

    let stored = bed.items.get(&locator).await.unwrap();
    assert_eq!(stored.status(), OrderStatus::Failed);
    assert_eq!(stored.order_id(), Some("SO999"));
}

#[tokio::test]
async fn test_delivered_archive_becomes_typed_assets() {
    let bed = testbed();
    bed.vendor.set_order_id("SO-ARC").await;
    let archive = zip_bytes(&[
        ("image.tif", b"not really a tiff".as_slice()),
        ("meta.xml", b"<meta/>".as_slice()),
    ]);
    bed.blobs
        .put_object(LANDING_BUCKET, "SO-ARC/delivery.zip", archive, None)
        .await
        .unwrap();

    let locator = seed_item(&bed, "acq-1", "ACQ-1").await;
    let report = bed.workflow.run(&request(vec![locator.clone()])).await.unwrap();
    assert!(report.all_succeeded());

    let stored = bed.items.get(&locator).await.unwrap();
    assert_eq!(stored.assets.len(), 2);
    assert_eq!(stored.assets["image.tif"].media_type, "image/tiff");
    assert_eq!(stored.assets["meta.xml"].media_type, "text/xml");

    // Extracted files live under the order prefix in the workspace.
    assert!(bed
        .blobs
        .get_object(
            WORKSPACE_BUCKET,
            "ws-alpha/commercial-data/SO-ARC/image.tif"
        )
        .await
        .is_ok());
}

#[tokio::test]
async fn test_group_with_missing_member_aborts_before_submission() {
    let bed = testbed();
    let locator = ItemLocator::parse("items/group-1.json");
    let mut group = fixtures::stac_item("group-1", "planet_data", "GROUP-1");
    group.properties.item_uuid = Some("uuid-GROUP-1".to_string());
    group.properties.composed_of_acquisition_identifiers = vec!["ACQ-MISSING".to_string()];
    bed.items.insert(&locator, group).await;

    let err = bed.workflow.run(&request(vec![locator])).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
    assert!(bed.vendor.submitted().await.is_empty());
    assert!(bed.emitter.published().await.is_empty());
}

#[tokio::test]
async fn test_group_absorbs_members_into_one_order() {
    let bed = testbed();
    bed.vendor.set_order_id("SO-GRP").await;
    bed.blobs
        .put_object(LANDING_BUCKET, "SO-GRP/scene.tif", vec![0], None)
        .await
        .unwrap();

    // Member listed before the group item still gets absorbed.
    let member = seed_item(&bed, "acq-2", "ACQ-2").await;
    let group_locator = ItemLocator::parse("items/group-1.json");
    let mut group = fixtures::stac_item("group-1", "planet_data", "GROUP-1");
    group.properties.item_uuid = Some("uuid-GROUP-1".to_string());
    group.properties.composed_of_acquisition_identifiers = vec!["ACQ-2".to_string()];
    bed.items.insert(&group_locator, group).await;

    let report = bed
        .workflow
        .run(&request(vec![member, group_locator]))
        .await
        .unwrap();

    // One outcome: the member was folded into the group order.
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].item_id, "group-1");

    let submitted = bed.vendor.submitted().await;
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].item_uuids, vec!["uuid-ACQ-2".to_string()]);
}

#[tokio::test]
async fn test_catalog_documents_accumulate_across_runs() {
    let bed = testbed();
    bed.vendor.set_order_id("SO-A").await;
    bed.blobs
        .put_object(LANDING_BUCKET, "SO-A/a.tif", vec![1], None)
        .await
        .unwrap();
    let first = seed_item(&bed, "acq-1", "ACQ-1").await;
    bed.workflow.run(&request(vec![first])).await.unwrap();

    bed.vendor.set_order_id("SO-B").await;
    bed.blobs
        .put_object(LANDING_BUCKET, "SO-B/b.tif", vec![2], None)
        .await
        .unwrap();
    let second = seed_item(&bed, "acq-2", "ACQ-2").await;
    bed.workflow.run(&request(vec![second])).await.unwrap();

    let catalog: Catalog = serde_json::from_slice(
        &bed.blobs
            .get_object(WORKSPACE_BUCKET, "ws-alpha/commercial-data/catalog.json")
            .await
            .unwrap(),
    )
    .unwrap();
    let children: Vec<_> = catalog.links.iter().filter(|l| l.rel == "child").collect();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].href, "./planet_data/collection.json");

    let collection: CollectionDoc = serde_json::from_slice(
        &bed.blobs
            .get_object(
                WORKSPACE_BUCKET,
                "ws-alpha/commercial-data/planet_data/collection.json",
            )
            .await
            .unwrap(),
    )
    .unwrap();
    let item_links: Vec<_> = collection
        .links
        .iter()
        .filter(|l| l.rel == "item")
        .map(|l| l.href.clone())
        .collect();
    assert_eq!(
        item_links,
        vec![
            "./acq-1/acq-1.json".to_string(),
            "./acq-2/acq-2.json".to_string()
        ]
    );

    // Both item documents are in the workspace alongside the collection.
    assert!(bed
        .blobs
        .get_object(
            WORKSPACE_BUCKET,
            "ws-alpha/commercial-data/planet_data/acq-2/acq-2.json"
        )
        .await
        .is_ok());
}
