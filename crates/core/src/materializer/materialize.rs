//! Materialization pipeline.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::task;
use tracing::{info, warn};

use crate::storage::{BlobStore, ObjectHandle};

use super::classify::{mime_for, AssetClassifier};
use super::error::MaterializeError;
use super::extract::{archive_kind, extract_archive, is_unsupported_archive};

/// Where materialized files land and how their public hrefs are built.
#[derive(Debug, Clone)]
pub struct Destination {
    pub bucket: String,
    /// Key prefix inside the bucket, typically `<workspace>/<...>/<order_id>`.
    pub prefix: String,
    pub workspace: String,
    /// Domain under which workspace files are served.
    pub workspaces_domain: String,
}

impl Destination {
    fn key_for(&self, relative: &str) -> String {
        format!("{}/{}", self.prefix.trim_end_matches('/'), relative)
    }

    /// Public file href: `https://{workspace}.{domain}/files/{bucket}/{subpath}`,
    /// where the subpath drops the leading workspace segment of the key.
    fn href_for(&self, key: &str) -> String {
        let subpath = key
            .strip_prefix(&format!("{}/", self.workspace))
            .unwrap_or(key);
        format!(
            "https://{}.{}/files/{}/{}",
            self.workspace, self.workspaces_domain, self.bucket, subpath
        )
    }
}

/// One workspace file produced from a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedAsset {
    pub name: String,
    pub href: String,
    pub media_type: String,
    /// Original delivered file name, kept when classification renamed it.
    pub title: Option<String>,
}

/// Hands out unique asset names: the first holder keeps the bare name,
/// later duplicates get an incrementing integer suffix.
#[derive(Default)]
struct NamePool {
    taken: HashMap<String, u32>,
}

impl NamePool {
    fn claim(&mut self, name: &str) -> String {
        match self.taken.get_mut(name) {
            None => {
                self.taken.insert(name.to_string(), 0);
                name.to_string()
            }
            Some(count) => {
                *count += 1;
                let claimed = format!("{name}_{count}");
                // Guard against a literal "<name>_<n>" file already claimed.
                if self.taken.contains_key(&claimed) {
                    return self.claim(name);
                }
                self.taken.insert(claimed.clone(), 0);
                claimed
            }
        }
    }
}

/// Moves delivered objects into the workspace and names the results.
pub struct Materializer {
    blobs: Arc<dyn BlobStore>,
}

impl Materializer {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// Materializes every delivered object: archives are extracted and
    /// their contents uploaded; plain objects are copied server-side.
    pub async fn materialize(
        &self,
        objects: &[ObjectHandle],
        dest: &Destination,
        classifier: &AssetClassifier,
    ) -> Result<Vec<MaterializedAsset>, MaterializeError> {
        let mut assets = Vec::new();
        let mut names = NamePool::default();

        for object in objects {
            let file_name = object.file_name().to_string();

            if let Some(kind) = archive_kind(&file_name) {
                let data = self.blobs.get_object(&object.bucket, &object.key).await?;
                let scratch = tempfile::tempdir()?;
                let scratch_path = scratch.path().to_path_buf();
                let archive_name = file_name.clone();

                let extracted = task::spawn_blocking(move || {
                    extract_archive(kind, &archive_name, &data, &scratch_path)
                })
                .await
                .map_err(|e| MaterializeError::archive(&file_name, e))??;

                info!(
                    archive = %file_name,
                    files = extracted.len(),
                    "extracted delivery archive"
                );

                for relative in &extracted {
                    let asset = self
                        .upload_extracted(scratch.path(), relative, dest, classifier, &mut names)
                        .await?;
                    assets.push(asset);
                }
            } else if is_unsupported_archive(&file_name) {
                warn!(file = %file_name, "unsupported archive format, skipping");
            } else {
                let key = dest.key_for(&file_name);
                self.blobs
                    .copy_object(&object.bucket, &object.key, &dest.bucket, &key)
                    .await?;
                assets.push(Self::build_asset(
                    &file_name,
                    dest.href_for(&key),
                    classifier,
                    &mut names,
                ));
            }
        }

        info!(count = assets.len(), "materialized assets");
        Ok(assets)
    }

    async fn upload_extracted(
        &self,
        scratch: &Path,
        relative: &Path,
        dest: &Destination,
        classifier: &AssetClassifier,
        names: &mut NamePool,
    ) -> Result<MaterializedAsset, MaterializeError> {
        let file_name = relative
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let relative_key = relative.to_string_lossy().replace('\\', "/");
        let key = dest.key_for(&relative_key);

        let body = tokio::fs::read(scratch.join(relative)).await?;
        self.blobs
            .put_object(&dest.bucket, &key, body, Some(mime_for(&file_name)))
            .await?;

        Ok(Self::build_asset(
            &file_name,
            dest.href_for(&key),
            classifier,
            names,
        ))
    }

    fn build_asset(
        file_name: &str,
        href: String,
        classifier: &AssetClassifier,
        names: &mut NamePool,
    ) -> MaterializedAsset {
        let (base_name, title) = match classifier.classify(file_name) {
            Some(semantic) => (semantic.to_string(), Some(file_name.to_string())),
            None => (file_name.to_string(), None),
        };
        MaterializedAsset {
            name: names.claim(&base_name),
            href,
            media_type: mime_for(file_name).to_string(),
            title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryBlobStore;
    use std::io::Write;

    fn dest() -> Destination {
        Destination {
            bucket: "workspace-bucket".to_string(),
            prefix: "ws-alpha/orders/ORD-1".to_string(),
            workspace: "ws-alpha".to_string(),
            workspaces_domain: "workspaces.example.org".to_string(),
        }
    }

    fn zip_fixture(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_name_pool_suffixes_duplicates() {
        let mut pool = NamePool::default();
        assert_eq!(pool.claim("primaryAsset"), "primaryAsset");
        assert_eq!(pool.claim("primaryAsset"), "primaryAsset_1");
        assert_eq!(pool.claim("primaryAsset"), "primaryAsset_2");
        assert_eq!(pool.claim("meta.xml"), "meta.xml");
    }

    #[test]
    fn test_href_drops_workspace_segment() {
        let d = dest();
        assert_eq!(
            d.href_for("ws-alpha/orders/ORD-1/image.tif"),
            "https://ws-alpha.workspaces.example.org/files/workspace-bucket/orders/ORD-1/image.tif"
        );
    }

    #[tokio::test]
    async fn test_archive_contents_become_assets() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs
            .put_object(
                "landing",
                "SO_78123/scene.zip",
                zip_fixture(&[
                    ("image.tif", b"tif".as_slice()),
                    ("meta.xml", b"<xml/>".as_slice()),
                ]),
                None,
            )
            .await
            .unwrap();

        let materializer = Materializer::new(blobs.clone());
        let objects = vec![ObjectHandle::new("landing", "SO_78123/scene.zip", 0)];
        let classifier = AssetClassifier::airbus_sar().unwrap();

        let assets = materializer
            .materialize(&objects, &dest(), &classifier)
            .await
            .unwrap();

        assert_eq!(assets.len(), 2);
        let primary = assets.iter().find(|a| a.name == "primaryAsset").unwrap();
        assert_eq!(primary.media_type, "image/tiff");
        assert_eq!(primary.title.as_deref(), Some("image.tif"));
        assert!(primary.href.ends_with("/files/workspace-bucket/orders/ORD-1/image.tif"));

        let meta = assets.iter().find(|a| a.name == "meta.xml").unwrap();
        assert_eq!(meta.media_type, "text/xml");
        assert!(meta.title.is_none());

        // The extracted files were uploaded to the workspace bucket.
        let uploaded = blobs.list("workspace-bucket", "ws-alpha/").await.unwrap();
        let keys: Vec<_> = uploaded.iter().map(|o| o.key.as_str()).collect();
        assert!(keys.contains(&"ws-alpha/orders/ORD-1/image.tif"));
        assert!(keys.contains(&"ws-alpha/orders/ORD-1/meta.xml"));
    }

    #[tokio::test]
    async fn test_plain_objects_are_copied() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs
            .put_object("landing", "planet/commercial-data/ord-1/manifest.json", b"{}".to_vec(), None)
            .await
            .unwrap();

        let materializer = Materializer::new(blobs.clone());
        let objects = vec![ObjectHandle::new(
            "landing",
            "planet/commercial-data/ord-1/manifest.json",
            2,
        )];

        let assets = materializer
            .materialize(&objects, &dest(), &AssetClassifier::planet().unwrap())
            .await
            .unwrap();

        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].name, "manifest");
        assert_eq!(assets[0].media_type, "application/json");
        let copied = blobs
            .get_object("workspace-bucket", "ws-alpha/orders/ORD-1/manifest.json")
            .await
            .unwrap();
        assert_eq!(copied, b"{}");
    }

    #[tokio::test]
    async fn test_duplicate_classified_names_get_suffixes() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs
            .put_object(
                "landing",
                "SO_78123/scene.zip",
                zip_fixture(&[
                    ("a/image.tif", b"a".as_slice()),
                    ("b/image.tif", b"b".as_slice()),
                ]),
                None,
            )
            .await
            .unwrap();

        let materializer = Materializer::new(blobs);
        let objects = vec![ObjectHandle::new("landing", "SO_78123/scene.zip", 0)];
        let assets = materializer
            .materialize(&objects, &dest(), &AssetClassifier::airbus_sar().unwrap())
            .await
            .unwrap();

        let mut names: Vec<_> = assets.iter().map(|a| a.name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["primaryAsset", "primaryAsset_1"]);
    }

    #[tokio::test]
    async fn test_unsupported_archives_are_skipped() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs
            .put_object("landing", "SO_78123/scene.rar", vec![0, 1], None)
            .await
            .unwrap();

        let materializer = Materializer::new(blobs);
        let objects = vec![ObjectHandle::new("landing", "SO_78123/scene.rar", 2)];
        let assets = materializer
            .materialize(&objects, &dest(), &AssetClassifier::unclassified())
            .await
            .unwrap();
        assert!(assets.is_empty());
    }

    #[tokio::test]
    async fn test_missing_archive_object_is_fatal() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let materializer = Materializer::new(blobs);
        let objects = vec![ObjectHandle::new("landing", "SO_78123/scene.tar.gz", 0)];
        let err = materializer
            .materialize(&objects, &dest(), &AssetClassifier::unclassified())
            .await
            .unwrap_err();
        assert!(matches!(err, MaterializeError::Storage(_)));
    }
}
