//! MIME inference and semantic asset naming.

use regex_lite::Regex;

use super::error::MaterializeError;

/// MIME type from the file extension; unknown extensions fall back to
/// `application/octet-stream`.
pub fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit('.')
        .next()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "tif" | "tiff" => "image/tiff",
        "jp2" => "image/jp2",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "xml" => "text/xml",
        "json" | "geojson" => "application/json",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "pdf" => "application/pdf",
        "csv" => "text/csv",
        "kmz" => "application/vnd.google-earth.kmz",
        "zip" => "application/zip",
        "gz" | "tgz" => "application/gzip",
        _ => "application/octet-stream",
    }
}

/// Ordered regex table mapping delivered file names to semantic asset
/// names. First match wins; unmatched files keep their bare file name.
pub struct AssetClassifier {
    rules: Vec<(Regex, String)>,
}

impl AssetClassifier {
    pub fn new(rules: &[(&str, &str)]) -> Result<Self, MaterializeError> {
        let rules = rules
            .iter()
            .map(|(pattern, name)| {
                Regex::new(pattern)
                    .map(|re| (re, name.to_string()))
                    .map_err(|e| MaterializeError::Pattern {
                        pattern: pattern.to_string(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// No rules: every file keeps its own name.
    pub fn unclassified() -> Self {
        Self { rules: Vec::new() }
    }

    /// Table for Airbus SAR deliveries (TerraSAR-style product trees).
    pub fn airbus_sar() -> Result<Self, MaterializeError> {
        Self::new(&[
            (r"(?i)preview.*\.png$", "thumbnail"),
            (r"(?i)browse.*\.(png|tif)$", "quicklook"),
            (r"(?i)composite_quicklook.*\.tif$", "quicklook"),
            (r"(?i)\.tiff?$", "primaryAsset"),
        ])
    }

    /// Table for Airbus optical (DIMAP GeoTIFF) deliveries.
    pub fn airbus_optical() -> Result<Self, MaterializeError> {
        Self::new(&[
            (r"(?i)icon\.jpg$", "thumbnail"),
            (r"(?i)preview\.jpg$", "quicklook"),
            (r"(?i)\.(tiff?|jp2)$", "primaryAsset"),
            (r"(?i)^dim_.*\.xml$", "metadata"),
        ])
    }

    /// Table for Planet deliveries.
    pub fn planet() -> Result<Self, MaterializeError> {
        Self::new(&[
            (r"(?i)_udm2.*\.tif$", "udm2"),
            (r"(?i)_metadata\.json$", "metadata"),
            (r"(?i)manifest\.json$", "manifest"),
            (r"(?i)\.tiff?$", "primaryAsset"),
        ])
    }

    pub fn classify(&self, file_name: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(file_name))
            .map(|(_, name)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_table() {
        assert_eq!(mime_for("image.tif"), "image/tiff");
        assert_eq!(mime_for("IMAGE.TIFF"), "image/tiff");
        assert_eq!(mime_for("meta.xml"), "text/xml");
        assert_eq!(mime_for("manifest.json"), "application/json");
        assert_eq!(mime_for("preview.png"), "image/png");
        assert_eq!(mime_for("unknown.bin"), "application/octet-stream");
        assert_eq!(mime_for("no_extension"), "application/octet-stream");
    }

    #[test]
    fn test_sar_classification() {
        let classifier = AssetClassifier::airbus_sar().unwrap();
        assert_eq!(classifier.classify("IMAGE_HH_SRA_spot_047.tif"), Some("primaryAsset"));
        assert_eq!(classifier.classify("PREVIEW_MAP.png"), Some("thumbnail"));
        assert_eq!(classifier.classify("BROWSE_IMAGE.png"), Some("quicklook"));
        assert_eq!(classifier.classify("TSX_ANNOTATION.xml"), None);
    }

    #[test]
    fn test_planet_classification_order_matters() {
        let classifier = AssetClassifier::planet().unwrap();
        // udm2 rule must win over the generic tif rule.
        assert_eq!(
            classifier.classify("20241203_083150_ssc2d3_0013_udm2.tif"),
            Some("udm2")
        );
        assert_eq!(
            classifier.classify("20241203_083150_ssc2d3_0013_visual.tif"),
            Some("primaryAsset")
        );
        assert_eq!(classifier.classify("manifest.json"), Some("manifest"));
    }

    #[test]
    fn test_unclassified_matches_nothing() {
        let classifier = AssetClassifier::unclassified();
        assert_eq!(classifier.classify("image.tif"), None);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        assert!(matches!(
            AssetClassifier::new(&[("([unclosed", "x")]),
            Err(MaterializeError::Pattern { .. })
        ));
    }
}
