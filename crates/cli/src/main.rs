//! `stratus`: orders commercial satellite imagery, waits for the
//! delivery, and materializes it into a workspace catalog.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stratus_core::credentials::{CredentialProvider, EnvCredentialProvider};
use stratus_core::materializer::AssetClassifier;
use stratus_core::notify::{LogEmitter, NotificationEmitter, WebhookEmitter};
use stratus_core::orchestrator::discover_catalogue_items;
use stratus_core::stac::StacItem;
use stratus_core::storage::{BlobStore, S3BlobStore};
use stratus_core::store::{
    FsItemStore, ItemLocator, ItemStore, ObjectItemStore, StoreError,
};
use stratus_core::vendor::{
    AirbusOpticalClient, AirbusSarClient, EndUser, OAuthTokenProvider, OpticalBundle,
    PlanetClient, PlanetDelivery, ProductBundle, ProviderRegistry, SarOrderOptions,
    TokenProvider,
};
use stratus_core::{load_config, validate_config, Config, OrderWorkflow, WorkflowRequest};

const AIRBUS_TOKEN_URL: &str =
    "https://authenticate.foundation.api.oneatlas.airbus.com/auth/realms/IDP/protocol/openid-connect/token";
const AIRBUS_SAR_API: &str = "https://sar.api.oneatlas.airbus.com";
const AIRBUS_OPTICAL_API: &str = "https://order.api.oneatlas.airbus.com";
const PLANET_API: &str = "https://api.planet.com/compute/ops";

/// Credential scopes resolved by the [`EnvCredentialProvider`]
/// (`STRATUS_SECRET_AIRBUS_API_KEY` and friends).
const AIRBUS_API_KEY_SCOPE: &str = "airbus-api-key";
const PLANET_API_KEY_SCOPE: &str = "planet-api-key";
const PLANET_S3_ACCESS_KEY_SCOPE: &str = "planet-s3-access-key";
const PLANET_S3_SECRET_KEY_SCOPE: &str = "planet-s3-secret-key";

#[derive(Parser)]
#[command(name = "stratus", version, about = "Commercial imagery order workflow")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Order a batch of catalog items and wait for their deliveries.
    Order(OrderArgs),
}

#[derive(Args)]
struct OrderArgs {
    /// Item document locator: `s3://bucket/key` or a local path. Repeatable.
    #[arg(long = "item", value_name = "LOCATOR")]
    items: Vec<String>,

    /// Directory of item documents to order in addition to `--item`. Repeatable.
    #[arg(long = "catalogue-dir", value_name = "DIR")]
    catalogue_dirs: Vec<PathBuf>,

    /// Workspace the materialized data belongs to.
    #[arg(long)]
    workspace: String,

    /// Bucket holding workspace catalogs and materialized assets.
    #[arg(long, value_name = "BUCKET")]
    workspace_bucket: String,

    /// Bucket where vendor deliveries land.
    #[arg(long, value_name = "BUCKET")]
    landing_bucket: String,

    /// Product bundle: an Airbus optical bundle name ("Visual",
    /// "General Use", "Analytic", "Basic"), SAR options as
    /// `product_type:orbit[:resolution[:map_projection]]`, or a Planet
    /// bundle name such as `analytic_udm2`.
    #[arg(long, value_name = "BUNDLE")]
    product_bundle: String,

    /// AOI override as a JSON array of polygon rings.
    #[arg(long, value_name = "JSON")]
    coordinates: Option<String>,

    /// Licence to order under, where the vendor offers a choice.
    #[arg(long)]
    licence: Option<String>,

    /// End users as a JSON array of `{"name", "country"}` objects.
    #[arg(long, value_name = "JSON")]
    end_users: Option<String>,

    /// Configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Command::Order(args) => match run_order(args).await {
            Ok(code) => code,
            Err(e) => {
                error!("fatal: {e:#}");
                1
            }
        },
    };
    std::process::exit(code);
}

async fn run_order(args: OrderArgs) -> Result<i32> {
    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    // The bucket flags are the operative values; the config file only
    // provides them a default home for validation.
    config.storage.workspace_bucket = args.workspace_bucket.clone();
    config.storage.landing_bucket = args.landing_bucket.clone();
    validate_config(&config).context("configuration validation failed")?;

    let mut locators: Vec<ItemLocator> =
        args.items.iter().map(|raw| ItemLocator::parse(raw)).collect();
    for dir in &args.catalogue_dirs {
        locators.extend(discover_catalogue_items(dir)?);
    }

    let product_bundle = parse_product_bundle(&args.product_bundle)?;
    let coordinates = args
        .coordinates
        .as_deref()
        .map(|raw| serde_json::from_str::<Vec<Vec<[f64; 2]>>>(raw))
        .transpose()
        .context("--coordinates is not a JSON array of polygon rings")?;
    let end_users: Vec<EndUser> = args
        .end_users
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("--end-users is not a JSON array of {name, country} objects")?
        .unwrap_or_default();

    let blobs: Arc<dyn BlobStore> = Arc::new(S3BlobStore::new(&config.storage.s3).await);
    let items: Arc<dyn ItemStore> = Arc::new(RoutedItemStore {
        fs: FsItemStore::new(),
        object: ObjectItemStore::new(blobs.clone()),
    });
    let emitter: Arc<dyn NotificationEmitter> = match &config.notifier {
        Some(notifier) => Arc::new(WebhookEmitter::new(
            reqwest::Client::new(),
            notifier.endpoint.clone(),
        )),
        None => Arc::new(LogEmitter),
    };

    let delivery = PlanetDelivery {
        bucket: args.landing_bucket.clone(),
        aws_region: config.storage.s3.region.clone(),
        access_key_scope: PLANET_S3_ACCESS_KEY_SCOPE.to_string(),
        secret_key_scope: PLANET_S3_SECRET_KEY_SCOPE.to_string(),
    };
    let registry = build_registry(delivery)?;

    let workflow = OrderWorkflow::new(
        items,
        blobs,
        registry,
        emitter,
        config.orchestrator.clone(),
    )
    .with_poller(config.poller.clone());

    let request = WorkflowRequest {
        workspace: args.workspace,
        workspace_bucket: args.workspace_bucket,
        landing_bucket: args.landing_bucket,
        locators,
        product_bundle,
        coordinates,
        licence: args.licence,
        end_users,
    };

    let report = workflow.run(&request).await?;
    for outcome in &report.outcomes {
        info!(
            item = %outcome.item_id,
            status = %outcome.status,
            order_id = outcome.order_id.as_deref().unwrap_or("-"),
            assets = outcome.asset_count,
            "item finished"
        );
    }
    if report.all_succeeded() {
        Ok(0)
    } else {
        error!(failed = report.failed_count(), "batch finished with failures");
        Ok(2)
    }
}

/// Builds the collection -> provider table. Every orderable collection
/// is registered here; anything else is rejected before submission.
fn build_registry(delivery: PlanetDelivery) -> Result<ProviderRegistry> {
    let http = reqwest::Client::new();
    let credentials: Arc<dyn CredentialProvider> = Arc::new(EnvCredentialProvider::new());
    let tokens: Arc<dyn TokenProvider> = Arc::new(OAuthTokenProvider::new(
        http.clone(),
        AIRBUS_TOKEN_URL,
        AIRBUS_API_KEY_SCOPE,
        credentials.clone(),
    ));

    let sar = Arc::new(AirbusSarClient::new(
        http.clone(),
        AIRBUS_SAR_API,
        tokens.clone(),
    ));
    let optical = Arc::new(AirbusOpticalClient::new(
        http.clone(),
        AIRBUS_OPTICAL_API,
        tokens,
    ));
    let planet = Arc::new(PlanetClient::new(
        http,
        PLANET_API,
        credentials,
        PLANET_API_KEY_SCOPE,
        delivery,
    ));

    let sar_assets = Arc::new(AssetClassifier::airbus_sar()?);
    let optical_assets = Arc::new(AssetClassifier::airbus_optical()?);
    let planet_assets = Arc::new(AssetClassifier::planet()?);

    Ok(ProviderRegistry::new()
        .register("airbus_sar_data", sar, sar_assets)
        .register("airbus_pneo_data", optical.clone(), optical_assets.clone())
        .register("airbus_phr_data", optical.clone(), optical_assets.clone())
        .register("airbus_spot_data", optical, optical_assets)
        .register("planet_data", planet, planet_assets))
}

/// Interprets `--product-bundle` by shape: optical bundles go by their
/// published names, SAR options are colon-separated, and anything else
/// is taken as a Planet bundle name.
fn parse_product_bundle(raw: &str) -> Result<ProductBundle> {
    if OpticalBundle::ALL.contains(&raw) {
        return Ok(ProductBundle::Optical(OpticalBundle::parse(raw)?));
    }
    if raw.contains(':') {
        let mut parts = raw.split(':');
        let product_type = parts.next().unwrap_or_default();
        let orbit = parts.next().unwrap_or_default();
        let options = SarOrderOptions::new(product_type, orbit, parts.next(), parts.next())?;
        return Ok(ProductBundle::Sar(options));
    }
    Ok(ProductBundle::Planet(raw.to_string()))
}

/// Dispatches on locator form: local files go through [`FsItemStore`],
/// bucket objects through [`ObjectItemStore`]. A batch can mix both.
struct RoutedItemStore {
    fs: FsItemStore,
    object: ObjectItemStore,
}

#[async_trait]
impl ItemStore for RoutedItemStore {
    async fn get(&self, locator: &ItemLocator) -> Result<StacItem, StoreError> {
        match locator {
            ItemLocator::Path { .. } => self.fs.get(locator).await,
            ItemLocator::Object { .. } => self.object.get(locator).await,
        }
    }

    async fn put(&self, locator: &ItemLocator, item: &StacItem) -> Result<(), StoreError> {
        match locator {
            ItemLocator::Path { .. } => self.fs.put(locator, item).await,
            ItemLocator::Object { .. } => self.object.put(locator, item).await,
        }
    }
}
