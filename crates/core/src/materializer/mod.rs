//! Turns delivered objects into workspace assets.
//!
//! Archives are pulled to a scratch directory, extracted, and every
//! resulting file is uploaded under the workspace destination prefix;
//! plain objects are copied server-side. Each file becomes a
//! [`MaterializedAsset`] with a MIME type inferred from its extension
//! and a semantic name from the provider's classification table.

mod classify;
mod error;
mod extract;
mod materialize;

pub use classify::{mime_for, AssetClassifier};
pub use error::MaterializeError;
pub use materialize::{Destination, MaterializedAsset, Materializer};
