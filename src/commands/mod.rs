// ABOUTME: Command module aggregator for the pinject CLI.
// ABOUTME: Re-exports build and detect command handlers.

mod build;
mod detect;
mod runtime_connection;

pub use build::build;
pub use detect::detect;

use pinject::error::{Error, Result};
use pinject::types::ImageRef;

fn parse_image(reference: &str) -> Result<ImageRef> {
    ImageRef::parse(reference).map_err(|e| Error::InvalidImage {
        reference: reference.to_string(),
        message: e.to_string(),
    })
}
