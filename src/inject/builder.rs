// ABOUTME: Submits a rendered recipe to the engine and relays build progress.
// ABOUTME: Engine-reported failures stay distinct from transport failures.

use futures::StreamExt;

use super::error::InjectError;
use crate::runtime::{BuildProgress, BuildRequest, ImageOps, RegistryAuth};
use crate::types::ImageId;

/// Build `request` and forward every progress event to `on_progress` in arrival order.
///
/// Returns the id of the built image when the engine reports one.
pub async fn build_image<R, F>(
    runtime: &R,
    request: &BuildRequest,
    auth: Option<&RegistryAuth>,
    mut on_progress: F,
) -> Result<Option<ImageId>, InjectError>
where
    R: ImageOps,
    F: FnMut(&BuildProgress),
{
    tracing::debug!(tag = %request.tag, no_cache = request.options.no_cache, "submitting build");

    let mut stream = runtime.build_image(request, auth).await?;
    let mut image_id = None;

    while let Some(event) = stream.next().await {
        let event = event?;
        if let BuildProgress::Built(id) = &event {
            image_id = Some(id.clone());
        }
        on_progress(&event);
    }

    tracing::debug!(tag = %request.tag, "build finished");
    Ok(image_id)
}
