// ABOUTME: Build command implementation.
// ABOUTME: Runs the injection state machine and relays progress to the terminal.

use super::parse_image;
use super::runtime_connection::connect_to_runtime;
use pinject::config::Config;
use pinject::error::Result;
use pinject::inject::Injection;
use pinject::output::Output;

/// Patch `source` into `tag`, or print the recipe when `dry_run` is set.
pub async fn build(
    config: &Config,
    source: &str,
    tag: &str,
    dry_run: bool,
    mut output: Output,
) -> Result<()> {
    let source = parse_image(source)?;
    let tag = parse_image(tag)?;
    let options = config.inject_options()?;

    output.start_timer();
    let runtime = connect_to_runtime(config, &output).await?;

    output.progress(&format!("  → Detecting OS of {}...", source));
    let injection = Injection::new(source, tag, options)
        .detect(&runtime)
        .await?;
    output.progress(&format!("  → Found {}", injection.detection()));

    let injection = injection.resolve()?;
    output.progress(&format!("  → Update commands: {}", injection.plan()));

    if dry_run {
        for warning in injection.diagnostics().warnings() {
            output.warning(warning);
        }
        let recipe = injection.recipe()?;
        output.result("recipe", recipe.as_str().trim_end());
        return Ok(());
    }

    output.progress(&format!("  → Building {}...", injection.tag()));
    let report = injection
        .build(&runtime, |progress| output.build_progress(progress))
        .await?
        .finish();

    for warning in &report.warnings {
        output.warning(warning);
    }

    match &report.image_id {
        Some(id) => output.success(&format!("Built {} ({})", report.tag, id.short())),
        None => output.success(&format!("Built {}", report.tag)),
    }

    Ok(())
}
