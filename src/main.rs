use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::StoryHandler;
use cyoa_core::ServerConfig;

/// Main entry point for the CYOA story server
///
/// Loads the story document and template once, then serves every request path as a chapter
/// lookup. Startup aborts if the configuration, the story or the template is invalid, so no
/// partial story is ever served.
///
/// # Environment Variables
/// - `CYOA_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `CYOA_STORY_FILE`: Story JSON document (default: "stories/gopher.json")
/// - `CYOA_TEMPLATE_FILE`: Optional chapter template replacing the built-in one
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the story or template cannot be loaded,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cyoa_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("cyoa_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = ServerConfig::from_env_values(
        std::env::var("CYOA_REST_ADDR").ok(),
        std::env::var("CYOA_STORY_FILE").ok(),
        std::env::var("CYOA_TEMPLATE_FILE").ok(),
    )?;

    let story = cfg
        .load_story()
        .with_context(|| format!("loading story {}", cfg.story_file().display()))?;
    if story.is_empty() {
        tracing::warn!("Story {} has no chapters", cfg.story_file().display());
    }
    for dangling in story.dangling_options() {
        tracing::warn!("Dangling option: {}", dangling);
    }

    let template = cfg.load_template().context("loading chapter template")?;
    if let Some(path) = cfg.template_file() {
        tracing::info!("Using chapter template {}", path.display());
    }

    tracing::info!(
        "++ Starting CYOA on {} with {} chapters",
        cfg.rest_addr(),
        story.len()
    );

    let app = api_rest::router(StoryHandler::builder(story).template(template).build());

    let listener = tokio::net::TcpListener::bind(cfg.rest_addr()).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
