use ai_router::{AiConfig, HealthState, Router, RouterConfig};
use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("ai_router=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    let policy = match std::env::var("AI_ROUTER_CONFIG") {
        Ok(path) => RouterConfig::from_file(&path)
            .with_context(|| format!("failed to load routing policy from {path}"))?,
        Err(_) => RouterConfig::default(),
    };

    let router = Router::from_config(&AiConfig::from_env(), policy)?;
    let report = router.health_check().await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.status == HealthState::Down {
        std::process::exit(1);
    }
    Ok(())
}
