// src/main.rs
use flamesphere::AppConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("flamesphere=info"))
        .init();

    let config = AppConfig::from_env();
    log::info!(
        "Starting flamesphere (variant {:?}, debug {})",
        config.variant,
        config.debug
    );

    flamesphere::run(config)
}
