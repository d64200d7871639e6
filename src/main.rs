use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("PREFKEEP_LOG", "warn")
            .write_style("PREFKEEP_LOG_STYLE"),
    )
    .init();

    prefkeep::run().await.context("prefkeep")?;
    Ok(())
}
