//! Hosts the storage pool and the invitation expiry sweeper.

use anyhow::Context;

use orgward_infra::{ExpirySweeper, InfraConfig, PostgresUnitOfWork};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    orgward_observability::init();

    let config = InfraConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        max_connections = config.max_connections,
        sweep_interval_secs = config.sweep_interval.as_secs(),
        "starting orgward"
    );

    let pool = config.connect().await.context("failed to connect to Postgres")?;
    let uow = PostgresUnitOfWork::new(pool);
    uow.ensure_schema().await.context("failed to apply schema")?;

    let sweeper = ExpirySweeper::spawn(uow.clone(), config.sweep_interval)
        .context("failed to start expiry sweeper")?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown requested");

    let stats = sweeper.stats();
    sweeper.shutdown().await;
    uow.pool().close().await;

    tracing::info!(
        sweeps = stats.runs,
        expired = stats.expired_total,
        failures = stats.failures,
        "orgward stopped"
    );
    Ok(())
}
