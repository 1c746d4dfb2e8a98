use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roster_worker::config::WorkerConfig;
use roster_worker::job::LifecycleJob;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster_worker=debug,roster_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env().expect("Invalid worker configuration");
    tracing::info!(
        disable_after_course_end_days = config.lifecycle.disable_after_course_end_days,
        disable_after_creation_days = config.lifecycle.disable_after_creation_days,
        delete_after_course_end_months = config.lifecycle.delete_after_course_end_months,
        "Loaded lifecycle configuration"
    );

    // --- Database ---
    let pool = roster_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    roster_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    roster_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Lifecycle job ---
    let cancel = CancellationToken::new();
    let job = LifecycleJob::new(pool, config);
    let job_cancel = cancel.clone();
    let job_handle = tokio::spawn(async move {
        job.run(job_cancel).await;
    });

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
    cancel.cancel();

    if let Err(e) = job_handle.await {
        tracing::error!(error = %e, "Lifecycle job task panicked");
    }
    tracing::info!("Worker stopped");
}
