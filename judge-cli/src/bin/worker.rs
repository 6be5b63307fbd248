//! Worker process entry point: connects to the broker and the
//! container engine, then runs the task-dispatch pool until killed.

use std::sync::Arc;

use broker::{AmqpBroker, Broker};
use clap::Parser;
use judge_cli::{init_logging, JudgeConfig};
use sandbox_executor::{BollardEngine, ContainerEngine, Executor};

#[derive(Parser, Debug)]
#[command(name = "judge-worker", about = "Consumes and executes judge tasks")]
struct Args {
    /// Overrides JUDGE_CONCURRENCY.
    #[arg(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();
    let mut config = JudgeConfig::from_env()?;
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }

    tracing::info!(concurrency = config.concurrency, "starting judge worker");

    let broker: Arc<dyn Broker> = Arc::new(AmqpBroker::connect(&config.rabbitmq_url).await?);
    let engine: Arc<dyn ContainerEngine> = Arc::new(BollardEngine::connect()?);
    let executor = Arc::new(Executor::new(engine));
    let core_client = Arc::new(judge_worker::HttpCoreServiceClient::new(
        &config.core_service_url,
        &config.internal_api_key,
    ));

    judge_worker::run(
        broker,
        executor,
        core_client,
        judge_worker::WorkerConfig {
            concurrency: config.concurrency,
            base_dir: config.work_dir_base,
        },
    )
    .await?;

    Ok(())
}
