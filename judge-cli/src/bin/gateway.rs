//! Gateway process entry point: wires the HTTP router, the broker
//! connection, the contest catalog, and the correlation dispatcher's
//! background consumer, then serves until killed.

use std::sync::Arc;

use broker::{AmqpBroker, Broker};
use judge_cli::{init_logging, JudgeConfig};
use judge_gateway::contest_client::ContestCatalog;
use judge_gateway::correlation::{self, CorrelationDispatcher};
use judge_gateway::core_service_client::HttpCoreServiceClient;
use judge_gateway::{create_judge_router, GatewayState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let config = JudgeConfig::from_env()?;

    tracing::info!(bind_addr = %config.bind_addr, "starting judge gateway");

    let broker: Arc<dyn Broker> = Arc::new(AmqpBroker::connect(&config.rabbitmq_url).await?);
    broker::declare_judge_queues(&broker).await?;

    let catalog = ContestCatalog::connect(&config.redis_url).await?;
    let core_service = Arc::new(HttpCoreServiceClient::new(config.core_service_url.clone()));
    let dispatcher = CorrelationDispatcher::new();

    tokio::spawn(correlation::run(broker.clone(), dispatcher.clone()));

    let state = GatewayState {
        broker,
        catalog,
        core_service,
        dispatcher,
        jwt_secret: config.jwt_secret,
        internal_api_key: config.internal_api_key,
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, create_judge_router(state)).await?;

    Ok(())
}
