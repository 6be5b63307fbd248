//! Shared state threaded through every handler via `axum::State`.

use std::sync::Arc;
use std::time::Duration;

use broker::Broker;

use crate::contest_client::ContestCatalog;
use crate::core_service_client::CoreServiceClient;
use crate::correlation::CorrelationDispatcher;

/// How long `/execute` waits for a response before giving up.
pub const EXECUTE_TIMEOUT: Duration = Duration::from_secs(10);
/// How long `/evaluate` waits — longer, since it runs one container per
/// testcase rather than a single one-shot run.
pub const EVALUATE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct GatewayState {
    pub broker: Arc<dyn Broker>,
    pub catalog: ContestCatalog,
    pub core_service: Arc<dyn CoreServiceClient>,
    pub dispatcher: Arc<CorrelationDispatcher>,
    pub jwt_secret: String,
    pub internal_api_key: String,
}
