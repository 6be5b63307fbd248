//! The contest/problem catalog: a Redis-backed read-through cache the
//! gateway consults to resolve a submission's testcases before
//! publishing an evaluation task.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use judge_types::{JudgeError, Testcase};

/// Registration status that grants a user permission to submit.
pub const APPROVED_REGISTRATION_STATUS: &str = "approved";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUser {
    #[serde(rename = "_id")]
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub user: RegisteredUser,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContestEntry {
    pub contest_id: String,
    pub problem_id: String,
    pub problem_name: String,
    pub testcases: Vec<Testcase>,
    pub registrations: Vec<Registration>,
    pub max_submissions: u32,
}

/// Wraps a Redis connection manager (auto-reconnecting, cheaply cloned)
/// to fetch cached contest/problem data under the `contest_{id}` key
/// convention.
#[derive(Clone)]
pub struct ContestCatalog {
    connection: ConnectionManager,
}

impl ContestCatalog {
    pub async fn connect(redis_url: &str) -> Result<Self, JudgeError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| JudgeError::Unknown(format!("invalid redis url: {e}")))?;
        let connection = client
            .get_connection_manager()
            .await
            .map_err(|e| JudgeError::Unknown(format!("failed to connect to redis: {e}")))?;
        Ok(Self { connection })
    }

    /// Looks up `contest_{contest_id}`, returning `None` if the catalog
    /// has no cached entry for it (the gateway's caller treats that as
    /// "contest not found" rather than a transport error).
    pub async fn get_contest(&self, contest_id: &str) -> Result<Option<ContestEntry>, JudgeError> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn
            .get(format!("contest_{contest_id}"))
            .await
            .map_err(|e| JudgeError::Unknown(format!("redis GET failed: {e}")))?;

        match raw {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| JudgeError::Unknown(format!("malformed cached contest entry: {e}"))),
            None => Ok(None),
        }
    }
}
