//! API query and status types.

use serde::{Deserialize, Serialize};

/// Query parameters for the directive endpoint.
///
/// `func` keeps the name deployed clients already send.
#[derive(Debug, Deserialize)]
pub struct DirectiveQuery {
    /// Requested operation name.
    pub func: Option<String>,
}

/// Liveness response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: &'static str,
}
