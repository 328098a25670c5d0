use serde::{Deserialize, Serialize};

/// JWT payload issued on log-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64, // assigned user ID
    pub exp: usize,   // expires at (unix timestamp)
}
