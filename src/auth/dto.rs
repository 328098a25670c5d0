use serde::{Deserialize, Serialize};

/// Response returned after log-in.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
