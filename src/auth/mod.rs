use crate::state::AppState;
use axum::Router;

mod claims;
mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;
mod usecase;

pub use claims::Claims;
pub use jwt::{AuthUser, JwtKeys, TOKEN_TTL};
pub use usecase::UserUsecase;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
