mod memory;
mod model;
mod repo;

pub use memory::InMemoryUserRepository;
pub use model::{Credentials, User, UserResponse};
pub use repo::{PgUserRepository, UserRepository};
