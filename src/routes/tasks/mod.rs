pub mod dto;
pub mod filters;
pub mod memory;
pub mod model;
pub mod patch;
pub mod queries;
pub mod routes;
pub mod store;

pub use memory::InMemoryTaskStore;
pub use queries::PgTaskStore;
pub use store::TaskStore;
