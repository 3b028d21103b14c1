pub mod auth;
pub mod cloud_storage;

pub use auth::AuthorizationManager;
pub use cloud_storage::StorageProvider;
