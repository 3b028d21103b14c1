pub mod oauth;
pub mod upload;
