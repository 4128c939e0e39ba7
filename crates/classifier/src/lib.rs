pub mod http;
pub mod provider;
