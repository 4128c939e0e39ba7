pub mod config;
pub mod detect;
pub mod io;
pub mod palette;
pub mod respond;
pub mod session;
pub mod types;
