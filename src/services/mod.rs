pub mod search_service;
pub mod upstream;

pub use search_service::*;
pub use upstream::*;
