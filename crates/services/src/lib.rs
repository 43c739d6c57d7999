#![forbid(unsafe_code)]

pub mod error;
pub mod heading_check_service;

pub use error::HeadingCheckError;
pub use heading_check_service::HeadingCheckService;
