pub mod error;
pub mod link;
pub mod logger;
pub mod validation;
