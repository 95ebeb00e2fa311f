pub mod config;
pub mod error;
pub mod harness;
pub mod payload;
pub mod scenarios;

pub use config::Config;
pub use error::HarnessError;
pub use harness::{execute_request, ApiTarget, HarnessReport, TestRequest};
