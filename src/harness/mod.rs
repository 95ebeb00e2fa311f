pub mod executor;
pub mod report;
pub mod service;
pub mod types;

pub use executor::{endpoint_url, execute_request};
pub use report::{build_report, is_binary_content, status_text, ReportParams};
pub use service::{HarnessService, HarnessServiceExt, HttpHarnessService, ReportFuture};
pub use types::*;
