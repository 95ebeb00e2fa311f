//! Harness service abstraction layer.
//!
//! Scenarios talk to this trait instead of the executor, so multi-step
//! flows can run against a mock.

use super::executor::execute_request;
use super::types::{ApiTarget, FilePart, HarnessReport, Method, RequestBody, TestRequest};
use std::future::Future;
use std::pin::Pin;

pub type ReportFuture<'a> = Pin<Box<dyn Future<Output = HarnessReport> + Send + 'a>>;

/// Trait for services that execute smoke requests.
pub trait HarnessService: Send + Sync {
    /// Executes one request against `target` and reports the outcome.
    fn execute<'a>(&'a self, target: &'a ApiTarget, request: TestRequest) -> ReportFuture<'a>;
}

/// Default service backed by `execute_request`.
#[derive(Default, Clone)]
pub struct HttpHarnessService;

impl HttpHarnessService {
    pub fn new() -> Self {
        Self
    }
}

impl HarnessService for HttpHarnessService {
    fn execute<'a>(&'a self, target: &'a ApiTarget, request: TestRequest) -> ReportFuture<'a> {
        Box::pin(execute_request(target, request))
    }
}

/// Convenience methods for the request shapes the scenarios use.
pub trait HarnessServiceExt: HarnessService {
    fn get<'a>(&'a self, target: &'a ApiTarget, path: &str) -> ReportFuture<'a> {
        self.execute(target, TestRequest::new(Method::Get, path))
    }

    /// POSTs a JSON payload with the given content type.
    fn post_json<'a>(
        &'a self,
        target: &'a ApiTarget,
        path: &str,
        payload: serde_json::Value,
        content_type: Option<&str>,
    ) -> ReportFuture<'a> {
        let request = TestRequest::new(Method::Post, path).with_body(RequestBody::Json {
            payload,
            content_type: content_type.map(str::to_string),
        });
        self.execute(target, request)
    }

    /// PUTs a JSON payload with the given content type.
    fn put_json<'a>(
        &'a self,
        target: &'a ApiTarget,
        path: &str,
        payload: serde_json::Value,
        content_type: Option<&str>,
    ) -> ReportFuture<'a> {
        let request = TestRequest::new(Method::Put, path).with_body(RequestBody::Json {
            payload,
            content_type: content_type.map(str::to_string),
        });
        self.execute(target, request)
    }

    fn post_multipart<'a>(
        &'a self,
        target: &'a ApiTarget,
        path: &str,
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    ) -> ReportFuture<'a> {
        let request = TestRequest::new(Method::Post, path)
            .with_body(RequestBody::Multipart { fields, files });
        self.execute(target, request)
    }

    fn put_multipart<'a>(
        &'a self,
        target: &'a ApiTarget,
        path: &str,
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    ) -> ReportFuture<'a> {
        let request = TestRequest::new(Method::Put, path)
            .with_body(RequestBody::Multipart { fields, files });
        self.execute(target, request)
    }
}

impl<T: HarnessService + ?Sized> HarnessServiceExt for T {}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replays canned reports in order and records what it was asked to send.
    pub(crate) struct MockHarnessService {
        responses: Mutex<Vec<HarnessReport>>,
        pub(crate) seen: Mutex<Vec<(ApiTarget, TestRequest)>>,
    }

    impl MockHarnessService {
        pub(crate) fn new(mut responses: Vec<HarnessReport>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl HarnessService for MockHarnessService {
        fn execute<'a>(&'a self, target: &'a ApiTarget, request: TestRequest) -> ReportFuture<'a> {
            self.seen.lock().unwrap().push((target.clone(), request));
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| HarnessReport::error("no canned report".to_string(), "TEST".to_string()));
            Box::pin(async move { response })
        }
    }

    #[tokio::test]
    async fn test_mock_harness_service() {
        let service = MockHarnessService::new(vec![HarnessReport::error(
            "Test error".to_string(),
            "TEST".to_string(),
        )]);
        let target = ApiTarget::new("http://localhost/v1");

        let report = service
            .post_json(&target, "resources", serde_json::json!({"label": "x"}), None)
            .await;
        assert!(!report.success);
        assert_eq!(report.error.unwrap().code, "TEST");

        let seen = service.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1.method, Method::Post);
        assert_eq!(seen[0].1.path, "resources");
    }

    #[tokio::test]
    async fn test_put_multipart_shape() {
        let service = MockHarnessService::new(vec![]);
        let target = ApiTarget::new("http://localhost/v1");

        let _ = service
            .put_multipart(&target, "filevalue/x", vec![], vec![FilePart::new("file", "a.tif")])
            .await;

        let seen = service.seen.lock().unwrap();
        assert_eq!(seen[0].1.method, Method::Put);
        match &seen[0].1.body {
            RequestBody::Multipart { fields, files } => {
                assert!(fields.is_empty());
                assert_eq!(files[0].field, "file");
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }
}
