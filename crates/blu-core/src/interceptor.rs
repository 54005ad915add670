//! Request Interceptor
//!
//! Boundary adapters that put the classify-then-decide step in front of
//! the host's two request primitives:
//!
//! - a fetch-style call, taking a URL string or a request descriptor and
//!   resolving asynchronously to a response;
//! - an open/send-style call, where the URL is given at `open` and the
//!   request is dispatched by a later `send`.
//!
//! A blocked fetch resolves to a synthetic empty success. A blocked
//! open/send pair turns `send` into a no-op. Allowed calls are forwarded
//! untouched, and transport errors reach the caller exactly as the
//! transport produced them.

use std::future::Future;

use crate::engine::{EngineHandle, Verdict};
use crate::types::Category;

// =============================================================================
// Fetch
// =============================================================================

/// Request descriptor form of a fetch argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub url: Option<String>,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl RequestDescriptor {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            method: "GET".to_string(),
            ..Self::default()
        }
    }
}

/// First argument of a fetch-style call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Url(String),
    Descriptor(RequestDescriptor),
}

impl FetchRequest {
    /// Target URL, if the argument carries one.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Descriptor(desc) => desc.url.as_deref(),
        }
    }
}

impl From<&str> for FetchRequest {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<String> for FetchRequest {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl From<RequestDescriptor> for FetchRequest {
    fn from(desc: RequestDescriptor) -> Self {
        Self::Descriptor(desc)
    }
}

/// Responses that can stand in for a suppressed request.
pub trait EmptyResponse {
    /// A normal-looking, successful response with no body.
    fn empty_success() -> Self;
}

/// The host's fetch-style primitive.
pub trait FetchTransport {
    type Response: EmptyResponse;
    type Error;

    fn fetch(&self, request: FetchRequest) -> impl Future<Output = Result<Self::Response, Self::Error>>;
}

/// Fetch wrapper: screens each request through the engine first.
pub struct Interceptor<T> {
    engine: EngineHandle,
    transport: T,
}

impl<T: FetchTransport> Interceptor<T> {
    pub fn new(engine: EngineHandle, transport: T) -> Self {
        Self { engine, transport }
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Screen the request, then either short-circuit or forward it.
    ///
    /// The decision is made synchronously before the transport is touched;
    /// only the forwarded call suspends.
    pub async fn fetch(&self, request: impl Into<FetchRequest>) -> Result<T::Response, T::Error> {
        let request = request.into();
        match self.engine.screen(request.url()) {
            Verdict::Block(_) => Ok(<T::Response as EmptyResponse>::empty_success()),
            Verdict::Allow => self.transport.fetch(request).await,
        }
    }
}

// =============================================================================
// Open / send
// =============================================================================

/// The host's open-then-send primitive.
pub trait XhrTransport {
    type Error;

    fn open(&mut self, method: &str, url: &str) -> Result<(), Self::Error>;
    fn send(&mut self, body: Option<&[u8]>) -> Result<(), Self::Error>;
}

/// Open/send wrapper. A blocked `open` never reaches the transport and
/// the following `send` does nothing.
pub struct InterceptedXhr<X> {
    engine: EngineHandle,
    inner: X,
    blocked: Option<Category>,
}

impl<X: XhrTransport> InterceptedXhr<X> {
    pub fn new(engine: EngineHandle, inner: X) -> Self {
        Self {
            engine,
            inner,
            blocked: None,
        }
    }

    pub fn open(&mut self, method: &str, url: &str) -> Result<(), X::Error> {
        match self.engine.screen(Some(url)) {
            Verdict::Block(category) => {
                self.blocked = Some(category);
                Ok(())
            }
            Verdict::Allow => {
                self.blocked = None;
                self.inner.open(method, url)
            }
        }
    }

    pub fn send(&mut self, body: Option<&[u8]>) -> Result<(), X::Error> {
        if self.blocked.is_some() {
            return Ok(());
        }
        self.inner.send(body)
    }

    /// Category of the last blocked `open`, if the pending request is neutralized.
    pub fn blocked(&self) -> Option<Category> {
        self.blocked
    }

    pub fn into_inner(self) -> X {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::modules::ModuleState;
    use crate::store::MemoryStore;
    use std::cell::{Cell, RefCell};

    #[derive(Debug, PartialEq)]
    struct MockResponse {
        status: u16,
        body: String,
    }

    impl EmptyResponse for MockResponse {
        fn empty_success() -> Self {
            Self {
                status: 200,
                body: String::new(),
            }
        }
    }

    #[derive(Default)]
    struct MockTransport {
        calls: RefCell<Vec<FetchRequest>>,
        fail: bool,
    }

    impl FetchTransport for MockTransport {
        type Response = MockResponse;
        type Error = String;

        fn fetch(&self, request: FetchRequest) -> impl Future<Output = Result<MockResponse, String>> {
            self.calls.borrow_mut().push(request.clone());
            let fail = self.fail;
            async move {
                if fail {
                    return Err("connection refused".to_string());
                }
                Ok(MockResponse {
                    status: 201,
                    body: format!("real:{}", request.url().unwrap_or("")),
                })
            }
        }
    }

    #[derive(Default)]
    struct MockXhr {
        opened: Vec<String>,
        sent: Cell<usize>,
    }

    impl XhrTransport for MockXhr {
        type Error = String;

        fn open(&mut self, _method: &str, url: &str) -> Result<(), String> {
            self.opened.push(url.to_string());
            Ok(())
        }

        fn send(&mut self, _body: Option<&[u8]>) -> Result<(), String> {
            self.sent.set(self.sent.get() + 1);
            Ok(())
        }
    }

    /// enabled, bloat only
    fn bloat_only() -> EngineHandle {
        let mut engine = Engine::builder(MemoryStore::new()).seed(3).build();
        for category in Category::ALL {
            engine.toggle(category, category == Category::Bloat);
        }
        assert_eq!(engine.modules(), ModuleState::none().with(Category::Bloat, true));
        engine.into_handle()
    }

    #[tokio::test]
    async fn test_blocked_fetch_returns_empty_success() {
        let interceptor = Interceptor::new(bloat_only(), MockTransport::default());
        let response = interceptor.fetch("https://x.com/store/gift").await.unwrap();
        assert_eq!(response, MockResponse::empty_success());
        assert!(interceptor.transport().calls.borrow().is_empty());

        let stats = interceptor.engine().read(|e| e.stats());
        assert_eq!(stats.blocked, 1);
        assert_eq!(stats.threats, 0);
        let latest = interceptor.engine().read(|e| e.activity().latest().cloned()).unwrap();
        assert_eq!(latest.category(), Category::Bloat);
    }

    #[tokio::test]
    async fn test_allowed_fetch_is_forwarded_unchanged() {
        let interceptor = Interceptor::new(bloat_only(), MockTransport::default());
        let response = interceptor.fetch("https://x.com/messages/42").await.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.body, "real:https://x.com/messages/42");
        assert_eq!(
            *interceptor.transport().calls.borrow(),
            vec![FetchRequest::Url("https://x.com/messages/42".to_string())]
        );
        assert_eq!(interceptor.engine().read(|e| e.stats().blocked), 0);
    }

    #[tokio::test]
    async fn test_descriptor_form() {
        let interceptor = Interceptor::new(bloat_only(), MockTransport::default());
        let mut desc = RequestDescriptor::get("https://x.com/api/billing");
        desc.method = "POST".to_string();
        let response = interceptor.fetch(desc).await.unwrap();
        assert_eq!(response.status, 200);
        assert!(interceptor.transport().calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_descriptor_without_url_is_allowed() {
        let interceptor = Interceptor::new(bloat_only(), MockTransport::default());
        let desc = RequestDescriptor::default();
        let response = interceptor.fetch(desc.clone()).await.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(*interceptor.transport().calls.borrow(), vec![FetchRequest::Descriptor(desc)]);
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let transport = MockTransport {
            fail: true,
            ..MockTransport::default()
        };
        let interceptor = Interceptor::new(bloat_only(), transport);
        let err = interceptor.fetch("https://x.com/messages/42").await.unwrap_err();
        assert_eq!(err, "connection refused");

        // blocked requests never reach the failing transport
        assert!(interceptor.fetch("https://x.com/store").await.is_ok());
    }

    #[test]
    fn test_blocked_open_neutralizes_send() {
        let engine = bloat_only();
        let mut xhr = InterceptedXhr::new(engine.clone(), MockXhr::default());
        xhr.open("GET", "https://x.com/premium").unwrap();
        assert_eq!(xhr.blocked(), Some(Category::Bloat));
        xhr.send(None).unwrap();

        let inner = xhr.into_inner();
        assert!(inner.opened.is_empty());
        assert_eq!(inner.sent.get(), 0);
        assert_eq!(engine.read(|e| e.stats().blocked), 1);
    }

    #[test]
    fn test_allowed_open_forwards_both_steps() {
        let mut xhr = InterceptedXhr::new(bloat_only(), MockXhr::default());
        xhr.open("POST", "https://x.com/messages").unwrap();
        xhr.send(Some(b"hi")).unwrap();
        assert_eq!(xhr.blocked(), None);

        let inner = xhr.into_inner();
        assert_eq!(inner.opened, vec!["https://x.com/messages"]);
        assert_eq!(inner.sent.get(), 1);
    }

    #[test]
    fn test_reopen_after_block_clears_neutralization() {
        let mut xhr = InterceptedXhr::new(bloat_only(), MockXhr::default());
        xhr.open("GET", "https://x.com/gift").unwrap();
        xhr.open("GET", "https://x.com/messages").unwrap();
        xhr.send(None).unwrap();
        assert_eq!(xhr.into_inner().sent.get(), 1);
    }
}
