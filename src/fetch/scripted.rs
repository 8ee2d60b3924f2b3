//! Scripted network double for tests

use crate::error::{SwError, SwResult};
use crate::fetch::{Network, Request, Response};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

enum Route {
    Serve(Response),
    Fail,
}

/// Network answering from a fixed route table and counting calls
///
/// Unknown paths answer 404.
#[derive(Default)]
pub(crate) struct ScriptedNetwork {
    routes: HashMap<String, Route>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn serve(mut self, path: &str, body: &str) -> Self {
        self.routes
            .insert(path.to_string(), Route::Serve(Response::ok(body.to_string())));
        self
    }

    pub(crate) fn respond(mut self, path: &str, response: Response) -> Self {
        self.routes.insert(path.to_string(), Route::Serve(response));
        self
    }

    pub(crate) fn fail(mut self, path: &str) -> Self {
        self.routes.insert(path.to_string(), Route::Fail);
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> SwResult<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.routes.get(request.url.path()) {
            Some(Route::Serve(response)) => Ok(response.clone()),
            Some(Route::Fail) => Err(SwError::network(request.url.as_str(), "connection refused")),
            None => Ok(Response::new(404, "")),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
