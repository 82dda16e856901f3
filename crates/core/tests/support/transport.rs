use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use dbaas_core::{ApiRequest, ApiResponse, ApiTransport, HttpMethod};
use dbaas_domain::Result as DomainResult;
use parking_lot::Mutex;

type Handler = Box<dyn Fn(&ApiRequest) -> ApiResponse + Send + Sync>;

enum Reply {
    /// Replayed in order; the last one repeats
    Sequence(Mutex<VecDeque<ApiResponse>>),
    Dynamic(Handler),
}

struct Route {
    method: HttpMethod,
    suffix: String,
    reply: Reply,
}

/// In-memory `ApiTransport` answering by method and path suffix.
///
/// Every request is recorded so tests can assert on call order. Requests
/// without a matching route get a 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    log: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer with `responses` in turn, repeating the last one.
    pub fn respond(&self, method: HttpMethod, suffix: &str, responses: Vec<ApiResponse>) -> &Self {
        self.routes.lock().push(Route {
            method,
            suffix: suffix.to_string(),
            reply: Reply::Sequence(Mutex::new(responses.into())),
        });
        self
    }

    /// Answer with whatever `handler` builds from the request.
    pub fn respond_with<F>(&self, method: HttpMethod, suffix: &str, handler: F) -> &Self
    where
        F: Fn(&ApiRequest) -> ApiResponse + Send + Sync + 'static,
    {
        self.routes.lock().push(Route {
            method,
            suffix: suffix.to_string(),
            reply: Reply::Dynamic(Box::new(handler)),
        });
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().clone()
    }

    /// Non-GET requests in the order they were sent
    pub fn mutations(&self) -> Vec<ApiRequest> {
        self.requests().into_iter().filter(|r| r.method != HttpMethod::Get).collect()
    }

    /// Position of the first request whose path ends with `suffix`
    pub fn first_index(&self, method: HttpMethod, suffix: &str) -> Option<usize> {
        self.log.lock().iter().position(|r| r.method == method && r.path.ends_with(suffix))
    }

    pub fn count(&self, method: HttpMethod, suffix: &str) -> usize {
        self.log.lock().iter().filter(|r| r.method == method && r.path.ends_with(suffix)).count()
    }
}

#[async_trait]
impl ApiTransport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> DomainResult<ApiResponse> {
        self.log.lock().push(request.clone());

        let routes = self.routes.lock();
        let route = routes
            .iter()
            .find(|route| route.method == request.method && request.path.ends_with(&route.suffix));

        let response = match route {
            None => ApiResponse::new(404, format!("no route for {} {}", request.method, request.path)),
            Some(Route { reply: Reply::Dynamic(handler), .. }) => handler(&request),
            Some(Route { reply: Reply::Sequence(queue), .. }) => {
                let mut queue = queue.lock();
                if queue.len() > 1 {
                    queue.pop_front().unwrap()
                } else {
                    queue.front().cloned().unwrap()
                }
            }
        };
        Ok(response)
    }
}
