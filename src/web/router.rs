//! # Route Table
//!
//! Collects handler descriptors with their handlers and mounts them on an
//! axum `Router`. Every request goes through the binder before the handler
//! runs; domain errors come back as JSON payloads.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use axum::extract::{Path, Request, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodFilter, MethodRouter};
use axum::Router;
use futures_util::FutureExt;
use tracing::{debug, error, info};

use super::binder::bind;
use super::descriptor::HandlerDescriptor;
use super::errors::{WebError, WebResult};
use super::handler::{CallArgs, HandlerError, HandlerFn, HandlerResult};
use super::reply::Reply;
use super::request::RequestContext;

/// One registered handler
pub struct Route<S> {
    descriptor: HandlerDescriptor,
    handler: HandlerFn<S>,
}

impl<S: Clone + Send + Sync + 'static> Route<S> {
    pub fn new<F, Fut>(descriptor: HandlerDescriptor, handler: F) -> Self
    where
        F: Fn(S, CallArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let handler: HandlerFn<S> = Arc::new(move |state, args| handler(state, args).boxed());
        Self {
            descriptor,
            handler,
        }
    }

    pub fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    /// Buffer the request, then bind and invoke
    pub async fn dispatch(
        &self,
        state: S,
        match_info: HashMap<String, String>,
        request: Request,
    ) -> Response {
        match RequestContext::from_request(request, match_info).await {
            Ok(ctx) => self.call(state, Arc::new(ctx)).await,
            Err(err) => err.into_response(),
        }
    }

    /// Bind `request` and invoke the handler
    pub async fn call(&self, state: S, request: Arc<RequestContext>) -> Response {
        let name = self.descriptor.name();
        debug!(handler = name, method = %request.method(), path = %request.path(), "call");

        let args = match bind(self.descriptor.profile(), request) {
            Ok(args) => args,
            Err(err) => {
                info!(handler = name, error = %err, "rejected request");
                return err.into_response();
            }
        };

        match (self.handler)(state, args).await {
            Ok(reply) => reply.into_response(),
            Err(HandlerError::Api(err)) => {
                debug!(handler = name, error = %err, "api error");
                Reply::Json(err.to_payload()).into_response()
            }
            Err(err) => {
                error!(handler = name, error = %err, "handler failed");
                WebError::Internal(err.to_string()).into_response()
            }
        }
    }
}

/// All handlers of an application
pub struct RouteTable<S> {
    routes: Vec<Route<S>>,
}

impl<S: Clone + Send + Sync + 'static> Default for RouteTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone + Send + Sync + 'static> RouteTable<S> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn add<F, Fut>(&mut self, descriptor: HandlerDescriptor, handler: F) -> &mut Self
    where
        F: Fn(S, CallArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.routes.push(Route::new(descriptor, handler));
        self
    }

    pub fn routes(&self) -> &[Route<S>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the route for `method` and `path` pattern
    pub fn find(&self, method: &axum::http::Method, path: &str) -> Option<&Route<S>> {
        self.routes
            .iter()
            .find(|r| r.descriptor.method() == method && r.descriptor.path() == path)
    }

    /// Mount every route on an axum router
    pub fn into_router(self) -> WebResult<Router<S>> {
        let mut seen = HashSet::new();
        let mut by_path: BTreeMap<String, MethodRouter<S>> = BTreeMap::new();

        for route in self.routes {
            let method = route.descriptor.method().clone();
            let path = route.descriptor.path().to_string();
            if !seen.insert((method.clone(), path.clone())) {
                return Err(WebError::DuplicateRoute {
                    method: method.to_string(),
                    path,
                });
            }
            let filter = MethodFilter::try_from(method.clone())
                .map_err(|_| WebError::UnsupportedMethod(method.to_string()))?;

            info!(
                handler = route.descriptor.name(),
                method = %method,
                path = %path,
                "add route"
            );

            let route = Arc::new(route);
            let endpoint = move |State(state): State<S>,
                                 match_info: Option<Path<HashMap<String, String>>>,
                                 request: Request| {
                let route = Arc::clone(&route);
                async move {
                    let match_info = match_info.map(|Path(m)| m).unwrap_or_default();
                    route.dispatch(state, match_info, request).await
                }
            };

            let entry = by_path.remove(&path).unwrap_or_default();
            by_path.insert(path, entry.on(filter, endpoint));
        }

        Ok(by_path
            .into_iter()
            .fold(Router::new(), |router, (path, methods)| {
                router.route(&path, methods)
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http;
    use crate::api::ApiError;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    async fn echo(_: (), args: CallArgs) -> HandlerResult {
        Ok(Reply::Json(Value::Object(args.into_values())))
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_argument_never_invokes_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut table = RouteTable::<()>::new();
        table.add(
            HandlerDescriptor::builder("h").post("/h").required("x").build().unwrap(),
            move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, HandlerError>(Reply::Status(200)) }
            },
        );
        let app: Router = table.into_router().unwrap().with_state(());

        let response = app
            .oneshot(
                http::Request::builder()
                    .method(Method::POST)
                    .uri("/h")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_path_variable_wins() {
        let mut table = RouteTable::<()>::new();
        table.add(
            HandlerDescriptor::builder("h").post("/h/:page").optional("page").build().unwrap(),
            echo,
        );
        let app: Router = table.into_router().unwrap().with_state(());

        let response = app
            .oneshot(
                http::Request::builder()
                    .method(Method::POST)
                    .uri("/h/3")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"page":"2"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"page": "3"}));
    }

    #[tokio::test]
    async fn test_api_error_becomes_payload() {
        let mut table = RouteTable::<()>::new();
        table.add(
            HandlerDescriptor::builder("h").get("/h").build().unwrap(),
            |_, _| async { Err::<Reply, _>(HandlerError::from(ApiError::value("email", "Invalid email."))) },
        );
        let app: Router = table.into_router().unwrap().with_state(());

        let response = app
            .oneshot(http::Request::builder().uri("/h").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["error"], "value:invalid");
        assert_eq!(body["data"], "email");
    }

    #[tokio::test]
    async fn test_handler_fault_is_500() {
        let mut table = RouteTable::<()>::new();
        table.add(
            HandlerDescriptor::builder("h").get("/h").build().unwrap(),
            |_, _| async { Err::<Reply, _>(HandlerError::Internal("boom".to_string())) },
        );
        let app: Router = table.into_router().unwrap().with_state(());

        let response = app
            .oneshot(http::Request::builder().uri("/h").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_duplicate_route_is_fatal() {
        let mut table = RouteTable::<()>::new();
        table.add(HandlerDescriptor::builder("a").get("/x").build().unwrap(), echo);
        table.add(HandlerDescriptor::builder("b").get("/x").build().unwrap(), echo);
        assert!(matches!(
            table.into_router(),
            Err(WebError::DuplicateRoute { .. })
        ));
    }

    #[test]
    fn test_find_route() {
        let mut table = RouteTable::<()>::new();
        table.add(HandlerDescriptor::builder("a").get("/x").build().unwrap(), echo);
        table.add(HandlerDescriptor::builder("b").post("/x").build().unwrap(), echo);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.find(&Method::POST, "/x").map(|r| r.descriptor().name()),
            Some("b")
        );
        assert!(table.find(&Method::DELETE, "/x").is_none());
    }
}
