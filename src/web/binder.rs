//! # Request Parameter Binder
//!
//! Turns a request into the exact keyword arguments a handler declared.
//!
//! 1. Keyword candidates are extracted only when the handler declares
//!    keyword parameters: from the body for state-changing methods, from the
//!    query string for GET and HEAD.
//! 2. Without a catch-all parameter, candidates are filtered to the declared
//!    names.
//! 3. Path variables are merged in and win over body or query values.
//! 4. The raw request is attached when asked for.
//! 5. Every required keyword must be present, otherwise the request is
//!    rejected before the handler runs.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use super::descriptor::HandlerProfile;
use super::errors::{WebError, WebResult};
use super::handler::CallArgs;
use super::request::{is_safe, is_state_changing, RequestContext};

const JSON: &str = "application/json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

/// Bind `request` to the parameters described by `profile`
pub fn bind(profile: &HandlerProfile, request: Arc<RequestContext>) -> WebResult<CallArgs> {
    let extracted = if profile.wants_keywords() {
        extract_keywords(&request)?
    } else {
        None
    };

    let values = match extracted {
        None => match_info_values(&request),
        Some(mut kw) => {
            if profile.only_named_kw_args() {
                kw.retain(|name, _| profile.named_kw_args.iter().any(|n| n == name));
            }
            for (name, value) in request.match_info() {
                if kw.contains_key(name) {
                    warn!(
                        arg = %name,
                        path = %request.path(),
                        "duplicate arg name in named arg and path variable"
                    );
                }
                kw.insert(name.clone(), Value::String(value.clone()));
            }
            kw
        }
    };

    let mut args = CallArgs::new(values);
    if profile.has_request_arg {
        args = args.with_request(request);
    }

    if let Some(missing) = profile
        .required_kw_args
        .iter()
        .find(|name| !args.contains(name))
    {
        return Err(WebError::bad_request(format!("Missing argument: {}", missing)));
    }
    Ok(args)
}

/// Keyword candidates from the body or query, `None` when the method
/// carries none
fn extract_keywords(request: &RequestContext) -> WebResult<Option<Map<String, Value>>> {
    if is_state_changing(request.method()) {
        return read_body(request).map(Some);
    }
    if is_safe(request.method()) {
        if let Some(qs) = request.query().filter(|qs| !qs.is_empty()) {
            return parse_query(qs).map(Some);
        }
    }
    Ok(None)
}

fn read_body(request: &RequestContext) -> WebResult<Map<String, Value>> {
    let content_type = request
        .content_type()
        .ok_or_else(|| WebError::bad_request("Missing Content-Type."))?;

    if content_type.starts_with(JSON) {
        let body: Value = serde_json::from_slice(request.body())
            .map_err(|e| WebError::bad_request(format!("Invalid JSON body: {}", e)))?;
        return match body {
            Value::Object(map) => Ok(map),
            _ => Err(WebError::bad_request("JSON body must be object.")),
        };
    }

    if content_type.starts_with(FORM_URLENCODED) {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(request.body())
            .map_err(|e| WebError::bad_request(format!("Invalid form body: {}", e)))?;
        return Ok(first_values(pairs));
    }

    if content_type.starts_with(MULTIPART) {
        let pairs = request.form().map(<[_]>::to_vec).unwrap_or_default();
        return Ok(first_values(pairs));
    }

    Err(WebError::bad_request(format!(
        "Unsupported Content-Type: {}",
        content_type
    )))
}

/// Query parameters with blank values kept; the first value of a repeated
/// key wins
pub fn parse_query(qs: &str) -> WebResult<Map<String, Value>> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(qs)
        .map_err(|e| WebError::bad_request(format!("Invalid query string: {}", e)))?;
    Ok(first_values(pairs))
}

fn first_values(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut map = Map::new();
    for (name, value) in pairs {
        map.entry(name).or_insert(Value::String(value));
    }
    map
}

fn match_info_values(request: &RequestContext) -> Map<String, Value> {
    request
        .match_info()
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::descriptor::HandlerDescriptor;
    use axum::http::header::CONTENT_TYPE;
    use axum::http::{HeaderValue, Method, Uri};
    use serde_json::json;

    fn profile(descriptor: HandlerDescriptor) -> HandlerProfile {
        descriptor.profile().clone()
    }

    fn post_json(uri: &'static str, body: &'static str) -> RequestContext {
        RequestContext::new(Method::POST, Uri::from_static(uri))
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(body)
    }

    fn page_handler() -> HandlerProfile {
        profile(
            HandlerDescriptor::builder("api_blogs")
                .get("/api/blogs")
                .optional("page")
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_missing_required_is_rejected() {
        let p = profile(
            HandlerDescriptor::builder("h")
                .post("/h")
                .required("x")
                .build()
                .unwrap(),
        );
        let err = bind(&p, Arc::new(post_json("/h", "{}"))).unwrap_err();
        assert!(matches!(err, WebError::BadRequest(ref m) if m == "Missing argument: x"));
    }

    #[test]
    fn test_json_body_filtered_to_named() {
        let p = profile(
            HandlerDescriptor::builder("h")
                .post("/h")
                .optional("page")
                .build()
                .unwrap(),
        );
        let req = post_json("/h", r#"{"page":"2","other":"x"}"#);
        let args = bind(&p, Arc::new(req)).unwrap();
        assert_eq!(args.values(), json!({"page": "2"}).as_object().unwrap());
    }

    #[test]
    fn test_path_variable_overrides_body() {
        let p = profile(
            HandlerDescriptor::builder("h")
                .post("/h/:page")
                .optional("page")
                .build()
                .unwrap(),
        );
        let req = post_json("/h/3", r#"{"page":"2"}"#).with_match_info("page", "3");
        let args = bind(&p, Arc::new(req)).unwrap();
        assert_eq!(args.values(), json!({"page": "3"}).as_object().unwrap());
    }

    #[test]
    fn test_repeated_query_key_first_wins() {
        let req = RequestContext::new(Method::GET, Uri::from_static("/api/blogs?page=2&page=5"));
        let args = bind(&page_handler(), Arc::new(req)).unwrap();
        assert_eq!(args.text("page").as_deref(), Some("2"));
    }

    #[test]
    fn test_blank_query_values_kept() {
        let req = RequestContext::new(Method::GET, Uri::from_static("/api/blogs?page="));
        let args = bind(&page_handler(), Arc::new(req)).unwrap();
        assert_eq!(args.text("page").as_deref(), Some(""));
    }

    #[test]
    fn test_get_without_query_binds_nothing() {
        let req = RequestContext::new(Method::GET, Uri::from_static("/api/blogs"));
        let args = bind(&page_handler(), Arc::new(req)).unwrap();
        assert!(args.values().is_empty());
        assert!(!args.has_request());
    }

    #[test]
    fn test_catch_all_keeps_every_key() {
        let p = profile(
            HandlerDescriptor::builder("h")
                .post("/h")
                .optional("a")
                .catch_all("kw")
                .build()
                .unwrap(),
        );
        let args = bind(&p, Arc::new(post_json("/h", r#"{"a":1,"b":true}"#))).unwrap();
        assert_eq!(args.values(), json!({"a": 1, "b": true}).as_object().unwrap());
    }

    #[test]
    fn test_positional_only_gets_match_info() {
        let p = profile(
            HandlerDescriptor::builder("get_blog")
                .get("/api/blogs/:id")
                .param("id")
                .build()
                .unwrap(),
        );
        let req = RequestContext::new(Method::GET, Uri::from_static("/api/blogs/42?x=1"))
            .with_match_info("id", "42");
        let args = bind(&p, Arc::new(req)).unwrap();
        assert_eq!(args.values(), json!({"id": "42"}).as_object().unwrap());
    }

    #[test]
    fn test_request_injected_when_declared() {
        let p = profile(
            HandlerDescriptor::builder("signout")
                .get("/signout")
                .request()
                .build()
                .unwrap(),
        );
        let req = RequestContext::new(Method::GET, Uri::from_static("/signout"));
        let args = bind(&p, Arc::new(req)).unwrap();
        assert_eq!(args.request().map(|r| r.path()), Some("/signout"));
    }

    #[test]
    fn test_missing_content_type() {
        let req = RequestContext::new(Method::POST, Uri::from_static("/api/blogs"));
        let err = bind(&page_handler(), Arc::new(req)).unwrap_err();
        assert!(matches!(err, WebError::BadRequest(ref m) if m == "Missing Content-Type."));
    }

    #[test]
    fn test_unsupported_content_type() {
        let req = RequestContext::new(Method::POST, Uri::from_static("/api/blogs"))
            .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .with_body("page=2");
        let err = bind(&page_handler(), Arc::new(req)).unwrap_err();
        assert!(matches!(err, WebError::BadRequest(ref m) if m == "Unsupported Content-Type: text/plain"));
    }

    #[test]
    fn test_json_body_must_be_object() {
        let err = bind(&page_handler(), Arc::new(post_json("/api/blogs", "[1,2]"))).unwrap_err();
        assert!(matches!(err, WebError::BadRequest(ref m) if m == "JSON body must be object."));
    }

    #[test]
    fn test_urlencoded_and_multipart_bodies() {
        let req = RequestContext::new(Method::POST, Uri::from_static("/api/blogs"))
            .with_header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .with_body("page=4&page=7");
        let args = bind(&page_handler(), Arc::new(req)).unwrap();
        assert_eq!(args.text("page").as_deref(), Some("4"));

        let req = RequestContext::new(Method::POST, Uri::from_static("/api/blogs"))
            .with_header(
                CONTENT_TYPE,
                HeaderValue::from_static("multipart/form-data; boundary=XX"),
            )
            .with_form(vec![("page".to_string(), "6".to_string())]);
        let args = bind(&page_handler(), Arc::new(req)).unwrap();
        assert_eq!(args.text("page").as_deref(), Some("6"));
    }

    #[test]
    fn test_no_keywords_skips_body_checks() {
        let p = profile(
            HandlerDescriptor::builder("delete_blog")
                .post("/api/blogs/:id/delete")
                .param("id")
                .request()
                .build()
                .unwrap(),
        );
        let req = RequestContext::new(Method::POST, Uri::from_static("/api/blogs/1/delete"))
            .with_match_info("id", "1");
        let args = bind(&p, Arc::new(req)).unwrap();
        assert_eq!(args.text("id").as_deref(), Some("1"));
        assert!(args.has_request());
    }
}
