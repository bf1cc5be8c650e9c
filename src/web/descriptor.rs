//! # Handler Descriptors
//!
//! Each handler is registered with an explicit descriptor listing its
//! parameters. The descriptor yields a `HandlerProfile`, the fixed summary
//! the binder consults on every request.

use axum::http::Method;

use super::errors::{WebError, WebResult};

/// Reserved name under which the raw request is passed
pub const REQUEST_PARAM: &str = "request";

/// How a declared parameter is filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Filled only from path variables
    Positional,
    /// Keyword parameter without a default
    Required,
    /// Keyword parameter with a default
    Optional,
    /// Accepts every extracted key
    CatchAll,
    /// Raw request
    Request,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
}

/// What a handler expects from the binder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerProfile {
    pub has_request_arg: bool,
    pub has_var_kw_arg: bool,
    /// Required and optional keyword parameters, in declaration order
    pub named_kw_args: Vec<String>,
    pub required_kw_args: Vec<String>,
}

impl HandlerProfile {
    /// Derive the profile of `handler` from its parameter list
    pub fn from_params(handler: &str, params: &[Param]) -> WebResult<Self> {
        let mut profile = HandlerProfile::default();
        let mut seen: Vec<&str> = Vec::with_capacity(params.len());

        for param in params {
            if seen.contains(&param.name.as_str()) {
                return Err(WebError::DuplicateParam {
                    handler: handler.to_string(),
                    param: param.name.clone(),
                });
            }
            seen.push(&param.name);

            if param.name == REQUEST_PARAM && param.kind != ParamKind::Request {
                return Err(WebError::ReservedParam {
                    handler: handler.to_string(),
                    param: param.name.clone(),
                });
            }

            match param.kind {
                ParamKind::Positional if profile.has_request_arg => {
                    return Err(WebError::RequestNotLast(handler.to_string()));
                }
                ParamKind::Positional => {}
                ParamKind::Required => {
                    profile.named_kw_args.push(param.name.clone());
                    profile.required_kw_args.push(param.name.clone());
                }
                ParamKind::Optional => profile.named_kw_args.push(param.name.clone()),
                ParamKind::CatchAll => profile.has_var_kw_arg = true,
                ParamKind::Request => profile.has_request_arg = true,
            }
        }
        Ok(profile)
    }

    pub fn has_named_kw_args(&self) -> bool {
        !self.named_kw_args.is_empty()
    }

    /// Whether the binder should extract keyword candidates from the request
    pub fn wants_keywords(&self) -> bool {
        self.has_named_kw_args() || self.has_var_kw_arg || !self.required_kw_args.is_empty()
    }

    /// Only specifically named keywords are accepted
    pub fn only_named_kw_args(&self) -> bool {
        self.has_named_kw_args() && !self.has_var_kw_arg
    }
}

/// Registration record for one handler
#[derive(Debug, Clone)]
pub struct HandlerDescriptor {
    name: String,
    method: Method,
    path: String,
    params: Vec<Param>,
    profile: HandlerProfile,
}

impl HandlerDescriptor {
    pub fn builder(name: impl Into<String>) -> HandlerDescriptorBuilder {
        HandlerDescriptorBuilder {
            name: name.into(),
            route: None,
            params: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn profile(&self) -> &HandlerProfile {
        &self.profile
    }
}

/// Builder for `HandlerDescriptor`
#[derive(Debug)]
pub struct HandlerDescriptorBuilder {
    name: String,
    route: Option<(Method, String)>,
    params: Vec<Param>,
}

impl HandlerDescriptorBuilder {
    pub fn route(mut self, method: Method, path: impl Into<String>) -> Self {
        self.route = Some((method, path.into()));
        self
    }

    pub fn get(self, path: impl Into<String>) -> Self {
        self.route(Method::GET, path)
    }

    pub fn post(self, path: impl Into<String>) -> Self {
        self.route(Method::POST, path)
    }

    fn push(mut self, name: impl Into<String>, kind: ParamKind) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind,
        });
        self
    }

    /// Parameter filled from a path variable
    pub fn param(self, name: impl Into<String>) -> Self {
        self.push(name, ParamKind::Positional)
    }

    pub fn required(self, name: impl Into<String>) -> Self {
        self.push(name, ParamKind::Required)
    }

    pub fn optional(self, name: impl Into<String>) -> Self {
        self.push(name, ParamKind::Optional)
    }

    pub fn catch_all(self, name: impl Into<String>) -> Self {
        self.push(name, ParamKind::CatchAll)
    }

    /// Ask for the raw request
    pub fn request(self) -> Self {
        self.push(REQUEST_PARAM, ParamKind::Request)
    }

    pub fn build(self) -> WebResult<HandlerDescriptor> {
        let (method, path) = self
            .route
            .ok_or_else(|| WebError::MissingRoute(self.name.clone()))?;
        let profile = HandlerProfile::from_params(&self.name, &self.params)?;
        Ok(HandlerDescriptor {
            name: self.name,
            method,
            path,
            params: self.params,
            profile,
        })
    }
}
