//! Parameter binding shared by both dispatch styles.
//!
//! A [`Parameter`] pairs an [`ArgumentDescriptor`] with the rule that binds it
//! from the raw request (path segment, query string or JSON body).

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, request::Parts, HeaderMap, StatusCode},
    Json, RequestPartsExt,
};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::context::{ArgumentDescriptor, InvocationContext};

pub type BoxedArgument = Box<dyn Any + Send + Sync>;

type Binder = Arc<dyn Fn(&RequestInput) -> Result<BoxedArgument, BindError> + Send + Sync>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("missing path parameter `{0}`")]
    Missing(&'static str),

    #[error("invalid value for `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },

    /// The body was refused the way the `Json` extractor refuses it.
    #[error("{reason}")]
    Rejected {
        name: &'static str,
        status: StatusCode,
        reason: String,
    },

    #[error("argument `{0}` was not bound with the requested type")]
    Unbound(&'static str),
}

/// Raw request pieces a binder may read.
#[derive(Debug, Default)]
pub struct RequestInput {
    pub path: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RequestInput {
    pub async fn from_parts(parts: &mut Parts, body: Bytes) -> Self {
        let path = parts
            .extract::<Path<HashMap<String, String>>>()
            .await
            .map(|Path(p)| p)
            .unwrap_or_default();
        let query = parts
            .extract::<Query<HashMap<String, String>>>()
            .await
            .map(|Query(q)| q)
            .unwrap_or_default();

        Self {
            path,
            query,
            headers: parts.headers.clone(),
            body,
        }
    }
}

/// A declared handler parameter plus its binding rule.
#[derive(Clone)]
pub struct Parameter {
    descriptor: ArgumentDescriptor,
    binder: Binder,
}

impl Parameter {
    /// A `{name}` route segment parsed with `FromStr`.
    pub fn path<T>(name: &'static str) -> Self
    where
        T: FromStr + Send + Sync + 'static,
        T::Err: Display,
    {
        Self {
            descriptor: ArgumentDescriptor::of::<T>(name),
            binder: Arc::new(move |input: &RequestInput| {
                let raw = input.path.get(name).ok_or(BindError::Missing(name))?;
                parse::<T>(name, raw)
            }),
        }
    }

    /// An optional query-string value, `default` when absent.
    pub fn query<T>(name: &'static str, default: T) -> Self
    where
        T: FromStr + Clone + Send + Sync + 'static,
        T::Err: Display,
    {
        Self {
            descriptor: ArgumentDescriptor::of::<T>(name),
            binder: Arc::new(move |input: &RequestInput| match input.query.get(name) {
                Some(raw) => parse::<T>(name, raw),
                None => Ok(Box::new(default.clone()) as BoxedArgument),
            }),
        }
    }

    /// The request body, deserialised from JSON under the same rules as
    /// axum's `Json` extractor: 415 without a JSON content type, 400 on a
    /// syntax error, 422 when the data does not fit `T`.
    pub fn json_body<T>(name: &'static str) -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        Self {
            descriptor: ArgumentDescriptor::of::<T>(name),
            binder: Arc::new(move |input: &RequestInput| {
                if !has_json_content_type(&input.headers) {
                    return Err(BindError::Rejected {
                        name,
                        status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
                        reason: MISSING_JSON_CONTENT_TYPE.to_owned(),
                    });
                }
                Json::<T>::from_bytes(&input.body)
                    .map(|Json(v)| Box::new(v) as BoxedArgument)
                    .map_err(|rejection| BindError::Rejected {
                        name,
                        status: rejection.status(),
                        reason: rejection.body_text(),
                    })
            }),
        }
    }

    pub fn validated(mut self) -> Self {
        self.descriptor = self.descriptor.validated();
        self
    }

    pub fn descriptor(&self) -> ArgumentDescriptor {
        self.descriptor
    }

    pub fn bind(&self, input: &RequestInput) -> Result<BoxedArgument, BindError> {
        (self.binder)(input)
    }
}

const MISSING_JSON_CONTENT_TYPE: &str = "Expected request with `Content-Type: application/json`";

/// `application/json` or any `application/*+json`, parameters ignored.
fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        _ => false,
    }
}

fn parse<T>(name: &'static str, raw: &str) -> Result<BoxedArgument, BindError>
where
    T: FromStr + Send + Sync + 'static,
    T::Err: Display,
{
    raw.parse::<T>()
        .map(|v| Box::new(v) as BoxedArgument)
        .map_err(|e| BindError::Invalid {
            name,
            reason: e.to_string(),
        })
}

/// Values bound for every declared parameter of one invocation, in
/// declaration order.
#[derive(Default)]
pub struct BoundArguments {
    values: Vec<(ArgumentDescriptor, BoxedArgument)>,
}

impl BoundArguments {
    pub fn bind(parameters: &[Parameter], input: &RequestInput) -> Result<Self, BindError> {
        let values = parameters
            .iter()
            .map(|p| p.bind(input).map(|v| (p.descriptor(), v)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { values })
    }

    /// Borrow the bound values as a hook invocation for `route`.
    pub fn invocation<'a>(&'a self, route: &'a str) -> InvocationContext<'a> {
        let mut ctx = InvocationContext::new(route);
        for (descriptor, value) in &self.values {
            ctx.push(*descriptor, &**value);
        }
        ctx
    }

    /// Move a bound value out by name.
    pub fn take<T: 'static>(&mut self, name: &'static str) -> Result<T, BindError> {
        let index = self
            .values
            .iter()
            .position(|(d, _)| d.name() == name)
            .ok_or(BindError::Unbound(name))?;
        let (_, value) = self.values.remove(index);
        value
            .downcast::<T>()
            .map(|v| *v)
            .map_err(|_| BindError::Unbound(name))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
