use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use serde_json::Value;
use uuid::Uuid;

use super::error::{AppError, CtxError};
use crate::middleware::mw_ctx::CtxState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// The caller a mutation is attributed to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub roles: Vec<String>,
}

impl Actor {
    pub fn new(id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            id: id.into().trim().to_string(),
            roles,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.id.is_empty()
    }
}

/// Accepts `"admin,user"` as well as `'["admin"]'`.
pub fn parse_roles_str(value: &str) -> Vec<String> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(value) {
        return roles_from_array(&items);
    }
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_roles(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => roles_from_array(items),
        Value::String(s) => parse_roles_str(s),
        _ => vec![],
    }
}

fn roles_from_array(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct Ctx {
    req_id: Uuid,
    header_user_id: Option<String>,
    header_roles: Option<String>,
}

impl Ctx {
    pub fn new(req_id: Uuid, headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            req_id,
            header_user_id: header(USER_ID_HEADER),
            header_roles: header(USER_ROLES_HEADER),
        }
    }

    /// Headers win over body fields, each one independently.
    pub fn actor(&self, body_actor_id: Option<&str>, body_roles: Option<&Value>) -> Actor {
        let id = self
            .header_user_id
            .as_deref()
            .or(body_actor_id)
            .unwrap_or_default();
        let roles = match (&self.header_roles, body_roles) {
            (Some(header), _) => parse_roles_str(header),
            (None, Some(body)) => parse_roles(body),
            (None, None) => vec![],
        };
        Actor::new(id, roles)
    }

    pub fn to_ctx_error(&self, error: AppError) -> CtxError {
        CtxError {
            error,
            req_id: self.req_id,
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<CtxState>> for Ctx {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &Arc<CtxState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Ctx::new(Uuid::new_v4(), &parts.headers))
    }
}
