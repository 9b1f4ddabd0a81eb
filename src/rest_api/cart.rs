//! # Store Cart Resource
//!
//! `wc/store/cart`: a read-only snapshot of the current session's cart.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::platform::{CartSchema, Platform, SessionObject};

use super::controller::describe_route;
use super::errors::{RestError, RestResult};
use super::params::{CollectionParams, ParamSpec};

pub const NAMESPACE: &str = "wc/store";
pub const REST_BASE: &str = "cart";

pub struct CartController {
    platform: Platform,
    schema: Arc<dyn CartSchema>,
}

impl CartController {
    pub fn new(platform: Platform, schema: Arc<dyn CartSchema>) -> Self {
        Self { platform, schema }
    }

    pub fn params() -> CollectionParams {
        let mut params = CollectionParams::new();
        params.insert(
            "context",
            ParamSpec::enumerated_key(
                "Scope under which the request is made; determines fields present in response.",
                &["view", "edit"],
            )
            .default_value("view"),
        );
        params
    }

    /// The session's cart as shaped by the cart schema
    pub fn get(&self, session: Option<&str>, raw: &HashMap<String, String>) -> RestResult<Value> {
        Self::params().parse(raw)?;

        let cart = match self.platform.sessions.cart_instance(session) {
            Some(SessionObject::Cart(cart)) => cart,
            Some(SessionObject::Other(kind)) => {
                tracing::warn!(kind = %kind, "session cart slot holds a non-cart object");
                return Err(RestError::CartUnavailable);
            }
            None => {
                tracing::warn!("session has no cart");
                return Err(RestError::CartUnavailable);
            }
        };

        let settings = self.platform.settings_snapshot();
        Ok(self.schema.item_response(&cart, &settings))
    }

    pub fn schema(&self) -> Value {
        self.schema.item_schema().to_json()
    }

    pub fn describe(&self) -> Value {
        describe_route(NAMESPACE, Self::params().to_json(), self.schema())
    }
}
