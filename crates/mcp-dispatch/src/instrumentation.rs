//! Per-call instrumentation records.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::ErrorKind;

/// Method name recorded for requests that have no handler.
pub const UNSUPPORTED_METHOD: &str = "unsupported_method";

/// What one dispatched call did, delivered to the instrumentation callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Instrumentation {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    pub duration: Duration,
}

impl Instrumentation {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Default::default()
        }
    }
}

pub type InstrumentationCallback = Arc<dyn Fn(&Instrumentation) + Send + Sync>;
