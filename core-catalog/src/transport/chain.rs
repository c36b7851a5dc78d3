use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::CatalogTransport;
use crate::error::{AttemptFailure, TransportError};

/// Ordered list of transports; the first acceptable payload wins.
#[derive(Default)]
pub struct TransportChain {
    transports: Vec<Box<dyn CatalogTransport>>,
}

impl TransportChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, transport: impl CatalogTransport + 'static) -> Self {
        self.transports.push(Box::new(transport));
        self
    }

    pub fn push(&mut self, transport: Box<dyn CatalogTransport>) {
        self.transports.push(transport);
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.transports.iter().map(|t| t.name()).collect()
    }

    /// Try every transport in order until one yields a usable payload.
    ///
    /// On total failure, returns one entry per transport tried.
    pub async fn fetch(&self, url: &Url) -> Result<Value, Vec<AttemptFailure>> {
        let mut failures = Vec::with_capacity(self.transports.len());

        for transport in &self.transports {
            let outcome = match transport.attempt(url).await {
                Ok(payload) => check_payload(payload),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(payload) => {
                    debug!(transport = transport.name(), %url, "Catalog request succeeded");
                    return Ok(payload);
                }
                Err(error) => {
                    warn!(
                        transport = transport.name(),
                        %url,
                        error = %error,
                        "Catalog transport failed, trying next"
                    );
                    failures.push(AttemptFailure {
                        transport: transport.name().to_string(),
                        error,
                    });
                }
            }
        }

        Err(failures)
    }
}

impl std::fmt::Debug for TransportChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportChain")
            .field("transports", &self.names())
            .finish()
    }
}

/// A payload is usable when it is a JSON object without a non-null `error`.
pub(crate) fn check_payload(payload: Value) -> Result<Value, TransportError> {
    let Some(object) = payload.as_object() else {
        return Err(TransportError::Malformed(format!(
            "expected a JSON object, got {}",
            kind_of(&payload)
        )));
    };

    match object.get("error") {
        None | Some(Value::Null) => Ok(payload),
        Some(Value::String(message)) => Err(TransportError::Remote {
            code: None,
            message: message.clone(),
        }),
        Some(error) => Err(TransportError::Remote {
            code: error.get("code").and_then(Value::as_i64),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string(),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
