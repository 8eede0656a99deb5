use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The configured default handler is not registered. This is a setup bug, not a routing miss.
    #[error("Default handler is not registered: {0}")]
    MissingHandler(String),

    /// The selected handler has no method to run.
    #[error("Handler {handler} has no method {method}")]
    MissingMethod { handler: String, method: String },

    /// A segment did not match under the strict fallback policy.
    #[error("No route for path: {0}")]
    NotFound(String),
}
