//! Path to `(handler, method, params)` resolution over an explicit registration table.

mod errors;
mod path;
mod table;

pub use errors::DispatchError;
pub use path::{handler_name, split_path};
pub use table::{FallbackPolicy, Route, RouteTable};
