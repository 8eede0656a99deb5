//! Request coordination: loads the session, dispatches to a controller and commits the result.

mod app;
mod auth;
mod context;
mod dashboard;
mod errors;
mod outcome;
mod university;
mod user;
mod validation;

pub use app::{Action, App, AppResponse, BoxFuture, default_route_table};
pub use context::{RequestContext, RequestInput};
pub use errors::CoordinationError;
pub use outcome::{ActionError, ActionResult, DashboardStats, Outcome, Page, View};
