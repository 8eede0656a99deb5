//! uniadmin-axum - serves the uniadmin core over axum
//!
//! Mount [`uniadmin_router`] with an [`App`](uniadmin::App) and serve it with
//! `into_make_service_with_connect_info::<SocketAddr>()` so client addresses reach the session.

mod config;
mod error;
mod handler;
mod pages;
mod router;

pub use config::{DISPLAY_TIMEZONE, UNIADMIN_BASE_PATH};
pub use router::{uniadmin_router, uniadmin_router_no_trace};

pub use uniadmin::App;
