//! Loading and normalizing Premier League statistics.
//!
//! Data comes from two places: the API-Football upstream (fixtures, live
//! scores, standings) and a Feathers-style backend that stores teams,
//! player profiles and per-period player stats. [`PlClient`] ties both
//! together behind one method per dashboard page.

pub mod aggregate;
mod api;
pub mod cancel;
mod client;
pub mod config;
mod error;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod pager;
pub mod session;
pub(crate) mod utils;
pub mod views;

pub use api::backend::{Backend, Listing, LoginUser, Query, TokenCheck};
pub use cancel::CancelToken;
pub use client::PlClient;
pub use config::{Config, Provider};
pub use error::{PlStatsError, Result};
pub use model::*;
pub use session::{AuthState, FileTokenStore, MemoryTokenStore, Session, TokenStore};
