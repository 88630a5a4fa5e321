//! # Walk Core
//!
//! Progress tracking for teams on a multi-waypoint charity walk.
//!
//! - [`topology`]: the fixed waypoints of every route
//! - [`domain`]: check-in engine, member removal, timeout scanning and
//!   reporting, match candidates
//! - [`ports`]: store, access control, notification, clock and submission
//!   registry contracts
//! - [`infrastructure`]: in-memory adapters, plus Postgres and Redis behind
//!   the `database` feature
//!
//! ## Feature Flags
//!
//! - `database`: Postgres (sqlx) store and Redis submission registry
//! - `pg-tests`: integration suites that need a live Postgres

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;
pub mod topology;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use application::{WalkPorts, WalkServices};
pub use error::{Result, WalkError};
pub use topology::{RouteDefinition, RouteTopology, TeamSizeBounds, TopologyError};
pub use walk_model as model;
