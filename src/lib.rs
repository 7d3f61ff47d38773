//! picgate - authenticated metadata gateway for a remote image service.
//!
//! The gateway authenticates callers with bearer tokens, proxies image
//! CRUD operations to the remote image-hosting API, and mirrors the
//! returned metadata into an embedded local store. Reconciliation is
//! synchronous and request-scoped: every operation is one sequence of
//! remote call and local mutation with defined ordering and
//! partial-failure policy, and there is no background sync loop.
//!
//! Module map:
//!
//! - [`remote`] - typed client for the remote image service
//! - [`store`] - local metadata persistence (redb or in-memory)
//! - [`reconcile`] - the per-verb reconciliation engine
//! - [`http`] - axum request boundary
//! - [`auth`] - bearer token verification
//! - [`config`] / [`error`] / [`model`] - plumbing and shared types

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod reconcile;
pub mod remote;
pub mod store;
