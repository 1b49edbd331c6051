//! Mower ROI library crate.
//!
//! This crate exposes the robotic-mowing ROI calculator as reusable
//! modules.  Applications may call [`engine::evaluate`] directly with
//! raw form answers, use the individual stages ([`inputs::resolve`],
//! [`engine::calculate`], [`engine::with_investment`],
//! [`engine::project`], [`equipment::recommend`]) or embed the HTTP API
//! via [`api::build_router`].

pub mod api;
pub mod config;
pub mod engine;
pub mod equipment;
pub mod error;
pub mod inputs;
pub mod lead;
pub mod models;
