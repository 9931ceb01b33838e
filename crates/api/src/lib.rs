//! HTTP API: customer endpoints in two surface styles sharing one
//! pre-handler validation pipeline.

pub mod app;
pub mod binding;
pub mod context;
pub mod filter;
pub mod middleware;
pub mod mvc;
