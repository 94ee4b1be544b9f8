//! Business logic and repository trait definitions for Scholar.
//!
//! This crate defines the "ports" (the `Generator` capability and the
//! repository traits) that the infrastructure layer implements, plus the
//! routing and response pipeline built on top of them. It depends only on
//! `scholar-types` -- never on `scholar-infra` or any database/IO crate.

pub mod agent;
pub mod conversation;
pub mod llm;
pub mod pipeline;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;
