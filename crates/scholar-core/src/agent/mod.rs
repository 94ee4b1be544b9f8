//! Agents: the registry of personas, routing, per-call context assembly,
//! and the invoker that runs one generation call for an agent.

pub mod context;
pub mod invoker;
pub mod personas;
pub mod registry;
pub mod router;
