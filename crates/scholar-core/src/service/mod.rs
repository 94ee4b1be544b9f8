//! Application services built on the core's ports.

pub mod tutor;
