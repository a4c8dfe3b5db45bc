//! # pairing-app
//!
//! Headless app shell for the pairing client: role-gated routes, layout,
//! screen models and the `pairing` command line.

pub mod cli;
pub mod layout;
pub mod notice;
pub mod routes;
pub mod screens;
pub mod shell;

#[cfg(test)]
mod testing;

pub use layout::{Header, Sidebar};
pub use notice::{Notice, NoticeLevel, Placement};
pub use routes::{resolve, Route, RouteDecision};
pub use shell::AppShell;
