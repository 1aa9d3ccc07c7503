//! Browser front-end for the Flare prediction market contract.
//!
//! Layered leaf-first: `config` and `format` are pure, `chain` wraps the
//! wallet and the contract ABI, `view` derives display models, `app` runs
//! the session, and `ui` renders it with Dioxus.

pub mod app;
pub mod chain;
pub mod clock;
pub mod config;
pub mod format;
pub mod notify;
pub mod ui;
pub mod view;

#[cfg(test)]
mod testkit;
