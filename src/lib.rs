//! Verb-noun commands over a collaboration platform's REST API: group
//! owners and taxonomy term lookups, with a thin retrying client underneath.

pub mod auth;
pub mod binding;
pub mod commands;
pub mod config;
pub mod consts;
pub mod output;
pub mod remote;
pub mod session;
#[doc(hidden)]
pub mod test_support;
