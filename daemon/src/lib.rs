// viewpay daemon library
// Exposes the ledger and its storage for the binary and the integration tests

#![allow(clippy::type_complexity)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::uninlined_format_args)]

extern crate log;

pub mod config;
pub mod core;
