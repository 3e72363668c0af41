// kbnav-daemon library entry point, shared by `kbnavd` and the `kbnav` CLI.

pub mod config;
pub mod http;
pub mod logging;
pub mod navigator;
pub mod rpc;
pub mod runtime;
pub mod sandbox;
pub mod search;
