//! # CLI Module
//!
//! The `treerouter` binary runs a small demonstration service and inspects
//! its route table.
//!
//! ```bash
//! # serve on the default address, with files from ./public under /static
//! treerouter serve --static-dir ./public
//!
//! # settings from a TOML file, address overridden on the command line
//! treerouter serve --config treerouter.toml --addr 127.0.0.1:3000
//!
//! # print the registered routes
//! treerouter routes
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{build_demo_router, run_cli, run_command, Cli, Commands};
