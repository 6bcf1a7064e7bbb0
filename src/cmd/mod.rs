//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`watch`] or [`validate`]. Each handler lives in
//! its own submodule.

pub mod validate;
pub mod watch;

use crate::cli::{Cli, Commands};
use crate::error::HotcfgError;

pub async fn dispatch(cli: Cli) -> Result<(), HotcfgError> {
    match cli.command {
        Some(Commands::Watch(args)) => watch::execute(args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args),
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  hotcfg v{version} \u{2014} hot-reloadable configuration manager\n\n  \
         No command provided. To get started:\n\n    \
         hotcfg watch                      Watch ./config.toml, creating it if missing\n    \
         hotcfg watch -c app.yaml          Watch a specific file\n    \
         hotcfg validate app.json          Check a file without watching it\n    \
         hotcfg --help                     See all commands and options\n"
    );
}
