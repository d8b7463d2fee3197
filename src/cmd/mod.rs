//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`init`], [`validate`], or [`health`].
//! Each handler lives in its own submodule.

pub mod health;
pub mod init;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::StubError;

pub async fn dispatch(cli: Cli) -> Result<(), StubError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Init(ref args)) => init::execute(args),
        Some(Commands::Validate(ref args)) => validate::execute(args),
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  stubtree v{version}: configurable HTTP stub server\n\n  \
         No command provided. To get started:\n\n    \
         stubtree init                  Generate a starter config\n    \
         stubtree run                   Start the server (auto-detects ./stubtree.json)\n    \
         stubtree run -c mocks.yaml     Start with a specific config file\n    \
         stubtree --help                See all commands and options\n"
    );
}
