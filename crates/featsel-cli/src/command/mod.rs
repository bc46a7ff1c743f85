use clap::{Parser, Subcommand};

use self::{default_config::DefaultConfigArg, select::SelectArg, show_mask::ShowMaskArg};

mod default_config;
mod select;
mod show_mask;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Select features with a genetic search scored by a neural network
    Select(#[clap(flatten)] SelectArg),
    /// Print a saved selection mask as a grid
    ShowMask(#[clap(flatten)] ShowMaskArg),
    /// Write the default configuration as JSON
    DefaultConfig(#[clap(flatten)] DefaultConfigArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Select(arg) => select::run(&arg)?,
        Mode::ShowMask(arg) => show_mask::run(&arg)?,
        Mode::DefaultConfig(arg) => default_config::run(&arg)?,
    }
    Ok(())
}
