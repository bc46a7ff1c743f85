use std::path::PathBuf;

use featsel_training::config::SelectorConfig;

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct DefaultConfigArg {
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &DefaultConfigArg) -> anyhow::Result<()> {
    util::write_json(&SelectorConfig::default(), arg.output.as_deref())
}
