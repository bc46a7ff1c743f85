use std::path::PathBuf;

use crate::{mask, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ShowMaskArg {
    /// Selection file written by `select`
    selection: PathBuf,
    /// Cells per grid row
    #[arg(long, default_value_t = 8)]
    grid_width: usize,
}

pub(crate) fn run(arg: &ShowMaskArg) -> anyhow::Result<()> {
    let record = util::read_selection_file(&arg.selection)?;
    println!("{}", record.best);
    print!("{}", mask::render_grid(&record.best, arg.grid_width));
    println!(
        "{} of {} features, fitness {:.2}%",
        record.selected_features.len(),
        record.feature_count,
        record.fitness
    );
    Ok(())
}
