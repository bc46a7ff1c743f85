use std::path::PathBuf;

use featsel_training::{
    config::SelectorConfig,
    genetic::{EliteSelection, RankSelection, SelectionMethod},
    selector::FeatureSelector,
};
use rand::SeedableRng as _;
use rand_pcg::Pcg64;

use crate::{
    dataset::{RecordFormat, Records},
    mask,
    model::selection::SelectionRecord,
    util,
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum SelectionKind {
    #[default]
    Elite,
    Rank,
}

impl SelectionKind {
    fn method(self) -> Box<dyn SelectionMethod> {
        match self {
            SelectionKind::Elite => Box::new(EliteSelection::default()),
            SelectionKind::Rank => Box::new(RankSelection),
        }
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SelectArg {
    /// Data file: one record per line, comma-separated features then the class label
    data: PathBuf,
    /// JSON configuration file; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Subtracted from every feature value
    #[arg(long, default_value_t = 0.0)]
    offset: f64,
    /// Divides every feature value after subtracting the offset
    #[arg(long, default_value_t = 1.0)]
    scale: f64,
    /// Number of classes (defaults to the largest label + 1)
    #[arg(long)]
    classes: Option<usize>,
    /// Keep the file's row order instead of shuffling before the split
    #[arg(long)]
    no_shuffle: bool,
    #[arg(long, default_value = "elite")]
    selection: SelectionKind,
    #[arg(long)]
    population_size: Option<usize>,
    #[arg(long)]
    generations: Option<usize>,
    #[arg(long)]
    mutation_rate: Option<f64>,
    #[arg(long)]
    crossover_rate: Option<f64>,
    #[arg(long)]
    train_fraction: Option<f64>,
    #[arg(long)]
    learning_rate: Option<f64>,
    #[arg(long)]
    momentum: Option<f64>,
    #[arg(long)]
    max_epochs: Option<usize>,
    #[arg(long)]
    hidden_width: Option<usize>,
    /// Shuffle training samples every epoch
    #[arg(long)]
    shuffle_epochs: bool,
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Cells per row of the printed mask
    #[arg(long, default_value_t = 8)]
    grid_width: usize,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl SelectArg {
    fn load_config(&self) -> anyhow::Result<SelectorConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_config_file(path)?,
            None => SelectorConfig::default(),
        };
        let genetic = &mut config.genetic;
        let network = &mut config.network;
        override_with(&mut genetic.population_size, self.population_size);
        override_with(&mut genetic.generations, self.generations);
        override_with(&mut genetic.mutation_rate, self.mutation_rate);
        override_with(&mut genetic.crossover_rate, self.crossover_rate);
        override_with(&mut network.learning_rate, self.learning_rate);
        override_with(&mut network.momentum, self.momentum);
        override_with(&mut network.max_epochs, self.max_epochs);
        override_with(&mut network.hidden_width, self.hidden_width);
        network.shuffle |= self.shuffle_epochs;
        override_with(&mut config.train_fraction, self.train_fraction);
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn override_with<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

pub(crate) fn run(arg: &SelectArg) -> anyhow::Result<()> {
    let config = arg.load_config()?;
    anyhow::ensure!(
        arg.scale.is_finite() && arg.scale != 0.0,
        "--scale must be finite and non-zero"
    );

    let mut records = Records::open(
        &arg.data,
        RecordFormat {
            offset: arg.offset,
            scale: arg.scale,
        },
    )?;
    let classes = arg.classes.unwrap_or_else(|| records.class_count());
    eprintln!(
        "Loaded {} records with {} features and {} classes",
        records.labels.len(),
        records.features.column_count(),
        classes
    );

    let mut rng = match config.seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_rng(&mut rand::rng()),
    };
    if !arg.no_shuffle {
        records.shuffle(&mut rng);
    }
    let targets = config.margins.encode(&records.labels, classes)?;

    let selector = FeatureSelector::new(&records.features, &targets, config.clone())?
        .with_selection_method(arg.selection.method());
    eprintln!(
        "Searching with {} individuals for {} generations...",
        config.genetic.population_size, config.genetic.generations
    );
    let selection = selector.select();

    eprintln!("Generations:");
    for summary in &selection.generations {
        eprintln!(
            "  {:3}: best {:6.2}% mean {:6.2}% std {:5.2}",
            summary.generation, summary.best_fitness, summary.stats.mean, summary.stats.std_dev
        );
    }

    let best = selection.best;
    let mut record = SelectionRecord::new(arg.data.clone(), config, selection);
    match selector.fitness().evaluate_detailed(&best) {
        Ok(eval) => {
            let label = if record.config.seed.is_some() {
                "Best mask"
            } else {
                "Best mask (independent re-run)"
            };
            eprintln!(
                "{label}: train {:.2}%, validation {:.2}%",
                eval.train_accuracy, eval.valid_accuracy
            );
            record.train_accuracy = Some(eval.train_accuracy);
            record.valid_accuracy = Some(eval.valid_accuracy);
        }
        Err(e) => log::warn!("could not score best mask: {e}"),
    }

    eprintln!();
    eprintln!("Best mask ({:.2}%):", record.fitness);
    eprintln!("{best}");
    eprint!("{}", mask::render_grid(&best, arg.grid_width));
    eprintln!(
        "Selected {} of {} features: {:?}",
        record.selected_features.len(),
        record.feature_count,
        record.selected_features
    );

    util::write_json(&record, arg.output.as_deref())
}
