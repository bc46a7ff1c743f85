use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use featsel_training::config::SelectorConfig;
use serde::{Serialize, de::DeserializeOwned};

use crate::model::selection::SelectionRecord;

/// Writes `value` as pretty JSON plus a trailing newline to `path`, or to stdout.
pub fn write_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    let (mut writer, target): (Box<dyn Write>, String) = match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            (Box::new(BufWriter::new(file)), path.display().to_string())
        }
        None => (Box::new(io::stdout().lock()), "stdout".to_owned()),
    };

    serde_json::to_writer_pretty(&mut writer, value)
        .and_then(|()| writeln!(writer).map_err(serde_json::Error::io))
        .with_context(|| format!("Failed to write JSON to {target}"))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush {target}"))
}

fn read_json<T>(kind: &str, path: &Path) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let file = File::open(path)
        .with_context(|| format!("Failed to open {kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {kind} file: {}", path.display()))
}

/// Reads a run configuration; fields missing from the file keep their defaults.
pub fn read_config_file<P>(path: P) -> anyhow::Result<SelectorConfig>
where
    P: AsRef<Path>,
{
    read_json("config", path.as_ref())
}

pub fn read_selection_file<P>(path: P) -> anyhow::Result<SelectionRecord>
where
    P: AsRef<Path>,
{
    read_json("selection", path.as_ref())
}

#[cfg(test)]
mod tests {
    use std::{env, fs};

    use super::*;

    #[test]
    fn test_config_file_round_trip() {
        let path = env::temp_dir().join(format!("featsel-config-{}.json", std::process::id()));
        let mut config = SelectorConfig::default();
        config.genetic.population_size = 3;
        config.seed = Some(11);

        write_json(&config, Some(&path)).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
        let read = read_config_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(read, config);
    }

    #[test]
    fn test_missing_file_names_kind() {
        let err = read_config_file("/nonexistent/featsel/config.json").unwrap_err();
        assert!(err.to_string().starts_with("Failed to open config file"));
    }
}
