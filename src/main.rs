use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;
use log::debug;

use rusty_stat::{Dataset, FileHandle, StatisticsEngine};

const DATA_FILE: &str = "data.csv";
const COLUMN: &str = "math_score";

fn show(value: Option<f64>) -> String {
    value.map_or_else(|| "None".to_string(), |v| format!("{v:?}"))
}

fn main() -> Result<()> {
    env_logger::init();

    let file = FileHandle::new(DATA_FILE)?;

    let mut data = Dataset::new();
    data.load(&file)
        .with_context(|| format!("loading {}", file.path().display()))?;
    if let Some(table) = data.data() {
        debug!("\n{}", pretty_format_batches(std::slice::from_ref(table))?);
    }

    let mut stat = StatisticsEngine::new();
    stat.load(Some(&data));

    println!(
        "{} dosyasindaki Matematik notlarina iliskin veriler:",
        file.path().display()
    );
    println!("Aritmetik Ortalama: {}", show(stat.mean(COLUMN)?));
    println!("Varyans: {}", show(stat.variance(COLUMN)?));
    println!("Medyan: {}", show(stat.median(COLUMN)?));
    Ok(())
}
