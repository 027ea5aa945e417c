use std::path::{Path, PathBuf};

use crate::db::{copy_database, ensure_distinct, open_database, EntryCopier, EntryTable};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Input copied whole into the output.
    pub base: PathBuf,
    pub copied: usize,
    pub skipped: usize,
}

/// Merges archives into one: the largest input is taken as is, the good
/// entries of every other input are added unless their link is already there.
pub struct DbMerge {
    inputs: Vec<PathBuf>,
    output: PathBuf,
}

impl DbMerge {
    pub fn new(inputs: Vec<PathBuf>, output: PathBuf) -> Result<Self> {
        if inputs.len() < 2 {
            return Err(AppError::InvalidArgument(format!(
                "merge needs at least two input databases, got {}",
                inputs.len()
            )));
        }
        for input in &inputs {
            if !input.is_file() {
                return Err(AppError::FileNotFound(input.clone()));
            }
            ensure_distinct(input, &output)?;
        }
        Ok(Self { inputs, output })
    }

    /// Index of the largest input; the later one wins a tie.
    fn base_index(&self) -> Result<usize> {
        let mut best = 0;
        let mut best_size = 0;
        for (i, input) in self.inputs.iter().enumerate() {
            let size = std::fs::metadata(input)?.len();
            if i == 0 || size >= best_size {
                best = i;
                best_size = size;
            }
        }
        Ok(best)
    }

    pub fn convert(&self) -> Result<MergeReport> {
        let base = self.base_index()?;
        let base_path = &self.inputs[base];
        tracing::info!("Using {} as merge base", base_path.display());

        copy_database(base_path, &self.output)?;
        let dst = open_database(&self.output)?;

        let mut report = MergeReport {
            base: base_path.clone(),
            ..Default::default()
        };

        for (i, input) in self.inputs.iter().enumerate() {
            if i == base {
                continue;
            }
            let (copied, skipped) = merge_one(input, &dst)?;
            tracing::info!("{}: {} copied, {} skipped", input.display(), copied, skipped);
            report.copied += copied;
            report.skipped += skipped;
        }

        Ok(report)
    }
}

fn merge_one(input: &Path, dst: &rusqlite::Connection) -> Result<(usize, usize)> {
    let src = open_database(input)?;
    let source_entries = EntryTable::open(&src)?;
    let target_entries = EntryTable::open(dst)?;
    let copier = EntryCopier::new(&src, dst);

    let mut copied = 0;
    let mut skipped = 0;
    for entry in source_entries.good_entries()? {
        let Some(link) = entry.get("link").and_then(|v| v.as_str()) else {
            continue;
        };
        if target_entries.is_link(link)? {
            tracing::debug!("Entry {} is already present", link);
            skipped += 1;
            continue;
        }

        tracing::debug!("Copying entry {}", link);
        if copier.copy_entry(&entry)?.is_some() {
            copied += 1;
        }
    }
    Ok((copied, skipped))
}
