use benign_core::analysis::{comprehensive as build_report, summarize_generation};
use benign_core::coding::code_records;
use benign_core::dataset::{self, Dataset, DatasetKind};
use benign_core::model::{ExplanationRecord, StructuralRecord, SurpriseRecord};
use benign_core::report::{self as reports, console};
use benign_metrics::KeywordCoder;
use serde::de::DeserializeOwned;
use std::path::Path;

use super::analyze::load_jokes;
use super::{exit_codes, load, out_dir};
use crate::cli::args::{InputArgs, ReportArgs};

pub fn summary(args: InputArgs) -> anyhow::Result<i32> {
    let cfg = load(&args.common)?;
    let (_, jokes) = load_jokes(&cfg, &args)?;
    let summary = summarize_generation(&jokes.records);
    console::print(&console::render_generation(&summary));
    Ok(exit_codes::OK)
}

/// Missing measures are reported, not fatal.
fn optional<T: DeserializeOwned>(
    explicit: Option<&Path>,
    dir: &Path,
    kind: DatasetKind,
) -> anyhow::Result<Option<Dataset<T>>> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match dataset::latest(dir, kind)? {
            Some(p) => p,
            None => {
                eprintln!("note: no {} dataset found", kind.prefix());
                return Ok(None);
            }
        },
    };
    eprintln!("Loading {}", path.display());
    Ok(Some(dataset::load(&path, kind)?))
}

pub fn comprehensive(args: ReportArgs) -> anyhow::Result<i32> {
    let cfg = load(&args.common)?;
    let dir = out_dir(&cfg);

    let structure: Option<Dataset<StructuralRecord>> =
        optional(args.structure.as_deref(), &dir, DatasetKind::Structure)?;
    let surprise: Option<Dataset<SurpriseRecord>> =
        optional(args.surprise.as_deref(), &dir, DatasetKind::Surprise)?;
    let explanations: Option<Dataset<ExplanationRecord>> =
        optional(args.explanations.as_deref(), &dir, DatasetKind::Explanations)?;

    let coded = explanations.map(|mut ds| code_records(&mut ds.records, &KeywordCoder));

    let report = build_report(
        structure.as_ref().map(|d| d.records.as_slice()),
        surprise.as_ref().map(|d| d.records.as_slice()),
        coded.as_deref(),
    );
    let text = reports::comprehensive::render(&report);
    let path = reports::comprehensive::save(&dir, &report)?;

    console::print(&text);
    eprintln!("\nSaved: {}", path.display());
    Ok(exit_codes::OK)
}
