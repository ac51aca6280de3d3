use benign_core::analysis::summarize_ratings;
use benign_core::dataset::{self, Dataset};
use benign_core::model::JokeRecord;
use benign_core::rating::{pending, RatingSession};
use benign_core::report::console;

use super::analyze::load_jokes;
use super::{exit_codes, load};
use crate::cli::args::RateArgs;

pub fn run(args: RateArgs) -> anyhow::Result<i32> {
    let cfg = load(&args.input.common)?;
    let (path, mut ds) = load_jokes(&cfg, &args.input)?;

    if !args.analyze {
        let todo = pending(&ds.records).len();
        if todo == 0 {
            eprintln!("All jokes already rated.");
        } else {
            println!("Rate each joke 1-7 (s = skip, q = save and quit). {} to rate.", todo);
            let header: Dataset<JokeRecord> = ds.with_records(Vec::new());
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let result = RatingSession::new(stdin.lock(), stdout.lock()).run(
                &mut ds.records,
                |records: &[JokeRecord]| dataset::write(&path, &header.with_records(records.to_vec())),
            )?;
            eprintln!(
                "\nRated {} jokes this session{}",
                result.rated,
                if result.quit { " (quit early)" } else { "" }
            );
        }
    }

    let summary = summarize_ratings(&ds.records);
    if summary.rated == 0 {
        eprintln!("No rated jokes yet.");
        return Ok(exit_codes::OK);
    }
    console::print(&console::render_ratings(&summary));
    Ok(exit_codes::OK)
}
