use std::fs::read_to_string;

use clap::clap_app;
use log::info;

use layout_match::layout::render::{render_text, to_dot};
use layout_match::prelude::*;
use layout_match::utils::timing::Timer;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Library(#[from] LayoutMatchError),
    #[error("cannot install logger")]
    Logger(#[from] log::SetLoggerError),
    #[error("no query: pass --query or --query-file")]
    MissingQuery,
    #[error("--top expects a number, got '{0}'")]
    BadTop(String),
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Library(e.into())
    }
}

fn main() -> std::result::Result<(), CliError> {
    let matches = clap_app!(rank_layouts =>
            (version: "0.1")
            (about: "Rank a corpus of layout sequences by similarity to a query layout")
            (@arg CORPUS: +required "Corpus file, one '<group> <tag> <fileId> <tokens...>' per line")
            (@arg QUERY: --query +takes_value "Query layout as a token sequence")
            (@arg QUERY_FILE: --("query-file") +takes_value "Read the query layout from a file")
            (@arg TOP: --top +takes_value "Number of results to print (default 10)")
            (@arg CONFIG: --config +takes_value "Scoring configuration as JSON")
            (@arg SEQUENTIAL: --sequential "Score candidates on one thread")
            (@arg SHOW_QUERY: --("show-query") "Print the optimized query tree before ranking")
            (@arg DOT: --dot "Print the optimized query tree as Graphviz DOT and exit")
            (@arg QUIET: -q "Disables logging output")
            (@arg VERBOSITY: -v +multiple "Set verbosity level of logging")
    ).get_matches();

    stderrlog::new()
        .module(module_path!())
        .module("layout_match")
        .quiet(matches.is_present("QUIET"))
        .verbosity(matches.occurrences_of("VERBOSITY") as usize)
        .timestamp(stderrlog::Timestamp::Millisecond)
        .init()?;

    let config = match matches.value_of("CONFIG") {
        Some(path) => ScoringConfig::from_json_file(path)?,
        None => ScoringConfig::default(),
    };
    let top = match matches.value_of("TOP") {
        Some(n) => n.parse::<usize>().map_err(|_| CliError::BadTop(n.to_string()))?,
        None => 10,
    };
    let query_text = match (matches.value_of("QUERY"), matches.value_of("QUERY_FILE")) {
        (Some(sequence), _) => sequence.to_string(),
        (None, Some(path)) => read_to_string(path)?,
        (None, None) => return Err(CliError::MissingQuery),
    };

    let scorer = LayoutScorer::new(config)?;
    let query = scorer.prepare(query_text.trim())?;

    if matches.is_present("DOT") {
        print!("{}", to_dot(query.main()));
        return Ok(());
    }
    if matches.is_present("SHOW_QUERY") {
        print!("{}", render_text(query.main()));
        if let Some(item) = query.item() {
            println!("item:");
            print!("{}", render_text(item));
        }
    }

    // required by clap
    let corpus_path = matches.value_of("CORPUS").unwrap_or_default();
    let corpus = {
        let _timer = Timer::new("load corpus");
        Corpus::from_path(corpus_path)?
    };
    info!(
        "{} candidates, {} rejected lines in {}",
        corpus.len(),
        corpus.rejected().len(),
        corpus_path
    );

    let ranking = Ranker::new(&scorer)
        .with_parallel(!matches.is_present("SEQUENTIAL"))
        .rank(&query, &corpus);

    for (rank, candidate) in ranking.top(top).iter().enumerate() {
        println!("{}\t{}\t{:.6}", rank + 1, candidate.id, candidate.score);
    }

    Ok(())
}
