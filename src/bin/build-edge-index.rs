use std::str::FromStr;
use std::time::Instant;
use std::{env, process};

use supergraph::{EdgeIndex, EdgeIndexParams, EntryEdgeSet, Graph, SuperGraph};

use getopts::{Matches, Options};

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    // Load the structures.
    let graph = Graph::read(&config.base)?;
    let entries = EntryEdgeSet::read(&config.base)?;
    let sg = SuperGraph::read(&config.base, entries)?;
    if config.params.verbose {
        eprintln!("Loaded a graph with {} edges and a supergraph with {} paths", graph.count(), sg.count());
    }

    // Build the index.
    let index = EdgeIndex::create(&graph, &sg, &config.params)?;
    index.write(&config.base)?;

    // Statistics.
    let unique = (0..index.segments()).filter(|rank| index.superpath(*rank).is_some()).count();
    eprintln!(
        "The edge index contains {} samples for {} segments, {} of them in a unique superpath",
        index.samples(), index.segments(), unique
    );

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub base: String,
    pub params: EdgeIndexParams,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] base", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt(
            "d", "div",
            &format!("sample one edge out of 2^INT (default: {})", EdgeIndexParams::DEFAULT_DIV),
            "INT"
        );
        opts.optopt(
            "t", "threads",
            &format!("number of worker threads (default: {})", EdgeIndexParams::DEFAULT_THREADS),
            "INT"
        );
        opts.optopt(
            "b", "batch-size",
            &format!("number of samples in a batch (default: {})", EdgeIndexParams::DEFAULT_BATCH_SIZE),
            "INT"
        );
        opts.optflag("v", "verbose", "print progress information");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }

        let base = if let Some(s) = matches.free.first() {
            s.clone()
        } else {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };

        let params = EdgeIndexParams {
            div: parse_option(&matches, "d", "div", EdgeIndexParams::DEFAULT_DIV),
            threads: parse_option(&matches, "t", "threads", EdgeIndexParams::DEFAULT_THREADS),
            batch_size: parse_option(&matches, "b", "batch-size", EdgeIndexParams::DEFAULT_BATCH_SIZE),
            verbose: matches.opt_present("v"),
        };

        // Validate options.
        if params.div > EdgeIndexParams::MAX_DIV {
            eprintln!("Error: --div must be at most {}", EdgeIndexParams::MAX_DIV);
            process::exit(1);
        }
        if params.threads < 1 {
            eprintln!("Error: --threads must be positive");
            process::exit(1);
        }
        if params.batch_size < 1 {
            eprintln!("Error: --batch-size must be positive");
            process::exit(1);
        }

        Config { base, params }
    }
}

fn parse_option<T: FromStr>(matches: &Matches, short: &str, long: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match matches.opt_str(short) {
        Some(s) => match s.parse::<T>() {
            Ok(x) => x,
            Err(e) => {
                eprintln!("Error: Failed to parse --{}: {}", long, e);
                process::exit(1);
            }
        },
        None => default,
    }
}

//-----------------------------------------------------------------------------
