use std::time::Instant;
use std::{env, process};

use supergraph::{EntryEdgeSet, Graph, formats, kmer, utils};

use getopts::Options;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    // Read the sequences.
    if config.verbose {
        eprintln!("Reading sequences from {}", config.input_file);
    }
    let sequences = utils::read_sequence_file(&config.input_file)?;
    if config.verbose {
        let bases: usize = sequences.iter().map(|x| x.len()).sum();
        eprintln!("Read {} sequences with {} bases", sequences.len(), bases);
    }

    // Build the structures.
    let graph = Graph::from_sequences(config.k, &sequences, config.min_count)?;
    eprintln!("The graph contains {} edges with k = {}", graph.count(), graph.K());
    let entries = EntryEdgeSet::build(&graph, config.verbose)?;
    eprintln!("The graph contains {} linear segments", entries.count());

    // Write the structures.
    graph.write(&config.base)?;
    entries.write(&config.base)?;
    if config.verbose {
        let graph_file = formats::component_name(&config.base, Graph::SUFFIX, "edges");
        if let Some(size) = utils::file_size(&graph_file) {
            eprintln!("Edge file {}: {}", graph_file, size);
        }
    }

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub input_file: String,
    pub base: String,
    pub k: usize,
    pub min_count: u64,
    pub verbose: bool,
}

impl Config {
    const DEFAULT_K: usize = 25;
    const DEFAULT_MIN_COUNT: u64 = 1;

    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] sequences[.gz]", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("o", "output", "base name for the output files (default: <input>)", "BASE");
        opts.optopt("k", "kmer-length", &format!("node length k (default: {})", Self::DEFAULT_K), "INT");
        opts.optopt("m", "min-count", &format!("minimum edge multiplicity (default: {})", Self::DEFAULT_MIN_COUNT), "INT");
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

        let input_file = if let Some(s) = matches.free.first() {
            s.clone()
        } else {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };
        let base = matches.opt_str("o").unwrap_or_else(|| input_file.clone());

        let k = match matches.opt_str("k") {
            Some(s) => match s.parse::<usize>() {
                Ok(x) => x,
                Err(e) => {
                    eprintln!("Error: Failed to parse --kmer-length: {}", e);
                    process::exit(1);
                }
            },
            None => Self::DEFAULT_K,
        };
        if k == 0 || k + 1 > kmer::MAX_RHO {
            eprintln!("Error: --kmer-length must be between 1 and {}", kmer::MAX_RHO - 1);
            process::exit(1);
        }

        let min_count = match matches.opt_str("m") {
            Some(s) => match s.parse::<u64>() {
                Ok(x) => x,
                Err(e) => {
                    eprintln!("Error: Failed to parse --min-count: {}", e);
                    process::exit(1);
                }
            },
            None => Self::DEFAULT_MIN_COUNT,
        };

        Config {
            input_file,
            base,
            k,
            min_count,
            verbose: matches.opt_present("v"),
        }
    }
}

//-----------------------------------------------------------------------------
