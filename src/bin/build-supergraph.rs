use std::time::Instant;
use std::{env, process};

use supergraph::{EntryEdgeSet, SuperGraph};

use getopts::Options;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    // Build the supergraph.
    let entries = EntryEdgeSet::read(&config.base)?;
    let sg = SuperGraph::new(entries);
    sg.write(&config.base)?;

    // Statistics.
    eprintln!(
        "The supergraph contains {} paths starting from {} nodes with k = {}",
        sg.count(), sg.nodes().count(), sg.entries().K()
    );
    if config.verbose {
        eprintln!("Linear segment coverage histogram:");
        for (count, segments) in sg.entries().count_histogram() {
            eprintln!("{}\t{}", count, segments);
        }
    }

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub base: String,
    pub verbose: bool,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] base", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optflag("v", "verbose", "print the coverage histogram of linear segments");
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

        Config {
            base,
            verbose: matches.opt_present("v"),
        }
    }
}

//-----------------------------------------------------------------------------
