use std::io::{self, BufWriter, Write};
use std::str::FromStr;
use std::time::Instant;
use std::{env, process};

use supergraph::{ContigParams, EntryEdgeSet, Graph, SuperGraph};

use getopts::{Matches, Options};

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    let graph = Graph::read(&config.base)?;
    let mut out = BufWriter::new(io::stdout().lock());
    if config.linear_segments {
        supergraph::print_linear_segments(&graph, &config.params, &mut out).map_err(|x| x.to_string())?;
    } else {
        let entries = EntryEdgeSet::read(&config.base)?;
        let sg = SuperGraph::read(&config.base, entries)?;
        if config.verbose {
            eprintln!("Printing contigs for {} superpaths", sg.count());
        }
        sg.print_contigs(&graph, &config.params, &mut out).map_err(|x| x.to_string())?;
    }
    out.flush().map_err(|x| x.to_string())?;

    if config.verbose {
        let end_time = Instant::now();
        let seconds = end_time.duration_since(start_time).as_secs_f64();
        eprintln!("Used {:.3} seconds", seconds);
    }

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub base: String,
    pub params: ContigParams,
    pub linear_segments: bool,
    pub verbose: bool,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] base > contigs.fa", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt(
            "l", "min-length",
            &format!("minimum contig length (default: {})", ContigParams::DEFAULT_MIN_LENGTH),
            "INT"
        );
        opts.optopt(
            "c", "min-coverage",
            &format!("minimum edge coverage in linear segments (default: {})", ContigParams::DEFAULT_MIN_COVERAGE),
            "INT"
        );
        opts.optopt(
            "w", "line-width",
            &format!("sequence line width, 0 for unlimited (default: {})", ContigParams::DEFAULT_LINE_WIDTH),
            "INT"
        );
        opts.optflag("r", "reverse-complements", "print both orientations of each contig");
        opts.optflag("e", "entailed", "print contigs contained in other contigs");
        opts.optflag("t", "table", "print a table of contig statistics instead of sequences");
        opts.optflag("", "verbose-headers", "include contig statistics in FASTA headers");
        opts.optflag("", "linear-segments", "print the linear segments of the graph without a supergraph");
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

        let params = ContigParams {
            min_length: parse_option(&matches, "l", "min-length", ContigParams::DEFAULT_MIN_LENGTH),
            min_coverage: parse_option(&matches, "c", "min-coverage", ContigParams::DEFAULT_MIN_COVERAGE),
            line_width: parse_option(&matches, "w", "line-width", ContigParams::DEFAULT_LINE_WIDTH),
            print_rcs: matches.opt_present("r"),
            print_entailed: matches.opt_present("e"),
            omit_sequence: matches.opt_present("t"),
            verbose_headers: matches.opt_present("verbose-headers"),
        };

        Config {
            base,
            params,
            linear_segments: matches.opt_present("linear-segments"),
            verbose: matches.opt_present("v"),
        }
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
