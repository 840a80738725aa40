use std::io::{self, BufWriter, Write};
use std::str::FromStr;
use std::time::Instant;
use std::{env, process};

use supergraph::{EntryEdgeSet, PathSearchParams, SuperGraph, SuperPathId};

use getopts::{Matches, Options};

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    let entries = EntryEdgeSet::read(&config.base)?;
    let sg = SuperGraph::read(&config.base, entries)?;
    for id in [config.from, config.to] {
        if !sg.valid(id) {
            return Err(format!("Superpath {} does not exist", id));
        }
        if sg.is_gap(id) {
            return Err(format!("Superpath {} is a gap", id));
        }
    }

    // Find the paths.
    let paths = supergraph::find_paths(&sg, config.from, config.to, config.init_length, &config.params);
    let mut out = BufWriter::new(io::stdout().lock());
    for path in paths.iter() {
        let len = config.init_length + path.iter().map(|id| sg.size(*id)).sum::<i64>();
        let ids: Vec<String> = path.iter().map(|id| id.to_string()).collect();
        writeln!(out, "{}\t{}", len, ids.join(" ")).map_err(|x| x.to_string())?;
    }
    out.flush().map_err(|x| x.to_string())?;
    eprintln!("Found {} paths from {} to {}", paths.len(), config.from, config.to);

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub base: String,
    pub from: SuperPathId,
    pub to: SuperPathId,
    pub init_length: i64,
    pub params: PathSearchParams,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] base from to", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt(
            "m", "min-length",
            &format!("minimum path length in edges (default: {})", PathSearchParams::DEFAULT_MIN_LENGTH),
            "INT"
        );
        opts.optopt(
            "M", "max-length",
            &format!("maximum path length in edges (default: {})", PathSearchParams::DEFAULT_MAX_LENGTH),
            "INT"
        );
        opts.optopt(
            "r", "radius",
            &format!("restrict the search to this many steps around the endpoints, 0 for no restriction (default: {})", PathSearchParams::DEFAULT_SEARCH_RADIUS),
            "INT"
        );
        opts.optopt(
            "n", "max-paths",
            &format!("maximum number of candidate paths (default: {})", PathSearchParams::DEFAULT_MAX_PATHS),
            "INT"
        );
        opts.optopt("i", "init-length", "length added to every path (default: 0)", "INT");
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

        if matches.free.len() != 3 {
            eprintln!("Error: Expected 3 positional arguments\n");
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        }
        let base = matches.free[0].clone();
        let from = SuperPathId(parse_value(&matches.free[1], "from"));
        let to = SuperPathId(parse_value(&matches.free[2], "to"));

        let params = PathSearchParams {
            min_length: parse_option(&matches, "m", "min-length", PathSearchParams::DEFAULT_MIN_LENGTH),
            max_length: parse_option(&matches, "M", "max-length", PathSearchParams::DEFAULT_MAX_LENGTH),
            search_radius: parse_option(&matches, "r", "radius", PathSearchParams::DEFAULT_SEARCH_RADIUS),
            max_paths: parse_option(&matches, "n", "max-paths", PathSearchParams::DEFAULT_MAX_PATHS),
            verbose: matches.opt_present("v"),
        };
        let init_length = parse_option(&matches, "i", "init-length", 0);

        Config { base, from, to, init_length, params }
    }
}

fn parse_value<T: FromStr>(value: &str, name: &str) -> T
where
    T::Err: std::fmt::Display,
{
    match value.parse::<T>() {
        Ok(x) => x,
        Err(e) => {
            eprintln!("Error: Failed to parse {}: {}", name, e);
            process::exit(1);
        }
    }
}

fn parse_option<T: FromStr>(matches: &Matches, short: &str, long: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match matches.opt_str(short) {
        Some(s) => parse_value(&s, &format!("--{}", long)),
        None => default,
    }
}

//-----------------------------------------------------------------------------
