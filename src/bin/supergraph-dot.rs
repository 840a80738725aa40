use std::io::{self, BufWriter, Write};
use std::{env, process};

use supergraph::{EntryEdgeSet, SuperGraph};

use getopts::Options;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    // Parse arguments.
    let config = Config::new();

    let entries = EntryEdgeSet::read(&config.base)?;
    let sg = SuperGraph::read(&config.base, entries)?;

    let mut out = BufWriter::new(io::stdout().lock());
    if config.dump {
        sg.dump(&mut out).map_err(|x| x.to_string())?;
    } else {
        sg.write_dot(&mut out).map_err(|x| x.to_string())?;
    }
    out.flush().map_err(|x| x.to_string())?;

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub base: String,
    pub dump: bool,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] base > output.dot", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optflag("", "dump", "write a text dump of the supergraph instead");
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
            dump: matches.opt_present("dump"),
        }
    }
}

//-----------------------------------------------------------------------------
