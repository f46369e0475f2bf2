use std::io::Write;

use clap::Parser;
use vfc::{config::Config, die, max_threads};

/// harmonic vibrational frequencies of a triatomic from a grid of Gaussian
/// single-point energies
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
struct Args {
    /// input file
    #[arg(value_parser, default_value_t = String::from("vfc.toml"))]
    infile: String,

    /// Directory of Gaussian output files, overriding `outfiles` in the input
    /// file.
    #[arg(short, long)]
    dir: Option<String>,

    /// Also write the report as JSON to <name>.json. Defaults to false.
    #[arg(short, long, default_value_t = false)]
    json: bool,

    /// Set the maximum number of threads to use. Defaults to 0, which means to
    /// use as many threads as there are CPUS.
    #[arg(short, long, default_value_t = 0)]
    threads: usize,
}

fn main() -> Result<(), std::io::Error> {
    env_logger::init();
    let args = Args::parse();
    let mut config = match Config::load(&args.infile) {
        Ok(c) => c,
        Err(e) => die!("failed to load {} with {e}", args.infile),
    };
    if let Some(dir) = args.dir {
        config = config.outfiles(dir);
    }
    max_threads(args.threads);
    println!("{config}");

    let report = match vfc::run(&config) {
        Ok(r) => r,
        Err(e) => die!("{e}"),
    };
    println!("Molecule: {}\n", config.name);
    println!("{report}");

    if args.json {
        let mut f = std::fs::File::create(format!("{}.json", config.name))?;
        writeln!(f, "{}", serde_json::to_string_pretty(&report)?)?;
    }

    println!("normal termination of vfc");

    Ok(())
}
