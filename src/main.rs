mod cmdline;

use cmdline::Opts;
use firrtlator::{Error, Firrtlator, FirrtlatorResult};
use itertools::Itertools;

fn main() {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .init();

    let opts: Opts = argh::from_env();
    if let Err(err) = run(opts) {
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }
}

fn run(opts: Opts) -> FirrtlatorResult<()> {
    let mut firrtlator = Firrtlator::new()?;

    if opts.plugins {
        print_plugins(&firrtlator);
        return Ok(());
    }

    let output = opts
        .output
        .ok_or_else(|| Error::misc("no output file given"))?;
    if opts.input.is_empty() {
        return Err(Error::misc("no input file given"));
    }
    if opts.input.len() > 1 {
        log::warn!(
            "only one input file is supported; using {}",
            opts.input[0].display()
        );
    }

    firrtlator.parse_file(&opts.input[0], None)?;
    for pass in &opts.passes {
        firrtlator.pass(pass)?;
    }
    firrtlator.generate(&output, None)
}

fn print_plugins(firrtlator: &Firrtlator) {
    println!("Supported frontends:");
    for frontend in firrtlator.frontends() {
        println!("  {}", frontend.name);
        println!("    {}", frontend.description);
        println!("    Filetypes: {}", frontend.extensions.iter().join(" "));
    }
    println!();

    println!("Supported passes:");
    print!("{}", firrtlator.passes_help());
    println!();

    println!("Supported backends:");
    for backend in firrtlator.backends() {
        println!("  {}", backend.name);
        println!("    {}", backend.description);
        println!("    Filetypes: {}", backend.extensions.iter().join(" "));
    }
}
