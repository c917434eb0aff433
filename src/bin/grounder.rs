//! Grounder command-line tool
//!
//! Loads term and model resources and grounds the given mentions, printing
//! one JSON document per mention. Without mentions, lines are read from stdin.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use grounder::resources::{read_models_json, read_terms_tsv};
use grounder::{GroundError, GroundQuery, Grounder, GrounderBuilder, GrounderConfig};

/// Command-line options
#[derive(Default)]
struct Options {
    config: Option<PathBuf>,
    terms: Vec<PathBuf>,
    models: Vec<PathBuf>,
    context: Option<String>,
    organisms: Vec<String>,
    namespaces: Vec<String>,
    annotate: bool,
    mentions: Vec<String>,
}

fn usage() {
    println!("grounder - entity grounding and disambiguation");
    println!();
    println!("USAGE:");
    println!("    grounder --terms <FILE> [OPTIONS] [MENTION]...");
    println!();
    println!("OPTIONS:");
    println!("    -t, --terms <FILE>        Term TSV file (repeatable)");
    println!("    -m, --models <FILE>       Disambiguation model JSON file (repeatable)");
    println!("    -c, --config <FILE>       Grounder config JSON file");
    println!("        --context <TEXT>      Context used for disambiguation");
    println!("    -o, --organism <TAXID>    Preferred organism, highest first (repeatable)");
    println!("    -n, --namespace <DB>      Restrict results to a namespace (repeatable)");
    println!("    -a, --annotate            Treat inputs as sentences and annotate them");
    println!("    -h, --help                Print help information");
}

fn value(args: &[String], i: usize, flag: &str) -> String {
    if let Some(v) = args.get(i + 1) {
        v.clone()
    } else {
        eprintln!("error: {flag} requires a value");
        std::process::exit(1);
    }
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--terms" | "-t" => options.terms.push(PathBuf::from(value(&args, i, arg))),
            "--models" | "-m" => options.models.push(PathBuf::from(value(&args, i, arg))),
            "--config" | "-c" => options.config = Some(PathBuf::from(value(&args, i, arg))),
            "--context" => options.context = Some(value(&args, i, arg)),
            "--organism" | "-o" => options.organisms.push(value(&args, i, arg)),
            "--namespace" | "-n" => options.namespaces.push(value(&args, i, arg)),
            "--annotate" | "-a" => {
                options.annotate = true;
                i += 1;
                continue;
            }
            "--help" | "-h" => {
                usage();
                std::process::exit(0);
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                eprintln!("error: unknown argument: {flag}");
                std::process::exit(1);
            }
            mention => {
                options.mentions.push(mention.to_string());
                i += 1;
                continue;
            }
        }
        i += 2;
    }

    if options.terms.is_empty() {
        eprintln!("error: at least one --terms file is required");
        std::process::exit(1);
    }
    options
}

fn build(options: &Options) -> Result<Grounder, GroundError> {
    let config = match &options.config {
        Some(path) => GrounderConfig::from_json_file(path)?,
        None => GrounderConfig::default(),
    };

    let mut builder = GrounderBuilder::new().config(config);
    for path in &options.terms {
        builder = builder.terms(read_terms_tsv(path)?);
    }
    for path in &options.models {
        builder = builder.models(read_models_json(path)?);
    }
    Ok(builder.build()?)
}

fn run(grounder: &Grounder, options: &Options, input: &str, out: &mut impl Write) -> Result<(), GroundError> {
    let json = if options.annotate {
        let organisms: Vec<&str> = options.organisms.iter().map(String::as_str).collect();
        serde_json::to_string(&grounder.annotate(input, &organisms))
    } else {
        let mut query = GroundQuery::new(input)
            .organisms(options.organisms.iter().cloned())
            .namespaces(options.namespaces.iter().cloned());
        query.context.clone_from(&options.context);
        serde_json::to_string(&grounder.execute(&query))
    }
    .map_err(|e| GroundError::internal(format!("failed to encode result: {e}")))?;

    writeln!(out, "{json}").map_err(|e| GroundError::internal(format!("failed to write output: {e}")))
}

fn run_lines(
    grounder: &Grounder,
    options: &Options,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<(), GroundError> {
    for line in input.lines() {
        let line = line.map_err(|e| GroundError::internal(format!("failed to read input: {e}")))?;
        if !line.trim().is_empty() {
            run(grounder, options, &line, out)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grounder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let options = parse_args();
    let grounder = match build(&options) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = if options.mentions.is_empty() {
        run_lines(&grounder, &options, io::stdin().lock(), &mut out)
    } else {
        options
            .mentions
            .iter()
            .try_for_each(|mention| run(&grounder, &options, mention, &mut out))
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
