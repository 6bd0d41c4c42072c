use clap::Parser as ClapParser;
use jsonpath_dialect::{
    Options,
    cli::{self, CliError, QueryOptions, QueryResult},
};
use std::io::{self, Read};
use tracing::Level;

#[derive(ClapParser)]
#[command(name = "jsonpath")]
#[command(about = "Evaluate JSONPath queries with script expressions against JSON")]
#[command(version)]
struct Cli {
    /// The path to evaluate, e.g. '$.store.book[?(@.price < 10)].title'
    path: String,

    /// JSON input (reads from stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// Pretty-print the output
    #[arg(short, long)]
    pretty: bool,

    /// Only validate syntax, don't execute
    #[arg(long)]
    syntax_only: bool,

    /// Accept whitespace inside bracket segments
    #[arg(long)]
    lenient: bool,

    /// Allow indices and slices over objects, in key order
    #[arg(long)]
    index_objects: bool,

    /// Log compilation and evaluation details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::TRACE } else { Level::INFO })
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let input = match cli.input {
        Some(s) => Some(s),
        None if !cli.syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let request = QueryOptions {
        path: cli.path,
        input,
        syntax_only: cli.syntax_only,
        options: Options::default()
            .with_lenient_whitespace(cli.lenient)
            .with_index_objects(cli.index_objects),
    };

    match cli::execute(&request)? {
        QueryResult::SyntaxValid(canonical) => println!("Syntax is valid: {}", canonical),
        QueryResult::Success(output) => {
            let json = if cli.pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }?;
            println!("{}", json);
        }
    }
    Ok(())
}
