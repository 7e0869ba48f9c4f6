use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use mdedit::config::Config;
use mdedit::editor::Stats;
use mdedit::error::{Error, Result};
use mdedit::{parser, translator};
use structopt::StructOpt;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, StructOpt)]
#[structopt(name = "mdedit", about = "Render markdown the way the editor preview does")]
struct Opt {
    #[structopt(long = "debug")]
    pub debug: bool,

    /// Emit a complete HTML page instead of a fragment
    #[structopt(long = "standalone")]
    pub standalone: bool,

    /// Print word and character counts instead of HTML
    #[structopt(long = "stats")]
    pub stats: bool,

    #[structopt(long = "config", parse(from_os_str), default_value = "mdedit.toml")]
    pub config: PathBuf,

    /// Output file, stdout if not present
    #[structopt(short = "o", long = "output", parse(from_os_str))]
    pub output: Option<PathBuf>,

    /// Input file, stdin if not present
    #[structopt(parse(from_os_str))]
    pub input: Option<PathBuf>,
}

fn read(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut content = String::new();
            io::stdin().lock().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}

fn write(output: Option<&Path>, buf: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, buf).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", buf)?;
            Ok(())
        }
    }
}

fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(opt: &Opt) -> Result<()> {
    let config = Config::load(&opt.config)?;
    let content = read(opt.input.as_deref())?;

    if opt.stats {
        return write(opt.output.as_deref(), &Stats::of(&content).to_string());
    }

    if opt.debug {
        let markdown = parser::parse_document(&parser::normalize(&content));
        debug!(?markdown, "parsed");
    }

    let mut html = mdedit::render(&content);
    if opt.standalone {
        html = translator::page(
            &html,
            &config.preview.title,
            config.preview.stylesheet.as_deref(),
        );
    }
    write(opt.output.as_deref(), &html)
}

fn main() {
    let opt = Opt::from_args();
    init_logging(opt.debug);
    debug!(?opt, "starting");
    if let Err(e) = run(&opt) {
        error!("{}", e);
        std::process::exit(1);
    }
}
