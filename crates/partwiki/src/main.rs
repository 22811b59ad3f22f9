use std::fs;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, CommandFactory, Parser, Subcommand};
use partwiki_core::config::{WikiConfig, load_config};
use partwiki_core::markup::{MarkupOptions, normalize};
use partwiki_core::rewrite::apply_rewrites;
use partwiki_core::runtime::{
    PathOverrides, ResolutionContext, ResolvedPaths, inspect_runtime, resolve_paths,
};
use partwiki_core::{PageStore, Request, Response, Status};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(
    name = "partwiki",
    version,
    about = "Read, write and normalize flat-file wiki pages"
)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH")]
    root: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Print resolved runtime diagnostics")]
    diagnostics: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone)]
struct RuntimeOptions {
    root: Option<PathBuf>,
    config: Option<PathBuf>,
    diagnostics: bool,
}

impl RuntimeOptions {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            root: cli.root.clone(),
            config: cli.config.clone(),
            diagnostics: cli.diagnostics,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Print a page composed with header and footer")]
    Read(PageArgs),
    #[command(about = "Normalize a body and store it as a page")]
    Write(WriteArgs),
    #[command(about = "Normalize markup without storing it")]
    Normalize(NormalizeArgs),
    #[command(about = "Print the file a page path resolves to")]
    Resolve(PageArgs),
    #[command(about = "Show the resolved page root layout")]
    Status(StatusArgs),
}

#[derive(Debug, Args)]
struct PageArgs {
    #[arg(value_name = "PAGE")]
    path: String,
}

#[derive(Debug, Args)]
struct WriteArgs {
    #[arg(value_name = "PAGE")]
    path: String,
    #[arg(long, value_name = "FILE", help = "Read the body from FILE instead of stdin")]
    file: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct NormalizeArgs {
    #[arg(long, value_name = "FILE", help = "Read markup from FILE instead of stdin")]
    file: Option<PathBuf>,
    #[arg(long, help = "Parse as strict XML instead of tolerant HTML")]
    strict: bool,
}

#[derive(Debug, Args)]
struct StatusArgs {
    #[arg(long, help = "Emit JSON instead of text")]
    json: bool,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    root: String,
    root_source: &'static str,
    config_path: String,
    config_source: &'static str,
    config_exists: bool,
    root_exists: bool,
    header_exists: bool,
    footer_exists: bool,
    url_prefix: String,
    suffix: String,
    atomic_writes: bool,
    strict_markup: bool,
    warnings: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let runtime = RuntimeOptions::from_cli(&cli);

    match cli.command {
        Some(Commands::Read(PageArgs { path })) => run_read(&runtime, &path),
        Some(Commands::Write(args)) => run_write(&runtime, args),
        Some(Commands::Normalize(args)) => run_normalize(&runtime, args),
        Some(Commands::Resolve(PageArgs { path })) => run_resolve(&runtime, &path),
        Some(Commands::Status(args)) => run_status(&runtime, args),
        None => {
            let mut command = Cli::command();
            command.print_help()?;
            println!();
            Ok(())
        }
    }
}

fn run_read(runtime: &RuntimeOptions, page: &str) -> Result<()> {
    let (paths, config) = resolve_runtime(runtime)?;
    let store = PageStore::with_config(&paths.root, &config);
    let response = store.handle(&Request::read(page));
    finish(runtime, &paths, response)
}

fn run_write(runtime: &RuntimeOptions, args: WriteArgs) -> Result<()> {
    let (paths, config) = resolve_runtime(runtime)?;
    let body = read_input(args.file.as_deref())?;
    let store = PageStore::with_config(&paths.root, &config);
    let response = store.handle(&Request::write(args.path, body));
    finish(runtime, &paths, response)
}

fn run_normalize(runtime: &RuntimeOptions, args: NormalizeArgs) -> Result<()> {
    let (paths, config) = resolve_runtime(runtime)?;
    let options = if args.strict {
        MarkupOptions::strict()
    } else {
        config.markup_options()
    };
    let body = read_input(args.file.as_deref())?;
    let mut normalized = Vec::new();
    normalize(body.as_slice(), &mut normalized, options).context("markup rejected")?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&apply_rewrites(&normalized))?;
    stdout.flush()?;
    print_diagnostics(runtime, &paths);
    Ok(())
}

fn run_resolve(runtime: &RuntimeOptions, page: &str) -> Result<()> {
    let (paths, config) = resolve_runtime(runtime)?;
    let store = PageStore::with_config(&paths.root, &config);
    let file_path = store.resolve_path(page);
    println!("{}", normalize_path(&file_path));
    print_diagnostics(runtime, &paths);
    Ok(())
}

fn run_status(runtime: &RuntimeOptions, args: StatusArgs) -> Result<()> {
    let (paths, config) = resolve_runtime(runtime)?;
    let status = inspect_runtime(&paths, &config);
    let report = StatusReport {
        root: normalize_path(&paths.root),
        root_source: paths.root_source.as_str(),
        config_path: normalize_path(&paths.config_path),
        config_source: paths.config_source.as_str(),
        config_exists: status.config_exists,
        root_exists: status.root_exists,
        header_exists: status.header_exists,
        footer_exists: status.footer_exists,
        url_prefix: config.store.url_prefix.clone(),
        suffix: config.store.suffix.clone(),
        atomic_writes: config.store.atomic_writes,
        strict_markup: config.markup.strict,
        warnings: status.warnings,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("runtime status");
    println!("root: {} ({})", report.root, report.root_source);
    println!("root_exists: {}", format_flag(report.root_exists));
    println!("config: {} ({})", report.config_path, report.config_source);
    println!("config_exists: {}", format_flag(report.config_exists));
    println!("header_exists: {}", format_flag(report.header_exists));
    println!("footer_exists: {}", format_flag(report.footer_exists));
    println!("url_prefix: {}", report.url_prefix);
    println!("suffix: {}", report.suffix);
    println!("atomic_writes: {}", format_flag(report.atomic_writes));
    println!("strict_markup: {}", format_flag(report.strict_markup));
    if !report.warnings.is_empty() {
        println!("warnings:");
        for warning in &report.warnings {
            println!("  - {warning}");
        }
    }
    print_diagnostics(runtime, &paths);
    Ok(())
}

fn finish(runtime: &RuntimeOptions, paths: &ResolvedPaths, response: Response) -> Result<()> {
    if response.status != Status::Ok {
        let detail = String::from_utf8_lossy(&response.body);
        bail!(
            "{} ({}){}{}",
            response.status.as_str(),
            response.status.http_code(),
            if detail.is_empty() { "" } else { ": " },
            detail
        );
    }
    let mut stdout = io::stdout().lock();
    stdout.write_all(&response.body)?;
    stdout.flush()?;
    print_diagnostics(runtime, paths);
    Ok(())
}

fn resolve_runtime(runtime: &RuntimeOptions) -> Result<(ResolvedPaths, WikiConfig)> {
    dotenvy::dotenv().ok();

    let context = ResolutionContext::from_process()?;
    let overrides = PathOverrides {
        root: runtime.root.clone(),
        config: runtime.config.clone(),
    };
    let paths = resolve_paths(&context, &overrides)?;
    let config = load_config(&paths.config_path)?.with_env_overrides();
    log::debug!("page root {}", paths.root.display());
    Ok((paths, config))
}

fn read_input(file: Option<&Path>) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    match file {
        Some(path) => {
            let handle =
                fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            BufReader::new(handle)
                .read_to_end(&mut body)
                .with_context(|| format!("failed to read {}", path.display()))?;
        }
        None => {
            io::stdin()
                .lock()
                .read_to_end(&mut body)
                .context("failed to read stdin")?;
        }
    }
    Ok(body)
}

fn print_diagnostics(runtime: &RuntimeOptions, paths: &ResolvedPaths) {
    if runtime.diagnostics {
        eprintln!("\n[diagnostics]\n{}", paths.diagnostics());
    }
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn format_flag(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
