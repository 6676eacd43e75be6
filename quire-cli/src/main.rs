use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use quire::{Document, InMemorySink, JsonSink, LayoutOpts, Paginator, RegionName, Severity};

#[derive(Parser, Debug)]
#[command(name = "quire", version)]
struct Cli {
    /// Log layout decisions to stderr.
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Paginate a document and write the page area trees as JSON.
    Paginate(PaginateArgs),
    /// Print one line per page with the text it carries.
    Outline(OutlineArgs),
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Input document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Layout options JSON; flags below override it.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Consecutive zero-progress calls tolerated before aborting.
    #[arg(long)]
    max_stalled_calls: Option<u32>,

    /// Extra height, in points, given to balanced column spans.
    #[arg(long)]
    balance_slack: Option<f64>,

    /// Leave the last multi-column span unbalanced.
    #[arg(long, default_value_t = false)]
    no_final_balance: bool,
}

#[derive(Parser, Debug)]
struct PaginateArgs {
    #[command(flatten)]
    layout: LayoutArgs,

    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct OutlineArgs {
    #[command(flatten)]
    layout: LayoutArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Paginate(args) => cmd_paginate(args),
        Command::Outline(args) => cmd_outline(args),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "quire=debug" } else { "quire=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load(args: &LayoutArgs) -> anyhow::Result<Paginator> {
    let doc = Document::from_path(&args.in_path)?;
    let mut opts = match &args.opts {
        Some(path) => read_opts(path)?,
        None => LayoutOpts::default(),
    };
    if let Some(n) = args.max_stalled_calls {
        opts.max_stalled_calls = n;
    }
    if args.balance_slack.is_some() {
        opts.balance_slack = args.balance_slack;
    }
    if args.no_final_balance {
        opts.balance_final_span = false;
    }
    Ok(Paginator::new(&doc, opts)?)
}

fn read_opts(path: &Path) -> anyhow::Result<LayoutOpts> {
    let f = File::open(path).with_context(|| format!("open opts '{}'", path.display()))?;
    serde_json::from_reader(f).with_context(|| format!("parse opts '{}'", path.display()))
}

fn report_diagnostics(paginator: &Paginator) {
    for d in paginator.diagnostics() {
        let level = match d.severity {
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        eprintln!("{level}: page {}: {} ({})", d.page, d.message, d.location);
    }
}

fn cmd_paginate(args: PaginateArgs) -> anyhow::Result<()> {
    let mut paginator = load(&args.layout)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let f = File::create(&args.out)
        .with_context(|| format!("create output '{}'", args.out.display()))?;
    let mut sink = JsonSink::new(BufWriter::new(f));
    let stats = paginator.run(&mut sink)?;
    report_diagnostics(&paginator);

    eprintln!(
        "wrote {} ({} pages, {} blank, {} rollbacks)",
        args.out.display(),
        stats.pages,
        stats.blank_pages,
        stats.rollbacks
    );
    Ok(())
}

fn cmd_outline(args: OutlineArgs) -> anyhow::Result<()> {
    let mut paginator = load(&args.layout)?;
    let mut sink = InMemorySink::new();
    paginator.run(&mut sink)?;
    report_diagnostics(&paginator);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for page in &sink.pages {
        let header = page
            .region(RegionName::RegionBefore)
            .map(|a| a.texts().join(" "))
            .unwrap_or_default();
        let tag = if page.blank { " (blank)" } else { "" };
        writeln!(
            out,
            "page {}{tag} [{}] {} | {}",
            page.number,
            page.flow_status,
            header,
            page.body_texts().join(" ")
        )?;
    }
    Ok(())
}
