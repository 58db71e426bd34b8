use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use model_autopsy::app::{App, Screen};
use model_autopsy::client::{AutopsyApi, HttpAutopsyClient, RUN_AUTOPSY_PATH};
use model_autopsy::config::ClientConfig;
use model_autopsy::error::SubmitError;
use model_autopsy::export;
use model_autopsy::logging::{self, obj, v_str, Domain};
use model_autopsy::render::Painter;
use model_autopsy::upload::{FileSlot, SelectOutcome};
use model_autopsy::views::landing::LANDING;
use model_autopsy::views::loading::LoadingView;

#[derive(Parser, Debug)]
#[command(
    name = "model-autopsy",
    version,
    about = "Upload training and production CSVs to the autopsy API and render the report"
)]
struct Cli {
    #[arg(long, global = true, help = "Backend base URL; overrides VITE_API_BASE_URL / VITE_API_URL")]
    api_url: Option<String>,
    #[arg(long, global = true, help = "Request timeout in seconds")]
    timeout: Option<u64>,
    #[arg(long, global = true, help = "Disable ANSI colors")]
    no_color: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one analysis and print the report
    Run {
        #[arg(long)]
        train: PathBuf,
        #[arg(long)]
        prod_old: PathBuf,
        #[arg(long)]
        prod_new: PathBuf,
        /// Write the rendered report as PDF (defaults to model-autopsy-report-<date>.pdf)
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        export: Option<PathBuf>,
        /// Also write the raw report JSON
        #[arg(long)]
        json_out: Option<PathBuf>,
        /// Print the raw report JSON instead of the rendered view
        #[arg(long)]
        raw: bool,
    },
    /// Interactive dashboard driven from stdin
    Shell,
    /// Show the resolved backend URL
    Config,
    /// Probe the backend's health endpoint
    Health,
}

fn build_config(cli: &Cli) -> ClientConfig {
    let mut cfg = ClientConfig::from_env();
    if let Some(url) = &cli.api_url {
        cfg = cfg.override_api(url);
    }
    if let Some(secs) = cli.timeout {
        cfg.timeout = Duration::from_secs(secs);
    }
    cfg
}

fn painter(cli: &Cli) -> Painter {
    let color = !cli.no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
    let mut p = Painter::terminal(color);
    if let Some(cols) = std::env::var("COLUMNS").ok().and_then(|v| v.parse::<usize>().ok()) {
        p.width = cols.clamp(60, 160);
    }
    p
}

/// Await the request while ticking the cosmetic loading line on stderr.
async fn analyze_with_progress(
    app: &mut App,
    api: &dyn AutopsyApi,
    painter: &Painter,
) -> Result<(), SubmitError> {
    app.start_analysis()?;
    let animate = std::io::stderr().is_terminal();
    let started = Instant::now();
    let result = {
        let request = app.request(api);
        tokio::pin!(request);
        let mut ticker = tokio::time::interval(Duration::from_millis(250));
        loop {
            tokio::select! {
                res = &mut request => break res,
                _ = ticker.tick() => {
                    if animate {
                        let view = LoadingView::at_elapsed(started.elapsed());
                        eprint!("\r{}\x1b[K", painter.loading_line(&view));
                    }
                }
            }
        }
    };
    if animate {
        eprint!("\r\x1b[K");
    }
    let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
    app.finish_analysis(result);
    outcome
}

fn select_or_fail(app: &mut App, slot: FileSlot, path: &Path) -> Result<()> {
    match app.select_file(slot, path)? {
        SelectOutcome::Selected => Ok(()),
        SelectOutcome::Ignored => bail!("{} must be a .csv file: {}", slot.field(), path.display()),
    }
}

fn resolve_export_path(requested: &Path) -> PathBuf {
    if requested.as_os_str().is_empty() {
        export::default_pdf_path()
    } else {
        requested.to_path_buf()
    }
}

async fn cmd_run(
    cli: &Cli,
    train: &Path,
    prod_old: &Path,
    prod_new: &Path,
    export_to: Option<&Path>,
    json_out: Option<&Path>,
    raw: bool,
) -> Result<()> {
    let client = HttpAutopsyClient::new(build_config(cli))?;
    let painter = painter(cli);
    let mut app = App::new();
    app.get_started();
    select_or_fail(&mut app, FileSlot::Train, train)?;
    select_or_fail(&mut app, FileSlot::ProdOld, prod_old)?;
    select_or_fail(&mut app, FileSlot::ProdNew, prod_new)?;

    if let Err(err) = analyze_with_progress(&mut app, &client, &painter).await {
        return Err(anyhow!(err.user_message()));
    }
    let report = app.report().ok_or_else(|| anyhow!("analysis finished without a report"))?;

    if raw {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else if let Some(view) = app.report_view() {
        print!("{}", painter.report(&view));
    }
    if let Some(path) = json_out {
        export::export_json(report, path)?;
    }
    if let Some(requested) = export_to {
        let path = resolve_export_path(requested);
        app.export_pdf(&path)?;
        eprintln!("Exported {}", path.display());
    }
    Ok(())
}

const SHELL_HELP: &str = "\
commands:
  start                      leave the landing screen
  train|prod_old|prod_new <path.csv>
                             choose a file for a slot
  analyze                    run the autopsy
  export [path.pdf]          export the report as PDF
  json <path.json>           save the raw report JSON
  new                        start a new analysis (clears files)
  home                       back to the landing screen
  show                       redraw the current screen
  help                       this text
  quit";

fn draw(app: &App, painter: &Painter) {
    match app.screen() {
        Screen::Landing => print!("{}", painter.landing(&LANDING)),
        Screen::Upload => print!("{}", painter.upload(&app.upload_view())),
        Screen::Loading => print!("{}", painter.loading(&LoadingView::default())),
        Screen::Report => {
            if let Some(view) = app.report_view() {
                print!("{}", painter.report(&view));
            }
        }
    }
}

async fn cmd_shell(cli: &Cli) -> Result<()> {
    let client = HttpAutopsyClient::new(build_config(cli))?;
    let painter = painter(cli);
    let mut app = App::new();
    draw(&app, &painter);
    println!("\n(type 'help' for commands)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut parts = line.trim().splitn(2, char::is_whitespace);
        let cmd = parts.next().unwrap_or("");
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());
        match (cmd, arg) {
            ("", _) => continue,
            ("quit", _) | ("exit", _) => break,
            ("help", _) => {
                println!("{}", SHELL_HELP);
                continue;
            }
            ("start", _) => app.get_started(),
            ("analyze", _) | ("run", _) => {
                if app.screen() == Screen::Landing {
                    app.get_started();
                }
                // failures surface through the upload screen's error line
                let _ = analyze_with_progress(&mut app, &client, &painter).await;
            }
            ("export", path) => {
                let path = resolve_export_path(Path::new(path.unwrap_or("")));
                match app.export_pdf(&path) {
                    Ok(()) => println!("Exported {}", path.display()),
                    Err(e) => println!("Export failed: {:#}", e),
                }
                continue;
            }
            ("json", Some(path)) => {
                match app.report() {
                    Some(report) => match export::export_json(report, Path::new(path)) {
                        Ok(()) => println!("Saved {}", path),
                        Err(e) => println!("Save failed: {:#}", e),
                    },
                    None => println!("No report yet"),
                }
                continue;
            }
            ("new", _) | ("reset", _) => app.reset(),
            ("home", _) => app.go_home(),
            ("show", _) => {}
            (field, Some(path)) if FileSlot::from_field(field).is_some() => {
                if app.screen() == Screen::Landing {
                    app.get_started();
                }
                if let Some(slot) = FileSlot::from_field(field) {
                    match app.select_file(slot, Path::new(path)) {
                        Ok(SelectOutcome::Selected) => {}
                        Ok(SelectOutcome::Ignored) => println!("Only .csv files are accepted"),
                        Err(e) => println!("{:#}", e),
                    }
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
                continue;
            }
        }
        println!();
        draw(&app, &painter);
    }
    Ok(())
}

async fn cmd_health(cli: &Cli) -> Result<()> {
    let client = HttpAutopsyClient::new(build_config(cli))?;
    match client.health().await {
        Ok(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        Err(err) => Err(anyhow!(err.user_message())),
    }
}

fn cmd_config(cli: &Cli) -> Result<()> {
    let cfg = build_config(cli);
    println!("api_base: {}", cfg.api.base);
    println!("source:   {}", cfg.api.source.as_str());
    println!("origin:   {}", cfg.origin);
    println!("endpoint: {}", cfg.endpoint(RUN_AUTOPSY_PATH)?);
    println!("timeout:  {}s", cfg.timeout.as_secs());
    println!("dev:      {}", cfg.dev);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::info(
        Domain::System,
        "startup",
        obj(&[("version", v_str(env!("CARGO_PKG_VERSION")))]),
    );
    match &cli.command {
        Commands::Run {
            train,
            prod_old,
            prod_new,
            export,
            json_out,
            raw,
        } => {
            cmd_run(
                &cli,
                train,
                prod_old,
                prod_new,
                export.as_deref(),
                json_out.as_deref(),
                *raw,
            )
            .await
        }
        Commands::Shell => cmd_shell(&cli).await,
        Commands::Config => cmd_config(&cli),
        Commands::Health => cmd_health(&cli).await,
    }
}
