use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::badge;
use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::directory::{self, DirectoryState};
use crate::loader;
use crate::output::{self, CardRecord};

fn print_banner() {
    const BANNER: &str = r#"
          _           _ _
 ___  ___| | ___   __| (_)_ __
/ __|/ _ \ |/ _ \ / _` | | '__|
\__ \  __/ | (_) | (_| | | |
|___/\___|_|\___/ \__,_|_|_|
       v0.1.0 - Selo Verde directory browser
    "#;
    print!("{}", BANNER);
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

#[derive(Clone, Debug)]
enum DataSource {
    Remote(reqwest::Url),
    Local(String),
}

#[derive(Clone, Debug)]
struct RunConfig {
    source: DataSource,
    asset_base: Option<reqwest::Url>,
    sector: Option<String>,
    search: String,
    interactive: bool,
    probe: bool,
    rate: u32,
    timeout: usize,
    proxy: String,
    output: Option<String>,
    output_format: Option<String>,
    no_color: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let rate = args.rate.or(cfg.rate).unwrap_or(10);
    if rate == 0 {
        return Err("invalid rate, expected positive integer".to_string());
    }
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    let proxy = args.proxy.or(cfg.proxy).unwrap_or_default();

    let url = args.url.or(cfg.url).map(|u| u.trim().to_string());
    let input_file = args
        .input_file
        .or(cfg.input_file)
        .map(|p| config::expand_tilde_string(&p));
    if url.is_some() && input_file.is_some() {
        return Err("use either --url or --input-file, not both".to_string());
    }
    let source = match (url, input_file) {
        (Some(url), None) => {
            let parsed = reqwest::Url::parse(&url).map_err(|e| format!("invalid URL '{url}': {e}"))?;
            DataSource::Remote(parsed)
        }
        (None, Some(path)) => DataSource::Local(path),
        _ => return Err("a dataset must be specified (--url or --input-file)".to_string()),
    };

    let asset_base = match args.asset_base.or(cfg.asset_base) {
        Some(base) => Some(
            reqwest::Url::parse(base.trim())
                .map_err(|e| format!("invalid asset-base '{base}': {e}"))?,
        ),
        None => match &source {
            // candidate paths resolve against the dataset's directory
            DataSource::Remote(url) => url.join(".").ok(),
            DataSource::Local(_) => None,
        },
    };

    let sector = args
        .sector
        .or(cfg.sector)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let search = args.search.or(cfg.search).unwrap_or_default();

    let interactive = args.interactive || cfg.interactive.unwrap_or(false);
    let probe = !(args.no_probe || cfg.no_probe.unwrap_or(false));

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    if interactive && output.is_some() {
        return Err("use either --interactive or --out, not both".to_string());
    }
    let output_format = args.output_format.or(cfg.output_format);
    if let Some(format) = output_format.as_deref() {
        if output::OutputFormat::parse(format).is_none() {
            return Err(format!(
                "invalid output_format '{format}', expected text, json, or html"
            ));
        }
    }

    Ok(RunConfig {
        source,
        asset_base,
        sector,
        search,
        interactive,
        probe,
        rate,
        timeout,
        proxy,
        output,
        output_format,
        no_color,
    })
}

fn print_cards(records: &[CardRecord]) {
    println!();
    if records.is_empty() {
        println!("{}", output::NO_RESULTS_MESSAGE.yellow().bold());
        return;
    }
    for r in records {
        let marker = match r.badge.as_str() {
            "logo" => "logo".green().bold(),
            "pending" => "....".dimmed(),
            _ => "SELO VERDE".green().bold(),
        };
        println!("[{}] {}", marker, r.name.bold());
        println!("      {}", r.sector_label.cyan());
        println!("      {}", r.summary);
        if let Some(url) = r.logo_url.as_deref() {
            println!("      {}", url.dimmed());
        }
        println!();
    }
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    if !run.interactive {
        print_banner();
    }

    let client = loader::build_client(run.timeout, &run.proxy)?;

    let loaded = match &run.source {
        DataSource::Remote(url) => loader::fetch_companies(&client, url).await,
        DataSource::Local(path) => loader::read_companies(path).await,
    };
    let companies = match loaded {
        Ok(companies) => companies,
        Err(e) => {
            if run.interactive {
                // show the error where the card grid would be
                let _ = crate::tui::run(
                    DirectoryState::new(Vec::new()),
                    Vec::new(),
                    client,
                    None,
                    run.rate,
                    Some(e.to_string()),
                )
                .await;
            } else {
                println!("{}", loader::LOAD_ERROR_MESSAGE.red().bold());
                format_kv_line("Cause", &e.to_string());
            }
            return Err(loader::LOAD_ERROR_MESSAGE.to_string());
        }
    };

    let sectors = directory::sector_options(&companies);
    let mut state = DirectoryState::new(companies);
    state.set_sector(run.sector.as_deref());
    state.set_search(&run.search);

    if run.interactive {
        let probe_base = if run.probe { run.asset_base.clone() } else { None };
        return crate::tui::run(state, sectors, client, probe_base, run.rate, None).await;
    }

    format_kv_line(
        "Dataset",
        &format!(
            "records={} sectors={}",
            state.companies().len(),
            sectors.len()
        ),
    );
    format_kv_line(
        "Filters",
        &format!(
            "sector={} search={}",
            run.sector.as_deref().unwrap_or("all"),
            if state.last_search().is_empty() {
                "none"
            } else {
                state.last_search()
            },
        ),
    );

    let view = state.apply_filters(false);
    format_kv_line(
        "Matches",
        &format!("{} of {}", view.len(), state.companies().len()),
    );

    let badges = match (run.probe, run.asset_base.as_ref()) {
        (true, Some(base)) if !view.is_empty() => {
            let pb = ProgressBar::new(view.len() as u64);
            pb.set_draw_target(ProgressDrawTarget::stderr());
            pb.enable_steady_tick(Duration::from_millis(200));
            pb.set_style(
                ProgressStyle::with_template(
                    ":: Progress: [{pos}/{len}] :: {per_sec} :: Duration: [{elapsed_precise}] :: {msg}",
                )
                .map_err(|e| format!("failed to build progress bar style: {e}"))?
                .progress_chars(r#"#>-"#),
            );
            pb.set_message("probing logos");
            let states = badge::probe_view(&client, base, &view, run.rate, &pb).await;
            pb.finish_and_clear();
            states
        }
        _ => view.iter().map(|c| badge::initial_state(c)).collect(),
    };

    let records = output::build_cards(&view, &badges);
    print_cards(&records);

    if let Some(outfile_path) = run.output.as_ref() {
        let output_format = run
            .output_format
            .as_deref()
            .and_then(output::OutputFormat::parse)
            .or_else(|| output::infer_format_from_path(outfile_path))
            .unwrap_or(output::OutputFormat::Text);

        let rendered = match output_format {
            output::OutputFormat::Text => output::render_text(&records),
            output::OutputFormat::Json => output::render_json(&records),
            output::OutputFormat::Html => output::render_html(&records, &sectors),
        };

        let mut outfile = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(outfile_path)
            .await
            .map_err(|e| format!("failed to open output file: {e}"))?;
        outfile
            .write_all(&rendered)
            .await
            .map_err(|_| "failed to write output file".to_string())?;
        format_kv_line("Output", outfile_path);
    }

    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    // the whole pipeline is event-driven on one thread; the probe task
    // multiplexes on the same runtime
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}
