use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use anyhow::anyhow;
use clap::{Parser, ValueEnum, ColorChoice, ArgAction, CommandFactory};
use clap_complete::Shell;
use comfy_table::{Table, ContentArrangement};
use serde::{Deserialize, Serialize};
use is_terminal::IsTerminal;
mod counter;
mod error;
mod extract;
mod html;
mod markdown;
mod matcher;
mod severity;
mod window;

use crate::counter::SeverityCounts;
use crate::error::TallyError;
use crate::severity::Severity;
use crate::window::TimeWindow;

static ENABLE_COLOR: OnceLock<bool> = OnceLock::new();

const DEFAULT_CONFIG: &str = "logtally.toml";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OutputFmt { Text, Json }

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TextFormat { Lines, Table }

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize)]
enum LogLevel { Error, Warn, Info, Debug, Trace }

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LogFormat { Text, Json }

#[derive(Parser, Debug)]
#[command(
    name = "logtally",
    about = "Log severity counter and HTML pie-chart reporter",
    long_about = "Scans a log file for lines of the form 'YYYY-MM-DD HH:MM:SS.mmm <n> LEVEL ...', counts unique records per level (TRACE, DEBUG, INFO, WARNING, ERROR), optionally within a time window, and writes an HTML report with a pie chart.",
    after_long_help = "Examples:\n  logtally -f agent.log\n  logtally -f agent.log -st \"2023-01-01 10:00:00\" -et \"2023-01-01 12:00:00\"\n  logtally --file agent.log --time \"2023-01-01 10:00:00\" \"2023-01-01 12:00:00\" --output json",
    color = ColorChoice::Auto
)]
struct Args {
    /// Log file to scan
    #[arg(long, short = 'f')]
    file: Option<String>,
    /// Count only records strictly after this time (YYYY-MM-DD HH:MM:SS); also spelled -st
    #[arg(long, conflicts_with = "time")]
    start: Option<String>,
    /// Count only records strictly before this time (YYYY-MM-DD HH:MM:SS); also spelled -et
    #[arg(long, conflicts_with = "time")]
    end: Option<String>,
    /// Start and end of the time window in one flag
    #[arg(long, short = 't', num_args = 2, value_names = ["START", "END"])]
    time: Option<Vec<String>>,
    /// HTML report path (default ./parse_result.html)
    #[arg(long)]
    html: Option<String>,
    #[arg(long, default_value_t = false)]
    no_html: bool,
    #[arg(long, short = 'o', value_enum)]
    output: Option<OutputFmt>,
    #[arg(long, value_enum)]
    text_format: Option<TextFormat>,
    #[arg(long, short = 'j')]
    json_path: Option<String>,
    #[arg(long)]
    csv_path: Option<String>,
    #[arg(long)]
    md_path: Option<String>,
    /// TOML config file (default ./logtally.toml, or $LOGTALLY_CONFIG)
    #[arg(long)]
    config: Option<String>,
    #[arg(long, short = 'C', default_value_t = false)]
    no_color: bool,
    #[arg(long, default_value_t = false)]
    force_color: bool,
    #[arg(long)]
    log_level: Option<LogLevel>,
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
    #[arg(long)]
    log_path: Option<String>,
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
    #[arg(short = 'q', long, default_value_t = false)]
    quiet: bool,
    /// Exit with status 1 when any WARNING or ERROR record was counted
    #[arg(long, default_value_t = false)]
    warnings_as_errors: bool,
    #[arg(long, value_enum)]
    completions: Option<Shell>,
    #[arg(long)]
    completions_out: Option<String>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            file: None,
            start: None,
            end: None,
            time: None,
            html: None,
            no_html: false,
            output: None,
            text_format: None,
            json_path: None,
            csv_path: None,
            md_path: None,
            config: None,
            no_color: false,
            force_color: false,
            log_level: None,
            log_format: None,
            log_path: None,
            verbose: 0,
            quiet: false,
            warnings_as_errors: false,
            completions: None,
            completions_out: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct AppConfig {
    file: Option<String>,
    start: Option<String>,
    end: Option<String>,
    html: Option<String>,
    output: Option<OutputFmt>,
    text_format: Option<TextFormat>,
    json_path: Option<String>,
    csv_path: Option<String>,
    md_path: Option<String>,
    log_format: Option<LogFormat>,
    log_path: Option<String>,
    force_color: Option<bool>,
    warnings_as_errors: Option<bool>,
}

#[derive(Serialize)]
struct Summary<'a> {
    file: &'a str,
    window: String,
    start: Option<String>,
    end: Option<String>,
    counts: SeverityCounts,
    total: usize,
}

fn main() {
    let mut args = Args::parse_from(normalize_args(std::env::args_os()));
    if let Some(sh) = args.completions {
        let mut cmd = Args::command();
        if let Some(path) = args.completions_out.as_ref() {
            if let Ok(mut f) = std::fs::File::create(path) { clap_complete::generate(sh, &mut cmd, "logtally", &mut f); } else { clap_complete::generate(sh, &mut cmd, "logtally", &mut std::io::stdout()); }
        } else {
            clap_complete::generate(sh, &mut cmd, "logtally", &mut std::io::stdout());
        }
        return;
    }
    let cfg = load_config(&args);
    if let Ok(Some(c)) = &cfg { apply_config(&mut args, c.clone()); }
    init_logging(&args);
    match &cfg {
        Ok(Some(_)) => log::info!("Loaded configuration"),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
    let term = std::env::var("TERM").unwrap_or_default();
    let no_color_env = std::env::var_os("NO_COLOR").is_some();
    let color_default = std::io::stdout().is_terminal() && !no_color_env && term != "dumb";
    let enable_color = if args.force_color { true } else { color_default && !args.no_color };
    let _ = ENABLE_COLOR.set(enable_color);
    match run(&args) {
        Ok(counts) => {
            if args.warnings_as_errors && (counts.warnings > 0 || counts.errors > 0) { std::process::exit(1); }
        }
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("{}", paint(&format!("Error: {:#}", e), "1;31"));
            std::process::exit(2);
        }
    }
}

/// Rewrites the two-letter single-dash spellings `-st` / `-et` to their long forms.
/// Option values and everything after `--` are passed through untouched.
fn normalize_args<I: IntoIterator<Item = OsString>>(argv: I) -> Vec<OsString> {
    let cmd = Args::command();
    let mut out: Vec<OsString> = Vec::new();
    let mut pending: usize = 0;
    let mut rest = false;
    for (i, a) in argv.into_iter().enumerate() {
        if i == 0 || rest { out.push(a); continue; }
        if pending > 0 { pending -= 1; out.push(a); continue; }
        let Some(s) = a.to_str() else { out.push(a); continue };
        if s == "--" { rest = true; out.push(a); continue; }
        let token = match s {
            "-st" => "--start".to_string(),
            "-et" => "--end".to_string(),
            _ if s.starts_with("-st=") => format!("--start={}", &s[4..]),
            _ if s.starts_with("-et=") => format!("--end={}", &s[4..]),
            _ => s.to_string(),
        };
        pending = value_count(&cmd, &token);
        out.push(OsString::from(token));
    }
    out
}

/// Number of separate argv values the option in `token` consumes.
fn value_count(cmd: &clap::Command, token: &str) -> usize {
    if token.contains('=') { return 0; }
    let arg = if let Some(long) = token.strip_prefix("--") {
        cmd.get_arguments().find(|a| a.get_long() == Some(long))
    } else if let Some(short) = token.strip_prefix('-') && short.chars().count() == 1 {
        cmd.get_arguments().find(|a| a.get_short().is_some_and(|c| short.starts_with(c)))
    } else {
        None
    };
    match arg {
        Some(a) if a.get_action().takes_values() => a.get_num_args().map(|r| r.min_values()).unwrap_or(1),
        _ => 0,
    }
}

fn load_config(args: &Args) -> Result<Option<AppConfig>, TallyError> {
    let explicit = args.config.clone().or_else(|| std::env::var("LOGTALLY_CONFIG").ok());
    let (path, data) = match explicit {
        Some(p) => {
            let s = std::fs::read_to_string(&p).map_err(|e| TallyError::Config(format!("failed to read {}: {}", p, e)))?;
            (p, s)
        }
        None => match std::fs::read_to_string(DEFAULT_CONFIG) {
            Ok(s) => (DEFAULT_CONFIG.to_string(), s),
            Err(_) => return Ok(None),
        },
    };
    toml::from_str::<AppConfig>(&data).map(Some).map_err(|e| TallyError::Config(format!("failed to parse {}: {}", path, e)))
}

fn apply_config(args: &mut Args, cfg: AppConfig) {
    if args.file.is_none() && let Some(v) = cfg.file { args.file = Some(v); }
    if args.time.is_none() {
        if args.start.is_none() && let Some(v) = cfg.start { args.start = Some(v); }
        if args.end.is_none() && let Some(v) = cfg.end { args.end = Some(v); }
    }
    if args.html.is_none() && let Some(v) = cfg.html { args.html = Some(v); }
    if args.output.is_none() && let Some(v) = cfg.output { args.output = Some(v); }
    if args.text_format.is_none() && let Some(v) = cfg.text_format { args.text_format = Some(v); }
    if args.json_path.is_none() && let Some(v) = cfg.json_path { args.json_path = Some(v); }
    if args.csv_path.is_none() && let Some(v) = cfg.csv_path { args.csv_path = Some(v); }
    if args.md_path.is_none() && let Some(v) = cfg.md_path { args.md_path = Some(v); }
    if args.log_format.is_none() && let Some(v) = cfg.log_format { args.log_format = Some(v); }
    if args.log_path.is_none() && let Some(v) = cfg.log_path { args.log_path = Some(v); }
    if !args.force_color && let Some(v) = cfg.force_color { args.force_color = v; }
    if !args.warnings_as_errors && let Some(v) = cfg.warnings_as_errors { args.warnings_as_errors = v; }
}

fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if args.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if let Some(lvl) = args.log_level {
        let f = match lvl { LogLevel::Error => log::LevelFilter::Error, LogLevel::Warn => log::LevelFilter::Warn, LogLevel::Info => log::LevelFilter::Info, LogLevel::Debug => log::LevelFilter::Debug, LogLevel::Trace => log::LevelFilter::Trace };
        builder.filter_level(f);
    } else if args.verbose > 0 {
        let f = if args.verbose >= 3 { log::LevelFilter::Trace } else if args.verbose == 2 { log::LevelFilter::Debug } else { log::LevelFilter::Info };
        builder.filter_level(f);
    }
    if let Some(fmt) = args.log_format {
        match fmt {
            LogFormat::Json => {
                builder.format(|buf, record| {
                    use std::io::Write;
                    let ts = chrono::Local::now().to_rfc3339();
                    let obj = serde_json::json!({
                        "ts": ts,
                        "level": record.level().to_string(),
                        "target": record.target(),
                        "msg": record.args().to_string(),
                    });
                    writeln!(buf, "{}", obj)
                });
            }
            LogFormat::Text => {
                builder.format(|buf, record| {
                    use std::io::Write;
                    let ts = chrono::Local::now().format("%H:%M:%S");
                    writeln!(buf, "[{:<5} {}] {}", record.level(), ts, record.args())
                });
            }
        }
    }
    if let Some(path) = args.log_path.as_ref() {
        match std::fs::File::create(path) {
            Ok(f) => { builder.target(env_logger::Target::Pipe(Box::new(f))); }
            Err(e) => { eprintln!("Failed to open log file {}: {}", path, e); }
        }
    }
    builder.init();
}

fn resolve_window(args: &Args) -> Result<TimeWindow, TallyError> {
    match args.time.as_deref() {
        Some([start, end]) => TimeWindow::from_args(Some(start.as_str()), Some(end.as_str())),
        _ => TimeWindow::from_args(args.start.as_deref(), args.end.as_deref()),
    }
}

fn html_target(args: &Args) -> Option<PathBuf> {
    if args.no_html { return None; }
    Some(PathBuf::from(args.html.as_deref().unwrap_or(html::DEFAULT_HTML_PATH)))
}

fn run(args: &Args) -> anyhow::Result<SeverityCounts> {
    let file = args.file.as_deref().ok_or_else(|| anyhow!("the following required argument was not provided: --file <FILE>"))?;
    let window = resolve_window(args)?;
    if window.is_unbounded() { log::debug!("No time window given; counting the whole file"); } else { log::debug!("Time window: {}", window.describe()); }
    let matcher = matcher::LineMatcher::new()?;
    let extraction = extract::extract(Path::new(file), &matcher)?;
    let counts = counter::count(&extraction.records, &window);
    log::info!("Counted {} records in window ({})", counts.total(), window.describe());

    match args.output.unwrap_or(OutputFmt::Text) {
        OutputFmt::Text => match args.text_format.unwrap_or(TextFormat::Lines) {
            TextFormat::Lines => print_lines(&counts),
            TextFormat::Table => print_table(&counts),
        },
        OutputFmt::Json => println!("{}", serde_json::to_string_pretty(&summary(file, &window, &counts))?),
    }

    if let Some(path) = html_target(args) {
        let page = html::render_html(file, &window, &counts);
        write_file(&path, page.as_bytes())?;
    }
    if let Some(p) = args.json_path.as_ref() {
        let data = serde_json::to_vec_pretty(&summary(file, &window, &counts))?;
        write_file(Path::new(p), &data)?;
    }
    if let Some(p) = args.csv_path.as_ref() {
        write_csv(p, &counts).map_err(|e| TallyError::Write { path: p.clone(), source: e })?;
        log::info!("CSV written: {}", p);
    }
    if let Some(p) = args.md_path.as_ref() {
        let md = markdown::render_markdown(file, &window, &counts);
        write_file(Path::new(p), md.as_bytes())?;
    }
    Ok(counts)
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), TallyError> {
    std::fs::write(path, data).map_err(|e| TallyError::Write { path: path.to_string_lossy().into_owned(), source: e })?;
    log::info!("Written: {}", path.to_string_lossy());
    Ok(())
}

fn summary<'a>(file: &'a str, window: &TimeWindow, counts: &SeverityCounts) -> Summary<'a> {
    let fmt = |t: chrono::NaiveDateTime| t.format(window::CLI_TIME_FORMAT).to_string();
    Summary { file, window: window.describe(), start: window.start.map(fmt), end: window.end.map(fmt), counts: *counts, total: counts.total() }
}

fn console_lines(counts: &SeverityCounts) -> Vec<String> {
    Severity::ALL.iter().map(|s| format!("{} - {}", paint(s.label(), s.color_code()), counts.get(*s))).collect()
}

fn print_lines(counts: &SeverityCounts) {
    for l in console_lines(counts) { println!("{}", l); }
}

fn print_table(counts: &SeverityCounts) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Level", "Count"]);
    for sev in Severity::ALL { table.add_row(vec![sev.label().to_string(), counts.get(sev).to_string()]); }
    table.add_row(vec!["Total".to_string(), counts.total().to_string()]);
    println!("{}", table);
}

fn write_csv(path: &str, counts: &SeverityCounts) -> Result<(), std::io::Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["level", "count"])?;
    for sev in Severity::ALL { wtr.write_record([sev.label().to_string(), counts.get(sev).to_string()])?; }
    wtr.flush()?;
    Ok(())
}

fn paint(s: &str, code: &str) -> String {
    if *ENABLE_COLOR.get().unwrap_or(&false) { format!("\x1b[{}m{}\x1b[0m", code, s) } else { s.to_string() }
}
