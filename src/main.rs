//! news-alarm — today's news from a fixed set of RSS feeds, with a
//! notification when something matches your interests.
//!
//! ## Architecture overview
//!
//! ```text
//!                 ┌────────────── poll.rs (tokio tasks) ──────────────┐
//!                 │  refresh ─┐                        ┌─ check       │
//!                 │           ▼                        ▼              │
//! feed_specs.csv ─┼─► pipeline.rs ─► source/ (list, fetch, rss)       │
//!                 │           │                        │              │
//!                 │           │ today's items          ▼              │
//!                 │           │               notify.rs ◄─► settings.rs
//!                 └───────────┼────────────────────────┼──────────────┘
//!                   PollMsg   ▼                        ▼
//!                        ┌──────────┐  draw()  ┌──────────┐
//!                        │  app.rs  │ ───────► │  ui.rs   │
//!                        └──────────┘          └──────────┘
//!                             ▲ handle_key_event()
//!                        ┌──────────┐
//!                        │ input.rs │
//!                        └──────────┘
//! ```
//!
//! * **`source/`** — feed list, fetching and RSS item extraction.
//! * **`text`**, **`date`** — HTML-to-text and `pubDate` handling.
//! * **`pipeline`** — one poll across all feeds: today's items, newest first.
//! * **`notify`** — keyword matching, the seen-link ledger, delivery.
//! * **`settings`** — persisted keywords, ledger and check interval.
//! * **`query`** — category/search filtering of what is on screen.
//! * **`poll`** — the refresh and periodic-check triggers.
//! * **`app`**, **`ui`**, **`input`** — the terminal front-end.

mod app;
mod date;
mod error;
mod input;
mod notify;
mod pipeline;
mod poll;
mod query;
mod settings;
mod source;
mod text;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Runtime;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use app::App;
use input::Action;
use notify::LogNotifier;
use pipeline::IngestionPipeline;
use poll::PollContext;
use settings::SettingsStore;
use source::HttpFetcher;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file listing feeds; must have a `url` column
    #[arg(long, default_value = "feed_specs.csv")]
    feeds: PathBuf,

    /// JSON file holding interests, notified links and the check interval
    #[arg(long, default_value = "news_alarm.json")]
    settings: PathBuf,

    /// Minutes between background checks (stored; raised to at least 15)
    #[arg(long)]
    interval: Option<u64>,

    /// Per-feed request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Log destination while the terminal UI is running
    #[arg(long, default_value = "news-alarm.log")]
    log_file: PathBuf,

    /// Add an interest keyword (repeatable)
    #[arg(long = "add-interest", value_name = "KEYWORD")]
    add_interests: Vec<String>,

    /// Remove an interest keyword (repeatable)
    #[arg(long = "remove-interest", value_name = "KEYWORD")]
    remove_interests: Vec<String>,

    /// Run a single check, print the result and exit
    #[arg(long)]
    once: bool,
}

// ---------------------------------------------------------------------------
// Terminal lifetime
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Log to stderr in `--once` mode, otherwise to `log_file` (stdout belongs to
/// the UI).  The returned guard must stay alive to flush the file writer.
fn init_tracing(once: bool, log_file: &Path) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if once {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(None);
    }

    let dir = match log_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let file_name = log_file
        .file_name()
        .with_context(|| format!("log file path {} has no file name", log_file.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(Some(guard))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_tracing(args.once, &args.log_file)?;

    // -- settings ------------------------------------------------------------
    let store = Arc::new(SettingsStore::open(&args.settings));
    if let Some(minutes) = args.interval {
        let stored = store.update(|s| s.set_check_interval(minutes));
        info!(requested = minutes, stored, "check interval updated");
    }
    if !args.add_interests.is_empty() || !args.remove_interests.is_empty() {
        store.update(|s| {
            for keyword in &args.add_interests {
                s.add_interest(keyword);
            }
            for keyword in &args.remove_interests {
                s.remove_interest(keyword);
            }
        });
    }

    // -- pipeline ------------------------------------------------------------
    let timeout = Duration::from_secs(args.timeout);
    let fetcher = HttpFetcher::new(timeout).context("cannot build HTTP client")?;
    let ctx = Arc::new(PollContext {
        pipeline: IngestionPipeline::new(&args.feeds, Arc::new(fetcher)).with_fetch_timeout(timeout),
        store,
        notifier: Arc::new(LogNotifier),
    });

    let runtime = Runtime::new().context("cannot start async runtime")?;

    if args.once {
        return run_once(&runtime, &ctx);
    }

    install_panic_hook();
    let result = run_tui(&runtime, ctx);
    runtime.shutdown_background();
    result
}

fn run_once(runtime: &Runtime, ctx: &PollContext) -> Result<()> {
    let (items, request) = runtime.block_on(poll::check_once(ctx))?;

    for item in &items {
        println!("{}  {}  {}", item.pub_date, item.title, item.link);
    }
    match request {
        Some(request) => println!("notified: {} ({})", request.title, request.url),
        None => println!("no new item matches your interests"),
    }

    let settings = ctx.store.snapshot();
    let interests: Vec<&str> = settings.interests.iter().map(String::as_str).collect();
    println!(
        "interests: {}  |  remembered links: {}",
        interests.join(", "),
        settings.notified_links.len()
    );
    Ok(())
}

fn run_tui(runtime: &Runtime, ctx: Arc<PollContext>) -> Result<()> {
    // -- start background polling --------------------------------------------
    let (poller, rx) = poll::spawn(runtime.handle(), ctx);

    // -- terminal setup (restored when `guard` drops) -----------------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new();

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Drain any messages from the poller.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(msg) = rx.try_recv() {
            app.handle_poll_msg(msg);
        }

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if input::handle_key_event(&mut app, key) == Action::Refresh {
                    poller.refresh();
                }
            }
        }

        if app.quit {
            break;
        }
    }

    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
