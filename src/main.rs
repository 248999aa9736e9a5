use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use paceline::{
    app::{Action, App},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging::{default_log_level, init_logging},
    report::render_report,
    runtime::{CrosstermEventSource, Runner, TrackerEvent},
    session::{ResumeOutcome, SessionController},
    store::{KeyValueStore, SqliteStore},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

const POLL_INTERVAL_MS: u64 = 250;

/// terminal work-hour tracker that shows how far ahead or behind pace you are
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Declare how many working days and how many hours a period needs, log the hours you actually work each day, and see your running variance, the hours still remaining and a projection of where the period will end."
)]
pub struct Cli {
    /// hours assumed for each empty day when projecting the period outcome
    #[clap(long, value_parser = parse_fallback_hours)]
    fallback_hours: Option<f64>,

    /// increment applied by +/- on the minutes field
    #[clap(long)]
    minute_step: Option<u32>,

    /// path of the state database (defaults to the platform state directory)
    #[clap(long)]
    db: Option<PathBuf>,

    /// print the saved calculation and exit without starting the TUI
    #[clap(long)]
    summary: bool,

    /// write the effective settings to the config file
    #[clap(long)]
    save_config: bool,

    /// log file verbosity: trace, debug, info, warn, error or off
    #[clap(long, default_value_t = default_log_level().to_string())]
    log_level: String,
}

fn parse_fallback_hours(raw: &str) -> Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(hours) if hours.is_finite() && hours >= 0.0 => Ok(hours),
        _ => Err(format!("`{raw}` is not a non-negative number of hours")),
    }
}

impl Cli {
    fn to_config(&self, stored: Config) -> Config {
        stored.with_overrides(self.fallback_hours, self.minute_step)
    }

    fn db_path(&self) -> PathBuf {
        self.db
            .clone()
            .or_else(AppDirs::db_path)
            .unwrap_or_else(|| PathBuf::from("paceline_state.db"))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let _logger = AppDirs::log_dir().and_then(|dir| match init_logging(&cli.log_level, &dir) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("logging disabled: {err}");
            None
        }
    });

    let config_store = FileConfigStore::new();
    let config = cli.to_config(config_store.load());
    if cli.save_config {
        config_store.save(&config)?;
    }

    let kv = SqliteStore::open(cli.db_path())?;

    if cli.summary {
        print_summary(kv, &config)?;
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(kv, config)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn print_summary<K: KeyValueStore>(kv: K, config: &Config) -> Result<(), Box<dyn Error>> {
    let mut session = SessionController::new(kv, config.fallback_hours_per_day);
    if session.resume()? != ResumeOutcome::Resumed {
        println!("no saved calculation");
        return Ok(());
    }
    if let (Some(state), Some(summary)) = (session.state(), session.summary()) {
        print!("{}", render_report(state, summary));
    }
    Ok(())
}

fn start_tui<B: Backend, K: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<K>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(POLL_INTERVAL_MS),
    );

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            TrackerEvent::Tick => continue,
            TrackerEvent::Resize => {}
            TrackerEvent::Key(key) => {
                if app.on_key(key) == Action::Quit {
                    break;
                }
            }
        }
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    Ok(())
}
