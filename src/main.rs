use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use facetscope::config::LoggingConfig;
use facetscope::{App, AppConfig, AppEvent, Args, ConfigManager, InputSource, LineIngestor};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(
    mut terminal: DefaultTerminal,
    args: &Args,
    config: AppConfig,
    ingestor: LineIngestor,
) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let tick_interval = Duration::from_millis(config.ingest.tick_interval_ms);

    let mut app = App::new_with_config(config)?.with_initial_facet(args.facet);
    app.attach_input(ingestor);
    render(&mut terminal, &mut app)?;

    let mut last_tick = Instant::now();
    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_interval {
            last_tick = Instant::now();
            tx.send(AppEvent::Tick)?;
        }

        let mut updated = false;
        loop {
            match rx.recv_timeout(Duration::from_millis(0)) {
                Ok(AppEvent::Exit) => return Ok(()),
                Ok(event) => {
                    if let Some(event) = app.event(&event) {
                        tx.send(event)?;
                    }
                    updated = true;
                }
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) => break,
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => return Ok(()),
            }
        }

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
}

/// Install a file logger when one is configured; otherwise logging stays off.
fn init_logging(config: &LoggingConfig) -> Result<()> {
    let Some(path) = &config.file else {
        return Ok(());
    };
    let file = File::create(path)
        .map_err(|e| eyre!("Failed to open log file {}: {}", path.display(), e))?;
    let default_filter = config.level.as_deref().unwrap_or("info");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

/// `--generate-config`: write the template and report where it went.
fn generate_config(force: bool) -> Result<()> {
    let path = ConfigManager::new(facetscope::APP_NAME)?.write_default_config(force)?;
    println!("Configuration file written to: {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.generate_config {
        if let Err(e) = generate_config(args.force) {
            eprintln!("Error writing configuration file: {}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    color_eyre::install()?;

    let mut config = AppConfig::load(facetscope::APP_NAME)?;
    config.apply_args(&args);
    config.validate()?;
    init_logging(&config.logging)?;

    let source = InputSource::new(args.input_path(), args.compression);
    let ingestor = LineIngestor::from_source(&source, config.ingest.queue_capacity)?;
    log::info!(
        "starting on {} (queue {}, tick {}ms)",
        source.describe(),
        config.ingest.queue_capacity,
        config.ingest.tick_interval_ms
    );

    let terminal = ratatui::init();
    let result = run(terminal, &args, config, ingestor);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
