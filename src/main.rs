use clap::Parser;
use color_eyre::Result;
use formvis::{build_form, forms, logging, App, AppConfig, AppEvent, Args, ConfigManager, Theme};
use ratatui::DefaultTerminal;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(&mut *app, frame.area()))?;
    Ok(())
}

fn run(
    mut terminal: DefaultTerminal,
    app: &mut App,
    (tx, rx): (Sender<AppEvent>, Receiver<AppEvent>),
    poll_interval: Duration,
) -> Result<()> {
    render(&mut terminal, app)?;

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

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, app)?;
        }
    }
    Ok(())
}

/// Flags that do their work without opening the form UI.
fn handle_early_exit_flags(args: &Args, config: &AppConfig) -> Result<Option<()>> {
    if args.list_forms {
        for form in forms::available_forms(&config.forms) {
            println!("{:<16} {}", form.name, form.display_title());
        }
        return Ok(Some(()));
    }

    if args.print_state {
        let state = build_form(args.form.as_deref(), args.query.as_deref(), config)?;
        println!("{}", serde_json::to_string_pretty(&state.snapshot())?);
        return Ok(Some(()));
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();
    color_eyre::install()?;

    if args.generate_config {
        let config_manager = ConfigManager::new(formvis::APP_NAME)?;
        match config_manager.write_default_config(args.force) {
            Ok(path) => {
                println!("Configuration written to {}", path.display());
                return Ok(());
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    let config = AppConfig::load(formvis::APP_NAME)?;
    if let Err(e) = logging::init_logging(formvis::APP_NAME, &config.logging) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    if let Some(()) = handle_early_exit_flags(&args, &config)? {
        return Ok(());
    }

    let form = build_form(args.form.as_deref(), args.query.as_deref(), &config)?;
    let theme = Theme::from_config(&config.theme)?;
    let mut app = App::new_with_config(form, theme, &config);
    if args.debug {
        app.enable_debug();
    }

    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let terminal = ratatui::init();
    let result = run(terminal, &mut app, channel(), poll_interval);
    ratatui::restore();
    if let Err(e) = result {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Some(query) = app.submitted() {
        println!("?{}", query.encode());
    }
    Ok(())
}
