use anyhow::Result;
use clap::Parser;
use dungeon_path_core::{
    Dungeon, KeySet, Position, SolveOutcome, Symbol, collectable_keys, solve_plain,
    solve_with_keys_and_doors,
};
use ratatui::{
    crossterm::{
        self,
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    collections::HashSet,
    io::{self, Stdout},
    path::PathBuf,
    time::{Duration, Instant},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Dungeon map file to load
    #[arg(short, long, value_name = "MAP_FILE")]
    map: Option<PathBuf>,

    /// Treat every door as permanently locked instead of unlockable by keys
    #[arg(long)]
    plain: bool,
}

struct App {
    /// The dungeon being solved.
    dungeon: Dungeon,
    /// The route found by the solver, start to exit. Empty if none exists.
    route: Vec<Position>,
    /// Keys held after each step of the route, index-aligned with `route`.
    keys_along_route: Vec<KeySet>,
    /// Keys lying anywhere in the wall-bounded region around the start.
    reachable_keys: KeySet,
    /// Current playback position within `route`.
    step: usize,
    /// Which rule set produced the route.
    rules_label: &'static str,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(map_file: PathBuf, plain: bool) -> Result<Self> {
        let map_string = std::fs::read_to_string(&map_file)?;
        let dungeon = Dungeon::parse(&map_string);

        let (outcome, rules_label) = if plain {
            (solve_plain(&dungeon), "plain (doors always locked)")
        } else {
            (solve_with_keys_and_doors(&dungeon), "keys and doors")
        };
        let route = match outcome {
            SolveOutcome::Path(route) => route,
            SolveOutcome::NoPath => Vec::new(),
        };
        let keys_along_route = keys_along(&dungeon, &route);
        let reachable_keys = collectable_keys(&dungeon);

        Ok(App {
            dungeon,
            route,
            keys_along_route,
            reachable_keys,
            step: 0,
            rules_label,
            should_quit: false,
        })
    }

    /// Advances route playback by one cell, stopping at the exit.
    fn tick(&mut self) {
        if self.step + 1 < self.route.len() {
            self.step += 1;
        }
    }

    fn keys_held(&self) -> KeySet {
        self.keys_along_route
            .get(self.step)
            .copied()
            .unwrap_or(KeySet::EMPTY)
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

/// The key set held after visiting each cell of the route in order.
fn keys_along(dungeon: &Dungeon, route: &[Position]) -> Vec<KeySet> {
    let mut held = KeySet::EMPTY;
    route
        .iter()
        .map(|&pos| {
            if let Ok(Symbol::Key(key)) = dungeon.symbol_at(pos) {
                held = held.with(key);
            }
            held
        })
        .collect()
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    // If no map file is provided, use the default map
    let map_file = args.map.unwrap_or(PathBuf::from("maps/dungeon01.txt"));
    // Ensure the map file exists
    if !map_file.exists() {
        return Err(anyhow::anyhow!(
            "Map file does not exist: {}",
            map_file.display()
        ));
    }

    // Create the application state before touching the terminal, so load
    // errors print normally.
    let mut app = App::new(map_file, args.plain)?;

    // Set up the terminal
    let mut terminal = setup_terminal()?;

    // Run the main application loop
    run_app(&mut terminal, &mut app)?;

    // Restore the terminal state
    restore_terminal(&mut terminal)?;

    Ok(())
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?; // Put terminal in raw mode
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?; // Use alternate screen and enable mouse capture
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into) // Map io::Error to anyhow::Error
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250); // Playback rate
    let mut last_tick = Instant::now();

    loop {
        // Draw the UI
        terminal.draw(|f| ui(f, app))?;

        // Calculate timeout for event polling
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        // Poll for events (keyboard, mouse, etc.)
        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                    _ => {}
                }
            }
        }

        // Update application state if enough time has passed
        if last_tick.elapsed() >= tick_rate {
            app.tick(); // Advance route playback
            last_tick = Instant::now();
        }

        // Exit loop if requested
        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(70), // Area for the map
            Constraint::Percentage(20), // Area for the search summary
            Constraint::Percentage(10), // Area for status/help
        ])
        .split(frame.area());

    // Render the map with the route overlaid
    render_map(frame, main_layout[0], app);

    // Render the search summary
    render_summary(frame, main_layout[1], app);

    // Render status/help text
    let help_text = Paragraph::new("Press 'q' or 'Esc' to quit.")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// Renders the solver summary panel.
fn render_summary(frame: &mut Frame, area: Rect, app: &App) {
    let route_line = if app.route.is_empty() {
        Line::from(Span::styled(
            "No route to the exit.",
            Style::default().fg(Color::Red),
        ))
    } else {
        Line::from(format!(
            "Route: {} steps ({} cells), showing step {}",
            app.route.len() - 1,
            app.route.len(),
            app.step
        ))
    };

    let lines = vec![
        Line::from(format!("Rules: {}", app.rules_label)),
        route_line,
        Line::from(format!("Keys held: {}", app.keys_held())),
        Line::from(format!(
            "Keys in reach (ignoring doors): {}",
            app.reachable_keys
        )),
    ];

    let summary = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Search"));
    frame.render_widget(summary, area);
}

/// Renders the dungeon map with the walked part of the route overlaid.
fn render_map(frame: &mut Frame, area: Rect, app: &App) {
    let walked: HashSet<Position> = app
        .route
        .iter()
        .take(app.step + 1)
        .copied()
        .collect();
    let current = app.route.get(app.step).copied();
    let keys_held = app.keys_held();

    let mut lines: Vec<Line> = Vec::with_capacity(app.dungeon.height());
    for (row, symbols) in app.dungeon.rows().enumerate() {
        let mut spans: Vec<Span> = Vec::with_capacity(symbols.len());
        for (col, &symbol) in symbols.iter().enumerate() {
            let pos = Position::new(row, col);

            if Some(pos) == current {
                spans.push(Span::styled("@", Style::default().fg(Color::Red).bold()));
                continue;
            }
            if walked.contains(&pos) && matches!(symbol, Symbol::Free) {
                spans.push(Span::styled("*", Style::default().fg(Color::Yellow)));
                continue;
            }

            let style = match symbol {
                Symbol::Wall => Style::default().fg(Color::DarkGray),
                // Doors go green once the matching key is in hand
                Symbol::Door(door) if keys_held.opens(door) => Style::default().fg(Color::Green),
                Symbol::Door(_) => Style::default().fg(Color::Magenta),
                Symbol::Key(_) => Style::default().fg(Color::Cyan),
                Symbol::Start => Style::default().fg(Color::Green),
                Symbol::Exit => Style::default().fg(Color::Green).bold(),
                Symbol::Free => Style::default(),
            };
            spans.push(Span::styled(symbol.as_char().to_string(), style));
        }
        lines.push(Line::from(spans));
    }

    let map_paragraph = Paragraph::new(lines)
        .block(Block::default().title("Dungeon").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(map_paragraph, area);
}
