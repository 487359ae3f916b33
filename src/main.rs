use anyhow::{Context, Result};
use brand_bubble_map::app::App;
use brand_bubble_map::config::{Args, MapSettings};
use brand_bubble_map::data;
use brand_bubble_map::ui;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// Owns the terminal for the lifetime of the map: raw mode, alternate
/// screen and mouse capture on creation, all restored on drop.
struct TerminalSession {
    terminal: DefaultTerminal,
}

impl TerminalSession {
    fn start() -> Result<Self> {
        let mut terminal = ratatui::init();
        terminal.clear()?;
        execute!(std::io::stdout(), EnableMouseCapture)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
        ratatui::restore();
    }
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    // Load before touching the terminal so errors print normally
    let dataset = data::load_dataset(&args.world, &args.brands, &args.master).with_context(|| {
        format!(
            "loading map data from {}, {} and {}",
            args.world.display(),
            args.brands.display(),
            args.master.display()
        )
    })?;

    let mut session = TerminalSession::start()?;
    let size = session.terminal.size()?;
    let mut app = App::new(
        dataset,
        MapSettings::from(&args),
        size.width as usize,
        size.height as usize,
    );

    run(&mut session.terminal, &mut app)
}

/// Handle mouse events for hover, panning and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Moved => app.pointer_at(mouse.column, mouse.row),
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-8, 0),
        MouseEventKind::ScrollRight => app.pan(8, 0),
        // Click and drag to pan
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
            app.pointer_at(mouse.column, mouse.row);
        }
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                    // Pan with hjkl or arrow keys
                    KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                    KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                    KeyCode::Up | KeyCode::Char('k') => app.pan(0, -5),
                    KeyCode::Down | KeyCode::Char('j') => app.pan(0, 5),

                    // Zoom
                    KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),
                    KeyCode::Char('r') | KeyCode::Char('0') => app.reset_zoom(),

                    // Category filter
                    KeyCode::Char('[') => app.step_filter(-1),
                    KeyCode::Char(']') => app.step_filter(1),
                    KeyCode::Char('f') | KeyCode::Char('F') => app.toggle_filter(),

                    KeyCode::Char('g') | KeyCode::Char('G') => app.toggle_legend(),

                    _ => {}
                },
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                Event::Resize(width, height) => app.resize(width as usize, height as usize),
                Event::FocusLost => app.pointer_leave(),
                _ => {}
            }
        }

        let now = Instant::now();
        app.tick(now - last_frame);
        last_frame = now;

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
