use respnav::app;
use respnav::ui;

use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Position, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};

use app::{App, Focus};
use respnav::config::EngineConfig;
use respnav::logging;
use respnav::prefs::{keys, read_flag, FilePrefs, MemoryPrefs, PreferenceStore};
use ui::layout::create_layout_with_help;
use ui::{ConversationPane, FilterKeyResult, NavPanel};

/// Lines scrolled per mouse wheel notch
const WHEEL_LINES: i32 = 3;

fn main() -> Result<()> {
    let fixture = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: respnav <conversation.json>")?;

    // Check if we're in a proper terminal
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("respnav must be run in an interactive terminal");
    }

    let (prefs, prefs_error): (Box<dyn PreferenceStore>, _) = match FilePrefs::load() {
        Ok(p) => (Box::new(p), None),
        Err(e) => (Box::new(MemoryPrefs::new()), Some(e)),
    };

    let log_path = logging::init(read_flag(&*prefs, keys::DEBUG));
    match &log_path {
        Ok(path) => tracing::info!(log = %path.display(), "respnav starting"),
        Err(e) => eprintln!("respnav: logging disabled: {e}"),
    }
    if let Some(e) = prefs_error {
        tracing::warn!(error = %e, "preferences will not persist this session");
    }

    let config = EngineConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "using default configuration");
        EngineConfig::default()
    });

    // Create app before touching the terminal so load errors print normally
    let mut app = App::new(&fixture, config, prefs, Instant::now())
        .context("Failed to initialize application")?;

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode - are you in a terminal?")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal (always try to restore even on error)
    let _ = disable_raw_mode();
    let _ = execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    );
    let _ = terminal.show_cursor();

    if let Err(e) = &result {
        tracing::error!(error = %e, "respnav exited with an error");
    }
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Fixture reloads, mutation delivery and engine timers
        app.tick(Instant::now());

        // Draw UI
        terminal.draw(|f| draw_ui(f, app))?;

        // Short poll so debounce and flash deadlines stay responsive
        if poll(Duration::from_millis(50))? {
            match read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(app, key),
                Event::Mouse(mouse) => handle_mouse_event(app, mouse),
                Event::Resize(_, _) => app.on_resize(Instant::now()),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    let now = Instant::now();

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // Filter input captures everything while active
    if app.panel_state.filter_active {
        match app.panel_state.handle_filter_key(key) {
            FilterKeyResult::QueryChanged | FilterKeyResult::Cleared => app.apply_filter(),
            FilterKeyResult::Deactivated | FilterKeyResult::Continue => {}
        }
        return;
    }

    // Alt+J opens the filter from anywhere
    if key.modifiers.contains(KeyModifiers::ALT) && key.code == KeyCode::Char('j') {
        app.open_filter();
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab => {
            app.focus = match app.focus {
                Focus::Panel => Focus::Conversation,
                Focus::Conversation => Focus::Panel,
            };
        }
        KeyCode::Up | KeyCode::Char('k') => match app.focus {
            Focus::Panel => app.select_previous(),
            Focus::Conversation => app.scroll_conversation(-1),
        },
        KeyCode::Down | KeyCode::Char('j') => match app.focus {
            Focus::Panel => app.select_next(),
            Focus::Conversation => app.scroll_conversation(1),
        },
        KeyCode::PageUp => app.scroll_conversation(-page_lines(app)),
        KeyCode::PageDown => app.scroll_conversation(page_lines(app)),
        KeyCode::Enter if app.focus == Focus::Panel => app.jump_selected(now),
        KeyCode::Char('l') => app.jump_latest(now),
        KeyCode::Char('/') => app.open_filter(),
        KeyCode::Esc if app.panel_state.has_filter() => {
            app.panel_state.clear_filter();
            app.apply_filter();
        }
        KeyCode::Char('c') => app.toggle_collapsed(),
        KeyCode::Char('r') => app.manual_rebuild(),
        _ => {}
    }
}

/// One page of the conversation pane, keeping a line of overlap.
fn page_lines(app: &App) -> i32 {
    let rows = app.engine.document().viewport_height() / respnav::dom::LINE_HEIGHT;
    (rows as i32 - 1).max(1)
}

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    let over_list = app
        .panel_state
        .list_area
        .is_some_and(|area| area.contains(Position::new(mouse.column, mouse.row)));

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.click(mouse.column, mouse.row, Instant::now());
        }
        MouseEventKind::ScrollUp if over_list => app.select_previous(),
        MouseEventKind::ScrollDown if over_list => app.select_next(),
        MouseEventKind::ScrollUp => app.scroll_conversation(-WHEEL_LINES),
        MouseEventKind::ScrollDown => app.scroll_conversation(WHEEL_LINES),
        _ => {}
    }
}

fn draw_ui(f: &mut Frame, app: &mut App) {
    let (doc_area, panel_area, help_area) =
        create_layout_with_help(f.area(), app.engine.is_collapsed());

    // Document viewport tracks the pane's inner height (borders take two rows)
    app.set_viewport_rows(doc_area.height.saturating_sub(2));

    let pane = ConversationPane::new(
        app.engine.document(),
        &app.config.contract,
        &app.config.markers,
        app.focus == Focus::Conversation,
    );
    f.render_widget(pane, doc_area);

    let total = app.engine.snapshot().len();
    let panel = NavPanel::new(app.engine.renderer(), total, app.focus == Focus::Panel);
    f.render_stateful_widget(panel, panel_area, &mut app.panel_state);

    draw_help_bar(f, help_area, app);
}

fn draw_help_bar(f: &mut Frame, area: Rect, app: &App) {
    if let Some((text, is_error)) = app.status.recent(Instant::now()) {
        let badge = if is_error {
            Span::styled(" ERROR ", Style::default().fg(Color::Black).bg(Color::Red))
        } else {
            Span::styled(" INFO ", Style::default().fg(Color::Black).bg(Color::Green))
        };
        let msg = Paragraph::new(Line::from(vec![badge, Span::raw(format!(" {text}"))]))
            .style(Style::default().bg(Color::DarkGray));
        f.render_widget(msg, area);
        return;
    }

    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Cyan));

    // Filter-specific help bar hints
    if app.panel_state.filter_active {
        let help = Paragraph::new(Line::from(vec![
            key(" Esc "),
            Span::raw("clear "),
            key(" Enter "),
            Span::raw("keep filter"),
        ]))
        .style(Style::default().bg(Color::DarkGray));
        f.render_widget(help, area);
        return;
    }

    let mut spans = match app.focus {
        Focus::Panel => vec![
            key(" j/k "),
            Span::raw("select "),
            key(" Enter "),
            Span::raw("jump "),
        ],
        Focus::Conversation => vec![key(" j/k "), Span::raw("scroll ")],
    };
    spans.extend(vec![
        key(" l "),
        Span::raw("latest "),
        key(" / "),
        Span::raw("filter "),
    ]);
    if app.panel_state.has_filter() {
        spans.extend(vec![key(" Esc "), Span::raw("clear filter ")]);
    }
    spans.extend(vec![
        key(" c "),
        Span::raw("collapse "),
        key(" r "),
        Span::raw("rebuild "),
        key(" Tab "),
        Span::raw("focus "),
        key(" q "),
        Span::raw("quit"),
    ]);

    let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    f.render_widget(help, area);
}
