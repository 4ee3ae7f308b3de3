//! urlcast - terminal client for a url-feed HLS streaming backend
//!
//! # Usage
//!
//! ```bash
//! # Launch interactive TUI
//! urlcast
//!
//! # Headless mode (for scripting)
//! urlcast play "https://youtube.com/watch?v=abc"
//! urlcast check
//! ```

use std::io::{stdout, Stdout};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tracing_subscriber::EnvFilter;

use urlcast::api::UrlFeedClient;
use urlcast::app::{App, InputMode, UiAction};
use urlcast::cli::{Cli, Command, ExitCode};
use urlcast::commands;
use urlcast::config::Config;
use urlcast::models::PlaybackStatus;
use urlcast::session::{PlaybackSession, SessionHandle};
use urlcast::stream::{LocalPlayer, PlayerType};
use urlcast::ui::Theme;

/// Terminal type alias for convenience
type Tui = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.is_cli_mode() {
        // Headless: log to stderr at info unless RUST_LOG says otherwise
        init_tracing("info");
        let exit_code = run_cli(cli).await;
        std::process::exit(exit_code.into());
    } else {
        // TUI owns the terminal; only log when explicitly asked to
        init_tracing("off");
        run_tui(cli).await
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve backend URL and player from CLI flags over config
fn resolve_setup(cli: &Cli, config: &Config) -> (String, PlayerType) {
    let backend = cli
        .backend
        .clone()
        .unwrap_or_else(|| config.backend_url());
    let player = cli
        .player
        .as_deref()
        .or(config.player.as_deref())
        .and_then(|s| s.parse::<PlayerType>().ok())
        .unwrap_or_default();
    (backend, player)
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let config = Config::load();
    let (backend, player) = resolve_setup(&cli, &config);
    let opts = config.session_options();

    match cli.command {
        Some(Command::Play(cmd)) => commands::play_cmd(cmd, backend, player, opts).await,
        Some(Command::Check(cmd)) => commands::check_cmd(cmd, backend).await,
        None => {
            // This shouldn't happen (handled by is_cli_mode check)
            ExitCode::Success
        }
    }
}

// =============================================================================
// TUI Mode
// =============================================================================

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run interactive TUI
async fn run_tui(cli: Cli) -> Result<()> {
    let config = Config::load();
    let (backend, player_type) = resolve_setup(&cli, &config);
    let opts = config.session_options();

    // One session, one player, created once and reused across submits
    let client = UrlFeedClient::new(backend.clone());
    let player = LocalPlayer::new(player_type);
    let session = PlaybackSession::new(client, player)
        .with_options(opts)
        .spawn();

    let mut app = App::new();
    app.max_poll_attempts = opts.max_poll_attempts;

    let mut terminal = init_terminal()?;
    let result = run_event_loop(&mut terminal, &mut app, &session, &backend).await;
    restore_terminal(&mut terminal)?;

    // Tear the session down so nothing keeps playing behind us
    session.shutdown();
    session.join().await;

    result
}

/// Main event loop - handles input, applies session updates, renders UI
async fn run_event_loop(
    terminal: &mut Tui,
    app: &mut App,
    session: &SessionHandle,
    backend: &str,
) -> Result<()> {
    const TICK_RATE: Duration = Duration::from_millis(100);

    let mut view_rx = session.subscribe();

    while app.running {
        // Render current state
        terminal.draw(|frame| render_ui(frame, app, backend))?;

        // Pick up session updates published since the last tick
        if view_rx.has_changed().unwrap_or(false) {
            app.view = view_rx.borrow_and_update().clone();
            if let Some(failure) = app.view.failure {
                app.set_error(failure.message());
            }
        }

        // Poll for terminal events with timeout
        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (ignore releases on Windows)
                if key.kind == KeyEventKind::Press {
                    match app.handle_key(key) {
                        Some(UiAction::Submit(url)) => session.submit(url),
                        Some(UiAction::Stop) => session.stop(),
                        None => {}
                    }
                }
            }
        }
    }

    Ok(())
}

// =============================================================================
// UI Rendering
// =============================================================================

/// Main render function
fn render_ui(frame: &mut Frame, app: &App, backend: &str) {
    let area = frame.area();

    frame.render_widget(Clear, area);
    frame.render_widget(
        Block::default().style(ratatui::style::Style::default().bg(Theme::BACKGROUND)),
        area,
    );

    // Main layout: header, player area, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with URL box
            Constraint::Min(1),    // Player area
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header(frame, chunks[0], app);
    render_player_area(frame, chunks[1], app);
    render_status_bar(frame, chunks[2], app, backend);

    if let Some(ref error) = app.error {
        render_error_popup(frame, area, error);
    }
}

/// Render the header with logo and URL input box
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(14), // Logo
            Constraint::Min(1),     // URL box
        ])
        .split(area);

    let logo = Paragraph::new(Line::from(vec![
        Span::styled(
            "URL",
            ratatui::style::Style::default()
                .fg(Theme::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "CAST",
            ratatui::style::Style::default()
                .fg(Theme::SECONDARY)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border()),
    );
    frame.render_widget(logo, header_chunks[0]);

    let input_style = if app.input_mode == InputMode::Editing {
        Theme::border_focused()
    } else {
        Theme::border()
    };

    let input_text = if app.input_mode == InputMode::Editing {
        let text = &app.input.text;
        let cursor = app.input.cursor.min(text.len());
        let (before, after) = text.split_at(cursor);
        format!("⌕ {}│{}", before, after)
    } else if app.input.text.is_empty() {
        "⌕ Type / and paste a video URL...".to_string()
    } else {
        format!("⌕ {}", app.input.text)
    };

    let input_box = Paragraph::new(input_text)
        .style(if app.input_mode == InputMode::Editing {
            Theme::input().fg(Theme::PRIMARY)
        } else {
            Theme::input()
        })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(input_style)
                .title(Span::styled(" VIDEO URL ", Theme::title())),
        );
    frame.render_widget(input_box, header_chunks[1]);
}

/// Render the player area based on playback status
fn render_player_area(frame: &mut Frame, area: Rect, app: &App) {
    match app.view.status {
        PlaybackStatus::Stopped => render_idle(frame, area, app),
        PlaybackStatus::Waiting => render_waiting(frame, area, app),
        PlaybackStatus::Playing => render_playing(frame, area, app),
    }
}

/// Idle screen with quick-start help
fn render_idle(frame: &mut Frame, area: Rect, _app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border())
        .title(Span::styled(" ■ STOPPED ", Theme::dimmed()));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let help = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Welcome to ", Theme::text()),
            Span::styled(
                "urlcast",
                ratatui::style::Style::default()
                    .fg(Theme::PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Feed a video URL to the backend and play its HLS stream",
            Theme::dimmed(),
        )),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled("Quick Start:", Theme::accent())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  /  ", Theme::keybind()),
            Span::styled("Edit the video URL", Theme::dimmed()),
        ]),
        Line::from(vec![
            Span::styled("  ↵  ", Theme::keybind()),
            Span::styled("Submit it", Theme::dimmed()),
        ]),
        Line::from(vec![
            Span::styled("  s  ", Theme::keybind()),
            Span::styled("Stop playback", Theme::dimmed()),
        ]),
        Line::from(vec![
            Span::styled("  q  ", Theme::keybind()),
            Span::styled("Quit", Theme::dimmed()),
        ]),
    ])
    .alignment(Alignment::Center);

    frame.render_widget(help, inner);
}

/// Waiting screen: poll progress plus thumbnail preview when known
fn render_waiting(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border_focused())
        .title(Span::styled(" ⟳ WAITING ", Theme::loading()));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("Waiting for the stream...", Theme::loading())),
        Line::from(""),
    ];

    if app.view.attempt > 0 {
        lines.push(Line::from(Span::styled(
            format!("check {} / {}", app.view.attempt, app.max_poll_attempts),
            Theme::dimmed(),
        )));
        lines.push(Line::from(""));
    }

    if app.view.player_area_style().is_some() {
        lines.push(Line::from(vec![
            Span::styled("preview ", Theme::dimmed()),
            Span::styled(app.view.thumbnail_url.clone(), Theme::text()),
        ]));
    }

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, inner);
}

/// Now playing screen
fn render_playing(frame: &mut Frame, area: Rect, _app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border_focused())
        .title(Span::styled(" ▶ NOW PLAYING ", Theme::success()));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let para = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Stream handed to the player",
            ratatui::style::Style::default()
                .fg(Theme::PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  s  ", Theme::keybind()),
            Span::styled("Stop  ", Theme::dimmed()),
            Span::styled("  /  ", Theme::keybind()),
            Span::styled("New URL  ", Theme::dimmed()),
            Span::styled("  q  ", Theme::keybind()),
            Span::styled("Quit", Theme::dimmed()),
        ]),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(para, inner);
}

/// Render status bar at bottom
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App, backend: &str) {
    let mode_indicator = match app.input_mode {
        InputMode::Normal => Span::styled(
            " NORMAL ",
            ratatui::style::Style::default()
                .fg(Theme::BACKGROUND)
                .bg(Theme::PRIMARY),
        ),
        InputMode::Editing => Span::styled(
            " INSERT ",
            ratatui::style::Style::default()
                .fg(Theme::BACKGROUND)
                .bg(Theme::ACCENT),
        ),
    };

    let status_style = match app.view.status {
        PlaybackStatus::Stopped => Theme::dimmed(),
        PlaybackStatus::Waiting => Theme::warning(),
        PlaybackStatus::Playing => Theme::success(),
    };
    let status_indicator = Span::styled(format!(" {} ", app.view.status), status_style);

    let backend_indicator = Span::styled(format!(" ⇄ {} ", backend), Theme::dimmed());

    let help = Span::styled(" q:quit  /:url  ↵:submit  s:stop ", Theme::dimmed());

    let status_line = Line::from(vec![
        mode_indicator,
        status_indicator,
        Span::raw(" "),
        backend_indicator,
        Span::raw(" │ "),
        help,
    ]);

    let status = Paragraph::new(status_line).style(Theme::status_bar());
    frame.render_widget(status, area);
}

/// Render error popup overlay
fn render_error_popup(frame: &mut Frame, area: Rect, error: &str) {
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 5;

    let popup_area = Rect {
        x: area.x + (area.width.saturating_sub(popup_width)) / 2,
        y: area.y + (area.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let error_block = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(error, Theme::error())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Theme::error())
            .title(Span::styled(" ✗ ERROR ", Theme::error()))
            .style(ratatui::style::Style::default().bg(Theme::BACKGROUND)),
    );

    frame.render_widget(error_block, popup_area);
}
