// src/ui.rs

use crate::config::Settings;
use crate::history::SessionLog;
use crate::notify::Prompt;
use crate::session::{Mode, Session};
use crate::sound::AlertPlayer;
use crate::timer::{Countdown, TimerEvent};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, info, warn};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use rfd::FileDialog;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

const POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    WorkDuration,
    RestDuration,
}

pub struct App<P: Prompt> {
    settings: Settings,
    settings_path: PathBuf,
    log: SessionLog,
    player: AlertPlayer,
    prompt: P,
    unit: Duration,
    session: Option<Session>,
    countdown: Option<Countdown>,
    events_tx: Sender<TimerEvent>,
    events_rx: Receiver<TimerEvent>,
    finished: Option<Mode>,
    input_mode: InputMode,
    input: String,
    status: Option<String>,
    should_quit: bool,
}

impl<P: Prompt> App<P> {
    pub fn new(
        settings: Settings,
        settings_path: PathBuf,
        log: SessionLog,
        prompt: P,
        unit: Duration,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            settings,
            settings_path,
            log,
            player: AlertPlayer::new(),
            prompt,
            unit,
            session: None,
            countdown: None,
            events_tx,
            events_rx,
            finished: None,
            input_mode: InputMode::Normal,
            input: String::new(),
            status: None,
            should_quit: false,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn label(&self) -> String {
        match &self.session {
            None => "Ready".to_string(),
            Some(session) if session.paused => format!("{} (paused)", session.display()),
            Some(session) => session.display(),
        }
    }

    /// Starts the first work period. Does nothing once a countdown exists.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.start_period(Mode::Work);
    }

    fn start_period(&mut self, mode: Mode) {
        let seconds: u64 = self.settings.seconds_for(mode);
        // Dropping the previous countdown joins its worker.
        self.countdown = None;
        self.session = Some(Session::new(mode, seconds));
        self.countdown = Some(Countdown::start(
            mode,
            seconds,
            self.unit,
            self.events_tx.clone(),
        ));
    }

    pub fn toggle_pause(&mut self) {
        let (Some(countdown), Some(session)) = (&self.countdown, &mut self.session) else {
            return;
        };
        if session.toggle_pause() {
            countdown.pause();
        } else {
            countdown.resume();
        }
        session.remaining = countdown.remaining();
    }

    /// Drains worker events into the session. A finished period is held
    /// until `take_finished` so the final `00:00` can be drawn first.
    pub fn apply_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                TimerEvent::Tick { mode, remaining } => {
                    if let Some(session) = self.session.as_mut().filter(|s| s.mode == mode) {
                        session.remaining = remaining;
                    }
                }
                TimerEvent::Finished(mode) => self.finished = Some(mode),
            }
        }
    }

    pub fn take_finished(&mut self) -> Option<Mode> {
        self.finished.take()
    }

    /// Logs the period, sounds the alert and waits for acknowledgment before
    /// the opposite period starts.
    pub fn finish_period(&mut self, mode: Mode) {
        info!("Finished {} period", mode);
        if let Err(e) = self.log.record(mode, Local::now()) {
            warn!("Could not write session log: {}", e);
        }
        if let Err(e) = self.player.play(self.settings.sound_file()) {
            warn!("Alert sound failed: {}", e);
        }
        self.prompt.acknowledge(mode);
        self.player.stop();
        self.start_period(mode.next());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        // Raw mode swallows SIGINT, so Ctrl+C arrives here as a key.
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        match self.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                KeyCode::Char('s') => self.start(),
                KeyCode::Char('p') => self.toggle_pause(),
                KeyCode::Char('w') => self.begin_edit(InputMode::WorkDuration),
                KeyCode::Char('r') => self.begin_edit(InputMode::RestDuration),
                KeyCode::Char('f') => self.pick_sound_file(),
                _ => {}
            },
            InputMode::WorkDuration | InputMode::RestDuration => match key.code {
                KeyCode::Enter => self.commit_edit(),
                KeyCode::Char(c) if c.is_ascii_digit() => self.input.push(c),
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Esc => {
                    self.input.clear();
                    self.input_mode = InputMode::Normal;
                }
                _ => {}
            },
        }
    }

    fn begin_edit(&mut self, mode: InputMode) {
        let current: u64 = match mode {
            InputMode::WorkDuration => self.settings.minutes_for(Mode::Work),
            InputMode::RestDuration => self.settings.minutes_for(Mode::Rest),
            InputMode::Normal => return,
        };
        self.input = current.to_string();
        self.input_mode = mode;
    }

    fn commit_edit(&mut self) {
        let mode: InputMode = self.input_mode;
        self.input_mode = InputMode::Normal;
        let input: String = std::mem::take(&mut self.input);
        let Ok(minutes) = input.trim().parse::<u64>() else {
            self.status = Some("Enter a whole number of minutes".to_string());
            return;
        };
        let result = match mode {
            InputMode::WorkDuration => self.settings.set_work_minutes(minutes),
            InputMode::RestDuration => self.settings.set_rest_minutes(minutes),
            InputMode::Normal => return,
        };
        match result {
            Ok(()) => self.persist(),
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn pick_sound_file(&mut self) {
        if let Some(path) = FileDialog::new()
            .set_title("Select Sound File")
            .add_filter("Audio Files", &["mp3", "wav"])
            .pick_file()
        {
            self.set_sound_file(&path);
        }
    }

    pub fn set_sound_file(&mut self, path: &Path) {
        self.settings.set_sound_file(path);
        self.persist();
    }

    fn persist(&mut self) {
        self.status = Some(match self.settings.save(&self.settings_path) {
            Ok(()) => "Settings saved".to_string(),
            Err(e) => {
                warn!("{}", e);
                e.to_string()
            }
        });
    }

    /// Stops the worker and releases the audio device.
    pub fn shutdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            debug!("Cancelling {} countdown", countdown.mode());
            countdown.cancel();
        }
        self.player.release();
    }
}

pub fn draw<P: Prompt>(f: &mut Frame, app: &App<P>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .margin(1)
        .split(f.area());

    let title = Paragraph::new(Line::from(vec![Span::styled(
        "Rest Reminder",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(title, chunks[0]);

    let label_color: Color = match app.session() {
        Some(session) if session.paused => Color::Yellow,
        Some(session) if session.mode == Mode::Rest => Color::LightGreen,
        Some(_) => Color::LightBlue,
        None => Color::White,
    };
    let label = Paragraph::new(Line::from(Span::styled(
        app.label(),
        Style::default()
            .fg(label_color)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(label, chunks[1]);

    let timer = &app.settings().timer;
    let sound: String = app
        .settings()
        .sound_file()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "none".to_string());
    let settings = Paragraph::new(Line::from(vec![
        Span::styled("Work ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{} min", timer.work_duration)),
        Span::raw(" | "),
        Span::styled("Rest ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{} min", timer.rest_duration)),
        Span::raw(" | "),
        Span::styled("Sound ", Style::default().fg(Color::DarkGray)),
        Span::raw(sound),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Settings"),
    )
    .wrap(Wrap { trim: true });
    f.render_widget(settings, chunks[2]);

    let key_style = Style::default().fg(Color::Yellow);
    let off_style = Style::default().fg(Color::DarkGray);
    let text_style = Style::default().fg(Color::White);
    let status_text = match app.input_mode {
        InputMode::Normal => {
            let running: bool = app.is_running();
            let pause_label: &str = match app.session() {
                Some(session) if session.paused => ": resume",
                _ => ": pause",
            };
            let mut spans: Vec<Span> = vec![
                Span::styled("s", if running { off_style } else { key_style }),
                Span::styled(": start", if running { off_style } else { text_style }),
                Span::raw(" | "),
                Span::styled("p", if running { key_style } else { off_style }),
                Span::styled(pause_label, if running { text_style } else { off_style }),
                Span::raw(" | "),
                Span::styled("w", key_style),
                Span::styled(": work", text_style),
                Span::raw(" | "),
                Span::styled("r", key_style),
                Span::styled(": rest", text_style),
                Span::raw(" | "),
                Span::styled("f", key_style),
                Span::styled(": sound", text_style),
                Span::raw(" | "),
                Span::styled("q", key_style),
                Span::styled(": quit", text_style),
            ];
            if let Some(status) = &app.status {
                spans.push(Span::raw(" | "));
                spans.push(Span::styled(status.clone(), off_style));
            }
            Line::from(spans)
        }
        InputMode::WorkDuration | InputMode::RestDuration => {
            let prompt: &str = if app.input_mode == InputMode::WorkDuration {
                "Work duration (minutes): "
            } else {
                "Rest duration (minutes): "
            };
            Line::from(vec![
                Span::styled("Enter", key_style),
                Span::raw(": save | "),
                Span::styled("Esc", key_style),
                Span::raw(": cancel | "),
                Span::styled(prompt, text_style),
                Span::styled(app.input.clone(), Style::default().fg(Color::LightGreen)),
            ])
        }
    };
    let status = Paragraph::new(status_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title("Menu"),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(status, chunks[3]);
}

pub fn run_tui<P: Prompt>(app: &mut App<P>) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);
    app.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend, P: Prompt>(terminal: &mut Terminal<B>, app: &mut App<P>) -> anyhow::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| draw(f, app))?;

        if let Some(mode) = app.take_finished() {
            app.finish_period(mode);
            continue;
        }

        if event::poll(POLL)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }
        app.apply_events();
    }
    Ok(())
}
