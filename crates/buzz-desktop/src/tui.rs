use std::io;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use buzz_core::encode::Tune;
use buzz_core::{Buzzer, Note, Transport};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{Level, LevelFilter, Metadata, Record};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
};

use crate::demo;
use crate::device::DeviceStatus;

/// Highest frequency shown on the gauge
const GAUGE_MAX_HZ: f64 = 5000.0;

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
}

// Extension trait for log::Level to provide UI rendering methods
trait LevelExt {
    fn color(&self) -> Color;
    fn prefix(&self) -> &str;
}

impl LevelExt for Level {
    fn color(&self) -> Color {
        match *self {
            Level::Error => Color::Red,
            Level::Warn => Color::Yellow,
            Level::Info => Color::Cyan,
            Level::Debug => Color::Gray,
            Level::Trace => Color::DarkGray,
        }
    }

    fn prefix(&self) -> &str {
        match *self {
            Level::Error => "[ERROR]",
            Level::Warn => "[WARN] ",
            Level::Info => "[INFO] ",
            Level::Debug => "[DEBUG]",
            Level::Trace => "[TRACE]",
        }
    }
}

/// Logger that forwards records to the TUI log panel
pub struct TuiLogger {
    tx: Sender<LogEntry>,
}

impl log::Log for TuiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let entry = LogEntry {
                level: record.level(),
                message: format!("{}", record.args()),
            };
            // the TUI may already be gone
            let _ = self.tx.send(entry);
        }
    }

    fn flush(&self) {}
}

/// Install the TUI logger and return the receiving end for the log panel
pub fn init_logger() -> Receiver<LogEntry> {
    let (tx, rx) = channel();
    if log::set_boxed_logger(Box::new(TuiLogger { tx })).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
    rx
}

struct TuiState<T: Transport> {
    buzzer: Arc<Buzzer<T>>,
    device: Arc<Mutex<DeviceStatus>>,
    logs: Vec<LogEntry>,
    rx: Receiver<LogEntry>,
    max_logs: usize,
}

impl<T: Transport> TuiState<T> {
    fn new(
        buzzer: Arc<Buzzer<T>>,
        device: Arc<Mutex<DeviceStatus>>,
        rx: Receiver<LogEntry>,
    ) -> Self {
        Self {
            buzzer,
            device,
            logs: Vec::new(),
            rx,
            max_logs: 200,
        }
    }

    fn collect_messages(&mut self) {
        if let Some(e) = self.buzzer.take_error() {
            log::error!("Playback stopped: {}", e);
        }

        while let Ok(entry) = self.rx.try_recv() {
            self.logs.push(entry);
            if self.logs.len() > self.max_logs {
                self.logs.remove(0);
            }
        }
    }

    fn queue(&self, label: &str, notes: anyhow::Result<Vec<Note>>, replace: bool) {
        match notes {
            Ok(notes) => {
                let action = if replace { "Replace:" } else { "Append:" };
                log::info!("{} {} ({} notes)", action, label, notes.len());
                if replace {
                    self.buzzer.replace(notes);
                } else {
                    self.buzzer.append(notes);
                }
            }
            Err(e) => log::error!("Could not encode {}: {}", label, e),
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c @ '1'..='7') => {
                let tune = Tune::ALL[c as usize - '1' as usize];
                self.queue(tune.name(), demo::tune(tune), false);
            }
            KeyCode::Char('w') => self.queue("warm-up", demo::warm_up(), false),
            KeyCode::Char('m') => self.queue("morse", demo::morse("Hello World"), false),
            KeyCode::Char('t') => self.queue("tunetalk", demo::tunetalk("Hello World"), false),
            KeyCode::Char('u') => self.queue("memory", demo::memory(), false),
            KeyCode::Char('r') => self.queue("siren", demo::tune(Tune::Siren), true),
            KeyCode::Char('s') => {
                log::info!("Stop");
                self.buzzer.stop();
            }
            KeyCode::Char('d') => {
                let buzzer = Arc::clone(&self.buzzer);
                thread::spawn(move || {
                    if let Err(e) = demo::run(&buzzer) {
                        log::error!("Demo failed: {}", e);
                    }
                });
            }
            _ => {}
        }
    }
}

pub fn run<T: Transport>(
    buzzer: Arc<Buzzer<T>>,
    device: Arc<Mutex<DeviceStatus>>,
    rx: Receiver<LogEntry>,
) -> Result<(), io::Error> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut tui_state = TuiState::new(buzzer, device, rx);
    log::info!("Buzzer TUI started");

    loop {
        tui_state.collect_messages();
        terminal.draw(|f| ui(f, &tui_state))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    code => tui_state.handle_key(code),
                }
            }
        }
    }

    tui_state.buzzer.stop();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    Ok(())
}

fn ui<T: Transport>(f: &mut Frame, state: &TuiState<T>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(7), // Device
            Constraint::Min(8),    // Logs
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let title = Paragraph::new(format!(
        "Qwiic Buzzer Simulator - device 0x{:02X}",
        state.buzzer.config().address
    ))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_device(f, chunks[1], state);
    render_logs(f, chunks[2], state);

    let help = Paragraph::new(
        "1-7: tunes | w: warm-up | m: morse | t: tunetalk | u: memory | r: replace with siren | s: stop | d: demo | q: quit",
    )
    .style(Style::default().fg(Color::Gray))
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, chunks[3]);
}

fn render_device<T: Transport>(f: &mut Frame, area: Rect, state: &TuiState<T>) {
    let block = Block::default().borders(Borders::ALL).title("Device");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let device = state
        .device
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    let sounding = device.is_sounding();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2), Constraint::Length(1)])
        .split(inner);

    let tone_style = if sounding {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let frequency = Gauge::default()
        .gauge_style(tone_style)
        .ratio((f64::from(device.frequency) / GAUGE_MAX_HZ).clamp(0.0, 1.0))
        .label(format!("Frequency: {} Hz", device.frequency));
    f.render_widget(frequency, rows[0]);

    let volume = Gauge::default()
        .gauge_style(tone_style)
        .ratio(f64::from(device.volume) / 4.0)
        .label(format!("Volume: {}/4 ({} ms)", device.volume, device.duration_ms));
    f.render_widget(volume, rows[1]);

    let player = if state.buzzer.is_playing() { "playing" } else { "idle" };
    let summary = Paragraph::new(format!(
        "Player: {} | pending: {} ({} ms) | notes received: {} | bus errors: {}",
        player,
        state.buzzer.pending(),
        state.buzzer.pending_duration().as_millis(),
        device.notes_received,
        device.bus_errors
    ));
    f.render_widget(summary, rows[2]);
}

fn render_logs<T: Transport>(f: &mut Frame, area: Rect, state: &TuiState<T>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Logs (scrolls automatically)");

    let inner = block.inner(area);
    f.render_widget(block, area);

    // Show last N logs that fit in the area
    let max_logs = inner.height as usize;
    let start_idx = state.logs.len().saturating_sub(max_logs);

    let log_items: Vec<ListItem> = state.logs[start_idx..]
        .iter()
        .map(|log| {
            let content = Line::from(vec![
                Span::styled(log.level.prefix(), Style::default().fg(log.level.color())),
                Span::raw(" "),
                Span::raw(&log.message),
            ]);
            ListItem::new(content)
        })
        .collect();

    f.render_widget(List::new(log_items), inner);
}
