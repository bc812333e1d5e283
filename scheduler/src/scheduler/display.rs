use super::{
    runner::{HookAction, SegmentHook},
    timeline::Segment,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    execute,
    terminal::{Clear, ClearType},
};
use std::{
    io::{self, Stdout},
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};
use tui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table},
    Terminal,
};

enum DisplayEvent {
    Input(KeyEvent),
    Tick,
}

enum Command {
    Quit,
    Pause,
    Resume,
    Step,
    None,
}

const TICK_RATE: Duration = Duration::from_millis(200);
const BAR_WIDTH: f64 = 40.0;

/// Terminal Gantt view, fed one segment at a time by the runner.
///
/// In live mode every segment is shown for `delay` before the run goes
/// on. Keys: `q` cancels the run, `p` pauses, `r` resumes and `s` lets a
/// single segment through while paused.
pub struct DisplayTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    input_rx: Receiver<DisplayEvent>,
    policy: &'static str,
    delay: Duration,
    segments: Vec<Segment>,
    paused: bool,
}

impl DisplayTerminal {
    pub fn with_delay(delay: Duration) -> Result<Self, io::Error> {
        crossterm::terminal::enable_raw_mode()?;
        execute!(io::stdout(), Clear(ClearType::All))?;

        // Set up the input handling thread
        let (input_tx, input_rx) = mpsc::channel();
        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = TICK_RATE
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::ZERO);

                match event::poll(timeout) {
                    Ok(true) => {
                        if let Ok(Event::Key(key)) = event::read() {
                            if input_tx.send(DisplayEvent::Input(key)).is_err() {
                                break;
                            }
                        }
                    }
                    Ok(false) => {}
                    Err(_) => break,
                }

                if last_tick.elapsed() >= TICK_RATE {
                    if input_tx.send(DisplayEvent::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        // Set up the terminal-user-interface
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            input_rx,
            policy: "",
            delay,
            segments: Vec::new(),
            paused: false,
        })
    }

    /// Starts a fresh Gantt view for the next run.
    pub fn start_run(&mut self, policy: &'static str) {
        self.policy = policy;
        self.segments.clear();
        self.paused = false;
    }

    pub fn draw(&mut self) -> Result<(), io::Error> {
        let current = match self.segments.last() {
            Some(segment) => format!(
                "Process {} | {:.2} -> {:.2}",
                segment.process, segment.start, segment.end
            ),
            None => "No process has run yet.".to_owned(),
        };
        let status = format!(
            "Clock: {:.2} | Segments: {} | {}",
            self.segments.last().map_or(0.0, |segment| segment.end),
            self.segments.len(),
            if self.paused {
                "Paused (r: resume, s: step, q: quit)"
            } else {
                "Running (p: pause, q: quit)"
            }
        );

        let scale = self.segments.last().map_or(1.0, |segment| segment.end.max(1.0)) / BAR_WIDTH;
        let rows: Vec<[String; 5]> = self
            .segments
            .iter()
            .map(|segment| {
                [
                    segment.process.to_string(),
                    format!("{:.2}", segment.start),
                    format!("{:.2}", segment.end),
                    format!("{:.2}", segment.duration()),
                    "█".repeat((segment.duration() / scale).ceil() as usize),
                ]
            })
            .collect();
        let policy = self.policy;

        // Draw the tui to the terminal
        self.terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Min(5),
                ])
                .split(f.size());

            let process = Paragraph::new(current)
                .style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .fg(Color::LightBlue),
                )
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Current Segment")
                        .border_type(BorderType::Rounded),
                );
            f.render_widget(process, chunks[0]);

            let status = Paragraph::new(status).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Simulation")
                    .border_type(BorderType::Rounded),
            );
            f.render_widget(status, chunks[1]);

            // Keep the most recent segments in view
            let visible = chunks[2].height.saturating_sub(3) as usize;
            let skip = rows.len().saturating_sub(visible);
            let items = rows.iter().skip(skip).map(|row| {
                Row::new(vec![
                    Cell::from(row[0].as_str()).style(Style::default().add_modifier(Modifier::BOLD)),
                    Cell::from("|"),
                    Cell::from(row[1].as_str()),
                    Cell::from("|"),
                    Cell::from(row[2].as_str()),
                    Cell::from("|"),
                    Cell::from(row[3].as_str()),
                    Cell::from("|"),
                    Cell::from(row[4].as_str()),
                ])
            });

            let table = Table::new(items)
                .header(
                    Row::new(vec!["PID", "|", "Start", "|", "End", "|", "Time", "|", "Gantt"])
                        .style(Style::default().add_modifier(Modifier::BOLD)),
                )
                .widths(&[
                    Constraint::Length(4),
                    Constraint::Length(1),
                    Constraint::Length(9),
                    Constraint::Length(1),
                    Constraint::Length(9),
                    Constraint::Length(1),
                    Constraint::Length(8),
                    Constraint::Length(1),
                    Constraint::Length(40),
                ])
                .block(Block::default().title(policy).borders(Borders::ALL))
                .style(Style::default().fg(Color::LightGreen))
                .column_spacing(1);

            f.render_widget(table, chunks[2]);
        })?;
        Ok(())
    }

    fn get_input(&self, timeout: Duration) -> Command {
        // Get the user's input and return a matching command
        match self.input_rx.recv_timeout(timeout) {
            Ok(DisplayEvent::Input(key)) if key.modifiers.is_empty() => match key.code {
                KeyCode::Char('q') => Command::Quit,
                KeyCode::Char('p') => Command::Pause,
                KeyCode::Char('r') => Command::Resume,
                KeyCode::Char('s') => Command::Step,
                _ => Command::None,
            },
            Ok(_) | Err(RecvTimeoutError::Timeout) => Command::None,
            // Without input the display can only keep going
            Err(RecvTimeoutError::Disconnected) => Command::Resume,
        }
    }

    fn redraw(&mut self) -> HookAction {
        match self.draw() {
            Ok(()) => HookAction::Continue,
            Err(err) => {
                log::error!("failed to draw frame: {err}");
                HookAction::Cancel
            }
        }
    }
}

impl SegmentHook for DisplayTerminal {
    fn on_segment(&mut self, segment: &Segment, live: bool) -> HookAction {
        self.segments.push(*segment);
        if self.redraw() == HookAction::Cancel {
            return HookAction::Cancel;
        }
        if !live {
            return HookAction::Continue;
        }

        let deadline = Instant::now() + self.delay;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            if !self.paused && left.is_zero() {
                return HookAction::Continue;
            }

            let timeout = if self.paused { TICK_RATE } else { left };
            match self.get_input(timeout) {
                Command::Quit => return HookAction::Cancel,
                Command::Pause if !self.paused => {
                    self.paused = true;
                    if self.redraw() == HookAction::Cancel {
                        return HookAction::Cancel;
                    }
                }
                Command::Resume if self.paused => {
                    self.paused = false;
                    if self.redraw() == HookAction::Cancel {
                        return HookAction::Cancel;
                    }
                }
                Command::Step if self.paused => return HookAction::Continue,
                _ => {}
            }
        }
    }
}

impl Drop for DisplayTerminal {
    fn drop(&mut self) {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = self.terminal.show_cursor();
        let _ = execute!(io::stdout(), Clear(ClearType::All));
    }
}
