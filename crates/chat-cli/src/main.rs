//! Interactive terminal chat for Reflection Chat
//!
//! Single-user rendition of the chat session: one conversation log, Enter
//! submits, Ctrl+S opens the doctor-summary popup. Each completion call is
//! awaited inline, so the UI blocks for the duration of one request.

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

use common::{ChatSession, LlmClient, Persona, Role, SubmitOutcome, SummaryOutcome};

#[derive(Parser, Debug)]
#[command(name = "chat-cli")]
#[command(about = "Interactive terminal chat for Reflection Chat")]
struct Args {
    /// OpenAI API key
    #[arg(long, env = "REFLECT_OPENAI_API_KEY")]
    openai_api_key: String,

    /// Model name to use
    #[arg(long, env = "REFLECT_OPENAI_MODEL", default_value = "gpt-4.1-mini")]
    openai_model: String,

    /// API base URL (OpenAI or any compatible endpoint)
    #[arg(
        long = "openai-base-url",
        env = "REFLECT_OPENAI_BASE_URL",
        default_value = "https://api.openai.com/v1"
    )]
    openai_base_url: String,

    /// Sampling temperature for chat replies
    #[arg(long, env = "REFLECT_CHAT_TEMPERATURE", default_value = "0.4")]
    chat_temperature: f32,

    /// Sampling temperature for summaries
    #[arg(long, env = "REFLECT_SUMMARY_TEMPERATURE", default_value = "0.3")]
    summary_temperature: f32,
}

#[derive(Debug, Clone)]
enum Status {
    Info(String),
    Warning(String),
    Error(String),
}

struct App {
    session: ChatSession<LlmClient>,
    input: String,
    input_cursor: usize,
    scroll_offset: usize,
    status: Option<Status>,
    summary: Option<String>,
    should_quit: bool,
}

impl App {
    fn new(session: ChatSession<LlmClient>) -> Self {
        Self {
            session,
            input: String::new(),
            input_cursor: 0,
            scroll_offset: 0,
            status: None,
            summary: None,
            should_quit: false,
        }
    }

    fn move_cursor_left(&mut self) {
        if self.input_cursor > 0 {
            self.input_cursor -= 1;
        }
    }

    fn move_cursor_right(&mut self) {
        if self.input_cursor < self.input.len() {
            self.input_cursor += 1;
        }
    }

    fn enter_char(&mut self, c: char) {
        self.input.insert(self.input_cursor, c);
        self.input_cursor += 1;
    }

    fn delete_char(&mut self) {
        if self.input_cursor > 0 {
            self.input.remove(self.input_cursor - 1);
            self.input_cursor -= 1;
        }
    }

    fn delete_char_forward(&mut self) {
        if self.input_cursor < self.input.len() {
            self.input.remove(self.input_cursor);
        }
    }

    fn clear_input(&mut self) {
        self.input.clear();
        self.input_cursor = 0;
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(1);
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let client = LlmClient::new(
        args.openai_api_key.clone(),
        args.openai_model.clone(),
        args.openai_base_url.clone(),
    );
    let session = ChatSession::new(
        client,
        Persona::default(),
        args.chat_temperature,
        args.summary_temperature,
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);
    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        // The summary popup captures input until closed
        if app.summary.is_some() {
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') => app.summary = None,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.should_quit = true;
                }
                _ => {}
            }
            if app.should_quit {
                break;
            }
            continue;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.should_quit = true;
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.should_quit = true;
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                summarize(terminal, app).await?;
            }
            KeyCode::Enter => {
                submit(terminal, app).await?;
            }
            KeyCode::Char(c) => {
                app.enter_char(c);
            }
            KeyCode::Backspace => {
                app.delete_char();
            }
            KeyCode::Delete => {
                app.delete_char_forward();
            }
            KeyCode::Left => {
                app.move_cursor_left();
            }
            KeyCode::Right => {
                app.move_cursor_right();
            }
            KeyCode::Home => {
                app.input_cursor = 0;
            }
            KeyCode::End => {
                app.input_cursor = app.input.len();
            }
            KeyCode::Up => {
                app.scroll_up();
            }
            KeyCode::Down => {
                app.scroll_down();
            }
            KeyCode::PageUp => {
                for _ in 0..10 {
                    app.scroll_up();
                }
            }
            KeyCode::PageDown => {
                for _ in 0..10 {
                    app.scroll_down();
                }
            }
            _ => {}
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Send the input line. The call blocks the UI until the reply or the
/// failure arrives; the user turn stays in the log either way.
async fn submit(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    let text = app.input.clone();
    if text.trim().is_empty() {
        return Ok(());
    }

    app.status = Some(Status::Info("Thinking with you...".to_string()));
    app.clear_input();
    terminal.draw(|f| ui(f, app))?;

    match app.session.submit(&text).await {
        Ok(SubmitOutcome::Reply(_)) | Ok(SubmitOutcome::IgnoredEmpty) => {
            app.status = None;
        }
        Err(e) => {
            app.status = Some(Status::Error(e.to_string()));
        }
    }
    app.scroll_offset = 0;

    Ok(())
}

async fn summarize(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    app.status = Some(Status::Info("Summarizing your conversation...".to_string()));
    terminal.draw(|f| ui(f, app))?;

    match app.session.summarize().await {
        Ok(SummaryOutcome::Summary(summary)) => {
            app.status = None;
            app.summary = Some(summary);
        }
        Ok(SummaryOutcome::NotEnoughHistory) => {
            app.status = Some(Status::Warning(
                "Chat a bit first so there is something to summarize.".to_string(),
            ));
        }
        Err(e) => {
            app.status = Some(Status::Error(e.to_string()));
        }
    }

    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(0),    // Messages
            Constraint::Length(1), // Status line
            Constraint::Length(3), // Input
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app);
    render_messages(f, chunks[1], app);
    render_status(f, chunks[2], app);
    render_input(f, chunks[3], app);
    render_footer(f, chunks[4]);

    if let Some(summary) = &app.summary {
        render_summary_popup(f, summary);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let persona = app.session.persona();
    let lines = vec![
        Line::from(Span::styled(
            persona.title.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            persona.tagline.clone(),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let header = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn render_messages(f: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();

    for turn in app.session.log().turns() {
        let speaker_style = match turn.role {
            Role::User => Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            Role::Assistant => Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        };

        lines.push(Line::from(Span::styled(turn.role.label(), speaker_style)));
        for text_line in turn.text.lines() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::raw(text_line.to_string()),
            ]));
        }
        lines.push(Line::from(""));
    }

    // Anchor to the bottom; scroll_offset counts lines scrolled back up
    let visible = area.height.saturating_sub(2) as usize;
    let bottom = lines.len().saturating_sub(visible);
    let scroll = bottom.saturating_sub(app.scroll_offset);

    let title = if app.scroll_offset > 0 {
        format!("Conversation (scrolled {})", app.scroll_offset)
    } else {
        "Conversation".to_string()
    };

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0));

    f.render_widget(paragraph, area);
}

fn render_status(f: &mut Frame, area: Rect, app: &App) {
    let (text, style) = match &app.status {
        Some(Status::Info(msg)) => (msg.clone(), Style::default().fg(Color::Yellow)),
        Some(Status::Warning(msg)) => (msg.clone(), Style::default().fg(Color::Magenta)),
        Some(Status::Error(msg)) => (msg.clone(), Style::default().fg(Color::Red)),
        None => (String::new(), Style::default()),
    };
    let status = Paragraph::new(format!(" {}", text)).style(style);
    f.render_widget(status, area);
}

fn render_input(f: &mut Frame, area: Rect, app: &App) {
    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Input"));
    f.render_widget(input, area);

    f.set_cursor_position((area.x + app.input_cursor as u16 + 1, area.y + 1));
}

fn render_footer(f: &mut Frame, area: Rect) {
    let footer_text = " Enter: Send | Ctrl+S: Doctor summary | Up/Down: Scroll | Ctrl+C: Quit ";
    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(ratatui::layout::Alignment::Center);
    f.render_widget(footer, area);
}

fn render_summary_popup(f: &mut Frame, summary: &str) {
    let size = f.area();
    let vertical_margin = size.height / 8;
    let horizontal_margin = size.width / 8;

    let popup_area = Rect {
        x: horizontal_margin,
        y: vertical_margin,
        width: size.width - (horizontal_margin * 2),
        height: size.height - (vertical_margin * 2),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Summary for your doctor (Esc: Close)")
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(summary.to_string())
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}
