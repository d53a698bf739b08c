use std::io::{self, Stdout};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row as TableRow, Table, TableState, Wrap},
    Frame, Terminal,
};

use super::engine::{DetailView, InteractionEngine, Mode};
use crate::models::{Row, ABSENT};
use crate::utils::truncate_str;
use crate::watch::WatchControl;

const BUSY_MESSAGE: &str = "Refreshing...";

pub struct UI;

impl UI {
    pub fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend)
    }

    pub fn restore_terminal() -> io::Result<()> {
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        Ok(())
    }

    /// Draw the whole dashboard. `busy` replaces the status line with the
    /// refresh indicator while a rebuild is about to block the loop.
    pub fn render<W: WatchControl>(frame: &mut Frame, engine: &InteractionEngine<W>, busy: bool) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(frame.area());

        Self::render_header(frame, chunks[0], engine);
        Self::render_table(frame, chunks[1], engine);
        Self::render_footer(frame, chunks[2], engine, busy);

        if let Some(detail) = engine.detail() {
            let modal_area = Self::centered_area(frame.area(), 80, 70);
            Self::render_detail(frame, modal_area, detail);
        }
    }

    fn centered_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(area);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }

    fn render_header<W: WatchControl>(frame: &mut Frame, area: Rect, engine: &InteractionEngine<W>) {
        let table = engine.table();
        let agents = table.rows().iter().filter(|r| r.agent.is_some()).count();
        let dirty = table.rows().iter().filter(|r| !r.vcs_status.clean).count();

        let mut title = vec![Span::styled(
            " ARBORIST ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];

        if area.width >= 100 {
            title.push(Span::raw(" - Worktree Dashboard "));
        }
        title.push(Span::raw("| "));

        title.extend([
            Span::styled(
                format!("{} ", engine.repo_root().display()),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw("| "),
            Span::raw(format!("{} worktrees ", table.len())),
            Span::styled(format!("● {} ", agents), Style::default().fg(Color::Green)),
            Span::styled(format!("✎ {}", dirty), Style::default().fg(Color::Red)),
        ]);

        let header = Paragraph::new(Line::from(title)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

        frame.render_widget(header, area);
    }

    fn render_table<W: WatchControl>(frame: &mut Frame, area: Rect, engine: &InteractionEngine<W>) {
        let table = engine.table();
        let review_width = (area.width as usize / 3).max(12);

        let rows: Vec<TableRow> = table
            .rows()
            .iter()
            .map(|row| Self::table_row(row, review_width))
            .collect();

        let header = TableRow::new(["Branch", "Agent", "Review", "Git"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let widths = [
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Percentage(30),
            Constraint::Percentage(25),
        ];

        let border_style = if engine.mode() == Mode::ConfirmingRemoval {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let widget = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title("Worktrees"),
            )
            .row_highlight_style(
                Style::default()
                    .add_modifier(Modifier::REVERSED)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = TableState::default();
        if !table.is_empty() {
            state.select(Some(table.cursor()));
        }
        frame.render_stateful_widget(widget, area, &mut state);
    }

    fn table_row(row: &Row, review_width: usize) -> TableRow<'static> {
        let agent = match &row.agent {
            Some(agent) => Line::from(vec![
                Span::styled(agent.status.symbol(), Style::default().fg(agent.status.color())),
                Span::raw(" "),
                Span::raw(row.agent_summary()),
            ]),
            None => Line::from(Span::styled(ABSENT, Style::default().fg(Color::DarkGray))),
        };

        let git_style = if row.vcs_status.clean {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red)
        };

        TableRow::new(vec![
            Cell::from(row.working_tree.display_name()),
            Cell::from(agent),
            Cell::from(truncate_str(&row.review_summary(), review_width)),
            Cell::from(Span::styled(row.vcs_status.to_string(), git_style)),
        ])
    }

    fn render_footer<W: WatchControl>(
        frame: &mut Frame,
        area: Rect,
        engine: &InteractionEngine<W>,
        busy: bool,
    ) {
        let message = if busy {
            BUSY_MESSAGE
        } else {
            engine.table().status_message()
        };
        let message = if message.is_empty() {
            String::new()
        } else {
            format!("{} | ", message)
        };
        let message_style = if message.contains("failed") || message.contains("error") {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };

        let mut help_text = vec![Span::styled(message, message_style)];

        if engine.mode() == Mode::ConfirmingRemoval {
            help_text.push(Span::styled("d/y", Style::default().fg(Color::Yellow)));
            help_text.push(Span::raw(": Confirm "));
            help_text.push(Span::styled("any", Style::default().fg(Color::Yellow)));
            help_text.push(Span::raw(": Cancel"));
        } else {
            for (key, label) in [
                ("j/k", ": Navigate "),
                ("Enter", ": Jump "),
                ("o", ": Open PR "),
                ("g", ": Git status "),
                ("r", ": Refresh "),
                ("d", ": Delete "),
                ("q", ": Quit"),
            ] {
                help_text.push(Span::styled(key, Style::default().fg(Color::Yellow)));
                help_text.push(Span::raw(label));
            }
        }

        let footer = Paragraph::new(Line::from(help_text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

        frame.render_widget(footer, area);
    }

    fn render_detail(frame: &mut Frame, area: Rect, detail: &DetailView) {
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                format!(" {} ", detail.title),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .title_bottom(Line::from(" any key to close ").right_aligned());

        let body = if detail.body.trim().is_empty() {
            "nothing to commit, working tree clean".to_string()
        } else {
            detail.body.clone()
        };

        let paragraph = Paragraph::new(body)
            .block(block)
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, area);
    }
}
