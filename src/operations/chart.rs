use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::{Alignment, Color, Constraint, Direction, Layout, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::{Block, Borders, Paragraph};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::io;

/// Chart shape for a breakdown. Doughnut suits category shares, bars suit
/// month-by-month comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Doughnut,
}

const PALETTE: [Color; 11] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Red,
    Color::LightCyan,
    Color::LightMagenta,
    Color::LightYellow,
    Color::LightGreen,
    Color::LightBlue,
];

fn color_for(idx: usize) -> Color {
    PALETTE[idx % PALETTE.len()]
}

/// Draws (label, amount) pairs full-screen until the user presses q or Esc.
pub fn render_chart(title: &str, data: &[(String, Decimal)], kind: ChartKind) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let result = (|| {
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal = ratatui::Terminal::new(backend)?;

        loop {
            terminal.draw(|frame| {
                let size = frame.area();
                let block = Block::default()
                    .title(Line::from(Span::styled(
                        format!("{}  (press q to exit)", title),
                        Style::default().fg(Color::White),
                    )))
                    .borders(Borders::ALL);
                let inner = block.inner(size);
                frame.render_widget(block, size);

                match kind {
                    ChartKind::Bar => render_bars(frame, inner, data),
                    ChartKind::Doughnut => render_doughnut(frame, inner, data),
                }
            })?;

            if event::poll(std::time::Duration::from_millis(250))? {
                match event::read()? {
                    Event::Key(key) if key.code == KeyCode::Char('q') => break,
                    Event::Key(key) if key.code == KeyCode::Esc => break,
                    Event::Resize(_, _) => continue,
                    _ => {}
                }
            }
        }

        Ok(())
    })();

    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;

    result
}

fn render_bars(frame: &mut ratatui::Frame, area: Rect, data: &[(String, Decimal)]) {
    if data.is_empty() {
        let empty = Paragraph::new("Nothing to plot").alignment(Alignment::Center);
        frame.render_widget(empty, area);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let chart_area = layout[0];

    let bar_height = chart_area.height as usize;
    let bar_width = std::cmp::max(1, chart_area.width as usize / data.len());
    if bar_height == 0 {
        return;
    }

    let max_value = data
        .iter()
        .map(|(_, v)| v.to_f64().unwrap_or(0.0))
        .fold(0.0_f64, f64::max)
        .max(1.0);

    let mut lines: Vec<Line> = Vec::new();
    for row in 0..bar_height {
        let level = (bar_height - row) as f64;
        let mut spans: Vec<Span> = Vec::new();
        for (idx, (_, value)) in data.iter().enumerate() {
            let scaled = (value.to_f64().unwrap_or(0.0) / max_value * bar_height as f64).ceil();
            if level > scaled || scaled <= 0.0 {
                spans.push(Span::raw(" ".repeat(bar_width)));
            } else {
                spans.push(Span::styled(
                    "█".repeat(bar_width),
                    Style::default().fg(color_for(idx)),
                ));
            }
        }
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Left), chart_area);

    let mut label_spans: Vec<Span> = Vec::new();
    for (idx, (label, _)) in data.iter().enumerate() {
        let mut label = label.clone();
        label.truncate(bar_width);
        label_spans.push(Span::styled(
            format!("{:width$}", label, width = bar_width),
            Style::default().fg(color_for(idx)),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(label_spans)), layout[1]);
}

fn render_doughnut(frame: &mut ratatui::Frame, area: Rect, data: &[(String, Decimal)]) {
    let total: f64 = data.iter().map(|(_, v)| v.to_f64().unwrap_or(0.0)).sum();
    if data.is_empty() || total <= 0.0 {
        let empty = Paragraph::new("Nothing to plot").alignment(Alignment::Center);
        frame.render_widget(empty, area);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let mut slices = Vec::new();
    let mut start_angle = 0.0_f64;
    for (idx, (_, value)) in data.iter().enumerate() {
        let sweep = value.to_f64().unwrap_or(0.0) / total * std::f64::consts::TAU;
        slices.push((start_angle, start_angle + sweep, color_for(idx)));
        start_angle += sweep;
    }

    let canvas = Canvas::default()
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(|ctx| {
            for (start, end, color) in &slices {
                let mut points = Vec::new();
                // Hole from 0 to 0.45 makes it a doughnut rather than a pie.
                let mut r = 0.45;
                while r <= 1.0 {
                    let mut angle = *start;
                    while angle <= *end {
                        points.push((r * angle.cos(), r * angle.sin()));
                        angle += 0.05;
                    }
                    r += 0.04;
                }
                if !points.is_empty() {
                    ctx.draw(&Points {
                        coords: &points,
                        color: *color,
                    });
                }
            }
        });
    frame.render_widget(canvas, layout[0]);

    let mut lines = vec![Line::from(Span::styled(
        format!("{:15}  {:>12}", "Label", "Amount"),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ))];
    for (idx, (label, value)) in data.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!("{:15}  {:>12}", label, value),
            Style::default().fg(color_for(idx)),
        )));
    }
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Left), layout[1]);
}
