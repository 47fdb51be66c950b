use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};
use speech_sync::{ChunkStatus, SyncFrame, WordState};

use crate::App;

const SIDE_PANEL_WIDTH: u16 = 36;

pub fn render(frame: &mut Frame, app: &App) {
    let data = app.engine.frame();

    let [header_area, body_area, progress_area, hint_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [words_area, side_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(SIDE_PANEL_WIDTH)])
            .areas(body_area);

    render_header(frame, app, &data, header_area);
    render_words(frame, app, &data, words_area);
    render_side(frame, app, &data, side_area);
    render_progress(frame, &data, progress_area);
    render_hints(frame, hint_area);
}

fn render_header(frame: &mut Frame, app: &App, data: &SyncFrame, area: Rect) {
    let status = if app.paused {
        "⏸ PAUSED"
    } else if app.streaming {
        "… STREAMING"
    } else if data.sync.is_playing {
        "▶ PLAYING"
    } else {
        "■ IDLE"
    };
    let ttft = match data.latency.ttft_ms {
        Some(ms) => format!("ttft {ms:.0}ms"),
        None if data.latency.is_tracking => "ttft …".to_string(),
        None => "ttft n/a".to_string(),
    };
    let text = format!(
        " {} | {} | {:.1} wps | {} ",
        app.script_name,
        status,
        app.engine.config().words_per_second,
        ttft
    );
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn word_style(state: WordState) -> Style {
    match state {
        WordState::Spoken => Style::default().fg(Color::White),
        WordState::Speaking => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        WordState::Buffered => Style::default().fg(Color::Gray),
        WordState::Pending => Style::default().fg(Color::DarkGray),
    }
}

fn render_words(frame: &mut Frame, app: &App, data: &SyncFrame, area: Rect) {
    let lines = if data.sync.words.is_empty() {
        let hint = if app.streaming {
            format!("streaming fragment {}…", app.next_fragment)
        } else {
            "no words".to_string()
        };
        vec![Line::from(Span::styled(
            hint,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))]
    } else {
        let mut spans = Vec::with_capacity(data.sync.words.len() * 2);
        for word in &data.sync.words {
            spans.push(Span::styled(word.word.clone(), word_style(word.state)));
            spans.push(Span::raw(" "));
        }
        vec![Line::from(spans)]
    };

    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default())
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn chunk_marker(status: ChunkStatus) -> (&'static str, Color) {
    match status {
        ChunkStatus::Pending => ("·", Color::DarkGray),
        ChunkStatus::Speaking => ("▶", Color::Yellow),
        ChunkStatus::Spoken => ("✓", Color::Green),
        ChunkStatus::Cancelled => ("✗", Color::Red),
    }
}

fn render_side(frame: &mut Frame, app: &App, data: &SyncFrame, area: Rect) {
    let block = Block::default()
        .borders(Borders::LEFT)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(" speech ", Style::default().fg(Color::DarkGray)));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [queue_area, log_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Fill(1)]).areas(inner);

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::UNDERLINED),
        ))
    };

    let mut lines = vec![heading("queue")];
    if data.queue.is_barging_in {
        lines.push(Line::from(Span::styled(
            "barged in, [space] to resume",
            Style::default().fg(Color::Red),
        )));
    }
    let width = queue_area.width.saturating_sub(4) as usize;
    for chunk in &data.queue.chunks {
        let (marker, color) = chunk_marker(chunk.status);
        lines.push(Line::from(vec![
            Span::styled(format!("{marker} "), Style::default().fg(color)),
            Span::raw(truncate(&chunk.text, width).to_string()),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), queue_area);

    let mut lines = vec![heading("events")];
    lines.extend(app.log.iter().map(|entry| {
        Line::from(Span::styled(
            entry.clone(),
            Style::default().fg(Color::DarkGray),
        ))
    }));
    frame.render_widget(Paragraph::new(lines), log_area);
}

fn render_progress(frame: &mut Frame, data: &SyncFrame, area: Rect) {
    let total = data.sync.words.len();
    let label = if total == 0 {
        "0/0".to_string()
    } else {
        format!("{}/{}", data.sync.current_word_index + 1, total)
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::White).bg(Color::DarkGray))
        .ratio(data.sync.progress.clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, area);
}

fn render_hints(frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Paragraph::new(" [Space] pause/resume  [b] barge in  [r] restart  [q] quit ")
            .style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
