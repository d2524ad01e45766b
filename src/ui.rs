use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use crossterm::{
    event::{
        self,
        Event,
        KeyCode,
        KeyEventKind,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use itertools::Itertools;
use raffle_console::{
    app::AppSnapshot,
    award_grid::{
        GridCell,
        SPIN_BUTTON,
    },
};
use ratatui::{
    prelude::*,
    widgets::*,
};
use std::{
    io::stdout,
    time::Duration,
};
use tokio::sync::mpsc;

const INPUT_POLL: Duration = Duration::from_millis(100);

pub type InputEventReceiver = mpsc::UnboundedReceiver<std::io::Result<Event>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserEvent {
    Quit,
    Redraw,
    Spin,
    TenDraw,
    SignIn,
    Armory,
    Refresh,
    OpenSkuStore,
    Redeem(i64),
    ReloadSkus,
    DismissTenDraw,
}

#[derive(Debug, Default)]
pub struct UiState {
    mode: Mode,
    sku_ids: Vec<i64>,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Normal,
    SkuModal(SkuState),
    TenDrawModal,
    QuitModal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct SkuState {
    idx: usize,
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

/// Reads terminal input on a dedicated thread. The thread exits once the
/// receiver is dropped.
pub fn input_event_stream() -> InputEventReceiver {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        loop {
            match event::poll(INPUT_POLL) {
                Ok(true) => {
                    let read = event::read();
                    let failed = read.is_err();
                    if tx.send(read).is_err() || failed {
                        break;
                    }
                }
                Ok(false) => {
                    if tx.is_closed() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx.send(Err(err));
                    break;
                }
            }
        }
    });
    rx
}

pub async fn next_raw_event(input_events: &mut InputEventReceiver) -> Result<Event> {
    input_events
        .recv()
        .await
        .ok_or_else(|| eyre!("terminal input stream closed"))?
        .wrap_err("reading terminal input failed")
}

pub fn draw(state: &mut UiState, snap: &AppSnapshot) -> Result<()> {
    state.sku_ids = snap.skus.iter().map(|sku| sku.sku).collect();
    if let Mode::SkuModal(ss) = &mut state.mode {
        ss.idx = ss.idx.min(state.sku_ids.len().saturating_sub(1));
    }
    let ten_draw_open = snap.ten_draw.is_some();
    if state.mode == Mode::Normal && ten_draw_open {
        state.mode = Mode::TenDrawModal;
    } else if state.mode == Mode::TenDrawModal && !ten_draw_open {
        state.mode = Mode::Normal;
    }
    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, state, snap))?;
        state.terminal = Some(term);
    }
    Ok(())
}

pub fn interpret_event(state: &mut UiState, event: Event) -> Option<UserEvent> {
    let k = match event {
        Event::Key(k) if k.kind == KeyEventKind::Press => k,
        Event::Resize(_, _) => return Some(UserEvent::Redraw),
        _ => return None,
    };
    match &mut state.mode {
        Mode::QuitModal => match k.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => return Some(UserEvent::Quit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                state.mode = Mode::Normal;
                return Some(UserEvent::Redraw);
            }
            _ => return None,
        },
        Mode::TenDrawModal => match k.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ') => {
                state.mode = Mode::Normal;
                return Some(UserEvent::DismissTenDraw);
            }
            _ => return None,
        },
        Mode::SkuModal(ss) => match k.code {
            KeyCode::Esc => {
                state.mode = Mode::Normal;
                return Some(UserEvent::Redraw);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                ss.idx = ss.idx.saturating_sub(1);
                return Some(UserEvent::Redraw);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if ss.idx + 1 < state.sku_ids.len() {
                    ss.idx += 1;
                }
                return Some(UserEvent::Redraw);
            }
            KeyCode::Enter => {
                return state.sku_ids.get(ss.idx).copied().map(UserEvent::Redeem);
            }
            KeyCode::Char('r') => return Some(UserEvent::ReloadSkus),
            _ => return None,
        },
        Mode::Normal => {}
    }
    match k.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            state.mode = Mode::QuitModal;
            Some(UserEvent::Redraw)
        }
        KeyCode::Char(' ') | KeyCode::Enter => Some(UserEvent::Spin),
        KeyCode::Char('t') => Some(UserEvent::TenDraw),
        KeyCode::Char('s') => Some(UserEvent::SignIn),
        KeyCode::Char('a') => Some(UserEvent::Armory),
        KeyCode::Char('r') => Some(UserEvent::Refresh),
        KeyCode::Char('p') => {
            state.mode = Mode::SkuModal(SkuState::default());
            Some(UserEvent::OpenSkuStore)
        }
        _ => None,
    }
}

fn ui(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),  // member card + rule weights
            Constraint::Min(15),    // award grid + sku catalog
            Constraint::Length(3),  // winners marquee
            Constraint::Length(5),  // status/errors
            Constraint::Length(3),  // help
        ])
        .split(f.area());

    draw_top(f, chunks[0], snap);
    draw_middle(f, chunks[1], snap);
    draw_marquee(f, chunks[2], snap);
    draw_bottom(f, chunks[3], chunks[4], snap);
    draw_modals(f, state, snap);
}

fn draw_top(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);
    draw_member_card(f, cols[0], snap);
    draw_rule_weights(f, cols[1], snap);
}

fn draw_member_card(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let member = &snap.member;
    let credit = member
        .credit
        .map_or_else(|| "-".to_string(), |c| format!("{c:.2}"));
    let draws_left = member
        .account
        .as_ref()
        .map_or_else(|| "-".to_string(), |a| a.day_count_surplus.to_string());
    let signed = match (member.signed, snap.signing) {
        (true, _) => Span::styled("signed in", Style::default().fg(Color::Green)),
        (false, true) => Span::raw("signing in..."),
        (false, false) => Span::styled("not signed in (s)", Style::default().fg(Color::Yellow)),
    };
    let clock = chrono::Local::now().format("%H:%M:%S").to_string();
    let lines = vec![
        Line::from(format!(
            "User: {}   Activity: {}",
            snap.session.user_id, snap.session.activity_id
        )),
        Line::from(format!("Credit: {credit}   Draws left today: {draws_left}")),
        Line::from(vec![Span::raw("Today: "), signed]),
        Line::from(Span::styled(clock, Style::default().add_modifier(Modifier::DIM))),
    ];
    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Member"));
    f.render_widget(p, area);
}

fn draw_rule_weights(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let block = Block::default().borders(Borders::ALL).title("Draw progress");
    let inner = block.inner(area);
    f.render_widget(block, area);
    if snap.rule_weights.is_empty() {
        f.render_widget(Paragraph::new("No progress tiers"), inner);
        return;
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(1); snap.rule_weights.len()])
        .split(inner);
    for (tier, row) in snap.rule_weights.iter().zip(rows.iter()) {
        let awards = tier.awards.iter().map(|a| a.award_title.as_str()).join(", ");
        let color = if tier.is_reached() {
            Color::Green
        } else {
            Color::Cyan
        };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color))
            .percent(tier.percent())
            .label(format!("{}/{} {}", tier.progress, tier.threshold, awards));
        f.render_widget(gauge, *row);
    }
}

fn draw_middle(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);
    draw_grid(f, cols[0], snap);
    draw_sku_panel(f, cols[1], snap);
}

fn draw_grid(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let col_w = area.width / 3;
    let row_h = area.height / 3;
    for y in 0..3u16 {
        for x in 0..3u16 {
            let rect = Rect::new(area.x + x * col_w, area.y + y * row_h, col_w, row_h);
            if (x, y) == SPIN_BUTTON {
                draw_spin_button(f, rect, snap);
                continue;
            }
            let cell = snap.cells.iter().find(|c| c.x == x && c.y == y);
            draw_award_cell(f, rect, cell, snap);
        }
    }
}

fn draw_spin_button(f: &mut Frame, rect: Rect, snap: &AppSnapshot) {
    let (label, style) = if snap.drawing {
        ("Drawing...", Style::default().fg(Color::DarkGray))
    } else {
        (
            "SPIN\n(space)",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    };
    let p = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double),
        );
    f.render_widget(p, rect);
}

fn draw_award_cell(f: &mut Frame, rect: Rect, cell: Option<&GridCell>, snap: &AppSnapshot) {
    let Some(cell) = cell else {
        let p = Paragraph::new("...")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(p, rect);
        return;
    };
    let highlighted = cell.index == snap.highlight;
    let border_style = if highlighted {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let text_style = if cell.is_locked() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let mut lines = vec![Line::from(Span::styled(cell.label(), text_style))];
    if let Some(subtitle) = cell.award.subtitle.as_deref().filter(|s| !s.is_empty()) {
        lines.push(Line::from(Span::styled(
            subtitle.to_string(),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(cell.slot_key());
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
    f.render_widget(p, rect);
}

fn sku_line(snap: &AppSnapshot, idx: usize, cursor: Option<usize>) -> Line<'static> {
    let sku = &snap.skus[idx];
    let cur = if cursor == Some(idx) { ">" } else { " " };
    let busy = if snap.redeeming == Some(sku.sku) {
        " redeeming..."
    } else {
        ""
    };
    Line::from(format!(
        "{cur} {} {:.2} credits +{} draws ({} left){busy}",
        sku.sku,
        sku.product_amount,
        sku.draws_granted(),
        sku.stock_count_surplus
    ))
}

fn draw_sku_panel(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let lines: Vec<Line> = if snap.skus.is_empty() {
        vec![Line::from("No products")]
    } else {
        (0..snap.skus.len()).map(|i| sku_line(snap, i, None)).collect()
    };
    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Credit store (p)"));
    f.render_widget(p, area);
}

fn draw_marquee(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let block = Block::default().borders(Borders::ALL).title("Recent winners");
    let inner = block.inner(area);
    let text = if snap.ticker.is_empty() {
        "No winners yet".to_string()
    } else {
        snap.ticker.frame(inner.width as usize)
    };
    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_bottom(f: &mut Frame, status_area: Rect, help_area: Rect, snap: &AppSnapshot) {
    let status_widget = if snap.errors.is_empty() {
        let mut lines: Vec<Line> = Vec::new();
        if snap.status.trim().is_empty() {
            lines.push(Line::from("Ready"));
        } else {
            for line in snap.status.lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .style(Style::default().fg(Color::Green))
    } else {
        let lines: Vec<Line> = snap
            .errors
            .iter()
            .rev()
            .map(|e| Line::from(e.clone()))
            .collect();
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Errors"))
            .style(Style::default().fg(Color::Red))
    };
    f.render_widget(status_widget, status_area);

    let help = Paragraph::new(
        "space/enter spin | t ten-draw | s sign-in | a armory | p credit store | r refresh | q/Esc quit",
    )
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, help_area);
}

fn draw_modals(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    match &state.mode {
        Mode::SkuModal(ss) => {
            let area = centered_rect(60, 50, f.area());
            let block = Block::default()
                .borders(Borders::ALL)
                .title("Credit store: Enter=redeem r=reload Esc=close");
            let lines: Vec<Line> = if snap.skus.is_empty() {
                vec![Line::from("No products")]
            } else {
                (0..snap.skus.len())
                    .map(|i| sku_line(snap, i, Some(ss.idx)))
                    .collect()
            };
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(Paragraph::new(lines), block.inner(area));
        }
        Mode::TenDrawModal => {
            let area = centered_rect(50, 60, f.area());
            let block = Block::default()
                .borders(Borders::ALL)
                .title("Ten-draw results (Enter to close)");
            let lines: Vec<Line> = snap
                .ten_draw
                .iter()
                .flatten()
                .enumerate()
                .map(|(n, award)| Line::from(format!("{:>2}. {}", n + 1, award.award_title)))
                .collect();
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(Paragraph::new(lines), block.inner(area));
        }
        Mode::QuitModal => {
            let area = centered_rect(40, 20, f.area());
            let block = Block::default().borders(Borders::ALL).title("Confirm Quit");
            let p = Paragraph::new("Quit the raffle? (Y/N)");
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(p, block.inner(area));
        }
        Mode::Normal => {}
    }
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1])[1]
}
