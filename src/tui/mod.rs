use std::io;
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Terminal,
};
use tokio::sync::mpsc;

use crate::badge::{self, BadgeState, BadgeUpdate, FALLBACK_BADGE_BOTTOM, FALLBACK_BADGE_TOP};
use crate::directory::DirectoryState;
use crate::loader::LOAD_ERROR_MESSAGE;
use crate::model::Company;
use crate::output::NO_RESULTS_MESSAGE;

// every card renders as exactly this many rows, which keeps mouse
// hit-testing a plain division
const CARD_HEIGHT: u16 = 4;

const CLOSE_CONTROL: &str = "[ Fechar ]";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Focus {
    Search,
    Cards,
}

struct ModalView {
    index: usize,
    company: Company,
    badge: BadgeState,
}

struct DirectoryUi {
    state: DirectoryState,
    sectors: Vec<String>,
    sector_idx: usize, // 0 = all sectors, i+1 = sectors[i]
    input: String,
    focus: Focus,
    view: Vec<usize>,
    list: ListState,
    badges: Vec<BadgeState>,
    modal: Option<ModalView>,
    load_error: Option<String>,
}

impl DirectoryUi {
    fn new(state: DirectoryState, sectors: Vec<String>) -> Self {
        let badges = state.companies().iter().map(badge::initial_state).collect();
        let input = state.last_search().to_string();
        let sector_idx = match state.active_sector() {
            Some(active) => sectors
                .iter()
                .position(|s| s.eq_ignore_ascii_case(active))
                .map(|i| i + 1)
                .unwrap_or(0),
            None => 0,
        };
        let mut ui = Self {
            state,
            sectors,
            sector_idx,
            input,
            focus: Focus::Search,
            view: Vec::new(),
            list: ListState::default(),
            badges,
            modal: None,
            load_error: None,
        };
        ui.refresh(false);
        ui
    }

    fn sector_label(&self) -> &str {
        if self.sector_idx == 0 {
            "Todos"
        } else {
            &self.sectors[self.sector_idx - 1]
        }
    }

    fn refresh(&mut self, realtime: bool) {
        self.view = self.state.filtered_indices(realtime);
        if self.view.is_empty() {
            self.list.select(None);
        } else {
            let selected = self.list.selected().unwrap_or(0);
            self.list.select(Some(selected.min(self.view.len() - 1)));
        }
    }

    fn live_search(&mut self) {
        let input = self.input.clone();
        self.state.set_search(&input);
        self.refresh(true);
    }

    fn submit_search(&mut self) {
        let input = self.input.clone();
        self.state.set_search(&input);
        self.refresh(false);
    }

    fn cycle_sector(&mut self, forward: bool) {
        let slots = self.sectors.len() + 1;
        self.sector_idx = if forward {
            (self.sector_idx + 1) % slots
        } else {
            (self.sector_idx + slots - 1) % slots
        };
        let sector = if self.sector_idx == 0 {
            None
        } else {
            Some(self.sectors[self.sector_idx - 1].clone())
        };
        self.state.set_sector(sector.as_deref());
        self.refresh(false);
    }

    fn move_selection(&mut self, down: bool) {
        if self.view.is_empty() {
            return;
        }
        let last = self.view.len() - 1;
        let current = self.list.selected().unwrap_or(0);
        let next = if down {
            (current + 1).min(last)
        } else {
            current.saturating_sub(1)
        };
        self.list.select(Some(next));
    }

    fn open_selected(&mut self) {
        let Some(selected) = self.list.selected() else {
            return;
        };
        let Some(&index) = self.view.get(selected) else {
            return;
        };
        self.modal = Some(ModalView {
            index,
            company: self.state.companies()[index].clone(),
            badge: self.badges[index].clone(),
        });
    }

    fn close_modal(&mut self) {
        self.modal = None;
    }

    fn apply_badge_update(&mut self, update: BadgeUpdate) {
        if let Some(slot) = self.badges.get_mut(update.index) {
            *slot = update.state.clone();
        }
        if let Some(modal) = self.modal.as_mut() {
            if modal.index == update.index {
                modal.badge = update.state;
            }
        }
    }

    /// Returns true when the browser should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        if self.modal.is_some() {
            // the close control owns focus while the modal is open
            match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ') => self.close_modal(),
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Search => Focus::Cards,
                    Focus::Cards => Focus::Search,
                };
            }
            KeyCode::Left => self.cycle_sector(false),
            KeyCode::Right => self.cycle_sector(true),
            KeyCode::Up => self.move_selection(false),
            KeyCode::Down => self.move_selection(true),
            KeyCode::Enter => match self.focus {
                Focus::Search => {
                    self.submit_search();
                    self.focus = Focus::Cards;
                }
                Focus::Cards => self.open_selected(),
            },
            KeyCode::Backspace if self.focus == Focus::Search => {
                self.input.pop();
                self.live_search();
            }
            KeyCode::Char('/') if self.focus == Focus::Cards => {
                self.focus = Focus::Search;
            }
            KeyCode::Char(c) if self.focus == Focus::Search => {
                self.input.push(c);
                self.live_search();
            }
            _ => {}
        }
        false
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let point = Position::new(mouse.column, mouse.row);

        if self.modal.is_some() {
            let rect = modal_rect(area);
            if !rect.contains(point) {
                // backdrop click
                self.close_modal();
                return;
            }
            let inner = rect.inner(ratatui::layout::Margin::new(1, 1));
            if inner.height > 0 && point.y == inner.y + inner.height - 1 {
                // close control row
                self.close_modal();
            }
            return;
        }

        let areas = compute_areas(area);
        let inner = areas.cards.inner(ratatui::layout::Margin::new(1, 1));
        if inner.contains(point) && !self.view.is_empty() {
            let idx = self.list.offset() + ((point.y - inner.y) / CARD_HEIGHT) as usize;
            if idx < self.view.len() {
                self.list.select(Some(idx));
                self.focus = Focus::Cards;
                self.open_selected();
            }
        }
    }
}

struct UiAreas {
    header: Rect,
    controls: Rect,
    cards: Rect,
    footer: Rect,
}

fn compute_areas(area: Rect) -> UiAreas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);
    UiAreas {
        header: chunks[0],
        controls: chunks[1],
        cards: chunks[2],
        footer: chunks[3],
    }
}

fn modal_rect(area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(12),
            Constraint::Percentage(76),
            Constraint::Percentage(12),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(15),
            Constraint::Percentage(70),
            Constraint::Percentage(15),
        ])
        .split(vertical[1]);
    horizontal[1]
}

fn badge_span(state: &BadgeState) -> Span<'static> {
    match state {
        BadgeState::Loaded(_) => Span::styled("[logo]", Style::default().fg(Color::Green)),
        BadgeState::Trying(_) => Span::styled("[....]", Style::default().fg(Color::DarkGray)),
        BadgeState::Exhausted => Span::styled(
            format!("[{FALLBACK_BADGE_TOP} {FALLBACK_BADGE_BOTTOM}]"),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
    }
}

fn draw_ui(f: &mut ratatui::Frame, ui: &mut DirectoryUi) {
    let areas = compute_areas(f.area());

    let header = Paragraph::new(format!(
        " selodir  {} de {} fornecedores",
        ui.view.len(),
        ui.state.companies().len()
    ))
    .style(Style::default().bg(Color::Rgb(20, 48, 28)).fg(Color::White));
    f.render_widget(header, areas.header);

    render_controls(f, areas.controls, ui);
    render_cards(f, areas.cards, ui);

    let help = Paragraph::new(
        " Tab: foco  |  Enter: abrir/buscar  |  ←/→: setor  |  ↑/↓: selecionar  |  Esc: sair",
    )
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, areas.footer);

    if ui.modal.is_some() {
        render_modal(f, modal_rect(f.area()), ui);
    }
}

fn render_controls(f: &mut ratatui::Frame, area: Rect, ui: &DirectoryUi) {
    let focused = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let blurred = Style::default().fg(Color::Gray);

    let (search_style, cursor) = if ui.focus == Focus::Search && ui.modal.is_none() {
        (focused, "▌")
    } else {
        (blurred, "")
    };
    let line = Line::from(vec![
        Span::styled(format!("Busca: {}{}", ui.input, cursor), search_style),
        Span::raw("    "),
        Span::styled(
            format!("Setor: ‹{}›", ui.sector_label()),
            Style::default().fg(Color::Cyan),
        ),
    ]);
    let controls = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Filtros"));
    f.render_widget(controls, area);
}

fn render_cards(f: &mut ratatui::Frame, area: Rect, ui: &mut DirectoryUi) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Fornecedores ({})", ui.view.len()));

    if let Some(cause) = ui.load_error.as_deref() {
        let error = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                LOAD_ERROR_MESSAGE,
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                cause.to_string(),
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(ratatui::layout::Alignment::Center)
        .block(block)
        .wrap(Wrap { trim: true });
        f.render_widget(error, area);
        return;
    }

    if ui.view.is_empty() {
        let empty = Paragraph::new(format!("\n{NO_RESULTS_MESSAGE}"))
            .style(Style::default().fg(Color::Yellow))
            .alignment(ratatui::layout::Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = ui
        .view
        .iter()
        .map(|&idx| {
            let company = &ui.state.companies()[idx];
            let lines = vec![
                Line::from(vec![
                    badge_span(&ui.badges[idx]),
                    Span::raw(" "),
                    Span::styled(
                        company.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("  {}", company.sector_label()),
                    Style::default().fg(Color::Cyan),
                )),
                Line::from(format!("  {}", company.summary())),
                Line::from(""),
            ];
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, area, &mut ui.list);
}

fn render_modal(f: &mut ratatui::Frame, rect: Rect, ui: &DirectoryUi) {
    let Some(modal) = ui.modal.as_ref() else {
        return;
    };
    let company = &modal.company;

    let mut lines: Vec<Line> = Vec::new();
    match &modal.badge {
        BadgeState::Loaded(url) => lines.push(Line::from(Span::styled(
            url.clone(),
            Style::default().fg(Color::DarkGray),
        ))),
        BadgeState::Trying(_) => lines.push(Line::from(Span::styled(
            "carregando logo...",
            Style::default().fg(Color::DarkGray),
        ))),
        BadgeState::Exhausted => lines.push(Line::from(Span::styled(
            format!("{FALLBACK_BADGE_TOP} {FALLBACK_BADGE_BOTTOM}"),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ))),
    }
    lines.push(Line::from(""));

    if let Some(short) = company.short.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        lines.push(Line::from(Span::styled(
            short.to_string(),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(format!("Setor: {}", company.sector_label())));
    if let Some(selo) = company.selo.as_deref() {
        lines.push(Line::from(format!("Selo: {selo}")));
    }
    if let Some(service) = company.service.as_deref() {
        lines.push(Line::from(format!("Serviço: {service}")));
    }
    if let Some(contact) = company.contact.as_deref() {
        lines.push(Line::from(format!("Contato: {contact}")));
    }
    if let Some(website) = company.website.as_deref() {
        lines.push(Line::from(Span::styled(
            format!("Site: {website}"),
            Style::default().fg(Color::Blue),
        )));
    }
    if let Some(description) = company.description.as_deref() {
        lines.push(Line::from(""));
        lines.push(Line::from(description.to_string()));
    }
    if !company.practices.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(format!(
            "Práticas: {}",
            company.practices.join(", ")
        )));
    }
    if !company.certifications.is_empty() {
        lines.push(Line::from(format!(
            "Certificações: {}",
            company.certifications.join(", ")
        )));
    }

    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(company.name.clone());
    let inner = rect.inner(ratatui::layout::Margin::new(1, 1));
    f.render_widget(block, rect);

    let body = if inner.height > 1 {
        Rect::new(inner.x, inner.y, inner.width, inner.height - 1)
    } else {
        inner
    };
    let detail = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(detail, body);

    if inner.height > 0 {
        let close_row = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);
        let close = Paragraph::new(CLOSE_CONTROL)
            .alignment(ratatui::layout::Alignment::Center)
            .style(Style::default().add_modifier(Modifier::REVERSED));
        f.render_widget(close, close_row);
    }
}

/// Full-screen interactive directory browser. Logo probing runs as a
/// background task and streams badge updates into the event loop. When
/// `load_error` is set the card grid is replaced by an error panel.
pub async fn run(
    state: DirectoryState,
    sectors: Vec<String>,
    client: reqwest::Client,
    asset_base: Option<reqwest::Url>,
    rate: u32,
    load_error: Option<String>,
) -> Result<(), String> {
    let mut ui = DirectoryUi::new(state, sectors);
    ui.load_error = load_error;

    let (tx, mut rx) = mpsc::channel::<BadgeUpdate>(64);
    if let Some(base) = asset_base.filter(|_| ui.load_error.is_none()) {
        let companies = ui.state.companies().to_vec();
        tokio::spawn(badge::probe_all(client, base, companies, rate, tx));
    } else {
        drop(tx);
    }

    enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {e}"))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .map_err(|e| format!("failed to enter alternate screen: {e}"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create terminal: {e}"))?;

    let result = event_loop(&mut terminal, &mut ui, &mut rx).await;

    // restore the terminal regardless of result
    let _ = disable_raw_mode();
    let _ = execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    );
    let _ = terminal.show_cursor();

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ui: &mut DirectoryUi,
    rx: &mut mpsc::Receiver<BadgeUpdate>,
) -> Result<(), String> {
    'browser: loop {
        terminal
            .draw(|f| draw_ui(f, ui))
            .map_err(|e| format!("failed to draw: {e}"))?;

        // the frame pause must be an await: the probe task shares this
        // thread and only runs while the loop is suspended
        tokio::time::sleep(Duration::from_millis(50)).await;

        while event::poll(Duration::ZERO).map_err(|e| format!("event poll failed: {e}"))? {
            match event::read().map_err(|e| format!("event read failed: {e}"))? {
                Event::Key(key) => {
                    if ui.handle_key(key) {
                        break 'browser;
                    }
                }
                Event::Mouse(mouse) => {
                    let size = terminal
                        .size()
                        .map_err(|e| format!("failed to read terminal size: {e}"))?;
                    ui.handle_mouse(mouse, Rect::new(0, 0, size.width, size.height));
                }
                _ => {}
            }
        }

        while let Ok(update) = rx.try_recv() {
            ui.apply_badge_update(update);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(name: &str, sector: Option<&str>) -> Company {
        Company {
            name: name.to_string(),
            sector: sector.map(|s| s.to_string()),
            ..Company::default()
        }
    }

    fn ui_with(companies: Vec<Company>) -> DirectoryUi {
        let sectors = crate::directory::sector_options(&companies);
        DirectoryUi::new(DirectoryState::new(companies), sectors)
    }

    #[test]
    fn live_typing_narrows_the_view() {
        let mut ui = ui_with(vec![
            company("EcoCorp", Some("Reciclagem")),
            company("BioFuel", Some("Energia")),
        ]);
        assert_eq!(ui.view.len(), 2);
        for c in "eco".chars() {
            ui.handle_key(KeyEvent::from(KeyCode::Char(c)));
        }
        assert_eq!(ui.view, vec![0]);
        ui.handle_key(KeyEvent::from(KeyCode::Backspace));
        ui.handle_key(KeyEvent::from(KeyCode::Backspace));
        ui.handle_key(KeyEvent::from(KeyCode::Backspace));
        assert_eq!(ui.view.len(), 2);
    }

    #[test]
    fn sector_cycling_wraps_through_all() {
        let mut ui = ui_with(vec![
            company("EcoCorp", Some("Reciclagem")),
            company("BioFuel", Some("Energia")),
        ]);
        assert_eq!(ui.sector_label(), "Todos");
        ui.handle_key(KeyEvent::from(KeyCode::Right));
        assert_eq!(ui.sector_label(), "Energia");
        assert_eq!(ui.view, vec![1]);
        ui.handle_key(KeyEvent::from(KeyCode::Right));
        assert_eq!(ui.sector_label(), "Reciclagem");
        ui.handle_key(KeyEvent::from(KeyCode::Right));
        assert_eq!(ui.sector_label(), "Todos");
        assert_eq!(ui.view.len(), 2);
    }

    #[test]
    fn enter_opens_and_esc_closes_the_modal() {
        let mut ui = ui_with(vec![company("EcoCorp", Some("Reciclagem"))]);
        ui.handle_key(KeyEvent::from(KeyCode::Tab));
        ui.handle_key(KeyEvent::from(KeyCode::Enter));
        assert!(ui.modal.is_some());
        assert_eq!(ui.modal.as_ref().unwrap().company.name, "EcoCorp");
        // Esc closes the modal instead of quitting
        assert!(!ui.handle_key(KeyEvent::from(KeyCode::Esc)));
        assert!(ui.modal.is_none());
        // a second Esc quits
        assert!(ui.handle_key(KeyEvent::from(KeyCode::Esc)));
    }

    #[test]
    fn badge_updates_reach_an_open_modal() {
        let mut ui = ui_with(vec![Company {
            name: "EcoCorp".to_string(),
            logo_filename: Some("files/eco.png".to_string()),
            ..Company::default()
        }]);
        ui.handle_key(KeyEvent::from(KeyCode::Tab));
        ui.handle_key(KeyEvent::from(KeyCode::Enter));
        ui.apply_badge_update(BadgeUpdate {
            index: 0,
            state: BadgeState::Loaded("https://x.tld/eco.png".to_string()),
        });
        assert_eq!(
            ui.modal.as_ref().unwrap().badge,
            BadgeState::Loaded("https://x.tld/eco.png".to_string())
        );
    }

    #[test]
    fn badge_updates_cross_the_channel_on_a_single_thread() {
        // the event loop's awaited frame pause is what lets the spawned
        // sender run on a current-thread runtime; this mirrors that shape
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let (tx, mut rx) = mpsc::channel::<BadgeUpdate>(64);
            tokio::spawn(async move {
                let _ = tx
                    .send(BadgeUpdate {
                        index: 0,
                        state: BadgeState::Loaded("https://x.tld/eco.png".to_string()),
                    })
                    .await;
            });

            let mut ui = ui_with(vec![Company {
                name: "EcoCorp".to_string(),
                logo_filename: Some("files/eco.png".to_string()),
                ..Company::default()
            }]);
            assert_eq!(ui.badges[0], BadgeState::Trying(0));

            let mut received = false;
            for _ in 0..20 {
                tokio::time::sleep(Duration::from_millis(5)).await;
                while let Ok(update) = rx.try_recv() {
                    ui.apply_badge_update(update);
                    received = true;
                }
                if received {
                    break;
                }
            }
            assert!(received);
            assert_eq!(
                ui.badges[0],
                BadgeState::Loaded("https://x.tld/eco.png".to_string())
            );
        });
    }

    #[test]
    fn load_error_panel_replaces_the_card_grid() {
        let mut ui = ui_with(Vec::new());
        ui.load_error = Some("unexpected status 404".to_string());

        let backend = ratatui::backend::TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw_ui(f, &mut ui)).unwrap();

        let rendered = format!("{:?}", terminal.backend().buffer());
        assert!(rendered.contains(LOAD_ERROR_MESSAGE));
        assert!(rendered.contains("unexpected status 404"));
        assert!(!rendered.contains(NO_RESULTS_MESSAGE));
    }

    #[test]
    fn selection_clamps_when_the_view_shrinks() {
        let mut ui = ui_with(vec![
            company("EcoCorp", Some("Reciclagem")),
            company("BioFuel", Some("Energia")),
            company("GreenLog", Some("Logística")),
        ]);
        ui.handle_key(KeyEvent::from(KeyCode::Down));
        ui.handle_key(KeyEvent::from(KeyCode::Down));
        assert_eq!(ui.list.selected(), Some(2));
        for c in "bio".chars() {
            ui.handle_key(KeyEvent::from(KeyCode::Char(c)));
        }
        assert_eq!(ui.view, vec![1]);
        assert_eq!(ui.list.selected(), Some(0));
    }
}
