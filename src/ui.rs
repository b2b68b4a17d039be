use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{
    Component, EventContext, EventKind, EventRoutingState, HandlerResponse, RenderContext,
};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection,
    StatusBarStyle,
};

use crate::action::Action;
use crate::state::{AppState, EntityDetail, ListMode, StatValue, Theme, View};

const STAT_BAR_WIDTH: usize = 24;
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DexComponentId {
    Search,
    List,
    Detail,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DexContext {
    Search,
    List,
    Detail,
}

impl EventRoutingState<DexComponentId, DexContext> for AppState {
    fn focused(&self) -> Option<DexComponentId> {
        if self.search_active {
            return Some(DexComponentId::Search);
        }
        match self.view {
            View::List => Some(DexComponentId::List),
            View::Detail => Some(DexComponentId::Detail),
        }
    }

    fn modal(&self) -> Option<DexComponentId> {
        if self.search_active {
            Some(DexComponentId::Search)
        } else {
            None
        }
    }

    fn binding_context(&self, id: DexComponentId) -> DexContext {
        match id {
            DexComponentId::Search => DexContext::Search,
            DexComponentId::List => DexContext::List,
            DexComponentId::Detail => DexContext::Detail,
        }
    }

    fn default_context(&self) -> DexContext {
        DexContext::List
    }
}

/// Colors for one theme. Passed down explicitly, never stored globally.
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub bg: Color,
    pub panel: Color,
    pub highlight: Color,
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub bar: Color,
    pub error: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Palette {
                bg: Color::Rgb(12, 18, 28),
                panel: Color::Rgb(20, 32, 46),
                highlight: Color::Rgb(28, 92, 110),
                text: Color::Rgb(232, 242, 244),
                dim: Color::Rgb(176, 195, 207),
                accent: Color::Rgb(72, 204, 184),
                bar: Color::Rgb(144, 202, 249),
                error: Color::Rgb(239, 118, 122),
            },
            Theme::Light => Palette {
                bg: Color::Rgb(245, 245, 245),
                panel: Color::Rgb(255, 255, 255),
                highlight: Color::Rgb(200, 230, 201),
                text: Color::Rgb(33, 33, 33),
                dim: Color::Rgb(97, 97, 97),
                accent: Color::Rgb(0, 121, 107),
                bar: Color::Rgb(76, 175, 80),
                error: Color::Rgb(198, 40, 40),
            },
        }
    }
}

pub struct DexUi {
    list: SelectList,
    status_bar: StatusBar,
}

impl Default for DexUi {
    fn default() -> Self {
        Self::new()
    }
}

impl DexUi {
    pub fn new() -> Self {
        Self {
            list: SelectList::new(),
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        _render_ctx: RenderContext,
        event_ctx: &mut EventContext<DexComponentId>,
    ) {
        let palette = Palette::for_theme(state.theme);
        frame.render_widget(Block::default().style(Style::default().bg(palette.bg)), area);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(area);

        event_ctx.set_component_area(DexComponentId::Search, layout[0]);
        render_search(frame, layout[0], state, palette);

        match state.view {
            View::List => {
                event_ctx.set_component_area(DexComponentId::List, layout[1]);
                event_ctx.component_areas.remove(&DexComponentId::Detail);
                render_list_panel(frame, layout[1], state, palette, &mut self.list);
            }
            View::Detail => {
                event_ctx.set_component_area(DexComponentId::Detail, layout[1]);
                event_ctx.component_areas.remove(&DexComponentId::List);
                render_detail_panel(frame, layout[1], state, palette);
            }
        }

        render_footer(frame, layout[2], state, palette, &mut self.status_bar);
    }

    pub fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_search_event(event, state)
    }

    pub fn handle_list_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_list_event(event, state, &mut self.list)
    }

    pub fn handle_detail_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_detail_event(event, state)
    }
}

pub fn handle_search_event(event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            KeyCode::Esc | KeyCode::Enter => vec![Action::SearchFinish],
            KeyCode::Backspace => {
                let mut text = state.list.search_text.clone();
                if text.pop().is_some() {
                    vec![Action::SearchChange(text)]
                } else {
                    vec![]
                }
            }
            KeyCode::Char(ch) => {
                let mut text = state.list.search_text.clone();
                text.push(ch);
                vec![Action::SearchChange(text)]
            }
            _ => vec![],
        },
        _ => vec![],
    };
    // The field is modal: swallow everything else while it has focus.
    HandlerResponse {
        actions,
        consumed: true,
        needs_render: false,
    }
}

pub fn handle_list_event(
    event: &EventKind,
    state: &AppState,
    list: &mut SelectList,
) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            KeyCode::Enter => vec![Action::DetailOpenSelected],
            KeyCode::PageDown => vec![Action::SelectionPage(1)],
            KeyCode::PageUp => vec![Action::SelectionPage(-1)],
            KeyCode::Home => vec![Action::SelectionJumpTop],
            KeyCode::End => vec![Action::SelectionJumpBottom],
            KeyCode::Char('m') => vec![Action::ListLoadMore],
            _ => {
                let items = list_items(state);
                let props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.selected_index.min(items.len().saturating_sub(1)),
                    is_focused: true,
                    style: list_style(Palette::for_theme(state.theme)),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: false,
                    },
                    on_select: Action::ListSelect,
                    render_item: &|item| item.clone(),
                };
                let actions: Vec<_> = list.handle_event(event, props).into_iter().collect();
                return handler_response(actions);
            }
        },
        EventKind::Scroll { delta, .. } => vec![Action::SelectionMove((*delta * 3) as i16)],
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_detail_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            KeyCode::Esc | KeyCode::Backspace => vec![Action::DetailClose],
            KeyCode::Left | KeyCode::Char('h') => vec![Action::DetailPrev],
            KeyCode::Right | KeyCode::Char('l') => vec![Action::DetailNext],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn render_search(frame: &mut Frame, area: Rect, state: &AppState, palette: Palette) {
    let mode = match state.list.mode() {
        ListMode::Listing => "BROWSE",
        ListMode::Search => "SEARCH",
    };
    let field = if state.search_active {
        format!("{}_", state.list.search_text)
    } else if state.list.search_text.is_empty() {
        "press / to search by name".to_string()
    } else {
        state.list.search_text.clone()
    };
    let field_style = if state.search_active || !state.list.search_text.is_empty() {
        Style::default().fg(palette.text)
    } else {
        Style::default().fg(palette.dim)
    };
    let line = Line::from(vec![
        Span::styled(
            format!("{mode} "),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(field, field_style),
    ]);
    let border = if state.search_active {
        palette.accent
    } else {
        palette.dim
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title("POKEDEX")
        .style(Style::default().bg(palette.panel).fg(palette.text))
        .border_style(Style::default().fg(border));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

pub fn render_list_panel(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    palette: Palette,
    list: &mut SelectList,
) {
    let title = format!("ENTRIES {}", state.list.entries.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(palette.panel).fg(palette.text))
        .border_style(Style::default().fg(palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut body = inner;
    if let Some(error) = state.list.error.as_deref() {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);
        let message = Paragraph::new(error.to_string()).style(Style::default().fg(palette.error));
        frame.render_widget(message, rows[0]);
        body = rows[1];
    }

    if state.list.entries.is_empty() {
        if state.list.is_loading {
            let loading = Paragraph::new("Loading...")
                .alignment(Alignment::Center)
                .style(Style::default().fg(palette.dim));
            frame.render_widget(loading, body);
        }
        return;
    }

    let items = list_items(state);
    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: state.selected_index.min(items.len().saturating_sub(1)),
        is_focused: state.view == View::List && !state.search_active,
        style: list_style(palette),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::ListSelect,
        render_item: &|item| item.clone(),
    };
    list.render(frame, body, props);
}

pub fn render_detail_panel(frame: &mut Frame, area: Rect, state: &AppState, palette: Palette) {
    let title = state
        .detail
        .identifier
        .as_deref()
        .map(format_name)
        .unwrap_or_else(|| "DETAIL".to_string());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(palette.panel).fg(palette.text))
        .border_style(Style::default().fg(palette.accent));

    let text = if let Some(error) = state.detail.error.as_deref() {
        Text::from(vec![Line::from(Span::styled(
            format!("Error: {error}"),
            Style::default().fg(palette.error),
        ))])
    } else if state.detail.is_loading {
        Text::from(Line::from(Span::styled(
            format!("Loading {}", SPINNER[(state.tick % SPINNER.len() as u64) as usize]),
            Style::default().fg(palette.dim),
        )))
    } else if let Some(entity) = state.detail.entity.as_ref() {
        detail_text(entity, palette)
    } else {
        Text::from(Line::from(Span::styled(
            "Pokémon not found.",
            Style::default().fg(palette.dim),
        )))
    };

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn detail_text(entity: &EntityDetail, palette: Palette) -> Text<'static> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format_name(&entity.name),
                Style::default()
                    .fg(palette.text)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  #{:04}", entity.id), Style::default().fg(palette.dim)),
        ]),
        Line::from(""),
    ];

    let mut badges = Vec::new();
    for tag in &entity.types {
        badges.push(Span::styled(
            format!(" {} ", tag.name.to_ascii_uppercase()),
            Style::default()
                .bg(type_color(&tag.name))
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
        badges.push(Span::raw(" "));
    }
    lines.push(Line::from(badges));

    if let Some(url) = entity.image_url.as_deref() {
        lines.push(Line::from(Span::styled(
            format!("Artwork: {url}"),
            Style::default().fg(palette.dim),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "BASE STATS",
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD),
    )));
    for stat in &entity.stats {
        lines.push(stat_line(stat, palette));
    }
    Text::from(lines)
}

fn stat_line(stat: &StatValue, palette: Palette) -> Line<'static> {
    let filled = stat_bar_len(stat.base_value, STAT_BAR_WIDTH);
    Line::from(vec![
        Span::styled(
            format!("{:>8} ", shorten_stat(&stat.name)),
            Style::default().fg(palette.text),
        ),
        Span::styled("█".repeat(filled), Style::default().fg(palette.bar)),
        Span::styled(
            "░".repeat(STAT_BAR_WIDTH - filled),
            Style::default().fg(palette.dim),
        ),
        Span::styled(
            format!(" {:>3}", stat.base_value),
            Style::default().fg(palette.text),
        ),
    ])
}

/// Cells filled for a base stat on a bar `width` cells wide (255 fills it).
pub fn stat_bar_len(value: u8, width: usize) -> usize {
    (value as usize * width + 127) / u8::MAX as usize
}

fn render_footer(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    palette: Palette,
    status_bar: &mut StatusBar,
) {
    let spinner = SPINNER[(state.tick % SPINNER.len() as u64) as usize];
    let status = if state.list.is_loading && state.view == View::List {
        format!("{spinner} loading")
    } else if state.list.has_more && state.list.mode() == ListMode::Listing {
        format!("{} shown, more available", state.list.entries.len())
    } else {
        format!("{} shown", state.list.entries.len())
    };
    let left_hints = status_hints(state);
    let center_hints = vec![
        StatusBarHint::new("t", "Theme"),
        StatusBarHint::new("q", "Quit"),
    ];
    let status_span = Span::styled(status, Style::default().fg(palette.accent));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(palette.dim),
                focused_style: Some(Style::default().fg(palette.accent)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(palette.panel),
            fg: Some(palette.text),
        },
        text: Style::default().fg(palette.dim),
        hint_key: Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(palette.dim),
        separator: Style::default().fg(palette.dim),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn status_hints(state: &AppState) -> Vec<StatusBarHint<'static>> {
    if state.search_active {
        return vec![
            StatusBarHint::new("Enter/Esc", "Done"),
            StatusBarHint::new("Bksp", "Delete"),
        ];
    }
    match state.view {
        View::List => vec![
            StatusBarHint::new("j/k", "Move"),
            StatusBarHint::new("Enter", "Open"),
            StatusBarHint::new("/", "Search"),
            StatusBarHint::new("m", "More"),
            StatusBarHint::new("r", "Refresh"),
        ],
        View::Detail => vec![
            StatusBarHint::new("h/l", "Prev/Next"),
            StatusBarHint::new("Esc", "Back"),
        ],
    }
}

fn list_items(state: &AppState) -> Vec<Line<'static>> {
    state
        .list
        .entries
        .iter()
        .map(|entry| {
            let number = entry_number(&entry.url)
                .map(|id| format!("#{id:04}"))
                .unwrap_or_else(|| "#----".to_string());
            Line::from(format!("{number} {}", format_name(&entry.name)))
        })
        .collect()
}

fn list_style(palette: Palette) -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: Some(palette.text),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(palette.highlight)
                    .fg(palette.text)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

/// Trailing numeric path segment of a resource URL (`.../pokemon/25/`).
pub fn entry_number(url: &str) -> Option<u32> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

pub fn format_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
                None => "".to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn shorten_stat(name: &str) -> String {
    match name {
        "hp" => "HP".to_string(),
        "attack" => "Attack".to_string(),
        "defense" => "Defense".to_string(),
        "special-attack" => "Sp. Atk".to_string(),
        "special-defense" => "Sp. Def".to_string(),
        "speed" => "Speed".to_string(),
        _ => format_name(name),
    }
}

fn type_color(name: &str) -> Color {
    match name {
        "normal" => Color::Rgb(168, 167, 122),
        "fire" => Color::Rgb(238, 129, 48),
        "water" => Color::Rgb(99, 144, 240),
        "electric" => Color::Rgb(247, 208, 44),
        "grass" => Color::Rgb(122, 199, 76),
        "ice" => Color::Rgb(150, 217, 214),
        "fighting" => Color::Rgb(194, 46, 40),
        "poison" => Color::Rgb(163, 62, 161),
        "ground" => Color::Rgb(226, 191, 101),
        "flying" => Color::Rgb(169, 143, 243),
        "psychic" => Color::Rgb(249, 85, 135),
        "bug" => Color::Rgb(166, 185, 26),
        "rock" => Color::Rgb(182, 161, 54),
        "ghost" => Color::Rgb(115, 87, 151),
        "dragon" => Color::Rgb(111, 53, 252),
        "dark" => Color::Rgb(112, 87, 70),
        "steel" => Color::Rgb(183, 183, 206),
        "fairy" => Color::Rgb(214, 133, 173),
        _ => Color::Gray,
    }
}
