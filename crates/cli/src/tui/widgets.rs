//! TUI widget rendering: filters, pending banner, document list, tag
//! sidebar, status bar and the tag editor popup.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::Frame;
use storage::Document;

use super::{BrowseApp, Mode, TagEditor};

const KEY_HINTS: &str =
    " enter: tags  space: preview  t: tag filter  f: find  u: untagged  i: import  q: quit";

/// Render a document as `filename   @tag @tag`, or `<untagged>`.
pub fn document_to_line(doc: &Document) -> Line<'static> {
    let mut spans = vec![Span::raw(doc.filename.clone()), Span::raw("   ")];
    if doc.tags.is_empty() {
        spans.push(Span::styled("<untagged>", Style::default().fg(Color::DarkGray)));
    } else {
        for tag in &doc.tags {
            spans.push(Span::styled(format!("@{tag} "), Style::default().fg(Color::Cyan)));
        }
    }
    Line::from(spans)
}

pub fn render(frame: &mut Frame, app: &BrowseApp) {
    let banner_height = if app.pending().is_empty() { 0 } else { 3 };
    let [header_area, filter_area, banner_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(banner_height),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " scanshelf ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(KEY_HINTS),
    ]));
    frame.render_widget(header, header_area);

    render_filters(frame, app, filter_area);

    if banner_height > 0 {
        let banner = Paragraph::new(Line::from(vec![
            Span::styled("• ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("Import {} new documents (press i)", app.pending().len())),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(banner, banner_area);
    }

    let [list_area, tags_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(28)]).areas(body_area);

    let items: Vec<ListItem> = app
        .documents()
        .iter()
        .map(|d| ListItem::new(document_to_line(d)))
        .collect();
    let title = format!(" Documents ({}) ", app.documents().len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("• ");
    let mut state = ListState::default().with_selected(if app.documents().is_empty() {
        None
    } else {
        Some(app.selected())
    });
    frame.render_stateful_widget(list, list_area, &mut state);

    let tag_lines: Vec<Line> = app
        .tag_summaries()
        .iter()
        .map(|t| {
            let style = if app.tag_filter().iter().any(|f| f == &t.name) {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(t.name.clone(), style),
                Span::styled(
                    format!(" ({})", t.documents),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();
    let block = Block::default().borders(Borders::ALL).title(" Tags ");
    let tags = Paragraph::new(tag_lines).block(block);
    frame.render_widget(tags, tags_area);

    render_status(frame, app, status_area);

    if let Mode::EditTags(editor) = app.mode() {
        render_tag_editor(frame, editor);
    }
}

fn render_filters(frame: &mut Frame, app: &BrowseApp, area: Rect) {
    let editing = Style::default().fg(Color::White).bg(Color::Blue);
    let (tag_text, tag_style) = match app.mode() {
        Mode::TagFilter => (format!("{}_", app.input()), editing),
        _ => (app.tag_filter().join(" "), Style::default()),
    };
    let (find_text, find_style) = match app.mode() {
        Mode::TextFilter => (format!("{}_", app.input()), editing),
        _ => (
            app.text_filter().unwrap_or_default().to_string(),
            Style::default(),
        ),
    };
    let mut spans = vec![
        Span::styled("Search Tags: ", Style::default().fg(Color::DarkGray)),
        Span::styled(tag_text, tag_style),
        Span::raw("   "),
        Span::styled("Search Documents: ", Style::default().fg(Color::DarkGray)),
        Span::styled(find_text, find_style),
    ];
    if app.untagged_only() {
        spans.push(Span::styled("   [untagged only]", Style::default().fg(Color::Yellow)));
    }
    let block = Block::default().borders(Borders::ALL);
    let filters = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(filters, area);
}

fn render_status(frame: &mut Frame, app: &BrowseApp, area: Rect) {
    let mut spans = vec![
        Span::styled(
            format!(" docs: {} ", app.documents().len()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("| "),
        Span::styled(
            format!("tags: {} ", app.tag_summaries().len()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("| "),
        Span::styled(
            format!("new: {} ", app.pending().len()),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(status) = app.status() {
        let style = if status.is_error {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green)
        };
        spans.push(Span::raw("| "));
        spans.push(Span::styled(status.text.clone(), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tag_editor(frame: &mut Frame, editor: &TagEditor) {
    let height = (editor.tags.len() as u16).clamp(1, 8) + 4;
    let area = popup_area(frame.area(), 40, height);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Tags for {} ", editor.filename))
        .style(Style::default().bg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [tags_area, input_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);

    let items: Vec<ListItem> = if editor.tags.is_empty() {
        vec![ListItem::new(Span::styled("<untagged>", Style::default().fg(Color::DarkGray)))]
    } else {
        editor
            .tags
            .iter()
            .map(|t| ListItem::new(format!("@{t}")))
            .collect()
    };
    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("• ");
    let mut state = ListState::default().with_selected(if editor.tags.is_empty() {
        None
    } else {
        Some(editor.selected)
    });
    frame.render_stateful_widget(list, tags_area, &mut state);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("New: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("{}_", editor.input)),
    ]));
    frame.render_widget(input, input_area);
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [vertical] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(vertical);
    popup
}
