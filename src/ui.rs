use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, EditTarget, InputMode, NoteField, Screen, UploadState};
use crate::models::{ChatRole, CHECKLIST_CATEGORIES};
use crate::store::QueryStatus;

const MILESTONES: [(&str, &str); 4] = [
    ("🇪🇸", "Apply for DNV"),
    ("✈️", "Book flights to Alicante"),
    ("🏠", "Find apartment"),
    ("📋", "Complete checklist"),
];

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::VisionBoard => render_vision_board(frame, body_area),
        Screen::Chat => render_chat(app, frame, body_area),
        Screen::Checklist => render_checklist(app, frame, body_area),
        Screen::Notes => render_notes(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for screen in [
        Screen::VisionBoard,
        Screen::Chat,
        Screen::Checklist,
        Screen::Notes,
    ] {
        let style = if screen == app.screen {
            Style::default()
                .fg(Color::Indexed(63))
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(screen.title(), style));
        spans.push(Span::raw("  "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    if let Some(message) = &app.status_message {
        let line = Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(Color::Red),
        ));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let hints = match (app.screen, app.input_mode) {
        (_, InputMode::Editing) => match app.edit_target {
            EditTarget::ChatInput => " Enter send · Esc leave input",
            EditTarget::UploadPath => " Enter upload · Esc cancel",
            EditTarget::NoteForm => " Tab next field · Enter submit · Esc cancel",
        },
        (Screen::VisionBoard, _) => " c chat · l checklist · n notes · Tab switch · q quit",
        (Screen::Chat, _) => " i ask · u upload PDF · j/k scroll · Tab switch · q quit",
        (Screen::Checklist, _) => {
            " j/k move · Space toggle · d delete · 1-5 filter · r refresh · q quit"
        }
        (Screen::Notes, _) => " j/k move · a add · d delete · r refresh · Tab switch · q quit",
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(Color::DarkGray))),
        area,
    );
}

fn render_vision_board(frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            "  Kiko's Spain Digital Nomad Visa journey — Alicante 🌊",
            Style::default().fg(Color::Gray),
        )),
        Line::default(),
    ];
    for (emoji, label) in MILESTONES {
        lines.push(Line::from(vec![
            Span::raw(format!("    {emoji}  ")),
            Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
        ]));
        lines.push(Line::default());
    }
    lines.push(Line::from(Span::styled(
        "  ✅ [l] Checklist    💬 [c] Ask Mini-Me    📝 [n] Notes",
        Style::default().fg(Color::Indexed(63)),
    )));

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Vision Board ")),
        area,
    );
}

fn thinking_dots(frame_idx: u8) -> &'static str {
    match frame_idx {
        0 => ".",
        1 => "..",
        _ => "...",
    }
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [messages_area, upload_area, input_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(area);

    let mut lines: Vec<Line> = Vec::new();
    if app.chat_messages.is_empty() && !app.chat_loading {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "  Ask anything about your Spain journey.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for message in &app.chat_messages {
        let (label, style) = match message.role {
            ChatRole::User => ("You", Style::default().fg(Color::Indexed(63)).bold()),
            ChatRole::Assistant => ("Mini-Me", Style::default().fg(Color::Green).bold()),
        };
        lines.push(Line::from(Span::styled(label, style)));
        lines.push(Line::from(Span::raw(message.content.clone())));
        if !message.sources.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("Sources: {}", message.sources.join(", ")),
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::default());
    }
    if app.chat_loading {
        lines.push(Line::from(Span::styled(
            format!("Mini-Me is thinking{}", thinking_dots(app.animation_frame)),
            Style::default().fg(Color::Yellow),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((app.chat_scroll, 0))
            .block(Block::default().borders(Borders::ALL).title(" Chat ")),
        messages_area,
    );

    render_upload_line(app, frame, upload_area);

    let editing_chat =
        app.input_mode == InputMode::Editing && app.edit_target == EditTarget::ChatInput;
    let input_style = if editing_chat && !app.chat_loading {
        Style::default().fg(Color::Indexed(63))
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input_text = if app.chat_loading {
        Span::styled("(waiting for answer)", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(app.chat_input.as_str())
    };
    frame.render_widget(
        Paragraph::new(input_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(input_style)
                .title(" Ask about your Spain journey "),
        ),
        input_area,
    );
    if editing_chat && !app.chat_loading {
        // Pin the cursor to the right border once the input outgrows the box.
        let cursor_col = u16::try_from(app.chat_input.chars().count())
            .unwrap_or(u16::MAX)
            .min(input_area.width.saturating_sub(2));
        frame.set_cursor_position((input_area.x + 1 + cursor_col, input_area.y + 1));
    }
}

fn render_upload_line(app: &App, frame: &mut Frame, area: Rect) {
    let editing_upload =
        app.input_mode == InputMode::Editing && app.edit_target == EditTarget::UploadPath;
    let line = if editing_upload {
        Line::from(vec![
            Span::styled(" Upload PDF: ", Style::default().fg(Color::Indexed(63))),
            Span::raw(app.upload_input.as_str()),
            Span::styled("▏", Style::default().fg(Color::Indexed(63))),
        ])
    } else {
        match &app.upload {
            UploadState::Idle => Line::from(Span::styled(
                format!(" {} document(s) uploaded", app.uploaded_documents.len()),
                Style::default().fg(Color::DarkGray),
            )),
            UploadState::Rejected(message) | UploadState::Failed(message) => Line::from(
                Span::styled(format!(" {message}"), Style::default().fg(Color::Red)),
            ),
            UploadState::Uploading => Line::from(Span::styled(
                format!(" Uploading{}", thinking_dots(app.animation_frame)),
                Style::default().fg(Color::Yellow),
            )),
            UploadState::Succeeded(message) => Line::from(Span::styled(
                format!(" {message}"),
                Style::default().fg(Color::Green),
            )),
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_checklist(app: &mut App, frame: &mut Frame, area: Rect) {
    let [filter_area, list_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);

    let mut spans = vec![Span::raw(" ")];
    for (i, category) in CHECKLIST_CATEGORIES.iter().enumerate() {
        let active = app.active_category.as_deref() == Some(*category);
        let style = if active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Indexed(63))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!("[{}] {category}", i + 1), style));
        spans.push(Span::raw("  "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), filter_area);

    let filter = app.active_category.as_deref();
    let items = app.checklist.data(filter);
    let status = app.checklist.status(filter);
    let block = Block::default().borders(Borders::ALL).title(" Checklist ");

    if items.is_empty() {
        let text = match status {
            Some(QueryStatus::Loading) | None => Span::styled(
                format!("Loading{}", thinking_dots(app.animation_frame)),
                Style::default().fg(Color::DarkGray),
            ),
            Some(QueryStatus::Failed) => Span::styled(
                "Couldn't load the checklist. Press r to retry.",
                Style::default().fg(Color::Red),
            ),
            _ => Span::styled("No items.", Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(Paragraph::new(text).block(block), list_area);
        return;
    }

    let list_items: Vec<ListItem> = items
        .iter()
        .map(|item| {
            let done = item.status == crate::models::ChecklistStatus::Done;
            let marker = if done { "[✓]" } else { "[ ]" };
            let title_style = if done {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            let mut spans = vec![
                Span::styled(marker, Style::default().fg(Color::Green)),
                Span::raw(" "),
                Span::styled(item.title.clone(), title_style),
                Span::styled(
                    format!("  {}", item.category),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if let Some(due) = &item.due_date {
                spans.push(Span::styled(
                    format!("  due {due}"),
                    Style::default().fg(Color::Yellow),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = match status {
        Some(QueryStatus::Loading) => " Checklist (refreshing…) ".to_string(),
        Some(QueryStatus::Failed) => " Checklist (refresh failed — r to retry) ".to_string(),
        _ => match app.checklist.last_updated(filter) {
            Some(at) => format!(" Checklist (synced {}s ago) ", at.elapsed().as_secs()),
            None => " Checklist ".to_string(),
        },
    };
    let list = List::new(list_items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, list_area, &mut app.checklist_state);
}

fn render_notes(app: &mut App, frame: &mut Frame, area: Rect) {
    let (form_area, list_area) = if app.note_form_open {
        let [form, list] =
            Layout::vertical([Constraint::Length(5), Constraint::Min(0)]).areas(area);
        (Some(form), list)
    } else {
        (None, area)
    };

    if let Some(form_area) = form_area {
        render_note_form(app, frame, form_area);
    }

    let notes = app.notes.data(None);
    let status = app.notes.status(None);
    let block = Block::default().borders(Borders::ALL).title(" Notes ");

    if notes.is_empty() {
        let text = match status {
            Some(QueryStatus::Loading) | None => Span::styled(
                format!("Loading{}", thinking_dots(app.animation_frame)),
                Style::default().fg(Color::DarkGray),
            ),
            Some(QueryStatus::Failed) => Span::styled(
                "Couldn't load your notes. Press r to retry.",
                Style::default().fg(Color::Red),
            ),
            _ => Span::styled("No notes yet.", Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(Paragraph::new(text).block(block), list_area);
        return;
    }

    let list_items: Vec<ListItem> = notes
        .iter()
        .map(|note| {
            let mut spans = vec![Span::styled(
                note.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            if let Some(category) = &note.category {
                spans.push(Span::styled(
                    format!("  {category}"),
                    Style::default().fg(Color::Indexed(63)),
                ));
            }
            spans.push(Span::styled(
                format!("  {}", note.created_date()),
                Style::default().fg(Color::DarkGray),
            ));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = match status {
        Some(QueryStatus::Loading) => " Notes (refreshing…) ".to_string(),
        Some(QueryStatus::Failed) => " Notes (refresh failed — r to retry) ".to_string(),
        _ => match app.notes.last_updated(None) {
            Some(at) => format!(" Notes (synced {}s ago) ", at.elapsed().as_secs()),
            None => " Notes ".to_string(),
        },
    };
    let list = List::new(list_items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, list_area, &mut app.notes_state);
}

fn render_note_form(app: &App, frame: &mut Frame, area: Rect) {
    let field_line = |label: &str, value: &str, field: NoteField| {
        let active = app.note_field == field;
        let label_style = if active {
            Style::default().fg(Color::Indexed(63)).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let mut spans = vec![
            Span::styled(format!("{label:>9}: "), label_style),
            Span::raw(value.to_string()),
        ];
        if active {
            spans.push(Span::styled("▏", Style::default().fg(Color::Indexed(63))));
        }
        Line::from(spans)
    };

    let lines = vec![
        field_line("Title", &app.note_title, NoteField::Title),
        field_line("Category", &app.note_category, NoteField::Category),
        field_line("Content", &app.note_content, NoteField::Content),
    ];
    let title = if app.note_saving {
        " New note (saving…) "
    } else {
        " New note "
    };
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}
