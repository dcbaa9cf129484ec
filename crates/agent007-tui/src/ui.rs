use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use agent007_core::{export, ChatRole, ToolStep, SAMPLE_QUERIES};
use chrono::Local;
use crate::app::{App, FocusPane, InputMode, Screen, LOADING_TEXT};

const FEATURES: &[(&str, &str)] = &[
    (
        "Intelligent Tool Selection",
        "Automatically selects and sequences the right tools for your domain-specific queries.",
    ),
    (
        "Conversational Interface",
        "Natural language interaction with context-aware responses and tool chain visualization.",
    ),
    (
        "JSON Tool Chains",
        "View, copy, and download structured tool chains for integration and analysis.",
    ),
    (
        "Real-time Processing",
        "Fast, efficient processing with live updates and error handling.",
    ),
];

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Landing => render_landing_screen(frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let tab = |label: &'static str, active: bool| {
        if active {
            Span::styled(format!(" {} ", label), Style::default().fg(Color::Black).bg(Color::Yellow))
        } else {
            Span::styled(format!(" {} ", label), Style::default().fg(Color::Gray))
        }
    };

    let title = Line::from(vec![
        Span::styled(" AI Agent 007 ", Style::default().fg(Color::Yellow).bold()),
        tab("Home", app.screen == Screen::Landing),
        tab("Chat", app.screen == Screen::Chat),
        Span::raw(" "),
        Span::styled(app.client.endpoint().to_string(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match (app.screen, app.input_mode) {
        (Screen::Landing, _) => " HOME ",
        (Screen::Chat, InputMode::Normal) => " CHAT ",
        (Screen::Chat, InputMode::Editing) => " INPUT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let mut hints: Vec<Span> = Vec::new();
    match (app.screen, app.input_mode) {
        (Screen::Landing, _) => {
            hints.extend(hint("Enter", "start chatting"));
            hints.extend(hint("1-6", "sample query"));
            hints.extend(hint("q", "quit"));
        }
        (Screen::Chat, InputMode::Normal) => {
            hints.extend(hint("Tab", "focus"));
            match app.focus {
                FocusPane::ToolChain => hints.extend(hint("j/k", "scroll")),
                _ => hints.extend(hint("j/k", "select")),
            }
            if app.session.selected_tool_chain().is_some() {
                hints.extend(hint("c", "copy"));
                hints.extend(hint("d", "download"));
            }
            hints.extend(hint("i", "type"));
            hints.extend(hint("C", "clear"));
            hints.extend(hint("Esc", "home"));
            hints.extend(hint("q", "quit"));
        }
        (Screen::Chat, InputMode::Editing) => {
            hints.extend(hint("Enter", "send"));
            hints.extend(hint("Esc", "stop typing"));
        }
    }

    if let Some(status) = &app.status {
        let color = if status.is_error { Color::Red } else { Color::Green };
        hints.push(Span::styled("  ", label_style));
        hints.push(Span::styled(status.text.clone(), Style::default().bg(Color::Black).fg(color).bold()));
    }

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_landing_screen(frame: &mut Frame, area: Rect) {
    let heading = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line> = vec![
        Line::default(),
        Line::from(Span::styled("AI Agent 007", heading)).centered(),
        Line::from(Span::styled(
            "Turn natural-language requests into ready-to-run tool chains.",
            Style::default().fg(Color::Gray),
        ))
        .centered(),
        Line::default(),
    ];

    for (name, description) in FEATURES {
        lines.push(Line::from(Span::styled(*name, heading)));
        lines.push(Line::from(format!("  {}", description)));
        lines.push(Line::default());
    }

    lines.push(Line::from(Span::styled("Try a sample query", heading)));
    for (i, query) in SAMPLE_QUERIES.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", i + 1), Style::default().fg(Color::Cyan).bold()),
            Span::raw(*query),
        ]));
    }
    lines.push(Line::default());
    lines.push(
        Line::from(Span::styled(
            "Press Enter to start chatting",
            Style::default().fg(Color::Black).bg(Color::Yellow).bold(),
        ))
        .centered(),
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let landing = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(landing, area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    // Chat on the left, tool chain on the right
    let [chat_column, chain_area] = Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ])
    .areas(area);

    let [history_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(chat_column);

    // Store areas for mouse hit-testing
    app.history_area = Some(history_area);
    app.chain_area = Some(chain_area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.history_height = history_area.height.saturating_sub(2);
    app.history_width = history_area.width.saturating_sub(2);

    render_history(app, frame, history_area);
    render_input(app, frame, input_area);
    render_tool_chain(app, frame, chain_area);
}

fn render_history(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.focus == FocusPane::History { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Chat History ({}) ", app.session.messages().len()));

    let text = if app.session.messages().is_empty() && !app.session.is_loading() {
        let mut lines = vec![
            Line::from(Span::styled(
                "Welcome to AI Agent 007",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Start a conversation by typing a query below. I'll use the best tools to answer your questions.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::default(),
        ];
        for (i, query) in SAMPLE_QUERIES.iter().enumerate() {
            lines.push(Line::from(Span::styled(
                format!("{}. {}", i + 1, query),
                Style::default().fg(Color::DarkGray),
            )));
        }
        Text::from(lines)
    } else {
        let selected = app.session.selected_id();
        let mut lines: Vec<Line> = Vec::new();

        for msg in app.session.messages() {
            let (label, color) = match msg.role {
                ChatRole::User => ("You", Color::Cyan),
                ChatRole::Agent => ("Agent", Color::Yellow),
            };
            let is_selected = selected == Some(msg.id);
            let mut label_style = Style::default().fg(color).add_modifier(Modifier::BOLD);
            if is_selected {
                label_style = label_style.add_modifier(Modifier::REVERSED);
            }
            let time = msg.timestamp.with_timezone(&Local).format("%H:%M:%S").to_string();

            lines.push(Line::from(vec![
                Span::raw(if is_selected { "> " } else { "  " }),
                Span::styled(format!("{}:", label), label_style),
                Span::styled(format!(" {}", time), Style::default().fg(Color::DarkGray)),
            ]));
            let content_style = if msg.content.starts_with("Error: ") {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            for line in msg.content.lines() {
                lines.push(Line::from(Span::styled(line.to_string(), content_style)));
            }
            if msg.tool_chain.is_some() {
                lines.push(Line::from(Span::styled(
                    format!("[{} steps]", msg.step_count()),
                    Style::default().fg(Color::Magenta),
                )));
            }
            lines.push(Line::default());
        }

        if app.session.is_loading() {
            lines.push(Line::from(Span::styled(
                "  Agent:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("{}{}", LOADING_TEXT, dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let history = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.history_scroll, 0));
    frame.render_widget(history, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing || app.focus == FocusPane::Input {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let title = if app.session.is_loading() {
        " Ask (waiting for agent...) "
    } else {
        " Ask (i to type, Enter to send) "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.draft_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let draft = app.session.draft();
    let paragraph = if draft.is_empty() && !editing {
        Paragraph::new(Span::styled(
            "Ask me anything... (e.g., 'Summarize my P0 issues')",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let visible_text: String = draft.chars().skip(scroll_offset).take(inner_width).collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(paragraph.block(block), area);

    // Show cursor when editing
    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

/// One line per step: `1. tool_name  arg_a, arg_b`
fn step_outline(steps: &[ToolStep]) -> Vec<Line<'static>> {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let args: Vec<&str> = step.arguments().map(|(name, _)| name).collect();
            // Steps without a tool name are shown as raw JSON
            let name = match step.tool_name() {
                "" => step.value().to_string(),
                name => name.to_string(),
            };
            Line::from(vec![
                Span::styled(format!("{}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(name, Style::default().fg(Color::Yellow).bold()),
                Span::styled(format!("  {}", args.join(", ")), Style::default().fg(Color::Gray)),
            ])
        })
        .collect()
}

fn render_tool_chain(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.focus == FocusPane::ToolChain { Color::Cyan } else { Color::DarkGray };
    let chain = app.session.selected_tool_chain();

    let title = match chain {
        Some(steps) => format!(" Tool Chain ({} steps) ", steps.len()),
        None => " Tool Chain ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let Some(steps) = chain else {
        let placeholder = if app.session.selected_id().is_some() {
            "This message has no tool chain."
        } else {
            "Ask any query to display the JSON response here."
        };
        let paragraph = Paragraph::new(Span::styled(placeholder, Style::default().fg(Color::DarkGray)))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let mut lines = step_outline(steps);
    if !lines.is_empty() {
        lines.push(Line::default());
    }
    match export::to_pretty_json(steps) {
        Ok(json) => {
            for line in json.lines() {
                lines.push(Line::from(Span::styled(line.to_string(), Style::default().fg(Color::Green))));
            }
        }
        Err(e) => lines.push(Line::from(Span::styled(e.to_string(), Style::default().fg(Color::Red)))),
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.chain_scroll, 0));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outline_lists_tool_and_argument_names() {
        let steps: Vec<ToolStep> = serde_json::from_value(json!([
            { "tool_name": "works_list", "arguments": [
                { "argument_name": "ticket.severity", "argument_value": ["high"] },
                { "argument_name": "type", "argument_value": ["ticket"] }
            ]},
            { "tool_name": "who_am_i" }
        ]))
        .unwrap();

        let lines = step_outline(&steps);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].to_string(), "1. works_list  ticket.severity, type");
        assert_eq!(lines[1].to_string(), "2. who_am_i  ");
    }

    #[test]
    fn outline_falls_back_to_raw_json_for_unnamed_steps() {
        let steps: Vec<ToolStep> = serde_json::from_value(json!([7, { "tool": "b" }])).unwrap();

        let lines = step_outline(&steps);

        assert_eq!(lines[0].to_string(), "1. 7  ");
        assert_eq!(lines[1].to_string(), r#"2. {"tool":"b"}  "#);
    }
}
