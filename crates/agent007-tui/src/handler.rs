use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, FocusPane, InputMode, Screen};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick(),
    }
    app.poll_query().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match (app.screen, app.input_mode) {
        (Screen::Landing, _) => handle_landing(app, key),
        (Screen::Chat, InputMode::Normal) => handle_chat_normal(app, key),
        (Screen::Chat, InputMode::Editing) => handle_chat_editing(app, key),
    }
}

/// Number keys 1-9 pick a sample query
fn sample_index(c: char) -> Option<usize> {
    c.to_digit(10)
        .filter(|d| *d >= 1)
        .map(|d| d as usize - 1)
}

fn handle_landing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter | KeyCode::Char('i') => app.open_chat(),
        KeyCode::Char(c) => {
            if let Some(i) = sample_index(c) {
                app.load_sample_query(i);
            }
        }
        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc => app.screen = Screen::Landing,

        // Focus
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::Char('i') => {
            app.focus = FocusPane::Input;
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Enter => match app.focus {
            FocusPane::Input | FocusPane::History => {
                app.focus = FocusPane::Input;
                app.input_mode = InputMode::Editing;
            }
            FocusPane::ToolChain => {}
        },

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::ToolChain => app.scroll_chain_down(1),
            _ => app.select_next_message(),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::ToolChain => app.scroll_chain_up(1),
            _ => app.select_previous_message(),
        },
        KeyCode::PageDown => match app.focus {
            FocusPane::ToolChain => app.scroll_chain_down(10),
            _ => app.scroll_history_down(10),
        },
        KeyCode::PageUp => match app.focus {
            FocusPane::ToolChain => app.scroll_chain_up(10),
            _ => app.scroll_history_up(10),
        },
        KeyCode::Char('g') => match app.focus {
            FocusPane::ToolChain => app.chain_scroll = 0,
            _ => app.history_scroll = 0,
        },
        KeyCode::Char('G') => {
            if app.focus != FocusPane::ToolChain {
                app.scroll_history_to_bottom();
            }
        }

        // Tool chain actions
        KeyCode::Char('c') => app.copy_tool_chain(),
        KeyCode::Char('d') => app.download_tool_chain(),
        KeyCode::Char('C') => app.clear_chat(),

        KeyCode::Char(c) => {
            if let Some(i) = sample_index(c) {
                app.load_sample_query(i);
            }
        }
        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            if app.session.can_submit() {
                app.submit_query();
                app.input_mode = InputMode::Normal;
                app.focus = FocusPane::History;
            }
        }
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete_char(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.screen != Screen::Chat {
        return;
    }

    let x = mouse.column;
    let y = mouse.row;

    // Scroll whichever pane is under the pointer
    let in_history = app.history_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_chain = app.chain_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_history {
                app.scroll_history_down(3);
            } else if in_chain {
                app.scroll_chain_down(3);
            }
        }
        MouseEventKind::ScrollUp => {
            if in_history {
                app.scroll_history_up(3);
            } else if in_chain {
                app.scroll_chain_up(3);
            }
        }
        _ => {}
    }
}
