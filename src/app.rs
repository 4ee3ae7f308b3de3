//! TUI application state
//!
//! Keyboard handling and the URL input box. Playback state itself lives in
//! the session task; the app only keeps the latest `SessionView` snapshot
//! for rendering and translates key presses into session actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::session::SessionView;

// =============================================================================
// Input Mode
// =============================================================================

/// Current input mode for keyboard handling
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Text input mode (URL box focused)
    Editing,
}

// =============================================================================
// URL Input State
// =============================================================================

/// URL input box state
///
/// The cursor is a byte offset into `text` and always sits on a char
/// boundary; every move steps by whole chars, so pasted URLs with
/// multi-byte characters edit cleanly.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// The typed URL text
    pub text: String,
    /// Cursor byte offset in text, always on a char boundary
    pub cursor: usize,
}

impl InputState {
    /// Byte length of the char just before the cursor, if any
    fn prev_char_len(&self) -> Option<usize> {
        self.text[..self.cursor].chars().next_back().map(char::len_utf8)
    }

    /// Byte length of the char at the cursor, if any
    fn next_char_len(&self) -> Option<usize> {
        self.text[self.cursor..].chars().next().map(char::len_utf8)
    }

    /// Insert character at cursor
    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete character before cursor
    pub fn backspace(&mut self) {
        if let Some(len) = self.prev_char_len() {
            self.cursor -= len;
            self.text.remove(self.cursor);
        }
    }

    /// Delete character at cursor
    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
        }
    }

    /// Move cursor left
    pub fn cursor_left(&mut self) {
        if let Some(len) = self.prev_char_len() {
            self.cursor -= len;
        }
    }

    /// Move cursor right
    pub fn cursor_right(&mut self) {
        if let Some(len) = self.next_char_len() {
            self.cursor += len;
        }
    }

    /// Move cursor to start
    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to end
    pub fn cursor_end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Clear the input
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

// =============================================================================
// UI Actions
// =============================================================================

/// What a key press asks the session to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// Submit the typed URL
    Submit(String),
    /// Stop playback
    Stop,
}

// =============================================================================
// Main Application State
// =============================================================================

/// Main application state
#[derive(Debug, Default)]
pub struct App {
    /// Whether the app is running
    pub running: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// URL input box
    pub input: InputState,
    /// Latest session snapshot
    pub view: SessionView,
    /// Global error message
    pub error: Option<String>,
    /// Poll budget, mirrored from session options for the waiting display
    pub max_poll_attempts: u32,
}

impl App {
    /// Create a new App instance
    pub fn new() -> Self {
        Self {
            running: true,
            ..Default::default()
        }
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Set error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.error = Some(msg.into());
    }

    /// Focus the URL input
    pub fn focus_input(&mut self) {
        self.input_mode = InputMode::Editing;
    }

    // -------------------------------------------------------------------------
    // Keyboard Event Handling
    // -------------------------------------------------------------------------

    /// Handle keyboard event; returns the session action it translates to,
    /// if any.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<UiAction> {
        // Clear error on any keypress
        self.error = None;

        // Global quit shortcut
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return None;
        }

        if self.input_mode == InputMode::Editing {
            self.handle_editing_key(key)
        } else {
            self.handle_normal_key(key)
        }
    }

    /// Handle keys in editing (text input) mode
    fn handle_editing_key(&mut self, key: KeyEvent) -> Option<UiAction> {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                None
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                // Nothing typed, nothing to resolve
                if self.input.text.is_empty() {
                    None
                } else {
                    Some(UiAction::Submit(self.input.text.clone()))
                }
            }
            KeyCode::Char(c) => {
                self.input.insert(c);
                None
            }
            KeyCode::Backspace => {
                self.input.backspace();
                None
            }
            KeyCode::Delete => {
                self.input.delete();
                None
            }
            KeyCode::Left => {
                self.input.cursor_left();
                None
            }
            KeyCode::Right => {
                self.input.cursor_right();
                None
            }
            KeyCode::Home => {
                self.input.cursor_home();
                None
            }
            KeyCode::End => {
                self.input.cursor_end();
                None
            }
            _ => None,
        }
    }

    /// Handle keys in normal navigation mode
    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<UiAction> {
        match key.code {
            KeyCode::Char('q') => {
                self.quit();
                None
            }
            KeyCode::Char('/') | KeyCode::Char('i') => {
                self.focus_input();
                None
            }
            KeyCode::Enter => {
                if self.input.text.is_empty() {
                    None
                } else {
                    Some(UiAction::Submit(self.input.text.clone()))
                }
            }
            KeyCode::Char('s') | KeyCode::Esc => Some(UiAction::Stop),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    #[test]
    fn test_typing_a_url() {
        let mut app = App::new();
        app.handle_key(key(KeyCode::Char('/')));
        assert_eq!(app.input_mode, InputMode::Editing);

        for c in "http://example.com/video".chars() {
            assert!(app.handle_key(key(KeyCode::Char(c))).is_none());
        }
        assert_eq!(app.input.text, "http://example.com/video");
        assert_eq!(app.input.cursor, 24);
    }

    #[test]
    fn test_enter_submits_typed_url() {
        let mut app = App::new();
        app.focus_input();
        for c in "http://x/v".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        let action = app.handle_key(key(KeyCode::Enter));
        assert_eq!(action, Some(UiAction::Submit("http://x/v".into())));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_enter_on_empty_input_does_nothing() {
        let mut app = App::new();
        app.focus_input();
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
    }

    #[test]
    fn test_stop_key() {
        let mut app = App::new();
        assert_eq!(app.handle_key(key(KeyCode::Char('s'))), Some(UiAction::Stop));
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Some(UiAction::Stop));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new();
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.running);

        let mut app = App::new();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.running);
    }

    #[test]
    fn test_cursor_editing() {
        let mut input = InputState::default();
        for c in "abc".chars() {
            input.insert(c);
        }
        input.cursor_left();
        input.backspace();
        assert_eq!(input.text, "ac");
        input.cursor_end();
        input.insert('d');
        assert_eq!(input.text, "acd");
        input.cursor_home();
        input.delete();
        assert_eq!(input.text, "cd");
        input.clear();
        assert_eq!(input.text, "");
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn test_multibyte_input_editing() {
        // 'é' is two bytes; typing after it must insert on the boundary
        let mut input = InputState::default();
        input.insert('é');
        input.insert('a');
        assert_eq!(input.text, "éa");

        input.cursor_left();
        input.cursor_left();
        assert_eq!(input.cursor, 0);
        input.cursor_right();
        assert_eq!(input.cursor, 'é'.len_utf8());

        input.backspace();
        assert_eq!(input.text, "a");
        assert_eq!(input.cursor, 0);
        input.delete();
        assert_eq!(input.text, "");
    }

    #[test]
    fn test_multibyte_url_round_trip() {
        let mut app = App::new();
        app.focus_input();
        for c in "http://x/v?t=日本語".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        let action = app.handle_key(key(KeyCode::Enter));
        assert_eq!(action, Some(UiAction::Submit("http://x/v?t=日本語".into())));
    }

    #[test]
    fn test_esc_leaves_editing_mode() {
        let mut app = App::new();
        app.focus_input();
        assert!(app.handle_key(key(KeyCode::Esc)).is_none());
        assert_eq!(app.input_mode, InputMode::Normal);
    }
}
