//! The Command Engine - Reversible Edits with Undo/Redo
//!
//! Each [`Command`] captures enough state to apply one edit to a
//! [`TextBuffer`] and to exactly reverse it. [`CommandHistory`] owns the
//! buffer and a cursor over the executed commands:
//!
//! ```text
//!   history:  [c0] [c1] [c2] [c3]
//!                        ^ cursor (c3 is redoable)
//! ```
//!
//! Executing a new command while redoable commands exist discards them;
//! history never branches.

use std::cell::Cell;
use std::fmt;
use tracing::debug;

// =============================================================================
// TEXT BUFFER
// =============================================================================

/// An ordered character sequence with positional insert and delete.
///
/// Positions and lengths count `char`s. Out-of-range positions clamp to the
/// end of the buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    content: String,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer holding `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            content: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content = text.into();
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Inserts `text` before the character at `position` and returns the
    /// character index it landed at.
    pub fn insert_text(&mut self, text: &str, position: usize) -> usize {
        let landed = position.min(self.len());
        let at = self.byte_offset(landed);
        self.content.insert_str(at, text);
        landed
    }

    /// Removes up to `length` characters starting at `position`.
    pub fn delete_text(&mut self, position: usize, length: usize) {
        let start = self.byte_offset(position);
        let end = self.byte_offset(position.saturating_add(length));
        self.content.replace_range(start..end, "");
    }

    /// Returns up to `length` characters starting at `position`.
    pub fn substring(&self, position: usize, length: usize) -> String {
        self.content.chars().skip(position).take(length).collect()
    }

    fn byte_offset(&self, position: usize) -> usize {
        self.content
            .char_indices()
            .nth(position)
            .map(|(offset, _)| offset)
            .unwrap_or(self.content.len())
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// A single reversible edit.
///
/// `undo` after `execute` must restore the buffer to its exact prior content.
pub trait Command: fmt::Debug {
    fn execute(&self, buffer: &mut TextBuffer);

    fn undo(&self, buffer: &mut TextBuffer);

    /// Human-readable summary shown in the history list.
    fn description(&self) -> &str;
}

/// Inserts text at a position. Undo deletes the span where the text
/// actually landed, which is the buffer end for out-of-range positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertText {
    text: String,
    position: usize,
    landed: Cell<usize>,
    description: String,
}

impl InsertText {
    pub fn new(text: impl Into<String>, position: usize) -> Self {
        let text = text.into();
        let description = format!("Add \"{}\" at position {}", text, position);
        Self {
            text,
            position,
            landed: Cell::new(position),
            description,
        }
    }
}

impl Command for InsertText {
    fn execute(&self, buffer: &mut TextBuffer) {
        self.landed.set(buffer.insert_text(&self.text, self.position));
    }

    fn undo(&self, buffer: &mut TextBuffer) {
        buffer.delete_text(self.landed.get(), self.text.chars().count());
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Deletes a range. The removed text is captured when the command is built,
/// so it must be constructed against the buffer it will run on, before it
/// executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteText {
    position: usize,
    length: usize,
    removed: String,
    description: String,
}

impl DeleteText {
    pub fn new(buffer: &TextBuffer, position: usize, length: usize) -> Self {
        Self {
            position,
            length,
            removed: buffer.substring(position, length),
            description: format!("Delete {} characters at position {}", length, position),
        }
    }

    /// The text this command removes.
    pub fn removed(&self) -> &str {
        &self.removed
    }
}

impl Command for DeleteText {
    fn execute(&self, buffer: &mut TextBuffer) {
        buffer.delete_text(self.position, self.length);
    }

    fn undo(&self, buffer: &mut TextBuffer) {
        buffer.insert_text(&self.removed, self.position);
    }

    fn description(&self) -> &str {
        &self.description
    }
}

// =============================================================================
// COMMAND HISTORY
// =============================================================================

/// Executed commands plus a cursor, applied to an owned buffer.
#[derive(Debug, Default)]
pub struct CommandHistory {
    buffer: TextBuffer,
    history: Vec<Box<dyn Command>>,
    /// Number of active commands; `history[active..]` is redoable
    active: usize,
}

impl CommandHistory {
    /// Creates an empty history over an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty history over an existing buffer.
    pub fn with_buffer(buffer: TextBuffer) -> Self {
        Self {
            buffer,
            history: Vec::new(),
            active: 0,
        }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Applies `command`, discarding any redoable tail first.
    pub fn execute(&mut self, command: Box<dyn Command>) {
        if self.history.len() > self.active {
            debug!(
                "Discarding {} redoable command(s)",
                self.history.len() - self.active
            );
            self.history.truncate(self.active);
        }

        command.execute(&mut self.buffer);
        self.history.push(command);
        self.active += 1;
    }

    /// Reverses the most recent active command. Returns false at the start
    /// of history.
    pub fn undo(&mut self) -> bool {
        if self.active == 0 {
            return false;
        }
        self.active -= 1;
        self.history[self.active].undo(&mut self.buffer);
        true
    }

    /// Re-applies the next undone command. Returns false when nothing is
    /// redoable.
    pub fn redo(&mut self) -> bool {
        if self.active >= self.history.len() {
            return false;
        }
        self.history[self.active].execute(&mut self.buffer);
        self.active += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.active > 0
    }

    pub fn can_redo(&self) -> bool {
        self.active < self.history.len()
    }

    /// The active prefix of the history, oldest first.
    pub fn history(&self) -> &[Box<dyn Command>] {
        &self.history[..self.active]
    }

    /// Index of the most recent active command, if any.
    pub fn current_index(&self) -> Option<usize> {
        self.active.checked_sub(1)
    }

    /// Total stored commands, including redoable ones.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Forgets every command. The buffer keeps its current content.
    pub fn clear(&mut self) {
        self.history.clear();
        self.active = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_insert_and_delete() {
        let mut buffer = TextBuffer::new();
        buffer.insert_text("Hello", 0);
        buffer.insert_text(" World", 5);
        assert_eq!(buffer.text(), "Hello World");

        buffer.delete_text(5, 6);
        assert_eq!(buffer.text(), "Hello");
    }

    #[test]
    fn test_buffer_clamps_positions() {
        let mut buffer = TextBuffer::with_text("abc");
        buffer.insert_text("!", 99);
        assert_eq!(buffer.text(), "abc!");

        buffer.delete_text(2, 99);
        assert_eq!(buffer.text(), "ab");
    }

    #[test]
    fn test_buffer_counts_characters() {
        let mut buffer = TextBuffer::with_text("héllo");
        assert_eq!(buffer.len(), 5);
        buffer.delete_text(1, 1);
        assert_eq!(buffer.text(), "hllo");
    }

    #[test]
    fn test_undo_all_restores_empty() {
        let mut history = CommandHistory::new();
        history.execute(Box::new(InsertText::new("Hello", 0)));
        history.execute(Box::new(InsertText::new(", World", 5)));
        let delete = DeleteText::new(history.buffer(), 0, 7);
        history.execute(Box::new(delete));
        assert_eq!(history.buffer().text(), "World");

        while history.undo() {}
        assert_eq!(history.buffer().text(), "");
        assert!(!history.can_undo());
        assert_eq!(history.current_index(), None);
    }

    #[test]
    fn test_undo_reverses_insert_past_the_end() {
        let mut history = CommandHistory::with_buffer(TextBuffer::with_text("abc"));
        history.execute(Box::new(InsertText::new("xyz", 10)));
        assert_eq!(history.buffer().text(), "abcxyz");

        assert!(history.undo());
        assert_eq!(history.buffer().text(), "abc");

        assert!(history.redo());
        assert_eq!(history.buffer().text(), "abcxyz");
        assert!(history.undo());
        assert_eq!(history.buffer().text(), "abc");
    }

    #[test]
    fn test_undo_all_after_out_of_range_inserts() {
        let mut history = CommandHistory::new();
        history.execute(Box::new(InsertText::new("Hi", 5)));
        history.execute(Box::new(InsertText::new("!", 40)));
        assert_eq!(history.buffer().text(), "Hi!");

        while history.undo() {}
        assert_eq!(history.buffer().text(), "");
    }

    #[test]
    fn test_delete_captures_text_at_construction() {
        let mut history = CommandHistory::with_buffer(TextBuffer::with_text("abcdef"));
        let delete = DeleteText::new(history.buffer(), 1, 3);
        assert_eq!(delete.removed(), "bcd");

        history.execute(Box::new(delete));
        assert_eq!(history.buffer().text(), "aef");

        assert!(history.undo());
        assert_eq!(history.buffer().text(), "abcdef");
    }

    #[test]
    fn test_undo_redo_at_boundaries() {
        let mut history = CommandHistory::new();
        assert!(!history.undo());
        assert!(!history.redo());

        history.execute(Box::new(InsertText::new("x", 0)));
        assert!(!history.redo());
        assert!(history.undo());
        assert!(!history.undo());
        assert_eq!(history.buffer().text(), "");

        assert!(history.redo());
        assert_eq!(history.buffer().text(), "x");
    }

    #[test]
    fn test_new_command_discards_redo_tail() {
        let mut history = CommandHistory::new();
        history.execute(Box::new(InsertText::new("a", 0)));
        history.execute(Box::new(InsertText::new("b", 1)));
        history.execute(Box::new(InsertText::new("c", 2)));

        assert!(history.undo());
        assert!(history.undo());
        assert!(history.can_redo());
        assert_eq!(history.buffer().text(), "a");

        history.execute(Box::new(InsertText::new("z", 1)));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(history.buffer().text(), "az");
    }

    #[test]
    fn test_history_lists_active_prefix() {
        let mut history = CommandHistory::new();
        history.execute(Box::new(InsertText::new("Hi", 0)));
        history.execute(Box::new(InsertText::new("!", 2)));
        history.undo();

        let descriptions: Vec<&str> = history.history().iter().map(|c| c.description()).collect();
        assert_eq!(descriptions, vec!["Add \"Hi\" at position 0"]);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current_index(), Some(0));
    }

    #[test]
    fn test_clear_keeps_buffer() {
        let mut history = CommandHistory::new();
        history.execute(Box::new(InsertText::new("keep", 0)));
        history.clear();
        assert!(history.is_empty());
        assert!(!history.can_undo());
        assert_eq!(history.buffer().text(), "keep");
    }
}
