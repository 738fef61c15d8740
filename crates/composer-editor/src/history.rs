//! Linear undo/redo over document snapshots.
//!
//! The history is a (past, present, future) triple of whole-document
//! snapshots. Because the reducer is pure and snapshots are values, undo is
//! just swapping snapshots — no inverse commands to compute. Both stacks are
//! bounded: the oldest past entry is evicted beyond the cap, so undo can
//! never walk back past the oldest retained snapshot.

use composer_core::command::Command;
use composer_core::model::Document;
use composer_core::state::apply_command;
use std::collections::VecDeque;

/// Default bound on each history stack.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Bounded past/present/future snapshot stacks.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Document>,
    present: Document,
    future: VecDeque<Document>,
    limit: usize,
}

impl History {
    pub fn new(initial: Document) -> Self {
        Self::with_limit(initial, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(initial: Document, limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial,
            future: VecDeque::new(),
            limit,
        }
    }

    /// The current snapshot.
    pub fn present(&self) -> &Document {
        &self.present
    }

    /// Apply a command to the present snapshot.
    ///
    /// On a no-op command the history is left untouched and `false` is
    /// returned. Otherwise the old present is pushed onto the past (evicting
    /// the oldest entry past the cap), the redo stack is cleared — any new
    /// edit invalidates it — and `true` is returned.
    pub fn dispatch(&mut self, command: &Command) -> bool {
        let Some(next) = apply_command(&self.present, command) else {
            return false;
        };

        let previous = std::mem::replace(&mut self.present, next);
        self.past.push_back(previous);
        if self.past.len() > self.limit {
            self.past.pop_front();
        }
        self.future.clear();
        true
    }

    /// Step back one snapshot. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        if self.future.len() > self.limit {
            self.future.pop_back();
        }
        true
    }

    /// Step forward one snapshot. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        if self.past.len() > self.limit {
            self.past.pop_front();
        }
        true
    }

    /// Replace the present wholesale and clear both stacks. Used for
    /// document load — deliberately not an undoable action.
    pub fn reset(&mut self, doc: Document) {
        self.past.clear();
        self.future.clear();
        self.present = doc;
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use composer_core::id::NodeId;
    use composer_core::model::{Node, Position, Size};
    use pretty_assertions::assert_eq;

    fn add_cmd(name: &str) -> Command {
        Command::Add {
            node: Node::new(
                NodeId::intern(name),
                "Button",
                Position::default(),
                Size::new(100.0, 40.0),
            ),
            parent_id: None,
            index: None,
        }
    }

    #[test]
    fn dispatch_undo_redo_cycle() {
        let mut history = History::new(Document::new());
        assert!(history.dispatch(&add_cmd("a")));
        assert!(history.dispatch(&add_cmd("b")));
        assert_eq!(history.present().root().unwrap().children().len(), 2);

        assert!(history.undo());
        assert_eq!(history.present().root().unwrap().children().len(), 1);
        assert!(history.can_redo());

        assert!(history.redo());
        assert_eq!(history.present().root().unwrap().children().len(), 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn noop_command_leaves_history_untouched() {
        let mut history = History::new(Document::new());
        assert!(history.dispatch(&add_cmd("a")));

        // Colliding id: the reducer no-ops, so nothing is pushed.
        assert!(!history.dispatch(&add_cmd("a")));
        assert!(history.undo());
        assert!(!history.can_undo());
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut history = History::new(Document::new());
        history.dispatch(&add_cmd("a"));
        history.undo();
        assert!(history.can_redo());

        history.dispatch(&add_cmd("b"));
        assert!(!history.can_redo());
    }

    #[test]
    fn past_is_bounded_and_undo_stops_at_oldest() {
        let mut history = History::with_limit(Document::new(), 3);
        for i in 0..6 {
            history.dispatch(&add_cmd(&format!("n{i}")));
        }

        let mut undos = 0;
        while history.undo() {
            undos += 1;
        }
        assert_eq!(undos, 3);
        // The oldest retained snapshot already holds the first three adds.
        assert_eq!(history.present().root().unwrap().children().len(), 3);
    }

    #[test]
    fn reset_clears_both_stacks() {
        let mut history = History::new(Document::new());
        history.dispatch(&add_cmd("a"));
        history.undo();
        assert!(history.can_redo());

        history.reset(Document::new());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
