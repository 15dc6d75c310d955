//! Indentation tracking for block scopes
//!
//!     The indent stack remembers the indentation of every line that opened a scope. A scope is
//!     requested ahead of time with [IndentStack::mark_next_scope]; the next measured line then
//!     becomes its boundary. When a later line dedents past a boundary, the marker is popped and
//!     its close action is handed back to the caller.
//!
//!     Markers live in a plain index-addressed stack. Close actions are data
//!     ([CloseAction]), not callbacks: the caller decides what "closing" means for it.

use super::ScopeError;

/// What a scope marker stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// A counted control block (`@if ...:`, `for ...:`).
    Block,
    /// An uncounted region that switched the lexer mode (`@:`).
    ModeToggle,
}

/// Action fired when a scope marker is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAction {
    /// Decrement the nesting depth.
    LeaveScope,
    /// Restore the lexer mode saved when the region was opened.
    RestoreMode,
}

/// A scope boundary on the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeMarker {
    /// Raw leading whitespace of the first line inside the scope
    pub indent: String,
    /// Length of `indent`
    pub length: usize,
    pub kind: ScopeKind,
    pub on_close: Option<CloseAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingMark {
    kind: ScopeKind,
    on_close: Option<CloseAction>,
}

/// Stack of scope markers, strictly increasing in length from bottom to top.
#[derive(Debug, Default)]
pub struct IndentStack {
    markers: Vec<ScopeMarker>,
    indentation: usize,
    pending: Option<PendingMark>,
    no_whitespace: bool,
}

impl IndentStack {
    pub fn new(no_whitespace: bool) -> Self {
        IndentStack {
            no_whitespace,
            ..Self::default()
        }
    }

    /// Marks the next measured indentation as a scope boundary.
    ///
    /// Returns the action of a previous mark that never got resolved, since that
    /// scope ended up with an empty body.
    pub fn mark_next_scope(
        &mut self,
        kind: ScopeKind,
        on_close: Option<CloseAction>,
    ) -> Option<CloseAction> {
        let previous = self.pending.replace(PendingMark { kind, on_close });
        previous.and_then(|mark| mark.on_close)
    }

    /// Updates bookkeeping for a new line with leading whitespace `raw`.
    ///
    /// Returns the close actions fired by this line, innermost first.
    pub fn handle_indentation(&mut self, raw: &str) -> Vec<CloseAction> {
        let length = raw.len();
        let mut fired = Vec::new();

        while let Some(top) = self.markers.last() {
            if top.length <= length {
                break;
            }
            if let Some(marker) = self.markers.pop() {
                tracing::trace!(length = marker.length, kind = ?marker.kind, "scope popped");
                fired.extend(marker.on_close);
            }
        }

        if let Some(mark) = self.pending.take() {
            if length > self.current_scope_indentation().1 {
                tracing::trace!(length, kind = ?mark.kind, "scope pushed");
                self.markers.push(ScopeMarker {
                    indent: raw.to_string(),
                    length,
                    kind: mark.kind,
                    on_close: mark.on_close,
                });
            } else {
                // The marked scope never indented: an empty block closes right away
                fired.extend(mark.on_close);
            }
        }

        self.indentation = length;
        fired
    }

    /// Closes the innermost scope regardless of indentation.
    ///
    /// A pending mark counts as the innermost scope.
    pub fn close_innermost(&mut self) -> Result<Option<CloseAction>, ScopeError> {
        if let Some(mark) = self.pending.take() {
            return Ok(mark.on_close);
        }
        match self.markers.pop() {
            Some(marker) => Ok(marker.on_close),
            None => Err(ScopeError::Underflow),
        }
    }

    /// Returns the raw indentation and length of the innermost scope.
    pub fn current_scope_indentation(&self) -> (&str, usize) {
        match self.markers.last() {
            Some(marker) => (marker.indent.as_str(), marker.length),
            None => ("", 0),
        }
    }

    /// Indentation of the current line relative to its scope.
    pub fn relative_indentation(&self) -> usize {
        if self.no_whitespace {
            return 0;
        }
        self.indentation
            .saturating_sub(self.current_scope_indentation().1)
    }

    /// Length of the last handled line's indentation.
    pub fn indentation(&self) -> usize {
        self.indentation
    }

    /// Number of markers currently on the stack.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn has_pending_mark(&self) -> bool {
        self.pending.is_some()
    }

    pub fn markers(&self) -> &[ScopeMarker] {
        &self.markers
    }
}
