//! Nesting depth on top of the indent stack
//!
//!     Every block opener increments the depth and marks the next indentation with a
//!     [CloseAction::LeaveScope]. Whenever the indent stack fires that action the depth goes
//!     back down. Actions this layer does not understand are passed up to the lexer.

use super::indent_stack::{CloseAction, IndentStack, ScopeKind};
use super::ScopeError;

#[derive(Debug, Default)]
pub struct ScopeStack {
    depth: usize,
    indents: IndentStack,
}

impl ScopeStack {
    pub fn new(no_whitespace: bool) -> Self {
        ScopeStack {
            depth: 0,
            indents: IndentStack::new(no_whitespace),
        }
    }

    /// Number of open blocks.
    pub fn current_depth(&self) -> usize {
        self.depth
    }

    pub fn indent_stack(&self) -> &IndentStack {
        &self.indents
    }

    /// Opens a counted block whose boundary is the next line's indentation.
    pub fn enter_scope(&mut self) -> Result<Vec<CloseAction>, ScopeError> {
        self.depth += 1;
        self.mark_scope(ScopeKind::Block, Some(CloseAction::LeaveScope))
    }

    /// Marks the next indentation as a scope boundary without counting it.
    pub fn mark_scope(
        &mut self,
        kind: ScopeKind,
        on_close: Option<CloseAction>,
    ) -> Result<Vec<CloseAction>, ScopeError> {
        let unresolved = self.indents.mark_next_scope(kind, on_close);
        self.apply(unresolved)
    }

    /// Feeds one line's leading whitespace. Returns the actions left for the caller.
    pub fn handle_indentation(&mut self, raw: &str) -> Result<Vec<CloseAction>, ScopeError> {
        let fired = self.indents.handle_indentation(raw);
        self.apply(fired)
    }

    /// Closes scopes innermost first until a mode-toggle region has been closed.
    pub fn close_region(&mut self) -> Result<Vec<CloseAction>, ScopeError> {
        let mut remaining = Vec::new();
        loop {
            let action = self.indents.close_innermost()?;
            let restores = action == Some(CloseAction::RestoreMode);
            remaining.extend(self.apply(action)?);
            if restores {
                return Ok(remaining);
            }
        }
    }

    /// Closes everything still open, as at end of input.
    pub fn close_all(&mut self) -> Result<Vec<CloseAction>, ScopeError> {
        let mut remaining = self.handle_indentation("")?;
        if self.indents.has_pending_mark() {
            let action = self.indents.close_innermost()?;
            remaining.extend(self.apply(action)?);
        }
        Ok(remaining)
    }

    fn apply(
        &mut self,
        actions: impl IntoIterator<Item = CloseAction>,
    ) -> Result<Vec<CloseAction>, ScopeError> {
        let mut remaining = Vec::new();
        for action in actions {
            match action {
                CloseAction::LeaveScope => {
                    self.depth = self.depth.checked_sub(1).ok_or(ScopeError::Underflow)?;
                }
                other => remaining.push(other),
            }
        }
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: &str = "     ";

    fn indent(steps: usize) -> String {
        STEP.repeat(steps)
    }

    #[test]
    fn test_scope_starts_at_zero() {
        let scope = ScopeStack::new(false);
        assert_eq!(scope.current_depth(), 0);
    }

    #[test]
    fn test_single_scope() {
        let mut scope = ScopeStack::new(false);
        scope.handle_indentation("").unwrap();
        scope.enter_scope().unwrap();
        scope.handle_indentation(&indent(1)).unwrap();
        assert_eq!(scope.current_depth(), 1);

        scope.handle_indentation(&indent(2)).unwrap();
        assert_eq!(scope.current_depth(), 1);

        scope.handle_indentation(&indent(1)).unwrap();
        assert_eq!(scope.current_depth(), 1);

        scope.handle_indentation("").unwrap();
        assert_eq!(scope.current_depth(), 0);
    }

    #[test]
    fn test_multi_scope() {
        let mut scope = ScopeStack::new(false);
        scope.handle_indentation("").unwrap();
        assert_eq!(scope.current_depth(), 0);
        scope.enter_scope().unwrap();

        scope.handle_indentation(&indent(1)).unwrap();
        assert_eq!(scope.current_depth(), 1);
        scope.enter_scope().unwrap();

        scope.handle_indentation(&indent(2)).unwrap();
        assert_eq!(scope.current_depth(), 2);
        scope.enter_scope().unwrap();

        // Third block has an empty body: closes on the spot
        scope.handle_indentation(&indent(2)).unwrap();
        assert_eq!(scope.current_depth(), 2);

        scope.handle_indentation(&indent(1)).unwrap();
        assert_eq!(scope.current_depth(), 1);

        scope.handle_indentation("").unwrap();
        assert_eq!(scope.current_depth(), 0);
    }

    #[test]
    fn test_double_dedent_in_one_line() {
        let mut scope = ScopeStack::new(false);
        scope.handle_indentation("").unwrap();
        scope.enter_scope().unwrap();
        scope.handle_indentation("    ").unwrap();
        scope.enter_scope().unwrap();
        scope.handle_indentation("        ").unwrap();
        assert_eq!(scope.current_depth(), 2);

        scope.handle_indentation("").unwrap();
        assert_eq!(scope.current_depth(), 0);
    }

    #[test]
    fn test_mode_actions_pass_through() {
        let mut scope = ScopeStack::new(false);
        scope
            .mark_scope(ScopeKind::ModeToggle, Some(CloseAction::RestoreMode))
            .unwrap();
        scope.handle_indentation("    ").unwrap();
        scope.enter_scope().unwrap();
        scope.handle_indentation("        ").unwrap();

        let remaining = scope.handle_indentation("").unwrap();
        assert_eq!(remaining, vec![CloseAction::RestoreMode]);
        assert_eq!(scope.current_depth(), 0);
    }

    #[test]
    fn test_close_region_stops_at_toggle() {
        let mut scope = ScopeStack::new(false);
        scope.enter_scope().unwrap();
        scope.handle_indentation("  ").unwrap();
        scope
            .mark_scope(ScopeKind::ModeToggle, Some(CloseAction::RestoreMode))
            .unwrap();
        scope.handle_indentation("    ").unwrap();
        scope.enter_scope().unwrap();
        scope.handle_indentation("      ").unwrap();
        assert_eq!(scope.current_depth(), 2);

        let remaining = scope.close_region().unwrap();
        assert_eq!(remaining, vec![CloseAction::RestoreMode]);
        // The outer block is untouched
        assert_eq!(scope.current_depth(), 1);
        assert_eq!(scope.indent_stack().len(), 1);
    }

    #[test]
    fn test_close_region_without_region_underflows() {
        let mut scope = ScopeStack::new(false);
        scope.enter_scope().unwrap();
        scope.handle_indentation("  ").unwrap();
        assert_eq!(scope.close_region(), Err(ScopeError::Underflow));
    }

    #[test]
    fn test_close_all_resolves_pending() {
        let mut scope = ScopeStack::new(false);
        scope.enter_scope().unwrap();
        scope.handle_indentation("  ").unwrap();
        scope.enter_scope().unwrap();
        assert_eq!(scope.current_depth(), 2);

        scope.close_all().unwrap();
        assert_eq!(scope.current_depth(), 0);
    }
}
