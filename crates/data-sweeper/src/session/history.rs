use crate::types::TabularData;

/// Undo/redo stacks for one file.
///
/// The top of the undo stack is the current state; its bottom entry is the
/// ingested baseline and can never be undone away.
#[derive(Debug, Clone, Default)]
pub struct FileHistory {
    undo: Vec<TabularData>,
    redo: Vec<TabularData>,
}

impl FileHistory {
    /// Push a new current state. Any redo entries become unreachable.
    pub fn push(&mut self, data: TabularData) {
        self.undo.push(data);
        self.redo.clear();
    }

    /// Step back one state, returning the new current state.
    pub fn undo(&mut self) -> Option<TabularData> {
        if self.undo.len() <= 1 {
            return None;
        }
        let top = self.undo.pop()?;
        self.redo.push(top);
        self.undo.last().cloned()
    }

    /// Re-apply the most recently undone state.
    pub fn redo(&mut self) -> Option<TabularData> {
        let next = self.redo.pop()?;
        self.undo.push(next.clone());
        Some(next)
    }

    pub fn current(&self) -> Option<&TabularData> {
        self.undo.last()
    }

    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of states on the undo stack, baseline included.
    pub fn depth(&self) -> usize {
        self.undo.len()
    }
}
