use crate::draw::model::Stroke;

/// Committed strokes in draw order plus the strokes undone since the last commit.
///
/// The committed stack doubles as z-order: later strokes composite on top.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokeHistory {
    undo_stack: Vec<Stroke>,
    redo_stack: Vec<Stroke>,
    revision: u64,
}

impl StrokeHistory {
    pub fn commit(&mut self, stroke: Stroke) {
        self.undo_stack.push(stroke);
        self.redo_stack.clear();
        self.bump();
    }

    /// Moves the newest stroke to the redo stack and returns what is left to replay.
    pub fn undo(&mut self) -> Option<&[Stroke]> {
        let stroke = self.undo_stack.pop()?;
        self.redo_stack.push(stroke);
        self.bump();
        Some(&self.undo_stack)
    }

    /// Restores the most recently undone stroke and returns it.
    pub fn redo(&mut self) -> Option<&Stroke> {
        let stroke = self.redo_stack.pop()?;
        self.undo_stack.push(stroke);
        self.bump();
        self.undo_stack.last()
    }

    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.bump();
    }

    pub fn committed(&self) -> &[Stroke] {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &[Stroke] {
        &self.redo_stack
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty() && self.redo_stack.is_empty()
    }

    /// Bumped on every mutation so renderers can tell when a replay is due.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
