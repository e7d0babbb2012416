#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasState {
    #[default]
    Idle,
    Drawing,
}

impl CanvasState {
    pub fn is_drawing(self) -> bool {
        matches!(self, Self::Drawing)
    }
}

pub fn can_transition(from: CanvasState, to: CanvasState) -> bool {
    matches!(
        (from, to),
        (CanvasState::Idle, CanvasState::Drawing)
            | (CanvasState::Drawing, CanvasState::Drawing)
            | (CanvasState::Drawing, CanvasState::Idle)
    ) || from == to
}
