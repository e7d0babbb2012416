use crate::draw::state::CanvasState;
use kurbo::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    Cancel,
}

impl PointerEvent {
    pub fn position(&self) -> Option<Point> {
        match *self {
            PointerEvent::Down(p) | PointerEvent::Move(p) | PointerEvent::Up(p) => Some(p),
            PointerEvent::Cancel => None,
        }
    }

    /// State the canvas ends up in after handling this event from `from`;
    /// `None` when the event means nothing in that state.
    pub fn next_state(&self, from: CanvasState) -> Option<CanvasState> {
        match (self, from) {
            (PointerEvent::Down(_), _) => Some(CanvasState::Drawing),
            (PointerEvent::Move(_), CanvasState::Drawing) => Some(CanvasState::Drawing),
            (PointerEvent::Up(_) | PointerEvent::Cancel, CanvasState::Drawing) => {
                Some(CanvasState::Idle)
            }
            (
                PointerEvent::Move(_) | PointerEvent::Up(_) | PointerEvent::Cancel,
                CanvasState::Idle,
            ) => None,
        }
    }
}

/// History commands; saving takes a sink and goes through the controller's `save`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasCommand {
    Undo,
    Redo,
    Reset,
}

/// How the controller handled a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Ignored,
    Started,
    Extended,
    Committed,
    Discarded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_ignores_everything_but_down() {
        let p = Point::new(1.0, 2.0);
        assert_eq!(
            PointerEvent::Down(p).next_state(CanvasState::Idle),
            Some(CanvasState::Drawing)
        );
        assert_eq!(PointerEvent::Move(p).next_state(CanvasState::Idle), None);
        assert_eq!(PointerEvent::Up(p).next_state(CanvasState::Idle), None);
        assert_eq!(PointerEvent::Cancel.next_state(CanvasState::Idle), None);
    }

    #[test]
    fn drawing_ends_on_up_or_cancel() {
        let p = Point::new(1.0, 2.0);
        assert_eq!(
            PointerEvent::Up(p).next_state(CanvasState::Drawing),
            Some(CanvasState::Idle)
        );
        assert_eq!(
            PointerEvent::Cancel.next_state(CanvasState::Drawing),
            Some(CanvasState::Idle)
        );
        assert_eq!(PointerEvent::Cancel.position(), None);
    }
}
