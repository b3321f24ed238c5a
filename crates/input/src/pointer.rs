use glam::Vec2;

/// Mouse buttons the orbit controls care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// A camera gesture derived from pointer input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrbitAction {
    /// Orbit around the target by a pixel delta.
    Rotate(Vec2),
    /// Move the target in the view plane by a pixel delta.
    Pan(Vec2),
    /// Zoom; positive moves towards the target.
    Dolly(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Rotate,
    Pan,
}

/// Turns button/cursor/wheel events into [`OrbitAction`]s.
///
/// Left drag rotates, right or middle drag pans, the wheel dollies.
#[derive(Debug, Default)]
pub struct PointerTracker {
    drag: Option<Drag>,
    last: Option<Vec2>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_button(&mut self, button: PointerButton, pressed: bool) {
        let drag = match button {
            PointerButton::Left => Drag::Rotate,
            PointerButton::Right | PointerButton::Middle => Drag::Pan,
        };
        if pressed {
            if self.drag.is_none() {
                tracing::trace!(?button, "drag started");
                self.drag = Some(drag);
                self.last = None;
            }
        } else if self.drag == Some(drag) {
            self.drag = None;
        }
    }

    pub fn on_cursor_moved(&mut self, position: Vec2) -> Option<OrbitAction> {
        let previous = self.last.replace(position);
        let drag = self.drag?;
        let delta = position - previous?;
        if delta == Vec2::ZERO {
            return None;
        }
        Some(match drag {
            Drag::Rotate => OrbitAction::Rotate(delta),
            Drag::Pan => OrbitAction::Pan(delta),
        })
    }

    /// `lines` is the wheel delta in lines, positive when scrolling up.
    pub fn on_wheel(&mut self, lines: f32) -> Option<OrbitAction> {
        (lines != 0.0 && lines.is_finite()).then_some(OrbitAction::Dolly(lines))
    }

    /// Forget any drag in progress, e.g. when the cursor leaves the window.
    pub fn reset(&mut self) {
        self.drag = None;
        self.last = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }
}
