use crate::render::GizmoMode;
use glam::Vec2;
use winit::event::MouseButton;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pointer travel below which a press/release pair counts as a click.
const CLICK_SLOP_PX: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    TransformMode(Option<GizmoMode>),
    DeleteSelection,
    ClearSelection,
}

/// Q disables the gizmo, W/E/R pick its mode.
pub fn shortcut_for(key: PhysicalKey) -> Option<Shortcut> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    match code {
        KeyCode::KeyW => Some(Shortcut::TransformMode(Some(GizmoMode::Translate))),
        KeyCode::KeyE => Some(Shortcut::TransformMode(Some(GizmoMode::Rotate))),
        KeyCode::KeyR => Some(Shortcut::TransformMode(Some(GizmoMode::Scale))),
        KeyCode::KeyQ => Some(Shortcut::TransformMode(None)),
        KeyCode::Delete | KeyCode::Backspace => Some(Shortcut::DeleteSelection),
        KeyCode::Escape => Some(Shortcut::ClearSelection),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerGesture {
    Click(Vec2),
    Orbit(Vec2),
    Pan(Vec2),
    GizmoDrag(Vec2),
}

#[derive(Default, Debug, Clone, Copy)]
pub struct PointerState {
    pub position: Vec2,
    primary: bool,
    secondary: bool,
    press_origin: Option<Vec2>,
    travelled: f32,
    pub gizmo_drag: bool,
}

impl PointerState {
    pub fn primary_down(&self) -> bool {
        self.primary
    }

    /// Forgets buttons and drags but keeps the last position.
    pub fn reset(&mut self) {
        *self = Self {
            position: self.position,
            ..Self::default()
        };
    }

    pub fn press(&mut self, button: MouseButton) {
        match button {
            MouseButton::Left => {
                self.primary = true;
                self.press_origin = Some(self.position);
                self.travelled = 0.0;
            }
            MouseButton::Right | MouseButton::Middle => self.secondary = true,
            _ => {}
        }
    }

    /// Returns a click when the primary button comes up close to where it
    /// went down and no gizmo drag was running.
    pub fn release(&mut self, button: MouseButton) -> Option<PointerGesture> {
        match button {
            MouseButton::Left => {
                self.primary = false;
                let origin = self.press_origin.take()?;
                let was_drag = std::mem::take(&mut self.gizmo_drag);
                (!was_drag && self.travelled < CLICK_SLOP_PX).then_some(PointerGesture::Click(origin))
            }
            MouseButton::Right | MouseButton::Middle => {
                self.secondary = false;
                None
            }
            _ => None,
        }
    }

    pub fn moved(&mut self, position: Vec2) -> Option<PointerGesture> {
        let delta = position - self.position;
        self.position = position;
        if self.primary {
            self.travelled += delta.length();
        }
        if delta == Vec2::ZERO {
            return None;
        }
        if self.gizmo_drag {
            Some(PointerGesture::GizmoDrag(delta))
        } else if self.primary && self.travelled >= CLICK_SLOP_PX {
            Some(PointerGesture::Orbit(delta))
        } else if self.secondary {
            Some(PointerGesture::Pan(delta))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_press_is_a_click() {
        let mut pointer = PointerState::default();
        pointer.moved(Vec2::new(100.0, 100.0));
        pointer.press(MouseButton::Left);
        assert_eq!(pointer.moved(Vec2::new(101.0, 100.0)), None);
        assert_eq!(
            pointer.release(MouseButton::Left),
            Some(PointerGesture::Click(Vec2::new(100.0, 100.0)))
        );
    }

    #[test]
    fn long_drag_orbits_instead_of_clicking() {
        let mut pointer = PointerState::default();
        pointer.press(MouseButton::Left);
        pointer.moved(Vec2::new(3.0, 0.0));
        assert_eq!(
            pointer.moved(Vec2::new(10.0, 0.0)),
            Some(PointerGesture::Orbit(Vec2::new(7.0, 0.0)))
        );
        assert_eq!(pointer.release(MouseButton::Left), None);
    }

    #[test]
    fn gizmo_drag_swallows_click() {
        let mut pointer = PointerState::default();
        pointer.press(MouseButton::Left);
        pointer.gizmo_drag = true;
        assert_eq!(
            pointer.moved(Vec2::new(1.0, 0.0)),
            Some(PointerGesture::GizmoDrag(Vec2::new(1.0, 0.0)))
        );
        assert_eq!(pointer.release(MouseButton::Left), None);
        assert!(!pointer.gizmo_drag);
    }

    #[test]
    fn shortcuts_map_gizmo_modes() {
        assert_eq!(
            shortcut_for(PhysicalKey::Code(KeyCode::KeyE)),
            Some(Shortcut::TransformMode(Some(GizmoMode::Rotate)))
        );
        assert_eq!(
            shortcut_for(PhysicalKey::Code(KeyCode::KeyQ)),
            Some(Shortcut::TransformMode(None))
        );
        assert_eq!(shortcut_for(PhysicalKey::Code(KeyCode::KeyZ)), None);
    }
}
