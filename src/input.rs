//! Canonical input button space (spec §6) and the middle-end's button
//! latch / keyboard normalization (spec §5).
//!
//! Grounded on `tesuji::gui::board::BoardProgram::update`, which turns raw
//! `iced` mouse events into `Message`s the editor understands; generalized
//! here into a host-agnostic `Button`/`InputEvent` pair plus the stateful
//! latch spec §5 requires (drag/release rewritten to the latched button,
//! a press-while-latched synthesizing a release first).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonPhase {
    Press,
    Drag,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorKey {
    Up,
    Down,
    Left,
    Right,
    Select,
    Select2,
}

/// `MOD_SHFT | MOD_CTRL | MOD_NUM_KEYPAD` bit flags (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const SHFT: Modifiers = Modifiers(0b001);
    pub const CTRL: Modifiers = Modifiers(0b010);
    pub const NUM_KEYPAD: Modifiers = Modifiers(0b100);

    pub const fn empty() -> Self {
        Modifiers(0)
    }

    pub const fn contains(self, flag: Modifiers) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub const fn union(self, other: Modifiers) -> Self {
        Modifiers(self.0 | other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Mouse { x: i32, y: i32, button: Button, phase: ButtonPhase },
    Cursor(CursorKey, Modifiers),
    Char(char),
    Undo,
    Redo,
    NewGame,
}

/// The middle-end's button latch (spec §5): tracks the currently-depressed
/// mouse button and rewrites drag/release events to refer to it. A press
/// while another button is latched synthesizes a release of the old
/// button first, unless `priority` suppresses the new press (e.g. "left
/// beats right").
#[derive(Default)]
pub struct ButtonLatch {
    latched: Option<Button>,
}

/// Optional per-puzzle priority order: returns `true` if `incoming` should
/// be suppressed while `held` is already latched.
pub type Priority = fn(held: Button, incoming: Button) -> bool;

impl ButtonLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes one raw mouse event against the current latch state,
    /// returning zero or more events to actually deliver to the back-end.
    /// A `Press` while another button is held emits a synthetic release of
    /// the old button before the new press, unless `priority` suppresses
    /// the new press entirely (in which case nothing is emitted and the
    /// old button stays latched).
    pub fn normalize(
        &mut self,
        x: i32,
        y: i32,
        button: Button,
        phase: ButtonPhase,
        priority: Option<Priority>,
    ) -> Vec<InputEvent> {
        match phase {
            ButtonPhase::Press => {
                if let Some(held) = self.latched {
                    if held == button {
                        // Already latched on this exact button; treat as
                        // a no-op re-press (shouldn't normally happen).
                        return vec![];
                    }
                    if let Some(p) = priority {
                        if p(held, button) {
                            return vec![];
                        }
                    }
                    let mut events = vec![InputEvent::Mouse { x, y, button: held, phase: ButtonPhase::Release }];
                    self.latched = Some(button);
                    events.push(InputEvent::Mouse { x, y, button, phase: ButtonPhase::Press });
                    events
                } else {
                    self.latched = Some(button);
                    vec![InputEvent::Mouse { x, y, button, phase: ButtonPhase::Press }]
                }
            }
            ButtonPhase::Drag => match self.latched {
                Some(held) => vec![InputEvent::Mouse { x, y, button: held, phase: ButtonPhase::Drag }],
                None => vec![],
            },
            ButtonPhase::Release => match self.latched.take() {
                Some(held) => vec![InputEvent::Mouse { x, y, button: held, phase: ButtonPhase::Release }],
                None => vec![],
            },
        }
    }

    pub fn latched_button(&self) -> Option<Button> {
        self.latched
    }
}

/// Normalizes a raw keyboard byte/char to the canonical space: Enter/Return
/// to `Select`, Space to `Select2`, both backspace bytes (`\x08`, `\x7f`)
/// to a single canonical code.
pub fn normalize_key(raw: char) -> InputEvent {
    match raw {
        '\r' | '\n' => InputEvent::Cursor(CursorKey::Select, Modifiers::empty()),
        ' ' => InputEvent::Cursor(CursorKey::Select2, Modifiers::empty()),
        '\u{8}' | '\u{7f}' => InputEvent::Char('\u{8}'),
        c => InputEvent::Char(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_then_release_round_trips() {
        let mut latch = ButtonLatch::new();
        let events = latch.normalize(5, 5, Button::Left, ButtonPhase::Press, None);
        assert_eq!(events, vec![InputEvent::Mouse { x: 5, y: 5, button: Button::Left, phase: ButtonPhase::Press }]);
        assert_eq!(latch.latched_button(), Some(Button::Left));

        let events = latch.normalize(6, 6, Button::Left, ButtonPhase::Drag, None);
        assert_eq!(events, vec![InputEvent::Mouse { x: 6, y: 6, button: Button::Left, phase: ButtonPhase::Drag }]);

        let events = latch.normalize(7, 7, Button::Left, ButtonPhase::Release, None);
        assert_eq!(events, vec![InputEvent::Mouse { x: 7, y: 7, button: Button::Left, phase: ButtonPhase::Release }]);
        assert_eq!(latch.latched_button(), None);
    }

    #[test]
    fn press_while_latched_synthesizes_release_s4() {
        // Scenario S4: left press at (5,5), right press at (5,5), no
        // priority override.
        let mut latch = ButtonLatch::new();
        latch.normalize(5, 5, Button::Left, ButtonPhase::Press, None);
        let events = latch.normalize(5, 5, Button::Right, ButtonPhase::Press, None);
        assert_eq!(
            events,
            vec![
                InputEvent::Mouse { x: 5, y: 5, button: Button::Left, phase: ButtonPhase::Release },
                InputEvent::Mouse { x: 5, y: 5, button: Button::Right, phase: ButtonPhase::Press },
            ]
        );
        assert_eq!(latch.latched_button(), Some(Button::Right));
    }

    #[test]
    fn priority_can_suppress_new_press() {
        let mut latch = ButtonLatch::new();
        latch.normalize(5, 5, Button::Left, ButtonPhase::Press, None);
        fn left_beats_right(held: Button, incoming: Button) -> bool {
            held == Button::Left && incoming == Button::Right
        }
        let events = latch.normalize(5, 5, Button::Right, ButtonPhase::Press, Some(left_beats_right));
        assert!(events.is_empty());
        assert_eq!(latch.latched_button(), Some(Button::Left));
    }

    #[test]
    fn enter_and_space_normalize() {
        assert_eq!(normalize_key('\r'), InputEvent::Cursor(CursorKey::Select, Modifiers::empty()));
        assert_eq!(normalize_key(' '), InputEvent::Cursor(CursorKey::Select2, Modifiers::empty()));
        assert_eq!(normalize_key('\u{7f}'), InputEvent::Char('\u{8}'));
        assert_eq!(normalize_key('\u{8}'), InputEvent::Char('\u{8}'));
    }
}
