//! The stateless host façade (spec §4.H): translates raw platform key/mouse
//! codes into the canonical input space ([`crate::input`]) and forwards
//! everything else straight to the [`crate::midend::Midend`] it wraps. This
//! layer owns no state of its own beyond the midend handle, a host (the
//! CLI, the GUI) constructs one per live game and never reaches past it
//! into the midend directly.
//!
//! Grounded on `tesuji::cli::CliAdapter`, the teacher's own "thin shell
//! translating one concrete input source into the generic controller's
//! commands."

use crate::backend::Backend;
use crate::config::ConfigSource;
use crate::input::{Button, ButtonPhase, CursorKey, Modifiers};
use crate::midend::{IdDefaultMode, Midend};
use crate::rng::HostEntropy;

/// A raw platform key code, pre-translation. Hosts are expected to map
/// their own key enum (iced's `Key`, a terminal escape sequence, ...) into
/// this shape before calling [`Host::key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKey {
    Arrow(CursorKey),
    Char(char),
    Undo,
    Redo,
}

/// A stateless wrapper around one [`Midend`], translating platform input
/// into canonical events and forwarding everything else.
pub struct Host<B: Backend> {
    midend: Midend<B>,
}

impl<B: Backend> Host<B> {
    pub fn new(backend: B, config: &dyn ConfigSource) -> Self {
        Self { midend: Midend::new(backend, config) }
    }

    pub fn midend(&self) -> &Midend<B> {
        &self.midend
    }

    pub fn midend_mut(&mut self) -> &mut Midend<B> {
        &mut self.midend
    }

    pub fn new_game(&mut self, host_entropy: &mut dyn HostEntropy) {
        self.midend.new_game(host_entropy);
    }

    /// Translates a platform mouse event and forwards it; returns whether
    /// the host should repaint.
    pub fn mouse(&mut self, x: i32, y: i32, button: Button, phase: ButtonPhase) -> bool {
        self.midend.process_mouse(x, y, button, phase, None)
    }

    /// Translates a platform key code and forwards it; returns whether the
    /// host should repaint.
    pub fn key(&mut self, raw: RawKey, modifiers: Modifiers) -> bool {
        match raw {
            RawKey::Arrow(key) => self.midend.process_cursor(key, modifiers),
            RawKey::Char(c) => self.midend.process_char(c),
            RawKey::Undo => {
                self.midend.undo();
                true
            }
            RawKey::Redo => {
                self.midend.redo();
                true
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        self.midend.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.midend.redo()
    }

    pub fn restart(&mut self) {
        self.midend.restart_game();
    }

    pub fn solve(&mut self) -> Result<(), String> {
        self.midend.solve()
    }

    pub fn game_id(&mut self, s: &str, default_mode: IdDefaultMode) -> Result<(), String> {
        self.midend.game_id(s, default_mode)
    }

    pub fn tick(&mut self, dt: f32) {
        self.midend.timer(dt);
    }

    pub fn timer_should_be_armed(&self) -> bool {
        self.midend.timer_should_be_armed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfigSource;
    use crate::drawing::{Colour, DrawingHandle};
    use crate::input::InputEvent;
    use crate::params::{Preset, PresetMenu};
    use crate::rng::RandomSource;

    #[derive(Clone)]
    struct ToggleBackend {
        presets: PresetMenu<()>,
    }

    impl Backend for ToggleBackend {
        type Params = ();
        type State = bool;
        type Ui = ();

        fn name(&self) -> &'static str {
            "toggle"
        }
        fn default_params(&self) {}
        fn presets(&self) -> &PresetMenu<()> {
            &self.presets
        }
        fn encode_params(&self, _params: &(), _full: bool) -> String {
            String::new()
        }
        fn decode_params(&self, _params: &mut (), _s: &str) {}
        fn validate_params(&self, _params: &(), _full: bool) -> Result<(), String> {
            Ok(())
        }
        fn new_desc(&self, _params: &(), _rng: &mut RandomSource) -> (String, Option<String>) {
            ("off".to_string(), None)
        }
        fn validate_desc(&self, _params: &(), desc: &str) -> Result<(), String> {
            if desc == "off" || desc == "on" {
                Ok(())
            } else {
                Err("bad description".to_string())
            }
        }
        fn new_game(&self, _params: &(), desc: &str) -> Result<bool, String> {
            Ok(desc == "on")
        }
        fn solve(&self, _initial: &bool, current: &bool, _aux: Option<&str>) -> Result<String, String> {
            Ok(if *current { "off".to_string() } else { "on".to_string() })
        }
        fn interpret_move(&self, _state: &bool, _ui: &mut (), input: InputEvent) -> crate::backend::MoveOutcome {
            match input {
                InputEvent::Char('t') => crate::backend::MoveOutcome::Move("toggle".to_string()),
                _ => crate::backend::MoveOutcome::Ignored,
            }
        }
        fn execute_move(&self, state: &bool, movestr: &str) -> Option<bool> {
            match movestr {
                "toggle" => Some(!state),
                "on" => Some(true),
                "off" => Some(false),
                _ => None,
            }
        }
        fn redraw(&self, _drawing: &mut dyn DrawingHandle, _old: Option<&bool>, _state: &bool, _dir: i32, _ui: &(), _animtime: f32, _flashtime: f32) {}
        fn anim_length(&self, _old: &bool, _new: &bool, _dir: i32, _ui: &()) -> f32 {
            0.0
        }
        fn flash_length(&self, _old: &bool, _new: &bool, _dir: i32, _ui: &()) -> f32 {
            0.0
        }
        fn status(&self, state: &bool) -> i32 {
            if *state {
                1
            } else {
                0
            }
        }
        fn compute_size(&self, _params: &(), tile_size: i32) -> (i32, i32) {
            (tile_size, tile_size)
        }
        fn colours(&self) -> Vec<Colour> {
            vec![Colour::BLACK]
        }
    }

    struct FixedEntropy;
    impl HostEntropy for FixedEntropy {
        fn fresh_seed(&mut self) -> String {
            "000000000000001".to_string()
        }
    }

    fn new_host() -> Host<ToggleBackend> {
        let config = MapConfigSource::new();
        let backend = ToggleBackend { presets: PresetMenu::Leaf(Preset::new("Default", ())) };
        let mut host = Host::new(backend, &config);
        host.new_game(&mut FixedEntropy);
        host
    }

    #[test]
    fn char_key_forwards_to_midend_as_a_move() {
        let mut host = new_host();
        assert_eq!(*host.midend().current_state(), false);
        host.key(RawKey::Char('t'), Modifiers::empty());
        assert_eq!(*host.midend().current_state(), true);
    }

    #[test]
    fn undo_redo_forward_through_host() {
        let mut host = new_host();
        host.key(RawKey::Char('t'), Modifiers::empty());
        assert!(host.undo());
        assert_eq!(*host.midend().current_state(), false);
        assert!(host.redo());
        assert_eq!(*host.midend().current_state(), true);
    }

    #[test]
    fn solve_reaches_goal_through_host() {
        let mut host = new_host();
        host.solve().unwrap();
        assert_eq!(*host.midend().current_state(), true);
    }
}
