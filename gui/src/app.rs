//! The `iced` application shell (spec §4.H): owns one live [`Puzzle`] and
//! drives it from canvas mouse events and a small toolbar, mirroring
//! `tesuji::gui::GuiApp`'s message-enum/update/view shape generalized from
//! one game to a runtime choice between the two back-ends this crate links.

use std::io::Cursor;
use std::path::PathBuf;

use iced::widget::canvas::Canvas;
use iced::widget::{button, column, container, pick_list, row, text};
use iced::{Alignment, Element, Length, Task};

use puzzles::backend::Backend;
use puzzles::backends::bridges::BridgesBackend;
use puzzles::backends::slide::SlideBackend;
use puzzles::config::EnvConfigSource;
use puzzles::drawing::DrawingHandle;
use puzzles::facade::Host;
use puzzles::input::{Button as PuzzleButton, ButtonPhase};
use puzzles::rng::OsEntropy;

use crate::canvas_drawing::FrameDrawing;
use crate::io;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    Slide,
    Bridges,
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameKind::Slide => write!(f, "Sliding Block"),
            GameKind::Bridges => write!(f, "Bridges"),
        }
    }
}

const GAME_KINDS: [GameKind; 2] = [GameKind::Slide, GameKind::Bridges];

/// A live game, one variant per back-end this crate links. `Backend`'s
/// associated types rule out a single `Host<dyn Backend>`, so this enum is
/// the dispatch point (spec §9 Design Notes; see `backend.rs`'s own note
/// on static dispatch, and `DESIGN.md` for the open-question resolution).
enum Puzzle {
    Slide(Host<SlideBackend>),
    Bridges(Host<BridgesBackend>),
}

impl Puzzle {
    fn new(kind: GameKind) -> Self {
        let config = EnvConfigSource;
        match kind {
            GameKind::Slide => {
                let mut host = Host::new(SlideBackend::default(), &config);
                host.new_game(&mut OsEntropy);
                Puzzle::Slide(host)
            }
            GameKind::Bridges => {
                let mut host = Host::new(BridgesBackend::default(), &config);
                host.new_game(&mut OsEntropy);
                Puzzle::Bridges(host)
            }
        }
    }

    fn kind(&self) -> GameKind {
        match self {
            Puzzle::Slide(_) => GameKind::Slide,
            Puzzle::Bridges(_) => GameKind::Bridges,
        }
    }

    fn mouse(&mut self, x: i32, y: i32, phase: ButtonPhase) -> bool {
        match self {
            Puzzle::Slide(h) => h.mouse(x, y, PuzzleButton::Left, phase),
            Puzzle::Bridges(h) => h.mouse(x, y, PuzzleButton::Left, phase),
        }
    }

    fn undo(&mut self) -> bool {
        match self {
            Puzzle::Slide(h) => h.undo(),
            Puzzle::Bridges(h) => h.undo(),
        }
    }

    fn redo(&mut self) -> bool {
        match self {
            Puzzle::Slide(h) => h.redo(),
            Puzzle::Bridges(h) => h.redo(),
        }
    }

    fn restart(&mut self) {
        match self {
            Puzzle::Slide(h) => h.restart(),
            Puzzle::Bridges(h) => h.restart(),
        }
    }

    fn solve(&mut self) -> Result<(), String> {
        match self {
            Puzzle::Slide(h) => h.solve(),
            Puzzle::Bridges(h) => h.solve(),
        }
    }

    fn status(&self) -> i32 {
        match self {
            Puzzle::Slide(h) => h.midend().status(),
            Puzzle::Bridges(h) => h.midend().status(),
        }
    }

    fn board_size(&self) -> (i32, i32) {
        match self {
            Puzzle::Slide(h) => h.midend().backend().compute_size(h.midend().params(), h.midend().tile_size()),
            Puzzle::Bridges(h) => h.midend().backend().compute_size(h.midend().params(), h.midend().tile_size()),
        }
    }

    fn redraw(&self, drawing: &mut dyn DrawingHandle) {
        match self {
            Puzzle::Slide(h) => h.midend().redraw(drawing),
            Puzzle::Bridges(h) => h.midend().redraw(drawing),
        }
    }

    fn serialise(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        let result = match self {
            Puzzle::Slide(h) => h.midend().serialise(&mut buf),
            Puzzle::Bridges(h) => h.midend().serialise(&mut buf),
        };
        result.expect("writing to an in-memory buffer cannot fail");
        buf
    }

    fn deserialise(&mut self, bytes: &[u8]) -> Result<(), String> {
        let mut cursor = Cursor::new(bytes);
        let result = match self {
            Puzzle::Slide(h) => h.midend_mut().deserialise(&mut cursor),
            Puzzle::Bridges(h) => h.midend_mut().deserialise(&mut cursor),
        };
        result.map_err(|e| e.to_string())
    }
}

pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

pub enum StatusKind {
    Info,
    Warning,
    Error,
}

impl StatusMessage {
    fn info(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: StatusKind::Info }
    }
    fn warning(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: StatusKind::Warning }
    }
    fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: StatusKind::Error }
    }
}

pub struct GuiApp {
    puzzle: Puzzle,
    file_path: Option<PathBuf>,
    status_message: Option<StatusMessage>,
}

#[derive(Debug, Clone)]
pub enum Message {
    OpenFileRequested,
    SaveFileRequested,
    SaveAsRequested,
    FileOpened(Result<(PathBuf, Vec<u8>), String>),
    FileSaved(Result<PathBuf, String>),

    BoardMouse { x: f32, y: f32, phase: ButtonPhase },

    UndoRequested,
    RedoRequested,
    RestartRequested,
    SolveRequested,
    NewGameRequested(GameKind),
    DismissStatus,
}

impl GuiApp {
    pub fn new() -> (Self, Task<Message>) {
        (Self { puzzle: Puzzle::new(GameKind::Slide), file_path: None, status_message: None }, Task::none())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFileRequested => return io::open_file_task(),
            Message::SaveFileRequested => {
                let content = self.puzzle.serialise();
                return match self.file_path.clone() {
                    Some(path) => io::save_file_task(path, content),
                    None => io::save_as_file_task(content),
                };
            }
            Message::SaveAsRequested => {
                let content = self.puzzle.serialise();
                return io::save_as_file_task(content);
            }
            Message::FileOpened(Ok((path, bytes))) => match self.puzzle.deserialise(&bytes) {
                Ok(()) => {
                    self.file_path = Some(path);
                    self.status_message = None;
                }
                Err(e) => self.status_message = Some(StatusMessage::error(e)),
            },
            Message::FileOpened(Err(e)) => self.status_message = Some(StatusMessage::error(e)),
            Message::FileSaved(Ok(path)) => {
                self.file_path = Some(path.clone());
                self.status_message = Some(StatusMessage::info(format!("Saved to {}", path.display())));
            }
            Message::FileSaved(Err(e)) => self.status_message = Some(StatusMessage::error(format!("Save failed: {e}"))),
            Message::BoardMouse { x, y, phase } => {
                self.puzzle.mouse(x as i32, y as i32, phase);
            }
            Message::UndoRequested => {
                self.puzzle.undo();
            }
            Message::RedoRequested => {
                self.puzzle.redo();
            }
            Message::RestartRequested => self.puzzle.restart(),
            Message::SolveRequested => {
                if let Err(e) = self.puzzle.solve() {
                    self.status_message = Some(StatusMessage::error(format!("Solve failed: {e}")));
                }
            }
            Message::NewGameRequested(kind) => {
                self.puzzle = Puzzle::new(kind);
                self.file_path = None;
                self.status_message = None;
            }
            Message::DismissStatus => self.status_message = None,
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let toolbar = row![
            button("Open").on_press(Message::OpenFileRequested),
            button("Save").on_press(Message::SaveFileRequested),
            button("Save As").on_press(Message::SaveAsRequested),
            pick_list(GAME_KINDS, Some(self.puzzle.kind()), Message::NewGameRequested),
        ]
        .spacing(8);

        let board_canvas = Canvas::new(BoardProgram { puzzle: &self.puzzle }).width(Length::Fill).height(Length::Fill);
        let board_container = container(board_canvas).width(Length::Fill).height(Length::Fill);

        let status_word = match self.puzzle.status() {
            1 => "solved",
            -1 => "stuck",
            _ => "in progress",
        };
        let nav_row = row![
            button("Undo").on_press(Message::UndoRequested),
            button("Redo").on_press(Message::RedoRequested),
            button("Restart").on_press(Message::RestartRequested),
            button("Solve").on_press(Message::SolveRequested),
            text(status_word).size(14),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        let maybe_status: Element<'_, Message> = if let Some(status) = &self.status_message {
            let color = match status.kind {
                StatusKind::Info => theme::STATUS_INFO,
                StatusKind::Warning => theme::STATUS_WARNING,
                StatusKind::Error => theme::STATUS_ERROR,
            };
            container(
                row![text(status.text.clone()).size(13).color(color), button("x").on_press(Message::DismissStatus),]
                    .spacing(8)
                    .align_y(Alignment::Center),
            )
            .padding(4)
            .into()
        } else {
            text("").into()
        };

        column![toolbar, board_container, nav_row, maybe_status].spacing(6).padding(8).into()
    }
}

struct BoardProgram<'a> {
    puzzle: &'a Puzzle,
}

impl<'a> iced::widget::canvas::Program<Message> for BoardProgram<'a> {
    type State = bool; // whether the left button is currently held

    fn update(
        &self,
        dragging: &mut bool,
        event: &iced::Event,
        bounds: iced::Rectangle,
        cursor: iced::mouse::Cursor,
    ) -> Option<iced::widget::canvas::Action<Message>> {
        use iced::widget::canvas::Action;
        use iced::{Event, mouse};

        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let pos = cursor.position_in(bounds)?;
                *dragging = true;
                Some(Action::publish(Message::BoardMouse { x: pos.x, y: pos.y, phase: ButtonPhase::Press }).and_capture())
            }
            Event::Mouse(mouse::Event::CursorMoved { .. }) if *dragging => {
                let pos = cursor.position_in(bounds)?;
                Some(Action::publish(Message::BoardMouse { x: pos.x, y: pos.y, phase: ButtonPhase::Drag }))
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                *dragging = false;
                let pos = cursor.position_in(bounds).unwrap_or_default();
                Some(Action::publish(Message::BoardMouse { x: pos.x, y: pos.y, phase: ButtonPhase::Release }))
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &bool,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: iced::Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<iced::widget::canvas::Geometry> {
        let mut frame = iced::widget::canvas::Frame::new(renderer, bounds.size());
        let (w, h) = self.puzzle.board_size();
        frame.fill_rectangle(iced::Point::ORIGIN, iced::Size::new(w as f32, h as f32), iced::Color::WHITE);

        let mut drawing = FrameDrawing::new(&mut frame);
        self.puzzle.redraw(&mut drawing);

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(&self, _state: &bool, bounds: iced::Rectangle, cursor: iced::mouse::Cursor) -> iced::mouse::Interaction {
        if cursor.is_over(bounds) {
            iced::mouse::Interaction::Crosshair
        } else {
            iced::mouse::Interaction::default()
        }
    }
}
