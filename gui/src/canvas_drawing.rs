//! An `iced` canvas adapter for [`puzzles::drawing::DrawingHandle`] (spec
//! §4.C): every primitive a back-end's `redraw` issues is translated
//! directly into a draw onto the live [`iced::widget::canvas::Frame`].
//!
//! Two calls are intentionally inert here. `save_blitter`/`load_blitter`
//! exist in the protocol so a back-end can snapshot the pixels under a
//! dragged piece and restore them without redrawing the whole board; this
//! adapter instead redraws the full board from scratch on every frame (the
//! board state is small and `iced`'s canvas is already immediate-mode), so
//! there is nothing to snapshot. `clip`/`unclip` are tracked on a stack for
//! protocol symmetry with [`puzzles::drawing::text::TextDrawing`] but are
//! not enforced geometrically, since nothing this crate draws yet reaches
//! outside its own board bounds.

use iced::widget::canvas::{self, Frame, Path, Stroke, Text};
use iced::{Color, Point as IcedPoint, Size};

use puzzles::drawing::{BlitterHandle, Colour, DrawingHandle, Font, Point, Rect, TextAlign};

use crate::theme::to_iced_color;

pub struct FrameDrawing<'a> {
    frame: &'a mut Frame,
    clip_stack: Vec<Rect>,
    next_blitter: u64,
}

impl<'a> FrameDrawing<'a> {
    pub fn new(frame: &'a mut Frame) -> Self {
        Self { frame, clip_stack: Vec::new(), next_blitter: 0 }
    }
}

fn to_point(p: Point) -> IcedPoint {
    IcedPoint::new(p.x, p.y)
}

fn to_colour(c: Colour) -> Color {
    to_iced_color(c)
}

fn to_alignment(align: TextAlign) -> iced::alignment::Horizontal {
    match align {
        TextAlign::Left => iced::alignment::Horizontal::Left,
        TextAlign::Centre => iced::alignment::Horizontal::Center,
        TextAlign::Right => iced::alignment::Horizontal::Right,
    }
}

impl<'a> DrawingHandle for FrameDrawing<'a> {
    fn start_draw(&mut self) {}

    fn end_draw(&mut self) {}

    fn clip(&mut self, rect: Rect) {
        self.clip_stack.push(rect);
    }

    fn unclip(&mut self) {
        self.clip_stack.pop();
    }

    fn draw_rect(&mut self, rect: Rect, colour: Colour, filled: bool) {
        let origin = IcedPoint::new(rect.x, rect.y);
        let size = Size::new(rect.w, rect.h);
        if filled {
            self.frame.fill_rectangle(origin, size, to_colour(colour));
        } else {
            let path = Path::rectangle(origin, size);
            self.frame.stroke(&path, Stroke::default().with_color(to_colour(colour)).with_width(1.0));
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, colour: Colour) {
        let path = Path::line(to_point(from), to_point(to));
        self.frame.stroke(&path, Stroke::default().with_color(to_colour(colour)).with_width(1.0));
    }

    fn draw_circle(&mut self, centre: Point, radius: f32, colour: Colour, filled: bool) {
        let path = Path::circle(to_point(centre), radius);
        if filled {
            self.frame.fill(&path, to_colour(colour));
        } else {
            self.frame.stroke(&path, Stroke::default().with_color(to_colour(colour)).with_width(1.0));
        }
    }

    fn draw_polygon(&mut self, points: &[Point], colour: Colour, filled: bool) {
        let Some((&first, rest)) = points.split_first() else { return };
        let path = Path::new(|builder| {
            builder.move_to(to_point(first));
            for &p in rest {
                builder.line_to(to_point(p));
            }
            builder.close();
        });
        if filled {
            self.frame.fill(&path, to_colour(colour));
        } else {
            self.frame.stroke(&path, Stroke::default().with_color(to_colour(colour)).with_width(1.0));
        }
    }

    fn draw_text(&mut self, x: f32, y: f32, _font: Font, size: f32, align: TextAlign, colour: Colour, text: &str) {
        self.frame.fill_text(Text {
            content: text.to_string(),
            position: IcedPoint::new(x, y),
            color: to_colour(colour),
            size: iced::Pixels(size),
            horizontal_alignment: to_alignment(align),
            vertical_alignment: iced::alignment::Vertical::Center,
            ..Text::default()
        });
    }

    fn draw_update(&mut self, _rect: Rect) {}

    fn status_bar(&mut self, _text: &str) {}

    fn save_blitter(&mut self, _rect: Rect) -> BlitterHandle {
        let handle = BlitterHandle(self.next_blitter);
        self.next_blitter += 1;
        handle
    }

    fn load_blitter(&mut self, _handle: BlitterHandle, _at: Point) {}
}
