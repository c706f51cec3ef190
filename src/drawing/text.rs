//! A headless [`DrawingHandle`] double: records every call instead of
//! rendering, and exposes the union of all `draw_update` rectangles so
//! tests (and the CLI front end, which has no pixel surface at all) can
//! assert a back-end redrew what it claimed to.

use super::{BlitterHandle, Colour, DrawingHandle, Font, Point, Rect, TextAlign};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    StartDraw,
    EndDraw,
    Clip(Rect),
    Unclip,
    Rect(Rect, Colour, bool),
    Line(Point, Point, Colour),
    Circle(Point, f32, Colour, bool),
    Polygon(Vec<Point>, Colour, bool),
    Text(String),
    Update(Rect),
    StatusBar(String),
    SaveBlitter(Rect, BlitterHandle),
    LoadBlitter(BlitterHandle, Point),
}

#[derive(Default)]
pub struct TextDrawing {
    pub calls: Vec<DrawCall>,
    pub status: Option<String>,
    next_blitter: u64,
}

impl TextDrawing {
    pub fn new() -> Self {
        Self::default()
    }

    /// The union of every rectangle passed to `draw_update` since the
    /// last [`clear`](Self::clear), or `None` if nothing was updated.
    pub fn updated_region(&self) -> Option<Rect> {
        self.calls.iter().fold(None, |acc, call| match call {
            DrawCall::Update(r) => Some(match acc {
                Some(a) => a.union(r),
                None => *r,
            }),
            _ => acc,
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl DrawingHandle for TextDrawing {
    fn start_draw(&mut self) {
        self.calls.push(DrawCall::StartDraw);
    }

    fn end_draw(&mut self) {
        self.calls.push(DrawCall::EndDraw);
    }

    fn clip(&mut self, rect: Rect) {
        self.calls.push(DrawCall::Clip(rect));
    }

    fn unclip(&mut self) {
        self.calls.push(DrawCall::Unclip);
    }

    fn draw_rect(&mut self, rect: Rect, colour: Colour, filled: bool) {
        self.calls.push(DrawCall::Rect(rect, colour, filled));
    }

    fn draw_line(&mut self, from: Point, to: Point, colour: Colour) {
        self.calls.push(DrawCall::Line(from, to, colour));
    }

    fn draw_circle(&mut self, centre: Point, radius: f32, colour: Colour, filled: bool) {
        self.calls.push(DrawCall::Circle(centre, radius, colour, filled));
    }

    fn draw_polygon(&mut self, points: &[Point], colour: Colour, filled: bool) {
        self.calls.push(DrawCall::Polygon(points.to_vec(), colour, filled));
    }

    fn draw_text(&mut self, _x: f32, _y: f32, _font: Font, _size: f32, _align: TextAlign, _colour: Colour, text: &str) {
        self.calls.push(DrawCall::Text(text.to_string()));
    }

    fn draw_update(&mut self, rect: Rect) {
        self.calls.push(DrawCall::Update(rect));
    }

    fn status_bar(&mut self, text: &str) {
        self.status = Some(text.to_string());
        self.calls.push(DrawCall::StatusBar(text.to_string()));
    }

    fn save_blitter(&mut self, rect: Rect) -> BlitterHandle {
        let handle = BlitterHandle(self.next_blitter);
        self.next_blitter += 1;
        self.calls.push(DrawCall::SaveBlitter(rect, handle));
        handle
    }

    fn load_blitter(&mut self, handle: BlitterHandle, at: Point) {
        self.calls.push(DrawCall::LoadBlitter(handle, at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updated_region_is_the_union_of_updates() {
        let mut d = TextDrawing::new();
        d.start_draw();
        d.draw_update(Rect::new(0.0, 0.0, 10.0, 10.0));
        d.draw_update(Rect::new(20.0, 20.0, 5.0, 5.0));
        d.end_draw();
        let region = d.updated_region().unwrap();
        assert_eq!(region, Rect::new(0.0, 0.0, 25.0, 25.0));
    }

    #[test]
    fn no_updates_means_none() {
        let d = TextDrawing::new();
        assert!(d.updated_region().is_none());
    }
}
