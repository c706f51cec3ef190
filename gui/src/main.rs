fn main() -> iced::Result {
    iced::application(puzzles_gui::GuiApp::new, puzzles_gui::GuiApp::update, puzzles_gui::GuiApp::view)
        .title("Puzzles")
        .run()
}
