//! File-dialog and filesystem tasks (spec §4.E save/load), run off the
//! render thread via `tokio`/`rfd` exactly as `tesuji::gui::io` does for
//! SGF files, generalized from UTF-8 text to the save format's raw bytes
//! (spec §6: AUXINFO payloads may be obfuscated binary).

use std::path::PathBuf;

use iced::Task;

use crate::app::Message;

const FILTER_NAME: &str = "Puzzle save";
const FILTER_EXTENSIONS: &[&str] = &["sav"];

pub fn open_file_task() -> Task<Message> {
    Task::perform(
        async {
            let handle = rfd::AsyncFileDialog::new().add_filter(FILTER_NAME, FILTER_EXTENSIONS).pick_file().await;

            match handle {
                None => None,
                Some(h) => {
                    let path = h.path().to_path_buf();
                    match tokio::fs::read(&path).await {
                        Ok(bytes) => Some(Ok((path, bytes))),
                        Err(e) => Some(Err(e.to_string())),
                    }
                }
            }
        },
        |result| match result {
            Some(r) => Message::FileOpened(r),
            None => Message::DismissStatus,
        },
    )
}

pub fn save_file_task(path: PathBuf, content: Vec<u8>) -> Task<Message> {
    Task::perform(async move { tokio::fs::write(&path, &content).await.map(|_| path).map_err(|e| e.to_string()) }, Message::FileSaved)
}

pub fn save_as_file_task(content: Vec<u8>) -> Task<Message> {
    Task::perform(
        async move {
            let handle = rfd::AsyncFileDialog::new().add_filter(FILTER_NAME, FILTER_EXTENSIONS).save_file().await;

            match handle {
                None => None,
                Some(h) => {
                    let path = h.path().to_path_buf();
                    match tokio::fs::write(&path, &content).await {
                        Ok(_) => Some(Ok(path)),
                        Err(e) => Some(Err(e.to_string())),
                    }
                }
            }
        },
        |result| match result {
            Some(r) => Message::FileSaved(r),
            None => Message::DismissStatus,
        },
    )
}
