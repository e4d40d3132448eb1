mod folder_capture_source;

pub use folder_capture_source::FolderCaptureSource;
