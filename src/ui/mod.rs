pub mod shell;
pub mod style;
pub mod uploader;
pub mod viewer;
