//! Pipeline collaborators: where images come from and where names go

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Supplies the bytes of a captured image
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn read_image(&self) -> std::io::Result<Vec<u8>>;
}

/// Presents a resolved name to the user
///
/// May be called zero or more times per run.
pub trait ResultSink: Send + Sync {
    fn present(&self, text: &str);
}

/// Image stored on disk
#[derive(Debug, Clone)]
pub struct FileImageSource {
    path: PathBuf,
}

impl FileImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ImageSource for FileImageSource {
    async fn read_image(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

/// In-memory image, mostly for tests and piping
#[async_trait]
impl ImageSource for Vec<u8> {
    async fn read_image(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.clone())
    }
}

/// Prints each name on its own line
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ResultSink for ConsoleSink {
    fn present(&self, text: &str) {
        println!("{}", text);
    }
}

/// Single display surface: the most recent name wins
///
/// Clones share the same surface.
#[derive(Debug, Default, Clone)]
pub struct LatestValueSink {
    current: Arc<Mutex<Option<String>>>,
    updates: Arc<Mutex<Vec<String>>>,
}

impl LatestValueSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// What the surface shows now
    pub fn current(&self) -> Option<String> {
        self.current.lock().ok().and_then(|c| c.clone())
    }

    /// Every value presented so far, oldest first
    pub fn history(&self) -> Vec<String> {
        self.updates.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

impl ResultSink for LatestValueSink {
    fn present(&self, text: &str) {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(text.to_string());
        }
        if let Ok(mut updates) = self.updates.lock() {
            updates.push(text.to_string());
        }
    }
}

impl<T: ResultSink + ?Sized> ResultSink for Arc<T> {
    fn present(&self, text: &str) {
        (**self).present(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_value_sink_last_write_wins() {
        let sink = LatestValueSink::new();
        assert_eq!(sink.current(), None);

        sink.present("Alice");
        sink.present("Bob");

        assert_eq!(sink.current().as_deref(), Some("Bob"));
        assert_eq!(sink.history(), vec!["Alice".to_string(), "Bob".to_string()]);
    }

    #[test]
    fn test_latest_value_sink_clones_share_surface() {
        let sink = LatestValueSink::new();
        let view = sink.clone();

        sink.present("Alice");
        assert_eq!(view.current().as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_missing_file_source_errors() {
        let source = FileImageSource::new("/nonexistent/facetag/capture.jpg");
        assert!(source.read_image().await.is_err());
    }
}
