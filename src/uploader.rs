//! Upload validation and the state behind the "Add story" dialog.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::story::MediaKind;

pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Size and type limits for new stories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    pub max_size_mb: u64,
    pub allowed_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size_mb: 10,
            allowed_types: vec![
                "image/jpeg".into(),
                "image/png".into(),
                "image/gif".into(),
                "video/mp4".into(),
            ],
        }
    }
}

impl UploadPolicy {
    pub fn max_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(BYTES_PER_MB)
    }

    pub fn allows(&self, mime: &str) -> bool {
        self.allowed_types.iter().any(|allowed| allowed == mime)
    }
}

/// A file the user picked or dropped, with its declared type and size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub uri: String,
    pub name: String,
    pub mime: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Invalid file type. Please upload an image or video.")]
    InvalidType { mime: String },
    #[error("File size must be less than {max_mb}MB")]
    TooLarge { size: u64, max_mb: u64 },
    #[error("Could not read the file: {0}")]
    Unreadable(String),
}

/// Check a candidate against the policy. Type is checked before size.
pub fn validate(
    candidate: &UploadCandidate,
    policy: &UploadPolicy,
) -> Result<MediaKind, UploadError> {
    if !policy.allows(&candidate.mime) {
        return Err(UploadError::InvalidType {
            mime: candidate.mime.clone(),
        });
    }
    if candidate.size > policy.max_bytes() {
        return Err(UploadError::TooLarge {
            size: candidate.size,
            max_mb: policy.max_size_mb,
        });
    }
    Ok(MediaKind::from_mime(&candidate.mime))
}

/// What the dialog shows for an accepted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub kind: MediaKind,
    pub uri: String,
}

type UploadCallback = Box<dyn Fn(&UploadCandidate)>;

/// One upload attempt: drag highlight, last error, preview, and the
/// callback that hands accepted files to the shell.
pub struct Uploader {
    policy: UploadPolicy,
    dragging: bool,
    preview: Option<Preview>,
    error: Option<UploadError>,
    on_upload: UploadCallback,
}

impl fmt::Debug for Uploader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uploader")
            .field("policy", &self.policy)
            .field("dragging", &self.dragging)
            .field("preview", &self.preview)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl Uploader {
    pub fn new(policy: UploadPolicy, on_upload: impl Fn(&UploadCandidate) + 'static) -> Self {
        Self {
            policy,
            dragging: false,
            preview: None,
            error: None,
            on_upload: Box::new(on_upload),
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn error(&self) -> Option<&UploadError> {
        self.error.as_ref()
    }

    /// Drag-enter and drag-over both land here.
    pub fn drag_enter(&mut self) {
        self.dragging = true;
    }

    pub fn drag_leave(&mut self) {
        self.dragging = false;
    }

    /// End of a drop. Only the first file is considered.
    pub fn take_dropped<T>(&mut self, files: impl IntoIterator<Item = T>) -> Option<T> {
        self.dragging = false;
        files.into_iter().next()
    }

    /// Validate a picked or dropped file. On success the preview is replaced
    /// and the upload callback runs; on failure only the error changes.
    pub fn submit(&mut self, candidate: UploadCandidate) -> Result<(), UploadError> {
        self.error = None;
        match validate(&candidate, &self.policy) {
            Ok(kind) => {
                log::info!(
                    "accepted upload {} ({}, {} bytes)",
                    candidate.name,
                    candidate.mime,
                    candidate.size
                );
                self.preview = Some(Preview {
                    kind,
                    uri: candidate.uri.clone(),
                });
                (self.on_upload)(&candidate);
                Ok(())
            }
            Err(err) => {
                log::info!("rejected upload {}: {err}", candidate.name);
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// The file could not even be inspected.
    pub fn reject(&mut self, err: UploadError) {
        self.error = Some(err);
    }

    /// "Remove" control on the preview.
    pub fn clear_preview(&mut self) {
        self.preview = None;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn candidate(name: &str, mime: &str, size: u64) -> UploadCandidate {
        UploadCandidate {
            uri: format!("file:///home/me/{name}"),
            name: name.into(),
            mime: mime.into(),
            size,
        }
    }

    fn recording_uploader(policy: UploadPolicy) -> (Uploader, Rc<RefCell<Vec<String>>>) {
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = received.clone();
        let uploader = Uploader::new(policy, move |c: &UploadCandidate| {
            sink.borrow_mut().push(c.name.clone())
        });
        (uploader, received)
    }

    #[test]
    fn default_policy() {
        let policy = UploadPolicy::default();
        assert_eq!(policy.max_bytes(), 10 * 1024 * 1024);
        assert!(policy.allows("image/gif"));
        assert!(policy.allows("video/mp4"));
        assert!(!policy.allows("video/webm"));
    }

    #[test]
    fn oversized_file_is_rejected_without_callback() {
        let (mut uploader, received) = recording_uploader(UploadPolicy::default());
        let err = uploader
            .submit(candidate("big.mp4", "video/mp4", 15 * BYTES_PER_MB))
            .unwrap_err();
        assert_eq!(err.to_string(), "File size must be less than 10MB");
        assert_eq!(uploader.error(), Some(&err));
        assert!(received.borrow().is_empty());
        assert!(uploader.preview().is_none());
    }

    #[test]
    fn disallowed_type_is_rejected_without_preview() {
        let (mut uploader, received) = recording_uploader(UploadPolicy::default());
        let err = uploader
            .submit(candidate("notes.pdf", "application/pdf", 1000))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid file type. Please upload an image or video."
        );
        assert!(uploader.preview().is_none());
        assert!(received.borrow().is_empty());
    }

    #[test]
    fn type_is_checked_before_size() {
        let policy = UploadPolicy::default();
        let err =
            validate(&candidate("huge.pdf", "application/pdf", u64::MAX), &policy).unwrap_err();
        assert!(matches!(err, UploadError::InvalidType { .. }));
    }

    #[test]
    fn exact_limit_is_accepted() {
        let policy = UploadPolicy {
            max_size_mb: 2,
            ..UploadPolicy::default()
        };
        assert_eq!(
            validate(&candidate("a.png", "image/png", 2 * BYTES_PER_MB), &policy),
            Ok(MediaKind::Image)
        );
        let over = candidate("a.png", "image/png", 2 * BYTES_PER_MB + 1);
        assert!(validate(&over, &policy).is_err());
    }

    #[test]
    fn accepted_file_sets_preview_and_invokes_callback() {
        let (mut uploader, received) = recording_uploader(UploadPolicy::default());
        uploader
            .submit(candidate("clip.mp4", "video/mp4", 3 * BYTES_PER_MB))
            .unwrap();
        assert_eq!(received.borrow().as_slice(), ["clip.mp4"]);
        let preview = uploader.preview().unwrap();
        assert_eq!(preview.kind, MediaKind::Video);
        assert_eq!(preview.uri, "file:///home/me/clip.mp4");
        assert!(uploader.error().is_none());
    }

    #[test]
    fn rejection_keeps_existing_preview() {
        let (mut uploader, received) = recording_uploader(UploadPolicy::default());
        uploader.submit(candidate("cat.jpg", "image/jpeg", 1000)).unwrap();
        let before = uploader.preview().cloned();

        assert!(uploader.submit(candidate("doc.txt", "text/plain", 10)).is_err());
        assert!(uploader
            .submit(candidate("big.png", "image/png", 11 * BYTES_PER_MB))
            .is_err());

        assert_eq!(uploader.preview().cloned(), before);
        assert_eq!(received.borrow().len(), 1);
    }

    #[test]
    fn next_attempt_clears_previous_error() {
        let (mut uploader, _) = recording_uploader(UploadPolicy::default());
        assert!(uploader.submit(candidate("doc.txt", "text/plain", 10)).is_err());
        assert!(uploader.error().is_some());
        uploader.submit(candidate("ok.png", "image/png", 10)).unwrap();
        assert!(uploader.error().is_none());
    }

    #[test]
    fn drag_flag_follows_enter_leave_and_drop() {
        let (mut uploader, _) = recording_uploader(UploadPolicy::default());
        uploader.drag_enter();
        assert!(uploader.is_dragging());
        uploader.drag_leave();
        assert!(!uploader.is_dragging());

        uploader.drag_enter();
        let first = uploader.take_dropped(vec!["first", "second"]);
        assert_eq!(first, Some("first"));
        assert!(!uploader.is_dragging());

        uploader.drag_enter();
        assert_eq!(uploader.take_dropped(Vec::<&str>::new()), None);
        assert!(!uploader.is_dragging());
    }

    #[test]
    fn clear_preview_allows_another_pick() {
        let (mut uploader, _) = recording_uploader(UploadPolicy::default());
        uploader.submit(candidate("a.gif", "image/gif", 10)).unwrap();
        uploader.clear_preview();
        assert!(uploader.preview().is_none());
    }

    #[test]
    fn policy_overrides_from_json() {
        let policy: UploadPolicy = serde_json::from_str(r#"{"max_size_mb": 25}"#).unwrap();
        assert_eq!(policy.max_size_mb, 25);
        assert_eq!(policy.allowed_types, UploadPolicy::default().allowed_types);
    }
}
