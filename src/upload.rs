//! The cover-photo upload field.
//!
//! Sits between a file picker and the registration form. When the user picks
//! files, the first one is run through the [`ImageTransformPipeline`] and the
//! result replaces whatever the field was holding:
//!
//! - success: the transformed JPEG becomes the pending upload
//! - failure: the field is emptied, so the untransformed original can never
//!   be submitted
//!
//! Progress is reported as [`UploadEvent`]s over an optional channel, the
//! same way the CLI streams progress lines to a printer thread.

use crate::imaging::{ImageCodec, TargetSpec};
use crate::pipeline::{
    ImageTransformPipeline, TransformError, TransformedUpload, UploadCandidate,
};
use std::sync::mpsc::Sender;

/// Progress reported while a selection is processed.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    /// A file was picked and is being transformed.
    ProcessingStarted { name: String },
    /// The file was replaced by its `width × height` cover.
    Succeeded {
        name: String,
        width: u32,
        height: u32,
        bytes: u64,
    },
    /// The file was rejected and the field cleared.
    Failed { name: String, error: TransformError },
}

/// Holds at most one transformed upload awaiting form submission.
#[derive(Debug, Default)]
pub struct UploadField {
    pending: Option<TransformedUpload>,
    events: Option<Sender<UploadEvent>>,
}

impl UploadField {
    pub fn new(events: Option<Sender<UploadEvent>>) -> Self {
        Self {
            pending: None,
            events,
        }
    }

    /// The upload that would be submitted right now, if any.
    pub fn pending(&self) -> Option<&TransformedUpload> {
        self.pending.as_ref()
    }

    /// Remove the pending upload for submission.
    pub fn take(&mut self) -> Option<TransformedUpload> {
        self.pending.take()
    }

    /// Handle a file-picker selection.
    ///
    /// An empty selection leaves the field untouched. Otherwise only the first
    /// file is used; extra files are ignored. Selections are applied in the
    /// order they complete, so with overlapping calls the last one wins.
    pub async fn select<C: ImageCodec + 'static>(
        &mut self,
        files: Vec<UploadCandidate>,
        pipeline: &ImageTransformPipeline<C>,
        spec: &TargetSpec,
    ) -> Result<(), TransformError> {
        let Some(candidate) = files.into_iter().next() else {
            return Ok(());
        };
        let name = candidate.name.clone();
        self.emit(UploadEvent::ProcessingStarted { name: name.clone() });

        match pipeline.transform(candidate, spec).await {
            Ok(upload) => {
                self.emit(UploadEvent::Succeeded {
                    name,
                    width: upload.width,
                    height: upload.height,
                    bytes: upload.byte_length(),
                });
                self.pending = Some(upload);
                Ok(())
            }
            Err(error) => {
                log::warn!("rejected {}: {}", name, error);
                self.pending = None;
                self.emit(UploadEvent::Failed {
                    name,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    fn emit(&self, event: UploadEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is listening.
            let _ = tx.send(event);
        }
    }
}
