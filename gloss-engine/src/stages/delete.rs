//! Clears previous annotations so a document can be reprocessed

use gloss_core::{Document, Stage, StageDescriptor, StageError};

/// Empties every annotation set except the ones it is told to keep
///
/// The only stage allowed to remove annotations it did not create.
#[derive(Debug, Clone)]
pub struct AnnotationDelete {
    descriptor: StageDescriptor,
    keep: Vec<String>,
}

impl AnnotationDelete {
    /// Stage name
    pub const NAME: &'static str = "annotation-delete";

    /// Keep the named sets, clear everything else
    pub fn new(keep: Vec<String>) -> Self {
        Self {
            descriptor: StageDescriptor::new(Self::NAME).resetting(),
            keep,
        }
    }

    /// Sets left untouched
    pub fn kept_sets(&self) -> &[String] {
        &self.keep
    }
}

impl Stage for AnnotationDelete {
    fn descriptor(&self) -> &StageDescriptor {
        &self.descriptor
    }

    fn run(&self, document: &mut Document) -> Result<(), StageError> {
        let before = document.annotation_summary().values().sum::<usize>();
        document.clear_annotations(&self.keep);
        let after = document.annotation_summary().values().sum::<usize>();
        log::trace!(
            "{}: removed {} annotations from '{}'",
            Self::NAME,
            before - after,
            document.id()
        );
        Ok(())
    }
}
