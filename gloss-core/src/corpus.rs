//! Ordered collections of documents

use crate::document::Document;

/// Documents currently loaded for processing
#[derive(Debug, Default)]
pub struct Corpus {
    name: String,
    documents: Vec<Document>,
}

impl Corpus {
    /// Create an empty corpus
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Vec::new(),
        }
    }

    /// A corpus holding exactly one document
    pub fn single(document: Document) -> Self {
        Self {
            name: document.id().to_string(),
            documents: vec![document],
        }
    }

    /// Corpus name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a document
    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True when empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in order
    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    /// Documents in order, mutably
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Document> {
        self.documents.iter_mut()
    }

    /// Release the corpus and hand back its documents
    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
