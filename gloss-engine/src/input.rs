//! Loading documents from files and byte buffers

use crate::error::DocumentError;
use encoding_rs::Encoding;
use gloss_core::Document;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Document feature naming the source the text came from
pub const SOURCE_FEATURE: &str = "source";
/// Document feature naming the decoding used
pub const ENCODING_FEATURE: &str = "encoding";

/// Decodes raw input into [`Document`]s
#[derive(Debug, Clone, Copy)]
pub struct DocumentLoader {
    encoding: &'static Encoding,
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl DocumentLoader {
    /// Loader for a WHATWG encoding label such as `utf-8` or `latin1`
    pub fn new(label: &str) -> Result<Self, DocumentError> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| DocumentError::UnknownEncoding(label.to_string()))?;
        Ok(Self { encoding })
    }

    /// Name of the configured encoding
    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Resolve a plain path or `file://` URL to a path
    ///
    /// URLs are percent-decoded and may name no host or `localhost`; any
    /// other host or scheme is unsupported.
    pub fn resolve_source(source: &str) -> Result<PathBuf, DocumentError> {
        let unsupported = || DocumentError::UnsupportedSource(source.to_string());
        match source.split_once("://") {
            None => Ok(PathBuf::from(source)),
            Some((scheme, _)) if scheme.eq_ignore_ascii_case("file") => Url::parse(source)
                .map_err(|_| unsupported())?
                .to_file_path()
                .map_err(|()| unsupported()),
            Some(_) => Err(unsupported()),
        }
    }

    /// Load a document from a path or `file://` URL
    pub fn load_source(&self, source: &str) -> Result<Document, DocumentError> {
        let path = Self::resolve_source(source)?;
        self.load_path(&path)
    }

    /// Load a document from a file; its id is the file name
    pub fn load_path(&self, path: &Path) -> Result<Document, DocumentError> {
        let id = document_id(path);
        let bytes = fs::read(path).map_err(|source| DocumentError::Io {
            document: id.clone(),
            source,
        })?;

        let mut document = self.decode(id, &bytes)?;
        document.set_feature(SOURCE_FEATURE, path.display().to_string());
        Ok(document)
    }

    /// Decode bytes strictly; malformed sequences are an error, not replaced
    pub fn decode(&self, id: impl Into<String>, bytes: &[u8]) -> Result<Document, DocumentError> {
        let id = id.into();
        let (text, had_errors) = self.encoding.decode_with_bom_removal(bytes);
        if had_errors {
            return Err(DocumentError::Decode {
                document: id,
                encoding: self.encoding.name().to_string(),
            });
        }

        let mut document = Document::new(id, text.into_owned());
        document.set_feature(ENCODING_FEATURE, self.encoding.name());
        Ok(document)
    }
}

/// Identity of a document loaded from `path`
pub fn document_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
