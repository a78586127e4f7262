//! Content Type Value Object
//!
//! The MIME allow-list for uploaded documents.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Pdf,
    Doc,
    Docx,
    Txt,
    Jpeg,
    Png,
}

impl ContentType {
    pub const ALL: [ContentType; 6] = [
        ContentType::Pdf,
        ContentType::Doc,
        ContentType::Docx,
        ContentType::Txt,
        ContentType::Jpeg,
        ContentType::Png,
    ];

    /// Parse a declared `Content-Type`.
    ///
    /// Parameters (`; charset=utf-8`) and letter case are ignored; anything
    /// outside the allow-list is `None`.
    pub fn from_mime(raw: &str) -> Option<Self> {
        let essence = raw.split(';').next().unwrap_or_default().trim();
        Self::ALL
            .into_iter()
            .find(|ct| ct.mime().eq_ignore_ascii_case(essence))
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Pdf => "application/pdf",
            ContentType::Doc => "application/msword",
            ContentType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ContentType::Txt => "text/plain",
            ContentType::Jpeg => "image/jpeg",
            ContentType::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ContentType::Pdf => ".pdf",
            ContentType::Doc => ".doc",
            ContentType::Docx => ".docx",
            ContentType::Txt => ".txt",
            ContentType::Jpeg => ".jpg",
            ContentType::Png => ".png",
        }
    }
}

/// Extensions reported to clients when a type is rejected, in allow-list order
pub fn allowed_extensions() -> String {
    ContentType::ALL
        .iter()
        .map(ContentType::extension)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}
