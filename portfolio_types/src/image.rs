use serde::{Deserialize, Serialize};

const DATA_URL_PREFIX: &str = "data:";

/// A reference to one image attached to a catalog entry
///
/// On the wire this is a plain string: either a self-contained `data:` URL holding the
/// base64 payload, or the URL an external image host handed back after an upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageRef {
    Embedded(String),
    External(String),
}

impl ImageRef {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Embedded(s) | Self::External(s) => s,
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(_))
    }

    /// The MIME type declared by an embedded payload, e.g. `image/jpeg`
    pub fn media_type(&self) -> Option<&str> {
        match self {
            Self::Embedded(s) => s
                .strip_prefix(DATA_URL_PREFIX)
                .and_then(|rest| rest.split([';', ',']).next())
                .filter(|mt| !mt.is_empty()),
            Self::External(_) => None,
        }
    }
}

impl From<String> for ImageRef {
    fn from(value: String) -> Self {
        if value.starts_with(DATA_URL_PREFIX) {
            Self::Embedded(value)
        } else {
            Self::External(value)
        }
    }
}

impl From<ImageRef> for String {
    fn from(value: ImageRef) -> Self {
        match value {
            ImageRef::Embedded(s) | ImageRef::External(s) => s,
        }
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // payloads run to hundreds of kilobytes
            Self::Embedded(s) => write!(
                f,
                "<embedded {} image, {} bytes>",
                self.media_type().unwrap_or("unknown"),
                s.len()
            ),
            Self::External(url) => f.write_str(url),
        }
    }
}
