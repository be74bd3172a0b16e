use serde::Serialize;

/// A playable HLS resource known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamEntry {
    /// Slug assigned by the backend (e.g. `cam1`), unique within a catalog.
    pub id: String,
    /// Absolute URL of the stream's `index.m3u8` playlist.
    pub playback_url: String,
    /// Alias the stream was started under, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Whether the backend reported the transcoder as running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running: Option<bool>,
}

impl StreamEntry {
    pub fn new(id: impl Into<String>, playback_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            playback_url: playback_url.into(),
            alias: None,
            running: None,
        }
    }

    /// Name to show in a list: the alias when present, else the id.
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.id)
    }
}

/// What the external player should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderTarget {
    /// Nothing selected; show a placeholder.
    Empty,
    /// Play the playlist at `url`.
    Playing { url: String },
}

impl RenderTarget {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Playing { url } => Some(url),
        }
    }
}

impl From<Option<&StreamEntry>> for RenderTarget {
    fn from(entry: Option<&StreamEntry>) -> Self {
        match entry {
            Some(entry) => Self::Playing {
                url: entry.playback_url.clone(),
            },
            None => Self::Empty,
        }
    }
}
