//! External board editor export
//!
//! Builds the Lichess editor URL for a FEN and hands it to the system
//! browser.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

pub use chesseye_common::config::DEFAULT_EDITOR_BASE_URL;

/// Characters left unescaped: ASCII alphanumerics and `-_.!~*'()`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("FEN notation cannot be empty")]
    EmptyFen,

    #[error("Failed to open editor: {0}")]
    OpenFailed(String),
}

/// Editor URL for `fen`: `<base>/<percent-encoded trimmed FEN>`
///
/// # Examples
///
/// ```
/// use chesseye_client::editor_export::{generate_editor_url, DEFAULT_EDITOR_BASE_URL};
///
/// let url = generate_editor_url(DEFAULT_EDITOR_BASE_URL, "8/8/8/8/8/8/8/8 w - - 0 1").unwrap();
/// assert_eq!(url, "https://lichess.org/editor/8%2F8%2F8%2F8%2F8%2F8%2F8%2F8%20w%20-%20-%200%201");
/// ```
pub fn generate_editor_url(base_url: &str, fen: &str) -> Result<String, EditorError> {
    let fen = fen.trim();
    if fen.is_empty() {
        return Err(EditorError::EmptyFen);
    }

    Ok(format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        utf8_percent_encode(fen, URI_COMPONENT)
    ))
}

/// Loose check that a FEN has a placement with 8 ranks and a side to move
pub fn is_valid_fen_structure(fen: &str) -> bool {
    let mut parts = fen.split_whitespace();
    let position = match parts.next() {
        Some(position) => position,
        None => return false,
    };
    if parts.next().is_none() {
        return false;
    }
    position.split('/').count() == 8
}

/// Opens URLs outside the process
#[async_trait]
pub trait UrlOpener: Send + Sync {
    async fn open_url(&self, url: &str) -> Result<(), EditorError>;
}

/// Opens URLs in the desktop's default browser
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowserOpener;

#[async_trait]
impl UrlOpener for SystemBrowserOpener {
    async fn open_url(&self, url: &str) -> Result<(), EditorError> {
        let url = url.to_string();
        tokio::task::spawn_blocking(move || open::that(&url))
            .await
            .map_err(|e| EditorError::OpenFailed(e.to_string()))?
            .map_err(|e| EditorError::OpenFailed(e.to_string()))
    }
}

/// Open the editor for `fen` through `opener`
pub async fn open_editor<O>(opener: &O, base_url: &str, fen: &str) -> Result<String, EditorError>
where
    O: UrlOpener + ?Sized,
{
    let url = generate_editor_url(base_url, fen)?;

    match opener.open_url(&url).await {
        Ok(()) => {
            tracing::info!(fen = %fen.trim(), "Opened board editor");
            Ok(url)
        }
        Err(e) => {
            tracing::error!(error = %e, url = %url, "Failed to open board editor");
            Err(e)
        }
    }
}
