//! Online texture acquisition
//!
//! Objects can reference textures by URL. Downloads run on detached worker
//! threads and report back over a channel; the render thread owns all
//! texture state and applies completions in [`TextureStore::poll`], so the
//! backend is never touched off-thread. Failed downloads bind the backend's
//! error placeholder under the same identifier and record why.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::mpsc;
use std::sync::Arc;

use image::AnimationDecoder;
use thiserror::Error;

use crate::render::api::{AnimatedTexture, RenderBackend, TextureFrame, TextureImage};

/// Attempts made before giving up on a flaky connection
pub const MAX_FETCH_ATTEMPTS: u32 = 10;

/// Why a texture download failed
#[derive(Debug, Clone, Error)]
pub enum TextureFetchError {
    /// The URL could not be reached. Transient; retried.
    #[error("could not connect to URL: {0}")]
    Connection(String),

    /// The server answered with a non-success status.
    #[error("got error code {0} from the URL")]
    Status(u16),

    /// The URL resolved to something that is not an image.
    #[error("URL is not an image, got content type {0}")]
    NotAnImage(String),

    /// The image data could not be decoded.
    #[error("could not parse image data: {0}")]
    Decode(String),
}

impl TextureFetchError {
    /// Whether retrying the download could help.
    pub fn is_transient(&self) -> bool {
        matches!(self, TextureFetchError::Connection(_))
    }
}

impl From<image::ImageError> for TextureFetchError {
    fn from(error: image::ImageError) -> Self {
        TextureFetchError::Decode(error.to_string())
    }
}

/// A successfully downloaded and decoded texture
#[derive(Debug, Clone)]
pub enum FetchedTexture {
    /// A single still image
    Still(TextureImage),
    /// An animated GIF frame sequence
    Animated(AnimatedTexture),
}

/// Download-and-decode behavior, separable from the HTTP stack for tests.
pub trait TextureFetcher: Send + Sync {
    /// Fetch and decode the image at `url`.
    fn fetch(&self, url: &str) -> Result<FetchedTexture, TextureFetchError>;
}

/// Real fetcher backed by a blocking HTTP client.
pub struct HttpTextureFetcher {
    client: reqwest::blocking::Client,
}

impl HttpTextureFetcher {
    /// Create a fetcher with a fresh HTTP client.
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for HttpTextureFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureFetcher for HttpTextureFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedTexture, TextureFetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|error| TextureFetchError::Connection(error.to_string()))?;
        if !response.status().is_success() {
            return Err(TextureFetchError::Status(response.status().as_u16()));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(TextureFetchError::NotAnImage(content_type));
        }
        let bytes = response
            .bytes()
            .map_err(|error| TextureFetchError::Connection(error.to_string()))?;
        decode_image(&bytes, &content_type)
    }
}

/// Decode downloaded bytes into a still or animated texture.
pub fn decode_image(bytes: &[u8], content_type: &str) -> Result<FetchedTexture, TextureFetchError> {
    if content_type == "image/gif" {
        let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(bytes))?;
        let mut frames = Vec::new();
        for frame in decoder.into_frames() {
            let frame = frame?;
            let (numerator, denominator) = frame.delay().numer_denom_ms();
            let delay_ms = numerator / denominator.max(1);
            let buffer = frame.into_buffer();
            frames.push(TextureFrame {
                image: TextureImage {
                    width: buffer.width(),
                    height: buffer.height(),
                    data: buffer.into_raw(),
                },
                delay_ms,
            });
        }
        if frames.is_empty() {
            return Err(TextureFetchError::Decode("GIF has no frames".to_string()));
        }
        Ok(FetchedTexture::Animated(AnimatedTexture { frames }))
    } else {
        let decoded = image::load_from_memory(bytes)?.to_rgba8();
        Ok(FetchedTexture::Still(TextureImage {
            width: decoded.width(),
            height: decoded.height(),
            data: decoded.into_raw(),
        }))
    }
}

/// Run one download to completion, retrying transient failures.
///
/// Connection errors retry up to [`MAX_FETCH_ATTEMPTS`]; anything the
/// server or decoder rejected outright fails immediately, since retrying
/// would get the same answer.
pub fn run_download(
    fetcher: &dyn TextureFetcher,
    url: &str,
) -> Result<FetchedTexture, TextureFetchError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match fetcher.fetch(url) {
            Ok(texture) => return Ok(texture),
            Err(error) if error.is_transient() && attempt < MAX_FETCH_ATTEMPTS => {
                log::warn!("Texture fetch attempt {attempt} for {url} failed: {error}");
            }
            Err(error) => return Err(error),
        }
    }
}

/// Lifecycle of one requested texture
#[derive(Debug, Clone)]
pub enum TextureState {
    /// A worker is still downloading it
    InFlight,
    /// Downloaded and bound in the backend
    Downloaded,
    /// Download failed; the error placeholder is bound instead
    Errored(String),
}

struct Completion {
    identifier: String,
    result: Result<FetchedTexture, TextureFetchError>,
}

/// Render-thread owner of online texture state.
///
/// All state lives here; worker threads only send completions back through
/// the channel. Call [`TextureStore::poll`] once per frame before drawing.
pub struct TextureStore {
    fetcher: Arc<dyn TextureFetcher>,
    states: HashMap<String, TextureState>,
    sender: mpsc::Sender<Completion>,
    receiver: mpsc::Receiver<Completion>,
}

impl TextureStore {
    /// Create a store that downloads through the given fetcher.
    pub fn new(fetcher: Arc<dyn TextureFetcher>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            fetcher,
            states: HashMap::new(),
            sender,
            receiver,
        }
    }

    /// Current state of an identifier, if it was ever requested.
    pub fn state(&self, identifier: &str) -> Option<&TextureState> {
        self.states.get(identifier)
    }

    /// Whether the identifier resolves to a bound texture (real or error
    /// placeholder) and is safe to draw with.
    pub fn is_bound(&self, identifier: &str) -> bool {
        matches!(
            self.states.get(identifier),
            Some(TextureState::Downloaded) | Some(TextureState::Errored(_))
        )
    }

    /// Start downloading an identifier if it is not already known.
    pub fn request(&mut self, identifier: &str) {
        if self.states.contains_key(identifier) {
            return;
        }
        self.states
            .insert(identifier.to_string(), TextureState::InFlight);
        let fetcher = self.fetcher.clone();
        let sender = self.sender.clone();
        let url = identifier.to_string();
        std::thread::spawn(move || {
            let result = run_download(fetcher.as_ref(), &url);
            // The store may be gone by the time a slow download finishes.
            let _ = sender.send(Completion {
                identifier: url,
                result,
            });
        });
    }

    /// Apply finished downloads: bind textures into the backend and update
    /// states.
    pub fn poll(&mut self, backend: &mut dyn RenderBackend) {
        while let Ok(completion) = self.receiver.try_recv() {
            let state = match completion.result {
                Ok(FetchedTexture::Still(image)) => {
                    if backend.bind_texture(&completion.identifier, Some(&image)) {
                        TextureState::Downloaded
                    } else {
                        backend.bind_texture(&completion.identifier, None);
                        TextureState::Errored("backend rejected texture data".to_string())
                    }
                }
                Ok(FetchedTexture::Animated(frames)) => {
                    if backend.bind_animated_texture(&completion.identifier, &frames) {
                        TextureState::Downloaded
                    } else {
                        backend.bind_texture(&completion.identifier, None);
                        TextureState::Errored("backend rejected texture data".to_string())
                    }
                }
                Err(error) => {
                    log::error!(
                        "Texture download for {} failed: {error}",
                        completion.identifier
                    );
                    backend.bind_texture(&completion.identifier, None);
                    TextureState::Errored(error.to_string())
                }
            };
            self.states.insert(completion.identifier, state);
        }
    }
}
