//! The Proxy Engine - Lazy Image Loading
//!
//! [`ImageProxy`] stands in for a [`RealImage`] whose construction is the
//! expensive part. The real image is built on the first `display`, cached in
//! the proxy, and reused for the proxy's lifetime. Metadata reads never
//! trigger the load.

use rand::Rng;
use std::cell::OnceCell;
use std::fmt;
use tracing::debug;

/// Capability shared by the real image and its proxy.
pub trait Image {
    fn display(&self) -> String;

    /// Size in bytes; 0 for a proxy whose image is not loaded yet.
    fn size(&self) -> u64;
}

/// The heavy resource. Creating one is the only place loading happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealImage {
    filename: String,
    size: u64,
}

impl RealImage {
    /// Loads `filename` with a random size between 1000 and 5999 bytes.
    pub fn load(filename: &str) -> Self {
        let size = rand::thread_rng().gen_range(1000..6000);
        Self::load_with_size(filename, size)
    }

    fn load_with_size(filename: &str, size: u64) -> Self {
        debug!("Loading {} from disk ({} bytes)", filename, size);
        Self {
            filename: filename.to_string(),
            size,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl Image for RealImage {
    fn display(&self) -> String {
        format!("Displaying {}", self.filename)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

type SizeSource = Box<dyn Fn(&str) -> u64>;

/// Defers creating a [`RealImage`] until it is first displayed.
pub struct ImageProxy {
    filename: String,
    real: OnceCell<RealImage>,
    size_source: Option<SizeSource>,
}

impl ImageProxy {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            real: OnceCell::new(),
            size_source: None,
        }
    }

    /// Creates a proxy whose image size comes from `source` instead of the
    /// thread RNG. Used for reproducible runs.
    pub fn with_size_source<F>(filename: impl Into<String>, source: F) -> Self
    where
        F: Fn(&str) -> u64 + 'static,
    {
        Self {
            filename: filename.into(),
            real: OnceCell::new(),
            size_source: Some(Box::new(source)),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn is_loaded(&self) -> bool {
        self.real.get().is_some()
    }

    fn real_image(&self) -> &RealImage {
        self.real.get_or_init(|| match &self.size_source {
            Some(source) => RealImage::load_with_size(&self.filename, source(&self.filename)),
            None => RealImage::load(&self.filename),
        })
    }
}

impl Image for ImageProxy {
    fn display(&self) -> String {
        self.real_image().display()
    }

    fn size(&self) -> u64 {
        self.real.get().map_or(0, |image| image.size())
    }
}

impl fmt::Debug for ImageProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageProxy")
            .field("filename", &self.filename)
            .field("real", &self.real.get())
            .finish()
    }
}
