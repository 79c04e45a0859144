//! Named textures loaded asynchronously.
//!
//! A [`TextureLoader`] asks its [`ImageSource`] for images by name and
//! uploads them once they arrive. Nothing blocks: a texture requested during
//! a render is simply unavailable until a later [`poll`](TextureLoader::poll)
//! or request finds its image decoded. Failed loads are logged, remembered
//! and never retried.

use std::collections::HashMap;
use std::task::Poll;

use prism_core::deferred::LoadHandle;

use crate::backend::{GraphicsContext, TextureId};
use crate::error::TextureError;

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes, rows top to bottom.
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Image filled with one color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba.repeat(width as usize * height as usize);
        Self::new(width, height, pixels)
    }
}

/// Where images come from: files, network, procedural generators.
///
/// Implementations resolve the returned handle when the image is decoded,
/// possibly from another thread.
pub trait ImageSource {
    fn load_image(&mut self, name: &str) -> LoadHandle<Result<ImageData, TextureError>>;
}

impl<F> ImageSource for F
where
    F: FnMut(&str) -> LoadHandle<Result<ImageData, TextureError>>,
{
    fn load_image(&mut self, name: &str) -> LoadHandle<Result<ImageData, TextureError>> {
        self(name)
    }
}

/// Load state of one named texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadStatus {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    Error,
}

#[derive(Debug)]
struct Entry {
    status: LoadStatus,
    pending: Option<LoadHandle<Result<ImageData, TextureError>>>,
    texture: Option<TextureId>,
    size: Option<(u32, u32)>,
    error: Option<TextureError>,
}

impl Entry {
    fn loading(handle: LoadHandle<Result<ImageData, TextureError>>) -> Self {
        Self {
            status: LoadStatus::Loading,
            pending: Some(handle),
            texture: None,
            size: None,
            error: None,
        }
    }

    /// Finish the load if its image has arrived. Returns `true` if the
    /// entry left the loading state.
    fn settle(&mut self, name: &str, ctx: &mut dyn GraphicsContext) -> bool {
        let Some(handle) = &self.pending else {
            return false;
        };
        let result = match handle.try_poll() {
            Poll::Pending => return false,
            Poll::Ready(Some(result)) => result,
            Poll::Ready(None) => Err(TextureError::Cancelled {
                name: name.to_string(),
            }),
        };
        self.pending = None;
        let uploaded = result.and_then(|image| {
            ctx.create_texture(&image)
                .map(|id| (id, (image.width, image.height)))
                .map_err(|err| TextureError::LoadFailed {
                    name: name.to_string(),
                    reason: err.to_string(),
                })
        });
        match uploaded {
            Ok((id, size)) => {
                log::debug!("Texture '{}' loaded ({}x{})", name, size.0, size.1);
                self.status = LoadStatus::Loaded;
                self.texture = Some(id);
                self.size = Some(size);
            }
            Err(err) => {
                log::warn!("Texture '{}' unavailable: {}", name, err);
                self.status = LoadStatus::Error;
                self.error = Some(err);
            }
        }
        true
    }
}

/// Loads named textures through an [`ImageSource`] and uploads them.
pub struct TextureLoader {
    source: Box<dyn ImageSource>,
    entries: HashMap<String, Entry>,
}

impl std::fmt::Debug for TextureLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureLoader")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl TextureLoader {
    pub fn new(source: impl ImageSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            entries: HashMap::new(),
        }
    }

    /// Start loading `name` unless it is already known.
    pub fn preload(&mut self, name: &str) {
        let source = &mut self.source;
        self.entries.entry(name.to_string()).or_insert_with(|| {
            log::debug!("Loading texture '{}'", name);
            Entry::loading(source.load_image(name))
        });
    }

    /// Texture for `name` if it is uploaded.
    ///
    /// The first request starts the load. A load that has already finished
    /// is uploaded on the spot, so images resolved synchronously are
    /// available immediately.
    pub fn request(&mut self, ctx: &mut dyn GraphicsContext, name: &str) -> Option<TextureId> {
        self.preload(name);
        let entry = self.entries.get_mut(name)?;
        if entry.status == LoadStatus::Loading {
            entry.settle(name, ctx);
        }
        entry.texture
    }

    /// Settle every finished load. Returns how many textures became
    /// available.
    pub fn poll(&mut self, ctx: &mut dyn GraphicsContext) -> usize {
        let mut loaded = 0;
        for (name, entry) in &mut self.entries {
            if entry.status == LoadStatus::Loading
                && entry.settle(name, ctx)
                && entry.status == LoadStatus::Loaded
            {
                loaded += 1;
            }
        }
        loaded
    }

    pub fn status(&self, name: &str) -> LoadStatus {
        self.entries
            .get(name)
            .map_or(LoadStatus::NotLoaded, |e| e.status)
    }

    pub fn texture(&self, name: &str) -> Option<TextureId> {
        self.entries.get(name).and_then(|e| e.texture)
    }

    /// Why `name` failed to load.
    pub fn error(&self, name: &str) -> Option<&TextureError> {
        self.entries.get(name).and_then(|e| e.error.as_ref())
    }

    /// Width and height of an uploaded texture.
    pub fn dimensions(&self, name: &str) -> Option<(u32, u32)> {
        self.entries.get(name).and_then(|e| e.size)
    }

    /// Number of loads still in flight.
    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.status == LoadStatus::Loading)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyContext;
    use prism_core::deferred::{Resolver, deferred, resolved};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Pending = Rc<RefCell<Vec<(String, Resolver<Result<ImageData, TextureError>>)>>>;

    /// Source whose loads finish when the test resolves them.
    fn manual_source() -> (impl ImageSource, Pending) {
        let pending: Pending = Rc::default();
        let queue = Rc::clone(&pending);
        let source = move |name: &str| {
            let (resolver, handle) = deferred();
            queue.borrow_mut().push((name.to_string(), resolver));
            handle
        };
        (source, pending)
    }

    #[test]
    fn load_completes_on_poll() {
        let mut ctx = DummyContext::new();
        let (source, pending) = manual_source();
        let mut loader = TextureLoader::new(source);

        assert_eq!(loader.request(&mut ctx, "bricks"), None);
        assert_eq!(loader.status("bricks"), LoadStatus::Loading);
        assert_eq!(loader.request(&mut ctx, "bricks"), None);
        assert_eq!(pending.borrow().len(), 1);

        let (_, resolver) = pending.borrow_mut().remove(0);
        resolver.resolve(Ok(ImageData::solid(4, 2, [255, 0, 0, 255])));
        assert_eq!(loader.poll(&mut ctx), 1);
        assert_eq!(loader.status("bricks"), LoadStatus::Loaded);
        assert_eq!(loader.dimensions("bricks"), Some((4, 2)));
        assert!(loader.request(&mut ctx, "bricks").is_some());
        assert_eq!(ctx.texture_count(), 1);
    }

    #[test]
    fn resolved_images_upload_immediately() {
        let mut ctx = DummyContext::new();
        let mut loader =
            TextureLoader::new(|_: &str| resolved(Ok(ImageData::solid(1, 1, [0; 4]))));
        assert!(loader.request(&mut ctx, "white").is_some());
        assert_eq!(loader.pending_count(), 0);
    }

    #[test]
    fn failures_are_remembered() {
        let mut ctx = DummyContext::new();
        let (source, pending) = manual_source();
        let mut loader = TextureLoader::new(source);
        loader.preload("missing");
        loader.preload("dropped");
        for (name, resolver) in pending.borrow_mut().drain(..) {
            if name == "missing" {
                resolver.reject(TextureError::LoadFailed {
                    name,
                    reason: "404".into(),
                });
            }
        }
        assert_eq!(loader.poll(&mut ctx), 0);
        assert_eq!(loader.status("missing"), LoadStatus::Error);
        assert!(matches!(
            loader.error("dropped"),
            Some(TextureError::Cancelled { .. })
        ));
        assert_eq!(loader.request(&mut ctx, "missing"), None);
        assert!(pending.borrow().is_empty());
    }

    #[test]
    fn bad_image_data_fails_upload() {
        let mut ctx = DummyContext::new();
        let short = |_: &str| resolved(Ok(ImageData::new(2, 2, vec![1])));
        let mut loader = TextureLoader::new(short);
        assert_eq!(loader.request(&mut ctx, "short"), None);
        assert!(matches!(
            loader.error("short"),
            Some(TextureError::LoadFailed { .. })
        ));
    }
}
