//! In-memory reel of this session's generated results.

/// Ordered list of the results produced this session, with a selection
/// index for browsing back and forth.
///
/// Process-local and never persisted; the durable archive is the history
/// store. Owned by the presentation layer's top-level state.
#[derive(Debug, Default)]
pub struct SessionGallery {
    images: Vec<Vec<u8>>,
    index: usize,
}

impl SessionGallery {
    /// Create an empty gallery.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result and select it.
    pub fn push(&mut self, image: Vec<u8>) {
        self.images.push(image);
        self.index = self.images.len() - 1;
    }

    /// Select an earlier or later result; out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.images.len() {
            self.index = index;
        }
    }

    /// The currently selected result, if any.
    pub fn current(&self) -> Option<&[u8]> {
        self.images.get(self.index).map(Vec::as_slice)
    }

    /// Index of the currently selected result.
    pub fn selected_index(&self) -> usize {
        self.index
    }

    /// Number of results this session.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether no generation has completed this session.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
