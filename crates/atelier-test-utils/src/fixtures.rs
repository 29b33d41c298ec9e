//! Image fixtures for tests.
//!
//! The core never decodes image content, so fixtures are short recognizable
//! byte patterns rather than real bitmaps.

use atelier_client::Sketch;

/// A small sketch payload with distinctive bytes.
pub fn sketch_fixture() -> Sketch {
    Sketch::new(b"png:sketch".to_vec(), 120, 80)
}

/// A result image payload with distinctive bytes.
pub fn result_fixture() -> Vec<u8> {
    b"png:result".to_vec()
}
