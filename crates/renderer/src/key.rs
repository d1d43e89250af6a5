//! Canonical fingerprints for render requests.

use crate::engine::RenderRequest;

/// Canonical cache key for a rendered frame.
///
/// Two value-equal requests always fingerprint identically: the key is
/// built from a fixed field order and the extent is quantized the same
/// way as [`radar_common::Extent::cache_key`]. Request fields that do not
/// affect the rendered pixels (resolution, pixel ratio, projection id —
/// all derivable from the extent and output size for a deployment) are
/// deliberately excluded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderKey {
    selection: String,
    time: String,
    extent: String,
    width: u32,
    height: u32,
}

impl RenderKey {
    pub fn from_request(request: &RenderRequest) -> Self {
        Self {
            selection: request.selection.clone(),
            time: request.time.clone(),
            extent: request.extent.cache_key(),
            width: request.width,
            height: request.height,
        }
    }

    /// Stable string form, usable as an external cache key.
    pub fn fingerprint(&self) -> String {
        format!(
            "{}|{}|{}|{}x{}",
            self.selection, self.time, self.extent, self.width, self.height
        )
    }
}
