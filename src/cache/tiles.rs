//! Global-id keyed cache of tile images for one render session

use std::collections::HashMap;

use crate::canvas::ImageView;

/// Untransformed tile images keyed by global tile id.
///
/// Entries are views into decoded images, so caching every tile of a sheet
/// costs one decoded image plus a few integers per tile.
#[derive(Debug, Default, Clone)]
pub struct TileImageCache {
    tiles: HashMap<u32, ImageView>,
}

impl TileImageCache {
    pub fn new() -> Self {
        Self { tiles: HashMap::new() }
    }

    pub fn get(&self, gid: u32) -> Option<&ImageView> {
        self.tiles.get(&gid)
    }

    /// Cache a tile image, replacing any previous entry for `gid`.
    pub fn insert(&mut self, gid: u32, view: ImageView) {
        self.tiles.insert(gid, view);
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Cached global ids in ascending order.
    pub fn gids(&self) -> Vec<u32> {
        let mut gids: Vec<u32> = self.tiles.keys().copied().collect();
        gids.sort_unstable();
        gids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::sync::Arc;

    #[test]
    fn test_insert_and_lookup() {
        let mut cache = TileImageCache::new();
        assert!(cache.is_empty());

        let view = ImageView::full(Arc::new(RgbaImage::new(2, 2)));
        cache.insert(7, view.clone());
        cache.insert(3, view);

        assert_eq!(cache.len(), 2);
        assert!(cache.get(4).is_none());
        assert_eq!(cache.get(3).map(|v| v.dimensions()), Some((2, 2)));
        assert_eq!(cache.gids(), vec![3, 7]);
    }
}
