/// Opaque provider-side identity of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
}

/// Which media types a sheet displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaTypeFilter {
    Image,
    Video,
    ImageAndVideo,
}

impl MediaTypeFilter {
    pub fn matches(self, media_type: MediaType) -> bool {
        match self {
            Self::Image => media_type == MediaType::Image,
            Self::Video => media_type == MediaType::Video,
            Self::ImageAndVideo => true,
        }
    }
}

/// A media asset as seen by the sheet: identity plus the attributes that drive geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRef {
    pub id: AssetId,
    /// Position in the displayable strip.
    pub index: usize,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub media_type: MediaType,
    pub is_burst: bool,
}

impl AssetRef {
    pub fn new(id: AssetId, index: usize, pixel_width: u32, pixel_height: u32) -> Self {
        Self {
            id,
            index,
            pixel_width,
            pixel_height,
            media_type: MediaType::Image,
            is_burst: false,
        }
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    pub fn with_burst(mut self, is_burst: bool) -> Self {
        self.is_burst = is_burst;
        self
    }

    /// Width over height. Zero for degenerate assets so they never pass the width filter.
    pub fn aspect_ratio(&self) -> f32 {
        if self.pixel_height == 0 {
            0.0
        } else {
            self.pixel_width as f32 / self.pixel_height as f32
        }
    }

    /// Short side over long side, independent of orientation.
    pub fn orientation_free_ratio(&self) -> Option<f32> {
        let long = self.pixel_width.max(self.pixel_height);
        let short = self.pixel_width.min(self.pixel_height);
        if short == 0 {
            None
        } else {
            Some(short as f32 / long as f32)
        }
    }

    pub fn is_video(&self) -> bool {
        self.media_type == MediaType::Video
    }
}

/// A width/height pair in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}
