use zbus::zvariant::{StructureBuilder, Value};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("unsupported pixel layout ({bits_per_sample} bits per sample, {channels} channels, alpha: {has_alpha}), only 8-bit RGBA is supported")]
    UnsupportedLayout { bits_per_sample: i32, channels: i32, has_alpha: bool },
    #[error("invalid image size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
    #[error("row stride {rowstride} is too short for {width} RGBA pixels")]
    InvalidStride { width: i32, rowstride: i32 },
    #[error("pixel buffer holds {actual} bytes, but the image needs {expected}")]
    TruncatedData { expected: usize, actual: usize },
}

/// Raw pixel data for the `image-data` hint, in the `(iiibiiay)` layout of the
/// [specification](https://specifications.freedesktop.org/notification-spec/latest/icons-and-images.html#icons-and-images-formats).
///
/// Servers render this through gdk-pixbuf, so the only accepted layout is 8 bits per sample RGBA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    width: i32,
    height: i32,
    rowstride: i32,
    has_alpha: bool,
    bits_per_sample: i32,
    channels: i32,
    data: Vec<u8>,
}

impl ImageData {
    pub fn new(
        width: i32,
        height: i32,
        rowstride: i32,
        has_alpha: bool,
        bits_per_sample: i32,
        channels: i32,
        data: Vec<u8>,
    ) -> Result<Self, ImageError> {
        if bits_per_sample != 8 || channels != 4 || !has_alpha {
            return Err(ImageError::UnsupportedLayout { bits_per_sample, channels, has_alpha });
        }
        if width <= 0 || height <= 0 {
            return Err(ImageError::InvalidSize { width, height });
        }
        let row_len = width as usize * 4;
        if rowstride < 0 || (rowstride as usize) < row_len {
            return Err(ImageError::InvalidStride { width, rowstride });
        }
        // the last row doesn't need to be padded out to the full stride
        let expected = rowstride as usize * (height as usize - 1) + row_len;
        if data.len() < expected {
            return Err(ImageError::TruncatedData { expected, actual: data.len() });
        }

        Ok(Self { width, height, rowstride, has_alpha, bits_per_sample, channels, data })
    }

    /// Tightly packed RGBA pixels, row by row.
    pub fn from_rgba(width: i32, height: i32, data: Vec<u8>) -> Result<Self, ImageError> {
        Self::new(width, height, width.saturating_mul(4), true, 8, 4, data)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn rowstride(&self) -> i32 {
        self.rowstride
    }

    pub fn channels(&self) -> i32 {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn to_value(&self) -> Value<'static> {
        let structure = StructureBuilder::new()
            .add_field(self.width)
            .add_field(self.height)
            .add_field(self.rowstride)
            .add_field(self.has_alpha)
            .add_field(self.bits_per_sample)
            .add_field(self.channels)
            .add_field(self.data.clone())
            .build();
        Value::Structure(structure)
    }
}
