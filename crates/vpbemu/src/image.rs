use versatilepb_hw::memory_map::{image, ram};

/// Errors that can occur when placing a firmware image
#[derive(Debug, PartialEq, Eq)]
pub enum ImageError {
    /// The image contains no bytes
    Empty,
    /// The image does not fit in RAM at the requested load address
    TooLarge { load_address: u32, size: usize },
}

impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageError::Empty => write!(f, "image is empty"),
            ImageError::TooLarge { load_address, size } => write!(
                f,
                "image of {:#X} bytes at {:#X} does not fit in RAM ({:#X} bytes)",
                size,
                load_address,
                ram::SIZE
            ),
        }
    }
}

/// A raw binary firmware image and where it runs from
#[derive(Debug)]
pub struct Image<'a> {
    /// Image contents, copied verbatim into RAM
    pub data: &'a [u8],
    /// Physical address of the first image byte
    pub load_address: u32,
    /// Address execution starts at
    pub entry: u32,
}

impl<'a> Image<'a> {
    /// Place `data` at `load_address` (or the board's default), entering at
    /// `entry` (or the load address).
    pub fn new(
        data: &'a [u8],
        load_address: Option<u32>,
        entry: Option<u32>,
    ) -> Result<Self, ImageError> {
        if data.is_empty() {
            return Err(ImageError::Empty);
        }

        let load_address = load_address.unwrap_or(image::LOAD_ADDRESS);
        let ram_end = ram::BASE as u64 + ram::SIZE as u64;
        if load_address as u64 + data.len() as u64 > ram_end {
            return Err(ImageError::TooLarge {
                load_address,
                size: data.len(),
            });
        }

        Ok(Image {
            data,
            load_address,
            entry: entry.unwrap_or(load_address),
        })
    }

    /// One past the last image byte
    pub fn end(&self) -> u64 {
        self.load_address as u64 + self.data.len() as u64
    }
}
