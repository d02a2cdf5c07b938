use serde::{Deserialize, Serialize};

/// A single captured camera frame: raw bytes in the camera's pixel format.
///
/// The frame does not know its own geometry; that travels alongside it as
/// [`FrameMetadata`] and is only checked against the buffer when the frame
/// is turned into a detector input.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, index: usize) -> Self {
        Self { data, index }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Pixel layouts a camera can deliver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Y plane followed by interleaved V/U samples at quarter resolution.
    #[default]
    Nv21,
}

impl ImageFormat {
    /// Number of bytes a `width` x `height` frame occupies in this format,
    /// or `None` if that does not fit in `usize`.
    pub fn expected_len(&self, width: u32, height: u32) -> Option<usize> {
        let w = width as usize;
        let h = height as usize;
        match self {
            ImageFormat::Nv21 => {
                let luma = w.checked_mul(h)?;
                let chroma = w.div_ceil(2).checked_mul(h.div_ceil(2))?;
                luma.checked_add(chroma.checked_mul(2)?)
            }
        }
    }
}

/// Clockwise rotation needed to bring a frame upright.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Whether the upright image has width and height swapped.
    pub fn is_transposed(&self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// Raised when a rotation is not a multiple of 90 degrees in `0..360`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("rotation must be one of 0, 90, 180 or 270 degrees, got {0}")]
pub struct InvalidRotation(pub u32);

impl TryFrom<u32> for Rotation {
    type Error = InvalidRotation;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(InvalidRotation(other)),
        }
    }
}

impl From<Rotation> for u32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    #[default]
    Back,
    Front,
}

impl std::fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraFacing::Back => write!(f, "back"),
            CameraFacing::Front => write!(f, "front"),
        }
    }
}

impl std::str::FromStr for CameraFacing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "back" => Ok(CameraFacing::Back),
            "front" => Ok(CameraFacing::Front),
            other => Err(format!("Camera facing must be 'back' or 'front', got '{other}'")),
        }
    }
}

/// Geometry of a frame as reported by the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameMetadata {
    pub width: u32,
    pub height: u32,
    pub rotation: Rotation,
    pub facing: CameraFacing,
}

impl FrameMetadata {
    pub fn new(width: u32, height: u32, rotation: Rotation, facing: CameraFacing) -> Self {
        Self {
            width,
            height,
            rotation,
            facing,
        }
    }

    /// Size of the frame once rotated upright, as `(width, height)`.
    pub fn upright_size(&self) -> (u32, u32) {
        if self.rotation.is_transposed() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}
