use thiserror::Error;

use crate::shared::frame::{Frame, FrameMetadata, ImageFormat, InvalidRotation, Rotation};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageBuildError {
    #[error("frame dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("{format:?} frame of {width}x{height} needs {expected} bytes, buffer has {actual}")]
    BufferSizeMismatch {
        format: ImageFormat,
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("{format:?} frame of {width}x{height} is too large to address")]
    DimensionsTooLarge {
        format: ImageFormat,
        width: u32,
        height: u32,
    },
    #[error(transparent)]
    InvalidRotation(#[from] InvalidRotation),
}

/// Detector input: a frame whose buffer has been checked against its metadata.
#[derive(Clone, Debug)]
pub struct VisionImage {
    data: Vec<u8>,
    format: ImageFormat,
    width: u32,
    height: u32,
    rotation: Rotation,
    frame_index: usize,
}

impl VisionImage {
    /// Takes ownership of the frame buffer. Fails when the metadata cannot
    /// describe a buffer of this length.
    pub fn from_frame(
        frame: Frame,
        metadata: &FrameMetadata,
        format: ImageFormat,
    ) -> Result<Self, ImageBuildError> {
        let FrameMetadata {
            width,
            height,
            rotation,
            ..
        } = *metadata;

        if width == 0 || height == 0 {
            return Err(ImageBuildError::ZeroDimension { width, height });
        }

        let expected = format
            .expected_len(width, height)
            .ok_or(ImageBuildError::DimensionsTooLarge {
                format,
                width,
                height,
            })?;
        if frame.len() != expected {
            return Err(ImageBuildError::BufferSizeMismatch {
                format,
                width,
                height,
                expected,
                actual: frame.len(),
            });
        }

        let frame_index = frame.index();
        Ok(Self {
            data: frame.into_data(),
            format,
            width,
            height,
            rotation,
            frame_index,
        })
    }

    /// Same as [`VisionImage::from_frame`] but with the rotation still in raw degrees.
    pub fn from_raw_rotation(
        frame: Frame,
        width: u32,
        height: u32,
        rotation_degrees: u32,
        format: ImageFormat,
    ) -> Result<Self, ImageBuildError> {
        let rotation = Rotation::try_from(rotation_degrees)?;
        let metadata = FrameMetadata {
            width,
            height,
            rotation,
            facing: Default::default(),
        };
        Self::from_frame(frame, &metadata, format)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::CameraFacing;
    use rstest::rstest;

    fn metadata(width: u32, height: u32) -> FrameMetadata {
        FrameMetadata::new(width, height, Rotation::Deg90, CameraFacing::Back)
    }

    #[test]
    fn test_builds_from_consistent_nv21_frame() {
        let frame = Frame::new(vec![1u8; 6], 3); // 2x2 NV21
        let image = VisionImage::from_frame(frame, &metadata(2, 2), ImageFormat::Nv21).unwrap();
        assert_eq!(image.width(), 2);
        assert_eq!(image.height(), 2);
        assert_eq!(image.rotation(), Rotation::Deg90);
        assert_eq!(image.format(), ImageFormat::Nv21);
        assert_eq!(image.frame_index(), 3);
        assert_eq!(image.data().len(), 6);
    }

    #[rstest]
    #[case(0, 2)]
    #[case(2, 0)]
    fn test_rejects_zero_dimension(#[case] width: u32, #[case] height: u32) {
        let frame = Frame::new(vec![], 0);
        let err = VisionImage::from_frame(frame, &metadata(width, height), ImageFormat::Nv21)
            .unwrap_err();
        assert_eq!(err, ImageBuildError::ZeroDimension { width, height });
    }

    #[test]
    fn test_rejects_buffer_length_mismatch() {
        let frame = Frame::new(vec![0u8; 10], 0);
        let err =
            VisionImage::from_frame(frame, &metadata(4, 4), ImageFormat::Nv21).unwrap_err();
        assert_eq!(
            err,
            ImageBuildError::BufferSizeMismatch {
                format: ImageFormat::Nv21,
                width: 4,
                height: 4,
                expected: 24,
                actual: 10,
            }
        );
    }

    #[test]
    fn test_rejects_dimensions_too_large_to_address() {
        let frame = Frame::new(vec![0u8; 12], 0);
        let err = VisionImage::from_frame(frame, &metadata(u32::MAX, u32::MAX), ImageFormat::Nv21)
            .unwrap_err();
        assert_eq!(
            err,
            ImageBuildError::DimensionsTooLarge {
                format: ImageFormat::Nv21,
                width: u32::MAX,
                height: u32::MAX,
            }
        );
    }

    #[test]
    fn test_raw_rotation_is_validated() {
        let frame = Frame::new(vec![0u8; 6], 0);
        let err = VisionImage::from_raw_rotation(frame, 2, 2, 45, ImageFormat::Nv21).unwrap_err();
        assert_eq!(err, ImageBuildError::InvalidRotation(InvalidRotation(45)));
    }

    #[test]
    fn test_raw_rotation_accepts_quarter_turns() {
        let frame = Frame::new(vec![0u8; 6], 0);
        let image = VisionImage::from_raw_rotation(frame, 2, 2, 180, ImageFormat::Nv21).unwrap();
        assert_eq!(image.rotation(), Rotation::Deg180);
    }
}
