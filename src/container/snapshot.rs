use base64::{Engine as _, engine::general_purpose::STANDARD};

/// A decoded snapshot image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// The image format.
    pub format: ImageFormat,
    /// The raw image bytes.
    pub bytes: Vec<u8>,
}

/// The image formats BCF allows for snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// `image/png`
    Png,
    /// `image/jpeg`
    Jpeg,
}

impl ImageFormat {
    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

/// A snapshot could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidImageData {
    /// There is no image data.
    #[error("snapshot image is empty")]
    Empty,

    /// The data URL is not of the form `data:<mime>;base64,<payload>`.
    #[error("snapshot is not a base64 data URL")]
    MalformedDataUrl,

    /// The data URL holds something other than a PNG or JPEG image.
    #[error("unsupported snapshot type '{0}', expected image/png or image/jpeg")]
    UnsupportedMime(String),

    /// The payload is not valid base64.
    #[error("snapshot is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Decodes a snapshot given as a `data:image/png;base64,...` URL.
///
/// A bare base64 payload without the `data:` prefix is accepted and taken to
/// be a PNG image.
///
/// # Errors
///
/// Returns [`InvalidImageData`] if the input is empty, malformed, of an
/// unsupported type, or not valid base64.
pub fn decode(data: &str) -> Result<Snapshot, InvalidImageData> {
    let data = data.trim();
    if data.is_empty() {
        return Err(InvalidImageData::Empty);
    }

    let (format, payload) = match data.strip_prefix("data:") {
        Some(url) => {
            let (header, payload) = url
                .split_once(',')
                .ok_or(InvalidImageData::MalformedDataUrl)?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or(InvalidImageData::MalformedDataUrl)?;
            let format = ImageFormat::from_mime(mime)
                .ok_or_else(|| InvalidImageData::UnsupportedMime(mime.to_string()))?;
            (format, payload)
        }
        None => (ImageFormat::Png, data),
    };

    let bytes = STANDARD.decode(payload)?;
    if bytes.is_empty() {
        return Err(InvalidImageData::Empty);
    }
    Ok(Snapshot { format, bytes })
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    const PIXEL: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn decodes_png_data_url() {
        let snapshot = decode(&format!("data:image/png;base64,{PIXEL}")).unwrap();

        assert_eq!(snapshot.format, ImageFormat::Png);
        assert_eq!(&snapshot.bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn decodes_jpeg_data_url() {
        let snapshot = decode("data:image/jpeg;base64,/9j/4AAQ").unwrap();
        assert_eq!(snapshot.format, ImageFormat::Jpeg);
    }

    #[test]
    fn bare_payload_is_png() {
        let snapshot = decode(PIXEL).unwrap();
        assert_eq!(snapshot.format, ImageFormat::Png);
    }

    #[test_case("" => InvalidImageData::Empty; "empty")]
    #[test_case("   " => InvalidImageData::Empty; "whitespace")]
    #[test_case("data:image/png;base64," => InvalidImageData::Empty; "empty payload")]
    #[test_case("data:image/png,AAAA" => InvalidImageData::MalformedDataUrl; "not base64 encoded")]
    #[test_case("data:image/png;base64" => InvalidImageData::MalformedDataUrl; "no payload")]
    #[test_case("data:image/gif;base64,R0lGOD" => InvalidImageData::UnsupportedMime("image/gif".into()); "gif")]
    fn rejects_invalid_data(data: &str) -> InvalidImageData {
        decode(data).unwrap_err()
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            decode("data:image/png;base64,not base64!"),
            Err(InvalidImageData::Base64(_))
        ));
    }
}
