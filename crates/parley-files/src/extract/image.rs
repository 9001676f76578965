use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{In, Tag};
use image::{ColorType, ImageDecoder, ImageFormat, ImageReader};
use serde_json::{Map, Value, json};

use super::{ExtractedText, ExtractionError, FileKind};
use crate::attachment::Metadata;

/// EXIF fields worth describing, with the names they are reported under
const EXIF_FIELDS: &[(Tag, &str)] = &[
    (Tag::PixelXDimension, "ExifImageWidth"),
    (Tag::PixelYDimension, "ExifImageHeight"),
    (Tag::DateTime, "DateTime"),
    (Tag::Make, "Make"),
    (Tag::Model, "Model"),
];

/// Describe an image without OCR: format, dimensions, colour mode and a few EXIF fields
pub(super) fn extract(path: &Path, name: &str, _max_chars: usize) -> Result<ExtractedText, ExtractionError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format();

    let decoder = reader
        .into_decoder()
        .map_err(|e| ExtractionError::parse(FileKind::Image, e))?;
    let (width, height) = decoder.dimensions();
    let mode = color_mode(decoder.color_type());
    let format = format.map_or_else(|| "unknown".to_owned(), format_name);

    let exif = read_exif(path);

    let mut lines = vec![
        format!("Image: {name}"),
        format!("Format: {format}, Size: {width}x{height}, Mode: {mode}"),
    ];

    if !exif.is_empty() {
        let pairs: Vec<String> = exif
            .iter()
            .map(|(key, value)| format!("{key}={}", value.as_str().unwrap_or_default()))
            .collect();
        lines.push(format!("EXIF Data: {}", pairs.join(", ")));
    }

    let mut metadata = Metadata::new();
    metadata.insert("format".to_owned(), Value::from(format));
    metadata.insert("size".to_owned(), json!([width, height]));
    metadata.insert("mode".to_owned(), Value::from(mode));
    if !exif.is_empty() {
        metadata.insert("exif".to_owned(), Value::Object(exif));
    }

    Ok(ExtractedText {
        text: lines.join("\n"),
        metadata,
        truncated: false,
    })
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Png => "PNG".to_owned(),
        ImageFormat::Jpeg => "JPEG".to_owned(),
        ImageFormat::Gif => "GIF".to_owned(),
        ImageFormat::WebP => "WEBP".to_owned(),
        ImageFormat::Bmp => "BMP".to_owned(),
        other => format!("{other:?}").to_uppercase(),
    }
}

fn color_mode(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 | ColorType::L16 => "L",
        ColorType::La8 | ColorType::La16 => "LA",
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => "RGB",
        ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => "RGBA",
        _ => "unknown",
    }
}

/// Collect the known EXIF fields; images without EXIF yield an empty map
fn read_exif(path: &Path) -> Map<String, Value> {
    let mut fields = Map::new();

    let exif = match File::open(path)
        .map_err(exif::Error::Io)
        .and_then(|file| exif::Reader::new().read_from_container(&mut BufReader::new(file)))
    {
        Ok(exif) => exif,
        Err(e) => {
            tracing::debug!(error = %e, "no EXIF data");
            return fields;
        }
    };

    for (tag, key) in EXIF_FIELDS {
        let Some(field) = exif.get_field(*tag, In::PRIMARY) else {
            continue;
        };

        let value = field.display_value().to_string();
        let value = value.trim_matches('"').trim();
        if !value.is_empty() {
            fields.insert((*key).to_owned(), Value::from(value));
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use image::{GrayImage, RgbImage, RgbaImage};

    use super::*;

    #[test]
    fn png_is_described() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        RgbImage::new(4, 3).save(&path).unwrap();

        let extracted = extract(&path, "holiday.png", 10).unwrap();

        assert_eq!(extracted.text, "Image: holiday.png\nFormat: PNG, Size: 4x3, Mode: RGB");
        assert!(!extracted.truncated);
        assert_eq!(extracted.metadata["format"], "PNG");
        assert_eq!(extracted.metadata["size"], json!([4, 3]));
        assert_eq!(extracted.metadata["mode"], "RGB");
        assert!(!extracted.metadata.contains_key("exif"));
    }

    #[test]
    fn description_is_never_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alpha.png");
        RgbaImage::new(2, 2).save(&path).unwrap();

        let extracted = extract(&path, "a-rather-long-file-name.png", 1).unwrap();

        assert!(extracted.text.ends_with("Mode: RGBA"));
        assert!(!extracted.truncated);
    }

    #[test]
    fn grayscale_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        GrayImage::new(1, 1).save(&path).unwrap();

        let extracted = extract(&path, "gray.png", 10).unwrap();
        assert_eq!(extracted.metadata["mode"], "L");
    }

    #[test]
    fn corrupt_image_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\x89PNG\r\n\x1a\nnot really a png").unwrap();

        let err = extract(file.path(), "broken.png", 10).unwrap_err();
        assert!(matches!(err, ExtractionError::Parse { kind: FileKind::Image, .. }));
    }
}
