use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::ImageFormat;
use std::io::Read;

/// File extensions accepted by the uploader.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Read the whole stream and return it as standard base64.
pub fn encode_image<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(STANDARD.encode(&buffer))
}

/// Build a `data:` URI around already encoded content.
pub fn data_uri(mime_type: &str, base64_content: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_content)
}

/// Lower-cased extension of `file_name` if it is one the uploader accepts.
pub fn allowed_extension(file_name: &str) -> Option<String> {
    let (_, extension) = file_name.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();
    ALLOWED_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

/// MIME type for an image extension, used for the thumbnail.
pub fn mime_type_for_extension(extension: &str) -> &'static str {
    ImageFormat::from_extension(extension)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

/// Serde adapter carrying raw bytes as a base64 string inside the workflow context.
pub mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(D::Error::custom)
    }
}
