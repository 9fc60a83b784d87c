//! Photo helpers: URL cleanup, Base64 data URLs, card images and the
//! preparation of photo lists before a create or update.

use std::io;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

use crate::api::{ApiClient, ApiError};
use crate::config::PhotoMode;
use crate::models::{Project, ProjectDraft};

const PLACEHOLDER_BASE: &str = "https://placehold.co/300x180/10b981/white?text=";

/// Normalize a photo URL coming from the listing webhook.
///
/// Trims, collapses whitespace runs into one space and repairs a scheme
/// broken by whitespace (`https:/ host` becomes `https://host`).
pub fn clean_image_url(url: &str) -> String {
    let collapsed = url.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut cleaned = String::with_capacity(collapsed.len());
    let mut rest = collapsed.as_str();
    while let Some(pos) = rest.find(":/ ") {
        let head = &rest[..pos];
        let scheme_start = if head.ends_with("https") {
            Some(pos - 5)
        } else if head.ends_with("http") {
            Some(pos - 4)
        } else {
            None
        };

        match scheme_start {
            Some(start) => {
                cleaned.push_str(&rest[..start]);
                cleaned.push_str("https://");
            }
            None => cleaned.push_str(&rest[..pos + 3]),
        }
        rest = &rest[pos + 3..];
    }
    cleaned.push_str(rest);

    cleaned
}

/// MIME type guessed from the file extension
pub fn mime_for_path(path: &Path) -> mime::Mime {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "svg" => mime::IMAGE_SVG,
        "bmp" => mime::IMAGE_BMP,
        "webp" => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// Read an image file into a `data:<mime>;base64,...` URL
pub async fn file_to_data_url(path: &Path) -> io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(format!(
        "data:{};base64,{}",
        mime_for_path(path),
        STANDARD.encode(bytes)
    ))
}

/// Hex SHA-256 of a string, used to name uploaded images
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Image shown on a project card: the first photo when it is a data URL or
/// an http(s) URL, otherwise a placeholder lettered with the project name.
pub fn card_image(project: &Project) -> String {
    if let Some(first) = project.photos.first() {
        if first.starts_with("data:image") || first.starts_with("http") {
            return first.clone();
        }
    }

    let letter = project
        .name
        .chars()
        .next()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "P".to_string());
    format!("{}{}", PLACEHOLDER_BASE, urlencoding::encode(&letter))
}

/// Step through `len` photos with wrap-around in both directions
pub fn cycle_index(current: usize, direction: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    (current as isize + direction).rem_euclid(len) as usize
}

/// Short label for a photo source that fits in a terminal line
pub fn describe_source(src: &str) -> String {
    if let Some(rest) = src.strip_prefix("data:") {
        if let Some((mime, payload)) = rest.split_once(";base64,") {
            let kib = (payload.len() * 3 / 4).div_ceil(1024);
            return format!("inline {} ({} KB)", mime, kib);
        }
        return "inline data".to_string();
    }
    src.to_string()
}

/// Photo list to send with a create or update.
///
/// New files replace the record's photos, either encoded inline or uploaded
/// to the image webhook. Without new files the kept existing photos go out
/// unchanged.
pub async fn prepare_photos(
    draft: &ProjectDraft,
    mode: PhotoMode,
    client: &ApiClient,
) -> Result<Vec<String>, ApiError> {
    if draft.new_files.is_empty() {
        return Ok(draft.existing_photos.clone());
    }

    let mut photos = Vec::with_capacity(draft.new_files.len());
    for path in &draft.new_files {
        let photo = match mode {
            PhotoMode::Inline => file_to_data_url(path).await?,
            PhotoMode::Upload => client.upload_image(path).await?,
        };
        photos.push(photo);
    }

    tracing::debug!(count = photos.len(), ?mode, "Prepared new photos");
    Ok(photos)
}
