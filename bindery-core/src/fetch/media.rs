//! Media type resolution

/// Path part of a URL or local path, without query or fragment
fn path_of(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];
    path.strip_prefix("file://").unwrap_or(path)
}

/// Media type from the declared content type, else from the extension
pub fn media_type_for(url: &str, declared: Option<&str>) -> String {
    declared
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
        .unwrap_or_else(|| guess_from_path(url))
}

fn guess_from_path(url: &str) -> String {
    mime_guess::from_path(path_of(url))
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// File extension for an embedded copy
pub fn extension_for(url: &str, media_type: Option<&str>) -> String {
    let known = match media_type {
        Some("image/jpeg") => Some("jpg"),
        Some("image/png") => Some("png"),
        Some("image/gif") => Some("gif"),
        Some("image/svg+xml") => Some("svg"),
        Some("image/webp") => Some("webp"),
        Some("font/ttf") | Some("application/x-font-ttf") => Some("ttf"),
        Some("font/otf") | Some("application/vnd.ms-opentype") => Some("otf"),
        Some("font/woff") | Some("application/font-woff") => Some("woff"),
        Some("font/woff2") => Some("woff2"),
        _ => None,
    };
    if let Some(ext) = known {
        return ext.to_string();
    }

    let from_path = path_of(url)
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    if let Some(ext) = from_path {
        return ext;
    }

    media_type
        .and_then(mime_guess::get_mime_extensions_str)
        .and_then(|exts| exts.first())
        .map(|ext| ext.to_string())
        .unwrap_or_else(|| "bin".to_string())
}
