/// Display title for a path: its last non-empty segment.
pub fn path_title(path: &str) -> String {
    path.split(['\\', '/'])
        .filter(|segment| !segment.is_empty())
        .last()
        .unwrap_or(path)
        .to_string()
}

pub fn format_size(size: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if size == 0 {
        return "-".to_string();
    }

    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, UNITS[unit])
    }
}

/// Human readable type column text, also used as the "type" sort key.
pub fn file_type_label(extension: &str, is_dir: bool) -> String {
    if is_dir {
        return "Folder".to_string();
    }
    if extension.is_empty() {
        return "File".to_string();
    }

    let label = match extension.to_lowercase().as_str() {
        "pdf" => "PDF Document",
        "doc" | "docx" => "Word Document",
        "txt" => "Text File",
        "rtf" => "Rich Text",
        "md" => "Markdown",
        "xls" | "xlsx" => "Excel Spreadsheet",
        "csv" => "CSV File",
        "jpg" | "jpeg" => "JPEG Image",
        "png" => "PNG Image",
        "gif" => "GIF Image",
        "svg" => "SVG Image",
        "webp" => "WebP Image",
        "ico" => "Icon",
        "bmp" => "Bitmap Image",
        "mp4" => "MP4 Video",
        "mkv" => "MKV Video",
        "avi" => "AVI Video",
        "mov" => "QuickTime Video",
        "webm" => "WebM Video",
        "mp3" => "MP3 Audio",
        "wav" => "WAV Audio",
        "flac" => "FLAC Audio",
        "ogg" => "OGG Audio",
        "m4a" => "M4A Audio",
        "zip" => "ZIP Archive",
        "rar" => "RAR Archive",
        "7z" => "7-Zip Archive",
        "tar" => "TAR Archive",
        "gz" => "GZip Archive",
        "js" => "JavaScript",
        "ts" => "TypeScript",
        "py" => "Python",
        "rs" => "Rust",
        "go" => "Go",
        "java" => "Java",
        "c" => "C",
        "cpp" => "C++",
        "h" => "C Header",
        "cs" => "C#",
        "html" => "HTML",
        "css" => "CSS",
        "json" => "JSON",
        "xml" => "XML",
        "yaml" | "yml" => "YAML",
        "toml" => "TOML",
        "exe" => "Application",
        "msi" => "Installer",
        "dll" => "DLL Library",
        "bat" => "Batch File",
        "ps1" => "PowerShell",
        "sh" => "Shell Script",
        "iso" => "Disk Image",
        "dmg" => "macOS Disk Image",
        _ => return format!("{} File", extension.to_uppercase()),
    };
    label.to_string()
}

/// Clickable path segments, root first. Handles both `C:\a\b` and `/a/b`.
pub fn breadcrumbs(path: &str) -> Vec<(String, String)> {
    let separator = if path.contains('\\') || path.ends_with(':') { '\\' } else { '/' };
    let mut crumbs = Vec::new();
    let mut current = String::new();

    if path.starts_with('/') {
        current.push('/');
        crumbs.push(("/".to_string(), current.clone()));
    }

    for segment in path.split(separator).filter(|s| !s.is_empty()) {
        if !current.is_empty() && !current.ends_with(separator) {
            current.push(separator);
        }
        current.push_str(segment);
        if crumbs.is_empty() && segment.ends_with(':') {
            // Drive roots keep their trailing separator so they stay navigable.
            crumbs.push((segment.to_string(), format!("{}{}", segment, separator)));
            continue;
        }
        crumbs.push((segment.to_string(), current.clone()));
    }

    crumbs
}
