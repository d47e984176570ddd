//! Export filename construction: sanitization, template substitution, and
//! collision uniquification.

use std::path::{Path, PathBuf};

pub const DEFAULT_TEMPLATE: &str = "{client}_invoice[{date}].pdf";

/// Reduce a client name to filesystem-safe characters: keep letters,
/// digits, space, underscore, dash; then collapse whitespace runs to a
/// single underscore.
pub fn sanitize_client(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    let mut out = String::with_capacity(kept.len());
    let mut in_space = false;
    for ch in kept.trim().chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
                in_space = true;
            }
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// Filename form of a display date: `/` becomes `-`.
pub fn date_for_filename(display_date: &str) -> String {
    display_date.replace('/', "-")
}

/// Apply the naming template, substituting `{client}` (sanitized) and
/// `{date}`. A blank template, or one with neither token, falls back to
/// [`DEFAULT_TEMPLATE`].
pub fn filename_from_template(template: &str, client_name: &str, display_date: &str) -> String {
    let usable =
        !template.trim().is_empty() && (template.contains("{client}") || template.contains("{date}"));
    let template = if usable { template } else { DEFAULT_TEMPLATE };
    template
        .replace("{client}", &sanitize_client(client_name))
        .replace("{date}", &date_for_filename(display_date))
}

/// First non-existing variant of `path`: the path itself, then
/// `name (1).pdf`, `name (2).pdf`, and so on.
pub fn uniquify(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path.extension().map(|s| s.to_string_lossy().into_owned());
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    for n in 1u32.. {
        let name = match &ext {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        };
        let candidate = dir.join(name);
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!()
}
