//! Rebuild stability-cache entries from a previously generated source file.

use crate::emit::HASH_MARKER;
use crate::model::{BodyHash, CacheEntry};
use crate::pipeline::STUB_EXCEPTION;

/// Parse every `public static ... name(...)` declaration followed by body
/// lines and a hash marker.
///
/// Functions whose body still throws the stub exception are skipped: an
/// unresolved failure must be retried, not pinned. Declarations without a
/// hash marker are ignored.
pub fn parse_generated_source(text: &str) -> Vec<CacheEntry> {
    let mut entries = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in text.lines() {
        let trimmed = line.trim();

        if let Some(name) = declared_function_name(trimmed) {
            current = Some((name, Vec::new()));
            continue;
        }

        if let Some(hash) = trimmed.strip_prefix(HASH_MARKER) {
            if let Some((name, body_lines)) = current.take() {
                let body = body_lines.join("\n");
                let hash = hash.trim();
                if !hash.is_empty() && !body.trim().is_empty() && !body.contains(STUB_EXCEPTION) {
                    entries.push(CacheEntry::new(name, BodyHash::from_hex(hash), body));
                }
            }
            continue;
        }

        if let Some((_, body_lines)) = current.as_mut() {
            if !trimmed.is_empty() {
                body_lines.push(line.trim_end());
            }
        }
    }

    entries
}

fn declared_function_name(line: &str) -> Option<String> {
    let rest = line.strip_prefix("public static ")?;
    if rest.starts_with("unsafe partial class") || rest.starts_with("class") {
        return None;
    }
    let open = rest.find('(')?;
    let name = rest[..open].split_whitespace().last()?;
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some(name.to_string())
}
