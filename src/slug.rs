use crate::config::SLUG_MAX_LEN;

/// Normalize a topic string into a deterministic cache-key segment:
/// lowercase, non-alphanumeric runs collapsed to single hyphens, edge
/// hyphens stripped, truncated to SLUG_MAX_LEN. Idempotent.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
        if slug.len() >= SLUG_MAX_LEN {
            break;
        }
    }

    slug.truncate(SLUG_MAX_LEN);
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
