//! URL slug generation
//!
//! Lowercases, strips non-alphanumerics and collapses whitespace/dashes into
//! single hyphens. Uniqueness against a table is handled by the repositories
//! via [`unique_slug`], which appends `-1`, `-2`, ... until the candidate is
//! free.

/// Slugify a display name: "Ankara Two-Piece  Set" -> "ankara-two-piece-set"
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true; // suppress a leading dash

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Produce a slug unique according to `exists`, counter-suffixing on collision.
pub async fn unique_slug<F, Fut, E>(name: &str, exists: F) -> Result<String, E>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let base = slugify(name);
    let mut candidate = base.clone();
    let mut counter = 1;

    while exists(candidate.clone()).await? {
        candidate = format!("{base}-{counter}");
        counter += 1;
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Ankara Two-Piece  Set"), "ankara-two-piece-set");
        assert_eq!(slugify("  Agbada! (Deluxe) "), "agbada-deluxe");
        assert_eq!(slugify("ALL CAPS"), "all-caps");
    }

    #[tokio::test]
    async fn unique_slug_appends_counter() {
        let taken = ["gown", "gown-1"];
        let slug = unique_slug("Gown", |candidate| async move {
            Ok::<_, std::convert::Infallible>(taken.contains(&candidate.as_str()))
        })
        .await
        .unwrap();
        assert_eq!(slug, "gown-2");
    }
}
