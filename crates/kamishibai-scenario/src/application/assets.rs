//! Asset reference resolution.

/// Maps scene-relative asset references to served paths.
///
/// Rules, first match wins:
/// 1. empty → empty (no asset)
/// 2. `http://`, `https://` or protocol-relative `//` → unchanged
/// 3. root-relative `/...` → unchanged
/// 4. `../rest` → `<packs_root>/rest` (assets shared between scenarios)
/// 5. anything else → `<packs_root>/<scenario>/<reference>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResolver {
    packs_root: String,
    scenario: String,
}

impl AssetResolver {
    #[must_use]
    pub fn new(packs_root: impl Into<String>, scenario: impl Into<String>) -> Self {
        let packs_root: String = packs_root.into();
        Self {
            packs_root: packs_root.trim_end_matches('/').to_owned(),
            scenario: scenario.into(),
        }
    }

    /// Resolves a reference; `None` and `""` resolve to `""`.
    #[must_use]
    pub fn resolve(&self, reference: Option<&str>) -> String {
        let Some(reference) = reference.filter(|r| !r.is_empty()) else {
            return String::new();
        };
        if is_absolute_url(reference) || reference.starts_with('/') {
            return reference.to_owned();
        }
        if let Some(shared) = reference.strip_prefix("../") {
            return format!("{}/{shared}", self.packs_root);
        }
        format!("{}/{}/{reference}", self.packs_root, self.scenario)
    }

    /// Directory holding this scenario's pack.
    #[must_use]
    pub fn pack_dir(&self) -> String {
        format!("{}/{}", self.packs_root, self.scenario)
    }
}

fn is_absolute_url(reference: &str) -> bool {
    reference.starts_with("//")
        || reference.starts_with("http://")
        || reference.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> AssetResolver {
        AssetResolver::new("packs", "umae")
    }

    #[test]
    fn test_absolute_urls_pass_through() {
        assert_eq!(resolver().resolve(Some("http://a/b")), "http://a/b");
        assert_eq!(resolver().resolve(Some("https://cdn/x.png")), "https://cdn/x.png");
        assert_eq!(resolver().resolve(Some("//cdn/x.png")), "//cdn/x.png");
    }

    #[test]
    fn test_root_relative_passes_through() {
        assert_eq!(resolver().resolve(Some("/x")), "/x");
    }

    #[test]
    fn test_parent_marker_resolves_to_shared_assets() {
        assert_eq!(
            resolver().resolve(Some("../common/a.png")),
            "packs/common/a.png"
        );
    }

    #[test]
    fn test_plain_reference_resolves_into_scenario_pack() {
        assert_eq!(resolver().resolve(Some("img/1.png")), "packs/umae/img/1.png");
    }

    #[test]
    fn test_missing_or_empty_reference_resolves_to_empty() {
        assert_eq!(resolver().resolve(None), "");
        assert_eq!(resolver().resolve(Some("")), "");
    }

    #[test]
    fn test_only_one_parent_marker_is_stripped() {
        assert_eq!(
            resolver().resolve(Some("../../etc/a.png")),
            "packs/../etc/a.png"
        );
    }

    #[test]
    fn test_trailing_slash_on_root_is_ignored() {
        let resolver = AssetResolver::new("/static/packs/", "night");
        assert_eq!(resolver.resolve(Some("bgm/1.mp3")), "/static/packs/night/bgm/1.mp3");
        assert_eq!(resolver.pack_dir(), "/static/packs/night");
    }
}
