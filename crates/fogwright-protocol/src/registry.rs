//! Asset-existence predicate consulted before downloading

/// Answers whether an asset is already available without a download
///
/// Paths are canonical local paths as produced by the
/// [`AssetPathPolicy`](fogwright_formats::AssetPathPolicy).
pub trait AssetRegistry: Send + Sync {
    /// Whether `path` resolves to a packaged or previously fetched asset
    fn contains(&self, path: &str) -> bool;
}

impl<F> AssetRegistry for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn contains(&self, path: &str) -> bool {
        self(path)
    }
}

/// Registry for a host with no packaged assets
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPackagedAssets;

impl AssetRegistry for NoPackagedAssets {
    fn contains(&self, _path: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_registry() {
        let registry = |path: &str| path.starts_with("Game/Content/");
        assert!(registry.contains("Game/Content/UI/A.png"));
        assert!(!registry.contains("Game/Plugins/E/Content/A.png"));
        assert!(!NoPackagedAssets.contains("Game/Content/UI/A.png"));
    }
}
