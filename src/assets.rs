//! Asset readiness gate
//!
//! Models are loaded asynchronously by the host. The sim never touches the
//! assets themselves; it only asks whether one is ready before spawning an
//! entity that needs it.

/// Assets the sim depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    AsteroidModel,
    LaserModel,
}

impl Asset {
    pub const ALL: [Asset; 2] = [Asset::AsteroidModel, Asset::LaserModel];

    fn index(self) -> usize {
        match self {
            Asset::AsteroidModel => 0,
            Asset::LaserModel => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Asset::AsteroidModel => "asteroid model",
            Asset::LaserModel => "laser model",
        }
    }
}

/// Readiness capability consumed by the spawn logic
pub trait AssetGate {
    fn is_ready(&self, asset: Asset) -> bool;
}

/// Everything is always ready (procedural shapes, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

impl AssetGate for AlwaysReady {
    fn is_ready(&self, _asset: Asset) -> bool {
        true
    }
}

/// Readiness flags flipped by the host as loads complete
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    ready: [bool; Asset::ALL.len()],
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an asset finished loading
    pub fn mark_ready(&mut self, asset: Asset) {
        if !self.ready[asset.index()] {
            log::info!("Asset ready: {}", asset.as_str());
        }
        self.ready[asset.index()] = true;
    }

    /// True once every asset has loaded
    pub fn all_ready(&self) -> bool {
        self.ready.iter().all(|r| *r)
    }
}

impl AssetGate for AssetRegistry {
    fn is_ready(&self, asset: Asset) -> bool {
        self.ready[asset.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_starts_unready() {
        let mut registry = AssetRegistry::new();
        assert!(!registry.is_ready(Asset::AsteroidModel));
        assert!(!registry.all_ready());

        registry.mark_ready(Asset::AsteroidModel);
        assert!(registry.is_ready(Asset::AsteroidModel));
        assert!(!registry.is_ready(Asset::LaserModel));

        registry.mark_ready(Asset::LaserModel);
        assert!(registry.all_ready());
    }

    #[test]
    fn test_always_ready() {
        for asset in Asset::ALL {
            assert!(AlwaysReady.is_ready(asset));
        }
    }
}
