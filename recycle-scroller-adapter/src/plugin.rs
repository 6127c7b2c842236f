use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use recycle_scroller::{InstallOptions, ScrollerConfig};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The components a binding layer exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentKind {
    RecycleScroller,
    DynamicScroller,
    DynamicScrollerItem,
}

impl ComponentKind {
    pub const ALL: [Self; 3] = [
        Self::RecycleScroller,
        Self::DynamicScroller,
        Self::DynamicScrollerItem,
    ];

    pub fn kebab_name(self) -> &'static str {
        match self {
            Self::RecycleScroller => "recycle-scroller",
            Self::DynamicScroller => "dynamic-scroller",
            Self::DynamicScrollerItem => "dynamic-scroller-item",
        }
    }

    pub fn pascal_name(self) -> &'static str {
        match self {
            Self::RecycleScroller => "RecycleScroller",
            Self::DynamicScroller => "DynamicScroller",
            Self::DynamicScrollerItem => "DynamicScrollerItem",
        }
    }
}

/// Whatever the host framework uses to look components up by name.
pub trait ComponentRegistry {
    fn register(&mut self, name: String, kind: ComponentKind);
}

impl ComponentRegistry for Vec<(String, ComponentKind)> {
    fn register(&mut self, name: String, kind: ComponentKind) {
        self.push((name, kind));
    }
}

/// Registers every component under its kebab-case and PascalCase names, prefixed.
pub fn register_components(registry: &mut impl ComponentRegistry, prefix: &str) {
    for kind in ComponentKind::ALL {
        registry.register(format!("{prefix}{}", kind.kebab_name()), kind);
        registry.register(format!("{prefix}{}", kind.pascal_name()), kind);
    }
}

/// Builds the application-wide configuration and registers the components it asks for.
///
/// Nothing is installed implicitly: call this once at start-up and hand the returned config to
/// each scroller (`ScrollerOptions::with_config`).
pub fn install(registry: &mut impl ComponentRegistry, options: InstallOptions) -> ScrollerConfig {
    let config = ScrollerConfig::from_options(options);
    if config.install_components {
        register_components(registry, &config.components_prefix);
    }
    vdebug!(
        items_limit = config.items_limit,
        install_components = config.install_components,
        prefix = %config.components_prefix,
        "install"
    );
    config
}
