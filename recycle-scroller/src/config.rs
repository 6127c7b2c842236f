use alloc::string::String;

/// Default maximum number of slots a scroller may create.
pub const DEFAULT_ITEMS_LIMIT: usize = 1000;

/// Application-wide scroller configuration.
///
/// Built once at start-up (usually from [`InstallOptions`]) and passed to every scroller through
/// [`crate::ScrollerOptions::with_config`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollerConfig {
    pub items_limit: usize,
    /// Whether the binding layer should register its components.
    pub install_components: bool,
    /// Prefix for registered component names.
    pub components_prefix: String,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            items_limit: DEFAULT_ITEMS_LIMIT,
            install_components: true,
            components_prefix: String::new(),
        }
    }
}

impl ScrollerConfig {
    /// Defaults overridden by every option that is set.
    pub fn from_options(options: InstallOptions) -> Self {
        let mut config = Self::default();
        config.merge(options);
        config
    }

    pub fn merge(&mut self, options: InstallOptions) {
        if let Some(items_limit) = options.items_limit {
            self.items_limit = items_limit;
        }
        if let Some(install_components) = options.install_components {
            self.install_components = install_components;
        }
        if let Some(prefix) = options.components_prefix {
            self.components_prefix = prefix;
        }
    }
}

/// Partial configuration supplied at install time. Unset fields keep their defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InstallOptions {
    pub items_limit: Option<usize>,
    pub install_components: Option<bool>,
    pub components_prefix: Option<String>,
}

impl InstallOptions {
    pub fn with_items_limit(mut self, items_limit: usize) -> Self {
        self.items_limit = Some(items_limit);
        self
    }

    pub fn with_install_components(mut self, install_components: bool) -> Self {
        self.install_components = Some(install_components);
        self
    }

    pub fn with_components_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.components_prefix = Some(prefix.into());
        self
    }
}
