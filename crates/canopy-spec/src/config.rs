//! Flatten configuration parameters.

/// Order in which mapping entries are visited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DictOrder {
    /// Keep the mapping's insertion order.
    #[default]
    Insertion,
    /// Visit keys in ascending [`Datum`](canopy_core::Datum) order.
    ///
    /// The sorted order is what the Dict node records, so unflattening
    /// produces a mapping in that order.
    Sorted,
}

/// Options for [`flatten_with`](crate::flatten_with).
///
/// All fields are public; the `with_*` methods are shorthand for building
/// one up from [`FlattenConfig::default`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlattenConfig {
    /// Treat the unit value as a leaf instead of an empty container.
    ///
    /// Default: `false`. When set, `Value::None` is appended to the leaf
    /// sequence and recorded as a Leaf node.
    pub none_is_leaf: bool,

    /// Registration namespace consulted after global registrations.
    ///
    /// Default: `None` (global registrations only).
    pub namespace: Option<String>,

    /// Mapping entry order.
    ///
    /// Default: [`DictOrder::Insertion`].
    pub dict_order: DictOrder,
}

impl FlattenConfig {
    /// Default for [`none_is_leaf`](Self::none_is_leaf).
    pub const DEFAULT_NONE_IS_LEAF: bool = false;

    /// Default for [`dict_order`](Self::dict_order).
    pub const DEFAULT_DICT_ORDER: DictOrder = DictOrder::Insertion;

    /// Set [`none_is_leaf`](Self::none_is_leaf).
    pub fn with_none_is_leaf(mut self, none_is_leaf: bool) -> Self {
        self.none_is_leaf = none_is_leaf;
        self
    }

    /// Set the registration namespace. An empty string means global only.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = (!namespace.is_empty()).then_some(namespace);
        self
    }

    /// Set [`dict_order`](Self::dict_order).
    pub fn with_dict_order(mut self, dict_order: DictOrder) -> Self {
        self.dict_order = dict_order;
        self
    }
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            none_is_leaf: Self::DEFAULT_NONE_IS_LEAF,
            namespace: None,
            dict_order: Self::DEFAULT_DICT_ORDER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = FlattenConfig::default();
        assert!(!config.none_is_leaf);
        assert_eq!(config.namespace, None);
        assert_eq!(config.dict_order, DictOrder::Insertion);
    }

    #[test]
    fn empty_namespace_means_global() {
        let config = FlattenConfig::default().with_namespace("");
        assert_eq!(config.namespace, None);
        let config = config.with_namespace("geo");
        assert_eq!(config.namespace.as_deref(), Some("geo"));
    }

    #[test]
    fn builders_chain() {
        let config = FlattenConfig::default()
            .with_none_is_leaf(true)
            .with_dict_order(DictOrder::Sorted);
        assert!(config.none_is_leaf);
        assert_eq!(config.dict_order, DictOrder::Sorted);
    }
}
