pub type Result<T> = std::result::Result<T, LayoutError>;

/// Malformed node lists. Both variants are fatal to layout construction.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("node `{node}` depends on `{dependency}`, which is not in the graph")]
    UnresolvedReference { node: String, dependency: String },

    #[error("node name `{name}` is used by more than one node")]
    NameCollision { name: String },
}
