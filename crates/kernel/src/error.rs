use outrun_scene::SceneError;
use outrun_terrain::TerrainError;

/// Errors from kernel setup. Nothing in the per-frame path returns one.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("{0} was already resolved")]
    AlreadyResolved(&'static str),
    #[error(transparent)]
    Terrain(#[from] TerrainError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
