use ash::vk;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("handle not found: {object_type:?} {handle:#x}")]
    HandleNotFound {
        object_type: vk::ObjectType,
        handle: u64,
    },

    #[error("no context registered for dispatch key {0:#x}")]
    UnknownDispatchKey(usize),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
