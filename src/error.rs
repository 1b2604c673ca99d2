// Copyright (c) 2026 rezky_nightky

use thiserror::Error;

use crate::settings::ConfigError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Args(String),
}

pub type Result<T> = std::result::Result<T, Error>;
