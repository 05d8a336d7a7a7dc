use crate::util::cli::{Report, Reportable};
use serde::Deserialize;
use std::{
    fmt::{self, Display},
    fs, io,
    path::{Path, PathBuf},
};

#[derive(Debug)]
pub enum LoadError {
    ReadFailed {
        path: PathBuf,
        cause: io::Error,
    },
    ParseFailed {
        path: PathBuf,
        cause: toml::de::Error,
    },
}

impl Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed { path, cause } => {
                write!(f, "Failed to read config file at {:?}: {}", path, cause)
            }
            Self::ParseFailed { path, cause } => {
                write!(f, "Failed to parse config file at {:?}: {}", path, cause)
            }
        }
    }
}

impl Reportable for LoadError {
    fn report(&self) -> Report {
        Report::error("Failed to load config", self)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Raw {
    pub target_name: Option<String>,
    pub app_identifier: Option<String>,
    pub extension_identifier: Option<String>,
    pub ios_version: Option<String>,
    pub swift_version: Option<String>,
    pub development_team: Option<String>,
    pub host_target: Option<String>,
}

impl Raw {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        log::info!("loading config file at {:?}", path);
        let bytes = fs::read(path).map_err(|cause| LoadError::ReadFailed {
            path: path.to_owned(),
            cause,
        })?;
        toml::from_slice::<Self>(&bytes).map_err(|cause| LoadError::ParseFailed {
            path: path.to_owned(),
            cause,
        })
    }

    /// Merges two sets of raw values, with entries present in `overrides`
    /// winning out over entries present in `self`.
    pub fn overridden_with(self, overrides: Self) -> Self {
        Self {
            target_name: overrides.target_name.or(self.target_name),
            app_identifier: overrides.app_identifier.or(self.app_identifier),
            extension_identifier: overrides.extension_identifier.or(self.extension_identifier),
            ios_version: overrides.ios_version.or(self.ios_version),
            swift_version: overrides.swift_version.or(self.swift_version),
            development_team: overrides.development_team.or(self.development_team),
            host_target: overrides.host_target.or(self.host_target),
        }
    }
}
