pub mod identifier;
mod raw;

pub use self::raw::*;

use self::identifier::{check_identifier_syntax, IdentifierError};
use crate::{
    graft::HostTarget,
    util::{cli::Report, list_display, VersionDouble, VersionDoubleError},
};
use std::str::FromStr;

pub static DEFAULT_TARGET_NAME: &str = "NotificationService";
const DEFAULT_IOS_VERSION: VersionDouble = VersionDouble::new(13, 0);
const DEFAULT_SWIFT_VERSION: VersionDouble = VersionDouble::new(5, 0);

#[derive(Debug)]
pub enum Error {
    TargetNameEmpty,
    TargetNameInvalid {
        name: String,
        bad_chars: Vec<char>,
    },
    AppIdentifierMissing,
    AppIdentifierInvalid {
        identifier: String,
        cause: IdentifierError,
    },
    ExtensionIdentifierInvalid {
        identifier: String,
        cause: IdentifierError,
    },
    IosVersionInvalid(VersionDoubleError),
    SwiftVersionInvalid(VersionDoubleError),
    DevelopmentTeamEmpty,
    HostTargetEmpty,
}

impl Error {
    pub fn report(&self, msg: &str) -> Report {
        match self {
            Self::TargetNameEmpty => Report::error(msg, "`target-name` is empty"),
            Self::TargetNameInvalid { name, bad_chars } => Report::error(
                msg,
                format!(
                    "`target-name` {:?} contains {}, but only ASCII letters, numbers, hyphens, and underscores are allowed",
                    name,
                    list_display(
                        &bad_chars
                            .iter()
                            .map(|c| format!("'{}'", c))
                            .collect::<Vec<_>>()
                    ),
                ),
            ),
            Self::AppIdentifierMissing => Report::error(msg, "`app-identifier` must be specified"),
            Self::AppIdentifierInvalid { identifier, cause } => Report::error(
                msg,
                format!("`app-identifier` {:?} invalid: {}", identifier, cause),
            ),
            Self::ExtensionIdentifierInvalid { identifier, cause } => Report::error(
                msg,
                format!("`extension-identifier` {:?} invalid: {}", identifier, cause),
            ),
            Self::IosVersionInvalid(err) => {
                Report::error(msg, format!("`ios-version` invalid: {}", err))
            }
            Self::SwiftVersionInvalid(err) => {
                Report::error(msg, format!("`swift-version` invalid: {}", err))
            }
            Self::DevelopmentTeamEmpty => Report::error(msg, "`development-team` is empty"),
            Self::HostTargetEmpty => Report::error(msg, "`host-target` is empty"),
        }
    }
}

fn check_target_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::TargetNameEmpty);
    }
    let mut bad_chars = Vec::new();
    for c in name.chars() {
        if !c.is_ascii_alphanumeric() && c != '-' && c != '_' && !bad_chars.contains(&c) {
            bad_chars.push(c);
        }
    }
    if !bad_chars.is_empty() {
        return Err(Error::TargetNameInvalid {
            name: name.to_owned(),
            bad_chars,
        });
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub struct Config {
    target_name: String,
    app_identifier: String,
    extension_identifier: String,
    ios_version: VersionDouble,
    swift_version: VersionDouble,
    development_team: Option<String>,
    host_target: HostTarget,
}

impl Config {
    pub fn from_raw(raw: Raw) -> Result<Self, Error> {
        let target_name = raw.target_name.unwrap_or_else(|| {
            log::info!(
                "`target-name` not set; defaulting to {}",
                DEFAULT_TARGET_NAME
            );
            DEFAULT_TARGET_NAME.to_owned()
        });
        check_target_name(&target_name)?;

        let app_identifier = raw.app_identifier.ok_or(Error::AppIdentifierMissing)?;
        check_identifier_syntax(&app_identifier).map_err(|cause| Error::AppIdentifierInvalid {
            identifier: app_identifier.clone(),
            cause,
        })?;

        let extension_identifier = raw
            .extension_identifier
            .unwrap_or_else(|| format!("{}.{}", app_identifier, target_name));
        check_identifier_syntax(&extension_identifier).map_err(|cause| {
            Error::ExtensionIdentifierInvalid {
                identifier: extension_identifier.clone(),
                cause,
            }
        })?;

        if let Some(team) = &raw.development_team {
            if team.is_empty() {
                return Err(Error::DevelopmentTeamEmpty);
            }
        }

        let host_target = raw
            .host_target
            .map(|selector| {
                if selector.is_empty() {
                    Err(Error::HostTargetEmpty)
                } else {
                    Ok(HostTarget::from_selector(&selector))
                }
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            target_name,
            app_identifier,
            extension_identifier,
            ios_version: raw
                .ios_version
                .map(|str| VersionDouble::from_str(&str))
                .transpose()
                .map_err(Error::IosVersionInvalid)?
                .unwrap_or(DEFAULT_IOS_VERSION),
            swift_version: raw
                .swift_version
                .map(|str| VersionDouble::from_str(&str))
                .transpose()
                .map_err(Error::SwiftVersionInvalid)?
                .unwrap_or(DEFAULT_SWIFT_VERSION),
            development_team: raw.development_team,
            host_target,
        })
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn app_identifier(&self) -> &str {
        &self.app_identifier
    }

    pub fn extension_identifier(&self) -> &str {
        &self.extension_identifier
    }

    pub fn ios_version(&self) -> VersionDouble {
        self.ios_version
    }

    pub fn swift_version(&self) -> VersionDouble {
        self.swift_version
    }

    pub fn development_team(&self) -> Option<&str> {
        self.development_team.as_deref()
    }

    pub fn host_target(&self) -> &HostTarget {
        &self.host_target
    }

    pub fn source_file_name(&self) -> String {
        format!("{}.swift", self.target_name)
    }
}
