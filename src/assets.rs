use crate::{
    config::Config,
    util::cli::{Report, Reportable},
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// The manifest every extension bundle ships, referenced by the target's
/// `INFOPLIST_FILE` setting.
pub static MANIFEST_FILE: &str = "Info.plist";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Asset directory {0:?} didn't exist")]
    SourceDirMissing(PathBuf),
    #[error("Asset {path:?} didn't exist")]
    SourceFileMissing { path: PathBuf },
    #[error("Failed to create directory {path:?}: {cause}")]
    DirCreationFailed { path: PathBuf, cause: io::Error },
    #[error("Failed to copy {from:?} to {to:?}: {cause}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        cause: io::Error,
    },
}

impl Reportable for Error {
    fn report(&self) -> Report {
        Report::error("Failed to stage extension assets", self)
    }
}

/// Where the extension's seed files come from: a directory holding the
/// source file named after the target plus an `Info.plist`.
#[derive(Clone, Debug)]
pub struct AssetSource {
    dir: PathBuf,
}

impl AssetSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn source_file(&self, config: &Config) -> PathBuf {
        self.dir.join(config.source_file_name())
    }

    pub fn manifest(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    /// Checks every file `stage` would copy, without copying anything.
    pub fn verify(&self, config: &Config) -> Result<(), Error> {
        if !self.dir.is_dir() {
            return Err(Error::SourceDirMissing(self.dir.clone()));
        }
        let required = [self.source_file(config), self.manifest()];
        for path in &required {
            if !path.is_file() {
                return Err(Error::SourceFileMissing { path: path.clone() });
            }
        }
        Ok(())
    }

    /// Copies the extension's seed files into `dest_dir`, creating it as
    /// needed. Existing copies are overwritten.
    pub fn stage(&self, config: &Config, dest_dir: &Path) -> Result<(), Error> {
        fs::create_dir_all(dest_dir).map_err(|cause| Error::DirCreationFailed {
            path: dest_dir.to_owned(),
            cause,
        })?;
        let copies = [
            (
                self.source_file(config),
                dest_dir.join(config.source_file_name()),
            ),
            (self.manifest(), dest_dir.join(MANIFEST_FILE)),
        ];
        for (from, to) in &copies {
            fs::copy(from, to).map_err(|cause| Error::CopyFailed {
                from: from.clone(),
                to: to.clone(),
                cause,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Raw;

    fn config() -> Config {
        Config::from_raw(Raw {
            app_identifier: Some("com.example.app".to_owned()),
            ..Default::default()
        })
        .unwrap()
    }

    fn seeded_source() -> (tempfile::TempDir, AssetSource) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("NotificationService.swift"),
            "import UserNotifications\n",
        )
        .unwrap();
        fs::write(dir.path().join("Info.plist"), "<plist/>\n").unwrap();
        let source = AssetSource::new(dir.path());
        (dir, source)
    }

    #[test]
    fn test_verify() {
        let (_dir, source) = seeded_source();
        source.verify(&config()).unwrap();
    }

    #[test]
    fn test_verify_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let source = AssetSource::new(dir.path().join("nope"));
        let err = source.verify(&config()).unwrap_err();
        assert!(matches!(err, Error::SourceDirMissing(_)));
    }

    #[test]
    fn test_verify_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("NotificationService.swift"), "").unwrap();
        let source = AssetSource::new(dir.path());
        let err = source.verify(&config()).unwrap_err();
        match err {
            Error::SourceFileMissing { path } => {
                assert_eq!(path.file_name().and_then(|name| name.to_str()), Some("Info.plist"))
            }
            other => panic!("expected SourceFileMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_stage() {
        let (_dir, source) = seeded_source();
        let dest = tempfile::tempdir().unwrap();
        let dest_dir = dest.path().join("NotificationService");
        source.stage(&config(), &dest_dir).unwrap();
        let staged = fs::read_to_string(dest_dir.join("NotificationService.swift")).unwrap();
        assert_eq!(staged, "import UserNotifications\n");
        assert!(dest_dir.join("Info.plist").is_file());
        // staging again overwrites without complaint
        source.stage(&config(), &dest_dir).unwrap();
    }
}
