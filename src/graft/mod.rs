pub mod embed;
pub mod group;
pub mod settings;
pub mod target;

pub use self::embed::{HostTarget, EMBED_PHASE_NAME};

use crate::{
    assets::{self, AssetSource},
    config::Config,
    pbxproj::{Graph, GraphError, ObjectId, ParseError, WriteError},
    util::cli::{Report, Reportable},
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Platform directory {0:?} didn't exist")]
    PlatformDirMissing(PathBuf),
    #[error("Failed to scan {path:?} for an Xcode project: {cause}")]
    DiscoverFailed { path: PathBuf, cause: io::Error },
    #[error(transparent)]
    Asset(#[from] assets::Error),
    #[error("Failed to read project descriptor {path:?}: {cause}")]
    ReadFailed { path: PathBuf, cause: io::Error },
    #[error("Failed to parse project descriptor {path:?}: {cause}")]
    ParseFailed { path: PathBuf, cause: ParseError },
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("A group named {name:?} already sits at the top of the project")]
    GroupNameTaken { name: String },
    #[error("No target matched the host selector \"{host}\"")]
    HostTargetNotFound { host: HostTarget },
    #[error("The extension target {name:?} can't embed into itself")]
    EmbedIntoSelf { name: String },
    #[error(transparent)]
    Write(#[from] WriteError),
}

impl Reportable for Error {
    fn report(&self) -> Report {
        Report::error("Failed to graft extension target", self)
    }
}

/// What a graft run did.
#[derive(Debug)]
pub enum Outcome {
    /// The target was grafted and the descriptor rewritten.
    Created(Grafted),
    /// A target with the configured name already existed, so the descriptor
    /// wasn't touched.
    AlreadyPresent { target_name: String },
    /// No `.xcodeproj` was found under the platform directory.
    SkippedNoProject,
}

/// IDs of everything a graft created. All of them derive deterministically
/// from the target name, so re-running against a fresh checkout lands on the
/// same IDs.
#[derive(Debug)]
pub struct Grafted {
    pub target: ObjectId,
    pub product: ObjectId,
    pub group: ObjectId,
    pub configurations: Vec<ObjectId>,
    pub embed_phase: ObjectId,
    pub host: ObjectId,
}

/// Finds the `.xcodeproj` bundle to operate on. With more than one present,
/// the lexicographically first wins; bundles without a `project.pbxproj`
/// inside don't count.
pub fn discover_project(platform_dir: &Path) -> Result<Option<PathBuf>, Error> {
    if !platform_dir.is_dir() {
        return Err(Error::PlatformDirMissing(platform_dir.to_owned()));
    }
    let entries = fs::read_dir(platform_dir).map_err(|cause| Error::DiscoverFailed {
        path: platform_dir.to_owned(),
        cause,
    })?;
    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|cause| Error::DiscoverFailed {
            path: platform_dir.to_owned(),
            cause,
        })?;
        let path = entry.path();
        if path.extension().map(|ext| ext == "xcodeproj").unwrap_or(false) {
            let descriptor = path.join("project.pbxproj");
            if descriptor.is_file() {
                candidates.push(descriptor);
            }
        }
    }
    // read_dir order is platform-dependent
    candidates.sort();
    Ok(candidates.into_iter().next())
}

/// Grafts the extension target into `graph`: target and product, settings,
/// source group, and the embed phase on the host. Returns `None` without
/// changing anything if the target is already present.
pub fn apply(graph: &mut Graph, config: &Config) -> Result<Option<Grafted>, Error> {
    if graph.target_by_name(config.target_name()).is_some() {
        return Ok(None);
    }
    graph.root_project()?;
    let name = config.target_name();
    let created = target::create_target(graph, name)?;
    settings::propagate(graph, &created.target, &settings::target_settings(config))?;
    let file_names = [config.source_file_name(), assets::MANIFEST_FILE.to_owned()];
    let sources = group::create_group(graph, name, &file_names)?;
    group::link_group(graph, &sources.group, name)?;
    for (file_ref, file_name) in sources.file_refs.iter().zip(&file_names) {
        // only sources compile; the manifest is wired up via INFOPLIST_FILE
        if file_name.ends_with(".swift") {
            target::add_source_file(graph, &created.target, file_ref, file_name)?;
        }
    }
    let host = embed::select_host(graph, config.host_target(), &created.target)?;
    let embed_phase = embed::install_embed_phase(graph, &host, &created.product, name)?;
    Ok(Some(Grafted {
        target: created.target,
        product: created.product,
        group: sources.group,
        configurations: created.configurations,
        embed_phase,
        host,
    }))
}

/// The whole pipeline: find the descriptor, graft in memory, stage the
/// extension's files next to the project, and only then rewrite the
/// descriptor. Any failure along the way leaves the descriptor as it was.
pub fn run(
    platform_dir: &Path,
    asset_source: &AssetSource,
    config: &Config,
) -> Result<Outcome, Error> {
    let descriptor = match discover_project(platform_dir)? {
        Some(descriptor) => descriptor,
        None => {
            log::warn!("no .xcodeproj found under {:?}; nothing to do", platform_dir);
            return Ok(Outcome::SkippedNoProject);
        }
    };
    log::info!("grafting into {:?}", descriptor);
    asset_source.verify(config)?;
    let src = fs::read_to_string(&descriptor).map_err(|cause| Error::ReadFailed {
        path: descriptor.clone(),
        cause,
    })?;
    let mut graph = Graph::parse(&src).map_err(|cause| Error::ParseFailed {
        path: descriptor.clone(),
        cause,
    })?;
    if let Some(name) = descriptor
        .parent()
        .and_then(Path::file_stem)
        .and_then(|stem| stem.to_str())
    {
        graph.set_display_name(name);
    }
    let grafted = match apply(&mut graph, config)? {
        Some(grafted) => grafted,
        None => {
            log::info!(
                "target {:?} is already present; leaving the descriptor untouched",
                config.target_name()
            );
            return Ok(Outcome::AlreadyPresent {
                target_name: config.target_name().to_owned(),
            });
        }
    };
    let project_dir = descriptor
        .parent()
        .and_then(Path::parent)
        .unwrap_or(platform_dir);
    asset_source.stage(config, &project_dir.join(config.target_name()))?;
    graph.write_to(&descriptor)?;
    log::info!("wrote {:?}", descriptor);
    Ok(Outcome::Created(grafted))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Raw;
    use crate::pbxproj::testing;

    fn config_from(raw: Raw) -> Config {
        Config::from_raw(Raw {
            app_identifier: Some("com.example.app".to_owned()),
            ..raw
        })
        .unwrap()
    }

    fn config() -> Config {
        config_from(Raw::default())
    }

    fn platform_with_project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("MainApp.xcodeproj");
        fs::create_dir(&bundle).unwrap();
        fs::write(bundle.join("project.pbxproj"), testing::MINIMAL_PROJECT).unwrap();
        dir
    }

    fn seeded_assets() -> (tempfile::TempDir, AssetSource) {
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

    fn descriptor_path(platform: &tempfile::TempDir) -> PathBuf {
        platform
            .path()
            .join("MainApp.xcodeproj")
            .join("project.pbxproj")
    }

    fn assert_referential_integrity(graph: &Graph) {
        static ID_KEYS: &[&str] = &[
            "fileRef",
            "productReference",
            "buildConfigurationList",
            "mainGroup",
            "productRefGroup",
        ];
        static ID_LIST_KEYS: &[&str] = &[
            "children",
            "files",
            "targets",
            "buildPhases",
            "buildConfigurations",
            "dependencies",
        ];
        for (id, object) in graph.objects() {
            for key in ID_KEYS {
                if let Some(reference) = object.get_str(key) {
                    assert!(
                        graph.contains(reference),
                        "{} of {} dangles: {}",
                        key,
                        id,
                        reference
                    );
                }
            }
            for key in ID_LIST_KEYS {
                for value in object.get_array(key).unwrap_or(&[]) {
                    if let Some(reference) = value.as_str() {
                        assert!(
                            graph.contains(reference),
                            "{} of {} dangles: {}",
                            key,
                            id,
                            reference
                        );
                    }
                }
            }
        }
        assert!(graph.contains(graph.root_object().as_str()));
    }

    #[test]
    fn test_run_creates_target() {
        let platform = platform_with_project();
        let (_assets_guard, source) = seeded_assets();
        let config = config();
        let grafted = match run(platform.path(), &source, &config).unwrap() {
            Outcome::Created(grafted) => grafted,
            other => panic!("expected Created, got {:?}", other),
        };
        assert_eq!(grafted.host.as_str(), testing::APP_TARGET_ID);

        let written = fs::read_to_string(descriptor_path(&platform)).unwrap();
        let graph = Graph::parse(&written).unwrap();
        assert_eq!(
            graph.target_by_name("NotificationService"),
            Some(&grafted.target)
        );
        assert_referential_integrity(&graph);

        let phases = graph
            .get(testing::APP_TARGET_ID)
            .and_then(|host| host.get_array("buildPhases"))
            .unwrap();
        assert!(phases
            .iter()
            .any(|phase| phase.as_str() == Some(grafted.embed_phase.as_str())));

        // annotation comments regenerate around the new objects
        assert!(written.contains("/* NotificationService.appex in Embed App Extensions */"));
        assert!(written.contains("Build configuration list for PBXProject \"MainApp\""));
        assert!(
            written.contains("Build configuration list for PBXNativeTarget \"NotificationService\"")
        );

        // and the rewritten descriptor round-trips stably
        let mut reparsed = Graph::parse(&written).unwrap();
        reparsed.set_display_name("MainApp");
        assert_eq!(reparsed.render(), written);

        let staged = platform.path().join("NotificationService");
        assert!(staged.join("NotificationService.swift").is_file());
        assert!(staged.join("Info.plist").is_file());
    }

    #[test]
    fn test_run_twice_changes_nothing() {
        let platform = platform_with_project();
        let (_assets_guard, source) = seeded_assets();
        let config = config();
        run(platform.path(), &source, &config).unwrap();
        let before = fs::read(descriptor_path(&platform)).unwrap();
        match run(platform.path(), &source, &config).unwrap() {
            Outcome::AlreadyPresent { target_name } => {
                assert_eq!(target_name, "NotificationService")
            }
            other => panic!("expected AlreadyPresent, got {:?}", other),
        }
        assert_eq!(fs::read(descriptor_path(&platform)).unwrap(), before);
    }

    #[test]
    fn test_run_without_project() {
        let platform = tempfile::tempdir().unwrap();
        let (_assets_guard, source) = seeded_assets();
        let outcome = run(platform.path(), &source, &config()).unwrap();
        assert!(matches!(outcome, Outcome::SkippedNoProject));
    }

    #[test]
    fn test_run_missing_manifest_changes_nothing() {
        let platform = platform_with_project();
        let assets_dir = tempfile::tempdir().unwrap();
        fs::write(assets_dir.path().join("NotificationService.swift"), "").unwrap();
        let source = AssetSource::new(assets_dir.path());
        let err = run(platform.path(), &source, &config()).unwrap_err();
        assert!(matches!(
            err,
            Error::Asset(assets::Error::SourceFileMissing { .. })
        ));
        assert_eq!(
            fs::read_to_string(descriptor_path(&platform)).unwrap(),
            testing::MINIMAL_PROJECT
        );
    }

    #[test]
    fn test_run_embed_into_self_changes_nothing() {
        let platform = platform_with_project();
        let (_assets_guard, source) = seeded_assets();
        let config = config_from(Raw {
            host_target: Some("NotificationService".to_owned()),
            ..Default::default()
        });
        let err = run(platform.path(), &source, &config).unwrap_err();
        assert!(matches!(err, Error::EmbedIntoSelf { .. }));
        assert_eq!(
            fs::read_to_string(descriptor_path(&platform)).unwrap(),
            testing::MINIMAL_PROJECT
        );
        assert!(!platform.path().join("NotificationService").exists());
    }

    #[test]
    fn test_discover_prefers_lexicographic_order() {
        let dir = tempfile::tempdir().unwrap();
        // first alphabetically, but holds no descriptor, so it doesn't count
        fs::create_dir(dir.path().join("AAA.xcodeproj")).unwrap();
        for name in &["Gamma.xcodeproj", "Beta.xcodeproj"] {
            let bundle = dir.path().join(name);
            fs::create_dir(&bundle).unwrap();
            fs::write(bundle.join("project.pbxproj"), testing::MINIMAL_PROJECT).unwrap();
        }
        let found = discover_project(dir.path()).unwrap().unwrap();
        assert_eq!(
            found,
            dir.path().join("Beta.xcodeproj").join("project.pbxproj")
        );
    }

    #[test]
    fn test_discover_missing_platform_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_project(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::PlatformDirMissing(_)));
    }

    #[test]
    fn test_apply_duplicate_short_circuits() {
        let mut graph = Graph::parse(testing::MINIMAL_PROJECT).unwrap();
        let config = config();
        apply(&mut graph, &config).unwrap().unwrap();
        let snapshot = graph.clone();
        assert!(apply(&mut graph, &config).unwrap().is_none());
        assert_eq!(graph, snapshot);
    }

    #[test]
    fn test_graft_is_deterministic() {
        let config = config();
        let render = || {
            let mut graph = Graph::parse(testing::MINIMAL_PROJECT).unwrap();
            apply(&mut graph, &config).unwrap().unwrap();
            graph.render()
        };
        assert_eq!(render(), render());
    }
}
