use super::Error;
use crate::pbxproj::{kinds, Dict, Graph, Object, ObjectId, Value};
use std::fmt::{self, Display};

pub static EMBED_PHASE_NAME: &str = "Embed App Extensions";

/// How the host target (the one the extension embeds into) gets picked.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HostTarget {
    /// The first target that builds an application product.
    Application,
    /// The first target in project declaration order, whatever it builds.
    First,
    /// The target with exactly this name.
    Named(String),
}

impl Default for HostTarget {
    fn default() -> Self {
        Self::Application
    }
}

impl HostTarget {
    pub fn from_selector(selector: &str) -> Self {
        match selector {
            "application" => Self::Application,
            "first" => Self::First,
            name => Self::Named(name.to_owned()),
        }
    }
}

impl Display for HostTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Application => write!(f, "application"),
            Self::First => write!(f, "first"),
            Self::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Picks the host target out of the project's declaration-ordered target
/// list. Selecting `extension` itself is an error, not a fallthrough; an
/// extension can't embed into itself.
pub fn select_host(
    graph: &Graph,
    host: &HostTarget,
    extension: &ObjectId,
) -> Result<ObjectId, Error> {
    let project = graph.root_project()?;
    let target_ids: Vec<&str> = project
        .get_array("targets")
        .unwrap_or(&[])
        .iter()
        .filter_map(Value::as_str)
        .collect();
    let selected = match host {
        HostTarget::First => target_ids.first().copied(),
        HostTarget::Application => target_ids.iter().copied().find(|id| {
            graph
                .get(id)
                .map(|target| {
                    target.get_str("productType") == Some(kinds::product_type::APPLICATION)
                })
                .unwrap_or(false)
        }),
        HostTarget::Named(name) => target_ids.iter().copied().find(|id| {
            graph
                .get(id)
                .map(|target| target.get_str("name") == Some(name.as_str()))
                .unwrap_or(false)
        }),
    };
    let selected = selected
        .map(ObjectId::new)
        .ok_or_else(|| Error::HostTargetNotFound { host: host.clone() })?;
    if selected == *extension {
        let name = graph
            .get(extension.as_str())
            .and_then(|target| target.get_str("name"))
            .unwrap_or_default()
            .to_owned();
        return Err(Error::EmbedIntoSelf { name });
    }
    Ok(selected)
}

/// Ensures the host carries a copy-files phase bound for the PlugIns folder
/// and that the extension's product is copied by it. An existing embed phase
/// (say, from an earlier extension) is reused rather than duplicated.
///
/// Returns the phase's ID.
pub fn install_embed_phase(
    graph: &mut Graph,
    host_id: &ObjectId,
    product_id: &ObjectId,
    target_name: &str,
) -> Result<ObjectId, Error> {
    let build_file_id = ObjectId::derive("embed-build-file", &[target_name]);
    let mut build_file = Object::new(kinds::isa::BUILD_FILE);
    build_file.set("fileRef", product_id);
    let mut settings = Dict::new();
    settings.insert(
        "ATTRIBUTES".to_owned(),
        Value::Array(vec![Value::from("RemoveHeadersOnCopy")]),
    );
    build_file.set("settings", settings);
    graph.insert(build_file_id.clone(), build_file)?;

    let host = graph.resolve(host_id.as_str(), "host target")?;
    let existing = host
        .get_array("buildPhases")
        .unwrap_or(&[])
        .iter()
        .filter_map(Value::as_str)
        .find(|phase_id| {
            graph
                .get(phase_id)
                .map(|phase| {
                    phase.kind() == kinds::isa::COPY_FILES_BUILD_PHASE
                        && phase.get_str("dstSubfolderSpec")
                            == Some(kinds::CopyDestination::PlugIns.code())
                })
                .unwrap_or(false)
        })
        .map(ObjectId::new);
    match existing {
        Some(phase_id) => {
            let phase = graph.object_mut(&phase_id, "embed phase")?;
            match phase.array_mut("files") {
                Some(files) => files.push(Value::from(&build_file_id)),
                None => phase.set("files", vec![Value::from(&build_file_id)]),
            }
            Ok(phase_id)
        }
        None => {
            let phase_id = ObjectId::derive("embed-phase", &[host_id.as_str()]);
            let mut phase = Object::new(kinds::isa::COPY_FILES_BUILD_PHASE);
            phase.set("buildActionMask", "2147483647");
            phase.set("dstPath", "");
            phase.set("dstSubfolderSpec", kinds::CopyDestination::PlugIns.code());
            phase.set("files", vec![Value::from(&build_file_id)]);
            phase.set("name", EMBED_PHASE_NAME);
            phase.set("runOnlyForDeploymentPostprocessing", "0");
            graph.insert(phase_id.clone(), phase)?;
            let host = graph.object_mut(host_id, "host target")?;
            match host.array_mut("buildPhases") {
                Some(phases) => phases.push(Value::from(&phase_id)),
                None => host.set("buildPhases", vec![Value::from(&phase_id)]),
            }
            Ok(phase_id)
        }
    }
}
