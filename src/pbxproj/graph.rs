use super::{kinds, Dict, Object, ObjectId, Value};
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Object {id} ({role}) isn't present in the object table")]
    Dangling { id: ObjectId, role: &'static str },
    #[error("Root object {id} is a {kind}, expected a PBXProject")]
    RootNotProject { id: ObjectId, kind: String },
    #[error("{kind} object {id} is missing its {key:?} entry")]
    KeyMissing {
        id: ObjectId,
        kind: String,
        key: &'static str,
    },
    #[error("Object {id} is already present in the object table")]
    IdTaken { id: ObjectId },
}

fn is_build_phase(kind: &str) -> bool {
    kind.starts_with("PBX") && kind.ends_with("BuildPhase")
}

fn phase_display(phase: &Object) -> &str {
    match phase.kind() {
        kinds::isa::SOURCES_BUILD_PHASE => "Sources",
        kinds::isa::FRAMEWORKS_BUILD_PHASE => "Frameworks",
        kinds::isa::RESOURCES_BUILD_PHASE => "Resources",
        kinds::isa::HEADERS_BUILD_PHASE => "Headers",
        kinds::isa::COPY_FILES_BUILD_PHASE => phase.get_str("name").unwrap_or("CopyFiles"),
        kinds::isa::SHELL_SCRIPT_BUILD_PHASE => phase.get_str("name").unwrap_or("ShellScript"),
        "PBXRezBuildPhase" => "Rez",
        other => other,
    }
}

/// The parsed descriptor: its object table, the ID of the root project
/// object, and whatever other top-level entries the file carried.
///
/// Objects whose kinds this crate doesn't know anything about are kept
/// as-is, so rewriting a descriptor never sheds data.
#[derive(Clone, Debug, PartialEq)]
pub struct Graph {
    pub(crate) meta: Dict,
    pub(crate) objects: IndexMap<ObjectId, Object>,
    pub(crate) root_object: ObjectId,
    pub(crate) display_name: Option<String>,
}

impl Graph {
    pub fn objects(&self) -> impl Iterator<Item = (&ObjectId, &Object)> {
        self.objects.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Object> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Object> {
        self.objects.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.contains_key(id)
    }

    pub fn root_object(&self) -> &ObjectId {
        &self.root_object
    }

    /// Names the project for generated annotation comments. Xcode derives
    /// this from the `.xcodeproj` directory, which the graph itself doesn't
    /// know about.
    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = Some(name.into());
    }

    pub fn insert(&mut self, id: ObjectId, object: Object) -> Result<(), GraphError> {
        if self.contains(id.as_str()) {
            return Err(GraphError::IdTaken { id });
        }
        self.objects.insert(id, object);
        Ok(())
    }

    pub fn resolve(&self, id: &str, role: &'static str) -> Result<&Object, GraphError> {
        self.get(id).ok_or_else(|| GraphError::Dangling {
            id: ObjectId::new(id),
            role,
        })
    }

    pub fn object_mut(
        &mut self,
        id: &ObjectId,
        role: &'static str,
    ) -> Result<&mut Object, GraphError> {
        match self.objects.get_mut(id.as_str()) {
            Some(object) => Ok(object),
            None => Err(GraphError::Dangling {
                id: id.clone(),
                role,
            }),
        }
    }

    pub fn root_project(&self) -> Result<&Object, GraphError> {
        let object = self.resolve(self.root_object.as_str(), "rootObject")?;
        if object.kind() != kinds::isa::PROJECT {
            return Err(GraphError::RootNotProject {
                id: self.root_object.clone(),
                kind: object.kind().to_owned(),
            });
        }
        Ok(object)
    }

    pub fn native_targets(&self) -> impl Iterator<Item = (&ObjectId, &Object)> {
        self.objects
            .iter()
            .filter(|(_, object)| object.kind() == kinds::isa::NATIVE_TARGET)
    }

    pub fn target_by_name(&self, name: &str) -> Option<&ObjectId> {
        self.native_targets()
            .find(|(_, object)| object.get_str("name") == Some(name))
            .map(|(id, _)| id)
    }

    /// The configurations owned by `owner_id`, reached through its
    /// `buildConfigurationList` edge. Configurations are never looked up by
    /// name or by settings content; sharing a name with another target's
    /// configuration keeps them distinct objects.
    pub fn configurations_of(&self, owner_id: &str) -> Result<Vec<ObjectId>, GraphError> {
        let owner = self.resolve(owner_id, "configuration list owner")?;
        let list_id = owner.get_str("buildConfigurationList").ok_or_else(|| {
            GraphError::KeyMissing {
                id: ObjectId::new(owner_id),
                kind: owner.kind().to_owned(),
                key: "buildConfigurationList",
            }
        })?;
        let list = self.resolve(list_id, "buildConfigurationList")?;
        let ids = list
            .get_array("buildConfigurations")
            .ok_or_else(|| GraphError::KeyMissing {
                id: ObjectId::new(list_id),
                kind: list.kind().to_owned(),
                key: "buildConfigurations",
            })?;
        Ok(ids
            .iter()
            .filter_map(Value::as_str)
            .map(ObjectId::new)
            .collect())
    }

    /// Configuration names declared by the root project, in declaration
    /// order. Projects without a configuration list yield an empty list.
    pub fn configuration_names(&self) -> Result<Vec<String>, GraphError> {
        let project = self.root_project()?;
        let list_id = match project.get_str("buildConfigurationList") {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };
        let list = self.resolve(list_id, "buildConfigurationList")?;
        let mut names: Vec<String> = Vec::new();
        for value in list.get_array("buildConfigurations").unwrap_or(&[]) {
            if let Some(config_id) = value.as_str() {
                let config = self.resolve(config_id, "buildConfigurations")?;
                if let Some(name) = config.get_str("name") {
                    if !names.iter().any(|existing| existing.as_str() == name) {
                        names.push(name.to_owned());
                    }
                }
            }
        }
        Ok(names)
    }

    pub fn default_configuration_name(&self) -> Option<&str> {
        let project = self.get(self.root_object.as_str())?;
        let list = self.get(project.get_str("buildConfigurationList")?)?;
        list.get_str("defaultConfigurationName")
    }

    pub fn main_group(&self) -> Result<ObjectId, GraphError> {
        let project = self.root_project()?;
        project
            .get_str("mainGroup")
            .map(ObjectId::new)
            .ok_or_else(|| GraphError::KeyMissing {
                id: self.root_object.clone(),
                kind: kinds::isa::PROJECT.to_owned(),
                key: "mainGroup",
            })
    }

    pub fn products_group(&self) -> Option<ObjectId> {
        self.get(self.root_object.as_str())?
            .get_str("productRefGroup")
            .map(ObjectId::new)
    }

    /// The annotation comment Xcode would write next to references to `id`,
    /// or `None` for IDs (or kinds) that don't get one.
    pub fn comment_for(&self, id: &str) -> Option<String> {
        let object = self.get(id)?;
        match object.kind() {
            kinds::isa::PROJECT => Some("Project object".to_owned()),
            kinds::isa::NATIVE_TARGET | "PBXAggregateTarget" | "PBXLegacyTarget" => {
                object.get_str("name").map(str::to_owned)
            }
            kinds::isa::GROUP | kinds::isa::VARIANT_GROUP | kinds::isa::FILE_REFERENCE => object
                .get_str("name")
                .or_else(|| object.get_str("path"))
                .map(str::to_owned),
            kinds::isa::BUILD_CONFIGURATION => object.get_str("name").map(str::to_owned),
            kinds::isa::BUILD_FILE => self.build_file_comment(id, object),
            kinds::isa::CONFIGURATION_LIST => self.configuration_list_comment(id),
            "PBXTargetDependency" | "PBXContainerItemProxy" => Some(object.kind().to_owned()),
            kind if is_build_phase(kind) => Some(phase_display(object).to_owned()),
            _ => None,
        }
    }

    // `<file> in <phase>`, matching what Xcode writes for build files.
    fn build_file_comment(&self, id: &str, object: &Object) -> Option<String> {
        let file_ref = object.get_str("fileRef")?;
        let file = self.get(file_ref)?;
        let file_name = file.get_str("name").or_else(|| file.get_str("path"))?;
        let phase = self.objects.values().find(|candidate| {
            is_build_phase(candidate.kind())
                && candidate
                    .get_array("files")
                    .map(|files| files.iter().any(|value| value.as_str() == Some(id)))
                    .unwrap_or(false)
        });
        match phase {
            Some(phase) => Some(format!("{} in {}", file_name, phase_display(phase))),
            None => Some(file_name.to_owned()),
        }
    }

    fn configuration_list_comment(&self, id: &str) -> Option<String> {
        let owner = self
            .objects
            .values()
            .find(|candidate| candidate.get_str("buildConfigurationList") == Some(id))?;
        let display = if owner.kind() == kinds::isa::PROJECT {
            self.display_name.as_deref()
        } else {
            owner.get_str("name")
        };
        Some(match display {
            Some(name) => format!("Build configuration list for {} \"{}\"", owner.kind(), name),
            None => format!("Build configuration list for {}", owner.kind()),
        })
    }
}

#[cfg(test)]
mod test {
    use super::super::testing;
    use super::*;

    fn graph() -> Graph {
        Graph::parse(testing::MINIMAL_PROJECT).unwrap()
    }

    #[test]
    fn test_target_by_name() {
        let graph = graph();
        assert_eq!(
            graph.target_by_name("MainApp").map(ObjectId::as_str),
            Some(testing::APP_TARGET_ID)
        );
        assert_eq!(graph.target_by_name("NotificationService"), None);
    }

    #[test]
    fn test_configurations_follow_ownership() {
        let graph = graph();
        let configs = graph.configurations_of(testing::APP_TARGET_ID).unwrap();
        // the target's own configurations, not the project's same-named ones
        assert_eq!(
            configs.iter().map(ObjectId::as_str).collect::<Vec<_>>(),
            vec![testing::APP_TARGET_DEBUG_ID, testing::APP_TARGET_RELEASE_ID]
        );
    }

    #[test]
    fn test_configuration_names() {
        let graph = graph();
        assert_eq!(graph.configuration_names().unwrap(), vec!["Debug", "Release"]);
        assert_eq!(graph.default_configuration_name(), Some("Release"));
    }

    #[test]
    fn test_group_lookups() {
        let graph = graph();
        assert_eq!(
            graph.main_group().unwrap().as_str(),
            testing::MAIN_GROUP_ID
        );
        assert_eq!(
            graph.products_group().map(|id| id.as_str().to_owned()),
            Some(testing::PRODUCTS_GROUP_ID.to_owned())
        );
    }

    #[test]
    fn test_insert_refuses_taken_id() {
        let mut graph = graph();
        let err = graph
            .insert(
                ObjectId::new(testing::APP_TARGET_ID),
                Object::new(kinds::isa::GROUP),
            )
            .unwrap_err();
        assert!(matches!(err, GraphError::IdTaken { .. }));
    }

    #[test]
    fn test_resolve_dangling() {
        let graph = graph();
        let err = graph.resolve("FFFFFFFFFFFFFFFFFFFFFFFF", "fileRef").unwrap_err();
        assert!(matches!(err, GraphError::Dangling { role: "fileRef", .. }));
    }

    #[test]
    fn test_comments() {
        let mut graph = graph();
        assert_eq!(
            graph.comment_for(testing::PROJECT_ID).as_deref(),
            Some("Project object")
        );
        assert_eq!(
            graph.comment_for(testing::APP_TARGET_ID).as_deref(),
            Some("MainApp")
        );
        assert_eq!(
            graph.comment_for(testing::APP_BUILD_FILE_ID).as_deref(),
            Some("AppDelegate.swift in Sources")
        );
        assert_eq!(
            graph.comment_for(testing::APP_TARGET_LIST_ID).as_deref(),
            Some("Build configuration list for PBXNativeTarget \"MainApp\"")
        );
        // the main group has neither name nor path, so no comment
        assert_eq!(graph.comment_for(testing::MAIN_GROUP_ID), None);
        // the project's own list only gets a quoted name once one is known
        let project_list = graph
            .get(testing::PROJECT_ID)
            .and_then(|project| project.get_str("buildConfigurationList"))
            .map(str::to_owned)
            .unwrap();
        assert_eq!(
            graph.comment_for(&project_list).as_deref(),
            Some("Build configuration list for PBXProject")
        );
        graph.set_display_name("MainApp");
        assert_eq!(
            graph.comment_for(&project_list).as_deref(),
            Some("Build configuration list for PBXProject \"MainApp\"")
        );
    }
}
