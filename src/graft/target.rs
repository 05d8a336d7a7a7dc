use super::Error;
use crate::pbxproj::{kinds, Dict, Graph, Object, ObjectId, Value};

/// IDs of the objects `create_target` adds to the graph.
#[derive(Debug)]
pub struct CreatedTarget {
    pub target: ObjectId,
    pub product: ObjectId,
    pub configurations: Vec<ObjectId>,
}

/// Creates the extension's native target: its product reference, its own
/// configuration list (one configuration per name the project declares), and
/// the target object itself, appended to the project's target list.
///
/// Configuration names mirror the project's so that scheme switching keeps
/// both targets in step; a project with no configuration list of its own
/// falls back to the stock Debug/Release pair.
pub fn create_target(graph: &mut Graph, name: &str) -> Result<CreatedTarget, Error> {
    let mut configuration_names = graph.configuration_names()?;
    if configuration_names.is_empty() {
        configuration_names = vec!["Debug".to_owned(), "Release".to_owned()];
    }
    let default_configuration = graph
        .default_configuration_name()
        .unwrap_or("Release")
        .to_owned();
    let parent_group = match graph.products_group() {
        Some(group) => group,
        None => graph.main_group()?,
    };

    let target_id = ObjectId::derive("native-target", &[name]);
    let product_id = ObjectId::derive("product-reference", &[name]);
    let list_id = ObjectId::derive("configuration-list", &[name]);

    let mut configurations = Vec::with_capacity(configuration_names.len());
    for configuration_name in &configuration_names {
        let config_id =
            ObjectId::derive("build-configuration", &[name, configuration_name.as_str()]);
        let mut configuration = Object::new(kinds::isa::BUILD_CONFIGURATION);
        configuration.set("buildSettings", Dict::new());
        configuration.set("name", configuration_name.as_str());
        graph.insert(config_id.clone(), configuration)?;
        configurations.push(config_id);
    }

    let mut list = Object::new(kinds::isa::CONFIGURATION_LIST);
    list.set(
        "buildConfigurations",
        configurations.iter().map(Value::from).collect::<Vec<_>>(),
    );
    list.set("defaultConfigurationIsVisible", "0");
    list.set("defaultConfigurationName", default_configuration);
    graph.insert(list_id.clone(), list)?;

    let mut product = Object::new(kinds::isa::FILE_REFERENCE);
    product.set(
        "explicitFileType",
        kinds::product_file_type(kinds::product_type::APP_EXTENSION),
    );
    product.set("includeInIndex", "0");
    product.set("path", format!("{}.appex", name));
    product.set("sourceTree", "BUILT_PRODUCTS_DIR");
    graph.insert(product_id.clone(), product)?;
    let group = graph.object_mut(&parent_group, "productRefGroup")?;
    match group.array_mut("children") {
        Some(children) => children.push(Value::from(&product_id)),
        None => group.set("children", vec![Value::from(&product_id)]),
    }

    let mut target = Object::new(kinds::isa::NATIVE_TARGET);
    target.set("buildConfigurationList", &list_id);
    target.set("buildPhases", Vec::<Value>::new());
    target.set("buildRules", Vec::<Value>::new());
    target.set("dependencies", Vec::<Value>::new());
    target.set("name", name);
    target.set("productName", name);
    target.set("productReference", &product_id);
    target.set("productType", kinds::product_type::APP_EXTENSION);
    graph.insert(target_id.clone(), target)?;

    let root_id = graph.root_object().clone();
    let project = graph.object_mut(&root_id, "rootObject")?;
    match project.array_mut("targets") {
        Some(targets) => targets.push(Value::from(&target_id)),
        None => project.set("targets", vec![Value::from(&target_id)]),
    }

    Ok(CreatedTarget {
        target: target_id,
        product: product_id,
        configurations,
    })
}

/// Registers `file_ref` for compilation by `target_id`, creating the target's
/// sources phase on first use. Returns the new build file's ID.
pub fn add_source_file(
    graph: &mut Graph,
    target_id: &ObjectId,
    file_ref: &ObjectId,
    file_name: &str,
) -> Result<ObjectId, Error> {
    let build_file_id = ObjectId::derive("build-file", &[target_id.as_str(), file_name]);
    let mut build_file = Object::new(kinds::isa::BUILD_FILE);
    build_file.set("fileRef", file_ref);
    graph.insert(build_file_id.clone(), build_file)?;

    let target = graph.resolve(target_id.as_str(), "native target")?;
    let existing = target
        .get_array("buildPhases")
        .unwrap_or(&[])
        .iter()
        .filter_map(Value::as_str)
        .find(|phase_id| {
            graph
                .get(phase_id)
                .map(|phase| phase.kind() == kinds::isa::SOURCES_BUILD_PHASE)
                .unwrap_or(false)
        })
        .map(ObjectId::new);
    match existing {
        Some(phase_id) => {
            let phase = graph.object_mut(&phase_id, "sources phase")?;
            match phase.array_mut("files") {
                Some(files) => files.push(Value::from(&build_file_id)),
                None => phase.set("files", vec![Value::from(&build_file_id)]),
            }
        }
        None => {
            let phase_id = ObjectId::derive("sources-phase", &[target_id.as_str()]);
            let mut phase = Object::new(kinds::isa::SOURCES_BUILD_PHASE);
            phase.set("buildActionMask", "2147483647");
            phase.set("files", vec![Value::from(&build_file_id)]);
            phase.set("runOnlyForDeploymentPostprocessing", "0");
            graph.insert(phase_id.clone(), phase)?;
            let target = graph.object_mut(target_id, "native target")?;
            match target.array_mut("buildPhases") {
                Some(phases) => phases.push(Value::from(&phase_id)),
                None => target.set("buildPhases", vec![Value::from(&phase_id)]),
            }
        }
    }
    Ok(build_file_id)
}
