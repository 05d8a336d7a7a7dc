use super::Error;
use crate::pbxproj::{kinds, Graph, Object, ObjectId, Value};

/// IDs of the group `create_group` adds, with one file reference per name
/// passed in, in the same order.
#[derive(Debug)]
pub struct CreatedGroup {
    pub group: ObjectId,
    pub file_refs: Vec<ObjectId>,
}

/// Creates the extension's source group. Its `path` points at the folder of
/// the same name next to the `.xcodeproj`, and each file reference resolves
/// relative to that folder.
pub fn create_group(
    graph: &mut Graph,
    name: &str,
    file_names: &[String],
) -> Result<CreatedGroup, Error> {
    let mut file_refs = Vec::with_capacity(file_names.len());
    let mut children = Vec::with_capacity(file_names.len());
    for file_name in file_names {
        let ref_id = ObjectId::derive("file-reference", &[name, file_name.as_str()]);
        let mut file_ref = Object::new(kinds::isa::FILE_REFERENCE);
        file_ref.set("fileEncoding", "4");
        file_ref.set(
            "lastKnownFileType",
            kinds::last_known_file_type(file_name),
        );
        file_ref.set("path", file_name.as_str());
        file_ref.set("sourceTree", "<group>");
        graph.insert(ref_id.clone(), file_ref)?;
        children.push(Value::from(&ref_id));
        file_refs.push(ref_id);
    }
    let group_id = ObjectId::derive("group", &[name]);
    let mut group = Object::new(kinds::isa::GROUP);
    group.set("children", children);
    group.set("name", name);
    group.set("path", name);
    group.set("sourceTree", "<group>");
    graph.insert(group_id.clone(), group)?;
    Ok(CreatedGroup {
        group: group_id,
        file_refs,
    })
}

/// Hooks `group_id` into the project's main group. A main-group child that
/// already displays as `name` (by name or by path) makes this fail rather
/// than leaving two identically-labelled groups in the navigator.
pub fn link_group(graph: &mut Graph, group_id: &ObjectId, name: &str) -> Result<(), Error> {
    let main_group_id = graph.main_group()?;
    let main_group = graph.resolve(main_group_id.as_str(), "mainGroup")?;
    let taken = main_group
        .get_array("children")
        .unwrap_or(&[])
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|child_id| graph.get(child_id))
        .any(|child| child.get_str("name").or_else(|| child.get_str("path")) == Some(name));
    if taken {
        return Err(Error::GroupNameTaken {
            name: name.to_owned(),
        });
    }
    let main_group = graph.object_mut(&main_group_id, "mainGroup")?;
    match main_group.array_mut("children") {
        Some(children) => children.push(Value::from(group_id)),
        None => main_group.set("children", vec![Value::from(group_id)]),
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pbxproj::testing;

    fn file_names() -> Vec<String> {
        vec![
            "NotificationService.swift".to_owned(),
            "Info.plist".to_owned(),
        ]
    }

    #[test]
    fn test_create_group() {
        let mut graph = Graph::parse(testing::MINIMAL_PROJECT).unwrap();
        let created = create_group(&mut graph, "NotificationService", &file_names()).unwrap();

        let group = graph.get(created.group.as_str()).unwrap();
        assert_eq!(group.kind(), kinds::isa::GROUP);
        assert_eq!(group.get_str("name"), Some("NotificationService"));
        assert_eq!(group.get_str("path"), Some("NotificationService"));
        assert_eq!(group.get_str("sourceTree"), Some("<group>"));
        let children: Vec<_> = group
            .get_array("children")
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        let refs: Vec<_> = created.file_refs.iter().map(ObjectId::as_str).collect();
        assert_eq!(children, refs);

        let source = graph.get(created.file_refs[0].as_str()).unwrap();
        assert_eq!(source.get_str("lastKnownFileType"), Some("sourcecode.swift"));
        assert_eq!(source.get_str("path"), Some("NotificationService.swift"));
        assert_eq!(source.get_str("fileEncoding"), Some("4"));
        let manifest = graph.get(created.file_refs[1].as_str()).unwrap();
        assert_eq!(manifest.get_str("lastKnownFileType"), Some("text.plist.xml"));
    }

    #[test]
    fn test_link_group() {
        let mut graph = Graph::parse(testing::MINIMAL_PROJECT).unwrap();
        let created = create_group(&mut graph, "NotificationService", &file_names()).unwrap();
        link_group(&mut graph, &created.group, "NotificationService").unwrap();
        let children = graph
            .get(testing::MAIN_GROUP_ID)
            .and_then(|group| group.get_array("children"))
            .unwrap();
        assert_eq!(
            children.last().and_then(Value::as_str),
            Some(created.group.as_str())
        );
    }

    #[test]
    fn test_link_group_name_taken() {
        let mut graph = Graph::parse(testing::MINIMAL_PROJECT).unwrap();
        // "MainApp" collides with the app's own group, which displays by path
        let created = create_group(&mut graph, "MainApp", &file_names()).unwrap();
        let err = link_group(&mut graph, &created.group, "MainApp").unwrap_err();
        match err {
            Error::GroupNameTaken { name } => assert_eq!(name, "MainApp"),
            other => panic!("expected GroupNameTaken, got {:?}", other),
        }
    }

    #[test]
    fn test_link_group_twice_collides() {
        let mut graph = Graph::parse(testing::MINIMAL_PROJECT).unwrap();
        let first = create_group(&mut graph, "WidgetExt", &file_names()).unwrap();
        link_group(&mut graph, &first.group, "WidgetExt").unwrap();
        let second_id = ObjectId::derive("group", &["WidgetExt", "again"]);
        let mut second = Object::new(kinds::isa::GROUP);
        second.set("children", Vec::<Value>::new());
        second.set("name", "WidgetExt");
        graph.insert(second_id.clone(), second).unwrap();
        let err = link_group(&mut graph, &second_id, "WidgetExt").unwrap_err();
        assert!(matches!(err, Error::GroupNameTaken { .. }));
    }
}
