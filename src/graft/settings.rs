use super::Error;
use crate::{
    config::Config,
    pbxproj::{Dict, Graph, Object, ObjectId, Value},
};

/// The build settings a grafted extension target starts out with. Keys are
/// emitted in the alphabetical order Xcode itself uses.
pub fn target_settings(config: &Config) -> Dict {
    let mut settings = Dict::new();
    if let Some(team) = config.development_team() {
        settings.insert("DEVELOPMENT_TEAM".to_owned(), Value::from(team));
    }
    settings.insert(
        "INFOPLIST_FILE".to_owned(),
        Value::from(format!("{}/Info.plist", config.target_name())),
    );
    settings.insert(
        "IPHONEOS_DEPLOYMENT_TARGET".to_owned(),
        Value::from(config.ios_version().to_string()),
    );
    settings.insert(
        "PRODUCT_BUNDLE_IDENTIFIER".to_owned(),
        Value::from(config.extension_identifier()),
    );
    settings.insert("PRODUCT_NAME".to_owned(), Value::from("$(TARGET_NAME)"));
    settings.insert("SKIP_INSTALL".to_owned(), Value::from("YES"));
    settings.insert(
        "SWIFT_VERSION".to_owned(),
        Value::from(config.swift_version().to_string()),
    );
    settings.insert("TARGETED_DEVICE_FAMILY".to_owned(), Value::from("1,2"));
    settings
}

fn write_settings(configuration: &mut Object, settings: &Dict) {
    let build_settings = configuration.ensure_dict_mut("buildSettings");
    for (key, value) in settings {
        build_settings.insert(key.clone(), value.clone());
    }
}

/// Writes `settings` into every configuration owned by `owner_id` and
/// nothing else. Same-named configurations belonging to other targets (or to
/// the project itself) are distinct objects and stay untouched.
pub fn propagate(graph: &mut Graph, owner_id: &ObjectId, settings: &Dict) -> Result<(), Error> {
    for config_id in graph.configurations_of(owner_id.as_str())? {
        write_settings(
            graph.object_mut(&config_id, "buildConfigurations")?,
            settings,
        );
    }
    Ok(())
}

/// Writes `settings` into the owner's configurations bearing
/// `configuration_name` and no others. Keys a `propagate` call already wrote
/// are overwritten, so name-dependent values go in last.
pub fn propagate_for(
    graph: &mut Graph,
    owner_id: &ObjectId,
    configuration_name: &str,
    settings: &Dict,
) -> Result<(), Error> {
    for config_id in graph.configurations_of(owner_id.as_str())? {
        let configuration = graph.object_mut(&config_id, "buildConfigurations")?;
        if configuration.get_str("name") == Some(configuration_name) {
            write_settings(configuration, settings);
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::super::target;
    use super::*;
    use crate::config::Raw;
    use crate::pbxproj::testing;

    fn config(team: Option<&str>) -> Config {
        Config::from_raw(Raw {
            app_identifier: Some("com.example.app".to_owned()),
            development_team: team.map(str::to_owned),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_target_settings() {
        let settings = target_settings(&config(Some("ABCDE12345")));
        let keys: Vec<_> = settings.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "DEVELOPMENT_TEAM",
                "INFOPLIST_FILE",
                "IPHONEOS_DEPLOYMENT_TARGET",
                "PRODUCT_BUNDLE_IDENTIFIER",
                "PRODUCT_NAME",
                "SKIP_INSTALL",
                "SWIFT_VERSION",
                "TARGETED_DEVICE_FAMILY",
            ]
        );
        let str_of = |key: &str| settings.get(key).and_then(Value::as_str);
        assert_eq!(str_of("DEVELOPMENT_TEAM"), Some("ABCDE12345"));
        assert_eq!(str_of("INFOPLIST_FILE"), Some("NotificationService/Info.plist"));
        assert_eq!(str_of("IPHONEOS_DEPLOYMENT_TARGET"), Some("13.0"));
        assert_eq!(
            str_of("PRODUCT_BUNDLE_IDENTIFIER"),
            Some("com.example.app.NotificationService")
        );
        assert_eq!(str_of("PRODUCT_NAME"), Some("$(TARGET_NAME)"));
        assert_eq!(str_of("SWIFT_VERSION"), Some("5.0"));
        assert_eq!(str_of("TARGETED_DEVICE_FAMILY"), Some("1,2"));
    }

    #[test]
    fn test_team_omitted_when_unset() {
        let settings = target_settings(&config(None));
        assert!(settings.get("DEVELOPMENT_TEAM").is_none());
    }

    #[test]
    fn test_propagate_touches_only_the_owner() {
        let mut graph = Graph::parse(testing::MINIMAL_PROJECT).unwrap();
        let before_app_debug = graph.get(testing::APP_TARGET_DEBUG_ID).cloned();
        let created = target::create_target(&mut graph, "NotificationService").unwrap();
        propagate(&mut graph, &created.target, &target_settings(&config(None))).unwrap();

        for config_id in &created.configurations {
            let build_settings = graph
                .get(config_id.as_str())
                .and_then(|configuration| configuration.get_dict("buildSettings"))
                .unwrap();
            assert_eq!(
                build_settings
                    .get("PRODUCT_BUNDLE_IDENTIFIER")
                    .and_then(Value::as_str),
                Some("com.example.app.NotificationService")
            );
            assert_eq!(
                build_settings.get("SKIP_INSTALL").and_then(Value::as_str),
                Some("YES")
            );
        }

        // the app's same-named configurations kept every setting they had
        assert_eq!(graph.get(testing::APP_TARGET_DEBUG_ID).cloned(), before_app_debug);
        let app_settings = graph
            .get(testing::APP_TARGET_DEBUG_ID)
            .and_then(|configuration| configuration.get_dict("buildSettings"))
            .unwrap();
        assert_eq!(
            app_settings
                .get("PRODUCT_BUNDLE_IDENTIFIER")
                .and_then(Value::as_str),
            Some("com.example.app")
        );
        assert!(app_settings.get("SKIP_INSTALL").is_none());

        // likewise the project-level pair
        for config_id in graph.configurations_of(testing::PROJECT_ID).unwrap() {
            let build_settings = graph
                .get(config_id.as_str())
                .and_then(|configuration| configuration.get_dict("buildSettings"))
                .unwrap();
            assert!(build_settings.get("PRODUCT_BUNDLE_IDENTIFIER").is_none());
            assert_eq!(
                build_settings.get("SDKROOT").and_then(Value::as_str),
                Some("iphoneos")
            );
        }
    }

    #[test]
    fn test_propagate_for_touches_one_name() {
        let mut graph = Graph::parse(testing::MINIMAL_PROJECT).unwrap();
        let created = target::create_target(&mut graph, "NotificationService").unwrap();
        propagate(&mut graph, &created.target, &target_settings(&config(None))).unwrap();

        let mut overrides = Dict::new();
        overrides.insert(
            "SWIFT_OPTIMIZATION_LEVEL".to_owned(),
            Value::from("-Onone"),
        );
        overrides.insert("SKIP_INSTALL".to_owned(), Value::from("NO"));
        propagate_for(&mut graph, &created.target, "Debug", &overrides).unwrap();

        for config_id in &created.configurations {
            let configuration = graph.get(config_id.as_str()).unwrap();
            let build_settings = configuration.get_dict("buildSettings").unwrap();
            let str_of = |key: &str| build_settings.get(key).and_then(Value::as_str);
            if configuration.get_str("name") == Some("Debug") {
                assert_eq!(str_of("SWIFT_OPTIMIZATION_LEVEL"), Some("-Onone"));
                // the override wins over the shared value
                assert_eq!(str_of("SKIP_INSTALL"), Some("NO"));
            } else {
                assert!(str_of("SWIFT_OPTIMIZATION_LEVEL").is_none());
                assert_eq!(str_of("SKIP_INSTALL"), Some("YES"));
            }
        }

        // the app's own Debug configuration doesn't pick up the override
        let app_debug_settings = graph
            .get(testing::APP_TARGET_DEBUG_ID)
            .and_then(|configuration| configuration.get_dict("buildSettings"))
            .unwrap();
        assert!(app_debug_settings.get("SWIFT_OPTIMIZATION_LEVEL").is_none());
    }
}
