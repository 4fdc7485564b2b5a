use super::*;

fn metadata(json: &str) -> PluginMetadata {
    PluginMetadata::from_json_str(json).unwrap()
}

fn quick_info_filter() -> PluginFilter {
    PluginFilter::for_file_type("typescript").requiring(CapabilityDescriptor {
        language_service: Some(vec!["quick-info".to_string()]),
        ..CapabilityDescriptor::default()
    })
}

#[test]
fn declared_language_service_satisfies_filter() {
    let plugin = metadata(
        r#"{ "main": "lib/index.js", "engines": "^0.2", "oni": { "typescript": { "languageService": ["quick-info"] } } }"#,
    );
    assert!(matches(&plugin, &quick_info_filter()));
}

#[test]
fn plugin_without_file_type_or_wildcard_does_not_match() {
    let plugin = metadata(r#"{ "main": "index.js", "engines": "^0.2", "oni": {} }"#);
    assert!(!matches_file_type(&plugin, &quick_info_filter()));
    assert!(!matches(&plugin, &quick_info_filter()));
}

#[test]
fn wildcard_key_covers_any_file_type() {
    let plugin = metadata(r#"{ "oni": { "*": { "languageService": ["quick-info", "completion-provider"] } } }"#);
    assert!(matches_file_type(&plugin, &quick_info_filter()));
    assert!(matches(&plugin, &quick_info_filter()));
}

#[test]
fn filter_without_file_type_matches_trivially() {
    let plugin = metadata(r#"{ "oni": {} }"#);
    assert!(matches_file_type(&plugin, &PluginFilter::default()));
    assert!(matches(&plugin, &PluginFilter::default()));

    let empty = PluginFilter::for_file_type("");
    assert!(matches_file_type(&plugin, &empty));
}

#[test]
fn missing_required_method_fails() {
    let caps = CapabilityDescriptor {
        language_service: Some(vec!["quick-info".to_string()]),
        ..CapabilityDescriptor::default()
    };
    let required = CapabilityDescriptor {
        language_service: Some(vec!["quick-info".to_string(), "goto-definition".to_string()]),
        ..CapabilityDescriptor::default()
    };
    assert!(!meets_requirements(&caps, Some(&required)));
    assert!(!meets_requirements(&CapabilityDescriptor::default(), Some(&required)));
}

#[test]
fn required_commands_must_be_declared() {
    let mut declared = BTreeMap::new();
    declared.insert("format.document".to_string(), CommandInfo::default());
    declared.insert("run.tests".to_string(), CommandInfo::default());
    let caps = CapabilityDescriptor {
        commands: Some(declared),
        ..CapabilityDescriptor::default()
    };

    let mut wanted = BTreeMap::new();
    wanted.insert("run.tests".to_string(), CommandInfo::default());
    let required = CapabilityDescriptor {
        commands: Some(wanted.clone()),
        ..CapabilityDescriptor::default()
    };
    assert!(meets_requirements(&caps, Some(&required)));

    wanted.insert("deploy".to_string(), CommandInfo::default());
    let required = CapabilityDescriptor {
        commands: Some(wanted),
        ..CapabilityDescriptor::default()
    };
    assert!(!meets_requirements(&caps, Some(&required)));
}

#[test]
fn absent_requirements_are_vacuous() {
    let caps = CapabilityDescriptor::default();
    assert!(meets_requirements(&caps, None));
    assert!(meets_requirements(&caps, Some(&CapabilityDescriptor::default())));
}

#[test]
fn exact_file_type_takes_precedence_over_wildcard() {
    let plugin = metadata(
        r#"{ "oni": {
            "typescript": { "subscriptions": ["buffer-update"] },
            "*": { "languageService": ["quick-info"] }
        } }"#,
    );
    assert!(matches_file_type(&plugin, &quick_info_filter()));
    assert!(!matches(&plugin, &quick_info_filter()));
}

#[test]
fn requirements_without_file_type_check_every_descriptor() {
    let plugin = metadata(
        r#"{ "oni": {
            "python": { "subscriptions": ["buffer-update"] },
            "javascript": { "languageService": ["quick-info"] }
        } }"#,
    );
    let filter = PluginFilter::default().requiring(CapabilityDescriptor {
        language_service: Some(vec!["quick-info".to_string()]),
        ..CapabilityDescriptor::default()
    });
    assert!(matches(&plugin, &filter));
}

#[test]
fn select_plugins_honours_single_plugin() {
    let plugins = vec![
        ("none", metadata(r#"{ "oni": {} }"#)),
        ("ts", metadata(r#"{ "oni": { "typescript": { "languageService": ["quick-info"] } } }"#)),
        ("any", metadata(r#"{ "oni": { "*": { "languageService": ["quick-info"] } } }"#)),
    ];

    let all = select_plugins(&plugins, &quick_info_filter(), |(_, m)| m);
    let names: Vec<_> = all.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["ts", "any"]);

    let single = select_plugins(&plugins, &quick_info_filter().single(), |(_, m)| m);
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].0, "ts");
}

#[test]
fn filter_parses_from_json() {
    let filter: PluginFilter = serde_json::from_str(
        r#"{ "fileType": "typescript", "requiredCapabilities": { "languageService": ["quick-info"] }, "singlePlugin": true }"#,
    )
    .unwrap();
    assert_eq!(filter, quick_info_filter().single());
}
