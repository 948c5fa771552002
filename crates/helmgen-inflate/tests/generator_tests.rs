//! End-to-end inflation tests against a fake helm binary

#![cfg(unix)]

mod common;

use common::{generate, loader, workspace, FakeHelm, NGINX_VALUES, REDIS_VALUES};
use helmgen_core::{Loader, Values, YamlResourceFactory};
use helmgen_inflate::{HelmChartInflationGenerator, InflateError};
use std::path::PathBuf;

fn values_of(resource: &helmgen_core::Resource) -> Values {
    let text = resource
        .get("data.values")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    Values::from_yaml(text).unwrap()
}

#[test]
fn test_values_file_copied_verbatim_without_inline_values() {
    let root = workspace();
    let helm = FakeHelm::new();

    let resources = generate(&helm, root.path(), "name: nginx\n").unwrap();

    assert_eq!(resources.len(), 1);
    let resource = &resources.resources()[0];
    assert_eq!(resource.kind(), Some("ConfigMap"));
    assert_eq!(resource.name(), Some("nginx"));
    assert_eq!(helm.last_values(), NGINX_VALUES);
}

#[test]
fn test_override_inline_values_win() {
    let root = workspace();
    let helm = FakeHelm::new();

    generate(
        &helm,
        root.path(),
        "name: nginx\nvaluesInline:\n  replicas: 3\n  image:\n    tag: \"1.27\"\n",
    )
    .unwrap();

    let values = Values::from_yaml(&helm.last_values()).unwrap();
    assert_eq!(values.get("replicas").and_then(|v| v.as_u64()), Some(3));
    assert_eq!(values.get("image.tag").and_then(|v| v.as_str()), Some("1.27"));
    assert_eq!(values.get("image.repository").and_then(|v| v.as_str()), Some("nginx"));
    assert_eq!(values.get("service.port").and_then(|v| v.as_u64()), Some(80));
}

#[test]
fn test_merge_base_values_win() {
    let root = workspace();
    let helm = FakeHelm::new();

    generate(
        &helm,
        root.path(),
        "name: nginx\nvaluesMerge: merge\nvaluesInline:\n  replicas: 3\n  ingress:\n    enabled: true\n",
    )
    .unwrap();

    let values = Values::from_yaml(&helm.last_values()).unwrap();
    assert_eq!(values.get("replicas").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(values.get("ingress.enabled").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(values.get("image.tag").and_then(|v| v.as_str()), Some("1.25"));
}

#[test]
fn test_replace_uses_inline_values_only() {
    let root = workspace();
    let helm = FakeHelm::new();

    let resources = generate(
        &helm,
        root.path(),
        "name: nginx\nvaluesMerge: replace\nvaluesInline:\n  replicas: 3\n",
    )
    .unwrap();

    let expected = Values::from_yaml("replicas: 3\n").unwrap();
    assert_eq!(Values::from_yaml(&helm.last_values()).unwrap(), expected);
    assert_eq!(values_of(&resources.resources()[0]), expected);
}

#[test]
fn test_merged_values_visible_after_generate() {
    let root = workspace();
    let helm = FakeHelm::new();
    let loader = loader(root.path());
    let factory = YamlResourceFactory;

    let mut generator = HelmChartInflationGenerator::configure(
        &helm.settings(),
        b"name: nginx\nvaluesInline:\n  replicas: 3\n",
        &loader,
        &factory,
    )
    .unwrap();
    generator.generate().unwrap();

    let inline = &generator.params().values.inline;
    assert_eq!(inline.get("replicas").and_then(|v| v.as_u64()), Some(3));
    assert_eq!(inline.get("image.repository").and_then(|v| v.as_str()), Some("nginx"));
}

#[test]
fn test_unknown_merge_policy_runs_nothing() {
    let root = workspace();
    let helm = FakeHelm::new();

    let err = generate(
        &helm,
        root.path(),
        "name: nginx\nvaluesMerge: append\nvaluesInline:\n  replicas: 3\n",
    )
    .unwrap_err();

    assert!(matches!(err, InflateError::Configuration { .. }));
    assert!(helm.calls().is_empty());
}

#[test]
fn test_disabled_inflation_runs_nothing() {
    let root = workspace();
    let helm = FakeHelm::new();
    let mut settings = helm.settings();
    settings.enabled = false;

    let err = helmgen_inflate::inflate(
        &settings,
        b"name: nginx\n",
        &loader(root.path()),
        &YamlResourceFactory,
    )
    .unwrap_err();

    assert!(err.to_string().contains("must specify --enable-helm"));
    assert!(helm.calls().is_empty());
}

#[test]
fn test_leading_note_before_manifests() {
    let root = workspace();
    let helm = FakeHelm::new();
    helm.set_preamble("NOTE: installed\n");

    let resources = generate(&helm, root.path(), "name: nginx\n").unwrap();

    assert_eq!(resources.len(), 1);
    assert_eq!(resources.resources()[0].name(), Some("nginx"));
}

#[test]
fn test_output_without_documents_fails() {
    let root = workspace();
    let helm = FakeHelm::new();
    helm.set_output("NOTE: nothing to render\n");

    let err = generate(&helm, root.path(), "name: nginx\n").unwrap_err();

    assert!(matches!(err, InflateError::OutputParse { .. }));
}

#[test]
fn test_helm_v2_rejected_before_chart_work() {
    let root = workspace();
    let helm = FakeHelm::with_version("v2.16.1+gbbdfe5e");

    let err = generate(&helm, root.path(), "name: nginx\n").unwrap_err();

    assert!(matches!(err, InflateError::UnsupportedToolVersion { .. }));
    assert_eq!(helm.calls(), vec!["version -c --short"]);
}

#[test]
fn test_render_failure_carries_context() {
    let root = workspace();
    let helm = FakeHelm::new();
    helm.fail();

    let err = generate(&helm, root.path(), "name: nginx\ndebug: true\n").unwrap_err();

    match &err {
        InflateError::Render {
            command,
            args,
            env,
            stderr,
            stdout,
            ..
        } => {
            assert_eq!(command, &helm.command());
            assert_eq!(args[0], "template");
            assert!(args.iter().any(|a| a == "--debug"));
            assert!(env.iter().any(|e| e.starts_with("HELM_CONFIG_HOME=")));
            assert!(stderr.contains("simulated failure"));
            assert!(stdout.is_some());
        }
        other => panic!("expected render error, got {:?}", other),
    }
    assert!(err.to_string().contains("simulated failure"));
}

#[test]
fn test_scratch_removed_after_success() {
    let root = workspace();
    let helm = FakeHelm::new();

    let resources = generate(&helm, root.path(), "name: nginx\n").unwrap();

    let values_path = helm.last_values_path();
    assert!(values_path.ends_with("nginx-helmgen-values.yaml"));
    assert!(!values_path.exists());
    assert!(!values_path.parent().unwrap().exists());

    let home = resources.resources()[0]
        .get("data.configHome")
        .and_then(|v| v.as_str())
        .unwrap()
        .to_string();
    assert_eq!(PathBuf::from(&home).parent(), values_path.parent());
}

#[test]
fn test_scratch_removed_after_failure() {
    let root = workspace();
    let helm = FakeHelm::new();
    helm.set_output("Error: nope\n");

    assert!(generate(&helm, root.path(), "name: nginx\n").is_err());

    let values_path = helm.last_values_path();
    assert!(!values_path.parent().unwrap().exists());
}

/// Every helm call ran with its home inside a scratch dir that is now gone
fn assert_scratch_removed(helm: &FakeHelm) {
    let homes = helm.homes();
    assert!(!homes.is_empty());
    for home in homes {
        let scratch = PathBuf::from(home);
        assert!(scratch.ends_with("helm"));
        assert!(!scratch.parent().unwrap().exists());
    }
}

#[test]
fn test_scratch_removed_after_version_rejected() {
    let root = workspace();
    let helm = FakeHelm::with_version("v2.16.1+gbbdfe5e");

    let err = generate(&helm, root.path(), "name: nginx\n").unwrap_err();

    assert!(matches!(err, InflateError::UnsupportedToolVersion { .. }));
    assert_scratch_removed(&helm);
}

#[test]
fn test_scratch_removed_after_chart_not_found() {
    let root = workspace();
    let helm = FakeHelm::new();

    let err = generate(&helm, root.path(), "name: podinfo\n").unwrap_err();

    assert!(matches!(err, InflateError::ChartNotFound { .. }));
    assert_scratch_removed(&helm);
}

#[test]
fn test_scratch_removed_after_render_failure() {
    let root = workspace();
    let helm = FakeHelm::new();
    helm.fail();

    let err = generate(&helm, root.path(), "name: nginx\nvaluesInline:\n  replicas: 2\n").unwrap_err();

    assert!(matches!(err, InflateError::Render { .. }));
    assert_eq!(helm.homes().len(), 2);
    assert_scratch_removed(&helm);
}

#[test]
fn test_missing_chart_is_pulled() {
    let root = workspace();
    let helm = FakeHelm::new();

    let resources = generate(
        &helm,
        root.path(),
        "name: podinfo\nversion: 6.5.0\nrepo: https://stefanprodan.github.io/podinfo\n",
    )
    .unwrap();

    let home = loader(root.path()).root().join("charts/podinfo-6.5.0");
    let calls = helm.calls();
    assert_eq!(calls[0], "version -c --short");
    assert_eq!(
        calls[1],
        format!(
            "pull --untar --untardir {} --repo https://stefanprodan.github.io/podinfo podinfo --version 6.5.0",
            home.display()
        )
    );
    assert!(calls[2].starts_with(&format!("template --generate-name {}", home.join("podinfo").display())));
    assert!(home.join("podinfo").is_dir());
    assert_eq!(helm.last_values(), "pulled: true\n");
    assert_eq!(resources.resources()[0].name(), Some("podinfo"));
}

#[test]
fn test_local_chart_is_not_pulled() {
    let root = workspace();
    let helm = FakeHelm::new();

    generate(&helm, root.path(), "name: nginx\nrepo: https://charts.example.com\n").unwrap();

    assert!(helm.calls().iter().all(|c| !c.starts_with("pull")));
}

#[test]
fn test_missing_chart_without_repo() {
    let root = workspace();
    let helm = FakeHelm::new();

    let err = generate(&helm, root.path(), "name: podinfo\n").unwrap_err();

    assert!(matches!(err, InflateError::ChartNotFound { .. }));
    assert!(err.to_string().starts_with("no repo specified for pull, no chart found at"));
    assert_eq!(helm.calls(), vec!["version -c --short"]);
}

#[test]
fn test_configured_home_is_used() {
    let root = workspace();
    let home = tempfile::TempDir::new().unwrap();
    let helm = FakeHelm::new();

    generate(
        &helm,
        root.path(),
        &format!("name: nginx\nconfigHome: {}\n", home.path().display()),
    )
    .unwrap();

    let homes = helm.homes();
    assert_eq!(homes.len(), 2);
    assert!(homes.iter().all(|h| h == &home.path().display().to_string()));
}

#[test]
fn test_additional_values_files_passed_to_template() {
    let root = workspace();
    let helm = FakeHelm::new();

    generate(
        &helm,
        root.path(),
        "name: nginx\nadditionalValuesFiles: [values-prod.yaml]\n",
    )
    .unwrap();

    let extra = loader(root.path()).root().join("values-prod.yaml");
    let template = helm.calls().pop().unwrap();
    assert!(template.ends_with(&format!("-f {}", extra.display())));
}

#[test]
fn test_additional_values_file_outside_root_rejected() {
    let root = workspace();
    let helm = FakeHelm::new();

    let err = generate(
        &helm,
        root.path(),
        "name: nginx\nadditionalValuesFiles: [../../etc/passwd]\n",
    )
    .unwrap_err();

    assert!(matches!(err, InflateError::Configuration { .. }));
    assert!(helm.calls().is_empty());
}

#[test]
fn test_concurrent_inflations_are_isolated() {
    let root = workspace();
    let helm = FakeHelm::new();

    let (nginx, redis) = std::thread::scope(|s| {
        let nginx = s.spawn(|| {
            generate(&helm, root.path(), "name: nginx\nvaluesInline:\n  marker: nginx-only\n")
        });
        let redis = s.spawn(|| {
            generate(&helm, root.path(), "name: redis\nvaluesInline:\n  marker: redis-only\n")
        });
        (nginx.join().unwrap().unwrap(), redis.join().unwrap().unwrap())
    });

    let nginx = &nginx.resources()[0];
    let redis = &redis.resources()[0];

    let nginx_values = values_of(nginx);
    let redis_values = values_of(redis);
    assert_eq!(nginx_values.get("marker").and_then(|v| v.as_str()), Some("nginx-only"));
    assert_eq!(redis_values.get("marker").and_then(|v| v.as_str()), Some("redis-only"));
    assert!(nginx_values.get("architecture").is_none());
    assert_eq!(
        redis_values.get("architecture").and_then(|v| v.as_str()),
        Values::from_yaml(REDIS_VALUES).unwrap().get("architecture").and_then(|v| v.as_str())
    );
    assert_ne!(nginx.get("data.configHome"), redis.get("data.configHome"));
}
