// tests/images.rs

//! End-to-end release planning: index fixtures through to the CI files.

mod common;

use common::{ci_workspace, read_yaml, FixtureIndex};
use pulp_images::release::{plan_galaxy_release, plan_pulp_release};
use pulp_images::{plan_release, ImageFamily, ImagesConfig};
use std::fs;

fn pulp_config(plugins: &[&str], releases_to_check: usize) -> ImagesConfig {
    let mut config = ImagesConfig::default();
    config.pulp.plugins = plugins.iter().map(|p| p.to_string()).collect();
    config.core.releases_to_check = releases_to_check;
    config
}

fn pulp_index() -> FixtureIndex {
    FixtureIndex::new()
        .release("pulpcore", "3.22.0", &[])
        .release("pulpcore", "3.21.2", &[])
        .release("pulpcore", "3.21.10", &[])
        .release("pulpcore", "not-a-version", &[])
        .release("pulp-file", "1.12.0", &["pulpcore (>=3.22,<3.25)"])
        .release("pulp-file", "1.11.1", &["pulpcore (>=3.21,<3.22)", "aiofiles"])
        .release("pulp-rpm", "3.19.0", &["pulpcore<3.24,>=3.21", "createrepo_c~=0.20"])
        .release("pulp-certguard", "1.5.5", &[])
}

#[test]
fn test_pulp_release_end_to_end() {
    let workspace = ci_workspace("pulp");
    let index = pulp_index();
    let config = pulp_config(&["pulp-rpm", "pulp-file", "pulp-certguard"], 1);

    let plan = plan_pulp_release(&index, &config).unwrap().unwrap();
    assert_eq!(plan.tag, "3.22.0");
    assert_eq!(
        plan.plugins,
        vec!["pulp-certguard==1.5.5", "pulp-file==1.12.0", "pulp-rpm==3.19.0"]
    );

    plan.persist(workspace.path(), &config.output).unwrap();

    let core = read_yaml(&workspace.path().join(".ci/ansible/pulp/vars.yaml"));
    assert_eq!(core["registry"].as_str(), Some("quay.io"));
    let images = core["images"].as_sequence().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["pulp_nightly"]["tag"].as_str(), Some("nightly"));

    let stable = &images[1]["pulp_stable"];
    assert_eq!(stable["image_name"].as_str(), Some("pulp"));
    assert_eq!(stable["tag"].as_str(), Some("3.22.0"));
    assert_eq!(stable["container_file"].as_str(), Some("Containerfile.core"));
    assert_eq!(stable["pulpcore"].as_str(), Some("pulpcore==3.22.0"));
    assert_eq!(stable["plugins"].as_sequence().unwrap().len(), 3);

    let web = read_yaml(&workspace.path().join(".ci/ansible/pulp/web/vars.yaml"));
    let web_stable = &web["images"][1]["pulp_web_stable"];
    assert_eq!(web_stable["image_name"].as_str(), Some("pulp-web"));
    assert_eq!(web_stable["container_file"].as_str(), Some("Containerfile.web"));
    assert_eq!(web_stable["base_image_name"].as_str(), Some("pulp"));
    assert_eq!(web_stable["python_version"].as_str(), Some("3.9"));
    assert_eq!(web_stable["plugin_snippets"][2].as_str(), Some("pulp_python"));

    let deploy = fs::read_to_string(workspace.path().join(".ci/scripts/deploy.sh")).unwrap();
    let lines: Vec<&str> = deploy.lines().collect();
    assert_eq!(lines[0], "#!/bin/bash");
    assert_eq!(
        lines[2],
        "sudo -E QUAY_REPO_NAME=pulp QUAY_IMAGE_TAG=\"3.22.0\" $GITHUB_WORKSPACE/.ci/scripts/quay-push.sh"
    );
    assert_eq!(
        lines[3],
        "sudo -E QUAY_REPO_NAME=pulp-web QUAY_IMAGE_TAG=\"3.22.0\" $GITHUB_WORKSPACE/.ci/scripts/quay-push.sh"
    );
}

#[test]
fn test_pulp_release_falls_back_to_older_plugin_release() {
    let index = FixtureIndex::new()
        .release("pulpcore", "3.21.10", &[])
        .release("pulp-file", "1.12.0", &["pulpcore (>=3.22,<3.25)"])
        .release("pulp-file", "1.11.1", &["pulpcore (>=3.21,<3.22)"]);

    let plan = plan_pulp_release(&index, &pulp_config(&["pulp-file"], 1))
        .unwrap()
        .unwrap();
    assert_eq!(plan.plugins, vec!["pulp-file==1.11.1"]);
    assert_eq!(
        index.fetches().iter().filter(|f| f.contains("==")).collect::<Vec<_>>(),
        vec!["pulp-file==1.11.1"]
    );
}

#[test]
fn test_core_releases_ordered_by_version() {
    // The index reports 3.21.2 as newest, but 3.21.10 is the higher release
    let index = FixtureIndex::new()
        .release("pulpcore", "3.21.2", &[])
        .release("pulpcore", "3.21.10", &[])
        .release("pulp-file", "1.11.1", &["pulpcore>=3.21.10"]);

    let plan = plan_pulp_release(&index, &pulp_config(&["pulp-file"], 1))
        .unwrap()
        .unwrap();
    assert_eq!(plan.tag, "3.21.10");
}

#[test]
fn test_pulp_release_advances_core_versions() {
    let index = FixtureIndex::new()
        .release("pulpcore", "3.22.0", &[])
        .release("pulpcore", "3.21.10", &[])
        .release("pulp-deb", "2.20.0", &["pulpcore>=3.21,<3.22"]);

    let none = plan_pulp_release(&index, &pulp_config(&["pulp-deb"], 1)).unwrap();
    assert!(none.is_none());

    let plan = plan_pulp_release(&index, &pulp_config(&["pulp-deb"], 2))
        .unwrap()
        .unwrap();
    assert_eq!(plan.tag, "3.21.10");
    assert_eq!(plan.pulpcore, "pulpcore==3.21.10");
}

#[test]
fn test_unknown_plugin_excluded() {
    let index = pulp_index();
    let config = pulp_config(&["pulp-file", "pulp-nonexistent"], 1);

    let plan = plan_pulp_release(&index, &config).unwrap().unwrap();
    assert_eq!(plan.plugins, vec!["pulp-file==1.12.0"]);
}

#[test]
fn test_shim_plugin_blocks_release_and_nothing_written() {
    let workspace = ci_workspace("pulp");
    let vars_path = workspace.path().join(".ci/ansible/pulp/vars.yaml");
    let before = fs::read_to_string(&vars_path).unwrap();

    let index = pulp_index().release("pulp-ansible", "0.1.0", &["pulpcore-plugin>=0.1"]);
    let config = pulp_config(&["pulp-file", "pulp-ansible"], 3);

    let plan = plan_release(ImageFamily::Pulp, &index, &config).unwrap();
    assert!(plan.is_none());
    assert_eq!(fs::read_to_string(&vars_path).unwrap(), before);
}

#[test]
fn test_galaxy_release_end_to_end() {
    let workspace = ci_workspace("galaxy");
    let index = FixtureIndex::new()
        .release(
            "galaxy_ng",
            "4.6.3",
            &["django-prometheus>=2.0.0", "pulpcore (<3.22,>=3.21.0)", "pulp-ansible (>=0.15)"],
        )
        .release("galaxy_ng", "4.5.0", &["pulpcore (<3.20,>=3.19.0)"]);
    let config = ImagesConfig::default();

    let plan = plan_galaxy_release(&index, &config).unwrap();
    assert_eq!(plan.summary(), "galaxy_ng==4.6.3 pulpcore<3.22,>=3.21.0");
    plan.persist(workspace.path(), &config.output).unwrap();

    let core = read_yaml(&workspace.path().join(".ci/ansible/galaxy/vars.yaml"));
    let stable = &core["images"][1]["galaxy_stable"];
    assert_eq!(stable["image_name"].as_str(), Some("galaxy"));
    assert_eq!(stable["tag"].as_str(), Some("4.6.3"));
    assert_eq!(stable["pulpcore"].as_str(), Some("\"pulpcore<3.22,>=3.21.0\""));
    assert_eq!(stable["plugins"][0].as_str(), Some("galaxy_ng==4.6.3"));

    let web = read_yaml(&workspace.path().join(".ci/ansible/galaxy/web/vars.yaml"));
    let web_stable = &web["images"][1]["galaxy_web_stable"];
    assert_eq!(web_stable["image_name"].as_str(), Some("galaxy-web"));
    assert_eq!(web_stable["base_image_name"].as_str(), Some("galaxy"));
    assert_eq!(web_stable["plugin_snippets"][0].as_str(), Some("galaxy_ng"));

    let deploy = fs::read_to_string(workspace.path().join(".ci/scripts/deploy.sh")).unwrap();
    assert!(deploy.contains("QUAY_REPO_NAME=galaxy QUAY_IMAGE_TAG=\"4.6.3\""));
    assert!(deploy.contains("QUAY_REPO_NAME=galaxy-web QUAY_IMAGE_TAG=\"4.6.3\""));
}

#[test]
fn test_persist_fails_without_vars_files() {
    let workspace = tempfile::tempdir().unwrap();
    let index = pulp_index();
    let config = pulp_config(&["pulp-file"], 1);

    let plan = plan_pulp_release(&index, &config).unwrap().unwrap();
    let err = plan.persist(workspace.path(), &config.output).unwrap_err();
    assert!(matches!(err, pulp_images::Error::PersistenceFailed(_)));
    assert!(!workspace.path().join(".ci/scripts/deploy.sh").exists());
}

#[test]
fn test_repeated_runs_append() {
    let workspace = ci_workspace("pulp");
    let index = pulp_index();
    let config = pulp_config(&["pulp-file"], 1);

    for _ in 0..2 {
        let plan = plan_pulp_release(&index, &config).unwrap().unwrap();
        plan.persist(workspace.path(), &config.output).unwrap();
    }

    let core = read_yaml(&workspace.path().join(".ci/ansible/pulp/vars.yaml"));
    assert_eq!(core["images"].as_sequence().unwrap().len(), 3);

    let deploy = fs::read_to_string(workspace.path().join(".ci/scripts/deploy.sh")).unwrap();
    assert_eq!(deploy.matches("quay-push.sh").count(), 4);
}
