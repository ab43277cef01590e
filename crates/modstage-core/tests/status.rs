mod support;

use modstage_core::clean::clean_workspace;
use modstage_core::fs::{ArtifactFilter, SuffixRule};
use modstage_core::status::{BuildOutputStatus, StagedIntegrity, collect_status};

use support::{Project, write_file};

#[test]
fn empty_project_reports_everything_missing() {
    let project = Project::empty();

    let status = collect_status(&project.layout, &ArtifactFilter::default(), false)
        .expect("status should succeed");

    assert!(status.inputs.iter().all(|input| !input.present));
    assert!(!status.workspace_exists);
    assert!(
        status
            .staged
            .iter()
            .all(|staged| staged.integrity == StagedIntegrity::NotStaged)
    );
    assert_eq!(status.mods, None);
    assert_eq!(status.build_output, BuildOutputStatus::Missing);
    assert_eq!(status.issues(), 3);
}

#[test]
fn build_output_split_into_qualifying_and_rejected() {
    let project = Project::with_inputs();
    project.write_build_output("plugin.jar", "p");
    project.write_build_output("plugin-sources.jar", "s");

    let status = collect_status(&project.layout, &ArtifactFilter::default(), false)
        .expect("status should succeed");

    assert_eq!(
        status.build_output,
        BuildOutputStatus::Present {
            qualifying: vec!["plugin.jar".to_string()],
            rejected: vec!["plugin-sources.jar".to_string()],
        }
    );
    assert_eq!(status.issues(), 0);
}

#[test]
fn extra_deny_rules_move_jars_to_rejected() {
    let project = Project::with_inputs();
    project.write_build_output("plugin.jar", "p");
    project.write_build_output("plugin-plain.jar", "plain");
    let filter = ArtifactFilter::plugin_jars().with_rule(SuffixRule::deny("-plain.jar"));

    let status = collect_status(&project.layout, &filter, false).expect("status should succeed");

    assert_eq!(
        status.build_output,
        BuildOutputStatus::Present {
            qualifying: vec!["plugin.jar".to_string()],
            rejected: vec!["plugin-plain.jar".to_string()],
        }
    );
}

#[test]
fn verify_detects_customized_staged_copy() {
    let project = Project::with_inputs();
    write_file(&project.layout.workspace.server_archive, "server-v1");
    write_file(&project.layout.workspace.assets_archive, "patched assets");
    write_file(&project.layout.workspace.mods_dir.join("plugin.jar"), "p");

    let unverified = collect_status(&project.layout, &ArtifactFilter::default(), false)
        .expect("status should succeed");
    assert!(
        unverified
            .staged
            .iter()
            .all(|staged| staged.integrity == StagedIntegrity::Unverified)
    );

    let verified = collect_status(&project.layout, &ArtifactFilter::default(), true)
        .expect("status should succeed");
    let integrity: Vec<StagedIntegrity> =
        verified.staged.iter().map(|staged| staged.integrity).collect();
    assert_eq!(
        integrity,
        vec![StagedIntegrity::Matches, StagedIntegrity::Customized]
    );
    assert_eq!(verified.mods, Some(vec!["plugin.jar".to_string()]));
}

#[test]
fn status_serializes_to_json() {
    let project = Project::with_inputs();
    project.write_build_output("plugin.jar", "p");

    let status = collect_status(&project.layout, &ArtifactFilter::default(), false)
        .expect("status should succeed");
    let json = serde_json::to_value(&status).expect("status should serialize");

    assert_eq!(json["build_output"]["state"], "present");
    assert_eq!(json["staged"][0]["integrity"], "not-staged");
    assert_eq!(json["inputs"][1]["name"], "Assets.zip");
}

#[test]
fn clean_removes_workspace_but_not_inputs() {
    let project = Project::with_inputs();
    write_file(&project.layout.workspace.mods_dir.join("plugin.jar"), "p");

    assert!(clean_workspace(&project.layout.workspace).expect("clean should succeed"));
    assert!(!project.layout.workspace.root.exists());
    assert!(project.layout.server.exists());
    assert!(project.layout.assets.exists());

    assert!(!clean_workspace(&project.layout.workspace).expect("second clean should succeed"));
}
