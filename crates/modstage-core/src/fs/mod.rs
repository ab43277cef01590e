//! Filesystem primitives shared across stages.

pub mod artifacts;
pub mod hash;
pub mod stage;

pub use artifacts::{
    ArtifactFilter, ArtifactScan, BuildArtifact, RuleEffect, SuffixRule, discover_artifacts,
    scan_artifacts,
};
pub use hash::{hash_file, same_contents};
pub use stage::{StageAction, copy_preserving_times, stage_if_absent};
