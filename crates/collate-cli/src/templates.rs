//! Embedded starter files written by `collate init`.

pub const JOB_YAML: &str = r#"# Collate job file.
# Each target is assembled from its manifests in declaration order; every
# input file is followed by one blank separator line.
version: 1
base_dir: src
manifests:
  core:
    - license-header.js
    - main.js
targets:
  - path: dist/bundle.js
    manifests: [core]
"#;
