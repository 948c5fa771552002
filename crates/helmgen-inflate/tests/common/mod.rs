//! Shared fixtures for inflation tests
//!
//! `FakeHelm` is a small shell script standing in for the helm binary. It
//! answers `version`, unpacks a stub chart on `pull`, and on `template`
//! prints a ConfigMap that embeds the values file it was given. Every call
//! is recorded next to the script.

#![allow(dead_code)]

use helmgen_core::{FileLoader, HelmSettings, LoadRestriction, ResourceCollection, YamlResourceFactory};
use helmgen_inflate::{inflate, Result};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub const NGINX_VALUES: &str = "# nginx defaults\nreplicas: 1\nimage:\n  repository: nginx\n  tag: \"1.25\"\nservice:\n  port: 80\n";

pub const REDIS_VALUES: &str = "architecture: standalone\nauth:\n  enabled: true\n";

const SCRIPT: &str = r#"#!/bin/sh
DIR='@DIR@'
echo "$*" >> "$DIR/calls.log"
echo "$HELM_CONFIG_HOME" >> "$DIR/homes.log"

if [ "$1" = "version" ]; then
    echo '@VERSION@'
    exit 0
fi

if [ -f "$DIR/fail" ]; then
    echo "Error: simulated failure" >&2
    exit 1
fi

case "$1" in
pull)
    shift
    untardir=""
    target=""
    while [ $# -gt 0 ]; do
        case "$1" in
        --untar) ;;
        --untardir) shift; untardir="$1" ;;
        --repo|--version) shift ;;
        *) target="$1" ;;
        esac
        shift
    done
    name="${target##*/}"
    mkdir -p "$untardir/$name"
    printf 'pulled: true\n' > "$untardir/$name/values.yaml"
    ;;
template)
    shift
    values=""
    chart=""
    while [ $# -gt 0 ]; do
        case "$1" in
        -f)
            shift
            if [ -z "$values" ]; then values="$1"; fi
            ;;
        --namespace|--name-template|--api-versions|--kube-version) shift ;;
        -*) ;;
        *) chart="$1" ;;
        esac
        shift
    done
    echo "$values" > "$DIR/values-path"
    cp "$values" "$DIR/values-copy"
    if [ -f "$DIR/preamble.txt" ]; then cat "$DIR/preamble.txt"; fi
    if [ -f "$DIR/output.txt" ]; then
        cat "$DIR/output.txt"
        exit 0
    fi
    echo "---"
    echo "apiVersion: v1"
    echo "kind: ConfigMap"
    echo "metadata:"
    echo "  name: $(basename "$chart")"
    echo "data:"
    echo "  configHome: $HELM_CONFIG_HOME"
    echo "  values: |"
    sed 's/^/    /' "$values"
    ;;
*)
    echo "unknown command $1" >&2
    exit 2
    ;;
esac
"#;

/// A scripted stand-in for the helm binary
pub struct FakeHelm {
    dir: TempDir,
    script: PathBuf,
}

impl FakeHelm {
    pub fn new() -> Self {
        Self::with_version("v3.14.0+g3fc9f4b")
    }

    pub fn with_version(version: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("helm");
        let body = SCRIPT
            .replace("@DIR@", &dir.path().display().to_string())
            .replace("@VERSION@", version);
        std::fs::write(&script, body).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let helm = Self { dir, script };
        helm.warm_up();
        helm
    }

    /// Run the script once so a concurrent fork holding the write handle
    /// cannot make the first real exec fail with "text file busy"
    fn warm_up(&self) {
        for _ in 0..50 {
            match Command::new(&self.script).arg("version").output() {
                Ok(_) => {
                    std::fs::remove_file(self.dir.path().join("calls.log")).ok();
                    std::fs::remove_file(self.dir.path().join("homes.log")).ok();
                    return;
                }
                Err(e) if e.raw_os_error() == Some(26) => {
                    std::thread::sleep(std::time::Duration::from_millis(20));
                }
                Err(e) => panic!("cannot run fake helm: {}", e),
            }
        }
        panic!("fake helm stayed busy");
    }

    pub fn command(&self) -> String {
        self.script.display().to_string()
    }

    pub fn settings(&self) -> HelmSettings {
        HelmSettings::enabled(self.command())
    }

    /// Make every call after the version probe fail
    pub fn fail(&self) {
        std::fs::write(self.dir.path().join("fail"), "").unwrap();
    }

    /// Text printed before the rendered manifests
    pub fn set_preamble(&self, text: &str) {
        std::fs::write(self.dir.path().join("preamble.txt"), text).unwrap();
    }

    /// Replace the rendered manifests entirely
    pub fn set_output(&self, text: &str) {
        std::fs::write(self.dir.path().join("output.txt"), text).unwrap();
    }

    pub fn calls(&self) -> Vec<String> {
        read_lines(&self.dir.path().join("calls.log"))
    }

    pub fn homes(&self) -> Vec<String> {
        read_lines(&self.dir.path().join("homes.log"))
    }

    /// Contents of the values file seen by the last `template` call
    pub fn last_values(&self) -> String {
        std::fs::read_to_string(self.dir.path().join("values-copy")).unwrap()
    }

    /// Path of the values file seen by the last `template` call
    pub fn last_values_path(&self) -> PathBuf {
        PathBuf::from(
            std::fs::read_to_string(self.dir.path().join("values-path"))
                .unwrap()
                .trim_end(),
        )
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|s| s.lines().map(String::from).collect())
        .unwrap_or_default()
}

/// A kustomization-like root with local nginx and redis charts
pub fn workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    for (name, values) in [("nginx", NGINX_VALUES), ("redis", REDIS_VALUES)] {
        let chart = temp.path().join("charts").join(name);
        std::fs::create_dir_all(chart.join("templates")).unwrap();
        std::fs::write(chart.join("Chart.yaml"), format!("apiVersion: v2\nname: {}\nversion: 1.0.0\n", name)).unwrap();
        std::fs::write(chart.join("values.yaml"), values).unwrap();
    }
    std::fs::write(temp.path().join("values-prod.yaml"), "replicas: 3\n").unwrap();
    temp
}

pub fn loader(root: &Path) -> FileLoader {
    FileLoader::new(root, LoadRestriction::RootOnly).unwrap()
}

/// Inflate `config` with the fake helm against `root`
pub fn generate(helm: &FakeHelm, root: &Path, config: &str) -> Result<ResourceCollection> {
    inflate(
        &helm.settings(),
        config.as_bytes(),
        &loader(root),
        &YamlResourceFactory,
    )
}
