//! Test utilities shared across test modules

use crate::config::Config;
use crate::paths::Paths;
use crate::profile::ProfileTree;
use tempfile::TempDir;

/// Config document used by most tests: a flat profile, a two-level group
/// and a deep `org.nprod.*` hierarchy.
pub const SAMPLE_CONFIG: &str = r#"
default: docker
profiles:
  docker:
    desc: docker
    env:
      - name: DOCKER_HOST
        value: ssh://docker.example.com
  lab:
    desc: lab
    profiles:
      cluster1:
        desc: lab.cluster1
        env:
          - name: KUBECONFIG
            value: /tmp/cluster1
      cluster2:
        desc: lab.cluster2
      cluster3:
        desc: lab.cluster3
  org:
    profiles:
      nprod:
        profiles:
          argocd:
            profiles:
              argo1:
                desc: org.nprod.argocd.argo1
                env:
                  - name: HTTPS_PROXY
                    value: http://proxy.nprod:3128
                  - name: NO_PROXY
                    value: 127.0.0.1,localhost
              argo2:
                desc: org.nprod.argocd.argo2
          vpn:
            profiles:
              vpn1:
                desc: org.nprod.vpn.vpn1
              vpn2:
                desc: org.nprod.vpn.vpn2
"#;

pub fn sample_config() -> Config {
    let value: serde_yaml::Value = serde_yaml::from_str(SAMPLE_CONFIG).unwrap();
    Config::from_value(value).unwrap()
}

pub fn sample_tree() -> ProfileTree {
    sample_config().profiles
}

/// Paths pointing at a config file inside a temporary directory
pub fn setup_test_paths(temp_dir: &TempDir) -> Paths {
    Paths {
        config_file: temp_dir.path().join(".config/envp/config.yaml"),
    }
}
