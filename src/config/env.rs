// src/config/env.rs

//! Environment consumed by the supervisor: `POWHEGPATH`, `LHEFPATH`, `PWD`.

use std::path::{Path, PathBuf};

use crate::errors::{PowhegError, Result};
use crate::runcard::ProcessVariant;

pub const POWHEGPATH: &str = "POWHEGPATH";
pub const LHEFPATH: &str = "LHEFPATH";
pub const PWD: &str = "PWD";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PowhegEnvironment {
    /// Root of the POWHEG-BOX installation.
    pub powheg_path: Option<PathBuf>,
    /// Directory holding the LHEF filter tools.
    pub lhef_path: Option<PathBuf>,
    pub workdir: PathBuf,
}

impl PowhegEnvironment {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let workdir = get(PWD)
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            powheg_path: get(POWHEGPATH).map(PathBuf::from),
            lhef_path: get(LHEFPATH).map(PathBuf::from),
            workdir,
        }
    }

    /// Resolve the generator executable for `process`.
    ///
    /// An explicit executable wins; relative explicit paths are joined onto
    /// `$POWHEGPATH` when it is set. Without an explicit executable the
    /// family's `pwhg_main` under `$POWHEGPATH` is used, which then must be set.
    pub fn generator_executable(
        &self,
        process: &ProcessVariant,
        explicit: Option<&str>,
    ) -> Result<PathBuf> {
        match explicit {
            Some(exe) => Ok(resolve_against(self.powheg_path.as_deref(), exe)),
            None => self
                .powheg_path
                .as_ref()
                .map(|root| root.join(process.executable_suffix()))
                .ok_or(PowhegError::MissingEnv(POWHEGPATH)),
        }
    }

    pub fn filter_executable(&self, exe: &str) -> PathBuf {
        resolve_against(self.lhef_path.as_deref(), exe)
    }
}

fn resolve_against(root: Option<&Path>, exe: &str) -> PathBuf {
    let path = PathBuf::from(exe);
    match root {
        Some(root) if path.is_relative() => root.join(path),
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::runcard::RunConfigurationBuilder;
    use crate::types::ProcessKind;

    fn env_from(pairs: &[(&str, &str)]) -> PowhegEnvironment {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PowhegEnvironment::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn reads_all_three_variables() {
        let env = env_from(&[
            (POWHEGPATH, "/opt/powheg"),
            (LHEFPATH, "/opt/lhef"),
            (PWD, "/data/run1"),
        ]);
        assert_eq!(env.powheg_path, Some(PathBuf::from("/opt/powheg")));
        assert_eq!(env.lhef_path, Some(PathBuf::from("/opt/lhef")));
        assert_eq!(env.workdir, PathBuf::from("/data/run1"));
    }

    #[test]
    fn family_executable_needs_powhegpath() {
        let process = RunConfigurationBuilder::new(ProcessKind::Z).build().process;

        let env = env_from(&[(POWHEGPATH, "/opt/powheg")]);
        assert_eq!(
            env.generator_executable(&process, None).unwrap(),
            PathBuf::from("/opt/powheg/POWHEG-BOX/Z/pwhg_main")
        );

        let bare = env_from(&[(POWHEGPATH, "  ")]);
        assert!(matches!(
            bare.generator_executable(&process, None),
            Err(PowhegError::MissingEnv(POWHEGPATH))
        ));
    }

    #[test]
    fn explicit_executables_resolve_against_roots() {
        let process = RunConfigurationBuilder::new(ProcessKind::W).build().process;
        let env = env_from(&[(POWHEGPATH, "/opt/powheg"), (LHEFPATH, "/opt/lhef")]);

        assert_eq!(
            env.generator_executable(&process, Some("custom/pwhg_main")).unwrap(),
            PathBuf::from("/opt/powheg/custom/pwhg_main")
        );
        assert_eq!(
            env.generator_executable(&process, Some("/usr/bin/pwhg_main")).unwrap(),
            PathBuf::from("/usr/bin/pwhg_main")
        );
        assert_eq!(
            env.filter_executable("lhef_filter"),
            PathBuf::from("/opt/lhef/lhef_filter")
        );
    }
}
