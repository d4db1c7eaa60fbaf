#![allow(dead_code)]

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use powhegctl::config::{JobFile, RawJobFile};

/// Builder for job files, producing either TOML text or a validated
/// `JobFile`.
#[derive(Debug, Default)]
pub struct JobFileBuilder {
    generation: Vec<String>,
    runcard: Vec<String>,
    process: Vec<String>,
    groups: Vec<String>,
    filter: Vec<String>,
}

impl JobFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(mut self, name: &str) -> Self {
        self.generation.push(format!("process = {:?}", name));
        self
    }

    pub fn heartbeat_interval(mut self, interval: &str) -> Self {
        self.generation
            .push(format!("heartbeat_interval = {:?}", interval));
        self
    }

    pub fn reweight(mut self, on: bool) -> Self {
        self.generation.push(format!("reweight = {on}"));
        self
    }

    /// `[runcard]` entry. `value` is written as a TOML literal.
    pub fn runcard(mut self, key: &str, value: impl Display) -> Self {
        self.runcard.push(format!("{} = {}", toml_key(key), value));
        self
    }

    /// `[process]` entry. `value` is written as a TOML literal.
    pub fn process_key(mut self, key: &str, value: impl Display) -> Self {
        self.process.push(format!("{key} = {value}"));
        self
    }

    pub fn group(mut self, name: &str, on: bool) -> Self {
        self.groups.push(format!("{name} = {on}"));
        self
    }

    pub fn filter(mut self, executable: &str, args: &[&str]) -> Self {
        self.filter.push(format!("executable = {:?}", executable));
        self.filter.push(format!("args = {:?}", args));
        self
    }

    pub fn to_toml(&self) -> String {
        let mut out = String::new();
        for (name, lines) in [
            ("generation", &self.generation),
            ("runcard", &self.runcard),
            ("process", &self.process),
            ("groups", &self.groups),
            ("filter", &self.filter),
        ] {
            if lines.is_empty() {
                continue;
            }
            out.push_str(&format!("[{name}]\n"));
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }

    /// Write the job file as `powheg.toml` in `dir`.
    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let path = dir.join("powheg.toml");
        fs::write(&path, self.to_toml()).expect("failed to write job file");
        path
    }

    pub fn build(self) -> JobFile {
        let raw: RawJobFile = toml::from_str(&self.to_toml()).expect("builder produced invalid TOML");
        JobFile::try_from(raw).expect("Failed to build valid job file from builder")
    }
}

fn toml_key(key: &str) -> String {
    if key.contains('-') {
        format!("{:?}", key)
    } else {
        key.to_string()
    }
}
