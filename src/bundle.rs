//! Asset bundle configuration
//!
//! Describes how the browser assets are concatenated and minified: module
//! aliases, shim dependencies for non-module scripts, the entry modules and
//! the optimizer. The defaults are the shipped build. `to_build_json` writes
//! the camelCase form the optimizer reads; TOML files may use either case.

use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Minifier run over the concatenated bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Optimizer {
    None,
    Uglify,
    #[default]
    Uglify2,
    #[serde(rename = "closure")]
    ClosureCompiler,
}

/// Load-order dependencies of a script that does not declare its own
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Shim {
    #[serde(default)]
    pub deps: Vec<String>,
}

/// Entry point of a bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleConfig {
    /// Source tree, relative to the build file
    #[serde(alias = "app_dir")]
    pub app_dir: String,
    /// Script root inside `app_dir`
    #[serde(alias = "base_url")]
    pub base_url: String,
    /// Output tree
    pub dir: String,
    #[serde(default)]
    pub shim: BTreeMap<String, Shim>,
    /// Module name → path under `base_url`, without `.js`
    #[serde(default)]
    pub paths: BTreeMap<String, String>,
    pub modules: Vec<ModuleEntry>,
    #[serde(default)]
    pub optimize: Optimizer,
    #[serde(default, alias = "preserve_license_comments")]
    pub preserve_license_comments: bool,
}

impl Default for BundleConfig {
    fn default() -> Self {
        let paths = [
            ("jquery", "lib/jquery"),
            ("jquery.ui.widget", "lib/jquery.ui.widget"),
            ("jquery.imgareaselect", "lib/jquery.imgareaselect"),
            ("bootstrap", "lib/bootstrap"),
            ("underscore", "lib/underscore"),
            ("template", "../template"),
            ("handlebars.runtime", "lib/handlebars-runtime"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let shim = ["bootstrap", "jquery.imgareaselect"]
            .into_iter()
            .map(|name| {
                (
                    name.to_string(),
                    Shim {
                        deps: vec!["jquery".to_string()],
                    },
                )
            })
            .collect();

        Self {
            app_dir: "../www".to_string(),
            base_url: "js".to_string(),
            dir: "../www-release".to_string(),
            shim,
            paths,
            modules: vec![ModuleEntry {
                name: "../main".to_string(),
            }],
            optimize: Optimizer::Uglify2,
            preserve_license_comments: false,
        }
    }
}

impl BundleConfig {
    /// Parse a TOML bundle file
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ClientError::InvalidBundle(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClientError::InvalidBundle(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Alias target for `module`, or the name itself when it has none
    pub fn resolve<'a>(&'a self, module: &'a str) -> &'a str {
        self.paths.get(module).map(String::as_str).unwrap_or(module)
    }

    /// Source file of `module` relative to the build file
    pub fn module_file(&self, module: &str) -> PathBuf {
        Path::new(&self.app_dir)
            .join(&self.base_url)
            .join(format!("{}.js", self.resolve(module)))
    }

    /// Shim dependencies of `module`
    pub fn dependencies(&self, module: &str) -> &[String] {
        self.shim
            .get(module)
            .map(|s| s.deps.as_slice())
            .unwrap_or(&[])
    }

    /// `module` preceded by everything it must load after, dependencies first
    pub fn load_order(&self, module: &str) -> Result<Vec<String>> {
        let mut order = Vec::new();
        let mut done = BTreeSet::new();
        let mut visiting = Vec::new();
        self.visit(module, &mut visiting, &mut done, &mut order)?;
        Ok(order)
    }

    fn visit(
        &self,
        module: &str,
        visiting: &mut Vec<String>,
        done: &mut BTreeSet<String>,
        order: &mut Vec<String>,
    ) -> Result<()> {
        if done.contains(module) {
            return Ok(());
        }
        if visiting.iter().any(|m| m == module) {
            visiting.push(module.to_string());
            return Err(ClientError::InvalidBundle(format!(
                "shim cycle: {}",
                visiting.join(" -> ")
            )));
        }

        visiting.push(module.to_string());
        for dep in self.dependencies(module) {
            self.visit(dep, visiting, done, order)?;
        }
        visiting.pop();

        done.insert(module.to_string());
        order.push(module.to_string());
        Ok(())
    }

    /// Check the configuration is buildable
    pub fn validate(&self) -> Result<()> {
        if self.modules.is_empty() {
            return Err(ClientError::InvalidBundle("no entry modules".into()));
        }
        if let Some(entry) = self.modules.iter().find(|m| m.name.trim().is_empty()) {
            return Err(ClientError::InvalidBundle(format!(
                "entry module with empty name: {:?}",
                entry
            )));
        }
        if let Some((alias, _)) = self.paths.iter().find(|(_, target)| target.trim().is_empty()) {
            return Err(ClientError::InvalidBundle(format!(
                "alias '{}' has an empty path",
                alias
            )));
        }

        // Any non-empty name resolves: unaliased modules live under base_url
        for (name, shim) in &self.shim {
            if !Self::is_module_name(name) {
                return Err(ClientError::InvalidBundle(format!(
                    "shim with empty module name: {:?}",
                    name
                )));
            }
            if let Some(dep) = shim.deps.iter().find(|d| !Self::is_module_name(d)) {
                return Err(ClientError::InvalidBundle(format!(
                    "shim '{}' has an empty dependency: {:?}",
                    name, dep
                )));
            }
            self.load_order(name)?;
        }
        Ok(())
    }

    fn is_module_name(name: &str) -> bool {
        !name.trim().is_empty()
    }

    /// Build file in the optimizer's JSON format
    pub fn to_build_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
