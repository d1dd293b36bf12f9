/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Process environment and file system access that tests can replace with in-memory fakes.

use std::collections::HashMap;
use std::env::VarError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable abstraction
///
/// Environment variables are global to a process, which makes them awkward to use from a
/// multi-threaded test runner. `Env` reads either the real process environment or a fixed map.
#[derive(Clone, Debug, Default)]
pub struct Env(Option<Arc<HashMap<String, String>>>);

impl Env {
    /// The real process environment.
    pub fn real() -> Self {
        Env(None)
    }

    /// A fake process environment.
    ///
    /// ```rust
    /// use aws_client::os::Env;
    /// let env = Env::from_slice(&[("AWS_REGION", "us-west-2")]);
    /// assert_eq!(env.get("AWS_REGION").unwrap(), "us-west-2");
    /// ```
    pub fn from_slice(vars: &[(&str, &str)]) -> Self {
        Env(Some(Arc::new(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )))
    }

    pub fn get(&self, key: &str) -> Result<String, VarError> {
        match &self.0 {
            None => std::env::var(key),
            Some(vars) => vars.get(key).cloned().ok_or(VarError::NotPresent),
        }
    }

    /// The first of `keys` that is set to a non-empty value.
    pub fn first_non_empty(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.get(key).ok())
            .find(|value| !value.trim().is_empty())
    }

    /// The user's home directory, from `HOME` or `USERPROFILE`.
    pub fn home_dir(&self) -> Option<PathBuf> {
        self.first_non_empty(&["HOME", "USERPROFILE"])
            .map(PathBuf::from)
    }
}

impl From<HashMap<String, String>> for Env {
    fn from(vars: HashMap<String, String>) -> Self {
        Env(Some(Arc::new(vars)))
    }
}

/// File system abstraction
///
/// Only reads are supported; that is all config and credentials loading needs.
#[derive(Clone, Debug, Default)]
pub struct Fs(Option<Arc<HashMap<OsString, Vec<u8>>>>);

impl Fs {
    /// Delegate to `std::fs`.
    pub fn real() -> Self {
        Fs(None)
    }

    /// An in-memory file system.
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use aws_client::os::Fs;
    /// let mut files = HashMap::new();
    /// files.insert("/home/.aws/config".to_string(), "[default]\nregion = us-east-1".into());
    /// let fs = Fs::from_map(files);
    /// assert!(fs.read_to_end("/home/.aws/config").is_ok());
    /// ```
    pub fn from_map(files: HashMap<String, Vec<u8>>) -> Self {
        Fs(Some(Arc::new(
            files.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    pub fn read_to_end(&self, path: impl AsRef<Path>) -> std::io::Result<Vec<u8>> {
        let path = path.as_ref();
        match &self.0 {
            None => std::fs::read(path),
            Some(files) => files
                .get(path.as_os_str())
                .cloned()
                .ok_or_else(|| std::io::ErrorKind::NotFound.into()),
        }
    }
}
