/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Shared config (`~/.aws/config`) and credentials (`~/.aws/credentials`) files
//!
//! Both files use an INI-like format. In the config file, profiles other than `default` are
//! declared as `[profile name]`; in the credentials file every section name is a profile name.
//! When both files define the same property for a profile, the credentials file wins.

use crate::os::{Env, Fs};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("error parsing {path} on line {line}: {message}")]
pub struct ProfileParseError {
    pub path: String,
    pub line: usize,
    pub message: String,
}

/// A named profile and its properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    name: String,
    properties: HashMap<String, String>,
}

impl Profile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Every profile from the shared files plus the name of the selected profile
#[derive(Debug, Clone, Default)]
pub struct ProfileSet {
    profiles: HashMap<String, Profile>,
    selected: Cow<'static, str>,
}

impl ProfileSet {
    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn selected_profile_name(&self) -> &str {
        &self.selected
    }

    pub fn selected_profile(&self) -> Option<&Profile> {
        self.get_profile(&self.selected)
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    fn merge(&mut self, name: &str, properties: HashMap<String, String>) {
        let profile = self
            .profiles
            .entry(name.to_string())
            .or_insert_with(|| Profile {
                name: name.to_string(),
                properties: HashMap::new(),
            });
        profile.properties.extend(properties);
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Config,
    Credentials,
}

/// Load the shared config and credentials files
///
/// File locations may be overridden with `AWS_CONFIG_FILE` and `AWS_SHARED_CREDENTIALS_FILE`.
/// The selected profile is `AWS_PROFILE`, or `default`. Missing files are not an error.
pub fn load(env: &Env, fs: &Fs) -> Result<ProfileSet, ProfileParseError> {
    let selected = env
        .first_non_empty(&["AWS_PROFILE"])
        .map(Cow::Owned)
        .unwrap_or(Cow::Borrowed(DEFAULT_PROFILE));
    let mut profiles = ProfileSet {
        profiles: HashMap::new(),
        selected,
    };
    for (kind, default_file, env_var) in [
        (FileKind::Config, "config", "AWS_CONFIG_FILE"),
        (FileKind::Credentials, "credentials", "AWS_SHARED_CREDENTIALS_FILE"),
    ] {
        let path = match env.first_non_empty(&[env_var]) {
            Some(path) => PathBuf::from(path),
            None => match env.home_dir() {
                Some(home) => home.join(".aws").join(default_file),
                None => {
                    tracing::debug!(file = default_file, "no home directory; skipping profile file");
                    continue;
                }
            },
        };
        let contents = match fs.read_to_end(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "profile file not found");
                continue;
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to read profile file");
                continue;
            }
        };
        let contents = String::from_utf8_lossy(&contents);
        let path = path.display().to_string();
        for (name, properties) in parse(&path, &contents, kind)? {
            profiles.merge(&name, properties);
        }
        tracing::debug!(path = %path, "profile file loaded");
    }
    Ok(profiles)
}

fn parse(
    path: &str,
    contents: &str,
    kind: FileKind,
) -> Result<Vec<(String, HashMap<String, String>)>, ProfileParseError> {
    let error = |line: usize, message: &str| ProfileParseError {
        path: path.to_string(),
        line,
        message: message.to_string(),
    };
    let mut sections: Vec<(String, HashMap<String, String>)> = vec![];
    // sections that don't name a profile are parsed but dropped
    let mut in_profile = false;
    let mut seen_section = false;
    for (idx, raw) in contents.lines().enumerate() {
        let line_number = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[') {
            let header = header
                .split_once(']')
                .map(|(header, _)| header.trim())
                .ok_or_else(|| error(line_number, "section header is missing a closing `]`"))?;
            let name = match (kind, header.split_once(char::is_whitespace)) {
                (FileKind::Config, Some(("profile", name))) => Some(name.trim()),
                (FileKind::Config, _) if header == DEFAULT_PROFILE => Some(header),
                (FileKind::Config, _) => None,
                (FileKind::Credentials, _) => Some(header),
            };
            seen_section = true;
            in_profile = false;
            if let Some(name) = name.filter(|name| !name.is_empty()) {
                sections.push((name.to_string(), HashMap::new()));
                in_profile = true;
            }
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| error(line_number, "expected a `key = value` property"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(error(line_number, "property name is empty"));
        }
        if !seen_section {
            return Err(error(line_number, "property is not inside a section"));
        }
        if !in_profile {
            continue;
        }
        if let Some((_, properties)) = sections.last_mut() {
            properties.insert(key.to_string(), value.trim().to_string());
        }
    }
    Ok(sections)
}

#[cfg(test)]
mod test {
    use super::load;
    use crate::os::{Env, Fs};
    use std::collections::HashMap;

    fn fs(files: &[(&str, &str)]) -> Fs {
        Fs::from_map(
            files
                .iter()
                .map(|(path, contents)| (path.to_string(), contents.as_bytes().to_vec()))
                .collect::<HashMap<_, _>>(),
        )
    }

    #[test]
    fn config_and_credentials_files_are_merged() {
        let env = Env::from_slice(&[("HOME", "/home/me")]);
        let fs = fs(&[
            (
                "/home/me/.aws/config",
                "# comment\n[default]\nregion = us-east-1\noutput=json\n\n[profile work]\nregion = eu-west-1\n[sso-session x]\nregion = ignored\n",
            ),
            (
                "/home/me/.aws/credentials",
                "; comment\n[default]\naws_access_key_id = AKID\nregion = us-west-2\n",
            ),
        ]);
        let profiles = load(&env, &fs).expect("valid files");
        let default = profiles.selected_profile().expect("default profile");
        assert_eq!(default.get("region"), Some("us-west-2"));
        assert_eq!(default.get("output"), Some("json"));
        assert_eq!(default.get("aws_access_key_id"), Some("AKID"));
        assert_eq!(
            profiles.get_profile("work").and_then(|p| p.get("region")),
            Some("eu-west-1")
        );
        assert!(profiles.get_profile("x").is_none());
    }

    #[test]
    fn profile_and_paths_from_env() {
        let env = Env::from_slice(&[
            ("AWS_PROFILE", "other"),
            ("AWS_CONFIG_FILE", "/etc/aws-config"),
        ]);
        let fs = fs(&[("/etc/aws-config", "[profile other]\nregion = ap-south-1\n")]);
        let profiles = load(&env, &fs).expect("valid files");
        assert_eq!(profiles.selected_profile_name(), "other");
        assert_eq!(
            profiles.selected_profile().and_then(|p| p.get("region")),
            Some("ap-south-1")
        );
    }

    #[test]
    fn missing_files_yield_no_profiles() {
        let profiles = load(&Env::from_slice(&[("HOME", "/nowhere")]), &fs(&[])).expect("ok");
        assert!(profiles.is_empty());
        assert_eq!(profiles.selected_profile_name(), "default");
    }

    #[test]
    fn invalid_line_is_reported() {
        let env = Env::from_slice(&[("HOME", "/home/me")]);
        let fs = fs(&[("/home/me/.aws/config", "[default]\nregion = us-east-1\nnot a property\n")]);
        let err = load(&env, &fs).expect_err("invalid file");
        assert_eq!(err.line, 3);
        assert!(err.to_string().contains("/home/me/.aws/config"));
    }

    #[test]
    fn property_outside_section_is_rejected() {
        let env = Env::from_slice(&[("HOME", "/home/me")]);
        let fs = fs(&[("/home/me/.aws/credentials", "aws_access_key_id = AKID\n")]);
        let err = load(&env, &fs).expect_err("invalid file");
        assert_eq!(err.line, 1);
    }
}
