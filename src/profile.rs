//! The profile tree.
//!
//! Profiles are addressed by dot-separated qualified names such as
//! `org.nprod.argocd.argo2`. Every segment is a key in the `profiles` map of
//! the node above it; the tree root is an unnamed node whose map holds the
//! first segments.
//!
//! Lookups hand out references into the tree, never copies, so editing a
//! profile is "find it mutably, change its fields".

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::env::EnvBindings;
use crate::error::ProfileError;
use crate::scalar::{ScalarString, scalar_string};

/// A single node of the tree.
///
/// A node is a usable profile in its own right even when it also has
/// children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(
        rename = "desc",
        alias = "description",
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub description: String,

    #[serde(default, skip_serializing_if = "EnvBindings::is_empty")]
    pub env: EnvBindings,

    #[serde(default, skip_serializing_if = "ProfileTree::is_empty")]
    pub profiles: ProfileTree,
}

impl Profile {
    pub fn new(description: impl Into<String>, env: EnvBindings) -> Self {
        Self {
            description: description.into(),
            env,
            profiles: ProfileTree::default(),
        }
    }
}

/// Parent of a node: either the tree root or another profile.
#[derive(Debug, Clone, Copy)]
pub enum Parent<'a> {
    Root(&'a ProfileTree),
    Profile(&'a Profile),
}

impl<'a> Parent<'a> {
    /// The map the child lives in.
    pub fn children(&self) -> &'a ProfileTree {
        match *self {
            Parent::Root(tree) => tree,
            Parent::Profile(profile) => &profile.profiles,
        }
    }

    pub fn as_profile(&self) -> Option<&'a Profile> {
        match *self {
            Parent::Root(_) => None,
            Parent::Profile(profile) => Some(profile),
        }
    }
}

/// Mapping from name to profile. Used both for the root and for the
/// children of every node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProfileTree(BTreeMap<String, Profile>);

impl<'de> Deserialize<'de> for ProfileTree {
    /// Keys may be unquoted numbers or booleans; an empty map may be null.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<BTreeMap<ScalarString, Profile>>::deserialize(deserializer)?;
        Ok(Self(
            raw.unwrap_or_default()
                .into_iter()
                .map(|(key, profile)| (key.0, profile))
                .collect(),
        ))
    }
}

/// Split a qualified name into its segments, rejecting empty names and
/// empty segments (leading, trailing or doubled dots).
fn segments(name: &str) -> Result<Vec<&str>, ProfileError> {
    if name.is_empty() {
        return Err(ProfileError::InvalidName(name.to_string()));
    }
    let segments: Vec<&str> = name.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ProfileError::InvalidName(name.to_string()));
    }
    Ok(segments)
}

impl ProfileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from already deserialized data.
    pub fn from_value(value: serde_yaml::Value) -> Result<Self, ProfileError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        let tree: Self = serde_yaml::from_value(value)
            .map_err(|e| ProfileError::MalformedProfileData(e.to_string()))?;
        tree.validate_keys(None)?;
        Ok(tree)
    }

    pub fn to_value(&self) -> Result<serde_yaml::Value, ProfileError> {
        serde_yaml::to_value(self).map_err(|e| ProfileError::MalformedProfileData(e.to_string()))
    }

    /// Every stored key must be usable as a single name segment.
    fn validate_keys(&self, prefix: Option<&str>) -> Result<(), ProfileError> {
        for (key, node) in &self.0 {
            let qualified = qualify(prefix, key);
            if key.is_empty() || key.contains('.') {
                return Err(ProfileError::MalformedProfileData(format!(
                    "profile key '{qualified}' is not a valid name segment"
                )));
            }
            node.profiles.validate_keys(Some(&qualified))?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Direct children, in key order.
    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, Profile> {
        self.0.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_ok()
    }

    /// Walk `path` from this map and return the children map of its last node.
    fn children_at(&self, path: &[&str], name: &str) -> Result<&ProfileTree, ProfileError> {
        let mut children = self;
        for segment in path {
            children = &children
                .0
                .get(*segment)
                .ok_or_else(|| ProfileError::NotFound(name.to_string()))?
                .profiles;
        }
        Ok(children)
    }

    fn children_at_mut(
        &mut self,
        path: &[&str],
        name: &str,
    ) -> Result<&mut ProfileTree, ProfileError> {
        let mut children = self;
        for segment in path {
            children = &mut children
                .0
                .get_mut(*segment)
                .ok_or_else(|| ProfileError::NotFound(name.to_string()))?
                .profiles;
        }
        Ok(children)
    }

    /// Look up a profile by qualified name.
    pub fn find(&self, name: &str) -> Result<&Profile, ProfileError> {
        let segments = segments(name)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| ProfileError::InvalidName(name.to_string()))?;

        self.children_at(parents, name)?
            .0
            .get(*last)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))
    }

    /// Look up a profile for in-place editing.
    pub fn find_mut(&mut self, name: &str) -> Result<&mut Profile, ProfileError> {
        let segments = segments(name)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| ProfileError::InvalidName(name.to_string()))?;

        self.children_at_mut(parents, name)?
            .0
            .get_mut(*last)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))
    }

    /// Resolve the parent of `name`. Only the parent path has to exist.
    pub fn find_parent(&self, name: &str) -> Result<Parent<'_>, ProfileError> {
        let segments = segments(name)?;
        match segments.len() {
            1 => Ok(Parent::Root(self)),
            n => {
                let parent_name = segments[..n - 1].join(".");
                self.find(&parent_name)
                    .map(Parent::Profile)
                    .map_err(|_| ProfileError::NotFound(name.to_string()))
            }
        }
    }

    /// Insert or overwrite the profile at `name`, creating missing parents as
    /// empty profiles.
    ///
    /// Overwriting replaces description and env only. Existing children stay;
    /// children carried by `profile` are added (same-named ones replaced).
    pub fn set(&mut self, name: &str, profile: Profile) -> Result<(), ProfileError> {
        let segments = segments(name)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| ProfileError::InvalidName(name.to_string()))?;

        let mut children = self;
        for segment in parents {
            children = &mut children.0.entry(segment.to_string()).or_default().profiles;
        }

        match children.0.entry(last.to_string()) {
            Entry::Occupied(mut entry) => {
                let node = entry.get_mut();
                node.description = profile.description;
                node.env = profile.env;
                node.profiles.0.extend(profile.profiles.0);
                tracing::debug!(name, "updated profile");
            }
            Entry::Vacant(entry) => {
                entry.insert(profile);
                tracing::debug!(name, "created profile");
            }
        }
        Ok(())
    }

    /// Remove the profile at `name` together with everything beneath it.
    pub fn delete(&mut self, name: &str) -> Result<Profile, ProfileError> {
        let segments = segments(name)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| ProfileError::InvalidName(name.to_string()))?;

        let removed = self
            .children_at_mut(parents, name)?
            .0
            .remove(*last)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))?;
        tracing::debug!(name, "deleted profile");
        Ok(removed)
    }

    /// Qualified names of every node in the tree, containers included,
    /// sorted ascending.
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_names(None, &mut names);
        names.sort();
        names
    }

    fn collect_names(&self, prefix: Option<&str>, out: &mut Vec<String>) {
        for (key, node) in &self.0 {
            let qualified = qualify(prefix, key);
            node.profiles.collect_names(Some(&qualified), out);
            out.push(qualified);
        }
    }
}

fn qualify(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}.{key}"),
        None => key.to_string(),
    }
}
