// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Placeholder substitution for badge templates.
//!
//! Templates are plain text containing `{{ name }}` tokens. Rendering replaces
//! every token whose name has a value and leaves unknown tokens untouched.
//! Substituted values are never scanned again, so a value that itself looks
//! like a placeholder is emitted verbatim.

use std::{
    collections::BTreeMap,
    fs,
    path::Path,
    sync::LazyLock
};

use regex::{Captures, Regex};

use crate::error::{self, Error};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("placeholder pattern is valid")
});

/// Token name to formatted value.
pub type Substitutions<'a> = BTreeMap<&'a str, String>;

/// Badge template text.
///
/// # Examples
///
/// ```
/// use github_stats::{Substitutions, Template};
///
/// let template = Template::new("<text>{{ stars }} / {{ forks }}</text>");
/// let mut values = Substitutions::new();
/// values.insert("stars", "1,204".to_owned());
/// assert_eq!(template.render(&values), "<text>1,204 / {{ forks }}</text>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String
}

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into()
        }
    }

    /// Reads a template from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] when the file is missing or unreadable.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|source| error::template_error(path, source))?;
        Ok(Self::new(text))
    }

    /// Distinct placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for captures in PLACEHOLDER.captures_iter(&self.text) {
            if let Some(name) = captures.get(1).map(|found| found.as_str())
                && !names.contains(&name)
            {
                names.push(name);
            }
        }
        names
    }

    /// Placeholders in the template that `values` has no entry for.
    pub fn unfilled<'t>(&'t self, values: &Substitutions<'_>) -> Vec<&'t str> {
        self.placeholders()
            .into_iter()
            .filter(|name| !values.contains_key(*name))
            .collect()
    }

    /// Replaces every known placeholder with its value.
    pub fn render(&self, values: &Substitutions<'_>) -> String {
        PLACEHOLDER
            .replace_all(&self.text, |captures: &Captures<'_>| {
                match values.get(&captures[1]) {
                    Some(value) => value.clone(),
                    None => captures[0].to_owned()
                }
            })
            .into_owned()
    }
}
