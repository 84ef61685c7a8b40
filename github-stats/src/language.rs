// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Language size tallies and their percentage breakdown.
//!
//! A [`LanguageTally`] accumulates byte sizes in first-seen order. Finishing
//! it drops languages without measurable size, computes each language's share
//! of the retained total and sorts by descending size. The sort is stable, so
//! languages of equal size keep their first-seen order.

use std::collections::HashMap;

/// Colour used when GitHub does not assign one to a language.
pub const DEFAULT_LANGUAGE_COLOR: &str = "#000000";

/// One language's share of the considered source bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageShare {
    /// Language name as reported by GitHub.
    pub name:        String,
    /// Total bytes across considered repositories.
    pub size:        u64,
    /// Display colour, when GitHub knows one.
    pub color:       Option<String>,
    /// Percentage of the retained total, in `0.0..=100.0`.
    pub proportion:  f64
}

impl LanguageShare {
    /// Colour to render, falling back to [`DEFAULT_LANGUAGE_COLOR`].
    pub fn display_color(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_LANGUAGE_COLOR)
    }
}

/// Languages ordered by descending size with their proportions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageBreakdown {
    shares: Vec<LanguageShare>
}

impl LanguageBreakdown {
    /// Iterates languages from the largest to the smallest.
    pub fn iter(&self) -> std::slice::Iter<'_, LanguageShare> {
        self.shares.iter()
    }

    /// Looks a language up by its exact name.
    pub fn get(&self, name: &str) -> Option<&LanguageShare> {
        self.shares.iter().find(|share| share.name == name)
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}

impl<'a> IntoIterator for &'a LanguageBreakdown {
    type Item = &'a LanguageShare;
    type IntoIter = std::slice::Iter<'a, LanguageShare>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Accumulates language sizes in first-seen order.
#[derive(Debug, Default)]
pub struct LanguageTally {
    shares: Vec<LanguageShare>,
    index:  HashMap<String, usize>
}

impl LanguageTally {
    /// Adds `size` bytes of `name`. The first colour seen for a language is
    /// kept.
    pub fn add(&mut self, name: &str, size: u64, color: Option<&str>) {
        match self.index.get(name) {
            Some(&position) => {
                let share = &mut self.shares[position];
                share.size = share.size.saturating_add(size);
            }
            None => {
                self.index.insert(name.to_owned(), self.shares.len());
                self.shares.push(LanguageShare {
                    name: name.to_owned(),
                    size,
                    color: color.map(str::to_owned),
                    proportion: 0.0
                });
            }
        }
    }

    /// Computes proportions and the display order.
    pub fn finish(self) -> LanguageBreakdown {
        let mut shares: Vec<LanguageShare> = self
            .shares
            .into_iter()
            .filter(|share| share.size > 0)
            .collect();

        let total: u64 = shares.iter().map(|share| share.size).sum();
        for share in &mut shares {
            share.proportion = 100.0 * share.size as f64 / total as f64;
        }

        shares.sort_by(|left, right| right.size.cmp(&left.size));

        LanguageBreakdown {
            shares
        }
    }
}
