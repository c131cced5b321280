//! The interface resolver: which alternative rules each rule participates in.
//!
//! For every alternative rule `R` and every alternative `A` it lists, `R` is an
//! ancestor of `A`. A rule may have several ancestors (a diamond), which the
//! generated code expresses as several capability traits on one type.

use crate::schema::{Rule, RuleKind};
use crate::validate::ValidationError;
use indexmap::{IndexMap, IndexSet};

/// Rule name to ordered direct ancestors, in rule declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ancestors {
    map: IndexMap<String, Vec<String>>,
}

impl Ancestors {
    /// Builds the ancestor map for `rules`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownAlternative`] if an alternative names
    /// no rule in `rules`.
    pub fn resolve(rules: &[Rule]) -> Result<Self, ValidationError> {
        let mut map: IndexMap<String, Vec<String>> = rules
            .iter()
            .map(|rule| (rule.name.clone(), Vec::new()))
            .collect();

        for rule in rules {
            let RuleKind::Alternatives(alternatives) = &rule.kind else {
                continue;
            };
            for alt in alternatives {
                let ancestors = map
                    .get_mut(alt)
                    .ok_or_else(|| ValidationError::UnknownAlternative {
                        rule: rule.name.clone(),
                        name: alt.clone(),
                    })?;
                ancestors.push(rule.name.clone());
            }
        }

        Ok(Self { map })
    }

    /// The alternative rules that list `rule` directly.
    #[must_use]
    pub fn direct(&self, rule: &str) -> &[String] {
        self.map.get(rule).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every ancestor of `rule`, nearest first, each listed once.
    #[must_use]
    pub fn transitive(&self, rule: &str) -> Vec<&str> {
        let mut seen: IndexSet<&str> = IndexSet::new();
        let mut frontier: Vec<&str> = self.direct(rule).iter().map(String::as_str).collect();

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for name in frontier {
                if seen.insert(name) {
                    next.extend(self.direct(name).iter().map(String::as_str));
                }
            }
            frontier = next;
        }

        seen.into_iter().collect()
    }

    /// Whether a value of `rule` may stand where `capability` is expected.
    #[must_use]
    pub fn implements(&self, rule: &str, capability: &str) -> bool {
        rule == capability || self.transitive(rule).contains(&capability)
    }
}
