//! @ai:module:intent Decide which present rules have targets no present rule satisfies
//! @ai:module:layer application
//! @ai:module:public_api UnsatisfiedRule, check
//! @ai:module:depends_on rules, resolver
//! @ai:module:stateless true

use crate::resolver::RuleMap;
use crate::rules::{normalize_path, Rule};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// @ai:intent A present rule together with the indices of its unmet targets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnsatisfiedRule {
    pub rule: Rule,
    pub target_indices: Vec<usize>,
}

impl UnsatisfiedRule {
    /// @ai:intent Resolve the unmet target indices back to target keys
    /// @ai:effects pure
    pub fn unmet_target_keys(&self) -> Vec<String> {
        self.target_indices
            .iter()
            .filter_map(|i| self.rule.targets.get(*i))
            .map(|t| t.key(&self.rule.file))
            .collect()
    }
}

/// @ai:intent Keys a target may match: "file" for every present rule, plus "file:id" for named ones
/// @ai:effects pure
fn present_keys(rule_map: &RuleMap) -> HashSet<String> {
    let mut keys = HashSet::new();
    for rule in rule_map.values().flatten().filter(|r| r.present) {
        keys.insert(normalize_path(&rule.file));
        if rule.id.is_some() {
            keys.insert(rule.key());
        }
    }
    keys
}

/// @ai:intent Check every present rule with targets against the whole rule map
/// @ai:pre rule_map is complete: every file any target names has been parsed
/// @ai:post output is ordered by file, then by source order within the file
/// @ai:post rules that are absent from the diff or have no targets never appear
/// @ai:effects pure
pub fn check(rule_map: &RuleMap) -> Vec<UnsatisfiedRule> {
    let present = present_keys(rule_map);
    let mut unsatisfied = Vec::new();

    for rule in rule_map.values().flatten() {
        if !rule.present || rule.targets.is_empty() {
            continue;
        }

        let own_key = rule.key();
        let own_file = normalize_path(&rule.file);
        let mut target_indices = Vec::new();
        for (idx, (target, key)) in rule.targets.iter().zip(rule.target_keys()).enumerate() {
            if key == own_key || (target.id.is_none() && key == own_file) {
                tracing::warn!(
                    file = %rule.file,
                    range = %rule.range,
                    target = %key,
                    "rule targets itself and is always satisfied"
                );
            }
            if !present.contains(&key) {
                target_indices.push(idx);
            }
        }

        if !target_indices.is_empty() {
            unsatisfied.push(UnsatisfiedRule {
                rule: rule.clone(),
                target_indices,
            });
        }
    }

    tracing::info!(unsatisfied = unsatisfied.len(), "checked rules");
    unsatisfied
}
