//! Post-match flag validation.
//!
//! Runs once per parse, after every flag token is matched, over the flags
//! visible on the final command. Defaults are injected first, then the
//! relation rules run in a fixed order and the first violation wins.

use command_args_core::{FlagSpec, flag_display, param_case_to_camel_case};
use serde_json::Value;
use tracing::trace;

use crate::error::{ParseError, Result};
use crate::matcher::FlagValues;

/// Outcome of a successful validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Validated {
    /// All rules passed.
    Complete,
    /// A standalone flag was the only explicit flag; remaining checks skipped.
    Standalone,
}

/// Injects defaults and checks flag relations.
pub(crate) fn validate_flags(
    flags: &[&FlagSpec],
    values: &mut FlagValues,
    allow_empty: bool,
) -> Result<Validated> {
    let defaulted = inject_defaults(flags, values);
    if values.values.is_empty() && allow_empty {
        return Ok(Validated::Complete);
    }

    let explicit: Vec<&FlagSpec> = values
        .explicit
        .iter()
        .filter_map(|name| flags.iter().find(|f| &f.name == name).copied())
        .collect();
    let is_set = |name: &str| values.values.contains_key(&key_for(flags, name));

    if let Some(flag) = explicit.iter().find(|f| f.standalone) {
        if values.explicit.len() == 1 {
            return Ok(Validated::Standalone);
        }
        return Err(ParseError::OptionNotCombinable(flag.display_name()));
    }

    for flag in &explicit {
        for target in &flag.conflicts {
            let key = key_for(flags, target);
            if values.values.contains_key(&key) && !defaulted.contains(&key) {
                return Err(ParseError::ConflictingOption {
                    option: flag.display_name(),
                    conflicts_with: flag_display(target),
                });
            }
        }
    }

    for flag in &explicit {
        if let Some(target) = flag.depends.iter().find(|t| !is_set(t.as_str())) {
            return Err(ParseError::DependingOption {
                option: flag.display_name(),
                depends_on: flag_display(target),
            });
        }
    }

    for flag in explicit.iter().filter(|f| !(f.collect && f.value.is_some())) {
        let slots = flag.slots();
        if slots.len() < 2 {
            continue;
        }
        // Collected flags hold one inner array per occurrence.
        let occurrences: Vec<&Value> = match values.values.get(&flag.result_key()) {
            Some(Value::Array(items)) if flag.collect => items.iter().collect(),
            Some(value) => vec![value],
            None => vec![&Value::Null],
        };
        let short = occurrences.iter().any(|value| {
            let filled = match value {
                Value::Array(items) => items.len(),
                Value::Null => 0,
                _ => 1,
            };
            slots.iter().skip(filled).any(|slot| slot.is_required())
        });
        if short {
            return Err(ParseError::MissingOptionValue(flag.display_name()));
        }
    }

    for flag in flags.iter().filter(|f| f.required) {
        if values.values.contains_key(&flag.result_key()) {
            continue;
        }
        let exempt = flag.conflicts.iter().any(|t| is_set(t.as_str()))
            || explicit
                .iter()
                .any(|e| e.conflicts.iter().any(|t| flag.matches(t)));
        if !exempt {
            return Err(ParseError::MissingRequiredOption(flag.display_name()));
        }
    }

    Ok(Validated::Complete)
}

/// Fills absent keys from defaults and returns the keys filled.
fn inject_defaults(flags: &[&FlagSpec], values: &mut FlagValues) -> Vec<String> {
    let mut defaulted = Vec::new();

    for flag in flags {
        let key = flag.result_key();
        if values.values.contains_key(&key) {
            continue;
        }
        let default = if flag.is_negation() {
            if flags.iter().any(|f| f.name == flag.positive_name()) {
                continue;
            }
            Some(flag.default.clone().unwrap_or(Value::Bool(true)))
        } else {
            flag.default.clone()
        };
        let Some(default) = default else {
            continue;
        };

        let value = match &flag.value {
            Some(handler) => handler.apply(default, None),
            None => default,
        };
        trace!(flag = %flag.name, value = %value, "injected default");
        values.values.insert(key.clone(), value);
        defaulted.push(key);
    }

    defaulted
}

/// Result key of the flag `name` refers to, falling back to the name itself.
fn key_for(flags: &[&FlagSpec], name: &str) -> String {
    flags
        .iter()
        .find(|f| f.matches(name))
        .map(|f| f.result_key())
        .unwrap_or_else(|| param_case_to_camel_case(name))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn given(pairs: &[(&str, &str, Value)]) -> FlagValues {
        let mut values = FlagValues::default();
        for (name, key, value) in pairs {
            values.values.insert(key.to_string(), value.clone());
            values.explicit.push(name.to_string());
        }
        values
    }

    #[test]
    fn test_defaults_go_through_transform() {
        let flag = FlagSpec::new("level")
            .with_type("integer")
            .with_default(2)
            .with_value(|v, _| json!(v.as_i64().unwrap_or_default() * 10));
        let mut values = FlagValues::default();

        validate_flags(&[&flag], &mut values, false).unwrap();
        assert_eq!(values.values["level"], json!(20));
    }

    #[test]
    fn test_lone_negation_defaults_to_true() {
        let flag = FlagSpec::new("no-check");
        let mut values = FlagValues::default();

        validate_flags(&[&flag], &mut values, false).unwrap();
        assert_eq!(values.values["check"], json!(true));
    }

    #[test]
    fn test_allow_empty_skips_required() {
        let flag = FlagSpec::new("name").with_type("string").required();

        let mut values = FlagValues::default();
        assert_eq!(
            validate_flags(&[&flag], &mut values, true).unwrap(),
            Validated::Complete
        );

        let mut values = FlagValues::default();
        assert_eq!(
            validate_flags(&[&flag], &mut values, false).unwrap_err(),
            ParseError::MissingRequiredOption("--name".to_string())
        );
    }

    #[test]
    fn test_standalone_rules() {
        let help = FlagSpec::new("help").alias("h").standalone();
        let debug = FlagSpec::new("debug").with_default(false);
        let verbose = FlagSpec::new("verbose");
        let flags = [&help, &debug, &verbose];

        let mut values = given(&[("help", "help", json!(true))]);
        assert_eq!(
            validate_flags(&flags, &mut values, false).unwrap(),
            Validated::Standalone
        );

        let mut values = given(&[
            ("help", "help", json!(true)),
            ("verbose", "verbose", json!(true)),
        ]);
        assert_eq!(
            validate_flags(&flags, &mut values, false).unwrap_err(),
            ParseError::OptionNotCombinable("--help".to_string())
        );
    }

    #[test]
    fn test_conflict_with_default_is_ignored() {
        let fast = FlagSpec::new("fast").conflicts_with(&["mode"]);
        let mode = FlagSpec::new("mode").with_type("string").with_default("safe");
        let flags = [&fast, &mode];

        let mut values = given(&[("fast", "fast", json!(true))]);
        validate_flags(&flags, &mut values, false).unwrap();

        let mut values = given(&[
            ("fast", "fast", json!(true)),
            ("mode", "mode", json!("quick")),
        ]);
        assert_eq!(
            validate_flags(&flags, &mut values, false).unwrap_err().to_string(),
            "Option \"--fast\" conflicts with option \"--mode\"."
        );
    }

    #[test]
    fn test_multi_slot_missing_value() {
        let flag = FlagSpec::new("foo")
            .with_arg(command_args_core::ArgumentSpec::required("a", "string"))
            .with_arg(command_args_core::ArgumentSpec::required("b", "string"));

        let mut values = given(&[("foo", "foo", json!(["1"]))]);
        assert_eq!(
            validate_flags(&[&flag], &mut values, false).unwrap_err(),
            ParseError::MissingOptionValue("--foo".to_string())
        );
    }

    #[test]
    fn test_collected_multi_slot_checks_every_occurrence() {
        let flag = FlagSpec::new("pair")
            .collect()
            .with_arg(command_args_core::ArgumentSpec::required("a", "string"))
            .with_arg(command_args_core::ArgumentSpec::required("b", "string"));

        let mut values = given(&[("pair", "pair", json!([["x", "y"], ["z", "w"]]))]);
        validate_flags(&[&flag], &mut values, false).unwrap();

        let mut values = given(&[("pair", "pair", json!([["x", "y"], ["z"]]))]);
        assert_eq!(
            validate_flags(&[&flag], &mut values, false).unwrap_err(),
            ParseError::MissingOptionValue("--pair".to_string())
        );
    }
}
