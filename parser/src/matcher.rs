//! Flag token matching.
//!
//! The [`FlagMatcher`] recognizes one flag token at a time (`--name`,
//! `--name=value`, `-x`, clustered `-xyz`, dotted `-b.a`), consumes the
//! values its slots ask for and records the coerced result in
//! [`FlagValues`].

use std::borrow::Cow;

use command_args_core::{ArgumentSpec, DEFAULT_SEPARATOR, FlagSpec, flag_display};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{ParseError, Result};
use crate::suggest::suggest;
use crate::types::{TypeInfo, TypeRegistry, parse_number};

/// Returns `true` if the token is written like a flag. A lone `-` is a
/// positional value.
pub(crate) fn is_flag(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

/// Flag values collected during a parse.
#[derive(Debug, Default)]
pub(crate) struct FlagValues {
    /// Flat result keys (camelCase, dots kept) to values.
    pub values: Map<String, Value>,
    /// Canonical names of flags given on the command line, first occurrence order.
    pub explicit: Vec<String>,
}

impl FlagValues {
    fn is_explicit(&self, name: &str) -> bool {
        self.explicit.iter().any(|n| n == name)
    }

    fn mark_explicit(&mut self, name: &str) {
        if !self.is_explicit(name) {
            self.explicit.push(name.to_string());
        }
    }
}

/// Tokens a flag scan did not consume.
#[derive(Debug, Default)]
pub(crate) struct Leftovers {
    pub unknown: Vec<String>,
    pub literal: Vec<String>,
}

/// Matches flag tokens against a set of visible flags.
///
/// With an empty flag set the matcher is lenient: every flag is accepted as
/// an optional string flag, and repeats accumulate into a list.
pub(crate) struct FlagMatcher<'a> {
    flags: &'a [&'a FlagSpec],
    types: &'a TypeRegistry,
    commands: &'a [&'a str],
    lenient: bool,
}

impl<'a> FlagMatcher<'a> {
    pub fn new(flags: &'a [&'a FlagSpec], types: &'a TypeRegistry) -> Self {
        Self {
            flags,
            types,
            commands: &[],
            lenient: flags.is_empty(),
        }
    }

    /// Child command names; optional values never swallow them.
    pub fn with_commands(mut self, commands: &'a [&'a str]) -> Self {
        self.commands = commands;
        self
    }

    /// Scans a flag-only command line.
    ///
    /// Non-flag tokens go to `unknown`; with `stop_early` the first one ends
    /// matching and everything up to `--` goes to `unknown`. Tokens after
    /// `--` go to `literal`.
    pub fn scan(&self, tokens: &[String], stop_early: bool, values: &mut FlagValues) -> Result<Leftovers> {
        let mut leftovers = Leftovers::default();
        let mut index = 0;

        while let Some(token) = tokens.get(index) {
            if token == "--" {
                leftovers.literal.extend_from_slice(&tokens[index + 1..]);
                break;
            }
            if is_flag(token) {
                index += self.match_flag(&tokens[index..], values)?;
                continue;
            }
            if stop_early {
                let rest = &tokens[index..];
                let end = rest.iter().position(|t| t == "--").unwrap_or(rest.len());
                leftovers.unknown.extend_from_slice(&rest[..end]);
                if end < rest.len() {
                    leftovers.literal.extend_from_slice(&rest[end + 1..]);
                }
                break;
            }
            leftovers.unknown.push(token.clone());
            index += 1;
        }

        Ok(leftovers)
    }

    /// Matches the flag token at `tokens[0]` and returns how many tokens were
    /// consumed, including the flag itself.
    pub fn match_flag(&self, tokens: &[String], values: &mut FlagValues) -> Result<usize> {
        let Some((token, rest)) = tokens.split_first() else {
            return Ok(0);
        };
        let (head, inline) = match token.split_once('=') {
            Some((head, value)) => (head, Some(value)),
            None => (token.as_str(), None),
        };

        if let Some(name) = head.strip_prefix("--") {
            let spec = self.lookup(name, head)?;
            return Ok(1 + self.apply(&spec, inline, rest, values)?);
        }

        let body = &head[1..];
        let mut letters = body.char_indices();
        let single = match (letters.next(), letters.next()) {
            (_, None) => true,
            (_, Some((_, second))) => second == '.',
        };
        if single {
            let spec = self.lookup(body, head)?;
            return Ok(1 + self.apply(&spec, inline, rest, values)?);
        }

        for (start, letter) in body.char_indices() {
            let end = start + letter.len_utf8();
            let short = &body[start..end];
            let spec = self.lookup(short, &format!("-{short}"))?;
            let remainder = &body[end..];

            if remainder.is_empty() {
                return Ok(1 + self.apply(&spec, inline, rest, values)?);
            }
            if spec.is_switch() {
                self.apply(&spec, None, &[], values)?;
                continue;
            }
            let value = match inline {
                Some(inline) => format!("{remainder}={inline}"),
                None => remainder.to_string(),
            };
            return Ok(1 + self.apply(&spec, Some(&value), rest, values)?);
        }

        Ok(1)
    }

    fn lookup(&self, name: &str, typed: &str) -> Result<Cow<'a, FlagSpec>> {
        if let Some(spec) = self.flags.iter().rev().find(|f| f.matches(name)) {
            return Ok(Cow::Borrowed(*spec));
        }
        if self.lenient && !name.is_empty() {
            return Ok(Cow::Owned(
                FlagSpec::new(name).with_type("string").optional_value(),
            ));
        }

        let candidates: Vec<String> = self
            .flags
            .iter()
            .flat_map(|f| std::iter::once(&f.name).chain(&f.aliases))
            .map(|n| flag_display(n))
            .collect();
        Err(ParseError::UnknownOption {
            option: typed.to_string(),
            suggestion: suggest(typed, &candidates).map(str::to_string),
        })
    }

    /// Consumes values for `spec` and records them. Returns the number of
    /// tokens consumed from `rest`.
    fn apply(
        &self,
        spec: &FlagSpec,
        inline: Option<&str>,
        rest: &[String],
        values: &mut FlagValues,
    ) -> Result<usize> {
        if spec.is_negation() {
            values.values.insert(spec.result_key(), Value::Bool(false));
            values.mark_explicit(&spec.name);
            trace!(flag = %spec.name, "matched negated flag");
            return Ok(0);
        }

        let slots = spec.slots();
        if slots.is_empty() {
            let value = match inline.filter(|raw| !raw.is_empty()) {
                Some(raw) => self
                    .types
                    .resolve(&TypeInfo::option(&spec.display_name(), "boolean", raw))?,
                None => Value::Bool(true),
            };
            self.record(spec, value, values)?;
            return Ok(0);
        }

        // `--flag=` fills the first slot with an empty string, except for a
        // boolean slot where it reads as the omitted value.
        let mut inline = match inline {
            Some("") if slots.first().is_some_and(|s| s.element_type() == "boolean") => Some("true"),
            other => other,
        };
        let mut consumed = 0;
        let mut parsed = Vec::new();
        for slot in slots.iter() {
            let before = parsed.len();
            let mut continuation = false;
            loop {
                let raw = match inline.take() {
                    Some(raw) => Some(raw),
                    None => match rest.get(consumed) {
                        Some(next) if self.accepts(slot, next, continuation) => {
                            consumed += 1;
                            Some(next.as_str())
                        }
                        _ => None,
                    },
                };
                let Some(raw) = raw else {
                    break;
                };
                parsed.push(self.coerce(spec, slot, raw)?);
                if !slot.variadic {
                    break;
                }
                continuation = true;
            }
            if parsed.len() == before {
                break;
            }
        }

        let value = if parsed.is_empty() {
            match slots.first() {
                Some(first) if first.is_required() => {
                    return Err(ParseError::MissingOptionValue(spec.display_name()));
                }
                Some(first) if first.element_type() == "boolean" => Value::Bool(true),
                _ => spec.default.clone().unwrap_or(Value::Bool(true)),
            }
        } else if spec.is_multi_value() {
            Value::Array(parsed)
        } else {
            parsed.swap_remove(0)
        };

        self.record(spec, value, values)?;
        Ok(consumed)
    }

    /// Decides whether the next token fills `slot`.
    fn accepts(&self, slot: &ArgumentSpec, token: &str, continuation: bool) -> bool {
        if token == "--" {
            return false;
        }
        if slot.is_required() && !continuation {
            return true;
        }
        if slot.element_type() == "boolean" && !slot.is_list() {
            return matches!(token, "true" | "false" | "1" | "0");
        }
        if is_flag(token) {
            return self.types.is_numeric(slot.element_type()) && parse_number(token).is_some();
        }
        !self.commands.contains(&token)
    }

    fn coerce(&self, spec: &FlagSpec, slot: &ArgumentSpec, raw: &str) -> Result<Value> {
        let name = spec.display_name();
        let info = TypeInfo::option(&name, slot.element_type(), raw);
        if slot.is_list() {
            let separator = spec.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR);
            self.types.resolve_list(&info, separator)
        } else {
            self.types.resolve(&info)
        }
    }

    fn record(&self, spec: &FlagSpec, value: Value, values: &mut FlagValues) -> Result<()> {
        let key = spec.result_key();
        let repeated = values.is_explicit(&spec.name);
        if repeated && !spec.collect && !self.lenient {
            return Err(ParseError::DuplicateOption(spec.display_name()));
        }

        let previous = values.values.get(&key);
        let next = if let Some(handler) = &spec.value {
            handler.apply(value, previous)
        } else if spec.collect {
            let mut items = match previous {
                Some(Value::Array(items)) if repeated => items.clone(),
                _ => Vec::new(),
            };
            items.push(value);
            Value::Array(items)
        } else if repeated {
            match previous {
                Some(Value::Array(items)) => {
                    let mut items = items.clone();
                    items.push(value);
                    Value::Array(items)
                }
                Some(first) => Value::Array(vec![first.clone(), value]),
                None => value,
            }
        } else {
            value
        };

        trace!(flag = %spec.name, value = %next, "matched flag");
        values.values.insert(key, next);
        values.mark_explicit(&spec.name);
        Ok(())
    }
}
