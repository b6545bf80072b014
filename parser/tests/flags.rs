//! Flag-level parsing: no commands, no positional binding.

use command_args_core::{ArgumentSpec, FlagSpec};
use command_args_parser::{ParseError, ParseOptions, TypeRegistry, parse_flags, parse_flags_with};
use serde_json::{Value, json};

fn options(stop_early: bool) -> ParseOptions {
    ParseOptions {
        stop_early,
        ..Default::default()
    }
}

fn script_flags() -> Vec<FlagSpec> {
    vec![
        FlagSpec::new("flag").alias("f").with_type("boolean").optional_value(),
        FlagSpec::new("script-arg1").alias("s").with_type("boolean").optional_value(),
        FlagSpec::new("script-arg2").alias("S").with_type("boolean").optional_value(),
    ]
}

#[test]
fn test_stop_early_disabled_resumes_matching() {
    let tokens = [
        "-f", "true", "run", "script-name", "--script-arg1", "--script-arg2", "--",
        "--literal-arg1", "--literal-arg2",
    ];
    let result = parse_flags(&tokens, &script_flags(), &options(false)).unwrap();

    assert_eq!(
        result.flags,
        json!({ "flag": true, "scriptArg1": true, "scriptArg2": true })
    );
    assert_eq!(result.unknown, vec!["run", "script-name"]);
    assert_eq!(result.literal, vec!["--literal-arg1", "--literal-arg2"]);
}

#[test]
fn test_stop_early_enabled_stops_at_first_positional() {
    let tokens = [
        "-f", "true", "run", "script-name", "--script-arg1", "--script-arg2", "--script-arg3",
        "--", "--literal-arg1", "--literal-arg2",
    ];
    let result = parse_flags(&tokens, &script_flags(), &options(true)).unwrap();

    assert_eq!(result.flags, json!({ "flag": true }));
    assert_eq!(
        result.unknown,
        vec!["run", "script-name", "--script-arg1", "--script-arg2", "--script-arg3"]
    );
    assert_eq!(result.literal, vec!["--literal-arg1", "--literal-arg2"]);
}

#[test]
fn test_stop_early_still_rejects_unknown_flags_before_positionals() {
    let tokens = ["-f", "true", "-t", "true", "run"];
    let err = parse_flags(&tokens, &script_flags(), &options(true)).unwrap_err();

    assert!(err.to_string().starts_with("Unknown option \"-t\"."));
}

fn bitrate_flags() -> Vec<FlagSpec> {
    vec![
        FlagSpec::new("bitrate.audio")
            .alias("b.a")
            .alias("audio-bitrate")
            .with_type("number"),
        FlagSpec::new("bitrate.video")
            .alias("b.v")
            .alias("video-bitrate")
            .with_type("number"),
    ]
}

#[test]
fn test_dotted_options_nest_for_every_spelling() {
    let expected = json!({ "bitrate": { "audio": 300, "video": 900 } });

    for tokens in [
        &["--bitrate.audio", "300", "--bitrate.video", "900"][..],
        &["-b.a", "300", "-b.v", "900"],
        &["--audio-bitrate", "300", "--video-bitrate", "900"],
        &["--bitrate.audio=300", "-b.v", "900"],
    ] {
        let result = parse_flags(tokens, &bitrate_flags(), &ParseOptions::default()).unwrap();
        assert_eq!(result.flags, expected, "tokens: {tokens:?}");
    }
}

#[test]
fn test_defaults_and_explicit_override() {
    let flags = [
        FlagSpec::new("depth").with_type("integer").with_default(3),
        FlagSpec::new("color").with_type("string").with_default("auto"),
    ];

    let empty = parse_flags(&[] as &[&str], &flags, &ParseOptions::default()).unwrap();
    assert_eq!(empty.flags, json!({ "depth": 3, "color": "auto" }));

    let given = parse_flags(&["--depth", "7"], &flags, &ParseOptions::default()).unwrap();
    assert_eq!(given.flags, json!({ "depth": 7, "color": "auto" }));
}

#[test]
fn test_combined_short_switches_match_separate_ones() {
    let flags = [
        FlagSpec::new("all").alias("a"),
        FlagSpec::new("long").alias("l"),
        FlagSpec::new("human").alias("h"),
    ];

    let combined = parse_flags(&["-alh"], &flags, &ParseOptions::default()).unwrap();
    let separate = parse_flags(&["-h", "-a", "-l"], &flags, &ParseOptions::default()).unwrap();

    assert_eq!(combined.flags, json!({ "all": true, "long": true, "human": true }));
    assert_eq!(combined.flags, separate.flags);
}

#[test]
fn test_cluster_ends_at_value_flag() {
    let flags = [
        FlagSpec::new("verbose").alias("v"),
        FlagSpec::new("output").alias("o").with_type("string"),
    ];

    let attached = parse_flags(&["-vofile.txt"], &flags, &ParseOptions::default()).unwrap();
    assert_eq!(attached.flags, json!({ "verbose": true, "output": "file.txt" }));

    let next = parse_flags(&["-vo", "file.txt"], &flags, &ParseOptions::default()).unwrap();
    assert_eq!(next.flags, attached.flags);
}

#[test]
fn test_conflicts_fail_in_either_order() {
    let flags = [
        FlagSpec::new("json").conflicts_with(&["yaml"]),
        FlagSpec::new("yaml"),
    ];

    for tokens in [["--json", "--yaml"], ["--yaml", "--json"]] {
        let err = parse_flags(&tokens, &flags, &ParseOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ParseError::ConflictingOption {
                option: "--json".to_string(),
                conflicts_with: "--yaml".to_string(),
            }
        );
    }
}

#[test]
fn test_depends_requires_the_other_flag() {
    let flags = [
        FlagSpec::new("key").with_type("string").depends_on(&["cert"]),
        FlagSpec::new("cert").with_type("string"),
    ];

    let err = parse_flags(&["--key", "k.pem"], &flags, &ParseOptions::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Option \"--key\" depends on option \"--cert\"."
    );

    let result = parse_flags(
        &["--key", "k.pem", "--cert", "c.pem"],
        &flags,
        &ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(result.flags, json!({ "key": "k.pem", "cert": "c.pem" }));
}

#[test]
fn test_list_coercion_and_bad_element() {
    let flags = [FlagSpec::new("list").alias("l").with_type("number[]")];

    let result = parse_flags(&["--list", "1,2,3"], &flags, &ParseOptions::default()).unwrap();
    assert_eq!(result.flags, json!({ "list": [1, 2, 3] }));

    let err = parse_flags(&["-l", "1,2,3,four"], &flags, &ParseOptions::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Option \"--list\" must be of type \"number\", but got \"four\"."
    );
}

#[test]
fn test_list_with_custom_separator() {
    let flags = [FlagSpec::new("tags")
        .with_arg(ArgumentSpec::required("tags", "string").list())
        .separator(" ")];

    let result = parse_flags(&["--tags", "a b c"], &flags, &ParseOptions::default()).unwrap();
    assert_eq!(result.flags, json!({ "tags": ["a", "b", "c"] }));
}

#[test]
fn test_required_flag_exempted_by_conflict() {
    let flags = [
        FlagSpec::new("file").with_type("string").required().conflicts_with(&["stdin"]),
        FlagSpec::new("stdin"),
    ];

    let result = parse_flags(&["--stdin"], &flags, &ParseOptions::default()).unwrap();
    assert_eq!(result.flags, json!({ "stdin": true }));

    let err = parse_flags(&[] as &[&str], &flags, &ParseOptions::default()).unwrap_err();
    assert_eq!(err.to_string(), "Missing required option \"--file\".");
}

#[test]
fn test_allow_empty_skips_required_checks() {
    let flags = [FlagSpec::new("name").with_type("string").required()];
    let options = ParseOptions {
        allow_empty: true,
        ..Default::default()
    };

    let result = parse_flags(&[] as &[&str], &flags, &options).unwrap();
    assert_eq!(result.flags, json!({}));
}

#[test]
fn test_collect_accumulates_and_duplicate_fails() {
    let flags = [
        FlagSpec::new("include").alias("I").with_type("path").collect(),
        FlagSpec::new("output").alias("o").with_type("path"),
    ];

    let result = parse_flags(
        &["-I", "src", "-I", "lib", "--include=vendor"],
        &flags,
        &ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(result.flags, json!({ "include": ["src", "lib", "vendor"] }));

    let err = parse_flags(&["-o", "a", "-o", "b"], &flags, &ParseOptions::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Option \"--output\" can only occur once, but was found several times."
    );
}

#[test]
fn test_value_transform_counts_occurrences() {
    let flags = [FlagSpec::new("verbose")
        .alias("v")
        .collect()
        .with_value(|_, previous: Option<&Value>| {
            json!(previous.and_then(Value::as_i64).unwrap_or(0) + 1)
        })];

    let result = parse_flags(&["-vvv"], &flags, &ParseOptions::default()).unwrap();
    assert_eq!(result.flags, json!({ "verbose": 3 }));
}

#[test]
fn test_negated_flag() {
    let flags = [
        FlagSpec::new("color").with_type("boolean").with_default(true),
        FlagSpec::new("no-color"),
    ];

    let default = parse_flags(&[] as &[&str], &flags, &ParseOptions::default()).unwrap();
    assert_eq!(default.flags, json!({ "color": true }));

    let negated = parse_flags(&["--no-color"], &flags, &ParseOptions::default()).unwrap();
    assert_eq!(negated.flags, json!({ "color": false }));
}

#[test]
fn test_multi_slot_flag() {
    let flags = [FlagSpec::new("point")
        .alias("p")
        .with_arg(ArgumentSpec::required("x", "number"))
        .with_arg(ArgumentSpec::required("y", "number"))
        .with_arg(ArgumentSpec::optional("label", "string"))];

    let result = parse_flags(&["-p", "1", "-2", "origin"], &flags, &ParseOptions::default()).unwrap();
    assert_eq!(result.flags, json!({ "point": [1, -2, "origin"] }));

    let short = parse_flags(&["-p", "1"], &flags, &ParseOptions::default()).unwrap_err();
    assert_eq!(short.to_string(), "Missing value for option \"--point\".");
}

#[test]
fn test_collected_multi_slot_flag_checks_each_occurrence() {
    let flags = [FlagSpec::new("pair")
        .collect()
        .with_arg(ArgumentSpec::required("key", "string"))
        .with_arg(ArgumentSpec::required("value", "string"))];

    let result = parse_flags(
        &["--pair", "a", "1", "--pair", "b", "2"],
        &flags,
        &ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(result.flags, json!({ "pair": [["a", "1"], ["b", "2"]] }));

    let err = parse_flags(&["--pair", "x", "y", "--pair", "z"], &flags, &ParseOptions::default())
        .unwrap_err();
    assert_eq!(err.to_string(), "Missing value for option \"--pair\".");
}

#[test]
fn test_empty_inline_value_is_an_empty_string() {
    let flags = [
        FlagSpec::new("name").with_type("string"),
        FlagSpec::new("force").alias("f"),
    ];

    let result = parse_flags(&["--name=", "next"], &flags, &ParseOptions::default()).unwrap();
    assert_eq!(result.flags, json!({ "name": "" }));
    assert_eq!(result.unknown, vec!["next"]);

    let result = parse_flags(&["--name="], &flags, &ParseOptions::default()).unwrap();
    assert_eq!(result.flags, json!({ "name": "" }));

    let result = parse_flags(&["--force="], &flags, &ParseOptions::default()).unwrap();
    assert_eq!(result.flags, json!({ "force": true }));
}

#[test]
fn test_number_accepts_radix_prefixes() {
    let flags = [
        FlagSpec::new("num").alias("n").with_type("number"),
        FlagSpec::new("mode").alias("m").with_type("integer"),
    ];

    let result = parse_flags(&["-n", "0x10", "-m", "0o17"], &flags, &ParseOptions::default()).unwrap();
    assert_eq!(result.flags, json!({ "num": 16, "mode": 15 }));

    let err = parse_flags(&["-n", "0xzz"], &flags, &ParseOptions::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Option \"--num\" must be of type \"number\", but got \"0xzz\"."
    );
}

#[test]
fn test_lenient_mode_without_declared_flags() {
    let result = parse_flags(
        &["--name", "x", "--name", "y", "--flag", "pos"],
        &[],
        &ParseOptions::default(),
    )
    .unwrap();

    assert_eq!(result.flags, json!({ "name": ["x", "y"], "flag": "pos" }));
    assert!(result.unknown.is_empty());
}

#[test]
fn test_custom_type_through_registry() {
    let types = TypeRegistry::new().with_type("color", |info| match info.value {
        "red" | "green" | "blue" => Ok(json!(info.value.to_uppercase())),
        _ => Err(info.invalid_message()),
    });
    let flags = [FlagSpec::new("color").alias("c").with_type("color")];

    let result =
        parse_flags_with(&["-c", "red"], &flags, &ParseOptions::default(), &types).unwrap();
    assert_eq!(result.flags, json!({ "color": "RED" }));

    let err =
        parse_flags_with(&["-c", "pink"], &flags, &ParseOptions::default(), &types).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Option \"--color\" must be a valid \"color\", but got \"pink\"."
    );
}

#[test]
fn test_unknown_type_suggests_registered_name() {
    let flags = [FlagSpec::new("count").with_type("integr")];

    let err = parse_flags(&["--count", "1"], &flags, &ParseOptions::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown type \"integr\". Did you mean type \"integer\"?"
    );
}
