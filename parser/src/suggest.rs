//! Closest-candidate suggestions for unknown flags, commands and types.

/// Returns the candidate closest to `input` by Levenshtein distance.
///
/// Ties go to the earliest candidate, so the result is deterministic for a
/// given candidate order. Returns `None` only when `candidates` is empty.
///
/// # Examples
///
/// ```
/// use command_args_parser::suggest;
///
/// assert_eq!(suggest("fo", &["foo", "bar"]), Some("foo"));
/// assert_eq!(suggest("-g", &["-h", "--help", "-L"]), Some("-h"));
/// assert_eq!(suggest("x", &[] as &[&str]), None);
/// ```
pub fn suggest<'a, S: AsRef<str>>(input: &str, candidates: &'a [S]) -> Option<&'a str> {
    let mut best: Option<(usize, &'a str)> = None;
    for candidate in candidates {
        let candidate = candidate.as_ref();
        let distance = levenshtein(input, candidate);
        if best.is_none_or(|(min, _)| distance < min) {
            best = Some((distance, candidate));
        }
    }
    best.map(|(_, candidate)| candidate)
}

/// Renders a ` Did you mean <kind> "<x>"?` hint, or an empty string when
/// there is no candidate.
///
/// # Examples
///
/// ```
/// use command_args_parser::did_you_mean;
///
/// assert_eq!(
///     did_you_mean("command", "hlep", &["help", "version"]),
///     " Did you mean command \"help\"?"
/// );
/// assert_eq!(did_you_mean("type", "x", &[] as &[&str]), "");
/// ```
pub fn did_you_mean<S: AsRef<str>>(kind: &str, input: &str, candidates: &[S]) -> String {
    match suggest(input, candidates) {
        Some(candidate) => format!(" Did you mean {kind} \"{candidate}\"?"),
        None => String::new(),
    }
}

/// Unit-cost edit distance over characters.
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
