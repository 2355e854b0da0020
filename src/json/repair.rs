//! Recovery for almost-JSON exports.
//!
//! Some exports are written by tools that emit Python literals and leave
//! trailing commas behind. The repair is purely lexical: nothing is evaluated.

/// Rewrites `True`, `False` and `None` outside string literals to their JSON
/// spelling and blanks out commas directly followed by `]` or `}`.
///
/// Every replacement has the same length as the original text, so line and
/// column numbers reported on the repaired text point at the original input.
pub(crate) fn repair_json(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if in_string {
            out.push(c);
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            i += 1;
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
                i += 1;
            }
            ',' if closes_after(&chars[i + 1..]) => {
                out.push(' ');
                i += 1;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                out.push_str(match word.as_str() {
                    "True" => "true",
                    "False" => "false",
                    "None" => "null",
                    other => other,
                });
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Whether the next non-whitespace character closes an array or object.
fn closes_after(rest: &[char]) -> bool {
    rest.iter()
        .find(|c| !c.is_whitespace())
        .is_some_and(|c| matches!(c, ']' | '}'))
}
