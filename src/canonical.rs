//! Control identifier canonicalization.
//!
//! Control ids show up in several dialects: hierarchical decimal
//! ("3.2.1"), simple family-number ("ac-1"), an extended enhancement form
//! ("ac-2(1)"), and part-qualified variants of both ("ac-1.a",
//! "ac-2(1).b"). Canonicalization maps all of them onto one stable spelling
//! so statements from different documents land on the same control. An id
//! in no known dialect passes through trimmed and lower-cased; unparsed but
//! preserved is a valid, auditable outcome.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Suffix marking a statement id, as opposed to a bare control id.
pub const STATEMENT_SUFFIX: &str = "_smt";

/// One dialect: a pattern and the transforms producing the canonical
/// control id and statement id from its captures. Rules are evaluated
/// top to bottom, first match wins.
struct Dialect {
    pattern: Regex,
    control: fn(&Captures) -> String,
    statement: fn(&Captures) -> String,
}

fn number(digits: &str) -> &str {
    // strip leading zeros the way an integer round-trip would
    let stripped = digits.trim_start_matches('0');
    if stripped.is_empty() {
        "0"
    } else {
        stripped
    }
}

lazy_static! {
    static ref DIALECTS: Vec<Dialect> = vec![
        // 1.2, 1.2.3, 1.2.3.4, etc.
        Dialect {
            pattern: Regex::new(r"^\d+(\.\d+)*$").unwrap(),
            control: |caps| caps[0].to_string(),
            statement: |caps| format!("{}{}", &caps[0], STATEMENT_SUFFIX),
        },
        // ac-1
        Dialect {
            pattern: Regex::new(r"^([a-z]{2})-(\d+)$").unwrap(),
            control: |caps| format!("{}-{}", &caps[1], number(&caps[2])),
            statement: |caps| format!("{}-{}{}", &caps[1], number(&caps[2]), STATEMENT_SUFFIX),
        },
        // ac-2(1), with an optional space before the parenthesis
        Dialect {
            pattern: Regex::new(r"^([a-z]{2})-(\d+)\s*\((\d+)\)$").unwrap(),
            control: |caps| format!("{}-{}.{}", &caps[1], number(&caps[2]), number(&caps[3])),
            statement: |caps| {
                format!(
                    "{}-{}.{}{}",
                    &caps[1],
                    number(&caps[2]),
                    number(&caps[3]),
                    STATEMENT_SUFFIX
                )
            },
        },
        // ac-1.a: the part belongs to the statement id, not the control id
        Dialect {
            pattern: Regex::new(r"^([a-z]{2})-(\d+)\.([a-z]+)$").unwrap(),
            control: |caps| format!("{}-{}", &caps[1], number(&caps[2])),
            statement: |caps| {
                format!(
                    "{}-{}{}.{}",
                    &caps[1],
                    number(&caps[2]),
                    STATEMENT_SUFFIX,
                    &caps[3]
                )
            },
        },
        // ac-2(1).b
        Dialect {
            pattern: Regex::new(r"^([a-z]{2})-(\d+)\s*\((\d+)\)\.([a-z]+)$").unwrap(),
            control: |caps| format!("{}-{}.{}", &caps[1], number(&caps[2]), number(&caps[3])),
            statement: |caps| {
                format!(
                    "{}-{}.{}{}.{}",
                    &caps[1],
                    number(&caps[2]),
                    number(&caps[3]),
                    STATEMENT_SUFFIX,
                    &caps[4]
                )
            },
        },
    ];
}

/// Produce a canonical control id from any of the common dialects.
/// Never fails; unknown dialects pass through trimmed and lower-cased.
pub fn canonicalize_control_id(raw: &str) -> String {
    let id = raw.trim().to_lowercase();
    for dialect in DIALECTS.iter() {
        if let Some(caps) = dialect.pattern.captures(&id) {
            return (dialect.control)(&caps);
        }
    }
    id
}

/// Produce a canonical statement id from a control identifier. Several
/// part-level ids (".a", ".b") share one parent control id while staying
/// individually addressable here.
pub fn canonicalize_statement_id(raw: &str) -> String {
    let id = raw.trim().to_lowercase();
    for dialect in DIALECTS.iter() {
        if let Some(caps) = dialect.pattern.captures(&id) {
            return (dialect.statement)(&caps);
        }
    }
    format!("{}{}", id, STATEMENT_SUFFIX)
}
