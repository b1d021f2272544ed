//! ## name
//!
//! Remote file name utilities

use crate::{ShareError, ShareResult};

/// Check that `name` addresses a single entry of the share root
pub fn validate(name: &str) -> ShareResult<&str> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ShareError::InvalidName(name.to_string()));
    }
    Ok(name)
}

/// Whether `name` contains SMB wildcards (`*`, `?`)
pub fn is_pattern(name: &str) -> bool {
    name.contains(['*', '?'])
}

/// Whether `a` and `b` name the same entry
pub fn same_name(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.eq_ignore_ascii_case(b)
    }
}

/// Match `name` against an SMB-like wildcard pattern.
///
/// `*` matches any sequence, `?` any single character. Unless `case_sensitive`,
/// comparison ignores ASCII case.
pub fn matches(pattern: &str, name: &str, case_sensitive: bool) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    let (mut p, mut n) = (0, 0);
    // position of last star in pattern and the name position it is matching from
    let mut backtrack: Option<(usize, usize)> = None;
    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, n));
                p += 1;
            }
            Some(c)
                if *c == '?'
                    || (case_sensitive && *c == name[n])
                    || (!case_sensitive && c.eq_ignore_ascii_case(&name[n])) =>
            {
                p += 1;
                n += 1;
            }
            _ => match backtrack {
                Some((star, from)) => {
                    p = star + 1;
                    n = from + 1;
                    backtrack = Some((star, from + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|c| *c == '*')
}
