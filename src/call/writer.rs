use std::fmt::Write;

use crate::call::{CompletedCallRc, FakeObjectCall};

/// Number of listing entries shown before the listing is truncated
pub const DEFAULT_MAX_LISTED_CALLS: usize = 20;

/// Renders call histories for diagnostics
///
/// Consecutive calls with identical descriptions are collapsed into one entry
/// (`1. 'X' repeated 25 times`). Entries are numbered by the position of their first call in
/// the history. At most `max_entries` entries are written; the remaining calls are summarized
/// as `... Found K more calls not displayed.`
pub struct CallWriter {
    max_entries: usize,
}

impl Default for CallWriter {
    fn default() -> Self {
        CallWriter::new(DEFAULT_MAX_LISTED_CALLS)
    }
}

impl CallWriter {
    /// Create a writer showing at most `max_entries` collapsed entries
    pub fn new(max_entries: usize) -> Self {
        CallWriter { max_entries }
    }

    /// Write the listing of `calls`, every line prefixed with `indent` spaces
    ///
    /// Lines are separated by `\n`, the listing has no trailing newline.
    pub fn write_calls(&self, calls: &[CompletedCallRc], indent: usize) -> String {
        let pad = " ".repeat(indent);
        if calls.is_empty() {
            return format!("{}The call list is empty.", pad);
        }

        let groups = group_consecutive(calls);
        let mut output = String::new();
        let mut shown_calls = 0;

        for (entry, (first_index, description, count)) in groups.iter().enumerate() {
            if entry == self.max_entries {
                break;
            }
            if entry > 0 {
                output.push('\n');
            }

            let _ = write!(output, "{}{}. '{}'", pad, first_index + 1, description);
            if *count > 1 {
                let _ = write!(output, " repeated {} times", count);
            }
            shown_calls += count;
        }

        if shown_calls < calls.len() {
            if !output.is_empty() {
                output.push('\n');
            }
            let _ = write!(
                output,
                "{}... Found {} more calls not displayed.",
                pad,
                calls.len() - shown_calls
            );
        }

        output
    }
}

/// Collapse consecutive identical descriptions into (index of first call, description, count)
fn group_consecutive(calls: &[CompletedCallRc]) -> Vec<(usize, String, usize)> {
    let mut groups: Vec<(usize, String, usize)> = Vec::new();

    for (index, call) in calls.iter().enumerate() {
        let description = call.description();
        match groups.last_mut() {
            Some((_, last, count)) if *last == description => *count += 1,
            _ => groups.push((index, description, 1)),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{call::InterceptedCall, test::test_types, ObjectRef, Value};

    fn calls_of(values: &[i32]) -> Vec<CompletedCallRc> {
        let types = test_types();
        let receiver = ObjectRef::new(&types.base);
        let bar = types.method(&types.ifoo, "Bar");

        values
            .iter()
            .map(|value| {
                let call = InterceptedCall::new(&receiver, &bar, vec![Value::from(*value)]).unwrap();
                Arc::new(call.freeze())
            })
            .collect()
    }

    #[test]
    fn test_empty_listing() {
        let writer = CallWriter::default();
        assert_eq!(writer.write_calls(&[], 4), "    The call list is empty.");
    }

    #[test]
    fn test_distinct_calls() {
        let writer = CallWriter::default();
        let calls = calls_of(&[1, 2]);
        assert_eq!(
            writer.write_calls(&calls, 2),
            "  1. 'Tests.IFoo.Bar(x: 1)'\n  2. 'Tests.IFoo.Bar(x: 2)'"
        );
    }

    #[test]
    fn test_repeated_calls_are_collapsed() {
        let mut values = vec![1; 25];
        values.push(2);
        let calls = calls_of(&values);

        let writer = CallWriter::default();
        assert_eq!(
            writer.write_calls(&calls, 4),
            "    1. 'Tests.IFoo.Bar(x: 1)' repeated 25 times\n    26. 'Tests.IFoo.Bar(x: 2)'"
        );
    }

    #[test]
    fn test_only_consecutive_calls_are_collapsed() {
        let calls = calls_of(&[1, 1, 2, 1]);
        let writer = CallWriter::default();
        assert_eq!(
            writer.write_calls(&calls, 0),
            "1. 'Tests.IFoo.Bar(x: 1)' repeated 2 times\n3. 'Tests.IFoo.Bar(x: 2)'\n4. 'Tests.IFoo.Bar(x: 1)'"
        );
    }

    #[test]
    fn test_truncation_counts_hidden_calls() {
        let calls = calls_of(&[1, 2, 2, 3, 4, 4, 4]);
        let writer = CallWriter::new(2);
        assert_eq!(
            writer.write_calls(&calls, 0),
            "1. 'Tests.IFoo.Bar(x: 1)'\n2. 'Tests.IFoo.Bar(x: 2)' repeated 2 times\n... Found 4 more calls not displayed."
        );
    }

    #[test]
    fn test_default_budget() {
        let values: Vec<i32> = (0..25).collect();
        let calls = calls_of(&values);
        let listing = CallWriter::default().write_calls(&calls, 0);

        assert!(listing.contains("20. 'Tests.IFoo.Bar(x: 19)'"));
        assert!(!listing.contains("21. "));
        assert!(listing.ends_with("... Found 5 more calls not displayed."));
    }

    #[test]
    fn test_zero_budget_lists_only_the_summary() {
        let calls = calls_of(&[1, 2, 2]);
        let writer = CallWriter::new(0);
        assert_eq!(
            writer.write_calls(&calls, 4),
            "    ... Found 3 more calls not displayed."
        );
    }
}
