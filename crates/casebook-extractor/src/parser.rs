//! Parse model output into use case records
//!
//! Parsing is label-anchored: a line that starts with a known field label
//! opens that field, and following lines accumulate into it until the next
//! label. Models drift from the requested layout, so labels are matched
//! through list markers, markdown emphasis, headings, case differences and
//! common aliases. Headings, bold-only lines and labels we do not know end
//! the open field.

use casebook_domain::{UseCaseField, UseCaseRecord};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static LABEL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        ^(?:(?:[-*•+>]|\#{1,6}|\d+[.)])\s*)*
        (?:\*\*|__)?\s*
        (?:
            (?P<title>use\s+case(?:\s*\#?\s*\d+)?(?:\s+(?:title|name))?|title)
          | (?P<actors>(?:primary\s+)?actors?(?:\s*\(s\))?)
          | (?P<preconditions>pre-?\s*conditions?)
          | (?P<trigger>triggers?)
          | (?P<main_flow>main\s+(?:success\s+)?(?:flow|scenario)s?|basic\s+flow)
          | (?P<alternative_flows>alternat(?:e|ive)\s+(?:flows?|scenarios?|paths?)|extensions?)
          | (?P<postconditions>post-?\s*conditions?)
          | (?P<notes>notes?)
        )
        \s*(?:\*\*|__)?\s*:\s*(?:\*\*|__)?
        (?P<rest>.*)$",
    )
    .expect("label pattern is valid")
});

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        ^(?:
            [-*•+]\s+
          | \(?\d+(?:\.\d+)*[.)]\s+
          | \d+(?:\.\d+)+\s+
          | \(?[a-z][.)]\s+
          | step\s*\d+\s*[:.)-]?\s*
        )",
    )
    .expect("list marker pattern is valid")
});

/// `Use Case 2` as a bare heading: a block boundary without a title
static USE_CASE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:#{1,6}\s*)?(?:\*\*|__)?\s*use\s+case\s*#?\s*\d+\s*(?:\*\*|__)?$")
        .expect("use case heading pattern is valid")
});

/// Markdown headings and lines that are bold and nothing else
static SECTION_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^(?:
            \#{1,6}\s.*
          | (?:[-*•+>]\s*)?(?:\*\*|__)[^*_]+(?:\*\*|__)\s*:?
        )$",
    )
    .expect("section break pattern is valid")
});

/// A capitalised label of up to four words that is not one of ours
static UNKNOWN_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^(?P<bullet>[-*•+>]\s*)?
        (?:\*\*|__)?\s*
        [A-Z][A-Za-z()/&'-]*(?:\s+[A-Za-z()/&'-]+){0,3}
        \s*(?:\*\*|__)?\s*:
        (?:\*\*|__)?(?:\s.*)?$",
    )
    .expect("unknown label pattern is valid")
});

static HORIZONTAL_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*_]\s*){3,}$").expect("rule pattern is valid"));

const FIELD_GROUPS: [(&str, UseCaseField); 8] = [
    ("title", UseCaseField::Title),
    ("actors", UseCaseField::Actors),
    ("preconditions", UseCaseField::Preconditions),
    ("trigger", UseCaseField::Trigger),
    ("main_flow", UseCaseField::MainFlow),
    ("alternative_flows", UseCaseField::AlternativeFlows),
    ("postconditions", UseCaseField::Postconditions),
    ("notes", UseCaseField::Notes),
];

/// Parse one model response into records
///
/// Never fails: unrecognised text is skipped, and only records with a
/// non-empty title are returned.
pub fn parse_llm_response(response: &str) -> Vec<UseCaseRecord> {
    let mut records = Vec::new();
    let mut draft: Option<Draft> = None;

    for raw_line in response.lines() {
        let line = raw_line.trim();

        if line.starts_with("```") || line.starts_with("~~~") || HORIZONTAL_RULE.is_match(line) {
            continue;
        }

        if line.is_empty() {
            if let Some(d) = draft.as_mut() {
                d.after_blank = true;
            }
            continue;
        }

        if let Some((field, rest)) = match_label(line) {
            if field == UseCaseField::Title {
                if let Some(done) = draft.take() {
                    done.commit(&mut records);
                }
            }
            let d = draft.get_or_insert_with(Draft::default);
            d.open = Some(field);
            d.after_blank = false;
            d.push(field, rest);
            continue;
        }

        if USE_CASE_HEADING.is_match(line) {
            if let Some(done) = draft.take() {
                done.commit(&mut records);
            }
            continue;
        }

        let Some(d) = draft.as_mut() else {
            continue;
        };
        let Some(field) = d.open else {
            continue;
        };

        if ends_field(line, field, d.record.title.is_empty())
            || (d.after_blank && !is_enumerated(line))
        {
            d.open = None;
            continue;
        }
        d.after_blank = false;
        d.push(field, line);
    }

    if let Some(done) = draft {
        done.commit(&mut records);
    }

    debug!("Parsed {} use case records", records.len());
    records
}

fn match_label(line: &str) -> Option<(UseCaseField, &str)> {
    let caps = LABEL_LINE.captures(line)?;
    let field = FIELD_GROUPS
        .iter()
        .find(|(group, _)| caps.name(group).is_some())
        .map(|(_, field)| *field)?;
    let rest = caps.name("rest").map_or("", |m| m.as_str());
    Some((field, rest))
}

/// Whether `line` closes the open field instead of continuing it
///
/// Bulleted `Label: text` lines stay inside flows, where models write
/// steps like `- Card declined: show an error`. A heading right after an
/// empty title label is the title itself.
fn ends_field(line: &str, field: UseCaseField, title_pending: bool) -> bool {
    if SECTION_BREAK.is_match(line) {
        return !(field == UseCaseField::Title && title_pending);
    }
    match UNKNOWN_LABEL.captures(line) {
        Some(caps) => {
            caps.name("bullet").is_none()
                || !matches!(field, UseCaseField::MainFlow | UseCaseField::AlternativeFlows)
        }
        None => false,
    }
}

fn is_enumerated(line: &str) -> bool {
    LIST_MARKER.is_match(line)
}

fn strip_marker(line: &str) -> &str {
    match LIST_MARKER.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// Trim whitespace and stray emphasis markers
fn clean(value: &str) -> &str {
    value
        .trim()
        .trim_matches(|c| c == '*' || c == '_')
        .trim()
}

fn is_placeholder(value: &str) -> bool {
    let lowered = value.trim_end_matches('.').to_ascii_lowercase();
    matches!(
        lowered.as_str(),
        "" | "-" | "none" | "n/a" | "na" | "not applicable" | "not specified" | "tbd"
    )
}

/// A record being assembled
#[derive(Default)]
struct Draft {
    record: UseCaseRecord,
    open: Option<UseCaseField>,
    after_blank: bool,
}

impl Draft {
    fn push(&mut self, field: UseCaseField, raw: &str) {
        let value = clean(strip_marker(clean(raw)));
        if is_placeholder(value) {
            return;
        }

        let record = &mut self.record;
        match field {
            UseCaseField::Actors => record.actors.extend(
                value
                    .split([',', ';'])
                    .map(clean)
                    .filter(|actor| !is_placeholder(actor))
                    .map(str::to_string),
            ),
            UseCaseField::MainFlow => record.main_flow.push(value.to_string()),
            UseCaseField::AlternativeFlows => record.alternative_flows.push(value.to_string()),
            UseCaseField::Title => append(&mut record.title, value, " "),
            UseCaseField::Preconditions => append(&mut record.preconditions, value, "\n"),
            UseCaseField::Trigger => append(&mut record.trigger, value, "\n"),
            UseCaseField::Postconditions => append(&mut record.postconditions, value, "\n"),
            UseCaseField::Notes => append(&mut record.notes, value, "\n"),
        }
    }

    fn commit(self, records: &mut Vec<UseCaseRecord>) {
        if self.record.is_valid() {
            records.push(self.record);
        } else {
            debug!("Dropping use case block without a title");
        }
    }
}

fn append(target: &mut String, value: &str, separator: &str) {
    if !target.is_empty() {
        target.push_str(separator);
    }
    target.push_str(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TWO_BLOCKS: &str = "\
- Use Case Title: Place Order
- Actor(s): Customer, Payment Gateway
- Preconditions: Customer is logged in
- Trigger: Customer clicks Checkout
- Main Flow:
  1. Customer reviews the cart
  2. System charges the card
- Alternative Flows:
  a) Card is declined
- Postconditions: Order is stored
- Notes: None

- Use Case Title: Cancel Order
- Actor(s): Customer
- Preconditions: N/A
- Trigger: Customer clicks Cancel
- Main Flow:
  1. System cancels the order
- Alternative Flows: -
- Postconditions: Refund is issued
- Notes: Only before shipping
";

    #[test]
    fn test_parse_two_blocks() {
        let records = parse_llm_response(TWO_BLOCKS);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.title, "Place Order");
        assert_eq!(first.actors, vec!["Customer", "Payment Gateway"]);
        assert_eq!(first.preconditions, "Customer is logged in");
        assert_eq!(first.trigger, "Customer clicks Checkout");
        assert_eq!(
            first.main_flow,
            vec!["Customer reviews the cart", "System charges the card"]
        );
        assert_eq!(first.alternative_flows, vec!["Card is declined"]);
        assert_eq!(first.postconditions, "Order is stored");
        assert_eq!(first.notes, "");

        let second = &records[1];
        assert_eq!(second.title, "Cancel Order");
        assert_eq!(second.preconditions, "");
        assert!(second.alternative_flows.is_empty());
        assert_eq!(second.notes, "Only before shipping");
    }

    #[test]
    fn test_markdown_and_aliases() {
        let response = "\
## Use Case 1: Reset Password
**Actors:** User; Email Service
**Pre-conditions:** User has an account
**Main Success Scenario:**
Step 1: User requests a reset
Step 2: System emails a link
**Alternate Flows**:
* Link expired
**Post-conditions**: Password changed
";
        let records = parse_llm_response(response);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.title, "Reset Password");
        assert_eq!(record.actors, vec!["User", "Email Service"]);
        assert_eq!(record.preconditions, "User has an account");
        assert_eq!(
            record.main_flow,
            vec!["User requests a reset", "System emails a link"]
        );
        assert_eq!(record.alternative_flows, vec!["Link expired"]);
        assert_eq!(record.postconditions, "Password changed");
    }

    #[test]
    fn test_case_insensitive_labels() {
        let response = "USE CASE TITLE: Export Report\nTRIGGER: month end\nmain flow: 1. Export";
        let records = parse_llm_response(response);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Export Report");
        assert_eq!(records[0].trigger, "month end");
        assert_eq!(records[0].main_flow, vec!["Export"]);
    }

    #[test]
    fn test_trailing_commentary_is_ignored() {
        let response = "\
- Use Case Title: Login
- Main Flow:
  1. Enter credentials

  2. Submit

I hope this helps! Let me know if you need anything else.
";
        let records = parse_llm_response(response);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].main_flow, vec!["Enter credentials", "Submit"]);
    }

    #[test]
    fn test_scalar_continuation_lines() {
        let response = "\
Use Case Title: Approve Invoice
Preconditions:
- Invoice is submitted
- Approver is assigned
Notes: Applies to amounts
over the threshold";
        let records = parse_llm_response(response);
        assert_eq!(
            records[0].preconditions,
            "Invoice is submitted\nApprover is assigned"
        );
        assert_eq!(records[0].notes, "Applies to amounts\nover the threshold");
    }

    #[test]
    fn test_actors_split_per_line_and_separator() {
        let response = "Use Case Title: Ship\nActor(s):\n- Clerk, Courier\n- Warehouse; Customer";
        let records = parse_llm_response(response);
        assert_eq!(
            records[0].actors,
            vec!["Clerk", "Courier", "Warehouse", "Customer"]
        );
    }

    #[test]
    fn test_code_fences_and_rules_are_ignored() {
        let response = "```\n- Use Case Title: Search\n---\n- Trigger: typing\n```";
        let records = parse_llm_response(response);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Search");
        assert_eq!(records[0].trigger, "typing");
    }

    #[test]
    fn test_block_without_title_is_dropped() {
        let response = "\
- Actor(s): Admin
- Trigger: nightly job

- Use Case Title:
- Actor(s): Someone

- Use Case Title: Real One";
        let records = parse_llm_response(response);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Real One");
        assert!(records[0].actors.is_empty());
    }

    #[test]
    fn test_title_on_next_line() {
        let response = "Use Case Title:\nArchive Documents\nTrigger: quarterly";
        let records = parse_llm_response(response);
        assert_eq!(records[0].title, "Archive Documents");

        let bold = parse_llm_response("Use Case Title:\n**Archive Documents**\nTrigger: quarterly");
        assert_eq!(bold[0].title, "Archive Documents");
        assert_eq!(bold[0].trigger, "quarterly");
    }

    #[test]
    fn test_unknown_label_closes_open_field() {
        let response = "- Use Case Title: Place Order\n- Description: Customer buys items\n- Actor(s): Customer";
        let records = parse_llm_response(response);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Place Order");
        assert_eq!(records[0].actors, vec!["Customer"]);

        let response = "\
Use Case Title: Refund
Notes: Manual approval
**Business Rules:** Limit is 500
Priority: High";
        let records = parse_llm_response(response);
        assert_eq!(records[0].notes, "Manual approval");
    }

    #[test]
    fn test_labelled_steps_stay_in_flows() {
        let response = "\
Use Case Title: Pay
Alternative Flows:
- Card declined: System shows an error
- Timeout: System retries once
Scope: Web shop only";
        let records = parse_llm_response(response);
        assert_eq!(
            records[0].alternative_flows,
            vec!["Card declined: System shows an error", "Timeout: System retries once"]
        );
    }

    #[test]
    fn test_heading_without_colon_closes_open_field() {
        let response = "Use Case Title: A\nNotes: keep short\n**Use Case 2**\nTitle: B\nTrigger: t";
        let records = parse_llm_response(response);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].notes, "keep short");
        assert_eq!(records[1].title, "B");
        assert_eq!(records[1].trigger, "t");

        let response = "Use Case Title: A\nTrigger: nightly\n### Use Case 2\nUse Case Title: B";
        let records = parse_llm_response(response);
        assert_eq!(records[0].trigger, "nightly");
        assert_eq!(records[1].title, "B");

        let response = "Use Case Title: A\nPostconditions: Saved\n## Summary\nAll done here";
        let records = parse_llm_response(response);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].postconditions, "Saved");
    }

    #[test]
    fn test_unstructured_response() {
        assert!(parse_llm_response("").is_empty());
        assert!(parse_llm_response("I could not find any use cases in this text.").is_empty());
    }

    proptest! {
        #[test]
        fn prop_parser_is_total(response in "(?s).{0,300}") {
            let records = parse_llm_response(&response);
            prop_assert!(records.iter().all(|r| r.is_valid()));
        }

        #[test]
        fn prop_labelled_blocks_keep_order(titles in prop::collection::vec("[A-Z][a-z]{2,10}", 1..6)) {
            let response: String = titles
                .iter()
                .map(|t| format!("- Use Case Title: Handle {}\n- Trigger: {} starts\n\n", t, t))
                .collect();
            let records = parse_llm_response(&response);
            let parsed: Vec<String> = records.into_iter().map(|r| r.title).collect();
            let expected: Vec<String> = titles.iter().map(|t| format!("Handle {}", t)).collect();
            prop_assert_eq!(parsed, expected);
        }
    }
}
