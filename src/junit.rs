//! JUnit XML parser (§3 `TestFailure`, §4.5 step 5.e).
//!
//! External collaborator named but not specified in detail by the pipeline
//! contract: the ingestor treats this as a narrow function from bytes to a
//! list of [`TestFailure`]s. Built on `quick-xml`, the crate the pack's
//! closest sibling examples reach for when a spec needs structured XML
//! parsing rather than hand-rolled string scanning.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{DestillError, Result};

/// One failing or erroring `<testcase>` extracted from a JUnit XML report.
#[derive(Debug, Clone, PartialEq)]
pub struct TestFailure {
    pub suite: String,
    pub case: String,
    pub message: String,
    pub stack_trace: Option<String>,
    pub time_seconds: Option<f64>,
}

/// Parse a JUnit XML document into its failing/erroring test cases.
/// Passing cases (no `<failure>`/`<error>` child) are not represented.
pub fn parse_junit_report(xml: &str) -> Result<Vec<TestFailure>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut failures = Vec::new();
    let mut current_suite = String::new();
    let mut current_case = String::new();
    let mut current_time: Option<f64> = None;
    let mut pending_message: Option<String> = None;
    let mut in_failure_body = false;
    let mut stack_trace = String::new();

    let mut buf = Vec::new();
    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| DestillError::JunitParse(e.to_string()))?
        {
            Event::Start(tag) => {
                let local = tag.name();
                let attrs = attr_map(&tag);

                if local.as_ref() == b"testsuite" {
                    current_suite = attrs.get("name").cloned().unwrap_or_default();
                } else if local.as_ref() == b"testcase" {
                    current_case = attrs.get("name").cloned().unwrap_or_default();
                    current_time = attrs.get("time").and_then(|t| t.parse().ok());
                } else if local.as_ref() == b"failure" || local.as_ref() == b"error" {
                    pending_message = attrs
                        .get("message")
                        .cloned()
                        .or_else(|| attrs.get("type").cloned());
                    in_failure_body = true;
                    stack_trace.clear();
                }
            }
            // A self-closing `<failure/>` has no text body and no matching
            // `Event::End`, so it is recorded immediately here.
            Event::Empty(tag) => {
                let local = tag.name();
                if local.as_ref() == b"failure" || local.as_ref() == b"error" {
                    let attrs = attr_map(&tag);
                    let message = attrs
                        .get("message")
                        .cloned()
                        .or_else(|| attrs.get("type").cloned())
                        .unwrap_or_else(|| "test failed".to_string());
                    failures.push(TestFailure {
                        suite: current_suite.clone(),
                        case: current_case.clone(),
                        message,
                        stack_trace: None,
                        time_seconds: current_time,
                    });
                } else if local.as_ref() == b"testcase" {
                    let attrs = attr_map(&tag);
                    current_case = attrs.get("name").cloned().unwrap_or_default();
                    current_time = attrs.get("time").and_then(|t| t.parse().ok());
                }
            }
            Event::Text(text) if in_failure_body => {
                stack_trace.push_str(&text.unescape().unwrap_or_default());
            }
            Event::End(tag) => {
                let local = tag.name();
                if local.as_ref() == b"failure" || local.as_ref() == b"error" {
                    let message = pending_message
                        .take()
                        .unwrap_or_else(|| "test failed".to_string());
                    let trace = if stack_trace.trim().is_empty() {
                        None
                    } else {
                        Some(stack_trace.trim().to_string())
                    };
                    failures.push(TestFailure {
                        suite: current_suite.clone(),
                        case: current_case.clone(),
                        message,
                        stack_trace: trace,
                        time_seconds: current_time,
                    });
                    in_failure_body = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(failures)
}

/// First `limit` non-empty lines of a stack trace, used to build the
/// `post_context` of the `TriageCard` a `TestFailure` becomes (§4.5 step 5.e).
pub fn stack_trace_lines(trace: &str, limit: usize) -> Vec<String> {
    trace
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(limit)
        .map(str::to_string)
        .collect()
}

fn attr_map(tag: &quick_xml::events::BytesStart<'_>) -> std::collections::HashMap<String, String> {
    tag.attributes()
        .filter_map(|a| a.ok())
        .map(|a| {
            let key = String::from_utf8_lossy(a.key.as_ref()).to_string();
            let value = a.unescape_value().unwrap_or_default().to_string();
            (key, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
<testsuites>
  <testsuite name="com.acme.WidgetTest">
    <testcase name="testAdd" time="0.012"/>
    <testcase name="testSubtract" time="0.003">
      <failure message="expected 2 but was 3">
        at com.acme.WidgetTest.testSubtract(WidgetTest.java:42)
        at java.base/java.lang.Thread.run(Thread.java:834)
      </failure>
    </testcase>
  </testsuite>
</testsuites>
"#;

    #[test]
    fn parses_only_failing_cases() {
        let failures = parse_junit_report(SAMPLE).unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].case, "testSubtract");
        assert_eq!(failures[0].suite, "com.acme.WidgetTest");
        assert_eq!(failures[0].message, "expected 2 but was 3");
    }

    #[test]
    fn captures_stack_trace_text() {
        let failures = parse_junit_report(SAMPLE).unwrap();
        let trace = failures[0].stack_trace.as_ref().unwrap();
        assert!(trace.contains("WidgetTest.java:42"));
    }

    #[test]
    fn passing_suite_yields_no_failures() {
        let xml = r#"<testsuites><testsuite name="s"><testcase name="t" time="0.1"/></testsuite></testsuites>"#;
        assert!(parse_junit_report(xml).unwrap().is_empty());
    }

    #[test]
    fn stack_trace_lines_skips_blank_lines_and_respects_limit() {
        let trace = "line one\n\nline two\nline three";
        let lines = stack_trace_lines(trace, 2);
        assert_eq!(lines, vec!["line one".to_string(), "line two".to_string()]);
    }

    #[test]
    fn malformed_xml_is_a_junit_parse_error() {
        assert!(parse_junit_report("<testsuites><oops").is_err());
    }
}
