use bounce_mime::codec::{MAX_QP_LINE_LENGTH, decode_quoted_printable_str};
use bounce_mime::qprint::repair_line;
use bounce_mime::{HeaderMap, PatternRegistry, Repairer, repair};
use std::borrow::Cow;

fn report_headers() -> HeaderMap {
    [("Content-Type", r#"multipart/report; boundary="XXX""#)]
        .into_iter()
        .collect()
}

const REPORT_BODY: &str = "This is a MIME-encapsulated message.\n\
--XXX\n\
Content-Type: text/plain; charset=utf-8\n\
Content-Transfer-Encoding: quoted-printable\n\
\n\
Delivery to the following recipient failed: caf=C3=A9\n\
--XXX\n\
Content-Type: message/delivery-status\n\
\n\
Status: 5.1.1\n\
--XXX--\n";

// --- Whole-body decoding ---

#[test]
fn test_repair_without_headers() {
    assert_eq!(
        repair(Some("Hello=20World"), &HeaderMap::new()).as_deref(),
        Some("Hello World")
    );
}

#[test]
fn test_repair_absent_body() {
    assert!(repair(None, &report_headers()).is_none());
}

#[test]
fn test_repair_empty_content_type() {
    let headers: HeaderMap = [("content-type", "")].into_iter().collect();
    assert_eq!(repair(Some("a=3Db"), &headers).as_deref(), Some("a=b"));
}

#[test]
fn test_repair_without_boundary() {
    let headers: HeaderMap = [("content-type", "text/plain; charset=utf-8")]
        .into_iter()
        .collect();
    assert_eq!(repair(Some("caf=C3=A9"), &headers).as_deref(), Some("café"));
}

#[test]
fn test_repair_without_quoted_printable_part() {
    let body = "--XXX\nContent-Type: text/plain\n\nA=3DB\n--XXX--\n";
    assert_eq!(
        repair(Some(body), &report_headers()).as_deref(),
        Some("--XXX\nContent-Type: text/plain\n\nA=B\n--XXX--\n")
    );
}

// --- Part-aware decoding ---

#[test]
fn test_repair_decodes_quoted_printable_part() {
    let expected = REPORT_BODY.replace("caf=C3=A9", "café");
    assert_eq!(repair(Some(REPORT_BODY), &report_headers()), Some(expected));
}

#[test]
fn test_repairer_with_explicit_registry() {
    let repairer = Repairer::new(PatternRegistry::global());
    assert_eq!(
        repairer.repair(Some(REPORT_BODY), &report_headers()),
        repair(Some(REPORT_BODY), &report_headers())
    );
}

#[test]
fn test_repair_transfer_encoding_before_charset() {
    let body = "--XXX\n\
Content-Transfer-Encoding: quoted-printable\n\
Content-Type: text/plain; charset=utf-8\n\
\n\
caf=C3=A9\n\
--XXX\n";
    let repaired = repair(Some(body), &report_headers()).unwrap();
    assert!(repaired.contains("\ncafé\n--XXX\n"));
}

#[test]
fn test_repair_part_closed_by_final_boundary() {
    let body = "--XXX\n\
Content-Type: text/plain; charset=utf-8\n\
Content-Transfer-Encoding: quoted-printable\n\
\n\
caf=C3=A9\n\
--XXX--\n";
    let repaired = repair(Some(body), &report_headers()).unwrap();
    assert!(repaired.contains("\ncafé\n"));
    assert!(repaired.ends_with("--XXX--\n"));
}

#[test]
fn test_repair_switches_boundary_and_transcodes() {
    let body = "--outer\n\
Content-Type: multipart/alternative; boundary=\"inner\"\n\
\n\
--inner\n\
Content-Type: text/plain;\n\
\tcharset=\"iso-8859-1\"\n\
Content-Transfer-Encoding: quoted-printable\n\
\n\
Caf=E9\n\
--inner\n\
Content-Type: text/html\n\
\n\
<p>x</p>\n\
--inner--\n\
--outer--\n";
    let headers: HeaderMap = [("content-type", "multipart/mixed; boundary=outer")]
        .into_iter()
        .collect();

    let repaired = repair(Some(body), &headers).unwrap();
    assert!(repaired.contains("\nCafé\n--inner\n"));
    assert!(repaired.contains("<p>x</p>\n--inner--\n--outer--\n"));
}

#[test]
fn test_repair_resets_charset_between_parts() {
    let body = "--XXX\n\
Content-Type: text/plain; charset=utf-8\n\
Content-Transfer-Encoding: quoted-printable\n\
\n\
caf=C3=A9\n\
--XXX\n\
Content-Transfer-Encoding: quoted-printable\n\
\n\
A=3DB\n\
--XXX--\n";
    let repaired = repair(Some(body), &report_headers()).unwrap();
    assert!(repaired.contains("\ncafé\n"));
    assert!(repaired.contains("\nA=3DB\n"));
}

#[test]
fn test_repair_keeps_unescaped_base64_line() {
    let diagnostics = "1;SLXP216MB0381;27:IdH7U/WHGgJu6J8lFrE7KvVxhnAwyKrNbSXMFYs3/Gzz6ZdXYYjzHj55K2O+\
cndpeVwkvBJqmo6y0IF4AhLfHtFzznw/BzhERU6wi/TCWRpyjYuW8v0/aTcflH3oAdgZ4Pwrp7PxLiiA8rYgU/E7SQ==";
    let body = format!(
        "--XXX\n\
Content-Type: text/plain; charset=us-ascii\n\
Content-Transfer-Encoding: quoted-printable\n\
X-Microsoft-Exchange-Diagnostics:\n\
{diagnostics}\n\
--XXX--\n"
    );

    let repaired = repair(Some(&body), &report_headers()).unwrap();
    assert!(repaired.contains(&format!("{diagnostics}\n")));
}

const LONG_LINE_HEADER: &str = "--XXX\n\
Content-Type: text/plain; charset=utf-8\n\
Content-Transfer-Encoding: quoted-printable\n\
\n";

#[test]
fn test_repair_long_line_decoded_at_boundary() {
    let long = "A".repeat(100);
    let body = format!("{LONG_LINE_HEADER}{long}\n--XXX--\n");

    let repaired = repair(Some(&body), &report_headers()).unwrap();
    assert!(repaired.contains(&format!("\n{long}\n--XXX--\n")));
}

#[test]
fn test_repair_unterminated_part_keeps_repaired_lines() {
    let long = "A".repeat(100);
    let body = format!("{LONG_LINE_HEADER}caf=C3=A9\n{long}\n");

    let repaired = repair(Some(&body), &report_headers()).unwrap();
    let remainder = repaired.strip_prefix(LONG_LINE_HEADER).unwrap();

    assert!(remainder.starts_with("caf=C3=A9\n"));
    assert!(remainder.lines().all(|l| l.len() <= MAX_QP_LINE_LENGTH));
    assert_eq!(
        decode_quoted_printable_str(remainder),
        format!("caf\u{e9}\n{long}\n")
    );
}

#[test]
fn test_repair_unterminated_short_part_unchanged() {
    let body = "--XXX\n\
Content-Type: text/plain; charset=utf-8\n\
Content-Transfer-Encoding: quoted-printable\n\
\n\
caf=C3=A9\n\
and then the message stops\n";
    assert_eq!(repair(Some(body), &report_headers()).as_deref(), Some(body));
}

#[test]
fn test_repair_crlf_body() {
    let body = REPORT_BODY.replace('\n', "\r\n");
    let repaired = repair(Some(&body), &report_headers()).unwrap();
    assert!(repaired.contains("failed: café\n--XXX\r\n"));
    assert!(repaired.starts_with("This is a MIME-encapsulated message.\r\n"));
}

// --- Line repair heuristic ---

#[test]
fn test_repair_line_reencodes_long_line() {
    let line = "A".repeat(100);
    let repaired = repair_line(&line);

    assert!(matches!(repaired, Cow::Owned(_)));
    assert!(repaired.lines().all(|l| l.len() <= MAX_QP_LINE_LENGTH));
    assert_eq!(decode_quoted_printable_str(&repaired), line);
}

#[test]
fn test_repair_line_keeps_acceptable_lines() {
    for line in [
        "soft break with trailing space ",
        "caf=C3=A9",
        "wrapped line=",
        "caf\u{e9} in latin",
        "QUJDREVGR0hJSktMTU5PUFFSU1RVVldYWVo0123456789==",
    ] {
        assert!(matches!(repair_line(line), Cow::Borrowed(_)), "{line}");
    }
}

#[test]
fn test_repair_line_reencodes_plain_lines() {
    let repaired = repair_line("x=3Dy");
    assert!(matches!(repaired, Cow::Owned(_)));
    assert_eq!(decode_quoted_printable_str(&repaired), "x=3Dy");

    let repaired = repair_line("Hello World");
    assert!(matches!(repaired, Cow::Owned(_)));
    assert_eq!(decode_quoted_printable_str(&repaired), "Hello World");
}

#[test]
fn test_repair_line_mixed_escapes() {
    assert!(matches!(repair_line("a=3Db=C3"), Cow::Borrowed(_)));

    let repaired = repair_line("a=3Db");
    assert!(matches!(repaired, Cow::Owned(_)));
    assert_eq!(decode_quoted_printable_str(&repaired), "a=3Db");
}
