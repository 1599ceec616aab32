use oio_http::http::headers::{HeaderTable, HeaderValue};

#[test]
fn test_lookup_is_case_insensitive() {
    let mut headers = HeaderTable::new();
    headers.insert("Content-Length", "10");

    assert_eq!(headers.get("CONTENT-LENGTH"), headers.get("Content-Length"));
    assert_eq!(headers.get("content-length").map(HeaderValue::as_str), Some("10"));
    assert_eq!(headers.get_or("x-missing", "dflt"), "dflt");
}

#[test]
fn test_set_none_removes_key() {
    let mut headers = HeaderTable::new();
    headers.set("Content-Length", Some("10"));
    headers.set::<&str>("content-length", None);

    assert!(!headers.contains("Content-Length"));
    assert!(headers.is_empty());
}

#[test]
fn test_remove_absent_is_fine() {
    let mut headers = HeaderTable::new();
    assert!(headers.remove("x-nothing").is_none());
    headers.insert("x-something", 1u32);
    assert_eq!(headers.remove("X-SOMETHING"), Some(HeaderValue::One("1".into())));
}

#[test]
fn test_names_are_title_cased() {
    let mut headers = HeaderTable::new();
    headers.insert("x-oio-chunk-meta-container-id", "AB");
    let names: Vec<_> = headers.iter().map(|(k, _)| k).collect();
    assert_eq!(names, vec!["X-Oio-Chunk-Meta-Container-Id"]);
}

#[test]
fn test_overrides_win_over_initial() {
    let headers = HeaderTable::from_parts(
        vec![("content-type", Some("text/plain")), ("x-a", Some("1"))],
        vec![("Content-Type", Some("application/json")), ("X-A", None)],
    );

    assert_eq!(headers.get_or("content-type", ""), "application/json");
    assert!(!headers.contains("x-a"));
    assert_eq!(headers.len(), 1);
}

#[test]
fn test_list_values_render_as_repeated_lines() {
    let mut headers = HeaderTable::new();
    headers.insert("x-oio-req-id", vec![1, 2, 3]);

    let lines: Vec<_> = headers.lines().collect();
    assert_eq!(
        lines,
        vec![("X-Oio-Req-Id", "1"), ("X-Oio-Req-Id", "2"), ("X-Oio-Req-Id", "3")]
    );
    assert_eq!(headers.get("x-oio-req-id").unwrap().to_string(), "1, 2, 3");
}

#[test]
fn test_collect_from_pairs() {
    let headers: HeaderTable = [("host", "meta0"), ("HOST", "meta1")].into_iter().collect();
    assert_eq!(headers.len(), 1);
    assert_eq!(headers.get_or("Host", ""), "meta1");
}
