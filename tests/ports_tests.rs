use proxy_scan_rs::ports::parse_port_specs;

#[test]
fn range_expands_inclusively() {
    assert_eq!(
        parse_port_specs("1080-1085"),
        vec![1080, 1081, 1082, 1083, 1084, 1085]
    );
}

#[test]
fn single_port() {
    assert_eq!(parse_port_specs("80"), vec![80]);
}

#[test]
fn garbage_is_skipped() {
    assert!(parse_port_specs("abc").is_empty());
}

#[test]
fn mixed_lines_with_comments_and_dedup() {
    let input = r#"
        # proxy ports
        1080-1082
        1081   # duplicate
        3128
        oops
    "#;
    assert_eq!(parse_port_specs(input), vec![1080, 1081, 1082, 3128]);
}
