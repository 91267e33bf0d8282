use ripple::core::word_at_column;

#[test]
fn selects_the_identifier_under_the_cursor() {
    let line = "const total = computeTotal(items);";
    assert_eq!(word_at_column(line, 0).as_deref(), Some("const"));
    assert_eq!(word_at_column(line, 14).as_deref(), Some("computeTotal"));
    assert_eq!(word_at_column(line, 20).as_deref(), Some("computeTotal"));
    // just past the end of a word
    assert_eq!(word_at_column(line, 26).as_deref(), Some("computeTotal"));
    assert_eq!(word_at_column(line, 27).as_deref(), Some("items"));
}

#[test]
fn dollar_and_underscore_are_identifier_characters() {
    assert_eq!(word_at_column("let $el = _private;", 5).as_deref(), Some("$el"));
    assert_eq!(word_at_column("let $el = _private;", 12).as_deref(), Some("_private"));
}

#[test]
fn whitespace_numbers_and_out_of_range_yield_none() {
    assert_eq!(word_at_column("a  b", 2), None);
    assert_eq!(word_at_column("x = 42;", 5), None);
    assert_eq!(word_at_column("short", 40), None);
    assert_eq!(word_at_column("", 0), None);
    assert_eq!(word_at_column("v2 = 1", 1).as_deref(), Some("v2"));
}

#[test]
fn columns_count_characters_not_bytes() {
    let line = "é = naïve(ü);";
    assert_eq!(word_at_column(line, 5).as_deref(), Some("naïve"));
    assert_eq!(word_at_column(line, 10).as_deref(), Some("ü"));
}
