use rampart::config::lexer::tokenize;

fn texts(input: &str) -> Vec<String> {
    tokenize(input).into_iter().map(|t| t.text).collect()
}

#[test]
fn test_empty_input_yields_no_tokens() {
    assert!(tokenize("").is_empty());
}

#[test]
fn test_whitespace_only_yields_no_tokens() {
    assert!(tokenize(" \t\r\n\x0b\x0c  \n").is_empty());
}

#[test]
fn test_comments_only_yields_no_tokens() {
    let input = "# a hash comment\n// a slash comment\n   # another\n";
    assert!(tokenize(input).is_empty());
}

#[test]
fn test_words_split_on_whitespace() {
    assert_eq!(texts("server host 127.0.0.1"), vec!["server", "host", "127.0.0.1"]);
}

#[test]
fn test_punctuation_is_its_own_token() {
    assert_eq!(texts("root;"), vec!["root", ";"]);
    assert_eq!(texts("server{}"), vec!["server", "{", "}"]);
    assert_eq!(texts("a;b"), vec!["a", ";", "b"]);
}

#[test]
fn test_hash_comment_runs_to_end_of_line() {
    assert_eq!(texts("host 1.2.3.4; # trailing\nroot /www;"), vec![
        "host", "1.2.3.4", ";", "root", "/www", ";"
    ]);
}

#[test]
fn test_slash_comment_runs_to_end_of_line() {
    assert_eq!(texts("host a; // comment { } ;\nroot b;"), vec![
        "host", "a", ";", "root", "b", ";"
    ]);
}

#[test]
fn test_comment_glued_to_word_ends_it() {
    // '#' terminates a word without any separating whitespace
    assert_eq!(texts("root#comment\n;"), vec!["root", ";"]);
}

#[test]
fn test_paths_with_single_slashes_are_words() {
    assert_eq!(texts("location /a/b/c {"), vec!["location", "/a/b/c", "{"]);
}

#[test]
fn test_line_and_column_positions() {
    let toks = tokenize("server {\n  host h;\n}");
    assert_eq!(toks[0].text, "server");
    assert_eq!((toks[0].line, toks[0].col), (1, 1));
    assert_eq!(toks[1].text, "{");
    assert_eq!((toks[1].line, toks[1].col), (1, 8));
    assert_eq!(toks[2].text, "host");
    assert_eq!((toks[2].line, toks[2].col), (2, 3));
    let close = toks.last().unwrap();
    assert_eq!(close.text, "}");
    assert_eq!(close.line, 3);
}

#[test]
fn test_tokenize_is_total_on_arbitrary_bytes() {
    // No input makes the lexer fail, it only ever produces tokens
    let weird = "{;}#\n//\n}}}}{{{{;;;; w\u{e9}ird";
    let toks = tokenize(weird);
    assert!(!toks.is_empty());
}
