use rampart::http::parser::{ParseError, Progress, RequestParser};
use rampart::http::request::Method;

fn parse_all(input: &[u8]) -> RequestParser {
    let mut parser = RequestParser::new();
    assert_eq!(parser.feed(input).unwrap(), Progress::Complete);
    parser
}

#[test]
fn test_parse_simple_get_request() {
    let mut parser = parse_all(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n");
    let req = parser.take_request().unwrap();

    assert_eq!(req.method, Method::GET);
    assert_eq!(req.path, "/");
    assert_eq!(req.query_string, "");
    assert_eq!(req.protocol_version, 11);
    assert_eq!(req.header("host"), Some("example.com"));
    assert!(req.body.is_empty());
}

#[test]
fn test_parse_post_request_with_body() {
    let mut parser =
        parse_all(b"POST /api HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello");
    let req = parser.take_request().unwrap();

    assert_eq!(req.method, Method::POST);
    assert_eq!(req.path, "/api");
    assert_eq!(req.body, b"hello".to_vec());
}

#[test]
fn test_path_splits_at_first_question_mark() {
    let mut parser = parse_all(b"GET /search?q=rust&x=1?y HTTP/1.1\r\nHost: h\r\n\r\n");
    let req = parser.take_request().unwrap();

    assert_eq!(req.path, "/search");
    assert_eq!(req.query_string, "q=rust&x=1?y");
}

#[test]
fn test_header_names_are_lowercased() {
    let mut parser = parse_all(b"GET / HTTP/1.1\r\nHoSt: h\r\nContent-Type: text/plain\r\n\r\n");
    let req = parser.take_request().unwrap();

    assert_eq!(req.header("host"), Some("h"));
    assert_eq!(req.header("Content-Type"), Some("text/plain"));
}

#[test]
fn test_duplicate_headers_are_appended_in_order() {
    let mut parser = parse_all(
        b"GET / HTTP/1.1\r\nHost: h\r\nSet-Thing: first\r\nSet-Thing: second\r\n\r\n",
    );
    let req = parser.take_request().unwrap();

    assert_eq!(req.header_values("set-thing"), vec!["first", "second"]);
    // first value wins for single lookup
    assert_eq!(req.header("set-thing"), Some("first"));
}

#[test]
fn test_unknown_method_is_recorded_not_fatal() {
    let mut parser = parse_all(b"BREW /pot HTTP/1.1\r\nHost: h\r\n\r\n");
    let req = parser.take_request().unwrap();
    assert_eq!(req.method, Method::UNKNOWN);
}

#[test]
fn test_http10_version() {
    let mut parser = parse_all(b"GET / HTTP/1.0\r\n\r\n");
    let req = parser.take_request().unwrap();
    assert_eq!(req.protocol_version, 10);
}

#[test]
fn test_unrecognized_protocol_is_rejected() {
    let mut parser = RequestParser::new();
    let err = parser.feed(b"GET / HTTP/2\r\n\r\n").unwrap_err();
    assert_eq!(err, ParseError::InvalidVersion);

    let mut parser = RequestParser::new();
    assert!(parser.feed(b"GET / FTP/1.1\r\n\r\n").is_err());
}

#[test]
fn test_malformed_request_line_is_rejected() {
    let mut parser = RequestParser::new();
    let err = parser.feed(b"GET /\r\n\r\n").unwrap_err();
    assert_eq!(err, ParseError::InvalidRequestLine);
}

#[test]
fn test_header_without_colon_is_rejected() {
    let mut parser = RequestParser::new();
    let err = parser
        .feed(b"GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n")
        .unwrap_err();
    assert_eq!(err, ParseError::InvalidHeader);
}

#[test]
fn test_failed_parser_stays_failed() {
    let mut parser = RequestParser::new();
    assert!(parser.feed(b"GET /\r\n").is_err());
    assert!(parser.feed(b"GET / HTTP/1.1\r\n\r\n").is_err());
}

#[test]
fn test_request_split_across_many_deliveries() {
    let mut parser = RequestParser::new();
    let input = b"GET /a/b?q=1 HTTP/1.1\r\nHost: example.com\r\n\r\n";

    // byte-at-a-time delivery must behave identically to one delivery
    let mut complete = false;
    for byte in input.iter() {
        match parser.feed(std::slice::from_ref(byte)).unwrap() {
            Progress::Complete => complete = true,
            Progress::Incomplete => assert!(!complete),
        }
    }
    assert!(complete);

    let req = parser.take_request().unwrap();
    assert_eq!(req.path, "/a/b");
    assert_eq!(req.query_string, "q=1");
    assert_eq!(req.header("host"), Some("example.com"));
}

#[test]
fn test_fixed_length_under_delivery_stays_incomplete() {
    let mut parser = RequestParser::new();
    let progress = parser
        .feed(b"POST /api HTTP/1.1\r\nHost: h\r\nContent-Length: 10\r\n\r\nfour")
        .unwrap();

    // 4 of 10 body bytes: not complete, not an error
    assert_eq!(progress, Progress::Incomplete);
    assert!(!parser.is_complete());

    let progress = parser.feed(b"morebye").unwrap();
    assert_eq!(progress, Progress::Complete);
    assert_eq!(parser.take_request().unwrap().body, b"fourmorebye"[..10].to_vec());
}

#[test]
fn test_content_length_zero_completes_without_body() {
    let mut parser = parse_all(b"POST /api HTTP/1.1\r\nHost: h\r\nContent-Length: 0\r\n\r\n");
    assert!(parser.take_request().unwrap().body.is_empty());
}

#[test]
fn test_invalid_content_length_is_rejected() {
    let mut parser = RequestParser::new();
    let err = parser
        .feed(b"POST / HTTP/1.1\r\nContent-Length: nope\r\n\r\n")
        .unwrap_err();
    assert_eq!(err, ParseError::InvalidContentLength);
}

#[test]
fn test_chunked_body_reassembled_across_three_deliveries() {
    let mut parser = RequestParser::new();

    let p1 = parser
        .feed(b"GET / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n")
        .unwrap();
    assert_eq!(p1, Progress::Incomplete);

    let p2 = parser.feed(b"4\r\nWiki\r\n").unwrap();
    assert_eq!(p2, Progress::Incomplete);

    let p3 = parser.feed(b"0\r\n\r\n").unwrap();
    assert_eq!(p3, Progress::Complete);

    let req = parser.take_request().unwrap();
    assert_eq!(req.body, b"Wiki".to_vec());
}

#[test]
fn test_chunked_body_multiple_chunks() {
    let mut parser = parse_all(
        b"POST /up HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n",
    );
    let req = parser.take_request().unwrap();
    assert_eq!(req.body, b"Wikipedia".to_vec());
}

#[test]
fn test_chunked_takes_precedence_over_content_length() {
    let mut parser = parse_all(
        b"POST / HTTP/1.1\r\nHost: h\r\nContent-Length: 9999\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nok\r\n0\r\n\r\n",
    );
    assert_eq!(parser.take_request().unwrap().body, b"ok".to_vec());
}

#[test]
fn test_malformed_chunk_size_is_rejected() {
    let mut parser = RequestParser::new();
    let err = parser
        .feed(b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\n")
        .unwrap_err();
    assert_eq!(err, ParseError::InvalidChunk);
}

#[test]
fn test_chunk_data_overrunning_declared_size_is_rejected() {
    let mut parser = RequestParser::new();
    // chunk claims 2 bytes but 4 arrive before the terminator
    let err = parser
        .feed(b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nokno\r\n0\r\n\r\n")
        .unwrap_err();
    assert_eq!(err, ParseError::InvalidChunk);
}

#[test]
fn test_binary_body_preserved() {
    let mut parser = parse_all(b"POST /u HTTP/1.1\r\nHost: h\r\nContent-Length: 4\r\n\r\n\x00\x01\x02\x03");
    assert_eq!(parser.take_request().unwrap().body, vec![0, 1, 2, 3]);
}

#[test]
fn test_parser_resets_for_next_request_after_take() {
    let mut parser = parse_all(b"GET /one HTTP/1.1\r\nHost: h\r\n\r\n");
    let first = parser.take_request().unwrap();
    assert_eq!(first.path, "/one");

    assert_eq!(
        parser.feed(b"GET /two HTTP/1.1\r\nHost: h\r\n\r\n").unwrap(),
        Progress::Complete
    );
    let second = parser.take_request().unwrap();
    assert_eq!(second.path, "/two");
    assert!(second.headers.iter().any(|(k, _)| k == "host"));
}
