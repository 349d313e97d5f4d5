use bb_parser::{BBTag, ParseTree, Parser, StructureError, Token, Vocabulary};

fn parser(tags: Vec<BBTag>) -> Parser {
    Parser::new(tags.into_iter().collect::<Vocabulary>())
}

fn literal(tokens: &[Token]) -> String {
    tokens.iter().map(|x| x.to_literal().into_owned()).collect()
}

#[test]
fn bold() {
    let parser = parser(vec![BBTag::new("b")]);
    let tree = parser.parse("[b]bold[/b]").unwrap();

    assert_eq!(tree.to_string(), "Root - [b]bold[/b]");
    assert_eq!(tree.children().len(), 1);
    let b = &tree.children()[0];
    assert_eq!(b.name(), Some("b"));
    assert_eq!(b.children(), &[ParseTree::Text("bold".into())]);
    assert!(tree.is_valid());
}

#[test]
fn mismatched_tail() {
    let parser = parser(vec![BBTag::new("b"), BBTag::new("i")]);
    assert_eq!(
        parser.parse("[b]bold[/i]"),
        Err(StructureError::MismatchedEndTag {
            expected: "b".into(),
            found: "i".into()
        })
    );
    assert!(!parser.is_valid("[b]bold[/i]"));
}

#[test]
fn no_nesting_body() {
    let parser = parser(vec![BBTag::new("code").no_nesting(), BBTag::new("b")]);
    let source = "[code]a[b]b[/b]c[/code]";

    let tokens = parser.tokenize(source);
    assert_eq!(tokens.len(), 3);
    assert!(matches!(&tokens[0], Token::StartTag(head) if head.name == "code"));
    assert_eq!(tokens[1], Token::Text("a[b]b[/b]c".into()));
    assert!(matches!(&tokens[2], Token::EndTag(tail) if tail.name == "code"));

    let tree = parser.parse(source).unwrap();
    let code = &tree.children()[0];
    assert_eq!(code.name(), Some("code"));
    assert_eq!(code.children(), &[ParseTree::Text("a[b]b[/b]c".into())]);
    assert!(tree.find_tags("b").is_empty());
}

#[test]
fn empty_no_nesting_body() {
    let parser = parser(vec![BBTag::new("code").no_nesting()]);
    let tree = parser.parse("[code][/code]").unwrap();

    let code = &tree.children()[0];
    assert_eq!(code.name(), Some("code"));
    assert_eq!(code.children(), &[ParseTree::Text(String::new())]);
    assert!(tree.is_valid());
}

#[test]
fn unrecognized_tag() {
    let parser = parser(vec![BBTag::new("b")]);
    let tree = parser.parse("[foo]x[/foo]").unwrap();

    assert_eq!(tree.text_content(), "[foo]x[/foo]");
    assert!(tree.find_tags("foo").is_empty());
    assert!(tree.is_valid());
}

#[test]
fn unclosed_no_nesting() {
    let parser = parser(vec![BBTag::new("code").no_nesting()]);

    let tokens = parser.tokenize("[code]abc[/b][code]");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1], Token::Text("abc[/b][code]".into()));

    assert_eq!(
        parser.parse("[code]abc"),
        Err(StructureError::UnclosedTag {
            name: "code".into()
        })
    );
}

#[test]
fn literal_text_is_preserved() {
    let parser = Parser::default();
    let sources = [
        "",
        "plain text",
        "[b]x[/b]",
        "[foo]x[/foo] [b]y[/i]",
        "[[b]]][/[/b]",
        "[code][b]x[/b]",
        "[url=http://a.b/c?d=e]x[/url] [img width=\"1\" height=\"2\"]p[/img]",
        "[quote=\"name\"][noparse][quote][/noparse][/quote]",
        "多字节[b]文本[/b]",
    ];
    for source in sources {
        assert_eq!(literal(&parser.tokenize(source)), source, "source: {source}");
    }
}

#[test]
fn balanced_input_is_valid() {
    let parser = parser(vec![BBTag::new("b"), BBTag::new("i"), BBTag::new("u")]);
    let sources = [
        "[b][/b]",
        "a[b]b[i]c[/i]d[/b]e",
        "[u][b][i]x[/i][/b][/u][i]y[/i]",
        "[b][b][b]deep[/b][/b][/b]",
    ];
    for source in sources {
        let tree = parser.parse(source).unwrap();
        assert!(tree.is_valid(), "source: {source}");
    }
}

#[test]
fn nested_attributes() {
    let parser = Parser::default();
    let tree = parser
        .parse("[quote=alice][size=\"2\"]hi[/size][/quote]")
        .unwrap();

    let quote = &tree.children()[0];
    assert_eq!(quote.attributes().and_then(|x| x.get("quote")), Some("alice"));
    let size = &quote.children()[0];
    assert_eq!(size.attributes().and_then(|x| x.get("size")), Some("2"));
    assert_eq!(tree.depth(), 2);
}

#[test]
fn concurrent_parses_share_vocabulary() {
    let parser = Parser::default();
    let handles = (0..4)
        .map(|i| {
            let parser = parser.clone();
            std::thread::spawn(move || parser.parse(&format!("[b]{i}[/b]")))
        })
        .collect::<Vec<_>>();

    for (i, handle) in handles.into_iter().enumerate() {
        let tree = handle.join().unwrap().unwrap();
        assert_eq!(tree.text_content(), i.to_string());
    }
}
