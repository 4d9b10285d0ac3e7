//! Parse/serialize round trips over realistic documents.

use hyperjson::{parse, serialize, AttrValue, Element, Error, Node, ParseOptions};

const PRESERVE: ParseOptions = ParseOptions {
    preserve_whitespace: true,
};

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Inbox</title>
    <link rel="stylesheet" href="/app.css">
  </head>
  <body class="theme-dark" data-user='42'>
    <!-- navigation -->
    <nav id="nav"><a href="/">Home</a> | <a href="/inbox" aria-current>Inbox</a></nav>
    <ul id="messages">
      <li data-id="m1">Hello<br>world</li>
      <li data-id="m2"><input type="checkbox" checked> Lunch?</li>
    </ul>
    <img src="logo.png" alt="Logo">
  </body>
</html>"#;

fn element<'a>(node: &'a Node) -> &'a Element {
    node.as_element().expect("element")
}

/// Asserts that serializing and re-parsing yields the same tree.
fn assert_stable(input: &str, options: ParseOptions) {
    let first = parse(input, options).unwrap();
    let printed = serialize(&first);
    let second = parse(&printed, options).unwrap();
    assert_eq!(first, second, "round trip changed the tree:\n{}", printed);
}

#[test]
fn test_page_round_trip() {
    assert_stable(PAGE, PRESERVE);
    assert_stable(PAGE, ParseOptions::default());
}

#[test]
fn test_page_structure() {
    let document = parse(PAGE, ParseOptions::default()).unwrap();
    let top: Vec<&str> = document
        .children()
        .iter()
        .filter_map(Node::as_element)
        .map(Element::tag)
        .collect();
    assert_eq!(top, ["!DOCTYPE", "html"]);

    let html = element(&document.children()[1]);
    let head = element(&html.children()[0]);
    let tags: Vec<&str> = head
        .children()
        .iter()
        .filter_map(Node::as_element)
        .map(Element::tag)
        .collect();
    assert_eq!(tags, ["meta", "title", "link"]);
    assert!(element(&head.children()[0]).children().is_empty());

    let body = element(&html.children()[1]);
    assert_eq!(body.attribute("data-user"), Some(&AttrValue::from("42")));
    assert!(element(&body.children()[0]).is_comment());

    let messages = element(&body.children()[2]);
    let first = element(&messages.children()[0]);
    assert_eq!(first.children().len(), 3);
    assert_eq!(first.children()[2], Node::text("world"));

    let second = element(&messages.children()[1]);
    let checkbox = element(&second.children()[0]);
    assert_eq!(checkbox.attribute("checked"), Some(&AttrValue::Valueless));
    assert_eq!(second.children()[1], Node::text(" Lunch?"));
}

#[test]
fn test_exact_output_for_normalized_input() {
    let inputs = [
        r#"<p class="a b">x<b>y</b>z</p>"#,
        r#"<x data-text="a \"b\" c" />"#,
        r#"<input disabled value="1" /><br />"#,
        r#"<!-- note --><div id="a"><span /></div>"#,
        r#"<!DOCTYPE html><html><body>hi</body></html>"#,
    ];
    for input in inputs {
        let tree = parse(input, PRESERVE).unwrap();
        assert_eq!(serialize(&tree), input);
    }
}

#[test]
fn test_void_tags_never_nest() {
    let tree = parse(r#"<img src="a.jpg"><div>x</div>"#, PRESERVE).unwrap();
    assert_eq!(tree.children().len(), 2);
    assert!(element(&tree.children()[0]).children().is_empty());
    assert_eq!(element(&tree.children()[1]).tag(), "div");
    assert_eq!(serialize(&tree), r#"<img src="a.jpg" /><div>x</div>"#);
}

#[test]
fn test_whitespace_modes() {
    let input = "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>";

    let collapsed = parse(input, ParseOptions::default()).unwrap();
    assert_eq!(serialize(&collapsed), "<ul><li>a</li><li>b</li></ul>");

    let preserved = parse(input, PRESERVE).unwrap();
    assert_eq!(serialize(&preserved), input);
}

#[test]
fn test_malformed_inputs() {
    for input in [
        "<div><p>x</p>",
        "<div class=\"x>",
        "<div",
        "<!-- open",
        "</div>",
    ] {
        let err = parse(input, ParseOptions::default()).unwrap_err();
        assert!(
            matches!(err, Error::MalformedInput { .. }),
            "{:?} gave {:?}",
            input,
            err
        );
    }
}
