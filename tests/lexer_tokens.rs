//! Token stream snapshots for representative templates

use razor::razor::lexing::{tokenize, Token};

fn token_lines(source: &str) -> String {
    tokenize(source, false)
        .unwrap()
        .iter()
        .map(Token::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_list_template_tokens() {
    let source = "@model dict\n<ul>\n@for item in items:\n    <li>@item.name</li>\n</ul>\n";
    insta::assert_snapshot!(token_lines(source), @r#"
    (ONELINE, "assert isinstance(model, \"dict\")")
    (NEWLINE, "")
    (XMLFULLSTART, "<ul>")
    (NEWLINE, "")
    (MULTILINE, "for item in items:")
    (NEWLINE, "")
    (XMLFULLSTART, "    <li>")
    (EXPRESSION, "item.name")
    (XMLEND, "</li>")
    (NEWLINE, "")
    (XMLEND, "</ul>")
    (NEWLINE, "")
    "#);
}

#[test]
fn test_code_region_tokens() {
    let source = "@:\n    x = 1\n    print(\"hi\")\n:@\n@!x @@ @(x + 1)";
    insta::assert_snapshot!(token_lines(source), @r#"
    (CODE, "x = 1")
    (NEWLINE, "")
    (PRINTLINE, "    hi")
    (EXPLICITMULTILINEEND)
    (NEWLINE, "")
    (EXPRESSION, !"x")
    (TEXT, " ")
    (ESCAPED, "@")
    (TEXT, " ")
    (PARENEXPRESSION, "x + 1")
    "#);
}

#[test]
fn test_tokens_serialize_as_json() {
    let tokens = tokenize("Hi @name", false).unwrap();
    let json = serde_json::to_value(&tokens).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"kind": "Text", "value": "Hi "},
            {"kind": "Expression", "value": {"source": "name", "escape": true}},
        ])
    );
}
