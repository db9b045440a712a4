//! Property tests for the span-preserving document helpers.

use std::collections::BTreeMap;

use bumper_upgrade::documents::lines::split_lines;
use bumper_upgrade::documents::{jsonc, TextEdits};
use bumper_upgrade::upgraders::scripts::check_powershell_brackets;
use proptest::prelude::*;

fn brackets() -> impl Strategy<Value = String> {
    let leaf = "[a-z $=]{0,4}";
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| format!("({s})")),
            inner.clone().prop_map(|s| format!("{{{s}}}")),
            inner.clone().prop_map(|s| format!("[{s}]")),
            (inner.clone(), inner).prop_map(|(a, b)| format!("{a}\n{b}")),
        ]
    })
}

proptest! {
    #[test]
    fn lines_cover_the_whole_text(content in "[a-z \r\n]{0,80}") {
        let lines = split_lines(&content);
        let rebuilt: String = lines.iter().map(|l| format!("{}{}", l.text, l.eol)).collect();
        prop_assert_eq!(rebuilt, content.clone());
        for (i, line) in lines.iter().enumerate() {
            prop_assert_eq!(line.number, i + 1);
            prop_assert_eq!(&content[line.start..line.end()], line.text);
        }
    }

    #[test]
    fn commented_json_resolves_every_member(
        members in prop::collection::btree_map("[a-zA-Z][a-zA-Z0-9_-]{0,10}", any::<String>(), 0..8),
    ) {
        let document = serde_json::to_string_pretty(&members).unwrap();
        let source = format!("// generated\n{}\n/* end */\n", document.replacen('{', "{ /* members */", 1));
        let root = jsonc::parse(&source).unwrap();

        let found: BTreeMap<String, String> = members
            .keys()
            .filter_map(|k| Some((k.clone(), root.pointer(&format!("/{k}"))?.as_str()?.to_string())))
            .collect();
        prop_assert_eq!(found, members);
    }

    #[test]
    fn replacing_a_string_leaves_the_rest_alone(value in any::<String>(), replacement in any::<String>()) {
        let source = format!("{{\n  // keep me\n  \"sdk\": {{ \"version\": {} }},\n}}\n", jsonc::encode_string(&value));
        let root = jsonc::parse(&source).unwrap();
        let node = root.pointer("/sdk/version").unwrap();

        let mut edits = TextEdits::new();
        edits.replace(node.span.clone(), jsonc::encode_string(&replacement));
        let edited = edits.apply(&source);

        let reparsed = jsonc::parse(&edited).unwrap();
        prop_assert_eq!(reparsed.pointer("/sdk/version").and_then(|n| n.as_str()), Some(replacement.as_str()));
        prop_assert!(edited.starts_with("{\n  // keep me\n  \"sdk\": { \"version\": "), "edited document prefix mismatch: {:?}", edited);
        prop_assert!(edited.ends_with(" },\n}\n"), "edited document suffix mismatch: {:?}", edited);
    }

    #[test]
    fn balanced_scripts_pass_the_bracket_check(script in brackets()) {
        prop_assert!(check_powershell_brackets(&script).is_ok());
        let unclosed = format!("{script}\n(");
        prop_assert!(check_powershell_brackets(&unclosed).is_err());
    }
}
