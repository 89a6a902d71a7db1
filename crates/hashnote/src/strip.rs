use crate::node::AnnotationNode;

/// Remove every annotation span from `source`.
///
/// Where an annotation sat directly between two non-whitespace characters
/// a single space takes its place, so `a#T b` and `x/#T/y` keep their host
/// tokens apart. Nodes may come in any order but must not overlap.
pub fn strip_annotations(source: &str, nodes: &[AnnotationNode]) -> String {
    let mut spans: Vec<_> = nodes.iter().map(|n| n.span).collect();
    spans.sort();

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for span in spans {
        if span.start < cursor {
            continue;
        }
        out.push_str(&source[cursor..span.start]);
        cursor = span.end;

        let before = out.chars().next_back();
        let after = source[span.end..].chars().next();
        if let (Some(b), Some(a)) = (before, after) {
            if !b.is_whitespace() && !a.is_whitespace() {
                out.push(' ');
            }
        }
    }
    out.push_str(&source[cursor..]);
    out
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::lexer::{extract, TokenKind};
    use proptest::prelude::*;

    const HOST: &[&str] = &["let", "x", "=", "1", "(", ")", "{", "}", ",", ".", "/", "+", "'a#b'", "`t${u}`", "y"];
    const NOTES: &[&str] = &["#T", "#<A<B>>", "#(a (b))", "#?", "#T?!", "#<'>'>"];

    fn host_tokens(source: &str) -> Vec<(TokenKind, String)> {
        extract(source, &ScanConfig::default())
            .tokens
            .into_iter()
            .filter(|t| !t.is_annotation())
            .map(|t| (t.kind, t.text))
            .collect()
    }

    proptest! {
        #[test]
        fn stripping_is_inert(
            pieces in prop::collection::vec(
                (prop::sample::select(HOST), prop::option::of(prop::sample::select(NOTES)), any::<bool>()),
                0..30,
            )
        ) {
            let mut source = String::new();
            for (host, note, spaced) in pieces {
                source.push_str(host);
                if spaced {
                    source.push(' ');
                }
                if let Some(note) = note {
                    source.push_str(note);
                    source.push(' ');
                }
            }

            let extraction = extract(&source, &ScanConfig::default());
            prop_assume!(extraction.diagnostics.is_empty());
            let stripped = strip_annotations(&source, &extraction.nodes);
            prop_assert_eq!(host_tokens(&stripped), host_tokens(&source));
            prop_assert!(extract(&stripped, &ScanConfig::default()).nodes.is_empty());
        }
    }
}
