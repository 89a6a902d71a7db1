use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::lexer::HostLexer;
use crate::node::AnnotationNode;
use crate::resolver::Resolver;
use crate::skeleton::Skeleton;
use crate::syntax::{EcmaSyntax, HostSyntax};
use crate::table::AnnotationTable;
use log::debug;
use serde::Serialize;

/// Everything recovered from one source file
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Recognized annotations in source order
    pub nodes: Vec<AnnotationNode>,
    pub table: AnnotationTable,
    /// Malformed annotations skipped during scanning
    pub diagnostics: Vec<Error>,
}

impl Analysis {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Scan, build the skeleton and resolve attachments for `source`.
///
/// Malformed annotations end up in [`Analysis::diagnostics`]; the only
/// error is [`Error::AmbiguousAttachment`] under strict attachment.
pub fn analyze(source: &str, config: &ScanConfig) -> Result<Analysis> {
    analyze_with(source, config, EcmaSyntax)
}

pub fn analyze_with<S: HostSyntax>(source: &str, config: &ScanConfig, syntax: S) -> Result<Analysis> {
    let extraction = HostLexer::with_syntax(source, config, syntax).tokenize();
    debug!(
        "{} tokens, {} annotations, {} diagnostics",
        extraction.tokens.len(),
        extraction.nodes.len(),
        extraction.diagnostics.len()
    );

    let skeleton = Skeleton::build(&extraction.tokens);
    let table = Resolver::new(source, &extraction.tokens, &extraction.nodes, &skeleton, config).resolve()?;

    Ok(Analysis { nodes: extraction.nodes, table, diagnostics: extraction.diagnostics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::BindingTarget;

    #[test]
    fn test_analyze_counts() {
        let analysis = match analyze("let a #A\nlet b #<B>", &ScanConfig::default()) {
            Ok(a) => a,
            Err(e) => panic!("Analysis failed: {}", e),
        };
        assert_eq!(analysis.nodes.len(), 2);
        assert_eq!(analysis.table.node_count(), 2);
        assert!(analysis.is_clean());
        assert_eq!(analysis.table.payloads(&BindingTarget::variable("b")), vec!["B"]);
    }

    #[test]
    fn test_analyze_at_sign_preset() {
        let source = "function f(x @{ number }) @'string' {}";
        let analysis = match analyze(source, &ScanConfig::at_sign()) {
            Ok(a) => a,
            Err(e) => panic!("Analysis failed: {}", e),
        };
        assert_eq!(analysis.table.payloads(&BindingTarget::parameter("f", 0)), vec![" number "]);
        assert_eq!(analysis.table.payloads(&BindingTarget::function_return("f")), vec!["string"]);
    }

    #[test]
    fn test_class_property_keeps_block_annotations() {
        let analysis = analyze("el.class = 'x'\nif (ok) {\n  #T\n  run()\n}\n", &ScanConfig::default()).unwrap();
        assert_eq!(analysis.nodes.len(), 1);
        assert_eq!(analysis.table.node_count(), 1);
        assert_eq!(analysis.table.payloads(&BindingTarget::ModuleScope), vec!["T"]);
    }

    #[test]
    fn test_analysis_serializes() {
        let analysis = match analyze("#<( broken\nlet x #T", &ScanConfig::default()) {
            Ok(a) => a,
            Err(e) => panic!("Analysis failed: {}", e),
        };
        let json = match serde_json::to_value(&analysis) {
            Ok(v) => v,
            Err(e) => panic!("Serialization failed: {}", e),
        };
        assert_eq!(json["table"][0]["target"]["kind"], "variable_declaration");
        assert_eq!(json["table"][0]["annotations"][0]["rule"], "trailing");
        assert_eq!(json["diagnostics"][0]["position"]["line"], 1);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    const FRAGMENTS: &[&str] = &[
        "let", "x", "y", "=", "1", "(", ")", "{", "}", ",", ";", "=>", "f", "'s#t'", "`a${b}`", "/* #c */",
        "#T", "#<A<B>>", "#(a, (b))", "#?", "#T?!", "#<( broken",
    ];
    const SEPARATORS: &[&str] = &[" ", "\n", "\n\n"];

    fn program() -> impl Strategy<Value = String> {
        prop::collection::vec((prop::sample::select(FRAGMENTS), prop::sample::select(SEPARATORS)), 0..40)
            .prop_map(|pieces| pieces.into_iter().map(|(frag, sep)| format!("{}{}", frag, sep)).collect())
    }

    proptest! {
        #[test]
        fn analysis_is_deterministic(source in program()) {
            let first = analyze(&source, &ScanConfig::default());
            let second = analyze(&source, &ScanConfig::default());
            match (first, second) {
                (Ok(a), Ok(b)) => {
                    prop_assert_eq!(a.nodes, b.nodes);
                    prop_assert_eq!(a.table, b.table);
                    prop_assert_eq!(a.diagnostics, b.diagnostics);
                }
                (a, b) => prop_assert!(false, "unexpected errors: {:?} / {:?}", a.err(), b.err()),
            }
        }

        #[test]
        fn every_node_attaches_exactly_once(source in program()) {
            let analysis = analyze(&source, &ScanConfig::default());
            prop_assert!(analysis.is_ok());
            if let Ok(analysis) = analysis {
                prop_assert_eq!(analysis.table.node_count(), analysis.nodes.len());
                for node in &analysis.nodes {
                    prop_assert!(analysis.table.target_of(node.span.start).is_some());
                }
            }
        }

        #[test]
        fn spans_are_increasing_and_disjoint(source in program()) {
            let extraction = crate::lexer::extract(&source, &ScanConfig::default());
            for pair in extraction.nodes.windows(2) {
                prop_assert!(pair[0].span.end <= pair[1].span.start);
            }
        }

        #[test]
        fn one_malformed_annotation_spares_the_rest(count in 1usize..8, broken_at in 0usize..8) {
            let mut lines: Vec<String> = (0..count).map(|k| format!("let v{} #T{}", k, k)).collect();
            lines.insert(broken_at.min(count), "#<( broken".to_string());
            let source = lines.join("\n");

            let analysis = analyze(&source, &ScanConfig::default());
            prop_assert!(analysis.is_ok());
            if let Ok(analysis) = analysis {
                prop_assert_eq!(analysis.diagnostics.len(), 1);
                prop_assert_eq!(analysis.nodes.len(), count);
                for k in 0..count {
                    let target = crate::target::BindingTarget::variable(format!("v{}", k));
                    let expected = format!("T{}", k);
                    prop_assert_eq!(analysis.table.payloads(&target), vec![expected.as_str()]);
                }
            }
        }
    }
}
