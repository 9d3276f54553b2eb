use crate::error::{ChunkerError, Result};
use crate::language::AstLanguage;
use crate::types::{ChunkSpan, SourceLines};
use tree_sitter::{Node, Parser};

/// Extracts one chunk per function/class definition from a syntax tree
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralChunker;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Direct children of the root (plus transparent containers)
    TopLevel,
    /// Anywhere inside an opened definition
    Nested,
}

/// Line range claimed by one or more definition nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Claim {
    start_line: usize,
    end_line: usize,
    node_count: usize,
}

impl StructuralChunker {
    pub const fn new() -> Self {
        Self
    }

    /// Parse `content` and return definition chunks in line order.
    ///
    /// Fails with [`ChunkerError::ParseError`] when the tree contains syntax
    /// errors. Lines outside every definition are not returned; see
    /// [`crate::Chunker`] for the residual sweep.
    pub fn chunk<'a>(
        &self,
        lines: &SourceLines<'a>,
        content: &'a str,
        language: AstLanguage,
        nesting_depth: usize,
    ) -> Result<Vec<ChunkSpan<'a>>> {
        let claims = self.claims(lines, content, language, nesting_depth)?;
        Ok(claims
            .into_iter()
            .map(|claim| lines.span(claim.start_line, claim.end_line, Some(claim.node_count)))
            .collect())
    }

    fn claims(
        &self,
        lines: &SourceLines<'_>,
        content: &str,
        language: AstLanguage,
        nesting_depth: usize,
    ) -> Result<Vec<Claim>> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.tree_sitter_language())
            .map_err(|e| ChunkerError::tree_sitter(format!("Failed to set language: {e}")))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| ChunkerError::parse("Failed to parse source code"))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(ChunkerError::parse(format!(
                "{language} source contains syntax errors"
            )));
        }

        let mut definitions = Vec::new();
        Self::collect(language, root, 0, nesting_depth, Scope::TopLevel, &mut definitions);

        let mut claims: Vec<Claim> = Vec::with_capacity(definitions.len());
        for node in definitions {
            let start_line = node.start_position().row + 1;
            let end = node.end_position();
            // An extent ending at column 0 stops on the line above.
            let end_row = if end.column == 0 && end.row > node.start_position().row {
                end.row - 1
            } else {
                end.row
            };
            let mut end_line = (end_row + 1).min(lines.len()).max(start_line);
            // Some grammars also stretch a node over trailing blank lines.
            while end_line > start_line && lines.slice(end_line, end_line).trim().is_empty() {
                end_line -= 1;
            }
            let node_count = node.descendant_count();

            match claims.last_mut() {
                Some(prev) if start_line <= prev.end_line => {
                    prev.end_line = prev.end_line.max(end_line);
                    prev.node_count += node_count;
                }
                _ => claims.push(Claim {
                    start_line,
                    end_line,
                    node_count,
                }),
            }
        }

        Ok(claims)
    }

    /// Gather the definitions to emit under `node`, in document order
    fn collect<'t>(
        language: AstLanguage,
        node: Node<'t>,
        depth: usize,
        max_depth: usize,
        scope: Scope,
        out: &mut Vec<Node<'t>>,
    ) {
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();

        for child in children {
            if Self::is_definition(language, child) {
                let body = Self::unwrap_definition(language, child);
                if depth < max_depth && Self::has_nested_definition(language, body) {
                    Self::collect(language, body, depth + 1, max_depth, Scope::Nested, out);
                } else {
                    out.push(child);
                }
            } else if scope == Scope::Nested
                || language.container_kinds().contains(&child.kind())
            {
                Self::collect(language, child, depth, max_depth, scope, out);
            }
        }
    }

    fn is_definition(language: AstLanguage, node: Node) -> bool {
        let kind = node.kind();
        if language.definition_kinds().contains(&kind) {
            return true;
        }
        if language.wrapper_kinds().contains(&kind) {
            return Self::wrapped_definition(language, node).is_some();
        }
        if matches!(kind, "lexical_declaration" | "variable_declaration") {
            return Self::is_function_binding(language, node);
        }
        false
    }

    /// The definition inside a decorator/export wrapper
    fn wrapped_definition<'t>(language: AstLanguage, node: Node<'t>) -> Option<Node<'t>> {
        let mut cursor = node.walk();
        let found = node
            .named_children(&mut cursor)
            .find(|child| Self::is_definition(language, *child));
        found
    }

    /// Strip wrappers so nested search does not rediscover the definition itself
    fn unwrap_definition<'t>(language: AstLanguage, node: Node<'t>) -> Node<'t> {
        if language.wrapper_kinds().contains(&node.kind()) {
            if let Some(inner) = Self::wrapped_definition(language, node) {
                return Self::unwrap_definition(language, inner);
            }
        }
        node
    }

    /// `const handler = () => {}` and friends in JS/TS
    fn is_function_binding(language: AstLanguage, node: Node) -> bool {
        if !matches!(
            language,
            AstLanguage::JavaScript | AstLanguage::TypeScript | AstLanguage::Tsx
        ) {
            return false;
        }

        let mut cursor = node.walk();
        let declarators: Vec<_> = node
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "variable_declarator")
            .collect();
        if declarators.len() != 1 {
            return false;
        }

        declarators[0]
            .child_by_field_name("value")
            .is_some_and(|value| {
                matches!(
                    value.kind(),
                    "arrow_function"
                        | "function"
                        | "function_expression"
                        | "generator_function"
                        | "class"
                )
            })
    }

    fn has_nested_definition(language: AstLanguage, node: Node) -> bool {
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        children.into_iter().any(|child| {
            Self::is_definition(language, child) || Self::has_nested_definition(language, child)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spans(code: &str, language: AstLanguage, depth: usize) -> Vec<(usize, usize)> {
        let lines = SourceLines::new(code);
        StructuralChunker::new()
            .chunk(&lines, code, language, depth)
            .unwrap()
            .iter()
            .map(|span| (span.start_line, span.end_line))
            .collect()
    }

    const PYTHON_CODE: &str = r#"import os
import sys

CONSTANT = 1


def hello():
    print("Hello")


class MyClass:
    attr = 2

    def method(self):
        def inner():
            pass
        return inner

    @staticmethod
    def helper():
        pass
"#;

    #[test]
    fn test_python_top_level_definitions() {
        assert_eq!(
            spans(PYTHON_CODE, AstLanguage::Python, 0),
            vec![(7, 8), (11, 21)]
        );
    }

    #[test]
    fn test_python_nesting_depth_one_opens_classes() {
        // hello has no nested definitions and stays whole; MyClass is opened.
        assert_eq!(
            spans(PYTHON_CODE, AstLanguage::Python, 1),
            vec![(7, 8), (14, 17), (19, 21)]
        );
    }

    #[test]
    fn test_python_nesting_depth_two_opens_methods() {
        assert_eq!(
            spans(PYTHON_CODE, AstLanguage::Python, 2),
            vec![(7, 8), (15, 16), (19, 21)]
        );
    }

    #[test]
    fn test_node_count_is_inclusive() {
        let code = "def f():\n    return 1\n";
        let lines = SourceLines::new(code);
        let chunks = StructuralChunker::new()
            .chunk(&lines, code, AstLanguage::Python, 0)
            .unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "def f():\n    return 1");
        let count = chunks[0].node_count.unwrap();
        // function_definition, def, identifier, parameters, (, ), :, block,
        // return_statement, return, integer
        assert!(count >= 8, "unexpected node count {count}");
    }

    #[test]
    fn test_rust_items() {
        let code = r#"use std::fmt;

fn main() {
    println!("Hello");
}

struct Point {
    x: i32,
}

impl Point {
    fn new(x: i32) -> Self {
        Self { x }
    }
}
"#;
        assert_eq!(
            spans(code, AstLanguage::Rust, 0),
            vec![(3, 5), (7, 9), (11, 15)]
        );
        assert_eq!(
            spans(code, AstLanguage::Rust, 1),
            vec![(3, 5), (7, 9), (12, 14)]
        );
    }

    #[test]
    fn test_same_line_definitions_are_merged() {
        let code = "function a() {} function b() {}\nfunction c() {\n}\n";
        let lines = SourceLines::new(code);
        let chunks = StructuralChunker::new()
            .chunk(&lines, code, AstLanguage::JavaScript, 0)
            .unwrap();

        let ranges: Vec<_> = chunks.iter().map(|c| (c.start_line, c.end_line)).collect();
        assert_eq!(ranges, vec![(1, 1), (2, 3)]);
        assert!(chunks[0].node_count.unwrap() > chunks[1].node_count.unwrap() / 2);
    }

    #[test]
    fn test_typescript_exports_and_arrow_bindings() {
        let code = r#"import { x } from "./x";

export class Service {
    run(): void {}
}

export const handler = (n: number) => {
    return n * 2;
};

const value = 3;
"#;
        assert_eq!(
            spans(code, AstLanguage::TypeScript, 0),
            vec![(3, 5), (7, 9)]
        );
        assert_eq!(
            spans(code, AstLanguage::TypeScript, 1),
            vec![(4, 4), (7, 9)]
        );
    }

    #[test]
    fn test_csharp_namespace_is_transparent() {
        let code = r#"using System;

namespace Demo
{
    public class Greeter
    {
        public string Greet() { return "hi"; }
    }
}
"#;
        assert_eq!(spans(code, AstLanguage::CSharp, 0), vec![(5, 8)]);
    }

    #[test]
    fn test_go_and_java() {
        let go = "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Println(1)\n}\n";
        assert_eq!(spans(go, AstLanguage::Go, 0), vec![(5, 7)]);

        let java = "package a;\n\npublic class A {\n    void run() {}\n}\n";
        assert_eq!(spans(java, AstLanguage::Java, 0), vec![(3, 5)]);
        assert_eq!(spans(java, AstLanguage::Java, 1), vec![(4, 4)]);
    }

    #[test]
    fn test_syntax_errors_are_parse_errors() {
        let code = "def broken(:\n    pass\n";
        let lines = SourceLines::new(code);
        let result = StructuralChunker::new().chunk(&lines, code, AstLanguage::Python, 0);
        assert!(matches!(result, Err(ChunkerError::ParseError(_))));
    }

    #[test]
    fn test_no_definitions_yields_nothing() {
        assert!(spans("import os\nX = 1\n", AstLanguage::Python, 0).is_empty());
    }
}
