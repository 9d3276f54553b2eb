use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Language tag attached to every chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    Python,
    #[serde(alias = "js")]
    JavaScript,
    #[serde(alias = "ts")]
    TypeScript,
    Java,
    #[serde(alias = "golang")]
    Go,
    #[serde(alias = "c#", alias = "c_sharp")]
    CSharp,
    C,
    #[serde(alias = "c++")]
    Cpp,
    Ruby,
    Php,
    Kotlin,
    Swift,
    Scala,
    Shell,
    Markdown,
    Yaml,
    Json,
    Toml,
    Html,
    Css,
    Sql,
    /// Sentinel for anything the classifier does not recognize
    Text,
}

impl Language {
    /// Every tag, in declaration order
    pub const ALL: &'static [Language] = &[
        Language::Rust,
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Java,
        Language::Go,
        Language::CSharp,
        Language::C,
        Language::Cpp,
        Language::Ruby,
        Language::Php,
        Language::Kotlin,
        Language::Swift,
        Language::Scala,
        Language::Shell,
        Language::Markdown,
        Language::Yaml,
        Language::Json,
        Language::Toml,
        Language::Html,
        Language::Css,
        Language::Sql,
        Language::Text,
    ];

    /// Detect language from file extension (without the leading dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        let language = match ext.trim_start_matches('.').to_lowercase().as_str() {
            "rs" => Language::Rust,
            "py" | "pyw" | "pyi" => Language::Python,
            "js" | "mjs" | "cjs" | "jsx" => Language::JavaScript,
            "ts" | "mts" | "cts" | "tsx" => Language::TypeScript,
            "java" => Language::Java,
            "go" => Language::Go,
            "cs" => Language::CSharp,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Language::Cpp,
            "rb" => Language::Ruby,
            "php" => Language::Php,
            "kt" | "kts" => Language::Kotlin,
            "swift" => Language::Swift,
            "scala" | "sc" => Language::Scala,
            "sh" | "bash" | "zsh" | "fish" | "ksh" => Language::Shell,
            "md" | "mdx" | "markdown" => Language::Markdown,
            "yaml" | "yml" => Language::Yaml,
            "json" | "jsonc" => Language::Json,
            "toml" => Language::Toml,
            "html" | "htm" => Language::Html,
            "css" | "scss" | "less" => Language::Css,
            "sql" => Language::Sql,
            "txt" | "text" => Language::Text,
            _ => return None,
        };
        Some(language)
    }

    /// Detect language from well-known extensionless file names
    pub fn from_file_name(name: &str) -> Option<Self> {
        match name {
            "Dockerfile" | "Makefile" | "makefile" | "GNUmakefile" | "Justfile" | "justfile" => {
                Some(Language::Shell)
            }
            "Gemfile" | "Rakefile" => Some(Language::Ruby),
            _ => None,
        }
    }

    /// Detect language from a `#!` interpreter line
    pub fn from_shebang(first_line: &str) -> Option<Self> {
        let rest = first_line.strip_prefix("#!")?;
        let mut tokens = rest.split_whitespace();
        let mut interpreter = tokens.next()?.rsplit('/').next()?;
        if interpreter == "env" {
            interpreter = tokens.find(|token| !token.starts_with('-'))?;
        }

        let name = interpreter.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
        match name {
            "python" | "pypy" => Some(Language::Python),
            "node" | "nodejs" | "deno" | "bun" => Some(Language::JavaScript),
            "ts-node" | "tsx" => Some(Language::TypeScript),
            "sh" | "bash" | "zsh" | "dash" | "ksh" | "fish" => Some(Language::Shell),
            "ruby" => Some(Language::Ruby),
            "php" => Some(Language::Php),
            _ => None,
        }
    }

    /// Parse a configuration tag (`"python"`, `"c#"`, ...)
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_lowercase();
        match tag.as_str() {
            "js" => return Some(Language::JavaScript),
            "ts" => return Some(Language::TypeScript),
            "golang" => return Some(Language::Go),
            "c#" | "c_sharp" => return Some(Language::CSharp),
            "c++" => return Some(Language::Cpp),
            _ => {}
        }
        Self::ALL.iter().copied().find(|lang| lang.as_str() == tag)
    }

    /// Get language name as string
    pub const fn as_str(self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::Go => "go",
            Language::CSharp => "csharp",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Kotlin => "kotlin",
            Language::Swift => "swift",
            Language::Scala => "scala",
            Language::Shell => "shell",
            Language::Markdown => "markdown",
            Language::Yaml => "yaml",
            Language::Json => "json",
            Language::Toml => "toml",
            Language::Html => "html",
            Language::Css => "css",
            Language::Sql => "sql",
            Language::Text => "text",
        }
    }

    /// Grammar used for structural chunking, if one is bundled.
    ///
    /// TypeScript resolves to the plain grammar here; `.tsx` files are
    /// upgraded to [`AstLanguage::Tsx`] by [`AstLanguage::for_path`].
    pub const fn grammar(self) -> Option<AstLanguage> {
        match self {
            Language::Rust => Some(AstLanguage::Rust),
            Language::Python => Some(AstLanguage::Python),
            Language::JavaScript => Some(AstLanguage::JavaScript),
            Language::TypeScript => Some(AstLanguage::TypeScript),
            Language::Java => Some(AstLanguage::Java),
            Language::Go => Some(AstLanguage::Go),
            Language::CSharp => Some(AstLanguage::CSharp),
            _ => None,
        }
    }

    /// Check if a syntax grammar is bundled for this language
    pub const fn supports_ast(self) -> bool {
        self.grammar().is_some()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Languages with a bundled tree-sitter grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstLanguage {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Java,
    Go,
    CSharp,
}

impl AstLanguage {
    /// Resolve the grammar for a file, honoring the `.tsx` dialect
    pub fn for_path(language: Language, path: impl AsRef<Path>) -> Option<Self> {
        let grammar = language.grammar()?;
        let is_tsx = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tsx"));
        if grammar == AstLanguage::TypeScript && is_tsx {
            return Some(AstLanguage::Tsx);
        }
        Some(grammar)
    }

    /// Language tag reported on chunks
    pub const fn language(self) -> Language {
        match self {
            AstLanguage::Rust => Language::Rust,
            AstLanguage::Python => Language::Python,
            AstLanguage::JavaScript => Language::JavaScript,
            AstLanguage::TypeScript | AstLanguage::Tsx => Language::TypeScript,
            AstLanguage::Java => Language::Java,
            AstLanguage::Go => Language::Go,
            AstLanguage::CSharp => Language::CSharp,
        }
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            AstLanguage::Rust => tree_sitter_rust::LANGUAGE.into(),
            AstLanguage::Python => tree_sitter_python::LANGUAGE.into(),
            AstLanguage::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            AstLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            AstLanguage::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            AstLanguage::Java => tree_sitter_java::LANGUAGE.into(),
            AstLanguage::Go => tree_sitter_go::LANGUAGE.into(),
            AstLanguage::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
        }
    }

    /// Node kinds treated as function/class definitions
    pub fn definition_kinds(self) -> &'static [&'static str] {
        match self {
            AstLanguage::Rust => &[
                "function_item",
                "function_signature_item",
                "struct_item",
                "enum_item",
                "union_item",
                "trait_item",
                "impl_item",
                "mod_item",
                "macro_definition",
            ],
            AstLanguage::Python => &[
                "function_definition",
                "class_definition",
                "decorated_definition",
            ],
            AstLanguage::JavaScript => &[
                "function_declaration",
                "generator_function_declaration",
                "class_declaration",
                "method_definition",
            ],
            AstLanguage::TypeScript | AstLanguage::Tsx => &[
                "function_declaration",
                "generator_function_declaration",
                "class_declaration",
                "abstract_class_declaration",
                "method_definition",
                "interface_declaration",
                "enum_declaration",
                "internal_module",
            ],
            AstLanguage::Java => &[
                "class_declaration",
                "interface_declaration",
                "enum_declaration",
                "record_declaration",
                "annotation_type_declaration",
                "method_declaration",
                "constructor_declaration",
            ],
            AstLanguage::Go => &[
                "function_declaration",
                "method_declaration",
                "type_declaration",
            ],
            AstLanguage::CSharp => &[
                "class_declaration",
                "struct_declaration",
                "interface_declaration",
                "enum_declaration",
                "record_declaration",
                "method_declaration",
                "constructor_declaration",
            ],
        }
    }

    /// Top-level wrappers that are transparent for depth accounting
    pub fn container_kinds(self) -> &'static [&'static str] {
        match self {
            AstLanguage::CSharp => &[
                "namespace_declaration",
                "file_scoped_namespace_declaration",
                "declaration_list",
            ],
            AstLanguage::TypeScript | AstLanguage::Tsx => &["expression_statement"],
            _ => &[],
        }
    }

    /// Wrapper kinds whose wrapped declaration is the actual definition
    pub fn wrapper_kinds(self) -> &'static [&'static str] {
        match self {
            AstLanguage::Python => &["decorated_definition"],
            AstLanguage::JavaScript | AstLanguage::TypeScript | AstLanguage::Tsx => {
                &["export_statement"]
            }
            _ => &[],
        }
    }
}

impl fmt::Display for AstLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstLanguage::Tsx => f.write_str("tsx"),
            other => f.write_str(other.language().as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("rs"), Some(Language::Rust));
        assert_eq!(Language::from_extension("RS"), Some(Language::Rust));
        assert_eq!(Language::from_extension(".py"), Some(Language::Python));
        assert_eq!(Language::from_extension("tsx"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("cs"), Some(Language::CSharp));
        assert_eq!(Language::from_extension("xyz"), None);
    }

    #[test]
    fn test_from_shebang() {
        assert_eq!(
            Language::from_shebang("#!/usr/bin/env python3"),
            Some(Language::Python)
        );
        assert_eq!(Language::from_shebang("#!/bin/bash -e"), Some(Language::Shell));
        assert_eq!(
            Language::from_shebang("#!/usr/bin/env -S node --harmony"),
            Some(Language::JavaScript)
        );
        assert_eq!(Language::from_shebang("#!/usr/bin/perl"), None);
        assert_eq!(Language::from_shebang("import os"), None);
    }

    #[test]
    fn test_tags_round_trip() {
        for language in Language::ALL {
            assert_eq!(Language::from_tag(language.as_str()), Some(*language));
        }
        assert_eq!(Language::from_tag("C#"), Some(Language::CSharp));
        assert_eq!(Language::from_tag("cobol"), None);
    }

    #[test]
    fn test_serde_tags_match_as_str() {
        for language in Language::ALL {
            let json = serde_json::to_string(language).unwrap();
            assert_eq!(json, format!("\"{}\"", language.as_str()));
        }
        let parsed: Language = serde_json::from_str("\"c#\"").unwrap();
        assert_eq!(parsed, Language::CSharp);
    }

    #[test]
    fn test_supports_ast() {
        assert!(Language::Rust.supports_ast());
        assert!(Language::Python.supports_ast());
        assert!(Language::CSharp.supports_ast());
        assert!(!Language::Ruby.supports_ast());
        assert!(!Language::Text.supports_ast());
    }

    #[test]
    fn test_tsx_dialect() {
        assert_eq!(
            AstLanguage::for_path(Language::TypeScript, "ui/App.tsx"),
            Some(AstLanguage::Tsx)
        );
        assert_eq!(
            AstLanguage::for_path(Language::TypeScript, "lib/api.ts"),
            Some(AstLanguage::TypeScript)
        );
        assert_eq!(AstLanguage::Tsx.language(), Language::TypeScript);
        assert_eq!(AstLanguage::for_path(Language::Markdown, "README.md"), None);
    }

    #[test]
    fn test_every_grammar_loads() {
        let grammars = [
            AstLanguage::Rust,
            AstLanguage::Python,
            AstLanguage::JavaScript,
            AstLanguage::TypeScript,
            AstLanguage::Tsx,
            AstLanguage::Java,
            AstLanguage::Go,
            AstLanguage::CSharp,
        ];
        for grammar in grammars {
            let mut parser = tree_sitter::Parser::new();
            assert!(
                parser.set_language(&grammar.tree_sitter_language()).is_ok(),
                "grammar {grammar} failed to load"
            );
        }
    }
}
