//! Import discovery from declaring source text
//!
//! Best-effort scanner for `namespace` / `use` declarations. It recognizes
//! plain imports, `as` renames, comma lists and braced groups, and records
//! the imports in effect at every `class`, `interface`, `trait` or `enum`
//! declaration. Anything it does not understand is skipped: the goal is
//! alias discovery, not validation of the source.

use crate::alias::{AliasTable, Import, ImportSource};
use crate::name::TypeName;
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'s> {
    Name(&'s str),
    Punct(char),
}

struct Lexer<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Lexer<'s> {
    fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn skip_while(&mut self, pred: impl Fn(char) -> bool) {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
    }

    fn skip_past(&mut self, terminator: &str) {
        match self.rest().find(terminator) {
            Some(idx) => self.pos += idx + terminator.len(),
            None => self.pos = self.src.len(),
        }
    }

    fn skip_string(&mut self, quote: char) {
        let mut escaped = false;
        for (idx, ch) in self.rest().char_indices() {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                self.pos += idx + ch.len_utf8();
                return;
            }
        }
        self.pos = self.src.len();
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\\'
}

impl<'s> Iterator for Lexer<'s> {
    type Item = Token<'s>;

    fn next(&mut self) -> Option<Token<'s>> {
        loop {
            self.skip_while(char::is_whitespace);
            let rest = self.rest();
            let ch = rest.chars().next()?;

            if rest.starts_with("//") || (ch == '#' && !rest.starts_with("#[")) {
                self.skip_past("\n");
            } else if rest.starts_with("/*") {
                self.skip_past("*/");
            } else if ch == '\'' || ch == '"' {
                self.pos += 1;
                self.skip_string(ch);
            } else if ch == '$' {
                self.pos += 1;
                self.skip_while(is_name_char);
            } else if is_name_char(ch) {
                let start = self.pos;
                self.skip_while(is_name_char);
                return Some(Token::Name(&self.src[start..self.pos]));
            } else {
                self.pos += ch.len_utf8();
                return Some(Token::Punct(ch));
            }
        }
    }
}

/// Imports in effect for each type declared in one source text
#[derive(Debug, Clone, Default)]
pub struct ScannedImports {
    declarations: Vec<(TypeName, AliasTable)>,
    trailing: AliasTable,
}

impl ScannedImports {
    /// Alias table for `scope`
    ///
    /// A scope the source does not declare sees the merged imports of every
    /// declaration, or the imports in effect at the end of the source when
    /// it declares nothing.
    pub fn for_scope(&self, scope: &TypeName) -> AliasTable {
        if let Some((_, table)) = self.declarations.iter().find(|(name, _)| name == scope) {
            return table.clone();
        }

        if self.declarations.is_empty() {
            return self.trailing.clone();
        }

        let mut merged = AliasTable::new();
        for (_, table) in &self.declarations {
            merged.merge(table);
        }
        merged
    }

    /// Types declared in the scanned source, in source order
    pub fn declared_types(&self) -> impl Iterator<Item = &TypeName> {
        self.declarations.iter().map(|(name, _)| name)
    }
}

struct Scanner<'s> {
    tokens: Vec<Token<'s>>,
    pos: usize,
    namespace: Option<TypeName>,
    uses: AliasTable,
    depth: i32,
    type_depth: Option<i32>,
    declarations: Vec<(TypeName, AliasTable)>,
}

impl<'s> Scanner<'s> {
    fn next(&mut self) -> Option<Token<'s>> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek(&self) -> Option<Token<'s>> {
        self.tokens.get(self.pos).copied()
    }

    fn eat_punct(&mut self, expected: char) -> bool {
        if self.peek() == Some(Token::Punct(expected)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        match self.peek() {
            Some(Token::Name(name)) if name.eq_ignore_ascii_case(keyword) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn follows_double_colon(&self) -> bool {
        self.pos >= 3
            && self.tokens[self.pos - 2] == Token::Punct(':')
            && self.tokens[self.pos - 3] == Token::Punct(':')
    }

    fn run(mut self) -> ScannedImports {
        while let Some(token) = self.next() {
            match token {
                Token::Name(word) if self.type_depth.is_none() => self.keyword(word),
                Token::Punct('{') => self.depth += 1,
                Token::Punct('}') => {
                    if self.type_depth == Some(self.depth) {
                        self.type_depth = None;
                    }
                    self.depth -= 1;
                }
                _ => {}
            }
        }

        ScannedImports {
            declarations: self.declarations,
            trailing: self.uses,
        }
    }

    fn keyword(&mut self, word: &str) {
        let lower = word.to_ascii_lowercase();
        match lower.as_str() {
            "namespace" => {
                self.namespace = match self.peek() {
                    Some(Token::Name(name)) => {
                        self.pos += 1;
                        Some(TypeName::new(name))
                    }
                    _ => None,
                };
                self.uses = AliasTable::new();
            }
            "class" | "interface" | "trait" | "enum" if !self.follows_double_colon() => {
                if let Some(Token::Name(name)) = self.peek() {
                    self.pos += 1;
                    let declared = match &self.namespace {
                        Some(namespace) => namespace.join(name),
                        None => TypeName::new(name),
                    };
                    self.declarations.push((declared, self.uses.clone()));
                }
                self.type_depth = Some(self.depth + 1);
            }
            "use" => self.use_clause(),
            _ => {}
        }
    }

    fn use_clause(&mut self) {
        if self.eat_keyword("function") || self.eat_keyword("const") {
            return;
        }

        while let Some(Token::Name(name)) = self.peek() {
            self.pos += 1;
            let name = name.trim_start_matches('\\');

            if self.eat_punct('{') {
                self.use_group(name.trim_end_matches('\\'));
            } else if self.eat_keyword("as") {
                if let Some(Token::Name(alias)) = self.next() {
                    self.import(Import::aliased(name, alias));
                }
            } else {
                self.import(Import::new(name));
            }

            if !self.eat_punct(',') {
                break;
            }
        }
    }

    fn use_group(&mut self, prefix: &str) {
        let prefix = TypeName::new(prefix);

        while let Some(Token::Name(suffix)) = self.peek() {
            self.pos += 1;
            let target = prefix.join(suffix.trim_matches('\\'));

            if self.eat_keyword("as") {
                if let Some(Token::Name(alias)) = self.next() {
                    self.import(Import::aliased(target, alias));
                }
            } else {
                self.import(Import::new(target));
            }

            if !self.eat_punct(',') {
                break;
            }
        }

        self.eat_punct('}');
    }

    fn import(&mut self, import: Import) {
        if !import.alias.is_empty() && !import.target.as_str().is_empty() {
            self.uses.insert(import);
        }
    }
}

/// Scan `source` for namespace and import declarations
pub fn scan_imports(source: &str) -> ScannedImports {
    let scanner = Scanner {
        tokens: Lexer::new(source).collect(),
        pos: 0,
        namespace: None,
        uses: AliasTable::new(),
        depth: 0,
        type_depth: None,
        declarations: Vec::new(),
    };
    scanner.run()
}

#[derive(Debug, Clone)]
enum SourceText {
    Inline(String),
    File(PathBuf),
}

/// Import source that scans each scope's declaring source text
///
/// Files are read when the scope's alias table is first built; an
/// unreadable file yields no imports.
#[derive(Debug, Clone, Default)]
pub struct SourceImports {
    sources: FxHashMap<TypeName, SourceText>,
}

impl SourceImports {
    /// Create an empty source map
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `scope` in the given source text
    pub fn with_source(mut self, scope: impl Into<TypeName>, source: impl Into<String>) -> Self {
        self.sources.insert(scope.into(), SourceText::Inline(source.into()));
        self
    }

    /// Declare `scope` in the file at `path`
    pub fn with_file(mut self, scope: impl Into<TypeName>, path: impl Into<PathBuf>) -> Self {
        self.sources.insert(scope.into(), SourceText::File(path.into()));
        self
    }
}

impl ImportSource for SourceImports {
    fn load(&self, scope: &TypeName) -> Option<AliasTable> {
        let scanned = match self.sources.get(scope)? {
            SourceText::Inline(text) => scan_imports(text),
            SourceText::File(path) => match std::fs::read_to_string(path) {
                Ok(text) => scan_imports(&text),
                Err(err) => {
                    warn!(
                        target: "dtokit::scan",
                        scope = %scope,
                        path = %path.display(),
                        error = %err,
                        "cannot read declaring source, assuming no imports"
                    );
                    return None;
                }
            },
        };

        let table = scanned.for_scope(scope);
        debug!(target: "dtokit::scan", scope = %scope, aliases = table.len(), "scanned imports");
        Some(table)
    }
}
