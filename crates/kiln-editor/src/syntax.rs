//! Language descriptors and the static registry.
//!
//! A [`Syntax`] is plain data: word lists, operator lists, comment
//! delimiters and a few feature flags. The highlighter reads it; nothing
//! mutates it. Descriptors live in [`REGISTRY`] for the whole process, so
//! buffers hold `&'static Syntax` and re-select on rename.
//!
//! | Name     | File match           | Line comment | Block comment |
//! |----------|----------------------|--------------|---------------|
//! | `c`      | `.c` `.h` `.cpp`     | `//`         | `/* */`       |
//! | `rust`   | `.rs`                | `//`         | `/* */`       |
//! | `python` | `.py`                | `#`          | none          |

use bitflags::bitflags;

use crate::highlight::Tag;

bitflags! {
    /// Optional highlighter features.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SyntaxFlags: u8 {
        const NUMBERS            = 1 << 0;
        const STRINGS            = 1 << 1;
        const MULTILINE_COMMENTS = 1 << 2;
    }
}

/// A literal word or operator and the tag it gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word {
    pub text: &'static str,
    pub tag: Tag,
}

impl Word {
    #[must_use]
    pub const fn keyword(text: &'static str) -> Self {
        Self { text, tag: Tag::Keyword }
    }

    #[must_use]
    pub const fn ty(text: &'static str) -> Self {
        Self { text, tag: Tag::Type }
    }

    #[must_use]
    pub const fn operator(text: &'static str) -> Self {
        Self { text, tag: Tag::Operator }
    }

    #[must_use]
    pub const fn boolean(text: &'static str) -> Self {
        Self { text, tag: Tag::Boolean }
    }
}

/// Everything the highlighter needs to know about one language.
#[derive(Debug)]
pub struct Syntax {
    /// Short file-type name shown in the status bar.
    pub name: &'static str,
    /// `.ext` entries must equal the file's extension; anything else
    /// matches as a substring of the file name.
    pub filematch: &'static [&'static str],
    /// Words tagged with their own tag (keyword or type).
    pub keywords: &'static [Word],
    /// Words tagged [`Tag::Type`].
    pub type_keywords: &'static [&'static str],
    /// Words tagged [`Tag::Control`].
    pub control_keywords: &'static [&'static str],
    /// Operators and boolean literals, tried in order. Longer entries
    /// must come before their prefixes.
    pub operators: &'static [Word],
    pub line_comment: Option<&'static str>,
    pub block_comment: Option<(&'static str, &'static str)>,
    pub flags: SyntaxFlags,
}

impl Syntax {
    /// All keyword candidates in match order: `keywords`, then the type
    /// list, then the control list.
    pub fn words(&self) -> impl Iterator<Item = (&'static str, Tag)> + '_ {
        self.keywords
            .iter()
            .map(|w| (w.text, w.tag))
            .chain(self.type_keywords.iter().map(|&t| (t, Tag::Type)))
            .chain(self.control_keywords.iter().map(|&t| (t, Tag::Control)))
    }

    /// Does this descriptor claim `filename`?
    #[must_use]
    pub fn matches(&self, filename: &str) -> bool {
        let ext = filename.rfind('.').map(|i| &filename[i..]);
        self.filematch.iter().any(|pat| {
            if pat.starts_with('.') {
                ext == Some(*pat)
            } else {
                filename.contains(pat)
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

const C_LIKE_OPERATORS: &[Word] = &[
    Word::operator("=="),
    Word::operator("!="),
    Word::operator("<="),
    Word::operator(">="),
    Word::operator("&&"),
    Word::operator("||"),
    Word::operator("->"),
    Word::operator("++"),
    Word::operator("--"),
    Word::operator("+="),
    Word::operator("-="),
    Word::operator("*="),
    Word::operator("/="),
    Word::operator("+"),
    Word::operator("-"),
    Word::operator("*"),
    Word::operator("/"),
    Word::operator("%"),
    Word::operator("="),
    Word::operator("<"),
    Word::operator(">"),
    Word::operator("!"),
    Word::operator("&"),
    Word::operator("|"),
    Word::operator("^"),
    Word::operator("~"),
    Word::operator("?"),
    Word::boolean("true"),
    Word::boolean("false"),
    Word::boolean("NULL"),
];

static C: Syntax = Syntax {
    name: "c",
    filematch: &[".c", ".h", ".cpp"],
    keywords: &[
        Word::keyword("struct"),
        Word::keyword("union"),
        Word::keyword("typedef"),
        Word::keyword("static"),
        Word::keyword("enum"),
        Word::keyword("class"),
        Word::keyword("const"),
        Word::keyword("extern"),
        Word::keyword("sizeof"),
        Word::keyword("print"),
        Word::ty("int"),
        Word::ty("long"),
        Word::ty("double"),
        Word::ty("float"),
        Word::ty("char"),
        Word::ty("unsigned"),
        Word::ty("signed"),
        Word::ty("void"),
        Word::ty("short"),
    ],
    type_keywords: &["size_t", "ssize_t", "bool", "FILE", "uint8_t", "uint32_t", "int32_t"],
    control_keywords: &[
        "if", "else", "while", "for", "do", "break", "continue", "return", "switch", "case",
        "default", "goto",
    ],
    operators: C_LIKE_OPERATORS,
    line_comment: Some("//"),
    block_comment: Some(("/*", "*/")),
    flags: SyntaxFlags::all(),
};

static RUST: Syntax = Syntax {
    name: "rust",
    filematch: &[".rs"],
    keywords: &[
        Word::keyword("fn"),
        Word::keyword("let"),
        Word::keyword("mut"),
        Word::keyword("pub"),
        Word::keyword("struct"),
        Word::keyword("enum"),
        Word::keyword("impl"),
        Word::keyword("trait"),
        Word::keyword("use"),
        Word::keyword("mod"),
        Word::keyword("const"),
        Word::keyword("static"),
        Word::keyword("ref"),
        Word::keyword("move"),
        Word::keyword("unsafe"),
        Word::keyword("where"),
        Word::keyword("type"),
        Word::keyword("as"),
        Word::keyword("crate"),
        Word::keyword("self"),
        Word::keyword("super"),
        Word::keyword("dyn"),
        Word::keyword("async"),
        Word::keyword("await"),
        Word::ty("Self"),
    ],
    type_keywords: &[
        "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
        "f32", "f64", "bool", "char", "str", "String", "Vec", "Option", "Result", "Box",
    ],
    control_keywords: &[
        "if", "else", "match", "while", "for", "in", "loop", "break", "continue", "return",
    ],
    operators: &[
        Word::operator("=>"),
        Word::operator("::"),
        Word::operator(".."),
        Word::operator("=="),
        Word::operator("!="),
        Word::operator("<="),
        Word::operator(">="),
        Word::operator("&&"),
        Word::operator("||"),
        Word::operator("->"),
        Word::operator("+="),
        Word::operator("-="),
        Word::operator("+"),
        Word::operator("-"),
        Word::operator("*"),
        Word::operator("/"),
        Word::operator("%"),
        Word::operator("="),
        Word::operator("<"),
        Word::operator(">"),
        Word::operator("!"),
        Word::operator("&"),
        Word::operator("|"),
        Word::operator("^"),
        Word::operator("?"),
        Word::boolean("true"),
        Word::boolean("false"),
    ],
    line_comment: Some("//"),
    block_comment: Some(("/*", "*/")),
    flags: SyntaxFlags::all(),
};

static PYTHON: Syntax = Syntax {
    name: "python",
    filematch: &[".py"],
    keywords: &[
        Word::keyword("def"),
        Word::keyword("class"),
        Word::keyword("import"),
        Word::keyword("from"),
        Word::keyword("as"),
        Word::keyword("with"),
        Word::keyword("lambda"),
        Word::keyword("global"),
        Word::keyword("nonlocal"),
        Word::keyword("pass"),
        Word::keyword("del"),
        Word::keyword("yield"),
        Word::keyword("async"),
        Word::keyword("await"),
    ],
    type_keywords: &["int", "float", "str", "bool", "list", "dict", "tuple", "set", "bytes", "object"],
    control_keywords: &[
        "if", "elif", "else", "while", "for", "in", "break", "continue", "return", "try",
        "except", "finally", "raise", "not", "and", "or", "is",
    ],
    operators: &[
        Word::operator("=="),
        Word::operator("!="),
        Word::operator("<="),
        Word::operator(">="),
        Word::operator("**"),
        Word::operator("//"),
        Word::operator("+="),
        Word::operator("-="),
        Word::operator("+"),
        Word::operator("-"),
        Word::operator("*"),
        Word::operator("/"),
        Word::operator("%"),
        Word::operator("="),
        Word::operator("<"),
        Word::operator(">"),
        Word::operator("&"),
        Word::operator("|"),
        Word::operator("^"),
        Word::operator("~"),
        Word::boolean("True"),
        Word::boolean("False"),
        Word::boolean("None"),
    ],
    line_comment: Some("#"),
    block_comment: None,
    flags: SyntaxFlags::NUMBERS.union(SyntaxFlags::STRINGS),
};

/// Every known language, in selection order.
pub static REGISTRY: [&Syntax; 3] = [&C, &RUST, &PYTHON];

/// The first descriptor whose `filematch` claims `filename`.
#[must_use]
pub fn select(filename: &str) -> Option<&'static Syntax> {
    REGISTRY.iter().copied().find(|s| s.matches(filename))
}

/// Look a descriptor up by its short name.
#[must_use]
pub fn find_by_name(name: &str) -> Option<&'static Syntax> {
    REGISTRY.iter().copied().find(|s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_by_extension() {
        assert_eq!(select("main.c").map(|s| s.name), Some("c"));
        assert_eq!(select("kiln.h").map(|s| s.name), Some("c"));
        assert_eq!(select("x.cpp").map(|s| s.name), Some("c"));
        assert_eq!(select("lib.rs").map(|s| s.name), Some("rust"));
        assert_eq!(select("tool.py").map(|s| s.name), Some("python"));
    }

    #[test]
    fn extension_must_match_exactly() {
        assert!(select("notes.txt").is_none());
        assert!(select("archive.c.bak").is_none());
        assert!(select("Makefile").is_none());
        assert!(select("x.cc").is_none());
    }

    #[test]
    fn substring_patterns() {
        static MAKE: Syntax = Syntax {
            name: "make",
            filematch: &["Makefile"],
            keywords: &[],
            type_keywords: &[],
            control_keywords: &[],
            operators: &[],
            line_comment: Some("#"),
            block_comment: None,
            flags: SyntaxFlags::empty(),
        };
        assert!(MAKE.matches("Makefile"));
        assert!(MAKE.matches("GNUMakefile.old"));
        assert!(!MAKE.matches("makefile"));
    }

    #[test]
    fn words_come_in_list_order() {
        let c = find_by_name("c").unwrap();
        let words: Vec<_> = c.words().collect();
        assert_eq!(words[0], ("struct", Tag::Keyword));
        assert!(words.contains(&("int", Tag::Type)));
        assert!(words.contains(&("size_t", Tag::Type)));
        assert_eq!(words.last(), Some(&("goto", Tag::Control)));
    }

    #[test]
    fn operators_list_longer_entries_first() {
        for syntax in REGISTRY {
            for (i, op) in syntax.operators.iter().enumerate() {
                for later in &syntax.operators[i + 1..] {
                    assert!(
                        !later.text.starts_with(op.text) || later.text == op.text,
                        "{}: {:?} shadows {:?}",
                        syntax.name,
                        op.text,
                        later.text
                    );
                }
            }
        }
    }

    #[test]
    fn operator_tags_are_operator_or_boolean() {
        for syntax in REGISTRY {
            assert!(
                syntax
                    .operators
                    .iter()
                    .all(|w| matches!(w.tag, Tag::Operator | Tag::Boolean))
            );
            assert!(
                syntax
                    .keywords
                    .iter()
                    .all(|w| matches!(w.tag, Tag::Keyword | Tag::Type))
            );
        }
    }

    #[test]
    fn python_has_no_block_comment() {
        let py = find_by_name("python").unwrap();
        assert!(py.block_comment.is_none());
        assert!(!py.flags.contains(SyntaxFlags::MULTILINE_COMMENTS));
    }
}
