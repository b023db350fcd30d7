//! The normalized regular expression tree.
//!
//! Concatenation is threaded through the `next` field of every node, making
//! a tree a right-leaning chain of combinators. An absent tree denotes the
//! empty match.

use lexer_runtime::CodePoint;
use std::fmt::{self, Display, Write};

pub type Regexp = Option<Box<RegexpTree>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexpTree {
    /// Matches one code point in `[min, max]`, then `next`.
    Single {
        min: CodePoint,
        max: CodePoint,
        next: Regexp,
    },
    /// Matches `first` or `second`, then `next`. An absent branch matches
    /// the empty string.
    Union {
        first: Regexp,
        second: Regexp,
        next: Regexp,
    },
    /// Matches zero or more repeats of `pattern`, then `next`.
    Kleene { pattern: Regexp, next: Regexp },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Single,
    Union,
    Kleene,
}

impl RegexpTree {
    pub fn single(min: CodePoint, max: CodePoint, next: Regexp) -> Regexp {
        Some(Box::new(Self::Single { min, max, next }))
    }

    /// Constructs a union, collapsing to `next` when both branches are
    /// absent.
    pub fn union(first: Regexp, second: Regexp, next: Regexp) -> Regexp {
        match (&first, &second) {
            (None, None) => next,
            _ => Some(Box::new(Self::Union {
                first,
                second,
                next,
            })),
        }
    }

    pub fn kleene(pattern: Regexp, next: Regexp) -> Regexp {
        Some(Box::new(Self::Kleene { pattern, next }))
    }

    pub fn tag(&self) -> Tag {
        match self {
            Self::Single { .. } => Tag::Single,
            Self::Union { .. } => Tag::Union,
            Self::Kleene { .. } => Tag::Kleene,
        }
    }

    pub fn next(&self) -> &Regexp {
        match self {
            Self::Single { next, .. } | Self::Union { next, .. } | Self::Kleene { next, .. } => {
                next
            }
        }
    }

    pub fn next_mut(&mut self) -> &mut Regexp {
        match self {
            Self::Single { next, .. } | Self::Union { next, .. } | Self::Kleene { next, .. } => {
                next
            }
        }
    }
}

impl Drop for RegexpTree {
    // unlinks the continuation chain one node at a time, keeping drop depth
    // independent of the chain length.
    fn drop(&mut self) {
        let mut cursor = self.next_mut().take();

        while let Some(mut node) = cursor {
            cursor = node.next_mut().take();
        }
    }
}

/// Returns the tags of every node in the tree in preorder, visiting a
/// node's branches before its continuation.
pub fn tags(regexp: &Regexp) -> Vec<Tag> {
    let mut tags = vec![];
    collect_tags(regexp, &mut tags);
    tags
}

fn collect_tags(regexp: &Regexp, tags: &mut Vec<Tag>) {
    let mut cursor = regexp;

    while let Some(node) = cursor.as_deref() {
        tags.push(node.tag());

        match node {
            RegexpTree::Single { .. } => (),
            RegexpTree::Union { first, second, .. } => {
                collect_tags(first, tags);
                collect_tags(second, tags);
            }
            RegexpTree::Kleene { pattern, .. } => collect_tags(pattern, tags),
        }

        cursor = node.next();
    }
}

/// Renders a tree as a pattern string that tokenizes back into a tree with
/// the same shape.
///
/// ```
/// use lexer_compiler::tree::{to_pattern, RegexpTree};
///
/// let tree = RegexpTree::kleene(
///     RegexpTree::single('a' as u32, 'c' as u32, None),
///     RegexpTree::single('.' as u32, '.' as u32, None),
/// );
///
/// assert_eq!("([a-c])*\\.", to_pattern(&tree));
/// ```
pub fn to_pattern(regexp: &Regexp) -> String {
    let mut out = String::new();
    // writing into a string never fails.
    let _ = write_chain(&mut out, regexp, true);
    out
}

impl Display for RegexpTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self, true)?;
        write_chain(f, self.next(), false)
    }
}

/// Writes a chain of nodes. `standalone` marks a chain that is not the
/// continuation of a preceding node, and so may print an unwrapped
/// alternation.
fn write_chain<W: Write>(out: &mut W, regexp: &Regexp, standalone: bool) -> fmt::Result {
    let mut cursor = regexp;
    let mut standalone = standalone;

    while let Some(node) = cursor.as_deref() {
        write_node(out, node, standalone)?;
        standalone = false;
        cursor = node.next();
    }

    Ok(())
}

/// Writes a single node, excluding its continuation.
fn write_node<W: Write>(out: &mut W, node: &RegexpTree, standalone: bool) -> fmt::Result {
    match node {
        RegexpTree::Single { min, max, .. } if min == max => write_symbol(out, *min)?,
        RegexpTree::Single { min, max, .. } => {
            out.write_char('[')?;
            write_symbol(out, *min)?;
            out.write_char('-')?;
            write_symbol(out, *max)?;
            out.write_char(']')?;
        }
        RegexpTree::Union {
            first,
            second,
            next,
        } if first.is_some() && second.is_some() => {
            let wrap = !standalone || next.is_some();
            if wrap {
                out.write_char('(')?;
            }
            out.write_char('(')?;
            write_chain(out, first, true)?;
            out.write_str(")|(")?;
            write_chain(out, second, true)?;
            out.write_char(')')?;
            if wrap {
                out.write_char(')')?;
            }
        }
        RegexpTree::Union { first, second, .. } => {
            out.write_char('(')?;
            write_chain(out, first, true)?;
            write_chain(out, second, true)?;
            out.write_str(")?")?;
        }
        RegexpTree::Kleene { pattern, .. } => {
            out.write_char('(')?;
            write_chain(out, pattern, true)?;
            out.write_str(")*")?;
        }
    }

    Ok(())
}

fn write_symbol<W: Write>(out: &mut W, value: CodePoint) -> fmt::Result {
    match char::from_u32(value) {
        Some('\n') => out.write_str("\\n"),
        Some('\t') => out.write_str("\\t"),
        Some('\r') => out.write_str("\\r"),
        Some(c) if "()[]{}|*+?.^$\\-".contains(c) => write!(out, "\\{}", c),
        Some(c) => out.write_char(c),
        None => write!(out, "\\u{{{:x}}}", value),
    }
}
