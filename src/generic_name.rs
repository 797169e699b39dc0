//! Parsing and rewriting of (possibly nested) generic type names.
//!
//! `Dictionary<string, List<int>>` is parsed into a small tree stored in an
//! arena. Each node's base name can then be rewritten (built-in alias to
//! fully qualified name, or any caller supplied mapping) and the tree is
//! serialized back, optionally with the `` `N `` arity suffix used by type
//! identities.

use crate::error::QueryParseError;

/// Built-in short names and the fully qualified names they stand for.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("bool", "System.Boolean"),
    ("byte", "System.Byte"),
    ("sbyte", "System.SByte"),
    ("char", "System.Char"),
    ("decimal", "System.Decimal"),
    ("double", "System.Double"),
    ("float", "System.Single"),
    ("int", "System.Int32"),
    ("uint", "System.UInt32"),
    ("long", "System.Int64"),
    ("ulong", "System.UInt64"),
    ("short", "System.Int16"),
    ("ushort", "System.UInt16"),
    ("nint", "System.IntPtr"),
    ("nuint", "System.UIntPtr"),
    ("object", "System.Object"),
    ("string", "System.String"),
    ("void", "System.Void"),
];

fn alias_to_full(name: &str) -> Option<&'static str> {
    BUILTIN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, full)| *full)
}

fn full_to_alias(name: &str) -> Option<&'static str> {
    BUILTIN_ALIASES
        .iter()
        .find(|(_, full)| *full == name)
        .map(|(alias, _)| *alias)
}

/// Applies `lookup` to the part of `name` before any array (`[]`) or by-ref
/// (`&`) decoration, keeping the decoration.
fn map_decorated(name: &str, lookup: fn(&str) -> Option<&'static str>) -> String {
    let split = name.find(['[', '&']).unwrap_or(name.len());
    let (base, decoration) = name.split_at(split);
    match lookup(base) {
        Some(mapped) => format!("{mapped}{decoration}"),
        None => name.to_string(),
    }
}

/// Maps a built-in alias (`int`, `string[]`) to its qualified name.
pub fn to_clr_name(name: &str) -> String {
    map_decorated(name, alias_to_full)
}

/// Maps a qualified built-in name (`System.Int32`) to its alias.
pub fn to_alias_name(name: &str) -> String {
    map_decorated(name, full_to_alias)
}

fn strip_arity(name: &str) -> &str {
    match name.rfind('`') {
        Some(idx) if name[idx + 1..].chars().all(|c| c.is_ascii_digit()) => &name[..idx],
        _ => name,
    }
}

/// One node of a parsed generic type name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericTypeNode {
    pub name: String,
    /// Decoration following the closing `>` (`[]` in `List<int>[]`).
    pub suffix: String,
    /// Arena indices of the generic arguments, in order.
    pub arguments: Vec<usize>,
    pub parent: Option<usize>,
    closed: bool,
}

/// Arena-backed tree of a generic type name. Node `0` is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericTypeTree {
    nodes: Vec<GenericTypeNode>,
}

impl GenericTypeTree {
    pub const ROOT: usize = 0;

    /// Single left-to-right scan; `<` descends, `,` starts a sibling, `>`
    /// climbs back to the parent through its index.
    pub fn parse(input: &str) -> Result<Self, QueryParseError> {
        let mut tree = Self {
            nodes: vec![GenericTypeNode::default()],
        };
        let mut current = Self::ROOT;
        let mut depth = 0usize;
        let mut square_depth = 0usize;

        for (pos, ch) in input.char_indices() {
            match ch {
                '[' => {
                    square_depth += 1;
                    tree.push_char(current, ch);
                }
                ']' => {
                    square_depth = square_depth.saturating_sub(1);
                    tree.push_char(current, ch);
                }
                ',' if square_depth > 0 => tree.push_char(current, ch),
                '<' => {
                    if tree.nodes[current].closed || tree.nodes[current].name.is_empty() {
                        return Err(QueryParseError::new(input, pos, "unexpected '<'"));
                    }
                    current = tree.push_child(current);
                    depth += 1;
                }
                ',' => {
                    let parent = match tree.nodes[current].parent {
                        Some(parent) if depth > 0 => parent,
                        _ => {
                            return Err(QueryParseError::new(
                                input,
                                pos,
                                "',' outside of a generic argument list",
                            ));
                        }
                    };
                    if tree.nodes[current].name.is_empty() {
                        return Err(QueryParseError::new(input, pos, "empty generic argument"));
                    }
                    current = tree.push_child(parent);
                }
                '>' => {
                    let parent = match tree.nodes[current].parent {
                        Some(parent) if depth > 0 => parent,
                        _ => return Err(QueryParseError::new(input, pos, "unbalanced '>'")),
                    };
                    if tree.nodes[current].name.is_empty() {
                        return Err(QueryParseError::new(input, pos, "empty generic argument"));
                    }
                    tree.nodes[parent].closed = true;
                    current = parent;
                    depth -= 1;
                }
                c if c.is_whitespace() => {}
                c => tree.push_char(current, c),
            }
        }

        if depth != 0 {
            return Err(QueryParseError::new(input, input.len(), "unclosed '<'"));
        }
        if tree.nodes[Self::ROOT].name.is_empty() {
            return Err(QueryParseError::new(input, 0, "empty type name"));
        }
        Ok(tree)
    }

    fn push_child(&mut self, parent: usize) -> usize {
        let id = self.nodes.len();
        self.nodes.push(GenericTypeNode {
            parent: Some(parent),
            ..Default::default()
        });
        self.nodes[parent].arguments.push(id);
        id
    }

    fn push_char(&mut self, id: usize, ch: char) {
        let node = &mut self.nodes[id];
        if node.closed {
            node.suffix.push(ch);
        } else {
            node.name.push(ch);
        }
    }

    pub fn root(&self) -> &GenericTypeNode {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, id: usize) -> &GenericTypeNode {
        &self.nodes[id]
    }

    pub fn arguments(&self, id: usize) -> impl Iterator<Item = &GenericTypeNode> {
        self.nodes[id].arguments.iter().map(|&arg| &self.nodes[arg])
    }

    /// Number of generic arguments on the root.
    pub fn arity(&self) -> usize {
        self.root().arguments.len()
    }

    /// Rewrites the base name of every node.
    pub fn rename<F>(&mut self, rename: F)
    where
        F: Fn(&str) -> String,
    {
        for node in &mut self.nodes {
            node.name = rename(&node.name);
        }
    }

    /// Renders the tree back to text. With `with_arity`, nodes carrying `N`
    /// arguments get a `` `N `` suffix unless the name already ends in one.
    pub fn serialize(&self, with_arity: bool) -> String {
        let mut out = String::new();
        self.write_node(Self::ROOT, with_arity, &mut out);
        out
    }

    fn write_node(&self, id: usize, with_arity: bool, out: &mut String) {
        let node = &self.nodes[id];
        out.push_str(&node.name);
        if !node.arguments.is_empty() {
            let arity = format!("`{}", node.arguments.len());
            if with_arity && !node.name.ends_with(&arity) {
                out.push_str(&arity);
            }
            out.push('<');
            for (i, &arg) in node.arguments.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                self.write_node(arg, with_arity, out);
            }
            out.push('>');
        }
        out.push_str(&node.suffix);
    }
}

/// Normalizes a type name to the form used for identity comparison:
/// aliases become qualified names and generic nodes get their arity suffix.
///
/// `List<int>` becomes ``List`1<System.Int32>``. Applying it twice is a no-op.
pub fn convert_clr_name(name: &str) -> Result<String, QueryParseError> {
    let mut tree = GenericTypeTree::parse(name)?;
    tree.rename(to_clr_name);
    Ok(tree.serialize(true))
}

/// Reverse of [`convert_clr_name`], for display: aliases are restored and
/// arity suffixes dropped.
pub fn convert_to_short_name(name: &str) -> Result<String, QueryParseError> {
    let mut tree = GenericTypeTree::parse(name)?;
    tree.rename(|n| to_alias_name(strip_arity(n)));
    Ok(tree.serialize(false))
}

/// Applies `rename` to every base name of a generic type name, keeping the
/// argument structure intact.
pub fn transform_generic_names<F>(name: &str, rename: F) -> Result<String, QueryParseError>
where
    F: Fn(&str) -> String,
{
    let mut tree = GenericTypeTree::parse(name)?;
    tree.rename(rename);
    Ok(tree.serialize(false))
}

/// Splits on `separator` where it is not nested inside `<...>` or `[...]`.
/// Pieces are trimmed.
pub fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut angle = 0usize;
    let mut square = 0usize;
    let mut start = 0;
    for (pos, ch) in input.char_indices() {
        match ch {
            '<' => angle += 1,
            '>' => angle = angle.saturating_sub(1),
            '[' => square += 1,
            ']' => square = square.saturating_sub(1),
            c if c == separator && angle == 0 && square == 0 => {
                pieces.push(input[start..pos].trim());
                start = pos + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(input[start..].trim());
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_tree() {
        let tree = GenericTypeTree::parse("Dictionary<string, List<int>>").unwrap();
        assert_eq!(tree.root().name, "Dictionary");
        assert_eq!(tree.arity(), 2);
        let args: Vec<&str> = tree
            .arguments(GenericTypeTree::ROOT)
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(args, vec!["string", "List"]);
        let list_id = tree.root().arguments[1];
        assert_eq!(tree.node(list_id).parent, Some(GenericTypeTree::ROOT));
        assert_eq!(tree.arguments(list_id).next().unwrap().name, "int");
    }

    #[test]
    fn test_convert_clr_name() {
        assert_eq!(convert_clr_name("List<int>").unwrap(), "List`1<System.Int32>");
        assert_eq!(
            convert_clr_name("Dictionary<string, List<bool>>").unwrap(),
            "Dictionary`2<System.String,List`1<System.Boolean>>"
        );
        assert_eq!(convert_clr_name("void").unwrap(), "System.Void");
        assert_eq!(convert_clr_name("Widget").unwrap(), "Widget");
        assert_eq!(convert_clr_name("int[]").unwrap(), "System.Int32[]");
        assert_eq!(convert_clr_name("List<int>[]").unwrap(), "List`1<System.Int32>[]");
    }

    #[test]
    fn test_convert_clr_name_is_idempotent() {
        for name in ["List<int>", "Dictionary<string, List<int>>", "Func<T, bool>", "*"] {
            let once = convert_clr_name(name).unwrap();
            let twice = convert_clr_name(&once).unwrap();
            assert_eq!(once, twice, "not idempotent for {name}");
        }
    }

    #[test]
    fn test_convert_to_short_name() {
        assert_eq!(
            convert_to_short_name("System.Collections.Generic.List`1<System.Int32>").unwrap(),
            "System.Collections.Generic.List<int>"
        );
        assert_eq!(convert_to_short_name("System.String[]").unwrap(), "string[]");
    }

    #[test]
    fn test_transform_generic_names() {
        let renamed = transform_generic_names("Map<Key, Seq<Value>>", |n| n.to_uppercase());
        let renamed = renamed.unwrap();
        assert_eq!(renamed, "MAP<KEY,SEQ<VALUE>>");
    }

    #[test]
    fn test_unbalanced_brackets_are_errors() {
        let err = GenericTypeTree::parse("List<int").unwrap_err();
        assert_eq!(err.position_hint, 8);
        let err = GenericTypeTree::parse("List<int>>").unwrap_err();
        assert_eq!(err.position_hint, 9);
        assert!(GenericTypeTree::parse("List<>").is_err());
        assert!(GenericTypeTree::parse("a,b").is_err());
        assert!(GenericTypeTree::parse("").is_err());
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("Dictionary<int, string> map, int count", ','),
            vec!["Dictionary<int, string> map", "int count"]
        );
        assert_eq!(split_top_level("int[,] grid", ','), vec!["int[,] grid"]);
        assert_eq!(split_top_level("", ','), vec![""]);
    }
}
