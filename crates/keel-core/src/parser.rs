//! Sentence parser
//!
//! Assembles a token sequence into a single [`Node`] tree in three steps:
//!
//! 1. Segmentation: scanning from the last word backwards, the longest
//!    phrase matching a keyword, a field or a compiled expression becomes an
//!    item; unmatched words become literal values.
//! 2. Normalization: rewrites that give every operator a left and a right
//!    neighbour (`set x v` becomes `x set v`, `x has changed` gains a
//!    placeholder on its right, and so on).
//! 3. Reduction: keywords are applied from the most tightly binding to the
//!    loosest, each operator taking its two neighbours as children, until a
//!    single root is left.

use crate::keyword::KEYWORDS;
use crate::tokenizer::tokenize;
use crate::{GrammarError, Keyword, Node, Value};
use indexmap::IndexMap;
use std::collections::VecDeque;
use tracing::trace;

/// Upper bound on reduction passes before a sentence is rejected
pub const MAX_REDUCTION_PASSES: usize = 100;

/// Normalized field name to declared field name
pub type FieldNames = IndexMap<String, String>;

/// Normalized expression name to compiled tree
pub type Expressions = IndexMap<String, Node>;

/// A slot in the working sequence
#[derive(Debug, Clone)]
enum Item {
    /// A finished tree: a leaf, a reused expression, or an earlier reduction
    Operand(Node),
    /// A tree reduced during the running pass
    Reduced(Node),
    /// An operator still waiting for its operands
    Pending(Keyword),
    /// A reused `set`/`inc`/`has changed` tree fenced in by placeholders
    Bracketed(Node),
    /// Shape placeholder
    Placeholder,
}

impl Item {
    fn kind(&self) -> String {
        match self {
            Item::Operand(node) | Item::Reduced(node) | Item::Bracketed(node) => {
                node.kind().to_string()
            }
            Item::Pending(keyword) => keyword.phrase().to_string(),
            Item::Placeholder => "placeholder".to_string(),
        }
    }

    fn settle(self) -> Item {
        match self {
            Item::Reduced(node) => Item::Operand(node),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Parser over a fixed vocabulary of fields and expressions
pub struct Parser<'a> {
    fields: &'a FieldNames,
    expressions: &'a Expressions,
}

impl<'a> Parser<'a> {
    /// Create a parser for the given fields and compiled expressions
    pub fn new(fields: &'a FieldNames, expressions: &'a Expressions) -> Self {
        Self {
            fields,
            expressions,
        }
    }

    /// Tokenize and parse a sentence
    pub fn parse(&self, sentence: &str) -> Result<Node, GrammarError> {
        self.parse_tokens(&tokenize(sentence))
    }

    /// Parse an already tokenized sentence
    pub fn parse_tokens(&self, tokens: &[String]) -> Result<Node, GrammarError> {
        if tokens.is_empty() {
            return Err(GrammarError::Empty);
        }

        let items = self.segment(tokens);
        let items = normalize(items);
        trace!(
            items = ?items.iter().map(Item::kind).collect::<Vec<_>>(),
            "normalized sentence"
        );
        reduce(items)
    }

    /// Longest-match segmentation, scanning from the end
    fn segment(&self, tokens: &[String]) -> Vec<Item> {
        let mut items = VecDeque::new();
        let mut buffer: VecDeque<&str> = VecDeque::new();

        for token in tokens.iter().rev() {
            buffer.push_front(token);

            for len in (1..=buffer.len()).rev() {
                let phrase = join(buffer.iter().take(len));
                let Some(item) = self.lookup(&phrase) else {
                    continue;
                };

                if len < buffer.len() {
                    let rest = join(buffer.iter().skip(len));
                    items.push_front(Item::Operand(Node::Value(Value::from_literal(&rest))));
                }
                items.push_front(item);
                buffer.clear();
                break;
            }
        }

        if !buffer.is_empty() {
            let rest = join(buffer.iter());
            items.push_front(Item::Operand(Node::Value(Value::from_literal(&rest))));
        }

        items.into()
    }

    /// Keywords win over fields, fields over expressions
    fn lookup(&self, phrase: &str) -> Option<Item> {
        if let Ok(keyword) = phrase.parse::<Keyword>() {
            return Some(Item::Pending(keyword));
        }
        if let Some(declared) = self.fields.get(phrase) {
            return Some(Item::Operand(Node::Field(declared.clone())));
        }
        self.expressions
            .get(phrase)
            .map(|tree| Item::Operand(tree.clone()))
    }
}

fn join<'w>(words: impl Iterator<Item = &'w &'w str>) -> String {
    words.copied().collect::<Vec<_>>().join(" ")
}

/// Give every operator a left and a right neighbour
fn normalize(items: Vec<Item>) -> Vec<Item> {
    // `x has changed` → `x has changed _`
    let mut items: Vec<Item> = items
        .into_iter()
        .flat_map(|item| {
            let placeholder = matches!(
                item,
                Item::Pending(Keyword::HasChanged | Keyword::HasNotChanged)
            );
            std::iter::once(item).chain(placeholder.then_some(Item::Placeholder))
        })
        .collect();

    // `set x v` → `x set v`
    let mut i = 0;
    while i + 1 < items.len() {
        if matches!(items[i], Item::Pending(Keyword::Set)) {
            items.swap(i, i + 1);
            i += 2;
        } else {
            i += 1;
        }
    }

    // `inc x` → `x inc _`
    let mut i = 0;
    while i + 1 < items.len() {
        if matches!(items[i], Item::Pending(Keyword::Inc)) {
            items.swap(i, i + 1);
            items.insert(i + 2, Item::Placeholder);
            i += 3;
        } else {
            i += 1;
        }
    }

    // Reused effect and change trees are fenced so they keep their own operands
    items
        .into_iter()
        .flat_map(|item| match item {
            Item::Operand(node) if needs_brackets(&node) => vec![
                Item::Placeholder,
                Item::Bracketed(node),
                Item::Placeholder,
            ],
            other => vec![other],
        })
        .collect()
}

fn needs_brackets(node: &Node) -> bool {
    matches!(
        node.keyword(),
        Some(Keyword::Set | Keyword::Inc | Keyword::HasChanged | Keyword::HasNotChanged)
    )
}

/// Reduce the normalized sequence to a single root
fn reduce(mut items: Vec<Item>) -> Result<Node, GrammarError> {
    let mut schedule: Vec<Keyword> = KEYWORDS.iter().map(|(keyword, _)| *keyword).collect();
    let mut passes = 0;

    while items.len() > 1 {
        passes += 1;
        if passes > MAX_REDUCTION_PASSES {
            return Err(GrammarError::Unresolved {
                kinds: items.iter().map(Item::kind).collect(),
                passes: MAX_REDUCTION_PASSES,
            });
        }
        if let Some(keyword) = schedule.pop() {
            items = reduce_pass(items, keyword)?;
        }
    }

    match items.pop() {
        Some(Item::Operand(node) | Item::Bracketed(node) | Item::Reduced(node)) => Ok(node),
        Some(Item::Pending(keyword)) => Err(GrammarError::MissingOperand {
            keyword: keyword.phrase(),
        }),
        Some(Item::Placeholder) | None => Err(GrammarError::Empty),
    }
}

enum Action {
    Reduce,
    Unfence,
    Skip,
}

/// Apply one keyword to every pending operator of that keyword, left to right
fn reduce_pass(mut items: Vec<Item>, keyword: Keyword) -> Result<Vec<Item>, GrammarError> {
    let mut i = 0;
    while i < items.len() {
        let action = match &items[i] {
            Item::Pending(k) if *k == keyword => Action::Reduce,
            Item::Bracketed(node) if node.keyword() == Some(keyword) => Action::Unfence,
            _ => Action::Skip,
        };

        match action {
            Action::Reduce => {
                if i == 0 || i + 1 >= items.len() {
                    return Err(GrammarError::MissingOperand {
                        keyword: keyword.phrase(),
                    });
                }
                let right = items.remove(i + 1);
                items.remove(i);
                let left = items.remove(i - 1);
                let node = build(keyword, left, right)?;
                items.insert(i - 1, Item::Reduced(node));
            }
            Action::Unfence => {
                let fenced = i > 0
                    && matches!(items[i - 1], Item::Placeholder)
                    && matches!(items.get(i + 1), Some(Item::Placeholder));
                if !fenced {
                    return Err(GrammarError::MisplacedPlaceholder {
                        keyword: keyword.phrase(),
                    });
                }
                items.remove(i + 1);
                items.remove(i - 1);
                let item = std::mem::replace(&mut items[i - 1], Item::Placeholder);
                items[i - 1] = match item {
                    Item::Bracketed(node) => Item::Operand(node),
                    other => other,
                };
            }
            Action::Skip => i += 1,
        }
    }

    Ok(items.into_iter().map(Item::settle).collect())
}

fn build(keyword: Keyword, left: Item, right: Item) -> Result<Node, GrammarError> {
    let left = operand(keyword, left, Side::Left)?;
    let right = operand(keyword, right, Side::Right)?;

    if keyword.is_assignment() && !matches!(left, Node::Field(_)) {
        return Err(GrammarError::NotAssignable {
            keyword: keyword.phrase(),
            found: left.kind().to_string(),
        });
    }

    Ok(Node::binary(keyword, left, right))
}

fn operand(keyword: Keyword, item: Item, side: Side) -> Result<Node, GrammarError> {
    match item {
        Item::Operand(node) => Ok(node),
        Item::Reduced(node) if keyword.is_associative() => Ok(node),
        Item::Reduced(_) => Err(GrammarError::Ambiguous {
            keyword: keyword.phrase(),
        }),
        Item::Placeholder if side == Side::Right && keyword.takes_placeholder() => Ok(Node::NoOp),
        Item::Placeholder => Err(GrammarError::MisplacedPlaceholder {
            keyword: keyword.phrase(),
        }),
        Item::Pending(_) | Item::Bracketed(_) => Err(GrammarError::MissingOperand {
            keyword: keyword.phrase(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Comparison;
    use crate::tokenizer::normalize_name;

    fn field_names(names: &[&str]) -> FieldNames {
        names
            .iter()
            .map(|n| (normalize_name(n), n.to_string()))
            .collect()
    }

    fn parse(sentence: &str, fields: &[&str]) -> Result<Node, GrammarError> {
        let fields = field_names(fields);
        let expressions = Expressions::new();
        Parser::new(&fields, &expressions).parse(sentence)
    }

    fn bin(keyword: Keyword, left: Node, right: Node) -> Node {
        Node::binary(keyword, left, right)
    }

    #[test]
    fn test_simple_comparison() {
        let tree = parse("foo is true", &["foo"]).unwrap();
        assert_eq!(
            tree,
            bin(Keyword::Is, Node::field("foo"), Node::value(true))
        );
    }

    #[test]
    fn test_longest_keyword_wins() {
        let tree = parse("foo is not now 3", &["foo"]).unwrap();
        assert_eq!(
            tree,
            bin(Keyword::IsNotNow, Node::field("foo"), Node::value(3i64))
        );

        let tree = parse("foo has not changed", &["foo"]).unwrap();
        assert_eq!(
            tree,
            bin(Keyword::HasNotChanged, Node::field("foo"), Node::NoOp)
        );
    }

    #[test]
    fn test_rule_with_then_and_set() {
        let tree = parse("if foo is true then set bar true", &["foo", "bar"]).unwrap();
        assert_eq!(
            tree,
            bin(
                Keyword::Then,
                bin(Keyword::Is, Node::field("foo"), Node::value(true)),
                bin(Keyword::Set, Node::field("bar"), Node::value(true)),
            )
        );
    }

    #[test]
    fn test_and_binds_looser_than_is() {
        let tree = parse("foo is true and bar is true", &["foo", "bar"]).unwrap();
        assert_eq!(
            tree,
            bin(
                Keyword::And,
                bin(Keyword::Is, Node::field("foo"), Node::value(true)),
                bin(Keyword::Is, Node::field("bar"), Node::value(true)),
            )
        );
    }

    #[test]
    fn test_or_binds_looser_than_and() {
        let tree = parse("a is 1 and b is 2 or c is 3", &["a", "b", "c"]).unwrap();
        match &tree {
            Node::Compare(Comparison::Or, left, _) => {
                assert_eq!(left.keyword(), Some(Keyword::And))
            }
            other => panic!("expected an or at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_multi_word_literal() {
        let tree = parse("set alert try again", &["alert"]).unwrap();
        assert_eq!(
            tree,
            bin(Keyword::Set, Node::field("alert"), Node::value("try again"))
        );
    }

    #[test]
    fn test_leading_literal() {
        let tree = parse("login is page", &["page"]).unwrap();
        assert_eq!(
            tree,
            bin(Keyword::Is, Node::value("login"), Node::field("page"))
        );
    }

    #[test]
    fn test_inc_gets_placeholder() {
        let tree = parse("if go is true then inc count", &["go", "count"]).unwrap();
        assert_eq!(
            tree,
            bin(
                Keyword::Then,
                bin(Keyword::Is, Node::field("go"), Node::value(true)),
                bin(Keyword::Inc, Node::field("count"), Node::NoOp),
            )
        );
    }

    #[test]
    fn test_chained_effects() {
        let tree = parse("set a 1 and set b 2 and set c 3", &["a", "b", "c"]).unwrap();
        assert!(tree.is_effect());
        assert_eq!(tree.keyword(), Some(Keyword::And));
    }

    #[test]
    fn test_names_are_case_folded() {
        let tree = parse("If EmailValid IS true", &["emailValid"]).unwrap();
        assert_eq!(
            tree,
            bin(Keyword::Is, Node::field("emailValid"), Node::value(true))
        );
    }

    #[test]
    fn test_expression_reuse() {
        let fields = field_names(&["page", "alert"]);
        let mut expressions = Expressions::new();
        let rejected = Parser::new(&fields, &expressions)
            .parse("page was loading and page is login")
            .unwrap();
        expressions.insert("rejected".to_string(), rejected.clone());

        let tree = Parser::new(&fields, &expressions)
            .parse("if rejected then set alert try_again")
            .unwrap();
        assert_eq!(
            tree,
            bin(
                Keyword::Then,
                rejected,
                bin(Keyword::Set, Node::field("alert"), Node::value("try_again")),
            )
        );
    }

    #[test]
    fn test_reused_change_tree_keeps_its_operands() {
        let fields = field_names(&["email", "password", "dirty"]);
        let mut expressions = Expressions::new();
        let email_changed = Parser::new(&fields, &expressions)
            .parse("email has changed")
            .unwrap();
        expressions.insert("email_changed".to_string(), email_changed.clone());

        let tree = Parser::new(&fields, &expressions)
            .parse("if email_changed and password is null then set dirty true")
            .unwrap();
        assert_eq!(
            tree,
            bin(
                Keyword::Then,
                bin(
                    Keyword::And,
                    email_changed,
                    bin(Keyword::Is, Node::field("password"), Node::value(Value::Null)),
                ),
                bin(Keyword::Set, Node::field("dirty"), Node::value(true)),
            )
        );
    }

    #[test]
    fn test_reused_expression_on_its_own() {
        let fields = field_names(&["count"]);
        let mut expressions = Expressions::new();
        let bump = Parser::new(&fields, &expressions).parse("inc count").unwrap();
        expressions.insert("bump".to_string(), bump.clone());

        let tree = Parser::new(&fields, &expressions).parse("bump").unwrap();
        assert_eq!(tree, bump);
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let sentence = "if a is now true and b was 2 then set c 3 and inc d";
        let fields = ["a", "b", "c", "d"];
        assert_eq!(parse(sentence, &fields), parse(sentence, &fields));
    }

    #[test]
    fn test_two_thens_are_ambiguous() {
        let result = parse(
            "if a is true then set b true then set c true",
            &["a", "b", "c"],
        );
        assert_eq!(result, Err(GrammarError::Ambiguous { keyword: "then" }));
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(
            parse("foo is", &["foo"]),
            Err(GrammarError::MissingOperand { keyword: "is" })
        );
        assert_eq!(
            parse("then set foo true", &["foo"]),
            Err(GrammarError::MissingOperand { keyword: "then" })
        );
    }

    #[test]
    fn test_inc_requires_a_field() {
        assert_eq!(
            parse("inc 5", &["foo"]),
            Err(GrammarError::NotAssignable {
                keyword: "inc",
                found: "value".to_string(),
            })
        );
    }

    #[test]
    fn test_operands_without_operator_are_unresolved() {
        let result = parse("foo bar", &["foo", "bar"]);
        assert_eq!(
            result,
            Err(GrammarError::Unresolved {
                kinds: vec!["field".to_string(), "field".to_string()],
                passes: MAX_REDUCTION_PASSES,
            })
        );
    }

    #[test]
    fn test_empty_sentence() {
        assert_eq!(parse("if", &[]), Err(GrammarError::Empty));
        assert_eq!(parse("  ", &[]), Err(GrammarError::Empty));
    }
}
