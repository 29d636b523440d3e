//! Expression trees and their interpreter
//!
//! Trees are built by the parser from sentences and evaluated against a
//! [`Scope`], which is either the current state or its `previous()`
//! projection.

use crate::{Error, Keyword, Result, Value, ValueMap};

/// Binary comparisons shared by `is`-style and `was`-style nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Strict equality
    Is,
    /// Strict inequality
    IsNot,
    /// Numeric `>`
    GreaterThan,
    /// Numeric `<`
    LessThan,
    /// Logical or
    Or,
}

impl Comparison {
    /// Apply the comparison to two evaluated operands
    pub fn apply(self, left: &Value, right: &Value) -> bool {
        match self {
            Comparison::Is => left == right,
            Comparison::IsNot => left != right,
            Comparison::GreaterThan => ordering(left, right).is_some_and(|o| o.is_gt()),
            Comparison::LessThan => ordering(left, right).is_some_and(|o| o.is_lt()),
            Comparison::Or => left.is_truthy() || right.is_truthy(),
        }
    }
}

/// Strings order among themselves; everything else orders by number
fn ordering(left: &Value, right: &Value) -> Option<std::cmp::Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => Some(left.as_number()?.cmp(&right.as_number()?)),
    }
}

/// A compiled expression tree
///
/// Every non-leaf variant owns exactly two children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    // === Leaves ===
    /// A literal value
    Value(Value),
    /// Read a field
    Field(String),
    /// Shape placeholder; never evaluated by a well-formed parent
    NoOp,

    // === Predicates ===
    /// `is`, `is not`, `greater than`, `less than`, `or`
    Compare(Comparison, Box<Node>, Box<Node>),
    /// `and`
    And(Box<Node>, Box<Node>),
    /// `was` / `was not`: left read from the previous state
    Was(Comparison, Box<Node>, Box<Node>),
    /// Left just became equal to right
    IsNow(Box<Node>, Box<Node>),
    /// Left just stopped being equal to right
    IsNotNow(Box<Node>, Box<Node>),
    /// Left differs from its previous value
    HasChanged(Box<Node>, Box<Node>),
    /// Left equals its previous value
    HasNotChanged(Box<Node>, Box<Node>),

    // === Effects ===
    /// Write right into the field on the left
    Set(Box<Node>, Box<Node>),
    /// Add one to the field on the left
    Inc(Box<Node>, Box<Node>),
    /// Evaluate right only when left is truthy
    Then(Box<Node>, Box<Node>),
}

/// Which state a scope reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The live field mapping
    Current,
    /// The state before the running update
    Previous,
}

/// Evaluation context for trees
///
/// Reads follow the scope's [`View`]; writes always land in the live mapping.
pub struct Scope<'a> {
    live: &'a mut ValueMap,
    prior: &'a ValueMap,
    view: View,
}

impl<'a> Scope<'a> {
    /// Create a scope reading the live mapping
    pub fn new(live: &'a mut ValueMap, prior: &'a ValueMap) -> Self {
        Self {
            live,
            prior,
            view: View::Current,
        }
    }

    /// Projection that reads the previous state and writes the live one
    pub fn previous(&mut self) -> Scope<'_> {
        Scope {
            live: &mut *self.live,
            prior: self.prior,
            view: View::Previous,
        }
    }

    /// The state this scope reads from
    pub fn view(&self) -> View {
        self.view
    }

    /// Read a field from this scope's view
    pub fn get(&self, name: &str) -> Value {
        let fields = match self.view {
            View::Current => &*self.live,
            View::Previous => self.prior,
        };
        fields.get(name).cloned().unwrap_or(Value::Null)
    }

    /// Write a field of the live mapping
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let slot = self
            .live
            .get_mut(name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))?;
        *slot = value;
        Ok(())
    }
}

impl Node {
    /// Evaluate this tree in the given scope
    pub fn evaluate(&self, scope: &mut Scope) -> Result<Value> {
        match self {
            Node::Value(v) => Ok(v.clone()),
            Node::Field(name) => Ok(scope.get(name)),
            Node::NoOp => Err(Error::InvariantViolation(
                "placeholder node evaluated; its parent should never evaluate it".to_string(),
            )),

            Node::Compare(op, left, right) => {
                let l = left.evaluate(scope)?;
                let r = right.evaluate(scope)?;
                Ok(Value::Bool(op.apply(&l, &r)))
            }
            Node::And(left, right) => {
                if left.is_effect() {
                    left.evaluate(scope)?;
                    right.evaluate(scope)?;
                    return Ok(Value::Null);
                }
                if !left.evaluate(scope)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(right.evaluate(scope)?.is_truthy()))
            }
            Node::Was(op, left, right) => {
                let then = left.evaluate(&mut scope.previous())?;
                let now = right.evaluate(scope)?;
                Ok(Value::Bool(op.apply(&then, &now)))
            }
            Node::IsNow(left, right) => {
                let then = left.evaluate(&mut scope.previous())?;
                let now = left.evaluate(scope)?;
                let target = right.evaluate(scope)?;
                Ok(Value::Bool(then != now && now == target))
            }
            Node::IsNotNow(left, right) => {
                let then = left.evaluate(&mut scope.previous())?;
                let now = left.evaluate(scope)?;
                let target = right.evaluate(scope)?;
                Ok(Value::Bool(then != now && then == target))
            }
            Node::HasChanged(left, _) => {
                let then = left.evaluate(&mut scope.previous())?;
                let now = left.evaluate(scope)?;
                Ok(Value::Bool(then != now))
            }
            Node::HasNotChanged(left, _) => {
                let then = left.evaluate(&mut scope.previous())?;
                let now = left.evaluate(scope)?;
                Ok(Value::Bool(then == now))
            }

            Node::Set(left, right) => {
                let field = left.target_field(Keyword::Set)?;
                let value = right.evaluate(scope)?;
                scope.set(field, value.clone())?;
                Ok(value)
            }
            Node::Inc(left, _) => {
                let field = left.target_field(Keyword::Inc)?;
                let value = left.evaluate(scope)?.incremented();
                scope.set(field, value.clone())?;
                Ok(value)
            }
            Node::Then(left, right) => {
                if left.evaluate(scope)?.is_truthy() {
                    right.evaluate(scope)
                } else {
                    Ok(Value::Null)
                }
            }
        }
    }

    /// Build the node for an operator keyword from its two operands
    pub fn binary(keyword: Keyword, left: Node, right: Node) -> Node {
        let (l, r) = (Box::new(left), Box::new(right));
        match keyword {
            Keyword::Then => Node::Then(l, r),
            Keyword::Or => Node::Compare(Comparison::Or, l, r),
            Keyword::And => Node::And(l, r),
            Keyword::Set => Node::Set(l, r),
            Keyword::Inc => Node::Inc(l, r),
            Keyword::Was => Node::Was(Comparison::Is, l, r),
            Keyword::WasNot => Node::Was(Comparison::IsNot, l, r),
            Keyword::Is => Node::Compare(Comparison::Is, l, r),
            Keyword::IsNot => Node::Compare(Comparison::IsNot, l, r),
            Keyword::IsNow => Node::IsNow(l, r),
            Keyword::IsNotNow => Node::IsNotNow(l, r),
            Keyword::HasChanged => Node::HasChanged(l, r),
            Keyword::HasNotChanged => Node::HasNotChanged(l, r),
            Keyword::GreaterThan => Node::Compare(Comparison::GreaterThan, l, r),
            Keyword::LessThan => Node::Compare(Comparison::LessThan, l, r),
        }
    }

    /// Create a literal node
    pub fn value(value: impl Into<Value>) -> Self {
        Node::Value(value.into())
    }

    /// Create a field node
    pub fn field(name: impl Into<String>) -> Self {
        Node::Field(name.into())
    }

    /// The keyword this node was built from, if it is an operator node
    pub fn keyword(&self) -> Option<Keyword> {
        let keyword = match self {
            Node::Value(_) | Node::Field(_) | Node::NoOp => return None,
            Node::Compare(Comparison::Is, ..) => Keyword::Is,
            Node::Compare(Comparison::IsNot, ..) => Keyword::IsNot,
            Node::Compare(Comparison::GreaterThan, ..) => Keyword::GreaterThan,
            Node::Compare(Comparison::LessThan, ..) => Keyword::LessThan,
            Node::Compare(Comparison::Or, ..) => Keyword::Or,
            Node::And(..) => Keyword::And,
            Node::Was(Comparison::IsNot, ..) => Keyword::WasNot,
            Node::Was(..) => Keyword::Was,
            Node::IsNow(..) => Keyword::IsNow,
            Node::IsNotNow(..) => Keyword::IsNotNow,
            Node::HasChanged(..) => Keyword::HasChanged,
            Node::HasNotChanged(..) => Keyword::HasNotChanged,
            Node::Set(..) => Keyword::Set,
            Node::Inc(..) => Keyword::Inc,
            Node::Then(..) => Keyword::Then,
        };
        Some(keyword)
    }

    /// Short description used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Value(_) => "value",
            Node::Field(_) => "field",
            Node::NoOp => "placeholder",
            other => other.keyword().map(Keyword::phrase).unwrap_or("node"),
        }
    }

    /// Whether evaluating this node is done for its writes, not its value
    ///
    /// `set x 1 and set y 2 and set z 3` nests as `(set and set) and set`,
    /// so an `and` led by an effect counts as an effect too.
    pub fn is_effect(&self) -> bool {
        match self {
            Node::Set(..) | Node::Inc(..) => true,
            Node::And(left, _) => left.is_effect(),
            _ => false,
        }
    }

    fn target_field(&self, keyword: Keyword) -> Result<&str> {
        match self {
            Node::Field(name) => Ok(name),
            other => Err(Error::InvariantViolation(format!(
                "\"{}\" target is a {}, not a field",
                keyword,
                other.kind()
            ))),
        }
    }
}
