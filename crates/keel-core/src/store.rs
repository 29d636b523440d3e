//! The reactive state store
//!
//! A [`Store`] owns the live field mapping, its history, the compiled
//! expressions and rules, and the registered handlers. [`Store::update`] is
//! the single reactive entry point:
//!
//! 1. the pre-update mapping is kept as the "previous" state;
//! 2. the patch is merged into the live mapping;
//! 3. every rule runs, in declaration order;
//! 4. the resulting state is appended to history;
//! 5. every trigger is evaluated against that state;
//! 6. the listeners of the triggers that fired run, in registration order.
//!
//! Triggers are all evaluated before the first listener runs, so one
//! listener's effects never decide whether another fires in the same cycle.

use crate::node::Scope;
use crate::parser::{Expressions, FieldNames, Parser};
use crate::tokenizer::{normalize_name, tokenize};
use crate::{Error, Keyword, Node, Payload, Result, Snapshot, StoreConfig, Value, ValueMap};
use std::rc::Rc;
use tracing::{debug, trace};

/// Callback run when a handler's trigger fires
///
/// Listeners may call back into the store: `set` writes directly, while
/// `update` starts a nested cycle. A listener whose own trigger fires again
/// in that nested cycle is re-entered, so such listeners must bound their
/// own recursion.
pub type Listener = Rc<dyn Fn(&mut Store, &Payload)>;

/// A trigger with the listener it gates
struct Handler {
    trigger: Node,
    props: Vec<String>,
    listener: Listener,
}

/// Reactive state container
pub struct Store {
    /// Current field values
    live: ValueMap,
    /// Committed states, oldest first
    history: Vec<Snapshot>,
    /// Lookup from folded names to declared field names
    fields: FieldNames,
    /// Compiled named expressions
    expressions: Expressions,
    /// Compiled rules
    rules: Vec<Node>,
    /// Registered handlers, in registration order
    handlers: Vec<Handler>,
}

impl Store {
    /// Build a store, compiling every expression and rule
    ///
    /// Fails without producing a store if any sentence does not compile.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let StoreConfig {
            data,
            expressions: sentences,
            rules: rule_sentences,
        } = config;

        let mut fields = FieldNames::new();
        for name in data.keys() {
            let folded = reserve(name)?;
            if fields.insert(folded, name.clone()).is_some() {
                return Err(Error::DuplicateName(name.clone()));
            }
        }

        let mut expressions = Expressions::new();
        for (name, sentence) in &sentences {
            let folded = reserve(name)?;
            if fields.contains_key(&folded) || expressions.contains_key(&folded) {
                return Err(Error::DuplicateName(name.clone()));
            }
            let tree = compile(&fields, &expressions, sentence)?;
            expressions.insert(folded, tree);
            debug!(expression = %name, "compiled expression");
        }

        let rules = rule_sentences
            .iter()
            .map(|sentence| compile(&fields, &expressions, sentence))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            fields = fields.len(),
            expressions = expressions.len(),
            rules = rules.len(),
            "store initialized"
        );

        let history = vec![Snapshot::new(data.clone())];
        Ok(Self {
            live: data,
            history,
            fields,
            expressions,
            rules,
            handlers: Vec::new(),
        })
    }

    /// Read a field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.live.get(name)
    }

    /// Write a field directly
    ///
    /// Bypasses the reactive cycle: no history entry, no rules, no listeners.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let slot = self
            .live
            .get_mut(name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))?;
        *slot = value.into();
        Ok(())
    }

    /// Register a listener
    ///
    /// A trigger naming a field or an expression fires when that value
    /// changes; anything else is compiled as a sentence and fires whenever
    /// it is truthy after an update. The listener receives every field.
    pub fn on<F>(&mut self, trigger: &str, listener: F) -> Result<()>
    where
        F: Fn(&mut Store, &Payload) + 'static,
    {
        self.on_props(trigger, &[], listener)
    }

    /// Register a listener that receives only the given fields
    ///
    /// With a single prop the listener receives that field's value; with
    /// several it receives a map of them.
    pub fn on_props<F>(&mut self, trigger: &str, props: &[&str], listener: F) -> Result<()>
    where
        F: Fn(&mut Store, &Payload) + 'static,
    {
        if let Some(unknown) = props.iter().find(|p| !self.live.contains_key(**p)) {
            return Err(Error::UnknownField(unknown.to_string()));
        }

        let name = normalize_name(trigger);
        let tree = if self.fields.contains_key(&name) || self.expressions.contains_key(&name) {
            let tokens: Vec<String> = name
                .split(' ')
                .chain(["has", "changed"])
                .map(str::to_string)
                .collect();
            self.parser()
                .parse_tokens(&tokens)
                .map_err(|source| Error::Compile {
                    sentence: trigger.to_string(),
                    source,
                })?
        } else {
            compile(&self.fields, &self.expressions, trigger)?
        };

        self.handlers.push(Handler {
            trigger: tree,
            props: props.iter().map(|p| p.to_string()).collect(),
            listener: Rc::new(listener),
        });
        debug!(trigger, handlers = self.handlers.len(), "registered handler");
        Ok(())
    }

    /// Merge a patch and run the reactive cycle
    ///
    /// Unknown fields reject the whole patch before anything changes.
    pub fn update<I, K, V>(&mut self, patch: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let patch: Vec<(String, Value)> = patch
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if let Some((name, _)) = patch.iter().find(|(name, _)| !self.live.contains_key(name)) {
            return Err(Error::UnknownField(name.clone()));
        }
        trace!(
            fields = ?patch.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
            version = self.history.len(),
            "update"
        );

        let previous = self.live.clone();
        for (name, value) in patch {
            self.live.insert(name, value);
        }

        let mut scope = Scope::new(&mut self.live, &previous);
        for rule in &self.rules {
            rule.evaluate(&mut scope)?;
        }

        self.history.push(Snapshot::new(self.live.clone()));

        let mut scope = Scope::new(&mut self.live, &previous);
        let mut triggered = Vec::new();
        for (index, handler) in self.handlers.iter().enumerate() {
            if handler.trigger.evaluate(&mut scope)?.is_truthy() {
                triggered.push(index);
            }
        }
        debug!(
            version = self.history.len() - 1,
            triggered = triggered.len(),
            "update applied"
        );

        for index in triggered {
            self.dispatch(index);
        }
        Ok(())
    }

    /// Run one handler's listener with its payload
    fn dispatch(&mut self, index: usize) {
        let payload = self.payload(&self.handlers[index].props);
        let listener = Rc::clone(&self.handlers[index].listener);
        listener(self, &payload);
    }

    fn payload(&self, props: &[String]) -> Payload {
        match props {
            [prop] => Payload::Value(self.live.get(prop).cloned().unwrap_or_default()),
            [] => Payload::Fields(self.live.clone()),
            props => Payload::Fields(
                props
                    .iter()
                    .map(|p| (p.clone(), self.live.get(p).cloned().unwrap_or_default()))
                    .collect(),
            ),
        }
    }

    /// Compile a sentence and evaluate it once against the current state
    ///
    /// Temporal keywords compare against the state before the last update.
    /// Writes made by the sentence are discarded.
    pub fn evaluate(&self, sentence: &str) -> Result<Value> {
        let tree = compile(&self.fields, &self.expressions, sentence)?;
        let prior = self
            .previous()
            .map(Snapshot::fields)
            .unwrap_or(&self.live)
            .clone();
        let mut scratch = self.live.clone();
        tree.evaluate(&mut Scope::new(&mut scratch, &prior))
    }

    /// The committed history, oldest first
    pub fn history(&self) -> &[Snapshot] {
        &self.history
    }

    /// Replace the history wholesale
    ///
    /// The live mapping becomes the last snapshot. Every snapshot must hold
    /// exactly the declared fields.
    pub fn set_history(&mut self, history: Vec<Snapshot>) -> Result<()> {
        for (index, snapshot) in history.iter().enumerate() {
            if !snapshot.has_fields(self.fields.values().map(String::as_str)) {
                return Err(Error::SnapshotMismatch { index });
            }
        }
        let last = history.last().ok_or(Error::EmptyHistory)?;
        self.live = last.fields().clone();
        self.history = history;
        debug!(version = self.history.len() - 1, "history replaced");
        Ok(())
    }

    /// The snapshot committed before the latest one
    pub fn previous(&self) -> Option<&Snapshot> {
        self.history.iter().rev().nth(1)
    }

    /// Current field values
    pub fn data(&self) -> &ValueMap {
        &self.live
    }

    /// Declared field names, in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.values().map(String::as_str)
    }

    /// A compiled expression by name
    pub fn expression(&self, name: &str) -> Option<&Node> {
        self.expressions.get(&normalize_name(name))
    }

    /// Compiled rules, in declaration order
    pub fn rules(&self) -> &[Node] {
        &self.rules
    }

    /// Number of registered handlers
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Compile a sentence against this store's fields and expressions
    pub fn compile(&self, sentence: &str) -> Result<Node> {
        compile(&self.fields, &self.expressions, sentence)
    }

    fn parser(&self) -> Parser<'_> {
        Parser::new(&self.fields, &self.expressions)
    }
}

/// Fold a declared name, refusing names the parser would read as a keyword
fn reserve(name: &str) -> Result<String> {
    let folded = normalize_name(name);
    if Keyword::from_phrase(&folded).is_some() {
        return Err(Error::ReservedName(name.to_string()));
    }
    Ok(folded)
}

fn compile(fields: &FieldNames, expressions: &Expressions, sentence: &str) -> Result<Node> {
    Parser::new(fields, expressions)
        .parse_tokens(&tokenize(sentence))
        .map_err(|source| Error::Compile {
            sentence: sentence.to_string(),
            source,
        })
}
