use super::{Fold, Modifier, ModifierId, ModifierSpec, StatBounds};
use crate::state::SourceId;

/// Ordered collection of modifiers keyed by subject.
///
/// The stack issues its own [`ModifierId`]s (monotonic, never reused) and keeps
/// modifiers in insertion order for its whole lifetime; removals never reorder
/// the survivors. Removal of an absent id is a silent no-op.
///
/// # Example
/// ```
/// # use progression_core::modifier::{ModifierSpec, ModifierStack, StatBounds};
/// let mut stack = ModifierStack::<&str>::new();
/// stack.add("health", ModifierSpec::add(10.0));
/// stack.add("health", ModifierSpec::multiply(0.5));
///
/// // (20 + 10) × 1.5
/// assert_eq!(stack.resolve(&"health", 20.0, StatBounds::NON_NEGATIVE), 45.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierStack<K> {
    modifiers: Vec<Modifier<K>>,
    next_id: u64,
}

impl<K> Default for ModifierStack<K> {
    fn default() -> Self {
        Self {
            modifiers: Vec::new(),
            next_id: 1,
        }
    }
}

impl<K: PartialEq> ModifierStack<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a modifier for `subject` and returns its id.
    pub fn add(&mut self, subject: K, spec: ModifierSpec) -> ModifierId {
        let id = ModifierId(self.next_id);
        self.next_id += 1;
        self.modifiers.push(Modifier {
            id,
            subject,
            op: spec.op,
            magnitude: spec.magnitude,
            persistent: spec.persistent,
            source: spec.source,
        });
        id
    }

    /// Removes a modifier by identity. Returns whether anything was removed.
    pub fn remove(&mut self, id: ModifierId) -> bool {
        match self.modifiers.iter().position(|m| m.id == id) {
            Some(index) => {
                self.modifiers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes every modifier tagged with `source`. Returns how many were removed.
    pub fn remove_by_source(&mut self, source: SourceId) -> usize {
        self.retain_counting(|m| m.source != Some(source))
    }

    /// Removes the non-persistent modifiers of one subject.
    pub fn remove_non_persistent(&mut self, subject: &K) -> usize {
        self.retain_counting(|m| m.persistent || &m.subject != subject)
    }

    /// Removes the non-persistent modifiers of every subject.
    pub fn clear_non_persistent(&mut self) -> usize {
        self.retain_counting(|m| m.persistent)
    }

    pub fn clear(&mut self) {
        self.modifiers.clear();
    }

    pub fn get(&self, id: ModifierId) -> Option<&Modifier<K>> {
        self.modifiers.iter().find(|m| m.id == id)
    }

    /// Resolves `subject` against `base`: sum of additions, then the combined
    /// multiplier, then the clamp.
    pub fn resolve(&self, subject: &K, base: f64, bounds: StatBounds) -> f64 {
        self.for_subject(subject)
            .fold(Fold::new(base), |mut acc, m| {
                m.op.fold(&mut acc, m.magnitude);
                acc
            })
            .finish(bounds)
    }

    pub fn resolve_unclamped(&self, subject: &K, base: f64) -> f64 {
        self.resolve(subject, base, StatBounds::UNCLAMPED)
    }

    pub fn for_subject<'a>(&'a self, subject: &'a K) -> impl Iterator<Item = &'a Modifier<K>> {
        self.modifiers.iter().filter(move |m| &m.subject == subject)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modifier<K>> {
        self.modifiers.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    fn retain_counting(&mut self, keep: impl Fn(&Modifier<K>) -> bool) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| keep(m));
        before - self.modifiers.len()
    }
}
