//! Hash-consed concept and role terms.
//!
//! Every concept is interned, so equality and hashing are O(1) identity
//! checks. Concepts are kept in a normal form built from ⊤, atoms, ¬, ⊓, ∀,
//! ≥, Self, nominals and data ranges only:
//!
//! - ⊥ = ¬⊤
//! - C ⊔ D = ¬(¬C ⊓ ¬D)
//! - ∃r.C = ¬∀r.¬C
//! - ≤n r.C = ¬≥(n+1) r.C
//!
//! Negation toggles the outermost ¬ and never nests two of them.

use crate::literal::Literal;
use crate::name::Name;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, PoisonError, RwLock};

/// A named role, possibly inverted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Role {
    name: Name,
    #[serde(default)]
    inverse: bool,
}

impl Role {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            inverse: false,
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn is_inverse(&self) -> bool {
        self.inverse
    }

    /// `r⁻`. Inverting twice gives back the original role.
    pub fn inverse(&self) -> Role {
        Role {
            name: self.name.clone(),
            inverse: !self.inverse,
        }
    }

    /// The non-inverted role with the same name.
    pub fn named(&self) -> Role {
        Role::new(self.name.clone())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverse {
            write!(f, "{}⁻", self.name.local_name())
        } else {
            write!(f, "{}", self.name.local_name())
        }
    }
}

/// Structural shape of an interned concept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConceptKind {
    Top,
    Atom(Name),
    Not(Concept),
    /// Flattened, sorted, duplicate-free; always two or more operands.
    And(Vec<Concept>),
    All(Role, Concept),
    Min(u32, Role, Concept),
    HasSelf(Role),
    Nominal(Name),
    Datatype(Name),
    Value(Literal),
    /// Universal restriction travelling through a role automaton state.
    AllState {
        role: Role,
        state: u32,
        filler: Concept,
    },
}

struct ConceptData {
    id: u64,
    kind: ConceptKind,
}

static NEXT_CONCEPT_ID: AtomicU64 = AtomicU64::new(1);

lazy_static! {
    static ref CONCEPT_POOL: RwLock<HashMap<ConceptKind, Concept>> = RwLock::new(HashMap::new());
    static ref TOP: Concept = Concept::intern(ConceptKind::Top);
    static ref BOTTOM: Concept = Concept::intern(ConceptKind::Not(TOP.clone()));
}

/// Interned, immutable concept expression.
#[derive(Clone)]
pub struct Concept(Arc<ConceptData>);

impl Concept {
    fn intern(kind: ConceptKind) -> Concept {
        {
            let pool = CONCEPT_POOL.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(existing) = pool.get(&kind) {
                return existing.clone();
            }
        }

        let mut pool = CONCEPT_POOL.write().unwrap_or_else(PoisonError::into_inner);
        pool.entry(kind.clone())
            .or_insert_with(|| {
                Concept(Arc::new(ConceptData {
                    id: NEXT_CONCEPT_ID.fetch_add(1, AtomicOrdering::Relaxed),
                    kind,
                }))
            })
            .clone()
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn kind(&self) -> &ConceptKind {
        &self.0.kind
    }

    pub fn top() -> Concept {
        TOP.clone()
    }

    pub fn bottom() -> Concept {
        BOTTOM.clone()
    }

    pub fn atom(name: impl Into<Name>) -> Concept {
        let name = name.into();
        if name.as_str() == crate::name::OWL_THING {
            return Concept::top();
        }
        if name.as_str() == crate::name::OWL_NOTHING {
            return Concept::bottom();
        }
        Concept::intern(ConceptKind::Atom(name))
    }

    pub fn nominal(individual: impl Into<Name>) -> Concept {
        Concept::intern(ConceptKind::Nominal(individual.into()))
    }

    pub fn datatype(datatype: impl Into<Name>) -> Concept {
        let name = datatype.into();
        if name.as_str() == crate::literal::vocab::RDFS_LITERAL {
            return Concept::top();
        }
        Concept::intern(ConceptKind::Datatype(name))
    }

    pub fn value(literal: Literal) -> Concept {
        Concept::intern(ConceptKind::Value(literal))
    }

    pub fn negate(&self) -> Concept {
        match self.kind() {
            ConceptKind::Not(inner) => inner.clone(),
            _ => Concept::intern(ConceptKind::Not(self.clone())),
        }
    }

    pub fn and<I: IntoIterator<Item = Concept>>(operands: I) -> Concept {
        let mut flat: Vec<Concept> = Vec::new();
        for operand in operands {
            match operand.kind() {
                ConceptKind::Top => {}
                ConceptKind::And(inner) => flat.extend(inner.iter().cloned()),
                _ if operand.is_bottom() => return Concept::bottom(),
                _ => flat.push(operand),
            }
        }
        flat.sort();
        flat.dedup();
        match flat.len() {
            0 => Concept::top(),
            1 => flat.remove(0),
            _ => Concept::intern(ConceptKind::And(flat)),
        }
    }

    pub fn or<I: IntoIterator<Item = Concept>>(operands: I) -> Concept {
        Concept::and(operands.into_iter().map(|c| c.negate())).negate()
    }

    pub fn all(role: Role, filler: Concept) -> Concept {
        if filler.is_top() {
            return Concept::top();
        }
        Concept::intern(ConceptKind::All(role, filler))
    }

    pub fn some(role: Role, filler: Concept) -> Concept {
        if filler.is_bottom() {
            return Concept::bottom();
        }
        Concept::intern(ConceptKind::All(role, filler.negate())).negate()
    }

    pub fn min(n: u32, role: Role, filler: Concept) -> Concept {
        if n == 0 {
            return Concept::top();
        }
        if filler.is_bottom() {
            return Concept::bottom();
        }
        Concept::intern(ConceptKind::Min(n, role, filler))
    }

    pub fn max(n: u32, role: Role, filler: Concept) -> Concept {
        Concept::min(n + 1, role, filler).negate()
    }

    pub fn exactly(n: u32, role: Role, filler: Concept) -> Concept {
        Concept::and([
            Concept::min(n, role.clone(), filler.clone()),
            Concept::max(n, role, filler),
        ])
    }

    pub fn has_value(role: Role, individual: impl Into<Name>) -> Concept {
        Concept::some(role, Concept::nominal(individual))
    }

    pub fn one_of<I: IntoIterator<Item = Name>>(individuals: I) -> Concept {
        Concept::or(individuals.into_iter().map(Concept::nominal))
    }

    pub fn has_self(role: Role) -> Concept {
        Concept::intern(ConceptKind::HasSelf(role))
    }

    pub fn all_state(role: Role, state: u32, filler: Concept) -> Concept {
        Concept::intern(ConceptKind::AllState { role, state, filler })
    }

    pub fn is_top(&self) -> bool {
        matches!(self.kind(), ConceptKind::Top)
    }

    pub fn is_bottom(&self) -> bool {
        matches!(self.kind(), ConceptKind::Not(inner) if inner.is_top())
    }

    pub fn is_negation(&self) -> bool {
        matches!(self.kind(), ConceptKind::Not(_))
    }

    pub fn as_atom(&self) -> Option<&Name> {
        match self.kind() {
            ConceptKind::Atom(name) => Some(name),
            _ => None,
        }
    }

    /// `¬A` for an atom `A`.
    pub fn as_negated_atom(&self) -> Option<&Name> {
        match self.kind() {
            ConceptKind::Not(inner) => inner.as_atom(),
            _ => None,
        }
    }

    pub fn as_not(&self) -> Option<&Concept> {
        match self.kind() {
            ConceptKind::Not(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_and(&self) -> Option<&[Concept]> {
        match self.kind() {
            ConceptKind::And(operands) => Some(operands),
            _ => None,
        }
    }

    /// Disjuncts of `¬(¬C1 ⊓ … ⊓ ¬Cn)`.
    pub fn as_or(&self) -> Option<Vec<Concept>> {
        match self.kind() {
            ConceptKind::Not(inner) => inner
                .as_and()
                .map(|operands| operands.iter().map(|c| c.negate()).collect()),
            _ => None,
        }
    }

    /// Role and filler of `∃r.C`.
    pub fn as_some(&self) -> Option<(&Role, Concept)> {
        match self.kind() {
            ConceptKind::Not(inner) => match inner.kind() {
                ConceptKind::All(role, filler) => Some((role, filler.negate())),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_all(&self) -> Option<(&Role, &Concept)> {
        match self.kind() {
            ConceptKind::All(role, filler) => Some((role, filler)),
            _ => None,
        }
    }

    pub fn as_min(&self) -> Option<(u32, &Role, &Concept)> {
        match self.kind() {
            ConceptKind::Min(n, role, filler) => Some((*n, role, filler)),
            _ => None,
        }
    }

    /// Bound, role and filler of `≤n r.C`.
    pub fn as_max(&self) -> Option<(u32, &Role, &Concept)> {
        match self.kind() {
            ConceptKind::Not(inner) => match inner.kind() {
                ConceptKind::Min(n, role, filler) => Some((n - 1, role, filler)),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_nominal(&self) -> Option<&Name> {
        match self.kind() {
            ConceptKind::Nominal(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_self(&self) -> Option<&Role> {
        match self.kind() {
            ConceptKind::HasSelf(role) => Some(role),
            _ => None,
        }
    }

    pub fn as_datatype(&self) -> Option<&Name> {
        match self.kind() {
            ConceptKind::Datatype(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Literal> {
        match self.kind() {
            ConceptKind::Value(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn as_all_state(&self) -> Option<(&Role, u32, &Concept)> {
        match self.kind() {
            ConceptKind::AllState { role, state, filler } => Some((role, *state, filler)),
            _ => None,
        }
    }

    /// Data ranges and their negations.
    pub fn is_data_range(&self) -> bool {
        let positive = self.as_not().unwrap_or(self);
        matches!(positive.kind(), ConceptKind::Datatype(_) | ConceptKind::Value(_))
    }

    /// Built from datatypes and literal values only, under ¬ and ⊓.
    pub fn is_data_filler(&self) -> bool {
        match self.kind() {
            ConceptKind::Datatype(_) | ConceptKind::Value(_) => true,
            ConceptKind::Not(inner) => inner.is_data_filler(),
            ConceptKind::And(operands) => operands.iter().all(Concept::is_data_filler),
            _ => false,
        }
    }

    /// Roles restricted to a data filler somewhere in this concept.
    pub fn data_roles(&self) -> BTreeSet<Role> {
        let mut roles = BTreeSet::new();
        self.visit(&mut |c| match c.kind() {
            ConceptKind::All(role, filler) | ConceptKind::Min(_, role, filler) if filler.is_data_filler() => {
                roles.insert(role.named());
            }
            _ => {}
        });
        roles
    }

    /// Visits this concept and every sub-concept, outermost first.
    pub fn visit<F: FnMut(&Concept)>(&self, f: &mut F) {
        f(self);
        match self.kind() {
            ConceptKind::Not(inner) => inner.visit(f),
            ConceptKind::And(operands) => {
                for operand in operands {
                    operand.visit(f);
                }
            }
            ConceptKind::All(_, filler)
            | ConceptKind::Min(_, _, filler)
            | ConceptKind::AllState { filler, .. } => filler.visit(f),
            ConceptKind::Top
            | ConceptKind::Atom(_)
            | ConceptKind::HasSelf(_)
            | ConceptKind::Nominal(_)
            | ConceptKind::Datatype(_)
            | ConceptKind::Value(_) => {}
        }
    }

    pub fn atoms(&self) -> BTreeSet<Name> {
        let mut atoms = BTreeSet::new();
        self.visit(&mut |c| {
            if let Some(name) = c.as_atom() {
                atoms.insert(name.clone());
            }
        });
        atoms
    }

    pub fn roles(&self) -> BTreeSet<Role> {
        let mut roles = BTreeSet::new();
        self.visit(&mut |c| match c.kind() {
            ConceptKind::All(role, _)
            | ConceptKind::Min(_, role, _)
            | ConceptKind::HasSelf(role)
            | ConceptKind::AllState { role, .. } => {
                roles.insert(role.clone());
            }
            _ => {}
        });
        roles
    }
}

impl PartialEq for Concept {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Concept {}

impl Hash for Concept {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl PartialOrd for Concept {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Concept {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ConceptKind::Top => write!(f, "⊤"),
            ConceptKind::Atom(name) => write!(f, "{}", name.local_name()),
            ConceptKind::Nominal(name) => write!(f, "{{{}}}", name.local_name()),
            ConceptKind::Datatype(name) => write!(f, "{}", name.local_name()),
            ConceptKind::Value(literal) => write!(f, "{{{}}}", literal),
            ConceptKind::HasSelf(role) => write!(f, "∃{}.Self", role),
            ConceptKind::All(role, filler) => write!(f, "∀{}.{}", role, filler),
            ConceptKind::Min(n, role, filler) => write!(f, "≥{} {}.{}", n, role, filler),
            ConceptKind::AllState { role, state, filler } => {
                write!(f, "∀[{}@{}].{}", role, state, filler)
            }
            ConceptKind::And(operands) => write_joined(f, operands.iter().cloned(), " ⊓ "),
            ConceptKind::Not(inner) => match inner.kind() {
                ConceptKind::Top => write!(f, "⊥"),
                ConceptKind::And(operands) => {
                    write_joined(f, operands.iter().map(|c| c.negate()), " ⊔ ")
                }
                ConceptKind::All(role, filler) => write!(f, "∃{}.{}", role, filler.negate()),
                ConceptKind::Min(n, role, filler) => {
                    write!(f, "≤{} {}.{}", n - 1, role, filler)
                }
                _ => write!(f, "¬{}", inner),
            },
        }
    }
}

fn write_joined<I: Iterator<Item = Concept>>(
    f: &mut fmt::Formatter<'_>,
    operands: I,
    separator: &str,
) -> fmt::Result {
    write!(f, "(")?;
    for (i, operand) in operands.enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        write!(f, "{}", operand)?;
    }
    write!(f, ")")
}

impl fmt::Debug for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> Concept {
        Concept::atom("ex:A")
    }

    fn b() -> Concept {
        Concept::atom("ex:B")
    }

    fn r() -> Role {
        Role::new("ex:r")
    }

    #[test]
    fn test_interning_gives_identity() {
        let x = Concept::and([a(), b()]);
        let y = Concept::and([b(), a()]);
        assert_eq!(x, y);
        assert_eq!(x.id(), y.id());
    }

    #[test]
    fn test_double_negation_collapses() {
        assert_eq!(a().negate().negate(), a());
        assert!(Concept::top().negate().is_bottom());
        assert_eq!(Concept::bottom().negate(), Concept::top());
    }

    #[test]
    fn test_and_simplification() {
        assert_eq!(Concept::and([a(), Concept::top()]), a());
        assert!(Concept::and([a(), Concept::bottom()]).is_bottom());
        assert!(Concept::and(Vec::new()).is_top());
        let nested = Concept::and([a(), Concept::and([b(), a()])]);
        assert_eq!(nested.as_and().map(|ops| ops.len()), Some(2));
    }

    #[test]
    fn test_or_is_negated_and() {
        let or = Concept::or([a(), b()]);
        let mut disjuncts = or.as_or().unwrap();
        disjuncts.sort();
        let mut expected = vec![a(), b()];
        expected.sort();
        assert_eq!(disjuncts, expected);
        assert!(Concept::or([a(), Concept::top()]).is_top());
        assert_eq!(Concept::or([a(), Concept::bottom()]), a());
    }

    #[test]
    fn test_some_and_max_shapes() {
        let some = Concept::some(r(), a());
        let (role, filler) = some.as_some().unwrap();
        assert_eq!(role, &r());
        assert_eq!(filler, a());
        assert_eq!(some.negate(), Concept::all(r(), a().negate()));

        let max = Concept::max(2, r(), b());
        let (n, role, filler) = max.as_max().unwrap();
        assert_eq!((n, role, filler), (2, &r(), &b()));
        assert_eq!(max.negate(), Concept::min(3, r(), b()));
    }

    #[test]
    fn test_degenerate_restrictions() {
        assert!(Concept::min(0, r(), a()).is_top());
        assert!(Concept::some(r(), Concept::bottom()).is_bottom());
        assert!(Concept::all(r(), Concept::top()).is_top());
        assert!(Concept::atom(crate::name::OWL_THING).is_top());
    }

    #[test]
    fn test_role_inverse_is_involution() {
        let role = r();
        assert!(role.inverse().is_inverse());
        assert_eq!(role.inverse().inverse(), role);
        assert_eq!(role.inverse().named(), role);
    }

    #[test]
    fn test_data_roles_follow_the_filler() {
        let age = Role::new("ex:age");
        let integer = Concept::datatype("http://www.w3.org/2001/XMLSchema#integer");
        let string = Concept::datatype("http://www.w3.org/2001/XMLSchema#string");
        let c = Concept::and([
            Concept::some(age.clone(), integer.clone()),
            Concept::all(age.clone(), string.clone()),
            Concept::some(r(), a()),
        ]);
        assert!(integer.negate().is_data_filler());
        assert!(Concept::and([integer, string]).is_data_filler());
        assert!(!a().is_data_filler());
        assert_eq!(c.data_roles(), BTreeSet::from([age]));
    }

    #[test]
    fn test_display() {
        assert_eq!(Concept::some(r(), a()).to_string(), "∃r.A");
        assert_eq!(Concept::max(1, r(), a()).to_string(), "≤1 r.A");
        assert_eq!(Concept::bottom().to_string(), "⊥");
        assert_eq!(a().negate().to_string(), "¬A");
    }

    #[test]
    fn test_visit_collects_signature() {
        let c = Concept::and([a(), Concept::some(r(), b().negate())]);
        let atoms: Vec<String> = c.atoms().into_iter().map(|n| n.to_string()).collect();
        assert_eq!(atoms, vec!["ex:A", "ex:B"]);
        assert!(c.roles().contains(&r()));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn concept() -> impl Strategy<Value = Concept> {
            let leaf = prop_oneof![
                (0usize..4).prop_map(|i| Concept::atom(format!("ex:C{i}"))),
                Just(Concept::top()),
                Just(Concept::bottom()),
            ];
            leaf.prop_recursive(3, 16, 3, |inner| {
                prop_oneof![
                    inner.clone().prop_map(|c| c.negate()),
                    inner.clone().prop_map(|c| Concept::some(Role::new("ex:r"), c)),
                    inner.clone().prop_map(|c| Concept::all(Role::new("ex:r"), c)),
                    prop::collection::vec(inner.clone(), 1..4).prop_map(Concept::and),
                    prop::collection::vec(inner, 1..4).prop_map(Concept::or),
                ]
            })
        }

        proptest! {
            #[test]
            fn prop_negation_is_involution(c in concept()) {
                prop_assert_eq!(c.negate().negate(), c);
            }

            #[test]
            fn prop_conjunction_ignores_order_and_repeats(x in concept(), y in concept()) {
                let xy = Concept::and([x.clone(), y.clone()]);
                prop_assert_eq!(&xy, &Concept::and([y.clone(), x.clone()]));
                prop_assert_eq!(&xy, &Concept::and([x.clone(), y, x.clone()]));
                prop_assert_eq!(Concept::and([x.clone(), x.clone()]), x);
            }
        }
    }
}
