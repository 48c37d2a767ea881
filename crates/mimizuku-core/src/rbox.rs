//! Role oracle: hierarchy, characteristics, domains/ranges and chains.
//!
//! Entries exist for every declared role and, for object roles, for its
//! inverse. Queries on a role that was never declared answer as if the role
//! had no axioms at all.

use crate::automaton::RoleAutomaton;
use crate::error::{ReasonerError, Result};
use crate::model::{Axiom, AxiomId, PropertyExpression};
use crate::term::{Concept, Role};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// A concept attached to a role (domain or range) with its explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRestriction {
    pub concept: Concept,
    pub explanation: Vec<AxiomId>,
}

#[derive(Debug, Clone, Default)]
pub struct RoleInfo {
    supers: Vec<Role>,
    subs: Vec<Role>,
    domains: Vec<RoleRestriction>,
    ranges: Vec<RoleRestriction>,
    functional: bool,
    functional_supers: Vec<Role>,
    transitive: bool,
    symmetric: bool,
    asymmetric: bool,
    reflexive: bool,
    irreflexive: bool,
    disjoints: Vec<Role>,
    data: bool,
    chains: Vec<Vec<Role>>,
    complex: bool,
    automaton: Option<Arc<RoleAutomaton>>,
}

#[derive(Debug, Clone, Default)]
pub struct RBox {
    roles: HashMap<Role, RoleInfo>,
    told_subs: Vec<(Role, Role)>,
    prepared: bool,
}

impl RBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and prepares the role oracle from the RBox axioms of an ontology.
    pub fn from_axioms<'a, I>(axioms: I) -> Result<RBox>
    where
        I: IntoIterator<Item = (AxiomId, &'a Axiom)>,
    {
        let mut rbox = RBox::new();
        for (id, axiom) in axioms {
            rbox.add_axiom(id, axiom);
        }
        rbox.prepare()?;
        Ok(rbox)
    }

    fn declare_property(&mut self, property: &PropertyExpression) -> Role {
        let role = property.to_role();
        self.declare(&role, property.is_data());
        role
    }

    pub fn add_axiom(&mut self, id: AxiomId, axiom: &Axiom) {
        match axiom {
            Axiom::SubPropertyOf(sub, sup) => {
                let sub = self.declare_property(sub);
                let sup = self.declare_property(sup);
                self.add_sub_role(sub, sup);
            }
            Axiom::SubPropertyChainOf(chain, sup) => {
                let chain: Vec<Role> = chain.iter().map(|p| self.declare_property(p)).collect();
                let sup = self.declare_property(sup);
                self.add_chain(chain, sup);
            }
            Axiom::EquivalentProperties(properties) => {
                let roles: Vec<Role> = properties.iter().map(|p| self.declare_property(p)).collect();
                for pair in roles.windows(2) {
                    self.add_sub_role(pair[0].clone(), pair[1].clone());
                    self.add_sub_role(pair[1].clone(), pair[0].clone());
                }
            }
            Axiom::InverseProperties(p, q) => {
                let r = self.declare_property(p);
                let s = self.declare_property(q);
                self.add_inverse(r, s);
            }
            Axiom::DisjointProperties(properties) => {
                let roles: Vec<Role> = properties.iter().map(|p| self.declare_property(p)).collect();
                for (i, r) in roles.iter().enumerate() {
                    for s in &roles[i + 1..] {
                        self.add_disjoint(r.clone(), s.clone());
                    }
                }
            }
            Axiom::PropertyDomain(p, class) => {
                let role = self.declare_property(p);
                self.add_domain(&role, class.to_concept(), vec![id]);
            }
            Axiom::PropertyRange(p, class) => {
                let role = self.declare_property(p);
                self.add_range(&role, class.to_concept(), vec![id]);
            }
            Axiom::DataPropertyRange(name, range) => {
                let role = Role::new(name.clone());
                self.declare(&role, true);
                self.add_range(&role, range.to_concept(), vec![id]);
            }
            Axiom::FunctionalProperty(p) => {
                let role = self.declare_property(p);
                self.info_mut(&role).functional = true;
            }
            Axiom::InverseFunctionalProperty(p) => {
                let role = self.declare_property(p).inverse();
                self.info_mut(&role).functional = true;
            }
            Axiom::TransitiveProperty(p) => {
                let role = self.declare_property(p);
                self.info_mut(&role.named()).transitive = true;
            }
            Axiom::SymmetricProperty(p) => {
                let role = self.declare_property(p);
                self.info_mut(&role.named()).symmetric = true;
                self.add_sub_role(role.clone(), role.inverse());
            }
            Axiom::AsymmetricProperty(p) => {
                let role = self.declare_property(p);
                self.info_mut(&role.named()).asymmetric = true;
            }
            Axiom::ReflexiveProperty(p) => {
                let role = self.declare_property(p);
                self.info_mut(&role.named()).reflexive = true;
            }
            Axiom::IrreflexiveProperty(p) => {
                let role = self.declare_property(p);
                self.info_mut(&role.named()).irreflexive = true;
            }
            Axiom::ObjectPropertyAssertion(p, _, _) | Axiom::NegativeObjectPropertyAssertion(p, _, _) => {
                self.declare_property(p);
            }
            Axiom::DataPropertyAssertion(name, _, _) | Axiom::NegativeDataPropertyAssertion(name, _, _) => {
                self.declare(&Role::new(name.clone()), true);
            }
            _ => {}
        }
    }

    /// Registers a role (and its inverse, for object roles).
    pub fn declare(&mut self, role: &Role, data: bool) {
        let named = role.named();
        if !self.roles.contains_key(&named) {
            self.prepared = false;
            self.roles.insert(
                named.clone(),
                RoleInfo {
                    data,
                    ..RoleInfo::default()
                },
            );
            if !data {
                self.roles.insert(named.inverse(), RoleInfo::default());
            }
        }
    }

    fn info_mut(&mut self, role: &Role) -> &mut RoleInfo {
        self.prepared = false;
        self.roles.entry(role.clone()).or_default()
    }

    pub fn add_sub_role(&mut self, sub: Role, sup: Role) {
        self.prepared = false;
        self.told_subs.push((sub, sup));
    }

    /// `r ≡ s⁻`
    pub fn add_inverse(&mut self, r: Role, s: Role) {
        self.add_sub_role(r.clone(), s.inverse());
        self.add_sub_role(s.inverse(), r);
    }

    pub fn add_chain(&mut self, chain: Vec<Role>, sup: Role) {
        match chain.len() {
            0 => {}
            1 => self.add_sub_role(chain[0].clone(), sup),
            _ if sup.is_inverse() => {
                let reversed = chain.iter().rev().map(|r| r.inverse()).collect();
                self.info_mut(&sup.named()).chains.push(reversed);
            }
            _ => self.info_mut(&sup).chains.push(chain),
        }
    }

    pub fn add_disjoint(&mut self, r: Role, s: Role) {
        self.info_mut(&r).disjoints.push(s.clone());
        self.info_mut(&s).disjoints.push(r.clone());
        if !self.is_data(&r) && !self.is_data(&s) {
            self.info_mut(&r.inverse()).disjoints.push(s.inverse());
            self.info_mut(&s.inverse()).disjoints.push(r.inverse());
        }
    }

    pub fn add_domain(&mut self, role: &Role, concept: Concept, explanation: Vec<AxiomId>) {
        let data = self.is_data(role);
        self.roles.entry(role.clone()).or_default().domains.push(RoleRestriction {
            concept: concept.clone(),
            explanation: explanation.clone(),
        });
        if !data {
            self.roles
                .entry(role.inverse())
                .or_default()
                .ranges
                .push(RoleRestriction { concept, explanation });
        }
    }

    pub fn add_range(&mut self, role: &Role, concept: Concept, explanation: Vec<AxiomId>) {
        let data = self.is_data(role);
        self.roles.entry(role.clone()).or_default().ranges.push(RoleRestriction {
            concept: concept.clone(),
            explanation: explanation.clone(),
        });
        if !data {
            self.roles
                .entry(role.inverse())
                .or_default()
                .domains
                .push(RoleRestriction { concept, explanation });
        }
    }

    /// Computes hierarchy closures, synchronizes characteristics between
    /// a role and its inverse and builds automata for complex roles.
    pub fn prepare(&mut self) -> Result<()> {
        if self.prepared {
            return Ok(());
        }

        // Characteristics shared by a role and its inverse
        let named: Vec<Role> = self.roles.keys().filter(|r| !r.is_inverse()).cloned().collect();
        for role in &named {
            if self.is_data(role) {
                continue;
            }
            let info = self.roles.get(role).cloned().unwrap_or_default();
            let inverse = self.roles.entry(role.inverse()).or_default();
            inverse.transitive = info.transitive;
            inverse.symmetric = info.symmetric;
            inverse.asymmetric = info.asymmetric;
            inverse.reflexive = info.reflexive;
            inverse.irreflexive = info.irreflexive;
        }

        // Direct super edges, mirrored through inverses
        let mut direct: HashMap<Role, Vec<Role>> = HashMap::new();
        for (sub, sup) in &self.told_subs {
            direct.entry(sub.clone()).or_default().push(sup.clone());
            if !self.is_data(sub) && !self.is_data(sup) {
                direct.entry(sub.inverse()).or_default().push(sup.inverse());
            }
        }

        let all_roles: Vec<Role> = self.roles.keys().cloned().collect();
        let mut supers_of: HashMap<Role, Vec<Role>> = HashMap::new();
        for role in &all_roles {
            let mut seen: BTreeSet<Role> = BTreeSet::new();
            let mut queue = VecDeque::from([role.clone()]);
            while let Some(current) = queue.pop_front() {
                if !seen.insert(current.clone()) {
                    continue;
                }
                if let Some(next) = direct.get(&current) {
                    queue.extend(next.iter().cloned());
                }
            }
            supers_of.insert(role.clone(), seen.into_iter().collect());
        }

        let mut subs_of: HashMap<Role, BTreeSet<Role>> = HashMap::new();
        for (role, supers) in &supers_of {
            for sup in supers {
                subs_of.entry(sup.clone()).or_default().insert(role.clone());
            }
        }

        for (role, supers) in supers_of {
            let functional_supers = supers
                .iter()
                .filter(|s| self.roles.get(*s).map(|i| i.functional).unwrap_or(false))
                .cloned()
                .collect();
            let subs = subs_of
                .remove(&role)
                .map(|s| s.into_iter().collect())
                .unwrap_or_default();
            let info = self.roles.entry(role).or_default();
            info.supers = supers;
            info.subs = subs;
            info.functional_supers = functional_supers;
        }

        // Complex roles: transitive or with chains, plus everything above them
        let base: Vec<Role> = all_roles
            .iter()
            .filter(|r| self.is_transitive(r) || !self.chains_of(r).is_empty())
            .cloned()
            .collect();
        for info in self.roles.values_mut() {
            info.complex = false;
            info.automaton = None;
        }
        for role in &base {
            for sup in self.super_roles(role).to_vec() {
                self.roles.entry(sup).or_default().complex = true;
            }
        }

        let complex: Vec<Role> = all_roles.iter().filter(|r| self.is_complex(r)).cloned().collect();
        for role in complex {
            let automaton = self.build_automaton(&role, &mut Vec::new())?;
            debug!(role = %role, states = automaton.state_count(), "built role automaton");
            if let Some(info) = self.roles.get_mut(&role) {
                info.automaton = Some(Arc::new(automaton));
            }
        }

        self.prepared = true;
        Ok(())
    }

    fn is_equivalent(&self, a: &Role, b: &Role) -> bool {
        self.is_sub_role_of(a, b) && self.is_sub_role_of(b, a)
    }

    /// Chains with `role` as super, oriented the same way as `role`.
    fn chains_of(&self, role: &Role) -> Vec<Vec<Role>> {
        let named = role.named();
        let chains = self
            .roles
            .get(&named)
            .map(|info| info.chains.clone())
            .unwrap_or_default();
        if role.is_inverse() {
            chains
                .into_iter()
                .map(|chain| chain.iter().rev().map(|r| r.inverse()).collect())
                .collect()
        } else {
            chains
        }
    }

    fn build_automaton(&self, role: &Role, stack: &mut Vec<Role>) -> Result<RoleAutomaton> {
        if stack.contains(role) {
            return Err(ReasonerError::NonRegularRoleHierarchy(format!(
                "cyclic dependency through {}",
                role
            )));
        }
        stack.push(role.clone());

        let mut automaton = RoleAutomaton::new();
        let (initial, accepting) = (automaton.initial(), automaton.accepting());
        automaton.add_transition(initial, Some(role.clone()), accepting);

        let equivalents: Vec<Role> = self
            .super_roles(role)
            .iter()
            .filter(|s| self.is_equivalent(s, role))
            .cloned()
            .collect();

        for sub in self.sub_roles(role).to_vec() {
            if !equivalents.contains(&sub) && self.is_complex(&sub) {
                let inner = self.build_automaton(&sub, stack)?;
                automaton.embed(&inner, initial, accepting);
            }
        }

        for equivalent in &equivalents {
            if self.is_transitive(equivalent) {
                automaton.add_transition(accepting, None, initial);
            }
            for chain in self.chains_of(equivalent) {
                let is_self = |r: &Role| equivalents.contains(r);
                let n = chain.len();
                let first = is_self(&chain[0]);
                let last = is_self(&chain[n - 1]);
                if n == 2 && first && last {
                    automaton.add_transition(accepting, None, initial);
                } else if first && !chain[1..].iter().any(|r| is_self(r)) {
                    self.add_path(&mut automaton, accepting, &chain[1..], accepting, stack)?;
                } else if last && !chain[..n - 1].iter().any(|r| is_self(r)) {
                    self.add_path(&mut automaton, initial, &chain[..n - 1], initial, stack)?;
                } else if chain.iter().any(|r| is_self(r)) {
                    return Err(ReasonerError::NonRegularRoleHierarchy(format!(
                        "{} occurs inside its own chain",
                        role
                    )));
                } else {
                    self.add_path(&mut automaton, initial, &chain, accepting, stack)?;
                }
            }
        }

        stack.pop();
        Ok(automaton)
    }

    fn add_path(
        &self,
        automaton: &mut RoleAutomaton,
        from: u32,
        roles: &[Role],
        to: u32,
        stack: &mut Vec<Role>,
    ) -> Result<()> {
        let mut current = from;
        for (k, role) in roles.iter().enumerate() {
            let next = if k + 1 == roles.len() { to } else { automaton.add_state() };
            if self.is_complex(role) {
                let inner = self.build_automaton(role, stack)?;
                automaton.embed(&inner, current, next);
            } else {
                automaton.add_transition(current, Some(role.clone()), next);
            }
            current = next;
        }
        Ok(())
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn info(&self, role: &Role) -> Option<&RoleInfo> {
        self.roles.get(role)
    }

    /// Declared named roles, sorted.
    pub fn roles(&self) -> Vec<Role> {
        let mut roles: Vec<Role> = self.roles.keys().filter(|r| !r.is_inverse()).cloned().collect();
        roles.sort();
        roles
    }

    /// Reflexive-transitive super roles, `role` included.
    pub fn super_roles<'a>(&'a self, role: &'a Role) -> &'a [Role] {
        match self.roles.get(role) {
            Some(info) if !info.supers.is_empty() => &info.supers,
            _ => std::slice::from_ref(role),
        }
    }

    pub fn sub_roles<'a>(&'a self, role: &'a Role) -> &'a [Role] {
        match self.roles.get(role) {
            Some(info) if !info.subs.is_empty() => &info.subs,
            _ => std::slice::from_ref(role),
        }
    }

    pub fn is_sub_role_of(&self, sub: &Role, sup: &Role) -> bool {
        sub == sup || self.super_roles(sub).binary_search(sup).is_ok()
    }

    pub fn domains(&self, role: &Role) -> &[RoleRestriction] {
        self.roles.get(role).map(|i| i.domains.as_slice()).unwrap_or(&[])
    }

    pub fn ranges(&self, role: &Role) -> &[RoleRestriction] {
        self.roles.get(role).map(|i| i.ranges.as_slice()).unwrap_or(&[])
    }

    /// Functional roles among the super roles of `role`.
    pub fn functional_supers(&self, role: &Role) -> &[Role] {
        self.roles
            .get(role)
            .map(|i| i.functional_supers.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_functional(&self, role: &Role) -> bool {
        self.roles.get(role).map(|i| i.functional).unwrap_or(false)
            || !self.functional_supers(role).is_empty()
    }

    pub fn is_inverse_functional(&self, role: &Role) -> bool {
        self.is_functional(&role.inverse())
    }

    pub fn is_transitive(&self, role: &Role) -> bool {
        self.roles.get(role).map(|i| i.transitive).unwrap_or(false)
    }

    pub fn is_symmetric(&self, role: &Role) -> bool {
        self.roles.get(&role.named()).map(|i| i.symmetric).unwrap_or(false)
    }

    pub fn is_asymmetric(&self, role: &Role) -> bool {
        self.super_roles(role)
            .iter()
            .any(|s| self.roles.get(s).map(|i| i.asymmetric).unwrap_or(false))
    }

    pub fn is_reflexive(&self, role: &Role) -> bool {
        self.sub_roles(role)
            .iter()
            .any(|s| self.roles.get(s).map(|i| i.reflexive).unwrap_or(false))
    }

    pub fn is_irreflexive(&self, role: &Role) -> bool {
        self.super_roles(role)
            .iter()
            .any(|s| self.roles.get(s).map(|i| i.irreflexive).unwrap_or(false))
    }

    pub fn is_data(&self, role: &Role) -> bool {
        self.roles.get(&role.named()).map(|i| i.data).unwrap_or(false)
    }

    /// Whether some super role of `r` is declared disjoint with some super role of `s`.
    pub fn are_disjoint(&self, r: &Role, s: &Role) -> bool {
        self.super_roles(r).iter().any(|sup| {
            self.roles
                .get(sup)
                .map(|info| info.disjoints.iter().any(|d| self.is_sub_role_of(s, d)))
                .unwrap_or(false)
        })
    }

    pub fn chains(&self, role: &Role) -> Vec<Vec<Role>> {
        self.chains_of(role)
    }

    pub fn is_complex(&self, role: &Role) -> bool {
        self.roles.get(role).map(|i| i.complex).unwrap_or(false)
    }

    pub fn automaton(&self, role: &Role) -> Option<&RoleAutomaton> {
        self.roles.get(role).and_then(|i| i.automaton.as_deref())
    }

    /// Named roles declared reflexive.
    pub fn reflexive_roles(&self) -> Vec<Role> {
        self.roles()
            .into_iter()
            .filter(|r| self.roles.get(r).map(|i| i.reflexive).unwrap_or(false))
            .collect()
    }

    /// Super roles of the composition `r ∘ s`, used by the EL saturation.
    pub fn chain_supers(&self, r: &Role, s: &Role) -> Vec<Role> {
        let mut result = BTreeSet::new();
        for (candidate, info) in &self.roles {
            if info.transitive && self.is_sub_role_of(r, candidate) && self.is_sub_role_of(s, candidate) {
                result.extend(self.super_roles(candidate).iter().cloned());
            }
            for chain in &info.chains {
                if chain.len() == 2
                    && self.is_sub_role_of(r, &chain[0])
                    && self.is_sub_role_of(s, &chain[1])
                {
                    result.extend(self.super_roles(candidate).iter().cloned());
                }
            }
        }
        result.into_iter().collect()
    }

    /// Length of the longest declared chain.
    pub fn max_chain_length(&self) -> usize {
        self.roles
            .values()
            .flat_map(|i| i.chains.iter().map(|c| c.len()))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(name: &str) -> Role {
        Role::new(name)
    }

    fn prepared(build: impl FnOnce(&mut RBox)) -> RBox {
        let mut rbox = RBox::new();
        build(&mut rbox);
        rbox.prepare().unwrap();
        rbox
    }

    #[test]
    fn test_hierarchy_closure_mirrors_inverses() {
        let rbox = prepared(|rb| {
            for name in ["ex:a", "ex:b", "ex:c"] {
                rb.declare(&r(name), false);
            }
            rb.add_sub_role(r("ex:a"), r("ex:b"));
            rb.add_sub_role(r("ex:b"), r("ex:c"));
        });
        assert!(rbox.is_sub_role_of(&r("ex:a"), &r("ex:c")));
        assert!(rbox.is_sub_role_of(&r("ex:a").inverse(), &r("ex:c").inverse()));
        assert!(!rbox.is_sub_role_of(&r("ex:c"), &r("ex:a")));
        assert!(rbox.sub_roles(&r("ex:c")).contains(&r("ex:a")));
    }

    #[test]
    fn test_inverse_axiom_links_roles() {
        let rbox = prepared(|rb| {
            rb.declare(&r("ex:hasParent"), false);
            rb.declare(&r("ex:hasChild"), false);
            rb.add_inverse(r("ex:hasParent"), r("ex:hasChild"));
        });
        assert!(rbox.is_sub_role_of(&r("ex:hasParent"), &r("ex:hasChild").inverse()));
        assert!(rbox.is_sub_role_of(&r("ex:hasChild"), &r("ex:hasParent").inverse()));
    }

    #[test]
    fn test_domain_of_role_is_range_of_inverse() {
        let rbox = prepared(|rb| {
            rb.declare(&r("ex:r"), false);
            rb.add_domain(&r("ex:r"), Concept::atom("ex:A"), vec![0]);
        });
        assert_eq!(rbox.domains(&r("ex:r"))[0].concept, Concept::atom("ex:A"));
        assert_eq!(rbox.ranges(&r("ex:r").inverse())[0].concept, Concept::atom("ex:A"));
    }

    #[test]
    fn test_functional_through_super_role() {
        let rbox = prepared(|rb| {
            rb.declare(&r("ex:sub"), false);
            rb.declare(&r("ex:sup"), false);
            rb.add_sub_role(r("ex:sub"), r("ex:sup"));
            rb.info_mut(&r("ex:sup")).functional = true;
        });
        assert!(rbox.is_functional(&r("ex:sub")));
        assert!(rbox.is_inverse_functional(&r("ex:sup").inverse()));
        assert!(!rbox.is_functional(&r("ex:sup").inverse()));
    }

    #[test]
    fn test_transitive_role_gets_automaton() {
        let rbox = prepared(|rb| {
            rb.declare(&r("ex:part"), false);
            rb.info_mut(&r("ex:part")).transitive = true;
        });
        let automaton = rbox.automaton(&r("ex:part")).unwrap();
        let part = r("ex:part");
        assert!(automaton.accepts(&[part.clone(), part.clone()]));
        assert!(rbox.is_complex(&part.inverse()));
        assert!(rbox.is_transitive(&part.inverse()));
    }

    #[test]
    fn test_chain_automaton() {
        let rbox = prepared(|rb| {
            for name in ["ex:hasParent", "ex:hasBrother", "ex:hasUncle"] {
                rb.declare(&r(name), false);
            }
            rb.add_chain(vec![r("ex:hasParent"), r("ex:hasBrother")], r("ex:hasUncle"));
        });
        let automaton = rbox.automaton(&r("ex:hasUncle")).unwrap();
        assert!(automaton.accepts(&[r("ex:hasParent"), r("ex:hasBrother")]));
        assert!(automaton.accepts(&[r("ex:hasUncle")]));
        assert!(!automaton.accepts(&[r("ex:hasBrother"), r("ex:hasParent")]));
        assert_eq!(
            rbox.chain_supers(&r("ex:hasParent"), &r("ex:hasBrother")),
            vec![r("ex:hasUncle")]
        );
    }

    #[test]
    fn test_non_regular_chain_rejected() {
        let mut rbox = RBox::new();
        for name in ["ex:r", "ex:s"] {
            rbox.declare(&r(name), false);
        }
        rbox.add_chain(vec![r("ex:s"), r("ex:r"), r("ex:s")], r("ex:r"));
        assert!(matches!(
            rbox.prepare(),
            Err(ReasonerError::NonRegularRoleHierarchy(_))
        ));
    }

    #[test]
    fn test_disjointness_via_super_roles() {
        let rbox = prepared(|rb| {
            for name in ["ex:a", "ex:b", "ex:c"] {
                rb.declare(&r(name), false);
            }
            rb.add_sub_role(r("ex:a"), r("ex:b"));
            rb.add_disjoint(r("ex:b"), r("ex:c"));
        });
        assert!(rbox.are_disjoint(&r("ex:a"), &r("ex:c")));
        assert!(rbox.are_disjoint(&r("ex:c"), &r("ex:a")));
        assert!(!rbox.are_disjoint(&r("ex:a"), &r("ex:b")));
    }

    #[test]
    fn test_undeclared_role_defaults() {
        let rbox = RBox::new();
        let role = r("ex:unknown");
        assert_eq!(rbox.super_roles(&role), std::slice::from_ref(&role));
        assert!(!rbox.is_functional(&role));
        assert!(rbox.domains(&role).is_empty());
    }
}
