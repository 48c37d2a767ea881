//! Role automata for complex roles.
//!
//! A universal restriction `∀S.C` over a transitive role or a role with
//! chain sub-properties is propagated state by state: a node carrying
//! `∀[S@q].C` passes `∀[S@q'].C` to every neighbour reached by a transition
//! `q -R-> q'`, and receives `C` once `q` is final.

use crate::term::Role;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    /// `None` is an ε-transition.
    pub label: Option<Role>,
    pub target: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAutomaton {
    initial: u32,
    accepting: u32,
    transitions: Vec<Vec<Transition>>,
}

impl RoleAutomaton {
    /// Automaton with an initial and an accepting state and no transitions.
    pub(crate) fn new() -> Self {
        Self {
            initial: 0,
            accepting: 1,
            transitions: vec![Vec::new(), Vec::new()],
        }
    }

    pub fn initial(&self) -> u32 {
        self.initial
    }

    pub fn accepting(&self) -> u32 {
        self.accepting
    }

    pub fn is_accepting(&self, state: u32) -> bool {
        state == self.accepting
    }

    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn transitions(&self, state: u32) -> &[Transition] {
        self.transitions
            .get(state as usize)
            .map(|t| t.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn add_state(&mut self) -> u32 {
        self.transitions.push(Vec::new());
        (self.transitions.len() - 1) as u32
    }

    pub(crate) fn add_transition(&mut self, from: u32, label: Option<Role>, to: u32) {
        let transition = Transition { label, target: to };
        let outgoing = &mut self.transitions[from as usize];
        if !outgoing.contains(&transition) {
            outgoing.push(transition);
        }
    }

    /// Copies `other` between `from` and `to` using ε-transitions.
    pub(crate) fn embed(&mut self, other: &RoleAutomaton, from: u32, to: u32) {
        let offset = self.transitions.len() as u32;
        for _ in 0..other.state_count() {
            self.add_state();
        }
        for (state, outgoing) in other.transitions.iter().enumerate() {
            for t in outgoing {
                self.add_transition(state as u32 + offset, t.label.clone(), t.target + offset);
            }
        }
        self.add_transition(from, None, other.initial + offset);
        self.add_transition(other.accepting + offset, None, to);
    }

    /// Automaton for the inverse role: reversed transitions, inverted labels.
    pub fn reversed(&self) -> RoleAutomaton {
        let mut transitions = vec![Vec::new(); self.transitions.len()];
        for (state, outgoing) in self.transitions.iter().enumerate() {
            for t in outgoing {
                transitions[t.target as usize].push(Transition {
                    label: t.label.as_ref().map(|r| r.inverse()),
                    target: state as u32,
                });
            }
        }
        RoleAutomaton {
            initial: self.accepting,
            accepting: self.initial,
            transitions,
        }
    }

    /// Whether the automaton accepts `word`, treating labels literally.
    pub fn accepts(&self, word: &[Role]) -> bool {
        let mut current = self.epsilon_closure(vec![self.initial]);
        for role in word {
            let next: Vec<u32> = current
                .iter()
                .flat_map(|&s| self.transitions(s).iter())
                .filter(|t| t.label.as_ref() == Some(role))
                .map(|t| t.target)
                .collect();
            current = self.epsilon_closure(next);
        }
        current.contains(&self.accepting)
    }

    fn epsilon_closure(&self, mut states: Vec<u32>) -> Vec<u32> {
        let mut i = 0;
        while i < states.len() {
            let state = states[i];
            for t in self.transitions(state) {
                if t.label.is_none() && !states.contains(&t.target) {
                    states.push(t.target);
                }
            }
            i += 1;
        }
        states
    }
}
