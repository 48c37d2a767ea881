use super::NodeId;
use crate::dependency::DependencySet;
use mimizuku_core::Role;

/// A role edge. Stored with a non-inverted role; `x r⁻ y` is kept as `y r x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub role: Role,
    pub from: NodeId,
    pub to: NodeId,
    pub ds: DependencySet,
}

impl Edge {
    /// The other endpoint, seen from `node`.
    pub fn neighbour(&self, node: NodeId) -> NodeId {
        if self.from == node {
            self.to
        } else {
            self.from
        }
    }

    /// The role as seen from `node`: inverted when `node` is the target.
    pub fn role_from(&self, node: NodeId) -> Role {
        if self.from == node {
            self.role.clone()
        } else {
            self.role.inverse()
        }
    }

    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation() {
        let edge = Edge {
            role: Role::new("ex:r"),
            from: NodeId(1),
            to: NodeId(2),
            ds: DependencySet::independent(),
        };
        assert_eq!(edge.neighbour(NodeId(1)), NodeId(2));
        assert_eq!(edge.neighbour(NodeId(2)), NodeId(1));
        assert!(edge.role_from(NodeId(2)).is_inverse());
        assert!(edge.connects(NodeId(2), NodeId(1)));
    }
}
