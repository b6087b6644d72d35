use std::collections::HashMap;
use std::hash::Hash;

use crate::token::Groups;

// Literal key for exact-match edges, class for predicate edges.
pub trait Alphabet: Copy {
    type Lit: Copy + Eq + Hash;
    type Class: Copy + Eq;

    fn literal(self) -> Self::Lit;
    fn is(self, class: Self::Class) -> bool;
}

// Nodes live in an arena and reference each other by index; the start
// node is always index zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIdx(u32);

impl NodeIdx {
    const START: NodeIdx = NodeIdx(0);

    #[inline]
    fn idx(self) -> usize {
        self.0 as usize
    }
}

struct Node<A: Alphabet, T> {
    accept: Option<T>,
    groups: Groups,
    literals: HashMap<A::Lit, NodeIdx>,
    // tried in insertion order, after literals
    classes: Vec<(A::Class, NodeIdx)>,
    // only ever set on the start node
    default_edge: Option<NodeIdx>,
}

pub struct Fsm<A: Alphabet, T> {
    nodes: Vec<Node<A, T>>,
}

impl<A: Alphabet, T: Clone> Fsm<A, T> {
    pub fn new() -> Self {
        let mut fsm = Fsm { nodes: Vec::new() };
        fsm.node(None);
        fsm
    }

    pub fn start(&self) -> NodeIdx {
        NodeIdx::START
    }

    pub fn node(&mut self, accept: Option<T>) -> NodeIdx {
        let idx = NodeIdx(self.nodes.len() as u32);
        self.nodes.push(Node {
            accept,
            groups: Groups::NONE,
            literals: HashMap::new(),
            classes: Vec::new(),
            default_edge: None,
        });
        idx
    }

    pub fn set_accepting(&mut self, node: NodeIdx, tag: T, groups: Groups) {
        let n = &mut self.nodes[node.idx()];
        n.accept = Some(tag);
        n.groups = groups;
    }

    pub fn set_default(&mut self, src: NodeIdx, target: NodeIdx) {
        self.nodes[src.idx()].default_edge = Some(target);
    }

    pub fn add_literal(&mut self, src: NodeIdx, lit: A::Lit, target: Option<NodeIdx>) -> NodeIdx {
        if let Some(target) = target {
            self.nodes[src.idx()].literals.insert(lit, target);
            return target;
        }
        if let Some(&existing) = self.nodes[src.idx()].literals.get(&lit) {
            return existing;
        }
        let fresh = self.node(None);
        self.nodes[src.idx()].literals.insert(lit, fresh);
        fresh
    }

    pub fn add_class(&mut self, src: NodeIdx, class: A::Class, target: Option<NodeIdx>) -> NodeIdx {
        if let Some(pos) = self.nodes[src.idx()].classes.iter().position(|&(c, _)| c == class) {
            if let Some(target) = target {
                self.nodes[src.idx()].classes[pos].1 = target;
                return target;
            }
            return self.nodes[src.idx()].classes[pos].1;
        }
        let target = match target {
            Some(t) => t,
            None => self.node(None),
        };
        self.nodes[src.idx()].classes.push((class, target));
        target
    }

    // Thread a keyword through the trie rooted at src. Existing prefix
    // nodes are reused untouched; fresh nodes take the chain's side
    // transitions and the default acceptance for their prefix length. The
    // full-keyword node gets final_tag unconditionally, so later chains
    // override earlier ones.
    pub fn add_chain(
        &mut self,
        src: NodeIdx,
        word: &[A::Lit],
        final_tag: T,
        final_groups: Groups,
        mut default_for: impl FnMut(usize) -> Option<(T, Groups)>,
        side: &[(A::Class, NodeIdx)],
    ) -> NodeIdx {
        let mut cur = src;
        for (i, &lit) in word.iter().enumerate() {
            let next = match self.nodes[cur.idx()].literals.get(&lit) {
                Some(&existing) => existing,
                None => {
                    let fresh = self.node(None);
                    if i + 1 < word.len() {
                        if let Some((tag, groups)) = default_for(i + 1) {
                            self.set_accepting(fresh, tag, groups);
                        }
                    }
                    for &(class, target) in side {
                        self.add_class(fresh, class, Some(target));
                    }
                    self.nodes[cur.idx()].literals.insert(lit, fresh);
                    fresh
                }
            };
            cur = next;
        }
        self.set_accepting(cur, final_tag, final_groups);
        cur
    }

    pub fn literal_target(&self, src: NodeIdx, lit: A::Lit) -> Option<NodeIdx> {
        self.nodes[src.idx()].literals.get(&lit).copied()
    }

    // Resolution order: literal edge, class edges in insertion order,
    // then the start node's catch-all.
    #[inline]
    pub fn step(&self, from: NodeIdx, sym: A) -> Option<NodeIdx> {
        let node = &self.nodes[from.idx()];
        if let Some(&target) = node.literals.get(&sym.literal()) {
            return Some(target);
        }
        for &(class, target) in &node.classes {
            if sym.is(class) {
                return Some(target);
            }
        }
        node.default_edge
    }

    #[inline]
    pub fn accepts(&self, node: NodeIdx) -> Option<&T> {
        self.nodes[node.idx()].accept.as_ref()
    }

    #[inline]
    pub fn groups(&self, node: NodeIdx) -> Groups {
        self.nodes[node.idx()].groups
    }
}

impl Alphabet for char {
    type Lit = char;
    type Class = crate::charclass::CharClass;

    #[inline]
    fn literal(self) -> char {
        self
    }

    #[inline]
    fn is(self, class: Self::Class) -> bool {
        class.contains(self)
    }
}
