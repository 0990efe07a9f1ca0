use crate::{Action, AgentId, Fmdp, Response, State, StateKey};

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: &'static str,
    pub terminal: bool,
}

impl State for Node {
    fn key(&self) -> StateKey {
        StateKey::from(self.name)
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Move(pub &'static str);

impl Action for Move {
    fn agent(&self) -> AgentId {
        AgentId::from(0)
    }

    fn is_null(&self) -> bool {
        self.0 == "null"
    }
}

/// `(next, reward, prob)` responses of one edge.
pub type Responses = Vec<(&'static str, f64, f64)>;

/// `(from, move, responses)`.
pub type Edge = (&'static str, &'static str, Responses);

/// Small explicit FMDP: named nodes, and per `(node, move)` a response list.
/// Nodes in `hidden` exist as targets but are left out of `states()`.
#[derive(Debug, Clone)]
pub struct Graph {
    pub start: &'static str,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub hidden: Vec<Node>,
    pub enumerable: bool,
}

impl Graph {
    pub fn new(start: &'static str) -> Self {
        Graph {
            start,
            nodes: Vec::new(),
            edges: Vec::new(),
            hidden: Vec::new(),
            enumerable: true,
        }
    }

    pub fn node(mut self, name: &'static str) -> Self {
        self.nodes.push(Node {
            name,
            terminal: false,
        });
        self
    }

    pub fn terminal(mut self, name: &'static str) -> Self {
        self.nodes.push(Node {
            name,
            terminal: true,
        });
        self
    }

    /// A non-terminal node reachable through edges but not enumerated.
    pub fn hidden(mut self, name: &'static str) -> Self {
        self.hidden.push(Node {
            name,
            terminal: false,
        });
        self
    }

    pub fn edge(mut self, from: &'static str, action: &'static str, responses: Responses) -> Self {
        self.edges.push((from, action, responses));
        self
    }

    pub fn get(&self, name: &str) -> Node {
        self.nodes
            .iter()
            .chain(&self.hidden)
            .find(|node| node.name == name)
            .cloned()
            .unwrap_or(Node {
                name: "missing",
                terminal: false,
            })
    }

    /// A -> B -> T, one action each, reward 1 per transition.
    pub fn chain() -> Self {
        Graph::new("A")
            .node("A")
            .node("B")
            .terminal("T")
            .edge("A", "go", vec![("B", 1.0, 1.0)])
            .edge("B", "go", vec![("T", 1.0, 1.0)])
    }

    /// S loops onto itself with reward 2; T is never reached.
    pub fn self_loop() -> Self {
        Graph::new("S")
            .node("S")
            .terminal("T")
            .edge("S", "stay", vec![("S", 2.0, 1.0)])
    }

    /// From S: "safe" pays 1 and ends, "risky" pays 4 with prob 0.5 else -1,
    /// passing through M which offers a final 1 or 0.
    pub fn gamble() -> Self {
        Graph::new("S")
            .node("S")
            .node("M")
            .terminal("T")
            .edge("S", "safe", vec![("T", 1.0, 1.0)])
            .edge("S", "risky", vec![("M", 4.0, 0.5), ("T", -1.0, 0.5)])
            .edge("M", "small", vec![("T", 0.0, 1.0)])
            .edge("M", "big", vec![("T", 1.0, 1.0)])
    }
}

impl Fmdp for Graph {
    type S = Node;
    type A = Move;

    fn states(&self) -> Option<Vec<Node>> {
        self.enumerable.then(|| self.nodes.clone())
    }

    fn initial(&self) -> Node {
        self.get(self.start)
    }

    fn actions(&self, state: &Node) -> Vec<Move> {
        if state.terminal {
            return vec![Move("null")];
        }
        let mut actions: Vec<Move> = Vec::new();
        for (from, action, _) in &self.edges {
            if *from == state.name && !actions.iter().any(|known| known.0 == *action) {
                actions.push(Move(*action));
            }
        }
        actions
    }

    fn responses(&self, state: &Node, action: &Move) -> Vec<Response<Node>> {
        if state.terminal {
            return vec![Response::new(state.clone(), 0.0, 1.0)];
        }
        self.edges
            .iter()
            .filter(|(from, name, _)| *from == state.name && *name == action.0)
            .flat_map(|(_, _, responses)| responses.iter())
            .map(|(next, reward, prob)| Response::new(self.get(next), *reward, *prob))
            .collect()
    }
}
