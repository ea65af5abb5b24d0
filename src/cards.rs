use std::fmt;
use std::str::FromStr;
use indexmap::IndexSet;
use tracing::{debug, warn};
use crate::error::{HpError, Result};
use crate::graph_trait::Graph;
use crate::hamiltonian::is_hamiltonian_path;
use crate::labeled::LabeledGraph;
use crate::reduction::DerivedVertex;

pub const COLORS: [char; 4] = ['r', 'g', 'b', 'y'];

/// card with a colour and a number, written "r5"
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card {
    pub color: char,
    pub number: u32,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.color, self.number)
    }
}

impl FromStr for Card {
    type Err = HpError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut chars = s.chars();
        let color = chars.next()
            .filter(|c| c.is_alphabetic())
            .ok_or_else(|| HpError::InvalidArgument(format!("invalid card {s:?}")))?;
        let number = chars.as_str().parse::<u32>()
            .map_err(|_| HpError::InvalidArgument(format!("invalid card {s:?}")))?;
        Ok(Card { color, number })
    }
}

impl From<&DerivedVertex> for Card {
    /// colour from the original vertex, number from the edge
    fn from(x: &DerivedVertex) -> Self {
        Card {
            color: COLORS[x.vertex % 4],
            number: ((x.edge.0 + x.edge.1) % 9) as u32,
        }
    }
}

/// parses a comma separated card list like "r5,g5,g7"
pub fn parse_cards(s: &str) -> Result<Vec<Card>> {
    s.split(',')
        .filter(|c| !c.trim().is_empty())
        .map(Card::from_str)
        .collect()
}

pub fn format_cards(cards: &[Card]) -> String {
    cards.iter().map(Card::to_string).collect::<Vec<_>>().join(",")
}

/// the card sequence of a derived graph (one card per vertex, in vertex order)
pub fn card_sequence<G: Graph>(g: &LabeledGraph<DerivedVertex, G>) -> Vec<Card> {
    g.labels().map(Card::from).collect()
}

/// vertex of the colour / number graph
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CardSide {
    Color(char),
    Number(u32),
}

impl fmt::Display for CardSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardSide::Color(c) => write!(f, "{c}"),
            CardSide::Number(n) => write!(f, "{n}"),
        }
    }
}

/// line graph of 'g' restricted to 'edges' (vertex i of the result is edges[i])
/// -> two vertices are adjacent iff their edges share an endpoint
pub fn line_graph<G: Graph, H: Graph>(g: &G, edges: &[(usize, usize)]) -> Result<H> {
    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); g.size()];
    for (i, (u, v)) in edges.iter().enumerate() {
        if *u >= g.size() || *v >= g.size() || !g.has_edge(*u, *v) {
            return Err(HpError::InvalidArgument(format!("{{{u}, {v}}} is no edge of the graph")));
        }
        incident[*u].push(i);
        incident[*v].push(i);
    }
    let mut h = H::new(edges.len());
    for inc in incident {
        for (j, a) in inc.iter().enumerate() {
            for b in inc.iter().skip(j + 1) {
                h.add_edge_checked(*a, *b);
            }
        }
    }
    Ok(h)
}

/// bipartite colour / number graph of the (distinct) cards and its line graph on the cards
/// -> two cards are adjacent in the line graph iff they share the colour or the number
pub fn card_graphs<H: Graph>(cards: &[Card]) -> Result<(LabeledGraph<CardSide, H>, LabeledGraph<Card, H>)> {
    let distinct: IndexSet<Card> = cards.iter().copied().collect();
    if distinct.len() < cards.len() {
        warn!("{} duplicate card(s) ignored", cards.len() - distinct.len());
    }
    let sides: Vec<(CardSide, CardSide)> = distinct.iter()
        .map(|c| (CardSide::Color(c.color), CardSide::Number(c.number)))
        .collect();
    let bipartite: LabeledGraph<CardSide, H> = LabeledGraph::from_edges(Vec::new(), sides.iter().copied());
    let edges: Vec<(usize, usize)> = sides.iter()
        .map(|(x, y)| Ok((bipartite.indices(&[*x])?[0], bipartite.indices(&[*y])?[0])))
        .collect::<Result<_>>()?;
    let line: H = line_graph(bipartite.graph(), &edges)?;
    let line = LabeledGraph::from_graph(line, distinct)?;
    debug!("card graphs: {} colours + numbers, {} cards, {} card pairs",
           bipartite.size(), line.size(), line.graph().edge_count());
    Ok((bipartite, line))
}

/// returns whether the cards can be played in the given order, i.e., whether the order
/// is a Hamiltonian path of the card line graph (a repeated card is never playable)
pub fn is_playable_sequence<H: Graph>(cards: &[Card]) -> Result<bool> {
    let (_, line) = card_graphs::<H>(cards)?;
    if line.size() != cards.len() {
        return Ok(false);
    }
    let path = line.indices(cards)?;
    Ok(is_hamiltonian_path(line.graph(), &path))
}

#[cfg(test)]
mod tests {
    use crate::cards::*;
    use crate::graph::GraphAM;
    use crate::petgraph::PGraph;
    use crate::reduction::{derived_path, DerivedVertex};

    #[test]
    fn test_parse_cards() {
        let cards = parse_cards("r5, g5,g7,").unwrap();
        assert_eq!(cards, vec![Card { color: 'r', number: 5 }, Card { color: 'g', number: 5 }, Card { color: 'g', number: 7 }]);
        assert_eq!(format_cards(&cards), "r5,g5,g7");
        assert!(parse_cards("r5,5g").is_err());
        assert!(parse_cards("r").is_err());
        assert!(parse_cards("").unwrap().is_empty());
    }

    #[test]
    fn test_derived_vertex_card() {
        assert_eq!(Card::from(&DerivedVertex::new(6, 9)), Card { color: 'b', number: 6 });
        assert_eq!(Card::from(&DerivedVertex::new(4, 1)).to_string(), "r5");
        assert_eq!(Card::from(&DerivedVertex::new(3, 2)).to_string(), "y5");
    }

    #[test]
    fn test_card_graphs() {
        let cards = parse_cards("r5,g5,g7,r7,b1").unwrap();
        let (bip, line): (LabeledGraph<CardSide, GraphAM>, _) = card_graphs(&cards).unwrap();
        // colours r, g, b + numbers 5, 7, 1
        assert_eq!(bip.size(), 6);
        assert_eq!(bip.graph().edge_count(), 5);
        assert!(bip.has_edge(&CardSide::Color('r'), &CardSide::Number(7)));
        assert_eq!(line.size(), 5);
        // r5-g5, r5-r7, g5-g7, g7-r7
        assert_eq!(line.graph().edge_count(), 4);
        let b1 = Card { color: 'b', number: 1 };
        assert_eq!(line.degree(&b1).unwrap(), 0);
    }

    #[test]
    fn test_playable() {
        assert!(is_playable_sequence::<PGraph>(&parse_cards("r5,g5,g7,r7").unwrap()).unwrap());
        assert!(!is_playable_sequence::<PGraph>(&parse_cards("r5,g7,g5,r7").unwrap()).unwrap());
        assert!(!is_playable_sequence::<GraphAM>(&parse_cards("r5,g5,r5").unwrap()).unwrap());
        assert!(is_playable_sequence::<GraphAM>(&parse_cards("y3").unwrap()).unwrap());
    }

    #[test]
    fn test_line_graph_of_triangle() {
        let mut g = GraphAM::new(3);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(0, 2);
        let h: PGraph = line_graph(&g, &g.edges()).unwrap();
        assert_eq!(h.size(), 3);
        assert_eq!(h.edge_count(), 3);
        assert!(line_graph::<GraphAM, PGraph>(&g, &[(0, 1), (1, 1)]).is_err());
    }

    #[test]
    fn test_sequence_of_derived_path() {
        // derived path of the path graph 1 - 2: (2, (1, 2)), (1, (1, 2))
        let g: LabeledGraph<usize, GraphAM> = LabeledGraph::from_edges(vec![1, 2], vec![(1, 2)]);
        let d: LabeledGraph<DerivedVertex, GraphAM> = LabeledGraph::from_edges(derived_path(&g, &[2, 1]).unwrap(), vec![]);
        assert_eq!(format_cards(&card_sequence(&d)), "b3,g3");
    }
}
