use seqevo_sim::base::{Alphabet, State};
use seqevo_sim::simulation::SimulationOutput;
use seqevo_sim::tree::{Node, Tree};
use std::io::{self, Write};

use crate::defaults::UNNAMED_NODE_PREFIX;

/// Named rows to export, in output order.
///
/// Without `ancestors` these are the alignment rows. With it, every node of
/// the tree is listed in pre-order; internal nodes without a label are named
/// after their pre-order index.
pub fn records<'a>(
    output: &'a SimulationOutput,
    tree: &Tree<Node>,
    ancestors: bool,
) -> Vec<(String, &'a [State])> {
    if !ancestors {
        return output
            .alignment
            .iter()
            .map(|s| (s.name.clone(), s.states.as_slice()))
            .collect();
    }
    tree.iter()
        .zip(output.states.iter())
        .enumerate()
        .map(|(i, (node, states))| {
            let name = if node.value.label.is_empty() && !node.is_leaf() {
                format!("{UNNAMED_NODE_PREFIX}{i}")
            } else {
                node.value.label.clone()
            };
            (name, states.value.as_slice())
        })
        .collect()
}

/// Write records as FASTA, wrapping sequence lines at `width` characters.
pub fn write_fasta(
    out: &mut dyn Write,
    alphabet: Alphabet,
    records: &[(String, &[State])],
    width: usize,
) -> io::Result<()> {
    for (name, states) in records {
        writeln!(out, ">{name}")?;
        let line: String = states
            .iter()
            .map(|&s| alphabet.character(s).unwrap_or('?'))
            .collect();
        if width == 0 || line.is_empty() {
            writeln!(out, "{line}")?;
            continue;
        }
        for chunk in line.as_bytes().chunks(width) {
            out.write_all(chunk)?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqevo_sim::model::SubstitutionModel;
    use seqevo_sim::simulation::SimulationBuilder;

    #[test]
    fn test_records_name_unlabeled_ancestors() {
        let tree = Tree::node(
            Node::new("", 0.0),
            vec![
                Tree::node(
                    Node::new("", 0.1),
                    vec![Tree::leaf(Node::new("A", 0.1)), Tree::leaf(Node::new("B", 0.2))],
                ),
                Tree::leaf(Node::new("C", 0.3)),
            ],
        );
        let output = SimulationBuilder::new()
            .model(SubstitutionModel::jc().unwrap())
            .tree(tree.clone())
            .sites(5)
            .seed(vec![1])
            .chunks(1)
            .build()
            .unwrap()
            .run()
            .unwrap();

        let rows = records(&output, &tree, true);
        let names: Vec<&str> = rows.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["node0", "node1", "A", "B", "C"]);
        assert!(rows.iter().all(|(_, states)| states.len() == 5));
        assert_eq!(rows[2].1, output.alignment.get("A").unwrap());

        let leaves = records(&output, &tree, false);
        assert_eq!(leaves.len(), 3);
    }

    #[test]
    fn test_write_fasta_wraps_lines() {
        let states: Vec<State> = vec![0, 1, 2, 3, 0];
        let records = vec![("seq1".to_string(), states.as_slice())];
        let mut buf = Vec::new();
        write_fasta(&mut buf, Alphabet::Dna, &records, 2).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), ">seq1\nAC\nGT\nA\n");

        let mut buf = Vec::new();
        write_fasta(&mut buf, Alphabet::Dna, &records, 0).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), ">seq1\nACGTA\n");
    }
}
