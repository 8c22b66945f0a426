use common::error::Error;

/// Extracts the loop that a detection witness points into.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleReconstructor;

impl CycleReconstructor {
    /// Reconstructs the negative cycle behind `witness`.
    ///
    /// The witness itself may sit downstream of the cycle rather than on it, so
    /// the walk follows predecessors backwards until it revisits a node. That
    /// node closes the loop; everything walked before it is the tail leading
    /// into the cycle and is trimmed off.
    ///
    /// # Returns
    /// Node indices in forward trade order with the first node repeated at the
    /// end, e.g. `[a, b, c, a]`.
    ///
    /// # Errors
    /// `Error::InternalInconsistency` if the predecessor chain ends before it
    /// closes a loop, and `Error::NodeIndexOutOfBounds` if the chain points
    /// outside the table.
    pub fn reconstruct(
        &self,
        predecessors: &[Option<usize>],
        witness: usize,
    ) -> Result<Vec<usize>, Error> {
        let num_nodes = predecessors.len();
        if witness >= num_nodes {
            return Err(Error::NodeIndexOutOfBounds(witness));
        }

        // position[v] = index of v in `walk`, if already visited.
        let mut position: Vec<Option<usize>> = vec![None; num_nodes];
        let mut walk: Vec<usize> = Vec::new();
        let mut current = witness;

        loop {
            if let Some(start) = position[current] {
                let mut cycle = walk.split_off(start);
                cycle.push(current);
                cycle.reverse();
                return Ok(cycle);
            }

            position[current] = Some(walk.len());
            walk.push(current);

            current = predecessors[current].ok_or_else(|| {
                Error::InternalInconsistency(format!(
                    "predecessor chain from node {} ends at node {} without closing a loop",
                    witness, current
                ))
            })?;

            if current >= num_nodes {
                return Err(Error::NodeIndexOutOfBounds(current));
            }
        }
    }
}
