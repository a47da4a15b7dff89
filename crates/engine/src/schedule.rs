//! crates/engine/src/schedule.rs
//!
//! Ordering of copy instructions for in-place reconstruction.
//!
//! When the basis and the destination are the same file, a copy may read
//! bytes that another copy has already overwritten. Copies form the nodes of
//! a dependency graph with an edge `u -> v` whenever `u` writes into the span
//! `v` still has to read, so `v` must run first. A depth-first postorder of
//! that graph is a safe execution order. Copies closing a cycle are split
//! off as fallbacks: their source bytes are buffered before anything is
//! written and stored after every other write.

/// A copy instruction reduced to its spans.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CopySpan {
    /// Basis offset read from.
    pub old_offset: u64,
    /// Destination offset written to.
    pub new_offset: u64,
    /// Bytes moved.
    pub len: u64,
}

impl CopySpan {
    const fn read_end(&self) -> u64 {
        self.old_offset + self.len
    }

    const fn write_end(&self) -> u64 {
        self.new_offset + self.len
    }

    /// Returns `true` when writing this span clobbers bytes `other` reads.
    const fn clobbers(&self, other: &Self) -> bool {
        self.new_offset < other.read_end() && other.old_offset < self.write_end()
    }
}

/// Execution plan for a set of copies.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CopySchedule {
    /// Indices of copies to run directly, in execution order.
    pub order: Vec<usize>,
    /// Indices of copies whose sources must be buffered up front.
    pub fallback: Vec<usize>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Builds the overlap graph for `copies` and orders it.
///
/// Every index appears exactly once in either `order` or `fallback`.
/// Zero-length spans never conflict.
#[must_use]
pub fn schedule_copies(copies: &[CopySpan]) -> CopySchedule {
    let graph = overlap_graph(copies);
    let count = copies.len();

    let mut color = vec![Color::White; count];
    let mut is_fallback = vec![false; count];
    let mut postorder = Vec::with_capacity(count);
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..count {
        if color[root] != Color::White {
            continue;
        }
        color[root] = Color::Gray;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            if let Some(&succ) = graph[node].get(next) {
                frame.1 += 1;
                match color[succ] {
                    Color::White => {
                        color[succ] = Color::Gray;
                        stack.push((succ, 0));
                    }
                    Color::Gray => is_fallback[succ] = true,
                    Color::Black => {}
                }
            } else {
                color[node] = Color::Black;
                postorder.push(node);
                stack.pop();
            }
        }
    }

    let (mut fallback, order): (Vec<usize>, Vec<usize>) =
        postorder.into_iter().partition(|&node| is_fallback[node]);
    fallback.sort_unstable();
    CopySchedule { order, fallback }
}

/// Adjacency lists: `graph[u]` holds every `v != u` whose read span `u`
/// overwrites, in ascending index order.
fn overlap_graph(copies: &[CopySpan]) -> Vec<Vec<usize>> {
    let mut by_read: Vec<usize> = (0..copies.len())
        .filter(|&i| copies[i].len > 0)
        .collect();
    by_read.sort_by_key(|&i| copies[i].old_offset);
    let longest = by_read.iter().map(|&i| copies[i].len).max().unwrap_or(0);

    let mut graph = vec![Vec::new(); copies.len()];
    for (u, writer) in copies.iter().enumerate() {
        if writer.len == 0 {
            continue;
        }
        // Reads overlapping [new, new + len) start before its end and no
        // earlier than `longest` bytes before its start.
        let lower = writer.new_offset.saturating_sub(longest);
        let first = by_read.partition_point(|&i| copies[i].old_offset < lower);
        let last = by_read.partition_point(|&i| copies[i].old_offset < writer.write_end());
        let edges = &mut graph[u];
        for &v in &by_read[first..last] {
            if v != u && writer.clobbers(&copies[v]) {
                edges.push(v);
            }
        }
        edges.sort_unstable();
    }
    graph
}
