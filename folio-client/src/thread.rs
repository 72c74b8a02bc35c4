use std::collections::HashMap;

use crate::api::{Comment, CommentId};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentNode {
    pub comment: Comment,

    /// Display name of the author of the parent comment, for replies
    pub reply_to_user: Option<String>,

    pub children: Vec<CommentNode>,
}

impl Drop for CommentNode {
    fn drop(&mut self) {
        // deep reply chains would otherwise be dropped recursively
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut n) = stack.pop() {
            stack.append(&mut n.children);
        }
    }
}

impl CommentNode {
    /// Pre-order walk of the descendants of this node, not including itself
    pub fn descendants(&self) -> Vec<&CommentNode> {
        let mut res = Vec::new();
        let mut stack = self.children.iter().rev().collect::<Vec<_>>();
        while let Some(n) = stack.pop() {
            res.push(n);
            stack.extend(n.children.iter().rev());
        }
        res
    }
}

/// A root comment and every reply below it, flattened for two-tier display
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Thread<'a> {
    pub root: &'a Comment,
    pub replies: Vec<Reply<'a>>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Reply<'a> {
    pub comment: &'a Comment,
    pub reply_to_user: Option<&'a str>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommentTree {
    pub roots: Vec<CommentNode>,
}

impl CommentTree {
    /// Builds the forest from a flat list in server order.
    ///
    /// Comments whose parent is not in `comments` become roots. Parent links
    /// that loop back are cut: the first comment of each loop, in input order,
    /// becomes a root, so that every comment ends up exactly once in the tree.
    pub fn build(comments: &[Comment]) -> CommentTree {
        let mut index = HashMap::with_capacity(comments.len());
        for (i, c) in comments.iter().enumerate() {
            index.entry(c.id).or_insert(i);
        }

        let mut children = vec![Vec::new(); comments.len()];
        let mut roots = Vec::new();
        for (i, c) in comments.iter().enumerate() {
            match c.parent_id.and_then(|p| index.get(&p)) {
                Some(&p) => children[p].push(i),
                None => roots.push(i),
            }
        }

        let mut visited = vec![false; comments.len()];
        let mut res = CommentTree::default();
        for r in roots {
            res.roots
                .push(build_node(comments, &children, &mut visited, r, None));
        }
        for i in 0..comments.len() {
            if !visited[i] {
                tracing::warn!(
                    comment = ?comments[i].id,
                    parent = ?comments[i].parent_id,
                    "comment is part of a reply cycle, showing it as a root"
                );
                res.roots
                    .push(build_node(comments, &children, &mut visited, i, None));
            }
        }
        res
    }

    pub fn threads(&self) -> Vec<Thread<'_>> {
        self.roots
            .iter()
            .map(|r| Thread {
                root: &r.comment,
                replies: r
                    .descendants()
                    .into_iter()
                    .map(|n| Reply {
                        comment: &n.comment,
                        reply_to_user: n.reply_to_user.as_deref(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Total number of comments in the tree
    pub fn len(&self) -> usize {
        self.roots.iter().map(|r| 1 + r.descendants().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn find(&self, id: CommentId) -> Option<&CommentNode> {
        self.roots
            .iter()
            .flat_map(|r| std::iter::once(r).chain(r.descendants()))
            .find(|n| n.comment.id == id)
    }
}

/// Builds the subtree under `root` with an explicit work stack, so that reply
/// depth is bounded by memory rather than by the call stack
fn build_node(
    comments: &[Comment],
    children: &[Vec<usize>],
    visited: &mut [bool],
    root: usize,
    reply_to_user: Option<String>,
) -> CommentNode {
    let mut order = Vec::new();
    let mut adopted: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut reply_to: HashMap<usize, Option<String>> = HashMap::new();
    reply_to.insert(root, reply_to_user);
    visited[root] = true;
    let mut stack = vec![root];
    while let Some(i) = stack.pop() {
        order.push(i);
        let mut kept = Vec::with_capacity(children[i].len());
        for &c in &children[i] {
            if visited[c] {
                // loop back to an ancestor
                continue;
            }
            visited[c] = true;
            reply_to.insert(c, Some(comments[i].author_display().to_string()));
            kept.push(c);
        }
        stack.extend(kept.iter().rev());
        adopted.insert(i, kept);
    }

    // children come after their parent in `order`
    let mut built: HashMap<usize, CommentNode> = HashMap::with_capacity(order.len());
    for &i in order.iter().rev() {
        let node = CommentNode {
            comment: comments[i].clone(),
            reply_to_user: reply_to.remove(&i).flatten(),
            children: adopted
                .remove(&i)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|c| built.remove(&c))
                .collect(),
        };
        built.insert(i, node);
    }
    built.remove(&root).unwrap_or_else(|| CommentNode {
        comment: comments[root].clone(),
        reply_to_user: None,
        children: Vec::new(),
    })
}
