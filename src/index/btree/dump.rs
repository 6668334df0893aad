//! Level-order text dump of a tree, for tests and debugging.
//!
//! Grammar:
//! - a leaf renders as `[(k,v);(k,v);...;]` followed by `$` when it is the
//!   last child of its parent (or the root) and `#` when more siblings
//!   follow under the same parent;
//! - an index node renders as `@k1/k2/.../@`;
//! - every completed level ends with `%%`.
//!
//! ```text
//! @d/@%%[(a,a);(b,b);(c,c);]#[(d,d);(e,e);(f,f);(g,g);]$%%
//! ```
//!
//! This is not a storage format; nothing parses it back.

use std::collections::VecDeque;
use std::fmt::{self, Display, Write};

use crate::index::btree::node::Node;
use crate::BPlusTree;

impl<K: Display, V: Display> BPlusTree<K, V> {
    /// Render the tree level by level. An empty tree renders as `""`.
    ///
    /// # Example
    /// ```
    /// use leafchain::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(1).unwrap();
    /// for k in [1, 2, 3] {
    ///     tree.insert(k, k * 10);
    /// }
    /// assert_eq!(tree.dump(), "@2/@%%[(1,10);]#[(2,20);(3,30);]$%%");
    /// ```
    pub fn dump(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_dump(&mut out);
        out
    }

    fn write_dump(&self, out: &mut impl Write) -> fmt::Result {
        let Some(root) = self.root() else {
            return Ok(());
        };
        let arena = self.arena();

        let mut queue = VecDeque::from([root]);
        let mut left_in_level = 1usize;
        let mut next_level = 0usize;
        // Remaining leaf count under each parent whose children are leaves,
        // in the order those parents were visited
        let mut leaves_per_parent: VecDeque<usize> = VecDeque::new();

        while let Some(id) = queue.pop_front() {
            left_in_level -= 1;

            match arena.get(id) {
                Node::Leaf(leaf) => {
                    out.write_char('[')?;
                    for (k, v) in leaf.entries() {
                        write!(out, "({},{});", k, v)?;
                    }
                    let last_sibling = match leaves_per_parent.front_mut() {
                        None => true,
                        Some(remaining) => {
                            *remaining -= 1;
                            *remaining == 0
                        }
                    };
                    if last_sibling {
                        leaves_per_parent.pop_front();
                        out.write_str("]$")?;
                    } else {
                        out.write_str("]#")?;
                    }
                }
                Node::Index(index) => {
                    out.write_char('@')?;
                    for k in index.keys().as_slice() {
                        write!(out, "{}/", k)?;
                    }
                    out.write_char('@')?;

                    let children = index.children();
                    queue.extend(children.iter().copied());
                    if arena.get(children[0]).is_leaf() {
                        leaves_per_parent.push_back(children.len());
                    }
                    next_level += children.len();
                }
            }

            if left_in_level == 0 {
                out.write_str("%%")?;
                left_in_level = next_level;
                next_level = 0;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::BPlusTree;

    fn alphabet_tree(letters: &str) -> BPlusTree<char, String> {
        let mut tree = BPlusTree::new(3).unwrap();
        for c in letters.chars() {
            tree.insert(c, c.to_string());
        }
        tree
    }

    #[test]
    fn test_dump_empty() {
        let tree: BPlusTree<u32, u32> = BPlusTree::new(2).unwrap();
        assert_eq!(tree.dump(), "");
    }

    #[test]
    fn test_dump_single_leaf() {
        let tree = alphabet_tree("cab");
        assert_eq!(tree.dump(), "[(a,a);(b,b);(c,c);]$%%");
    }

    #[test]
    fn test_dump_two_levels() {
        let tree = alphabet_tree("abcdefg");
        assert_eq!(
            tree.dump(),
            "@d/@%%[(a,a);(b,b);(c,c);]#[(d,d);(e,e);(f,f);(g,g);]$%%"
        );
    }

    #[test]
    fn test_dump_three_levels_marks_each_parent() {
        let mut tree = BPlusTree::new(1).unwrap();
        for k in 1..=7u32 {
            tree.insert(k, k);
        }
        let dump = tree.dump();

        assert_eq!(dump.matches("%%").count(), tree.height());
        // one `$` per leaf-parent closes its run of leaves
        let leaf_parents = dump.split("%%").nth(1).unwrap().matches('@').count() / 2;
        assert_eq!(dump.matches("]$").count(), leaf_parents);
    }
}
