use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Nested mapping from path segment to either a subtree or file content.
///
/// Serializes as a plain JSON object: directories become nested objects and
/// files become strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    nodes: BTreeMap<String, Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    File(String),
    Dir(Tree),
}

impl Node {
    pub fn as_file(&self) -> Option<&str> {
        match self {
            Node::File(content) => Some(content),
            Node::Dir(_) => None,
        }
    }

    pub fn as_dir(&self) -> Option<&Tree> {
        match self {
            Node::Dir(tree) => Some(tree),
            Node::File(_) => None,
        }
    }
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `content` at the leaf named by `segments`, creating the
    /// intermediate directories.
    ///
    /// A segment that is already a file cannot become a directory, and an
    /// existing directory cannot be replaced by a file; both are reported
    /// instead of resolved. Replacing one file with another is allowed.
    pub fn insert(&mut self, segments: &[&str], content: String) -> Result<()> {
        let Some((leaf, parents)) = segments.split_last() else {
            return Err(Error::EmptyPath);
        };

        let mut current = self;
        for (depth, segment) in parents.iter().enumerate() {
            let node = current
                .nodes
                .entry((*segment).to_owned())
                .or_insert_with(|| Node::Dir(Tree::new()));

            current = match node {
                Node::Dir(tree) => tree,
                Node::File(_) => {
                    return Err(Error::StructureConflict {
                        path: segments.join("/"),
                        at: segments[..=depth].join("/"),
                    });
                }
            };
        }

        if let Some(Node::Dir(_)) = current.nodes.get(*leaf) {
            return Err(Error::DirectoryOccupied {
                path: segments.join("/"),
            });
        }

        current.nodes.insert((*leaf).to_owned(), Node::File(content));
        Ok(())
    }

    /// [`insert`](Self::insert) with a slash-separated path.
    pub fn insert_path(&mut self, path: &str, content: String) -> Result<()> {
        let segments: Vec<&str> = path.split('/').collect();
        self.insert(&segments, content)
    }

    pub fn get(&self, segment: &str) -> Option<&Node> {
        self.nodes.get(segment)
    }

    /// Look up a slash-separated path.
    pub fn get_path(&self, path: &str) -> Option<&Node> {
        let mut segments = path.split('/');
        let mut node = self.nodes.get(segments.next()?)?;
        for segment in segments {
            node = node.as_dir()?.nodes.get(segment)?;
        }
        Some(node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of files anywhere below this node.
    pub fn file_count(&self) -> usize {
        self.nodes
            .values()
            .map(|node| match node {
                Node::File(_) => 1,
                Node::Dir(tree) => tree.file_count(),
            })
            .sum()
    }
}
