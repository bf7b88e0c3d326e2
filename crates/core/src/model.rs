use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DocumentError;

/// Deepest nesting accepted from a document, in tree levels.
pub const MAX_DEPTH: usize = 256;

/// One node of an input tree document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            children: Vec::new(),
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            value: None,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A tree document that passed validation.
///
/// Only a `Document` can be handed to the renderer, so every value is a
/// finite non-negative number (never `-0.0`), every subtree sum is finite,
/// and nesting is bounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    root: TreeNode,
}

impl Document {
    pub fn new(mut root: TreeNode) -> Result<Self, DocumentError> {
        let path = root.name.clone();
        check_node(&mut root, &path, 0)?;
        resolved_weight(&root, &path)?;
        Ok(Self { root })
    }

    /// Parses without `serde_json`'s recursion limit so that nesting is
    /// judged against [`MAX_DEPTH`] alone.
    pub fn from_json_str(s: &str) -> Result<Self, DocumentError> {
        let mut de = serde_json::Deserializer::from_str(s);
        de.disable_recursion_limit();
        let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))
            .map_err(|e| DocumentError::Json(e.to_string()))?;
        if let Err(e) = de.end() {
            drop_flat(value);
            return Err(DocumentError::Json(e.to_string()));
        }
        let doc = Self::from_value(&value);
        drop_flat(value);
        doc
    }

    pub fn from_value(value: &Value) -> Result<Self, DocumentError> {
        let root = node_from_value(value, "", 0)?;
        resolved_weight(&root, &root.name)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn into_root(self) -> TreeNode {
        self.root
    }

    /// Number of nodes in the document, root included.
    pub fn node_count(&self) -> usize {
        fn count(n: &TreeNode) -> usize {
            1 + n.children.iter().map(count).sum::<usize>()
        }
        count(&self.root)
    }
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Rejects negative and non-finite values; `-0.0` comes back as `0.0` so
/// zero-weight siblings compare equal.
fn check_value(path: &str, value: Option<f64>) -> Result<Option<f64>, DocumentError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(DocumentError::InvalidValue {
            path: path.to_string(),
            value: v,
        }),
        other => Ok(other.map(|v| v + 0.0)),
    }
}

fn check_node(node: &mut TreeNode, path: &str, depth: usize) -> Result<(), DocumentError> {
    if depth >= MAX_DEPTH {
        return Err(DocumentError::TooDeep {
            path: path.to_string(),
            limit: MAX_DEPTH,
        });
    }
    node.value = check_value(path, node.value)?;
    for child in &mut node.children {
        let child_path = join(path, &child.name);
        check_node(child, &child_path, depth + 1)?;
    }
    Ok(())
}

/// Weight the layout will give `node`; fails when a sum overflows.
fn resolved_weight(node: &TreeNode, path: &str) -> Result<f64, DocumentError> {
    if node.children.is_empty() {
        return Ok(node.value.unwrap_or(0.0));
    }
    let mut total = 0.0;
    for child in &node.children {
        total += resolved_weight(child, &join(path, &child.name))?;
    }
    if total.is_finite() {
        Ok(total)
    } else {
        Err(DocumentError::WeightOverflow {
            path: path.to_string(),
        })
    }
}

/// Tears a parsed value down with an explicit stack; dropping a deeply
/// nested `Value` recursively can exhaust the thread stack.
fn drop_flat(value: Value) {
    let mut stack = vec![value];
    while let Some(mut v) = stack.pop() {
        match &mut v {
            Value::Array(items) => stack.extend(items.drain(..)),
            Value::Object(obj) => stack.extend(std::mem::take(obj).into_iter().map(|(_, v)| v)),
            _ => {}
        }
    }
}

fn node_from_value(value: &Value, parent: &str, depth: usize) -> Result<TreeNode, DocumentError> {
    let Some(obj) = value.as_object() else {
        return Err(DocumentError::NotAnObject {
            path: parent.to_string(),
        });
    };
    let name = match obj.get("name") {
        Some(Value::String(s)) => s.clone(),
        _ => {
            return Err(DocumentError::MissingName {
                path: parent.to_string(),
            })
        }
    };
    let path = join(parent, &name);
    if depth >= MAX_DEPTH {
        return Err(DocumentError::TooDeep {
            path,
            limit: MAX_DEPTH,
        });
    }

    let value = match obj.get("value") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(_) => return Err(DocumentError::NonNumericValue { path }),
    };
    let value = check_value(&path, value)?;

    let children = match obj.get("children") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| node_from_value(item, &path, depth + 1))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(DocumentError::ChildrenNotArray { path }),
    };

    Ok(TreeNode {
        name,
        value,
        children,
    })
}
