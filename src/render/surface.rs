use std::fmt::Write as _;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{Attr, AttrValue, Datum, Props};
use crate::error::{ChartError, ChartResult};

/// Stable handle of a node inside one [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// In-flight attribute animation on one node.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    duration: Duration,
    elapsed: Duration,
    from: IndexMap<String, f64>,
    to: IndexMap<String, AttrValue>,
}

impl Transition {
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    #[must_use]
    pub fn target(&self, name: &str) -> Option<&AttrValue> {
        self.to.get(name)
    }
}

/// One element of the drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    tag: String,
    attrs: IndexMap<String, AttrValue>,
    style: IndexMap<String, String>,
    text: Option<String>,
    datum: Option<(Datum, usize)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    transition: Option<Transition>,
}

impl Node {
    fn new(tag: &str, parent: Option<NodeId>, datum: Option<(Datum, usize)>) -> Self {
        Self {
            tag: tag.to_owned(),
            attrs: IndexMap::new(),
            style: IndexMap::new(),
            text: None,
            datum,
            parent,
            children: Vec::new(),
            transition: None,
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn style(&self, name: &str) -> Option<&str> {
        self.style.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    #[must_use]
    pub fn datum(&self) -> Option<&Datum> {
        self.datum.as_ref().map(|(datum, _)| datum)
    }

    #[must_use]
    pub fn datum_index(&self) -> Option<usize> {
        self.datum.as_ref().map(|(_, index)| *index)
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    fn has_class(&self, class: &str) -> bool {
        match self.attrs.get("class") {
            Some(AttrValue::Text(classes)) => classes.split_whitespace().any(|c| c == class),
            _ => false,
        }
    }

    fn bound(&self) -> Option<(&Datum, usize)> {
        self.datum.as_ref().map(|(datum, index)| (datum, *index))
    }

    fn assign(&self, name: &str, attr: &Attr) -> ChartResult<AttrValue> {
        attr.resolve(self.bound()).ok_or_else(|| {
            ChartError::InvalidArgument(format!(
                "attribute `{name}` is data-bound but <{}> has no datum",
                self.tag
            ))
        })
    }
}

/// Ordered set of nodes produced by a query or an append.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<NodeId>,
}

impl Selection {
    #[must_use]
    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SimpleSelector {
    tag: Option<String>,
    class: Option<String>,
}

impl SimpleSelector {
    fn matches(&self, node: &Node) -> bool {
        self.tag.as_deref().is_none_or(|tag| node.tag == tag)
            && self.class.as_deref().is_none_or(|class| node.has_class(class))
    }
}

/// Parses `*`, `tag`, `.class`, `tag.class` and comma-separated lists of those.
fn parse_selector(selector: &str) -> Vec<SimpleSelector> {
    selector
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (tag, class) = match part.split_once('.') {
                Some((tag, class)) => (tag, Some(class.to_owned())),
                None => (part, None),
            };
            let tag = match tag {
                "" | "*" => None,
                tag => Some(tag.to_owned()),
            };
            SimpleSelector { tag, class }
        })
        .collect()
}

fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Vector drawing surface: an arena tree rooted at one `svg` element.
///
/// The root lives as long as the surface; only its descendants are created
/// and removed. Slots freed by a removal are handed out again by the next
/// append, so the arena never outgrows the largest tree it has held.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    const ROOT: NodeId = NodeId(0);

    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::new("svg", None, None))],
            free: Vec::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn root_node(&self) -> &Node {
        match self.nodes.first() {
            Some(Some(root)) => root,
            _ => unreachable!("surface root is never removed"),
        }
    }

    fn root_node_mut(&mut self) -> &mut Node {
        match self.nodes.first_mut() {
            Some(Some(root)) => root,
            _ => unreachable!("surface root is never removed"),
        }
    }

    /// Live descendants of the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.iter().flatten().count() - 1
    }

    /// Allocated slots, root included, live or free.
    #[must_use]
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn root_attr(&self, name: &str) -> Option<&AttrValue> {
        self.root_node().attr(name)
    }

    pub fn set_root_attr(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.root_node_mut().attrs.insert(name.to_owned(), value.into());
    }

    #[must_use]
    pub fn root_style(&self, name: &str) -> Option<&str> {
        self.root_node().style(name)
    }

    pub fn set_root_style(&mut self, name: &str, value: &str) {
        self.root_node_mut()
            .style
            .insert(name.to_owned(), value.to_owned());
    }

    /// Descendants of the root matching `selector`, in document order.
    #[must_use]
    pub fn select_all(&self, selector: &str) -> Selection {
        let selectors = parse_selector(selector);
        let mut ids = Vec::new();
        let mut stack: Vec<NodeId> = self.root_node().children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            if selectors.iter().any(|selector| selector.matches(node)) {
                ids.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        Selection { ids }
    }

    /// Removes every node matching `selector` together with its subtree.
    /// A blank selector means `*`. Returns the number of nodes removed.
    pub fn remove_matching(&mut self, selector: &str) -> usize {
        let selector = selector.trim();
        if selector.is_empty() || selector == "*" {
            let removed = self.node_count();
            self.clear();
            return removed;
        }
        let selection = self.select_all(selector);
        self.remove(&selection)
    }

    /// Drops all descendants and compacts the arena.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.free.clear();
        self.root_node_mut().children.clear();
    }

    pub fn remove(&mut self, selection: &Selection) -> usize {
        let mut removed = 0;
        for &id in &selection.ids {
            if id == Self::ROOT {
                continue;
            }
            let Some(parent) = self.node(id).and_then(Node::parent) else {
                continue;
            };
            if let Some(parent) = self.node_mut(parent) {
                parent.children.retain(|child| *child != id);
            }
            let mut stack = vec![id];
            while let Some(next) = stack.pop() {
                if let Some(node) = self.nodes.get_mut(next.0).and_then(Option::take) {
                    self.free.push(next.0);
                    removed += 1;
                    stack.extend(node.children);
                }
            }
        }
        removed
    }

    fn push_child(&mut self, parent: NodeId, tag: &str, datum: Option<(Datum, usize)>) -> NodeId {
        let node = Some(Node::new(tag, Some(parent), datum));
        let id = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                NodeId(slot)
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        };
        if let Some(parent) = self.node_mut(parent) {
            parent.children.push(id);
        }
        id
    }

    /// Appends a child that inherits the parent's bound datum.
    pub fn append(&mut self, parent: NodeId, tag: &str) -> ChartResult<NodeId> {
        let Some(parent_node) = self.node(parent) else {
            return Err(ChartError::InvalidArgument(format!(
                "cannot append <{tag}> to removed node {}",
                parent.0
            )));
        };
        let datum = parent_node.datum.clone();
        Ok(self.push_child(parent, tag, datum))
    }

    /// Appends one `tag` child under `parent` per datum, binding datum and index.
    pub fn enter_append(&mut self, parent: NodeId, tag: &str, data: &[Datum]) -> ChartResult<Selection> {
        if self.node(parent).is_none() {
            return Err(ChartError::InvalidArgument(format!(
                "cannot bind data under removed node {}",
                parent.0
            )));
        }
        let ids = data
            .iter()
            .enumerate()
            .map(|(index, datum)| self.push_child(parent, tag, Some((datum.clone(), index))))
            .collect();
        Ok(Selection { ids })
    }

    /// Appends one `tag` child to each node of `parents`.
    pub fn append_each(&mut self, parents: &Selection, tag: &str) -> ChartResult<Selection> {
        let ids = parents
            .ids
            .iter()
            .map(|parent| self.append(*parent, tag))
            .collect::<ChartResult<Vec<_>>>()?;
        Ok(Selection { ids })
    }

    pub fn set_attr(&mut self, selection: &Selection, name: &str, attr: &Attr) -> ChartResult<()> {
        for &id in &selection.ids {
            let Some(node) = self.node_mut(id) else { continue };
            let value = node.assign(name, attr)?;
            node.attrs.insert(name.to_owned(), value);
        }
        Ok(())
    }

    pub fn set_attrs(&mut self, selection: &Selection, props: &Props) -> ChartResult<()> {
        for (name, attr) in props.iter() {
            self.set_attr(selection, name, attr)?;
        }
        Ok(())
    }

    pub fn set_text(&mut self, selection: &Selection, attr: &Attr) -> ChartResult<()> {
        for &id in &selection.ids {
            let Some(node) = self.node_mut(id) else { continue };
            let value = node.assign("text", attr)?;
            node.text = Some(value.to_string());
        }
        Ok(())
    }

    /// Schedules an animation of each selected node towards `end`.
    ///
    /// Numeric attributes interpolate from their current value; everything
    /// else snaps to its target when the transition completes. A zero
    /// duration applies `end` immediately. Returns the number of nodes touched.
    pub fn start_transition(
        &mut self,
        selection: &Selection,
        duration: Duration,
        end: &Props,
    ) -> ChartResult<usize> {
        let mut touched = 0;
        for &id in &selection.ids {
            let Some(node) = self.node_mut(id) else { continue };
            let mut to = IndexMap::with_capacity(end.len());
            for (name, attr) in end.iter() {
                to.insert(name.to_owned(), node.assign(name, attr)?);
            }
            if duration.is_zero() {
                node.attrs.extend(to);
                node.transition = None;
            } else {
                let from = to
                    .keys()
                    .filter_map(|name| {
                        let start = node.attrs.get(name).and_then(AttrValue::as_number)?;
                        Some((name.clone(), start))
                    })
                    .collect();
                node.transition = Some(Transition {
                    duration,
                    elapsed: Duration::ZERO,
                    from,
                    to,
                });
            }
            touched += 1;
        }
        Ok(touched)
    }

    /// Advances every running transition by `elapsed`. Returns how many are still running.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let mut running = 0;
        for node in self.nodes.iter_mut().flatten() {
            let Some(transition) = node.transition.as_mut() else {
                continue;
            };
            transition.elapsed = transition.elapsed.saturating_add(elapsed);
            let progress = transition.progress();
            if progress >= 1.0 {
                if let Some(done) = node.transition.take() {
                    node.attrs.extend(done.to);
                }
                continue;
            }
            let eased = ease_cubic_in_out(progress);
            for (name, target) in &transition.to {
                let (Some(start), Some(end)) = (transition.from.get(name), target.as_number())
                else {
                    continue;
                };
                node.attrs.insert(
                    name.clone(),
                    AttrValue::Number(start + (end - start) * eased),
                );
            }
            running += 1;
        }
        running
    }

    /// Jumps every running transition to its end state.
    pub fn finish_transitions(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            if let Some(done) = node.transition.take() {
                node.attrs.extend(done.to);
            }
        }
    }

    #[must_use]
    pub fn active_transitions(&self) -> usize {
        self.nodes
            .iter()
            .flatten()
            .filter(|node| node.transition.is_some())
            .count()
    }

    /// Serializes the surface as SVG markup.
    #[must_use]
    pub fn to_svg_markup(&self) -> String {
        let mut out = String::new();
        self.write_node(Self::ROOT, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else { return };
        let _ = write!(out, "<{}", node.tag);
        for (name, value) in &node.attrs {
            let _ = write!(out, " {name}=\"{}\"", escape(&value.to_string()));
        }
        if !node.style.is_empty() {
            let style: Vec<String> = node
                .style
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect();
            let _ = write!(out, " style=\"{}\"", escape(&style.join("; ")));
        }
        if node.children.is_empty() && node.text.is_none() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &node.text {
            out.push_str(&escape(text));
        }
        for child in &node.children {
            self.write_node(*child, out);
        }
        let _ = write!(out, "</{}>", node.tag);
    }
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}
