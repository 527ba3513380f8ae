use crate::context::ContextId;

/// A set of class markers. Built from either a space-separated string or an explicit list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassList(Vec<String>);

impl ClassList {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<&str> for ClassList {
    fn from(classes: &str) -> Self {
        Self(classes.split_whitespace().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for ClassList {
    fn from(classes: Vec<String>) -> Self {
        Self(classes)
    }
}

impl From<&[&str]> for ClassList {
    fn from(classes: &[&str]) -> Self {
        Self(classes.iter().map(|class| class.to_string()).collect())
    }
}

/// Per-instance configuration. Every field has a default, so callers typically override a few
/// fields with struct-update syntax:
///
/// ```
/// use nested_list::Options;
///
/// let opts = Options {
///     threshold: 32.0,
///     context: "sidebar".into(),
///     ..Options::default()
/// };
/// assert_eq!(opts.item_selector, "li");
/// ```
#[derive(Clone, Debug)]
pub struct Options {
    /// Element tag used when a new sub-list has to be synthesized.
    pub list_tag: String,
    /// How list containers are identified. Falls back to `list_tag` when left empty.
    pub list_selector: String,
    /// How draggable items are identified.
    pub item_selector: String,
    /// Handle element inside an item that picks the item up.
    pub handle_selector: String,
    /// Horizontal travel, in pixels, that triggers a nest or un-nest.
    pub threshold: f64,
    /// Session context this instance registers under; instances sharing an id cooperate on
    /// one drag gesture.
    pub context: ContextId,
    pub expand_btn: String,
    pub collapse_btn: String,
    pub extract_btn: String,
    /// Classes applied to synthesized sub-lists.
    pub list_class: ClassList,
    /// Classes marking the item being moved.
    pub active_class: ClassList,
    /// Classes applied to the drag ghost.
    pub drag_class: ClassList,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            list_tag: "ul".into(),
            list_selector: "ul".into(),
            item_selector: "li".into(),
            handle_selector: ".nl-handle".into(),
            threshold: 20.0,
            context: ContextId::default(),
            expand_btn: ".nl-expand".into(),
            collapse_btn: ".nl-collapse".into(),
            extract_btn: ".nl-extract".into(),
            list_class: "nl-list".into(),
            active_class: "nl-active".into(),
            drag_class: "nl-drag".into(),
        }
    }
}
