//! Comprehensive tests for fos-vdom
//!
//! Rendering into a `DomTree`, diffing, hooks and class components.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{Context, Result};
use fos_dom::{DomEvent, DomTree, NodeId};
use fos_vdom::{
    create_element, reconcile, render, ClassComponent, Component, Config, EffectTag, Element,
    FiberTree, Hooks, Props, RenderResult, Root, StateSetter, Updater,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// DOM node of the fiber at `path`
fn dom_at(tree: &FiberTree<NodeId>, path: &[usize]) -> Result<NodeId> {
    let id = tree.at_path(path).context("no fiber at path")?;
    tree.get(id)
        .and_then(|fiber| fiber.dom().copied())
        .context("fiber owns no node")
}

fn tags(tree: &FiberTree<NodeId>, tag: EffectTag) -> Vec<Vec<usize>> {
    tree.effects_tagged(tag).map(|e| e.path.clone()).collect()
}

fn leaf(tag: &str) -> Element {
    create_element(tag, Props::new(), Vec::<Element>::new())
}

#[test]
fn test_text_round_trip() -> Result<()> {
    init_tracing();
    let mut dom = DomTree::new();
    let container = dom.root();

    let el = create_element("div", Props::new(), ["hello"]);
    let tree = render(&el, container, &mut dom, &mut None, &Config::default())?;

    assert_eq!(dom.inner_html(container), "<div>hello</div>");
    let div = dom_at(&tree, &[0])?;
    let text = dom_at(&tree, &[0, 0])?;
    assert_eq!(dom.child_ids(div), vec![text]);
    assert_eq!(dom.text(text), Some("hello"));
    assert_eq!(tree.effects().len(), 2);
    Ok(())
}

#[test]
fn test_idempotent_rerender() -> Result<()> {
    init_tracing();
    let mut dom = DomTree::new();
    let container = dom.root();
    let config = Config::default();

    let el = create_element(
        "section",
        Props::new().with("id", "main"),
        [
            create_element("h1", Props::new(), ["title"]),
            create_element("p", Props::new(), ["body"]),
        ],
    );
    let first = render(&el, container, &mut dom, &mut None, &config)?;
    let html = dom.inner_html(container);
    let nodes = dom.len();

    let second = render(&el, container, &mut dom, &mut Some(first), &config)?;
    assert!(second.effects().iter().all(|e| e.tag == EffectTag::Update));
    assert_eq!(second.effects().len(), 5);
    assert_eq!(dom.inner_html(container), html);
    assert_eq!(dom.len(), nodes, "no node was created");
    Ok(())
}

#[test]
fn test_prop_diff_removes_listener() -> Result<()> {
    let mut dom = DomTree::new();
    let container = dom.root();
    let config = Config::default();
    let clicks = Rc::new(Cell::new(0));

    let counter = clicks.clone();
    let before = create_element(
        "button",
        Props::new()
            .with("className", "a")
            .with_listener("onClick", move |_| counter.set(counter.get() + 1)),
        ["go"],
    );
    let tree = render(&before, container, &mut dom, &mut None, &config)?;
    let button = dom_at(&tree, &[0])?;

    dom.dispatch_event(DomEvent::new("click", button))?;
    assert_eq!(clicks.get(), 1);

    let after = create_element("button", Props::new().with("className", "b"), ["go"]);
    let tree = render(&after, container, &mut dom, &mut Some(tree), &config)?;

    assert_eq!(dom_at(&tree, &[0])?, button, "node is reused");
    assert_eq!(dom.attribute(button, "className"), Some("b"));
    assert_eq!(dom.listener_count(button, "click"), 0);
    dom.dispatch_event(DomEvent::new("click", button))?;
    assert_eq!(clicks.get(), 1);
    Ok(())
}

#[test]
fn test_subtree_deletion() -> Result<()> {
    let mut dom = DomTree::new();
    let container = dom.root();
    let config = Config::default();

    let three = create_element("ul", Props::new(), [
        create_element("li", Props::new(), ["a"]),
        create_element("li", Props::new(), ["b"]),
        create_element("li", Props::new(), ["c"]),
    ]);
    let tree = render(&three, container, &mut dom, &mut None, &config)?;
    let ul = dom_at(&tree, &[0])?;
    assert_eq!(dom.child_ids(ul).len(), 3);

    let one = create_element("ul", Props::new(), [create_element("li", Props::new(), ["a"])]);
    let tree = render(&one, container, &mut dom, &mut Some(tree), &config)?;

    assert_eq!(tags(&tree, EffectTag::Deletion), vec![vec![0, 1], vec![0, 2]]);
    assert!(tags(&tree, EffectTag::Update).contains(&vec![0, 0]));
    assert!(tags(&tree, EffectTag::Placement).is_empty());
    assert_eq!(dom.child_ids(ul).len(), 1);
    assert_eq!(dom.inner_html(container), "<ul><li>a</li></ul>");
    Ok(())
}

#[test]
fn test_type_change_replaces_node() -> Result<()> {
    let mut dom = DomTree::new();
    let container = dom.root();
    let config = Config::default();

    let span = create_element("span", Props::new(), ["x"]);
    let tree = render(&span, container, &mut dom, &mut None, &config)?;
    let span = dom_at(&tree, &[0])?;

    let div = create_element("div", Props::new(), ["x"]);
    let tree = render(&div, container, &mut dom, &mut Some(tree), &config)?;
    let div = dom_at(&tree, &[0])?;

    assert_ne!(span, div);
    assert_eq!(dom.tag_name(div), Some("div"));
    assert_eq!(tags(&tree, EffectTag::Deletion), vec![vec![0]]);
    assert_eq!(tags(&tree, EffectTag::Placement), vec![vec![0], vec![0, 0]]);
    assert_eq!(dom.child_ids(container), vec![div]);
    assert_eq!(dom.parent(span), None);
    Ok(())
}

#[test]
fn test_type_change_marks_whole_subtree() -> Result<()> {
    let mut dom = DomTree::new();
    let container = dom.root();
    let config = Config::default();

    let span = create_element("span", Props::new(), ["x"]);
    let mut previous = Some(render(&span, container, &mut dom, &mut None, &config)?);

    let div = create_element("div", Props::new(), ["x"]);
    let work = reconcile(&div, container, &mut previous, &config)?;
    let old = work.previous().context("diffed against the first tree")?;

    let paths: [&[usize]; 2] = [&[0], &[0, 0]];
    for path in paths {
        let id = old.at_path(path).context("old fiber")?;
        let fiber = old.get(id).context("fiber")?;
        assert_eq!(fiber.effect_tag(), Some(EffectTag::Deletion), "at {path:?}");
    }
    let root = old.get(old.root()).context("root fiber")?;
    assert_eq!(root.effect_tag(), None, "root is never deleted");
    Ok(())
}

#[test]
fn test_hook_slot_stability() -> Result<()> {
    init_tracing();
    let mut dom = DomTree::new();
    let setter: Rc<RefCell<Option<StateSetter<i32>>>> = Rc::default();

    let captured = setter.clone();
    let counter = Component::function("Counter", move |_props: &Props, hooks: &mut Hooks<'_>| {
        let (count, set_count) = hooks.use_state(|| 0)?;
        *captured.borrow_mut() = Some(set_count);
        Ok(create_element("span", Props::new(), [count]))
    });

    let mut root = Root::new(dom.root());
    root.render(&mut dom, create_element(&counter, Props::new(), Vec::<Element>::new()))?;
    assert_eq!(dom.inner_html(dom.root()), "<span>0</span>");

    let set_count = setter.borrow().clone().context("setter captured")?;
    set_count.update(|n| n + 1);
    set_count.update(|n| n * 10);
    assert!(root.has_pending_updates());

    assert!(root.flush(&mut dom)?);
    assert!(!root.has_pending_updates());
    assert_eq!(dom.inner_html(dom.root()), "<span>10</span>");

    let tree = root.current().context("mounted")?;
    let fiber = tree.get(tree.at_path(&[0]).context("component fiber")?).context("fiber")?;
    assert!(fiber.is_component());
    assert_eq!(fiber.hook_count(), 1);

    assert!(!root.flush(&mut dom)?, "nothing pending");
    Ok(())
}

#[test]
fn test_state_driven_by_events() -> Result<()> {
    let mut dom = DomTree::new();

    let counter = Component::function("Clicker", |_props: &Props, hooks: &mut Hooks<'_>| {
        let (count, set_count) = hooks.use_state(|| 0u32)?;
        let (label, _) = hooks.use_state(|| String::from("clicks"))?;
        Ok(create_element(
            "button",
            Props::new().with_listener("onClick", move |_| set_count.update(|n| n + 1)),
            [format!("{label}: {count}")],
        ))
    });

    let mut root = Root::new(dom.root());
    let el = create_element(&counter, Props::new(), Vec::<Element>::new());
    let tree = root.render(&mut dom, el)?;
    let button = dom_at(tree, &[0, 0])?;

    dom.dispatch_event(DomEvent::new("click", button))?;
    dom.dispatch_event(DomEvent::new("click", button))?;
    root.flush(&mut dom)?;

    assert_eq!(dom.text_content(button), "clicks: 2");
    assert_eq!(dom.listener_count(button, "click"), 1, "old listener replaced");
    Ok(())
}

struct Toggle {
    on: bool,
    renders: u32,
}

impl ClassComponent for Toggle {
    fn construct(props: &Props) -> Self {
        let on = props.get("initial").is_some_and(|v| v.to_string() == "true");
        Self { on, renders: 0 }
    }

    fn render(&mut self, _props: &Props, updater: &Updater<Self>) -> RenderResult<Element> {
        self.renders += 1;
        let updater = updater.clone();
        let label = if self.on { "on" } else { "off" };
        Ok(create_element(
            "button",
            Props::new()
                .with("data-renders", i64::from(self.renders))
                .with_listener("onClick", move |_| {
                    updater.set_state(|t: &mut Toggle| t.on = !t.on)
                }),
            [label],
        ))
    }
}

#[test]
fn test_class_state_persists() -> Result<()> {
    let mut dom = DomTree::new();
    let mut root = Root::new(dom.root());
    let props = Props::new().with("initial", true);
    let el = create_element(Component::class::<Toggle>(), props, Vec::<Element>::new());

    let tree = root.render(&mut dom, el.clone())?;
    let button = dom_at(tree, &[0, 0])?;
    assert_eq!(dom.text_content(button), "on");
    let toggle = tree.get(tree.at_path(&[0]).context("class fiber")?).context("fiber")?;
    assert!(toggle.has_instance());
    assert_eq!(toggle.hook_count(), 0);

    dom.dispatch_event(DomEvent::new("click", button))?;
    assert!(root.flush(&mut dom)?);
    assert_eq!(dom.text_content(button), "off");
    assert_eq!(dom.attribute(button, "data-renders"), Some("2"));

    // Same type at the same position keeps the instance
    root.render(&mut dom, el)?;
    assert_eq!(dom.text_content(button), "off");
    assert_eq!(dom.attribute(button, "data-renders"), Some("3"));
    Ok(())
}

#[test]
fn test_replaced_component_loses_state() -> Result<()> {
    let mut dom = DomTree::new();
    let mut root = Root::new(dom.root());
    let toggle = || {
        create_element(Component::class::<Toggle>(), Props::new(), Vec::<Element>::new())
    };

    root.render(&mut dom, create_element("div", Props::new(), [toggle()]))?;
    root.render(&mut dom, create_element("div", Props::new(), [leaf("hr")]))?;
    let tree = root.render(&mut dom, create_element("div", Props::new(), [toggle()]))?;

    let button = dom_at(tree, &[0, 0, 0])?;
    assert_eq!(dom.attribute(button, "data-renders"), Some("1"), "fresh instance");
    Ok(())
}

#[test]
fn test_mid_list_replacement_keeps_order() -> Result<()> {
    let mut dom = DomTree::new();
    let container = dom.root();
    let config = Config::default();
    let item = Component::function("Item", |props: &Props, _hooks: &mut Hooks<'_>| {
        let text = props.get("text").map(ToString::to_string).unwrap_or_default();
        Ok(create_element("li", Props::new(), [text]))
    });
    let list = |middle: Element| {
        create_element("ol", Props::new(), [
            create_element(&item, Props::new().with("text", "one"), Vec::<Element>::new()),
            middle,
            create_element(&item, Props::new().with("text", "three"), Vec::<Element>::new()),
        ])
    };

    let tree = render(&list(leaf("hr")), container, &mut dom, &mut None, &config)?;
    let tree = render(
        &list(create_element("li", Props::new(), ["two"])),
        container,
        &mut dom,
        &mut Some(tree),
        &config,
    )?;

    assert_eq!(
        dom.inner_html(container),
        "<ol><li>one</li><li>two</li><li>three</li></ol>"
    );
    assert_eq!(tags(&tree, EffectTag::Deletion), vec![vec![0, 1]]);
    Ok(())
}
