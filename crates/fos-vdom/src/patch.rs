//! Property Patcher
//!
//! Applies a props change to one DOM node. A prop is an event binding when
//! its key carries the configured prefix and its value is a listener; every
//! other prop is an attribute.

use crate::driver::DomDriver;
use crate::error::RenderError;
use crate::{Config, PatchMode, PropValue, Props, RenderResult};

/// How a single prop lands on a node
enum Binding<'a> {
    Event(String, &'a fos_dom::Listener),
    Attribute,
}

fn classify<'a>(config: &Config, key: &str, value: &'a PropValue) -> Binding<'a> {
    match (config.event_name(key), value.as_listener()) {
        (Some(event), Some(listener)) => Binding::Event(event, listener),
        _ => Binding::Attribute,
    }
}

/// Patch `node` from `prev` props to `next` props
pub fn update_dom<D: DomDriver>(
    driver: &mut D,
    node: &D::Node,
    prev: &Props,
    next: &Props,
    config: &Config,
) -> RenderResult<()> {
    match config.patch_mode {
        PatchMode::ReplaceAll => {
            for (key, value) in prev.iter() {
                unbind(driver, node, key, value, config)?;
            }
            for (key, value) in next.iter() {
                bind(driver, node, key, value, config)?;
            }
        }
        PatchMode::Minimal => {
            for (key, value) in prev.iter() {
                if next.get(key) != Some(value) {
                    unbind(driver, node, key, value, config)?;
                }
            }
            for (key, value) in next.iter() {
                if prev.get(key) != Some(value) {
                    bind(driver, node, key, value, config)?;
                }
            }
        }
    }
    Ok(())
}

fn unbind<D: DomDriver>(
    driver: &mut D,
    node: &D::Node,
    key: &str,
    value: &PropValue,
    config: &Config,
) -> RenderResult<()> {
    tracing::trace!(?node, key, "remove prop");
    let result = match classify(config, key, value) {
        Binding::Event(event, listener) => driver.remove_event_listener(node, &event, listener),
        Binding::Attribute => driver.remove_attribute(node, key),
    };
    result.map_err(RenderError::driver)
}

fn bind<D: DomDriver>(
    driver: &mut D,
    node: &D::Node,
    key: &str,
    value: &PropValue,
    config: &Config,
) -> RenderResult<()> {
    tracing::trace!(?node, key, "set prop");
    let result = match classify(config, key, value) {
        Binding::Event(event, listener) => driver.add_event_listener(node, &event, listener),
        Binding::Attribute => driver.set_attribute(node, key, value),
    };
    result.map_err(RenderError::driver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::{DomTree, Listener};

    #[test]
    fn test_replace_all_swaps_props() {
        let mut dom = DomTree::new();
        let div = dom.create_element("div");
        let click = Listener::new(|_| {});

        let prev = Props::new().with("className", "a").with("onClick", click);
        let next = Props::new().with("className", "b");

        update_dom(&mut dom, &div, &Props::new(), &prev, &Config::default()).unwrap();
        assert_eq!(dom.listener_count(div, "click"), 1);

        update_dom(&mut dom, &div, &prev, &next, &Config::default()).unwrap();
        assert_eq!(dom.attribute(div, "className"), Some("b"));
        assert_eq!(dom.listener_count(div, "click"), 0);
    }

    #[test]
    fn test_prefixed_non_listener_is_attribute() {
        let mut dom = DomTree::new();
        let div = dom.create_element("div");
        let next = Props::new().with("online", "yes");

        update_dom(&mut dom, &div, &Props::new(), &next, &Config::default()).unwrap();
        assert_eq!(dom.attribute(div, "online"), Some("yes"));
        assert_eq!(dom.listener_count(div, "line"), 0);
    }

    #[test]
    fn test_minimal_keeps_unchanged_listener() {
        let mut dom = DomTree::new();
        let div = dom.create_element("div");
        let config = Config { patch_mode: PatchMode::Minimal, ..Config::default() };
        let click = Listener::new(|_| {});

        let prev = Props::new().with("id", "x").with("onClick", click.clone());
        let next = Props::new().with("id", "y").with("onClick", click);

        update_dom(&mut dom, &div, &Props::new(), &prev, &config).unwrap();
        update_dom(&mut dom, &div, &prev, &next, &config).unwrap();
        assert_eq!(dom.attribute(div, "id"), Some("y"));
        assert_eq!(dom.listener_count(div, "click"), 1);
    }
}
